// Integration tests (native) for the `slingshot-splat` crate's public helpers.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use slingshot_splat::launcher::markup::{create_impact_figure_markup, DEFAULT_SKIN_TONE};
use slingshot_splat::{Appearance, ColorError, Point, WorldMapping, darken_color};

// 2.55 * 20 = 51 and 2.55 * 40 = 102 off every channel.
#[test]
fn darken_color_matches_hand_computed_values() {
    assert_eq!(darken_color("#E8B89D", 20.0).unwrap(), "#b5856a");
    assert_eq!(darken_color("#E8B89D", 40.0).unwrap(), "#825237");
    assert_eq!(darken_color("#E8B89D", 0.0).unwrap(), "#e8b89d");
    assert_eq!(darken_color("#E8B89D", 100.0).unwrap(), "#000000");
}

#[test]
fn darken_color_rejects_garbage() {
    assert_eq!(
        darken_color("#12345", 10.0),
        Err(ColorError::InvalidHex("#12345".to_string()))
    );
}

// Absent appearance fields fall back to the default skin tone in the markup.
#[test]
fn default_appearance_shows_up_in_markup() {
    let markup = create_impact_figure_markup(&Appearance::default());
    assert!(markup.starts_with("<svg"));
    assert!(markup.contains(&DEFAULT_SKIN_TONE.to_string()));
}

// A 1600x1200 world canvas shown at half size, offset by (20, 10).
#[test]
fn world_point_maps_into_viewport() {
    let mapping = WorldMapping {
        left: 20.0,
        top: 10.0,
        width: 800.0,
        height: 600.0,
        native_width: 1600.0,
        native_height: 1200.0,
    };
    assert_eq!(mapping.to_viewport(Point::new(800.0, 600.0)), Point::new(420.0, 310.0));
}
