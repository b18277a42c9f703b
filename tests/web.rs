// Browser tests for the DOM overlay surface. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use slingshot_splat::launcher::surface::{
    ElementKind, ElementSpec, Easing, Keyframes, OverlaySurface, Pose, SurfaceError,
};
use slingshot_splat::web::DomOverlay;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn spec(kind: ElementKind) -> ElementSpec {
    ElementSpec { kind, markup: "<svg></svg>".to_string(), pose: Pose::at(10.0, 10.0), width: 50.0 }
}

#[wasm_bindgen_test]
fn overlay_adds_and_removes_children() {
    let mut overlay = DomOverlay::new("test-overlay-a").unwrap();
    let doc = web_sys::window().unwrap().document().unwrap();
    let layer = doc.get_element_by_id("test-overlay-a").unwrap();
    assert_eq!(layer.child_element_count(), 0);

    let id = overlay.add_element(spec(ElementKind::SplatFigure)).unwrap();
    assert_eq!(layer.child_element_count(), 1);
    assert!(layer.first_element_child().unwrap().class_name().contains("splat-figure"));

    overlay.remove_element(id).unwrap();
    assert_eq!(layer.child_element_count(), 0);
    assert!(matches!(overlay.remove_element(id), Err(SurfaceError::MissingElement(_))));
}

#[wasm_bindgen_test]
fn animate_writes_transition_and_pose() {
    let mut overlay = DomOverlay::new("test-overlay-b").unwrap();
    let id = overlay.add_element(spec(ElementKind::FlyingFigure)).unwrap();
    overlay
        .animate(id, Keyframes::to(Pose::at(100.0, 50.0).rotated(360.0)), 350.0, Easing::EaseIn)
        .unwrap();
    let doc = web_sys::window().unwrap().document().unwrap();
    let el = doc.get_element_by_id("test-overlay-b").unwrap().first_element_child().unwrap();
    let style = el.get_attribute("style").unwrap();
    assert!(style.contains("rotate(360.000deg)"));
    assert!(style.contains("350ms ease-in"));
}

#[wasm_bindgen_test]
fn show_and_hide_toggle_display() {
    let mut overlay = DomOverlay::new("test-overlay-c").unwrap();
    let doc = web_sys::window().unwrap().document().unwrap();
    let layer = doc.get_element_by_id("test-overlay-c").unwrap();
    assert!(layer.get_attribute("style").unwrap().contains("display:none"));
    overlay.show();
    assert!(layer.get_attribute("style").unwrap().contains("display:block"));
    overlay.hide();
    assert!(layer.get_attribute("style").unwrap().contains("display:none"));
}

#[wasm_bindgen_test]
fn darken_color_export_matches_core() {
    assert_eq!(slingshot_splat::web::darken_color_js("#E8B89D", 20.0).unwrap(), "#b5856a");
    assert!(slingshot_splat::web::darken_color_js("nope", 20.0).is_err());
}

#[wasm_bindgen_test]
fn fresh_element_transitions_from_its_created_pose() {
    // add + animate in one task must still leave the start pose on screen
    let mut overlay = DomOverlay::new("test-overlay-d").unwrap();
    overlay.show();
    let id = overlay.add_element(spec(ElementKind::FlyingFigure)).unwrap();
    overlay.animate(id, Keyframes::to(Pose::at(400.0, 300.0).uniform(2.0)), 1_000.0, Easing::Linear).unwrap();

    let win = web_sys::window().unwrap();
    let el = win.document().unwrap().get_element_by_id("test-overlay-d").unwrap().first_element_child().unwrap();
    let transform = win.get_computed_style(&el).unwrap().unwrap().get_property_value("transform").unwrap();
    // still at scale 1, not jumped to the end scale of 2
    assert!(transform.starts_with("matrix(1, 0, 0, 1,"), "got {transform}");
}
