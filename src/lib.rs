//! Slingshot splat core crate.
//!
//! When a kid is launched straight at the player, the game plays a cartoon
//! splat on top of the `world` canvas: the kid flies at the screen, flattens
//! against the glass, wobbles and slides down leaving drool trails. The
//! sequencing lives in [`launcher`] and is target independent; [`web`] binds it
//! to the DOM, Web Audio and `requestAnimationFrame`.
//!
//! Gameplay physics, levels and the main render loop live on the JS side and
//! only call into [`web::KidLauncher`].

use wasm_bindgen::prelude::*;

/// Log to browser console (argument evaluation only on native targets, so host
/// tests never touch JS imports).
macro_rules! console_log {
    ($($t:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&format!($($t)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format_args!($($t)*);
    }};
}

/// Same as `console_log!` but at warning level.
macro_rules! console_warn {
    ($($t:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&format!($($t)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format_args!($($t)*);
    }};
}

pub mod config;
pub mod launcher;
pub mod web;

pub use config::LauncherConfig;
pub use launcher::markup::{Appearance, ColorError, Rgb, darken_color};
pub use launcher::motion::{Point, WorldMapping};
pub use launcher::surface::{EffectHooks, NoEffects, OverlaySurface};
pub use launcher::{LaunchSequencer, SequenceState};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
