//! Capability seams between the launch sequencer and whatever actually draws.
//!
//! The sequencer only ever talks to an [`OverlaySurface`] (element lifetime and
//! animation) and an [`EffectHooks`] (sound + screen shake). The browser layer
//! implements both on top of the DOM / Web Audio; tests implement them with
//! recorders.

use std::fmt;

use thiserror::Error;

/// Opaque handle to an element living on an overlay surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The transient elements a single launch can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    FlyingFigure,
    SplatFigure,
    CrackOverlay,
    SmearOverlay,
    DroolTrail(u8), // 0..DROOL_TRAILS
}

impl ElementKind {
    /// CSS class used by the DOM surface (and handy in test output).
    pub fn class_name(&self) -> &'static str {
        match self {
            ElementKind::FlyingFigure => "splat-flying",
            ElementKind::SplatFigure => "splat-figure",
            ElementKind::CrackOverlay => "splat-crack",
            ElementKind::SmearOverlay => "splat-smear",
            ElementKind::DroolTrail(_) => "splat-drool",
        }
    }

    /// Full-viewport layers are laid out differently from positioned sprites.
    pub fn is_fullscreen(&self) -> bool {
        matches!(self, ElementKind::CrackOverlay | ElementKind::SmearOverlay)
    }
}

/// Animatable state of one element. `x`/`y` is the element centre in
/// viewport pixels, or its top-centre when `height` is set (trails grow down
/// from where they start).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotate_deg: f64,
    pub opacity: f64,
    pub height: Option<f64>, // only drool trails animate their height
}

impl Pose {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate_deg: 0.0,
            opacity: 1.0,
            height: None,
        }
    }

    pub fn scaled(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn uniform(self, scale: f64) -> Self {
        self.scaled(scale, scale)
    }

    pub fn rotated(mut self, deg: f64) -> Self {
        self.rotate_deg = deg;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Inline CSS for this pose (transform, opacity and optional height).
    pub fn css(&self) -> String {
        let translate_y = match self.height {
            Some(_) => format!("{:.2}px", self.y),
            None => format!("calc({:.2}px - 50%)", self.y),
        };
        let mut css = format!(
            "transform:translate(calc({:.2}px - 50%), {}) rotate({:.3}deg) scale({:.4}, {:.4}); opacity:{:.3};",
            self.x, translate_y, self.rotate_deg, self.scale_x, self.scale_y, self.opacity
        );
        if let Some(h) = self.height {
            css.push_str(&format!(" height:{:.2}px;", h));
        }
        css
    }
}

/// Start / end of one animation. A missing `from` animates from whatever the
/// element currently shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframes {
    pub from: Option<Pose>,
    pub to: Pose,
}

impl Keyframes {
    pub fn to(to: Pose) -> Self {
        Self { from: None, to }
    }

    pub fn between(from: Pose, to: Pose) -> Self {
        Self { from: Some(from), to }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    /// Overshooting ease used for the settle bounce.
    Elastic,
}

impl Easing {
    pub fn css(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::Elastic => "cubic-bezier(0.34, 1.56, 0.64, 1)",
        }
    }
}

/// What the sequencer hands the surface when creating an element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub markup: String,
    pub pose: Pose,
    pub width: f64,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("overlay element {0} no longer exists")]
    MissingElement(ElementId),
    #[error("dom operation failed: {0}")]
    Dom(String),
}

impl From<SurfaceError> for wasm_bindgen::JsValue {
    fn from(err: SurfaceError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

/// Minimal drawing capability the sequencer needs.
pub trait OverlaySurface {
    /// Viewport size in pixels (width, height).
    fn viewport(&self) -> (f64, f64);
    fn show(&mut self);
    fn hide(&mut self);
    fn add_element(&mut self, spec: ElementSpec) -> Result<ElementId, SurfaceError>;
    fn remove_element(&mut self, id: ElementId) -> Result<(), SurfaceError>;
    fn animate(
        &mut self,
        id: ElementId,
        keyframes: Keyframes,
        duration_ms: f64,
        easing: Easing,
    ) -> Result<(), SurfaceError>;
}

/// Sound and screen-shake collaborators. Everything defaults to a no-op so an
/// implementation only overrides what it actually has.
pub trait EffectHooks {
    fn play_impact(&mut self, _intensity: f64) {}
    fn play_squeaky_slide(&mut self) {}
    fn shake_screen(&mut self, _intensity: f64) {}
}

/// Effect hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffects;

impl EffectHooks for NoEffects {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_css_contains_transform_and_height() {
        let css = Pose::at(10.0, 20.0).scaled(1.5, 0.5).rotated(90.0).with_height(42.0).css();
        // height-animated poses are anchored at their top edge
        assert!(css.contains("translate(calc(10.00px - 50%), 20.00px)"));
        assert!(css.contains("rotate(90.000deg)"));
        assert!(css.contains("scale(1.5000, 0.5000)"));
        assert!(css.contains("height:42.00px"));
    }

    #[test]
    fn test_pose_css_without_height() {
        let css = Pose::at(0.0, 0.0).css();
        assert!(!css.contains("height"));
        assert!(css.contains("calc(0.00px - 50%))"));
    }

    #[test]
    fn test_elastic_overshoots() {
        // second control point above 1.0 is what makes it overshoot
        assert!(Easing::Elastic.css().contains("1.56"));
    }

    #[test]
    fn test_fullscreen_kinds() {
        assert!(ElementKind::CrackOverlay.is_fullscreen());
        assert!(ElementKind::SmearOverlay.is_fullscreen());
        assert!(!ElementKind::DroolTrail(1).is_fullscreen());
    }
}
