//! Browser bindings: DOM overlay surface, Web Audio / CSS effect hooks and the
//! `KidLauncher` handle exported to JS.
//!
//! The JS game constructs one `KidLauncher` at startup and calls `launch` from
//! its "kid hit the screen" event. While a sequence is playing the handle ticks
//! the sequencer from `requestAnimationFrame`, backed by a `setTimeout` armed
//! for the next due phase.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, Document, HtmlCanvasElement, HtmlElement, OscillatorType, window};

use crate::config::LauncherConfig;
use crate::launcher::markup::{Appearance, Rgb};
use crate::launcher::motion::{Point, WorldMapping};
use crate::launcher::surface::{
    EffectHooks, ElementId, ElementSpec, Easing, Keyframes, OverlaySurface, SurfaceError,
};
use crate::launcher::timeline::SHAKE_MS;
use crate::launcher::{LaunchSequencer, OnComplete};

const SHAKE_CLASS: &str = "splat-shake";
const STYLE_ELEMENT_ID: &str = "splat-style";
const OVERLAY_STYLE: &str = "position:fixed; left:0; top:0; width:100vw; height:100vh; pointer-events:none; overflow:hidden; z-index:60;";
const SHAKE_CSS: &str = "\
@keyframes splat-shake {\
  0%, 100% { transform: translate(0, 0); }\
  20% { transform: translate(calc(var(--splat-shake-intensity, 10px) * -1), calc(var(--splat-shake-intensity, 10px) * 0.5)); }\
  40% { transform: translate(var(--splat-shake-intensity, 10px), calc(var(--splat-shake-intensity, 10px) * -0.5)); }\
  60% { transform: translate(calc(var(--splat-shake-intensity, 10px) * -0.6), calc(var(--splat-shake-intensity, 10px) * 0.3)); }\
  80% { transform: translate(calc(var(--splat-shake-intensity, 10px) * 0.4), 0); }\
}\
.splat-shake { animation: splat-shake 0.5s linear; }";

// Squeak: sawtooth sweep 800 -> 200 Hz, gain 0.1 -> 0.01, both over 1.5 s.
const SQUEAK_FREQ_START: f32 = 800.0;
const SQUEAK_FREQ_END: f32 = 200.0;
const SQUEAK_GAIN_START: f32 = 0.1;
const SQUEAK_GAIN_END: f32 = 0.01;
const SQUEAK_SECONDS: f64 = 1.5;

fn document() -> Result<Document, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    win.document().ok_or_else(|| JsValue::from_str("no document"))
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn dom_err(err: JsValue) -> SurfaceError {
    SurfaceError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

// --- Overlay surface ---------------------------------------------------------

struct OverlayChild {
    id: ElementId,
    el: HtmlElement,
    base_style: String,
}

/// `OverlaySurface` backed by a fixed-position `<div>` layer.
pub struct DomOverlay {
    document: Document,
    layer: HtmlElement,
    children: Vec<OverlayChild>,
    next_id: u32,
}

impl DomOverlay {
    /// Reuses the element with `overlay_id` or creates it under `<body>`.
    /// The layer starts hidden.
    pub fn new(overlay_id: &str) -> Result<Self, JsValue> {
        let doc = document()?;
        ensure_stylesheet(&doc)?;
        let layer: HtmlElement = if let Some(el) = doc.get_element_by_id(overlay_id) {
            el.dyn_into()?
        } else {
            let div: HtmlElement = doc.create_element("div")?.dyn_into()?;
            div.set_id(overlay_id);
            doc.body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&div)?;
            div
        };
        let overlay = Self { document: doc, layer, children: Vec::new(), next_id: 0 };
        overlay.set_layer_visible(false);
        Ok(overlay)
    }

    fn set_layer_visible(&self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        self.layer
            .set_attribute("style", &format!("{} display:{};", OVERLAY_STYLE, display))
            .ok();
    }

    fn child(&self, id: ElementId) -> Result<&OverlayChild, SurfaceError> {
        self.children
            .iter()
            .find(|c| c.id == id)
            .ok_or(SurfaceError::MissingElement(id))
    }

    fn base_style(spec: &ElementSpec) -> String {
        if spec.kind.is_fullscreen() {
            "position:absolute; left:0; top:0; width:100%; height:100%;".to_string()
        } else if spec.pose.height.is_some() {
            format!(
                "position:absolute; left:0; top:0; width:{:.0}px; transform-origin:top center; will-change:transform,height;",
                spec.width
            )
        } else {
            format!(
                "position:absolute; left:0; top:0; width:{w:.0}px; height:{w:.0}px; will-change:transform;",
                w = spec.width
            )
        }
    }
}

impl OverlaySurface for DomOverlay {
    fn viewport(&self) -> (f64, f64) {
        let win = window();
        let dim = |v: Option<Result<JsValue, JsValue>>| v.and_then(|r| r.ok()).and_then(|v| v.as_f64());
        let w = dim(win.as_ref().map(|w| w.inner_width()));
        let h = dim(win.as_ref().map(|w| w.inner_height()));
        (
            w.unwrap_or(self.layer.client_width() as f64),
            h.unwrap_or(self.layer.client_height() as f64),
        )
    }

    fn show(&mut self) {
        self.set_layer_visible(true);
    }

    fn hide(&mut self) {
        self.set_layer_visible(false);
    }

    fn add_element(&mut self, spec: ElementSpec) -> Result<ElementId, SurfaceError> {
        let el: HtmlElement = self
            .document
            .create_element("div")
            .map_err(dom_err)?
            .dyn_into()
            .map_err(|_| SurfaceError::Dom("created element is not an HtmlElement".into()))?;
        el.set_class_name(spec.kind.class_name());
        el.set_inner_html(&spec.markup);
        let base_style = Self::base_style(&spec);
        el.set_attribute("style", &format!("{} {} transition:none;", base_style, spec.pose.css()))
            .map_err(dom_err)?;
        self.layer.append_child(&el).map_err(dom_err)?;

        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.children.push(OverlayChild { id, el, base_style });
        Ok(id)
    }

    fn remove_element(&mut self, id: ElementId) -> Result<(), SurfaceError> {
        let idx = self
            .children
            .iter()
            .position(|c| c.id == id)
            .ok_or(SurfaceError::MissingElement(id))?;
        let child = self.children.swap_remove(idx);
        child.el.remove();
        Ok(())
    }

    fn animate(
        &mut self,
        id: ElementId,
        keyframes: Keyframes,
        duration_ms: f64,
        easing: Easing,
    ) -> Result<(), SurfaceError> {
        let child = self.child(id)?;
        if let Some(from) = keyframes.from {
            child
                .el
                .set_attribute("style", &format!("{} {} transition:none;", child.base_style, from.css()))
                .map_err(dom_err)?;
        }
        // flush pending style writes (the start pose, or the pose set by
        // add_element in this same task) so the transition has a start value
        let _ = child.el.offset_width();
        let transition = if duration_ms > 0.0 {
            let e = easing.css();
            format!(
                "transition:transform {d:.0}ms {e}, opacity {d:.0}ms {e}, height {d:.0}ms {e};",
                d = duration_ms,
                e = e
            )
        } else {
            "transition:none;".to_string()
        };
        child
            .el
            .set_attribute("style", &format!("{} {} {}", child.base_style, keyframes.to.css(), transition))
            .map_err(dom_err)
    }
}

fn ensure_stylesheet(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(());
    }
    let style = doc.create_element("style")?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(SHAKE_CSS));
    if let Some(head) = doc.head() {
        head.append_child(&style)?;
    } else if let Some(body) = doc.body() {
        body.append_child(&style)?;
    }
    Ok(())
}

// --- Effect hooks ------------------------------------------------------------

/// Screen shake via a CSS class, thud via an optional JS callback, squeak via
/// Web Audio.
pub struct DomEffects {
    document: Document,
    root_id: String,
    impact_sound: Option<js_sys::Function>,
    audio: Option<AudioContext>, // created lazily on the first squeak
}

impl DomEffects {
    pub fn new(root_id: &str, impact_sound: Option<js_sys::Function>) -> Result<Self, JsValue> {
        Ok(Self { document: document()?, root_id: root_id.to_string(), impact_sound, audio: None })
    }

    fn root(&self) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&self.root_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .or_else(|| self.document.body())
    }

    fn audio_context(&mut self) -> Result<AudioContext, JsValue> {
        if let Some(ctx) = &self.audio {
            return Ok(ctx.clone());
        }
        let ctx = AudioContext::new()?;
        self.audio = Some(ctx.clone());
        Ok(ctx)
    }

    fn squeak(&mut self) -> Result<(), JsValue> {
        let ctx = self.audio_context()?;
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        let t = ctx.current_time();
        osc.set_type(OscillatorType::Sawtooth);
        osc.frequency().set_value_at_time(SQUEAK_FREQ_START, t)?;
        osc.frequency()
            .exponential_ramp_to_value_at_time(SQUEAK_FREQ_END, t + SQUEAK_SECONDS)?;
        gain.gain().set_value_at_time(SQUEAK_GAIN_START, t)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(SQUEAK_GAIN_END, t + SQUEAK_SECONDS)?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start()?;
        osc.stop_with_when(t + SQUEAK_SECONDS)?;
        Ok(())
    }
}

impl EffectHooks for DomEffects {
    fn play_impact(&mut self, intensity: f64) {
        // only if the game registered a sound collaborator
        if let Some(f) = &self.impact_sound {
            if let Err(err) = f.call1(&JsValue::NULL, &JsValue::from_f64(intensity)) {
                console_warn!("impact sound failed: {:?}", err);
            }
        }
    }

    fn play_squeaky_slide(&mut self) {
        if let Err(err) = self.squeak() {
            console_warn!("squeak failed: {:?}", err);
        }
    }

    fn shake_screen(&mut self, intensity: f64) {
        let Some(root) = self.root() else {
            return;
        };
        root.style()
            .set_property("--splat-shake-intensity", &format!("{:.1}px", intensity))
            .ok();
        if root.class_list().add_1(SHAKE_CLASS).is_err() {
            return;
        }
        let revert = Closure::once_into_js(move || {
            root.class_list().remove_1(SHAKE_CLASS).ok();
        });
        if let Some(win) = window() {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                revert.unchecked_ref(),
                SHAKE_MS as i32,
            );
        }
    }
}

// --- JS facing handle --------------------------------------------------------

type Sequencer = LaunchSequencer<DomOverlay, DomEffects>;

/// State shared between a `KidLauncher` and its frame / timer callbacks.
///
/// Animation frames give smooth phase timing while the tab is visible; the
/// one-shot timer is armed for the next due phase so the sequence still
/// reaches cleanup when frames are paused (hidden tab). The callbacks only
/// hold a `Weak`, so freeing the handle from JS frees everything.
struct Driver {
    sequencer: RefCell<Sequencer>,
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    timer: RefCell<Option<Closure<dyn FnMut()>>>,
    frame_request: Cell<Option<i32>>, // pending requestAnimationFrame handle
    timeout: Cell<Option<i32>>,       // pending setTimeout handle
}

impl Driver {
    fn new(sequencer: Sequencer) -> Rc<Self> {
        let driver = Rc::new(Self {
            sequencer: RefCell::new(sequencer),
            frame: RefCell::new(None),
            timer: RefCell::new(None),
            frame_request: Cell::new(None),
            timeout: Cell::new(None),
        });

        let weak: Weak<Self> = Rc::downgrade(&driver);
        *driver.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if let Some(d) = weak.upgrade() {
                d.frame_request.set(None);
                d.advance(ts);
            }
        }) as Box<dyn FnMut(f64)>));

        let weak: Weak<Self> = Rc::downgrade(&driver);
        *driver.timer.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(d) = weak.upgrade() {
                d.timeout.set(None);
                d.advance(performance_now());
            }
        }) as Box<dyn FnMut()>));

        driver
    }

    /// Ticks the sequencer and keeps both drivers armed while it plays.
    fn advance(&self, now: f64) {
        let next = match self.sequencer.try_borrow_mut() {
            Ok(mut seq) => {
                seq.tick(now);
                seq.next_due_in(now)
            }
            Err(_) => Some(0.0), // busy; try again shortly
        };
        if let Some(delay) = next {
            self.request_frame();
            self.arm_timer(delay);
        }
    }

    /// Re-arms from scratch after a launch; a timer left over from an earlier
    /// run may be waiting on a later offset.
    fn kick(&self) {
        if let (Some(w), Some(handle)) = (window(), self.timeout.take()) {
            w.clear_timeout_with_handle(handle);
        }
        self.advance(performance_now());
    }

    fn request_frame(&self) {
        if self.frame_request.get().is_some() {
            return;
        }
        if let (Some(w), Some(cb)) = (window(), self.frame.borrow().as_ref()) {
            if let Ok(handle) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                self.frame_request.set(Some(handle));
            }
        }
    }

    fn arm_timer(&self, delay_ms: f64) {
        if self.timeout.get().is_some() {
            return;
        }
        if let (Some(w), Some(cb)) = (window(), self.timer.borrow().as_ref()) {
            if let Ok(handle) = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms.ceil() as i32,
            ) {
                self.timeout.set(Some(handle));
            }
        }
    }

    fn cancel(&self) {
        let Some(w) = window() else {
            return;
        };
        if let Some(handle) = self.frame_request.take() {
            let _ = w.cancel_animation_frame(handle);
        }
        if let Some(handle) = self.timeout.take() {
            w.clear_timeout_with_handle(handle);
        }
    }
}

fn load_config(json: Option<&str>) -> Result<LauncherConfig, JsValue> {
    match json {
        #[cfg(feature = "serde_json")]
        Some(json) => LauncherConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string())),
        #[cfg(not(feature = "serde_json"))]
        Some(_) => {
            console_warn!("launcher config ignored: built without the serde_json feature");
            Ok(LauncherConfig::default())
        }
        None => Ok(LauncherConfig::default()),
    }
}

fn parse_color(label: &str, value: Option<&str>) -> Option<Rgb> {
    match Rgb::parse_hex(value?) {
        Ok(rgb) => Some(rgb),
        Err(err) => {
            console_warn!("{} falls back to default: {}", label, err);
            None
        }
    }
}

/// Maps a point in the world canvas' native pixel space to viewport pixels
/// using the canvas' displayed bounding box.
fn world_mapping(doc: &Document, canvas_id: &str) -> WorldMapping {
    let Some(canvas) = doc
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    else {
        console_warn!("render surface '{}' not found; using raw coordinates", canvas_id);
        return WorldMapping::identity();
    };
    let rect = canvas.get_bounding_client_rect();
    WorldMapping {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
        native_width: canvas.width() as f64,
        native_height: canvas.height() as f64,
    }
}

/// JS handle owning one launch sequencer. Construct once and keep it around.
#[wasm_bindgen]
pub struct KidLauncher {
    driver: Rc<Driver>,
}

#[wasm_bindgen]
impl KidLauncher {
    /// `config_json` is a partial `LauncherConfig` object (needs the
    /// `serde_json` feature); `impact_sound` is called with the impact intensity.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        impact_sound: Option<js_sys::Function>,
    ) -> Result<KidLauncher, JsValue> {
        let config = load_config(config_json.as_deref())?;
        let overlay = DomOverlay::new(&config.overlay_id)?;
        let effects = DomEffects::new(&config.root_id, impact_sound)?;
        let driver = Driver::new(LaunchSequencer::new(overlay, effects, config));
        Ok(KidLauncher { driver })
    }

    /// Starts the splat from world coordinates `(x, y)`. Ignored while a
    /// sequence is already playing.
    pub fn launch(
        &self,
        x: f64,
        y: f64,
        skin_tone: Option<String>,
        hair_color: Option<String>,
        on_complete: Option<js_sys::Function>,
    ) -> Result<(), JsValue> {
        let Ok(mut seq) = self.driver.sequencer.try_borrow_mut() else {
            console_warn!("launch ignored: sequencer busy");
            return Ok(());
        };
        if seq.is_playing() {
            console_log!("launch ignored: splat sequence already playing");
            return Ok(());
        }
        let doc = document()?;
        let origin = world_mapping(&doc, &seq.config().world_canvas_id).to_viewport(Point::new(x, y));
        let appearance = Appearance::with_overrides(
            parse_color("skin tone", skin_tone.as_deref()),
            parse_color("hair colour", hair_color.as_deref()),
        );
        // defer so JS can launch again from inside its callback
        let done = on_complete.map(|f| {
            Box::new(move || {
                if let Some(win) = window() {
                    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(&f, 0);
                }
            }) as OnComplete
        });
        seq.launch(origin, Some(appearance), done, performance_now());
        let playing = seq.is_playing();
        drop(seq);

        if playing {
            self.driver.kick();
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.driver
            .sequencer
            .try_borrow()
            .map(|s| s.is_playing())
            .unwrap_or(true)
    }

    /// Tears the current sequence down immediately (fires the callback).
    pub fn cleanup(&self) {
        if let Ok(mut seq) = self.driver.sequencer.try_borrow_mut() {
            seq.cleanup();
        }
    }
}

impl Drop for KidLauncher {
    fn drop(&mut self) {
        // nothing may call into the closures once the driver is gone
        self.driver.cancel();
    }
}

#[wasm_bindgen(js_name = darkenColor)]
pub fn darken_color_js(hex: &str, percent: f64) -> Result<String, JsValue> {
    crate::launcher::markup::darken_color(hex, percent).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_launch_arms_frame_and_timer() {
        let launcher = KidLauncher::new(None, None).unwrap();
        launcher.launch(10.0, 10.0, None, None, None).unwrap();
        assert!(launcher.is_playing());
        assert!(launcher.driver.frame_request.get().is_some());
        assert!(launcher.driver.timeout.get().is_some());
        launcher.cleanup();
    }

    #[wasm_bindgen_test]
    fn test_dropping_launcher_frees_driver() {
        let launcher = KidLauncher::new(None, None).unwrap();
        launcher.launch(10.0, 10.0, None, None, None).unwrap();
        assert_eq!(Rc::strong_count(&launcher.driver), 1);
        let weak = Rc::downgrade(&launcher.driver);
        drop(launcher);
        assert!(weak.upgrade().is_none());
    }
}
