//! Kid launch splat sequence.
//!
//! When a launched kid leaves the slingshot towards the player, a
//! [`LaunchSequencer`] plays a fixed ~3.5 s cartoon on the overlay layer:
//!
//! - fly-in: the kid spins towards the viewport centre while growing
//! - impact: flattened splat with overshoot, crack overlay, shake + thud
//! - settle: elastic ease back to a slightly squashed pose
//! - wobble: six decaying jiggle steps, smear overlay appears
//! - slide: the splat peels down the glass leaving three drool trails
//! - cleanup: every transient element removed, completion callback fired
//!
//! The sequencer owns no clock. It is anchored at the `now_ms` passed to
//! [`LaunchSequencer::launch`] and advanced by [`LaunchSequencer::tick`]; the
//! browser feeds it `requestAnimationFrame` timestamps plus a one-shot timer
//! armed for [`LaunchSequencer::next_due_in`], tests a virtual clock.

pub mod markup;
pub mod motion;
pub mod surface;
pub mod timeline;

use crate::config::LauncherConfig;
use markup::{
    Appearance, create_flying_figure_markup, create_impact_figure_markup, crack_overlay_markup,
    drool_trail_markup, smear_overlay_markup,
};
use motion::{Point, wobble_frame};
use surface::{
    EffectHooks, ElementId, ElementKind, ElementSpec, Easing, Keyframes, NoEffects, OverlaySurface,
    Pose, SurfaceError,
};
use timeline::{
    DROOL_GROW_MS, DROOL_TRAILS, FLY_IN_MS, IMPACT_MS, Phase, SETTLE_MS, SLIDE_MS, Timeline,
    WOBBLE_INTERVAL_MS,
};

/// Completion callback handed to `launch`.
pub type OnComplete = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SequenceState {
    #[default]
    Idle,
    Playing,
}

// Settled / overshoot scales of the splat figure.
const SPLAT_START_SCALE: f64 = 0.05;
const SPLAT_OVERSHOOT: (f64, f64) = (1.3, 0.7);
const SPLAT_SETTLED: (f64, f64) = (1.1, 0.85);
const SLIDE_END_SCALE: (f64, f64) = (0.95, 1.05);
const SLIDE_END_ROTATE_DEG: f64 = 4.0;
const SLIDE_END_OPACITY: f64 = 0.9;
const DROOL_WIDTH: f64 = 10.0;

/// Per-run bookkeeping: where the splat lands and which elements exist.
#[derive(Debug, Default)]
struct RunState {
    appearance: Appearance,
    center: Point,
    viewport: (f64, f64),
    flying: Option<ElementId>,
    splat: Option<ElementId>,
    crack: Option<ElementId>,
    smear: Option<ElementId>,
    drool: [Option<ElementId>; DROOL_TRAILS as usize],
}

impl RunState {
    fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        [self.flying, self.splat, self.crack, self.smear]
            .into_iter()
            .chain(self.drool)
            .flatten()
    }
}

/// Plays the launch splat on an [`OverlaySurface`]. At most one sequence runs
/// at a time; launches while playing are ignored.
pub struct LaunchSequencer<S: OverlaySurface, E: EffectHooks = NoEffects> {
    surface: S,
    effects: E,
    config: LauncherConfig,
    state: SequenceState,
    timeline: Option<Timeline>,
    run: RunState,
    on_complete: Option<OnComplete>,
}

impl<S: OverlaySurface> LaunchSequencer<S, NoEffects> {
    /// Sequencer without sound or shake.
    pub fn silent(surface: S, config: LauncherConfig) -> Self {
        Self::new(surface, NoEffects, config)
    }
}

impl<S: OverlaySurface, E: EffectHooks> LaunchSequencer<S, E> {
    pub fn new(surface: S, effects: E, config: LauncherConfig) -> Self {
        Self {
            surface,
            effects,
            config,
            state: SequenceState::Idle,
            timeline: None,
            run: RunState::default(),
            on_complete: None,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SequenceState::Playing
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    /// Starts the sequence with the kid appearing at `origin` (viewport px).
    /// Ignored while a sequence is already playing.
    pub fn launch(
        &mut self,
        origin: Point,
        appearance: Option<Appearance>,
        on_complete: Option<OnComplete>,
        now_ms: f64,
    ) {
        if self.is_playing() {
            console_log!("launch ignored: splat sequence already playing");
            return;
        }
        let (vw, vh) = self.surface.viewport();
        self.run = RunState {
            appearance: appearance.unwrap_or_default(),
            center: Point::new(vw / 2.0, vh / 2.0),
            viewport: (vw, vh),
            ..RunState::default()
        };
        self.on_complete = on_complete;
        self.timeline = Some(Timeline::new(now_ms));
        self.state = SequenceState::Playing;
        self.surface.show();
        self.fly_in(origin);
    }

    /// Runs every phase that became due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        while let Some(phase) = self.timeline.as_mut().and_then(|t| t.pop_due(now_ms)) {
            self.run_phase(phase);
        }
    }

    /// Milliseconds from `now_ms` until the next phase is due (0 when overdue),
    /// `None` when nothing is scheduled. Lets a timer drive the sequence when
    /// animation frames are paused.
    pub fn next_due_in(&self, now_ms: f64) -> Option<f64> {
        let at = self.timeline.as_ref()?.next_due_at()?;
        Some((at - now_ms).max(0.0))
    }

    /// Removes every transient element, hides the overlay, returns to Idle and
    /// fires the completion callback. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        let run = std::mem::take(&mut self.run);
        for id in run.element_ids() {
            if let Err(err) = self.surface.remove_element(id) {
                console_warn!("cleanup: {}", err);
            }
        }
        self.surface.hide();
        self.timeline = None;
        self.state = SequenceState::Idle;
        if let Some(done) = self.on_complete.take() {
            done();
        }
    }

    fn run_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Impact => self.impact(),
            Phase::Settle => self.settle(),
            Phase::Wobble(step) => self.wobble(step),
            Phase::SlideDown => self.slide_down(),
            Phase::DroolSpawn(i) => self.drool_spawn(i),
            Phase::DroolGrow(i) => self.drool_grow(i),
            Phase::Cleanup => self.cleanup(),
        }
    }

    // --- Phases ---------------------------------------------------------------

    fn fly_in(&mut self, origin: Point) {
        let markup = create_flying_figure_markup(&self.run.appearance);
        let start = Pose::at(origin.x, origin.y).uniform(self.config.fly_start_scale);
        let width = self.config.figure_size;
        self.run.flying = self.spawn(ElementKind::FlyingFigure, markup, start, width);
        if let Some(id) = self.run.flying {
            let to = self.fly_end_pose();
            let res = self.surface.animate(id, Keyframes::between(start, to), FLY_IN_MS, Easing::EaseIn);
            self.report("fly-in", res);
        }
    }

    fn impact(&mut self) {
        if let Some(id) = self.run.flying {
            let hidden = self.fly_end_pose().with_opacity(0.0);
            let res = self.surface.animate(id, Keyframes::to(hidden), 0.0, Easing::Linear);
            self.report("hide flying figure", res);
        }

        let Point { x, y } = self.run.center;
        let markup = create_impact_figure_markup(&self.run.appearance);
        let start = Pose::at(x, y).uniform(SPLAT_START_SCALE);
        let width = self.config.figure_size * 1.4;
        self.run.splat = self.spawn(ElementKind::SplatFigure, markup, start, width);
        if let Some(id) = self.run.splat {
            let (sx, sy) = SPLAT_OVERSHOOT;
            let res = self.surface.animate(
                id,
                Keyframes::between(start, Pose::at(x, y).scaled(sx, sy)),
                IMPACT_MS,
                Easing::EaseOut,
            );
            self.report("impact", res);
        }

        let (vw, _) = self.run.viewport;
        self.run.crack = self.spawn(ElementKind::CrackOverlay, crack_overlay_markup(), self.fullscreen_pose(), vw);

        self.effects.shake_screen(self.config.shake_intensity);
        self.effects.play_impact(self.config.impact_intensity);
    }

    fn settle(&mut self) {
        let Some(id) = self.run.splat else {
            console_warn!("settle skipped: splat figure missing");
            return;
        };
        let (sx, sy) = SPLAT_SETTLED;
        let to = Pose::at(self.run.center.x, self.run.center.y).scaled(sx, sy);
        let res = self.surface.animate(id, Keyframes::to(to), SETTLE_MS, Easing::Elastic);
        self.report("settle", res);
    }

    fn wobble(&mut self, step: u8) {
        if step == 0 {
            let (vw, _) = self.run.viewport;
            self.run.smear = self.spawn(ElementKind::SmearOverlay, smear_overlay_markup(), self.fullscreen_pose(), vw);
        }
        let Some(id) = self.run.splat else {
            console_warn!("wobble {} skipped: splat figure missing", step);
            return;
        };
        let frame = wobble_frame(step);
        let to = Pose::at(self.run.center.x, self.run.center.y)
            .scaled(frame.scale_x, frame.scale_y)
            .rotated(frame.rotate_deg);
        let res = self.surface.animate(id, Keyframes::to(to), WOBBLE_INTERVAL_MS, Easing::Linear);
        self.report("wobble", res);
    }

    fn slide_down(&mut self) {
        self.effects.play_squeaky_slide();
        let Some(id) = self.run.splat else {
            console_warn!("slide skipped: splat figure missing");
            return;
        };
        let (_, vh) = self.run.viewport;
        let (sx, sy) = SLIDE_END_SCALE;
        let to = Pose::at(self.run.center.x, self.run.center.y + vh * self.config.slide_ratio)
            .scaled(sx, sy)
            .rotated(SLIDE_END_ROTATE_DEG)
            .with_opacity(SLIDE_END_OPACITY);
        let res = self.surface.animate(id, Keyframes::to(to), SLIDE_MS, Easing::EaseIn);
        self.report("slide", res);
    }

    fn drool_spawn(&mut self, i: u8) {
        let idx = i as usize;
        let start = self.drool_pose(i).with_height(0.0);
        self.run.drool[idx] = self.spawn(ElementKind::DroolTrail(i), drool_trail_markup(), start, DROOL_WIDTH);
    }

    fn drool_grow(&mut self, i: u8) {
        let Some(id) = self.run.drool[i as usize] else {
            console_warn!("drool {} skipped: trail missing", i);
            return;
        };
        let (_, vh) = self.run.viewport;
        let to = self.drool_pose(i).with_height(vh * self.config.drool_height_ratio);
        let res = self.surface.animate(id, Keyframes::to(to), DROOL_GROW_MS, Easing::EaseOut);
        self.report("drool", res);
    }

    // --- Helpers --------------------------------------------------------------

    fn fly_end_pose(&self) -> Pose {
        Pose::at(self.run.center.x, self.run.center.y)
            .uniform(self.config.fly_end_scale)
            .rotated(360.0)
    }

    fn fullscreen_pose(&self) -> Pose {
        Pose::at(self.run.center.x, self.run.center.y)
    }

    fn drool_pose(&self, i: u8) -> Pose {
        // trails start just under the splat's chin
        let x = self.run.center.x + self.config.drool_offsets[i as usize % self.config.drool_offsets.len()];
        let y = self.run.center.y + self.config.figure_size * 0.3;
        Pose::at(x, y)
    }

    fn spawn(&mut self, kind: ElementKind, markup: String, pose: Pose, width: f64) -> Option<ElementId> {
        match self.surface.add_element(ElementSpec { kind, markup, pose, width }) {
            Ok(id) => Some(id),
            Err(err) => {
                console_warn!("could not create {:?}: {}", kind, err);
                None
            }
        }
    }

    fn report(&self, what: &str, res: Result<(), SurfaceError>) {
        if let Err(err) = res {
            console_warn!("{} skipped: {}", what, err);
        }
    }
}
