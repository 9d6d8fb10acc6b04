//! Timed interpolation primitives
//!
//! Every primitive advances normalized time by `dt / duration` per tick,
//! writes the interpolated value, and clamps to the exact end value on the
//! final tick. A non-positive duration applies the end value in `start`.
//! Cancelling a primitive snaps it to its end value.

use crate::easing::Easing;
use crate::task::{AnimationTask, TaskStatus};
use crate::values::{lerp_rounded, Interpolate};
use sunfeed_core::{Color, Renderer, ViewHandle};

// ============================================================================
// Progress clock
// ============================================================================

/// Elapsed-time bookkeeping shared by all primitives
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    elapsed_ms: f32,
    duration_ms: f32,
    easing: Easing,
}

impl Progress {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            elapsed_ms: 0.0,
            duration_ms,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// True for zero or negative durations, which complete on start
    pub fn is_instant(&self) -> bool {
        self.duration_ms <= 0.0
    }

    /// Advance and return the eased progress
    pub fn advance(&mut self, dt_ms: f32) -> f32 {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms.max(0.0));
        self.eased()
    }

    pub fn eased(&self) -> f32 {
        self.easing.apply(self.raw())
    }

    /// Linear progress in `[0, 1]`
    pub fn raw(&self) -> f32 {
        if self.is_instant() {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.is_instant() || self.elapsed_ms >= self.duration_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

/// A fixed wait, used between steps of a sequence
#[derive(Clone, Copy, Debug)]
pub struct Delay {
    remaining_ms: f32,
}

impl Delay {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            remaining_ms: duration_ms.max(0.0),
        }
    }

    /// Consume `dt_ms`; returns true once the wait has elapsed
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.remaining_ms -= dt_ms.max(0.0);
        self.is_elapsed()
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}

// ============================================================================
// Fade
// ============================================================================

/// Opacity interpolation
///
/// With [`Fade::with_interactivity`] the target's interactive and
/// hit-testable flags are set once the fade lands on its end value.
#[derive(Clone, Debug)]
pub struct Fade {
    target: ViewHandle,
    from: f32,
    to: f32,
    progress: Progress,
    interactivity: Option<bool>,
}

impl Fade {
    pub fn new(target: ViewHandle, from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            target,
            from,
            to,
            progress: Progress::new(duration_ms),
            interactivity: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.progress = self.progress.with_easing(easing);
        self
    }

    pub fn with_interactivity(mut self, interactive: bool) -> Self {
        self.interactivity = Some(interactive);
        self
    }

    pub fn target(&self) -> ViewHandle {
        self.target
    }

    fn finish(&self, renderer: &mut dyn Renderer) {
        renderer.set_alpha(self.target, self.to);
        if let Some(interactive) = self.interactivity {
            renderer.set_interactive(self.target, interactive);
            renderer.set_hit_testable(self.target, interactive);
        }
    }
}

impl AnimationTask for Fade {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        if self.progress.is_instant() {
            self.finish(renderer);
            return TaskStatus::Done;
        }
        renderer.set_alpha(self.target, self.from);
        TaskStatus::InProgress
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let t = self.progress.advance(dt_ms);
        if self.progress.is_complete() {
            self.finish(renderer);
            return TaskStatus::Done;
        }
        renderer.set_alpha(self.target, self.from.lerp(&self.to, t));
        TaskStatus::InProgress
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        self.finish(renderer);
    }
}

// ============================================================================
// Scale
// ============================================================================

/// Uniform scale interpolation between two explicit values
#[derive(Clone, Debug)]
pub struct ScaleTo {
    target: ViewHandle,
    from: f32,
    to: f32,
    progress: Progress,
}

impl ScaleTo {
    pub fn new(target: ViewHandle, from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            target,
            from,
            to,
            progress: Progress::new(duration_ms),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.progress = self.progress.with_easing(easing);
        self
    }
}

impl AnimationTask for ScaleTo {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        if self.progress.is_instant() {
            renderer.set_scale(self.target, self.to);
            return TaskStatus::Done;
        }
        renderer.set_scale(self.target, self.from);
        TaskStatus::InProgress
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let t = self.progress.advance(dt_ms);
        if self.progress.is_complete() {
            renderer.set_scale(self.target, self.to);
            return TaskStatus::Done;
        }
        renderer.set_scale(self.target, self.from.lerp(&self.to, t));
        TaskStatus::InProgress
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        renderer.set_scale(self.target, self.to);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PulsePhase {
    Shrink,
    Restore,
}

/// Press feedback: scale down to `factor × original`, then back
///
/// `duration_ms` covers both phases, each taking half. The original scale
/// is read when the pulse starts and restored on completion or cancel.
#[derive(Clone, Debug)]
pub struct PulseScale {
    target: ViewHandle,
    factor: f32,
    original: f32,
    phase: PulsePhase,
    progress: Progress,
}

impl PulseScale {
    pub fn new(target: ViewHandle, factor: f32, duration_ms: f32) -> Self {
        Self {
            target,
            factor,
            original: 1.0,
            phase: PulsePhase::Shrink,
            progress: Progress::new(duration_ms / 2.0),
        }
    }

    fn pressed(&self) -> f32 {
        self.original * self.factor
    }
}

impl AnimationTask for PulseScale {
    fn name(&self) -> &'static str {
        "pulse_scale"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        self.original = renderer.scale(self.target).unwrap_or(1.0);
        if self.progress.is_instant() {
            renderer.set_scale(self.target, self.original);
            return TaskStatus::Done;
        }
        TaskStatus::InProgress
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let t = self.progress.advance(dt_ms);
        match self.phase {
            PulsePhase::Shrink => {
                if self.progress.is_complete() {
                    renderer.set_scale(self.target, self.pressed());
                    self.phase = PulsePhase::Restore;
                    self.progress.reset();
                } else {
                    renderer.set_scale(self.target, self.original.lerp(&self.pressed(), t));
                }
                TaskStatus::InProgress
            }
            PulsePhase::Restore => {
                if self.progress.is_complete() {
                    renderer.set_scale(self.target, self.original);
                    return TaskStatus::Done;
                }
                renderer.set_scale(self.target, self.pressed().lerp(&self.original, t));
                TaskStatus::InProgress
            }
        }
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        renderer.set_scale(self.target, self.original);
    }
}

// ============================================================================
// Color
// ============================================================================

/// Color interpolation from the target's current color
#[derive(Clone, Debug)]
pub struct ColorTween {
    target: ViewHandle,
    from: Color,
    to: Color,
    progress: Progress,
}

impl ColorTween {
    pub fn new(target: ViewHandle, to: Color, duration_ms: f32) -> Self {
        Self {
            target,
            from: to,
            to,
            progress: Progress::new(duration_ms),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.progress = self.progress.with_easing(easing);
        self
    }
}

impl AnimationTask for ColorTween {
    fn name(&self) -> &'static str {
        "tween_color"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        if self.progress.is_instant() {
            renderer.set_color(self.target, self.to);
            return TaskStatus::Done;
        }
        self.from = renderer.color(self.target).unwrap_or(self.to);
        TaskStatus::InProgress
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let t = self.progress.advance(dt_ms);
        if self.progress.is_complete() {
            renderer.set_color(self.target, self.to);
            return TaskStatus::Done;
        }
        renderer.set_color(self.target, self.from.lerp(&self.to, t));
        TaskStatus::InProgress
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        renderer.set_color(self.target, self.to);
    }
}

// ============================================================================
// Count
// ============================================================================

/// Integer counter rendered as text, always linear
#[derive(Clone, Debug)]
pub struct CountTween {
    target: ViewHandle,
    from: i64,
    to: i64,
    progress: Progress,
}

impl CountTween {
    pub fn new(target: ViewHandle, from: i64, to: i64, duration_ms: f32) -> Self {
        Self {
            target,
            from,
            to,
            progress: Progress::new(duration_ms),
        }
    }

    fn render(&self, renderer: &mut dyn Renderer, value: i64) {
        renderer.set_text(self.target, &value.to_string());
    }
}

impl AnimationTask for CountTween {
    fn name(&self) -> &'static str {
        "tween_count"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        if self.progress.is_instant() {
            self.render(renderer, self.to);
            return TaskStatus::Done;
        }
        self.render(renderer, self.from);
        TaskStatus::InProgress
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let t = self.progress.advance(dt_ms);
        if self.progress.is_complete() {
            self.render(renderer, self.to);
            return TaskStatus::Done;
        }
        self.render(renderer, lerp_rounded(self.from, self.to, t));
        TaskStatus::InProgress
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        self.render(renderer, self.to);
    }
}
