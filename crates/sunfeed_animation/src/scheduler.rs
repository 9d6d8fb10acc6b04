//! Animation scheduler
//!
//! Owns every in-flight [`AnimationTask`] and resumes them once per tick.
//! Tasks are registered under a [`TaskKey`]; registering a second task on
//! the same key supersedes the first, which is cancelled before the new
//! task applies its initial state.
//!
//! The scheduler is single-threaded and driven by an external tick source:
//! call [`AnimationScheduler::tick`] with the frame delta, or
//! [`AnimationScheduler::tick_elapsed`] to measure it from a monotonic clock.

use crate::task::{AnimationTask, TaskKey, TaskStatus};
use crate::tween::{ColorTween, CountTween, Fade, PulseScale};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::time::Instant;
use sunfeed_core::{Color, Renderer, ViewHandle};

new_key_type! {
    /// Handle to a registered task
    pub struct TaskId;
}

struct ScheduledTask {
    key: TaskKey,
    task: Box<dyn AnimationTask>,
}

/// The cooperative scheduler that ticks all active tasks
pub struct AnimationScheduler {
    tasks: SlotMap<TaskId, ScheduledTask>,
    owners: FxHashMap<TaskKey, TaskId>,
    last_frame: Option<Instant>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            owners: FxHashMap::default(),
            last_frame: None,
        }
    }

    /// Register a task under `key`, superseding any task that owns it
    ///
    /// Returns `None` when the task completed during `start` (zero duration)
    /// and was therefore never scheduled.
    pub fn start<T>(&mut self, key: TaskKey, task: T, renderer: &mut dyn Renderer) -> Option<TaskId>
    where
        T: AnimationTask + 'static,
    {
        self.start_boxed(key, Box::new(task), renderer)
    }

    pub fn start_boxed(
        &mut self,
        key: TaskKey,
        mut task: Box<dyn AnimationTask>,
        renderer: &mut dyn Renderer,
    ) -> Option<TaskId> {
        self.supersede(key, renderer);

        if task.start(renderer) == TaskStatus::Done {
            tracing::trace!("AnimationScheduler: {} finished on start", task.name());
            return None;
        }

        if self.last_frame.is_none() {
            // Avoid a huge first delta when the clock has been idle
            self.last_frame = Some(Instant::now());
        }

        let id = self.tasks.insert(ScheduledTask { key, task });
        self.owners.insert(key, id);
        Some(id)
    }

    /// Cancel the task owning `key`, if any
    ///
    /// Returns true if a task was cancelled.
    pub fn supersede(&mut self, key: TaskKey, renderer: &mut dyn Renderer) -> bool {
        let Some(id) = self.owners.remove(&key) else {
            return false;
        };
        match self.tasks.remove(id) {
            Some(mut scheduled) => {
                tracing::debug!(
                    "AnimationScheduler: superseding {} on {:?}",
                    scheduled.task.name(),
                    key
                );
                scheduled.task.cancel(renderer);
                true
            }
            None => false,
        }
    }

    /// Cancel every task targeting `target`, on any channel
    pub fn cancel_target(&mut self, target: ViewHandle, renderer: &mut dyn Renderer) -> usize {
        let keys: Vec<TaskKey> = self
            .owners
            .keys()
            .filter(|key| key.target == target)
            .copied()
            .collect();
        keys.into_iter()
            .filter(|&key| self.supersede(key, renderer))
            .count()
    }

    /// Cancel every task
    pub fn cancel_all(&mut self, renderer: &mut dyn Renderer) {
        let keys: Vec<TaskKey> = self.owners.keys().copied().collect();
        for key in keys {
            self.supersede(key, renderer);
        }
    }

    /// Resume every task by `dt_ms` milliseconds and drop finished ones
    ///
    /// Returns true if any tasks are still active (need another tick).
    pub fn tick(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> bool {
        let ids: Vec<TaskId> = self.tasks.keys().collect();
        for id in ids {
            let Some(scheduled) = self.tasks.get_mut(id) else {
                continue;
            };
            if scheduled.task.resume(dt_ms, renderer) == TaskStatus::Done {
                let key = scheduled.key;
                self.tasks.remove(id);
                if self.owners.get(&key) == Some(&id) {
                    self.owners.remove(&key);
                }
            }
        }

        let active = !self.tasks.is_empty();
        if !active {
            self.last_frame = None;
        }
        active
    }

    /// Tick using the time elapsed since the previous call
    pub fn tick_elapsed(&mut self, renderer: &mut dyn Renderer) -> bool {
        let now = Instant::now();
        let dt_ms = self
            .last_frame
            .map(|last| (now - last).as_secs_f32() * 1000.0)
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.tick(dt_ms, renderer)
    }

    /// Check if any tasks are still active
    pub fn has_active_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of active tasks
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_active(&self, key: TaskKey) -> bool {
        self.owners.contains_key(&key)
    }

    /// Every target currently owned by a task
    pub fn targets(&self) -> Vec<ViewHandle> {
        self.owners.keys().map(|key| key.target).collect()
    }

    // =========================================================================
    // Primitive Operations
    // =========================================================================

    /// Fade `target` opacity from `from` to `to`
    pub fn fade(
        &mut self,
        renderer: &mut dyn Renderer,
        target: ViewHandle,
        from: f32,
        to: f32,
        duration_ms: f32,
    ) -> Option<TaskId> {
        let fade = Fade::new(target, from, to, duration_ms);
        self.start(TaskKey::alpha(target), fade, renderer)
    }

    /// Fade a panel in or out from its current opacity, toggling
    /// interactivity once the fade lands
    pub fn fade_panel(
        &mut self,
        renderer: &mut dyn Renderer,
        target: ViewHandle,
        visible: bool,
        duration_ms: f32,
    ) -> Option<TaskId> {
        let key = TaskKey::alpha(target);
        // Settle whatever owned the panel before sampling its opacity
        self.supersede(key, renderer);
        let from = renderer.alpha(target).unwrap_or(0.0);
        let to = if visible { 1.0 } else { 0.0 };
        let fade = Fade::new(target, from, to, duration_ms).with_interactivity(visible);
        self.start(key, fade, renderer)
    }

    /// Shrink `target` to `factor ×` its scale and back, over `duration_ms` total
    pub fn pulse_scale(
        &mut self,
        renderer: &mut dyn Renderer,
        target: ViewHandle,
        factor: f32,
        duration_ms: f32,
    ) -> Option<TaskId> {
        let key = TaskKey::scale(target);
        // Restore the original scale before the new pulse samples it
        self.supersede(key, renderer);
        self.start(key, PulseScale::new(target, factor, duration_ms), renderer)
    }

    /// Transition `target` color from its current value to `to`
    pub fn tween_color(
        &mut self,
        renderer: &mut dyn Renderer,
        target: ViewHandle,
        to: Color,
        duration_ms: f32,
    ) -> Option<TaskId> {
        let key = TaskKey::color(target);
        self.supersede(key, renderer);
        self.start(key, ColorTween::new(target, to, duration_ms), renderer)
    }

    /// Count `target` text from `from` to `to`
    pub fn tween_count(
        &mut self,
        renderer: &mut dyn Renderer,
        target: ViewHandle,
        from: i64,
        to: i64,
        duration_ms: f32,
    ) -> Option<TaskId> {
        let tween = CountTween::new(target, from, to, duration_ms);
        self.start(TaskKey::text(target), tween, renderer)
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunfeed_core::{MemoryRenderer, PrefabKind};

    fn setup() -> (MemoryRenderer, ViewHandle) {
        let mut renderer = MemoryRenderer::new();
        let root = renderer.root();
        let target = renderer.instantiate(PrefabKind::Comment, root);
        (renderer, target)
    }

    #[test]
    fn test_scheduler_tick() {
        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();

        scheduler.fade(&mut renderer, target, 0.0, 1.0, 100.0);
        assert!(scheduler.has_active_tasks());

        assert!(scheduler.tick(50.0, &mut renderer));
        assert!(scheduler.is_active(TaskKey::alpha(target)));

        assert!(!scheduler.tick(50.0, &mut renderer));
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(renderer.alpha(target), Some(1.0));
    }

    #[test]
    fn test_supersede_same_key() {
        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();

        scheduler.fade(&mut renderer, target, 0.0, 1.0, 100.0);
        scheduler.tick(50.0, &mut renderer);

        // The new fade replaces the old one; only one task owns the key
        scheduler.fade(&mut renderer, target, 1.0, 0.0, 100.0);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(renderer.alpha(target), Some(1.0));

        scheduler.tick(100.0, &mut renderer);
        assert_eq!(renderer.alpha(target), Some(0.0));
    }

    #[test]
    fn test_eased_fade() {
        use crate::easing::Easing;

        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();
        let fade = Fade::new(target, 0.0, 1.0, 100.0).with_easing(Easing::EaseOut);
        scheduler.start(TaskKey::alpha(target), fade, &mut renderer);

        scheduler.tick(50.0, &mut renderer);
        let alpha = renderer.alpha(target).unwrap();
        assert!((alpha - 0.75).abs() < 1e-4);

        assert!(!scheduler.tick(50.0, &mut renderer));
        assert_eq!(renderer.alpha(target), Some(1.0));
    }

    #[test]
    fn test_other_channels_unaffected() {
        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();

        scheduler.fade(&mut renderer, target, 0.0, 1.0, 100.0);
        scheduler.pulse_scale(&mut renderer, target, 0.9, 100.0);
        scheduler.tween_count(&mut renderer, target, 0, 3, 100.0);
        assert_eq!(scheduler.active_count(), 3);

        scheduler.pulse_scale(&mut renderer, target, 0.9, 100.0);
        assert_eq!(scheduler.active_count(), 3);
        assert!(scheduler.is_active(TaskKey::alpha(target)));
    }

    #[test]
    fn test_repeated_pulse_does_not_drift() {
        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();

        for _ in 0..5 {
            scheduler.pulse_scale(&mut renderer, target, 0.5, 200.0);
            scheduler.tick(60.0, &mut renderer);
        }
        while scheduler.tick(16.0, &mut renderer) {}

        assert_eq!(renderer.scale(target), Some(1.0));
    }

    #[test]
    fn test_zero_duration_not_scheduled() {
        let (mut renderer, target) = setup();
        let mut scheduler = AnimationScheduler::new();

        let id = scheduler.tween_count(&mut renderer, target, 0, 42, 0.0);
        assert!(id.is_none());
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(renderer.text(target).as_deref(), Some("42"));
    }

    #[test]
    fn test_cancel_target() {
        let (mut renderer, target) = setup();
        let root = renderer.root();
        let other = renderer.instantiate(PrefabKind::Comment, root);
        let mut scheduler = AnimationScheduler::new();

        scheduler.fade(&mut renderer, target, 0.0, 1.0, 100.0);
        scheduler.tween_color(&mut renderer, target, Color::LIKED, 100.0);
        scheduler.fade(&mut renderer, other, 0.0, 1.0, 100.0);

        assert_eq!(scheduler.cancel_target(target, &mut renderer), 2);
        assert_eq!(scheduler.targets(), vec![other]);
        // Cancelled tasks are clamped to their end values
        assert_eq!(renderer.alpha(target), Some(1.0));
        assert_eq!(renderer.color(target), Some(Color::LIKED));
    }

    #[test]
    fn test_fade_panel_from_current() {
        let (mut renderer, panel) = setup();
        let mut scheduler = AnimationScheduler::new();
        renderer.set_alpha(panel, 1.0);

        scheduler.fade_panel(&mut renderer, panel, false, 100.0);
        scheduler.tick(50.0, &mut renderer);
        assert!((renderer.alpha(panel).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(renderer.is_interactive(panel), Some(true));

        scheduler.tick(50.0, &mut renderer);
        assert_eq!(renderer.alpha(panel), Some(0.0));
        assert_eq!(renderer.is_interactive(panel), Some(false));
        assert_eq!(renderer.is_hit_testable(panel), Some(false));
    }
}
