//! Schedulable animation tasks
//!
//! A task is a resumable unit of work driven by the scheduler tick. Each
//! task is registered under a [`TaskKey`], the (target, property) pair it
//! owns. At most one task owns a key at any time.

use sunfeed_core::{Renderer, ViewHandle};

/// The visual property a task writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Alpha,
    Scale,
    Color,
    Text,
}

/// Ownership key for a running task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub target: ViewHandle,
    pub channel: Channel,
}

impl TaskKey {
    pub fn new(target: ViewHandle, channel: Channel) -> Self {
        Self { target, channel }
    }

    pub fn alpha(target: ViewHandle) -> Self {
        Self::new(target, Channel::Alpha)
    }

    pub fn scale(target: ViewHandle) -> Self {
        Self::new(target, Channel::Scale)
    }

    pub fn color(target: ViewHandle) -> Self {
        Self::new(target, Channel::Color)
    }

    pub fn text(target: ViewHandle) -> Self {
        Self::new(target, Channel::Text)
    }
}

/// Result of starting or resuming a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

/// A cooperative, cancellable animation
///
/// Mutations happen only inside `start`, `resume`, and `cancel`, so a
/// property is never observed half-written between ticks.
pub trait AnimationTask {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// Apply the initial state. Returning `Done` means the task finished
    /// immediately (zero duration) and will not be scheduled.
    fn start(&mut self, _renderer: &mut dyn Renderer) -> TaskStatus {
        TaskStatus::InProgress
    }

    /// Advance by `dt_ms` milliseconds
    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus;

    /// Called once when the task is superseded or cancelled. Implementations
    /// leave their properties at a settled value; the task is never resumed
    /// afterwards.
    fn cancel(&mut self, renderer: &mut dyn Renderer);
}
