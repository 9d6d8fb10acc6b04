//! Comment panel and its reveal sequence
//!
//! Revealing runs as a single [`AnimationTask`] keyed on the panel's alpha
//! channel, stepping through:
//!
//! ```text
//! Idle -> ClearingPrior -> PreviewFadeIn -> PanelFadeIn -> SpawningComments -> Settled
//! ```
//!
//! Because the close fade uses the same key, a reveal and a close always
//! supersede each other, and a second reveal cancels the first before it
//! clears the container.

use crate::error::FeedError;
use crate::presenter::ViewContext;
use std::cell::Cell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;
use sunfeed_animation::{AnimationTask, Delay, Easing, Fade, ScaleTo, TaskKey, TaskStatus};
use sunfeed_core::{PrefabKind, Renderer, Slot, ViewHandle};

/// Text shown in place of comments when a post has none
pub const EMPTY_COMMENTS_PLACEHOLDER: &str = "No comments yet.";

/// Where the reveal sequence currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevealPhase {
    #[default]
    Idle,
    ClearingPrior,
    PreviewFadeIn,
    PanelFadeIn,
    SpawningComments,
    Settled,
}

/// The shared overlay listing one post's comments
#[derive(Debug)]
pub struct CommentPanel {
    panel: ViewHandle,
    preview: Option<ViewHandle>,
    container: Option<ViewHandle>,
    close_button: Option<ViewHandle>,
    phase: Rc<Cell<RevealPhase>>,
}

impl CommentPanel {
    /// Resolve the panel's slots and hide it
    pub fn attach(renderer: &mut dyn Renderer, panel: ViewHandle) -> Self {
        let find = |slot: Slot| {
            let handle = renderer.find_child(panel, slot);
            if handle.is_none() {
                tracing::debug!(
                    "{}",
                    FeedError::MissingAsset(format!("comment panel has no {} slot", slot.name()))
                );
            }
            handle
        };
        let preview = find(Slot::Preview);
        let container = find(Slot::CommentContainer);
        let close_button = find(Slot::CloseButton);

        hide(renderer, panel);
        Self {
            panel,
            preview,
            container,
            close_button,
            phase: Rc::new(Cell::new(RevealPhase::Idle)),
        }
    }

    /// Show `content` and its `comments`, replacing anything already shown
    pub fn reveal(&self, ctx: &mut ViewContext<'_>, content: &str, comments: &[String]) {
        let anim = &ctx.config.animation;
        let queue: VecDeque<String> = if comments.is_empty() {
            VecDeque::from([EMPTY_COMMENTS_PLACEHOLDER.to_string()])
        } else {
            comments.iter().cloned().collect()
        };

        tracing::debug!("CommentPanel: revealing {} entries", queue.len());
        let task = CommentReveal {
            panel: self.panel,
            preview: self.preview,
            container: self.container,
            content: content.to_string(),
            queue,
            timing: RevealTiming {
                preview_fade_ms: anim.preview_fade_ms,
                fade_ms: anim.fade_ms,
                spawn_ms: anim.comment_spawn_ms,
                spawn_delay_ms: anim.comment_spawn_delay_ms,
            },
            step: Step::Clearing,
            phase: Rc::clone(&self.phase),
        };
        ctx.scheduler
            .start(TaskKey::alpha(self.panel), task, ctx.renderer);
    }

    /// Fade the panel out from its current opacity
    pub fn close(&self, ctx: &mut ViewContext<'_>) {
        let fade_ms = ctx.config.animation.fade_ms;
        ctx.scheduler
            .fade_panel(ctx.renderer, self.panel, false, fade_ms);
        self.phase.set(RevealPhase::Idle);
        tracing::debug!("CommentPanel: closing");
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase.get()
    }

    /// Texts of the comment entries currently in the container, in order
    pub fn comment_texts(&self, renderer: &dyn Renderer) -> Vec<String> {
        let Some(container) = self.container else {
            return Vec::new();
        };
        renderer
            .children(container)
            .into_iter()
            .filter_map(|child| renderer.text(child))
            .collect()
    }

    pub fn panel(&self) -> ViewHandle {
        self.panel
    }

    pub fn preview(&self) -> Option<ViewHandle> {
        self.preview
    }

    pub fn container(&self) -> Option<ViewHandle> {
        self.container
    }

    pub fn close_button(&self) -> Option<ViewHandle> {
        self.close_button
    }
}

fn hide(renderer: &mut dyn Renderer, panel: ViewHandle) {
    renderer.set_alpha(panel, 0.0);
    renderer.set_interactive(panel, false);
    renderer.set_hit_testable(panel, false);
}

#[derive(Clone, Copy, Debug)]
struct RevealTiming {
    preview_fade_ms: f32,
    fade_ms: f32,
    spawn_ms: f32,
    spawn_delay_ms: f32,
}

#[derive(Debug)]
enum Step {
    Clearing,
    Preview(Fade),
    Panel(Fade),
    Spawn { fade: Fade, scale: ScaleTo },
    Wait(Delay),
    Settled,
}

/// The reveal sequence as one resumable task
struct CommentReveal {
    panel: ViewHandle,
    preview: Option<ViewHandle>,
    container: Option<ViewHandle>,
    content: String,
    queue: VecDeque<String>,
    timing: RevealTiming,
    step: Step,
    phase: Rc<Cell<RevealPhase>>,
}

impl CommentReveal {
    /// Enter the steps following the current one until one needs time to pass
    fn advance(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        loop {
            let finished = mem::replace(&mut self.step, Step::Settled);
            let (next, status) = self.begin_after(finished, renderer);
            let settled = matches!(next, Step::Settled);
            self.step = next;

            if settled {
                self.phase.set(RevealPhase::Settled);
                tracing::debug!("CommentReveal: settled");
                return TaskStatus::Done;
            }
            if status == TaskStatus::InProgress {
                return TaskStatus::InProgress;
            }
        }
    }

    fn begin_after(&mut self, finished: Step, renderer: &mut dyn Renderer) -> (Step, TaskStatus) {
        match finished {
            Step::Clearing => match self.preview {
                Some(preview) => {
                    self.phase.set(RevealPhase::PreviewFadeIn);
                    renderer.set_text(preview, &self.content);
                    let mut fade = Fade::new(preview, 0.0, 1.0, self.timing.preview_fade_ms);
                    let status = fade.start(renderer);
                    (Step::Preview(fade), status)
                }
                None => self.begin_panel(renderer),
            },
            Step::Preview(_) => self.begin_panel(renderer),
            Step::Panel(_) => self.begin_spawn(renderer),
            Step::Spawn { .. } => {
                if self.queue.is_empty() {
                    return (Step::Settled, TaskStatus::Done);
                }
                let delay = Delay::new(self.timing.spawn_delay_ms);
                let status = if delay.is_elapsed() {
                    TaskStatus::Done
                } else {
                    TaskStatus::InProgress
                };
                (Step::Wait(delay), status)
            }
            Step::Wait(_) => self.begin_spawn(renderer),
            Step::Settled => (Step::Settled, TaskStatus::Done),
        }
    }

    fn begin_panel(&mut self, renderer: &mut dyn Renderer) -> (Step, TaskStatus) {
        self.phase.set(RevealPhase::PanelFadeIn);
        let mut fade = Fade::new(self.panel, 0.0, 1.0, self.timing.fade_ms)
            .with_easing(Easing::EaseOut)
            .with_interactivity(true);
        let status = fade.start(renderer);
        (Step::Panel(fade), status)
    }

    fn begin_spawn(&mut self, renderer: &mut dyn Renderer) -> (Step, TaskStatus) {
        let Some(text) = self.queue.pop_front() else {
            return (Step::Settled, TaskStatus::Done);
        };
        let Some(container) = self.container else {
            tracing::debug!(
                "{}",
                FeedError::MissingAsset("comment panel has no comment_container slot".into())
            );
            self.queue.clear();
            return (Step::Settled, TaskStatus::Done);
        };

        self.phase.set(RevealPhase::SpawningComments);
        let entry = renderer.instantiate(PrefabKind::Comment, container);
        renderer.set_text(entry, &text);
        let original = renderer.scale(entry).unwrap_or(1.0);

        let mut fade = Fade::new(entry, 0.0, 1.0, self.timing.spawn_ms);
        let mut scale = ScaleTo::new(entry, 0.0, original, self.timing.spawn_ms);
        let faded = fade.start(renderer);
        let scaled = scale.start(renderer);
        let status = if faded.is_done() && scaled.is_done() {
            TaskStatus::Done
        } else {
            TaskStatus::InProgress
        };
        (Step::Spawn { fade, scale }, status)
    }
}

impl AnimationTask for CommentReveal {
    fn name(&self) -> &'static str {
        "comment_reveal"
    }

    fn start(&mut self, renderer: &mut dyn Renderer) -> TaskStatus {
        self.phase.set(RevealPhase::ClearingPrior);
        if let Some(container) = self.container {
            for child in renderer.children(container) {
                renderer.destroy(child);
            }
        }
        hide(renderer, self.panel);
        self.step = Step::Clearing;
        self.advance(renderer)
    }

    fn resume(&mut self, dt_ms: f32, renderer: &mut dyn Renderer) -> TaskStatus {
        let status = match &mut self.step {
            Step::Clearing => TaskStatus::Done,
            Step::Preview(fade) | Step::Panel(fade) => fade.resume(dt_ms, renderer),
            Step::Spawn { fade, scale } => {
                let faded = fade.resume(dt_ms, renderer);
                let scaled = scale.resume(dt_ms, renderer);
                if faded.is_done() && scaled.is_done() {
                    TaskStatus::Done
                } else {
                    TaskStatus::InProgress
                }
            }
            Step::Wait(delay) => {
                if delay.advance(dt_ms) {
                    TaskStatus::Done
                } else {
                    TaskStatus::InProgress
                }
            }
            Step::Settled => return TaskStatus::Done,
        };

        if status.is_done() {
            self.advance(renderer)
        } else {
            TaskStatus::InProgress
        }
    }

    fn cancel(&mut self, renderer: &mut dyn Renderer) {
        match &mut self.step {
            // The panel never became visible; keep it hidden
            Step::Clearing => hide(renderer, self.panel),
            Step::Preview(fade) => {
                fade.cancel(renderer);
                hide(renderer, self.panel);
            }
            // Completes to fully visible and interactive
            Step::Panel(fade) => fade.cancel(renderer),
            Step::Spawn { fade, scale } => {
                fade.cancel(renderer);
                scale.cancel(renderer);
            }
            Step::Wait(_) | Step::Settled => {}
        }

        let discarded = self.queue.len();
        self.queue.clear();
        self.step = Step::Settled;
        self.phase.set(RevealPhase::Idle);
        tracing::debug!("CommentReveal: cancelled, {} entries discarded", discarded);
    }
}
