//! Post presenter
//!
//! Binds one [`Post`] to one post view, renders its fields into the view's
//! named slots, and drives the like interaction: state flip, persistence,
//! count tween, icon color transition and press pulse.

use crate::backend::KeyValueBackend;
use crate::comments::CommentPanel;
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::like_store::LikeStateStore;
use crate::post::Post;
use sunfeed_animation::AnimationScheduler;
use sunfeed_core::{Renderer, Slot, ViewHandle};

/// Everything a presenter needs to touch the view layer for one operation
pub struct ViewContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub scheduler: &'a mut AnimationScheduler,
    pub config: &'a FeedConfig,
}

/// Resolved slot handles of a post view; `None` where the prefab lacks one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostSlots {
    pub username: Option<ViewHandle>,
    pub content: Option<ViewHandle>,
    pub profile_pic: Option<ViewHandle>,
    pub timestamp: Option<ViewHandle>,
    pub like_button: Option<ViewHandle>,
    pub like_icon: Option<ViewHandle>,
    pub like_count: Option<ViewHandle>,
    pub comment_button: Option<ViewHandle>,
    pub comment_count: Option<ViewHandle>,
}

impl PostSlots {
    pub fn resolve(renderer: &dyn Renderer, view: ViewHandle) -> Self {
        let find = |slot: Slot| {
            let handle = renderer.find_child(view, slot);
            if handle.is_none() {
                tracing::debug!(
                    "{}",
                    FeedError::MissingAsset(format!("post view has no {} slot", slot.name()))
                );
            }
            handle
        };
        Self {
            username: find(Slot::Username),
            content: find(Slot::Content),
            profile_pic: find(Slot::ProfilePic),
            timestamp: find(Slot::Timestamp),
            like_button: find(Slot::LikeButton),
            like_icon: find(Slot::LikeIcon),
            like_count: find(Slot::LikeCount),
            comment_button: find(Slot::CommentButton),
            comment_count: find(Slot::CommentCount),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ViewHandle> {
        [
            self.username,
            self.content,
            self.profile_pic,
            self.timestamp,
            self.like_button,
            self.like_icon,
            self.like_count,
            self.comment_button,
            self.comment_count,
        ]
        .into_iter()
        .flatten()
    }
}

/// Outcome of a like toggle
#[derive(Debug)]
#[must_use]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: u32,
    /// Set when the new state could not be persisted; the in-memory state
    /// is kept and the write is retried on the next toggle
    pub warning: Option<FeedError>,
}

/// Binds one post to one view
#[derive(Debug)]
pub struct PostPresenter {
    post: Post,
    view: ViewHandle,
    slots: PostSlots,
    dirty: bool,
}

impl PostPresenter {
    /// Bind `post` to `view` and render it
    ///
    /// Persisted like state overrides the post's own values.
    pub fn bind<B: KeyValueBackend>(
        mut post: Post,
        view: ViewHandle,
        ctx: &mut ViewContext<'_>,
        store: &LikeStateStore<B>,
    ) -> Self {
        let record = store.get(post.id(), post.is_liked(), post.likes());
        post.set_like_state(record.liked, record.count);

        let presenter = Self {
            slots: PostSlots::resolve(&*ctx.renderer, view),
            post,
            view,
            dirty: false,
        };
        presenter.render(ctx);
        presenter
    }

    fn render(&self, ctx: &mut ViewContext<'_>) {
        let renderer = &mut *ctx.renderer;
        let post = &self.post;

        if let Some(h) = self.slots.username {
            renderer.set_text(h, post.username());
        }
        if let Some(h) = self.slots.content {
            renderer.set_text(h, post.content());
        }
        if let Some(h) = self.slots.timestamp {
            renderer.set_text(h, post.timestamp().unwrap_or_default());
        }
        if let (Some(h), Some(image)) = (self.slots.profile_pic, post.profile_pic()) {
            renderer.set_image(h, image);
        }
        if let Some(h) = self.slots.like_count {
            renderer.set_text(h, &post.likes().to_string());
        }
        if let Some(h) = self.slots.like_icon {
            renderer.set_color(h, ctx.config.colors.for_state(post.is_liked()));
        }
        if let Some(h) = self.slots.comment_count {
            renderer.set_text(h, &post.comments().len().to_string());
        }

        tracing::trace!("Rendered post {} into {:?}", post.id(), self.view);
    }

    /// Flip the like state, persist it and animate the change
    pub fn toggle_like<B: KeyValueBackend>(
        &mut self,
        ctx: &mut ViewContext<'_>,
        store: &mut LikeStateStore<B>,
    ) -> LikeToggle {
        let previous = self.post.likes();
        self.post.toggle_like();
        let liked = self.post.is_liked();
        let likes = self.post.likes();

        let warning = match self.persist(store) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Like state for {} not saved: {}", self.post.id(), e);
                Some(e)
            }
        };

        let config = ctx.config;
        let anim = &config.animation;
        if let Some(h) = self.slots.like_count {
            ctx.scheduler
                .tween_count(ctx.renderer, h, previous.into(), likes.into(), anim.count_ms);
        }
        if let Some(h) = self.slots.like_icon {
            let color = config.colors.for_state(liked);
            ctx.scheduler.tween_color(ctx.renderer, h, color, anim.color_ms);
        }
        if let Some(h) = self.slots.like_button {
            ctx.scheduler
                .pulse_scale(ctx.renderer, h, anim.press_scale, anim.press_ms);
        }

        tracing::debug!("Post {} liked={} likes={}", self.post.id(), liked, likes);
        LikeToggle {
            liked,
            likes,
            warning,
        }
    }

    fn persist<B: KeyValueBackend>(&mut self, store: &mut LikeStateStore<B>) -> Result<()> {
        let result = store.set(self.post.id(), self.post.is_liked(), self.post.likes());
        self.dirty = result.is_err();
        result
    }

    /// Rewrite the current like state if an earlier write failed
    pub fn retry_persist<B: KeyValueBackend>(
        &mut self,
        store: &mut LikeStateStore<B>,
    ) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.persist(store)
    }

    /// Press the comment button and reveal this post's comments in `panel`
    pub fn open_comments(&self, ctx: &mut ViewContext<'_>, panel: &CommentPanel) {
        if let Some(h) = self.slots.comment_button {
            let anim = &ctx.config.animation;
            let (factor, duration) = (anim.press_scale, anim.press_ms);
            ctx.scheduler.pulse_scale(ctx.renderer, h, factor, duration);
        }
        panel.reveal(ctx, self.post.content(), self.post.comments());
    }

    /// Settle every animation running on this presenter's view
    pub fn cancel_animations(&self, ctx: &mut ViewContext<'_>) {
        let mut cancelled = 0;
        for handle in self.handles() {
            cancelled += ctx.scheduler.cancel_target(handle, ctx.renderer);
        }
        if cancelled > 0 {
            tracing::debug!("Cancelled {} animations on post {}", cancelled, self.post.id());
        }
    }

    /// The view and every resolved slot handle
    pub fn handles(&self) -> impl Iterator<Item = ViewHandle> {
        std::iter::once(self.view).chain(self.slots.iter())
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn view(&self) -> ViewHandle {
        self.view
    }

    pub fn slots(&self) -> &PostSlots {
        &self.slots
    }

    /// True while the latest like state has not been persisted
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
