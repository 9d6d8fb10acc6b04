//! Feed controller
//!
//! Owns the renderer, the animation scheduler, the like store, the content
//! provider and one [`PostPresenter`] per visible post, plus the comment
//! panel they share. Hosts drive it with input events ([`FeedController::dispatch_click`])
//! and frame ticks ([`FeedController::tick`]).

use crate::backend::{KeyValueBackend, MemoryBackend};
use crate::comments::CommentPanel;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::like_store::LikeStateStore;
use crate::post::Post;
use crate::presenter::{LikeToggle, PostPresenter, ViewContext};
use crate::provider::ContentProvider;
use sunfeed_animation::AnimationScheduler;
use sunfeed_core::{PrefabKind, Renderer, ViewHandle};

/// Host-provided containers the feed builds into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedLayout {
    /// Parent of the post views, in display order
    pub content: ViewHandle,
    /// Parent of the comment panel
    pub overlay: ViewHandle,
}

/// What a routed click did
#[derive(Debug)]
pub enum ClickAction {
    /// The like on the post at `index` was toggled; `warning` is set when
    /// the new state could not be persisted
    ToggleLike {
        index: usize,
        warning: Option<FeedError>,
    },
    OpenComments(usize),
    CloseComments,
}

/// Control a click landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClickTarget {
    Like(usize),
    Comments(usize),
    Close,
}

/// The feed screen
pub struct FeedController<R, P, B = MemoryBackend>
where
    R: Renderer,
    P: ContentProvider,
    B: KeyValueBackend,
{
    renderer: R,
    provider: P,
    store: LikeStateStore<B>,
    config: FeedConfig,
    scheduler: AnimationScheduler,
    content: ViewHandle,
    comments: CommentPanel,
    presenters: Vec<PostPresenter>,
}

impl<R, P, B> FeedController<R, P, B>
where
    R: Renderer,
    P: ContentProvider,
    B: KeyValueBackend,
{
    /// Create the controller and its (hidden) comment panel; posts are not
    /// loaded until [`FeedController::load_feed`]
    pub fn new(
        mut renderer: R,
        layout: FeedLayout,
        provider: P,
        store: LikeStateStore<B>,
        config: FeedConfig,
    ) -> Self {
        let panel = renderer.instantiate(PrefabKind::CommentPanel, layout.overlay);
        let comments = CommentPanel::attach(&mut renderer, panel);
        Self {
            renderer,
            provider,
            store,
            config,
            scheduler: AnimationScheduler::new(),
            content: layout.content,
            comments,
            presenters: Vec::new(),
        }
    }

    /// Fetch, validate and append every post; returns how many were bound
    ///
    /// When no record survives validation a single system post is shown.
    pub fn load_feed(&mut self) -> usize {
        let records = self.provider.load_posts();
        let total = records.len();

        let mut posts: Vec<Post> = records
            .into_iter()
            .filter_map(|record| match Post::try_from(record) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!("Skipping post: {}", e);
                    None
                }
            })
            .collect();

        if posts.is_empty() {
            tracing::error!(
                "{}",
                FeedError::ContentUnavailable(format!("0 of {} records usable", total))
            );
            posts.push(Post::fallback());
        }

        let count = posts.len();
        for post in posts {
            let view = self.renderer.instantiate(PrefabKind::Post, self.content);
            let mut ctx = ViewContext {
                renderer: &mut self.renderer,
                scheduler: &mut self.scheduler,
                config: &self.config,
            };
            let presenter = PostPresenter::bind(post, view, &mut ctx, &self.store);
            self.presenters.push(presenter);
        }

        tracing::info!("Feed loaded with {} posts", count);
        count
    }

    /// Show `post` above every other post
    pub fn prepend_post(&mut self, post: Post) {
        let view = self.renderer.instantiate(PrefabKind::Post, self.content);
        self.renderer.insert_at_index(view, 0);

        tracing::debug!("Prepending post {}", post.id());
        let mut ctx = ViewContext {
            renderer: &mut self.renderer,
            scheduler: &mut self.scheduler,
            config: &self.config,
        };
        let presenter = PostPresenter::bind(post, view, &mut ctx, &self.store);
        self.presenters.insert(0, presenter);
    }

    /// Settle animations, destroy every post view and load the feed again
    pub fn refresh(&mut self) -> usize {
        self.clear();
        self.load_feed()
    }

    fn clear(&mut self) {
        let presenters = std::mem::take(&mut self.presenters);
        let mut ctx = ViewContext {
            renderer: &mut self.renderer,
            scheduler: &mut self.scheduler,
            config: &self.config,
        };
        for presenter in &presenters {
            presenter.cancel_animations(&mut ctx);
            ctx.renderer.destroy(presenter.view());
        }
        tracing::debug!("Cleared {} post views", presenters.len());
    }

    /// Toggle the like on the post at `index`
    pub fn toggle_like(&mut self, index: usize) -> Option<LikeToggle> {
        let presenter = self.presenters.get_mut(index)?;
        let mut ctx = ViewContext {
            renderer: &mut self.renderer,
            scheduler: &mut self.scheduler,
            config: &self.config,
        };
        Some(presenter.toggle_like(&mut ctx, &mut self.store))
    }

    /// Open the comment panel for the post at `index`
    pub fn open_comments(&mut self, index: usize) -> bool {
        let Some(presenter) = self.presenters.get(index) else {
            return false;
        };
        let mut ctx = ViewContext {
            renderer: &mut self.renderer,
            scheduler: &mut self.scheduler,
            config: &self.config,
        };
        presenter.open_comments(&mut ctx, &self.comments);
        true
    }

    pub fn close_comments(&mut self) {
        let mut ctx = ViewContext {
            renderer: &mut self.renderer,
            scheduler: &mut self.scheduler,
            config: &self.config,
        };
        self.comments.close(&mut ctx);
    }

    /// Route a click on `handle` to the action it triggers
    pub fn dispatch_click(&mut self, handle: ViewHandle) -> Option<ClickAction> {
        let target = self.resolve_click(handle)?;
        tracing::trace!("Click on {:?} -> {:?}", handle, target);
        let action = match target {
            ClickTarget::Like(index) => ClickAction::ToggleLike {
                index,
                warning: self.toggle_like(index).and_then(|toggle| toggle.warning),
            },
            ClickTarget::Comments(index) => {
                self.open_comments(index);
                ClickAction::OpenComments(index)
            }
            ClickTarget::Close => {
                self.close_comments();
                ClickAction::CloseComments
            }
        };
        Some(action)
    }

    fn resolve_click(&self, handle: ViewHandle) -> Option<ClickTarget> {
        if self.comments.close_button() == Some(handle) {
            return Some(ClickTarget::Close);
        }
        self.presenters.iter().enumerate().find_map(|(index, p)| {
            let slots = p.slots();
            if slots.like_button == Some(handle) || slots.like_icon == Some(handle) {
                Some(ClickTarget::Like(index))
            } else if slots.comment_button == Some(handle) || slots.comment_count == Some(handle) {
                Some(ClickTarget::Comments(index))
            } else {
                None
            }
        })
    }

    /// Retry like writes that failed earlier; returns how many are still pending
    pub fn retry_pending_writes(&mut self) -> usize {
        let mut pending = 0;
        for presenter in self.presenters.iter_mut().filter(|p| p.is_dirty()) {
            if let Err(e) = presenter.retry_persist(&mut self.store) {
                tracing::warn!("Retry failed for {}: {}", presenter.post().id(), e);
                pending += 1;
            }
        }
        pending
    }

    /// Advance every animation by `dt_ms`; returns true while any is running
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        self.scheduler.tick(dt_ms, &mut self.renderer)
    }

    /// Advance every animation by the wall-clock time since the last tick
    pub fn tick_elapsed(&mut self) -> bool {
        self.scheduler.tick_elapsed(&mut self.renderer)
    }

    pub fn presenters(&self) -> &[PostPresenter] {
        &self.presenters
    }

    pub fn presenter(&self, index: usize) -> Option<&PostPresenter> {
        self.presenters.get(index)
    }

    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }

    pub fn comments(&self) -> &CommentPanel {
        &self.comments
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &LikeStateStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LikeStateStore<B> {
        &mut self.store
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn content(&self) -> ViewHandle {
        self.content
    }
}
