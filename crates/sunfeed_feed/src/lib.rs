//! Sunfeed Feed
//!
//! The social feed screen: posts with stable identities, like state that
//! survives restarts, and the animated comment reveal.
//!
//! # Features
//!
//! - **Posts**: validated records with SHA-256 identities
//! - **Like persistence**: `(liked, count)` pairs written as one record to a
//!   durable key-value backend
//! - **Presenters**: bind a post to a view and animate like toggles
//! - **Comment panel**: a re-entrant, cancellable reveal sequence
//! - **Controller**: loading, refresh, prepending and click routing
//!
//! # Example
//!
//! ```rust
//! use sunfeed_core::{MemoryRenderer, PrefabKind, Renderer};
//! use sunfeed_feed::{
//!     FeedConfig, FeedController, FeedLayout, LikeStateStore, PostRecord, StaticContentProvider,
//! };
//!
//! let mut renderer = MemoryRenderer::new();
//! let root = renderer.root();
//! let layout = FeedLayout {
//!     content: renderer.instantiate(PrefabKind::Comment, root),
//!     overlay: renderer.instantiate(PrefabKind::Comment, root),
//! };
//! let provider = StaticContentProvider::new(vec![PostRecord {
//!     username: Some("ada".into()),
//!     content: Some("hello".into()),
//!     likes: 3,
//!     ..Default::default()
//! }]);
//!
//! let mut feed = FeedController::new(
//!     renderer,
//!     layout,
//!     provider,
//!     LikeStateStore::in_memory(),
//!     FeedConfig::default(),
//! );
//! feed.load_feed();
//!
//! let result = feed.toggle_like(0).unwrap();
//! assert_eq!(result.likes, 4);
//! while feed.tick(16.0) {}
//! ```

pub mod backend;
pub mod comments;
pub mod config;
pub mod error;
pub mod feed;
pub mod like_store;
pub mod post;
pub mod presenter;
pub mod provider;

pub use backend::{JsonFileBackend, KeyValueBackend, MemoryBackend};
pub use comments::{CommentPanel, RevealPhase, EMPTY_COMMENTS_PLACEHOLDER};
pub use config::{AnimationConfig, ColorConfig, FeedConfig};
pub use error::{FeedError, Result};
pub use feed::{ClickAction, FeedController, FeedLayout};
pub use like_store::{LikeRecord, LikeStateStore};
pub use post::{derive_post_id, Post, PostId, PostRecord};
pub use presenter::{LikeToggle, PostPresenter, PostSlots, ViewContext};
pub use provider::{parse_posts, ContentProvider, JsonContentProvider, StaticContentProvider};
