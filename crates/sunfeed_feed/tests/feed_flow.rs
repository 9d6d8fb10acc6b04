//! End-to-end feed scenarios against the in-memory renderer

use std::fs;
use sunfeed_core::{MemoryRenderer, PrefabKind, Renderer, Slot, ViewHandle};
use sunfeed_feed::{
    derive_post_id, parse_posts, ClickAction, ContentProvider, FeedConfig, FeedController,
    FeedError, FeedLayout, JsonContentProvider, JsonFileBackend, KeyValueBackend, LikeStateStore,
    MemoryBackend, Post, Result, RevealPhase, StaticContentProvider, EMPTY_COMMENTS_PLACEHOLDER,
};

const POSTS: &str = r#"{
    "posts": [
        {
            "username": "ada",
            "profilePic": "avatars/ada.png",
            "content": "Analytical engines are neat",
            "likes": 12,
            "isLiked": false,
            "comments": ["agreed", "very neat"],
            "timestamp": "2h ago"
        },
        {
            "username": "grace",
            "content": "Found a moth in the relay",
            "likes": 0,
            "isLiked": false,
            "comments": [],
            "timestamp": "5h ago"
        },
        {
            "username": "",
            "content": "nobody wrote this"
        }
    ]
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_test_writer()
        .try_init();
}

fn layout(renderer: &mut MemoryRenderer) -> FeedLayout {
    let root = renderer.root();
    FeedLayout {
        content: renderer.instantiate(PrefabKind::Comment, root),
        overlay: renderer.instantiate(PrefabKind::Comment, root),
    }
}

fn build<P, B>(provider: P, backend: B) -> FeedController<MemoryRenderer, P, B>
where
    P: ContentProvider,
    B: KeyValueBackend,
{
    let mut renderer = MemoryRenderer::new();
    let layout = layout(&mut renderer);
    FeedController::new(
        renderer,
        layout,
        provider,
        LikeStateStore::new(backend),
        FeedConfig::default(),
    )
}

fn slot<P, B>(feed: &FeedController<MemoryRenderer, P, B>, index: usize, which: Slot) -> ViewHandle
where
    P: ContentProvider,
    B: KeyValueBackend,
{
    let view = feed.presenter(index).unwrap().view();
    feed.renderer().find_child(view, which).unwrap()
}

/// Backend whose writes always fail
#[derive(Default)]
struct FailingBackend {
    inner: MemoryBackend,
    writes: usize,
}

impl KeyValueBackend for FailingBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
        self.writes += 1;
        Err(FeedError::Io(std::io::Error::other("disk full")))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

#[test]
fn test_like_survives_restart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    let likes = dir.path().join("likes.json");
    fs::write(&posts, POSTS).unwrap();

    let mut feed = build(JsonContentProvider::new(&posts), JsonFileBackend::open(&likes));
    assert_eq!(feed.load_feed(), 2);

    let result = feed.toggle_like(0).unwrap();
    assert!(result.warning.is_none());
    assert_eq!((result.liked, result.likes), (true, 13));
    while feed.tick(16.0) {}
    drop(feed);

    let mut feed = build(JsonContentProvider::new(&posts), JsonFileBackend::open(&likes));
    feed.load_feed();
    let post = feed.presenter(0).unwrap().post();
    assert!(post.is_liked());
    assert_eq!(post.likes(), 13);
    assert_eq!(
        feed.renderer().text(slot(&feed, 0, Slot::LikeCount)).as_deref(),
        Some("13")
    );

    let id = derive_post_id("ada", "Analytical engines are neat");
    let record = feed.store().get(&id, false, 0);
    assert_eq!((record.liked, record.count), (true, 13));
}

#[test]
fn test_toggle_twice_restores_persisted_pair() {
    init_tracing();
    let provider = JsonContentProvider::new("does/not/exist.json");
    let mut feed = build(provider, MemoryBackend::new());
    feed.load_feed();
    feed.prepend_post(Post::new("ada", "hi").with_likes(7));

    let _ = feed.toggle_like(0);
    let second = feed.toggle_like(0).unwrap();
    assert_eq!((second.liked, second.likes), (false, 7));

    let id = derive_post_id("ada", "hi");
    let record = feed.store().get(&id, true, 99);
    assert_eq!((record.liked, record.count), (false, 7));
}

#[test]
fn test_failed_write_keeps_state_and_warns() {
    init_tracing();
    let provider = StaticContentProvider::new(parse_posts(POSTS).unwrap());
    let mut feed = build(provider, FailingBackend::default());
    feed.load_feed();

    let result = feed.toggle_like(1).unwrap();
    assert!(matches!(result.warning, Some(FeedError::Persistence(_))));
    assert!(result.liked);
    assert_eq!(result.likes, 1);
    assert!(feed.presenter(1).unwrap().is_dirty());

    while feed.tick(16.0) {}
    assert_eq!(
        feed.renderer().text(slot(&feed, 1, Slot::LikeCount)).as_deref(),
        Some("1")
    );

    assert_eq!(feed.retry_pending_writes(), 1);
    assert_eq!(feed.store().backend().writes, 2);
}

#[test]
fn test_clicked_like_reports_write_failure() {
    init_tracing();
    let provider = StaticContentProvider::new(parse_posts(POSTS).unwrap());
    let mut feed = build(provider, FailingBackend::default());
    feed.load_feed();

    let like = slot(&feed, 0, Slot::LikeButton);
    match feed.dispatch_click(like) {
        Some(ClickAction::ToggleLike { index, warning }) => {
            assert_eq!(index, 0);
            assert!(matches!(warning, Some(FeedError::Persistence(_))));
        }
        other => panic!("unexpected click result: {:?}", other),
    }
    assert!(feed.presenter(0).unwrap().post().is_liked());
    assert!(feed.presenter(0).unwrap().is_dirty());
    assert_eq!(feed.store().backend().writes, 1);
}

#[test]
fn test_comment_reveal_flow() {
    init_tracing();
    let provider = StaticContentProvider::new(parse_posts(POSTS).unwrap());
    let mut feed = build(provider, MemoryBackend::new());
    feed.load_feed();

    // Post with comments
    assert!(feed.open_comments(0));
    while feed.tick(16.0) {}
    assert_eq!(feed.comments().phase(), RevealPhase::Settled);
    assert_eq!(
        feed.comments().comment_texts(feed.renderer()),
        vec!["agreed".to_string(), "very neat".to_string()]
    );
    let preview = feed.comments().preview().unwrap();
    assert_eq!(
        feed.renderer().text(preview).as_deref(),
        Some("Analytical engines are neat")
    );

    // Switching posts mid-reveal leaves only the latest set
    assert!(feed.open_comments(0));
    for _ in 0..30 {
        feed.tick(16.0);
    }
    assert!(feed.open_comments(1));
    while feed.tick(16.0) {}
    assert_eq!(
        feed.comments().comment_texts(feed.renderer()),
        vec![EMPTY_COMMENTS_PLACEHOLDER.to_string()]
    );

    // Close through the close button
    let close = feed.comments().close_button().unwrap();
    feed.dispatch_click(close);
    while feed.tick(16.0) {}
    let panel = feed.comments().panel();
    assert_eq!(feed.renderer().alpha(panel), Some(0.0));
    assert_eq!(feed.renderer().is_interactive(panel), Some(false));
    assert_eq!(feed.renderer().is_hit_testable(panel), Some(false));
    assert_eq!(feed.comments().phase(), RevealPhase::Idle);
}

#[test]
fn test_refresh_leaves_no_dangling_tasks() {
    init_tracing();
    let provider = StaticContentProvider::new(parse_posts(POSTS).unwrap());
    let mut feed = build(provider, MemoryBackend::new());
    feed.load_feed();

    let _ = feed.toggle_like(0);
    let _ = feed.toggle_like(1);
    feed.open_comments(1);
    feed.tick(16.0);

    assert_eq!(feed.refresh(), 2);
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.renderer().children(feed.content()).len(), 2);
    for target in feed.scheduler().targets() {
        assert!(feed.renderer().is_alive(target));
    }
    while feed.tick(16.0) {}
}

#[test]
fn test_unavailable_content_shows_fallback() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    fs::write(&posts, "{ truncated").unwrap();

    let mut feed = build(JsonContentProvider::new(&posts), MemoryBackend::new());
    assert_eq!(feed.load_feed(), 1);
    assert_eq!(
        feed.renderer().text(slot(&feed, 0, Slot::Username)).as_deref(),
        Some("System Message")
    );
    assert_eq!(
        feed.renderer().text(slot(&feed, 0, Slot::Timestamp)).as_deref(),
        Some("Just now")
    );

    // Refreshing an unavailable feed still shows exactly one fallback
    assert_eq!(feed.refresh(), 1);
    assert_eq!(feed.renderer().children(feed.content()).len(), 1);
}
