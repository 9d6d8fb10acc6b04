//! Renderer abstraction
//!
//! The visual widget tree lives outside this workspace. Everything the feed
//! needs from it goes through [`Renderer`]: opaque [`ViewHandle`]s with
//! property setters and getters, prefab instantiation, and child ordering.
//!
//! Setters on a handle that has been destroyed are silently ignored and
//! getters return `None`, so animations racing a teardown never panic.

use crate::color::Color;
use slotmap::new_key_type;

new_key_type! {
    /// Opaque reference to a visual element owned by the renderer
    pub struct ViewHandle;
}

/// Prefabs the feed asks the renderer to instantiate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefabKind {
    /// One post card with the slots listed in [`Slot::POST`]
    Post,
    /// One comment line (a text element)
    Comment,
    /// The comment overlay with the slots listed in [`Slot::COMMENT_PANEL`]
    CommentPanel,
}

/// Named child elements inside a prefab
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Username,
    Content,
    ProfilePic,
    Timestamp,
    LikeButton,
    LikeIcon,
    LikeCount,
    CommentButton,
    CommentCount,
    Preview,
    CommentContainer,
    CloseButton,
}

impl Slot {
    /// Slots a post prefab is expected to carry
    pub const POST: [Slot; 9] = [
        Slot::Username,
        Slot::Content,
        Slot::ProfilePic,
        Slot::Timestamp,
        Slot::LikeButton,
        Slot::LikeIcon,
        Slot::LikeCount,
        Slot::CommentButton,
        Slot::CommentCount,
    ];

    /// Slots a comment panel prefab is expected to carry
    pub const COMMENT_PANEL: [Slot; 3] = [Slot::Preview, Slot::CommentContainer, Slot::CloseButton];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Username => "username",
            Slot::Content => "content",
            Slot::ProfilePic => "profile_pic",
            Slot::Timestamp => "timestamp",
            Slot::LikeButton => "like_button",
            Slot::LikeIcon => "like_icon",
            Slot::LikeCount => "like_count",
            Slot::CommentButton => "comment_button",
            Slot::CommentCount => "comment_count",
            Slot::Preview => "preview",
            Slot::CommentContainer => "comment_container",
            Slot::CloseButton => "close_button",
        }
    }
}

/// Interface to the external view layer
pub trait Renderer {
    fn set_text(&mut self, handle: ViewHandle, text: &str);
    fn text(&self, handle: ViewHandle) -> Option<String>;

    fn set_alpha(&mut self, handle: ViewHandle, alpha: f32);
    fn alpha(&self, handle: ViewHandle) -> Option<f32>;

    /// Uniform scale relative to the element's layout size
    fn set_scale(&mut self, handle: ViewHandle, scale: f32);
    fn scale(&self, handle: ViewHandle) -> Option<f32>;

    fn set_color(&mut self, handle: ViewHandle, color: Color);
    fn color(&self, handle: ViewHandle) -> Option<Color>;

    /// Point an image element at an opaque image reference
    fn set_image(&mut self, handle: ViewHandle, image: &str);

    /// Whether the element accepts input
    fn set_interactive(&mut self, handle: ViewHandle, interactive: bool);

    /// Whether the element participates in hit testing (blocks pointer events)
    fn set_hit_testable(&mut self, handle: ViewHandle, hit_testable: bool);

    /// Create a prefab instance as the last child of `parent`
    fn instantiate(&mut self, kind: PrefabKind, parent: ViewHandle) -> ViewHandle;

    /// Destroy an element and all of its descendants
    fn destroy(&mut self, handle: ViewHandle);

    /// Move an element to `index` among its siblings
    fn insert_at_index(&mut self, handle: ViewHandle, index: usize);

    /// Direct children of `parent`, in sibling order
    fn children(&self, parent: ViewHandle) -> Vec<ViewHandle>;

    /// Look up a named slot inside a prefab instance
    fn find_child(&self, parent: ViewHandle, slot: Slot) -> Option<ViewHandle>;

    fn is_alive(&self, handle: ViewHandle) -> bool;
}
