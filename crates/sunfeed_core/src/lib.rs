//! Sunfeed Core
//!
//! Foundational types shared by the animation and feed crates:
//!
//! - **Color**: RGBA values with linear interpolation
//! - **Renderer**: the boundary to the external view layer, addressed through
//!   opaque [`ViewHandle`]s
//! - **MemoryRenderer**: an in-memory scene graph implementing [`Renderer`]
//!
//! # Example
//!
//! ```rust
//! use sunfeed_core::{MemoryRenderer, PrefabKind, Renderer, Slot};
//!
//! let mut renderer = MemoryRenderer::new();
//! let post = renderer.instantiate(PrefabKind::Post, renderer.root());
//! let username = renderer.find_child(post, Slot::Username).unwrap();
//!
//! renderer.set_text(username, "ada");
//! assert_eq!(renderer.text(username).as_deref(), Some("ada"));
//! ```

pub mod color;
pub mod memory;
pub mod renderer;

pub use color::Color;
pub use memory::{MemoryRenderer, Node};
pub use renderer::{PrefabKind, Renderer, Slot, ViewHandle};
