//! Sunfeed Animation System
//!
//! Timed, cancellable interpolations over renderer properties.
//!
//! # Features
//!
//! - **Primitives**: fade, press pulse, color transition, count tween
//! - **Easing**: linear and quadratic/cubic curves over normalized time
//! - **Cooperative scheduling**: tasks resumed once per tick, no threads
//! - **Supersession**: one task per (target, property); a newer task
//!   cancels the older one before touching the property
//!
//! # Example
//!
//! ```rust
//! use sunfeed_animation::AnimationScheduler;
//! use sunfeed_core::{MemoryRenderer, PrefabKind, Renderer};
//!
//! let mut renderer = MemoryRenderer::new();
//! let root = renderer.root();
//! let label = renderer.instantiate(PrefabKind::Comment, root);
//!
//! let mut scheduler = AnimationScheduler::new();
//! scheduler.tween_count(&mut renderer, label, 0, 10, 500.0);
//! while scheduler.tick(16.0, &mut renderer) {}
//!
//! assert_eq!(renderer.text(label).as_deref(), Some("10"));
//! ```

pub mod easing;
pub mod scheduler;
pub mod task;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, TaskId};
pub use task::{AnimationTask, Channel, TaskKey, TaskStatus};
pub use tween::{ColorTween, CountTween, Delay, Fade, Progress, PulseScale, ScaleTo};
pub use values::{lerp_rounded, Interpolate};
