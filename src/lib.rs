//! A headless list virtualization and container recycling engine.
//!
//! This crate owns the hard part of an items control: deciding which data
//! indexes are materialized as live containers, reusing those containers (and
//! their nested template-produced content) as the viewport scrolls and the
//! collection mutates, and estimating scroll offsets when item sizes are not
//! yet known.
//!
//! It is UI-agnostic. A host layout layer is expected to provide:
//! - viewport size and scroll offset along the virtualized axis
//! - a [`ContentTemplate`] that builds (or rebuilds) per-item content
//! - extent measurements for realized containers, fed back via [`Recycler::measure`]
//!
//! The engine answers with a realized set (`index -> ContainerId`), container
//! lifecycle events ([`ContainerEvent`]), and clamped scroll offsets.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod changes;
mod extent;
mod key;
mod options;
mod pool;
mod recycler;
mod slots;
mod template;
mod types;
mod viewport;


pub use changes::CollectionChange;
pub use options::{ContainerEventCallback, InitialOffset, RecyclerOptions};
pub use recycler::Recycler;
pub use template::{BuildError, BuildFailure, ContentTemplate, FnTemplate};
pub use types::{
    Align, ContainerEvent, ContainerId, ExtendedViewport, IndexRange, Orientation, Rect,
    RecycleKey, RecyclerStats, TemplateId, Viewport,
};

#[doc(hidden)]
pub use key::PoolKey;
