use alloc::sync::Arc;

use crate::template::ContentTemplate;
use crate::{ContainerEvent, Orientation, Rect, RecycleKey};

/// A callback fired for every container lifecycle event.
///
/// Events are delivered synchronously while a pass mutates the surface; the
/// callback must not reenter the [`crate::Recycler`].
pub type ContainerEventCallback = Arc<dyn Fn(ContainerEvent) + Send + Sync>;

/// Initial scroll offset configuration.
#[derive(Clone)]
pub enum InitialOffset {
    /// A fixed initial offset.
    Value(u64),
    /// A lazily evaluated initial offset provider (called by `Recycler::new`).
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn resolve(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Configuration for [`crate::Recycler`].
///
/// Cheap to clone: heavy fields are `Arc`s, so hosts can tweak a few fields
/// and call `Recycler::set_options` without reallocating the template.
pub struct RecyclerOptions<C, K = RecycleKey> {
    /// Number of items in the data source.
    pub count: usize,

    /// Which screen axis the engine virtualizes. Purely informational for the
    /// engine's math; hosts use it to map `Rect::main` onto width or height.
    pub orientation: Orientation,

    /// Fraction of the visible item count pre-realized as margin on each side
    /// of the viewport.
    pub buffer_factor: f64,

    /// Seed for the running average extent, used until the first measurement.
    pub estimated_extent: u32,

    /// Capacity of each (template, key) content pool stack. A template's own
    /// [`ContentTemplate::max_pool_size_per_key`] takes precedence.
    pub max_pool_size_per_key: usize,

    /// The initial size of the scrollable area.
    pub initial_rect: Option<Rect>,

    /// Initial scroll offset.
    pub initial_offset: InitialOffset,

    /// The per-item template.
    pub template: Arc<dyn ContentTemplate<C, K> + Send + Sync>,

    /// Optional container lifecycle event sink.
    pub on_container_event: Option<ContainerEventCallback>,
}

impl<C, K> RecyclerOptions<C, K> {
    pub fn new(
        count: usize,
        template: impl ContentTemplate<C, K> + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            orientation: Orientation::default(),
            buffer_factor: 0.5,
            estimated_extent: 25,
            max_pool_size_per_key: 8,
            initial_rect: None,
            initial_offset: InitialOffset::default(),
            template: Arc::new(template),
            on_container_event: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_buffer_factor(mut self, buffer_factor: f64) -> Self {
        self.buffer_factor = buffer_factor;
        self
    }

    pub fn with_estimated_extent(mut self, estimated_extent: u32) -> Self {
        self.estimated_extent = estimated_extent;
        self
    }

    pub fn with_max_pool_size_per_key(mut self, max_pool_size_per_key: usize) -> Self {
        self.max_pool_size_per_key = max_pool_size_per_key;
        self
    }

    pub fn with_initial_rect(mut self, initial_rect: Option<Rect>) -> Self {
        self.initial_rect = initial_rect;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: InitialOffset) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_initial_offset_value(mut self, initial_offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(initial_offset);
        self
    }

    pub fn with_initial_offset_provider(
        mut self,
        initial_offset: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.initial_offset = InitialOffset::Provider(Arc::new(initial_offset));
        self
    }

    pub fn with_template(
        mut self,
        template: impl ContentTemplate<C, K> + Send + Sync + 'static,
    ) -> Self {
        self.template = Arc::new(template);
        self
    }

    pub fn with_on_container_event(
        mut self,
        f: Option<impl Fn(ContainerEvent) + Send + Sync + 'static>,
    ) -> Self {
        self.on_container_event = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<C, K> Clone for RecyclerOptions<C, K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            orientation: self.orientation,
            buffer_factor: self.buffer_factor,
            estimated_extent: self.estimated_extent,
            max_pool_size_per_key: self.max_pool_size_per_key,
            initial_rect: self.initial_rect,
            initial_offset: self.initial_offset.clone(),
            template: Arc::clone(&self.template),
            on_container_event: self.on_container_event.clone(),
        }
    }
}

impl<C, K> core::fmt::Debug for RecyclerOptions<C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecyclerOptions")
            .field("count", &self.count)
            .field("orientation", &self.orientation)
            .field("buffer_factor", &self.buffer_factor)
            .field("estimated_extent", &self.estimated_extent)
            .field("max_pool_size_per_key", &self.max_pool_size_per_key)
            .field("initial_rect", &self.initial_rect)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
