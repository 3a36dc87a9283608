/// The virtualized axis.
///
/// The engine itself is axis-symmetric: `Rect::main` is always the extent
/// along the orientation, `Rect::cross` the other axis. `Orientation` tells
/// the host which screen axis `main` maps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

/// A half-open window of data indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexRange {
    pub start: usize,
    pub end: usize, // exclusive
}

impl IndexRange {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// The visible window along the orientation axis.
///
/// Invariant: `trailing - leading == viewport size` (after offset clamping).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub leading: u64,
    pub trailing: u64,
}

impl Viewport {
    pub fn size(&self) -> u64 {
        self.trailing.saturating_sub(self.leading)
    }
}

/// The viewport padded by the buffer factor, plus the index window it implies.
///
/// Invariant: `leading <= viewport.leading` and `trailing >= viewport.trailing`.
/// Edges are estimates (`index * average extent`), never committed layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedViewport {
    pub leading: u64,
    pub trailing: u64,
    pub range: IndexRange,
}

/// A stable handle to a realized container.
///
/// The same handle is reintroduced when a parked container shell is reused for
/// a new index (that is the recycling model: the host keeps one UI element per
/// `ContainerId` and rebinds it on [`ContainerEvent::Prepared`]). The
/// generation is bumped only when the container is truly destroyed, so handles
/// from before a `detach` can never alias a later container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

/// Identity of the concrete template that produced a container's content.
///
/// Part of every content-pool key, so heterogeneous templates behind one
/// surface never exchange content.
pub type TemplateId = u32;

/// Default key type for content pooling.
pub type RecycleKey = u64;

/// Container lifecycle notifications, delivered synchronously during
/// reconciliation and collection-change application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerEvent {
    /// A container was bound to an index (newly built or recycled).
    Prepared { container: ContainerId, index: usize },
    /// A container is about to be released; `index` is its last bound index.
    Clearing { container: ContainerId, index: usize },
    /// A container's bound index shifted without the container being rebuilt.
    IndexChanged {
        container: ContainerId,
        old_index: usize,
        new_index: usize,
    },
}

/// Read-only diagnostic counters. Non-authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecyclerStats {
    /// Containers currently realized.
    pub realized: usize,
    /// Content entries currently parked in the recycle pool.
    pub pooled_content: usize,
    /// Detached container shells waiting for reuse.
    pub free_containers: usize,
    /// Containers built from scratch since construction.
    pub total_built: u64,
    /// Realizations that reused a parked container shell.
    pub containers_reused: u64,
    /// Realizations that were handed pooled content.
    pub content_reused: u64,
}
