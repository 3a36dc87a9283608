use alloc::string::String;
use alloc::sync::Arc;

use crate::{RecycleKey, TemplateId};

/// Error raised by [`ContentTemplate::build`].
///
/// A build failure is fatal for that container only: the slot stays a hole,
/// the error is reported to the `reconcile` caller, and the hole is retried
/// on the next pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildError {
    message: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "template build failed: {}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

/// A [`BuildError`] attributed to the index whose realization failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildFailure {
    pub index: usize,
    pub error: BuildError,
}

impl core::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "index {}: {}", self.index, self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildFailure {}

/// The per-item template seam between the engine and its host.
///
/// The engine addresses items by index only; the collection owns the items.
/// Beyond `build`, the methods are capability probes: the engine asks for an
/// explicit recycle key first, then a type key, and pools nothing when both
/// return `None`. An explicit key always wins over a type key when a template
/// declares both.
pub trait ContentTemplate<C, K = RecycleKey> {
    /// Builds (or rebuilds) content for the item at `index`.
    ///
    /// `recycled` is previously pooled content for the same (template, key);
    /// the template may reuse it in place or discard it and start fresh.
    fn build(&self, index: usize, recycled: Option<C>) -> Result<C, BuildError>;

    /// Identity of the concrete template used for `index`.
    ///
    /// Heterogeneous hosts return distinct ids per item kind so pooled content
    /// never crosses template boundaries.
    fn template_id(&self, _index: usize) -> TemplateId {
        0
    }

    /// Keyed-pooling capability: an explicit, application-level recycle key.
    fn recycle_key(&self, _index: usize) -> Option<K> {
        None
    }

    /// Typed-recycling capability: a key derived from the item's runtime type.
    fn type_key(&self, _index: usize) -> Option<K> {
        None
    }

    /// Per-template override of the pool capacity; `None` falls back to
    /// [`crate::RecyclerOptions::max_pool_size_per_key`].
    fn max_pool_size_per_key(&self) -> Option<usize> {
        None
    }
}

/// Resolves the pooling key for `index` in capability priority order.
pub(crate) fn pooling_key<C, K>(
    template: &dyn ContentTemplate<C, K>,
    index: usize,
) -> Option<K> {
    template
        .recycle_key(index)
        .or_else(|| template.type_key(index))
}

/// Closure-backed [`ContentTemplate`] for hosts and tests.
pub struct FnTemplate<C, K = RecycleKey> {
    build: Arc<dyn Fn(usize, Option<C>) -> Result<C, BuildError> + Send + Sync>,
    template_id: Option<Arc<dyn Fn(usize) -> TemplateId + Send + Sync>>,
    recycle_key: Option<Arc<dyn Fn(usize) -> Option<K> + Send + Sync>>,
    type_key: Option<Arc<dyn Fn(usize) -> Option<K> + Send + Sync>>,
    max_pool_size_per_key: Option<usize>,
}

impl<C, K> FnTemplate<C, K> {
    pub fn new(
        build: impl Fn(usize, Option<C>) -> Result<C, BuildError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            build: Arc::new(build),
            template_id: None,
            recycle_key: None,
            type_key: None,
            max_pool_size_per_key: None,
        }
    }

    pub fn with_template_id(
        mut self,
        f: impl Fn(usize) -> TemplateId + Send + Sync + 'static,
    ) -> Self {
        self.template_id = Some(Arc::new(f));
        self
    }

    pub fn with_recycle_key(
        mut self,
        f: impl Fn(usize) -> Option<K> + Send + Sync + 'static,
    ) -> Self {
        self.recycle_key = Some(Arc::new(f));
        self
    }

    pub fn with_type_key(mut self, f: impl Fn(usize) -> Option<K> + Send + Sync + 'static) -> Self {
        self.type_key = Some(Arc::new(f));
        self
    }

    pub fn with_max_pool_size_per_key(mut self, max: usize) -> Self {
        self.max_pool_size_per_key = Some(max);
        self
    }
}

impl<C, K> Clone for FnTemplate<C, K> {
    fn clone(&self) -> Self {
        Self {
            build: Arc::clone(&self.build),
            template_id: self.template_id.clone(),
            recycle_key: self.recycle_key.clone(),
            type_key: self.type_key.clone(),
            max_pool_size_per_key: self.max_pool_size_per_key,
        }
    }
}

impl<C, K> core::fmt::Debug for FnTemplate<C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnTemplate")
            .field("keyed", &self.recycle_key.is_some())
            .field("typed", &self.type_key.is_some())
            .field("max_pool_size_per_key", &self.max_pool_size_per_key)
            .finish_non_exhaustive()
    }
}

impl<C, K> ContentTemplate<C, K> for FnTemplate<C, K> {
    fn build(&self, index: usize, recycled: Option<C>) -> Result<C, BuildError> {
        (self.build)(index, recycled)
    }

    fn template_id(&self, index: usize) -> TemplateId {
        match &self.template_id {
            Some(f) => f(index),
            None => 0,
        }
    }

    fn recycle_key(&self, index: usize) -> Option<K> {
        self.recycle_key.as_ref().and_then(|f| f(index))
    }

    fn type_key(&self, index: usize) -> Option<K> {
        self.type_key.as_ref().and_then(|f| f(index))
    }

    fn max_pool_size_per_key(&self) -> Option<usize> {
        self.max_pool_size_per_key
    }
}
