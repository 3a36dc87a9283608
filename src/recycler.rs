use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use crate::extent::ExtentEstimate;
use crate::key::{KeyedMap, PoolKey};
use crate::pool::ContentPool;
use crate::slots::{ContainerArena, SlotData};
use crate::template::{BuildFailure, pooling_key};
use crate::viewport::{TrackInput, Tracked, track};
use crate::{
    Align, ContainerEvent, ContainerId, ExtendedViewport, IndexRange, Orientation, Rect,
    RecycleKey, RecyclerOptions, RecyclerStats, TemplateId, Viewport,
};

/// An armed scroll-into-view request awaiting measurement-driven correction.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingScroll {
    pub index: usize,
    pub align: Align,
    pub corrections_left: u8,
}

/// The virtualization surface: owns the realized set, the container arena,
/// and the content recycle pool.
///
/// This type is intentionally UI-agnostic and single-threaded:
/// - It holds host content values (`C`), never live UI objects.
/// - The host drives it with viewport geometry, scroll offsets, collection
///   change notifications, and extent measurements, then calls
///   [`Recycler::reconcile`] once per layout pass.
/// - All mutation goes through `&mut self`; events fire synchronously and the
///   callback must not reenter the surface.
pub struct Recycler<C, K = RecycleKey> {
    pub(crate) options: RecyclerOptions<C, K>,
    pub(crate) viewport_size: u32,
    pub(crate) scroll_rect: Rect,
    pub(crate) scroll_offset: u64,

    pub(crate) arena: ContainerArena<C, K>,
    pub(crate) index_map: KeyedMap<usize, ContainerId>,
    pub(crate) pool: ContentPool<C, K>,
    pub(crate) extent: ExtentEstimate,

    pub(crate) focused: Option<ContainerId>,
    pub(crate) pending_scroll: Option<PendingScroll>,

    pub(crate) total_built: u64,
    pub(crate) containers_reused: u64,
    pub(crate) content_reused: u64,

    // Reused shift/release buffer; kept across passes to avoid per-pass
    // allocation.
    pub(crate) scratch: Vec<(usize, ContainerId)>,
}

impl<C, K: PoolKey> Recycler<C, K> {
    /// Creates a new surface from options.
    ///
    /// `options.initial_rect` / `options.initial_offset` are applied
    /// immediately; nothing is realized until the first [`Self::reconcile`].
    pub fn new(options: RecyclerOptions<C, K>) -> Self {
        let scroll_rect = options.initial_rect.unwrap_or_default();
        let scroll_offset = options.initial_offset.resolve();
        rdebug!(
            count = options.count,
            buffer_factor = options.buffer_factor,
            estimated_extent = options.estimated_extent,
            "Recycler::new"
        );
        Self {
            viewport_size: scroll_rect.main,
            scroll_rect,
            scroll_offset,
            arena: ContainerArena::new(),
            index_map: KeyedMap::new(),
            pool: ContentPool::new(),
            extent: ExtentEstimate::new(options.estimated_extent),
            focused: None,
            pending_scroll: None,
            total_built: 0,
            containers_reused: 0,
            content_reused: 0,
            scratch: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &RecyclerOptions<C, K> {
        &self.options
    }

    /// Replaces the options.
    ///
    /// A template identity change resets the realized set and clears the
    /// content pool (pooled entries belong to the old template); a count
    /// change resets the realized set, offering outgoing content to the pool.
    /// Other fields apply in place. Initial rect/offset are only honored by
    /// [`Self::new`].
    pub fn set_options(&mut self, options: RecyclerOptions<C, K>) {
        let template_changed = !Arc::ptr_eq(&self.options.template, &options.template);
        let count_changed = self.options.count != options.count;
        self.options = options;
        rtrace!(
            count = self.options.count,
            template_changed,
            "set_options"
        );
        if template_changed {
            self.release_all(false);
            self.pool.clear();
        } else if count_changed {
            self.release_all(true);
        }
    }

    /// Clones the current options, applies `f`, then delegates to
    /// [`Self::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut RecyclerOptions<C, K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_container_event(
        &mut self,
        f: Option<impl Fn(ContainerEvent) + Send + Sync + 'static>,
    ) {
        self.options.on_container_event = f.map(|f| Arc::new(f) as _);
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn orientation(&self) -> Orientation {
        self.options.orientation
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        self.viewport_size = size;
        self.scroll_rect.main = size;
    }

    pub fn set_scroll_rect(&mut self, rect: Rect) {
        self.scroll_rect = rect;
        self.viewport_size = rect.main;
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        self.scroll_offset = self.clamp_scroll_offset(offset);
    }

    /// Applies a scroll offset coming from the user (wheel/drag).
    ///
    /// Unlike the plain setter, this cancels any pending scroll-into-view
    /// correction: the user has taken over.
    pub fn apply_scroll_offset_event(&mut self, offset: u64) {
        rtrace!(offset, "apply_scroll_offset_event");
        self.pending_scroll = None;
        self.set_scroll_offset(offset);
    }

    /// Same as [`Self::apply_scroll_offset_event`], but clamps the offset.
    pub fn apply_scroll_offset_event_clamped(&mut self, offset: u64) {
        rtrace!(offset, "apply_scroll_offset_event_clamped");
        self.pending_scroll = None;
        self.set_scroll_offset_clamped(offset);
    }

    /// The running average extent (seeded until the first measurement).
    pub fn average_extent(&self) -> u32 {
        self.extent.average()
    }

    /// Estimated total extent of the list: `count * average`.
    pub fn total_extent_estimate(&self) -> u64 {
        self.extent.total_for(self.options.count)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_extent_estimate()
            .saturating_sub(self.viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    pub fn viewport(&self) -> Viewport {
        self.tracked().viewport
    }

    pub fn extended_viewport(&self) -> ExtendedViewport {
        self.tracked().extended
    }

    pub fn visible_range(&self) -> IndexRange {
        self.tracked().visible
    }

    pub fn extended_range(&self) -> IndexRange {
        self.tracked().extended.range
    }

    /// Feeds back a measured extent for the realized container at `index`.
    ///
    /// Out-of-bounds or unrealized indexes are no-ops. A re-measurement
    /// replaces the container's earlier sample in the running average.
    pub fn measure(&mut self, index: usize, extent: u32) {
        if index >= self.options.count {
            return;
        }
        let Some(&id) = self.index_map.get(&index) else {
            return;
        };
        let Some(data) = self.arena.get_mut(id) else {
            return;
        };
        match data.measured.replace(extent) {
            Some(prev) if prev == extent => {}
            Some(prev) => self.extent.amend(prev, extent),
            None => self.extent.record(extent),
        }
        rtrace!(index, extent, "measure");
    }

    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        for (index, extent) in measurements {
            self.measure(index, extent);
        }
    }

    /// Reconciles the realized set against the current extended range.
    ///
    /// Realized containers whose index left the range are cleared and
    /// released (content offered to the pool, shell parked) unless focused;
    /// every in-range hole is then filled, reusing parked shells and pooled
    /// content where the template's keys allow. Calling this twice without an
    /// intervening state change emits no events.
    ///
    /// On a template build failure the slot stays a hole (retried next pass),
    /// the remaining indexes are still attempted, and the first failure is
    /// returned.
    pub fn reconcile(&mut self) -> Result<(), BuildFailure> {
        let range = self.tracked().extended.range;

        let mut out = mem::take(&mut self.scratch);
        out.clear();
        for (&index, &id) in self.index_map.iter() {
            if !range.contains(index) && self.focused != Some(id) {
                out.push((index, id));
            }
        }
        out.sort_unstable_by_key(|&(index, _)| index);
        for &(_, id) in out.iter() {
            self.release_container(id, true);
        }
        out.clear();
        self.scratch = out;

        let template = Arc::clone(&self.options.template);
        let mut failure: Option<BuildFailure> = None;
        for index in range.start..range.end {
            if self.index_map.contains_key(&index) {
                continue;
            }
            let template_id = template.template_id(index);
            let pool_key = pooling_key(template.as_ref(), index);
            let recycled = pool_key
                .as_ref()
                .and_then(|key| self.pool.try_acquire(template_id, key));
            let had_recycled = recycled.is_some();
            match template.build(index, recycled) {
                Ok(content) => {
                    let (id, reused_shell) = self.arena.adopt(SlotData {
                        index,
                        template: template_id,
                        pool_key,
                        content,
                        measured: None,
                    });
                    self.index_map.insert(index, id);
                    if reused_shell {
                        self.containers_reused += 1;
                    } else {
                        self.total_built += 1;
                    }
                    if had_recycled {
                        self.content_reused += 1;
                    }
                    self.emit(ContainerEvent::Prepared { container: id, index });
                }
                Err(error) => {
                    rwarn!(index, "template build failed; slot left as a hole");
                    if failure.is_none() {
                        failure = Some(BuildFailure { index, error });
                    }
                }
            }
        }

        match failure {
            None => Ok(()),
            Some(f) => Err(f),
        }
    }

    /// Marks a container as focused; a focused container is never released by
    /// reconciliation, even when its index leaves the extended range. It is
    /// cleared by the first pass after focus moves away, or when its item is
    /// removed, replaced, or reset.
    pub fn set_focused(&mut self, container: Option<ContainerId>) {
        self.focused = container;
    }

    pub fn focused(&self) -> Option<ContainerId> {
        self.focused
    }

    /// Estimates and applies a scroll offset that brings `index` into view.
    ///
    /// The estimate is `index * average extent` adjusted for `align` and
    /// clamped to `[0, max_scroll_offset]`; it is explicitly approximate. A
    /// pending correction with a budget of two passes is armed; after the
    /// next layout pass has measured the target, call
    /// [`Self::correct_scroll_into_view`]. Out-of-bounds indexes are no-ops
    /// returning the current offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        if index >= self.options.count {
            return self.scroll_offset;
        }
        let target = self.scroll_target_offset(index, align);
        rdebug!(index, target, "scroll_to_index");
        self.scroll_offset = target;
        self.pending_scroll = Some(PendingScroll {
            index,
            align,
            corrections_left: 2,
        });
        target
    }

    /// Re-estimates a pending scroll-into-view request using the extents
    /// observed since it was armed.
    ///
    /// Applies and returns the corrected offset when it differs from the
    /// current one by more than one average extent; otherwise the request is
    /// settled and `None` is returned. At most two corrections are applied
    /// per request; after that the result is accepted even if imperfect.
    pub fn correct_scroll_into_view(&mut self) -> Option<u64> {
        let pending = self.pending_scroll?;
        if pending.index >= self.options.count {
            self.pending_scroll = None;
            return None;
        }
        let target = self.scroll_target_offset(pending.index, pending.align);
        let tolerance = self.average_extent() as u64;
        if self.scroll_offset.abs_diff(target) <= tolerance {
            self.pending_scroll = None;
            return None;
        }
        rdebug!(
            index = pending.index,
            target,
            corrections_left = pending.corrections_left,
            "correct_scroll_into_view"
        );
        self.scroll_offset = target;
        let left = pending.corrections_left - 1;
        self.pending_scroll = (left > 0).then_some(PendingScroll {
            corrections_left: left,
            ..pending
        });
        Some(target)
    }

    pub fn scroll_into_view_pending(&self) -> bool {
        self.pending_scroll.is_some()
    }

    /// Estimated target offset for `index`: start at `index * average`, the
    /// item's own extent taken from its measurement when realized.
    fn scroll_target_offset(&self, index: usize, align: Align) -> u64 {
        let average = self.average_extent();
        let start = (index as u64).saturating_mul(average as u64);
        let extent = self
            .index_map
            .get(&index)
            .and_then(|&id| self.arena.get(id))
            .and_then(|data| data.measured)
            .unwrap_or(average) as u64;
        let end = start.saturating_add(extent);
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(extent / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    pub fn container_for(&self, index: usize) -> Option<ContainerId> {
        self.index_map.get(&index).copied()
    }

    pub fn index_for(&self, container: ContainerId) -> Option<usize> {
        self.arena.get(container).map(|data| data.index)
    }

    pub fn content(&self, container: ContainerId) -> Option<&C> {
        self.arena.get(container).map(|data| &data.content)
    }

    pub fn content_mut(&mut self, container: ContainerId) -> Option<&mut C> {
        self.arena.get_mut(container).map(|data| &mut data.content)
    }

    pub fn measured_extent(&self, container: ContainerId) -> Option<u32> {
        self.arena.get(container).and_then(|data| data.measured)
    }

    pub fn first_realized_index(&self) -> Option<usize> {
        self.index_map.keys().copied().min()
    }

    pub fn last_realized_index(&self) -> Option<usize> {
        self.index_map.keys().copied().max()
    }

    pub fn realized_count(&self) -> usize {
        self.index_map.len()
    }

    /// Visits every realized container, in no particular order.
    pub fn for_each_realized(&self, mut f: impl FnMut(usize, ContainerId, &C)) {
        for (&index, &id) in self.index_map.iter() {
            if let Some(data) = self.arena.get(id) {
                f(index, id, &data.content);
            }
        }
    }

    /// Collects the realized indexes into `out`, sorted ascending (clears
    /// `out` first).
    pub fn collect_realized_indexes(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(self.index_map.keys().copied());
        out.sort_unstable();
    }

    /// Pooled content count for one (template, key), for diagnostics.
    pub fn pooled(&self, template: TemplateId, key: &K) -> usize {
        self.pool.pooled(template, key)
    }

    pub fn pool_total(&self) -> usize {
        self.pool.total()
    }

    /// Visits every non-empty pool stack with its current depth.
    pub fn for_each_pooled(&self, f: impl FnMut(TemplateId, &K, usize)) {
        self.pool.for_each_count(f);
    }

    pub fn stats(&self) -> RecyclerStats {
        RecyclerStats {
            realized: self.index_map.len(),
            pooled_content: self.pool.total(),
            free_containers: self.arena.parked_count(),
            total_built: self.total_built,
            containers_reused: self.containers_reused,
            content_reused: self.content_reused,
        }
    }

    /// Tears the surface down: every realized container gets a `Clearing`
    /// event, then containers, shells, and the whole content pool are
    /// destroyed and all outstanding ids are invalidated. The extent estimate
    /// survives for a later re-attach.
    pub fn detach(&mut self) {
        rdebug!(realized = self.index_map.len(), "detach");
        let mut out = mem::take(&mut self.scratch);
        out.clear();
        out.extend(self.index_map.iter().map(|(&index, &id)| (index, id)));
        out.sort_unstable_by_key(|&(index, _)| index);
        for &(index, id) in out.iter() {
            self.emit(ContainerEvent::Clearing {
                container: id,
                index,
            });
        }
        out.clear();
        self.scratch = out;

        self.index_map.clear();
        self.arena.clear();
        self.pool.clear();
        self.focused = None;
        self.pending_scroll = None;
    }

    pub(crate) fn emit(&self, event: ContainerEvent) {
        if let Some(cb) = &self.options.on_container_event {
            cb(event);
        }
    }

    pub(crate) fn tracked(&self) -> Tracked {
        track(TrackInput {
            scroll_offset: self.scroll_offset,
            viewport_size: self.viewport_size,
            count: self.options.count,
            buffer_factor: self.options.buffer_factor,
            average_extent: self.extent.average(),
        })
    }

    pub(crate) fn pool_cap(&self) -> usize {
        self.options
            .template
            .max_pool_size_per_key()
            .unwrap_or(self.options.max_pool_size_per_key)
    }

    /// Emits `Clearing` and detaches the container, offering its content to
    /// the pool when `pool_content` (and the slot carries a pooling key).
    pub(crate) fn release_container(&mut self, id: ContainerId, pool_content: bool) {
        let Some(data) = self.arena.get(id) else {
            return;
        };
        let index = data.index;
        self.emit(ContainerEvent::Clearing {
            container: id,
            index,
        });
        let Some(data) = self.arena.park(id) else {
            return;
        };
        self.index_map.remove(&data.index);
        if self.focused == Some(id) {
            self.focused = None;
        }
        if pool_content {
            if let Some(key) = data.pool_key {
                let cap = self.pool_cap();
                if !self.pool.try_return(data.template, key, data.content, cap) {
                    rtrace!(index, "pool at capacity; content dropped");
                }
            }
        }
    }

    /// Releases every realized container (focused included), in index order.
    pub(crate) fn release_all(&mut self, pool_content: bool) {
        let mut out = mem::take(&mut self.scratch);
        out.clear();
        out.extend(self.index_map.iter().map(|(&index, &id)| (index, id)));
        out.sort_unstable_by_key(|&(index, _)| index);
        for &(_, id) in out.iter() {
            self.release_container(id, pool_content);
        }
        out.clear();
        self.scratch = out;
        self.focused = None;
    }
}

impl<C, K: PoolKey> core::fmt::Debug for Recycler<C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Recycler")
            .field("options", &self.options)
            .field("viewport_size", &self.viewport_size)
            .field("scroll_offset", &self.scroll_offset)
            .field("realized", &self.index_map.len())
            .field("pooled_content", &self.pool.total())
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}
