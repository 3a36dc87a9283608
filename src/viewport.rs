use core::cmp;

use crate::{ExtendedViewport, IndexRange, Viewport};

pub(crate) struct TrackInput {
    pub scroll_offset: u64,
    pub viewport_size: u32,
    pub count: usize,
    pub buffer_factor: f64,
    pub average_extent: u32,
}

pub(crate) struct Tracked {
    pub viewport: Viewport,
    pub visible: IndexRange,
    pub extended: ExtendedViewport,
}

/// Converts scroll offset + viewport size into the visible and extended
/// windows, using the running average extent as the item-size model.
///
/// The extended window is the visible one padded by
/// `round(visible_count * buffer_factor)` indexes per side (half away from
/// zero). When clamping at a data boundary truncates one side, the surplus
/// slides to the other side so the realized window keeps its target size
/// where the data allows.
pub(crate) fn track(input: TrackInput) -> Tracked {
    let average = input.average_extent.max(1) as u64;
    let count = input.count;
    let view = input.viewport_size as u64;

    let total = (count as u64).saturating_mul(average);
    let max_scroll = total.saturating_sub(view);
    let offset = input.scroll_offset.min(max_scroll);
    let viewport = Viewport {
        leading: offset,
        trailing: offset.saturating_add(view),
    };

    if count == 0 || view == 0 {
        return Tracked {
            viewport,
            visible: IndexRange::EMPTY,
            extended: ExtendedViewport {
                leading: viewport.leading,
                trailing: viewport.leading,
                range: IndexRange::EMPTY,
            },
        };
    }

    let first = ((offset / average) as usize).min(count - 1);
    let visible_count = (view.div_ceil(average) as usize).max(1);
    let visible = IndexRange {
        start: first,
        end: first.saturating_add(visible_count).min(count),
    };

    let buffer = round_half_away_from_zero(visible_count as f64 * input.buffer_factor);
    let range = expand_clamped(visible, buffer, count);

    let est_leading = (range.start as u64).saturating_mul(average);
    let est_trailing = (range.end as u64).saturating_mul(average);
    let cap = cmp::max(total, viewport.trailing);
    let extended = ExtendedViewport {
        leading: cmp::min(est_leading, viewport.leading),
        trailing: cmp::min(cmp::max(est_trailing, viewport.trailing), cap),
        range,
    };

    Tracked {
        viewport,
        visible,
        extended,
    }
}

/// Expands `visible` by `buffer` indexes per side, clamped to `[0, count)`,
/// sliding any clamped-off surplus to the opposite side.
fn expand_clamped(visible: IndexRange, buffer: usize, count: usize) -> IndexRange {
    let below = cmp::min(buffer, visible.start);
    let surplus_low = buffer - below;

    let headroom = count.saturating_sub(visible.end);
    let above = cmp::min(buffer.saturating_add(surplus_low), headroom);
    let surplus_high = buffer.saturating_add(surplus_low) - above;

    let below = cmp::min(below.saturating_add(surplus_high), visible.start);
    IndexRange {
        start: visible.start - below,
        end: visible.end + above,
    }
}

// `buffer_factor >= 0`, so truncation after +0.5 rounds half away from zero.
// Core-only on purpose: `f64::round` is std.
fn round_half_away_from_zero(value: f64) -> usize {
    (value + 0.5) as usize
}
