// Example: realize a buffered window over a large list and scroll around.
use recycler::{Align, FnTemplate, Rect, Recycler, RecyclerOptions};

fn main() {
    let template = FnTemplate::new(|i, _| Ok(format!("row {i}")));
    let options = RecyclerOptions::new(1_000_000, template)
        .with_estimated_extent(24)
        .with_initial_rect(Some(Rect {
            main: 600,
            cross: 800,
        }));
    let mut r: Recycler<String> = Recycler::new(options);

    r.reconcile().unwrap();
    println!("extended_range={:?}", r.extended_range());
    println!("realized={}", r.realized_count());

    r.apply_scroll_offset_event_clamped(500_000);
    r.reconcile().unwrap();
    println!("after scroll: extended_range={:?}", r.extended_range());

    let off = r.scroll_to_index(999_999, Align::End);
    r.reconcile().unwrap();
    println!("after scroll_to_index: offset={off}");
    println!("last realized={:?}", r.last_realized_index());
}
