// Example: typed recycling. Scrolled-out content is pooled per key and
// handed back to the template instead of being rebuilt from scratch.
use recycler::{FnTemplate, Rect, Recycler, RecyclerOptions};

fn main() {
    let template = FnTemplate::new(|i: usize, recycled: Option<String>| {
        let mut s = recycled.unwrap_or_default();
        s.clear();
        s.push_str("row ");
        s.push_str(&i.to_string());
        Ok(s)
    })
    .with_type_key(|_| Some(0));

    let options = RecyclerOptions::new(100_000, template)
        .with_estimated_extent(24)
        .with_max_pool_size_per_key(16)
        .with_initial_rect(Some(Rect {
            main: 600,
            cross: 800,
        }));
    let mut r = Recycler::new(options);
    r.reconcile().unwrap();

    // Page through the list; each page recycles the previous one.
    for page in 1..=10u64 {
        r.apply_scroll_offset_event_clamped(page * 600);
        r.reconcile().unwrap();
    }

    let stats = r.stats();
    println!("realized={}", stats.realized);
    println!("total_built={}", stats.total_built);
    println!("containers_reused={}", stats.containers_reused);
    println!("content_reused={}", stats.content_reused);
    println!("pooled_content={}", stats.pooled_content);
}
