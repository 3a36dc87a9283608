// Example: incremental collection change notifications. Shifted containers
// keep their realization; only removed items are cleared.
use recycler::{
    CollectionChange, ContainerEvent, FnTemplate, Rect, Recycler, RecyclerOptions,
};

fn main() {
    let template = FnTemplate::new(|i, _| Ok(format!("row {i}")));
    let options = RecyclerOptions::new(1_000, template)
        .with_estimated_extent(24)
        .with_initial_rect(Some(Rect {
            main: 600,
            cross: 800,
        }))
        .with_on_container_event(Some(|e: ContainerEvent| println!("  {e:?}")));
    let mut r: Recycler<String> = Recycler::new(options);
    r.reconcile().unwrap();
    println!("realized={:?}", r.extended_range());

    println!("insert 2 at 0:");
    r.apply_change(CollectionChange::Insert { index: 0, count: 2 });
    r.reconcile().unwrap();

    println!("remove 3 at 5:");
    r.apply_change(CollectionChange::Remove { index: 5, count: 3 });
    r.reconcile().unwrap();

    println!("move 10 -> 2:");
    r.apply_change(CollectionChange::Move { from: 10, to: 2 });
    r.reconcile().unwrap();

    println!("count={} realized={}", r.count(), r.realized_count());
}
