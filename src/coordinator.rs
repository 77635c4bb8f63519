//! Bounded, order-preserving concurrent map.
//!
//! Each input gets a result slot at its own index before any work starts.
//! Tasks complete in whatever order the network allows and write into
//! their slot; the output is read back in index order.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::pin::pin;

/// Run `f` over `items` with at most `workers` in flight.
///
/// `result[i]` always corresponds to `items[i]`. A zero `workers` is
/// treated as one.
pub async fn map_ordered<T, R, F, Fut>(items: Vec<T>, workers: usize, f: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();

    let completed = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let task = f(item);
            async move { (index, task.await) }
        })
        .buffer_unordered(workers.max(1));
    let mut completed = pin!(completed);

    while let Some((index, result)) = completed.next().await {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(result);
        }
    }

    slots.into_iter().flatten().collect()
}
