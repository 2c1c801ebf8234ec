//! Cross-group aggregation
//!
//! Fans one collection call out per resource group with a bounded number in
//! flight, and folds the results into a single collection as they complete.

use super::response::{ArmCollection, ResponseHeaders};
use crate::error::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::{ready, Future};

/// Result of one group's call: its decoded items and its headers
pub type GroupPage<M> = (Vec<M>, ResponseHeaders);

/// Fan-in side. Only the completed pages pass through here, one at a time.
struct Collector<M> {
    pages: Vec<Vec<M>>,
    last_headers: Option<ResponseHeaders>,
}

impl<M> Collector<M> {
    fn new(capacity: usize) -> Self {
        Self {
            pages: Vec::with_capacity(capacity),
            last_headers: None,
        }
    }

    fn push(&mut self, (items, headers): GroupPage<M>) {
        self.pages.push(items);
        self.last_headers = Some(headers);
    }

    /// Flatten in completion order. The merged result carries the headers of
    /// whichever page arrived last and no continuation.
    fn finish(self) -> ArmCollection<M> {
        let items = self.pages.into_iter().flatten().collect();
        ArmCollection::new(items, self.last_headers.unwrap_or_default())
    }
}

/// Run `fetch` once per group, at most `max_concurrency` at a time.
///
/// The first error aborts the whole aggregation: outstanding calls are
/// dropped and no partial collection is returned.
pub async fn fan_out<M, F, Fut>(
    groups: Vec<String>,
    max_concurrency: usize,
    fetch: F,
) -> Result<ArmCollection<M>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<GroupPage<M>>>,
{
    let mut collector = Collector::new(groups.len());

    stream::iter(groups)
        .map(fetch)
        .buffer_unordered(max_concurrency.max(1))
        .try_for_each(|page| {
            collector.push(page);
            ready(Ok(()))
        })
        .await?;

    Ok(collector.finish())
}
