// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::PendingRequest;

/// An in-memory FIFO queue of [`PendingRequest`]s.
///
/// The queue is unbounded and keeps insertion order, the first request in is the first one
/// handed out by [`RequestQueue::dequeue_up_to`]. Requests are not deduplicated, the same id
/// seen twice is queued twice.
///
/// # Sharing the Queue Across Tasks
///
/// `RequestQueue` is cheap to clone, all clones share the same underlying `VecDeque` through
/// an `Arc`, and every operation takes the same `Mutex`. The event listener keeps one clone
/// to enqueue into, the batch processor another to drain from.
#[derive(Clone, Debug, Default)]
pub struct RequestQueue {
    requests: Arc<Mutex<VecDeque<PendingRequest>>>,
}

impl RequestQueue {
    /// Creates a new, empty `RequestQueue`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request at the tail of the queue.
    #[tracing::instrument(skip_all, fields(id = %request.id, caller = ?request.caller_address))]
    pub fn enqueue(&self, request: PendingRequest) {
        let mut requests = self.requests.lock();
        requests.push_back(request);
        tracing::trace!(len = requests.len(), "request enqueued");
    }

    /// Removes and returns up to `n` requests from the head of the queue, in order.
    ///
    /// Returns fewer when fewer are queued, and an empty `Vec` when the queue is empty.
    /// Never waits for requests to arrive.
    pub fn dequeue_up_to(&self, n: usize) -> Vec<PendingRequest> {
        let mut requests = self.requests.lock();
        let take = n.min(requests.len());
        requests.drain(..take).collect()
    }

    /// The number of queued requests.
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::Address;

    use super::*;

    fn request(id: u64) -> PendingRequest {
        PendingRequest::new(id, Address::from_low_u64_be(id))
    }

    #[test]
    fn dequeue_keeps_enqueue_order() {
        let queue = RequestQueue::new();
        (1..=5).map(request).for_each(|r| queue.enqueue(r));
        assert_eq!(queue.dequeue_up_to(2), vec![request(1), request(2)]);
        assert_eq!(
            queue.dequeue_up_to(10),
            vec![request(3), request(4), request(5)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn dequeue_never_returns_more_than_asked_or_present() {
        let queue = RequestQueue::new();
        assert!(queue.dequeue_up_to(3).is_empty());
        (1..=4).map(request).for_each(|r| queue.enqueue(r));
        for n in [0, 1, 3] {
            let before = queue.len();
            let drained = queue.dequeue_up_to(n);
            assert!(drained.len() <= n);
            assert_eq!(drained.len(), n.min(before));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let queue = RequestQueue::new();
        queue.enqueue(request(7));
        queue.enqueue(request(7));
        assert_eq!(queue.dequeue_up_to(5), vec![request(7), request(7)]);
    }

    #[test]
    fn clones_share_the_same_queue() {
        let queue = RequestQueue::new();
        let listener_side = queue.clone();
        listener_side.enqueue(request(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue_up_to(1), vec![request(1)]);
        assert!(listener_side.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enqueue_and_drain_lose_nothing() {
        let queue = RequestQueue::new();
        let producers = (0..4u64)
            .map(|p| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for i in 0..250u64 {
                        queue.enqueue(request(p * 1_000 + i));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect::<Vec<_>>();
        let drainer = {
            let queue = queue.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while seen.len() < 1_000 {
                    seen.extend(queue.dequeue_up_to(3));
                    tokio::task::yield_now().await;
                }
                seen
            })
        };
        for producer in producers {
            producer.await.unwrap();
        }
        let seen = drainer.await.unwrap();
        assert_eq!(seen.len(), 1_000);
        // per producer, the order is preserved.
        for p in 0..4u64 {
            let ids = seen
                .iter()
                .map(|r| r.id.as_u64())
                .filter(|id| id / 1_000 == p)
                .collect::<Vec<_>>();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            assert_eq!(ids, sorted);
        }
    }
}
