// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-producer, single-consumer task queue with a timed dequeue.

use std::time::Duration;

use tokio::sync::mpsc;

/// Outcome of [`RequestQueue::dequeue`].
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    /// The oldest queued item.
    Item(T),
    /// Nothing arrived within the timeout.
    Timeout,
    /// Every sender was dropped and the queue is drained.
    Closed,
}

/// Consumer side of the queue.
///
/// Items come out in the order they were enqueued. Producers hold a
/// [`QueueSender`], which can be cloned freely and moved to other threads.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hs100::daemon::{Dequeued, RequestQueue};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (sender, mut queue) = RequestQueue::channel();
/// sender.enqueue("first");
///
/// assert_eq!(queue.dequeue(Duration::from_millis(10)).await, Dequeued::Item("first"));
/// assert_eq!(queue.dequeue(Duration::from_millis(10)).await, Dequeued::Timeout);
/// # }
/// ```
#[derive(Debug)]
pub struct RequestQueue<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

/// Producer side of the queue.
#[derive(Debug)]
pub struct QueueSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Appends an item without blocking.
    ///
    /// Returns `false` if the consumer is gone and the item was dropped.
    pub fn enqueue(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

impl<T> RequestQueue<T> {
    /// Creates an empty queue and its first producer handle.
    #[must_use]
    pub fn channel() -> (QueueSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueueSender { tx }, Self { rx })
    }

    /// Waits up to `timeout` for the next item.
    ///
    /// An item that is already queued is returned immediately. The timeout
    /// never fires early.
    pub async fn dequeue(&mut self, timeout: Duration) -> Dequeued<T> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(item)) => Dequeued::Item(item),
            Ok(None) => Dequeued::Closed,
            Err(_) => Dequeued::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn items_come_out_in_order() {
        let (sender, mut queue) = RequestQueue::channel();
        for i in 0..5 {
            assert!(sender.enqueue(i));
        }
        for i in 0..5 {
            assert_eq!(queue.dequeue(Duration::from_secs(1)).await, Dequeued::Item(i));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_never_early() {
        let (_sender, mut queue) = RequestQueue::<u8>::channel();
        let start = tokio::time::Instant::now();
        assert_eq!(queue.dequeue(Duration::from_secs(10)).await, Dequeued::Timeout);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn item_enqueued_while_waiting_is_returned() {
        let (sender, mut queue) = RequestQueue::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            sender.enqueue("late");
        });
        assert_eq!(queue.dequeue(Duration::from_secs(10)).await, Dequeued::Item("late"));
    }

    #[tokio::test]
    async fn producers_on_other_threads() {
        let (sender, mut queue) = RequestQueue::channel();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = sender.clone();
                std::thread::spawn(move || sender.enqueue(i))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let mut seen = Vec::new();
        for _ in 0..4 {
            match queue.dequeue(Duration::from_secs(1)).await {
                Dequeued::Item(i) => seen.push(i),
                other => panic!("unexpected {other:?}"),
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn closed_after_all_senders_drop() {
        let (sender, mut queue) = RequestQueue::channel();
        let other = sender.clone();
        sender.enqueue(1);
        drop(sender);
        drop(other);

        assert_eq!(queue.dequeue(Duration::from_secs(1)).await, Dequeued::Item(1));
        assert_eq!(queue.dequeue(Duration::from_secs(1)).await, Dequeued::Closed);
    }
}
