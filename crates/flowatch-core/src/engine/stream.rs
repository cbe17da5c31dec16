// ── Session event streams ──
//
// Subscription handle for consuming poll-cycle events. Backed by a
// `watch` channel: the buffer is exactly one event deep, a slow consumer
// only ever observes the latest snapshot, and the poller never blocks on
// delivery.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::engine::snapshot::Event;

/// A subscription to one session's poll-cycle events.
///
/// Provides both point-in-time access and reactive notification via
/// [`changed`](Self::changed) or by converting to a `Stream`.
pub struct EventStream {
    current: Arc<Event>,
    receiver: watch::Receiver<Arc<Event>>,
}

impl EventStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Event>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The event captured when the subscription was created.
    pub fn current(&self) -> &Arc<Event> {
        &self.current
    }

    /// The latest event (may be newer than `current`).
    pub fn latest(&self) -> Arc<Event> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next poll cycle, returning its event.
    /// Returns `None` once the session has stopped.
    pub async fn changed(&mut self) -> Option<Arc<Event>> {
        self.receiver.changed().await.ok()?;
        let event = self.receiver.borrow_and_update().clone();
        self.current = event.clone();
        Some(event)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> EventWatchStream {
        EventWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the session's `watch::Receiver`.
pub struct EventWatchStream {
    inner: WatchStream<Arc<Event>>,
}

impl Stream for EventWatchStream {
    type Item = Arc<Event>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin for Unpin payloads; Arc<Event> always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
