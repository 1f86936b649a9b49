// ── Snapshot subscriptions ──
//
// Holding a `SnapshotStream` is what registers interest with the
// coordinator: the poll task only runs cycles while one exists.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::coordinator::RouterData;

type Published = Option<Arc<RouterData>>;

/// A subscription to published router data.
///
/// Provides point-in-time access plus change notification through
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct SnapshotStream {
    current: Published,
    receiver: watch::Receiver<Published>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Published>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Data captured at subscription time (or at the last `changed()`).
    pub fn current(&self) -> Option<&Arc<RouterData>> {
        self.current.as_ref()
    }

    /// Latest published data, which may be newer than `current()`.
    pub fn latest(&self) -> Published {
        self.receiver.borrow().clone()
    }

    /// Whether a publication arrived that `changed()` has not returned yet.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next publication.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<RouterData>> {
        loop {
            self.receiver.changed().await.ok()?;
            let data = self.receiver.borrow_and_update().clone();
            self.current.clone_from(&data);
            if data.is_some() {
                return data;
            }
        }
    }

    /// Convert into a `Stream` of publications.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the coordinator's watch channel.
///
/// Yields each newly published [`RouterData`].
pub struct SnapshotWatchStream {
    inner: WatchStream<Published>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<RouterData>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(data))) => return Poll::Ready(Some(data)),
                Poll::Ready(Some(None)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
