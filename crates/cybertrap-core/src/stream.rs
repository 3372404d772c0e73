// ── Store subscriptions ──
//
// A screen holds one `EntityStream` per collection it shows and redraws
// whenever the store swaps in a new snapshot.

use std::sync::Arc;

use tokio::sync::watch;

/// Snapshot-plus-notification handle onto one store collection.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Arc<Vec<Arc<T>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<Vec<Arc<T>>>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot as of subscription or the last [`changed`](Self::changed).
    pub fn current(&self) -> &Arc<Vec<Arc<T>>> {
        &self.current
    }

    /// Next replacement snapshot; `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.receiver.changed().await.ok()?;
        self.current = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.current))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_yields_the_replacement_and_updates_current() {
        let (tx, rx) = watch::channel(Arc::new(vec![Arc::new(1)]));
        let mut stream = EntityStream::new(rx);
        assert_eq!(stream.current().len(), 1);

        tx.send(Arc::new(vec![Arc::new(2), Arc::new(3)])).unwrap();
        let next = stream.changed().await.unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(*stream.current()[0], 2);

        drop(tx);
        assert!(stream.changed().await.is_none());
    }
}
