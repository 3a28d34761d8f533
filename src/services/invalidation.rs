use tokio::sync::broadcast;

/// 無効化の対象となるエンティティのコレクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Memos,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Memos => "memos",
        }
    }
}

/// コレクションに依存するビューのキャッシュ無効化を通知する
///
/// 描画側の仕組みには依存しない。購読者は通知を受けたら再取得する
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    tx: broadcast::Sender<Collection>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.tx.subscribe()
    }

    pub fn invalidate(&self, collection: Collection) {
        // 購読者がいなくても失敗ではない
        match self.tx.send(collection) {
            Ok(receivers) => {
                tracing::debug!(collection = collection.as_str(), receivers, "Views invalidated");
            }
            Err(_) => {
                tracing::trace!(collection = collection.as_str(), "No invalidation subscribers");
            }
        }
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_invalidations() {
        let bus = InvalidationBus::default();
        let mut rx = bus.subscribe();

        bus.invalidate(Collection::Memos);

        assert_eq!(rx.recv().await.unwrap(), Collection::Memos);
    }

    #[test]
    fn invalidating_without_subscribers_is_fine() {
        let bus = InvalidationBus::new(4);
        bus.invalidate(Collection::Memos);
        bus.invalidate(Collection::Memos);
    }
}
