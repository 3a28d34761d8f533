use crate::{
    error::{AppError, Result, messages},
    repositories::{Memo, MemoForm, MemoLookup, MemoRepository},
    services::{Collection, InvalidationBus},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct MemoService {
    memo_repo: Arc<dyn MemoRepository>,
    invalidation: InvalidationBus,
}

impl MemoService {
    pub fn new(memo_repo: Arc<dyn MemoRepository>, invalidation: InvalidationBus) -> Self {
        Self {
            memo_repo,
            invalidation,
        }
    }

    pub async fn list(&self) -> Result<Vec<Memo>> {
        self.memo_repo.list().await
    }

    /// 読み込み失敗をそのまま返す1件取得
    pub async fn lookup(&self, id: Uuid) -> MemoLookup {
        self.memo_repo.find_by_id(id).await
    }

    /// 1件取得。読み込み失敗はログに残して「見つからない」として扱う
    pub async fn find_by_id(&self, id: Uuid) -> Result<Memo> {
        match self.lookup(id).await {
            MemoLookup::Found(memo) => Ok(memo),
            MemoLookup::NotFound => Err(AppError::NotFound(messages::NOT_FOUND.to_string())),
            MemoLookup::AccessFailed(reason) => {
                tracing::warn!(memo_id = %id, %reason, "Memo lookup failed, treating as not found");
                Err(AppError::NotFound(messages::NOT_FOUND.to_string()))
            }
        }
    }

    pub async fn create(&self, form: MemoForm) -> Result<Memo> {
        let memo = self.memo_repo.create(form).await?;
        tracing::info!(memo_id = %memo.id, "Memo created");
        self.invalidation.invalidate(Collection::Memos);
        Ok(memo)
    }

    // 4項目すべてを置き換える
    pub async fn update(&self, id: Uuid, form: MemoForm) -> Result<Memo> {
        let memo = self.memo_repo.update(id, form).await?;
        tracing::info!(memo_id = %id, "Memo updated");
        self.invalidation.invalidate(Collection::Memos);
        Ok(memo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.memo_repo.delete(id).await?;
        tracing::info!(memo_id = %id, "Memo deleted");
        self.invalidation.invalidate(Collection::Memos);
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Memo>> {
        self.memo_repo.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{Category, InMemoryMemoRepository};

    fn form(title: &str, content: &str, tags: &[&str]) -> MemoForm {
        MemoForm {
            title: title.to_string(),
            content: content.to_string(),
            category: Category::Personal,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn service() -> (MemoService, Arc<InMemoryMemoRepository>, InvalidationBus) {
        let repo = Arc::new(InMemoryMemoRepository::new());
        let bus = InvalidationBus::default();
        (MemoService::new(repo.clone(), bus.clone()), repo, bus)
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let (service, _, _) = service();
        let created = service
            .create(form("장보기", "우유, 계란", &["home", "weekly"]))
            .await
            .unwrap();

        let fetched = service.find_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, "장보기");
        assert_eq!(fetched.content, "우유, 계란");
        assert_eq!(fetched.category, Category::Personal);
        assert_eq!(fetched.tags, vec!["home", "weekly"]);
        assert_eq!(fetched.summary, None);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_advances_timestamp() {
        let (service, _, _) = service();
        let created = service.create(form("a", "b", &["x"])).await.unwrap();

        let replacement = MemoForm {
            title: "new title".into(),
            content: "new content".into(),
            category: Category::Work,
            tags: vec![],
        };
        service.update(created.id, replacement).await.unwrap();

        let fetched = service.find_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, "new title");
        assert_eq!(fetched.content, "new content");
        assert_eq!(fetched.category, Category::Work);
        assert!(fetched.tags.is_empty());
        assert!(fetched.updated_at > created.updated_at);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_memo_is_data_access_error() {
        let (service, _, _) = service();
        let err = service
            .update(Uuid::new_v4(), form("a", "b", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataAccess(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (service, _, _) = service();
        let created = service.create(form("a", "b", &[])).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.find_by_id(created.id).await,
            Err(AppError::NotFound(_))
        ));
        service.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (service, _, _) = service();
        for i in 0..5 {
            service.create(form(&format!("memo {i}"), "c", &[])).await.unwrap();
        }

        let memos = service.list().await.unwrap();
        assert_eq!(memos.len(), 5);
        assert!(memos.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(memos[0].title, "memo 4");
    }

    #[tokio::test]
    async fn search_matches_title_content_and_exact_tag() {
        let (service, _, _) = service();
        let a = service.create(form("Trip to Seoul", "", &[])).await.unwrap();
        let b = service.create(form("plans", "", &["seoul"])).await.unwrap();
        service.create(form("misc", "nothing related", &[])).await.unwrap();
        service.create(form("tagged", "", &["seoul-trip"])).await.unwrap();

        let found = service.search("seoul").await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_on_title_and_content() {
        let (service, _, _) = service();
        let by_title = service.create(form("seoul food", "", &[])).await.unwrap();
        let by_content = service
            .create(form("weekend", "Visiting SEOUL next week", &[]))
            .await
            .unwrap();
        service.create(form("plans", "", &["seoul"])).await.unwrap();

        let found = service.search("SeOuL").await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![by_content.id, by_title.id]);
    }

    #[tokio::test]
    async fn read_failure_degrades_to_not_found() {
        let (service, repo, _) = service();
        let created = service.create(form("a", "b", &[])).await.unwrap();
        repo.fail_reads(true);

        assert!(matches!(
            service.lookup(created.id).await,
            MemoLookup::AccessFailed(_)
        ));
        assert!(matches!(
            service.find_by_id(created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.list().await, Err(AppError::DataAccess(_))));
    }

    #[tokio::test]
    async fn mutations_invalidate_memo_views() {
        let (service, repo, bus) = service();
        let mut rx = bus.subscribe();

        let created = service.create(form("a", "b", &[])).await.unwrap();
        service.update(created.id, form("c", "d", &[])).await.unwrap();
        service.delete(created.id).await.unwrap();
        for _ in 0..3 {
            assert_eq!(rx.try_recv().unwrap(), Collection::Memos);
        }

        // 失敗した書き込みでは通知しない
        repo.fail_writes(true);
        assert!(service.create(form("a", "b", &[])).await.is_err());
        assert!(rx.try_recv().is_err());
    }
}
