use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result, messages};
use crate::repositories::memo::{Memo, MemoForm, MemoLookup, MemoRepository};

/// テスト用のインメモリ実装
///
/// ストアと同じく、IDとタイムスタンプはこちらで振る。タイムスタンプは書き込みごとに必ず進む
#[derive(Default)]
pub struct InMemoryMemoRepository {
    memos: RwLock<Vec<Memo>>,
    last_tick: RwLock<Option<DateTime<Utc>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryMemoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の読み込みを失敗させる
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 以降の書き込みを失敗させる
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn tick(&self) -> DateTime<Utc> {
        let mut last = self.last_tick.write().unwrap();
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }

    fn check_write(&self, message: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DataAccess(message.to_string()));
        }
        Ok(())
    }

    fn check_read(&self, message: &str) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DataAccess(message.to_string()));
        }
        Ok(())
    }

    fn sorted(mut memos: Vec<Memo>) -> Vec<Memo> {
        memos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        memos
    }
}

#[async_trait]
impl MemoRepository for InMemoryMemoRepository {
    async fn list(&self) -> Result<Vec<Memo>> {
        self.check_read(messages::LIST_FAILED)?;
        let memos = self.memos.read().unwrap().clone();
        Ok(Self::sorted(memos))
    }

    async fn find_by_id(&self, id: Uuid) -> MemoLookup {
        if self.fail_reads.load(Ordering::SeqCst) {
            return MemoLookup::AccessFailed("connection refused".to_string());
        }
        match self.memos.read().unwrap().iter().find(|m| m.id == id) {
            Some(memo) => MemoLookup::Found(memo.clone()),
            None => MemoLookup::NotFound,
        }
    }

    async fn create(&self, form: MemoForm) -> Result<Memo> {
        self.check_write(messages::CREATE_FAILED)?;
        let now = self.tick();
        let memo = Memo {
            id: Uuid::new_v4(),
            title: form.title,
            content: form.content,
            category: form.category,
            tags: form.tags,
            summary: None,
            created_at: now,
            updated_at: now,
        };
        self.memos.write().unwrap().push(memo.clone());
        Ok(memo)
    }

    async fn update(&self, id: Uuid, form: MemoForm) -> Result<Memo> {
        self.check_write(messages::UPDATE_FAILED)?;
        let now = self.tick();
        let mut memos = self.memos.write().unwrap();
        let memo = memos
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::DataAccess(messages::UPDATE_FAILED.to_string()))?;

        memo.title = form.title;
        memo.content = form.content;
        memo.category = form.category;
        memo.tags = form.tags;
        memo.updated_at = now;
        Ok(memo.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.check_write(messages::DELETE_FAILED)?;
        self.memos.write().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Memo>> {
        self.check_read(messages::SEARCH_FAILED)?;
        let needle = query.to_lowercase();
        let memos = self
            .memos
            .read()
            .unwrap()
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&needle)
                    || m.content.to_lowercase().contains(&needle)
                    || m.tags.iter().any(|t| t == query)
            })
            .cloned()
            .collect();
        Ok(Self::sorted(memos))
    }

    async fn update_summary(&self, id: Uuid, summary: &str) -> Result<Memo> {
        self.check_write(messages::SUMMARY_SAVE_FAILED)?;
        let now = self.tick();
        let mut memos = self.memos.write().unwrap();
        let memo = memos
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::DataAccess(messages::SUMMARY_SAVE_FAILED.to_string()))?;

        memo.summary = Some(summary.to_string());
        memo.updated_at = now;
        Ok(memo.clone())
    }
}
