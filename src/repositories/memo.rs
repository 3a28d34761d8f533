use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result, messages};

/// メモのカテゴリ
///
/// 未知の値はすべて`Other`として扱う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Study,
    Idea,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Study => "study",
            Category::Idea => "idea",
            Category::Other => "other",
        }
    }

    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "personal" => Category::Personal,
            "work" => Category::Work,
            "study" => Category::Study,
            "idea" => Category::Idea,
            _ => Category::Other,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
pub struct MemoList {
    pub memos: Vec<Memo>,
}

/// 作成・更新で受け取るフォームの内容（4項目すべて必須の全置換）
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemoForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// 1件取得の結果
///
/// 読み込み失敗を「見つからない」と区別して返す。どちらに倒すかは呼び出し側が決める
#[derive(Debug)]
pub enum MemoLookup {
    Found(Memo),
    NotFound,
    AccessFailed(String),
}

// DBの行
#[derive(FromRow)]
struct MemoRow {
    id: Uuid,
    title: String,
    content: String,
    category: String,
    tags: Option<Vec<String>>,
    summary: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MemoRow> for Memo {
    fn from(row: MemoRow) -> Self {
        Memo {
            id: row.id,
            title: row.title,
            content: row.content,
            category: Category::parse_lossy(&row.category),
            tags: row.tags.unwrap_or_default(),
            summary: row.summary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// 作成日時の新しい順
    async fn list(&self) -> Result<Vec<Memo>>;
    async fn find_by_id(&self, id: Uuid) -> MemoLookup;
    async fn create(&self, form: MemoForm) -> Result<Memo>;
    async fn update(&self, id: Uuid, form: MemoForm) -> Result<Memo>;
    /// 存在しないIDでも成功扱い
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// タイトル・本文の部分一致（大文字小文字を区別しない）またはタグの完全一致
    async fn search(&self, query: &str) -> Result<Vec<Memo>>;
    /// 要約のみを書き込む
    async fn update_summary(&self, id: Uuid, summary: &str) -> Result<Memo>;
}

/// ILIKE用のパターンを作る。`%`や`_`はリテラルとして扱う
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn data_access(context: &'static str, message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        AppError::DataAccess(message.to_string())
    }
}

// PostgreSQL Implementation
pub struct PostgresMemoRepository {
    pool: PgPool,
}

impl PostgresMemoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoRepository for PostgresMemoRepository {
    async fn list(&self) -> Result<Vec<Memo>> {
        let rows = sqlx::query_as::<_, MemoRow>("SELECT * FROM memos ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(data_access("Failed to fetch memos", messages::LIST_FAILED))?;

        Ok(rows.into_iter().map(Memo::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> MemoLookup {
        let result = sqlx::query_as::<_, MemoRow>("SELECT * FROM memos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => MemoLookup::Found(row.into()),
            Ok(None) => MemoLookup::NotFound,
            Err(e) => {
                tracing::error!(error = %e, memo_id = %id, "Failed to fetch memo");
                MemoLookup::AccessFailed(e.to_string())
            }
        }
    }

    async fn create(&self, form: MemoForm) -> Result<Memo> {
        let row = sqlx::query_as::<_, MemoRow>(
            "INSERT INTO memos (title, content, category, tags)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.category.as_str())
        .bind(&form.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(data_access("Failed to create memo", messages::CREATE_FAILED))?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, form: MemoForm) -> Result<Memo> {
        let row = sqlx::query_as::<_, MemoRow>(
            "UPDATE memos
             SET title = $1, content = $2, category = $3, tags = $4, updated_at = now()
             WHERE id = $5
             RETURNING *",
        )
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.category.as_str())
        .bind(&form.tags)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(data_access("Failed to update memo", messages::UPDATE_FAILED))?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                tracing::warn!(memo_id = %id, "Update target memo does not exist");
                Err(AppError::DataAccess(messages::UPDATE_FAILED.to_string()))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM memos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(data_access("Failed to delete memo", messages::DELETE_FAILED))?;

        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Memo>> {
        let rows = sqlx::query_as::<_, MemoRow>(
            "SELECT * FROM memos
             WHERE title ILIKE $1 OR content ILIKE $1 OR tags @> ARRAY[$2]::text[]
             ORDER BY created_at DESC",
        )
        .bind(like_pattern(query))
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(data_access("Failed to search memos", messages::SEARCH_FAILED))?;

        Ok(rows.into_iter().map(Memo::from).collect())
    }

    async fn update_summary(&self, id: Uuid, summary: &str) -> Result<Memo> {
        let row = sqlx::query_as::<_, MemoRow>(
            "UPDATE memos SET summary = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(summary)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(data_access("Failed to save summary to DB", messages::SUMMARY_SAVE_FAILED))?;

        row.map(Memo::from).ok_or_else(|| {
            tracing::warn!(memo_id = %id, "Summary target memo does not exist");
            AppError::DataAccess(messages::SUMMARY_SAVE_FAILED.to_string())
        })
    }
}
