use crate::domain::entities::Occurrence;
use crate::domain::value_objects::OccurrencePayload;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Spring 形式のページングレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            total_elements: len as u64,
            total_pages: 1,
            number: 0,
            size: len as u32,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}

#[async_trait]
pub trait OccurrenceSubmitter: Send + Sync {
    /// 成功時はサーバーが作成したレコードを返す。
    /// 失敗は種類を問わず「未送信」として扱われる。
    async fn submit(&self, payload: &OccurrencePayload) -> Result<Occurrence, AppError>;
}

#[async_trait]
pub trait OccurrenceLister: Send + Sync {
    async fn list(&self, page: u32, size: u32) -> Result<Page<Occurrence>, AppError>;
}
