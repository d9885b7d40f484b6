use async_trait::async_trait;
use serde_json::Value;

use super::model::*;
use super::query::{Query, RowRange};

/// The black-box capability every backend provides: run one query.
#[async_trait]
pub trait Store: Send + Sync {
    async fn execute(&self, query: &Query) -> StoreResult<QueryResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct RowPage {
    pub rows: Vec<MovieRecord>,
    pub total: u64,
}

#[async_trait]
pub trait MovieRepo: Send + Sync {
    async fn list_movies(&self, range: RowRange) -> StoreResult<RowPage>;
}

#[async_trait]
pub trait AttendanceRepo: Send + Sync {
    /// Returns the row as stored, if the store echoed one back.
    async fn insert_attendance(&self, record: &AttendanceRecord) -> StoreResult<Option<Value>>;
}

#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    async fn insert_favorite(&self, record: &FavoriteRecord) -> StoreResult<Option<Value>>;
    /// Newest first.
    async fn list_favorites(&self, user_id: &str) -> StoreResult<Vec<Value>>;
}

#[async_trait]
impl<S: Store + ?Sized> MovieRepo for S {
    async fn list_movies(&self, range: RowRange) -> StoreResult<RowPage> {
        let query = Query::table(MOVIES)
            .select("*")
            .count_exact()
            .range(range.start, range.end);
        let res = self.execute(&query).await?;
        Ok(RowPage {
            rows: res.rows,
            total: res.count.unwrap_or(0),
        })
    }
}

#[async_trait]
impl<S: Store + ?Sized> AttendanceRepo for S {
    async fn insert_attendance(&self, record: &AttendanceRecord) -> StoreResult<Option<Value>> {
        let query = Query::table(ATTENDANCE).insert(serde_json::to_value(record)?);
        let res = self.execute(&query).await?;
        Ok(res.rows.into_iter().next())
    }
}

#[async_trait]
impl<S: Store + ?Sized> FavoriteRepo for S {
    async fn insert_favorite(&self, record: &FavoriteRecord) -> StoreResult<Option<Value>> {
        let query = Query::table(FAVORITES).insert(serde_json::to_value(record)?);
        let res = self.execute(&query).await?;
        Ok(res.rows.into_iter().next())
    }

    async fn list_favorites(&self, user_id: &str) -> StoreResult<Vec<Value>> {
        let query = Query::table(FAVORITES)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", true);
        Ok(self.execute(&query).await?.rows)
    }
}
