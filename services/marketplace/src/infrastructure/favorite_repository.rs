/// favoritesテーブルのリポジトリ
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::database::RepositoryError;
use crate::domain::{Favorite, FavoriteKey, FavoriteWithObject, ObjectSnapshot};

const FAVORITE_COLUMNS: &str = "id, user_id, object_id, created_at";

/// お気に入り永続化用トレイト
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// ユーザーのお気に入りを物件スナップショット付きで新しい順に取得
    async fn list_for_user(&self, user_id: i32)
    -> Result<Vec<FavoriteWithObject>, RepositoryError>;

    /// 組に一致するお気に入りのIDを取得
    async fn find_id(&self, key: FavoriteKey) -> Result<Option<i32>, RepositoryError>;

    async fn insert(&self, key: FavoriteKey) -> Result<Favorite, RepositoryError>;

    /// 組に一致するお気に入りを削除し、削除した行のIDを返す
    async fn delete(&self, key: FavoriteKey) -> Result<Option<i32>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct FavoriteObjectRow {
    id: i32,
    user_id: i32,
    object_id: i32,
    created_at: Option<NaiveDateTime>,
    title: String,
    city: String,
    price: f64,
    yield_percent: f64,
    images: Vec<String>,
}

impl From<FavoriteObjectRow> for FavoriteWithObject {
    fn from(row: FavoriteObjectRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            object_id: row.object_id,
            created_at: row.created_at,
            object: ObjectSnapshot {
                title: row.title,
                city: row.city,
                price: row.price,
                yield_percent: row.yield_percent,
                images: row.images,
            },
        }
    }
}

/// FavoriteRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<FavoriteWithObject>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteObjectRow>(
            "SELECT f.id, f.user_id, f.object_id, f.created_at, \
                    o.title, o.city, \
                    COALESCE(o.price, 0)::float8 AS price, \
                    COALESCE(o.yield_percent, 0)::float8 AS yield_percent, \
                    COALESCE(o.images, '{}') AS images \
             FROM favorites f \
             JOIN investment_objects o ON o.id = f.object_id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FavoriteWithObject::from).collect())
    }

    async fn find_id(&self, key: FavoriteKey) -> Result<Option<i32>, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM favorites WHERE user_id = $1 AND object_id = $2",
        )
        .bind(key.user_id)
        .bind(key.object_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert(&self, key: FavoriteKey) -> Result<Favorite, RepositoryError> {
        let sql = format!(
            "INSERT INTO favorites (user_id, object_id) VALUES ($1, $2) RETURNING {}",
            FAVORITE_COLUMNS
        );
        let favorite = sqlx::query_as::<_, Favorite>(&sql)
            .bind(key.user_id)
            .bind(key.object_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(favorite)
    }

    async fn delete(&self, key: FavoriteKey) -> Result<Option<i32>, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "DELETE FROM favorites WHERE user_id = $1 AND object_id = $2 RETURNING id",
        )
        .bind(key.user_id)
        .bind(key.object_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}
