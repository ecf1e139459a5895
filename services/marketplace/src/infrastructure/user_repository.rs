/// usersテーブルのリポジトリ
use async_trait::async_trait;
use sqlx::PgPool;

use super::database::RepositoryError;
use crate::domain::{NewUser, User};

const USER_COLUMNS: &str = "id, email, name, role, created_at";

/// ユーザー永続化用トレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// IDでユーザーを取得
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError>;

    /// メールアドレスでユーザーを取得
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// 新しい順に最大`limit`件を取得
    async fn list_recent(&self, limit: i64) -> Result<Vec<User>, RepositoryError>;

    /// ユーザーを作成し、作成された行を返す
    async fn insert(&self, user: &NewUser) -> Result<User, RepositoryError>;
}

/// UserRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC LIMIT $1",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }
}
