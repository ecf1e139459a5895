/// brokersテーブルのリポジトリ
use async_trait::async_trait;
use sqlx::PgPool;

use super::database::RepositoryError;
use crate::domain::{Broker, BrokerUpdate, NewBroker};

const BROKER_COLUMNS: &str = "id, email, first_name, last_name, phone, avatar, company, \
     referral_code, created_at, updated_at";

/// ブローカー永続化用トレイト
#[async_trait]
pub trait BrokerRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Broker>, RepositoryError>;

    /// 全ブローカーを新しい順に取得（件数の上限なし）
    async fn list_all(&self) -> Result<Vec<Broker>, RepositoryError>;

    /// 生成済みのIDと紹介コードでブローカーを作成する
    ///
    /// 紹介コードが重複した場合は`RepositoryError::UniqueViolation`。
    async fn insert(
        &self,
        id: &str,
        referral_code: &str,
        broker: &NewBroker,
    ) -> Result<Broker, RepositoryError>;

    /// プロフィール5項目を上書きし、更新後の行を返す
    async fn update(&self, update: &BrokerUpdate) -> Result<Option<Broker>, RepositoryError>;
}

/// BrokerRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgBrokerRepository {
    pool: PgPool,
}

impl PgBrokerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BrokerRepository for PgBrokerRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Broker>, RepositoryError> {
        let sql = format!("SELECT {} FROM brokers WHERE id = $1", BROKER_COLUMNS);
        let broker = sqlx::query_as::<_, Broker>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(broker)
    }

    async fn list_all(&self) -> Result<Vec<Broker>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM brokers ORDER BY created_at DESC",
            BROKER_COLUMNS
        );
        let brokers = sqlx::query_as::<_, Broker>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(brokers)
    }

    async fn insert(
        &self,
        id: &str,
        referral_code: &str,
        broker: &NewBroker,
    ) -> Result<Broker, RepositoryError> {
        let sql = format!(
            "INSERT INTO brokers \
             (id, email, first_name, last_name, phone, avatar, company, referral_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            BROKER_COLUMNS
        );
        let created = sqlx::query_as::<_, Broker>(&sql)
            .bind(id)
            .bind(&broker.email)
            .bind(&broker.first_name)
            .bind(&broker.last_name)
            .bind(&broker.phone)
            .bind(&broker.avatar)
            .bind(&broker.company)
            .bind(referral_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, update: &BrokerUpdate) -> Result<Option<Broker>, RepositoryError> {
        let sql = format!(
            "UPDATE brokers SET first_name = $2, last_name = $3, phone = $4, avatar = $5, \
             company = $6, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {}",
            BROKER_COLUMNS
        );
        let updated = sqlx::query_as::<_, Broker>(&sql)
            .bind(&update.id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.phone)
            .bind(&update.avatar)
            .bind(&update.company)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::user_repository::tests::timestamp;
    use std::sync::{Arc, Mutex};

    // ユニットテスト用のモックBrokerRepository
    #[derive(Debug, Clone, Default)]
    pub struct MockBrokerRepository {
        brokers: Arc<Mutex<Vec<Broker>>>,
        /// 次の操作から順に返すエラー
        errors: Arc<Mutex<Vec<RepositoryError>>>,
    }

    impl MockBrokerRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_next_error(&self, error: RepositoryError) {
            self.errors.lock().unwrap().push(error);
        }

        pub fn broker_count(&self) -> usize {
            self.brokers.lock().unwrap().len()
        }

        fn take_error(&self) -> Option<RepositoryError> {
            let mut errors = self.errors.lock().unwrap();
            (!errors.is_empty()).then(|| errors.remove(0))
        }
    }

    #[async_trait]
    impl BrokerRepository for MockBrokerRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Broker>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            Ok(self.brokers.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<Broker>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let mut brokers = self.brokers.lock().unwrap().clone();
            brokers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(brokers)
        }

        async fn insert(
            &self,
            id: &str,
            referral_code: &str,
            broker: &NewBroker,
        ) -> Result<Broker, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let mut brokers = self.brokers.lock().unwrap();
            if brokers
                .iter()
                .any(|b| b.referral_code.as_deref() == Some(referral_code))
            {
                return Err(RepositoryError::UniqueViolation(
                    "brokers_referral_code_key".to_string(),
                ));
            }
            let seq = brokers.len() as i64 + 1;
            let created = Broker {
                id: id.to_string(),
                email: broker.email.clone(),
                first_name: Some(broker.first_name.clone()),
                last_name: Some(broker.last_name.clone()),
                phone: broker.phone.clone(),
                avatar: broker.avatar.clone(),
                company: broker.company.clone(),
                referral_code: Some(referral_code.to_string()),
                created_at: timestamp(seq),
                updated_at: timestamp(seq),
            };
            brokers.push(created.clone());
            Ok(created)
        }

        async fn update(&self, update: &BrokerUpdate) -> Result<Option<Broker>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let mut brokers = self.brokers.lock().unwrap();
            let Some(broker) = brokers.iter_mut().find(|b| b.id == update.id) else {
                return Ok(None);
            };
            broker.first_name = update.first_name.clone();
            broker.last_name = update.last_name.clone();
            broker.phone = update.phone.clone();
            broker.avatar = update.avatar.clone();
            broker.company = update.company.clone();
            broker.updated_at = timestamp(1_000);
            Ok(Some(broker.clone()))
        }
    }

    #[tokio::test]
    async fn test_mock_repo_errors_are_returned_in_order() {
        let repo = MockBrokerRepository::new();
        repo.set_next_error(RepositoryError::UniqueViolation("a".to_string()));
        repo.set_next_error(RepositoryError::QueryError("b".to_string()));

        assert!(matches!(
            repo.list_all().await,
            Err(RepositoryError::UniqueViolation(_))
        ));
        assert!(matches!(
            repo.list_all().await,
            Err(RepositoryError::QueryError(_))
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
