// インフラ層モジュール
pub mod broker_repository;
pub mod config;
pub mod database;
pub mod favorite_repository;
pub mod investor_repository;
pub mod logging;
pub mod object_repository;
pub mod property_repository;
pub mod schema;
pub mod user_repository;

// 再エクスポート
pub use broker_repository::{BrokerRepository, PgBrokerRepository};
pub use config::{ConfigError, DatabaseConfig};
pub use database::{create_pool, shared_pool, RepositoryError};
pub use favorite_repository::{FavoriteRepository, PgFavoriteRepository};
pub use investor_repository::{InvestorRepository, PgInvestorRepository};
pub use logging::init_logging;
pub use object_repository::{InvestmentObjectRepository, PgInvestmentObjectRepository};
pub use property_repository::{PgPropertyRepository, PropertyRepository};
pub use schema::{apply_schema, SCHEMA_SQL};
pub use user_repository::{PgUserRepository, UserRepository};
