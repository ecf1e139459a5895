// アプリケーション層モジュール
pub mod brokers_handler;
pub mod error;
pub mod favorites_handler;
pub mod investors_handler;
pub mod marketplace_handler;
pub mod objects_handler;
pub mod properties_handler;
pub mod request;
pub mod response;
pub mod users_handler;

// 再エクスポート
pub use brokers_handler::BrokersHandler;
pub use error::HandlerError;
pub use favorites_handler::FavoritesHandler;
pub use investors_handler::InvestorsHandler;
pub use marketplace_handler::MarketplaceHandler;
pub use objects_handler::ObjectsHandler;
pub use properties_handler::PropertiesHandler;
pub use request::ApiRequest;
pub use response::{ApiResponse, CorsPolicy, BROKER_CORS, MARKETPLACE_CORS, PROPERTIES_CORS};
pub use users_handler::UsersHandler;
