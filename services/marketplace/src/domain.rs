// ドメイン層モジュール
pub mod broker;
pub mod favorite;
pub mod investment_object;
pub mod investor;
pub mod object_filter;
pub mod property;
pub mod user;
pub mod validation;

// 再エクスポート
pub use broker::{Broker, BrokerUpdate, NewBroker};
pub use favorite::{Favorite, FavoriteKey, FavoriteWithObject, ObjectSnapshot};
pub use investment_object::{InvestmentObject, NewInvestmentObject, ObjectPatch};
pub use investor::{InvestorStage, Investor, InvestorUpdate, NewInvestor, TimelineEntry};
pub use object_filter::ObjectFilter;
pub use property::{NewProperty, Property, PropertyStatus, PropertyUpdate};
pub use user::{NewUser, User};
pub use validation::ValidationError;
