//! Core module - fundamental types and utilities

pub mod catalog;
pub mod collection;
pub mod config;
pub mod entity;
pub mod identity;
pub mod ordering;
pub mod session;
pub mod shortid;

pub use catalog::catalog_number_prefix;
pub use collection::{Collection, CollectionError};
pub use config::{Config, ConfigError};
pub use entity::{Entity, PurchaseItem};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use ordering::{ChildContext, ChildList, OrderedChild, OrderingError};
pub use session::{CommitStats, Orphan, PurchaseRecord, Session, SessionError};
pub use shortid::ShortIdIndex;
