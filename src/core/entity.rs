//! Entity trait - common interface for all record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all Yardbook records
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., `EntityPrefix::Pur`)
    const PREFIX: EntityPrefix;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// One-line description used in listings and messages
    fn title(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;
}

/// Record that belongs to a purchase
pub trait PurchaseItem: Entity {
    /// The owning purchase
    fn purchase(&self) -> &EntityId;
}
