//! Accessory entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, PurchaseItem};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::ordering::OrderedChild;

/// Track, scenery, controllers and other items that are not models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessory {
    pub id: EntityId,

    /// Purchase this accessory came in
    pub purchase: EntityId,

    /// Position within the purchase's accessories
    pub position: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub catalog_number: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gauge: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    pub created: DateTime<Utc>,
}

impl Entity for Accessory {
    const PREFIX: EntityPrefix = EntityPrefix::Acc;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        match (self.catalog_number.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{} {}", self.catalog_number, self.description),
            (false, true) => self.catalog_number.clone(),
            (true, _) => self.description.clone(),
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl PurchaseItem for Accessory {
    fn purchase(&self) -> &EntityId {
        &self.purchase
    }
}

impl OrderedChild for Accessory {
    type Key = EntityId;

    fn key(&self) -> &EntityId {
        &self.id
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

impl Accessory {
    pub fn new(purchase: EntityId) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Acc),
            purchase,
            position: -1,
            catalog_number: String::new(),
            description: String::new(),
            gauge: String::new(),
            notes: String::new(),
            created: Utc::now(),
        }
    }
}
