//! Purchase entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::catalog::catalog_number_prefix;
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::price::Price;

/// Condition an item was in when bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::New => write!(f, "new"),
            Condition::Used => write!(f, "used"),
            Condition::Refurbished => write!(f, "refurbished"),
        }
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            "refurbished" => Ok(Condition::Refurbished),
            _ => Err(format!("Unknown condition: {}", s)),
        }
    }
}

/// A purchase - one catalog item bought from a store, which may contain
/// several models (a train pack) and accessories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier
    pub id: EntityId,

    /// Manufacturer (e.g., "Hornby", "Bachmann")
    pub manufacturer: String,

    /// Manufacturer catalog number as printed on the box
    #[serde(default)]
    pub catalog_number: String,

    /// Family prefix derived from the catalog number
    #[serde(default)]
    pub catalog_number_prefix: String,

    /// Catalog description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub catalog_description: String,

    /// Year of the catalog the item appeared in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_year: Option<u16>,

    /// Limited edition details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited_edition: Option<String>,

    /// Date of purchase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Store or seller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub store: String,

    /// Price paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    /// Condition when bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    /// Current estimated value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Price>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Highest model position, `-1` when there are no models
    #[serde(default = "empty_position")]
    pub max_model_position: i64,

    /// Highest accessory position, `-1` when there are no accessories
    #[serde(default = "empty_position")]
    pub max_accessory_position: i64,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Who recorded this purchase
    pub author: String,
}

fn empty_position() -> i64 {
    -1
}

impl Entity for Purchase {
    const PREFIX: EntityPrefix = EntityPrefix::Pur;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        match (self.catalog_number.is_empty(), self.catalog_description.is_empty()) {
            (false, false) => format!(
                "{} {} {}",
                self.manufacturer, self.catalog_number, self.catalog_description
            ),
            (false, true) => format!("{} {}", self.manufacturer, self.catalog_number),
            (true, false) => format!("{} {}", self.manufacturer, self.catalog_description),
            (true, true) => self.manufacturer.clone(),
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl Purchase {
    /// Create a new purchase
    pub fn new(manufacturer: String, catalog_number: String, author: String) -> Self {
        let mut purchase = Self {
            id: EntityId::new(EntityPrefix::Pur),
            manufacturer,
            catalog_number: String::new(),
            catalog_number_prefix: String::new(),
            catalog_description: String::new(),
            catalog_year: None,
            limited_edition: None,
            date: None,
            store: String::new(),
            price: None,
            condition: None,
            valuation: None,
            notes: String::new(),
            max_model_position: -1,
            max_accessory_position: -1,
            created: Utc::now(),
            author,
        };
        purchase.set_catalog_number(catalog_number);
        purchase
    }

    /// Set the catalog number, keeping the derived prefix in step
    pub fn set_catalog_number(&mut self, catalog_number: String) {
        self.catalog_number_prefix = catalog_number_prefix(&catalog_number);
        self.catalog_number = catalog_number;
    }

    /// Recompute the prefix; returns true if the stored value was stale
    pub fn refresh_catalog_number_prefix(&mut self) -> bool {
        let prefix = catalog_number_prefix(&self.catalog_number);
        if prefix == self.catalog_number_prefix {
            false
        } else {
            self.catalog_number_prefix = prefix;
            true
        }
    }
}
