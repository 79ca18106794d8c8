//! Model entity type - a locomotive or item of rolling stock

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, PurchaseItem};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::ordering::OrderedChild;

/// Kind of prototype the model represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Locomotive,
    Coach,
    Wagon,
    MultipleUnit,
    Departmental,
    NoPrototype,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Locomotive => write!(f, "locomotive"),
            Category::Coach => write!(f, "coach"),
            Category::Wagon => write!(f, "wagon"),
            Category::MultipleUnit => write!(f, "multiple_unit"),
            Category::Departmental => write!(f, "departmental"),
            Category::NoPrototype => write!(f, "no_prototype"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "locomotive" | "loco" => Ok(Category::Locomotive),
            "coach" => Ok(Category::Coach),
            "wagon" => Ok(Category::Wagon),
            "multiple_unit" | "mu" => Ok(Category::MultipleUnit),
            "departmental" => Ok(Category::Departmental),
            "no_prototype" => Ok(Category::NoPrototype),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// What the model is kept for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Running stock
    #[default]
    Normal,
    /// Kept boxed, not run
    CollectorItem,
    /// Kept for spares
    Parts,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Normal => write!(f, "normal"),
            Disposition::CollectorItem => write!(f, "collector_item"),
            Disposition::Parts => write!(f, "parts"),
        }
    }
}

impl std::str::FromStr for Disposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "normal" => Ok(Disposition::Normal),
            "collector_item" | "collector" => Ok(Disposition::CollectorItem),
            "parts" => Ok(Disposition::Parts),
            _ => Err(format!("Unknown disposition: {}", s)),
        }
    }
}

/// DCC decoder fitted to a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoder {
    /// Decoder catalog number (e.g., "DCC58")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub catalog_number: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,

    /// Programmed DCC address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<u16>,

    /// Sound project loaded on the decoder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
}

/// A model bought as part of a purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Unique identifier
    pub id: EntityId,

    /// Purchase this model came in
    pub purchase: EntityId,

    /// Position within the purchase's models
    pub position: i64,

    #[serde(default)]
    pub category: Category,

    /// Class (e.g., "Class 50")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,

    /// Running number (e.g., "50 033")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,

    /// Name carried (e.g., "Glorious")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub livery: String,

    /// Modelling details (weathering, fitted lights, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub era: String,

    /// Gauge or scale (e.g., "OO", "N")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gauge: String,

    #[serde(default)]
    pub disposition: Disposition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoder: Option<Decoder>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Entity for Model {
    const PREFIX: EntityPrefix = EntityPrefix::Mdl;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> String {
        let parts: Vec<&str> = [&self.class_name, &self.number, &self.name]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            format!("({})", self.category)
        } else {
            parts.join(" ")
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl PurchaseItem for Model {
    fn purchase(&self) -> &EntityId {
        &self.purchase
    }
}

impl OrderedChild for Model {
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

impl Model {
    /// Create a blank model for a purchase; its position is assigned when
    /// it is added to the purchase's models
    pub fn new(purchase: EntityId) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Mdl),
            purchase,
            position: -1,
            category: Category::default(),
            class_name: String::new(),
            number: String::new(),
            name: String::new(),
            livery: String::new(),
            details: String::new(),
            era: String::new(),
            gauge: String::new(),
            disposition: Disposition::default(),
            decoder: None,
            notes: String::new(),
            created: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        let mut model = Model::new(EntityId::new(EntityPrefix::Pur));
        model.position = 2;
        model.category = Category::MultipleUnit;
        model.class_name = "Class 101".into();
        model.decoder = Some(Decoder {
            catalog_number: "DCC58".into(),
            address: Some(3),
            ..Decoder::default()
        });

        let yaml = serde_yml::to_string(&model).unwrap();
        assert!(yaml.contains("category: multiple_unit"));
        assert!(yaml.contains("position: 2"));

        let parsed: Model = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, model.id);
        assert_eq!(parsed.purchase, model.purchase);
        assert_eq!(parsed.decoder, model.decoder);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("loco".parse::<Category>().unwrap(), Category::Locomotive);
        assert_eq!("multiple-unit".parse::<Category>().unwrap(), Category::MultipleUnit);
        assert_eq!("WAGON".parse::<Category>().unwrap(), Category::Wagon);
        assert!("tram".parse::<Category>().is_err());
    }

    #[test]
    fn test_disposition_from_str() {
        assert_eq!("collector-item".parse::<Disposition>().unwrap(), Disposition::CollectorItem);
        assert_eq!("Parts".parse::<Disposition>().unwrap(), Disposition::Parts);
        assert!("scrap".parse::<Disposition>().is_err());
    }

    #[test]
    fn test_model_title() {
        let mut model = Model::new(EntityId::new(EntityPrefix::Pur));
        assert_eq!(model.title(), "(locomotive)");
        model.class_name = "Class 50".into();
        model.number = "50 033".into();
        model.name = "Glorious".into();
        assert_eq!(model.title(), "Class 50 50 033 Glorious");
    }
}
