//! Unified filter enums for CLI commands
//!
//! This module consolidates filter types used across list commands,
//! ensuring consistent behavior.

use clap::ValueEnum;

use crate::entities::{Category, Condition};

/// Category filter for model lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    Locomotive,
    Coach,
    Wagon,
    MultipleUnit,
    Departmental,
    NoPrototype,
    /// Anything that is not a locomotive or multiple unit
    RollingStock,
    /// All categories - default
    #[default]
    All,
}

impl CategoryFilter {
    /// Check if a Category matches this filter
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            CategoryFilter::Locomotive => *category == Category::Locomotive,
            CategoryFilter::Coach => *category == Category::Coach,
            CategoryFilter::Wagon => *category == Category::Wagon,
            CategoryFilter::MultipleUnit => *category == Category::MultipleUnit,
            CategoryFilter::Departmental => *category == Category::Departmental,
            CategoryFilter::NoPrototype => *category == Category::NoPrototype,
            CategoryFilter::RollingStock => {
                !matches!(category, Category::Locomotive | Category::MultipleUnit)
            }
            CategoryFilter::All => true,
        }
    }
}

/// Condition filter for purchase lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ConditionFilter {
    New,
    Used,
    Refurbished,
    /// Purchases with no recorded condition
    Unknown,
    /// All purchases - default
    #[default]
    All,
}

impl ConditionFilter {
    /// Check if an optional Condition matches this filter
    pub fn matches(&self, condition: Option<Condition>) -> bool {
        match self {
            ConditionFilter::New => condition == Some(Condition::New),
            ConditionFilter::Used => condition == Some(Condition::Used),
            ConditionFilter::Refurbished => condition == Some(Condition::Refurbished),
            ConditionFilter::Unknown => condition.is_none(),
            ConditionFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter_matches() {
        assert!(CategoryFilter::Wagon.matches(&Category::Wagon));
        assert!(!CategoryFilter::Wagon.matches(&Category::Coach));

        assert!(CategoryFilter::RollingStock.matches(&Category::Coach));
        assert!(CategoryFilter::RollingStock.matches(&Category::Departmental));
        assert!(!CategoryFilter::RollingStock.matches(&Category::Locomotive));
        assert!(!CategoryFilter::RollingStock.matches(&Category::MultipleUnit));

        assert!(CategoryFilter::All.matches(&Category::NoPrototype));
    }

    #[test]
    fn test_condition_filter_matches() {
        assert!(ConditionFilter::Used.matches(Some(Condition::Used)));
        assert!(!ConditionFilter::Used.matches(Some(Condition::New)));
        assert!(ConditionFilter::Unknown.matches(None));
        assert!(!ConditionFilter::New.matches(None));
        assert!(ConditionFilter::All.matches(None));
    }
}
