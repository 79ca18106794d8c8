//! Entity type definitions

pub mod accessory;
pub mod model;
pub mod price;
pub mod purchase;

pub use accessory::Accessory;
pub use model::{Category, Decoder, Disposition, Model};
pub use price::{Currency, Price};
pub use purchase::{Condition, Purchase};
