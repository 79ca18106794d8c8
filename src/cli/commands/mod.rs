//! CLI command implementations

pub mod acc;
pub mod completions;
pub mod config;
pub mod family;
pub mod init;
pub mod model;
pub mod prefix;
pub mod purchase;
pub mod validate;
