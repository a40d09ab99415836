use thiserror::Error;

use crate::core::types::ItemRef;

#[derive(Error, Debug)]
pub enum DurabilityError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Load-time rejections. Any of these aborts startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed <{tag}> tag on {owner}: {text:?}")]
    MalformedTag {
        owner: String,
        tag: &'static str,
        text: String,
    },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{owner} references missing definition {target:?}")]
    UnknownReference { owner: String, target: ItemRef },

    #[error("Duplicate {table} id {id}")]
    DuplicateId { table: &'static str, id: u32 },

    #[error("No actor with id {0}")]
    UnknownActor(u32),
}

/// Rejection of a salvage grant by the inventory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantError {
    #[error("Inventory cannot hold {quantity} more of {item:?}")]
    CapacityExceeded { item: ItemRef, quantity: u32 },

    #[error("No definition for {0:?}")]
    UnknownDefinition(ItemRef),
}

pub type Result<T> = std::result::Result<T, DurabilityError>;
