use thiserror::Error;

/// Misuse of the BOM mutation surface. State is untouched when one of these
/// is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no BOM item with id '{id}'")]
    UnknownItem { id: String },

    #[error("a BOM item with id '{id}' already exists")]
    DuplicateId { id: String },

    #[error("BOM item id must not be empty")]
    EmptyId,
}
