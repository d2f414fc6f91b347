use thiserror::Error;

use crate::field::FieldId;

#[derive(Error, Debug)]
pub enum PassEditError {
    #[error("Field {0} is already linked to another field; unlink it first")]
    AlreadyLinked(FieldId),

    #[error("Field {0} cannot be linked to itself")]
    SelfLink(FieldId),

    #[error("Field {0} is a repeat field; edit its primary instead")]
    NotPrimary(FieldId),

    #[error("Field {0} is not a repeat field")]
    NotRepeat(FieldId),

    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PassEditError>;
