use thiserror::Error;

pub type Result<T> = std::result::Result<T, PivotError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PivotError {
  #[error("record #{record} has no field {field:?}")]
  SchemaMismatch { field: String, record: usize },
  #[error("field {field:?} holds {value:?}, which is not a number")]
  TypeMismatch { field: String, value: String },
  #[error("invalid key shape: {0}")]
  InvalidKeyShape(String),
  #[error("measure not found: {0}")]
  MeasureNotFound(String),
  #[error("total of {field:?} does not fit a decimal")]
  Overflow { field: String },
}

impl PivotError {
  pub(crate) fn overflow(field: &str) -> Self {
    PivotError::Overflow { field: field.to_string() }
  }

  pub(crate) fn shape<S: Into<String>>(msg: S) -> Self {
    PivotError::InvalidKeyShape(msg.into())
  }
}
