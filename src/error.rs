use thiserror::Error;

/// Boxed static error type, for binaries that mix our errors with io errors
pub type Err = Box<dyn std::error::Error + 'static>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QaError {
  /// A noun or verb that should name a record field isn't in the lexicon
  #[error("lookup error: no record field for {0:?}")]
  UnknownField(String),
  /// A place or airline name has no canonical code
  #[error("lookup error: no canonical code for {0:?}")]
  UnknownCode(String),
  #[error("lexicon: {0}")]
  Lexicon(String),
}

impl QaError {
  /// Lookup misses point at a vocabulary gap, not at an empty answer
  pub fn is_lookup(&self) -> bool {
    matches!(self, Self::UnknownField(_) | Self::UnknownCode(_))
  }
}

pub type Result<T> = std::result::Result<T, QaError>;
