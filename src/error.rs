use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
  #[error("board {id} (submapper {submapper}) is not supported, game can't be loaded")]
  UnsupportedBoard { id: u16, submapper: u8 },

  #[error("invalid board configuration: {0}")]
  InvalidConfig(String),

  #[error("state chunk '{tag}' is {found} bytes, expected {expected}")]
  StateSizeMismatch { tag: String, expected: usize, found: usize },

  #[error("state blob truncated at offset {offset}")]
  TruncatedState { offset: usize },

  #[error("state chunk '{tag}' holds an invalid value")]
  InvalidState { tag: String },
}
