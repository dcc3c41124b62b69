//! Error types for gesture classification and annotation state.

use thiserror::Error;

/// Errors raised by the classifiers and the annotation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// Landmark set is too short to classify.
    #[error("invalid input: expected {expected} landmarks, got {got}")]
    InvalidInput { expected: usize, got: usize },

    /// `append_point` was called with no stroke in progress.
    #[error("no active stroke to append to")]
    NoActiveStroke,

    /// Session configuration that cannot describe a presentation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GestureError>;
