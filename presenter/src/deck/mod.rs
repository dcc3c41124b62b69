//! Presentation state: slide navigation, annotation strokes, and trigger debounce.

pub mod annotation;
pub mod controller;
pub mod debounce;

pub use annotation::{AnnotationLayer, Stroke};
pub use controller::{Command, ControllerConfig, PresentationController};
pub use debounce::Debouncer;
