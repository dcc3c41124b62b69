//! Gesture Presenter - hand-gesture control for slide presentations
//!
//! Classifies per-frame hand landmarks into gestures and drives a
//! presentation state machine: slide navigation, a pointer, and freehand
//! annotation with undo and clear.

pub mod deck;
pub mod error;
pub mod hand;
pub mod ipc;
pub mod pipeline;

pub use deck::{AnnotationLayer, Command, ControllerConfig, Debouncer, PresentationController, Stroke};
pub use error::GestureError;
pub use hand::{FingerConfig, FingerVector, Gesture, HandObservation, Handedness, Point, YAxis};
pub use pipeline::{FrameInput, FrameOutcome, GesturePipeline, PipelineConfig};
