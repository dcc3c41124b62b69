//! Hand input: landmark layout, finger extension, and gesture classification.
//!
//! Everything here is pure per-frame computation with no state carried
//! between frames.

pub mod fingers;
pub mod gesture;
pub mod landmarks;

pub use fingers::{classify_fingers, Finger, FingerClassifier, FingerConfig, FingerVector, YAxis};
pub use gesture::{classify_gesture, Gesture};
pub use landmarks::{HandLandmark, HandObservation, Handedness, Point, LANDMARK_COUNT};
