//! Per-frame pipeline: hand input → finger vector → gesture → controller.

use tracing::{debug, trace};

use crate::deck::{Command, ControllerConfig, PresentationController};
use crate::error::Result;
use crate::hand::{
    classify_gesture, FingerClassifier, FingerConfig, FingerVector, Gesture, HandObservation,
    Point,
};

/// Hand data for one frame, at whatever stage the caller has it.
#[derive(Debug, Clone)]
pub enum FrameInput {
    /// No hand detected.
    NoHand,
    /// Gesture already classified upstream.
    Gesture { gesture: Gesture, fingertip: Point },
    /// Finger vector with the hand centre height.
    Fingers {
        fingers: FingerVector,
        hand_center_y: f32,
        fingertip: Point,
    },
    /// Raw landmarks.  Centre and fingertip default to the bounding-box
    /// centre and the index fingertip.
    Landmarks {
        hand: HandObservation,
        hand_center_y: Option<f32>,
        fingertip: Option<Point>,
    },
}

/// Combined configuration for a session.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub fingers: FingerConfig,
    pub controller: ControllerConfig,
}

impl PipelineConfig {
    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:controller {} :fingers {})",
            self.controller.config_sexp(),
            self.fingers.config_sexp(),
        )
    }
}

/// Result of one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub gesture: Gesture,
    pub fingers: Option<FingerVector>,
    pub commands: Vec<Command>,
}

/// Owns the classifier and controller for a session.
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    classifier: FingerClassifier,
    controller: PresentationController,
}

impl GesturePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            classifier: FingerClassifier::new(config.fingers),
            controller: PresentationController::new(config.controller)?,
        })
    }

    pub fn controller(&self) -> &PresentationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PresentationController {
        &mut self.controller
    }

    pub fn finger_config(&self) -> &FingerConfig {
        &self.classifier.config
    }

    pub fn config_sexp(&self) -> String {
        PipelineConfig {
            fingers: self.classifier.config.clone(),
            controller: self.controller.config().clone(),
        }
        .config_sexp()
    }

    /// Classify and apply one frame.
    ///
    /// Malformed landmarks fail with `InvalidInput` before any state changes;
    /// the caller decides whether to resubmit the frame as `NoHand`.
    pub fn process(&mut self, input: FrameInput, frame: u64) -> Result<FrameOutcome> {
        let axis = self.classifier.config.y_axis;
        let threshold = axis.to_image(self.controller.config().zone_threshold_y);

        let (gesture, fingers, fingertip) = match input {
            FrameInput::NoHand => (Gesture::None, None, Point::default()),
            FrameInput::Gesture { gesture, fingertip } => (gesture, None, fingertip),
            FrameInput::Fingers {
                fingers,
                hand_center_y,
                fingertip,
            } => (
                classify_gesture(fingers, axis.to_image(hand_center_y), threshold),
                Some(fingers),
                fingertip,
            ),
            FrameInput::Landmarks {
                hand,
                hand_center_y,
                fingertip,
            } => {
                let fingers = self.classifier.classify(&hand)?;
                let center_y = match hand_center_y {
                    Some(y) => y,
                    None => hand.center()?.y,
                };
                let tip = match fingertip {
                    Some(p) => p,
                    None => hand.pointer_tip()?,
                };
                trace!(frame, %fingers, handedness = hand.handedness.as_str(), center_y, "classified hand");
                let gesture = classify_gesture(fingers, axis.to_image(center_y), threshold);
                (gesture, Some(fingers), tip)
            }
        };

        let commands = self.controller.step(gesture, fingertip, frame);
        if gesture != Gesture::None {
            debug!(frame, gesture = gesture.as_str(), commands = commands.len(), "frame processed");
        }

        Ok(FrameOutcome {
            gesture,
            fingers,
            commands,
        })
    }
}
