//! Finger extension classification from a single frame of landmarks.
//!
//! Each finger except the thumb is extended when its tip sits past its PIP
//! joint along the vertical axis.  The thumb folds sideways, so it is tested
//! on the horizontal axis against its IP joint, in a direction that depends
//! on handedness and on whether the camera feed is mirrored.

use std::fmt;

use super::landmarks::{check_len, HandLandmark, HandObservation, Handedness, Point};
use crate::error::Result;

// ── Finger vector ──────────────────────────────────────────

/// Fingers in finger-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn tip(&self) -> HandLandmark {
        HandLandmark::fingertips()[self.index()]
    }
}

/// Extended (`true`) or curled state of each finger, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerVector(pub [bool; 5]);

impl FingerVector {
    pub const fn new(fingers: [bool; 5]) -> Self {
        Self(fingers)
    }

    /// Build from the 0/1 notation used in gesture tables, e.g. `[0, 1, 0, 0, 0]`.
    pub const fn from_flags(flags: [u8; 5]) -> Self {
        Self([
            flags[0] != 0,
            flags[1] != 0,
            flags[2] != 0,
            flags[3] != 0,
            flags[4] != 0,
        ])
    }

    /// Build from the low five bits; bit 0 is the thumb.
    pub fn from_bits(bits: u8) -> Self {
        let mut fingers = [false; 5];
        for (i, f) in fingers.iter_mut().enumerate() {
            *f = bits & (1 << i) != 0;
        }
        Self(fingers)
    }

    pub fn bits(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &up)| if up { acc | (1 << i) } else { acc })
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger.index()]
    }
}

impl fmt::Display for FingerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, up) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", u8::from(*up))?;
        }
        write!(f, ")")
    }
}

// ── Config ─────────────────────────────────────────────────

/// Direction in which y grows in the landmark coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YAxis {
    /// Image space: y grows downward, "up" is a smaller y.
    #[default]
    Down,
    /// Cartesian space: y grows upward.
    Up,
}

impl YAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }

    /// Map a y value into image space, where a smaller value is higher in frame.
    pub fn to_image(&self, y: f32) -> f32 {
        match self {
            Self::Down => y,
            Self::Up => -y,
        }
    }
}

/// Coordinate convention and thresholds for finger classification.
#[derive(Debug, Clone)]
pub struct FingerConfig {
    /// Orientation of the y axis.
    pub y_axis: YAxis,
    /// Camera feed is horizontally flipped (selfie view).
    pub mirrored: bool,
    /// Minimum tip-over-PIP margin for a finger to count as extended.
    pub extension_epsilon: f32,
    /// Minimum sideways tip-past-IP margin for the thumb.
    pub thumb_threshold: f32,
    /// Hand assumed when the detector gives no handedness label.
    pub default_handedness: Handedness,
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            y_axis: YAxis::Down,
            mirrored: false,
            extension_epsilon: 0.0,
            thumb_threshold: 0.0,
            default_handedness: Handedness::Unknown,
        }
    }
}

impl FingerConfig {
    /// Sign of the x displacement of an open thumb.
    ///
    /// Right hands open toward +x.  An unlabelled hand takes
    /// `default_handedness`; if that is also unknown it is treated as right,
    /// so unlabelled left hands classify the thumb backwards.
    pub fn thumb_direction(&self, handedness: Handedness) -> f32 {
        let handedness = match handedness {
            Handedness::Unknown => self.default_handedness,
            known => known,
        };
        let base = match handedness {
            Handedness::Left => -1.0,
            Handedness::Right | Handedness::Unknown => 1.0,
        };
        if self.mirrored {
            -base
        } else {
            base
        }
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:y-axis :{} :mirrored {} :extension-epsilon {:.2} :thumb-threshold {:.2} :default-hand :{})",
            self.y_axis.as_str(),
            if self.mirrored { "t" } else { "nil" },
            self.extension_epsilon,
            self.thumb_threshold,
            self.default_handedness.as_str(),
        )
    }
}

// ── Classifier ─────────────────────────────────────────────

/// Per-frame finger classifier.  Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct FingerClassifier {
    pub config: FingerConfig,
}

impl FingerClassifier {
    pub fn new(config: FingerConfig) -> Self {
        Self { config }
    }

    /// Classify a detected hand.
    pub fn classify(&self, hand: &HandObservation) -> Result<FingerVector> {
        classify_fingers(&hand.landmarks, hand.handedness, &self.config)
    }
}

/// Classify 21 landmarks into a finger vector.
///
/// Fails with `InvalidInput` if fewer than 21 points are given.  Extra points
/// are ignored.
pub fn classify_fingers(
    landmarks: &[Point],
    handedness: Handedness,
    config: &FingerConfig,
) -> Result<FingerVector> {
    check_len(landmarks)?;

    let mut fingers = [false; 5];

    let tip = landmarks[HandLandmark::ThumbTip.index()];
    let ip = landmarks[HandLandmark::ThumbIp.index()];
    let reach = (tip.x - ip.x) * config.thumb_direction(handedness);
    fingers[0] = reach > config.thumb_threshold;

    for finger in &Finger::ALL[1..] {
        let tip_idx = finger.tip().index();
        let tip = landmarks[tip_idx];
        let pip = landmarks[tip_idx - 2];
        let rise = match config.y_axis {
            YAxis::Down => pip.y - tip.y,
            YAxis::Up => tip.y - pip.y,
        };
        fingers[finger.index()] = rise > config.extension_epsilon;
    }

    Ok(FingerVector(fingers))
}

// ── Test helpers ───────────────────────────────────────────

/// Build a synthetic image-space hand showing `pattern`.
///
/// The thumb opens toward +x, which is the open direction for an unmirrored
/// right hand.
#[cfg(test)]
pub(crate) fn make_landmarks(pattern: [u8; 5]) -> Vec<Point> {
    use super::landmarks::LANDMARK_COUNT;

    let mut lm = vec![Point::default(); LANDMARK_COUNT];
    lm[HandLandmark::Wrist.index()] = Point::new(300.0, 500.0);
    lm[HandLandmark::ThumbCmc.index()] = Point::new(260.0, 460.0);
    lm[HandLandmark::ThumbMcp.index()] = Point::new(240.0, 440.0);
    lm[HandLandmark::ThumbIp.index()] = Point::new(230.0, 420.0);
    lm[HandLandmark::ThumbTip.index()] = if pattern[0] != 0 {
        Point::new(270.0, 410.0)
    } else {
        Point::new(210.0, 415.0)
    };

    for finger in &Finger::ALL[1..] {
        let tip = finger.tip().index();
        let x = 250.0 + finger.index() as f32 * 30.0;
        lm[tip - 3] = Point::new(x, 400.0);
        lm[tip - 2] = Point::new(x, 350.0);
        if pattern[finger.index()] != 0 {
            lm[tip - 1] = Point::new(x, 300.0);
            lm[tip] = Point::new(x, 250.0);
        } else {
            lm[tip - 1] = Point::new(x, 370.0);
            lm[tip] = Point::new(x, 380.0);
        }
    }
    lm
}
