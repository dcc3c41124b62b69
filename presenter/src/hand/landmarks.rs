//! Hand landmark layout and per-hand observation data.
//!
//! Models the 21-point hand skeleton produced by the external landmark
//! detector.  Only x and y are used; any depth value is dropped on input.

use crate::error::{GestureError, Result};

// ── Landmark definitions ───────────────────────────────────

/// The 21 landmarks of a detected hand, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Fingertips in finger-vector order (thumb..pinky).
    pub fn fingertips() -> [HandLandmark; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Handedness label reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        }
    }

    /// Parse "left"/"right"; anything else is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Unknown,
        }
    }
}

// ── Point ──────────────────────────────────────────────────

/// A 2-D point in the caller's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from(p: [f32; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<[f32; 3]> for Point {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1])
    }
}

// ── Observation ────────────────────────────────────────────

/// One detected hand for one frame.
#[derive(Debug, Clone)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks: Vec<Point>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: Vec<Point>) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }

    /// Position of a single landmark.
    pub fn landmark(&self, lm: HandLandmark) -> Result<Point> {
        check_len(&self.landmarks)?;
        Ok(self.landmarks[lm.index()])
    }

    /// Centre of the landmark bounding box, the detector's notion of hand centre.
    pub fn center(&self) -> Result<Point> {
        check_len(&self.landmarks)?;
        let mut min = Point::new(f32::MAX, f32::MAX);
        let mut max = Point::new(f32::MIN, f32::MIN);
        for p in &self.landmarks[..LANDMARK_COUNT] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Ok(Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0))
    }

    /// Index fingertip, used as the pointer and pen position.
    pub fn pointer_tip(&self) -> Result<Point> {
        self.landmark(HandLandmark::IndexTip)
    }
}

pub(crate) fn check_len(landmarks: &[Point]) -> Result<()> {
    if landmarks.len() < LANDMARK_COUNT {
        return Err(GestureError::InvalidInput {
            expected: LANDMARK_COUNT,
            got: landmarks.len(),
        });
    }
    Ok(())
}
