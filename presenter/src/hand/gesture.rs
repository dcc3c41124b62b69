//! Gesture classification from a finger vector and hand height.
//!
//! A fixed first-match table over disjoint finger patterns.  Slide
//! navigation shapes only count while the hand is raised to the gesture
//! zone, since a stray thumb or pinky is common while drawing low in frame.

use super::fingers::FingerVector;

// ── Gesture types ──────────────────────────────────────────

/// Recognized gestures, exactly one per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    /// Thumb only, hand in the gesture zone.
    PrevSlide,
    /// Pinky only, hand in the gesture zone.
    NextSlide,
    /// Index and middle extended.
    Pointer,
    /// Index only.
    Draw,
    /// Index, middle and ring extended.
    EraseLast,
    /// Index and pinky extended.
    ClearAll,
    /// No recognized gesture, or no hand.
    #[default]
    None,
}

impl Gesture {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrevSlide => "prev-slide",
            Self::NextSlide => "next-slide",
            Self::Pointer => "pointer",
            Self::Draw => "draw",
            Self::EraseLast => "erase-last",
            Self::ClearAll => "clear-all",
            Self::None => "none",
        }
    }

    /// Parse a gesture from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prev-slide" => Some(Self::PrevSlide),
            "next-slide" => Some(Self::NextSlide),
            "pointer" => Some(Self::Pointer),
            "draw" => Some(Self::Draw),
            "erase-last" => Some(Self::EraseLast),
            "clear-all" => Some(Self::ClearAll),
            "none" | "nil" => Some(Self::None),
            _ => None,
        }
    }

    /// Slide navigation step for navigation gestures.
    pub fn slide_delta(&self) -> Option<i32> {
        match self {
            Self::PrevSlide => Some(-1),
            Self::NextSlide => Some(1),
            _ => None,
        }
    }

    /// Whether firing this gesture locks out further discrete triggers.
    pub fn arms_debounce(&self) -> bool {
        matches!(self, Self::PrevSlide | Self::NextSlide | Self::EraseLast)
    }
}

// ── Pattern table ──────────────────────────────────────────

/// Whether a table row applies at any height or only in the gesture zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Raised,
    Any,
}

/// Checked top to bottom.  Patterns are pairwise distinct, so at most one row
/// can match a given finger vector.
const GESTURE_TABLE: [(FingerVector, Zone, Gesture); 6] = [
    (FingerVector::from_flags([1, 0, 0, 0, 0]), Zone::Raised, Gesture::PrevSlide),
    (FingerVector::from_flags([0, 0, 0, 0, 1]), Zone::Raised, Gesture::NextSlide),
    (FingerVector::from_flags([0, 1, 1, 0, 0]), Zone::Any, Gesture::Pointer),
    (FingerVector::from_flags([0, 1, 0, 0, 0]), Zone::Any, Gesture::Draw),
    (FingerVector::from_flags([0, 1, 1, 1, 0]), Zone::Any, Gesture::EraseLast),
    (FingerVector::from_flags([0, 1, 0, 0, 1]), Zone::Any, Gesture::ClearAll),
];

/// Classify a finger vector.
///
/// `hand_center_y` and `threshold_y` are in the same coordinate space; the
/// hand is in the gesture zone when `hand_center_y <= threshold_y`, i.e. at
/// face height in image space.  Callers with y-up data map both values
/// through [`YAxis::to_image`](crate::hand::YAxis::to_image) first.
pub fn classify_gesture(fingers: FingerVector, hand_center_y: f32, threshold_y: f32) -> Gesture {
    let raised = hand_center_y <= threshold_y;
    GESTURE_TABLE
        .iter()
        .find(|(pattern, _, _)| *pattern == fingers)
        .and_then(|&(_, zone, gesture)| match zone {
            Zone::Raised if !raised => None,
            _ => Some(gesture),
        })
        .unwrap_or(Gesture::None)
}
