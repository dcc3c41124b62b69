//! Message dispatch — parse s-expression requests and route them to the session.

use lexpr::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::hand::{FingerVector, Gesture, HandObservation, Handedness, Point};
use crate::pipeline::{FrameInput, FrameOutcome, GesturePipeline, PipelineConfig};

/// One presentation session driven by messages.
pub struct Session {
    pipeline: GesturePipeline,
    /// Frame index assumed when a frame message carries none.
    next_frame: u64,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            pipeline: GesturePipeline::new(config)?,
            next_frame: 0,
        })
    }

    pub fn pipeline(&self) -> &GesturePipeline {
        &self.pipeline
    }
}

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns the response s-expression.
pub fn handle_message(session: &mut Session, raw: &str) -> String {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return error_response(0, &format!("malformed s-expression: {e}"));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(session, msg_id, &value),
        Some("status") => handle_status(session, msg_id),
        Some("config") => handle_config(session, msg_id),
        Some("navigate") => handle_navigate(session, msg_id, &value),
        Some("clear") => handle_clear(session, msg_id),
        Some("strokes") => handle_strokes(session, msg_id),
        Some("reset") => handle_reset(session, msg_id),
        Some(other) => {
            debug!(msg_type = other, "unknown message type");
            error_response(msg_id, &format!("unknown message type: {other}"))
        }
        None => error_response(msg_id, "missing :type"),
    }
}

// ── Handlers ───────────────────────────────────────────────

fn handle_frame(session: &mut Session, msg_id: i64, value: &Value) -> String {
    let frame = match get_int(value, "frame") {
        Some(f) if f < 0 => return error_response(msg_id, "negative :frame"),
        Some(f) => f as u64,
        None => session.next_frame,
    };

    let input = match frame_input(value) {
        Ok(input) => input,
        Err(reason) => return error_response(msg_id, &reason),
    };

    let (outcome, warning) = match session.pipeline.process(input, frame) {
        Ok(outcome) => (outcome, None),
        Err(e) => {
            // Drop the hand but keep the frame so the debounce clock advances.
            warn!(frame, "hand skipped: {}", e);
            match session.pipeline.process(FrameInput::NoHand, frame) {
                Ok(outcome) => (outcome, Some(e.to_string())),
                Err(e) => return error_response(msg_id, &e.to_string()),
            }
        }
    };
    session.next_frame = frame + 1;

    frame_response(session, msg_id, frame, &outcome, warning.as_deref())
}

fn handle_status(session: &mut Session, msg_id: i64) -> String {
    format!(
        "(:type :response :id {} :status :ok :presenter {})",
        msg_id,
        session.pipeline.controller().status_sexp()
    )
}

fn handle_config(session: &mut Session, msg_id: i64) -> String {
    format!(
        "(:type :response :id {} :status :ok :config {})",
        msg_id,
        session.pipeline.config_sexp()
    )
}

fn handle_navigate(session: &mut Session, msg_id: i64, value: &Value) -> String {
    let delta = match get_int(value, "delta") {
        Some(d @ (-1 | 1)) => d as i32,
        Some(_) => return error_response(msg_id, ":delta must be -1 or 1"),
        None => return error_response(msg_id, "missing :delta"),
    };
    let controller = session.pipeline.controller_mut();
    let commands = match controller.navigate(delta) {
        Some(cmd) => format!("({})", cmd.to_sexp()),
        None => "nil".to_string(),
    };
    format!(
        "(:type :response :id {} :status :ok :slide {} :commands {})",
        msg_id,
        controller.slide(),
        commands
    )
}

fn handle_clear(session: &mut Session, msg_id: i64) -> String {
    let cmd = session.pipeline.controller_mut().clear_annotations();
    format!(
        "(:type :response :id {} :status :ok :commands ({}))",
        msg_id,
        cmd.to_sexp()
    )
}

fn handle_strokes(session: &mut Session, msg_id: i64) -> String {
    let controller = session.pipeline.controller();
    format!(
        "(:type :response :id {} :status :ok :slide {} :strokes {})",
        msg_id,
        controller.slide(),
        controller.annotations().strokes_sexp()
    )
}

fn handle_reset(session: &mut Session, msg_id: i64) -> String {
    session.pipeline.controller_mut().reset();
    session.next_frame = 0;
    ok_response(msg_id)
}

// ── Frame decoding ─────────────────────────────────────────

/// Build the pipeline input from whichever hand fields the message carries.
fn frame_input(value: &Value) -> std::result::Result<FrameInput, String> {
    let tip = match get_value(value, "tip") {
        Some(v) => Some(value_point(v).ok_or("malformed :tip, expected (x y)")?),
        None => None,
    };
    let center_y = match get_value(value, "center-y") {
        Some(v) => Some(value_f32(v).ok_or("malformed :center-y")?),
        None => None,
    };

    if let Some(name) = get_keyword(value, "gesture") {
        let gesture = Gesture::parse(&name).ok_or_else(|| format!("unknown gesture: {name}"))?;
        return Ok(FrameInput::Gesture {
            gesture,
            fingertip: tip.unwrap_or_default(),
        });
    }

    if let Some(v) = get_value(value, "fingers") {
        let fingers = value_fingers(v).ok_or("malformed :fingers, expected 5 flags")?;
        let hand_center_y = center_y.ok_or(":fingers requires :center-y")?;
        return Ok(FrameInput::Fingers {
            fingers,
            hand_center_y,
            fingertip: tip.unwrap_or_default(),
        });
    }

    if let Some(v) = get_value(value, "landmarks") {
        let items = list_items(v).ok_or("malformed :landmarks, expected a list of points")?;
        let landmarks = items
            .into_iter()
            .map(value_point)
            .collect::<Option<Vec<Point>>>()
            .ok_or("malformed landmark point, expected (x y) or (x y z)")?;
        let handedness = get_keyword(value, "hand")
            .map(|h| Handedness::parse(&h))
            .unwrap_or_default();
        return Ok(FrameInput::Landmarks {
            hand: HandObservation::new(handedness, landmarks),
            hand_center_y: center_y,
            fingertip: tip,
        });
    }

    Ok(FrameInput::NoHand)
}

fn frame_response(
    session: &Session,
    msg_id: i64,
    frame: u64,
    outcome: &FrameOutcome,
    warning: Option<&str>,
) -> String {
    let commands: Vec<String> = outcome.commands.iter().map(|c| c.to_sexp()).collect();
    let fingers = outcome
        .fingers
        .map(|f| f.to_string())
        .unwrap_or_else(|| "nil".to_string());
    let mut s = format!(
        "(:type :response :id {} :status :ok :frame {} :slide {} :gesture :{} :fingers {} :commands ({})",
        msg_id,
        frame,
        session.pipeline.controller().slide(),
        outcome.gesture.as_str(),
        fingers,
        commands.join(" "),
    );
    if let Some(w) = warning {
        s.push_str(&format!(" :warning \"{}\"", escape_string(w)));
    }
    s.push(')');
    s
}

// ── Helpers ────────────────────────────────────────────────

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Find the value following `:key` in an s-expression plist.
/// Walks key/value pairs, so a value that looks like a key is never matched.
/// Accepts both `Value::Keyword("key")` and `Value::Symbol(":key")` forms.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        let Value::Cons(next) = pair.cdr() else {
            return None;
        };
        if is_key {
            return Some(next.car());
        }
        current = next.cdr();
    }
    None
}

/// Extract a scalar plist value as a string, with keyword colons stripped.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    match val {
        Value::Keyword(v) => Some(v.to_string()),
        Value::Symbol(v) => {
            let s = v.to_string();
            Some(s.strip_prefix(':').unwrap_or(&s).to_string())
        }
        Value::String(v) => Some(v.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "t" } else { "nil" }.to_string()),
        Value::Null | Value::Nil => Some("nil".to_string()),
        _ => Some(val.to_string()),
    }
}

/// Extract an integer value from an s-expression plist.
fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Elements of a proper list, or `None` for anything else.
fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            _ => return None,
        }
    }
}

fn value_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    }
}

/// `(x y)` or `(x y z)`; z is dropped.
fn value_point(value: &Value) -> Option<Point> {
    let items = list_items(value)?;
    if !(2..=3).contains(&items.len()) {
        return None;
    }
    Some(Point::new(value_f32(items[0])?, value_f32(items[1])?))
}

/// Five flags, each `0`/`1` or `nil`/`t`.
fn value_fingers(value: &Value) -> Option<FingerVector> {
    let items = list_items(value)?;
    if items.len() != 5 {
        return None;
    }
    let mut fingers = [false; 5];
    for (slot, item) in fingers.iter_mut().zip(items) {
        *slot = match item {
            Value::Number(n) => match n.as_u64()? {
                0 => false,
                1 => true,
                _ => return None,
            },
            Value::Bool(b) => *b,
            Value::Symbol(s) if s.as_ref() == "t" => true,
            Value::Symbol(s) if s.as_ref() == "nil" => false,
            Value::Nil | Value::Null => false,
            _ => return None,
        };
    }
    Some(FingerVector::new(fingers))
}
