//! Presentation controller — the per-frame gesture-to-action state machine.
//!
//! Owns the slide position, the annotation layer for the current slide and
//! the trigger debouncer.  All mutation goes through `step` (gesture input)
//! or the manual `navigate`/`clear_annotations`/`reset` calls.

use tracing::{debug, error, info, trace, warn};

use super::annotation::AnnotationLayer;
use super::debounce::Debouncer;
use crate::error::{GestureError, Result};
use crate::hand::{Gesture, Point};

// ── Commands ───────────────────────────────────────────────

/// Side effect for the renderer to apply after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move by one slide (`-1` or `+1`).  The new slide starts unannotated.
    ChangeSlide(i32),
    /// Draw the pointer marker at this position.
    ShowPointerAt(Point),
    /// Extend the current pen stroke to this position.
    DrawPointAt(Point),
    /// Remove all annotations from the current slide.
    ClearLayer,
    /// Nothing to do this frame.
    NoOp,
}

impl Command {
    /// Render as an s-expression plist for IPC.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::ChangeSlide(delta) => format!("(:change-slide :delta {})", delta),
            Self::ShowPointerAt(p) => format!("(:pointer :x {} :y {})", p.x, p.y),
            Self::DrawPointAt(p) => format!("(:draw :x {} :y {})", p.x, p.y),
            Self::ClearLayer => "(:clear-layer)".to_string(),
            Self::NoOp => "(:noop)".to_string(),
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Session configuration.  Fixed for the lifetime of a controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Number of slides in the deck.  Must be at least 1.
    pub slide_count: usize,
    /// Frames to ignore further triggers after one fires.
    pub debounce_delay_frames: u32,
    /// Navigation is accepted while the hand centre is at or above this
    /// height, in the landmark space's own y direction.
    pub zone_threshold_y: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            slide_count: 1,
            debounce_delay_frames: 10,
            zone_threshold_y: 500.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.slide_count == 0 {
            return Err(GestureError::InvalidConfig(
                "slide count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:slide-count {} :debounce-frames {} :zone-threshold {:.1})",
            self.slide_count, self.debounce_delay_frames, self.zone_threshold_y,
        )
    }
}

// ── Controller ─────────────────────────────────────────────

/// Per-session presentation state.
#[derive(Debug, Clone)]
pub struct PresentationController {
    config: ControllerConfig,
    /// Current slide, always `< config.slide_count`.
    slide: usize,
    layer: AnnotationLayer,
    debounce: Debouncer,
    last_gesture: Gesture,
    last_frame: Option<u64>,
}

impl PresentationController {
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            slide: 0,
            layer: AnnotationLayer::new(),
            debounce: Debouncer::new(),
            last_gesture: Gesture::None,
            last_frame: None,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn slide_count(&self) -> usize {
        self.config.slide_count
    }

    pub fn annotations(&self) -> &AnnotationLayer {
        &self.layer
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debounce
    }

    pub fn last_gesture(&self) -> Gesture {
        self.last_gesture
    }

    /// Process one frame's gesture.  Always returns at least one command.
    pub fn step(&mut self, gesture: Gesture, fingertip: Point, frame: u64) -> Vec<Command> {
        if let Some(prev) = self.last_frame {
            if frame <= prev {
                warn!(frame, prev, "frame index did not advance");
            }
        }
        self.last_frame = Some(frame);
        self.last_gesture = gesture;

        let mut commands = Vec::new();

        // Any break in the draw gesture lifts the pen.
        if gesture != Gesture::Draw {
            self.layer.end_stroke();
        }

        match gesture {
            Gesture::PrevSlide | Gesture::NextSlide | Gesture::EraseLast => {
                self.trigger(gesture, frame, &mut commands)
            }
            Gesture::Pointer => commands.push(Command::ShowPointerAt(fingertip)),
            Gesture::Draw => {
                if !self.layer.has_active_stroke() {
                    self.layer.start_stroke();
                    debug!(frame, stroke = self.layer.len() - 1, "stroke started");
                }
                match self.layer.append_point(fingertip) {
                    Ok(()) => commands.push(Command::DrawPointAt(fingertip)),
                    Err(e) => error!(frame, "draw skipped: {}", e),
                }
            }
            Gesture::ClearAll => {
                self.layer.clear_all();
                commands.push(Command::ClearLayer);
            }
            Gesture::None => {}
        }

        self.debounce.tick();

        if commands.is_empty() {
            commands.push(Command::NoOp);
        }
        commands
    }

    /// Discrete triggers: navigation and erase.  Each fires at most once per
    /// debounce window and only arms the debouncer when it took effect.
    fn trigger(&mut self, gesture: Gesture, frame: u64, commands: &mut Vec<Command>) {
        if !self.debounce.should_fire() {
            trace!(frame, gesture = gesture.as_str(), "debounced");
            return;
        }
        let fired = match gesture.slide_delta() {
            Some(delta) if self.change_slide(delta) => {
                commands.push(Command::ChangeSlide(delta));
                true
            }
            Some(delta) => {
                debug!(frame, slide = self.slide, delta, "navigation at deck boundary");
                false
            }
            None => {
                self.layer.undo_last();
                debug!(frame, strokes = self.layer.len(), "erased last stroke");
                true
            }
        };
        if fired && gesture.arms_debounce() {
            self.debounce.arm(self.config.debounce_delay_frames);
        }
    }

    /// Manual slide change, not subject to debounce.
    ///
    /// Returns `None` when the move would leave the deck.
    pub fn navigate(&mut self, delta: i32) -> Option<Command> {
        self.layer.end_stroke();
        self.change_slide(delta).then_some(Command::ChangeSlide(delta))
    }

    /// Manual clear of the current slide's annotations.
    pub fn clear_annotations(&mut self) -> Command {
        self.layer.clear_all();
        Command::ClearLayer
    }

    /// Back to the first slide with no annotations and an idle debouncer.
    pub fn reset(&mut self) {
        self.slide = 0;
        self.layer.clear_all();
        self.debounce.reset();
        self.last_gesture = Gesture::None;
        self.last_frame = None;
    }

    /// Move by `delta` if the target is inside the deck.  A new slide always
    /// starts with an empty annotation layer.
    fn change_slide(&mut self, delta: i32) -> bool {
        let target = self.slide as i64 + i64::from(delta);
        if target < 0 || target >= self.config.slide_count as i64 {
            return false;
        }
        self.slide = target as usize;
        self.layer.clear_all();
        info!("slide {} / {}", self.slide + 1, self.config.slide_count);
        true
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:slide {} :slide-count {} :label \"{} / {}\" :strokes {} :points {} :drawing {} :gesture :{} :debounce {})",
            self.slide,
            self.config.slide_count,
            self.slide + 1,
            self.config.slide_count,
            self.layer.len(),
            self.layer.point_count(),
            if self.layer.has_active_stroke() { "t" } else { "nil" },
            self.last_gesture.as_str(),
            self.debounce.status_sexp(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(slides: usize, delay: u32) -> PresentationController {
        PresentationController::new(ControllerConfig {
            slide_count: slides,
            debounce_delay_frames: delay,
            zone_threshold_y: 500.0,
        })
        .unwrap()
    }

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn has_change(cmds: &[Command]) -> bool {
        cmds.iter().any(|c| matches!(c, Command::ChangeSlide(_)))
    }

    #[test]
    fn test_zero_slides_rejected() {
        let err = PresentationController::new(ControllerConfig {
            slide_count: 0,
            ..ControllerConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, GestureError::InvalidConfig(_)));
    }

    #[test]
    fn test_next_slide() {
        let mut c = controller(3, 10);
        let cmds = c.step(Gesture::NextSlide, p(0.0, 0.0), 0);
        assert_eq!(cmds, vec![Command::ChangeSlide(1)]);
        assert_eq!(c.slide(), 1);
        assert!(c.debouncer().is_locked());
    }

    #[test]
    fn test_prev_at_first_slide_is_ignored() {
        let mut c = controller(3, 10);
        let cmds = c.step(Gesture::PrevSlide, p(0.0, 0.0), 0);
        assert_eq!(cmds, vec![Command::NoOp]);
        assert_eq!(c.slide(), 0);
        assert!(!c.debouncer().is_locked());
    }

    #[test]
    fn test_next_at_last_slide_is_ignored() {
        let mut c = controller(2, 0);
        assert!(has_change(&c.step(Gesture::NextSlide, p(0.0, 0.0), 0)));
        assert_eq!(c.slide(), 1);
        let cmds = c.step(Gesture::NextSlide, p(0.0, 0.0), 1);
        assert!(!has_change(&cmds));
        assert_eq!(c.slide(), 1);
    }

    #[test]
    fn test_single_slide_deck_never_moves() {
        let mut c = controller(1, 0);
        for (frame, g) in [Gesture::NextSlide, Gesture::PrevSlide].into_iter().enumerate() {
            assert_eq!(c.step(g, p(0.0, 0.0), frame as u64), vec![Command::NoOp]);
        }
        assert_eq!(c.slide(), 0);
    }

    #[test]
    fn test_debounce_window_blocks_through_delay() {
        let mut c = controller(5, 10);
        c.navigate(1);
        c.navigate(1);
        assert_eq!(c.slide(), 2);

        assert!(has_change(&c.step(Gesture::PrevSlide, p(0.0, 0.0), 0)));
        for frame in 1..=10 {
            let g = if frame % 2 == 0 {
                Gesture::NextSlide
            } else {
                Gesture::PrevSlide
            };
            let cmds = c.step(g, p(0.0, 0.0), frame);
            assert!(!has_change(&cmds), "fired at frame {frame}");
        }
        assert_eq!(c.slide(), 1);
        let cmds = c.step(Gesture::NextSlide, p(0.0, 0.0), 11);
        assert_eq!(cmds, vec![Command::ChangeSlide(1)]);
        assert_eq!(c.slide(), 2);
    }

    #[test]
    fn test_erase_blocked_by_navigation_debounce() {
        let mut c = controller(3, 3);
        c.step(Gesture::Draw, p(1.0, 1.0), 0);
        c.step(Gesture::NextSlide, p(0.0, 0.0), 1);
        c.step(Gesture::Draw, p(1.0, 1.0), 2);
        c.step(Gesture::EraseLast, p(0.0, 0.0), 3);
        assert_eq!(c.annotations().len(), 1);
    }

    #[test]
    fn test_held_erase_removes_one_stroke_per_window() {
        let mut c = controller(1, 10);
        for frame in 0..3 {
            c.step(Gesture::Draw, p(frame as f32, 0.0), frame * 2);
            c.step(Gesture::None, p(0.0, 0.0), frame * 2 + 1);
        }
        assert_eq!(c.annotations().len(), 3);

        for frame in 10..21 {
            c.step(Gesture::EraseLast, p(0.0, 0.0), frame);
        }
        assert_eq!(c.annotations().len(), 2);
        c.step(Gesture::EraseLast, p(0.0, 0.0), 21);
        assert_eq!(c.annotations().len(), 1);
    }

    #[test]
    fn test_erase_emits_no_render_command() {
        let mut c = controller(1, 10);
        c.step(Gesture::Draw, p(1.0, 1.0), 0);
        let cmds = c.step(Gesture::EraseLast, p(0.0, 0.0), 1);
        assert_eq!(cmds, vec![Command::NoOp]);
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn test_erase_on_empty_layer_still_arms() {
        let mut c = controller(2, 5);
        c.step(Gesture::EraseLast, p(0.0, 0.0), 0);
        assert!(c.debouncer().is_locked());
        assert!(!has_change(&c.step(Gesture::NextSlide, p(0.0, 0.0), 1)));
    }

    #[test]
    fn test_pointer_does_not_touch_state() {
        let mut c = controller(3, 10);
        let cmds = c.step(Gesture::Pointer, p(10.0, 20.0), 0);
        assert_eq!(cmds, vec![Command::ShowPointerAt(p(10.0, 20.0))]);
        assert!(c.annotations().is_empty());
        assert!(!c.debouncer().is_locked());
    }

    #[test]
    fn test_sustained_draw_is_one_stroke() {
        let mut c = controller(1, 10);
        let pts = [p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0), p(4.0, 4.0), p(5.0, 5.0)];
        for (i, pt) in pts.iter().enumerate() {
            let cmds = c.step(Gesture::Draw, *pt, i as u64 + 1);
            assert_eq!(cmds, vec![Command::DrawPointAt(*pt)]);
        }
        let strokes = c.annotations().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points, pts.to_vec());
    }

    #[test]
    fn test_interrupted_draw_starts_new_stroke() {
        let mut c = controller(1, 10);
        c.step(Gesture::Draw, p(1.0, 1.0), 1);
        c.step(Gesture::Draw, p(2.0, 2.0), 2);
        c.step(Gesture::None, p(0.0, 0.0), 3);
        c.step(Gesture::Draw, p(4.0, 4.0), 4);
        c.step(Gesture::Draw, p(5.0, 5.0), 5);
        let strokes = c.annotations().strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].points, vec![p(1.0, 1.0), p(2.0, 2.0)]);
        assert_eq!(strokes[1].points, vec![p(4.0, 4.0), p(5.0, 5.0)]);
    }

    #[test]
    fn test_pointer_breaks_stroke() {
        let mut c = controller(1, 10);
        c.step(Gesture::Draw, p(1.0, 1.0), 1);
        c.step(Gesture::Pointer, p(1.5, 1.5), 2);
        c.step(Gesture::Draw, p(2.0, 2.0), 3);
        assert_eq!(c.annotations().len(), 2);
    }

    #[test]
    fn test_clear_all_not_debounced() {
        let mut c = controller(3, 10);
        c.step(Gesture::Draw, p(1.0, 1.0), 0);
        c.step(Gesture::NextSlide, p(0.0, 0.0), 1);
        c.step(Gesture::Draw, p(1.0, 1.0), 2);
        let cmds = c.step(Gesture::ClearAll, p(0.0, 0.0), 3);
        assert_eq!(cmds, vec![Command::ClearLayer]);
        assert!(c.annotations().is_empty());
        let cmds = c.step(Gesture::ClearAll, p(0.0, 0.0), 4);
        assert_eq!(cmds, vec![Command::ClearLayer]);
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn test_slide_change_clears_annotations() {
        let mut c = controller(3, 0);
        c.step(Gesture::Draw, p(1.0, 1.0), 0);
        c.step(Gesture::Draw, p(2.0, 2.0), 1);
        assert!(!c.annotations().is_empty());
        assert!(has_change(&c.step(Gesture::NextSlide, p(0.0, 0.0), 2)));
        assert!(c.annotations().is_empty());

        c.step(Gesture::Draw, p(1.0, 1.0), 3);
        assert!(has_change(&c.step(Gesture::PrevSlide, p(0.0, 0.0), 4)));
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn test_slide_index_stays_in_range() {
        let mut c = controller(3, 0);
        let script = [
            Gesture::PrevSlide,
            Gesture::NextSlide,
            Gesture::NextSlide,
            Gesture::NextSlide,
            Gesture::NextSlide,
            Gesture::PrevSlide,
            Gesture::PrevSlide,
            Gesture::PrevSlide,
        ];
        for (frame, g) in script.into_iter().enumerate() {
            c.step(g, p(0.0, 0.0), frame as u64);
            assert!(c.slide() < c.slide_count());
        }
        assert_eq!(c.slide(), 0);
    }

    #[test]
    fn test_none_still_ticks_debounce() {
        let mut c = controller(3, 2);
        c.step(Gesture::NextSlide, p(0.0, 0.0), 0);
        c.step(Gesture::None, p(0.0, 0.0), 1);
        c.step(Gesture::None, p(0.0, 0.0), 2);
        assert!(!c.debouncer().is_locked());
        assert!(has_change(&c.step(Gesture::NextSlide, p(0.0, 0.0), 3)));
    }

    #[test]
    fn test_manual_navigation() {
        let mut c = controller(2, 10);
        assert_eq!(c.navigate(-1), None);
        assert_eq!(c.navigate(1), Some(Command::ChangeSlide(1)));
        assert_eq!(c.navigate(1), None);
        assert!(!c.debouncer().is_locked());
    }

    #[test]
    fn test_reset() {
        let mut c = controller(3, 10);
        c.step(Gesture::NextSlide, p(0.0, 0.0), 0);
        c.step(Gesture::Draw, p(1.0, 1.0), 1);
        c.reset();
        assert_eq!(c.slide(), 0);
        assert!(c.annotations().is_empty());
        assert!(!c.debouncer().is_locked());
        assert_eq!(c.last_gesture(), Gesture::None);
    }

    #[test]
    fn test_command_sexp() {
        assert_eq!(Command::ChangeSlide(-1).to_sexp(), "(:change-slide :delta -1)");
        assert_eq!(
            Command::ShowPointerAt(p(1.5, 2.0)).to_sexp(),
            "(:pointer :x 1.5 :y 2)"
        );
        assert_eq!(Command::DrawPointAt(p(3.0, 4.0)).to_sexp(), "(:draw :x 3 :y 4)");
        assert_eq!(Command::ClearLayer.to_sexp(), "(:clear-layer)");
        assert_eq!(Command::NoOp.to_sexp(), "(:noop)");
    }

    #[test]
    fn test_status_sexp() {
        let mut c = controller(4, 10);
        c.step(Gesture::NextSlide, p(0.0, 0.0), 0);
        let sexp = c.status_sexp();
        assert!(sexp.contains(":slide 1"));
        assert!(sexp.contains(":slide-count 4"));
        assert!(sexp.contains(":label \"2 / 4\""));
        assert!(sexp.contains(":gesture :next-slide"));
        assert!(sexp.contains(":debounce (:locked t"));
    }

    #[test]
    fn test_config_sexp() {
        let sexp = ControllerConfig::default().config_sexp();
        assert!(sexp.contains(":slide-count 1"));
        assert!(sexp.contains(":debounce-frames 10"));
        assert!(sexp.contains(":zone-threshold 500.0"));
    }
}
