//! Freehand annotation strokes for the current slide.

use crate::error::{GestureError, Result};
use crate::hand::Point;

/// One continuous pen path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Ordered strokes (draw order) plus the stroke currently being drawn.
///
/// The active stroke, when there is one, is always the last stroke.
#[derive(Debug, Clone, Default)]
pub struct AnnotationLayer {
    strokes: Vec<Stroke>,
    active: Option<usize>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new empty stroke and make it active.
    pub fn start_stroke(&mut self) {
        self.strokes.push(Stroke::default());
        self.active = Some(self.strokes.len() - 1);
    }

    /// Append to the active stroke.
    pub fn append_point(&mut self, p: Point) -> Result<()> {
        let idx = self.active.ok_or(GestureError::NoActiveStroke)?;
        let stroke = self
            .strokes
            .get_mut(idx)
            .ok_or(GestureError::NoActiveStroke)?;
        stroke.points.push(p);
        Ok(())
    }

    /// Lift the pen.  The stroke is kept; the next point needs a new stroke.
    pub fn end_stroke(&mut self) {
        self.active = None;
    }

    /// Remove the most recent stroke, if any.
    pub fn undo_last(&mut self) {
        if self.strokes.pop().is_some() {
            self.active = self.active.and_then(|i| i.checked_sub(1));
        }
    }

    pub fn clear_all(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    /// Strokes in draw order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn has_active_stroke(&self) -> bool {
        self.active.is_some()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Generate s-expression listing all strokes as point lists.
    pub fn strokes_sexp(&self) -> String {
        if self.strokes.is_empty() {
            return "nil".to_string();
        }
        let mut s = String::from("(");
        for (i, stroke) in self.strokes.iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            s.push('(');
            for (j, p) in stroke.points.iter().enumerate() {
                if j > 0 {
                    s.push(' ');
                }
                s.push_str(&format!("({} {})", p.x, p.y));
            }
            s.push(')');
        }
        s.push(')');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_start_and_append() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        assert_eq!(layer.active_index(), Some(0));
        layer.append_point(p(1.0, 2.0)).unwrap();
        layer.append_point(p(3.0, 4.0)).unwrap();
        assert_eq!(layer.strokes()[0].points, vec![p(1.0, 2.0), p(3.0, 4.0)]);
    }

    #[test]
    fn test_append_without_stroke_fails() {
        let mut layer = AnnotationLayer::new();
        assert_eq!(layer.append_point(p(0.0, 0.0)), Err(GestureError::NoActiveStroke));
        assert!(layer.is_empty());
    }

    #[test]
    fn test_append_after_end_fails() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        layer.append_point(p(0.0, 0.0)).unwrap();
        layer.end_stroke();
        assert_eq!(layer.append_point(p(1.0, 1.0)), Err(GestureError::NoActiveStroke));
        assert_eq!(layer.point_count(), 1);
    }

    #[test]
    fn test_points_go_to_latest_stroke() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        layer.append_point(p(0.0, 0.0)).unwrap();
        layer.start_stroke();
        layer.append_point(p(5.0, 5.0)).unwrap();
        assert_eq!(layer.active_index(), Some(1));
        assert_eq!(layer.strokes()[0].len(), 1);
        assert_eq!(layer.strokes()[1].points, vec![p(5.0, 5.0)]);
    }

    #[test]
    fn test_undo_active_stroke_moves_to_previous() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        layer.start_stroke();
        layer.undo_last();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.active_index(), Some(0));
        layer.undo_last();
        assert!(layer.is_empty());
        assert_eq!(layer.active_index(), None);
    }

    #[test]
    fn test_undo_with_no_active_stroke() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        layer.end_stroke();
        layer.start_stroke();
        layer.end_stroke();
        layer.undo_last();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.active_index(), None);
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut layer = AnnotationLayer::new();
        layer.undo_last();
        layer.undo_last();
        assert!(layer.is_empty());
        assert_eq!(layer.active_index(), None);
    }

    #[test]
    fn test_clear_all_idempotent() {
        let mut layer = AnnotationLayer::new();
        layer.start_stroke();
        layer.append_point(p(1.0, 1.0)).unwrap();
        layer.clear_all();
        assert!(layer.is_empty());
        assert_eq!(layer.active_index(), None);
        layer.clear_all();
        assert!(layer.is_empty());
        assert_eq!(layer.active_index(), None);
    }

    #[test]
    fn test_strokes_sexp() {
        let mut layer = AnnotationLayer::new();
        assert_eq!(layer.strokes_sexp(), "nil");
        layer.start_stroke();
        layer.append_point(p(1.0, 2.0)).unwrap();
        layer.append_point(p(3.5, 4.0)).unwrap();
        assert_eq!(layer.strokes_sexp(), "(((1 2) (3.5 4)))");
    }
}
