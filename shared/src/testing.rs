//! In-memory stand-ins shared by the unit tests.

use crate::{Board, Point, Snapshot, StrokeStyle, Surface};

pub type Segment = (f64, f64, f64, f64, String);

/// Keeps painted segments in memory and encodes them as JSON snapshots.
#[derive(Default)]
pub struct RecordingSurface {
    pub segments: Vec<Segment>,
    pub style: Option<StrokeStyle>,
    pub fail_export: bool,
    pub last: Option<Point>,
}

impl RecordingSurface {
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.segments = match snapshot.image() {
            Some(image) => serde_json::from_str(image.as_str()).unwrap(),
            None => Vec::new(),
        };
    }
}

impl Surface for RecordingSurface {
    type Error = String;

    fn begin_stroke(&mut self, point: Point) {
        self.last = Some(point);
    }

    fn extend_stroke(&mut self, point: Point) {
        let from = self.last.expect("extend without begin");
        let color = self.style.map(|style| style.color).unwrap_or_default();
        self.segments
            .push((from.x, from.y, point.x, point.y, color.to_string()));
        self.last = Some(point);
    }

    fn end_stroke(&mut self) {
        self.last = None;
    }

    fn set_style(&mut self, style: StrokeStyle) {
        self.style = Some(style);
    }

    fn clear(&mut self) {
        self.segments.clear();
    }

    fn export_image(&self) -> Result<Snapshot, String> {
        if self.fail_export {
            return Err("encoder unavailable".to_string());
        }
        Ok(Snapshot::encoded(
            serde_json::to_string(&self.segments).unwrap(),
        ))
    }
}

pub fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

pub fn stroke(board: &mut Board<RecordingSurface>, from: (f64, f64), to: (f64, f64)) {
    assert!(board.pointer_down(1, point(from.0, from.1)));
    assert!(board.pointer_move(1, point(to.0, to.1)));
    assert!(board.pointer_up(1));
}
