pub mod actions;
pub mod board;
pub mod history;
pub mod snapshot;
pub mod submit;
#[cfg(test)]
mod testing;

pub use actions::{clear_board, solve_current, OutputRegion, SolveHost};
pub use board::{Board, RestoreTicket, Surface};
pub use history::History;
pub use snapshot::{EncodedImage, Snapshot};
pub use submit::{
    error_markup, interpret_reply, HttpReply, RawReply, SolveOutcome, SolveResponse,
    SubmitError, SubmitPhase, Submission, IMAGE_FIELD, IMAGE_FILENAME, IMAGE_MIME,
    SOLVE_ENDPOINT,
};

/// Colour of the drawing surface. The eraser paints with it.
pub const BACKGROUND_COLOR: &str = "#f9f9f9";
/// Opaque fill placed under the drawing before it is sent for solving.
pub const EXPORT_BACKGROUND: &str = "#ffffff";

pub const PENCIL_COLOR: &str = "#000000";
pub const PENCIL_WIDTH: f64 = 3.0;
pub const ERASER_WIDTH: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new_finite(x: f64, y: f64) -> Option<Self> {
        if x.is_finite() && y.is_finite() {
            Some(Self { x, y })
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolMode {
    #[default]
    Pencil,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: &'static str,
    pub width: f64,
}

impl ToolMode {
    pub fn style(self) -> StrokeStyle {
        match self {
            ToolMode::Pencil => StrokeStyle {
                color: PENCIL_COLOR,
                width: PENCIL_WIDTH,
            },
            ToolMode::Eraser => StrokeStyle {
                color: BACKGROUND_COLOR,
                width: ERASER_WIDTH,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Pencil => "pencil",
            ToolMode::Eraser => "eraser",
        }
    }
}
