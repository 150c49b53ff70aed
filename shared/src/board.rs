use std::fmt;

use log::{debug, warn};

use crate::{History, Point, Snapshot, StrokeStyle, ToolMode};

/// A raster the board can paint on.
///
/// Restoring a snapshot is not part of the trait: it suspends while the image
/// decodes, so the concrete surface performs it and reports back through
/// [`Board::finish_restore`].
pub trait Surface {
    type Error: fmt::Display;

    fn begin_stroke(&mut self, point: Point);
    /// Paints one segment from the previous point to `point`.
    fn extend_stroke(&mut self, point: Point);
    fn end_stroke(&mut self);
    fn set_style(&mut self, style: StrokeStyle);
    fn clear(&mut self);
    fn export_image(&self) -> Result<Snapshot, Self::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Idle,
    Drawing { pointer_id: i32 },
}

/// A snapshot to put back on the surface. Only the ticket carrying the latest
/// generation may be applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RestoreTicket {
    pub generation: u64,
    pub snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct RestoreState {
    generation: u64,
    pending: bool,
}

pub struct Board<S: Surface> {
    surface: S,
    history: History<Snapshot>,
    tool: ToolMode,
    mode: DrawMode,
    restore: RestoreState,
}

impl<S: Surface> Board<S> {
    pub fn new(mut surface: S) -> Self {
        let tool = ToolMode::default();
        surface.set_style(tool.style());
        Self {
            surface,
            history: History::starting_with(Snapshot::Blank),
            tool,
            mode: DrawMode::Idle,
            restore: RestoreState::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, DrawMode::Drawing { .. })
    }

    pub fn restore_pending(&self) -> bool {
        self.restore.pending
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.history.current()
    }

    /// Starts a stroke. Refused while another pointer is drawing or while a
    /// restore has not landed yet.
    pub fn pointer_down(&mut self, pointer_id: i32, point: Point) -> bool {
        if self.is_drawing() {
            return false;
        }
        if self.restore.pending {
            debug!("Ignoring stroke start while restore {} is pending", self.restore.generation);
            return false;
        }
        self.mode = DrawMode::Drawing { pointer_id };
        self.surface.begin_stroke(point);
        true
    }

    pub fn pointer_move(&mut self, pointer_id: i32, point: Point) -> bool {
        match self.mode {
            DrawMode::Drawing { pointer_id: active } if active == pointer_id => {
                self.surface.extend_stroke(point);
                true
            }
            _ => false,
        }
    }

    /// Ends the stroke owned by `pointer_id` and commits the surface to
    /// history. Returns whether a history entry was created.
    pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
        match self.mode {
            DrawMode::Drawing { pointer_id: active } if active == pointer_id => {
                self.finish_stroke()
            }
            _ => false,
        }
    }

    fn finish_stroke(&mut self) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.mode = DrawMode::Idle;
        self.surface.end_stroke();
        match self.surface.export_image() {
            Ok(snapshot) => {
                self.history.commit(snapshot);
                debug!(
                    "Committed stroke, history len={} cursor={:?}",
                    self.history.len(),
                    self.history.cursor()
                );
                true
            }
            Err(error) => {
                warn!("Could not snapshot surface after stroke: {error}");
                false
            }
        }
    }

    pub fn select_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
        self.surface.set_style(tool.style());
    }

    pub fn undo(&mut self) -> Option<RestoreTicket> {
        self.finish_stroke();
        let snapshot = self.history.undo()?;
        Some(self.issue_ticket(snapshot))
    }

    pub fn redo(&mut self) -> Option<RestoreTicket> {
        self.finish_stroke();
        let snapshot = self.history.redo()?;
        Some(self.issue_ticket(snapshot))
    }

    fn issue_ticket(&mut self, snapshot: Snapshot) -> RestoreTicket {
        self.restore.generation += 1;
        self.restore.pending = true;
        RestoreTicket {
            generation: self.restore.generation,
            snapshot,
        }
    }

    /// Marks the restore for `generation` as landed. Returns false when a newer
    /// restore or a clear superseded it; the caller must then discard it.
    pub fn finish_restore(&mut self, generation: u64) -> bool {
        if !self.restore.pending || generation != self.restore.generation {
            debug!(
                "Dropping stale restore {generation} (latest {})",
                self.restore.generation
            );
            return false;
        }
        self.restore.pending = false;
        true
    }

    /// Gives up on the restore for `generation` after its image would not
    /// decode. The surface is wiped and the current entry becomes blank so
    /// history keeps matching what is shown. Returns false for a stale ticket.
    pub fn fail_restore(&mut self, generation: u64) -> bool {
        if !self.finish_restore(generation) {
            return false;
        }
        warn!("Restore {generation} failed; current entry reset to blank");
        self.surface.clear();
        self.history.replace_current(Snapshot::Blank);
        true
    }

    pub fn clear(&mut self) {
        if self.is_drawing() {
            self.mode = DrawMode::Idle;
            self.surface.end_stroke();
        }
        self.restore.generation += 1;
        self.restore.pending = false;
        self.surface.clear();
        self.history.reset(Snapshot::Blank);
    }
}
