use std::cell::RefCell;

use web_sys::{Document, HtmlButtonElement, HtmlElement, Window};

use sketchsolve_shared::{Board, Submission, ToolMode};

use crate::config::Config;
use crate::dom::{set_canvas_mode, set_history_button, set_tool_button};
use crate::surface::CanvasSurface;

pub struct Controls {
    pub pencil: HtmlButtonElement,
    pub eraser: HtmlButtonElement,
    pub undo: HtmlButtonElement,
    pub redo: HtmlButtonElement,
    pub clear: HtmlButtonElement,
    pub solve: HtmlButtonElement,
    pub output: HtmlElement,
    pub spinner: HtmlElement,
}

/// Everything one drawing widget owns. Built once and shared with the event
/// handlers behind an `Rc`; no borrow is held across an `await`.
pub struct Widget {
    pub window: Window,
    pub document: Document,
    pub config: Config,
    pub board: RefCell<Board<CanvasSurface>>,
    pub submission: RefCell<Submission>,
    pub controls: Controls,
}

impl Widget {
    pub fn sync_ui(&self) {
        let board = self.board.borrow();
        let tool = board.tool();
        set_tool_button(&self.controls.pencil, tool == ToolMode::Pencil);
        set_tool_button(&self.controls.eraser, tool == ToolMode::Eraser);
        set_history_button(&self.controls.undo, board.can_undo());
        set_history_button(&self.controls.redo, board.can_redo());
        set_canvas_mode(board.surface().canvas(), tool);
    }
}
