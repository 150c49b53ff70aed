use std::rc::Rc;

use log::{debug, error, warn};
use wasm_bindgen_futures::spawn_local;

use sketchsolve_shared::{clear_board, RestoreTicket, Surface, ToolMode};

use crate::state::Widget;
use crate::surface::decode_image;
use crate::util::js_error_message;

pub fn select_tool(widget: &Widget, tool: ToolMode) {
    widget.board.borrow_mut().select_tool(tool);
    debug!("Selected {}", tool.name());
    widget.sync_ui();
}

pub fn undo(widget: &Rc<Widget>) {
    let ticket = widget.board.borrow_mut().undo();
    match ticket {
        Some(ticket) => apply_restore(widget, ticket),
        None => debug!("Nothing to undo"),
    }
    widget.sync_ui();
}

pub fn redo(widget: &Rc<Widget>) {
    let ticket = widget.board.borrow_mut().redo();
    match ticket {
        Some(ticket) => apply_restore(widget, ticket),
        None => debug!("Nothing to redo"),
    }
    widget.sync_ui();
}

pub fn clear(widget: &Widget) {
    clear_board(&mut *widget.board.borrow_mut(), widget);
    widget.sync_ui();
}

/// Puts a snapshot back on the canvas. Decoding suspends; when it resumes,
/// the ticket is only applied if no later undo, redo or clear superseded it.
/// A snapshot that will not decode leaves the board blank, history included.
fn apply_restore(widget: &Rc<Widget>, ticket: RestoreTicket) {
    let RestoreTicket {
        generation,
        snapshot,
    } = ticket;
    let Some(image) = snapshot.image().cloned() else {
        let mut board = widget.board.borrow_mut();
        if board.finish_restore(generation) {
            board.surface_mut().clear();
        }
        return;
    };

    let widget = widget.clone();
    spawn_local(async move {
        let decoded = decode_image(&image).await;
        let mut board = widget.board.borrow_mut();
        match decoded {
            Ok(element) => {
                if !board.finish_restore(generation) {
                    return;
                }
                if let Err(err) = board.surface().draw_image(&element) {
                    error!("Could not paint restored snapshot: {}", js_error_message(&err));
                }
            }
            Err(err) => {
                warn!("Could not decode snapshot {generation}: {}", js_error_message(&err));
                if board.fail_restore(generation) {
                    drop(board);
                    widget.sync_ui();
                }
            }
        }
    });
}
