use std::cell::RefCell;

use log::{debug, info, warn};

use crate::{
    interpret_reply, Board, RawReply, Snapshot, SolveOutcome, SubmitError, SubmitPhase,
    Submission, Surface,
};

/// Where solutions and errors are shown.
pub trait OutputRegion {
    fn clear_output(&self);
    fn show_solution(&self, markup: &str);
    fn show_error(&self, error: &SubmitError);
}

/// The pieces of a page the submit flow drives. Exporting and posting
/// suspend; neither may hold a borrow of the board or submission across the
/// suspension.
#[allow(async_fn_in_trait)]
pub trait SolveHost: OutputRegion {
    /// An encoded image ready to upload.
    type Image;

    fn set_busy(&self, busy: bool);
    fn submission(&self) -> &RefCell<Submission>;
    /// The snapshot under the history cursor.
    fn active_snapshot(&self) -> Option<Snapshot>;
    async fn export(&self, snapshot: &Snapshot) -> Result<Self::Image, SubmitError>;
    async fn post(&self, image: &Self::Image) -> Result<RawReply, SubmitError>;
}

/// Sends the active snapshot to the solver and renders whatever comes back.
///
/// Returns the terminal phase, or `None` when another submission is still
/// outstanding. The busy indicator is lowered again on every path.
pub async fn solve_current<H: SolveHost>(host: &H) -> Option<SubmitPhase> {
    if !host.submission().borrow_mut().begin() {
        debug!("Submission already in flight");
        return None;
    }
    host.clear_output();
    host.set_busy(true);

    let result = exchange(host).await;
    let phase = {
        let mut submission = host.submission().borrow_mut();
        submission.fail_if_unsettled();
        submission.phase()
    };
    match result {
        Ok(SolveOutcome::Solution(markup)) => {
            info!("Solution received ({} bytes)", markup.len());
            host.show_solution(&markup);
        }
        Ok(SolveOutcome::Empty) => {}
        Err(error) => {
            warn!("Submission failed: {error}");
            host.show_error(&error);
        }
    }

    host.set_busy(false);
    host.submission().borrow_mut().finish();
    Some(phase)
}

async fn exchange<H: SolveHost>(host: &H) -> Result<SolveOutcome, SubmitError> {
    let snapshot = host.active_snapshot().ok_or(SubmitError::Capture)?;
    let image = host.export(&snapshot).await?;

    host.submission().borrow_mut().sending();
    let raw = host.post(&image).await?;
    info!("Solver answered {} {}", raw.status, raw.status_text);

    let reply = raw.as_reply();
    let outcome = interpret_reply(&reply);
    // An unreadable success body is a decoding failure, not an answer.
    let answered = reply.ok() && !matches!(outcome, Err(SubmitError::Transport(_)));
    host.submission().borrow_mut().settle(answered);
    outcome
}

/// Wipes the board, drops its history and empties the output region.
pub fn clear_board<S: Surface>(board: &mut Board<S>, output: &impl OutputRegion) {
    board.clear();
    output.clear_output();
    info!("Cleared board");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use futures::executor::block_on;

    use crate::testing::{stroke, RecordingSurface};

    struct RecordingHost {
        board: RefCell<Board<RecordingSurface>>,
        submission: RefCell<Submission>,
        reply: Result<RawReply, SubmitError>,
        busy: RefCell<Vec<bool>>,
        output: RefCell<String>,
        posted: RefCell<Vec<String>>,
        phase_at_post: Cell<Option<SubmitPhase>>,
    }

    impl RecordingHost {
        fn answering(status: u16, status_text: &str, body: &str) -> Self {
            Self::with_reply(Ok(RawReply {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }))
        }

        fn with_reply(reply: Result<RawReply, SubmitError>) -> Self {
            Self {
                board: RefCell::new(Board::new(RecordingSurface::default())),
                submission: RefCell::new(Submission::default()),
                reply,
                busy: RefCell::new(Vec::new()),
                output: RefCell::new("stale".to_string()),
                posted: RefCell::new(Vec::new()),
                phase_at_post: Cell::new(None),
            }
        }

        fn draw(&self) {
            stroke(&mut self.board.borrow_mut(), (0.0, 0.0), (10.0, 10.0));
        }

        fn output(&self) -> String {
            self.output.borrow().clone()
        }
    }

    impl OutputRegion for RecordingHost {
        fn clear_output(&self) {
            self.output.borrow_mut().clear();
        }

        fn show_solution(&self, markup: &str) {
            *self.output.borrow_mut() = markup.to_string();
        }

        fn show_error(&self, error: &SubmitError) {
            *self.output.borrow_mut() = crate::error_markup(error);
        }
    }

    impl SolveHost for RecordingHost {
        type Image = String;

        fn set_busy(&self, busy: bool) {
            self.busy.borrow_mut().push(busy);
        }

        fn submission(&self) -> &RefCell<Submission> {
            &self.submission
        }

        fn active_snapshot(&self) -> Option<Snapshot> {
            self.board.borrow().current_snapshot().cloned()
        }

        async fn export(&self, snapshot: &Snapshot) -> Result<String, SubmitError> {
            let image = snapshot.image().ok_or(SubmitError::Capture)?;
            Ok(image.as_str().to_string())
        }

        async fn post(&self, image: &String) -> Result<RawReply, SubmitError> {
            self.posted.borrow_mut().push(image.clone());
            self.phase_at_post.set(Some(self.submission.borrow().phase()));
            self.reply.clone()
        }
    }

    #[test]
    fn blank_board_fails_to_capture_and_restores_busy() {
        let host = RecordingHost::answering(200, "OK", r#"{"solution": "x"}"#);
        let phase = block_on(solve_current(&host));
        assert_eq!(phase, Some(SubmitPhase::Failed));
        assert!(host.output().contains("Could not capture canvas image"));
        assert!(host.posted.borrow().is_empty());
        assert_eq!(*host.busy.borrow(), vec![true, false]);
        assert!(!host.submission.borrow().in_flight());
    }

    #[test]
    fn solution_is_rendered() {
        let host = RecordingHost::answering(200, "OK", r#"{"solution": "x=5"}"#);
        host.draw();
        let phase = block_on(solve_current(&host));
        assert_eq!(phase, Some(SubmitPhase::Succeeded));
        assert_eq!(host.output(), "x=5");
        assert_eq!(host.posted.borrow().len(), 1);
        assert_eq!(host.phase_at_post.get(), Some(SubmitPhase::Sending));
        assert_eq!(*host.busy.borrow(), vec![true, false]);
    }

    #[test]
    fn reported_error_on_success_status_still_succeeds() {
        let host = RecordingHost::answering(200, "OK", r#"{"error": "bad image"}"#);
        host.draw();
        let phase = block_on(solve_current(&host));
        assert_eq!(phase, Some(SubmitPhase::Succeeded));
        assert_eq!(host.output(), "<p class=\"error-message\">Error: bad image</p>");
        assert_eq!(*host.busy.borrow(), vec![true, false]);
    }

    #[test]
    fn server_error_shows_status_text() {
        let host = RecordingHost::answering(500, "Internal Server Error", "{}");
        host.draw();
        let phase = block_on(solve_current(&host));
        assert_eq!(phase, Some(SubmitPhase::Failed));
        assert!(host.output().contains("Internal Server Error"));
        assert_eq!(*host.busy.borrow(), vec![true, false]);
    }

    #[test]
    fn transport_and_unreadable_bodies_fail() {
        let host = RecordingHost::with_reply(Err(SubmitError::Transport(
            "Failed to fetch".to_string(),
        )));
        host.draw();
        assert_eq!(block_on(solve_current(&host)), Some(SubmitPhase::Failed));
        assert!(host.output().contains("An unexpected error occurred: Failed to fetch"));
        assert_eq!(*host.busy.borrow(), vec![true, false]);

        let host = RecordingHost::answering(200, "OK", "<html>");
        host.draw();
        assert_eq!(block_on(solve_current(&host)), Some(SubmitPhase::Failed));
        assert!(host.output().contains("An unexpected error occurred"));
    }

    #[test]
    fn submits_the_snapshot_under_the_cursor() {
        let host = RecordingHost::answering(200, "OK", "{}");
        host.draw();
        let first = host.active_snapshot().unwrap();
        stroke(&mut host.board.borrow_mut(), (5.0, 5.0), (6.0, 9.0));
        let ticket = host.board.borrow_mut().undo().unwrap();
        assert!(host.board.borrow_mut().finish_restore(ticket.generation));

        assert_eq!(block_on(solve_current(&host)), Some(SubmitPhase::Succeeded));
        let expected = first.image().unwrap().as_str().to_string();
        assert_eq!(*host.posted.borrow(), vec![expected]);
        assert_eq!(host.output(), "");
    }

    #[test]
    fn overlapping_submission_is_refused() {
        let host = RecordingHost::answering(200, "OK", r#"{"solution": "x"}"#);
        host.draw();
        assert!(host.submission.borrow_mut().begin());
        assert_eq!(block_on(solve_current(&host)), None);
        assert!(host.busy.borrow().is_empty());
        assert_eq!(host.output(), "stale");
    }

    #[test]
    fn clear_empties_output_and_history() {
        let host = RecordingHost::answering(200, "OK", r#"{"solution": "x=5"}"#);
        host.draw();
        block_on(solve_current(&host));
        assert_eq!(host.output(), "x=5");

        clear_board(&mut *host.board.borrow_mut(), &host);
        assert_eq!(host.output(), "");
        let board = host.board.borrow();
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.current_snapshot(), Some(&Snapshot::Blank));
        assert!(board.surface().segments.is_empty());
    }
}
