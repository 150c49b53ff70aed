use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use web_sys::Blob;

use sketchsolve_shared::{
    solve_current, OutputRegion, RawReply, Snapshot, SolveHost, SubmitError, Submission,
};

use crate::dom::set_visible;
use crate::net::post_image;
use crate::output::{clear_output, show_error, show_solution};
use crate::state::Widget;
use crate::surface::compose_export;
use crate::util::js_error_message;

impl OutputRegion for Widget {
    fn clear_output(&self) {
        clear_output(&self.controls.output);
    }

    fn show_solution(&self, markup: &str) {
        show_solution(&self.window, &self.controls.output, markup);
    }

    fn show_error(&self, error: &SubmitError) {
        show_error(&self.controls.output, error);
    }
}

impl SolveHost for Widget {
    type Image = Blob;

    fn set_busy(&self, busy: bool) {
        set_visible(&self.controls.spinner, busy);
        self.controls.solve.set_disabled(busy);
    }

    fn submission(&self) -> &RefCell<Submission> {
        &self.submission
    }

    fn active_snapshot(&self) -> Option<Snapshot> {
        self.board.borrow().current_snapshot().cloned()
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<Blob, SubmitError> {
        let (width, height) = self.board.borrow().surface().size();
        compose_export(&self.document, width, height, snapshot).await
    }

    async fn post(&self, image: &Blob) -> Result<RawReply, SubmitError> {
        debug!("Posting {} byte image to {}", image.size(), self.config.endpoint);
        post_image(&self.window, &self.config.endpoint, image)
            .await
            .map_err(|err| SubmitError::Transport(js_error_message(&err)))
    }
}

pub async fn submit_current(widget: Rc<Widget>) {
    if let Some(phase) = solve_current(widget.as_ref()).await {
        debug!("Submission settled as {phase:?}");
    }
}
