use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const SOLVE_ENDPOINT: &str = "/solve_equation";
pub const IMAGE_FIELD: &str = "image";
pub const IMAGE_FILENAME: &str = "equation.png";
pub const IMAGE_MIME: &str = "image/png";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Error: Could not capture canvas image. Make sure you've drawn something visible.")]
    Capture,
    #[error("An unexpected error occurred: {0}")]
    Transport(String),
    /// An `error` field in a successful response.
    #[error("Error: {0}")]
    Reported(String),
    /// A failed response, carrying its `error` field or the status text.
    #[error("Server Error: {0}")]
    Server(String),
}

/// Solver reply body. Fields are kept loose: any truthy JSON value counts,
/// so a numeric solution still renders.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SolveResponse {
    #[serde(default)]
    pub solution: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Markup to place in the output region.
    Solution(String),
    /// A success response with neither field; the output stays empty.
    Empty,
}

/// A response as read off the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawReply {
    pub fn as_reply(&self) -> HttpReply<'_> {
        HttpReply {
            status: self.status,
            status_text: &self.status_text,
            body: &self.body,
        }
    }
}

/// The parts of an HTTP response the solver exchange looks at.
#[derive(Clone, Copy, Debug)]
pub struct HttpReply<'a> {
    pub status: u16,
    pub status_text: &'a str,
    pub body: &'a str,
}

impl HttpReply<'_> {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Text for a field that is present and truthy; `null`, `false`, `0` and
/// `""` count as absent.
fn truthy_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text).filter(|text| !text.is_empty()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        other => Some(other.to_string()),
    }
}

pub fn interpret_reply(reply: &HttpReply<'_>) -> Result<SolveOutcome, SubmitError> {
    let parsed = serde_json::from_str::<SolveResponse>(reply.body);
    if reply.ok() {
        let response = parsed
            .map_err(|error| SubmitError::Transport(format!("invalid response body: {error}")))?;
        if let Some(solution) = truthy_text(response.solution) {
            return Ok(SolveOutcome::Solution(solution));
        }
        if let Some(error) = truthy_text(response.error) {
            return Err(SubmitError::Reported(error));
        }
        debug!("Solve response carried neither solution nor error");
        return Ok(SolveOutcome::Empty);
    }

    let detail = match parsed {
        Ok(response) => truthy_text(response.error),
        Err(error) => {
            warn!("Unreadable error body for status {}: {error}", reply.status);
            None
        }
    };
    let message = detail
        .or_else(|| Some(reply.status_text.to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", reply.status));
    Err(SubmitError::Server(message))
}

/// Inline markup for an error shown in the output region.
pub fn error_markup(error: &SubmitError) -> String {
    format!(
        "<p class=\"error-message\">{}</p>",
        escape_html(&error.to_string())
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Preparing,
    Sending,
    Succeeded,
    Failed,
}

/// Tracks one submission at a time.
#[derive(Debug, Default)]
pub struct Submission {
    phase: SubmitPhase,
}

impl Submission {
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.phase != SubmitPhase::Idle
    }

    /// Idle -> Preparing. Refused while another submission is outstanding.
    pub fn begin(&mut self) -> bool {
        if self.in_flight() {
            return false;
        }
        self.transition(SubmitPhase::Preparing);
        true
    }

    pub fn sending(&mut self) {
        self.transition(SubmitPhase::Sending);
    }

    /// Sending -> Succeeded or Failed. Succeeded means the server answered
    /// with a success status, even if the body then reports an error.
    pub fn settle(&mut self, succeeded: bool) {
        let phase = if succeeded {
            SubmitPhase::Succeeded
        } else {
            SubmitPhase::Failed
        };
        self.transition(phase);
    }

    /// Preparing or Sending -> Failed, for attempts that never got a reply.
    pub fn fail_if_unsettled(&mut self) {
        if matches!(self.phase, SubmitPhase::Preparing | SubmitPhase::Sending) {
            self.transition(SubmitPhase::Failed);
        }
    }

    pub fn finish(&mut self) {
        self.transition(SubmitPhase::Idle);
    }

    fn transition(&mut self, next: SubmitPhase) {
        debug!("Submission {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, status_text: &'static str, body: &'static str) -> HttpReply<'static> {
        HttpReply {
            status,
            status_text,
            body,
        }
    }

    #[test]
    fn solution_is_returned_as_markup() {
        let outcome = interpret_reply(&reply(200, "OK", r#"{"solution": "x=5"}"#));
        assert_eq!(outcome, Ok(SolveOutcome::Solution("x=5".to_string())));
    }

    #[test]
    fn reported_error_on_success_status() {
        let outcome = interpret_reply(&reply(200, "OK", r#"{"error": "bad image"}"#));
        let error = outcome.unwrap_err();
        assert_eq!(error, SubmitError::Reported("bad image".to_string()));
        assert!(error.to_string().contains("bad image"));
    }

    #[test]
    fn solution_wins_over_error() {
        let outcome = interpret_reply(&reply(200, "OK", r#"{"solution": "y=2", "error": "x"}"#));
        assert_eq!(outcome, Ok(SolveOutcome::Solution("y=2".to_string())));
    }

    #[test]
    fn empty_success_body_renders_nothing() {
        assert_eq!(interpret_reply(&reply(200, "OK", "{}")), Ok(SolveOutcome::Empty));
        assert_eq!(
            interpret_reply(&reply(200, "OK", r#"{"solution": ""}"#)),
            Ok(SolveOutcome::Empty)
        );
    }

    #[test]
    fn non_string_solution_is_stringified() {
        assert_eq!(
            interpret_reply(&reply(200, "OK", r#"{"solution": 42}"#)),
            Ok(SolveOutcome::Solution("42".to_string()))
        );
        assert_eq!(
            interpret_reply(&reply(200, "OK", r#"{"solution": 0, "error": false}"#)),
            Ok(SolveOutcome::Empty)
        );
        assert_eq!(
            interpret_reply(&reply(500, "Internal Server Error", r#"{"error": null}"#)),
            Err(SubmitError::Server("Internal Server Error".to_string()))
        );
    }

    #[test]
    fn server_error_falls_back_to_status_text() {
        let error = interpret_reply(&reply(500, "Internal Server Error", "{}")).unwrap_err();
        assert_eq!(
            error,
            SubmitError::Server("Internal Server Error".to_string())
        );
        assert!(error.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn server_error_prefers_error_field() {
        let error = interpret_reply(&reply(
            400,
            "Bad Request",
            r#"{"error": "No image part in the request."}"#,
        ))
        .unwrap_err();
        assert_eq!(
            error,
            SubmitError::Server("No image part in the request.".to_string())
        );
    }

    #[test]
    fn unparseable_error_body_uses_status_text_or_code() {
        let error = interpret_reply(&reply(502, "Bad Gateway", "<html>")).unwrap_err();
        assert_eq!(error, SubmitError::Server("Bad Gateway".to_string()));
        let error = interpret_reply(&reply(503, "", "")).unwrap_err();
        assert_eq!(error, SubmitError::Server("HTTP 503".to_string()));
    }

    #[test]
    fn unparseable_success_body_is_unexpected() {
        let error = interpret_reply(&reply(200, "OK", "not json")).unwrap_err();
        assert!(matches!(error, SubmitError::Transport(_)));
        assert!(error.to_string().starts_with("An unexpected error occurred"));
    }

    #[test]
    fn capture_message() {
        let message = SubmitError::Capture.to_string().to_lowercase();
        assert!(message.contains("could not capture canvas image"));
    }

    #[test]
    fn error_markup_escapes_message() {
        let markup = error_markup(&SubmitError::Reported("<b>&</b>".to_string()));
        assert_eq!(
            markup,
            "<p class=\"error-message\">Error: &lt;b&gt;&amp;&lt;/b&gt;</p>"
        );
    }

    #[test]
    fn submission_refuses_overlap_and_always_returns_to_idle() {
        let mut submission = Submission::default();
        assert!(submission.begin());
        assert!(!submission.begin());
        submission.sending();
        assert_eq!(submission.phase(), SubmitPhase::Sending);
        submission.settle(false);
        assert_eq!(submission.phase(), SubmitPhase::Failed);
        submission.fail_if_unsettled();
        assert_eq!(submission.phase(), SubmitPhase::Failed);
        submission.finish();
        assert_eq!(submission.phase(), SubmitPhase::Idle);
        assert!(submission.begin());
    }
}
