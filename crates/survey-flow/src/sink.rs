use survey_spec::SubmittedResponse;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Receives each committed response. Fire-and-forget from the flow's side.
pub trait SubmissionSink {
    fn submit(&self, response: &SubmittedResponse);
}

impl<F> SubmissionSink for F
where
    F: Fn(&SubmittedResponse),
{
    fn submit(&self, response: &SubmittedResponse) {
        self(response)
    }
}

/// Writes the response to the diagnostic log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&self, response: &SubmittedResponse) {
        match response.to_json() {
            Ok(json) => info!(
                session_id = %response.session_id,
                answers = response.answers.len(),
                response = %json,
                "survey response submitted"
            ),
            Err(err) => warn!(
                session_id = %response.session_id,
                "failed to encode submitted response: {err}"
            ),
        }
    }
}

/// Forwards responses to a channel, e.g. a presenter or an uploader task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<SubmittedResponse>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<SubmittedResponse>) -> Self {
        Self { tx }
    }
}

impl SubmissionSink for ChannelSink {
    fn submit(&self, response: &SubmittedResponse) {
        if self.tx.send(response.clone()).is_err() {
            warn!(
                session_id = %response.session_id,
                "submission receiver dropped; response discarded"
            );
        }
    }
}

/// Hands every response to both sinks in order.
#[derive(Debug, Clone)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: SubmissionSink, B: SubmissionSink> SubmissionSink for Tee<A, B> {
    fn submit(&self, response: &SubmittedResponse) {
        self.0.submit(response);
        self.1.submit(response);
    }
}
