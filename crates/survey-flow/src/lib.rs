//! Survey flow state machine.
//!
//! [`SurveyFlowController`] walks a respondent from the welcome screen
//! through the questions of a [`SurveyCatalog`](survey_spec::SurveyCatalog),
//! gates submission behind an explicit confirmation, and counts the
//! thank-you screen back down to the start. Renderers drive it with
//! commands and read it back through [`build_render_payload`].

pub mod controller;
pub mod countdown;
pub mod render;
pub mod session;
pub mod sink;

pub use controller::{FlowOptions, Progress, SurveyFlowController};
pub use countdown::{
    CountdownTick, DEFAULT_COUNTDOWN_SECS, DEFAULT_TICK_PERIOD, ManualTicker, TickGuard, Ticker,
    TokioTicker,
};
pub use render::{RenderPayload, RenderQuestion, build_render_payload, render_json_ui, render_text};
pub use session::{Screen, ScreenKind, SurveySession, ThankYou};
pub use sink::{ChannelSink, LogSink, SubmissionSink, Tee};
