use std::mem;
use std::time::Duration;

use survey_spec::{
    AnswerMap, AnswerValue, CatalogError, QuestionDefinition, QuestionId, SessionId,
    SubmittedResponse, SurveyCatalog,
};
use tracing::{debug, info};

use crate::countdown::{CountdownTick, DEFAULT_COUNTDOWN_SECS, DEFAULT_TICK_PERIOD, Ticker};
use crate::session::{Screen, ScreenKind, SurveySession, ThankYou};
use crate::sink::SubmissionSink;

/// Tunables for the thank-you countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOptions {
    /// Seconds shown on the thank-you screen, at least 1.
    pub countdown_secs: u32,
    pub tick_period: Duration,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

/// "Question N of M" counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub number: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.number * 100 / self.total
        }
    }
}

/// Owns the survey screens, navigation, answers and submission.
///
/// Commands that arrive outside their precondition are ignored and logged at
/// debug level; none of them can fail.
pub struct SurveyFlowController<S, T> {
    catalog: SurveyCatalog,
    screen: Screen,
    sink: S,
    ticker: T,
    options: FlowOptions,
    epoch: u64,
}

impl<S, T> SurveyFlowController<S, T> {
    pub fn catalog(&self) -> &SurveyCatalog {
        &self.catalog
    }

    pub fn options(&self) -> FlowOptions {
        self.options
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_kind(&self) -> ScreenKind {
        self.screen.kind()
    }

    pub fn session(&self) -> Option<&SurveySession> {
        match &self.screen {
            Screen::Survey(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match &self.screen {
            Screen::Survey(session) => Some(&session.session_id),
            Screen::ThankYou(thanks) => Some(&thanks.session_id),
            Screen::Welcome => None,
        }
    }

    pub fn question_index(&self) -> Option<usize> {
        self.session().map(|session| session.question_index)
    }

    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        self.question_index()
            .and_then(|index| self.catalog.get(index))
    }

    pub fn answers(&self) -> Option<&AnswerMap> {
        self.session().map(|session| &session.answers)
    }

    pub fn confirm_pending(&self) -> bool {
        self.session()
            .map(|session| session.confirm_pending)
            .unwrap_or(false)
    }

    /// Seconds left on the thank-you screen.
    pub fn countdown(&self) -> Option<u32> {
        match &self.screen {
            Screen::ThankYou(thanks) => Some(thanks.remaining),
            _ => None,
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.question_index()
            .is_some_and(|index| index + 1 == self.catalog.len())
    }

    /// False while the submit confirmation is open.
    pub fn can_go_back(&self) -> bool {
        !self.confirm_pending() && self.question_index().is_some_and(|index| index > 0)
    }

    /// Optional questions other than the last may be skipped.
    pub fn can_skip(&self) -> bool {
        !self.confirm_pending()
            && !self.is_last_question()
            && self
                .current_question()
                .is_some_and(|question| !question.required)
    }

    pub fn progress(&self) -> Option<Progress> {
        self.question_index().map(|index| Progress {
            number: index + 1,
            total: self.catalog.len(),
        })
    }

    fn editable_session(&mut self, command: &'static str) -> Option<&mut SurveySession> {
        match &self.screen {
            Screen::Survey(session) if !session.confirm_pending => {}
            Screen::Survey(_) => {
                debug!(command, "ignored while submission confirmation is pending");
                return None;
            }
            other => {
                debug!(command, screen = other.kind().as_str(), "ignored outside survey screen");
                return None;
            }
        }
        match &mut self.screen {
            Screen::Survey(session) => Some(session),
            _ => None,
        }
    }
}

impl<S: SubmissionSink, T: Ticker> SurveyFlowController<S, T> {
    pub fn new(catalog: SurveyCatalog, sink: S, ticker: T) -> Result<Self, CatalogError> {
        catalog.check()?;
        Ok(Self {
            catalog,
            screen: Screen::Welcome,
            sink,
            ticker,
            options: FlowOptions::default(),
            epoch: 0,
        })
    }

    pub fn with_options(mut self, options: FlowOptions) -> Self {
        self.options = FlowOptions {
            countdown_secs: options.countdown_secs.max(1),
            ..options
        };
        self
    }

    /// Begins a fresh session from any screen.
    pub fn start_survey(&mut self) {
        let session = SurveySession::fresh();
        info!(session_id = %session.session_id, from = self.screen_kind().as_str(), "survey started");
        self.screen = Screen::Survey(session);
    }

    /// Records an answer. Ids outside the catalog are ignored.
    pub fn set_answer(&mut self, question_id: QuestionId, value: AnswerValue) {
        if !self.catalog.contains(question_id) {
            debug!(question_id = question_id.0, "ignored answer for unknown question");
            return;
        }
        if let Some(session) = self.editable_session("set_answer") {
            session.answers.set(question_id, value);
        }
    }

    /// Advances one question. Answers are not required to move on.
    pub fn go_next(&mut self) {
        let last = self.catalog.len() - 1;
        if let Some(session) = self.editable_session("go_next") {
            if session.question_index < last {
                session.question_index += 1;
            } else {
                debug!("go_next ignored on the last question");
            }
        }
    }

    pub fn go_previous(&mut self) {
        if let Some(session) = self.editable_session("go_previous") {
            if session.question_index > 0 {
                session.question_index -= 1;
            } else {
                debug!("go_previous ignored on the first question");
            }
        }
    }

    /// Marks an optional question as skipped and advances.
    pub fn skip(&mut self) {
        let Some(question) = self.current_question() else {
            debug!(command = "skip", "ignored outside survey screen");
            return;
        };
        if question.required {
            debug!(question_id = question.id.0, "skip ignored for required question");
            return;
        }
        let id = question.id;
        let last = self.catalog.len() - 1;
        if let Some(session) = self.editable_session("skip") {
            session.answers.mark_skipped(id);
            if session.question_index < last {
                session.question_index += 1;
            }
        }
    }

    /// Opens the confirmation gate. Only reachable from the last question.
    pub fn request_submit(&mut self) {
        let last = self.catalog.len() - 1;
        match &mut self.screen {
            Screen::Survey(session) if session.question_index == last => {
                session.confirm_pending = true;
            }
            Screen::Survey(session) => {
                debug!(
                    question_index = session.question_index,
                    "request_submit ignored before the last question"
                );
            }
            other => {
                debug!(
                    command = "request_submit",
                    screen = other.kind().as_str(),
                    "ignored outside survey screen"
                );
            }
        }
    }

    /// Commits the pending submission and starts the thank-you countdown.
    pub fn confirm_submit(&mut self) {
        match mem::replace(&mut self.screen, Screen::Welcome) {
            Screen::Survey(session) if session.confirm_pending => {
                let response = SubmittedResponse::completed(session.session_id, session.answers);
                self.sink.submit(&response);

                self.epoch += 1;
                let ticks = self.ticker.start(self.epoch, self.options.tick_period);
                info!(
                    session_id = %response.session_id,
                    countdown = self.options.countdown_secs,
                    "survey submitted"
                );
                self.screen = Screen::ThankYou(ThankYou {
                    session_id: response.session_id,
                    remaining: self.options.countdown_secs,
                    epoch: self.epoch,
                    _ticks: ticks,
                });
            }
            other => {
                debug!(
                    command = "confirm_submit",
                    screen = other.kind().as_str(),
                    "ignored without a pending submission"
                );
                self.screen = other;
            }
        }
    }

    pub fn cancel_submit(&mut self) {
        match &mut self.screen {
            Screen::Survey(session) if session.confirm_pending => {
                session.confirm_pending = false;
            }
            _ => debug!(command = "cancel_submit", "ignored without a pending submission"),
        }
    }

    /// Counts the thank-you screen down by one second; at zero the flow
    /// returns to the welcome screen and the ticker is released.
    pub fn tick_countdown(&mut self) {
        let Screen::ThankYou(thanks) = &mut self.screen else {
            debug!(command = "tick_countdown", "ignored outside thank-you screen");
            return;
        };
        thanks.remaining = thanks.remaining.saturating_sub(1);
        if thanks.remaining == 0 {
            info!(session_id = %thanks.session_id, "countdown finished, returning to welcome");
            self.screen = Screen::Welcome;
        }
    }

    /// Applies a scheduled tick if it belongs to the live countdown.
    pub fn on_tick(&mut self, tick: CountdownTick) {
        let live = matches!(&self.screen, Screen::ThankYou(thanks) if thanks.epoch == tick.epoch);
        if live {
            self.tick_countdown();
        } else {
            debug!(epoch = tick.epoch, "dropped stale countdown tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::ManualTicker;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Submitted = Rc<RefCell<Vec<SubmittedResponse>>>;

    fn controller() -> (
        SurveyFlowController<impl SubmissionSink, ManualTicker>,
        Submitted,
    ) {
        let submitted: Submitted = Rc::default();
        let sink = {
            let submitted = Rc::clone(&submitted);
            move |response: &SubmittedResponse| submitted.borrow_mut().push(response.clone())
        };
        let flow = SurveyFlowController::new(SurveyCatalog::feedback(), sink, ManualTicker)
            .expect("valid catalog");
        (flow, submitted)
    }

    #[test]
    fn starts_on_welcome_without_session() {
        let (flow, _) = controller();
        assert_eq!(flow.screen_kind(), ScreenKind::Welcome);
        assert!(flow.session_id().is_none());
        assert!(flow.question_index().is_none());
        assert!(flow.countdown().is_none());
    }

    #[test]
    fn navigation_is_ignored_on_welcome() {
        let (mut flow, _) = controller();
        flow.go_next();
        flow.go_previous();
        flow.skip();
        flow.request_submit();
        flow.confirm_submit();
        flow.set_answer(QuestionId(1), 3.into());
        assert_eq!(flow.screen_kind(), ScreenKind::Welcome);
    }

    #[test]
    fn index_stays_within_bounds() {
        let (mut flow, _) = controller();
        flow.start_survey();
        flow.go_previous();
        assert_eq!(flow.question_index(), Some(0));
        for _ in 0..10 {
            flow.go_next();
        }
        assert_eq!(flow.question_index(), Some(4));
        assert!(flow.is_last_question());
        for _ in 0..10 {
            flow.go_previous();
        }
        assert_eq!(flow.question_index(), Some(0));
    }

    #[test]
    fn going_back_keeps_answers() {
        let (mut flow, _) = controller();
        flow.start_survey();
        flow.set_answer(QuestionId(1), 5.into());
        flow.go_next();
        flow.go_previous();
        assert_eq!(
            flow.answers().and_then(|answers| answers.value(QuestionId(1))),
            Some(&AnswerValue::Rating(5))
        );
    }

    #[test]
    fn start_survey_resets_everything() {
        let (mut flow, _) = controller();
        flow.start_survey();
        let first = flow.session_id().cloned();
        flow.set_answer(QuestionId(1), 2.into());
        flow.go_next();
        flow.start_survey();
        assert_eq!(flow.question_index(), Some(0));
        assert!(flow.answers().is_some_and(AnswerMap::is_empty));
        assert!(!flow.confirm_pending());
        assert_ne!(flow.session_id().cloned(), first);
    }

    #[test]
    fn unknown_question_ids_are_not_recorded() {
        let (mut flow, _) = controller();
        flow.start_survey();
        flow.set_answer(QuestionId(99), "stray".into());
        assert!(flow.answers().is_some_and(AnswerMap::is_empty));
    }

    #[test]
    fn skip_on_last_question_marks_without_advancing() {
        let (mut flow, _) = controller();
        flow.start_survey();
        for _ in 0..4 {
            flow.go_next();
        }
        flow.skip();
        assert_eq!(flow.question_index(), Some(4));
        assert_eq!(
            flow.answers().map(|answers| answers.state(QuestionId(5))),
            Some(survey_spec::AnswerState::Skipped)
        );
    }

    #[test]
    fn can_skip_only_optional_non_last_questions() {
        let (mut flow, _) = controller();
        flow.start_survey();
        assert!(!flow.can_skip());
        flow.go_next();
        assert!(!flow.can_skip());
        flow.go_next();
        assert!(flow.can_skip());
        flow.go_next();
        flow.go_next();
        assert!(!flow.can_skip());
    }

    #[test]
    fn request_submit_requires_last_question() {
        let (mut flow, _) = controller();
        flow.start_survey();
        flow.request_submit();
        assert!(!flow.confirm_pending());
    }

    #[test]
    fn pending_confirmation_freezes_the_session() {
        let (mut flow, _) = controller();
        flow.start_survey();
        for _ in 0..4 {
            flow.go_next();
        }
        flow.request_submit();
        flow.go_previous();
        flow.set_answer(QuestionId(5), "late edit".into());
        assert_eq!(flow.question_index(), Some(4));
        assert!(flow.answers().is_some_and(|answers| !answers.contains(QuestionId(5))));
        assert!(flow.confirm_pending());
        assert!(!flow.can_go_back());
        assert!(!flow.can_skip());

        flow.cancel_submit();
        assert!(flow.can_go_back());
    }

    #[test]
    fn countdown_option_is_at_least_one() {
        let (flow, _) = controller();
        let flow = flow.with_options(FlowOptions {
            countdown_secs: 0,
            ..FlowOptions::default()
        });
        assert_eq!(flow.options().countdown_secs, 1);
    }

    #[test]
    fn progress_reports_position() {
        let (mut flow, _) = controller();
        assert!(flow.progress().is_none());
        flow.start_survey();
        flow.go_next();
        let progress = flow.progress().expect("progress");
        assert_eq!((progress.number, progress.total), (2, 5));
        assert_eq!(progress.percent(), 40);
    }
}
