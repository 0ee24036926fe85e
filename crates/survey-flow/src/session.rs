use serde::{Deserialize, Serialize};
use survey_spec::{AnswerMap, SessionId};

use crate::countdown::TickGuard;

/// Discriminant of [`Screen`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenKind {
    Welcome,
    Survey,
    ThankYou,
}

impl ScreenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenKind::Welcome => "welcome",
            ScreenKind::Survey => "survey",
            ScreenKind::ThankYou => "thank_you",
        }
    }
}

/// Top-level flow state. Each variant carries only what that screen needs.
#[derive(Debug)]
pub enum Screen {
    Welcome,
    Survey(SurveySession),
    ThankYou(ThankYou),
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Screen::Welcome => ScreenKind::Welcome,
            Screen::Survey(_) => ScreenKind::Survey,
            Screen::ThankYou(_) => ScreenKind::ThankYou,
        }
    }
}

/// State of a survey in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySession {
    pub(crate) session_id: SessionId,
    pub(crate) question_index: usize,
    pub(crate) answers: AnswerMap,
    pub(crate) confirm_pending: bool,
}

impl SurveySession {
    pub(crate) fn fresh() -> Self {
        Self {
            session_id: SessionId::generate(),
            question_index: 0,
            answers: AnswerMap::new(),
            confirm_pending: false,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn confirm_pending(&self) -> bool {
        self.confirm_pending
    }
}

/// Thank-you screen with its running countdown.
#[derive(Debug)]
pub struct ThankYou {
    pub(crate) session_id: SessionId,
    pub(crate) remaining: u32,
    pub(crate) epoch: u64,
    pub(crate) _ticks: TickGuard,
}

impl ThankYou {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Seconds left before the flow returns to the welcome screen.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
