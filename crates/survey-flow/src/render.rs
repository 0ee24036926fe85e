use serde_json::{Map, Value, json};
use survey_spec::{AnswerState, AnswerValue, QuestionId, QuestionKind};

use crate::controller::{Progress, SurveyFlowController};
use crate::session::ScreenKind;

const PROGRESS_BAR_WIDTH: usize = 20;

/// Describes the question currently on screen.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub required: bool,
    pub current_value: Option<AnswerValue>,
    pub skipped: bool,
}

/// Everything a renderer needs to draw the current screen.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub survey_id: String,
    pub survey_title: String,
    pub screen: ScreenKind,
    pub help: Option<String>,
    pub question: Option<RenderQuestion>,
    pub progress: Option<Progress>,
    pub can_go_back: bool,
    pub can_skip: bool,
    pub is_last: bool,
    pub confirm_pending: bool,
    pub countdown: Option<u32>,
}

/// Snapshot the controller's read surface into a payload.
pub fn build_render_payload<S, T>(flow: &SurveyFlowController<S, T>) -> RenderPayload {
    let catalog = flow.catalog();
    let question = flow.current_question().map(|question| {
        let state = flow
            .answers()
            .map(|answers| answers.state(question.id))
            .unwrap_or(AnswerState::Unanswered);
        RenderQuestion {
            id: question.id,
            text: question.text.clone(),
            kind: question.kind,
            required: question.required,
            current_value: match state {
                AnswerState::Answered(value) => Some(value.clone()),
                _ => None,
            },
            skipped: matches!(state, AnswerState::Skipped),
        }
    });

    let help = match flow.screen_kind() {
        ScreenKind::Welcome => catalog.welcome_text(),
        ScreenKind::ThankYou => catalog.thank_you_text(),
        ScreenKind::Survey => None,
    }
    .map(str::to_string);

    RenderPayload {
        survey_id: catalog.id.clone(),
        survey_title: catalog.title.clone(),
        screen: flow.screen_kind(),
        help,
        question,
        progress: flow.progress(),
        can_go_back: flow.can_go_back(),
        can_skip: flow.can_skip(),
        is_last: flow.is_last_question(),
        confirm_pending: flow.confirm_pending(),
        countdown: flow.countdown(),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let question = payload.question.as_ref().map(|question| {
        let mut map = Map::new();
        map.insert("id".into(), json!(question.id));
        map.insert("text".into(), Value::String(question.text.clone()));
        map.insert("type".into(), Value::String(question.kind.as_str().into()));
        map.insert("required".into(), Value::Bool(question.required));
        if let Some(scale) = question.kind.scale() {
            map.insert("scale".into(), json!(scale));
        }
        if let Some(value) = &question.current_value {
            map.insert("current_value".into(), json!(value));
        }
        map.insert("skipped".into(), Value::Bool(question.skipped));
        Value::Object(map)
    });

    json!({
        "survey_id": payload.survey_id,
        "survey_title": payload.survey_title,
        "screen": payload.screen,
        "help": payload.help,
        "question": question,
        "progress": payload.progress.map(|progress| json!({
            "number": progress.number,
            "total": progress.total,
            "percent": progress.percent(),
        })),
        "actions": {
            "previous": payload.can_go_back,
            "skip": payload.can_skip,
            "next": payload.screen == ScreenKind::Survey && !payload.is_last,
            "submit": payload.screen == ScreenKind::Survey && payload.is_last,
        },
        "confirm_pending": payload.confirm_pending,
        "countdown": payload.countdown,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    match payload.screen {
        ScreenKind::Welcome => {
            lines.push(format!("Welcome to {}!", payload.survey_title));
            if let Some(help) = &payload.help {
                lines.push(help.clone());
            }
        }
        ScreenKind::Survey => {
            if let Some(progress) = payload.progress {
                lines.push(format!(
                    "Question {} of {}  {}",
                    progress.number,
                    progress.total,
                    progress_bar(progress)
                ));
            }
            if let Some(question) = &payload.question {
                let mut title = question.text.clone();
                if question.required {
                    title.push_str(" *");
                }
                lines.push(title);
                if let Some(max) = question.kind.scale() {
                    lines.push(format!("  Rate 1 (Poor) to {} (Excellent)", max));
                } else {
                    lines.push("  Please share your thoughts...".to_string());
                }
                if let Some(value) = &question.current_value {
                    lines.push(format!("  Current answer: {}", value.display()));
                } else if question.skipped {
                    lines.push("  Current answer: (skipped)".to_string());
                }
            }
            if payload.confirm_pending {
                lines.push("Submit Survey".to_string());
                lines.push("Are you sure you want to submit your responses?".to_string());
            }
        }
        ScreenKind::ThankYou => {
            lines.push("Thank You!".to_string());
            lines.push("Your feedback has been successfully submitted.".to_string());
            if let Some(help) = &payload.help {
                lines.push(help.clone());
            }
            if let Some(countdown) = payload.countdown {
                lines.push(countdown_line(countdown));
            }
        }
    }
    lines.join("\n")
}

pub fn countdown_line(remaining: u32) -> String {
    format!("Returning to start in {} seconds...", remaining)
}

fn progress_bar(progress: Progress) -> String {
    let filled = if progress.total == 0 {
        0
    } else {
        progress.number * PROGRESS_BAR_WIDTH / progress.total
    };
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        progress.percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::ManualTicker;
    use crate::sink::LogSink;
    use survey_spec::SurveyCatalog;

    fn flow() -> SurveyFlowController<LogSink, ManualTicker> {
        SurveyFlowController::new(SurveyCatalog::feedback(), LogSink, ManualTicker)
            .expect("valid catalog")
    }

    #[test]
    fn welcome_payload_uses_presentation_copy() {
        let flow = flow();
        let payload = build_render_payload(&flow);
        assert_eq!(payload.screen, ScreenKind::Welcome);
        assert!(payload.question.is_none());
        let text = render_text(&payload);
        assert!(text.contains("Welcome to Customer Feedback!"));
        assert!(text.contains("We value your feedback"));
    }

    #[test]
    fn survey_text_shows_position_and_scale() {
        let mut flow = flow();
        flow.start_survey();
        flow.set_answer(QuestionId(1), 4.into());
        let text = render_text(&build_render_payload(&flow));
        assert!(text.contains("Question 1 of 5"));
        assert!(text.contains("How satisfied are you with our service? *"));
        assert!(text.contains("Rate 1 (Poor) to 5 (Excellent)"));
        assert!(text.contains("Current answer: 4"));
    }

    #[test]
    fn json_ui_exposes_actions() {
        let mut flow = flow();
        flow.start_survey();
        flow.go_next();
        flow.go_next();
        let ui = render_json_ui(&build_render_payload(&flow));
        assert_eq!(ui["screen"], "SURVEY");
        assert_eq!(ui["question"]["id"], 3);
        assert_eq!(ui["question"]["scale"], 5);
        assert_eq!(ui["progress"]["number"], 3);
        assert_eq!(ui["actions"]["previous"], true);
        assert_eq!(ui["actions"]["skip"], true);
        assert_eq!(ui["actions"]["submit"], false);
    }

    #[test]
    fn json_ui_disables_navigation_while_confirming() {
        let mut flow = flow();
        flow.start_survey();
        for _ in 0..4 {
            flow.go_next();
        }
        flow.request_submit();
        let ui = render_json_ui(&build_render_payload(&flow));
        assert_eq!(ui["confirm_pending"], true);
        assert_eq!(ui["actions"]["previous"], false);
        assert_eq!(ui["actions"]["skip"], false);
    }

    #[test]
    fn skipped_question_is_marked() {
        let mut flow = flow();
        flow.start_survey();
        flow.go_next();
        flow.go_next();
        flow.skip();
        flow.go_previous();
        let payload = build_render_payload(&flow);
        let question = payload.question.expect("question");
        assert!(question.skipped);
        assert!(question.current_value.is_none());
        assert!(render_text(&build_render_payload(&flow)).contains("(skipped)"));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let bar = progress_bar(Progress {
            number: 5,
            total: 5,
        });
        assert_eq!(bar, format!("[{}] 100%", "#".repeat(PROGRESS_BAR_WIDTH)));
    }
}
