use std::fmt::Write;

use survey_flow::{
    RenderPayload, ScreenKind, SubmissionSink, SurveyFlowController, Ticker, render_json_ui,
    render_text,
};
use survey_spec::{AnswerParseError, AnswerValue, QuestionKind, SubmittedResponse};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: screens and prompts only.
    Clean,
    /// Verbose output: session ids and command hints on every screen.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// One line of user input, interpreted against the screen it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    Start,
    Answer(AnswerValue),
    Next,
    Previous,
    Skip,
    Submit,
    Confirm,
    Cancel,
    Help,
    Quit,
    Invalid(AnswerParseError),
    Unknown(String),
}

/// Context the parser needs about the current screen.
#[derive(Debug, Clone, Copy)]
pub struct InputContext {
    pub screen: ScreenKind,
    pub confirm_pending: bool,
    pub kind: Option<QuestionKind>,
    pub is_last: bool,
}

impl InputContext {
    pub fn of<S, T>(flow: &SurveyFlowController<S, T>) -> Self {
        Self {
            screen: flow.screen_kind(),
            confirm_pending: flow.confirm_pending(),
            kind: flow.current_question().map(|question| question.kind),
            is_last: flow.is_last_question(),
        }
    }
}

pub fn parse_command(ctx: InputContext, line: &str) -> WizardCommand {
    let trimmed = line.trim();
    if let Some(command) = trimmed.strip_prefix('/') {
        return match command.to_ascii_lowercase().as_str() {
            "start" | "restart" => WizardCommand::Start,
            "next" => WizardCommand::Next,
            "back" | "prev" | "previous" => WizardCommand::Previous,
            "skip" => WizardCommand::Skip,
            "submit" => WizardCommand::Submit,
            "help" => WizardCommand::Help,
            "quit" | "exit" => WizardCommand::Quit,
            other => WizardCommand::Unknown(other.to_string()),
        };
    }

    match ctx.screen {
        ScreenKind::Welcome if trimmed.is_empty() => WizardCommand::Start,
        ScreenKind::Welcome | ScreenKind::ThankYou => WizardCommand::Unknown(trimmed.to_string()),
        ScreenKind::Survey if ctx.confirm_pending => {
            match trimmed.to_ascii_lowercase().as_str() {
                "y" | "yes" => WizardCommand::Confirm,
                "n" | "no" => WizardCommand::Cancel,
                other => WizardCommand::Unknown(other.to_string()),
            }
        }
        ScreenKind::Survey if trimmed.is_empty() => {
            if ctx.is_last {
                WizardCommand::Submit
            } else {
                WizardCommand::Next
            }
        }
        ScreenKind::Survey => match ctx.kind {
            Some(kind) => match kind.parse_input(line.trim_end_matches(['\r', '\n'])) {
                Ok(value) => WizardCommand::Answer(value),
                Err(err) => WizardCommand::Invalid(err),
            },
            None => WizardCommand::Unknown(trimmed.to_string()),
        },
    }
}

/// Applies a parsed command. Returns `false` once the user asked to quit.
pub fn apply_command<S: SubmissionSink, T: Ticker>(
    flow: &mut SurveyFlowController<S, T>,
    command: &WizardCommand,
) -> bool {
    match command {
        WizardCommand::Start => flow.start_survey(),
        WizardCommand::Answer(value) => {
            if let Some(id) = flow.current_question().map(|question| question.id) {
                flow.set_answer(id, value.clone());
            }
        }
        WizardCommand::Next => flow.go_next(),
        WizardCommand::Previous => flow.go_previous(),
        WizardCommand::Skip => flow.skip(),
        WizardCommand::Submit => flow.request_submit(),
        WizardCommand::Confirm => flow.confirm_submit(),
        WizardCommand::Cancel => flow.cancel_submit(),
        WizardCommand::Quit => return false,
        WizardCommand::Help | WizardCommand::Invalid(_) | WizardCommand::Unknown(_) => {}
    }
    true
}

/// Prints screens, hints and submissions to stdout.
pub struct WizardPresenter {
    verbosity: Verbosity,
    format: OutputFormat,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, format: OutputFormat, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            format,
            show_answers_json,
        }
    }

    pub fn show(&self, payload: &RenderPayload) {
        match self.format {
            OutputFormat::Json => println!("{}", render_json_ui(payload)),
            OutputFormat::Text => {
                println!();
                println!("{}", render_text(payload));
                println!("{}", hint_line(payload));
            }
        }
    }

    pub fn show_countdown(&self, payload: &RenderPayload) {
        match (self.format, payload.countdown) {
            (OutputFormat::Text, Some(remaining)) => {
                println!("{}", survey_flow::render::countdown_line(remaining))
            }
            _ => self.show(payload),
        }
    }

    pub fn show_session(&self, session_id: Option<&str>) {
        if self.verbosity.is_verbose()
            && let Some(session_id) = session_id
        {
            println!("Session: {}", session_id);
        }
    }

    pub fn show_help(&self) {
        println!("Commands: /start /next /back /skip /submit /quit");
        println!("On a question, type your answer and press Enter; an empty line moves on.");
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error);
    }

    pub fn show_unknown(&self, input: &str) {
        if !input.is_empty() {
            eprintln!("Unrecognised input '{}'; type /help for commands.", input);
        }
    }

    pub fn show_submission(&self, response: &SubmittedResponse) {
        if self.verbosity.is_verbose() {
            match response.to_cbor() {
                Ok(bytes) => println!("Response (CBOR hex): {}", encode_hex(&bytes)),
                Err(err) => eprintln!("Failed to serialize response to CBOR: {}", err),
            }
        }
        if self.show_answers_json {
            match response.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize response to JSON: {}", err),
            }
        }
    }
}

fn hint_line(payload: &RenderPayload) -> String {
    match payload.screen {
        ScreenKind::Welcome => "Press Enter to start the survey (/quit to leave).".to_string(),
        ScreenKind::ThankYou => "Type /start to begin again.".to_string(),
        ScreenKind::Survey if payload.confirm_pending => "Submit now? (yes/no)".to_string(),
        ScreenKind::Survey => {
            let mut actions = Vec::new();
            if payload.can_go_back {
                actions.push("/back");
            }
            if payload.can_skip {
                actions.push("/skip");
            }
            actions.push(if payload.is_last {
                "Enter to submit"
            } else {
                "Enter for next"
            });
            format!("[{}]", actions.join(" | "))
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
