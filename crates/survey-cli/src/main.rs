mod config;
mod wizard;

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use config::SurveyConfig;
use survey_flow::{
    ChannelSink, LogSink, ScreenKind, SurveyFlowController, Tee, TokioTicker,
    build_render_payload,
};
use survey_spec::{AnswerMap, ValidationResult, catalog_schema, validate};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wizard::{
    InputContext, OutputFormat, Verbosity, WizardCommand, WizardPresenter, apply_command,
    parse_command,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Terminal feedback survey",
    long_about = "Runs the feedback survey flow in a terminal and offers catalog and answer helpers"
)]
struct Cli {
    /// Log flow transitions to stderr (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

impl From<RenderMode> for OutputFormat {
    fn from(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Text => OutputFormat::Text,
            RenderMode::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Present the survey interactively, reading answers from stdin.
    Run {
        /// Catalog JSON to present (defaults to SURVEY_CATALOG or the built-in survey).
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
        /// Seconds the thank-you screen stays up (defaults to SURVEY_COUNTDOWN_SECS or 5).
        #[arg(long, value_name = "SECS")]
        countdown: Option<u32>,
        /// Render output mode for each screen.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
        /// Exit after the first submission returns to the welcome screen.
        #[arg(long)]
        once: bool,
        /// Also print each submitted response as JSON.
        #[arg(long)]
        answers_json: bool,
    },
    /// Print the catalog JSON.
    Describe {
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
    },
    /// Print the JSON Schema of the catalog format.
    Schema,
    /// Validate an answers JSON file against the catalog.
    Validate {
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
        /// Path to the answers JSON file (question id -> value, null for skipped).
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Run {
            catalog,
            countdown,
            format,
            once,
            answers_json,
        } => {
            let config = SurveyConfig::resolve(catalog, countdown)?;
            let presenter = WizardPresenter::new(
                Verbosity::from_verbose(cli.verbose),
                format.into(),
                answers_json,
            );
            run_survey(config, presenter, once)
        }
        Command::Describe { catalog } => {
            let config = SurveyConfig::resolve(catalog, None)?;
            println!("{}", serde_json::to_string_pretty(&config.catalog)?);
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&catalog_schema())?);
            Ok(())
        }
        Command::Validate { catalog, answers } => run_validate(catalog, answers),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_validate(catalog: Option<PathBuf>, answers_path: PathBuf) -> CliResult<()> {
    let config = SurveyConfig::resolve(catalog, None)?;
    let answers_json = fs::read_to_string(answers_path)?;
    let answers: AnswerMap = serde_json::from_str(&answers_json)?;

    let result = validate(&config.catalog, &answers);
    println!("Catalog: {}", config.catalog_label());
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  question {} - {}", error.question_id, error.message);
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            join_ids(&result.missing_required)
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            join_ids(&result.unknown_fields)
        );
    }
}

fn join_ids(ids: &[survey_spec::QuestionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_survey(config: SurveyConfig, presenter: WizardPresenter, once: bool) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(config, presenter, once))
}

/// Reads stdin on a plain thread; a blocking read must not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("failed to read stdin: {err}");
                    break;
                }
            }
        }
    });
    rx
}

async fn drive(config: SurveyConfig, presenter: WizardPresenter, once: bool) -> CliResult<()> {
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (submit_tx, mut submissions) = mpsc::unbounded_channel();
    info!(catalog = %config.catalog_label(), countdown = config.countdown_secs, "survey ready");
    let ticker = TokioTicker::new(tokio::runtime::Handle::current(), tick_tx);
    let sink = Tee(LogSink, ChannelSink::new(submit_tx));
    let options = config.flow_options();
    let mut flow = SurveyFlowController::new(config.catalog, sink, ticker)?.with_options(options);
    let mut input = spawn_stdin_reader();
    let mut input_open = true;

    presenter.show(&build_render_payload(&flow));

    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                let before = flow.screen_kind();
                flow.on_tick(tick);
                let payload = build_render_payload(&flow);
                if before == ScreenKind::ThankYou && payload.screen == ScreenKind::Welcome {
                    if once {
                        break;
                    }
                    presenter.show(&payload);
                } else {
                    presenter.show_countdown(&payload);
                }
            }
            line = input.recv(), if input_open => match line {
                Some(line) => {
                    let command = parse_command(InputContext::of(&flow), &line);
                    debug!(?command, "wizard input");
                    if !apply_command(&mut flow, &command) {
                        break;
                    }
                    while let Ok(response) = submissions.try_recv() {
                        presenter.show_submission(&response);
                    }
                    match &command {
                        WizardCommand::Help => presenter.show_help(),
                        WizardCommand::Invalid(err) => presenter.show_parse_error(err),
                        WizardCommand::Unknown(input) => presenter.show_unknown(input),
                        WizardCommand::Start => {
                            presenter.show_session(flow.session_id().map(|id| id.as_str()));
                            presenter.show(&build_render_payload(&flow));
                        }
                        _ => presenter.show(&build_render_payload(&flow)),
                    }
                }
                None => input_open = false,
            },
            else => break,
        }

        if !input_open && flow.screen_kind() != ScreenKind::ThankYou {
            break;
        }
    }
    Ok(())
}
