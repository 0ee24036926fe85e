use std::env;
use std::path::PathBuf;

use survey_flow::{DEFAULT_COUNTDOWN_SECS, FlowOptions};
use survey_spec::SurveyCatalog;
use tracing::info;

use crate::CliResult;

pub const CATALOG_ENV: &str = "SURVEY_CATALOG";
pub const COUNTDOWN_ENV: &str = "SURVEY_COUNTDOWN_SECS";

/// Settings resolved from flags first, then the environment, then defaults.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub catalog: SurveyCatalog,
    pub catalog_source: Option<PathBuf>,
    pub countdown_secs: u32,
}

impl SurveyConfig {
    pub fn resolve(catalog: Option<PathBuf>, countdown: Option<u32>) -> CliResult<Self> {
        let catalog_source = catalog.or_else(|| env::var_os(CATALOG_ENV).map(PathBuf::from));
        let catalog = match &catalog_source {
            Some(path) => {
                info!(path = %path.display(), "loading survey catalog");
                SurveyCatalog::load(path)?
            }
            None => SurveyCatalog::feedback(),
        };

        let countdown_secs = match countdown {
            Some(value) => value,
            None => match env::var(COUNTDOWN_ENV) {
                Ok(raw) => raw.trim().parse().map_err(|_| {
                    format!("{COUNTDOWN_ENV} must be a whole number of seconds, got '{raw}'")
                })?,
                Err(_) => DEFAULT_COUNTDOWN_SECS,
            },
        };
        if countdown_secs == 0 {
            return Err("countdown must be at least one second".into());
        }

        Ok(Self {
            catalog,
            catalog_source,
            countdown_secs,
        })
    }

    /// Where the catalog came from, for logs and reports.
    pub fn catalog_label(&self) -> String {
        match &self.catalog_source {
            Some(path) => path.display().to_string(),
            None => "built-in".to_string(),
        }
    }

    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            countdown_secs: self.countdown_secs,
            ..FlowOptions::default()
        }
    }
}
