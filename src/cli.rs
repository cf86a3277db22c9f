//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Settings, DEFAULT_TIMEOUT_SECS};
use crate::dispatch;
use crate::error::CfpError;
use crate::extract::HttpPageSource;
use crate::models::{Annotation, Request};
use crate::report::{render_json, Report};
use crate::tagger::ModelStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Sorted names and affiliations
    Text,
    /// Every entity in order of appearance
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "cfp-ner")]
#[command(about = "Tag people's names and affiliations on 'Call For Papers' pages")]
#[command(version)]
pub struct Cli {
    /// WikiCFP page to scrape the call for papers from
    #[arg(long)]
    pub url: String,

    /// NER model: 'm1' statistical span classifier (default), 'm2' CRF tagger
    #[arg(long)]
    pub model: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Directory with lexicon.json, span.json and crf.json (built-in models if unset)
    #[arg(long, env = "CFP_NER_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, env = "CFP_NER_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

const USAGE: &str = "Usage: cfp-ner --url URL [--model m1|m2]";

/// Run once and return the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let settings = Settings::new(cli.model_dir.clone(), cli.timeout);

    let annotations = match annotate(&cli, &settings).await {
        Ok(annotations) => annotations,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("error: {}", e);
            if let Some(usage) = usage_hint(&e) {
                eprintln!("{}", usage);
            }
            return e.exit_code();
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", Report::from_annotations(&annotations).render_text()),
        OutputFormat::Json => match render_json(&annotations) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot encode results: {}", e);
                return 1;
            }
        },
    }
    0
}

async fn annotate(cli: &Cli, settings: &Settings) -> Result<Vec<Annotation>, CfpError> {
    // Bad arguments are reported before the HTTP client is built.
    Request::parse(&cli.url, cli.model.as_deref())?;
    let store = ModelStore::new(settings.model_dir.clone());
    let source = HttpPageSource::new(settings)?;
    dispatch::run(&cli.url, cli.model.as_deref(), &source, &store).await
}

/// Argument errors get a usage line after the message.
fn usage_hint(e: &CfpError) -> Option<&'static str> {
    match e {
        CfpError::InvalidUrl(_) | CfpError::InvalidModel(_) => Some(USAGE),
        _ => None,
    }
}
