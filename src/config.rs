use std::path::PathBuf;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("cfp-ner/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;
const INSECURE_SSL_ENV: &str = "CFP_NER_INSECURE_SSL";

/// Per-run settings, built once and passed to whatever needs them.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `lexicon.json`, `span.json` and `crf.json`.
    /// `None` uses the copies embedded in the binary.
    pub model_dir: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub insecure_ssl: bool,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: None,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure_ssl: false,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    pub fn new(model_dir: Option<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            model_dir,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            insecure_ssl: std::env::var(INSECURE_SSL_ENV).as_deref() == Ok("1"),
            ..Self::default()
        }
    }
}
