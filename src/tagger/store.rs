//! Pretrained resources: where they live and how they are loaded.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CfpError;
use crate::tagger::crf::CrfModel;
use crate::tagger::statistical::SpanWeights;

pub const LEXICON_FILE: &str = "lexicon.json";
pub const SPAN_FILE: &str = "span.json";
pub const CRF_FILE: &str = "crf.json";

const EMBEDDED_LEXICON: &str = include_str!("../../models/lexicon.json");
const EMBEDDED_SPAN: &str = include_str!("../../models/span.json");
const EMBEDDED_CRF: &str = include_str!("../../models/crf.json");

/// Word lists consulted by both taggers. Matching is case-sensitive except
/// for `connectors` and `person_cues`, which are compared lower-cased.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub given_names: HashSet<String>,
    #[serde(default)]
    pub honorifics: HashSet<String>,
    #[serde(default)]
    pub org_keywords: HashSet<String>,
    #[serde(default)]
    pub org_acronyms: HashSet<String>,
    /// Lower-case words that join the parts of one organization name
    /// ("of", "for", "de"). Coordinating words like "and" do not belong here.
    #[serde(default)]
    pub connectors: HashSet<String>,
    #[serde(default)]
    pub stop_capitalized: HashSet<String>,
    #[serde(default)]
    pub person_cues: HashSet<String>,
    #[serde(default)]
    pub locations: HashSet<String>,
}

impl Lexicon {
    pub fn is_given_name(&self, word: &str) -> bool {
        self.given_names.contains(word)
    }

    pub fn is_honorific(&self, word: &str) -> bool {
        self.honorifics.contains(word)
    }

    pub fn is_org_keyword(&self, word: &str) -> bool {
        self.org_keywords.contains(word)
    }

    pub fn is_org_acronym(&self, word: &str) -> bool {
        self.org_acronyms.contains(word)
    }

    pub fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(&word.to_lowercase())
    }

    pub fn is_stop_capitalized(&self, word: &str) -> bool {
        self.stop_capitalized.contains(word)
    }

    pub fn is_person_cue(&self, word: &str) -> bool {
        self.person_cues.contains(&word.to_lowercase())
    }

    pub fn is_location(&self, word: &str) -> bool {
        self.locations.contains(word)
    }
}

/// Resolves model resources either from the binary or from a directory.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    dir: Option<PathBuf>,
}

impl ModelStore {
    pub fn embedded() -> Self {
        Self { dir: None }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn lexicon(&self) -> Result<Lexicon, CfpError> {
        self.load(LEXICON_FILE, EMBEDDED_LEXICON)
    }

    pub fn span_weights(&self) -> Result<SpanWeights, CfpError> {
        self.load(SPAN_FILE, EMBEDDED_SPAN)
    }

    pub fn crf_model(&self) -> Result<CrfModel, CfpError> {
        self.load(CRF_FILE, EMBEDDED_CRF)
    }

    fn load<T: DeserializeOwned>(&self, name: &str, embedded: &str) -> Result<T, CfpError> {
        match &self.dir {
            None => parse(name, embedded),
            Some(dir) => {
                let path = dir.join(name);
                tracing::debug!(path = %path.display(), "loading model resource");
                let raw = fs::read_to_string(&path).map_err(|e| {
                    CfpError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
                })?;
                parse(name, &raw)
            }
        }
    }
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T, CfpError> {
    serde_json::from_str(raw)
        .map_err(|e| CfpError::ModelUnavailable(format!("{} is malformed: {}", name, e)))
}
