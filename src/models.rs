use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CfpError;
use crate::extract::validate_url;

/// Which tagging back-end to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// `m1`: pretrained statistical span classifier.
    #[default]
    Statistical,
    /// `m2`: pretrained linear-chain CRF sequence tagger.
    Crf,
}

impl ModelKind {
    pub fn selector(self) -> &'static str {
        match self {
            ModelKind::Statistical => "m1",
            ModelKind::Crf => "m2",
        }
    }
}

impl FromStr for ModelKind {
    type Err = CfpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m1" => Ok(ModelKind::Statistical),
            "m2" => Ok(ModelKind::Crf),
            _ => Err(CfpError::InvalidModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Person,
    Organization,
    Other,
}

impl Label {
    /// Map a back-end label onto the shared schema. `None` means "outside".
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw {
            "O" | "" => None,
            "PERSON" | "PER" => Some(Label::Person),
            "ORGANIZATION" | "ORG" => Some(Label::Organization),
            _ => Some(Label::Other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub label: Label,
}

impl Annotation {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// A validated, immutable run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub model: ModelKind,
}

impl Request {
    /// Validate the URL shape and the model selector. No I/O happens here.
    pub fn parse(url: &str, model: Option<&str>) -> Result<Self, CfpError> {
        let url = validate_url(url)?;
        let model = match model {
            Some(selector) => selector.parse()?,
            None => ModelKind::default(),
        };
        Ok(Self { url, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_URL: &str = "http://www.wikicfp.com/cfp/servlet/event.showcfp?eventid=91234";

    #[test]
    fn omitted_model_defaults_to_m1() {
        let req = Request::parse(EVENT_URL, None).unwrap();
        assert_eq!(req.model, ModelKind::Statistical);
        assert_eq!(req.model.selector(), "m1");
    }

    #[test]
    fn selectors_map_to_variants() {
        assert_eq!(Request::parse(EVENT_URL, Some("m1")).unwrap().model, ModelKind::Statistical);
        assert_eq!(Request::parse(EVENT_URL, Some("m2")).unwrap().model, ModelKind::Crf);
        assert_eq!(Request::parse(EVENT_URL, Some(" M2 ")).unwrap().model, ModelKind::Crf);
    }

    #[test]
    fn unknown_selector_is_invalid_model() {
        for bad in ["m3", "", "spacy"] {
            let err = Request::parse(EVENT_URL, Some(bad)).unwrap_err();
            assert!(matches!(err, CfpError::InvalidModel(_)), "{bad:?} -> {err:?}");
        }
    }

    #[test]
    fn url_is_checked_before_model() {
        let err = Request::parse("http://example.com", Some("m3")).unwrap_err();
        assert!(matches!(err, CfpError::InvalidUrl(_)));
    }

    #[test]
    fn model_labels_normalize() {
        assert_eq!(Label::from_model_label("O"), None);
        assert_eq!(Label::from_model_label("PERSON"), Some(Label::Person));
        assert_eq!(Label::from_model_label("ORG"), Some(Label::Organization));
        assert_eq!(Label::from_model_label("ORGANIZATION"), Some(Label::Organization));
        assert_eq!(Label::from_model_label("LOCATION"), Some(Label::Other));
    }

    #[test]
    fn labels_serialize_upper_case() {
        let json = serde_json::to_string(&Annotation::new("ACM", Label::Organization)).unwrap();
        assert_eq!(json, r#"{"text":"ACM","label":"ORGANIZATION"}"#);
    }
}
