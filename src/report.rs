use crate::models::{Annotation, Label};

/// Names and affiliations, sorted, exact duplicates removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub names: Vec<String>,
    pub affiliations: Vec<String>,
}

impl Report {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let collect = |label: Label| {
            let mut texts: Vec<String> = annotations
                .iter()
                .filter(|a| a.label == label)
                .map(|a| a.text.clone())
                .collect();
            texts.sort();
            texts.dedup();
            texts
        };
        Self {
            names: collect(Label::Person),
            affiliations: collect(Label::Organization),
        }
    }

    pub fn render_text(&self) -> String {
        format!(
            "***Names***\n{}\n\n***Affiliations***\n{}\n",
            self.names.join(" * "),
            self.affiliations.join(" * ")
        )
    }
}

/// The raw tagger output, in order of appearance.
pub fn render_json(annotations: &[Annotation]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(annotations)
}
