//! Span classifier (`m1`).
//!
//! Runs of capitalized tokens become candidate spans. Each span is scored as a
//! person and as an organization from weighted lexical and contextual
//! features; the winning label is kept when it clears the model threshold.

use std::ops::Range;

use serde::Deserialize;

use super::store::Lexicon;
use super::tokenize::{tokenize, Shape, Token};
use super::Tagger;
use crate::models::{Annotation, Label, ModelKind};

/// Punctuation skipped when looking for the word before a span.
const SKIPPABLE: &[&str] = &[":", ",", ".", "-"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpanWeights {
    // person evidence
    pub given_name: f64,
    pub honorific_before: f64,
    pub person_cue_before: f64,
    pub name_shaped: f64,
    pub initial: f64,
    pub connector_person: f64,
    pub single_token: f64,
    pub location: f64,
    // organization evidence
    pub org_keyword: f64,
    pub org_acronym: f64,
    pub acronym: f64,
    pub connector_org: f64,
    /// A label needs at least this score to be emitted.
    pub min_score: f64,
}

pub struct StatisticalTagger<'a> {
    lexicon: &'a Lexicon,
    weights: &'a SpanWeights,
}

impl<'a> StatisticalTagger<'a> {
    pub fn new(lexicon: &'a Lexicon, weights: &'a SpanWeights) -> Self {
        Self { lexicon, weights }
    }

    fn is_span_token(&self, token: &Token<'_>) -> bool {
        let capitalized = token.shape.is_capitalized()
            || (token.shape == Shape::Mixed
                && token.text.chars().next().is_some_and(char::is_uppercase));
        capitalized
            && !self.lexicon.is_stop_capitalized(token.text)
            && !self.lexicon.is_honorific(token.text)
    }

    /// Maximal runs of name-like tokens. Connectors only bridge two runs when
    /// the left run already names an organization ("University of Toronto").
    fn candidate_spans(&self, tokens: &[Token<'_>]) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if !self.is_span_token(&tokens[i]) {
                i += 1;
                continue;
            }
            let start = i;
            let mut end = i + 1;
            loop {
                if end < tokens.len() && self.is_span_token(&tokens[end]) {
                    end += 1;
                    continue;
                }
                let mut next = end;
                while next < tokens.len() && self.lexicon.is_connector(tokens[next].text) {
                    next += 1;
                }
                let bridges = next > end
                    && next < tokens.len()
                    && self.is_span_token(&tokens[next])
                    && tokens[start..end]
                        .iter()
                        .any(|t| self.lexicon.is_org_keyword(t.text));
                if !bridges {
                    break;
                }
                end = next + 1;
            }
            spans.push(start..end);
            i = end;
        }
        spans
    }

    fn classify(&self, tokens: &[Token<'_>], span: Range<usize>) -> Option<Label> {
        let w = self.weights;
        let lex = self.lexicon;
        let words = &tokens[span.clone()];
        let has_connector = words.iter().any(|t| lex.is_connector(t.text));

        let before = preceding_word(tokens, span.start);
        let honorific_before = before.is_some_and(|t| lex.is_honorific(t.text));
        let cue_before = before.is_some_and(|t| lex.is_person_cue(t.text));

        let mut person = 0.0;
        if lex.is_given_name(words[0].text) {
            person += w.given_name;
        }
        if honorific_before {
            person += w.honorific_before;
        }
        if cue_before {
            person += w.person_cue_before;
        }
        if (2..=4).contains(&words.len())
            && words
                .iter()
                .all(|t| matches!(t.shape, Shape::Title | Shape::Initial))
        {
            person += w.name_shaped;
        }
        if words.iter().any(|t| t.shape == Shape::Initial) {
            person += w.initial;
        }
        if has_connector {
            person += w.connector_person;
        }
        if words.len() == 1 && !honorific_before {
            person += w.single_token;
        }
        if words.iter().any(|t| lex.is_location(t.text)) {
            person += w.location;
        }

        let mut org = 0.0;
        if words.iter().any(|t| lex.is_org_keyword(t.text)) {
            org += w.org_keyword;
        }
        if words.iter().any(|t| lex.is_org_acronym(t.text)) {
            org += w.org_acronym;
        } else if words.len() == 1 && words[0].shape == Shape::Upper {
            org += w.acronym;
        }
        if has_connector {
            org += w.connector_org;
        }

        let (label, best, other) = if person > org {
            (Label::Person, person, org)
        } else {
            (Label::Organization, org, person)
        };
        tracing::trace!(tokens = ?span, person, org, "scored span");
        (best >= w.min_score && best > other).then_some(label)
    }
}

impl Tagger for StatisticalTagger<'_> {
    fn kind(&self) -> ModelKind {
        ModelKind::Statistical
    }

    fn tag(&self, text: &str) -> Vec<Annotation> {
        let tokens = tokenize(text);
        self.candidate_spans(&tokens)
            .into_iter()
            .filter_map(|span| {
                let label = self.classify(&tokens, span.clone())?;
                let slice = &text[tokens[span.start].start..tokens[span.end - 1].end];
                Some(Annotation::new(slice.trim(), label))
            })
            .collect()
    }
}

/// The closest word before `start`, looking through light punctuation.
fn preceding_word<'t, 'a>(tokens: &'t [Token<'a>], start: usize) -> Option<&'t Token<'a>> {
    tokens[..start]
        .iter()
        .rev()
        .find(|t| !SKIPPABLE.contains(&t.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::ModelStore;

    fn run(text: &str) -> Vec<Annotation> {
        let store = ModelStore::embedded();
        let lexicon = store.lexicon().unwrap();
        let weights = store.span_weights().unwrap();
        StatisticalTagger::new(&lexicon, &weights).tag(text)
    }

    #[test]
    fn person_and_affiliation() {
        let found = run("John Smith, Stanford University, will present.");
        assert_eq!(
            found,
            vec![
                Annotation::new("John Smith", Label::Person),
                Annotation::new("Stanford University", Label::Organization),
            ]
        );
    }

    #[test]
    fn honorifics_and_acronyms() {
        let found = run(
            "Prof. Jane Doe (MIT) and Dr. Wei Zhang, National University of Singapore, Singapore.",
        );
        assert_eq!(
            found,
            vec![
                Annotation::new("Jane Doe", Label::Person),
                Annotation::new("MIT", Label::Organization),
                Annotation::new("Wei Zhang", Label::Person),
                Annotation::new("National University of Singapore", Label::Organization),
            ]
        );
    }

    #[test]
    fn coordination_does_not_join_affiliation_and_next_person() {
        let found = run("Program Chairs: John Smith, Stanford University and Jane Doe, MIT.");
        assert_eq!(
            found,
            vec![
                Annotation::new("John Smith", Label::Person),
                Annotation::new("Stanford University", Label::Organization),
                Annotation::new("Jane Doe", Label::Person),
                Annotation::new("MIT", Label::Organization),
            ]
        );
    }

    #[test]
    fn place_after_organization_stays_out() {
        let found = run("Hosted by Stanford University in Palo Alto.");
        assert_eq!(found, vec![Annotation::new("Stanford University", Label::Organization)]);
    }

    #[test]
    fn dotted_acronym_opens_an_organization() {
        let found = run("Funded by the U.S. Army Research Laboratory.");
        assert_eq!(
            found,
            vec![Annotation::new("U.S. Army Research Laboratory", Label::Organization)]
        );
    }

    #[test]
    fn role_cue_marks_unknown_names() {
        let found = run("General Chair: Olaf Brekke");
        assert_eq!(found, vec![Annotation::new("Olaf Brekke", Label::Person)]);
    }

    #[test]
    fn span_keeps_source_spacing_for_initials() {
        let found = run("Keynote: John A. Smith");
        assert_eq!(found, vec![Annotation::new("John A. Smith", Label::Person)]);
    }

    #[test]
    fn boilerplate_yields_nothing() {
        let found = run("Call for Papers. Important Dates: Submission Deadline March 1, 2026.");
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn places_and_topic_words_are_not_people() {
        let found = run("Topics include Machine Learning in Paris, France.");
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn repeated_entities_are_kept_in_order() {
        let found = run("Sponsored by IEEE. Published by IEEE and ACM.");
        let texts: Vec<&str> = found.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["IEEE", "IEEE", "ACM"]);
        assert!(found.iter().all(|a| a.label == Label::Organization));
    }
}
