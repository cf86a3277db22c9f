//! Linear-chain CRF sequence tagger (`m2`).
//!
//! Every token gets a bag of binary features; a label's emission score is the
//! sum of the feature weights for that label. Viterbi finds the best label
//! path under the start and transition weights, the path is BIO-encoded, and
//! each B+I run becomes one [`Annotation`].

use std::collections::HashMap;

use serde::Deserialize;

use super::store::Lexicon;
use super::tokenize::{tokenize, Shape, Token};
use super::Tagger;
use crate::models::{Annotation, Label, ModelKind};

const OUTSIDE: &str = "O";

// ── Model ────────────────────────────────────────────────────────────────────

/// On-disk form of `crf.json`.
#[derive(Debug, Deserialize)]
struct RawCrfModel {
    labels: Vec<String>,
    #[serde(default)]
    start: HashMap<String, f64>,
    #[serde(default)]
    transitions: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    features: HashMap<String, HashMap<String, f64>>,
}

/// CRF weights indexed by label position.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawCrfModel")]
pub struct CrfModel {
    labels: Vec<String>,
    outside: usize,
    start: Vec<f64>,
    /// `transitions[prev][next]`
    transitions: Vec<Vec<f64>>,
    features: HashMap<String, Vec<f64>>,
}

impl TryFrom<RawCrfModel> for CrfModel {
    type Error = String;

    fn try_from(raw: RawCrfModel) -> Result<Self, Self::Error> {
        let index: HashMap<&str, usize> = raw
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        if index.len() != raw.labels.len() {
            return Err("duplicate label".to_string());
        }
        let outside = *index
            .get(OUTSIDE)
            .ok_or_else(|| format!("label set has no '{}'", OUTSIDE))?;
        let position = |label: &str| {
            index
                .get(label)
                .copied()
                .ok_or_else(|| format!("unknown label '{}'", label))
        };
        let dense = |weights: &HashMap<String, f64>| -> Result<Vec<f64>, String> {
            let mut row = vec![0.0; raw.labels.len()];
            for (label, w) in weights {
                row[position(label.as_str())?] = *w;
            }
            Ok(row)
        };

        let start = dense(&raw.start)?;
        let mut transitions = vec![vec![0.0; raw.labels.len()]; raw.labels.len()];
        for (prev, row) in &raw.transitions {
            transitions[position(prev.as_str())?] = dense(row)?;
        }
        let features = raw
            .features
            .iter()
            .map(|(name, weights)| -> Result<(String, Vec<f64>), String> {
                Ok((name.clone(), dense(weights)?))
            })
            .collect::<Result<HashMap<_, _>, String>>()?;

        Ok(Self {
            labels: raw.labels,
            outside,
            start,
            transitions,
            features,
        })
    }
}

impl CrfModel {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn emission(&self, features: &[&str]) -> Vec<f64> {
        let mut scores = vec![0.0; self.labels.len()];
        for row in features.iter().filter_map(|f| self.features.get(*f)) {
            for (score, w) in scores.iter_mut().zip(row) {
                *score += w;
            }
        }
        scores
    }

    /// Highest-scoring label path. Ties go to the lower label index.
    pub fn viterbi(&self, emissions: &[Vec<f64>]) -> Vec<usize> {
        let k = self.labels.len();
        let Some(first) = emissions.first() else {
            return Vec::new();
        };

        let mut scores: Vec<f64> = (0..k).map(|y| self.start[y] + first[y]).collect();
        let mut back: Vec<Vec<usize>> = Vec::with_capacity(emissions.len());

        for emission in &emissions[1..] {
            let mut next = vec![0.0; k];
            let mut pointers = vec![0; k];
            for y in 0..k {
                let mut best_prev = 0;
                let mut best = f64::NEG_INFINITY;
                for (p, score) in scores.iter().enumerate() {
                    let candidate = score + self.transitions[p][y];
                    if candidate > best {
                        best = candidate;
                        best_prev = p;
                    }
                }
                next[y] = best + emission[y];
                pointers[y] = best_prev;
            }
            scores = next;
            back.push(pointers);
        }

        let mut last = argmax(&scores);
        let mut path = vec![last];
        for pointers in back.iter().rev() {
            last = pointers[last];
            path.push(last);
        }
        path.reverse();
        path
    }
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}

// ── BIO encoding ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bio {
    Begin(usize),
    Inside(usize),
    Outside,
}

/// A token continues an entity when it carries the same label as the one before.
pub fn bio_encode(path: &[usize], outside: usize) -> Vec<Bio> {
    path.iter()
        .enumerate()
        .map(|(i, &label)| {
            if label == outside {
                Bio::Outside
            } else if i > 0 && path[i - 1] == label {
                Bio::Inside(label)
            } else {
                Bio::Begin(label)
            }
        })
        .collect()
}

/// Group B+I runs into `(label, first, end)` token ranges.
fn bio_runs(tags: &[Bio]) -> Vec<(usize, usize, usize)> {
    let mut runs: Vec<(usize, usize, usize)> = Vec::new();
    for (i, tag) in tags.iter().enumerate() {
        match *tag {
            Bio::Begin(label) => runs.push((label, i, i + 1)),
            Bio::Inside(label) => match runs.last_mut() {
                Some(run) if run.0 == label && run.2 == i => run.2 = i + 1,
                _ => runs.push((label, i, i + 1)),
            },
            Bio::Outside => {}
        }
    }
    runs
}

// ── Tagger ───────────────────────────────────────────────────────────────────

pub struct CrfTagger<'a> {
    lexicon: &'a Lexicon,
    model: &'a CrfModel,
}

impl<'a> CrfTagger<'a> {
    pub fn new(lexicon: &'a Lexicon, model: &'a CrfModel) -> Self {
        Self { lexicon, model }
    }

    fn features(&self, tokens: &[Token<'_>], i: usize) -> Vec<&'static str> {
        let lex = self.lexicon;
        let token = &tokens[i];
        let prev = i.checked_sub(1).map(|p| &tokens[p]);
        let next = tokens.get(i + 1);
        let capitalized = token.shape.is_capitalized();

        let mut features = vec![
            "bias",
            match token.shape {
                Shape::Title => "shape=title",
                Shape::Upper => "shape=upper",
                Shape::Initial => "shape=initial",
                Shape::Lower => "shape=lower",
                Shape::Digit => "shape=digit",
                Shape::Punct => "shape=punct",
                Shape::Mixed => "shape=mixed",
            },
        ];

        if prev.map_or(true, Token::ends_sentence) {
            features.push("sentence_start");
        }
        if lex.is_given_name(token.text) {
            features.push("given_name");
        }
        if lex.is_honorific(token.text) {
            features.push("honorific");
        }
        if lex.is_org_keyword(token.text) {
            features.push("org_keyword");
        }
        if lex.is_org_acronym(token.text) {
            features.push("org_acronym");
        }
        if lex.is_stop_capitalized(token.text) {
            features.push("stop_cap");
        }
        if lex.is_location(token.text) {
            features.push("location");
        }
        if token.shape == Shape::Upper && token.text.contains('.') {
            features.push("dotted_acronym");
        }
        if lex.is_connector(token.text) && matches!(token.shape, Shape::Lower | Shape::Punct) {
            features.push("connector");
        }

        if capitalized {
            if let Some(prev) = prev {
                if lex.is_given_name(prev.text) {
                    features.push("prev_given_name");
                }
                if prev.shape == Shape::Initial {
                    features.push("prev_initial");
                }
                if lex.is_connector(prev.text) && prev.shape != Shape::Title {
                    features.push("prev_connector");
                }
            }
            if next.is_some_and(|n| lex.is_org_keyword(n.text)) {
                features.push("next_org_keyword");
            }
            // "Prof. Jane" and "Chair: Jane"
            let before = match prev {
                Some(p) if matches!(p.text, "." | ":") => i.checked_sub(2).map(|q| &tokens[q]),
                other => other,
            };
            if let Some(before) = before {
                if lex.is_honorific(before.text) {
                    features.push("prev_honorific");
                }
                if lex.is_person_cue(before.text) {
                    features.push("prev_person_cue");
                }
            }
        }
        features
    }

    fn to_annotations(&self, tokens: &[Token<'_>], path: &[usize]) -> Vec<Annotation> {
        let tags = bio_encode(path, self.model.outside);
        bio_runs(&tags)
            .into_iter()
            .filter_map(|(label, mut first, mut end)| {
                while first < end && self.lexicon.is_connector(tokens[first].text) {
                    first += 1;
                }
                while end > first && self.lexicon.is_connector(tokens[end - 1].text) {
                    end -= 1;
                }
                if first == end {
                    return None;
                }
                let label = Label::from_model_label(&self.model.labels[label])?;
                let text = tokens[first..end]
                    .iter()
                    .map(|t| t.text.trim())
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(Annotation::new(text, label))
            })
            .collect()
    }
}

impl Tagger for CrfTagger<'_> {
    fn kind(&self) -> ModelKind {
        ModelKind::Crf
    }

    fn tag(&self, text: &str) -> Vec<Annotation> {
        let tokens = tokenize(text);
        let emissions: Vec<Vec<f64>> = (0..tokens.len())
            .map(|i| self.model.emission(&self.features(&tokens, i)))
            .collect();
        let path = self.model.viterbi(&emissions);
        self.to_annotations(&tokens, &path)
    }
}
