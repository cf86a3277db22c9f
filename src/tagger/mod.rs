//! Named-entity taggers.
//!
//! Two back-ends sit behind [`Tagger`]: a statistical span classifier (`m1`)
//! and a linear-chain CRF (`m2`). Both emit the same [`Annotation`] schema, so
//! callers never see which one ran. Resources are loaded once per run into a
//! [`TaggerContext`] that the tagger borrows.

pub mod crf;
pub mod statistical;
pub mod store;
pub mod tokenize;

use crate::error::CfpError;
use crate::models::{Annotation, ModelKind};

pub use crf::{CrfModel, CrfTagger};
pub use statistical::{SpanWeights, StatisticalTagger};
pub use store::{Lexicon, ModelStore};

pub trait Tagger {
    fn kind(&self) -> ModelKind;

    /// Entities in order of appearance. Labels are PERSON, ORGANIZATION or OTHER.
    fn tag(&self, text: &str) -> Vec<Annotation>;
}

enum LoadedModel {
    Statistical(SpanWeights),
    Crf(CrfModel),
}

/// Everything a tagger needs, built once per run.
pub struct TaggerContext {
    lexicon: Lexicon,
    model: LoadedModel,
}

impl TaggerContext {
    /// Load only the resources the selected back-end uses.
    pub fn load(kind: ModelKind, store: &ModelStore) -> Result<Self, CfpError> {
        let lexicon = store.lexicon()?;
        let model = match kind {
            ModelKind::Statistical => LoadedModel::Statistical(store.span_weights()?),
            ModelKind::Crf => LoadedModel::Crf(store.crf_model()?),
        };
        tracing::debug!(model = %kind, dir = ?store.dir(), "tagger resources loaded");
        Ok(Self { lexicon, model })
    }

    pub fn kind(&self) -> ModelKind {
        match self.model {
            LoadedModel::Statistical(_) => ModelKind::Statistical,
            LoadedModel::Crf(_) => ModelKind::Crf,
        }
    }

    pub fn tagger(&self) -> Box<dyn Tagger + '_> {
        match &self.model {
            LoadedModel::Statistical(weights) => {
                Box::new(StatisticalTagger::new(&self.lexicon, weights))
            }
            LoadedModel::Crf(model) => Box::new(CrfTagger::new(&self.lexicon, model)),
        }
    }
}
