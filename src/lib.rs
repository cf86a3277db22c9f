//! Tag people's names and affiliations on WikiCFP call-for-papers pages.
//!
//! The page is fetched once, its `div.cfp` block is reduced to plain text and
//! handed to one of two taggers, selected by `m1` / `m2`.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod models;
pub mod report;
pub mod tagger;

pub use error::CfpError;
pub use models::{Annotation, Label, ModelKind, Request};
