//! # Dataset Lookup
//!
//! Read-only resolver over the CSV produced by the vocabulary ETL
//! (columns `name,type,description`). The file is re-read on every
//! call: it changes whenever the ETL runs and the bot is long-lived,
//! so nothing is cached. Concurrent resolves are safe.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added random_term for the announce binary
//! - 1.0.0: Initial release with exact-match resolve

use crate::core::error::BotError;
use csv_async::AsyncDeserializer;
use futures::TryStreamExt;
use log::debug;
use rand::Rng;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// A vocabulary term with every stored definition for it.
///
/// `definitions` may be empty: resolving a term with no dataset rows is
/// a valid empty result, not an error.
#[derive(Debug, Clone)]
pub struct Term {
    pub name: String,
    pub category: String,
    pub definitions: Vec<String>,
}

// Identity is (name, category); definitions are derived data.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.name.trim() == other.name.trim() && self.category.trim() == other.category.trim()
    }
}

impl Eq for Term {}

/// One row of the dataset file.
#[derive(Debug, Deserialize)]
struct DatasetRow {
    name: String,
    #[serde(rename = "type")]
    category: String,
    description: String,
}

/// Resolver over the dataset CSV at a fixed path.
#[derive(Debug, Clone)]
pub struct Lexicon {
    path: PathBuf,
}

impl Lexicon {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Lexicon {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Resolve a `(name, category)` pair to a [`Term`].
    ///
    /// Matching is exact string equality on both columns, no
    /// normalization beyond what the ETL already applied. Definitions
    /// keep the row order of the file.
    pub async fn resolve(&self, name: &str, category: &str) -> Result<Term, BotError> {
        let definitions: Vec<String> = self
            .read_rows()
            .await?
            .into_iter()
            .filter(|row| row.name == name && row.category == category)
            .map(|row| row.description)
            .collect();
        debug!(
            "resolved {name:?} ({category:?}): {} definition(s)",
            definitions.len()
        );
        Ok(Term {
            name: name.to_string(),
            category: category.to_string(),
            definitions,
        })
    }

    /// Pick a uniformly random row, as a single-definition [`Term`].
    ///
    /// Used by the announce binary. An empty dataset cannot produce a
    /// term and reports `DatasetUnavailable`.
    pub async fn random_term(&self) -> Result<Term, BotError> {
        let mut rows = self.read_rows().await?;
        if rows.is_empty() {
            return Err(BotError::DatasetUnavailable(format!(
                "{}: dataset has no rows",
                self.path.display()
            )));
        }
        let row = rows.swap_remove(rand::rng().random_range(0..rows.len()));
        Ok(Term {
            name: row.name,
            category: row.category,
            definitions: vec![row.description],
        })
    }

    async fn read_rows(&self) -> Result<Vec<DatasetRow>, BotError> {
        let unavailable =
            |e: &dyn std::fmt::Display| BotError::DatasetUnavailable(format!("{}: {e}", self.path.display()));
        let file = File::open(&self.path).await.map_err(|e| unavailable(&e))?;
        let mut reader = AsyncDeserializer::from_reader(file);
        reader
            .deserialize::<DatasetRow>()
            .try_collect()
            .await
            .map_err(|e| unavailable(&e))
    }
}
