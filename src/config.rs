//! Startup configuration.
//!
//! Resolved once from the environment (after `.env` is loaded) and handed to the app, so
//! nothing reads process-wide variables while handling messages.

use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};
use crate::model::EntityId;

pub const CATALOG_VAR: &str = "STUDYTREE_CATALOG";
pub const SUBJECT_VAR: &str = "STUDYTREE_SUBJECT_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Catalog opened at startup; without one the user picks a file.
    pub catalog_path: Option<PathBuf>,
    /// Overrides the subject declared by the catalog.
    pub subject_id: Option<EntityId>,
}

impl Config {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let catalog_path = lookup(CATALOG_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let subject_id = match lookup(SUBJECT_VAR) {
            Some(value) if !value.trim().is_empty() => {
                Some(value.trim().parse().map_err(|err: std::num::ParseIntError| {
                    ConfigError::InvalidVar {
                        name: SUBJECT_VAR,
                        value: value.clone(),
                        reason: err.to_string(),
                    }
                })?)
            }
            _ => None,
        };

        Ok(Self {
            catalog_path,
            subject_id,
        })
    }
}
