use std::path::PathBuf;
use std::sync::Arc;

use crate::model::{EntityId, NodeKind};

/// Errors raised by the data service. `Clone` so results can travel inside UI messages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("failed to parse catalog {}: {source}", .path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: NodeKind, id: EntityId },
    #[error("catalog is unavailable")]
    Unavailable,
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
