use std::sync::Arc;

use crate::{error::LoadError, record::Record};

/// Lifecycle of one load: `Loading` until the single fetch settles into
/// `Loaded` or `Failed`. Both settled states are final.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(Arc<Vec<Record>>),
    Failed(LoadError),
}

impl LoadState {
    pub fn as_str(&self) -> &str {
        match self {
            LoadState::Loading => "Loading",
            LoadState::Loaded(_) => "Loaded",
            LoadState::Failed(_) => "Failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// Loaded records; empty while loading and after a failure.
    pub fn records(&self) -> &[Record] {
        match self {
            LoadState::Loaded(records) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<Vec<Record>, LoadError>> for LoadState {
    fn from(result: Result<Vec<Record>, LoadError>) -> Self {
        match result {
            Ok(records) => LoadState::Loaded(Arc::new(records)),
            Err(err) => LoadState::Failed(err),
        }
    }
}
