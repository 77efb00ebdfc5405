use anyhow::{Context, Result};
use futures::FutureExt;
use reqwest::Client;
use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::{sync::watch, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::LoaderConfig,
    error::LoadError,
    fetch,
    parse::{parse_records, ParsePolicy},
    record::Record,
    state::LoadState,
};

/// Fetches the EV population CSV once and publishes the outcome.
///
/// Observers follow progress through [`subscribe`](Self::subscribe): the
/// channel starts at [`LoadState::Loading`] and receives exactly one more
/// value when the load settles.
pub struct EvDataLoader {
    client: Client,
    source: Url,
    policy: ParsePolicy,
    state: watch::Sender<LoadState>,
    started: AtomicBool,
}

impl EvDataLoader {
    pub fn new(client: Client, config: &LoaderConfig) -> Result<Self> {
        let source = config
            .source_url()
            .context("resolving CSV source URL")?;
        let (state, _) = watch::channel(LoadState::Loading);

        Ok(Self {
            client,
            source,
            policy: config.policy,
            state,
            started: AtomicBool::new(false),
        })
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Activate the loader: spawn its single load and hand back the handle
    /// that owns the observable state. Dropping the handle tears the load
    /// down.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the load is
    /// spawned with [`tokio::spawn`].
    pub fn start(self) -> LoaderHandle {
        let state = self.subscribe();
        let task = tokio::spawn(async move {
            self.load().await;
        });
        LoaderHandle { state, task }
    }

    /// Run the fetch-and-parse cycle and publish its outcome.
    ///
    /// Only the first call fetches. Later calls return the current state,
    /// which is still `Loading` if the first call has not settled yet.
    /// Failures never escape; they become [`LoadState::Failed`].
    pub async fn load(&self) -> LoadState {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!(url = %self.source, "load already started");
            return self.state();
        }

        let start = Instant::now();
        info!(url = %self.source, policy = %self.policy, "loading");

        let outcome = AssertUnwindSafe(self.fetch_records()).catch_unwind().await;
        let settled = settle(outcome);

        match &settled {
            LoadState::Loaded(records) => {
                info!(records = records.len(), elapsed = ?start.elapsed(), "loaded")
            }
            LoadState::Failed(err) => {
                warn!(error = %err, elapsed = ?start.elapsed(), "load failed")
            }
            LoadState::Loading => {}
        }

        self.publish(settled.clone());
        settled
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, LoadError> {
        let text = fetch::fetch_text(&self.client, &self.source).await?;
        let records = parse_records(&text, self.policy)
            .with_context(|| format!("parsing {}", self.source))?;
        Ok(records)
    }

    /// Move the channel out of `Loading`. A settled state is never replaced.
    fn publish(&self, next: LoadState) {
        if self.state.receiver_count() == 0 {
            debug!(state = next.as_str(), "no observers for settled state");
        }
        let changed = self.state.send_if_modified(|current| {
            if current.is_loading() {
                *current = next;
                true
            } else {
                false
            }
        });
        if !changed {
            warn!("state already settled; ignoring second outcome");
        }
    }
}

/// Map the guarded load outcome onto a terminal state. A panic carries no
/// error value, so it becomes [`LoadError::Unknown`].
fn settle(outcome: std::thread::Result<Result<Vec<Record>, LoadError>>) -> LoadState {
    match outcome {
        Ok(result) => result.into(),
        Err(_) => LoadState::Failed(LoadError::Unknown),
    }
}

/// Owner-side view of a started loader.
///
/// Holds the receiving end of the state channel and the load task. Dropping
/// it aborts a load still in flight, so nothing is published after the
/// owning context is gone.
pub struct LoaderHandle {
    state: watch::Receiver<LoadState>,
    task: JoinHandle<()>,
}

impl LoaderHandle {
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Loaded records, empty unless the load succeeded.
    pub fn records(&self) -> Arc<Vec<Record>> {
        match &*self.state.borrow() {
            LoadState::Loaded(records) => Arc::clone(records),
            _ => Arc::default(),
        }
    }

    pub fn error(&self) -> Option<LoadError> {
        self.state.borrow().error().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.clone()
    }

    /// Wait until the load settles and return the terminal state.
    pub async fn settled(&mut self) -> LoadState {
        let settled = self
            .state
            .wait_for(LoadState::is_settled)
            .await
            .map(|state| (*state).clone());

        match settled {
            Ok(state) => state,
            // the loader went away without settling
            Err(_) => LoadState::Failed(LoadError::Unknown),
        }
    }
}

impl Drop for LoaderHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("tearing down unsettled load");
            self.task.abort();
        }
    }
}
