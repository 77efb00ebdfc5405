use thiserror::Error;

/// Why a load ended in the failed state.
///
/// Internals work with `anyhow`; this is the value handed to observers, so
/// it only keeps the rendered message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Connection failure, timeout or non-success HTTP status.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Body could not be read as UTF-8 text or parsed as CSV.
    #[error("decoding failure: {0}")]
    Decoding(String),
    /// The load died without producing an error value (a panic).
    #[error("Unknown error occurred")]
    Unknown,
}

impl LoadError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Transport(_))
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self, LoadError::Decoding(_))
    }
}

impl From<anyhow::Error> for LoadError {
    fn from(err: anyhow::Error) -> Self {
        let message = render_chain(&err);
        let transport = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<reqwest::Error>())
            .any(|e| !(e.is_body() || e.is_decode()));

        if transport {
            LoadError::Transport(message)
        } else {
            LoadError::Decoding(message)
        }
    }
}

/// Join the chain with `: ` like `{:#}`, skipping a cause the previous
/// segment already prints (reqwest and hyper embed their source in their
/// own message).
fn render_chain(err: &anyhow::Error) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let msg = cause.to_string();
        if parts.last().is_some_and(|prev| prev.contains(&msg)) {
            continue;
        }
        parts.push(msg);
    }
    parts.join(": ")
}
