pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod parse;
pub mod record;
pub mod state;

pub use config::LoaderConfig;
pub use error::LoadError;
pub use loader::{EvDataLoader, LoaderHandle};
pub use parse::ParsePolicy;
pub use record::Record;
pub use state::LoadState;
