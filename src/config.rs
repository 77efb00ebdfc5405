use anyhow::{Context, Result};
use std::env;
use url::Url;

use crate::{fetch, parse::ParsePolicy};

/// Where the dataset lives on the serving origin. Not configurable.
pub const DATA_PATH: &str = "/data/ev_population.csv";

pub const DEFAULT_ORIGIN: &str = "http://localhost:8080/";

pub const ORIGIN_ENV: &str = "EV_DATA_ORIGIN";
pub const POLICY_ENV: &str = "EV_CSV_POLICY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Origin the data path is resolved against.
    pub origin: Url,
    pub policy: ParsePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            policy: ParsePolicy::default(),
        }
    }
}

impl LoaderConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build from `EV_DATA_ORIGIN` and `EV_CSV_POLICY`, falling back to the
    /// defaults for whichever is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(origin) = lookup(ORIGIN_ENV) {
            cfg.origin = Url::parse(origin.trim())
                .with_context(|| format!("parsing {}={}", ORIGIN_ENV, origin))?;
        }
        if let Some(policy) = lookup(POLICY_ENV) {
            cfg.policy = policy
                .parse()
                .with_context(|| format!("parsing {}", POLICY_ENV))?;
        }
        Ok(cfg)
    }

    /// Full URL of the CSV resource.
    pub fn source_url(&self) -> Result<Url> {
        fetch::resolve(&self.origin, DATA_PATH)
    }
}
