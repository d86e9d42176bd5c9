use crate::error::{Result, SearchError};
use anyhow::Context;
use regscope_protocol::RetrievalRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Allowed drift of `semantic_weight + lexical_weight` from 1.0
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

pub const ENV_TOP_K: &str = "REGSCOPE_TOP_K";
pub const ENV_SEMANTIC_WEIGHT: &str = "REGSCOPE_SEMANTIC_WEIGHT";
pub const ENV_MIN_SIMILARITY: &str = "REGSCOPE_MIN_SIMILARITY";
pub const ENV_BOOST_FACTOR: &str = "REGSCOPE_BOOST_FACTOR";

/// Per-call retrieval and fusion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum number of results returned
    pub top_k: usize,

    /// Weight of the normalized semantic score
    pub semantic_weight: f32,

    /// Weight of the normalized lexical score
    pub lexical_weight: f32,

    /// Results with a boosted score below this are dropped
    pub min_similarity: f32,

    /// Multiplier applied once per extracted term found in a passage
    pub boost_factor: f32,

    /// Each backend is asked for `top_k * candidate_multiplier` candidates
    pub candidate_multiplier: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            semantic_weight: 0.7,
            lexical_weight: 0.3,
            min_similarity: 0.30,
            boost_factor: 1.2,
            candidate_multiplier: 5,
        }
    }
}

impl RetrievalConfig {
    /// Builder: set the semantic weight, lexical weight becomes the complement
    #[must_use]
    pub fn with_semantic_weight(mut self, semantic_weight: f32) -> Self {
        self.semantic_weight = semantic_weight;
        self.lexical_weight = 1.0 - semantic_weight;
        self
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    #[must_use]
    pub fn with_boost_factor(mut self, boost_factor: f32) -> Self {
        self.boost_factor = boost_factor;
        self
    }

    #[must_use]
    pub const fn candidate_pool(&self) -> usize {
        self.top_k.saturating_mul(self.candidate_multiplier)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("semantic_weight", self.semantic_weight),
            ("lexical_weight", self.lexical_weight),
        ] {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(SearchError::Configuration(format!(
                    "{name} must be within [0, 1], got {weight}"
                )));
            }
        }

        let sum = self.semantic_weight + self.lexical_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SearchError::Configuration(format!(
                "semantic_weight ({}) + lexical_weight ({}) must equal 1.0, got {sum}",
                self.semantic_weight, self.lexical_weight
            )));
        }

        if self.top_k == 0 {
            return Err(SearchError::Configuration("top_k must be > 0".to_string()));
        }

        if !self.boost_factor.is_finite() || self.boost_factor < 1.0 {
            return Err(SearchError::Configuration(format!(
                "boost_factor must be >= 1.0, got {}",
                self.boost_factor
            )));
        }

        if !self.min_similarity.is_finite() {
            return Err(SearchError::Configuration(format!(
                "min_similarity must be finite, got {}",
                self.min_similarity
            )));
        }

        if self.candidate_multiplier == 0 {
            return Err(SearchError::Configuration(
                "candidate_multiplier must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|err| SearchError::Configuration(format!("invalid retrieval config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup, then validate.
    ///
    /// A semantic weight override also resets the lexical weight to its complement.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_TOP_K) {
            self.top_k = parse_override(ENV_TOP_K, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEMANTIC_WEIGHT) {
            self = self.with_semantic_weight(parse_override(ENV_SEMANTIC_WEIGHT, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MIN_SIMILARITY) {
            self.min_similarity = parse_override(ENV_MIN_SIMILARITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BOOST_FACTOR) {
            self.boost_factor = parse_override(ENV_BOOST_FACTOR, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

impl From<&RetrievalRequest> for RetrievalConfig {
    fn from(request: &RetrievalRequest) -> Self {
        Self::default()
            .with_top_k(request.top_k)
            .with_semantic_weight(request.semantic_weight)
            .with_min_similarity(request.min_similarity)
            .with_boost_factor(request.boost_factor)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| SearchError::Configuration(format!("{key}: cannot parse '{raw}'")))
}

/// Load a retrieval config file and apply environment overrides
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<RetrievalConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read retrieval config {}", path.display()))?;
    let config = RetrievalConfig::from_toml_str(&raw)
        .with_context(|| format!("Invalid retrieval config {}", path.display()))?;
    let config = config
        .apply_env_overrides()
        .context("Invalid retrieval config override from environment")?;
    log::info!("Loaded retrieval config from {}", path.display());
    Ok(config)
}
