// src/config.rs
//! Ranking defaults loaded from TOML or JSON, with env overrides.
//!
//! File shape (TOML; JSON uses the same nesting):
//! ```toml
//! [ranking]
//! criterion = "price"          # price | delivery | quality | best_deal
//! top_n = 3
//! ensure_both_sources = true
//! per_source_limit = 5         # optional
//! similar_top_n = 1
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{Criterion, RankRequest};
use crate::error::RankError;

pub const ENV_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";
pub const ENV_TOP_N: &str = "RANKING_TOP_N";
pub const ENV_CRITERION: &str = "RANKING_CRITERION";

fn default_criterion() -> Criterion {
    Criterion::Price
}
fn default_top_n() -> usize {
    3
}
fn default_true() -> bool {
    true
}
fn default_similar_top_n() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_criterion")]
    pub criterion: Criterion,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_true")]
    pub ensure_both_sources: bool,
    #[serde(default)]
    pub per_source_limit: Option<usize>,
    #[serde(default = "default_similar_top_n")]
    pub similar_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            criterion: default_criterion(),
            top_n: default_top_n(),
            ensure_both_sources: true,
            per_source_limit: None,
            similar_top_n: default_similar_top_n(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    ranking: RankingConfig,
}

impl RankingConfig {
    /// Load from an explicit path; format picked by extension, TOML by default.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ranking config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file: ConfigFile = if ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        };
        Ok(file.ranking.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $RANKING_CONFIG_PATH
    /// 2) config/ranking.toml
    /// 3) config/ranking.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{} points to non-existent path", ENV_CONFIG_PATH));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/ranking.toml");
            let json_p = PathBuf::from("config/ranking.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        Ok(base.with_env_overrides(
            std::env::var(ENV_TOP_N).ok(),
            std::env::var(ENV_CRITERION).ok(),
        ))
    }

    /// Apply raw override values; invalid ones are ignored with a warning.
    pub fn with_env_overrides(mut self, top_n: Option<String>, criterion: Option<String>) -> Self {
        if let Some(raw) = top_n {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.top_n = n,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_TOP_N),
            }
        }
        if let Some(raw) = criterion {
            match raw.parse::<Criterion>() {
                Ok(c) => self.criterion = c,
                Err(e) => tracing::warn!(error = %e, "ignoring invalid {}", ENV_CRITERION),
            }
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if self.per_source_limit == Some(0) {
            self.per_source_limit = None;
        }
        self
    }

    /// Validated request anchored at `reference_date`.
    pub fn to_request(&self, reference_date: NaiveDate) -> Result<RankRequest, RankError> {
        Ok(RankRequest::new(self.criterion, self.top_n)?
            .with_ensure_both_sources(self.ensure_both_sources)
            .with_per_source_limit(self.per_source_limit)
            .with_reference_date(reference_date))
    }
}
