use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub fundamentals_path: PathBuf,   // JSON array of fundamentals records
    pub bullish_threshold: f64,       // 0.6
    pub bearish_threshold: f64,       // 0.4
    pub json_logging: bool,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing keys take their defaults.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            fundamentals_path: lookup("FUNDAMENTALS_PATH")
                .unwrap_or_else(|| "data/fundamentals.json".to_string())
                .into(),
            bullish_threshold: lookup("SIGNAL_BULLISH_THRESHOLD")
                .unwrap_or_else(|| "0.6".to_string())
                .parse()
                .context("SIGNAL_BULLISH_THRESHOLD must be a number")?,
            bearish_threshold: lookup("SIGNAL_BEARISH_THRESHOLD")
                .unwrap_or_else(|| "0.4".to_string())
                .parse()
                .context("SIGNAL_BEARISH_THRESHOLD must be a number")?,
            json_logging: lookup("RUST_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("SIGNAL_BULLISH_THRESHOLD", self.bullish_threshold),
            ("SIGNAL_BEARISH_THRESHOLD", self.bearish_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be between 0 and 1, got {}", name, value);
            }
        }
        if self.bearish_threshold >= self.bullish_threshold {
            bail!(
                "SIGNAL_BEARISH_THRESHOLD ({}) must be below SIGNAL_BULLISH_THRESHOLD ({})",
                self.bearish_threshold,
                self.bullish_threshold
            );
        }
        Ok(())
    }
}
