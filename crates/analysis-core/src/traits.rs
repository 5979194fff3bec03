use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AnalysisError, PeriodPair};

/// Source of per-period fundamentals (database, provider cache, fixture file...).
#[async_trait]
pub trait FundamentalsRepository: Send + Sync {
    /// Current and immediately prior fiscal period for `ticker`.
    /// Fails with `AnalysisError::InsufficientData` when fewer than two periods exist.
    async fn latest_periods(&self, ticker: &str) -> Result<PeriodPair, AnalysisError>;

    async fn tickers(&self) -> Result<Vec<String>, AnalysisError>;
}

/// Wall-clock source, injected so computations stay reproducible.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
