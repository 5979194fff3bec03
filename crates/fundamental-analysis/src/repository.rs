use analysis_core::{AnalysisError, Fundamentals, FundamentalsRepository, PeriodPair};
use async_trait::async_trait;
use dashmap::DashMap;

use crate::piotroski::validate_pair;

/// Fundamentals held in memory, keyed by upper-cased ticker.
///
/// Periods are append-only: a second record for the same ticker and fiscal year is rejected.
#[derive(Debug, Default)]
pub struct InMemoryFundamentalsRepository {
    periods: DashMap<String, Vec<Fundamentals>>,
}

impl InMemoryFundamentalsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, fundamentals: Fundamentals) -> Result<(), AnalysisError> {
        let key = fundamentals.ticker.to_uppercase();
        let mut entry = self.periods.entry(key).or_default();
        if entry.iter().any(|f| f.fiscal_year == fundamentals.fiscal_year) {
            return Err(AnalysisError::InvalidData(format!(
                "{} FY{} already recorded",
                fundamentals.ticker, fundamentals.fiscal_year
            )));
        }
        entry.push(fundamentals);
        entry.sort_by_key(|f| f.fiscal_year);
        Ok(())
    }

    /// Inserts every record, stopping at the first rejected one.
    pub fn extend<I>(&self, records: I) -> Result<usize, AnalysisError>
    where
        I: IntoIterator<Item = Fundamentals>,
    {
        let mut inserted = 0;
        for record in records {
            self.insert(record)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    pub fn history(&self, ticker: &str) -> Vec<Fundamentals> {
        self.periods
            .get(&ticker.to_uppercase())
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FundamentalsRepository for InMemoryFundamentalsRepository {
    async fn latest_periods(&self, ticker: &str) -> Result<PeriodPair, AnalysisError> {
        let history = self.history(ticker);
        match history.as_slice() {
            [.., prior, current] => {
                validate_pair(current, prior)?;
                Ok(PeriodPair {
                    current: current.clone(),
                    prior: prior.clone(),
                })
            }
            _ => Err(AnalysisError::InsufficientData(format!(
                "{} has {} fiscal period(s), need 2",
                ticker,
                history.len()
            ))),
        }
    }

    async fn tickers(&self) -> Result<Vec<String>, AnalysisError> {
        let mut tickers: Vec<String> = self.periods.iter().map(|e| e.key().clone()).collect();
        tickers.sort();
        Ok(tickers)
    }
}
