use std::sync::Arc;

use analysis_core::{AnalysisError, Clock, FundamentalsRepository, SignalResult, SystemClock};

use crate::{PiotroskiScorer, RatioCalculator, SignalAggregator};

/// Repository → ratios → F-Score → signals. Holds no per-request state.
pub struct FundamentalSignalEngine {
    repository: Arc<dyn FundamentalsRepository>,
    clock: Arc<dyn Clock>,
    calculator: RatioCalculator,
    scorer: PiotroskiScorer,
    aggregator: SignalAggregator,
}

impl FundamentalSignalEngine {
    pub fn new(repository: Arc<dyn FundamentalsRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            calculator: RatioCalculator::new(),
            scorer: PiotroskiScorer::new(),
            aggregator: SignalAggregator::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_aggregator(mut self, aggregator: SignalAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub async fn compute(&self, ticker: &str) -> Result<SignalResult, AnalysisError> {
        let pair = self.repository.latest_periods(ticker).await?;
        let (current, prior) = (&pair.current, &pair.prior);
        crate::piotroski::validate_pair(current, prior)?;

        let current_ratios = self.calculator.calculate(current);
        let prior_ratios = self.calculator.calculate(prior);
        let growth = self.calculator.growth_rates(current, prior);
        let piotroski = self.scorer.score(current, prior, &current_ratios, &prior_ratios);

        let result = self.aggregator.aggregate(
            &current.ticker.to_uppercase(),
            &current_ratios,
            &growth,
            &piotroski,
            self.clock.now(),
        );
        tracing::info!(
            "Computed signals for {} (FY{} vs FY{}): F-Score {}, {}",
            result.ticker,
            current.fiscal_year,
            prior.fiscal_year,
            piotroski.total(),
            result.overall_sentiment.to_label()
        );
        Ok(result)
    }

    /// Computes every ticker the repository knows, pairing each with its outcome.
    pub async fn compute_all(&self) -> Result<Vec<(String, Result<SignalResult, AnalysisError>)>, AnalysisError> {
        let tickers = self.repository.tickers().await?;
        let mut results = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let outcome = self.compute(&ticker).await;
            if let Err(e) = &outcome {
                tracing::warn!("Skipping {}: {}", ticker, e);
            }
            results.push((ticker, outcome));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{period, reference_pair};
    use crate::InMemoryFundamentalsRepository;
    use analysis_core::{FixedClock, Fundamentals, PeriodPair, Sentiment, SignalResponse};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    /// Hands back whatever pair it was built with, unchecked.
    struct FixedPairRepository(PeriodPair);

    #[async_trait]
    impl FundamentalsRepository for FixedPairRepository {
        async fn latest_periods(&self, _ticker: &str) -> Result<PeriodPair, AnalysisError> {
            Ok(self.0.clone())
        }

        async fn tickers(&self) -> Result<Vec<String>, AnalysisError> {
            Ok(vec![self.0.current.ticker.clone()])
        }
    }

    fn engine_over(current: Fundamentals, prior: Fundamentals) -> FundamentalSignalEngine {
        FundamentalSignalEngine::new(Arc::new(FixedPairRepository(PeriodPair { current, prior })))
    }

    fn engine_with(repo: InMemoryFundamentalsRepository) -> FundamentalSignalEngine {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        FundamentalSignalEngine::new(Arc::new(repo)).with_clock(Arc::new(clock))
    }

    fn reference_repo() -> InMemoryFundamentalsRepository {
        let repo = InMemoryFundamentalsRepository::new();
        let (current, prior) = reference_pair();
        repo.extend([prior, current]).unwrap();
        repo
    }

    #[tokio::test]
    async fn test_end_to_end_reference_pair() {
        let engine = engine_with(reference_repo());
        let result = engine.compute("ACME").await.unwrap();

        assert_eq!(result.ticker, "ACME");
        assert_eq!(result.piotroski_score.total(), 7);
        assert_eq!(result.overall_sentiment, Sentiment::Bullish);
        assert_eq!(result.computed_at, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn test_insufficient_history_is_an_error() {
        let repo = InMemoryFundamentalsRepository::new();
        repo.insert(period("SOLO", 2023, 1.0, 1.0, 10.0, 5.0, 10.0, 1.0)).unwrap();
        let engine = engine_with(repo);
        assert!(matches!(
            engine.compute("SOLO").await,
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[tokio::test]
    async fn test_incomparable_pair_from_repository_is_rejected() {
        let (current, mut prior) = reference_pair();
        prior.ticker = "OTHER".to_string();
        assert!(matches!(
            engine_over(current, prior).compute("ACME").await,
            Err(AnalysisError::InvalidData(_))
        ));

        let (current, mut prior) = reference_pair();
        prior.fiscal_year = current.fiscal_year;
        assert!(matches!(
            engine_over(current, prior).compute("ACME").await,
            Err(AnalysisError::InvalidData(_))
        ));

        let (current, prior) = reference_pair();
        assert!(matches!(
            engine_over(prior, current).compute("ACME").await,
            Err(AnalysisError::InvalidData(_))
        ));

        let (current, prior) = reference_pair();
        assert!(engine_over(current, prior).compute("ACME").await.is_ok());
    }

    #[tokio::test]
    async fn test_wire_shape() {
        let engine = engine_with(reference_repo());
        let response = SignalResponse::from(engine.compute("ACME").await.unwrap());
        let value = serde_json::to_value(&response).unwrap();

        let result = &value["result"];
        assert_eq!(result["ticker"], "ACME");
        assert_eq!(result["overallSentiment"], "bullish");
        assert_eq!(result["computedAt"], "2024-05-01T09:30:00Z");
        assert_eq!(result["piotroskiScore"]["total"], 7);
        assert_eq!(result["piotroskiScore"]["leverage"]["noNewShares"], true);
        let signals = result["signals"].as_array().unwrap();
        assert_eq!(signals.len(), 3);
        for signal in signals {
            for key in ["name", "type", "score", "description"] {
                assert!(signal.get(key).is_some(), "missing {}", key);
            }
        }
    }

    #[tokio::test]
    async fn test_compute_all_reports_each_ticker() {
        let repo = reference_repo();
        repo.insert(period("SOLO", 2023, 1.0, 1.0, 10.0, 5.0, 10.0, 1.0)).unwrap();
        let engine = engine_with(repo);

        let results = engine.compute_all().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "ACME");
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let engine = Arc::new(engine_with(reference_repo()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.compute("ACME").await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
