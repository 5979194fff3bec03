pub mod engine;
pub mod piotroski;
pub mod ratios;
pub mod repository;
pub mod signals;

pub use engine::FundamentalSignalEngine;
pub use piotroski::PiotroskiScorer;
pub use ratios::RatioCalculator;
pub use repository::InMemoryFundamentalsRepository;
pub use signals::{overall_sentiment, SentimentThresholds, SignalAggregator};

#[cfg(test)]
pub(crate) mod fixtures {
    use analysis_core::Fundamentals;
    use chrono::{TimeZone, Utc};

    #[allow(clippy::too_many_arguments)]
    pub fn period(
        ticker: &str,
        fiscal_year: i32,
        net_income: f64,
        operating_cash_flow: f64,
        total_assets: f64,
        total_liabilities: f64,
        revenue: f64,
        shares_outstanding: f64,
    ) -> Fundamentals {
        Fundamentals {
            ticker: ticker.to_string(),
            fiscal_year,
            revenue,
            net_income,
            total_assets,
            total_liabilities,
            operating_cash_flow,
            shares_outstanding,
            gross_profit: None,
            operating_income: None,
            current_assets: None,
            current_liabilities: None,
            last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Reference pair: current {NI 100, OCF 120, TA 1000, TL 400, Rev 2000, shares 50},
    /// prior {NI 80, OCF 90, TA 900, TL 450, Rev 1800, shares 50}.
    pub fn reference_pair() -> (Fundamentals, Fundamentals) {
        let mut current = period("ACME", 2023, 100.0, 120.0, 1000.0, 400.0, 2000.0, 50.0);
        let mut prior = period("ACME", 2022, 80.0, 90.0, 900.0, 450.0, 1800.0, 50.0);
        current.gross_profit = Some(900.0);
        prior.gross_profit = Some(780.0);
        (current, prior)
    }
}
