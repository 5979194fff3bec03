//! Piotroski F-Score: nine binary year-over-year quality checks.
//!
//! **Profitability (4):** ROA > 0, operating cash flow > 0, ROA improved,
//! operating cash flow > net income.
//!
//! **Leverage/Liquidity (3):** debt-to-equity decreased, current ratio increased,
//! no new shares issued.
//!
//! **Operating Efficiency (2):** gross margin improved, asset turnover improved.
//!
//! A comparison where either side is not computable scores false. The current-ratio check
//! only runs when both periods report current assets and current liabilities.

use analysis_core::{
    AnalysisError, EfficiencyChecks, FinancialRatios, Fundamentals, LeverageChecks,
    PiotroskiScore, ProfitabilityChecks,
};

use crate::RatioCalculator;

fn positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.0)
}

fn greater(current: Option<f64>, prior: Option<f64>) -> bool {
    match (current, prior) {
        (Some(c), Some(p)) => c > p,
        _ => false,
    }
}

fn reports_current_items(f: &Fundamentals) -> bool {
    f.current_assets.is_some() && f.current_liabilities.is_some()
}

fn less(current: Option<f64>, prior: Option<f64>) -> bool {
    match (current, prior) {
        (Some(c), Some(p)) => c < p,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PiotroskiScorer {
    calculator: RatioCalculator,
}

impl PiotroskiScorer {
    pub fn new() -> Self {
        Self {
            calculator: RatioCalculator::new(),
        }
    }

    /// Scores `current` against `prior` using ratios already derived for each period.
    pub fn score(
        &self,
        current: &Fundamentals,
        prior: &Fundamentals,
        current_ratios: &FinancialRatios,
        prior_ratios: &FinancialRatios,
    ) -> PiotroskiScore {
        let profitability = ProfitabilityChecks {
            positive_roa: positive(current_ratios.return_on_assets),
            positive_operating_cash_flow: current.operating_cash_flow > 0.0,
            roa_improvement: greater(current_ratios.return_on_assets, prior_ratios.return_on_assets),
            cash_flow_greater_than_net_income: current.operating_cash_flow > current.net_income,
        };

        let leverage = LeverageChecks {
            decreased_leverage: less(current_ratios.debt_to_equity, prior_ratios.debt_to_equity),
            increased_current_ratio: reports_current_items(current)
                && reports_current_items(prior)
                && greater(current_ratios.current_ratio, prior_ratios.current_ratio),
            no_new_shares: current.shares_outstanding <= prior.shares_outstanding,
        };

        let efficiency = EfficiencyChecks {
            improved_gross_margin: greater(current_ratios.gross_margin, prior_ratios.gross_margin),
            improved_asset_turnover: greater(current_ratios.asset_turnover, prior_ratios.asset_turnover),
        };

        let score = PiotroskiScore {
            profitability,
            leverage,
            efficiency,
        };
        tracing::debug!(
            "{} FY{} vs FY{}: F-Score {}/{}",
            current.ticker,
            current.fiscal_year,
            prior.fiscal_year,
            score.total(),
            PiotroskiScore::MAX
        );
        score
    }

    /// Scores the two most recent periods of `history` (any order).
    ///
    /// Fails with `InsufficientData` for fewer than two periods and with `InvalidData` when
    /// the two latest periods belong to different tickers or share a fiscal year.
    pub fn score_history(&self, history: &[Fundamentals]) -> Result<PiotroskiScore, AnalysisError> {
        let (current, prior) = latest_two(history)?;
        let current_ratios = self.calculator.calculate(current);
        let prior_ratios = self.calculator.calculate(prior);
        Ok(self.score(current, prior, &current_ratios, &prior_ratios))
    }
}

/// Picks the latest period and its predecessor, validating that they are comparable.
pub fn latest_two(history: &[Fundamentals]) -> Result<(&Fundamentals, &Fundamentals), AnalysisError> {
    if history.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "Piotroski score needs two fiscal periods, got {}",
            history.len()
        )));
    }
    let mut ordered: Vec<&Fundamentals> = history.iter().collect();
    ordered.sort_by_key(|f| std::cmp::Reverse(f.fiscal_year));
    let (current, prior) = (ordered[0], ordered[1]);
    validate_pair(current, prior)?;
    Ok((current, prior))
}

pub fn validate_pair(current: &Fundamentals, prior: &Fundamentals) -> Result<(), AnalysisError> {
    if !current.ticker.eq_ignore_ascii_case(&prior.ticker) {
        return Err(AnalysisError::InvalidData(format!(
            "periods belong to different tickers: {} and {}",
            current.ticker, prior.ticker
        )));
    }
    if prior.fiscal_year >= current.fiscal_year {
        return Err(AnalysisError::InvalidData(format!(
            "{}: prior period FY{} is not older than current FY{}",
            current.ticker, prior.fiscal_year, current.fiscal_year
        )));
    }
    if current.fiscal_year - prior.fiscal_year > 1 {
        tracing::warn!(
            "{}: comparing non-consecutive fiscal years FY{} and FY{}",
            current.ticker,
            current.fiscal_year,
            prior.fiscal_year
        );
    }
    Ok(())
}
