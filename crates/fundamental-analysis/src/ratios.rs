use analysis_core::stats::{finite, growth_rate, safe_divide};
use analysis_core::{FinancialRatios, Fundamentals, GrowthRates};

/// Derives ratios from exactly one period. Cross-period comparison lives in the scorer.
///
/// Ratios are fractions (0.12 = 12%). Every division goes through `safe_divide`, so a zero
/// denominator yields 0; a ratio needing an untracked input is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioCalculator;

impl RatioCalculator {
    pub fn new() -> Self {
        Self
    }

    fn calculate_roa(&self, net_income: f64, total_assets: f64) -> Option<f64> {
        finite(safe_divide(net_income, total_assets))
    }

    fn calculate_roe(&self, net_income: f64, equity: f64) -> Option<f64> {
        finite(safe_divide(net_income, equity))
    }

    fn calculate_debt_to_equity(&self, liabilities: f64, equity: f64) -> Option<f64> {
        finite(safe_divide(liabilities, equity))
    }

    /// Current assets over current liabilities when both are reported, otherwise the
    /// asset-coverage proxy (total assets over total liabilities).
    fn calculate_current_ratio(&self, f: &Fundamentals) -> Option<f64> {
        match (f.current_assets, f.current_liabilities) {
            (Some(assets), Some(liabilities)) => finite(safe_divide(assets, liabilities)),
            _ => finite(safe_divide(f.total_assets, f.total_liabilities)),
        }
    }

    fn calculate_margin(&self, numerator: Option<f64>, revenue: f64) -> Option<f64> {
        numerator.and_then(|n| finite(safe_divide(n, revenue)))
    }

    fn calculate_asset_turnover(&self, revenue: f64, total_assets: f64) -> Option<f64> {
        finite(safe_divide(revenue, total_assets))
    }

    pub fn calculate(&self, fundamentals: &Fundamentals) -> FinancialRatios {
        let equity = fundamentals.equity();
        if equity == 0.0 || fundamentals.total_assets == 0.0 || fundamentals.revenue == 0.0 {
            tracing::debug!(
                "{} FY{}: zero denominator in ratio inputs, affected ratios fall back to 0",
                fundamentals.ticker,
                fundamentals.fiscal_year
            );
        }

        FinancialRatios {
            return_on_assets: self.calculate_roa(fundamentals.net_income, fundamentals.total_assets),
            return_on_equity: self.calculate_roe(fundamentals.net_income, equity),
            current_ratio: self.calculate_current_ratio(fundamentals),
            debt_to_equity: self.calculate_debt_to_equity(fundamentals.total_liabilities, equity),
            gross_margin: self.calculate_margin(fundamentals.gross_profit, fundamentals.revenue),
            operating_margin: self.calculate_margin(fundamentals.operating_income, fundamentals.revenue),
            net_margin: self.calculate_margin(Some(fundamentals.net_income), fundamentals.revenue),
            asset_turnover: self.calculate_asset_turnover(fundamentals.revenue, fundamentals.total_assets),
        }
    }

    /// Period-over-period growth of the raw figures, in percent.
    pub fn growth_rates(&self, current: &Fundamentals, prior: &Fundamentals) -> GrowthRates {
        GrowthRates {
            revenue: growth_rate(current.revenue, prior.revenue).and_then(finite),
            net_income: growth_rate(current.net_income, prior.net_income).and_then(finite),
            operating_cash_flow: growth_rate(current.operating_cash_flow, prior.operating_cash_flow)
                .and_then(finite),
            total_assets: growth_rate(current.total_assets, prior.total_assets).and_then(finite),
            total_liabilities: growth_rate(current.total_liabilities, prior.total_liabilities).and_then(finite),
            shares_outstanding: growth_rate(current.shares_outstanding, prior.shares_outstanding).and_then(finite),
        }
    }
}
