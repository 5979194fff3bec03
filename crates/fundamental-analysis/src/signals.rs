use analysis_core::stats::{clamp, percentile_in_range};
use analysis_core::{
    AnalysisError, EfficiencyChecks, FinancialRatios, GrowthRates, LeverageChecks,
    PiotroskiScore, ProfitabilityChecks, Sentiment, Signal, SignalResult,
};
use chrono::{DateTime, Utc};

/// Score cut-offs for classifying a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentThresholds {
    pub bullish: f64,
    pub bearish: f64,
}

impl SentimentThresholds {
    pub fn new(bullish: f64, bearish: f64) -> Result<Self, AnalysisError> {
        if !(0.0..=1.0).contains(&bullish) || !(0.0..=1.0).contains(&bearish) {
            return Err(AnalysisError::Configuration(format!(
                "sentiment thresholds must lie in [0, 1], got bullish={} bearish={}",
                bullish, bearish
            )));
        }
        if bearish >= bullish {
            return Err(AnalysisError::Configuration(format!(
                "bearish threshold {} must be below bullish threshold {}",
                bearish, bullish
            )));
        }
        Ok(Self { bullish, bearish })
    }

    pub fn classify(&self, score: f64) -> Sentiment {
        if score >= self.bullish {
            Sentiment::Bullish
        } else if score <= self.bearish {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            bullish: 0.6,
            bearish: 0.4,
        }
    }
}

/// Reference band a raw value is mapped through (0 at `min`, 1 at `max`).
#[derive(Debug, Clone, Copy)]
struct Band {
    min: f64,
    max: f64,
    invert: bool,
}

impl Band {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max, invert: false }
    }

    const fn inverted(min: f64, max: f64) -> Self {
        Self { min, max, invert: true }
    }

    fn map(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| {
            let unit = percentile_in_range(v, self.min, self.max) / 100.0;
            if self.invert { 1.0 - unit } else { unit }
        })
    }
}

const ROA_BAND: Band = Band::new(-0.05, 0.15);
const NET_MARGIN_BAND: Band = Band::new(-0.05, 0.20);
const DEBT_TO_EQUITY_BAND: Band = Band::inverted(0.0, 2.0);
const CURRENT_RATIO_BAND: Band = Band::new(0.5, 3.0);
const ASSET_TURNOVER_BAND: Band = Band::new(0.0, 1.5);
const GROSS_MARGIN_BAND: Band = Band::new(0.0, 0.6);
const OPERATING_MARGIN_BAND: Band = Band::new(-0.05, 0.25);
// Growth rates are percentages
const GROWTH_BAND: Band = Band::new(-20.0, 20.0);
const LIABILITY_GROWTH_BAND: Band = Band::inverted(-20.0, 20.0);

/// Score given to a component with no data.
const NO_INFORMATION: f64 = 0.5;

/// One contributor to a signal score, with phrases for strong/weak/middling readings.
struct Factor {
    value: Option<f64>,
    strong: String,
    weak: String,
    steady: String,
}

impl Factor {
    fn new(value: Option<f64>, strong: &str, weak: &str, steady: &str) -> Self {
        Self {
            value,
            strong: strong.to_string(),
            weak: weak.to_string(),
            steady: steady.to_string(),
        }
    }

    fn checks(group: &str, passed: u8, max: u8) -> Self {
        Self {
            value: Some(passed as f64 / max as f64),
            strong: format!("passing {} checks", group),
            weak: format!("failing {} checks", group),
            steady: format!("mixed {} checks", group),
        }
    }

    fn phrase(&self, value: f64, thresholds: &SentimentThresholds) -> &str {
        match thresholds.classify(value) {
            Sentiment::Bullish => &self.strong,
            Sentiment::Bearish => &self.weak,
            Sentiment::Neutral => &self.steady,
        }
    }
}

fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Majority sentiment across `signals`; any tie (and an empty slice) is neutral.
pub fn overall_sentiment(signals: &[Signal]) -> Sentiment {
    let count = |s: Sentiment| signals.iter().filter(|sig| sig.signal_type == s).count();
    let bullish = count(Sentiment::Bullish);
    let bearish = count(Sentiment::Bearish);
    let neutral = count(Sentiment::Neutral);

    if bullish > bearish && bullish > neutral {
        Sentiment::Bullish
    } else if bearish > bullish && bearish > neutral {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Builds the Profitability, Leverage and Efficiency signals. Each signal averages three
/// equally weighted components: ratio level, growth trend and the Piotroski sub-group fraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalAggregator {
    thresholds: SentimentThresholds,
}

impl SignalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: SentimentThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> SentimentThresholds {
        self.thresholds
    }

    pub fn aggregate(
        &self,
        ticker: &str,
        ratios: &FinancialRatios,
        growth: &GrowthRates,
        piotroski: &PiotroskiScore,
        computed_at: DateTime<Utc>,
    ) -> SignalResult {
        let signals = vec![
            self.profitability(ratios, growth, &piotroski.profitability),
            self.leverage(ratios, growth, &piotroski.leverage),
            self.efficiency(ratios, growth, &piotroski.efficiency),
        ];
        let overall = overall_sentiment(&signals);

        tracing::debug!(
            "{}: {} ({})",
            ticker,
            overall.to_label(),
            signals
                .iter()
                .map(|s| format!("{} {:.2}", s.name, s.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        SignalResult {
            ticker: ticker.to_string(),
            signals,
            piotroski_score: *piotroski,
            overall_sentiment: overall,
            computed_at,
        }
    }

    fn profitability(
        &self,
        ratios: &FinancialRatios,
        growth: &GrowthRates,
        checks: &ProfitabilityChecks,
    ) -> Signal {
        let level = Factor::new(
            mean_of(&[
                ROA_BAND.map(ratios.return_on_assets),
                NET_MARGIN_BAND.map(ratios.net_margin),
            ]),
            "strong return on assets",
            "weak return on assets",
            "moderate return on assets",
        );
        let trend = Factor::new(
            GROWTH_BAND.map(growth.net_income),
            "rising net income",
            "falling net income",
            "flat net income",
        );
        let group = Factor::checks("profitability", checks.score(), ProfitabilityChecks::MAX);
        self.build(
            "Profitability",
            [level, trend, group],
            format!("F-Score profitability {}/{}", checks.score(), ProfitabilityChecks::MAX),
        )
    }

    fn leverage(&self, ratios: &FinancialRatios, growth: &GrowthRates, checks: &LeverageChecks) -> Signal {
        let level = Factor::new(
            mean_of(&[
                DEBT_TO_EQUITY_BAND.map(ratios.debt_to_equity),
                CURRENT_RATIO_BAND.map(ratios.current_ratio),
            ]),
            "conservative debt and liquidity",
            "stretched debt and liquidity",
            "moderate debt and liquidity",
        );
        let trend = Factor::new(
            LIABILITY_GROWTH_BAND.map(growth.total_liabilities),
            "shrinking liabilities",
            "growing liabilities",
            "stable liabilities",
        );
        let group = Factor::checks("leverage", checks.score(), LeverageChecks::MAX);
        self.build(
            "Leverage",
            [level, trend, group],
            format!("F-Score leverage {}/{}", checks.score(), LeverageChecks::MAX),
        )
    }

    fn efficiency(&self, ratios: &FinancialRatios, growth: &GrowthRates, checks: &EfficiencyChecks) -> Signal {
        let level = Factor::new(
            mean_of(&[
                ASSET_TURNOVER_BAND.map(ratios.asset_turnover),
                GROSS_MARGIN_BAND.map(ratios.gross_margin),
                OPERATING_MARGIN_BAND.map(ratios.operating_margin),
            ]),
            "efficient use of assets",
            "inefficient use of assets",
            "average use of assets",
        );
        let trend = Factor::new(
            GROWTH_BAND.map(growth.revenue),
            "growing revenue",
            "declining revenue",
            "flat revenue",
        );
        let group = Factor::checks("efficiency", checks.score(), EfficiencyChecks::MAX);
        self.build(
            "Efficiency",
            [level, trend, group],
            format!("F-Score efficiency {}/{}", checks.score(), EfficiencyChecks::MAX),
        )
    }

    fn build(&self, name: &str, factors: [Factor; 3], suffix: String) -> Signal {
        let score = clamp(
            factors
                .iter()
                .map(|f| f.value.unwrap_or(NO_INFORMATION))
                .sum::<f64>()
                / factors.len() as f64,
            0.0,
            1.0,
        );

        Signal {
            name: name.to_string(),
            signal_type: self.thresholds.classify(score),
            score,
            description: self.describe(&factors, &suffix),
        }
    }

    /// Names the two components furthest from neutral, strongest first.
    fn describe(&self, factors: &[Factor], suffix: &str) -> String {
        let mut ranked: Vec<(&Factor, f64)> = factors
            .iter()
            .filter_map(|f| f.value.map(|v| (f, v)))
            .collect();
        ranked.sort_by(|a, b| {
            (b.1 - NO_INFORMATION)
                .abs()
                .partial_cmp(&(a.1 - NO_INFORMATION).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let phrases: Vec<&str> = ranked
            .iter()
            .take(2)
            .map(|(f, v)| f.phrase(*v, &self.thresholds))
            .collect();

        let text = phrases.join(" and ");
        let mut chars = text.chars();
        let text = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => text.clone(),
        };
        format!("{} ({})", text, suffix)
    }
}
