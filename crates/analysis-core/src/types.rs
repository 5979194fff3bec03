use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Reported figures for one fiscal period. A new period is a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub ticker: String,
    pub fiscal_year: i32,
    pub revenue: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub operating_cash_flow: f64,
    pub shares_outstanding: f64,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub operating_income: Option<f64>,
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl Fundamentals {
    pub fn equity(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }
}

/// Current and immediately prior fiscal period for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPair {
    pub current: Fundamentals,
    pub prior: Fundamentals,
}

/// Ratios derived from a single `Fundamentals` record.
///
/// `None` means "not computable" and serializes as `null`, never as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatios {
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub asset_turnover: Option<f64>,
}

/// Period-over-period growth in percent. `None` when the prior base is non-positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRates {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shares_outstanding: Option<f64>,
}

fn count(flags: &[bool]) -> u8 {
    flags.iter().filter(|&&f| f).count() as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityChecks {
    #[serde(rename = "positiveROA")]
    pub positive_roa: bool,
    pub positive_operating_cash_flow: bool,
    pub roa_improvement: bool,
    pub cash_flow_greater_than_net_income: bool,
}

impl ProfitabilityChecks {
    pub const MAX: u8 = 4;

    pub fn score(&self) -> u8 {
        count(&[
            self.positive_roa,
            self.positive_operating_cash_flow,
            self.roa_improvement,
            self.cash_flow_greater_than_net_income,
        ])
    }
}

impl Serialize for ProfitabilityChecks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ProfitabilityChecks", 5)?;
        s.serialize_field("positiveROA", &self.positive_roa)?;
        s.serialize_field("positiveOperatingCashFlow", &self.positive_operating_cash_flow)?;
        s.serialize_field("roaImprovement", &self.roa_improvement)?;
        s.serialize_field("cashFlowGreaterThanNetIncome", &self.cash_flow_greater_than_net_income)?;
        s.serialize_field("score", &self.score())?;
        s.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageChecks {
    pub decreased_leverage: bool,
    pub increased_current_ratio: bool,
    pub no_new_shares: bool,
}

impl LeverageChecks {
    pub const MAX: u8 = 3;

    pub fn score(&self) -> u8 {
        count(&[self.decreased_leverage, self.increased_current_ratio, self.no_new_shares])
    }
}

impl Serialize for LeverageChecks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("LeverageChecks", 4)?;
        s.serialize_field("decreasedLeverage", &self.decreased_leverage)?;
        s.serialize_field("increasedCurrentRatio", &self.increased_current_ratio)?;
        s.serialize_field("noNewShares", &self.no_new_shares)?;
        s.serialize_field("score", &self.score())?;
        s.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyChecks {
    pub improved_gross_margin: bool,
    pub improved_asset_turnover: bool,
}

impl EfficiencyChecks {
    pub const MAX: u8 = 2;

    pub fn score(&self) -> u8 {
        count(&[self.improved_gross_margin, self.improved_asset_turnover])
    }
}

impl Serialize for EfficiencyChecks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("EfficiencyChecks", 3)?;
        s.serialize_field("improvedGrossMargin", &self.improved_gross_margin)?;
        s.serialize_field("improvedAssetTurnover", &self.improved_asset_turnover)?;
        s.serialize_field("score", &self.score())?;
        s.end()
    }
}

/// Piotroski F-Score. The total is always derived from the nine checks and has no
/// field of its own; a `total` present in deserialized input is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PiotroskiScore {
    pub profitability: ProfitabilityChecks,
    pub leverage: LeverageChecks,
    pub efficiency: EfficiencyChecks,
}

impl PiotroskiScore {
    pub const MAX: u8 = ProfitabilityChecks::MAX + LeverageChecks::MAX + EfficiencyChecks::MAX;

    pub fn total(&self) -> u8 {
        self.profitability.score() + self.leverage.score() + self.efficiency.score()
    }
}

impl Serialize for PiotroskiScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PiotroskiScore", 4)?;
        s.serialize_field("total", &self.total())?;
        s.serialize_field("profitability", &self.profitability)?;
        s.serialize_field("leverage", &self.leverage)?;
        s.serialize_field("efficiency", &self.efficiency)?;
        s.end()
    }
}

/// Signal sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn to_label(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    #[serde(rename = "type")]
    pub signal_type: Sentiment,
    pub score: f64, // 0.0 to 1.0
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub ticker: String,
    pub signals: Vec<Signal>,
    pub piotroski_score: PiotroskiScore,
    pub overall_sentiment: Sentiment,
    pub computed_at: DateTime<Utc>,
}

/// Wire envelope: `{"result": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResponse {
    pub result: SignalResult,
}

impl From<SignalResult> for SignalResponse {
    fn from(result: SignalResult) -> Self {
        Self { result }
    }
}

/// Calendar quarter of a fiscal year (quarter is 1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalQuarter {
    pub year: i32,
    pub quarter: u8,
}

impl FiscalQuarter {
    pub fn new(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }
}

impl std::fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score_from_bits(bits: u16) -> PiotroskiScore {
        let b = |i: u16| bits & (1 << i) != 0;
        PiotroskiScore {
            profitability: ProfitabilityChecks {
                positive_roa: b(0),
                positive_operating_cash_flow: b(1),
                roa_improvement: b(2),
                cash_flow_greater_than_net_income: b(3),
            },
            leverage: LeverageChecks {
                decreased_leverage: b(4),
                increased_current_ratio: b(5),
                no_new_shares: b(6),
            },
            efficiency: EfficiencyChecks {
                improved_gross_margin: b(7),
                improved_asset_turnover: b(8),
            },
        }
    }

    #[test]
    fn test_total_equals_sum_of_components() {
        for bits in 0u16..512 {
            let score = score_from_bits(bits);
            assert_eq!(score.total() as u32, bits.count_ones());
            assert!(score.total() <= PiotroskiScore::MAX);
        }
    }

    #[test]
    fn test_piotroski_serializes_derived_total() {
        let score = score_from_bits(0b1_0000_0111);
        let value = serde_json::to_value(score).unwrap();
        assert_eq!(value["total"], json!(4));
        assert_eq!(value["profitability"]["positiveROA"], json!(true));
        assert_eq!(value["profitability"]["score"], json!(3));
        assert_eq!(value["leverage"]["score"], json!(0));
        assert_eq!(value["efficiency"]["improvedAssetTurnover"], json!(true));
    }

    #[test]
    fn test_deserialized_total_is_ignored() {
        let raw = json!({
            "total": 9,
            "profitability": {
                "positiveROA": true,
                "positiveOperatingCashFlow": false,
                "roaImprovement": false,
                "cashFlowGreaterThanNetIncome": false,
                "score": 4
            },
            "leverage": {"decreasedLeverage": false, "increasedCurrentRatio": false, "noNewShares": false},
            "efficiency": {"improvedGrossMargin": false, "improvedAssetTurnover": false}
        });
        let score: PiotroskiScore = serde_json::from_value(raw).unwrap();
        assert_eq!(score.total(), 1);
    }

    #[test]
    fn test_not_computable_ratio_serializes_as_null() {
        let ratios = FinancialRatios {
            return_on_assets: Some(0.0),
            ..Default::default()
        };
        let value = serde_json::to_value(ratios).unwrap();
        assert_eq!(value["returnOnAssets"], json!(0.0));
        assert!(value["grossMargin"].is_null());
        assert!(value.as_object().unwrap().contains_key("grossMargin"));
    }

    #[test]
    fn test_signal_type_wire_name() {
        let signal = Signal {
            name: "Leverage".to_string(),
            signal_type: Sentiment::Bearish,
            score: 0.25,
            description: "Weak debt-to-equity".to_string(),
        };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["type"], json!("bearish"));
        assert_eq!(Sentiment::Bearish.to_label(), "bearish");
    }

    #[test]
    fn test_fiscal_quarter_display_and_order() {
        assert_eq!(FiscalQuarter::new(2024, 3).to_string(), "2024-Q3");
        assert!(FiscalQuarter::new(2023, 4) < FiscalQuarter::new(2024, 1));
    }
}
