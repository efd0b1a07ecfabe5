use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::score::ScoreAdjustment;

/// Snapshot of a user's finances as handed over by the input collector.
///
/// Monthly fields are per month, balances are totals. Tax rates are in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub total_savings: f64,
    pub total_investments: f64,
    pub current_debt: f64,
    pub total_assets: f64,
    pub age: u32,
    pub credit_score: u32,
    pub federal_tax_rate: f64,
    pub state_tax_rate: f64,
    pub local_tax_rate: f64,
    pub savings_goal: Option<f64>,
    pub investment_goal: Option<f64>,
}

impl FinancialProfile {
    pub fn combined_tax_rate(&self) -> f64 {
        self.federal_tax_rate + self.state_tax_rate + self.local_tax_rate
    }
}

/// Population metrics the comparator knows benchmarks for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Income,
    Expenses,
    Savings,
    Investments,
    CreditScore,
    NetWorth,
    Debt,
    EmergencyFundMonths,
    SavingsRate,
    InvestmentRate,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Income,
        Metric::Expenses,
        Metric::Savings,
        Metric::Investments,
        Metric::CreditScore,
        Metric::NetWorth,
        Metric::Debt,
        Metric::EmergencyFundMonths,
        Metric::SavingsRate,
        Metric::InvestmentRate,
    ];

    /// The user's value for this metric, read from the profile or its ratios.
    pub fn value_of(self, profile: &FinancialProfile, ratios: &Ratios) -> f64 {
        match self {
            Metric::Income => profile.monthly_income,
            Metric::Expenses => profile.monthly_expenses,
            Metric::Savings => profile.total_savings,
            Metric::Investments => profile.total_investments,
            Metric::CreditScore => profile.credit_score as f64,
            Metric::NetWorth => ratios.net_worth,
            Metric::Debt => profile.current_debt,
            Metric::EmergencyFundMonths => ratios.emergency_fund_months,
            Metric::SavingsRate => ratios.savings_rate,
            Metric::InvestmentRate => ratios.investment_rate,
        }
    }
}

/// Primary ratios derived from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
    pub combined_tax_rate: f64,
    pub net_income: f64,
    pub net_worth: f64,
    pub debt_to_income_ratio: f64,
    pub savings_rate: f64,
    pub investment_rate: f64,
    pub emergency_fund_months: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub years: u32,
    pub income: f64,
    pub savings: f64,
    pub investments: f64,
    pub debt: f64,
    pub credit_score: u32,
    pub net_worth: f64,
    pub emergency_fund_months: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeComparison {
    pub bracket_age: u32,
    pub bracket_net_worth: f64,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    #[serde(flatten)]
    pub ratios: Ratios,
    pub financial_score: f64,
    pub score_tier: ScoreTier,
    pub score_adjustments: Vec<ScoreAdjustment>,
    pub percentiles: BTreeMap<Metric, f64>,
    pub age_comparison: Option<AgeComparison>,
    pub savings_goal_progress: Option<f64>,
    pub investment_goal_progress: Option<f64>,
    pub forecast: BTreeMap<u32, ForecastPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdviceTopic {
    DebtToIncome,
    SavingsRate,
    EmergencyFund,
    InvestmentRate,
    CreditScore,
    OnTrack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub topic: AdviceTopic,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub metrics: DerivedMetrics,
    pub advice: Vec<Advice>,
}
