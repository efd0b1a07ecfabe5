use clap::{Args, ValueEnum};

use crate::core::{
    ContinuousRules, DiscreteRules, EngineConfig, FinancialProfile, PercentileMethod, ScoreModel,
};

const AGE_RANGE: (u32, u32) = (0, 120);
const CREDIT_SCORE_RANGE: (u32, u32) = (300, 850);
const TAX_RATE_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("--{flag} must be a finite amount >= 0")]
    InvalidAmount { flag: &'static str },

    #[error("--{flag} must be between {min} and {max}")]
    OutOfRange {
        flag: &'static str,
        min: f64,
        max: f64,
    },

    #[error("--emergency-fund-cap must be > 0")]
    InvalidCap,

    #[error("invalid API payload: {0}")]
    Payload(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliScoreModel {
    Discrete,
    LegacyDiscrete,
    Continuous,
}

impl From<CliScoreModel> for ScoreModel {
    fn from(value: CliScoreModel) -> Self {
        match value {
            CliScoreModel::Discrete => ScoreModel::Discrete(DiscreteRules::default()),
            CliScoreModel::LegacyDiscrete => ScoreModel::Discrete(DiscreteRules::legacy_flat()),
            CliScoreModel::Continuous => ScoreModel::Continuous(ContinuousRules::default()),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliPercentileMethod {
    NormalCdf,
    Ratio,
    Piecewise,
}

impl From<CliPercentileMethod> for PercentileMethod {
    fn from(value: CliPercentileMethod) -> Self {
        match value {
            CliPercentileMethod::NormalCdf => PercentileMethod::NormalCdf,
            CliPercentileMethod::Ratio => PercentileMethod::Ratio,
            CliPercentileMethod::Piecewise => PercentileMethod::Piecewise,
        }
    }
}

/// Profile fields as collected from the command line or an API payload.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, help = "Monthly income before taxes")]
    pub monthly_income: f64,
    #[arg(long)]
    pub monthly_expenses: f64,
    #[arg(long, default_value_t = 0.0)]
    pub total_savings: f64,
    #[arg(long, default_value_t = 0.0)]
    pub total_investments: f64,
    #[arg(long, default_value_t = 0.0)]
    pub current_debt: f64,
    #[arg(long, default_value_t = 0.0, help = "Property and other assets")]
    pub total_assets: f64,
    #[arg(long, default_value_t = 30)]
    pub age: u32,
    #[arg(long, default_value_t = 700, help = "Credit score (300-850)")]
    pub credit_score: u32,
    #[arg(long, default_value_t = 0.0, help = "Federal tax rate in percent")]
    pub federal_tax_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "State tax rate in percent")]
    pub state_tax_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Local tax rate in percent")]
    pub local_tax_rate: f64,
    #[arg(long)]
    pub savings_goal: Option<f64>,
    #[arg(long)]
    pub investment_goal: Option<f64>,
}

/// Per-request changes to the engine's scoring policy.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    #[arg(long, value_enum)]
    pub score_model: Option<CliScoreModel>,
    #[arg(long, value_enum)]
    pub percentile_method: Option<CliPercentileMethod>,
    #[arg(long, help = "Cap on emergency fund months")]
    pub emergency_fund_cap: Option<f64>,
    #[arg(long, conflicts_with = "emergency_fund_cap")]
    pub no_emergency_fund_cap: bool,
}

pub fn build_profile(args: ProfileArgs) -> Result<FinancialProfile, InputError> {
    for (flag, value) in [
        ("monthly-income", args.monthly_income),
        ("monthly-expenses", args.monthly_expenses),
        ("total-savings", args.total_savings),
        ("total-investments", args.total_investments),
        ("current-debt", args.current_debt),
        ("total-assets", args.total_assets),
    ] {
        check_amount(flag, value)?;
    }
    if let Some(goal) = args.savings_goal {
        check_amount("savings-goal", goal)?;
    }
    if let Some(goal) = args.investment_goal {
        check_amount("investment-goal", goal)?;
    }

    check_range("age", args.age, AGE_RANGE)?;
    check_range("credit-score", args.credit_score, CREDIT_SCORE_RANGE)?;

    for (flag, rate) in [
        ("federal-tax-rate", args.federal_tax_rate),
        ("state-tax-rate", args.state_tax_rate),
        ("local-tax-rate", args.local_tax_rate),
    ] {
        let (min, max) = TAX_RATE_RANGE;
        if !(min..=max).contains(&rate) {
            return Err(InputError::OutOfRange { flag, min, max });
        }
    }

    Ok(FinancialProfile {
        monthly_income: args.monthly_income,
        monthly_expenses: args.monthly_expenses,
        total_savings: args.total_savings,
        total_investments: args.total_investments,
        current_debt: args.current_debt,
        total_assets: args.total_assets,
        age: args.age,
        credit_score: args.credit_score,
        federal_tax_rate: args.federal_tax_rate,
        state_tax_rate: args.state_tax_rate,
        local_tax_rate: args.local_tax_rate,
        savings_goal: args.savings_goal,
        investment_goal: args.investment_goal,
    })
}

pub fn apply_policy_overrides(
    base: &EngineConfig,
    overrides: &PolicyArgs,
) -> Result<EngineConfig, InputError> {
    let mut config = base.clone();
    if let Some(model) = overrides.score_model {
        config.policy.score_model = model.into();
    }
    if let Some(method) = overrides.percentile_method {
        config.policy.percentile_method = method.into();
    }
    if let Some(cap) = overrides.emergency_fund_cap {
        if !cap.is_finite() || cap <= 0.0 {
            return Err(InputError::InvalidCap);
        }
        config.policy.emergency_fund_cap = Some(cap);
    }
    if overrides.no_emergency_fund_cap {
        config.policy.emergency_fund_cap = None;
    }
    Ok(config)
}

fn check_amount(flag: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidAmount { flag })
    }
}

fn check_range(flag: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), InputError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            flag,
            min: min as f64,
            max: max as f64,
        })
    }
}
