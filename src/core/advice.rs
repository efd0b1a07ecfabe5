use serde::Deserialize;

use super::types::{Advice, AdviceTopic, FinancialProfile, Ratios};

/// Limits past which a recommendation is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdviceThresholds {
    pub max_debt_to_income: f64,
    pub min_savings_rate: f64,
    pub min_emergency_fund_months: f64,
    pub min_investment_rate: f64,
    pub min_credit_score: u32,
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            max_debt_to_income: 40.0,
            min_savings_rate: 0.15,
            min_emergency_fund_months: 3.0,
            min_investment_rate: 0.2,
            min_credit_score: 670,
        }
    }
}

/// Recommendations in a fixed order: debt, savings, emergency fund, investing, credit.
/// A single encouraging note is returned when nothing needs attention.
pub fn generate_advice(
    profile: &FinancialProfile,
    ratios: &Ratios,
    thresholds: &AdviceThresholds,
) -> Vec<Advice> {
    let mut advice = Vec::new();

    if ratios.debt_to_income_ratio > thresholds.max_debt_to_income {
        advice.push(Advice {
            topic: AdviceTopic::DebtToIncome,
            message: format!(
                "Your debt is {:.1}% of monthly income, above the {:.0}% guideline. \
                 Prioritise paying down high-interest balances.",
                ratios.debt_to_income_ratio, thresholds.max_debt_to_income
            ),
        });
    }

    if ratios.savings_rate < thresholds.min_savings_rate {
        advice.push(Advice {
            topic: AdviceTopic::SavingsRate,
            message: format!(
                "Savings cover {:.0}% of a year's income. Aim for at least {:.0}% by \
                 automating a monthly transfer.",
                ratios.savings_rate * 100.0,
                thresholds.min_savings_rate * 100.0
            ),
        });
    }

    if ratios.emergency_fund_months < thresholds.min_emergency_fund_months {
        advice.push(Advice {
            topic: AdviceTopic::EmergencyFund,
            message: format!(
                "Your emergency fund covers {:.1} months of expenses. Build it up to at \
                 least {:.0} months.",
                ratios.emergency_fund_months, thresholds.min_emergency_fund_months
            ),
        });
    }

    if ratios.investment_rate < thresholds.min_investment_rate {
        advice.push(Advice {
            topic: AdviceTopic::InvestmentRate,
            message: format!(
                "Investments amount to {:.0}% of a year's income. Consider raising \
                 contributions towards {:.0}%.",
                ratios.investment_rate * 100.0,
                thresholds.min_investment_rate * 100.0
            ),
        });
    }

    if profile.credit_score < thresholds.min_credit_score {
        advice.push(Advice {
            topic: AdviceTopic::CreditScore,
            message: format!(
                "A credit score of {} is below {}. Pay bills on time and keep card \
                 utilisation low.",
                profile.credit_score, thresholds.min_credit_score
            ),
        });
    }

    if advice.is_empty() {
        advice.push(Advice {
            topic: AdviceTopic::OnTrack,
            message: "Your finances look healthy. Keep up the good habits.".to_string(),
        });
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ratios::calculate_ratios;
    use crate::core::ratios::tests::sample_profile;

    fn topics(profile: &FinancialProfile) -> Vec<AdviceTopic> {
        let ratios = calculate_ratios(profile, Some(12.0));
        generate_advice(profile, &ratios, &AdviceThresholds::default())
            .into_iter()
            .map(|a| a.topic)
            .collect()
    }

    #[test]
    fn healthy_profile_gets_single_fallback() {
        let mut profile = sample_profile();
        profile.credit_score = 760;
        assert_eq!(topics(&profile), vec![AdviceTopic::OnTrack]);
    }

    #[test]
    fn every_predicate_fires_in_fixed_order() {
        let profile = FinancialProfile {
            monthly_income: 4_000.0,
            monthly_expenses: 3_000.0,
            total_savings: 500.0,
            total_investments: 0.0,
            current_debt: 3_000.0,
            total_assets: 0.0,
            age: 40,
            credit_score: 600,
            federal_tax_rate: 12.0,
            state_tax_rate: 4.0,
            local_tax_rate: 0.0,
            savings_goal: None,
            investment_goal: None,
        };
        assert_eq!(
            topics(&profile),
            vec![
                AdviceTopic::DebtToIncome,
                AdviceTopic::SavingsRate,
                AdviceTopic::EmergencyFund,
                AdviceTopic::InvestmentRate,
                AdviceTopic::CreditScore,
            ]
        );
    }

    #[test]
    fn only_failing_checks_produce_messages() {
        let mut profile = sample_profile();
        profile.credit_score = 760;
        profile.total_investments = 1_000.0;
        let ratios = calculate_ratios(&profile, Some(12.0));
        let advice = generate_advice(&profile, &ratios, &AdviceThresholds::default());

        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].topic, AdviceTopic::InvestmentRate);
        assert!(advice[0].message.contains("20%"));
    }
}
