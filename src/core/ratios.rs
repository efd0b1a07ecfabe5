use super::types::{FinancialProfile, Ratios};

pub fn calculate_ratios(profile: &FinancialProfile, emergency_fund_cap: Option<f64>) -> Ratios {
    let income = profile.monthly_income;
    let combined_tax_rate = profile.combined_tax_rate();

    // Taxes above 100% are tolerated and push net income below zero.
    let net_income = income * (1.0 - combined_tax_rate / 100.0);
    let net_worth = profile.total_assets + profile.total_savings + profile.total_investments
        - profile.current_debt;

    let (debt_to_income_ratio, savings_rate, investment_rate) = if income > 0.0 {
        let annual_income = income * 12.0;
        (
            profile.current_debt / income * 100.0,
            profile.total_savings / annual_income,
            profile.total_investments / annual_income,
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    Ratios {
        combined_tax_rate,
        net_income,
        net_worth,
        debt_to_income_ratio,
        savings_rate,
        investment_rate,
        emergency_fund_months: emergency_fund_months(
            profile.total_savings,
            profile.monthly_expenses,
            emergency_fund_cap,
        ),
    }
}

/// Months of expenses covered by `savings`. Zero expenses means unlimited coverage,
/// which the cap (when set) clamps down.
pub fn emergency_fund_months(savings: f64, monthly_expenses: f64, cap: Option<f64>) -> f64 {
    let months = if monthly_expenses > 0.0 {
        savings / (monthly_expenses / 12.0)
    } else {
        f64::INFINITY
    };
    match cap {
        Some(cap) => months.min(cap),
        None => months,
    }
}

/// Progress towards a goal in percent, `None` when no usable goal is set.
pub fn goal_progress(current: f64, goal: Option<f64>) -> Option<f64> {
    goal.filter(|goal| *goal > 0.0)
        .map(|goal| (current / goal * 100.0).clamp(0.0, 100.0))
}
