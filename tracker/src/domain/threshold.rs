//! Budget threshold evaluation.
//!
//! Two independent checks live here. [`evaluate`] bands a candidate expense
//! against its budget before it is stored. [`check`] classifies an already
//! spent total against the low-budget threshold of a budget.

use serde::Serialize;

/// Lower bound (inclusive) of the warning band, in percent of the budget.
pub const WARNING_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// The expense would push the total past the budget. It is not stored.
    Exceeded,
    /// Between 90% and 100% of the budget, both inclusive.
    Warning,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub band: Band,
    pub new_total: f64,
    pub used_percent: f64,
}

pub fn evaluate(prior_spent: f64, amount: f64, budget: f64) -> Evaluation {
    let new_total = prior_spent + amount;
    let used_percent = new_total / budget * 100.0;

    let band = if new_total > budget {
        Band::Exceeded
    } else if (WARNING_PERCENT..=100.0).contains(&used_percent) {
        Band::Warning
    } else {
        Band::Normal
    };

    Evaluation {
        band,
        new_total,
        used_percent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    NoBudget,
    OverBudget,
    LowBudget,
    Ok,
}

/// Spent total at which a budget counts as running low.
pub fn low_threshold(budget: f64, low_percent: f64) -> f64 {
    budget * (1.0 - low_percent / 100.0)
}

pub fn check(spent: f64, budget: f64, low_percent: f64) -> BudgetStatus {
    if spent > budget {
        BudgetStatus::OverBudget
    } else if spent >= low_threshold(budget, low_percent) {
        BudgetStatus::LowBudget
    } else {
        BudgetStatus::Ok
    }
}

/// Share owed by each participant when `amount` is split with `others`
/// people, rounded to cents.
pub fn split_share(amount: f64, others: usize) -> f64 {
    let share = amount / (others as f64 + 1.0);
    (share * 100.0).round() / 100.0
}
