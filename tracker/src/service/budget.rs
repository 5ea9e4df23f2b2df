use crate::domain::model::{parse_expense_date, Budget, Expense, Month, NewBudget, NewExpense, User};
use crate::domain::repository::{BudgetRepository, ExpenseRepository};
use crate::domain::threshold::{self, Band, BudgetStatus, Evaluation};
use crate::error::{AppError, Result};
use crate::service::alerts::{self, Notifier};
use crate::service::{parse_month, required};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct BudgetForm {
    pub category: Option<String>,
    pub month: Option<String>,
    pub amount: Option<Value>,
    pub low_budget_percent: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    pub category: Option<String>,
    pub amount: Option<Value>,
    pub date: Option<String>,
    #[serde(default)]
    pub split_emails: Vec<String>,
}

/// Result of an expense submission. `expense` is `None` when it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseOutcome {
    pub evaluation: Evaluation,
    pub message: String,
    pub expense: Option<Expense>,
}

impl ExpenseOutcome {
    pub fn status(&self) -> &'static str {
        match self.evaluation.band {
            Band::Exceeded => "exceeded",
            Band::Warning => "warning_90",
            Band::Normal => "success",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetCheck {
    pub status: BudgetStatus,
    pub spent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

/// Accepts JSON numbers as well as numeric strings.
fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}

pub struct BudgetService {
    budget_repo: Arc<dyn BudgetRepository>,
    expense_repo: Arc<dyn ExpenseRepository>,
    notifier: Notifier,
    default_low_budget_percent: f64,
}

impl BudgetService {
    pub fn new(
        budget_repo: Arc<dyn BudgetRepository>,
        expense_repo: Arc<dyn ExpenseRepository>,
        notifier: Notifier,
        default_low_budget_percent: f64,
    ) -> BudgetService {
        BudgetService {
            budget_repo,
            expense_repo,
            notifier,
            default_low_budget_percent,
        }
    }

    fn low_percent(&self, budget: &Budget) -> f64 {
        budget
            .low_budget_percent
            .map(f64::from)
            .unwrap_or(self.default_low_budget_percent)
    }

    pub async fn create_budget(&self, user: &User, form: BudgetForm) -> Result<Budget> {
        let (Some(category), Some(month), Some(amount)) =
            (required(form.category), required(form.month), form.amount)
        else {
            return Err(AppError::validation("category, month and amount required"));
        };

        let month = parse_month(&month)?;
        let amount = parse_amount(&amount).ok_or_else(|| AppError::validation("Invalid amount"))?;
        if amount <= 0.0 {
            return Err(AppError::validation("Budget amount must be greater than zero"));
        }
        if let Some(percent) = form.low_budget_percent {
            if !(0..=100).contains(&percent) {
                return Err(AppError::validation(
                    "low_budget_percent must be between 0 and 100",
                ));
            }
        }

        if self
            .budget_repo
            .find_budget(user.id, &category, month)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "Budget already set for this category and month",
            ));
        }

        let budget = self
            .budget_repo
            .create_budget(NewBudget {
                user_id: user.id,
                category,
                month,
                amount,
                low_budget_percent: form.low_budget_percent,
            })
            .await?;
        log::info!(user_id = user.id, budget_id = budget.id, month:% = budget.month; "Budget created");
        Ok(budget)
    }

    pub async fn list_budgets(&self, user: &User, month: Option<String>) -> Result<Vec<Budget>> {
        let month = required(month).ok_or_else(|| AppError::validation("month required"))?;
        let month = parse_month(&month)?;
        Ok(self.budget_repo.list_for_month(user.id, month).await?)
    }

    /// Evaluates a candidate expense against its budget and stores it unless
    /// it would push the month's spending in that category past the budget.
    pub async fn add_expense(&self, user: &User, form: ExpenseForm) -> Result<ExpenseOutcome> {
        let (Some(category), Some(amount), Some(date)) =
            (required(form.category), form.amount, required(form.date))
        else {
            return Err(AppError::validation(
                "Category, amount and date are required",
            ));
        };

        let amount = parse_amount(&amount)
            .filter(|amount| *amount >= 0.0)
            .ok_or_else(|| AppError::validation("Invalid amount"))?;
        let date =
            parse_expense_date(&date).ok_or_else(|| AppError::validation("Date must be YYYY-MM-DD"))?;
        let month = Month::of(date);

        let Some(budget) = self.budget_repo.find_budget(user.id, &category, month).await? else {
            return Err(AppError::validation(format!(
                "Please set the budget for {} before adding expenses in {}.",
                month.name(),
                category
            )));
        };

        let prior = self
            .expense_repo
            .category_total(user.id, &category, month)
            .await?;
        let evaluation = threshold::evaluate(prior, amount, budget.amount);

        if evaluation.band == Band::Exceeded {
            log::info!(user_id = user.id, category = category.as_str(), new_total = evaluation.new_total; "Expense rejected, budget exceeded");
            self.notifier
                .notify(alerts::exceeded(
                    user,
                    &category,
                    month,
                    budget.amount,
                    amount,
                    evaluation.new_total,
                ))
                .await;
            return Ok(ExpenseOutcome {
                evaluation,
                message: format!(
                    "Adding this expense would exceed your {category} budget for {month}."
                ),
                expense: None,
            });
        }

        let expense = self
            .expense_repo
            .create_expense(NewExpense {
                user_id: user.id,
                category: category.clone(),
                amount,
                date,
            })
            .await?;
        log::info!(user_id = user.id, expense_id = expense.id; "Expense added");

        let message = if evaluation.band == Band::Warning {
            self.notifier
                .notify(alerts::warning(
                    user,
                    &category,
                    month,
                    evaluation.used_percent,
                    evaluation.new_total,
                    budget.amount,
                ))
                .await;
            format!(
                "Expense added successfully, but you've used {:.2}% of your {} budget.",
                evaluation.used_percent, category
            )
        } else {
            let status = threshold::check(
                evaluation.new_total,
                budget.amount,
                self.low_percent(&budget),
            );
            if status == BudgetStatus::LowBudget {
                self.notifier
                    .notify(alerts::low_budget(
                        user,
                        &category,
                        month,
                        evaluation.new_total,
                        budget.amount,
                    ))
                    .await;
            }
            "Expense added successfully.".to_string()
        };

        self.notify_split(user, &category, amount, &form.split_emails)
            .await;

        Ok(ExpenseOutcome {
            evaluation,
            message,
            expense: Some(expense),
        })
    }

    async fn notify_split(&self, user: &User, category: &str, amount: f64, emails: &[String]) {
        let emails: Vec<&str> = emails
            .iter()
            .map(|email| email.trim())
            .filter(|email| !email.is_empty())
            .collect();
        if emails.is_empty() {
            return;
        }

        let share = threshold::split_share(amount, emails.len());
        for email in emails {
            self.notifier
                .notify(alerts::split(user, email, category, amount, share))
                .await;
        }
    }

    /// Standalone budget check for a category and month, alerting the user
    /// when the budget is over or running low.
    pub async fn check_budget(
        &self,
        user: &User,
        category: Option<String>,
        month: Option<String>,
    ) -> Result<BudgetCheck> {
        let (Some(category), Some(month)) = (required(category), required(month)) else {
            return Err(AppError::validation("category and month required"));
        };
        let month = parse_month(&month)?;

        let spent = self
            .expense_repo
            .category_total(user.id, &category, month)
            .await?;
        let Some(budget) = self.budget_repo.find_budget(user.id, &category, month).await? else {
            return Ok(BudgetCheck {
                status: BudgetStatus::NoBudget,
                spent,
                budget: None,
            });
        };

        let status = threshold::check(spent, budget.amount, self.low_percent(&budget));
        match status {
            BudgetStatus::OverBudget => {
                self.notifier
                    .notify(alerts::over_budget(user, &category, month, spent, budget.amount))
                    .await
            }
            BudgetStatus::LowBudget => {
                self.notifier
                    .notify(alerts::low_budget(user, &category, month, spent, budget.amount))
                    .await
            }
            BudgetStatus::Ok | BudgetStatus::NoBudget => {}
        }

        Ok(BudgetCheck {
            status,
            spent,
            budget: Some(budget.amount),
        })
    }
}
