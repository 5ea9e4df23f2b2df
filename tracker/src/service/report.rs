use crate::domain::model::Month;
use crate::domain::repository::{BudgetRepository, ExpenseRepository};
use crate::error::{AppError, Result};
use crate::service::{parse_month, required};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategorySpend {
    pub spent: f64,
    pub budget: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub total: f64,
    pub breakdown: BTreeMap<String, CategorySpend>,
}

pub struct ReportService {
    budget_repo: Arc<dyn BudgetRepository>,
    expense_repo: Arc<dyn ExpenseRepository>,
}

impl ReportService {
    pub fn new(
        budget_repo: Arc<dyn BudgetRepository>,
        expense_repo: Arc<dyn ExpenseRepository>,
    ) -> ReportService {
        ReportService {
            budget_repo,
            expense_repo,
        }
    }

    pub async fn monthly_total(&self, user_id: i64, month: Month) -> anyhow::Result<f64> {
        self.expense_repo.monthly_total(user_id, month).await
    }

    /// Spent vs. budgeted amount for every category budgeted in `month`.
    pub async fn spending_vs_budget(
        &self,
        user_id: i64,
        month: Month,
    ) -> anyhow::Result<BTreeMap<String, CategorySpend>> {
        let mut breakdown = BTreeMap::new();
        for budget in self.budget_repo.list_for_month(user_id, month).await? {
            let spent = self
                .expense_repo
                .category_total(user_id, &budget.category, month)
                .await?;
            breakdown.insert(
                budget.category,
                CategorySpend {
                    spent,
                    budget: budget.amount,
                },
            );
        }
        Ok(breakdown)
    }

    pub async fn report(&self, user_id: i64, month: Option<String>) -> Result<MonthlyReport> {
        let month = required(month).ok_or_else(|| AppError::validation("month required"))?;
        let month = parse_month(&month)?;

        Ok(MonthlyReport {
            total: self.monthly_total(user_id, month).await?,
            breakdown: self.spending_vs_budget(user_id, month).await?,
        })
    }
}
