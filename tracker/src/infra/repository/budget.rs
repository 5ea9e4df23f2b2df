use crate::domain::model::{Budget, Month, NewBudget};
use crate::domain::repository;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgBudgetRepository {
    pub pool: PgPool,
}

impl PgBudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl repository::BudgetRepository for PgBudgetRepository {
    async fn create_budget(&self, budget: NewBudget) -> anyhow::Result<Budget> {
        let row = sqlx::query(
            "INSERT INTO budgets(user_id, category, month, amount, low_budget_percent)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(budget.user_id)
        .bind(&budget.category)
        .bind(budget.month.to_string())
        .bind(budget.amount)
        .bind(budget.low_budget_percent)
        .fetch_one(&self.pool)
        .await?;

        Ok(Budget {
            id: row.try_get("id")?,
            user_id: budget.user_id,
            category: budget.category,
            month: budget.month,
            amount: budget.amount,
            low_budget_percent: budget.low_budget_percent,
        })
    }

    async fn find_budget(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<Option<Budget>> {
        let row = sqlx::query(
            "SELECT id, user_id, category, month, amount, low_budget_percent FROM budgets
             WHERE user_id = $1 AND category = $2 AND month = $3
             ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .bind(category)
        .bind(month.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Budget::try_from).transpose()
    }

    async fn list_for_month(&self, user_id: i64, month: Month) -> anyhow::Result<Vec<Budget>> {
        let rows = sqlx::query(
            "SELECT id, user_id, category, month, amount, low_budget_percent FROM budgets
             WHERE user_id = $1 AND month = $2
             ORDER BY category, id",
        )
        .bind(user_id)
        .bind(month.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Budget::try_from).collect()
    }
}
