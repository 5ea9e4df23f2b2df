use crate::domain::model::{Expense, Month, NewExpense};
use crate::domain::repository;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgExpenseRepository {
    pub pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl repository::ExpenseRepository for PgExpenseRepository {
    async fn create_expense(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        let created = sqlx::query_as::<_, Expense>(
            "INSERT INTO expenses(user_id, category, amount, spent_on) VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, category, amount, spent_on",
        )
        .bind(expense.user_id)
        .bind(&expense.category)
        .bind(expense.amount)
        .bind(expense.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn category_total(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<f64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses
             WHERE user_id = $1 AND category = $2 AND spent_on >= $3 AND spent_on < $4",
        )
        .bind(user_id)
        .bind(category)
        .bind(month.first_day())
        .bind(month.next_first_day())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }

    async fn monthly_total(&self, user_id: i64, month: Month) -> anyhow::Result<f64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses
             WHERE user_id = $1 AND spent_on >= $2 AND spent_on < $3",
        )
        .bind(user_id)
        .bind(month.first_day())
        .bind(month.next_first_day())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }
}
