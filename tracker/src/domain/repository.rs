use crate::domain::model::*;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn create_budget(&self, budget: NewBudget) -> anyhow::Result<Budget>;
    async fn find_budget(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<Option<Budget>>;
    async fn list_for_month(&self, user_id: i64, month: Month) -> anyhow::Result<Vec<Budget>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create_expense(&self, expense: NewExpense) -> anyhow::Result<Expense>;
    /// Sum of the user's expenses in `category` during `month`, 0 when there are none.
    async fn category_total(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<f64>;
    async fn monthly_total(&self, user_id: i64, month: Month) -> anyhow::Result<f64>;
}
