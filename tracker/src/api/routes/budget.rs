use crate::api::extract::CurrentUser;
use crate::error::Result;
use crate::service::budget::{BudgetForm, BudgetService, ExpenseForm};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub category: Option<String>,
    pub month: Option<String>,
}

#[post("/users/budgets")]
async fn create_budget(
    CurrentUser(user): CurrentUser,
    form: web::Json<BudgetForm>,
    budgets: web::Data<BudgetService>,
) -> Result<HttpResponse> {
    let budget = budgets.create_budget(&user, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "budget_id": budget.id })))
}

#[get("/users/budgets")]
async fn list_budgets(
    CurrentUser(user): CurrentUser,
    query: web::Query<MonthQuery>,
    budgets: web::Data<BudgetService>,
) -> Result<HttpResponse> {
    let list = budgets.list_budgets(&user, query.into_inner().month).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[get("/users/budgets/check")]
async fn check_budget(
    CurrentUser(user): CurrentUser,
    query: web::Query<CheckQuery>,
    budgets: web::Data<BudgetService>,
) -> Result<HttpResponse> {
    let CheckQuery { category, month } = query.into_inner();
    let check = budgets.check_budget(&user, category, month).await?;
    Ok(HttpResponse::Ok().json(check))
}

#[post("/users/expenses")]
async fn add_expense(
    CurrentUser(user): CurrentUser,
    form: web::Json<ExpenseForm>,
    budgets: web::Data<BudgetService>,
) -> Result<HttpResponse> {
    let outcome = budgets.add_expense(&user, form.into_inner()).await?;

    let response = match &outcome.expense {
        Some(expense) => HttpResponse::Ok().json(json!({
            "message": outcome.message,
            "status": outcome.status(),
            "expense_id": expense.id,
        })),
        None => HttpResponse::BadRequest().json(json!({
            "error": outcome.message,
            "status": outcome.status(),
        })),
    };
    Ok(response)
}
