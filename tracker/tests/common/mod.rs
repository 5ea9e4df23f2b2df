#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracker::api::app::{Repositories, Services};
use tracker::config::GoogleSettings;
use tracker::domain::model::{Budget, Expense, Month, NewBudget, NewExpense, NewUser, User};
use tracker::domain::repository::{BudgetRepository, ExpenseRepository, UserRepository};
use tracker::domain::service::{Email, GoogleIdentity, IdentityProvider, Mailer};
use tracker::infra::auth::g_oauth::GoogleOAuth;
use tracker::infra::auth::jwt::JwtManager;
use tracker::service::alerts::Notifier;

pub const SECRET_KEY: &str = "53b65289550252052c61406f0f3dad24";
pub const GOOGLE_TOKEN: &str = "valid-google-token";
pub const GOOGLE_CODE: &str = "valid-google-code";
pub const ALERTS_SENDER: &str = "alerts@example.com";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    budgets: Vec<Budget>,
    expenses: Vec<Expense>,
}

/// Keeps users, budgets and expenses in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn expense_count(&self) -> usize {
        self.tables.lock().unwrap().expenses.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        let user = User {
            id: tables.users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password: user.password,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BudgetRepository for MemoryStore {
    async fn create_budget(&self, budget: NewBudget) -> anyhow::Result<Budget> {
        let mut tables = self.tables.lock().unwrap();
        let budget = Budget {
            id: tables.budgets.len() as i64 + 1,
            user_id: budget.user_id,
            category: budget.category,
            month: budget.month,
            amount: budget.amount,
            low_budget_percent: budget.low_budget_percent,
        };
        tables.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn find_budget(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<Option<Budget>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .budgets
            .iter()
            .find(|b| b.user_id == user_id && b.category == category && b.month == month)
            .cloned())
    }

    async fn list_for_month(&self, user_id: i64, month: Month) -> anyhow::Result<Vec<Budget>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.month == month)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn create_expense(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        let mut tables = self.tables.lock().unwrap();
        let expense = Expense {
            id: tables.expenses.len() as i64 + 1,
            user_id: expense.user_id,
            category: expense.category,
            amount: expense.amount,
            date: expense.date,
        };
        tables.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn category_total(
        &self,
        user_id: i64,
        category: &str,
        month: Month,
    ) -> anyhow::Result<f64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && e.category == category && month.contains(e.date))
            .map(|e| e.amount)
            .sum())
    }

    async fn monthly_total(&self, user_id: i64, month: Month) -> anyhow::Result<f64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && month.contains(e.date))
            .map(|e| e.amount)
            .sum())
    }
}

/// Records every email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|email| email.subject).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Accepts exactly one ID token and one authorization code.
pub struct StaticIdentity;

fn google_identity() -> GoogleIdentity {
    GoogleIdentity {
        subject: "108234".to_string(),
        email: "kim@example.com".to_string(),
        name: Some("Kim".to_string()),
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify_id_token(&self, id_token: &str) -> anyhow::Result<GoogleIdentity> {
        if id_token == GOOGLE_TOKEN {
            Ok(google_identity())
        } else {
            Err(anyhow!("Wrong number of segments in token"))
        }
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<GoogleIdentity> {
        if code == GOOGLE_CODE {
            Ok(google_identity())
        } else {
            Err(anyhow!("invalid_grant"))
        }
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub services: Services,
}

pub fn context() -> TestContext {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());

    let google = GoogleOAuth::new(&GoogleSettings {
        client_id: Some("client-id.apps.googleusercontent.com".to_string()),
        client_secret: Some("client-secret".to_string()),
        redirect_url: Some("http://localhost:8080/auth/google/callback".to_string()),
    })
    .unwrap();

    let notifier = Notifier::new(Arc::clone(&mailer) as Arc<dyn Mailer>, false)
        .with_test_recipient(Some(ALERTS_SENDER.to_string()));

    let services = Services::new(
        Repositories {
            users: Arc::clone(&store) as Arc<dyn UserRepository>,
            budgets: Arc::clone(&store) as Arc<dyn BudgetRepository>,
            expenses: Arc::clone(&store) as Arc<dyn ExpenseRepository>,
        },
        Arc::new(StaticIdentity),
        Arc::new(google),
        Arc::new(JwtManager::new(SECRET_KEY, 3600)),
        notifier,
        10.0,
    );

    TestContext {
        store,
        mailer,
        services,
    }
}

/// Calls the service and returns the status with the JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send<S, R, B, E>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = E>,
    B: MessageBody,
    E: std::fmt::Debug,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
