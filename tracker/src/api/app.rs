use crate::api::routes::{alerts, auth, budget, report, users};
use crate::config::Config;
use crate::domain::repository::{BudgetRepository, ExpenseRepository, UserRepository};
use crate::domain::service::IdentityProvider;
use crate::error::AppError;
use crate::infra::auth::g_oauth::GoogleOAuth;
use crate::infra::auth::jwt::JwtManager;
use crate::infra::mail;
use crate::infra::otp::OtpStore;
use crate::infra::repository::{PgBudgetRepository, PgExpenseRepository, PgUserRepository};
use crate::service::account::AccountService;
use crate::service::alerts::Notifier;
use crate::service::budget::BudgetService;
use crate::service::report::ReportService;
use actix_web::web;
use actix_web::web::ServiceConfig;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

/// Everything the HTTP layer shares between workers.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub budgets: Arc<BudgetService>,
    pub reports: Arc<ReportService>,
    pub jwt: Arc<JwtManager>,
    pub google: Arc<GoogleOAuth>,
    pub notifier: Notifier,
}

/// Repository handles the services are built on.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
}

impl Repositories {
    pub fn postgres(pool: Pool<Postgres>) -> Repositories {
        Repositories {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            budgets: Arc::new(PgBudgetRepository::new(pool.clone())),
            expenses: Arc::new(PgExpenseRepository::new(pool)),
        }
    }
}

impl Services {
    pub fn new(
        repos: Repositories,
        identity: Arc<dyn IdentityProvider>,
        google: Arc<GoogleOAuth>,
        jwt: Arc<JwtManager>,
        notifier: Notifier,
        default_low_budget_percent: f64,
    ) -> Services {
        let accounts = Arc::new(AccountService::new(
            repos.users,
            identity,
            Arc::clone(&jwt),
            OtpStore::default(),
            notifier.clone(),
        ));
        let budgets = Arc::new(BudgetService::new(
            Arc::clone(&repos.budgets),
            Arc::clone(&repos.expenses),
            notifier.clone(),
            default_low_budget_percent,
        ));
        let reports = Arc::new(ReportService::new(repos.budgets, repos.expenses));

        Services {
            accounts,
            budgets,
            reports,
            jwt,
            google,
            notifier,
        }
    }

    pub fn from_config(pool: Pool<Postgres>, config: &Config) -> anyhow::Result<Services> {
        let jwt = Arc::new(JwtManager::new(&config.secret_key, config.jwt_ttl_secs));
        let google = Arc::new(GoogleOAuth::new(&config.google)?);
        let notifier = Notifier::new(mail::from_settings(&config.mail)?, config.mail.background)
            .with_test_recipient(config.mail.sender().map(str::to_string));

        Ok(Services::new(
            Repositories::postgres(pool),
            Arc::clone(&google) as Arc<dyn IdentityProvider>,
            google,
            jwt,
            notifier,
            config.default_low_budget_percent,
        ))
    }
}

pub fn create_app(services: Services) -> Box<dyn Fn(&mut ServiceConfig)> {
    Box::new(move |cfg: &mut ServiceConfig| {
        let json_config = web::JsonConfig::default().error_handler(|err, _| {
            AppError::validation(format!("Invalid JSON body: {err}")).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _| {
            AppError::validation(format!("Invalid query: {err}")).into()
        });

        cfg.app_data(json_config)
            .app_data(query_config)
            .app_data(web::Data::from(Arc::clone(&services.jwt)))
            .app_data(web::Data::from(Arc::clone(&services.accounts)))
            .app_data(web::Data::from(Arc::clone(&services.budgets)))
            .app_data(web::Data::from(Arc::clone(&services.reports)))
            .app_data(web::Data::from(Arc::clone(&services.google)))
            .app_data(web::Data::new(services.notifier.clone()))
            .service(auth::signup)
            .service(auth::signup_request)
            .service(auth::signup_verify)
            .service(auth::login)
            .service(auth::google_token)
            .service(auth::google_redirect)
            .service(auth::google_callback)
            .service(users::me)
            .service(users::verify_emails)
            .service(budget::create_budget)
            .service(budget::list_budgets)
            .service(budget::check_budget)
            .service(budget::add_expense)
            .service(report::monthly_report)
            .service(alerts::test_email);
    })
}
