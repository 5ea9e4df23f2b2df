//! Repository and HTTP round trips against a real database.
//!
//! Run with `DATABASE_URL=... cargo test --test postgres -- --ignored`.
//! The tables are truncated first.

#[cfg(test)]
mod tests {
    use actix_web::http::header::{ContentType, AUTHORIZATION};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use sqlx::{Executor, PgPool};
    use std::sync::Arc;
    use tracker::api::app::{create_app, Repositories, Services};
    use tracker::config::GoogleSettings;
    use tracker::domain::model::{Month, NewBudget, NewExpense, NewUser};
    use tracker::domain::repository::{BudgetRepository, ExpenseRepository, UserRepository};
    use tracker::domain::service::IdentityProvider;
    use tracker::infra::auth::g_oauth::GoogleOAuth;
    use tracker::infra::auth::jwt::JwtManager;
    use tracker::infra::db;
    use tracker::infra::mail::LogMailer;
    use tracker::infra::repository::{PgBudgetRepository, PgExpenseRepository, PgUserRepository};
    use tracker::service::alerts::Notifier;

    async fn pool() -> PgPool {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::pg(&url).await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool.execute("truncate users, budgets, expenses restart identity cascade")
            .await
            .unwrap();
        pool
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[actix_web::test]
    #[ignore]
    async fn test_postgres() {
        let pool = pool().await;
        repositories_round_trip(pool.clone()).await;
        long_text_fields_are_stored(pool).await;
    }

    async fn repositories_round_trip(pool: PgPool) {
        let users = PgUserRepository::new(pool.clone());
        let budgets = PgBudgetRepository::new(pool.clone());
        let expenses = PgExpenseRepository::new(pool);

        let user = users
            .create_user(NewUser {
                name: "alex".to_string(),
                email: "alex@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(users.find(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            users.find_by_email("alex@example.com").await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(users.find_by_email("ghost@example.com").await.unwrap(), None);
        assert!(users
            .create_user(NewUser {
                name: "other".to_string(),
                email: "alex@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .is_err());

        let march: Month = "2024-03".parse().unwrap();
        let budget = budgets
            .create_budget(NewBudget {
                user_id: user.id,
                category: "Food".to_string(),
                month: march,
                amount: 100.0,
                low_budget_percent: Some(15),
            })
            .await
            .unwrap();
        assert_eq!(
            budgets.find_budget(user.id, "Food", march).await.unwrap(),
            Some(budget.clone())
        );
        assert_eq!(budgets.find_budget(user.id, "Rent", march).await.unwrap(), None);
        assert_eq!(
            budgets.list_for_month(user.id, march).await.unwrap(),
            vec![budget]
        );

        assert_eq!(
            expenses.category_total(user.id, "Food", march).await.unwrap(),
            0.0
        );
        for (category, amount, day) in [
            ("Food", 10.5, "2024-03-01"),
            ("Food", 20.0, "2024-03-31"),
            ("Food", 99.0, "2024-04-01"),
            ("Fuel", 5.0, "2024-03-15"),
        ] {
            let expense = expenses
                .create_expense(NewExpense {
                    user_id: user.id,
                    category: category.to_string(),
                    amount,
                    date: date(day),
                })
                .await
                .unwrap();
            assert_eq!(expense.date, date(day));
        }

        assert_eq!(
            expenses.category_total(user.id, "Food", march).await.unwrap(),
            30.5
        );
        assert_eq!(expenses.monthly_total(user.id, march).await.unwrap(), 35.5);
    }

    async fn long_text_fields_are_stored(pool: PgPool) {
        let google = GoogleOAuth::new(&GoogleSettings {
            client_id: None,
            client_secret: None,
            redirect_url: None,
        })
        .unwrap();
        let google = Arc::new(google);
        let services = Services::new(
            Repositories::postgres(pool),
            Arc::clone(&google) as Arc<dyn IdentityProvider>,
            google,
            Arc::new(JwtManager::new("53b65289550252052c61406f0f3dad24", 60)),
            Notifier::new(Arc::new(LogMailer), false),
            10.0,
        );
        let app = test::init_service(App::new().configure(create_app(services))).await;

        let name = "Alexandra ".repeat(15);
        let email = format!("{}@example.com", "a".repeat(120));
        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .insert_header(ContentType::json())
            .set_payload(json!({ "name": name, "email": email, "password": "123" }).to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let category = "Groceries and household supplies for the family home";
        let req = test::TestRequest::post()
            .uri("/users/budgets")
            .insert_header(ContentType::json())
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .set_payload(
                json!({ "category": category, "month": "2024-03", "amount": 200 }).to_string(),
            )
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/users/expenses")
            .insert_header(ContentType::json())
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .set_payload(
                json!({ "category": category, "amount": 20, "date": "2024-03-05" }).to_string(),
            )
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "success");
    }
}
