use crate::api::extract::CurrentUser;
use crate::error::{AppError, Result};
use crate::service::alerts::Notifier;
use actix_web::{post, web, HttpResponse};
use serde_json::json;

#[post("/alerts/test")]
async fn test_email(CurrentUser(user): CurrentUser, notifier: web::Data<Notifier>) -> Result<HttpResponse> {
    notifier.send_test().await.map_err(|err| {
        log::error!(user_id = user.id, error:% = err; "Test email failed");
        AppError::Failed(format!("Email failed: {err}"))
    })?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Test email sent" })))
}
