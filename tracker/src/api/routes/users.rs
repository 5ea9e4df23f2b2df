use crate::api::extract::CurrentUser;
use crate::error::Result;
use crate::service::account::AccountService;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyEmailsBody {
    #[serde(default)]
    pub emails: Vec<String>,
}

#[get("/users/me")]
async fn me(CurrentUser(user): CurrentUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(user))
}

#[post("/users/verify_emails")]
async fn verify_emails(
    _: CurrentUser,
    body: web::Json<VerifyEmailsBody>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let result = accounts.verify_emails(body.into_inner().emails).await?;
    Ok(HttpResponse::Ok().json(result))
}
