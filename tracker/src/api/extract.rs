use crate::domain::model::User;
use crate::error::AppError;
use crate::infra::auth::jwt::{Claims, JwtManager};
use crate::service::account::AccountService;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use anyhow::anyhow;
use std::future::Future;
use std::pin::Pin;

/// The user a request is authenticated as, taken from an
/// `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct CurrentUser(pub User);

fn bearer_claims(req: &HttpRequest, jwt: &JwtManager) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Token is missing"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Token format invalid"))?;

    jwt.decode(token).map_err(|err| {
        log::debug!(error:% = err; "Rejected access token");
        AppError::unauthorized("Token is invalid")
    })
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let jwt = req.app_data::<web::Data<JwtManager>>().cloned();
        let accounts = req.app_data::<web::Data<AccountService>>().cloned();
        let req = req.clone();

        Box::pin(async move {
            let (Some(jwt), Some(accounts)) = (jwt, accounts) else {
                return Err(AppError::Internal(anyhow!("auth services are not registered")));
            };
            let claims = bearer_claims(&req, &jwt)?;
            let user = accounts.me(claims.sub).await?;
            Ok(CurrentUser(user))
        })
    }
}
