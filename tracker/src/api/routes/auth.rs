use crate::error::{AppError, Result};
use crate::infra::auth::g_oauth::GoogleOAuth;
use crate::service::account::{AccountService, LoginForm, Session, SignupForm};
use actix_web::cookie::{time, Cookie};
use actix_web::http::header::LOCATION;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_COOKIE_PATH: &str = "/auth/google";

#[derive(Debug, Default, Deserialize)]
pub struct OtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleTokenBody {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub session: Session,
}

impl From<Session> for GoogleLoginResponse {
    fn from(session: Session) -> Self {
        GoogleLoginResponse {
            message: "Google login successful",
            session,
        }
    }
}

#[post("/auth/signup")]
async fn signup(
    form: web::Json<SignupForm>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let session = accounts.signup(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/signup/request")]
async fn signup_request(
    body: web::Json<OtpRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    accounts.request_signup_otp(body.into_inner().email).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "OTP sent to email" })))
}

#[post("/auth/signup/verify")]
async fn signup_verify(
    form: web::Json<SignupForm>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let session = accounts.verify_signup_otp(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/login")]
async fn login(
    form: web::Json<LoginForm>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let session = accounts.login(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/google")]
async fn google_token(
    body: web::Json<GoogleTokenBody>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let session = accounts.google_login(body.into_inner().token).await?;
    Ok(HttpResponse::Ok().json(GoogleLoginResponse::from(session)))
}

#[get("/auth/google/login")]
async fn google_redirect(google: web::Data<GoogleOAuth>) -> Result<HttpResponse> {
    let (url, state) = google.authorize_url().map_err(|err| {
        log::warn!(error:% = err; "Google sign-in unavailable");
        AppError::Failed("Google sign-in is not configured".to_string())
    })?;

    let cookie = Cookie::build(OAUTH_STATE_COOKIE, state.secret().clone())
        .path(OAUTH_COOKIE_PATH)
        .http_only(true)
        .max_age(time::Duration::minutes(10))
        .finish();

    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((LOCATION, url.to_string()))
        .finish())
}

#[get("/auth/google/callback")]
async fn google_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse> {
    let CallbackQuery { code, state } = query.into_inner();
    let expected = req.cookie(OAUTH_STATE_COOKIE);

    match (expected, state) {
        (Some(expected), Some(state)) if expected.value() == state => {}
        _ => return Err(AppError::validation("Invalid OAuth state")),
    }
    let code = code.ok_or_else(|| AppError::validation("Google authentication failed"))?;

    let session = accounts.google_callback(&code).await?;

    let mut removal = Cookie::build(OAUTH_STATE_COOKIE, "")
        .path(OAUTH_COOKIE_PATH)
        .finish();
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(GoogleLoginResponse::from(session)))
}
