use crate::domain::model::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::service::{GoogleIdentity, IdentityProvider};
use crate::error::{AppError, Result};
use crate::infra::auth::jwt::JwtManager;
use crate::infra::auth::password;
use crate::infra::otp::OtpStore;
use crate::service::alerts::{self, Notifier};
use crate::service::{present, required};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by every successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VerifiedEmail {
    pub email: String,
    pub user_id: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmailVerification {
    pub verified: Vec<VerifiedEmail>,
    pub invalid: Vec<String>,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_EXISTS: &str = "User already exists";

pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
    jwt: Arc<JwtManager>,
    otp: OtpStore,
    notifier: Notifier,
}

impl AccountService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityProvider>,
        jwt: Arc<JwtManager>,
        otp: OtpStore,
        notifier: Notifier,
    ) -> AccountService {
        AccountService {
            user_repo,
            identity,
            jwt,
            otp,
            notifier,
        }
    }

    fn session(&self, user: &User) -> Result<Session> {
        Ok(Session {
            user_id: user.id,
            email: user.email.clone(),
            access_token: self.jwt.gen_user_token(user.id)?,
        })
    }

    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        match self.user_repo.find_by_email(email).await? {
            Some(_) => Err(AppError::validation(USER_EXISTS)),
            None => Ok(()),
        }
    }

    async fn register(&self, name: String, email: String, password: &str) -> Result<User> {
        let password = password::hash(password.to_string()).await?;
        let user = self
            .user_repo
            .create_user(NewUser {
                name,
                email,
                password,
            })
            .await?;
        log::info!(user_id = user.id; "User registered");
        Ok(user)
    }

    pub async fn signup(&self, form: SignupForm) -> Result<Session> {
        let (Some(name), Some(email), Some(password)) = (
            required(form.name),
            required(form.email),
            present(form.password),
        ) else {
            return Err(AppError::validation("All fields are required"));
        };

        self.ensure_email_free(&email).await?;
        let user = self.register(name, email, &password).await?;
        self.session(&user)
    }

    pub async fn request_signup_otp(&self, email: Option<String>) -> Result<()> {
        let email = required(email).ok_or_else(|| AppError::validation("Email required"))?;
        self.ensure_email_free(&email).await?;

        let code = self.otp.issue(&email);
        self.notifier
            .send_now(alerts::otp(&email, &code))
            .await
            .map_err(|err| {
                log::error!(email = email.as_str(), error:% = err; "Email send error");
                AppError::Failed("Failed to send OTP".to_string())
            })?;

        log::info!(email = email.as_str(); "Signup OTP issued");
        Ok(())
    }

    pub async fn verify_signup_otp(&self, form: SignupForm) -> Result<Session> {
        let (Some(name), Some(email), Some(password), Some(code)) = (
            required(form.name),
            required(form.email),
            present(form.password),
            required(form.otp),
        ) else {
            return Err(AppError::validation("All fields are required"));
        };

        self.otp
            .check(&email, &code)
            .map_err(|err| AppError::validation(err.to_string()))?;
        self.ensure_email_free(&email).await?;

        let user = self.register(name, email, &password).await?;
        self.otp.consume(&user.email);
        self.session(&user)
    }

    pub async fn login(&self, form: LoginForm) -> Result<Session> {
        let email = required(form.email).unwrap_or_default();
        let password = form.password.unwrap_or_default();

        let user = match self.user_repo.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log::info!(email = email.as_str(); "Failed login attempt");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        if !password::verify(password, user.password.clone()).await {
            log::info!(user_id = user.id; "Failed login attempt");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        log::info!(user_id = user.id; "User authenticated");
        self.session(&user)
    }

    pub async fn google_login(&self, id_token: Option<String>) -> Result<Session> {
        let token = required(id_token).ok_or_else(|| AppError::validation("Invalid token"))?;
        let identity = self
            .identity
            .verify_id_token(&token)
            .await
            .map_err(|err| {
                log::warn!(error:% = err; "Google Auth Error");
                AppError::validation("Invalid token")
            })?;

        let user = self.find_or_create(identity).await?;
        self.session(&user)
    }

    pub async fn google_callback(&self, code: &str) -> Result<Session> {
        let identity = self.identity.exchange_code(code).await.map_err(|err| {
            log::warn!(error:% = err; "Google code exchange failed");
            AppError::validation("Google authentication failed")
        })?;

        let user = self.find_or_create(identity).await?;
        self.session(&user)
    }

    async fn find_or_create(&self, identity: GoogleIdentity) -> Result<User> {
        if let Some(user) = self.user_repo.find_by_email(&identity.email).await? {
            return Ok(user);
        }

        let user = self
            .user_repo
            .create_user(NewUser {
                name: identity.name.unwrap_or_else(|| "User".to_string()),
                email: identity.email,
                password: password::unusable().await?,
            })
            .await?;
        log::info!(user_id = user.id, google_sub = identity.subject.as_str(); "User registered through Google");
        Ok(user)
    }

    pub async fn me(&self, id: i64) -> Result<User> {
        self.user_repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn verify_emails(&self, emails: Vec<String>) -> Result<EmailVerification> {
        if emails.is_empty() {
            return Err(AppError::validation("No emails provided"));
        }

        let mut result = EmailVerification::default();
        for email in emails {
            match self.user_repo.find_by_email(&email).await? {
                Some(user) => result.verified.push(VerifiedEmail {
                    email,
                    user_id: user.id,
                }),
                None => result.invalid.push(email),
            }
        }
        Ok(result)
    }
}
