//! Outgoing notifications: dispatch policy and message bodies.

use crate::domain::model::{Month, User};
use crate::domain::service::{Email, Mailer};
use anyhow::anyhow;
use std::sync::Arc;

/// Best-effort email dispatch.
///
/// In background mode each email is handed to a spawned task and the caller
/// moves on immediately. There is no retry and no ordering relative to the
/// HTTP response.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    background: bool,
    test_recipient: Option<String>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, background: bool) -> Notifier {
        Notifier {
            mailer,
            background,
            test_recipient: None,
        }
    }

    pub fn with_test_recipient(mut self, recipient: Option<String>) -> Notifier {
        self.test_recipient = recipient;
        self
    }

    /// Sends `email`; a delivery failure is only known in inline mode.
    pub async fn deliver(&self, email: Email) -> anyhow::Result<()> {
        if self.background {
            self.spawn(email);
            Ok(())
        } else {
            self.mailer.send(email).await
        }
    }

    fn spawn(&self, email: Email) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            send_logged(mailer.as_ref(), email).await;
        });
    }

    /// Sends `email` and waits for the outcome, whatever the mode.
    pub async fn send_now(&self, email: Email) -> anyhow::Result<()> {
        self.mailer.send(email).await
    }

    /// Like [`Notifier::deliver`], but failures are logged and dropped.
    pub async fn notify(&self, email: Email) {
        if self.background {
            self.spawn(email);
        } else {
            send_logged(self.mailer.as_ref(), email).await;
        }
    }

    /// Sends a test email synchronously to the configured sender address.
    pub async fn send_test(&self) -> anyhow::Result<()> {
        let to = self
            .test_recipient
            .clone()
            .ok_or_else(|| anyhow!("no sender address configured"))?;
        self.send_now(test(&to)).await
    }
}

async fn send_logged(mailer: &dyn Mailer, email: Email) {
    let to = email.to.clone();
    let subject = email.subject.clone();
    if let Err(err) = mailer.send(email).await {
        log::error!(to = to.as_str(), subject = subject.as_str(), error:% = err; "Email not sent");
    }
}

fn card(heading: &str, color: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        "<div style='font-family:Arial,sans-serif;padding:18px;border-radius:8px;'>\
         <h2 style='color:{color};'>{heading}</h2>{body}\
         <p style='font-size:12px;color:#666;'>Budget Tracker</p></div>"
    )
}

pub fn exceeded(
    user: &User,
    category: &str,
    month: Month,
    budget: f64,
    amount: f64,
    new_total: f64,
) -> Email {
    Email {
        to: user.email.clone(),
        subject: format!("Budget Exceeded: {category} ({month})"),
        html: card(
            "Budget Limit Exceeded",
            "#E74C3C",
            &[
                format!("Hi {},", user.display_name()),
                format!(
                    "Your <strong>{category}</strong> budget for <strong>{month}</strong> is <strong>{budget}</strong>."
                ),
                format!("Attempted expense: <strong>{amount}</strong>."),
                format!(
                    "Total if added: <strong>{new_total}</strong>, which exceeds your budget."
                ),
                "Please review before proceeding.".to_string(),
            ],
        ),
    }
}

pub fn warning(
    user: &User,
    category: &str,
    month: Month,
    used_percent: f64,
    new_total: f64,
    budget: f64,
) -> Email {
    Email {
        to: user.email.clone(),
        subject: format!("90% Budget Warning: {category} ({month})"),
        html: card(
            "Budget Usage Warning",
            "#F39C12",
            &[
                format!("Hi {},", user.display_name()),
                format!(
                    "You've used <strong>{used_percent:.2}%</strong> of your <strong>{category}</strong> budget for <strong>{month}</strong>."
                ),
                format!(
                    "Total spent: <strong>{new_total}</strong> / Budget: <strong>{budget}</strong>."
                ),
                "Be mindful of remaining funds.".to_string(),
            ],
        ),
    }
}

pub fn low_budget(user: &User, category: &str, month: Month, spent: f64, budget: f64) -> Email {
    Email {
        to: user.email.clone(),
        subject: format!("Low Budget Alert: {category} ({month})"),
        html: card(
            "Low Budget",
            "#F39C12",
            &[
                format!("Hello {},", user.display_name()),
                format!("You are close to your <strong>{category}</strong> budget for <strong>{month}</strong>."),
                format!("Spent: <strong>{spent}</strong> / Budget: <strong>{budget}</strong>."),
            ],
        ),
    }
}

pub fn over_budget(user: &User, category: &str, month: Month, spent: f64, budget: f64) -> Email {
    Email {
        to: user.email.clone(),
        subject: format!("Budget Exceeded: {category} ({month})"),
        html: card(
            "Over Budget",
            "#E74C3C",
            &[
                format!("Hello {},", user.display_name()),
                format!("You exceeded your <strong>{category}</strong> budget for <strong>{month}</strong>!"),
                format!("Budget: <strong>{budget}</strong> / Spent: <strong>{spent}</strong>."),
            ],
        ),
    }
}

pub fn split(user: &User, to: &str, category: &str, amount: f64, share: f64) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("Split Expense: {category}"),
        html: card(
            "Split Expense Notification",
            "#2E86C1",
            &[
                "Hi,".to_string(),
                format!(
                    "{} added an expense of <strong>{amount}</strong> in <strong>{category}</strong>.",
                    user.display_name()
                ),
                format!("You owe: <strong>{share}</strong>."),
            ],
        ),
    }
}

pub fn otp(to: &str, code: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Your OTP Code for Budget Tracker".to_string(),
        html: card(
            "Budget Tracker OTP",
            "#2E86C1",
            &[
                "Your signup OTP is:".to_string(),
                format!("<strong style='font-size:28px;'>{code}</strong>"),
                "This OTP expires in 5 minutes.".to_string(),
            ],
        ),
    }
}

pub fn test(to: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Test Email".to_string(),
        html: card(
            "Test Email",
            "#2E86C1",
            &["This is a test email from Budget Tracker.".to_string()],
        ),
    }
}
