pub mod account;
pub mod alerts;
pub mod budget;
pub mod report;


use crate::domain::model::Month;
use crate::error::AppError;

/// Treats a missing or blank field the same way.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`required`], but hands back the value untouched.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_month(value: &str) -> Result<Month, AppError> {
    value
        .parse()
        .map_err(|err: crate::domain::model::InvalidMonth| AppError::validation(err.to_string()))
}
