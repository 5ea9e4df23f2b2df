use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl User {
    /// Name used in email greetings.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

impl From<PgRow> for User {
    fn from(row: PgRow) -> Self {
        User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password: row.get("password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Month must be YYYY-MM")]
pub struct InvalidMonth;

/// A calendar month, written `YYYY-MM`. Backed by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Month> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    pub fn of(date: NaiveDate) -> Month {
        Month(date.with_day(1).unwrap_or(date))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Exclusive upper bound of the month.
    pub fn next_first_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn name(&self) -> &'static str {
        u8::try_from(self.0.month())
            .ok()
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map_or("", |m| m.name())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date < self.next_first_day()
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let digits = |range: &[u8]| range.iter().all(u8::is_ascii_digit);
        if bytes.len() != 7 || bytes[4] != b'-' || !digits(&bytes[..4]) || !digits(&bytes[5..]) {
            return Err(InvalidMonth);
        }
        let year: i32 = s[..4].parse().map_err(|_| InvalidMonth)?;
        let month: u32 = s[5..].parse().map_err(|_| InvalidMonth)?;
        Month::new(year, month).ok_or(InvalidMonth)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses an expense date, strictly `YYYY-MM-DD`.
pub fn parse_expense_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub month: Month,
    pub amount: f64,
    pub low_budget_percent: Option<i32>,
}

impl TryFrom<PgRow> for Budget {
    type Error = anyhow::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        let month: String = row.try_get("month")?;
        Ok(Budget {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            category: row.try_get("category")?,
            month: month.parse()?,
            amount: row.try_get("amount")?,
            low_budget_percent: row.try_get("low_budget_percent")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub user_id: i64,
    pub category: String,
    pub month: Month,
    pub amount: f64,
    pub low_budget_percent: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub amount: f64,
    #[sqlx(rename = "spent_on")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: i64,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}
