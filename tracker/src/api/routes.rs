pub mod alerts;
pub mod auth;
pub mod budget;
pub mod report;
pub mod users;
