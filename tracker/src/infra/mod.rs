pub mod auth;
pub mod db;
pub mod mail;
pub mod otp;
pub mod repository;
