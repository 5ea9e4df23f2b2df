pub mod g_oauth;
pub mod jwt;
pub mod password;
