pub mod budget;
pub mod expense;
pub mod user;

pub use budget::PgBudgetRepository;
pub use expense::PgExpenseRepository;
pub use user::PgUserRepository;
