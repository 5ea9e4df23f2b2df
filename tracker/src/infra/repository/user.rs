use crate::domain::model::{NewUser, User};
use crate::domain::repository;
use async_trait::async_trait;
use sqlx::Error::RowNotFound;
use sqlx::{Pool, Postgres, Row};

#[derive(Clone)]
pub struct PgUserRepository {
    pub pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgUserRepository { pool }
    }
}

#[async_trait]
impl repository::UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let result =
            sqlx::query("INSERT INTO users(name, email, password) VALUES ($1, $2, $3) RETURNING id")
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password)
                .fetch_one(&self.pool)
                .await?;

        Ok(User {
            id: result.get("id"),
            name: user.name,
            email: user.email,
            password: user.password,
        })
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await;
        match row {
            Ok(row) => Ok(Some(row.into())),
            Err(RowNotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, password FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await;
        match row {
            Ok(row) => Ok(Some(row.into())),
            Err(RowNotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
