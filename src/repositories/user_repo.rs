//! User repository for async database operations.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{NewUser, UpdateUser, User};

/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. Unique violations on username or email surface as
    /// `AppError::Duplicate` for the service to translate.
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(diesel::insert_into(users)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    pub async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(users
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    /// Batch lookup used to decorate listings. Missing ids are skipped.
    pub async fn find_by_ids(&self, user_ids: &[i32]) -> AppResult<Vec<User>> {
        use crate::schema::users::dsl::*;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        Ok(users
            .filter(id.eq_any(user_ids))
            .select(User::as_select())
            .load(&mut conn)
            .await?)
    }

    pub async fn find_by_username(&self, name: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(users
            .filter(username.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    /// Emails are stored lowercased, so callers pass the normalized form.
    pub async fn find_by_email(&self, user_email: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(users
            .filter(email.eq(user_email))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    pub async fn exists_by_username(&self, name: &str) -> AppResult<bool> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(diesel::select(exists(users.filter(username.eq(name))))
            .get_result(&mut conn)
            .await?)
    }

    pub async fn exists_by_email(&self, user_email: &str) -> AppResult<bool> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(diesel::select(exists(users.filter(email.eq(user_email))))
            .get_result(&mut conn)
            .await?)
    }

    /// Applies a partial update. `None` fields keep their current value.
    pub async fn update(&self, user_id: i32, changes: UpdateUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        Ok(diesel::update(users.find(user_id))
            .set(&changes)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await?)
    }
}
