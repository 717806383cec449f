//! Account lookups for the authenticated caller.

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::{UserRepository, VendorRepository};

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    vendors: VendorRepository,
}

impl UserService {
    pub fn new(users: UserRepository, vendors: VendorRepository) -> Self {
        Self { users, vendors }
    }

    /// Gets a user by id, or `NotFound`.
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", "id", id))
    }

    /// Loads the principal behind a token. Missing and deactivated accounts
    /// are both reported as `Unauthorized`.
    pub async fn get_active_user(&self, id: i32) -> AppResult<User> {
        match self.users.find_by_id(id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::unauthorized("Account is disabled")),
            None => Err(AppError::unauthorized("Account no longer exists")),
        }
    }

    /// The user plus the id of their vendor profile, if they own one.
    pub async fn get_profile(&self, id: i32) -> AppResult<(User, Option<i32>)> {
        let user = self.get_user(id).await?;
        let vendor_id = self.vendors.find_by_user_id(user.id).await?.map(|v| v.id);
        Ok((user, vendor_id))
    }
}
