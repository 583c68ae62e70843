use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use crate::errors::AppError;
use crate::storage::entities::{prelude::*, *};
use crate::storage::repository::*;

use super::super::backend::SeaOrmBackend;

#[async_trait]
impl UserRepository for SeaOrmBackend {
    async fn create(&self, user: NewUser<'_>) -> Result<users::Model, AppError> {
        let now = Utc::now();
        let user = users::ActiveModel {
            username: Set(user.username.to_string()),
            email: Set(user.email.to_string()),
            password_hash: Set(user.password_hash.to_string()),
            role: Set(user.role.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = user.insert(self.db.as_ref()).await?;
        Ok(result)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, AppError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    async fn count_by_role(&self, role: &str) -> Result<u64, AppError> {
        let count = Users::find()
            .filter(users::Column::Role.eq(role))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
