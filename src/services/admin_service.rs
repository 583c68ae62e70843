use async_trait::async_trait;
use std::sync::Arc;

use super::{SeedOutcome, Seeder};
use crate::config::AdminConfig;
use crate::errors::AppError;
use crate::security::{PasswordManager, generate_initial_password};
use crate::storage::entities::users::ROLE_ADMIN;
use crate::storage::{NewUser, SeaOrmBackend, UserRepository};

/// 初始管理员写入服务
///
/// 只要已有任意 `admin` 角色的账号就跳过。未配置密码时生成随机密码，
/// 在终端输出一次。
pub struct AdminSeeder {
    storage: Arc<SeaOrmBackend>,
    config: AdminConfig,
}

impl AdminSeeder {
    pub fn new(storage: Arc<SeaOrmBackend>, config: AdminConfig) -> Self {
        Self { storage, config }
    }
}

#[async_trait]
impl Seeder for AdminSeeder {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn seed(&self) -> Result<SeedOutcome, AppError> {
        let existing = self.storage.count_by_role(ROLE_ADMIN).await?;
        if existing > 0 {
            tracing::info!(count = existing, "Administrator already exists, skipping");
            return Ok(SeedOutcome {
                created: 0,
                skipped: 1,
            });
        }

        if self
            .storage
            .find_by_username(&self.config.username)
            .await?
            .is_some()
        {
            return Err(AppError::Seed {
                step: "admin",
                message: format!(
                    "username '{}' is taken by a non-admin account",
                    self.config.username
                ),
            });
        }

        let (password, generated) = match &self.config.password {
            Some(password) => (password.clone(), false),
            None => (generate_initial_password(), true),
        };
        let password_hash = PasswordManager::hash_password(&password)?;

        let user = self
            .storage
            .create(NewUser {
                username: &self.config.username,
                email: &self.config.email,
                password_hash: &password_hash,
                role: ROLE_ADMIN,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "Administrator created");

        if generated {
            use colored::Colorize;
            tracing::warn!(
                username = %user.username,
                "No admin password configured, a random one was generated"
            );
            println!(
                "{} {} / {}",
                "Initial administrator:".yellow().bold(),
                user.username,
                password.bold()
            );
            println!("{}", "This password is shown only once.".yellow());
        }

        Ok(SeedOutcome {
            created: 1,
            skipped: 0,
        })
    }
}
