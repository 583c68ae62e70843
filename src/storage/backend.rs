use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// SeaORM 存储后端
pub struct SeaOrmBackend {
    pub(super) db: Arc<DatabaseConnection>,
}

impl SeaOrmBackend {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}
