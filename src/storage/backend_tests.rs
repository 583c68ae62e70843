#[cfg(test)]
mod tests {
    use super::super::backend::SeaOrmBackend;
    use crate::config::AdminConfig;
    use crate::security::PasswordManager;
    use crate::services::{AdminSeeder, Seeder, SettingsService, default_settings};
    use crate::storage::entities::users::ROLE_ADMIN;
    use crate::storage::{
        NewUser, SettingValue, SettingsRepository, UserRepository, create_domain_tables,
    };
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::Arc;

    /// 创建测试用的内存数据库
    async fn setup_test_db() -> Arc<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        create_domain_tables(&db)
            .await
            .expect("Failed to create domain tables");

        Arc::new(db)
    }

    fn admin_config(password: Option<&str>) -> AdminConfig {
        AdminConfig {
            username: "root".into(),
            email: "root@example.com".into(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_domain_tables_is_idempotent() {
        let db = setup_test_db().await;
        create_domain_tables(&db)
            .await
            .expect("Second table creation should be a no-op");
    }

    #[tokio::test]
    async fn test_settings_seed_is_idempotent() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));
        let service = SettingsService::new(backend.clone());
        let total = default_settings().len();

        let first = service.seed().await.expect("First seed failed");
        assert_eq!(first.created, total);
        assert_eq!(first.skipped, 0);

        let second = service.seed().await.expect("Second seed failed");
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, total);

        let row = backend
            .find_setting("publish_batch_size")
            .await
            .unwrap()
            .expect("Setting should exist");
        assert_eq!(row.value_type, "int");
        assert_eq!(row.value_int, Some(20));
    }

    #[tokio::test]
    async fn test_settings_seed_keeps_existing_values() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));
        backend
            .insert_setting("site_name", &SettingValue::String("Custom".into()), None)
            .await
            .unwrap();

        let outcome = SettingsService::new(backend.clone()).seed().await.unwrap();
        assert_eq!(outcome.skipped, 1);

        let row = backend.find_setting("site_name").await.unwrap().unwrap();
        assert_eq!(row.value_string.as_deref(), Some("Custom"));
    }

    #[tokio::test]
    async fn test_admin_seed_is_idempotent() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));
        let seeder = AdminSeeder::new(backend.clone(), admin_config(Some("correct-horse")));

        let first = seeder.seed().await.expect("First seed failed");
        assert_eq!(first.created, 1);

        let second = seeder.seed().await.expect("Second seed failed");
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 1);

        assert_eq!(backend.count_by_role(ROLE_ADMIN).await.unwrap(), 1);

        let admin = backend.find_by_username("root").await.unwrap().unwrap();
        assert_eq!(admin.role, ROLE_ADMIN);
        assert!(PasswordManager::verify_password("correct-horse", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_admin_seed_skips_when_any_admin_exists() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));
        backend
            .create(NewUser {
                username: "existing",
                email: "existing@example.com",
                password_hash: "hash",
                role: ROLE_ADMIN,
            })
            .await
            .unwrap();

        let outcome = AdminSeeder::new(backend.clone(), admin_config(None))
            .seed()
            .await
            .unwrap();
        assert_eq!(outcome.created, 0);
        assert!(backend.find_by_username("root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_seed_generates_password() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));

        let outcome = AdminSeeder::new(backend.clone(), admin_config(None))
            .seed()
            .await
            .unwrap();
        assert_eq!(outcome.created, 1);

        let admin = backend.find_by_username("root").await.unwrap().unwrap();
        assert!(admin.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_admin_seed_rejects_taken_username() {
        let db = setup_test_db().await;
        let backend = Arc::new(SeaOrmBackend::new(db));
        backend
            .create(NewUser {
                username: "root",
                email: "someone@example.com",
                password_hash: "hash",
                role: "user",
            })
            .await
            .unwrap();

        let result = AdminSeeder::new(backend, admin_config(Some("correct-horse")))
            .seed()
            .await;
        assert!(result.is_err());
    }
}
