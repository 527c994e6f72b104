//! Integration tests for the User repository and seeding using
//! in-memory SurrealDB.

use leadflow_core::error::LeadflowError;
use leadflow_core::models::user::{CreateUser, Role};
use leadflow_core::repository::UserRepository;
use leadflow_db::repository::SurrealUserRepository;
use leadflow_db::{SeedConfig, seed_default_users, verify_password};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leadflow_db::run_migrations(&db).await.unwrap();
    db
}

fn agent(username: &str) -> CreateUser {
    CreateUser {
        username: username.into(),
        email: Some(format!("{username}@dealer.example")),
        password: "1234".into(),
        role: Role::DealerAgent,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo.create(agent("ravi")).await.unwrap();
    assert_eq!(user.username, "ravi");
    assert_eq!(user.role, Role::DealerAgent);
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, "1234");

    let fetched = repo.get_by_username("ravi").await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email.as_deref(), Some("ravi@dealer.example"));
    assert!(verify_password("1234", &fetched.password_hash, None).unwrap());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let repo = SurrealUserRepository::new(setup().await);

    repo.create(agent("ravi")).await.unwrap();
    let err = repo.create(agent("ravi")).await.unwrap_err();
    assert!(matches!(err, LeadflowError::AlreadyExists { .. }));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);
    let err = repo.get_by_username("ghost").await.unwrap_err();
    assert!(matches!(err, LeadflowError::NotFound { .. }));
}

#[tokio::test]
async fn update_password_rehashes() {
    let repo = SurrealUserRepository::new(setup().await);
    let before = repo.create(agent("ravi")).await.unwrap();

    repo.update_password("ravi", "5678").await.unwrap();

    let after = repo.get_by_username("ravi").await.unwrap();
    assert_ne!(after.password_hash, before.password_hash);
    assert!(verify_password("5678", &after.password_hash, None).unwrap());
    assert!(!verify_password("1234", &after.password_hash, None).unwrap());
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn update_password_for_unknown_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);
    let err = repo.update_password("ghost", "5678").await.unwrap_err();
    assert!(matches!(err, LeadflowError::NotFound { .. }));
}

#[tokio::test]
async fn pepper_is_applied_when_hashing() {
    let repo = SurrealUserRepository::with_pepper(setup().await, "pepper!".into());
    let user = repo.create(agent("ravi")).await.unwrap();

    assert!(verify_password("1234", &user.password_hash, Some("pepper!")).unwrap());
    assert!(!verify_password("1234", &user.password_hash, None).unwrap());
}

#[tokio::test]
async fn seeding_creates_default_accounts_once() {
    let repo = SurrealUserRepository::new(setup().await);
    let config = SeedConfig::default();

    assert_eq!(seed_default_users(&repo, &config).await.unwrap(), 2);
    assert_eq!(repo.count().await.unwrap(), 2);

    let ho = repo.get_by_username("ho_admin").await.unwrap();
    assert_eq!(ho.role, Role::HeadOffice);
    assert!(verify_password("1234", &ho.password_hash, None).unwrap());
    let da = repo.get_by_username("da_agent").await.unwrap();
    assert_eq!(da.role, Role::DealerAgent);

    assert_eq!(seed_default_users(&repo, &config).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn seeding_backfills_missing_emails() {
    let repo = SurrealUserRepository::new(setup().await);
    seed_default_users(&repo, &SeedConfig::default())
        .await
        .unwrap();

    let config = SeedConfig {
        head_office_email: Some("ho@leadflow.example".into()),
        ..SeedConfig::default()
    };
    seed_default_users(&repo, &config).await.unwrap();

    let ho = repo.get_by_username("ho_admin").await.unwrap();
    assert_eq!(ho.email.as_deref(), Some("ho@leadflow.example"));
    let da = repo.get_by_username("da_agent").await.unwrap();
    assert_eq!(da.email, None);
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let repo = SurrealUserRepository::new(setup().await);
    let config = SeedConfig {
        enabled: false,
        ..SeedConfig::default()
    };
    assert_eq!(seed_default_users(&repo, &config).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}
