//! Integration tests for the authentication service.

use leadflow_auth::config::AuthConfig;
use leadflow_auth::service::{AuthService, LoginInput};
use leadflow_auth::token;
use leadflow_core::error::LeadflowError;
use leadflow_core::models::user::{CreateUser, Role};
use leadflow_core::repository::UserRepository;
use leadflow_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".into(),
        jwt_issuer: "leadflow-test".into(),
        ..AuthConfig::default()
    }
}

async fn setup() -> SurrealUserRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leadflow_db::run_migrations(&db).await.unwrap();

    let repo = SurrealUserRepository::new(db);
    repo.create(CreateUser {
        username: "ho_admin".into(),
        email: Some("ho@leadflow.example".into()),
        password: "1234".into(),
        role: Role::HeadOffice,
    })
    .await
    .unwrap();
    repo
}

fn login(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn login_issues_token_for_subject() {
    let config = test_config();
    let service = AuthService::new(setup().await, config.clone());

    let output = service.login(login("ho_admin", "1234")).await.unwrap();
    assert_eq!(output.username, "ho_admin");
    assert_eq!(output.role, Role::HeadOffice);
    assert_eq!(output.expires_in, 1800);
    assert_eq!(
        token::verify_access_token(&output.token, &config).unwrap(),
        "ho_admin"
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_alike() {
    let service = AuthService::new(setup().await, test_config());

    let bad_password = service.login(login("ho_admin", "wrong")).await.unwrap_err();
    let unknown_user = service.login(login("ghost", "1234")).await.unwrap_err();

    match (bad_password, unknown_user) {
        (
            LeadflowError::AuthenticationFailed { reason: a },
            LeadflowError::AuthenticationFailed { reason: b },
        ) => assert_eq!(a, b),
        other => panic!("expected two authentication failures, got {other:?}"),
    }
}

#[tokio::test]
async fn authenticate_resolves_identity() {
    let service = AuthService::new(setup().await, test_config());
    let output = service.login(login("ho_admin", "1234")).await.unwrap();

    let identity = service.authenticate(&output.token).await.unwrap();
    assert_eq!(identity.username, "ho_admin");
    assert_eq!(identity.role, Role::HeadOffice);
}

#[tokio::test]
async fn token_for_unknown_subject_is_rejected() {
    let config = test_config();
    let service = AuthService::new(setup().await, config.clone());

    let orphan = token::issue_access_token("removed_user", &config).unwrap();
    assert!(matches!(
        service.authenticate(&orphan).await,
        Err(LeadflowError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let service = AuthService::new(setup().await, test_config());
    assert!(matches!(
        service.authenticate("garbage").await,
        Err(LeadflowError::AuthenticationFailed { .. })
    ));
}
