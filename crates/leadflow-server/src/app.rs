//! Application state and router wiring.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use leadflow_auth::{AuthService, OtpStore, PasswordResetService};
use leadflow_db::repository::{
    SurrealChatMessageRepository, SurrealLeadModificationRepository, SurrealLeadRepository,
    SurrealUserRepository,
};
use leadflow_leads::{ChatService, DashboardService, LeadImporter, LeadService};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tower_http::cors::{Any as AnyHeader, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::middleware::access_gate;

pub type Users = SurrealUserRepository<Any>;
pub type Leads = SurrealLeadRepository<Any>;

/// The credential store, peppered when the configuration says so.
pub fn user_repository(db: Surreal<Any>, config: &ServerConfig) -> Users {
    match &config.auth.pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(db, pepper.clone()),
        None => SurrealUserRepository::new(db),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<Users>>,
    pub reset: Arc<PasswordResetService<Users>>,
    pub leads: Arc<LeadService<Leads, SurrealLeadModificationRepository<Any>>>,
    pub chat: Arc<ChatService<Leads, SurrealChatMessageRepository<Any>>>,
    pub dashboard: Arc<DashboardService<Leads>>,
    pub importer: Arc<LeadImporter<Leads>>,
    pub expose_reset_code: bool,
}

impl AppState {
    pub fn new(db: Surreal<Any>, config: &ServerConfig) -> Self {
        let users = user_repository(db.clone(), config);
        let leads = SurrealLeadRepository::new(db.clone());

        Self {
            auth: Arc::new(AuthService::new(users.clone(), config.auth.clone())),
            reset: Arc::new(PasswordResetService::new(
                users,
                Arc::new(OtpStore::new()),
                config.auth.clone(),
            )),
            leads: Arc::new(LeadService::new(
                leads.clone(),
                SurrealLeadModificationRepository::new(db.clone()),
            )),
            chat: Arc::new(ChatService::new(
                leads.clone(),
                SurrealChatMessageRepository::new(db),
            )),
            dashboard: Arc::new(DashboardService::new(leads.clone())),
            importer: Arc::new(LeadImporter::new(leads)),
            expose_reset_code: config.reset.expose_code,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AnyHeader)
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(api::auth::login))
        .route("/forgot-password", post(api::auth::forgot_password))
        .route("/verify-otp", post(api::auth::verify_otp))
        .route("/reset-password", post(api::auth::reset_password));

    Router::new()
        .route("/health", get(api::health))
        .nest("/auth", auth_routes)
        .route("/api/leads", get(api::leads::list).post(api::leads::create))
        .route("/api/leads/filter/status", get(api::leads::filter_by_status))
        .route("/api/leads/filter/city", get(api::leads::filter_by_city))
        .route("/api/leads/filter/date", get(api::leads::filter_by_date))
        .route(
            "/api/leads/:id",
            get(api::leads::get)
                .put(api::leads::update)
                .delete(api::leads::delete),
        )
        .route("/api/leads/:id/modifications", get(api::leads::modifications))
        .route(
            "/api/chat/:lead_id",
            get(api::chat::history).post(api::chat::send),
        )
        .route("/api/dashboard", get(api::dashboard::stats))
        .route("/api/upload", post(api::upload::upload))
        .fallback(api::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_gate,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(axum::middleware::map_response(
            api::envelope_payload_too_large,
        ))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
