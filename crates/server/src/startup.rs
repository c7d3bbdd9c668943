use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, CorsConfig, HospitalApiConfig, RegistryMode};
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::routes::{self, auth::ServerState};
use service::auth::{
    repo::seaorm::SeaOrmStaffRepository, repository::StaffRepository, session::SessionConfig, AuthService,
    SessionManager,
};
use service::patient::{
    registry::{FixtureRegistryClient, HttpRegistryClient, RegistryClient},
    repo::seaorm::SeaOrmPatientRepository,
    repository::PatientRepository,
    service::PatientConfig,
    PatientService,
};

/// JSON logs in production, compact lines elsewhere.
pub fn init_logging(cfg: &AppConfig) {
    if cfg.is_production() {
        init_logging_json();
    } else {
        init_logging_default();
    }
}

/// CORS from configuration; `*` in the origin list allows any origin.
pub fn build_cors(cfg: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = cfg
        .allowed_methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.trim().as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                warn!(method = %m, "ignoring invalid CORS method");
                None
            }
        })
        .collect();
    let headers: Vec<HeaderName> = cfg
        .allowed_headers
        .iter()
        .filter_map(|h| match HeaderName::from_bytes(h.trim().as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                warn!(header = %h, "ignoring invalid CORS header");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(cfg.max_age_secs));

    if cfg.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Pick the registry backend named by `hospital_api.mode`.
pub fn build_registry(cfg: &HospitalApiConfig) -> anyhow::Result<Arc<dyn RegistryClient>> {
    match cfg.mode {
        RegistryMode::Fixture => {
            info!("using fixture patient registry");
            Ok(Arc::new(FixtureRegistryClient::new()))
        }
        RegistryMode::Http => {
            let base = reqwest::Url::parse(&cfg.hospital_a_base_url)
                .with_context(|| format!("invalid hospital api base url {}", cfg.hospital_a_base_url))?;
            info!(base = %base, "using http patient registry");
            let client = HttpRegistryClient::new(base, Duration::from_secs(cfg.timeout_secs))
                .context("build registry http client")?;
            Ok(Arc::new(client))
        }
    }
}

/// Wire services over the database pool and the configured registry.
pub fn build_state(cfg: &AppConfig, db: DatabaseConnection) -> anyhow::Result<ServerState> {
    let sessions = SessionManager::new(SessionConfig::from_hours(cfg.jwt.secret.clone(), cfg.jwt.expire_hours));

    let staff_repo: Arc<dyn StaffRepository> = Arc::new(SeaOrmStaffRepository::new(db.clone()));
    let patient_repo: Arc<dyn PatientRepository> = Arc::new(SeaOrmPatientRepository::new(db));
    let registry = build_registry(&cfg.hospital_api)?;

    let patients = PatientService::with_config(
        patient_repo,
        registry,
        PatientConfig { registry_timeout: Duration::from_secs(cfg.hospital_api.timeout_secs) },
    );

    Ok(ServerState { auth: Arc::new(AuthService::new(staff_repo, sessions)), patients: Arc::new(patients) })
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.host, cfg.server.port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// Public entry: load config, then serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    init_logging(&cfg);
    serve(cfg).await
}

/// Connect, migrate, build the app and serve until Ctrl+C or SIGTERM.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    info!(environment = %cfg.environment, registry = ?cfg.hospital_api.mode, "configuration loaded");

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.context("apply migrations")?;
    info!("migrations applied");

    let state = build_state(&cfg, db)?;
    let app: Router = routes::build_router(state, build_cors(&cfg.cors));

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "hms server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
