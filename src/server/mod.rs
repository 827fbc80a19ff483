pub mod handlers;
pub mod types;

use crate::{
    Error, Result,
    audit::AuditLog,
    config::{Config, CorsConfig},
    metrics::PredictionMetrics,
    predictor::Predictor,
    schema::ValidationRules,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Loads artifacts and opens the audit store. Any error here means the
/// service never becomes ready.
pub async fn initialize(config: &Config) -> Result<AppState> {
    let predictor = Predictor::load(&config.model, &config.pipeline).await?;

    let audit = if config.audit.enabled {
        let db_path = &config.audit.database_path;
        let audit = AuditLog::new(db_path)
            .await
            .map_err(|e| Error::startup(format!("audit database {}: {}", db_path, e)))?;
        Some(Arc::new(audit))
    } else {
        None
    };

    let metrics = if config.metrics.enabled {
        Some(PredictionMetrics::new()?)
    } else {
        None
    };

    info!(
        scaling = config.pipeline.scaling,
        non_negative = config.pipeline.non_negative,
        audit = config.audit.enabled,
        metrics = config.metrics.enabled,
        "Prediction pipeline ready"
    );

    Ok(AppState {
        predictor: Arc::new(predictor),
        rules: ValidationRules {
            non_negative: config.pipeline.non_negative,
        },
        audit,
        metrics,
    })
}

pub fn router(state: AppState, cors: &CorsConfig) -> Result<Router> {
    let mut app = Router::new().route("/predict", post(handlers::predict));

    if state.audit.is_some() {
        app = app.route("/model_predictions", get(handlers::model_predictions));
    }
    if state.metrics.is_some() {
        app = app.route("/metrics", get(handlers::export_metrics));
    }

    Ok(app
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer> {
    let origins = cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::config(format!("Invalid CORS origin: '{}'", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub async fn run(config: Config) -> Result<()> {
    let state = initialize(&config).await?;
    let app = router(state, &config.server.cors)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
