use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use churn_predictor::{
    config::{AuditConfig, Config, MetricsConfig, ModelConfig, PipelineConfig, ServerConfig},
    features::FeatureLayout,
    server,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// Scaler bounds for the 17 numeric and ordinal columns.
pub const SCALER_MIN: [f64; 17] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 6.0, -3875.0, -1107.7, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];
pub const SCALER_MAX: [f64; 17] = [
    76.0, 1.0, 2090.0, 66000.0, 64.0, 1223.38, 400.0, 4321.0, 61.0, 5192.0, 2483.5, 499.99, 6.0,
    9.0, 99.0, 99.0, 1.0,
];

pub fn coefficients() -> Vec<f64> {
    vec![
        1.42, 0.87, 0.35, -1.91, -0.64, 0.52, -1.18, 0.74, -1.27, -0.41, 0.29, -0.96, 0.21, -0.18,
        -0.33, -0.12, 0.09, 0.58, -0.47, 0.66, 0.15,
    ]
}

fn names(fields: Vec<&'static str>) -> Value {
    json!(fields)
}

/// Writes a logistic regression fitted on the grouped layout and its scaler.
pub async fn write_scaled_artifacts(dir: &TempDir) -> (String, String) {
    let model_path = dir.path().join("lr_model.json");
    let scaler_path = dir.path().join("minmax_scaler.json");

    let scaled_names: Vec<&'static str> = FeatureLayout::Grouped
        .scalable_fields()
        .into_iter()
        .map(|f| f.name())
        .collect();

    let model = json!({
        "kind": "logistic_regression",
        "feature_names": names(FeatureLayout::Grouped.column_names()),
        "coefficients": coefficients(),
        "intercept": -0.62
    });
    let scaler = json!({
        "feature_names": names(scaled_names),
        "data_min": SCALER_MIN,
        "data_max": SCALER_MAX
    });

    tokio::fs::write(&model_path, model.to_string()).await.unwrap();
    tokio::fs::write(&scaler_path, scaler.to_string())
        .await
        .unwrap();

    (
        model_path.to_string_lossy().to_string(),
        scaler_path.to_string_lossy().to_string(),
    )
}

/// Writes a small boosted-tree model over the flat, unscaled layout.
pub async fn write_tree_artifact(dir: &TempDir) -> String {
    let model_path = dir.path().join("xgboost_model.json");
    let model = json!({
        "kind": "gradient_boosted_trees",
        "feature_names": names(FeatureLayout::Flat.column_names()),
        "n_features": 21,
        "base_score": -0.3,
        "trees": [
            [
                {"type": "split", "feature": 0, "threshold": 3.0, "left": 1, "right": 2},
                {"type": "leaf", "value": -0.4},
                {"type": "leaf", "value": 0.9}
            ],
            [
                {"type": "split", "feature": 12, "threshold": 24.0, "left": 1, "right": 2},
                {"type": "leaf", "value": 0.35},
                {"type": "leaf", "value": -0.25}
            ]
        ]
    });
    tokio::fs::write(&model_path, model.to_string()).await.unwrap();
    model_path.to_string_lossy().to_string()
}

/// Create a test configuration for the scaled, audited, metered variant
pub fn create_test_config(model_path: String, scaler_path: Option<String>) -> Config {
    Config {
        server: ServerConfig::default(),
        model: ModelConfig {
            model_path,
            scaler_path: scaler_path.clone(),
        },
        pipeline: PipelineConfig {
            scaling: scaler_path.is_some(),
            non_negative: false,
        },
        audit: AuditConfig {
            enabled: true,
            database_path: ":memory:".to_string(),
        },
        metrics: MetricsConfig { enabled: true },
    }
}

/// The shipped `config.yaml` with artifact paths anchored at the crate root
/// and the audit log kept in memory.
pub fn bundled_config() -> Config {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(root.join("config.yaml")).unwrap();
    let mut config: Config = serde_yaml::from_str(&text).unwrap();

    config.model.model_path = root
        .join(&config.model.model_path)
        .to_string_lossy()
        .to_string();
    config.model.scaler_path = config
        .model
        .scaler_path
        .map(|path| root.join(path).to_string_lossy().to_string());
    config.audit.database_path = ":memory:".to_string();
    config
}

pub async fn create_test_app(config: &Config) -> Router {
    let state = server::initialize(config).await.unwrap();
    server::router(state, &config.server.cors).unwrap()
}

/// Scaled variant with default toggles, plus the temp dir holding its files.
pub async fn create_default_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let (model_path, scaler_path) = write_scaled_artifacts(&temp_dir).await;
    let config = create_test_config(model_path, Some(scaler_path));
    (create_test_app(&config).await, temp_dir)
}

pub fn valid_payload() -> Value {
    json!({
        "total_unsuccessful_calls": 5,
        "CustomerServiceInteractionRatio": 0.12,
        "MinutesOverUsage": 45.5,
        "TotalRevenueGenerated": 1820.4,
        "TotalCallFeaturesUsed": 6,
        "RetentionCalls": 1,
        "RetentionOffersAccepted": 0,
        "MadeCallToRetentionTeam": 1,
        "AdjustmentsToCreditRating": 0,
        "MonthlyRevenue": 64.99,
        "TotalRecurringCharge": 50.0,
        "OverageMinutes": 33.0,
        "MonthsInService": 28,
        "PercChangeMinutes": -18.0,
        "PercChangeRevenues": -2.4,
        "HandsetPrice": 129.99,
        "CreditRating": 2,
        "IncomeGroup": 6,
        "AgeHH1": 44,
        "AgeHH2": 40,
        "ChildrenInHH": 1
    })
}

pub fn zero_payload() -> Value {
    let mut payload = valid_payload();
    for value in payload.as_object_mut().unwrap().values_mut() {
        *value = json!(0);
    }
    payload
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    let value = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, value)
}

pub async fn predict(app: &Router, payload: Value) -> (StatusCode, Value) {
    send_json(app, "POST", "/predict", Some(payload)).await
}

/// A 200 prediction body: exactly the two keys, a probability in [0, 1]
/// and a label consistent with the 0.5 threshold.
pub fn assert_well_formed(body: &Value) {
    let probability = body["churn_probability"].as_f64().unwrap();
    let label = body["predicted_churn"].as_u64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(label, u64::from(probability > 0.5));
    assert_eq!(body.as_object().unwrap().len(), 2);
}
