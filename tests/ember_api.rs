use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{self, Body},
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tower::ServiceExt; // for `oneshot`

use ember_bridge::{build_state, router, Config, ResultBundle};

// ---

/// Canned Ember API: one body per endpoint, optional forced failure.
#[derive(Clone)]
struct MockEmber {
    calls: Arc<AtomicUsize>,
    energy: Value,
    emissions: Value,
    fail_with: Option<StatusCode>,
}

impl MockEmber {
    fn new(energy: Value, emissions: Value) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            energy,
            emissions,
            fail_with: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn mock_handler(
    State(mock): State<MockEmber>,
    Path((endpoint, _period)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    // ---
    mock.calls.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = mock.fail_with {
        return (status, "upstream unavailable").into_response();
    }
    if params.get("api_key").map(String::as_str) != Some("test-key")
        || params.get("entity").map(String::as_str) != Some("Australia")
        || params.get("include_all_dates_value_range").map(String::as_str) != Some("false")
    {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match endpoint.as_str() {
        "electricity-generation" => Json(mock.energy.clone()).into_response(),
        "power-sector-emissions" => Json(mock.emissions.clone()).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_upstream(mock: MockEmber) -> Result<String> {
    // ---
    let app = Router::new()
        .route("/v1/{endpoint}/{period}", get(mock_handler))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{}", addr))
}

fn test_config(api_url: String, output_dir: Option<PathBuf>) -> Config {
    Config {
        api_key: "test-key".to_string(),
        api_url,
        port: 0,
        cache_ttl_secs: 7200,
        cache_check_period_secs: 600,
        cache_max_keys: None,
        output_dir,
    }
}

/// Ember-style response body: one row per (series, date, value).
fn rows(field: &str, series: &[(&str, &[(&str, f64)])]) -> Value {
    // ---
    let data: Vec<Value> = series
        .iter()
        .flat_map(|(name, points)| {
            points.iter().map(move |(date, value)| {
                let mut row = Map::new();
                row.insert("entity".into(), "Australia".into());
                row.insert("series".into(), (*name).into());
                row.insert("date".into(), (*date).into());
                row.insert(field.into(), (*value).into());
                Value::Object(row)
            })
        })
        .collect();

    let mut body = Map::new();
    body.insert("data".into(), Value::Array(data));
    Value::Object(body)
}

fn yearly_mock() -> MockEmber {
    MockEmber::new(
        rows(
            "generation_twh",
            &[
                ("Coal", &[("2020", 1.5), ("2021", 2.5), ("2022", 3.5)]),
                ("Solar", &[("2020", 0.5), ("2021", 0.75), ("2022", 1.25)]),
            ],
        ),
        rows(
            "emissions_mtco2",
            &[("Coal", &[("2020", 140.0), ("2021", 130.0), ("2022", 120.0)])],
        ),
    )
}

async fn get_path(app: &Router, uri: &str) -> Result<(StatusCode, header::HeaderMap, Vec<u8>)> {
    // ---
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, headers, bytes.to_vec()))
}

// ---

#[tokio::test]
async fn yearly_bundle_end_to_end() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (status, headers, body) = get_path(&app, "/v4/ember/AU/yearly.json").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );

    let bundle: ResultBundle = serde_json::from_slice(&body)?;
    assert_eq!(bundle.version, "4.1");
    assert_eq!(bundle.name, "Australia");
    assert_eq!(bundle.network, "AU");
    assert!(bundle.created_at.ends_with("+10:00"));
    assert_eq!(bundle.messages.len(), 1);

    let ids: Vec<&str> = bundle.data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["AU.coal.energy", "AU.solar.energy", "AU.coal.emissions"]);

    for record in &bundle.data[..2] {
        assert_eq!(record.units, "TWh");
        assert_eq!(record.history.interval, "1Y");
        assert_eq!(record.history.start, "2020");
        assert_eq!(record.history.last, "2022");
        assert_eq!(record.history.data.len(), 3);
    }
    assert_eq!(bundle.data[2].units, "MtCO2e");

    // Numeric arrays are folded onto one line
    let text = String::from_utf8(body)?;
    assert!(text.contains("1.5, 2.5, 3.5"), "body was {}", text);

    assert_eq!(mock.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn monthly_bundle_drops_empty_series() -> Result<()> {
    // ---
    let mock = MockEmber::new(
        rows(
            "generation_twh",
            &[(
                "Wind",
                &[("2023-11-01", 4.0), ("2023-12-01", 4.5), ("2024-01-01", 5.0)],
            )],
        ),
        rows(
            "emissions_mtco2",
            &[(
                "Other fossil",
                &[("2023-11-01", 0.0), ("2023-12-01", 0.0), ("2024-01-01", 0.0)],
            )],
        ),
    );
    let app = router(build_state(&test_config(spawn_upstream(mock).await?, None))?);

    let (status, _, body) = get_path(&app, "/v4/ember/AU/monthly.json").await?;
    assert_eq!(status, StatusCode::OK);

    let bundle: ResultBundle = serde_json::from_slice(&body)?;
    assert_eq!(bundle.data.len(), 1);

    let wind = &bundle.data[0];
    assert_eq!(wind.id, "AU.wind.energy");
    assert_eq!(wind.history.start, "2023-11");
    assert_eq!(wind.history.last, "2024-01");
    assert_eq!(wind.history.interval, "1M");
    assert_eq!(wind.history.data, vec![Some(4.0), Some(4.5), Some(5.0)]);
    Ok(())
}

#[tokio::test]
async fn invalid_period_is_not_found() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (status, _, body) = get_path(&app, "/v4/ember/AU/weekly.json").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body)?;
    assert_eq!(
        error,
        serde_json::json!({ "error": "period 'weekly' is not monthly or yearly" })
    );
    assert_eq!(mock.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn unknown_code_is_not_found() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (status, _, body) = get_path(&app, "/v4/ember/XX/yearly.json").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body)?;
    assert_eq!(
        error["error"],
        "code 'XX' does not map to a known country or region"
    );
    assert_eq!(mock.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_json_suffix_is_not_found() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (status, _, _) = get_path(&app, "/v4/ember/AU/yearly").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(mock.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn cache_hit_replays_identical_body() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (_, _, first) = get_path(&app, "/v4/ember/AU/yearly.json").await?;
    let (status, headers, second) = get_path(&app, "/v4/ember/AU/yearly.json").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(first, second);
    assert_eq!(mock.calls(), 2, "second request must not reach upstream");

    // A different query string is a different key
    get_path(&app, "/v4/ember/AU/yearly.json?v=2").await?;
    assert_eq!(mock.calls(), 4);

    let (_, _, stats) = get_path(&app, "/api/cache-stats").await?;
    let stats: Value = serde_json::from_slice(&stats)?;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 2);
    assert_eq!(stats["keys"], 2);
    assert!(stats["vsize"].as_u64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn date_gap_fails_and_is_not_cached() -> Result<()> {
    // ---
    let mock = MockEmber::new(
        rows(
            "generation_twh",
            &[("Coal", &[("2020", 1.0), ("2022", 3.0)])],
        ),
        rows("emissions_mtco2", &[]),
    );
    let app = router(build_state(&test_config(spawn_upstream(mock.clone()).await?, None))?);

    let (status, headers, body) = get_path(&app, "/v4/ember/AU/yearly.json").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Error fetching energy data");
    assert_eq!(headers.get("x-error-kind").unwrap(), "date_gap");

    // The emissions call may be cancelled mid-flight, so only require growth
    let after_first = mock.calls();
    get_path(&app, "/v4/ember/AU/yearly.json").await?;
    assert!(mock.calls() > after_first, "failed responses must not be cached");
    Ok(())
}

#[tokio::test]
async fn upstream_failure_is_internal_error() -> Result<()> {
    // ---
    let mut mock = yearly_mock();
    mock.fail_with = Some(StatusCode::SERVICE_UNAVAILABLE);
    let app = router(build_state(&test_config(spawn_upstream(mock).await?, None))?);

    let (status, headers, _) = get_path(&app, "/v4/ember/AU/yearly.json").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers.get("x-error-kind").unwrap(), "upstream");
    Ok(())
}

#[tokio::test]
async fn snapshots_written_when_enabled() -> Result<()> {
    // ---
    let dir = tempfile::TempDir::new()?;
    let mock = yearly_mock();
    let cfg = test_config(
        spawn_upstream(mock).await?,
        Some(dir.path().to_path_buf()),
    );
    let app = router(build_state(&cfg)?);

    let (status, _, _) = get_path(&app, "/v4/ember/AU/yearly.json").await?;
    assert_eq!(status, StatusCode::OK);

    assert!(dir.path().join("raw-energy-yearly/AU.json").is_file());
    assert!(dir.path().join("raw-emissions-yearly/AU.json").is_file());

    let processed = std::fs::read_to_string(dir.path().join("processed-yearly/AU.json"))?;
    let processed: Value = serde_json::from_str(&processed)?;
    assert_eq!(processed.as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn countries_and_health_endpoints() -> Result<()> {
    // ---
    let mock = yearly_mock();
    let app = router(build_state(&test_config(spawn_upstream(mock).await?, None))?);

    let (status, _, body) = get_path(&app, "/api/countries").await?;
    assert_eq!(status, StatusCode::OK);
    let countries: Vec<Value> = serde_json::from_slice(&body)?;
    assert!(countries
        .iter()
        .any(|c| c["iso"] == "AU" && c["name"] == "Australia"));

    let (status, _, body) = get_path(&app, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body)?["status"], "ok");
    Ok(())
}
