use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct TodayResponse {
    intake_total: u64,
    intake_count: usize,
    urine_total: u64,
    urine_count: usize,
    net_volume: i64,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    added: usize,
    total: usize,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("aquaflow_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_aquaflow"))
        .env("PORT", port.to_string())
        .env("AQUAFLOW_DATA_DIR", unique_data_dir())
        .env_remove("AQUAFLOW_LLM_API_KEY")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_logging_intake_updates_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&json!({
            "type": "WATER",
            "intakeTypeId": "tea",
            "amount": 250,
            "timestamp": Utc::now().to_rfc3339(),
            "notes": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(created["intakeTypeId"], "tea");

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.intake_total, before.intake_total + 250);
    assert_eq!(after.intake_count, before.intake_count + 1);
    assert_eq!(after.urine_total, before.urine_total);
    assert_eq!(after.urine_count, before.urine_count);
    assert!(after.net_volume >= before.net_volume);
}

#[tokio::test]
async fn http_rejects_blank_note_and_zero_amount() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;

    for body in [
        json!({ "type": "NOTE", "amount": 0, "timestamp": Utc::now().to_rfc3339(), "notes": "  " }),
        json!({ "type": "URINE", "amount": 0, "timestamp": Utc::now().to_rfc3339(), "notes": "" }),
    ] {
        let response = client
            .post(format!("{}/api/entries", server.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.urine_count, before.urine_count);
    assert_eq!(after.intake_count, before.intake_count);
}

#[tokio::test]
async fn http_import_skips_duplicates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/import", server.base_url);

    let first: ImportResponse = client
        .post(&url)
        .json(&json!([
            { "id": "imp-a", "type": "WATER", "amount": 300, "timestamp": "2020-03-01T09:00:00Z", "notes": "" },
            { "id": "imp-b", "type": "URINE", "amount": 200, "timestamp": "2020-03-01T10:00:00Z", "notes": "", "urgency": "LOW" }
        ]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.added, 2);

    let second: ImportResponse = client
        .post(&url)
        .json(&json!([
            { "id": "imp-a", "type": "WATER", "amount": 999, "timestamp": "2020-03-02T09:00:00Z", "notes": "" },
            { "id": "imp-c", "type": "WATER", "amount": 300, "timestamp": "2020-03-01T09:00:00Z", "notes": "" }
        ]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.total, first.total);
}

#[tokio::test]
async fn http_import_with_bad_timestamp_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before: Vec<Value> = client
        .get(format!("{}/api/entries", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!([
            { "id": "bad-ts-ok", "type": "WATER", "amount": 100, "timestamp": "2018-01-01T09:00:00Z", "notes": "" },
            { "id": "bad-ts", "type": "WATER", "amount": 100, "timestamp": "not-a-date", "notes": "" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after: Vec<Value> = client
        .get(format!("{}/api/entries", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|e| e["id"] != "bad-ts-ok"));
}

#[tokio::test]
async fn http_report_and_export() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!([
            { "id": "rep-a", "type": "WATER", "amount": 500, "timestamp": "2019-06-01T12:00:00Z", "notes": "He said \"hi\"" }
        ]))
        .send()
        .await
        .unwrap();

    let report: Value = client
        .get(format!(
            "{}/api/report?start_date=2019-05-31&end_date=2019-06-02&start_time=00:00&end_time=23:59",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["daily_trend"].as_array().unwrap().len(), 3);
    assert_eq!(report["active_days"], 1);
    assert_eq!(report["day_parts"].as_array().unwrap().len(), 4);

    let inverted: Value = client
        .get(format!(
            "{}/api/report?start_date=2019-05-31&end_date=2019-06-02&start_time=10:00&end_time=09:00",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(inverted["entries"].as_array().unwrap().is_empty());

    let backwards: Value = client
        .get(format!(
            "{}/api/report?start_date=2019-06-02&end_date=2019-05-31",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(backwards["daily_trend"].as_array().unwrap().is_empty());

    for path in ["report", "report/export"] {
        let response = client
            .get(format!(
                "{}/api/{path}?start_date=-200000-01-01&end_date=200000-01-01",
                server.base_url
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let export = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let disposition = export
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("aquaflow_export_"));
    let body = export.text().await.unwrap();
    assert!(body.starts_with("Type,Intake Type,Amount (ml),Timestamp,Notes\n"));
    assert!(body.contains("\"He said \"\"hi\"\"\""));
}

#[tokio::test]
async fn http_settings_protect_sentinels_and_reorder() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/api/settings/categories/none", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let added: Value = client
        .post(format!("{}/api/settings/categories", server.base_url))
        .json(&json!({ "label": "Kefir" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let settings: Value = client
        .get(format!("{}/api/settings", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = settings["intakeCategories"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();
    assert_eq!(ids.last(), Some(&"other"));
    assert_eq!(ids[ids.len() - 2], added["id"].as_str().unwrap());

    let reordered: Value = client
        .post(format!("{}/api/settings/reorder", server.base_url))
        .json(&json!({ "list": "quick_buttons", "from": 0, "to": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let labels: Vec<&str> = reordered["quickButtons"]
        .as_array()
        .unwrap()
        .iter()
        .take(3)
        .filter_map(|b| b["label"].as_str())
        .collect();
    assert_eq!(labels, ["Big Glass", "Bottle", "Glass"]);
}

#[tokio::test]
async fn http_insights_without_key_fall_back() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/import", server.base_url))
        .json(&json!([
            { "id": "ins-a", "type": "WATER", "amount": 250, "timestamp": "2021-02-01T08:00:00Z", "notes": "" },
            { "id": "ins-b", "type": "URINE", "amount": 300, "timestamp": "2021-02-01T09:30:00Z", "notes": "" },
            { "id": "ins-c", "type": "WATER", "amount": 400, "timestamp": "2021-02-01T12:00:00Z", "notes": "" }
        ]))
        .send()
        .await
        .unwrap();

    let response: Value = client
        .post(format!("{}/api/insights", server.base_url))
        .json(&json!({ "prompt": "how am I doing?", "history": [] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        response["text"],
        "Oops! Something went wrong while talking to the AI. Please try again later."
    );
    assert!(response["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn http_calendar_rejects_invalid_month() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/calendar?year=2026&month=13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let edge = client
        .get(format!("{}/api/calendar?year=-262143&month=1", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(edge.status(), StatusCode::BAD_REQUEST);

    let month: Value = client
        .get(format!("{}/api/calendar?year=2026&month=2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(month["days"].as_array().unwrap().len() % 7, 0);
}
