use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct DayEntry {
    date_key: String,
    holiday: Option<String>,
    crossed: bool,
    note: String,
    minutes: u32,
    timer_start: Option<i64>,
    is_timer_running: bool,
}

#[derive(Debug, Deserialize)]
struct MutationResponse {
    entry: DayEntry,
    saved: bool,
}

#[derive(Debug, Deserialize)]
struct Totals {
    weekly_minutes: u64,
    monthly_minutes: u64,
    total_minutes: u64,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    success: bool,
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
    path.push(format!("study_calendar_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/totals")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_study_calendar"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", unique_data_dir())
        .env("STUDY_SEED_DEMO", "0")
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

async fn get_day(client: &Client, server: &TestServer, date: &str) -> DayEntry {
    client
        .get(format!("{}/api/days/{date}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_json(
    client: &Client,
    url: String,
    body: serde_json::Value,
) -> MutationResponse {
    let response = client.post(url).json(&body).send().await.unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_toggle_and_minutes_update_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2030-01-15";

    let before = get_day(&client, &server, date).await;
    assert_eq!(before.date_key, date);

    let toggled: MutationResponse = client
        .post(format!("{}/api/days/{date}/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(toggled.saved);
    assert_eq!(toggled.entry.crossed, !before.crossed);

    let url = format!("{}/api/days/{date}/minutes", server.base_url);
    let add = serde_json::json!({ "action": "add", "amount": "45" });
    let added = post_json(&client, url.clone(), add).await;
    assert_eq!(added.entry.minutes, before.minutes + 45);

    let bad_amount = serde_json::json!({ "action": "add", "amount": "abc" });
    let ignored = post_json(&client, url.clone(), bad_amount).await;
    assert_eq!(ignored.entry.minutes, before.minutes + 45);

    let response = client
        .post(url)
        .json(&serde_json::json!({ "action": "multiply", "amount": "2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let after = get_day(&client, &server, date).await;
    assert_eq!(after.minutes, before.minutes + 45);
    assert_eq!(after.crossed, !before.crossed);
}

#[tokio::test]
async fn http_note_patch_and_holiday_overlay() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .patch(format!("{}/api/days/2025-12-25", server.base_url))
        .json(&serde_json::json!({ "note": "Dynamic programming" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let updated: MutationResponse = response.json().await.unwrap();
    assert_eq!(updated.entry.note, "Dynamic programming");
    assert_eq!(updated.entry.holiday.as_deref(), Some("Christmas"));

    let response = client
        .get(format!("{}/api/days/2025-13-01", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_timer_start_and_stop() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2030-02-03";
    let before = get_day(&client, &server, date).await;

    let started = post_json(
        &client,
        format!("{}/api/days/{date}/timer/start", server.base_url),
        serde_json::json!({}),
    )
    .await;
    assert!(started.entry.is_timer_running);
    assert!(started.entry.timer_start.is_some());

    let stopped = post_json(
        &client,
        format!("{}/api/days/{date}/timer/stop", server.base_url),
        serde_json::json!({}),
    )
    .await;
    assert!(!stopped.entry.is_timer_running);
    assert_eq!(stopped.entry.timer_start, None);
    assert_eq!(stopped.entry.minutes, before.minutes);
}

#[tokio::test]
async fn http_totals_include_logged_minutes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let totals_url = format!("{}/api/totals?date=2031-03-12", server.base_url);

    let before: Totals = client.get(&totals_url).send().await.unwrap().json().await.unwrap();

    post_json(
        &client,
        format!("{}/api/days/2031-03-12/minutes", server.base_url),
        serde_json::json!({ "action": "add", "amount": "30" }),
    )
    .await;

    let after: Totals = client.get(&totals_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(after.weekly_minutes, before.weekly_minutes + 30);
    assert_eq!(after.monthly_minutes, before.monthly_minutes + 30);
    assert_eq!(after.total_minutes, before.total_minutes + 30);
}

#[tokio::test]
async fn http_index_serves_calendar_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let body = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Study Calendar"));
    assert!(!body.contains("{{"));
}

#[tokio::test]
async fn http_export_import_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = spawn_server().await;
    let client = Client::new();

    post_json(
        &client,
        format!("{}/api/days/2025-06-01/minutes", server.base_url),
        serde_json::json!({ "action": "add", "amount": "75" }),
    )
    .await;

    let export = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let disposition = export
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("study-calendar-backup-"));
    let snapshot = export.text().await.unwrap();

    let failed: ImportResponse = client
        .post(format!("{}/api/import", server.base_url))
        .body("not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!failed.success);
    assert_eq!(get_day(&client, &server, "2025-06-01").await.minutes, 75);

    let replaced: ImportResponse = client
        .post(format!("{}/api/import", server.base_url))
        .body(r#"{"2025-06-09": {"crossed": true, "note": "imported", "minutes": 10}}"#)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(replaced.success);
    assert_eq!(get_day(&client, &server, "2025-06-01").await.minutes, 0);
    assert_eq!(get_day(&client, &server, "2025-06-09").await.note, "imported");

    let restored: ImportResponse = client
        .post(format!("{}/api/import", server.base_url))
        .body(snapshot.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(restored.success);
    assert_eq!(get_day(&client, &server, "2025-06-01").await.minutes, 75);

    let again = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(again, snapshot);
}
