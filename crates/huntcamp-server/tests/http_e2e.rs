//! HTTP client ↔ server E2E integration tests.
//!
//! These tests start a real `huntcamp-server` in-process on a random port
//! and drive it with a real `ureq` client. The weather upstream is a second
//! in-process `tiny_http` server.

use huntcamp_server::TestServer;
use huntcamp_weather::WeatherConfig;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Barrier};

fn seed(dir: &Path) {
    fs::write(
        dir.join("stands.json"),
        r#"[
  {"id": 10, "name": "North Ridge", "occupied": false, "hunter": null, "checkInTime": null},
  {"id": 11, "name": "Creek Bottom", "occupied": false, "hunter": null, "checkInTime": null}
]"#,
    )
    .unwrap();
    fs::write(
        dir.join("hunters.json"),
        r#"[
  {"id": 1, "name": "Alex", "pin": "1234", "isAdmin": true, "currentStand": null},
  {"id": 2, "name": "Sam", "pin": "0000", "isAdmin": false, "currentStand": null}
]"#,
    )
    .unwrap();
    fs::write(dir.join("activity.json"), "[]").unwrap();
}

fn start_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let server = TestServer::start(dir.path().to_path_buf());
    (server, dir)
}

fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

fn read_response(resp: ureq::http::Response<ureq::Body>) -> (u16, Value) {
    let status = resp.status().as_u16();
    let mut body = Vec::new();
    resp.into_body().into_reader().read_to_end(&mut body).unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, value)
}

fn get(server: &TestServer, path: &str) -> (u16, Value) {
    let resp = agent().get(&format!("{}{path}", server.url)).call().unwrap();
    read_response(resp)
}

fn post(server: &TestServer, path: &str, body: &Value) -> (u16, Value) {
    let resp = agent()
        .post(&format!("{}{path}", server.url))
        .header("Content-Type", "application/json")
        .send(body.to_string())
        .unwrap();
    read_response(resp)
}

fn put(server: &TestServer, path: &str, body: &Value) -> (u16, Value) {
    let resp = agent()
        .put(&format!("{}{path}", server.url))
        .header("Content-Type", "application/json")
        .send(body.to_string())
        .unwrap();
    read_response(resp)
}

fn delete(server: &TestServer, path: &str) -> (u16, Value) {
    let resp = agent()
        .delete(&format!("{}{path}", server.url))
        .call()
        .unwrap();
    read_response(resp)
}

fn stand(server: &TestServer, id: u64) -> Value {
    let (_, stands) = get(server, "/api/stands");
    stands
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == id)
        .cloned()
        .unwrap()
}

fn hunter(server: &TestServer, id: u64) -> Value {
    let (_, hunters) = get(server, "/api/hunters");
    hunters
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["id"] == id)
        .cloned()
        .unwrap()
}

// --- Tests ---

#[test]
fn http_e2e_listings_strip_pins() {
    let (server, _dir) = start_server();
    let (status, stands) = get(&server, "/api/stands");
    assert_eq!(status, 200);
    assert_eq!(stands.as_array().unwrap().len(), 2);
    assert_eq!(stands[0]["checkInTime"], Value::Null);

    let (status, hunters) = get(&server, "/api/hunters");
    assert_eq!(status, 200);
    for h in hunters.as_array().unwrap() {
        assert!(h.get("pin").is_none(), "pin leaked: {h}");
        assert!(h.get("isAdmin").is_some());
        assert!(h.get("currentStand").is_some());
    }
}

#[test]
fn http_e2e_login() {
    let (server, _dir) = start_server();
    let (status, profile) = post(&server, "/api/login", &json!({"name": "Alex", "pin": "1234"}));
    assert_eq!(status, 200);
    assert_eq!(profile["id"], 1);
    assert_eq!(profile["isAdmin"], true);
    assert!(profile.get("pin").is_none());

    let (status, body) = post(&server, "/api/login", &json!({"name": "Alex", "pin": "0000"}));
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = post(&server, "/api/login", &json!({}));
    assert_eq!(status, 401);
}

#[test]
fn http_e2e_check_in_scenario() {
    let (server, _dir) = start_server();

    let (status, body) = post(&server, "/api/checkin", &json!({"hunterId": 1, "standId": 10}));
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["stand"]["occupied"], true);
    assert_eq!(body["stand"]["hunter"], "Alex");
    assert_eq!(body["hunter"]["currentStand"], 10);
    assert!(body["hunter"].get("pin").is_none());

    let (_, activity) = get(&server, "/api/activity");
    assert_eq!(activity.as_array().unwrap().len(), 1);
    assert_eq!(activity[0]["type"], "checkin");
    assert_eq!(activity[0]["stand"], "North Ridge");

    // Same check-in again: rejected, nothing changes, nothing logged.
    let before = stand(&server, 10);
    let (status, body) = post(&server, "/api/checkin", &json!({"hunterId": 1, "standId": 10}));
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("occupied"));
    assert_eq!(stand(&server, 10), before);
    let (_, activity) = get(&server, "/api/activity");
    assert_eq!(activity.as_array().unwrap().len(), 1);
}

#[test]
fn http_e2e_check_in_unknown_is_404() {
    let (server, _dir) = start_server();
    let (status, _) = post(&server, "/api/checkin", &json!({"hunterId": 1, "standId": 99}));
    assert_eq!(status, 404);
    let (status, _) = post(&server, "/api/checkin", &json!({"hunterId": 99, "standId": 10}));
    assert_eq!(status, 404);
}

#[test]
fn http_e2e_move_and_check_out() {
    let (server, _dir) = start_server();
    post(&server, "/api/checkin", &json!({"hunterId": 1, "standId": 10}));
    let (status, _) = post(&server, "/api/checkin", &json!({"hunterId": 1, "standId": 11}));
    assert_eq!(status, 200);
    assert_eq!(stand(&server, 10)["occupied"], false);
    assert_eq!(stand(&server, 11)["hunter"], "Alex");

    let (status, body) = post(&server, "/api/checkout", &json!({"hunterId": 1}));
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": true}));
    assert_eq!(stand(&server, 11)["occupied"], false);
    assert_eq!(stand(&server, 11)["checkInTime"], Value::Null);
    assert_eq!(hunter(&server, 1)["currentStand"], Value::Null);

    let (_, activity) = get(&server, "/api/activity");
    assert_eq!(activity[0]["type"], "checkout");
    assert_eq!(activity[0]["stand"], "Creek Bottom");

    for _ in 0..2 {
        let (status, _) = post(&server, "/api/checkout", &json!({"hunterId": 1}));
        assert_eq!(status, 400);
    }
    let (_, activity) = get(&server, "/api/activity");
    assert_eq!(activity.as_array().unwrap().len(), 3);
}

#[test]
fn http_e2e_log_events() {
    let (server, _dir) = start_server();
    let (status, _) = post(
        &server,
        "/api/log",
        &json!({"hunterId": 2, "description": "doe and two fawns"}),
    );
    assert_eq!(status, 200);
    let (status, _) = post(
        &server,
        "/api/log",
        &json!({"hunterId": 2, "type": "harvest", "description": "8 point buck"}),
    );
    assert_eq!(status, 200);

    let (status, _) = post(&server, "/api/log", &json!({"hunterId": 42, "description": "?"}));
    assert_eq!(status, 404);
    let (status, _) = post(&server, "/api/log", &json!({"hunterId": 2, "type": "checkout"}));
    assert_eq!(status, 400);

    let (_, activity) = get(&server, "/api/activity");
    assert_eq!(activity[0]["type"], "harvest");
    assert_eq!(activity[1]["type"], "sighting");
    assert_eq!(activity[1]["hunter"], "Sam");
    assert!(activity[1].get("stand").is_none());
}

#[test]
fn http_e2e_activity_is_capped_at_fifty() {
    let (server, _dir) = start_server();
    for i in 0..52 {
        post(
            &server,
            "/api/log",
            &json!({"hunterId": 1, "description": format!("deer {i}")}),
        );
    }
    let (_, activity) = get(&server, "/api/activity");
    let entries = activity.as_array().unwrap();
    assert_eq!(entries.len(), 50);
    assert_eq!(entries[0]["description"], "deer 51");
    assert_eq!(entries[49]["description"], "deer 2");
}

#[test]
fn http_e2e_admin_routes() {
    let (server, _dir) = start_server();

    let (status, body) = post(&server, "/api/admin/hunters", &json!({"name": "Jo"}));
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["hunter"]["id"], 3);
    assert_eq!(body["hunter"]["isAdmin"], false);
    let (status, _) = post(&server, "/api/login", &json!({"name": "Jo", "pin": "0000"}));
    assert_eq!(status, 200);

    let (status, _) = post(&server, "/api/admin/hunters", &json!({"pin": "1111"}));
    assert_eq!(status, 400);

    post(&server, "/api/checkin", &json!({"hunterId": 3, "standId": 11}));
    let (status, body) = delete(&server, "/api/admin/hunters/3");
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(stand(&server, 11)["occupied"], false);
    let (_, hunters) = get(&server, "/api/hunters");
    assert_eq!(hunters.as_array().unwrap().len(), 2);

    let (status, _) = delete(&server, "/api/admin/hunters/3");
    assert_eq!(status, 200);
    let (status, _) = delete(&server, "/api/admin/hunters/three");
    assert_eq!(status, 400);

    let (status, body) = put(&server, "/api/admin/stands/10", &json!({"name": "Ridge Top"}));
    assert_eq!(status, 200);
    assert_eq!(body["stand"]["name"], "Ridge Top");
    let (status, _) = put(&server, "/api/admin/stands/77", &json!({"name": "Nowhere"}));
    assert_eq!(status, 404);

    let (status, body) = post(&server, "/api/admin/stands", &json!({"name": "Oak Flat"}));
    assert_eq!(status, 200);
    assert_eq!(body["stand"]["id"], 12);

    let (status, _) = post(&server, "/api/admin/hunters", &json!({"name": "Lee"}));
    assert_eq!(status, 200);
    assert_eq!(hunter(&server, 4)["name"], "Lee");
}

#[test]
fn http_e2e_bad_requests() {
    let (server, _dir) = start_server();
    let resp = agent()
        .post(&format!("{}/api/checkin", server.url))
        .header("Content-Type", "application/json")
        .send("{not json")
        .unwrap();
    assert_eq!(read_response(resp).0, 400);

    let (status, _) = post(&server, "/api/checkin", &json!({"hunterId": "1", "standId": 10}));
    assert_eq!(status, 400);
    let (status, _) = post(&server, "/api/checkout", &json!({}));
    assert_eq!(status, 400);
    let (status, _) = get(&server, "/api/nothing-here");
    assert_eq!(status, 404);
    let (status, _) = delete(&server, "/api/stands");
    assert_eq!(status, 404);
}

#[test]
fn http_e2e_concurrent_check_ins_admit_one() {
    let (server, _dir) = start_server();
    for i in 0..6 {
        post(&server, "/api/admin/hunters", &json!({"name": format!("guest{i}")}));
    }
    let url = server.url.clone();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (1..=8)
        .map(|hunter_id| {
            let url = url.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let resp = agent()
                    .post(&format!("{url}/api/checkin"))
                    .header("Content-Type", "application/json")
                    .send(json!({"hunterId": hunter_id, "standId": 10}).to_string())
                    .unwrap();
                resp.status().as_u16()
            })
        })
        .collect();

    let statuses: Vec<u16> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 1, "{statuses:?}");
    assert!(statuses.iter().all(|s| *s == 200 || *s == 400), "{statuses:?}");

    let (_, hunters) = get(&server, "/api/hunters");
    let holders = hunters
        .as_array()
        .unwrap()
        .iter()
        .filter(|h| h["currentStand"] == 10)
        .count();
    assert_eq!(holders, 1);
}

#[test]
fn http_e2e_server_restart_persistence() {
    let data_dir = tempfile::tempdir().unwrap();
    seed(data_dir.path());

    {
        let server = TestServer::start(data_dir.path().to_path_buf());
        post(&server, "/api/checkin", &json!({"hunterId": 2, "standId": 11}));
        post(&server, "/api/admin/hunters", &json!({"name": "Jo"}));
    }

    {
        let server = TestServer::start(data_dir.path().to_path_buf());
        assert_eq!(stand(&server, 11)["hunter"], "Sam");
        assert_eq!(hunter(&server, 3)["name"], "Jo");
        let (_, activity) = get(&server, "/api/activity");
        assert_eq!(activity.as_array().unwrap().len(), 1);
    }
}

#[test]
fn http_e2e_health_cors_and_static_files() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let public = dir.path().join("public");
    fs::create_dir_all(&public).unwrap();
    fs::write(public.join("index.html"), "<h1>Camp</h1>").unwrap();
    fs::write(public.join("app.js"), "console.log(1)").unwrap();
    let server = TestServer::start(dir.path().to_path_buf());

    let (status, body) = get(&server, "/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let resp = agent().get(&format!("{}/api/stands", server.url)).call().unwrap();
    let origin = resp
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    assert_eq!(origin.as_deref(), Some("*"));

    let resp = agent().get(&format!("{}/", server.url)).call().unwrap();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
    let (status, body) = read_response(resp);
    assert_eq!(status, 200);
    assert_eq!(body, Value::String("<h1>Camp</h1>".to_owned()));

    let (status, _) = get(&server, "/app.js");
    assert_eq!(status, 200);
    let (status, _) = get(&server, "/missing.css");
    assert_eq!(status, 404);
}

struct FakeUpstream {
    url: String,
    _server: Arc<tiny_http::Server>,
}

fn start_upstream(status: u16, body: &'static str) -> FakeUpstream {
    let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
    let port = server.server_addr().to_ip().unwrap().port();
    let srv = Arc::clone(&server);
    std::thread::spawn(move || {
        for req in srv.incoming_requests() {
            let _ = req.respond(
                tiny_http::Response::from_string(body)
                    .with_status_code(tiny_http::StatusCode(status)),
            );
        }
    });
    FakeUpstream {
        url: format!("http://127.0.0.1:{port}"),
        _server: server,
    }
}

#[test]
fn http_e2e_weather_proxy() {
    let upstream = start_upstream(200, r#"{"current_condition":[{"temp_F":"34"}]}"#);
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let server = TestServer::start_with(
        dir.path().to_path_buf(),
        WeatherConfig::new(&upstream.url),
        dir.path().join("public"),
    );

    let (status, body) = get(&server, "/api/weather?location=Ely");
    assert_eq!(status, 200);
    assert_eq!(body["current_condition"][0]["temp_F"], "34");

    let (status, _) = get(&server, "/api/weather");
    assert_eq!(status, 200);

    let (status, _) = get(&server, "/api/weather?location=..%2F..%2Fadmin/x");
    assert_eq!(status, 400);
    let (status, _) = get(&server, "/api/weather?location=..%2F..%2Fadmin");
    assert_eq!(status, 400);
}

#[test]
fn http_e2e_weather_upstream_failure_is_500() {
    let upstream = start_upstream(502, "bad gateway");
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let server = TestServer::start_with(
        dir.path().to_path_buf(),
        WeatherConfig::new(&upstream.url),
        dir.path().join("public"),
    );

    let (status, body) = get(&server, "/api/weather?location=Ely");
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Weather unavailable");
}
