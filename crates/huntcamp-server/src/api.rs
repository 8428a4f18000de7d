//! JSON routes under `/api/`.

use crate::{App, Reply};
use huntcamp_core::{CoreError, ErrorKind, NewHunter, RECENT_LIMIT};
use huntcamp_store::{HunterProfile, Stand};
use huntcamp_weather::WeatherError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tiny_http::Method;
use tracing::{error, warn};

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pin: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInRequest {
    hunter_id: u32,
    stand_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutRequest {
    hunter_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogRequest {
    hunter_id: u32,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddHunterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pin: Option<String>,
    #[serde(default)]
    is_admin: Option<bool>,
}

#[derive(Deserialize)]
struct NameRequest {
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
struct Success {
    success: bool,
}

#[derive(Serialize)]
struct CheckInResponse<'a> {
    success: bool,
    stand: &'a Stand,
    hunter: &'a HunterProfile,
}

#[derive(Serialize)]
struct HunterResponse<'a> {
    success: bool,
    hunter: &'a HunterProfile,
}

#[derive(Serialize)]
struct StandResponse<'a> {
    success: bool,
    stand: &'a Stand,
}

const SUCCESS: Success = Success { success: true };

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Reply> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("rejecting request body: {e}");
        Reply::error(400, "invalid request body")
    })
}

fn parse_id(raw: &str) -> Result<u32, Reply> {
    raw.parse()
        .map_err(|_| Reply::error(400, &format!("invalid id '{raw}'")))
}

/// Map a domain error to a response. Storage failures are logged in full
/// and answered with `failure` only.
fn core_error(err: &CoreError, failure: &str) -> Reply {
    match err.kind() {
        ErrorKind::NotFound => Reply::error(404, &err.to_string()),
        ErrorKind::Conflict | ErrorKind::Validation => Reply::error(400, &err.to_string()),
        ErrorKind::Unauthorized => Reply::error(401, "Invalid credentials"),
        ErrorKind::Storage => {
            error!("{failure}: {err}");
            Reply::error(500, failure)
        }
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Dispatch one `/api/*` request.
pub fn route(app: &App, method: &Method, path: &str, query: &str, body: &[u8]) -> Reply {
    if let Some(raw) = path.strip_prefix("/api/admin/hunters/") {
        return match *method {
            Method::Delete => match parse_id(raw) {
                Ok(id) => remove_hunter(app, id),
                Err(reply) => reply,
            },
            _ => Reply::error(405, "method not allowed"),
        };
    }
    if let Some(raw) = path.strip_prefix("/api/admin/stands/") {
        return match *method {
            Method::Put => match parse_id(raw) {
                Ok(id) => rename_stand(app, id, body),
                Err(reply) => reply,
            },
            _ => Reply::error(405, "method not allowed"),
        };
    }

    let result = match (method, path) {
        (Method::Get, "/api/stands") => Ok(list_stands(app)),
        (Method::Get, "/api/hunters") => Ok(list_hunters(app)),
        (Method::Post, "/api/login") => parse_body(body).map(|r| login(app, &r)),
        (Method::Post, "/api/checkin") => parse_body(body).map(|r| check_in(app, &r)),
        (Method::Post, "/api/checkout") => parse_body(body).map(|r| check_out(app, &r)),
        (Method::Get, "/api/activity") => Ok(activity(app)),
        (Method::Post, "/api/log") => parse_body(body).map(|r| log_event(app, &r)),
        (Method::Post, "/api/admin/hunters") => parse_body(body).map(|r| add_hunter(app, r)),
        (Method::Post, "/api/admin/stands") => parse_body(body).map(|r| add_stand(app, &r)),
        (Method::Get, "/api/weather") => Ok(weather(app, query_param(query, "location"))),
        _ => Err(Reply::error(404, "not found")),
    };
    result.unwrap_or_else(|reply| reply)
}

fn list_stands(app: &App) -> Reply {
    match app.camp.stands() {
        Ok(stands) => Reply::json(200, &stands),
        Err(e) => core_error(&e, "Failed to load stands"),
    }
}

fn list_hunters(app: &App) -> Reply {
    match app.camp.hunters() {
        Ok(hunters) => Reply::json(200, &hunters),
        Err(e) => core_error(&e, "Failed to load hunters"),
    }
}

fn login(app: &App, req: &LoginRequest) -> Reply {
    match app.camp.login(&req.name, &req.pin) {
        Ok(profile) => Reply::json(200, &profile),
        Err(e) => core_error(&e, "Login failed"),
    }
}

fn check_in(app: &App, req: &CheckInRequest) -> Reply {
    match app.camp.check_in(req.hunter_id, req.stand_id) {
        Ok(result) => Reply::json(
            200,
            &CheckInResponse {
                success: true,
                stand: &result.stand,
                hunter: &result.hunter,
            },
        ),
        Err(e) => core_error(&e, "Check-in failed"),
    }
}

fn check_out(app: &App, req: &CheckOutRequest) -> Reply {
    match app.camp.check_out(req.hunter_id) {
        Ok(_) => Reply::json(200, &SUCCESS),
        Err(e) => core_error(&e, "Check-out failed"),
    }
}

fn activity(app: &App) -> Reply {
    match app.camp.recent_activity(RECENT_LIMIT) {
        Ok(entries) => Reply::json(200, &entries),
        Err(e) => core_error(&e, "Failed to load activity"),
    }
}

fn log_event(app: &App, req: &LogRequest) -> Reply {
    match app
        .camp
        .log_event(req.hunter_id, req.kind.as_deref(), req.description.as_deref())
    {
        Ok(_) => Reply::json(200, &SUCCESS),
        Err(e) => core_error(&e, "Failed to log activity"),
    }
}

fn add_hunter(app: &App, req: AddHunterRequest) -> Reply {
    let new = NewHunter {
        name: req.name,
        pin: req.pin,
        is_admin: req.is_admin,
    };
    match app.camp.add_hunter(new) {
        Ok(hunter) => Reply::json(
            200,
            &HunterResponse {
                success: true,
                hunter: &hunter,
            },
        ),
        Err(e) => core_error(&e, "Failed to add hunter"),
    }
}

fn remove_hunter(app: &App, id: u32) -> Reply {
    match app.camp.remove_hunter(id) {
        Ok(_) => Reply::json(200, &SUCCESS),
        Err(e) => core_error(&e, "Failed to remove hunter"),
    }
}

fn rename_stand(app: &App, id: u32, body: &[u8]) -> Reply {
    let req: NameRequest = match parse_body(body) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    match app.camp.rename_stand(id, &req.name) {
        Ok(stand) => Reply::json(
            200,
            &StandResponse {
                success: true,
                stand: &stand,
            },
        ),
        Err(e) => core_error(&e, "Failed to update stand"),
    }
}

fn add_stand(app: &App, req: &NameRequest) -> Reply {
    match app.camp.add_stand(&req.name) {
        Ok(stand) => Reply::json(
            200,
            &StandResponse {
                success: true,
                stand: &stand,
            },
        ),
        Err(e) => core_error(&e, "Failed to add stand"),
    }
}

fn weather(app: &App, location: Option<&str>) -> Reply {
    match app.weather.fetch(location) {
        Ok(body) => Reply::raw_json(200, body),
        Err(WeatherError::InvalidLocation(msg)) => {
            Reply::error(400, &format!("invalid location: {msg}"))
        }
        Err(e) => {
            error!("weather proxy: {e}");
            Reply::error(500, "Weather unavailable")
        }
    }
}
