//! HTTP server library for the hunting camp dashboard.
//!
//! Serves the JSON API under `/api/`, a `/health` probe, and the dashboard's
//! static files from a public directory. State lives in a [`Camp`] data
//! directory; weather is proxied through a [`WeatherClient`].
//!
//! The [`TestServer`] helper starts a server on a random port for integration testing.

pub mod api;
pub mod config;
pub mod static_files;

pub use config::ServerConfig;

use huntcamp_core::{Camp, CoreError};
use huntcamp_weather::{WeatherClient, WeatherConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, error, info};

/// How long a worker waits for a request before re-checking for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("camp error: {0}")]
    Camp(#[from] CoreError),
}

/// Everything a request handler needs.
pub struct App {
    pub camp: Camp,
    pub weather: WeatherClient,
    pub public_dir: PathBuf,
}

impl App {
    pub fn new(camp: Camp, weather: WeatherClient, public_dir: PathBuf) -> Self {
        Self {
            camp,
            weather,
            public_dir,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let camp = Camp::open(&config.data_dir)?;
        let weather = WeatherClient::new(config.weather.clone());
        Ok(Self::new(camp, weather, config.public_dir.clone()))
    }
}

/// A fully built response, independent of the request it answers.
#[derive(Debug)]
pub struct Reply {
    pub(crate) status: u16,
    content_type: Option<&'static str>,
    pub(crate) body: Vec<u8>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl Reply {
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::raw_json(status, body),
            Err(e) => {
                error!("failed to serialize response: {e}");
                Self::error(500, "internal error")
            }
        }
    }

    pub fn raw_json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorBody { error: message })
            .unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
        Self::raw_json(status, body)
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn file(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type),
            body,
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        let mut headers = vec![
            ("Access-Control-Allow-Origin", "*"),
            (
                "Access-Control-Allow-Methods",
                "GET, POST, PUT, DELETE, OPTIONS",
            ),
            ("Access-Control-Allow-Headers", "Content-Type"),
        ];
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type", content_type));
        }
        for (name, value) in headers {
            if let Ok(header) = Header::from_bytes(name, value) {
                response.add_header(header);
            }
        }
        response
    }
}

fn read_body(req: &mut tiny_http::Request) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    if req.as_reader().read_to_end(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

fn serve_static(app: &App, method: &Method, path: &str) -> Reply {
    if !matches!(*method, Method::Get | Method::Head) {
        return Reply::error(405, "method not allowed");
    }
    let Some(file) = static_files::resolve(&app.public_dir, path) else {
        return Reply::error(404, "not found");
    };
    match std::fs::read(&file) {
        Ok(data) => Reply::file(static_files::content_type(&file), data),
        Err(e) => {
            error!("reading {}: {e}", file.display());
            Reply::error(500, "read error")
        }
    }
}

/// Handle a single HTTP request, dispatching to the appropriate route handler.
pub fn handle_request(app: &App, mut req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let reply = if method == Method::Options {
        Reply::empty(204)
    } else if path.starts_with("/api/") {
        match read_body(&mut req) {
            Some(body) => api::route(app, &method, path, query, &body),
            None => Reply::error(400, "unreadable request body"),
        }
    } else if path == "/health" && method == Method::Get {
        Reply::raw_json(200, br#"{"status":"ok"}"#.to_vec())
    } else {
        serve_static(app, &method, path)
    };

    debug!("{method} {url} -> {}", reply.status);
    let _ = req.respond(reply.into_response());
}

pub fn bind(addr: &str) -> Result<Arc<Server>, ServerError> {
    Server::http(addr)
        .map(Arc::new)
        .map_err(|e| ServerError::Bind {
            addr: addr.to_owned(),
            message: e.to_string(),
        })
}

/// Start `workers` threads pulling requests from `server` until `shutdown` is set.
pub fn spawn_workers(
    app: &Arc<App>,
    server: &Arc<Server>,
    workers: usize,
    shutdown: &Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    (0..workers.max(1))
        .map(|worker| {
            let app = Arc::clone(app);
            let server = Arc::clone(server);
            let shutdown = Arc::clone(shutdown);
            std::thread::spawn(move || {
                while !shutdown.load(Ordering::SeqCst) {
                    match server.recv_timeout(POLL_INTERVAL) {
                        Ok(Some(request)) => handle_request(&app, request),
                        Ok(None) => {}
                        Err(e) => {
                            error!("worker {worker}: accept failed: {e}");
                            break;
                        }
                    }
                }
                debug!("worker {worker} stopped");
            })
        })
        .collect()
}

/// Bind and serve until `shutdown` is set, blocking the current thread.
pub fn run_server(
    app: &Arc<App>,
    addr: &str,
    workers: usize,
    shutdown: &Arc<AtomicBool>,
) -> Result<(), ServerError> {
    let server = bind(addr)?;
    info!("listening on {addr} with {workers} workers");
    for handle in spawn_workers(app, &server, workers, shutdown) {
        let _ = handle.join();
    }
    info!("server stopped");
    Ok(())
}

/// A test helper that starts a huntcamp-server on a random port in background threads.
///
/// The server listens on `127.0.0.1:{port}` and stores data in the provided `data_dir`.
/// Drop the `TestServer` to stop the workers.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    pub data_dir: PathBuf,
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl TestServer {
    /// Start a test server with the given data directory and the default
    /// weather upstream.
    pub fn start(data_dir: PathBuf) -> Self {
        let public_dir = data_dir.join("public");
        Self::start_with(data_dir, WeatherConfig::default(), public_dir)
    }

    /// Start a test server with explicit weather settings and public directory.
    /// Binds to `127.0.0.1:0` (random port).
    pub fn start_with(data_dir: PathBuf, weather: WeatherConfig, public_dir: PathBuf) -> Self {
        let camp = Camp::open(&data_dir).expect("failed to open test camp");
        let app = Arc::new(App::new(camp, WeatherClient::new(weather), public_dir));
        let server = bind("127.0.0.1:0").expect("failed to bind test HTTP server");
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let shutdown = Arc::new(AtomicBool::new(false));
        let handles = spawn_workers(&app, &server, 4, &shutdown);

        Self {
            url,
            port,
            data_dir,
            shutdown,
            handles,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
