//! Shared utilities for integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;

use service_pilot::catalog::CatalogProvider;
use service_pilot::{CatalogError, Endpoint};

#[allow(dead_code)]
pub fn ep(address: &str, port: u16) -> Endpoint {
    Endpoint::new(address, port)
}

/// A catalog whose answers can be changed, counted and held open.
#[allow(dead_code)]
pub struct ScriptedCatalog {
    services: Mutex<HashMap<String, Result<Vec<Endpoint>, CatalogError>>>,
    gate: watch::Sender<bool>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedCatalog {
    pub fn new() -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        Arc::new(Self {
            services: Mutex::new(HashMap::new()),
            gate,
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, service: &str, endpoints: Vec<Endpoint>) {
        self.services.lock().unwrap().insert(service.to_string(), Ok(endpoints));
    }

    pub fn fail(&self, service: &str, error: CatalogError) {
        self.services.lock().unwrap().insert(service.to_string(), Err(error));
    }

    /// Make lookups wait until `release` is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of lookups started so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` lookups have started.
    pub async fn wait_for_lookups(&self, n: usize) {
        while self.lookups() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn lookup(&self, service: &str) -> Result<Vec<Endpoint>, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        self.services
            .lock()
            .unwrap()
            .get(service)
            .cloned()
            .unwrap_or_else(|| Err(CatalogError::ServiceNotFound(service.to_string())))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Canned `(status, body)` answers keyed by request path.
#[allow(dead_code)]
pub type Routes = Arc<Mutex<HashMap<String, (u16, String)>>>;

/// JSON body for a Consul `/v1/catalog/service/<name>` response.
#[allow(dead_code)]
pub fn consul_body(endpoints: &[(&str, u16)]) -> String {
    let rows: Vec<serde_json::Value> = endpoints
        .iter()
        .map(|(addr, port)| {
            serde_json::json!({
                "Node": "node",
                "Address": "192.168.0.1",
                "ServiceAddress": addr,
                "ServicePort": port,
            })
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}

/// Start a minimal HTTP server answering from `routes`; unknown paths get 404.
#[allow(dead_code)]
pub async fn start_mock_consul(routes: Routes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let routes = routes.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    buf.extend_from_slice(&chunk[..n]);
                                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                            }
                        }

                        let request = String::from_utf8_lossy(&buf);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .split('?')
                            .next()
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = routes
                            .lock()
                            .unwrap()
                            .get(&path)
                            .cloned()
                            .unwrap_or((404, String::new()));
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
