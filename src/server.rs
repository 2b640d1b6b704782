//! HTTP trigger endpoint.
//!
//! A deliberately small HTTP surface: one `GET /create-realms`
//! endpoint whose query parameters are the run configuration, plus a
//! health probe. Requests are handled one at a time; the dataset run
//! itself is the critical section, and two concurrent runs against
//! the same prefixes would race on the index space.

use crate::orchestrator::DatasetPopulator;
use anyhow::{Context, Result};
use dataset_core::GenerationConfig;
use identity_store::{IdentityStore, RealmCache};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// The trigger server, bound but not yet serving.
pub struct TriggerServer<S> {
    listener: TcpListener,
    store: Arc<S>,
    cache: Option<Arc<dyn RealmCache>>,
}

impl<S: IdentityStore> TriggerServer<S> {
    /// Bind the listen address.
    pub fn bind(
        listen: &str,
        store: Arc<S>,
        cache: Option<Arc<dyn RealmCache>>,
    ) -> Result<Self> {
        let listener =
            TcpListener::bind(listen).with_context(|| format!("Failed to bind to {listen}"))?;
        // Non-blocking accept so the serve loop stays cancellable.
        listener
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;
        Ok(Self {
            listener,
            store,
            cache,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("No local address")
    }

    /// Accept and handle requests until the task is cancelled.
    pub async fn serve(self) -> Result<()> {
        info!(
            "Dataset trigger server listening on {}",
            self.local_addr()?
        );
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    info!("Connection from {addr}");
                    if let Err(e) = self.handle_connection(stream).await {
                        error!("Error handling connection from {addr}: {e:#}");
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(Duration::from_secs(30)))?;
        stream.set_write_timeout(Some(Duration::from_secs(30)))?;

        let request_line = {
            let buf_reader = BufReader::new(&stream);
            let mut lines = buf_reader.lines();
            let request_line = lines
                .next()
                .ok_or_else(|| anyhow::anyhow!("Empty request"))??;
            // Drain headers; the trigger is GET-only, no body.
            for line in lines {
                if line?.is_empty() {
                    break;
                }
            }
            request_line
        };

        let (status, body) = self.route(&request_line).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes())?;
        stream.flush()?;
        Ok(())
    }

    async fn route(&self, request_line: &str) -> (&'static str, String) {
        let target = request_line.split_whitespace().nth(1).unwrap_or("");

        if request_line.starts_with("GET /create-realms") {
            let query = target.splitn(2, '?').nth(1).unwrap_or("");
            let pairs = parse_query_pairs(query);
            let config = match GenerationConfig::from_query_pairs(
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ) {
                Ok(config) => config,
                Err(e) => return ("400 Bad Request", error_body(&e)),
            };

            let mut populator = DatasetPopulator::new(Arc::clone(&self.store), config);
            if let Some(cache) = &self.cache {
                populator = populator.with_cache(Arc::clone(cache));
            }
            match populator.run().await {
                Ok(summary) => {
                    info!(
                        realms = summary.realms_created,
                        users = summary.users_created,
                        "Dataset run complete"
                    );
                    ("200 OK", r#"{"status": "OK"}"#.to_string())
                }
                Err(e) if e.is_client_error() => ("400 Bad Request", error_body(&e)),
                Err(e) => {
                    error!("Dataset run failed: {e:#}");
                    ("500 Internal Server Error", error_body(&e))
                }
            }
        } else if request_line.starts_with("GET /health") {
            ("200 OK", r#"{"status":"healthy"}"#.to_string())
        } else {
            ("404 Not Found", r#"{"error":"not found"}"#.to_string())
        }
    }
}

fn error_body(err: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}

/// Split and decode an `application/x-www-form-urlencoded` query
/// string. Pairs without a value decode to an empty string.
fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = percent_decode(parts.next().unwrap_or(""));
            let value = percent_decode(parts.next().unwrap_or(""));
            (key, value)
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if let Some(hex) = s.get(i + 1..i + 3) {
                    if let Ok(byte) = u8::from_str_radix(hex, 16) {
                        out.push(byte);
                        i += 3;
                        continue;
                    }
                }
                out.push(b'%');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_pairs() {
        let pairs = parse_query_pairs("count=2&realm-prefix=perf-&users-per-realm=100");
        assert_eq!(
            pairs,
            vec![
                ("count".to_string(), "2".to_string()),
                ("realm-prefix".to_string(), "perf-".to_string()),
                ("users-per-realm".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_empty_query() {
        assert!(parse_query_pairs("").is_empty());
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(percent_decode("perf%2Drealm"), "perf-realm");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn test_valueless_pair_decodes_to_empty() {
        let pairs = parse_query_pairs("count=1&debug");
        assert_eq!(pairs[1], ("debug".to_string(), String::new()));
    }

    #[test]
    fn test_error_body_is_json() {
        let body = error_body(&"Required parameter 'count' not present");
        assert_eq!(
            body,
            r#"{"error":"Required parameter 'count' not present"}"#
        );
    }
}
