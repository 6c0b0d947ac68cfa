use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::trace;

use super::{Args, Transport};

/// Talks to the desktop shell's loopback bridge over HTTP.
///
/// Each call is `POST {endpoint}` with `{"cmd": ..., "args": {...}}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    cmd: &'a str,
    args: &'a Args,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, command: &str, args: Args) -> Result<Value, Value> {
        let request = InvokeRequest {
            cmd: command,
            args: &args,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| transport_failure(&err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_failure(&err))?;
        trace!(command, status = status.as_u16(), bytes = body.len(), "Bridge responded");

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|err| {
                json!({
                    "message": format!("Bridge returned invalid JSON: {err}"),
                    "code": status.as_u16(),
                })
            });
        }

        let parsed = serde_json::from_str::<Value>(&body).ok();
        if let Some(value) = parsed.filter(|value| !value.is_null()) {
            return Err(value);
        }

        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Bridge request failed")
                .to_string()
        } else {
            body
        };
        Err(json!({
            "message": message,
            "code": status.as_u16(),
        }))
    }
}

fn transport_failure(err: &reqwest::Error) -> Value {
    let cause = if err.is_timeout() {
        Some("timeout")
    } else if err.is_connect() {
        Some("connection refused")
    } else {
        None
    };
    let mut value = json!({
        "message": format!("Bridge request failed: {err}"),
        "code": "TRANSPORT",
    });
    if let (Some(cause), Some(map)) = (cause, value.as_object_mut()) {
        map.insert("cause".to_string(), Value::String(cause.to_string()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InvocationClient;
    use crate::envelope::Envelope;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer one request with a canned response; the handle yields the request body.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/invoke", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request_body = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request_body
        });
        (url, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return String::from_utf8_lossy(&buf[end + 4..end + 4 + length]).into_owned();
            }
        }
        String::new()
    }

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_command_and_decodes_json() {
        let (url, server) = serve_once("200 OK", "application/json", r#"[{"id":1}]"#).await;
        let mut args = Args::new();
        args.insert("status".into(), json!("normal"));

        let result = transport(&url).call("get_word_books", args).await;

        assert_eq!(result, Ok(json!([{ "id": 1 }])));
        let sent: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent, json!({ "cmd": "get_word_books", "args": { "status": "normal" } }));
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let (url, _server) = serve_once("200 OK", "application/json", "").await;
        let result = transport(&url).call("clear_tts_cache", Args::new()).await;
        assert_eq!(result, Ok(Value::Null));
    }

    #[tokio::test]
    async fn json_error_body_is_passed_through() {
        let (url, _server) =
            serve_once("400 Bad Request", "application/json", r#"{"error":"bad"}"#).await;
        let result = transport(&url).call("create_word_book", Args::new()).await;
        assert_eq!(result, Err(json!({ "error": "bad" })));
    }

    #[tokio::test]
    async fn text_error_body_carries_status_code() {
        let (url, _server) = serve_once("500 Internal Server Error", "text/plain", "kaboom").await;
        let result = transport(&url).call("get_study_streak", Args::new()).await;
        assert_eq!(result, Err(json!({ "message": "kaboom", "code": 500 })));
    }

    #[tokio::test]
    async fn text_error_reduces_to_envelope_message() {
        let (url, _server) = serve_once("500 Internal Server Error", "text/plain", "kaboom").await;
        let client = InvocationClient::with_transport(transport(&url));
        let envelope = client.invoke_raw("get_study_streak", Args::new()).await;
        assert_eq!(envelope, Envelope::failure("kaboom [code: 500]"));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/invoke", listener.local_addr().unwrap());
        drop(listener);

        let err = transport(&url)
            .call("get_study_streak", Args::new())
            .await
            .unwrap_err();
        assert_eq!(err["code"], json!("TRANSPORT"));
        assert_eq!(err["cause"], json!("connection refused"));
        assert!(
            err["message"]
                .as_str()
                .unwrap()
                .starts_with("Bridge request failed")
        );
    }
}
