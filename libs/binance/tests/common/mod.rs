//! Shared helpers: an in-process mock exchange (stream endpoint plus the
//! minimal REST surface the listen-key flow needs) and recording callbacks.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use binance_client::{BinanceError, Result, StreamCallback, StreamEvent, StreamHandler};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Mock combined-stream endpoint.
///
/// Accepts one connection at a time, records every command frame, and by
/// default replies to each with `{"result": ..., "id": ...}`, tracking a
/// per-connection subscription set so `LIST_SUBSCRIPTIONS` answers
/// faithfully. Tests can mute the auto-reply and push arbitrary frames.
pub struct MockExchange {
    url: String,
    commands: Arc<Mutex<Vec<Value>>>,
    auto_reply: Arc<AtomicBool>,
    connections: Arc<AtomicUsize>,
    push_tx: mpsc::UnboundedSender<String>,
}

impl MockExchange {
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// All command frames received so far, across connections.
    pub fn commands(&self) -> Vec<Value> {
        self.commands.lock().clone()
    }

    pub fn command_ids(&self) -> Vec<u64> {
        self.commands()
            .iter()
            .filter_map(|c| c.get("id").and_then(Value::as_u64))
            .collect()
    }

    pub fn count_method(&self, method: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.get("method").and_then(Value::as_str) == Some(method))
            .count()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Acquire)
    }

    /// Stop answering commands; pending senders will time out.
    pub fn mute(&self) {
        self.auto_reply.store(false, Ordering::Release);
    }

    pub fn unmute(&self) {
        self.auto_reply.store(true, Ordering::Release);
    }

    /// Send a raw frame to the connected client.
    pub fn push(&self, frame: impl Into<String>) {
        self.push_tx
            .send(frame.into())
            .expect("mock exchange task gone");
    }
}

pub async fn spawn_mock_exchange() -> MockExchange {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let commands = Arc::new(Mutex::new(Vec::new()));
    let auto_reply = Arc::new(AtomicBool::new(true));
    let connections = Arc::new(AtomicUsize::new(0));
    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<String>();

    {
        let commands = Arc::clone(&commands);
        let auto_reply = Arc::clone(&auto_reply);
        let connections = Arc::clone(&connections);
        tokio::spawn(async move {
            loop {
                let Ok((tcp, _)) = listener.accept().await else {
                    return;
                };
                let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                    continue;
                };
                connections.fetch_add(1, Ordering::AcqRel);
                let mut subscribed: Vec<String> = Vec::new();

                loop {
                    tokio::select! {
                        frame = ws.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                let Ok(command) = serde_json::from_str::<Value>(&text) else {
                                    continue;
                                };
                                commands.lock().push(command.clone());
                                if auto_reply.load(Ordering::Acquire) {
                                    if let Some(reply) = reply_for(&command, &mut subscribed) {
                                        if ws.send(Message::Text(reply)).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) => {
                                let _ = ws.close(None).await;
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(_)) | None => break,
                        },
                        Some(frame) = push_rx.recv() => {
                            if ws.send(Message::Text(frame)).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });
    }

    MockExchange {
        url: format!("ws://{}/stream", addr),
        commands,
        auto_reply,
        connections,
        push_tx,
    }
}

fn reply_for(command: &Value, subscribed: &mut Vec<String>) -> Option<String> {
    let id = command.get("id")?.as_u64()?;
    let method = command.get("method")?.as_str()?;
    let params: Vec<String> = command
        .get("params")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let reply = match method {
        "SUBSCRIBE" => {
            for stream in params {
                if !subscribed.contains(&stream) {
                    subscribed.push(stream);
                }
            }
            json!({"result": null, "id": id})
        }
        "UNSUBSCRIBE" => {
            subscribed.retain(|stream| !params.contains(stream));
            json!({"result": null, "id": id})
        }
        "LIST_SUBSCRIPTIONS" => json!({"result": subscribed.clone(), "id": id}),
        _ => json!({"result": null, "id": id}),
    };
    Some(reply.to_string())
}

/// Minimal REST listener for the listen-key endpoints.
///
/// Counts requests by method; POST answers with the configured listen key,
/// PUT and DELETE with an empty object.
pub struct MockRest {
    url: String,
    pub posts: Arc<AtomicUsize>,
    pub puts: Arc<AtomicUsize>,
    pub deletes: Arc<AtomicUsize>,
}

impl MockRest {
    pub fn url(&self) -> String {
        self.url.clone()
    }
}

pub async fn spawn_mock_rest(listen_key: &str) -> MockRest {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let posts = Arc::new(AtomicUsize::new(0));
    let puts = Arc::new(AtomicUsize::new(0));
    let deletes = Arc::new(AtomicUsize::new(0));
    let listen_key = listen_key.to_string();

    {
        let posts = Arc::clone(&posts);
        let puts = Arc::clone(&puts);
        let deletes = Arc::clone(&deletes);
        tokio::spawn(async move {
            loop {
                let Ok((mut tcp, _)) = listener.accept().await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let Ok(n) = tcp.read(&mut buf).await else {
                        break;
                    };
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let method = head.split_whitespace().next().unwrap_or("").to_string();
                let body = match method.as_str() {
                    "POST" => {
                        posts.fetch_add(1, Ordering::AcqRel);
                        format!(r#"{{"listenKey":"{}"}}"#, listen_key)
                    }
                    "PUT" => {
                        puts.fetch_add(1, Ordering::AcqRel);
                        "{}".to_string()
                    }
                    "DELETE" => {
                        deletes.fetch_add(1, Ordering::AcqRel);
                        "{}".to_string()
                    }
                    _ => "{}".to_string(),
                };

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = tcp.write_all(response.as_bytes()).await;
                let _ = tcp.shutdown().await;
            }
        });
    }

    MockRest {
        url: format!("http://{}/api/", addr),
        posts,
        puts,
        deletes,
    }
}

/// Callback that forwards every event into a channel.
pub struct Recorder {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl Recorder {
    pub fn channel() -> (StreamCallback, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Recorder { tx }), rx)
    }
}

#[async_trait]
impl StreamHandler for Recorder {
    async fn handle(&self, event: StreamEvent) -> Result<()> {
        let _ = self.tx.send(event);
        Ok(())
    }
}

/// Callback that always fails.
pub struct Failing;

#[async_trait]
impl StreamHandler for Failing {
    async fn handle(&self, _event: StreamEvent) -> Result<()> {
        Err(BinanceError::Callback("handler exploded".to_string()))
    }
}
