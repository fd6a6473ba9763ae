//! Connection lifecycle controller and the operations that ride on it.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::events::{CommandError, StreamEvent, WsCommand, WsMethod};
use super::limiter::CommandLimiter;
use super::pending::CommandCorrelator;
use super::registry::{Removal, SubscriptionRegistry};
use super::{streams, StreamCallback};
use crate::client::Client;
use crate::error::{BinanceError, Result};
use crate::query::Query;

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(1);

/// Control messages from the operation surface to the receive loop.
enum SessionCommand {
    /// Write a serialized frame to the transport
    Send(String),
    /// Initiate the close handshake
    Close,
}

/// Listen key plus its owned keep-alive task.
struct UserStream {
    listen_key: String,
    keep_alive: JoinHandle<()>,
}

/// State shared between the operation surface and the receive loop.
///
/// The maps are mutated from the receive loop (replies, teardown) and from
/// caller tasks (subscribe/unsubscribe), which run on a preemptive
/// scheduler, so each lives behind its own mutex. None of the locks are
/// held across a suspension point.
struct SessionShared {
    correlator: CommandCorrelator,
    registry: SubscriptionRegistry,
    limiter: CommandLimiter,
    /// Present exactly while a connection is open
    command_tx: Mutex<Option<mpsc::UnboundedSender<SessionCommand>>>,
    /// Fatal error recorded by the receive loop, re-raised by `wait_stop`
    stop_reason: Mutex<Option<BinanceError>>,
    /// First callback failure observed during this session
    callback_failure: Mutex<Option<String>>,
    /// True from `start` until teardown has finished clearing state
    running: watch::Sender<bool>,
    user_stream: Mutex<Option<UserStream>>,
}

/// Streaming session manager for the combined-stream endpoint.
///
/// At most one connection is live at a time. All operations take `&self`
/// and may run concurrently with each other and with the receive loop.
pub struct Websocket {
    client: Client,
    url: String,
    shared: Arc<SessionShared>,
}

impl Websocket {
    pub(crate) fn new(client: Client) -> Self {
        let config = client.config();
        let shared = SessionShared {
            correlator: CommandCorrelator::new(),
            registry: SubscriptionRegistry::new(),
            limiter: CommandLimiter::new(config.commands_per_second, RATE_LIMIT_WINDOW),
            command_tx: Mutex::new(None),
            stop_reason: Mutex::new(None),
            callback_failure: Mutex::new(None),
            running: watch::channel(false).0,
            user_stream: Mutex::new(None),
        };
        let url = config.stream_base();
        Self {
            client,
            url,
            shared: Arc::new(shared),
        }
    }

    /// Whether no connection is currently open.
    pub fn closed(&self) -> bool {
        self.shared.command_tx.lock().is_none()
    }

    /// Open the connection and run the receive loop until it is live.
    ///
    /// No-op when already open. Returns an error only if the transport
    /// cannot be established.
    pub async fn start(&self) -> Result<()> {
        let open_rx = {
            let mut slot = self.shared.command_tx.lock();
            if slot.is_some() {
                return Ok(());
            }
            let (command_tx, command_rx) = mpsc::unbounded_channel();
            *slot = Some(command_tx);
            *self.shared.stop_reason.lock() = None;
            *self.shared.callback_failure.lock() = None;
            let _ = self.shared.running.send(true);

            let (open_tx, open_rx) = oneshot::channel();
            let shared = Arc::clone(&self.shared);
            let url = self.url.clone();
            let ping_interval = self.client.config().ping_interval;
            tokio::spawn(run_session(shared, url, ping_interval, command_rx, open_tx));
            open_rx
        };

        match open_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(BinanceError::ConnectionClosed),
        }
    }

    /// Request the close handshake. No-op when already closed.
    ///
    /// Returns once the close is initiated; use [`Websocket::wait_stop`] to
    /// wait for full teardown.
    pub async fn stop(&self) -> Result<()> {
        let Some(command_tx) = self.shared.command_tx.lock().clone() else {
            return Ok(());
        };
        let _ = command_tx.send(SessionCommand::Close);
        Ok(())
    }

    /// Wait until the receive loop has exited and per-connection state is
    /// cleared, re-raising the fatal error if the loop died on one.
    pub async fn wait_stop(&self) -> Result<()> {
        let mut running = self.shared.running.subscribe();
        loop {
            if !*running.borrow_and_update() {
                break;
            }
            if running.changed().await.is_err() {
                break;
            }
        }
        if let Some(err) = self.shared.stop_reason.lock().take() {
            return Err(err);
        }
        if let Some(msg) = self.shared.callback_failure.lock().take() {
            return Err(BinanceError::Callback(msg));
        }
        Ok(())
    }

    /// Send one command and wait for its correlated reply.
    ///
    /// Fails immediately with [`BinanceError::ConnectionClosed`] when no
    /// connection is open, and with [`BinanceError::CommandTimeout`] when
    /// no reply arrives in the configured window (the pending entry is
    /// dropped, so a late reply is ignored).
    pub async fn send_command(
        &self,
        method: WsMethod,
        params: Option<Vec<String>>,
    ) -> Result<Value> {
        let command_tx = self
            .shared
            .command_tx
            .lock()
            .clone()
            .ok_or(BinanceError::ConnectionClosed)?;

        self.shared.limiter.acquire().await;

        let (id, reply_rx) = self.shared.correlator.register();
        let frame = WsCommand { method, id, params }.to_json()?;
        if command_tx.send(SessionCommand::Send(frame)).is_err() {
            self.shared.correlator.forget(id);
            return Err(BinanceError::ConnectionClosed);
        }

        let timeout = self.client.config().command_timeout;
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            // Teardown dropped the reply slot: the connection is gone.
            Ok(Err(_)) => Err(BinanceError::ConnectionClosed),
            Err(_) => {
                self.shared.correlator.forget(id);
                Err(BinanceError::CommandTimeout { id })
            }
        }
    }

    /// Subscribe to a stream by name, without registering a callback.
    pub async fn subscribe(&self, stream: &str) -> Result<Value> {
        self.send_command(WsMethod::Subscribe, Some(vec![stream.to_string()]))
            .await
    }

    /// Unsubscribe from a stream by name.
    pub async fn unsubscribe(&self, stream: &str) -> Result<Value> {
        self.send_command(WsMethod::Unsubscribe, Some(vec![stream.to_string()]))
            .await
    }

    /// The server's view of the active subscriptions.
    pub async fn subscriptions(&self) -> Result<Vec<String>> {
        let reply = self.send_command(WsMethod::ListSubscriptions, None).await?;
        match reply.get("result") {
            Some(Value::Array(items)) => Ok(items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(BinanceError::UnexpectedReply(format!(
                "LIST_SUBSCRIPTIONS result: {}",
                other
            ))),
        }
    }

    /// Register a callback for a stream.
    ///
    /// The first callback for a stream issues one SUBSCRIBE command; later
    /// callbacks share the server-side subscription and only register
    /// locally.
    pub async fn subscribe_callback(&self, stream: &str, callback: StreamCallback) -> Result<()> {
        if self.shared.registry.append_if_present(stream, &callback) {
            return Ok(());
        }
        self.subscribe(stream).await?;
        self.shared.registry.insert(stream, callback);
        Ok(())
    }

    /// Remove one callback from a stream.
    ///
    /// Issues UNSUBSCRIBE only when the last callback goes; removing a
    /// callback that is not registered is a no-op.
    pub async fn unsubscribe_callback(
        &self,
        stream: &str,
        callback: &StreamCallback,
    ) -> Result<()> {
        match self.shared.registry.remove(stream, callback) {
            Removal::NotFound | Removal::Remaining => Ok(()),
            Removal::Last => {
                self.unsubscribe(stream).await?;
                Ok(())
            }
        }
    }

    /// Drop every registered callback and unsubscribe from their streams.
    pub async fn unsubscribe_all_callbacks(&self) -> Result<()> {
        for stream in self.shared.registry.drain() {
            self.unsubscribe(&stream).await?;
        }
        Ok(())
    }

    // Named stream subscriptions; each builds the exchange-defined stream
    // name and delegates to `subscribe_callback`.

    pub async fn trade(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::trade(symbol), callback).await
    }

    pub async fn aggregate_trade(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::aggregate_trade(symbol), callback)
            .await
    }

    pub async fn kline(
        &self,
        symbol: &str,
        interval: &str,
        callback: StreamCallback,
    ) -> Result<()> {
        self.subscribe_callback(&streams::kline(symbol, interval), callback)
            .await
    }

    pub async fn mini_ticker(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::mini_ticker(symbol), callback)
            .await
    }

    pub async fn mini_tickers(&self, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::mini_tickers(), callback).await
    }

    pub async fn ticker(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::ticker(symbol), callback).await
    }

    pub async fn tickers(&self, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::tickers(), callback).await
    }

    pub async fn window_ticker(
        &self,
        symbol: &str,
        window_size: &str,
        callback: StreamCallback,
    ) -> Result<()> {
        self.subscribe_callback(&streams::window_ticker(symbol, window_size), callback)
            .await
    }

    pub async fn window_tickers(
        &self,
        window_size: &str,
        callback: StreamCallback,
    ) -> Result<()> {
        self.subscribe_callback(&streams::window_tickers(window_size), callback)
            .await
    }

    pub async fn book_ticker(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::book_ticker(symbol), callback)
            .await
    }

    pub async fn depth(&self, symbol: &str, callback: StreamCallback) -> Result<()> {
        self.subscribe_callback(&streams::depth(symbol), callback).await
    }

    pub async fn partial_depth(
        &self,
        symbol: &str,
        levels: u8,
        callback: StreamCallback,
    ) -> Result<()> {
        self.subscribe_callback(&streams::partial_depth(symbol, levels), callback)
            .await
    }

    /// Subscribe to the private account event stream.
    ///
    /// The first call obtains a listen key over REST and starts its
    /// keep-alive task; later calls reuse both. The callback is registered
    /// against the key like any other stream name. The keep-alive task is
    /// cancelled when the connection tears down, and the key must be
    /// re-acquired on the next session.
    pub async fn user_data(&self, callback: StreamCallback) -> Result<String> {
        let existing = self
            .shared
            .user_stream
            .lock()
            .as_ref()
            .map(|us| us.listen_key.clone());

        let listen_key = match existing {
            Some(key) => key,
            None => {
                let key = self.create_listen_key().await?;
                let task = spawn_keep_alive(
                    self.client.clone(),
                    key.clone(),
                    self.client.config().keep_alive_interval,
                );
                let mut slot = self.shared.user_stream.lock();
                match slot.as_ref() {
                    // Another caller won the race while we were on the wire.
                    Some(us) => {
                        task.abort();
                        us.listen_key.clone()
                    }
                    None => {
                        *slot = Some(UserStream {
                            listen_key: key.clone(),
                            keep_alive: task,
                        });
                        key
                    }
                }
            }
        };

        self.subscribe_callback(&listen_key, callback).await?;
        Ok(listen_key)
    }

    /// Obtain a fresh listen key from the REST boundary.
    pub async fn create_listen_key(&self) -> Result<String> {
        let reply = self
            .client
            .request(
                Method::POST,
                self.client.endpoints().create_listen_key,
                false,
                Query::new(),
            )
            .await?;
        reply
            .get("listenKey")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| BinanceError::UnexpectedReply("missing listenKey".to_string()))
    }

    /// Extend a listen key's validity.
    pub async fn keep_alive_listen_key(&self, listen_key: &str) -> Result<()> {
        self.client
            .request(
                Method::PUT,
                self.client.endpoints().keep_alive_listen_key,
                false,
                Query::new().push("listenKey", listen_key),
            )
            .await?;
        Ok(())
    }

    /// Invalidate a listen key.
    pub async fn close_listen_key(&self, listen_key: &str) -> Result<()> {
        self.client
            .request(
                Method::DELETE,
                self.client.endpoints().close_listen_key,
                false,
                Query::new().push("listenKey", listen_key),
            )
            .await?;
        Ok(())
    }
}

/// Periodic listen-key refresh, owned by the session and aborted on
/// teardown.
fn spawn_keep_alive(client: Client, listen_key: String, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The key was just created; skip the immediate first tick.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let query = Query::new().push("listenKey", listen_key.clone());
            match client
                .request(
                    Method::PUT,
                    client.endpoints().keep_alive_listen_key,
                    false,
                    query,
                )
                .await
            {
                Ok(_) => debug!("listen key refreshed"),
                Err(err) => warn!("listen key keep-alive failed: {}", err),
            }
        }
    })
}

/// Connection task: connect, run the receive loop, then clear all
/// per-connection state whatever the exit reason.
async fn run_session(
    shared: Arc<SessionShared>,
    url: String,
    ping_interval: Duration,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    open_tx: oneshot::Sender<Result<()>>,
) {
    let result = match connect_async(&url).await {
        Ok((stream, _response)) => {
            info!("connected to {}", url);
            let _ = open_tx.send(Ok(()));
            drive(&shared, stream, &mut command_rx, ping_interval).await
        }
        Err(err) => {
            // The connect failure goes to the caller of start(), not to
            // wait_stop.
            let _ = open_tx.send(Err(BinanceError::Transport(err.to_string())));
            Ok(())
        }
    };

    if let Err(ref err) = result {
        error!("stream session ended: {}", err);
    }
    teardown(&shared, result);
}

/// Receive loop over one live connection.
async fn drive(
    shared: &Arc<SessionShared>,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
    ping_interval: Duration,
) -> Result<()> {
    let (mut write, mut read) = stream.split();

    let mut ping_timer = tokio::time::interval(ping_interval);
    ping_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Consume the immediate first tick; the connection is fresh.
    ping_timer.tick().await;

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(fatal) = handle_text_frame(shared, &text) {
                            let _ = write.send(Message::Close(None)).await;
                            return Err(fatal);
                        }
                    }
                    // Close frames are answered by the protocol layer; the
                    // stream ends shortly after. Binary and ping/pong
                    // frames are not part of the JSON protocol.
                    Some(Ok(_)) => {}
                    Some(Err(WsError::ConnectionClosed)) | None => return Ok(()),
                    Some(Err(err)) => return Err(BinanceError::Transport(err.to_string())),
                }
            }
            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Send(frame)) => {
                        write
                            .send(Message::Text(frame))
                            .await
                            .map_err(|err| BinanceError::Transport(err.to_string()))?;
                    }
                    Some(SessionCommand::Close) | None => {
                        debug!("close requested, starting handshake");
                        let _ = write.send(Message::Close(None)).await;
                        // Keep reading; the loop exits when the stream ends.
                    }
                }
            }
            _ = ping_timer.tick() => {
                write
                    .send(Message::Ping(Vec::new()))
                    .await
                    .map_err(|err| BinanceError::Transport(err.to_string()))?;
            }
        }
    }
}

/// Classify one text frame. Returns the fatal error when the frame encodes
/// a server error; every other frame is handled in place.
fn handle_text_frame(shared: &Arc<SessionShared>, text: &str) -> Option<BinanceError> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            debug!("ignoring unparseable frame: {}", err);
            return None;
        }
    };

    if let Some(error_obj) = value.get("error") {
        let fatal = match serde_json::from_value::<CommandError>(error_obj.clone()) {
            Ok(err) => BinanceError::Server {
                code: err.code,
                msg: err.msg,
            },
            Err(_) => BinanceError::Server {
                code: 0,
                msg: error_obj.to_string(),
            },
        };
        return Some(fatal);
    }

    if let Some(id) = value.get("id").and_then(Value::as_u64) {
        if !shared.correlator.resolve(id, value) {
            debug!("reply for unknown command id {}", id);
        }
        return None;
    }

    if value.get("stream").and_then(Value::as_str).is_some() {
        dispatch_event(shared, value);
        return None;
    }

    debug!("ignoring unrecognized frame");
    None
}

/// Fan an event frame out to every callback registered for its stream,
/// each as an independent task.
fn dispatch_event(shared: &Arc<SessionShared>, value: Value) {
    let event: StreamEvent = match serde_json::from_value(value) {
        Ok(event) => event,
        Err(err) => {
            debug!("ignoring malformed event frame: {}", err);
            return;
        }
    };

    let callbacks = shared.registry.callbacks_for(&event.stream);
    if callbacks.is_empty() {
        debug!("event for stream without callbacks: {}", event.stream);
        return;
    }

    for callback in callbacks {
        let event = event.clone();
        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            if let Err(err) = callback.handle(event).await {
                error!("stream callback failed: {}", err);
                let mut slot = shared.callback_failure.lock();
                if slot.is_none() {
                    *slot = Some(err.to_string());
                }
            }
        });
    }
}

/// Clear all per-connection state and signal waiters.
///
/// Runs under the command-channel lock so a concurrent `start` cannot
/// observe a half-cleared session. Pending command slots are dropped,
/// which their waiters observe as `ConnectionClosed`.
fn teardown(shared: &Arc<SessionShared>, result: Result<()>) {
    let mut slot = shared.command_tx.lock();
    *slot = None;
    shared.correlator.reset();
    shared.registry.clear();
    if let Some(user_stream) = shared.user_stream.lock().take() {
        user_stream.keep_alive.abort();
    }
    if let Err(err) = result {
        *shared.stop_reason.lock() = Some(err);
    }
    let _ = shared.running.send(false);
    debug!("stream session state cleared");
}
