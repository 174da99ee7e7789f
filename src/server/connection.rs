//! Per-connection session driver
//!
//! Runs one client through its lifecycle:
//!
//! 1. join the broadcast group and move to `Open`
//! 2. send the current document (the first message the client sees)
//! 3. relay inbound text to the broadcaster and broadcast frames to the client,
//!    pinging it at half the idle timeout
//! 4. leave the group and move to `Closed`, however the loop ended

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, MissedTickBehavior};

use crate::broadcast::{Broadcaster, UpdateFrame};
use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::session::{Inbound, SessionState};

/// A single client connection
pub struct Connection {
    state: SessionState,
    config: ServerConfig,
    broadcaster: Arc<Broadcaster>,
}

impl Connection {
    /// Create a connection for an already upgraded session
    pub fn new(
        session_id: u64,
        peer_addr: SocketAddr,
        config: ServerConfig,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            state: SessionState::new(session_id, peer_addr),
            config,
            broadcaster,
        }
    }

    /// Session state, including traffic counters
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session until the client leaves
    ///
    /// The session is removed from the broadcast group on every exit path.
    pub async fn run(&mut self, socket: WebSocket) -> Result<()> {
        let (sink, source) = socket.split();
        self.run_split(sink, source).await
    }

    /// Drive the session over a transport already split into its two halves
    pub async fn run_split<Si, St>(&mut self, mut sink: Si, mut source: St) -> Result<()>
    where
        Si: Sink<Message, Error = axum::Error> + Unpin,
        St: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
    {
        let (rx, snapshot) = self.broadcaster.join(self.state.id).await;
        self.state.open();

        tracing::debug!(
            session_id = self.state.id,
            peer = %self.state.peer_addr,
            "Session open"
        );

        let result = self.serve(&mut sink, &mut source, rx, snapshot).await;

        self.broadcaster.leave(self.state.id).await;
        let _ = sink.close().await;
        self.state.close();

        let stats = &self.state.stats;
        tracing::debug!(
            session_id = self.state.id,
            duration_ms = stats.duration.as_millis() as u64,
            updates_received = stats.updates_received,
            binary_ignored = stats.binary_ignored,
            messages_sent = stats.messages_sent,
            lagged_frames = stats.lagged_frames,
            pings_sent = stats.pings_sent,
            "Session closed"
        );

        result
    }

    async fn serve<Si, St>(
        &mut self,
        sink: &mut Si,
        source: &mut St,
        mut rx: broadcast::Receiver<UpdateFrame>,
        snapshot: Utf8Bytes,
    ) -> Result<()>
    where
        Si: Sink<Message, Error = axum::Error> + Unpin,
        St: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
    {
        let len = snapshot.len();
        sink.send(Message::Text(snapshot)).await?;
        self.state.stats.record_sent(len);

        let idle_timeout = self.config.idle_timeout;
        let keepalive = !idle_timeout.is_zero();
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);

        // A client that only watches stays alive by answering these
        let ping_period = self.config.ping_interval().max(Duration::from_millis(1));
        let mut ping = tokio::time::interval_at(Instant::now() + ping_period, ping_period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                inbound = source.next() => {
                    let message = match inbound {
                        Some(Ok(message)) => message,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    };

                    if keepalive {
                        idle.as_mut().reset(Instant::now() + idle_timeout);
                    }

                    if !self.handle_inbound(message).await {
                        return Ok(());
                    }
                }

                frame = rx.recv() => {
                    match frame {
                        Ok(frame) => self.deliver(sink, frame).await?,
                        Err(RecvError::Lagged(skipped)) => {
                            // Later frames carry the full text, so skipping converges
                            self.state.stats.lagged_frames += skipped;
                            tracing::debug!(
                                session_id = self.state.id,
                                skipped = skipped,
                                "Session lagged behind broadcast"
                            );
                        }
                        Err(RecvError::Closed) => return Ok(()),
                    }
                }

                _ = ping.tick(), if keepalive => {
                    sink.send(Message::Ping(Bytes::new())).await?;
                    self.state.stats.pings_sent += 1;
                }

                _ = &mut idle, if keepalive => {
                    tracing::debug!(
                        session_id = self.state.id,
                        idle_secs = idle_timeout.as_secs(),
                        "Session idle timeout"
                    );
                    return Ok(());
                }
            }
        }
    }

    /// Returns false when the client asked to close
    async fn handle_inbound(&mut self, message: Message) -> bool {
        match Inbound::classify(message) {
            Inbound::Update(text) => {
                self.state.stats.record_update(text.len());
                self.broadcaster.publish(self.state.id, text).await;
                true
            }
            Inbound::Ignored => {
                self.state.stats.binary_ignored += 1;
                tracing::trace!(session_id = self.state.id, "Ignored non-text message");
                true
            }
            Inbound::Keepalive => true,
            Inbound::Close => false,
        }
    }

    async fn deliver<Si>(&mut self, sink: &mut Si, frame: UpdateFrame) -> Result<()>
    where
        Si: Sink<Message, Error = axum::Error> + Unpin,
    {
        if !self.broadcaster.config().echo_to_sender && frame.is_from(self.state.id) {
            self.state.stats.echoes_skipped += 1;
            return Ok(());
        }

        let len = frame.text.len();
        sink.send(frame.to_message()).await?;
        self.state.stats.record_sent(len);
        Ok(())
    }
}
