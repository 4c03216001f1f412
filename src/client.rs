//! Peer-side heartbeat agent
//!
//! Mirrors the server's liveness protocol from the opposite role: every
//! server ping is answered immediately with the same one-byte pong, and a
//! watchdog slightly longer than the server's period treats prolonged
//! silence as a dead link. The agent is transport-agnostic; the embedding
//! application pumps frames between the socket and these channels.

use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::constants::{CLIENT_WATCHDOG_GRACE_SECS, HEARTBEAT_VALUE};

/// One wire frame, payload kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub binary: bool,
}

impl Frame {
    pub fn binary(data: Vec<u8>) -> Self {
        Self { data, binary: true }
    }

    pub fn text(data: Vec<u8>) -> Self {
        Self {
            data,
            binary: false,
        }
    }

    fn heartbeat() -> Self {
        Self::binary(vec![HEARTBEAT_VALUE])
    }

    fn is_heartbeat(&self) -> bool {
        self.binary && self.data == [HEARTBEAT_VALUE]
    }
}

/// Why the agent stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentShutdown {
    /// The inbound channel ended: the peer or transport went away
    PeerClosed,
    /// No ping arrived within the watchdog window; the link is presumed
    /// dead and the caller should drop its side of the connection.
    /// Whether to reconnect afterwards is the application's decision.
    WatchdogFired,
}

/// Client-side liveness replier with its own watchdog timeout
pub struct HeartbeatAgent {
    watchdog: Duration,
}

impl HeartbeatAgent {
    /// Agent with an explicit watchdog duration
    pub fn new(watchdog: Duration) -> Self {
        Self { watchdog }
    }

    /// Agent tuned to a server ping period: the watchdog allows one period
    /// plus a grace second before giving up on the link
    pub fn for_server_period(period: Duration) -> Self {
        Self::new(period + Duration::from_secs(CLIENT_WATCHDOG_GRACE_SECS))
    }

    /// Drive the heartbeat protocol until the link dies.
    ///
    /// Pings are answered on `outbound`; every other frame is surfaced on
    /// `app` unmodified and does not touch the watchdog. The watchdog is
    /// unarmed until the first ping arrives.
    pub async fn run(
        &self,
        mut inbound: mpsc::UnboundedReceiver<Frame>,
        outbound: mpsc::UnboundedSender<Frame>,
        app: mpsc::UnboundedSender<Frame>,
    ) -> AgentShutdown {
        let mut deadline: Option<Instant> = None;

        loop {
            let frame = match deadline {
                Some(at) => {
                    tokio::select! {
                        maybe = inbound.recv() => maybe,
                        _ = sleep_until(at) => {
                            warn!("Heartbeat watchdog fired: no ping from server");
                            return AgentShutdown::WatchdogFired;
                        }
                    }
                }
                None => inbound.recv().await,
            };

            let frame = match frame {
                Some(f) => f,
                None => return AgentShutdown::PeerClosed,
            };

            if frame.is_heartbeat() {
                debug!("Server ping received, answering pong");
                if outbound.send(Frame::heartbeat()).is_err() {
                    return AgentShutdown::PeerClosed;
                }
                deadline = Some(Instant::now() + self.watchdog);
            } else if app.send(frame).is_err() {
                // Application side hung up; nothing left to surface to
                return AgentShutdown::PeerClosed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> (
        mpsc::UnboundedSender<Frame>,
        mpsc::UnboundedReceiver<Frame>,
        mpsc::UnboundedSender<Frame>,
        mpsc::UnboundedReceiver<Frame>,
        mpsc::UnboundedSender<Frame>,
        mpsc::UnboundedReceiver<Frame>,
    ) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        (in_tx, in_rx, out_tx, out_rx, app_tx, app_rx)
    }

    #[tokio::test]
    async fn test_ping_answered_with_pong() {
        let (in_tx, in_rx, out_tx, mut out_rx, app_tx, _app_rx) = channels();
        let agent = HeartbeatAgent::new(Duration::from_millis(200));

        let handle = tokio::spawn(async move { agent.run(in_rx, out_tx, app_tx).await });

        in_tx.send(Frame::heartbeat()).unwrap();
        let pong = out_rx.recv().await.unwrap();
        assert!(pong.is_heartbeat());

        drop(in_tx);
        assert_eq!(handle.await.unwrap(), AgentShutdown::PeerClosed);
    }

    #[tokio::test]
    async fn test_app_frames_surfaced_unmodified() {
        let (in_tx, in_rx, out_tx, _out_rx, app_tx, mut app_rx) = channels();
        let agent = HeartbeatAgent::new(Duration::from_millis(200));

        let handle = tokio::spawn(async move { agent.run(in_rx, out_tx, app_tx).await });

        let payload = Frame::text(b"hello".to_vec());
        in_tx.send(payload.clone()).unwrap();
        assert_eq!(app_rx.recv().await.unwrap(), payload);

        // A single-byte binary frame that is not the token is data
        let near_miss = Frame::binary(vec![2]);
        in_tx.send(near_miss.clone()).unwrap();
        assert_eq!(app_rx.recv().await.unwrap(), near_miss);

        drop(in_tx);
        assert_eq!(handle.await.unwrap(), AgentShutdown::PeerClosed);
    }

    #[tokio::test]
    async fn test_watchdog_fires_after_silence() {
        let (in_tx, in_rx, out_tx, _out_rx, app_tx, _app_rx) = channels();
        let agent = HeartbeatAgent::new(Duration::from_millis(50));

        let handle = tokio::spawn(async move { agent.run(in_rx, out_tx, app_tx).await });

        // First ping arms the watchdog; then silence
        in_tx.send(Frame::heartbeat()).unwrap();
        assert_eq!(handle.await.unwrap(), AgentShutdown::WatchdogFired);
        drop(in_tx);
    }

    #[tokio::test]
    async fn test_watchdog_unarmed_before_first_ping() {
        let (in_tx, in_rx, out_tx, _out_rx, app_tx, mut app_rx) = channels();
        let agent = HeartbeatAgent::new(Duration::from_millis(20));

        let handle = tokio::spawn(async move { agent.run(in_rx, out_tx, app_tx).await });

        // Well past the watchdog duration, but no ping has armed it yet
        tokio::time::sleep(Duration::from_millis(100)).await;
        in_tx.send(Frame::text(b"still here".to_vec())).unwrap();
        assert!(app_rx.recv().await.is_some());

        drop(in_tx);
        assert_eq!(handle.await.unwrap(), AgentShutdown::PeerClosed);
    }

    #[tokio::test]
    async fn test_ping_rearms_watchdog() {
        let (in_tx, in_rx, out_tx, mut out_rx, app_tx, _app_rx) = channels();
        let agent = HeartbeatAgent::new(Duration::from_millis(80));

        let handle = tokio::spawn(async move { agent.run(in_rx, out_tx, app_tx).await });

        // Three pings spaced well inside the watchdog window
        for _ in 0..3 {
            in_tx.send(Frame::heartbeat()).unwrap();
            assert!(out_rx.recv().await.unwrap().is_heartbeat());
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        // Still running: close normally
        drop(in_tx);
        assert_eq!(handle.await.unwrap(), AgentShutdown::PeerClosed);
    }
}
