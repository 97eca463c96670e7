//! wfsremote-osc/src/transport.rs
//!
//! The two UDP endpoints: a receive socket on the incoming port feeding the
//! dispatcher, and a send socket aimed at `remote_host:outgoing_port` fed by
//! the throttle engine (and by one-shot sends).

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use wfsremote_common::models::{NetworkConfig, OscMessage};

use crate::codec;
use crate::dispatch::Dispatcher;
use crate::throttle::{run_flush_loop, OscSink, ThrottleEngine};
use crate::{OscError, Result};

/// Sends encoded messages to a fixed destination. Fire-and-forget.
pub struct UdpSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSender {
    pub async fn bind(target: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(send_socket_error)?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

/// The send socket binds an ephemeral port, so there is no configured port
/// to report.
fn send_socket_error(e: io::Error) -> OscError {
    OscError::IoError(format!("send socket: {e}"))
}

#[async_trait]
impl OscSink for UdpSender {
    async fn send(&self, message: &OscMessage) -> Result<()> {
        let buf = codec::encode(message)?;
        self.socket
            .send_to(&buf, self.target)
            .await
            .map_err(|e| OscError::Send(format!("{} -> {}: {e}", message.address, self.target)))?;
        debug!("Sent {} to {}", message, self.target);
        Ok(())
    }
}

/// A running transport: receive loop plus flush timer. Dropping it signals
/// both tasks to exit; `stop` also waits for them.
pub struct OscTransport {
    local_port: u16,
    sender: Arc<UdpSender>,
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl OscTransport {
    /// Binds both sockets and spawns the receive loop and the flush timer.
    /// A busy incoming port yields `OscError::Bind` and nothing is left
    /// running.
    pub async fn start(
        config: &NetworkConfig,
        dispatcher: Arc<Dispatcher>,
        throttle: Arc<ThrottleEngine>,
    ) -> Result<Self> {
        config.validate()?;

        let recv_socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.incoming_port))
            .await
            .map_err(|source| OscError::Bind {
                port: config.incoming_port,
                source,
            })?;
        let local_port = recv_socket
            .local_addr()
            .map_err(|e| OscError::IoError(format!("local_addr: {e}")))?
            .port();

        let sender = Arc::new(UdpSender::bind(config.remote_addr()).await?);

        let (stop_tx, stop_rx) = watch::channel(false);
        let recv_task = tokio::spawn(run_receive_loop(recv_socket, dispatcher, stop_rx.clone()));
        let flush_sink: Arc<dyn OscSink> = sender.clone();
        let flush_task = tokio::spawn(run_flush_loop(throttle, flush_sink, stop_rx));

        info!(
            "OSC transport listening on UDP {}, sending to {}",
            local_port,
            sender.target()
        );

        Ok(Self {
            local_port,
            sender,
            stop_tx,
            tasks: vec![recv_task, flush_task],
        })
    }

    /// The bound incoming port; differs from the configured one only when
    /// that was 0.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.sender.target()
    }

    pub fn sink(&self) -> Arc<dyn OscSink> {
        self.sender.clone()
    }

    pub async fn send(&self, message: &OscMessage) -> Result<()> {
        self.sender.send(message).await
    }

    /// Stops both tasks and waits for them, which closes the receive socket.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("OSC transport task ended abnormally: {:?}", e);
            }
        }
        info!("OSC transport on port {} has been shut down.", self.local_port);
    }
}

impl Drop for OscTransport {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            debug!("OSC transport on port {} dropped without stop", self.local_port);
        }
        let _ = self.stop_tx.send(true);
    }
}

async fn run_receive_loop(
    socket: UdpSocket,
    dispatcher: Arc<Dispatcher>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; rosc::decoder::MTU];
    loop {
        tokio::select! {
            res = socket.recv_from(&mut buf) => {
                match res {
                    Ok((size, peer)) => handle_datagram(&dispatcher, &buf[..size], peer),
                    Err(e) => {
                        error!("Error receiving OSC datagram => {:?}", e);
                    }
                }
            },
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
    debug!("OSC receive loop stopped");
}

/// Decodes one datagram and routes every message in it. A malformed
/// datagram is logged and dropped.
pub fn handle_datagram(dispatcher: &Dispatcher, data: &[u8], peer: SocketAddr) {
    match codec::decode_datagram(data) {
        Ok(messages) => {
            for message in &messages {
                dispatcher.route(message);
            }
        }
        Err(e) => {
            warn!("Dropped malformed OSC datagram from {} ({} bytes): {}", peer, data.len(), e);
        }
    }
}
