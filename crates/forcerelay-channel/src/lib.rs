//! Fire-and-forget UDP channel to the external actuator.
//!
//! One connectionless socket per channel, initialized lazily on first send
//! and never re-initialized: the state moves `Idle -> Ready | Failed` under
//! the channel mutex and stays there for the channel's lifetime. A failed
//! initialization turns every later send into a silent no-op; a failed send
//! on a ready channel is logged and otherwise ignored. Nothing here may ever
//! surface an error to the caller, because the host's own force-feedback
//! path must not be perturbed.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;

use forcerelay_control_protocol::{ControlCommand, DEFAULT_HOST, DEFAULT_PORT};
use tracing::{debug, warn};

/// Environment variable naming the actuator host.
pub const ENV_HOST: &str = "FFB_HOST";

/// Environment variable naming the actuator port.
pub const ENV_PORT: &str = "FFB_PORT";

/// Anything that accepts actuator commands. The proxies send through this
/// seam so tests can observe the exact command sequence without a socket.
pub trait CommandSink: Send + Sync {
    /// Deliver one command, best-effort.
    fn send(&self, command: &ControlCommand);
}

/// Where the datagrams go. Resolved once; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    /// Actuator host name or address.
    pub host: String,
    /// Actuator UDP port.
    pub port: u16,
}

impl ChannelTarget {
    /// Target an explicit host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Read `FFB_HOST` / `FFB_PORT`, falling back to the loopback default.
    /// An unparsable or zero port falls back to the default port.
    pub fn from_env() -> Self {
        let host = std::env::var(ENV_HOST)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = std::env::var(ENV_PORT)
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|&p| p != 0)
            .unwrap_or(DEFAULT_PORT);
        Self { host, port }
    }
}

impl Default for ChannelTarget {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

enum ChannelState {
    Idle,
    Ready { socket: UdpSocket, peer: SocketAddr },
    Failed,
}

/// The process's datagram sender. Send and initialization share one mutex,
/// so concurrent first use initializes exactly once.
pub struct UdpCommandChannel {
    target: ChannelTarget,
    state: Mutex<ChannelState>,
}

impl UdpCommandChannel {
    /// Create a channel for the given target. No socket is opened until the
    /// first send.
    pub fn new(target: ChannelTarget) -> Self {
        Self {
            target,
            state: Mutex::new(ChannelState::Idle),
        }
    }

    /// Create a channel targeted from the environment.
    pub fn from_env() -> Self {
        Self::new(ChannelTarget::from_env())
    }

    /// The configured target.
    pub fn target(&self) -> &ChannelTarget {
        &self.target
    }

    /// Send one datagram of raw text, best-effort.
    pub fn send_text(&self, text: &str) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let ChannelState::Idle = *state {
            *state = self.initialize();
        }
        if let ChannelState::Ready { socket, peer } = &*state {
            if let Err(err) = socket.send_to(text.as_bytes(), peer) {
                debug!(%peer, %err, "datagram send failed");
            }
        }
    }

    fn initialize(&self) -> ChannelState {
        let peer = match (self.target.host.as_str(), self.target.port).to_socket_addrs() {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    warn!(
                        host = %self.target.host,
                        port = self.target.port,
                        "actuator target resolved to no address; channel disabled"
                    );
                    return ChannelState::Failed;
                }
            },
            Err(err) => {
                warn!(
                    host = %self.target.host,
                    port = self.target.port,
                    %err,
                    "actuator target resolution failed; channel disabled"
                );
                return ChannelState::Failed;
            }
        };
        match UdpSocket::bind(("0.0.0.0", 0)) {
            Ok(socket) => {
                debug!(%peer, "actuator channel ready");
                ChannelState::Ready { socket, peer }
            }
            Err(err) => {
                warn!(%err, "datagram socket open failed; channel disabled");
                ChannelState::Failed
            }
        }
    }
}

impl CommandSink for UdpCommandChannel {
    fn send(&self, command: &ControlCommand) {
        self.send_text(&command.encode());
    }
}
