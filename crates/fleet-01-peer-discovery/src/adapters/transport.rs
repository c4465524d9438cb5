//! UDP transport for discovery datagrams.
//!
//! Binding never aborts startup: when no port in the search window can be
//! bound the transport falls back to an ephemeral send-only socket.

use crate::domain::{DiscoveryConfig, DiscoveryError, DiscoveryResult};
use crate::ports::DatagramTransport;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket as StdUdpSocket};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Global broadcast fallback.
pub const GLOBAL_BROADCAST: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Routable address used only to select the outbound interface; nothing is sent.
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// True if a UDP socket can currently be bound to `port` on all interfaces.
pub fn is_port_available(port: u16) -> bool {
    StdUdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok()
}

/// First bindable port in `start..start + window`.
pub fn find_available_port(start: u16, window: u16) -> Option<u16> {
    (0..window)
        .filter_map(|offset| start.checked_add(offset))
        .filter(|port| *port != 0)
        .find(|port| is_port_available(*port))
}

/// Outbound IPv4 address of this host.
///
/// Connects an unbound UDP socket towards a public address so the kernel
/// picks the outbound interface; no packet leaves the host.
pub fn detect_local_ip() -> Option<IpAddr> {
    let socket = StdUdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE_ADDR).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// Best-effort `/24` broadcast address: `a.b.c.255`.
pub fn broadcast_address(ip: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = ip.octets();
    Ipv4Addr::new(a, b, c, 255)
}

fn broadcast_target(config: &DiscoveryConfig, local_ip: Option<IpAddr>) -> Option<IpAddr> {
    if !config.broadcast {
        return None;
    }
    match local_ip {
        Some(IpAddr::V4(v4)) if config.subnet_broadcast && !v4.is_loopback() => {
            Some(IpAddr::V4(broadcast_address(v4)))
        }
        _ => Some(IpAddr::V4(GLOBAL_BROADCAST)),
    }
}

/// Tokio UDP socket with `SO_BROADCAST` enabled.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    listening: bool,
    local_ip: IpAddr,
    broadcast_ip: Option<IpAddr>,
    buffer_size: usize,
}

impl UdpTransport {
    /// Bind according to `config`.
    ///
    /// Port selection: `port` if free, else (with `auto_port`) the first
    /// free port in the search window, else send-only mode. Port 0 binds an
    /// ephemeral listening port.
    pub async fn bind(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        let detected = detect_local_ip();
        let local_ip = detected.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        if detected.is_none() {
            warn!("Could not detect local IP, advertising {}", local_ip);
        }

        let (socket, listening) = match Self::select_port(config) {
            Some(port) => match UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await {
                Ok(socket) => (socket, true),
                Err(e) => {
                    let err = DiscoveryError::Bind {
                        port,
                        reason: e.to_string(),
                    };
                    warn!(error = %err, "Continuing in send-only mode");
                    (Self::bind_send_only().await?, false)
                }
            },
            None => {
                let err = DiscoveryError::Bind {
                    port: config.port,
                    reason: "no free port in search window".into(),
                };
                warn!(error = %err, "Continuing in send-only mode");
                (Self::bind_send_only().await?, false)
            }
        };

        if let Err(e) = socket.set_broadcast(true) {
            warn!(error = %e, "Failed to enable SO_BROADCAST");
        }

        let transport = Self {
            socket,
            listening,
            local_ip,
            broadcast_ip: broadcast_target(config, detected),
            buffer_size: config.receive_buffer_size,
        };
        info!(
            local_addr = ?transport.local_addr(),
            broadcast = ?transport.broadcast_ip,
            "Discovery transport ready"
        );
        Ok(transport)
    }

    fn select_port(config: &DiscoveryConfig) -> Option<u16> {
        if config.port == 0 || is_port_available(config.port) {
            return Some(config.port);
        }
        if !config.auto_port {
            return None;
        }
        let next = config.port.checked_add(1)?;
        let port = find_available_port(next, config.port_search_window)?;
        info!(requested = config.port, selected = port, "Discovery port in use, auto-selected");
        Some(port)
    }

    async fn bind_send_only() -> DiscoveryResult<UdpSocket> {
        UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(DiscoveryError::from)
    }
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    async fn send(&self, bytes: &[u8], target: SocketAddr) -> DiscoveryResult<()> {
        let sent = self.socket.send_to(bytes, target).await?;
        debug!(%target, bytes = sent, "Sent datagram");
        Ok(())
    }

    async fn receive(&self) -> DiscoveryResult<(Vec<u8>, SocketAddr)> {
        if !self.listening {
            return Err(DiscoveryError::NotListening);
        }
        let mut buf = vec![0u8; self.buffer_size];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(len);
        Ok((buf, from))
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        if !self.listening {
            return None;
        }
        self.socket.local_addr().ok()
    }

    fn local_ip(&self) -> IpAddr {
        self.local_ip
    }

    fn broadcast_ip(&self) -> Option<IpAddr> {
        self.broadcast_ip
    }
}
