//! In-process datagram network.
//!
//! Every endpoint gets an address in `10.0.0.0/24`. Datagrams sent to
//! `10.0.0.255` or `255.255.255.255` reach every other listening endpoint
//! bound to the destination port. All traffic is captured so tests can
//! replay or tamper with it.

use crate::domain::{DiscoveryError, DiscoveryResult};
use crate::ports::DatagramTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedSender<(Vec<u8>, SocketAddr)>;

const SUBNET_BROADCAST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 255);

/// A datagram observed on an `InMemoryNetwork`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub from: SocketAddr,
    pub to: SocketAddr,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct NetworkState {
    endpoints: HashMap<SocketAddr, Inbox>,
    next_host: u8,
    captured: Vec<Datagram>,
    partitioned: Vec<SocketAddr>,
}

/// Shared handle to an in-memory network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ip(state: &mut NetworkState) -> IpAddr {
        state.next_host = state.next_host.wrapping_add(1).clamp(1, 254);
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, state.next_host))
    }

    /// A listening endpoint on a fresh host address.
    pub fn endpoint(&self, port: u16) -> MemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let addr = SocketAddr::new(Self::next_ip(&mut state), port);
        state.endpoints.insert(addr, tx);
        MemoryTransport {
            network: self.clone(),
            addr,
            inbox: Some(tokio::sync::Mutex::new(rx)),
        }
    }

    /// An endpoint that can send but never receives.
    pub fn send_only_endpoint(&self, port: u16) -> MemoryTransport {
        let mut state = self.state.lock();
        let addr = SocketAddr::new(Self::next_ip(&mut state), port);
        MemoryTransport {
            network: self.clone(),
            addr,
            inbox: None,
        }
    }

    /// Deliver raw bytes as if sent from `from`. Returns the number of
    /// endpoints reached.
    pub fn inject(&self, from: SocketAddr, to: SocketAddr, bytes: Vec<u8>) -> usize {
        self.route(Datagram { from, to, bytes })
    }

    /// Every datagram routed so far, in send order.
    pub fn captured(&self) -> Vec<Datagram> {
        self.state.lock().captured.clone()
    }

    /// Captured datagrams sent by `from`.
    pub fn captured_from(&self, from: SocketAddr) -> Vec<Datagram> {
        self.state
            .lock()
            .captured
            .iter()
            .filter(|d| d.from == from)
            .cloned()
            .collect()
    }

    /// Drop all traffic to and from `addr` until `heal` is called.
    pub fn partition(&self, addr: SocketAddr) {
        self.state.lock().partitioned.push(addr);
    }

    pub fn heal(&self, addr: SocketAddr) {
        self.state.lock().partitioned.retain(|a| *a != addr);
    }

    fn route(&self, datagram: Datagram) -> usize {
        let mut state = self.state.lock();
        state.captured.push(datagram.clone());
        if state.partitioned.contains(&datagram.from) {
            return 0;
        }

        let is_broadcast = matches!(
            datagram.to.ip(),
            IpAddr::V4(ip) if ip == SUBNET_BROADCAST || ip == Ipv4Addr::BROADCAST
        );
        let mut delivered = 0;
        for (addr, inbox) in &state.endpoints {
            let matches = if is_broadcast {
                addr.port() == datagram.to.port() && *addr != datagram.from
            } else {
                *addr == datagram.to
            };
            if matches
                && !state.partitioned.contains(addr)
                && inbox.send((datagram.bytes.clone(), datagram.from)).is_ok()
            {
                delivered += 1;
            }
        }
        delivered
    }
}

/// One endpoint of an `InMemoryNetwork`.
#[derive(Debug)]
pub struct MemoryTransport {
    network: InMemoryNetwork,
    addr: SocketAddr,
    inbox: Option<tokio::sync::Mutex<mpsc::UnboundedReceiver<(Vec<u8>, SocketAddr)>>>,
}

impl MemoryTransport {
    /// Address of this endpoint, whether or not it listens.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn network(&self) -> &InMemoryNetwork {
        &self.network
    }
}

#[async_trait]
impl DatagramTransport for MemoryTransport {
    async fn send(&self, bytes: &[u8], target: SocketAddr) -> DiscoveryResult<()> {
        self.network.route(Datagram {
            from: self.addr,
            to: target,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    async fn receive(&self) -> DiscoveryResult<(Vec<u8>, SocketAddr)> {
        let inbox = self.inbox.as_ref().ok_or(DiscoveryError::NotListening)?;
        inbox
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| DiscoveryError::Transport("in-memory network closed".into()))
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.inbox.as_ref().map(|_| self.addr)
    }

    fn local_ip(&self) -> IpAddr {
        self.addr.ip()
    }

    fn broadcast_ip(&self) -> Option<IpAddr> {
        Some(IpAddr::V4(SUBNET_BROADCAST))
    }
}
