use crate::adapters::{SystemTimeSource, TokioClock, UdpTransport};
use crate::codec::{LocalAgent, MessageCodec, MessageType};
use crate::domain::{
    DiscoveryConfig, DiscoveryError, DiscoveryResult, MessageStats, PeerRegistry, ReplayGuard,
    Timestamp,
};
use crate::ports::{Clock, ConfigProvider, DatagramTransport, TimeSource};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Minimum spacing between two outgoing payload timestamps.
///
/// Receivers require strictly increasing timestamps per sender, so two
/// messages produced within the same clock reading must still differ.
const TIMESTAMP_STEP_SECS: f64 = 0.001;

/// How many of our own ANNOUNCE timestamps are remembered for `reply_to`.
const RECENT_ANNOUNCES: usize = 16;

/// Injected collaborators of a `DiscoveryService`.
pub struct DiscoveryDependencies {
    pub transport: Arc<dyn DatagramTransport>,
    pub time_source: Arc<dyn TimeSource>,
    pub clock: Arc<dyn Clock>,
    /// Shared HMAC secret. `None` or empty disables signing.
    pub secret: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub received: AtomicU64,
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
    pub sent: AtomicU64,
    pub send_failures: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MessageStats {
        MessageStats {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the service handle and its background loops.
pub(crate) struct ServiceInner {
    pub config: DiscoveryConfig,
    pub local: LocalAgent,
    pub registry: PeerRegistry,
    pub codec: MessageCodec,
    pub replay: ReplayGuard,
    pub transport: Arc<dyn DatagramTransport>,
    pub time_source: Arc<dyn TimeSource>,
    pub clock: Arc<dyn Clock>,
    pub seeds: Vec<SocketAddr>,
    /// Sender -> when we ACKed its ANNOUNCE.
    pub pending_pings: Mutex<HashMap<String, Timestamp>>,
    pub recent_announces: Mutex<VecDeque<f64>>,
    last_sent_timestamp: Mutex<f64>,
    pub counters: Counters,
}

impl ServiceInner {
    pub fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Timestamp for the next outgoing payload, strictly after the previous one.
    pub fn next_timestamp(&self) -> Timestamp {
        let now = self.now().as_secs_f64();
        let mut last = self.last_sent_timestamp.lock();
        let ts = if now > *last {
            now
        } else {
            *last + TIMESTAMP_STEP_SECS
        };
        *last = ts;
        Timestamp::new(ts)
    }

    /// Broadcast target, unless broadcasting is disabled or there is no fleet port.
    pub fn broadcast_addr(&self) -> Option<SocketAddr> {
        if self.config.port == 0 {
            return None;
        }
        self.transport
            .broadcast_ip()
            .map(|ip| SocketAddr::new(ip, self.config.port))
    }

    /// Encode once and send to the broadcast address and every seed peer.
    ///
    /// Returns the number of successful sends.
    pub async fn broadcast(
        &self,
        kind: MessageType,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> DiscoveryResult<usize> {
        let timestamp = self.next_timestamp();
        let bytes = self.codec.encode(kind, &self.local, timestamp, extra)?;
        if kind == MessageType::Announce {
            let mut recent = self.recent_announces.lock();
            recent.push_back(timestamp.as_secs_f64());
            while recent.len() > RECENT_ANNOUNCES {
                recent.pop_front();
            }
        }

        let targets = self.broadcast_addr().into_iter().chain(self.seeds.iter().copied());
        let mut delivered = 0;
        for target in targets {
            if self.send_bytes(&bytes, target, kind).await {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Encode and send one message to a single target.
    pub async fn unicast(
        &self,
        kind: MessageType,
        extra: serde_json::Map<String, serde_json::Value>,
        target: SocketAddr,
    ) -> DiscoveryResult<bool> {
        let bytes = self
            .codec
            .encode(kind, &self.local, self.next_timestamp(), extra)?;
        Ok(self.send_bytes(&bytes, target, kind).await)
    }

    async fn send_bytes(&self, bytes: &[u8], target: SocketAddr, kind: MessageType) -> bool {
        match self.transport.send(bytes, target).await {
            Ok(()) => {
                Counters::bump(&self.counters.sent);
                true
            }
            Err(e) => {
                Counters::bump(&self.counters.send_failures);
                warn!(%target, message = %kind, error = %e, "Failed to send discovery message");
                false
            }
        }
    }
}

/// Fleet peer discovery over signed UDP broadcast and gossip.
///
/// Lifecycle is **STOPPED -> RUNNING -> STOPPED**. `start` spawns the listen
/// loop (skipped in send-only mode) and the announce loop on the current
/// tokio runtime; `stop` signals both through a watch channel and joins them.
///
/// # Example
///
/// ```rust,ignore
/// let config = DiscoveryConfig::default();
/// let service = DiscoveryService::bind(config, Some(b"fleet-secret")).await?;
/// service.start()?;
/// // ...
/// let urls = service.get_peer_urls();
/// service.stop().await;
/// ```
pub struct DiscoveryService {
    pub(crate) inner: Arc<ServiceInner>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DiscoveryService {
    /// Build a service from injected collaborators.
    pub fn new(config: DiscoveryConfig, deps: DiscoveryDependencies) -> DiscoveryResult<Self> {
        config.validate()?;
        let seeds = config.seed_addrs()?;

        let local = LocalAgent {
            agent_id: config.agent_id.clone(),
            ip: deps.transport.local_ip().to_string(),
            port: deps
                .transport
                .local_addr()
                .map(|addr| addr.port())
                .unwrap_or(config.port),
            metadata: config.metadata.clone(),
        };
        let codec =
            MessageCodec::new(deps.secret.as_deref()).with_max_size(config.receive_buffer_size);

        let inner = ServiceInner {
            registry: PeerRegistry::new(config.agent_id.clone()),
            replay: ReplayGuard::new(config.max_clock_skew()),
            codec,
            local,
            seeds,
            transport: deps.transport,
            time_source: deps.time_source,
            clock: deps.clock,
            pending_pings: Mutex::new(HashMap::new()),
            recent_announces: Mutex::new(VecDeque::new()),
            last_sent_timestamp: Mutex::new(0.0),
            counters: Counters::default(),
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
            shutdown: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Bind a UDP transport and use the system clock.
    ///
    /// A busy port never fails this call; the service degrades to
    /// send-only mode instead.
    pub async fn bind(config: DiscoveryConfig, secret: Option<&[u8]>) -> DiscoveryResult<Self> {
        config.validate()?;
        let transport = UdpTransport::bind(&config).await?;
        Self::new(
            config,
            DiscoveryDependencies {
                transport: Arc::new(transport),
                time_source: Arc::new(SystemTimeSource::new()),
                clock: Arc::new(TokioClock),
                secret: secret.map(<[u8]>::to_vec),
            },
        )
    }

    /// `bind` with the configuration supplied by `provider`.
    pub async fn bind_with(
        provider: &dyn ConfigProvider,
        secret: Option<&[u8]>,
    ) -> DiscoveryResult<Self> {
        Self::bind(provider.discovery_config(), secret).await
    }

    /// Spawn the background loops. Starting a running service is a no-op.
    ///
    /// # Errors
    ///
    /// `DiscoveryError::Config` when called outside a tokio runtime.
    pub fn start(&self) -> DiscoveryResult<()> {
        let mut shutdown = self.shutdown.lock();
        if shutdown.is_some() {
            warn!(agent_id = %self.inner.local.agent_id, "Discovery service already running");
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DiscoveryError::Config(format!("no tokio runtime: {e}")))?;

        let (tx, rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);
        if self.inner.transport.is_listening() {
            tasks.push(runtime.spawn(super::listen::run(Arc::clone(&self.inner), rx.clone())));
        } else {
            warn!(
                agent_id = %self.inner.local.agent_id,
                "Send-only mode, peers will not be discovered by this node"
            );
        }
        tasks.push(runtime.spawn(super::announce::run(Arc::clone(&self.inner), rx)));

        *self.tasks.lock() = tasks;
        *shutdown = Some(tx);
        info!(
            agent_id = %self.inner.local.agent_id,
            addr = %format!("{}:{}", self.inner.local.ip, self.inner.local.port),
            listening = self.inner.transport.is_listening(),
            "Discovery service started"
        );
        Ok(())
    }

    /// Signal both loops and wait for them to exit. Idempotent.
    pub async fn stop(&self) {
        let Some(tx) = self.shutdown.lock().take() else {
            return;
        };
        let _ = tx.send(true);

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!(error = %e, "Discovery task panicked");
                }
            }
        }
        info!(agent_id = %self.inner.local.agent_id, "Discovery service stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.lock().is_some()
    }

    pub fn agent_id(&self) -> &str {
        &self.inner.local.agent_id
    }

    /// Identity advertised in outgoing payloads.
    pub fn local_agent(&self) -> &LocalAgent {
        &self.inner.local
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.inner.registry
    }

    /// Broadcast one ANNOUNCE outside the announce loop.
    pub async fn announce(&self) -> DiscoveryResult<usize> {
        self.inner
            .broadcast(MessageType::Announce, serde_json::Map::new())
            .await
    }

    /// Run one heartbeat round (HEARTBEAT, then SYNC if any peers are known).
    pub async fn heartbeat(&self) -> DiscoveryResult<usize> {
        super::announce::heartbeat_round(&self.inner).await
    }

    /// Run one datagram through the acceptance path.
    ///
    /// Returns the accepted message type, or `None` for our own echoes.
    pub async fn process_datagram(
        &self,
        bytes: &[u8],
        from: SocketAddr,
    ) -> DiscoveryResult<Option<MessageType>> {
        self.inner.process_datagram(bytes, from).await
    }
}

impl Drop for DiscoveryService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.get_mut().take() {
            let _ = tx.send(true);
        }
    }
}
