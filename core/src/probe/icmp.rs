//! ICMP echo prober.
//!
//! All concurrent probes share one raw Layer-4 channel per IP version. A
//! listener thread per channel drains the socket into an async queue; a
//! dispatcher task parses replies and completes the matching probe's
//! oneshot, keyed by the echo identifier. Each probe therefore owns no
//! socket of its own and suspends only on its reply-or-timeout wait.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::icmpv6::Icmpv6Packet;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportSender,
};
use tokio::net::lookup_host;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use sweepr_common::network::address::Address;
use sweepr_protocols as protocol;

use super::{Prober, Status};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP_V4: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const CHANNEL_TYPE_ICMP_V6: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv6(IpNextHeaderProtocols::Icmpv6));

type PendingMap = Arc<Mutex<HashMap<u16, oneshot::Sender<()>>>>;
type ReplyParser = fn(&[u8]) -> anyhow::Result<(u16, u16)>;

macro_rules! spawn_listener {
    ($queue_tx:expr, $rx:expr, $iter_func:path) => {
        std::thread::spawn(move || {
            let mut iterator = $iter_func(&mut $rx);
            loop {
                if let Ok((packet, source_addr)) = iterator.next() {
                    if $queue_tx.send((packet.packet().to_vec(), source_addr)).is_err() {
                        break;
                    }
                }
            }
        })
    };
}

struct ChannelHandle {
    tx: Arc<Mutex<TransportSender>>,
    pending: PendingMap,
}

impl ChannelHandle {
    fn open_v4() -> anyhow::Result<Self> {
        let (tx, mut rx_socket) = transport::transport_channel(
            TRANSPORT_BUFFER_SIZE,
            CHANNEL_TYPE_ICMP_V4,
        )?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        spawn_listener!(queue_tx, rx_socket, pnet::transport::icmp_packet_iter);
        Ok(Self::with_dispatcher(tx, queue_rx, protocol::icmp::parse_echo_reply))
    }

    fn open_v6() -> anyhow::Result<Self> {
        let (tx, mut rx_socket) = transport::transport_channel(
            TRANSPORT_BUFFER_SIZE,
            CHANNEL_TYPE_ICMP_V6,
        )?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        spawn_listener!(queue_tx, rx_socket, pnet::transport::icmpv6_packet_iter);
        Ok(Self::with_dispatcher(tx, queue_rx, protocol::icmpv6::parse_echo_reply))
    }

    fn with_dispatcher(
        tx: TransportSender,
        mut queue_rx: mpsc::UnboundedReceiver<(Vec<u8>, IpAddr)>,
        parse: ReplyParser,
    ) -> Self {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let pending_ref = pending.clone();
        tokio::spawn(async move {
            while let Some((bytes, source_addr)) = queue_rx.recv().await {
                match parse(&bytes) {
                    Ok((identifier, _sequence)) => {
                        let waiter = pending_ref.lock().unwrap().remove(&identifier);
                        if let Some(reply_tx) = waiter {
                            trace!("echo reply from {source_addr}");
                            let _ = reply_tx.send(());
                        }
                    }
                    Err(e) => trace!("ignoring packet from {source_addr}: {e}"),
                }
            }
        });

        Self {
            tx: Arc::new(Mutex::new(tx)),
            pending,
        }
    }

    fn register(&self, identifier: u16, reply_tx: oneshot::Sender<()>) {
        self.pending.lock().unwrap().insert(identifier, reply_tx);
    }

    fn forget(&self, identifier: u16) {
        self.pending.lock().unwrap().remove(&identifier);
    }
}

pub struct IcmpProber {
    v4: ChannelHandle,
    v6: Option<ChannelHandle>,
    timeout: Duration,
    packet_count: u32,
    id_counter: AtomicU16,
}

impl IcmpProber {
    /// Opens the shared raw channels. Raw ICMP sockets need elevated
    /// privileges, so this is the one place a probing failure is allowed
    /// to surface as an error. Must run inside a tokio runtime.
    pub fn new(timeout: Duration, packet_count: u32) -> anyhow::Result<Self> {
        let v4 = ChannelHandle::open_v4().context("opening ICMP channel")?;
        let v6 = match ChannelHandle::open_v6() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("ICMPv6 unavailable, IPv6-only hosts will probe as offline: {e}");
                None
            }
        };

        Ok(Self {
            v4,
            v6,
            timeout,
            packet_count: packet_count.max(1),
            id_counter: AtomicU16::new(rand::random()),
        })
    }

    /// Resolves an address to the IP the echo is sent to. IP literals
    /// skip resolution; hostnames go through the system resolver, IPv4
    /// answers preferred.
    async fn resolve(&self, address: &Address) -> Option<IpAddr> {
        if let Ok(ip) = address.as_str().parse::<IpAddr>() {
            return Some(ip);
        }

        let answers = lookup_host((address.as_str(), 0u16)).await.ok()?;
        let ips: Vec<IpAddr> = answers.map(|sock_addr| sock_addr.ip()).collect();

        ips.iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| ips.first())
            .copied()
    }

    /// One echo exchange: register, send, wait. `Ok(true)` on a reply
    /// within the deadline, `Ok(false)` on timeout.
    async fn echo_once(&self, ip: IpAddr, sequence: u16) -> anyhow::Result<bool> {
        let handle: &ChannelHandle = match ip {
            IpAddr::V4(_) => &self.v4,
            IpAddr::V6(_) => self.v6.as_ref().context("no ICMPv6 channel")?,
        };

        let identifier = self.next_identifier();
        let (reply_tx, reply_rx) = oneshot::channel();

        // Registered before sending so a fast reply cannot slip past.
        handle.register(identifier, reply_tx);

        let bytes: Vec<u8> = match ip {
            IpAddr::V4(_) => protocol::icmp::create_echo_request(identifier, sequence)?,
            IpAddr::V6(dst_addr) => {
                let src_addr = local_source_v6(dst_addr);
                protocol::icmpv6::create_echo_request(identifier, sequence, src_addr, dst_addr)?
            }
        };

        let tx = handle.tx.clone();
        let sent = tokio::task::spawn_blocking(move || send_bytes(&tx, &bytes, ip)).await?;
        if let Err(e) = sent {
            handle.forget(identifier);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(())) => Ok(true),
            _ => {
                handle.forget(identifier);
                Ok(false)
            }
        }
    }

    fn next_identifier(&self) -> u16 {
        self.id_counter.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, address: &Address) -> Status {
        let Some(ip) = self.resolve(address).await else {
            return Status::HostNotFound;
        };

        for sequence in 0..self.packet_count {
            match self.echo_once(ip, sequence as u16).await {
                Ok(true) => return Status::Online,
                Ok(false) => {}
                Err(e) => debug!("probe of {address} failed: {e}"),
            }
        }

        Status::Offline
    }
}

fn send_bytes(
    tx: &Mutex<TransportSender>,
    bytes: &[u8],
    destination: IpAddr,
) -> anyhow::Result<()> {
    let mut sender = tx.lock().unwrap();
    match destination {
        IpAddr::V4(_) => {
            let pkt = IcmpPacket::new(bytes).context("assembling echo request")?;
            sender.send_to(pkt, destination)?;
        }
        IpAddr::V6(_) => {
            let pkt = Icmpv6Packet::new(bytes).context("assembling echo request")?;
            sender.send_to(pkt, destination)?;
        }
    }
    Ok(())
}

/// Source address the kernel would route towards `dst_addr`, discovered
/// with a connected UDP socket. Needed for the ICMPv6 pseudo-header
/// checksum; falls back to the unspecified address.
fn local_source_v6(dst_addr: Ipv6Addr) -> Ipv6Addr {
    let local_addr = std::net::UdpSocket::bind(("::", 0))
        .and_then(|socket| socket.connect((dst_addr, 53)).map(|_| socket))
        .and_then(|socket| socket.local_addr());

    match local_addr {
        Ok(std::net::SocketAddr::V6(v6)) => *v6.ip(),
        _ => Ipv6Addr::UNSPECIFIED,
    }
}
