//! External collaborator interfaces (spec.md §1, §6).
//!
//! These traits are the boundary between this crate's control-plane logic
//! and the rest of a real software router: the unicast route table, the
//! IP send/fragmentation pipeline, and interface enumeration. Expressing
//! them as traits — rather than requiring a concrete network stack — is
//! what lets `tests/scenarios.rs` drive the S1-S6 scenarios from spec.md
//! §8 against small in-memory fakes, the same way the teacher crate runs
//! `Interface` against a `Loopback` device instead of a real NIC.

use crate::addr::{EthernetAddress, Ipv4Address};
use crate::time::Instant;
use crate::wire::igmp;

pub use crate::addr::IfaceId;

/// A configured interface. Borrowed handles only; owned by whatever
/// implements [`InterfaceTable`].
pub trait Interface {
    fn id(&self) -> IfaceId;
    fn name(&self) -> &str;
    fn address(&self) -> Ipv4Address;
}

/// Iterates configured interfaces in ascending id order (spec.md §5:
/// "the iteration order over interfaces is the ascending interface-id
/// order; this determines the order of packet duplication on fan-out").
pub trait InterfaceTable {
    type Iter<'a>: Iterator<Item = &'a dyn Interface>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_>;

    fn get(&self, id: IfaceId) -> Option<&dyn Interface>;
}

/// The IP protocol number carried by an [`IpPacket`]. Only the IGMP value
/// is meaningful to this crate; everything else is "user traffic".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpProtocol(pub u8);

impl IpProtocol {
    /// The standard IGMP protocol number.
    pub const IGMP: IpProtocol = IpProtocol(2);
}

/// A read-only view of an arriving IP datagram, as handed to
/// [`crate::Router::process`].
///
/// The control plane never needs more than this: source/destination
/// address, protocol number, ingress interface, and the raw payload bytes
/// (interpreted as an IGMP/DVMRP header when the protocol is IGMP; opaque
/// otherwise).
pub trait IpPacket {
    fn src_addr(&self) -> Ipv4Address;
    fn dst_addr(&self) -> Ipv4Address;
    fn protocol(&self) -> IpProtocol;
    fn ingress_iface(&self) -> IfaceId;
    fn payload(&self) -> &[u8];
}

/// A single DVMRP/IGMP route entry, as read from the unicast route table
/// (spec.md §3's external "unicast routing table" collaborator, narrowed
/// to the fields [`crate::dvmrp::DvmrpEngine::route_refresh`] needs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub network: Ipv4Address,
    pub netmask: Ipv4Address,
    pub nexthop: Ipv4Address,
    pub iface: IfaceId,
}

/// A read-only snapshot of the unicast route table.
pub trait RouteTable {
    fn entries(&self) -> &[RouteEntry];
}

/// A control-plane emission: a fully-addressed IGMP/DVMRP message ready
/// for the IP layer to complete (header checksum, ARP resolution,
/// framing) and transmit. TTL is always [`crate::config::CONTROL_TTL`].
#[derive(Debug, Clone, Copy)]
pub struct ControlPacket {
    pub dst_iface: IfaceId,
    pub src_addr: Ipv4Address,
    pub dst_addr: Ipv4Address,
    pub dst_mac: EthernetAddress,
    pub ttl: u8,
    pub payload: [u8; igmp::HEADER_LEN],
}

/// The downward-facing IP sending pipeline (spec.md §6): `send` for
/// control-plane emissions (queries, reports, PROBE/REPORT/PRUNE/GRAFT/
/// LEAF), `send_fragmented` for duplicating an existing user datagram
/// onto another egress interface, fragmenting if its payload exceeds the
/// egress MTU.
pub trait IpSender {
    fn send(&mut self, packet: ControlPacket);
    fn send_fragmented(&mut self, dst_iface: IfaceId, original: &dyn IpPacket);
}

/// The periodic-timer facility (spec.md §6): schedules a recurring
/// callback; the callback's return value decides whether it is
/// rescheduled (spec.md §5's "Cancellation & timeouts").
#[cfg(feature = "std")]
pub trait Timer {
    fn schedule(&mut self, period: crate::time::Duration, callback: Box<dyn FnMut(Instant) -> bool>);
}

/// The operator CLI shell (spec.md §6): registers a named command and its
/// argv callback.
#[cfg(feature = "std")]
pub trait CliRegistry {
    fn register(&mut self, name: &str, handler: Box<dyn FnMut(&[&str])>);
}
