//! In-memory fakes for the external collaborator traits in [`crate::iface`],
//! used by the `#[cfg(test)]` unit tests next to the code they exercise.
//!
//! Grounded in the teacher crate's own `phy::Loopback` (a minimal fake
//! device that records what crosses the `Device` boundary) and the fake
//! interface conventions seen in the Fuchsia netstack3 core's test doubles.
//! `tests/scenarios.rs` defines its own equivalents against the public API,
//! since integration tests compile as a separate crate and cannot reach
//! `pub(crate)` items here.

use heapless::Vec as HVec;

use crate::addr::{IfaceId, Ipv4Address};
use crate::config::{IFACE_MAX, ROUTE_MAX};
use crate::iface::{ControlPacket, Interface, InterfaceTable, IpPacket, IpProtocol, IpSender, RouteEntry, RouteTable};

#[derive(Debug, Clone, Copy)]
pub(crate) struct FakeInterface {
    pub id: IfaceId,
    pub name: &'static str,
    pub address: Ipv4Address,
}

impl Interface for FakeInterface {
    fn id(&self) -> IfaceId {
        self.id
    }
    fn name(&self) -> &str {
        self.name
    }
    fn address(&self) -> Ipv4Address {
        self.address
    }
}

pub(crate) struct FakeIter<'a> {
    inner: core::slice::Iter<'a, FakeInterface>,
}

impl<'a> Iterator for FakeIter<'a> {
    type Item = &'a dyn Interface;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|i| i as &dyn Interface)
    }
}

#[derive(Default)]
pub(crate) struct FakeInterfaceTable {
    pub ifaces: HVec<FakeInterface, IFACE_MAX>,
}

impl FakeInterfaceTable {
    pub fn push(&mut self, id: usize, name: &'static str, address: Ipv4Address) {
        let _ = self.ifaces.push(FakeInterface {
            id: IfaceId::new(id).unwrap(),
            name,
            address,
        });
    }
}

impl InterfaceTable for FakeInterfaceTable {
    type Iter<'a> = FakeIter<'a> where Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        FakeIter {
            inner: self.ifaces.iter(),
        }
    }

    fn get(&self, id: IfaceId) -> Option<&dyn Interface> {
        self.ifaces.iter().find(|i| i.id == id).map(|i| i as &dyn Interface)
    }
}

/// No configured interfaces at all; used by tests that only exercise
/// per-tick bookkeeping (e.g. the startup-burst counter) and never touch
/// interface state.
pub(crate) struct NoInterfaces;

impl InterfaceTable for NoInterfaces {
    type Iter<'a> = core::iter::Empty<&'a dyn Interface> where Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        core::iter::empty()
    }

    fn get(&self, _id: IfaceId) -> Option<&dyn Interface> {
        None
    }
}

#[derive(Default)]
pub(crate) struct FakeRouteTable {
    pub routes: HVec<RouteEntry, ROUTE_MAX>,
}

impl RouteTable for FakeRouteTable {
    fn entries(&self) -> &[RouteEntry] {
        &self.routes
    }
}

/// An incoming datagram built by hand for a test case.
pub(crate) struct FakeIpPacket {
    pub src: Ipv4Address,
    pub dst: Ipv4Address,
    pub protocol: IpProtocol,
    pub ingress: IfaceId,
    pub payload: [u8; 8],
}

impl IpPacket for FakeIpPacket {
    fn src_addr(&self) -> Ipv4Address {
        self.src
    }
    fn dst_addr(&self) -> Ipv4Address {
        self.dst
    }
    fn protocol(&self) -> IpProtocol {
        self.protocol
    }
    fn ingress_iface(&self) -> IfaceId {
        self.ingress
    }
    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Records every emission for assertions, rather than doing anything with
/// them, mirroring the teacher's `Loopback` recording its last transmitted
/// buffer.
#[derive(Default)]
pub(crate) struct RecordingSender {
    pub sent: HVec<ControlPacket, 32>,
    pub fragmented: HVec<(IfaceId, Ipv4Address, Ipv4Address), 32>,
}

impl IpSender for RecordingSender {
    fn send(&mut self, packet: ControlPacket) {
        let _ = self.sent.push(packet);
    }

    fn send_fragmented(&mut self, dst_iface: IfaceId, original: &dyn IpPacket) {
        let _ = self
            .fragmented
            .push((dst_iface, original.src_addr(), original.dst_addr()));
    }
}

/// No-op sender for tests that only care about state transitions, not
/// emitted traffic.
pub(crate) struct NullSender;

impl IpSender for NullSender {
    fn send(&mut self, _packet: ControlPacket) {}
    fn send_fragmented(&mut self, _dst_iface: IfaceId, _original: &dyn IpPacket) {}
}
