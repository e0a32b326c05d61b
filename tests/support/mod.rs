//! In-memory fakes for the external collaborator traits (spec.md §1, §6),
//! built against the crate's public API rather than the `pub(crate)` fakes
//! in `src/test_support.rs` (those aren't visible to integration tests,
//! which compile as a separate crate). Grounded the same way as the
//! in-tree fakes: the teacher's `phy::Loopback`, a minimal device that
//! just records what crosses the boundary.

use heapless::Vec as HVec;

use mcast_router_core::iface::ControlPacket as CorePacket;
use mcast_router_core::{
    IfaceId, Interface, InterfaceTable, IpPacket, IpProtocol, IpSender, Ipv4Address, RouteEntry, RouteTable,
};

pub struct FakeInterface {
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

pub struct FakeIter<'a> {
    inner: core::slice::Iter<'a, FakeInterface>,
}

impl<'a> Iterator for FakeIter<'a> {
    type Item = &'a dyn Interface;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|i| i as &dyn Interface)
    }
}

#[derive(Default)]
pub struct FakeInterfaceTable {
    pub ifaces: Vec<FakeInterface>,
}

impl FakeInterfaceTable {
    pub fn push(&mut self, id: usize, name: &'static str, address: Ipv4Address) {
        self.ifaces.push(FakeInterface {
            id: IfaceId::new(id).unwrap(),
            name,
            address,
        });
    }
}

impl InterfaceTable for FakeInterfaceTable {
    type Iter<'a> = FakeIter<'a> where Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        FakeIter { inner: self.ifaces.iter() }
    }

    fn get(&self, id: IfaceId) -> Option<&dyn Interface> {
        self.ifaces.iter().find(|i| i.id == id).map(|i| i as &dyn Interface)
    }
}

#[derive(Default)]
pub struct FakeRouteTable {
    pub routes: Vec<RouteEntry>,
}

impl RouteTable for FakeRouteTable {
    fn entries(&self) -> &[RouteEntry] {
        &self.routes
    }
}

pub struct FakeIpPacket {
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

#[derive(Default)]
pub struct RecordingSender {
    pub sent: HVec<CorePacket, 32>,
    pub fragmented: Vec<(IfaceId, Ipv4Address, Ipv4Address)>,
}

impl IpSender for RecordingSender {
    fn send(&mut self, packet: CorePacket) {
        let _ = self.sent.push(packet);
    }

    fn send_fragmented(&mut self, dst_iface: IfaceId, original: &dyn IpPacket) {
        self.fragmented.push((dst_iface, original.src_addr(), original.dst_addr()));
    }
}
