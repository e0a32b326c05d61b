//! Dispatch-table wiring (spec.md §9): the single place that owns the
//! Membership Table, the IGMP Engine and the DVMRP Engine together, and
//! exposes the Multicast Forwarder's single entry point.
//!
//! spec.md §9 notes that MF, IGE and DVE call into each other and that the
//! cycle should be broken "via a single dispatch table initialised at
//! startup". In idiomatic Rust that dispatch table is just ownership:
//! `Router` owns all three components outright, so `IgmpEngine::process`
//! and `DvmrpEngine::forward`/`process` take the sibling components as
//! plain `&mut` parameters instead of holding `Rc`/trait-object handles
//! back to each other. There is exactly one cycle in the spec (IGE's
//! DVMRP-subtyped branch calls into DVE) and threading the borrow through
//! `Router::process` resolves it without runtime indirection.

use crate::addr::Ipv4Address;
use crate::config::Tunables;
use crate::dvmrp::DvmrpEngine;
use crate::forwarder::Consumed;
use crate::iface::{IfaceId, InterfaceTable, IpPacket, IpProtocol, IpSender, RouteTable};
use crate::igmp::IgmpEngine;
use crate::membership::MembershipTable;
use crate::time::Instant;

/// Owns the Membership Table, IGMP Engine and DVMRP Engine, and is the
/// crate's single entry point for an arriving datagram (spec.md §4.4).
///
/// `Router` mutates its tables only from whichever thread calls its
/// methods (spec.md §5: "all timer callbacks and all packet-processing
/// entries run on one logical event loop"). If a caller's IP input and
/// timer facility run on different OS threads, it is the caller's
/// responsibility to serialize calls into `Router` onto one of them —
/// this type holds no internal lock, by design (see DESIGN.md).
pub struct Router {
    membership: MembershipTable,
    igmp: IgmpEngine,
    dvmrp: DvmrpEngine,
    tunables: Tunables,
}

impl Router {
    pub fn new(tunables: Tunables) -> Router {
        Router {
            membership: MembershipTable::new(),
            igmp: IgmpEngine::with_startup_count(tunables.igmp_query_startup_count),
            dvmrp: DvmrpEngine::with_startup_count(tunables.dvmrp_startup_count),
            tunables,
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn membership(&self) -> &MembershipTable {
        &self.membership
    }

    pub fn dvmrp(&self) -> &DvmrpEngine {
        &self.dvmrp
    }

    /// `igmp_init()` (spec.md §6): resets the IGMP engine's startup-burst
    /// state, as if the process had just come up.
    pub fn igmp_init(&mut self) {
        self.igmp = IgmpEngine::with_startup_count(self.tunables.igmp_query_startup_count);
    }

    /// `dvmrp_init()` (spec.md §6, the `dvmrp init` operator command):
    /// reimports the DVMRP route table from the unicast route table.
    pub fn dvmrp_init<R: RouteTable + ?Sized>(&mut self, routes: &R) {
        self.dvmrp.route_refresh(routes);
    }

    /// `mcast_init()`: brings up both engines.
    pub fn mcast_init<R: RouteTable + ?Sized>(&mut self, routes: &R) {
        self.igmp_init();
        self.dvmrp_init(routes);
    }

    /// `mcast_process(packet) -> consumed` (spec.md §4.4, §6): the
    /// forwarder's single entry point. IGMP-protocol traffic is handed to
    /// the IGMP engine; everything else is user multicast traffic handed
    /// to the DVMRP forwarding decision.
    pub fn process<I, S>(&mut self, packet: &dyn IpPacket, ifaces: &I, sender: &mut S, now: Instant) -> Consumed
    where
        I: InterfaceTable,
        S: IpSender,
    {
        if packet.protocol() == IpProtocol::IGMP {
            self.igmp
                .process(packet, &mut self.dvmrp, &mut self.membership, ifaces, sender, now)
        } else {
            self.dvmrp.forward(packet, ifaces, &self.membership, sender, now)
        }
    }

    /// `mcast_membership_add(iface, group)`.
    pub fn membership_add(&mut self, iface: IfaceId, group: Ipv4Address, now: Instant) {
        self.membership.add(iface, group, now);
    }

    /// `mcast_membership_remove(iface, group)`.
    pub fn membership_remove(&mut self, iface: IfaceId, group: Ipv4Address) {
        self.membership.remove(iface, group);
    }

    /// `mcast_membership_get(iface, group)`.
    pub fn membership_get(&self, iface: IfaceId, group: Ipv4Address) -> bool {
        self.membership.contains(iface, group)
    }

    /// `dvmrp_forward(packet) -> consumed`, called directly by callers
    /// that already know a packet is user multicast traffic (most callers
    /// should go through [`Router::process`] instead).
    pub fn dvmrp_forward<I, S>(&mut self, packet: &dyn IpPacket, ifaces: &I, sender: &mut S, now: Instant) -> Consumed
    where
        I: InterfaceTable,
        S: IpSender,
    {
        self.dvmrp.forward(packet, ifaces, &self.membership, sender, now)
    }

    /// `dvmrp_graft(group, iface)`: invoked when local membership
    /// reappears for a previously-pruned group on `iface`.
    pub fn dvmrp_graft<I, S>(&mut self, group: Ipv4Address, iface: IfaceId, ifaces: &I, sender: &mut S)
    where
        I: InterfaceTable,
        S: IpSender,
    {
        self.dvmrp.graft(group, iface, ifaces, sender);
    }

    /// Driven by the accelerated/steady-state IGMP query timer (spec.md
    /// §4.2); returns whether the accelerated timer should keep
    /// rescheduling.
    pub fn query_tick<I, S>(&mut self, ifaces: &I, sender: &mut S) -> bool
    where
        I: InterfaceTable,
        S: IpSender,
    {
        self.igmp.query_tick(ifaces, sender)
    }

    /// Driven by the accelerated/steady-state DVMRP PROBE timer (spec.md
    /// §4.3.2); returns whether the accelerated timer should keep
    /// rescheduling.
    pub fn probe_tick<I, S>(&mut self, ifaces: &I, sender: &mut S) -> bool
    where
        I: InterfaceTable,
        S: IpSender,
    {
        self.dvmrp.probe_tick(ifaces, sender)
    }

    /// Driven by the membership expirer timer (spec.md §4.1); returns the
    /// number of records removed, for logging.
    pub fn expire_tick(&mut self, now: Instant) -> usize {
        self.membership
            .expire_tick(now, crate::time::Duration::from_secs(self.tunables.mcast_membership_expiration))
    }
}
