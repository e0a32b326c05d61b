//! The DVMRP Engine (spec.md §4.3): edge/router classification, reverse-path
//! forwarding, and per-source prune/graft state.
//!
//! Route-group state is kept as a flat linear-scan vector keyed by group
//! address rather than a map, per spec.md §9 ("expected cardinality is tiny
//! ... a flat small-vector of (group, record) pairs suffices") — the same
//! call [`crate::membership::MembershipTable`] makes for its per-interface
//! sub-tables.

use heapless::Vec as HVec;

use crate::addr::{masked_eq, IfaceId, Ipv4Address};
use crate::config::{DVMRP_STARTUP_COUNT, IFACE_MAX, MAX_GROUPS_PER_ROUTE, ROUTE_MAX};
use crate::error::Error;
use crate::forwarder::Consumed;
use crate::iface::{InterfaceTable, IpPacket, IpSender, RouteEntry, RouteTable};
use crate::igmp::send;
use crate::membership::MembershipTable;
use crate::net_debug;
use crate::net_trace;
use crate::net_warn;
use crate::time::Instant;
use crate::wire::igmp::{DvmrpSubtype, Repr};

/// Per-(source-route, group) prune/graft bookkeeping (spec.md §3
/// "route-group record").
#[derive(Debug, Clone, Copy)]
pub struct RouteGroup {
    /// Whether we have emitted a PRUNE upstream for this pair.
    pub prune_sent: bool,
    /// Per downstream interface, the time a PRUNE was received from it, or
    /// `None` if that interface is not currently pruned.
    pub pruned: [Option<Instant>; IFACE_MAX],
}

impl Default for RouteGroup {
    fn default() -> Self {
        RouteGroup {
            prune_sent: false,
            pruned: [None; IFACE_MAX],
        }
    }
}

impl RouteGroup {
    fn is_pruned(&self, iface: IfaceId) -> bool {
        self.pruned[iface.index()].is_some()
    }
}

/// Flat (group, record) vector backing one [`RouteRecord`]'s per-group
/// prune state (spec.md §9).
#[derive(Default)]
pub struct RouteGroupMap {
    entries: HVec<(Ipv4Address, RouteGroup), MAX_GROUPS_PER_ROUTE>,
}

impl RouteGroupMap {
    /// Fetches the record for `group`, inserting a zero-initialised one if
    /// absent (spec.md §4.3.3 step 3).
    pub fn get_or_insert(&mut self, group: Ipv4Address) -> &mut RouteGroup {
        if let Some(pos) = self.entries.iter().position(|(g, _)| *g == group) {
            return &mut self.entries[pos].1;
        }
        let _ = self.entries.push((group, RouteGroup::default()));
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }

    pub fn get(&self, group: Ipv4Address) -> Option<&RouteGroup> {
        self.entries.iter().find(|(g, _)| *g == group).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, group: Ipv4Address) -> Option<&mut RouteGroup> {
        self.entries.iter_mut().find(|(g, _)| *g == group).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Address, &RouteGroup)> {
        self.entries.iter().map(|(g, r)| (*g, r))
    }
}

/// One DVMRP route record imported from the unicast route table (spec.md
/// §3), plus the per-group prune/graft state hung off it.
pub struct RouteRecord {
    pub network: Ipv4Address,
    pub netmask: Ipv4Address,
    pub nexthop: Ipv4Address,
    /// The upstream interface toward the source network.
    pub iface: IfaceId,
    /// Downstream candidate interfaces; false for `iface` itself and for
    /// any interface that has declared itself a LEAF for this source.
    pub children: [bool; IFACE_MAX],
    pub groups: RouteGroupMap,
}

impl RouteRecord {
    fn from_entry(entry: &RouteEntry) -> RouteRecord {
        let mut children = [true; IFACE_MAX];
        children[entry.iface.index()] = false;
        RouteRecord {
            network: entry.network,
            netmask: entry.netmask,
            nexthop: entry.nexthop,
            iface: entry.iface,
            children,
            groups: RouteGroupMap::default(),
        }
    }

    fn matches_source(&self, src: Ipv4Address) -> bool {
        masked_eq(src, self.network, self.netmask)
    }
}

/// Router-side DVMRP state: per-interface edge classification, and the
/// route table imported from the unicast route table.
pub struct DvmrpEngine {
    /// `is_edge[i]`: true until interface `i` is heard from as a DVMRP
    /// router (spec.md §3 "Interface classification").
    edge: [bool; IFACE_MAX],
    routes: HVec<RouteRecord, ROUTE_MAX>,
    startup_ticks_remaining: u32,
}

impl Default for DvmrpEngine {
    fn default() -> Self {
        DvmrpEngine::new()
    }
}

impl DvmrpEngine {
    pub fn new() -> DvmrpEngine {
        DvmrpEngine::with_startup_count(DVMRP_STARTUP_COUNT)
    }

    /// Builds an engine whose accelerated startup PROBE burst runs for
    /// `startup_count` ticks, per
    /// [`crate::config::Tunables::dvmrp_startup_count`] rather than the
    /// compiled-in [`DVMRP_STARTUP_COUNT`] default.
    pub fn with_startup_count(startup_count: u32) -> DvmrpEngine {
        DvmrpEngine {
            edge: [true; IFACE_MAX],
            routes: HVec::new(),
            startup_ticks_remaining: startup_count,
        }
    }

    pub fn is_edge(&self, iface: IfaceId) -> bool {
        self.edge[iface.index()]
    }

    /// Read-only access to the imported route records, in import order,
    /// for the `dvmrp show` CLI command.
    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    fn find_route(&self, src: Ipv4Address) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.matches_source(src))
    }

    fn find_route_mut(&mut self, src: Ipv4Address) -> Option<&mut RouteRecord> {
        self.routes.iter_mut().find(|r| r.matches_source(src))
    }

    /// `route_refresh()` (spec.md §4.3.6): discards any existing route
    /// records and rebuilds the table from a fresh unicast-route snapshot.
    /// Pre-existing prune/graft state is lost, which is acceptable because
    /// topology is assumed static across a run (spec.md §1 Non-goals) and
    /// this is only ever triggered by the operator `dvmrp init` command.
    pub fn route_refresh<R: RouteTable + ?Sized>(&mut self, routes: &R) {
        self.routes.clear();
        for entry in routes.entries() {
            if self.routes.push(RouteRecord::from_entry(entry)).is_err() {
                net_debug!("dvmrp: route table full, dropping remaining entries");
                break;
            }
        }
        net_debug!("dvmrp: imported {} route(s)", self.routes.len());
    }

    /// Sends one PROBE on every interface (spec.md §4.3.2). Returns
    /// whether the caller's accelerated startup timer should keep
    /// rescheduling, mirroring [`crate::igmp::IgmpEngine::query_tick`].
    pub fn probe_tick<I, S>(&mut self, ifaces: &I, sender: &mut S) -> bool
    where
        I: InterfaceTable,
        S: IpSender,
    {
        net_trace!("dvmrp: sending probe on all interfaces");
        for iface in ifaces.iter() {
            let repr = Repr::Dvmrp {
                subtype: DvmrpSubtype::Probe,
                group_address: Ipv4Address::UNSPECIFIED,
            };
            send(sender, iface.id(), iface.address(), Ipv4Address::ALL_DVMRP, repr);
        }

        if self.startup_ticks_remaining > 0 {
            self.startup_ticks_remaining -= 1;
            self.startup_ticks_remaining > 0
        } else {
            false
        }
    }

    pub fn startup_complete(&self) -> bool {
        self.startup_ticks_remaining == 0
    }

    /// The forwarding decision (spec.md §4.3.3) for an arriving user
    /// multicast datagram.
    pub fn forward<I, S>(
        &mut self,
        packet: &dyn IpPacket,
        ifaces: &I,
        membership: &MembershipTable,
        sender: &mut S,
        _now: Instant,
    ) -> Consumed
    where
        I: InterfaceTable,
        S: IpSender,
    {
        let src = packet.src_addr();
        let group = packet.dst_addr();
        let ingress = packet.ingress_iface();

        let Some(route) = self.find_route(src) else {
            net_debug!("dvmrp: {}: no route to source {}", Error::NoRouteToSource, src);
            return Consumed::No;
        };

        if route.iface != ingress {
            net_debug!(
                "dvmrp: {} for {} on {} (expected {}), sending LEAF",
                Error::ReversePathFail,
                src,
                ingress,
                route.iface
            );
            self.send_leaf(ingress, src, ifaces, sender);
            return Consumed::No;
        }

        // Re-borrow mutably now that the RPF check only needed a shared
        // view; `find_route` above and `find_route_mut` below cannot be
        // merged into one borrow because the LEAF path must not mutate.
        let route = self.find_route_mut(src).expect("matched above");
        let children = route.children;
        let route_group = route.groups.get_or_insert(group);

        let mut should_prune = true;
        for iface in ifaces.iter() {
            let i = iface.id();
            if i == ingress {
                continue;
            }
            let included = if self.edge[i.index()] {
                membership.contains(i, group)
            } else {
                children[i.index()] && !route_group.is_pruned(i)
            };
            net_trace!(
                "dvmrp: forward {} -> {} via {}: {}",
                src,
                group,
                i,
                if included { "yes" } else { "no" }
            );
            if included {
                should_prune = false;
                sender.send_fragmented(i, packet);
            }
        }

        if should_prune && !self.edge[ingress.index()] {
            net_debug!("dvmrp: no downstream interest for {} on {}, sending PRUNE", group, ingress);
            let Some(iface) = ifaces.get(ingress) else {
                net_warn!("dvmrp: PRUNE suppressed, unknown ingress interface {}", ingress);
                return Consumed::Yes;
            };
            let repr = Repr::Dvmrp {
                subtype: DvmrpSubtype::Prune,
                group_address: src,
            };
            send(sender, ingress, iface.address(), Ipv4Address::ALL_DVMRP, repr);
            route_group.prune_sent = true;
        }

        Consumed::Yes
    }

    fn send_leaf<I, S>(&self, ingress: IfaceId, source: Ipv4Address, ifaces: &I, sender: &mut S)
    where
        I: InterfaceTable,
        S: IpSender,
    {
        let Some(iface) = ifaces.get(ingress) else {
            net_warn!("dvmrp: LEAF suppressed, unknown ingress interface {}", ingress);
            return;
        };
        let repr = Repr::Dvmrp {
            subtype: DvmrpSubtype::Leaf,
            group_address: source,
        };
        send(sender, ingress, iface.address(), Ipv4Address::ALL_DVMRP, repr);
    }

    /// Control-message handling (spec.md §4.3.4).
    pub fn process<I, S>(
        &mut self,
        packet: &dyn IpPacket,
        subtype: DvmrpSubtype,
        group_address: Ipv4Address,
        ifaces: &I,
        sender: &mut S,
        now: Instant,
    ) -> Consumed
    where
        I: InterfaceTable,
        S: IpSender,
    {
        let ingress = packet.ingress_iface();
        match subtype {
            DvmrpSubtype::Probe => {
                let Some(iface) = ifaces.get(ingress) else {
                    net_warn!("dvmrp: PROBE on unknown interface {}", ingress);
                    return Consumed::No;
                };
                let repr = Repr::Dvmrp {
                    subtype: DvmrpSubtype::Report,
                    group_address,
                };
                send(sender, ingress, iface.address(), Ipv4Address::ALL_DVMRP, repr);
                net_debug!("dvmrp: echoed REPORT on {} in reply to PROBE", ingress);
                Consumed::Yes
            }
            DvmrpSubtype::Report => {
                if self.edge[ingress.index()] {
                    net_debug!("dvmrp: {} is no longer an edge interface", ingress);
                }
                self.edge[ingress.index()] = false;
                Consumed::No
            }
            DvmrpSubtype::Prune => {
                let group = packet.dst_addr();
                let source = group_address;
                match self.find_route_mut(source) {
                    Some(route) => {
                        let route_group = route.groups.get_or_insert(group);
                        route_group.pruned[ingress.index()] = Some(now);
                        net_debug!("dvmrp: {} pruned {} for source {}", ingress, group, source);
                    }
                    None => net_debug!("dvmrp: PRUNE for unknown source {}, dropping", source),
                }
                Consumed::Yes
            }
            DvmrpSubtype::Graft => {
                self.graft(group_address, ingress, ifaces, sender);
                Consumed::Yes
            }
            DvmrpSubtype::Leaf => {
                match self.find_route_mut(group_address) {
                    Some(route) => {
                        route.children[ingress.index()] = false;
                        net_debug!("dvmrp: {} is no longer a child for source {}", ingress, group_address);
                    }
                    None => net_debug!("dvmrp: LEAF for unknown source {}, dropping", group_address),
                }
                Consumed::No
            }
            DvmrpSubtype::Unknown(v) => {
                net_debug!("dvmrp: silently dropping unknown subtype {}", v);
                Consumed::No
            }
        }
    }

    /// Graft propagation (spec.md §4.3.5): local membership for `group`
    /// reappeared on `in`, so re-subscribe any upstream chain we had
    /// pruned on `group`'s account.
    pub fn graft<I, S>(&mut self, group: Ipv4Address, in_iface: IfaceId, ifaces: &I, sender: &mut S)
    where
        I: InterfaceTable,
        S: IpSender,
    {
        let mut marked = [false; IFACE_MAX];
        for route in self.routes.iter_mut() {
            if route.iface == in_iface {
                continue;
            }
            if let Some(route_group) = route.groups.get_mut(group) {
                route_group.pruned[in_iface.index()] = None;
                if route_group.prune_sent {
                    route_group.prune_sent = false;
                    marked[route.iface.index()] = true;
                }
            }
        }

        for iface in ifaces.iter() {
            if !marked[iface.id().index()] {
                continue;
            }
            net_debug!("dvmrp: sending GRAFT on {} for {}", iface.id(), group);
            let repr = Repr::Dvmrp {
                subtype: DvmrpSubtype::Graft,
                group_address: group,
            };
            send(sender, iface.id(), iface.address(), Ipv4Address::ALL_DVMRP, repr);
        }
    }
}
