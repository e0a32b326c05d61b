//! The IGMP Engine (spec.md §4.2): emits periodic membership queries,
//! processes incoming IGMP queries/reports, and hands DVMRP-subtyped
//! messages down to the DVMRP engine.

use crate::addr::{ip_to_mac, IfaceId, Ipv4Address};
use crate::config::{IGMP_QUERY_STARTUP_COUNT, IGMP_QUERY_STARTUP_RATE};
use crate::dvmrp::DvmrpEngine;
use crate::error::Error;
use crate::forwarder::Consumed;
use crate::iface::{ControlPacket, IpPacket, IpSender, InterfaceTable};
use crate::membership::MembershipTable;
use crate::time::Instant;
use crate::wire::igmp::{self as wire, Repr};
use crate::{net_debug, net_trace, net_warn};

/// Host/querier-side IGMP state.
///
/// Holds only what spec.md §4.2 says it must: the startup-burst counter
/// for the accelerated query phase, and (per this crate's resolution of
/// spec.md §9 Open Question 1 — see `DESIGN.md`) the set of interfaces on
/// which we have lost a querier election and so suppress our own queries.
pub struct IgmpEngine {
    startup_ticks_remaining: u32,
    query_suppressed: [bool; crate::config::IFACE_MAX],
}

impl Default for IgmpEngine {
    fn default() -> Self {
        IgmpEngine::new()
    }
}

impl IgmpEngine {
    pub fn new() -> IgmpEngine {
        IgmpEngine::with_startup_count(IGMP_QUERY_STARTUP_COUNT)
    }

    /// Builds an engine whose accelerated startup burst runs for
    /// `startup_count` ticks, per [`crate::config::Tunables::igmp_query_startup_count`]
    /// rather than the compiled-in [`IGMP_QUERY_STARTUP_COUNT`] default.
    pub fn with_startup_count(startup_count: u32) -> IgmpEngine {
        IgmpEngine {
            startup_ticks_remaining: startup_count,
            query_suppressed: [false; crate::config::IFACE_MAX],
        }
    }

    /// Sends one QUERY to 224.0.0.1 on every interface that is not
    /// currently suppressed. Returns `true` if the caller's accelerated
    /// startup timer should keep rescheduling (spec.md §5: "the
    /// startup-burst timer uses a decrement-to-zero counter").
    ///
    /// Callers register this against *two* timers, exactly as
    /// [`crate::dvmrp::DvmrpEngine::probe_tick`] does: an accelerated one
    /// at [`IGMP_QUERY_STARTUP_RATE`] that calls this and stops
    /// rescheduling once it returns `false`, and a steady-state one at
    /// `IGMP_QUERY_RATE` that calls this forever.
    pub fn query_tick<I, S>(&mut self, ifaces: &I, sender: &mut S) -> bool
    where
        I: InterfaceTable,
        S: IpSender,
    {
        net_trace!("igmp: sending query on all interfaces");
        for iface in ifaces.iter() {
            if self.query_suppressed[iface.id().index()] {
                continue;
            }
            let repr = Repr::Query {
                group_address: Ipv4Address::UNSPECIFIED,
            };
            send(sender, iface.id(), iface.address(), Ipv4Address::ALL_HOSTS, repr);
        }

        if self.startup_ticks_remaining > 0 {
            self.startup_ticks_remaining -= 1;
            self.startup_ticks_remaining > 0
        } else {
            // Only reached if this method is mistakenly wired to the
            // startup timer after the burst is already over.
            false
        }
    }

    /// `true` once the accelerated startup burst has been fully sent;
    /// used by callers to decide whether the steady-state
    /// [`crate::config::IGMP_QUERY_RATE`] timer is already active.
    pub fn startup_complete(&self) -> bool {
        self.startup_ticks_remaining == 0
    }

    /// Processes an incoming packet whose IP protocol is IGMP (spec.md
    /// §4.2). Returns whether the caller should consider the packet
    /// consumed (not to be forwarded further).
    pub fn process<I, S>(
        &mut self,
        packet: &dyn IpPacket,
        dvmrp: &mut DvmrpEngine,
        membership: &mut MembershipTable,
        ifaces: &I,
        sender: &mut S,
        now: Instant,
    ) -> Consumed
    where
        I: InterfaceTable,
        S: IpSender,
    {
        let wire_packet = match wire::Packet::new_checked(packet.payload()) {
            Ok(p) => p,
            Err(Error::Truncated) => {
                net_debug!("igmp: truncated packet on {}", packet.ingress_iface());
                return Consumed::No;
            }
            Err(_) => return Consumed::No,
        };

        let repr = match Repr::parse(&wire_packet) {
            Ok(repr) => repr,
            Err(Error::ChecksumMismatch) => {
                net_debug!(
                    "igmp: dropping packet with invalid checksum on {}",
                    packet.ingress_iface()
                );
                return Consumed::No;
            }
            Err(_) => return Consumed::No,
        };

        match repr {
            Repr::Query { .. } => {
                self.process_query(packet, ifaces);
                Consumed::Yes
            }
            Repr::Report { group_address } => {
                if packet.dst_addr() != group_address {
                    net_debug!(
                        "igmp: REPORT destination {} does not match group {}, dropping",
                        packet.dst_addr(),
                        group_address
                    );
                    return Consumed::No;
                }
                net_debug!(
                    "igmp: membership report on {} for {}",
                    packet.ingress_iface(),
                    group_address
                );
                membership.add(packet.ingress_iface(), group_address, now);
                Consumed::Yes
            }
            Repr::Dvmrp { subtype, group_address } => {
                dvmrp.process(packet, subtype, group_address, ifaces, sender, now)
            }
            Repr::Unknown { message_type, .. } => {
                net_debug!(
                    "igmp: silently dropping unknown message type {}",
                    message_type
                );
                Consumed::No
            }
        }
    }

    /// Querier-election bookkeeping for an incoming QUERY (spec.md §4.2):
    /// if the peer's source address is numerically less than our own
    /// interface address, we are not the querier for this segment and
    /// suppress our own future queries on it.
    fn process_query<I: InterfaceTable>(&mut self, packet: &dyn IpPacket, ifaces: &I) {
        let ingress = packet.ingress_iface();
        let Some(iface) = ifaces.get(ingress) else {
            net_warn!("igmp: QUERY on unknown interface {}", ingress);
            return;
        };
        if packet.src_addr() < iface.address() {
            if !self.query_suppressed[ingress.index()] {
                net_debug!(
                    "igmp: lost querier election on {} to {}, suppressing queries",
                    ingress,
                    packet.src_addr()
                );
            }
            self.query_suppressed[ingress.index()] = true;
        }
    }
}

/// Builds, checksums, and sends a control-plane IGMP/DVMRP message. Shared
/// by the IGMP and DVMRP engines so every emitter stamps the same TTL and
/// derives its destination MAC the same way (spec.md §4.5).
pub(crate) fn send<S: IpSender>(
    sender: &mut S,
    dst_iface: IfaceId,
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    repr: Repr,
) {
    let mut payload = [0u8; wire::HEADER_LEN];
    let mut packet = wire::Packet::new_checked(&mut payload[..]).expect("buffer is HEADER_LEN");
    repr.emit(&mut packet);

    sender.send(ControlPacket {
        dst_iface,
        src_addr,
        dst_addr,
        dst_mac: ip_to_mac(dst_addr),
        ttl: crate::config::CONTROL_TTL,
        payload,
    });
}
