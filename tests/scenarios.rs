//! End-to-end scenarios S1-S6 from spec.md §8, driven against the public
//! `Router` API with the in-memory fakes from `tests/support`.

mod support;

use mcast_router_core::{Consumed, IfaceId, Instant, Ipv4Address, RouteEntry, Router};

use support::{FakeInterfaceTable, FakeIpPacket, FakeRouteTable, RecordingSender};

fn three_ifaces() -> FakeInterfaceTable {
    let mut t = FakeInterfaceTable::default();
    t.push(0, "if0", Ipv4Address::new(10, 0, 0, 1));
    t.push(1, "if1", Ipv4Address::new(10, 0, 1, 1));
    t.push(2, "if2", Ipv4Address::new(10, 0, 2, 1));
    t
}

fn igmp_report(ingress: IfaceId, dst: Ipv4Address, group: Ipv4Address) -> FakeIpPacket {
    use mcast_router_core::wire::igmp::{self as wire, Repr};
    let mut buf = [0u8; wire::HEADER_LEN];
    let mut packet = wire::Packet::new_checked(&mut buf[..]).unwrap();
    Repr::Report { group_address: group }.emit(&mut packet);
    FakeIpPacket {
        src: Ipv4Address::new(10, 9, 9, 9),
        dst,
        protocol: mcast_router_core::IpProtocol::IGMP,
        ingress,
        payload: buf,
    }
}

fn dvmrp_message(
    subtype: mcast_router_core::wire::igmp::DvmrpSubtype,
    group_address: Ipv4Address,
    src: Ipv4Address,
    dst: Ipv4Address,
    ingress: IfaceId,
) -> FakeIpPacket {
    use mcast_router_core::wire::igmp::{self as wire, Repr};
    let mut buf = [0u8; wire::HEADER_LEN];
    let mut packet = wire::Packet::new_checked(&mut buf[..]).unwrap();
    Repr::Dvmrp { subtype, group_address }.emit(&mut packet);
    FakeIpPacket {
        src,
        dst,
        protocol: mcast_router_core::IpProtocol::IGMP,
        ingress,
        payload: buf,
    }
}

fn user_datagram(src: Ipv4Address, dst_group: Ipv4Address, ingress: IfaceId) -> FakeIpPacket {
    FakeIpPacket {
        src,
        dst: dst_group,
        protocol: mcast_router_core::IpProtocol(17),
        ingress,
        payload: [0; 8],
    }
}

#[test]
fn s1_igmp_membership_lifecycle() {
    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let mut sender = RecordingSender::default();
    let if0 = IfaceId::new(0).unwrap();
    let group = Ipv4Address::new(224, 1, 2, 3);

    let pkt = igmp_report(if0, group, group);
    let consumed = router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));
    assert_eq!(consumed, Consumed::Yes);
    assert!(router.membership_get(if0, group));

    // Advance 91s with no further reports, then run the expirer.
    router.expire_tick(Instant::from_secs(91));
    assert!(!router.membership_get(if0, group));
}

#[test]
fn s2_report_ip_destination_mismatch_is_dropped() {
    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let mut sender = RecordingSender::default();
    let if0 = IfaceId::new(0).unwrap();
    let group = Ipv4Address::new(224, 1, 2, 3);
    let other = Ipv4Address::new(224, 1, 2, 4);

    let pkt = igmp_report(if0, other, group);
    router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));
    assert!(!router.membership_get(if0, group));
    assert!(!router.membership_get(if0, other));
}

#[test]
fn s3_dvmrp_probe_reply() {
    use mcast_router_core::wire::igmp::DvmrpSubtype;

    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let mut sender = RecordingSender::default();
    let if1 = IfaceId::new(1).unwrap();

    let pkt = dvmrp_message(
        DvmrpSubtype::Probe,
        Ipv4Address::UNSPECIFIED,
        Ipv4Address::new(10, 0, 1, 2),
        Ipv4Address::ALL_DVMRP,
        if1,
    );
    let consumed = router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));
    assert_eq!(consumed, Consumed::Yes);
    assert_eq!(sender.sent.len(), 1);
    let reply = sender.sent[0];
    assert_eq!(reply.dst_iface, if1);
    assert_eq!(reply.src_addr, Ipv4Address::new(10, 0, 1, 1));
    assert_eq!(reply.dst_addr, Ipv4Address::ALL_DVMRP);
    assert_eq!(reply.ttl, 1);
}

#[test]
fn s4_rpf_fail_produces_leaf() {
    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let mut routes = FakeRouteTable::default();
    routes.routes.push(RouteEntry {
        network: Ipv4Address::new(10, 0, 0, 0),
        netmask: Ipv4Address::new(255, 255, 255, 0),
        nexthop: Ipv4Address::UNSPECIFIED,
        iface: IfaceId::new(0).unwrap(),
    });
    router.dvmrp_init(&routes);

    let if1 = IfaceId::new(1).unwrap();
    let pkt = user_datagram(Ipv4Address::new(10, 0, 0, 5), Ipv4Address::new(224, 1, 2, 3), if1);
    let mut sender = RecordingSender::default();
    let consumed = router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));

    assert_eq!(consumed, Consumed::No);
    assert_eq!(sender.fragmented.len(), 0);
    assert_eq!(sender.sent.len(), 1);
    let leaf = sender.sent[0];
    assert_eq!(leaf.dst_iface, if1);
    assert_eq!(leaf.dst_addr, Ipv4Address::ALL_DVMRP);
}

#[test]
fn s5_prune_then_graft_cycle() {
    use mcast_router_core::wire::igmp::DvmrpSubtype;

    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let if0 = IfaceId::new(0).unwrap();
    let if1 = IfaceId::new(1).unwrap();

    let mut routes = FakeRouteTable::default();
    routes.routes.push(RouteEntry {
        network: Ipv4Address::new(10, 0, 0, 0),
        netmask: Ipv4Address::new(255, 255, 255, 0),
        nexthop: Ipv4Address::UNSPECIFIED,
        iface: if0,
    });
    router.dvmrp_init(&routes);

    // if0 is heard from as a router (it's the upstream link toward the
    // source); if1/if2 stay edges, so with no IGMP membership neither is a
    // fan-out candidate yet.
    let mut sender = RecordingSender::default();
    let pkt = dvmrp_message(
        DvmrpSubtype::Report,
        Ipv4Address::UNSPECIFIED,
        Ipv4Address::new(10, 0, 0, 2),
        Ipv4Address::ALL_DVMRP,
        if0,
    );
    router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));

    let source = Ipv4Address::new(10, 0, 0, 5);
    let group = Ipv4Address::new(224, 1, 2, 3);

    // (a) no membership anywhere: zero duplicates, one PRUNE on if0.
    let mut sender = RecordingSender::default();
    let pkt_a = user_datagram(source, group, if0);
    let consumed = router.process(&pkt_a, &ifaces, &mut sender, Instant::from_secs(0));
    assert_eq!(consumed, Consumed::Yes);
    assert_eq!(sender.fragmented.len(), 0);
    assert_eq!(sender.sent.len(), 1);
    assert_eq!(sender.sent[0].dst_addr, Ipv4Address::ALL_DVMRP);
    assert_eq!(sender.sent[0].dst_iface, if0);

    // (b) REPORT on if1 for the group, then graft it.
    let pkt_report = igmp_report(if1, group, group);
    router.process(&pkt_report, &ifaces, &mut sender, Instant::from_secs(1));
    let mut sender = RecordingSender::default();
    router.dvmrp_graft(group, if1, &ifaces, &mut sender);
    assert_eq!(sender.sent.len(), 1);
    assert_eq!(sender.sent[0].dst_iface, if0);
    assert_eq!(sender.sent[0].dst_addr, Ipv4Address::ALL_DVMRP);

    // (c) next datagram: one duplicate on if1, none on if2.
    let mut sender = RecordingSender::default();
    let pkt_c = user_datagram(source, group, if0);
    router.process(&pkt_c, &ifaces, &mut sender, Instant::from_secs(2));
    assert_eq!(sender.fragmented.len(), 1);
    assert_eq!(sender.fragmented[0].0, if1);
}

#[test]
fn s6_leaf_disables_child() {
    use mcast_router_core::wire::igmp::DvmrpSubtype;

    let mut router = Router::new(Default::default());
    let ifaces = three_ifaces();
    let if0 = IfaceId::new(0).unwrap();
    let if1 = IfaceId::new(1).unwrap();

    let mut routes = FakeRouteTable::default();
    routes.routes.push(RouteEntry {
        network: Ipv4Address::new(10, 0, 0, 0),
        netmask: Ipv4Address::new(255, 255, 255, 0),
        nexthop: Ipv4Address::UNSPECIFIED,
        iface: if0,
    });
    router.dvmrp_init(&routes);

    // LEAF only makes sense between routers, so if1 must already have been
    // heard from as one.
    let mut sender = RecordingSender::default();
    let report = dvmrp_message(
        DvmrpSubtype::Report,
        Ipv4Address::UNSPECIFIED,
        Ipv4Address::new(10, 0, 1, 2),
        Ipv4Address::ALL_DVMRP,
        if1,
    );
    router.process(&report, &ifaces, &mut sender, Instant::from_secs(0));

    let leaf = dvmrp_message(
        DvmrpSubtype::Leaf,
        Ipv4Address::new(10, 0, 0, 0),
        Ipv4Address::new(10, 0, 1, 2),
        Ipv4Address::ALL_DVMRP,
        if1,
    );
    router.process(&leaf, &ifaces, &mut sender, Instant::from_secs(0));

    let group = Ipv4Address::new(224, 1, 2, 3);
    router.membership_add(if1, group, Instant::from_secs(0));

    let mut sender = RecordingSender::default();
    let pkt = user_datagram(Ipv4Address::new(10, 0, 0, 5), group, if0);
    router.process(&pkt, &ifaces, &mut sender, Instant::from_secs(0));
    assert_eq!(sender.fragmented.len(), 0);
}
