//! Operator CLI command bodies (spec.md §6): `mcast`, `dvmrp init`,
//! `dvmrp show`, registered against the [`CliRegistry`] trait
//! collaborator.
//!
//! The formatting logic (testable, no I/O) is kept separate from the
//! actual command registration, which needs `Rc<RefCell<_>>` to let two
//! independently-registered closures share one `Router` — the same flat,
//! handle-addressed registration shape as the teacher's own `SocketSet`
//! (`src/iface/socket_set.rs`); see `DESIGN.md` for why that file, not the
//! example binaries, is what this module's registration pattern is
//! actually grounded on.

use std::fmt::Write as _;
use std::rc::Rc;
use std::cell::RefCell;

use crate::iface::{CliRegistry, InterfaceTable, RouteTable};
use crate::router::Router;

/// Renders the `mcast` command's membership table: `Interface | Interface
/// IP | Multicast Group | Last Report` (spec.md §6).
pub fn format_mcast_table<I: InterfaceTable>(router: &Router, ifaces: &I) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<16} {:<16} {:<10}",
        "Interface", "Interface IP", "Multicast Group", "Last Report"
    );
    for (iface_id, group, last) in router.membership().iter() {
        let (name, addr) = match ifaces.get(iface_id) {
            Some(iface) => (iface.name().to_string(), iface.address().to_string()),
            None => (iface_id.to_string(), "?".to_string()),
        };
        let _ = writeln!(out, "{:<10} {:<16} {:<16} {:<10}", name, addr, group, last);
    }
    out
}

/// Renders the `dvmrp show` command: edge classifications, then per
/// route: network, netmask, upstream iface, and per (group ×
/// downstream-iface) status in `{IGMP, Yes, No, Pruned}` (spec.md §6).
pub fn format_dvmrp_show<I: InterfaceTable>(router: &Router, ifaces: &I) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Edge interfaces:");
    for iface in ifaces.iter() {
        let kind = if router.dvmrp().is_edge(iface.id()) { "edge" } else { "router" };
        let _ = writeln!(out, "  {:<10} {}", iface.name(), kind);
    }

    for route in router.dvmrp().routes() {
        let _ = writeln!(
            out,
            "\n{}/{} via {} (nexthop {})",
            route.network, route.netmask, route.iface, route.nexthop
        );
        for (group, record) in route.groups.iter() {
            let _ = write!(out, "  {:<16}", group);
            for iface in ifaces.iter() {
                let i = iface.id();
                let status = if i == route.iface {
                    "-"
                } else if router.dvmrp().is_edge(i) {
                    if router.membership().contains(i, group) {
                        "IGMP"
                    } else {
                        "No"
                    }
                } else if record.pruned[i.index()].is_some() {
                    "Pruned"
                } else if route.children[i.index()] {
                    "Yes"
                } else {
                    "No"
                };
                let _ = write!(out, " {:<8}", status);
            }
            let _ = writeln!(out);
        }
    }
    out
}

/// Registers `mcast`, `dvmrp init` and `dvmrp show` against `registry`,
/// sharing one `Router` between the closures.
pub fn register_commands<I>(
    registry: &mut dyn CliRegistry,
    router: Rc<RefCell<Router>>,
    ifaces: Rc<I>,
    routes: Rc<dyn RouteTable>,
) where
    I: InterfaceTable + 'static,
{
    {
        let router = Rc::clone(&router);
        let ifaces = Rc::clone(&ifaces);
        registry.register(
            "mcast",
            Box::new(move |_args| {
                print!("{}", format_mcast_table(&router.borrow(), ifaces.as_ref()));
            }),
        );
    }
    {
        let router = Rc::clone(&router);
        let ifaces = Rc::clone(&ifaces);
        registry.register(
            "dvmrp",
            Box::new(move |args| match args.first().copied() {
                Some("init") => router.borrow_mut().dvmrp_init(routes.as_ref()),
                Some("show") => print!("{}", format_dvmrp_show(&router.borrow(), ifaces.as_ref())),
                _ => eprintln!("usage: dvmrp <init|show>"),
            }),
        );
    }
}
