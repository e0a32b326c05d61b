//! IP-multicast control plane for a small, statically-wired virtual router.
//!
//! This crate implements three tightly-coupled pieces of a software router's
//! multicast handling:
//!
//! - [`membership`]: a per-interface host group-membership table, fed by
//!   IGMP reports and read by the forwarder.
//! - [`igmp`]: the IGMP host/querier engine (queries, reports, and handing
//!   DVMRP-subtyped traffic down to the DVMRP engine).
//! - [`dvmrp`]: a simplified DVMRP-like router protocol (neighbor discovery,
//!   reverse-path forwarding, and per-source prune/graft state).
//!
//! [`router::Router`] wires the three together and is the crate's single
//! entry point for an arriving datagram.
//!
//! The surrounding collaborators this crate does *not* implement — the
//! unicast route table, the IP send/fragmentation pipeline, interface
//! enumeration, the periodic timer facility, and the operator CLI shell —
//! are expressed as traits in [`iface`] so the control plane can be driven
//! in tests without a real network stack underneath it.
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

// Logging macros modelled on the teacher crate's own net_trace!/net_debug!
// family: a no-op when the "log" feature is disabled, so callers never pay
// for formatting work that nothing will read.
macro_rules! net_trace {
    ($($arg:expr),*) => { #[cfg(feature = "log")] log::trace!($($arg),*); };
}
macro_rules! net_debug {
    ($($arg:expr),*) => { #[cfg(feature = "log")] log::debug!($($arg),*); };
}
macro_rules! net_warn {
    ($($arg:expr),*) => { #[cfg(feature = "log")] log::warn!($($arg),*); };
}
pub(crate) use net_debug;
pub(crate) use net_trace;
pub(crate) use net_warn;

pub mod addr;
pub mod config;
#[cfg(feature = "std")]
pub mod cli;
pub mod dvmrp;
pub mod error;
pub mod forwarder;
pub mod iface;
pub mod igmp;
pub mod membership;
pub mod router;
#[cfg(test)]
mod test_support;
pub mod time;
pub mod wire;

pub use addr::{EthernetAddress, Ipv4Address};
pub use dvmrp::DvmrpEngine;
pub use error::Error;
pub use forwarder::Consumed;
pub use iface::{IfaceId, Interface, InterfaceTable, IpPacket, IpProtocol, IpSender, RouteEntry, RouteTable};
pub use membership::MembershipTable;
pub use router::Router;
pub use time::{Duration, Instant};
