//! Compile-time tunables.
//!
//! These mirror the `#define`d constants of the original implementation
//! (named in the doc comment of each item) and spec.md §6's recommendation
//! that they become configuration. Every one of them can be overridden at
//! runtime when the `std` feature is enabled, by setting the named
//! environment variable before the first [`crate::Router::new`] call; the
//! `const` below is always the compiled-in default.

/// `IFACE_MAX`: upper bound on the number of interfaces this control plane
/// can track. Small by design (spec.md §3): every per-interface table is a
/// fixed-size array, not a heap collection.
pub const IFACE_MAX: usize = 20;

/// `ROUTE_MAX`: upper bound on the number of DVMRP route records imported
/// from the unicast route table.
pub const ROUTE_MAX: usize = 20;

/// Upper bound on distinct multicast groups tracked per DVMRP route.
/// spec.md §9: "expected cardinality is tiny (groups per source ≪ 32)".
pub const MAX_GROUPS_PER_ROUTE: usize = 32;

/// Upper bound on distinct (interface, group) memberships per interface.
pub const MAX_MEMBERSHIPS_PER_IFACE: usize = 64;

/// `MCAST_MEMBERSHIP_EXPIRATION_TIME`: seconds since last report after
/// which a membership record is eligible for deletion.
pub const MCAST_MEMBERSHIP_EXPIRATION: u64 = 90;

/// Period, in seconds, at which [`crate::membership::MembershipTable::expire_tick`]
/// should be invoked by the caller's timer facility.
pub const MCAST_EXPIRE_TICK: u64 = 10;

/// `IGMP_QUERY_RATE`: steady-state interval between general IGMP queries.
pub const IGMP_QUERY_RATE: u64 = 60;

/// `IGMP_QUERY_STARTUP_RATE`: interval between the accelerated startup
/// queries.
pub const IGMP_QUERY_STARTUP_RATE: u64 = 4;

/// `IGMP_QUERY_STARTUP_COUNT`: number of accelerated queries sent at
/// startup before falling back to the steady-state rate.
pub const IGMP_QUERY_STARTUP_COUNT: u32 = 3;

/// `DVMRP_FULL_UPDATE_RATE`: steady-state interval between DVMRP PROBEs.
pub const DVMRP_FULL_UPDATE_RATE: u64 = 60;

/// `DVMRP_TRIGGERED_UPDATE_RATE`: interval between the accelerated startup
/// PROBEs.
pub const DVMRP_TRIGGERED_UPDATE_RATE: u64 = 5;

/// `DVMRP_STARTUP_COUNT`: number of accelerated PROBEs sent at startup.
pub const DVMRP_STARTUP_COUNT: u32 = 3;

/// TTL stamped on every control-plane emission (IGMP query, DVMRP
/// PROBE/REPORT/PRUNE/GRAFT/LEAF).
pub const CONTROL_TTL: u8 = 1;

#[cfg(feature = "std")]
fn env_override(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runtime-overridable tunables, read once at [`crate::Router::new`].
/// `no_std` builds always see the compiled-in defaults above.
#[derive(Debug, Clone, Copy)]
pub struct Tunables {
    pub mcast_membership_expiration: u64,
    pub mcast_expire_tick: u64,
    pub igmp_query_rate: u64,
    pub igmp_query_startup_rate: u64,
    pub igmp_query_startup_count: u32,
    pub dvmrp_full_update_rate: u64,
    pub dvmrp_triggered_update_rate: u64,
    pub dvmrp_startup_count: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            mcast_membership_expiration: MCAST_MEMBERSHIP_EXPIRATION,
            mcast_expire_tick: MCAST_EXPIRE_TICK,
            igmp_query_rate: IGMP_QUERY_RATE,
            igmp_query_startup_rate: IGMP_QUERY_STARTUP_RATE,
            igmp_query_startup_count: IGMP_QUERY_STARTUP_COUNT,
            dvmrp_full_update_rate: DVMRP_FULL_UPDATE_RATE,
            dvmrp_triggered_update_rate: DVMRP_TRIGGERED_UPDATE_RATE,
            dvmrp_startup_count: DVMRP_STARTUP_COUNT,
        }
    }
}

impl Tunables {
    /// Build tunables from the compiled-in defaults, overridden by any of
    /// the matching `MCAST_*`/`IGMP_*`/`DVMRP_*` environment variables.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        let default = Self::default();
        Tunables {
            mcast_membership_expiration: env_override(
                "MCAST_MEMBERSHIP_EXPIRATION",
                default.mcast_membership_expiration,
            ),
            mcast_expire_tick: env_override("MCAST_EXPIRE_TICK", default.mcast_expire_tick),
            igmp_query_rate: env_override("IGMP_QUERY_RATE", default.igmp_query_rate),
            igmp_query_startup_rate: env_override(
                "IGMP_QUERY_STARTUP_RATE",
                default.igmp_query_startup_rate,
            ),
            igmp_query_startup_count: env_override(
                "IGMP_QUERY_STARTUP_COUNT",
                default.igmp_query_startup_count as u64,
            ) as u32,
            dvmrp_full_update_rate: env_override(
                "DVMRP_FULL_UPDATE_RATE",
                default.dvmrp_full_update_rate,
            ),
            dvmrp_triggered_update_rate: env_override(
                "DVMRP_TRIGGERED_UPDATE_RATE",
                default.dvmrp_triggered_update_rate,
            ),
            dvmrp_startup_count: env_override(
                "DVMRP_STARTUP_COUNT",
                default.dvmrp_startup_count as u64,
            ) as u32,
        }
    }
}
