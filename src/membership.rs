//! The Membership Table (spec.md §4.1): per-interface mapping from
//! multicast group address to a last-heard timestamp.
//!
//! Expected cardinality per interface is small, so each per-interface
//! sub-table is a flat `heapless::Vec` scanned linearly rather than a
//! hash map or tree — the same "small flat collection beats a balanced
//! tree" call the teacher crate makes for its neighbor cache and address
//! lists (and the explicit call spec.md §9 makes for DVMRP's route-group
//! map).

use heapless::Vec as HVec;

use crate::addr::{IfaceId, Ipv4Address};
use crate::config::{IFACE_MAX, MAX_MEMBERSHIPS_PER_IFACE};
use crate::net_debug;
use crate::time::{Duration, Instant};

type SubTable = HVec<(Ipv4Address, Instant), MAX_MEMBERSHIPS_PER_IFACE>;

/// Per-interface group membership state, fed by IGMP reports.
pub struct MembershipTable {
    tables: [SubTable; IFACE_MAX],
}

impl Default for MembershipTable {
    fn default() -> Self {
        MembershipTable::new()
    }
}

impl MembershipTable {
    pub fn new() -> MembershipTable {
        MembershipTable {
            tables: core::array::from_fn(|_| HVec::new()),
        }
    }

    /// Upserts `(iface, group) -> now`. Idempotent with respect to
    /// presence; refreshes the timestamp if the entry already exists.
    pub fn add(&mut self, iface: IfaceId, group: Ipv4Address, now: Instant) {
        let table = &mut self.tables[iface.index()];
        if let Some(entry) = table.iter_mut().find(|(g, _)| *g == group) {
            entry.1 = now;
            net_debug!("membership[{}]: refreshed {} at {}", iface, group, now);
            return;
        }
        if table.push((group, now)).is_err() {
            net_debug!(
                "membership[{}]: table full, dropping report for {}",
                iface,
                group
            );
            return;
        }
        net_debug!("membership[{}]: added {} at {}", iface, group, now);
    }

    /// Deletes `(iface, group)` if present; a no-op otherwise.
    pub fn remove(&mut self, iface: IfaceId, group: Ipv4Address) {
        let table = &mut self.tables[iface.index()];
        if let Some(pos) = table.iter().position(|(g, _)| *g == group) {
            table.swap_remove(pos);
            net_debug!("membership[{}]: removed {}", iface, group);
        }
    }

    pub fn contains(&self, iface: IfaceId, group: Ipv4Address) -> bool {
        self.tables[iface.index()]
            .iter()
            .any(|(g, _)| *g == group)
    }

    /// Removes every record older than `expiration` relative to `now`.
    /// Collects expired keys first, then deletes, so the scan never
    /// observes a structure it is concurrently mutating (spec.md §4.1).
    /// Returns the number of records removed, for logging.
    pub fn expire_tick(&mut self, now: Instant, expiration: Duration) -> usize {
        let mut removed = 0;
        for iface_idx in 0..IFACE_MAX {
            let table = &mut self.tables[iface_idx];
            let mut expired: HVec<Ipv4Address, MAX_MEMBERSHIPS_PER_IFACE> = HVec::new();
            for (group, last) in table.iter() {
                if now.saturating_duration_since(*last) > expiration {
                    let _ = expired.push(*group);
                }
            }
            for group in expired {
                if let Some(pos) = table.iter().position(|(g, _)| *g == group) {
                    table.swap_remove(pos);
                    removed += 1;
                    net_debug!("membership[if{}]: expired {}", iface_idx, group);
                }
            }
        }
        removed
    }

    /// Iterates every `(interface, group, last_report)` record, in
    /// ascending interface order, for the operator `mcast` CLI command.
    pub fn iter(&self) -> impl Iterator<Item = (IfaceId, Ipv4Address, Instant)> + '_ {
        self.tables.iter().enumerate().flat_map(|(idx, table)| {
            table
                .iter()
                .map(move |(group, last)| (IfaceId::new(idx).unwrap(), *group, *last))
        })
    }
}
