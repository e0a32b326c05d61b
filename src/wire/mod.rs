//! On-wire message formats.
//!
//! Follows the teacher crate's `Packet`/`Repr` split: a `Packet<T>` is a
//! thin, zero-copy accessor over a byte buffer (borrowed or owned,
//! depending on `T: AsRef<[u8]>` / `AsMut<[u8]>`), and a `Repr` is the
//! parsed, owned, easy-to-pattern-match form produced by `Repr::parse` and
//! consumed by `Repr::emit`.

pub mod checksum;
pub mod igmp;
