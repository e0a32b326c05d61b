//! Error kinds (spec.md §7).
//!
//! None of these are fatal: every one is handled at the point it is
//! detected, logged at `debug` level, and surfaces to the caller only as
//! "packet not consumed" (see [`crate::forwarder::Consumed`]). No `Error`
//! ever escapes [`crate::Router::process`].

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The 16-bit ones-complement header checksum did not verify.
    ChecksumMismatch,
    /// The buffer is shorter than the header it claims to hold; no
    /// checksum was even computed.
    Truncated,
    /// No DVMRP route record matches the packet's source address.
    NoRouteToSource,
    /// The matched route's upstream interface is not the packet's ingress
    /// interface.
    ReversePathFail,
    /// An IGMP report's IP destination did not match its advertised group
    /// address (RFC 1112 Appendix I).
    DestinationMismatch,
    /// A DVMRP message carried a subtype this crate does not recognize.
    UnknownSubtype,
    /// A packet or control reference named an interface the
    /// [`crate::iface::InterfaceTable`] does not know about.
    InvalidInterface,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::ChecksumMismatch => "checksum mismatch",
            Error::Truncated => "buffer shorter than header",
            Error::NoRouteToSource => "no route to source",
            Error::ReversePathFail => "reverse path forwarding check failed",
            Error::DestinationMismatch => "IP destination does not match IGMP group address",
            Error::UnknownSubtype => "unknown DVMRP subtype",
            Error::InvalidInterface => "invalid interface",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
