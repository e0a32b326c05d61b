//! The shared 8-byte IGMP/DVMRP header (spec.md §3, §6).
//!
//! One wire format overlays three semantic protocols: plain IGMP query,
//! plain IGMP report, and DVMRP control messages (distinguished by
//! `message_type == Dvmrp`, with the DVMRP sub-kind carried in the
//! otherwise-unused `subtype` byte).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-------+-------+---------------+-------------------------------+
//! | ver:4 | typ:4 |  subtype:8    |         checksum:16           |
//! +-------+-------+---------------+-------------------------------+
//! |                       group_address:32                        |
//! +-----------------------------------------------------------------+
//! ```

use byteorder::{ByteOrder, NetworkEndian};

use crate::addr::Ipv4Address;
use crate::error::Error;
use crate::wire::checksum;

/// Total length, in bytes, of the header on the wire.
pub const HEADER_LEN: usize = 8;

/// The single version this crate speaks.
pub const VERSION: u8 = 1;

mod field {
    pub const VER_TYPE: usize = 0;
    pub const SUBTYPE: usize = 1;
    pub const CHECKSUM: core::ops::Range<usize> = 2..4;
    pub const GROUP_ADDRESS: core::ops::Range<usize> = 4..8;
}

/// IGMP message type, carried in the low nibble of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Query,
    Report,
    Dvmrp,
    Unknown(u8),
}

impl MessageType {
    fn from_nibble(v: u8) -> MessageType {
        match v {
            1 => MessageType::Query,
            2 => MessageType::Report,
            3 => MessageType::Dvmrp,
            other => MessageType::Unknown(other),
        }
    }

    fn to_nibble(self) -> u8 {
        match self {
            MessageType::Query => 1,
            MessageType::Report => 2,
            MessageType::Dvmrp => 3,
            MessageType::Unknown(v) => v,
        }
    }
}

/// DVMRP sub-kind, carried in the `subtype` byte when `message_type ==
/// Dvmrp` (spec.md §4.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvmrpSubtype {
    Probe,
    Report,
    Prune,
    Graft,
    Leaf,
    Unknown(u8),
}

impl DvmrpSubtype {
    pub fn from_u8(v: u8) -> DvmrpSubtype {
        match v {
            1 => DvmrpSubtype::Probe,
            2 => DvmrpSubtype::Report,
            7 => DvmrpSubtype::Prune,
            8 => DvmrpSubtype::Graft,
            50 => DvmrpSubtype::Leaf,
            other => DvmrpSubtype::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            DvmrpSubtype::Probe => 1,
            DvmrpSubtype::Report => 2,
            DvmrpSubtype::Prune => 7,
            DvmrpSubtype::Graft => 8,
            DvmrpSubtype::Leaf => 50,
            DvmrpSubtype::Unknown(v) => v,
        }
    }
}

/// A zero-copy view over an IGMP/DVMRP header in a byte buffer.
#[derive(Debug, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Wraps `buffer`, checking that it is at least [`HEADER_LEN`] bytes.
    pub fn new_checked(buffer: T) -> Result<Packet<T>, Error> {
        let packet = Packet { buffer };
        if packet.buffer.as_ref().len() < HEADER_LEN {
            return Err(Error::Truncated);
        }
        Ok(packet)
    }

    pub fn version(&self) -> u8 {
        self.buffer.as_ref()[field::VER_TYPE] >> 4
    }

    pub fn msg_type(&self) -> MessageType {
        MessageType::from_nibble(self.buffer.as_ref()[field::VER_TYPE] & 0x0F)
    }

    pub fn subtype(&self) -> u8 {
        self.buffer.as_ref()[field::SUBTYPE]
    }

    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[field::CHECKSUM])
    }

    pub fn group_address(&self) -> Ipv4Address {
        let b = &self.buffer.as_ref()[field::GROUP_ADDRESS];
        Ipv4Address::from_bytes([b[0], b[1], b[2], b[3]])
    }

    /// `true` if the ones-complement checksum over the whole header (as
    /// received) sums to zero.
    pub fn verify_checksum(&self) -> bool {
        checksum::verify(&self.buffer.as_ref()[..HEADER_LEN])
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_version(&mut self, version: u8) {
        let b = &mut self.buffer.as_mut()[field::VER_TYPE];
        *b = (version << 4) | (*b & 0x0F);
    }

    pub fn set_msg_type(&mut self, msg_type: MessageType) {
        let b = &mut self.buffer.as_mut()[field::VER_TYPE];
        *b = (*b & 0xF0) | (msg_type.to_nibble() & 0x0F);
    }

    pub fn set_subtype(&mut self, subtype: u8) {
        self.buffer.as_mut()[field::SUBTYPE] = subtype;
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[field::CHECKSUM], checksum);
    }

    pub fn set_group_address(&mut self, addr: Ipv4Address) {
        self.buffer.as_mut()[field::GROUP_ADDRESS].copy_from_slice(&addr.octets());
    }

    /// Zeroes the checksum field, computes the ones-complement checksum
    /// over the header, and stores the result.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let sum = checksum::ones_complement(&self.buffer.as_ref()[..HEADER_LEN]);
        self.set_checksum(sum);
    }
}

/// The parsed, owned form of a header (spec.md §3's four semantic
/// variants this crate actually needs to distinguish).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repr {
    Query { group_address: Ipv4Address },
    Report { group_address: Ipv4Address },
    Dvmrp { subtype: DvmrpSubtype, group_address: Ipv4Address },
    Unknown { message_type: u8, group_address: Ipv4Address },
}

impl Repr {
    /// Verifies the checksum and parses `packet` into a `Repr`.
    pub fn parse<T: AsRef<[u8]>>(packet: &Packet<T>) -> Result<Repr, Error> {
        if !packet.verify_checksum() {
            return Err(Error::ChecksumMismatch);
        }
        let group_address = packet.group_address();
        Ok(match packet.msg_type() {
            MessageType::Query => Repr::Query { group_address },
            MessageType::Report => Repr::Report { group_address },
            MessageType::Dvmrp => Repr::Dvmrp {
                subtype: DvmrpSubtype::from_u8(packet.subtype()),
                group_address,
            },
            MessageType::Unknown(message_type) => Repr::Unknown {
                message_type,
                group_address,
            },
        })
    }

    /// Serializes `self` into `packet`, filling in the checksum.
    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]>>(&self, packet: &mut Packet<T>) {
        packet.set_version(VERSION);
        match *self {
            Repr::Query { group_address } => {
                packet.set_msg_type(MessageType::Query);
                packet.set_subtype(0);
                packet.set_group_address(group_address);
            }
            Repr::Report { group_address } => {
                packet.set_msg_type(MessageType::Report);
                packet.set_subtype(0);
                packet.set_group_address(group_address);
            }
            Repr::Dvmrp {
                subtype,
                group_address,
            } => {
                packet.set_msg_type(MessageType::Dvmrp);
                packet.set_subtype(subtype.to_u8());
                packet.set_group_address(group_address);
            }
            Repr::Unknown {
                message_type,
                group_address,
            } => {
                packet.set_msg_type(MessageType::Unknown(message_type));
                packet.set_subtype(0);
                packet.set_group_address(group_address);
            }
        }
        packet.fill_checksum();
    }

    /// Number of bytes [`Repr::emit`] will write; always [`HEADER_LEN`].
    pub const fn buffer_len(&self) -> usize {
        HEADER_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_query() {
        let repr = Repr::Query {
            group_address: Ipv4Address::UNSPECIFIED,
        };
        let mut buf = [0u8; HEADER_LEN];
        let mut packet = Packet::new_checked(&mut buf[..]).unwrap();
        repr.emit(&mut packet);

        let packet = Packet::new_checked(&buf[..]).unwrap();
        assert_eq!(packet.version(), VERSION);
        assert!(packet.verify_checksum());
        assert_eq!(Repr::parse(&packet).unwrap(), repr);
    }

    #[test]
    fn round_trip_dvmrp_prune_carries_source_in_group_field() {
        let source = Ipv4Address::new(10, 0, 0, 5);
        let repr = Repr::Dvmrp {
            subtype: DvmrpSubtype::Prune,
            group_address: source,
        };
        let mut buf = [0u8; HEADER_LEN];
        let mut packet = Packet::new_checked(&mut buf[..]).unwrap();
        repr.emit(&mut packet);

        let packet = Packet::new_checked(&buf[..]).unwrap();
        assert_eq!(packet.msg_type(), MessageType::Dvmrp);
        assert_eq!(packet.subtype(), DvmrpSubtype::Prune.to_u8());
        assert_eq!(packet.group_address(), source);
        assert_eq!(Repr::parse(&packet).unwrap(), repr);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let repr = Repr::Report {
            group_address: Ipv4Address::new(224, 1, 2, 3),
        };
        let mut buf = [0u8; HEADER_LEN];
        let mut packet = Packet::new_checked(&mut buf[..]).unwrap();
        repr.emit(&mut packet);
        buf[7] ^= 0xFF;

        let packet = Packet::new_checked(&buf[..]).unwrap();
        assert_eq!(Repr::parse(&packet), Err(Error::ChecksumMismatch));
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let buf = [0u8; 4];
        assert_eq!(Packet::new_checked(&buf[..]).unwrap_err(), Error::Truncated);
    }
}
