//! Loopback data-link layer endpoints. Such endpoints just turn outbound
//! packets into inbound ones: every packet written out through
//! [`link::LoopbackEndpoint`] is redelivered, synchronously and without
//! copying payload bytes, to the dispatcher the stack attached.
//!
//! Create an endpoint with [`link::LoopbackEndpoint::register`] and hand
//! the returned id to the stack when creating a network interface.

#![no_std]

extern crate alloc;

pub mod address;
pub mod buffer;
pub mod link;
pub mod stack;

#[cfg(test)]
#[macro_use]
extern crate std;


pub type Result<T> = core::result::Result<T, ErrorKind>;

/// Failures a link endpoint can report from its write path. Loopback
/// never constructs these; they exist so fallible endpoints (real NICs,
/// tap devices) share the same signature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The device cannot accept the packet right now, e.g. a full ring.
    WouldBlock,
    /// The underlying device has gone away.
    DeviceClosed,
}

/// Network-layer protocol of a composed packet, in EtherType numbering.
pub type NetworkProtocolNumber = u32;

pub const IPV4_PROTOCOL_NUMBER: NetworkProtocolNumber = 0x0800;
pub const ARP_PROTOCOL_NUMBER: NetworkProtocolNumber = 0x0806;
pub const IPV6_PROTOCOL_NUMBER: NetworkProtocolNumber = 0x86dd;
