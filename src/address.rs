//! Link and network addresses.

/// Largest hardware address the stack carries (EUI-48).
const MAX_LINK_ADDRESS_LEN: usize = 6;

/// A link-layer hardware address.
///
/// The empty address marks media without hardware addressing, such as
/// loopback.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LinkAddress {
    octets: [u8; MAX_LINK_ADDRESS_LEN],
    len: u8,
}

impl LinkAddress {
    pub const EMPTY: LinkAddress = LinkAddress {
        octets: [0; MAX_LINK_ADDRESS_LEN],
        len: 0,
    };

    pub fn new(octets: [u8; MAX_LINK_ADDRESS_LEN]) -> Self {
        Self {
            octets,
            len: MAX_LINK_ADDRESS_LEN as u8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.octets[..self.len as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Ipv4Address(pub [u8; 4]);

impl Ipv4Address {
    pub fn new(octets: [u8; 4]) -> Self {
        Self(octets)
    }
}
