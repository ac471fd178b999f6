//! Link-layer endpoints.
//!
//! A link endpoint is the component that moves packets onto and off of a
//! medium, below the network-layer protocol logic. The stack talks to
//! every endpoint through [`LinkEndpoint`]; endpoints hand received
//! packets back up through the [`NetworkDispatcher`] attached to them.

use alloc::sync::Arc;

use bitflags::bitflags;

use crate::address::LinkAddress;
use crate::buffer::Prependable;
use crate::stack::{NetworkDispatcher, Route};
use crate::{NetworkProtocolNumber, Result};

pub mod loopback;

pub use loopback::LoopbackEndpoint;

bitflags! {
    /// Feature flags a link endpoint advertises at registration time.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct LinkCapabilities: u32 {
        /// Upper layers may leave checksums unfilled on outbound
        /// packets. Advisory only: no endpoint verifies checksums on
        /// behalf of the layers above it.
        const CHECKSUM_OFFLOAD = 1 << 0;
        /// The endpoint tolerates save/restore of the owning stack.
        const SAVE_RESTORE = 1 << 1;
        /// Outbound packets re-enter the same stack.
        const LOOPBACK = 1 << 2;
    }
}

pub trait LinkEndpoint: Send + Sync {
    /// Stores the dispatcher that received packets are delivered to.
    /// Must complete before the first `write_packet` call; a later call
    /// replaces the previous dispatcher.
    fn attach(&self, dispatcher: Arc<dyn NetworkDispatcher>);

    fn is_attached(&self) -> bool;

    /// Largest packet this endpoint carries.
    fn mtu(&self) -> u32;

    fn capabilities(&self) -> LinkCapabilities;

    /// Headroom upper layers must reserve for this endpoint's own link
    /// header.
    fn max_header_length(&self) -> u16;

    fn link_address(&self) -> LinkAddress;

    /// Writes one outbound packet. `hdr` already carries every protocol
    /// header; `payload` may be empty.
    fn write_packet(
        &self,
        route: &Route,
        hdr: &Prependable,
        payload: &[u8],
        protocol: NetworkProtocolNumber,
    ) -> Result<()>;
}
