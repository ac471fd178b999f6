//! Loopback link endpoint.
//!
//! Outbound packets immediately become inbound packets on the same
//! stack; there is no transmission medium in between. This lets a stack
//! carry local traffic without a real network interface.

use alloc::sync::Arc;
use alloc::vec;

use spin::RwLock;

use crate::address::LinkAddress;
use crate::buffer::{Prependable, VectorisedView};
use crate::stack::{register_link_endpoint, LinkEndpointId, NetworkDispatcher, Route};
use crate::{NetworkProtocolNumber, Result};

use super::{LinkCapabilities, LinkEndpoint};

/// Matches the MTU of a Linux loopback interface.
const LOOPBACK_MTU: u32 = 65536;

enum DispatcherSlot {
    Detached,
    Attached(Arc<dyn NetworkDispatcher>),
}

pub struct LoopbackEndpoint {
    // Written once by attach before the first send; sends take only an
    // uncontended read lock.
    dispatcher: RwLock<DispatcherSlot>,
}

impl LoopbackEndpoint {
    /// Creates a detached loopback endpoint.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dispatcher: RwLock::new(DispatcherSlot::Detached),
        })
    }

    /// Creates a loopback endpoint and registers it with the stack,
    /// returning the id to reference it by when creating an interface.
    pub fn register() -> LinkEndpointId {
        register_link_endpoint(Self::new())
    }
}

impl LinkEndpoint for LoopbackEndpoint {
    fn attach(&self, dispatcher: Arc<dyn NetworkDispatcher>) {
        *self.dispatcher.write() = DispatcherSlot::Attached(dispatcher);
    }

    fn is_attached(&self) -> bool {
        matches!(&*self.dispatcher.read(), DispatcherSlot::Attached(_))
    }

    fn mtu(&self) -> u32 {
        LOOPBACK_MTU
    }

    /// Checksum offload is advertised but never performed: loopback
    /// traffic has no wire for corruption to happen on, so upper layers
    /// may skip filling checksums entirely.
    fn capabilities(&self) -> LinkCapabilities {
        LinkCapabilities::CHECKSUM_OFFLOAD
            | LinkCapabilities::SAVE_RESTORE
            | LinkCapabilities::LOOPBACK
    }

    /// Loopback prepends no link header of its own.
    fn max_header_length(&self) -> u16 {
        0
    }

    fn link_address(&self) -> LinkAddress {
        LinkAddress::EMPTY
    }

    /// Redelivers the outbound packet to the attached dispatcher,
    /// synchronously and without copying. The route is irrelevant on
    /// loopback and ignored.
    fn write_packet(
        &self,
        _route: &Route,
        hdr: &Prependable,
        payload: &[u8],
        protocol: NetworkProtocolNumber,
    ) -> Result<()> {
        let slot = self.dispatcher.read();
        let dispatcher = match &*slot {
            DispatcherSlot::Attached(dispatcher) => dispatcher,
            DispatcherSlot::Detached => {
                // The contract is attach-before-send. Drop rather than
                // queue; loopback has nowhere to buffer.
                log::warn!("loopback: dropping packet written before attach");
                return Ok(());
            }
        };

        let vv = if payload.is_empty() {
            // No payload, so the header bytes are the whole packet.
            VectorisedView::from_view(hdr.view())
        } else {
            VectorisedView::new(hdr.view().len() + payload.len(), vec![hdr.view(), payload])
        };
        dispatcher.deliver_network_packet(self, LinkAddress::EMPTY, protocol, &vv);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use spin::Mutex;

    use crate::address::LinkAddress;
    use crate::buffer::{Prependable, VectorisedView};
    use crate::link::{LinkCapabilities, LinkEndpoint};
    use crate::stack::{NetworkDispatcher, Route};
    use crate::{NetworkProtocolNumber, IPV4_PROTOCOL_NUMBER, IPV6_PROTOCOL_NUMBER};

    use super::LoopbackEndpoint;

    struct Delivery {
        src: usize,
        remote_link_addr: LinkAddress,
        protocol: NetworkProtocolNumber,
        bytes: Vec<u8>,
        segments: usize,
    }

    #[derive(Default)]
    struct CaptureDispatcher {
        deliveries: Mutex<Vec<Delivery>>,
    }

    impl CaptureDispatcher {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn count(&self) -> usize {
            self.deliveries.lock().len()
        }
    }

    impl NetworkDispatcher for CaptureDispatcher {
        fn deliver_network_packet(
            &self,
            src: &dyn LinkEndpoint,
            remote_link_addr: LinkAddress,
            protocol: NetworkProtocolNumber,
            vv: &VectorisedView<'_>,
        ) {
            self.deliveries.lock().push(Delivery {
                src: src as *const dyn LinkEndpoint as *const () as usize,
                remote_link_addr,
                protocol,
                bytes: vv.to_vec(),
                segments: vv.views().len(),
            });
        }
    }

    fn hdr_with(bytes: &[u8]) -> Prependable {
        let mut hdr = Prependable::new(64);
        hdr.prepend(bytes.len())
            .unwrap()
            .copy_from_slice(bytes);
        hdr
    }

    #[test]
    pub fn test_constant_accessors() {
        let ep = LoopbackEndpoint::new();

        assert_eq!(ep.mtu(), 65536);
        assert_eq!(ep.max_header_length(), 0);
        assert_eq!(ep.link_address(), LinkAddress::EMPTY);

        let caps = ep.capabilities();
        assert!(caps.contains(LinkCapabilities::CHECKSUM_OFFLOAD));
        assert!(caps.contains(LinkCapabilities::SAVE_RESTORE));
        assert!(caps.contains(LinkCapabilities::LOOPBACK));
    }

    #[test]
    pub fn test_is_attached_tracks_attach() {
        let ep = LoopbackEndpoint::new();
        assert!(!ep.is_attached());

        ep.attach(CaptureDispatcher::new());
        assert!(ep.is_attached());
    }

    #[test]
    pub fn test_attach_overwrites_dispatcher() {
        let ep = LoopbackEndpoint::new();
        let first = CaptureDispatcher::new();
        let second = CaptureDispatcher::new();

        ep.attach(first.clone());
        ep.attach(second.clone());

        let hdr = hdr_with(&[0x45, 0x00]);
        ep.write_packet(&Route::default(), &hdr, &[], IPV4_PROTOCOL_NUMBER)
            .unwrap();

        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 1);
    }

    #[test]
    pub fn test_write_before_attach_drops() {
        let ep = LoopbackEndpoint::new();
        let hdr = hdr_with(&[0x45, 0x00]);

        // Checked no-op, not a panic: the packet just disappears.
        ep.write_packet(&Route::default(), &hdr, &[], IPV4_PROTOCOL_NUMBER)
            .unwrap();
    }

    #[test]
    pub fn test_empty_payload_uses_header_as_packet() {
        let ep = LoopbackEndpoint::new();
        let dispatcher = CaptureDispatcher::new();
        ep.attach(dispatcher.clone());

        let hdr = hdr_with(&[0x45, 0x00, 0x00, 0x14]);
        ep.write_packet(&Route::default(), &hdr, &[], IPV4_PROTOCOL_NUMBER)
            .unwrap();

        let deliveries = dispatcher.deliveries.lock();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].bytes, [0x45, 0x00, 0x00, 0x14]);
        assert_eq!(deliveries[0].segments, 1);
    }

    #[test]
    pub fn test_zero_length_header_and_payload() {
        let ep = LoopbackEndpoint::new();
        let dispatcher = CaptureDispatcher::new();
        ep.attach(dispatcher.clone());

        let hdr = Prependable::new(64);
        ep.write_packet(&Route::default(), &hdr, &[], IPV6_PROTOCOL_NUMBER)
            .unwrap();

        let deliveries = dispatcher.deliveries.lock();
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].bytes.is_empty());
    }

    #[test]
    pub fn test_header_and_payload_compose_without_copy() {
        let ep = LoopbackEndpoint::new();
        let dispatcher = CaptureDispatcher::new();
        ep.attach(dispatcher.clone());

        let header_bytes = [0x45u8, 0x00, 0x00, 0x1c];
        let payload = [0xAAu8, 0xBB];
        let hdr = hdr_with(&header_bytes);

        ep.write_packet(&Route::default(), &hdr, &payload, IPV4_PROTOCOL_NUMBER)
            .unwrap();

        // Neither source region moved or changed.
        assert_eq!(hdr.view(), header_bytes);
        assert_eq!(payload, [0xAA, 0xBB]);

        let deliveries = dispatcher.deliveries.lock();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].segments, 2);
        assert_eq!(deliveries[0].bytes.len(), header_bytes.len() + payload.len());
        assert_eq!(deliveries[0].bytes, [0x45, 0x00, 0x00, 0x1c, 0xAA, 0xBB]);
    }

    #[test]
    pub fn test_delivery_arguments() {
        let ep = LoopbackEndpoint::new();
        let dispatcher = CaptureDispatcher::new();
        ep.attach(dispatcher.clone());

        let hdr = hdr_with(&[0x45, 0x00, 0x00, 0x1c]);
        ep.write_packet(&Route::default(), &hdr, &[0xAA, 0xBB], IPV4_PROTOCOL_NUMBER)
            .unwrap();

        let deliveries = dispatcher.deliveries.lock();
        assert_eq!(deliveries[0].src, Arc::as_ptr(&ep) as *const () as usize);
        assert_eq!(deliveries[0].remote_link_addr, LinkAddress::EMPTY);
        assert_eq!(deliveries[0].protocol, IPV4_PROTOCOL_NUMBER);
    }

    #[test]
    pub fn test_sequential_writes_deliver_in_order() {
        let ep = LoopbackEndpoint::new();
        let dispatcher = CaptureDispatcher::new();
        ep.attach(dispatcher.clone());

        for i in 0..16u8 {
            let hdr = hdr_with(&[0x45, i]);
            ep.write_packet(&Route::default(), &hdr, &[i, i, i], IPV4_PROTOCOL_NUMBER)
                .unwrap();
        }

        let deliveries = dispatcher.deliveries.lock();
        assert_eq!(deliveries.len(), 16);
        for (i, delivery) in deliveries.iter().enumerate() {
            let i = i as u8;
            assert_eq!(delivery.bytes, [0x45, i, i, i, i]);
        }
    }
}
