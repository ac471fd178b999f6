//! The stack-facing side of the link layer: inbound packet dispatch and
//! the registry that hands out endpoint ids.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use spin::{Lazy, Mutex};

use crate::address::{Ipv4Address, LinkAddress};
use crate::buffer::VectorisedView;
use crate::link::LinkEndpoint;
use crate::NetworkProtocolNumber;

/// Receives inbound packets from a link endpoint and hands them to the
/// stack's network-layer protocol demultiplexer.
pub trait NetworkDispatcher: Send + Sync {
    /// Called by a link endpoint for every packet it receives. `src` is
    /// the endpoint the packet arrived on and `remote_link_addr` the
    /// sender's hardware address, empty on media without one.
    ///
    /// Runs synchronously inside the caller; the view borrows the
    /// caller's packet memory and is only valid for the duration of the
    /// call.
    fn deliver_network_packet(
        &self,
        src: &dyn LinkEndpoint,
        remote_link_addr: LinkAddress,
        protocol: NetworkProtocolNumber,
        vv: &VectorisedView<'_>,
    );
}

/// Routing decision for an outbound packet. Endpoints writing to a real
/// medium need the resolved next-hop link address; loopback ignores all
/// of it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Route {
    pub local_address: Ipv4Address,
    pub remote_address: Ipv4Address,
    pub remote_link_address: LinkAddress,
}

/// Opaque handle naming a registered link endpoint, e.g. when creating a
/// network interface on top of it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LinkEndpointId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static LINK_ENDPOINTS: Lazy<Mutex<HashMap<LinkEndpointId, Arc<dyn LinkEndpoint>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers `endpoint` and returns the id the stack will know it by.
/// Endpoints live for the lifetime of the table; there is no
/// deregistration.
pub fn register_link_endpoint(endpoint: Arc<dyn LinkEndpoint>) -> LinkEndpointId {
    let id = LinkEndpointId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
    LINK_ENDPOINTS.lock().insert(id, endpoint);
    id
}

/// Looks up a previously registered endpoint.
pub fn find_link_endpoint(id: LinkEndpointId) -> Option<Arc<dyn LinkEndpoint>> {
    LINK_ENDPOINTS.lock().get(&id).cloned()
}
