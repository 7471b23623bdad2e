//! Node identity for time-based identifiers.
//!
//! The 6-byte node component is derived from the hardware address of a host
//! network interface when one is available, and from entropy otherwise.
//! Interfaces are enumerated at most once per provider.

use std::sync::{Mutex, MutexGuard};

use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use tracing::debug;

use crate::rng;
use crate::uuid::UuidError;

/// Width of the node component embedded in a time-based identifier.
pub const NODE_ID_LEN: usize = 6;

/// A host network interface paired with its hardware address bytes.
///
/// An empty `hardware_addr` means the interface has no usable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub hardware_addr: Vec<u8>,
}

struct NodeInner {
    interfaces: Option<Vec<Interface>>,
    ifname: String,
    node_id: Option<[u8; NODE_ID_LEN]>,
}

impl NodeInner {
    fn resolve(&mut self, name: Option<&str>) -> Result<(), UuidError> {
        if self.interfaces.is_none() {
            self.interfaces = Some(host_interfaces());
        }
        let selected = self
            .interfaces
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|ifs| {
                ifs.hardware_addr.len() >= NODE_ID_LEN && name.is_none_or(|n| n == ifs.name)
            })
            .map(|ifs| {
                let mut id = [0u8; NODE_ID_LEN];
                id.copy_from_slice(&ifs.hardware_addr[..NODE_ID_LEN]);
                (ifs.name.clone(), id)
            });

        if let Some((ifname, id)) = selected {
            debug!(interface = %ifname, "node id derived from hardware address");
            self.node_id = Some(id);
            self.ifname = ifname;
            return Ok(());
        }

        match name {
            Some(n) => Err(UuidError::NodeResolution(n.to_string())),
            None => {
                let mut id = [0u8; NODE_ID_LEN];
                rng::fill_random(&mut id);
                debug!("no usable interface, generated random node id");
                self.node_id = Some(id);
                self.ifname.clear();
                Ok(())
            }
        }
    }
}

/// Resolves and caches the 6-byte node identifier.
///
/// State is guarded by one lock; the only I/O, interface enumeration,
/// happens at most once under it.
pub struct NodeIdentity {
    inner: Mutex<NodeInner>,
}

impl NodeIdentity {
    /// Provider backed by host interface enumeration, performed lazily.
    pub fn new() -> Self {
        NodeIdentity {
            inner: Mutex::new(NodeInner {
                interfaces: None,
                ifname: String::new(),
                node_id: None,
            }),
        }
    }

    /// Provider with a fixed interface list instead of host enumeration.
    pub fn with_interfaces(interfaces: Vec<Interface>) -> Self {
        NodeIdentity {
            inner: Mutex::new(NodeInner {
                interfaces: Some(interfaces),
                ifname: String::new(),
                node_id: None,
            }),
        }
    }

    /// Selects the first interface whose hardware address is at least 6
    /// bytes and, when `name` is given, whose name matches it.
    ///
    /// A named interface that cannot be found is an error and leaves state
    /// unchanged. With no name and no usable interface a random node id is
    /// generated and the call succeeds.
    pub fn set_interface(&self, name: Option<&str>) -> Result<(), UuidError> {
        self.lock().resolve(name)
    }

    /// Copy of the resolved node id, resolving with no interface
    /// preference on first use.
    pub fn node_id(&self) -> [u8; NODE_ID_LEN] {
        let mut inner = self.lock();
        if inner.node_id.is_none() {
            // Unnamed resolution always succeeds.
            let _ = inner.resolve(None);
        }
        inner.node_id.unwrap_or_default()
    }

    /// Overrides the node id with the first 6 of the supplied bytes and
    /// marks the source as `"user"`. Shorter input is rejected and leaves
    /// state unchanged.
    pub fn set_node_id(&self, id: &[u8]) -> Result<(), UuidError> {
        if id.len() < NODE_ID_LEN {
            return Err(UuidError::InvalidNodeId(id.len()));
        }
        let mut node = [0u8; NODE_ID_LEN];
        node.copy_from_slice(&id[..NODE_ID_LEN]);
        let mut inner = self.lock();
        inner.node_id = Some(node);
        inner.ifname = "user".to_string();
        Ok(())
    }

    /// Name of the interface the node id came from, `"user"` after an
    /// explicit override, or empty for the random fallback.
    pub fn interface_name(&self) -> String {
        self.lock().ifname.clone()
    }

    fn lock(&self) -> MutexGuard<'_, NodeInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self::new()
    }
}

fn host_interfaces() -> Vec<Interface> {
    let listed = NetworkInterface::show().unwrap_or_default();
    listed
        .into_iter()
        .map(|ifs| Interface {
            hardware_addr: ifs
                .mac_addr
                .as_deref()
                .map(parse_hardware_addr)
                .unwrap_or_default(),
            name: ifs.name,
        })
        .collect()
}

/// Parses a `aa:bb:cc:dd:ee:ff` (or dash-separated) hardware address.
/// All-zero addresses count as absent.
fn parse_hardware_addr(s: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    for part in s.split([':', '-']) {
        match u8::from_str_radix(part, 16) {
            Ok(b) => bytes.push(b),
            Err(_) => return Vec::new(),
        }
    }
    if bytes.iter().all(|&b| b == 0) {
        return Vec::new();
    }
    bytes
}
