//! Event listener auto-registration.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::RegResult;
use crate::host::{HostInstance, Listener};
use crate::lifecycle::Managed;
use crate::registry::ManagerRegistry;
use crate::scanner::ClassScanner;

/// Scans listener-marker classes, constructs and wires them, and hands
/// them to the host's event bus.
///
/// Like the command scan, per-class failures are reported and skipped;
/// the returned name list covers only successful registrations, sorted.
pub struct AutoEventRegistrar<'r> {
    host: HostInstance,
    scanner: Arc<dyn ClassScanner>,
    registry: Option<&'r ManagerRegistry>,
}

impl<'r> AutoEventRegistrar<'r> {
    /// Creates a registrar for the host, scanning through `scanner`.
    pub fn new(host: HostInstance, scanner: Arc<dyn ClassScanner>) -> Self {
        Self {
            host,
            scanner,
            registry: None,
        }
    }

    /// Wires constructed listeners through this registry before handing
    /// them to the bus.
    pub fn with_registry(mut self, registry: &'r ManagerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Scans and registers every listener-marker class.
    ///
    /// Returns the sorted display names of the listeners that were
    /// registered.
    pub fn register_all_listeners(&self) -> Vec<String> {
        let plugin = self.host.shared();
        let bus = plugin.event_bus();
        let mut registered = Vec::new();

        for class in self.scanner.listeners() {
            match (class.build)(&self.host, self.registry) {
                Ok(listener) => {
                    bus.register(listener);
                    debug!(listener = class.display_name(), "registered event listener");
                    registered.push(class.display_name().to_string());
                }
                Err(err) => {
                    error!(class = class.type_name, %err, "failed to construct listener");
                }
            }
        }

        registered.sort();
        registered
    }

    /// Wires one externally constructed listener through the registry
    /// (when one is attached) and hands it to the host's event bus.
    pub fn register_listener<L: Listener + Managed>(&self, mut listener: L) -> RegResult<()> {
        if let Some(registry) = self.registry {
            registry.inject(&mut listener)?;
        }
        self.host.shared().event_bus().register(Arc::new(listener));
        Ok(())
    }
}
