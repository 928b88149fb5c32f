//! Explicit device registry.
//!
//! Units are pre-allocated for the life of the process; the registry is the
//! one place that maps their numeric ids to instances. It is plain owned
//! state with explicit init - built once at startup, then handed (by shared
//! reference) to application code and to whatever dispatches hardware
//! interrupts. No hidden singletons.

use heapless::Vec;
use heliograph_hal::port::{Error, SerialPort};

/// Default number of registry slots.
pub const MAX_PORTS: usize = 4;

/// Maps small numeric unit ids to pre-allocated driver instances.
///
/// Lookup is a linear scan: ids are few and need not be dense. Which units
/// exist is fixed by what gets registered at startup; `instance` on any
/// other id is simply absent.
pub struct Registry<const N: usize = MAX_PORTS> {
    ports: Vec<&'static dyn SerialPort, N>,
}

impl<const N: usize> Registry<N> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// Add a unit.
    ///
    /// Fails with [`Error::InvalidPort`] when the id is already taken and
    /// [`Error::RegistryFull`] when every slot is used.
    pub fn register(&mut self, port: &'static dyn SerialPort) -> Result<(), Error> {
        if self.instance(port.id()).is_some() {
            return Err(Error::InvalidPort);
        }
        self.ports.push(port).map_err(|_| Error::RegistryFull)
    }

    /// Look up a unit by id. Pure lookup; `None` for unknown ids.
    pub fn instance(&self, id: u8) -> Option<&'static dyn SerialPort> {
        self.ports.iter().find(|port| port.id() == id).copied()
    }

    /// Open the unit with the given id.
    pub fn open(&self, id: u8) -> Result<(), Error> {
        self.instance(id).ok_or(Error::InvalidPort)?.open()
    }

    /// Close the unit with the given id.
    pub fn close(&self, id: u8) -> Result<(), Error> {
        let port = self.instance(id).ok_or(Error::InvalidPort)?;
        port.close();
        Ok(())
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether no unit is registered.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl<const N: usize> Default for Registry<N> {
    fn default() -> Self {
        Self::new()
    }
}
