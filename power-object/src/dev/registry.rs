use super::DevicePm;
use crate::{PmError, PmResult};
use alloc::{sync::Arc, vec::Vec};
use spin::RwLock;

/// The set of device-model devices taking part in suspend.
///
/// Every registration change bumps the version, so a suspend cycle can tell
/// whether the set moved under it.
pub struct DeviceRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    devices: Vec<Arc<dyn DevicePm>>,
    version: u64,
}

impl DeviceRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(DeviceRegistry {
            inner: RwLock::new(RegistryInner::default()),
        })
    }

    /// Add a device. Names are unique.
    ///
    /// Returns the new version.
    pub fn register(&self, device: Arc<dyn DevicePm>) -> PmResult<u64> {
        let mut inner = self.inner.write();
        if inner.devices.iter().any(|d| d.name() == device.name()) {
            return Err(PmError::ALREADY_EXISTS);
        }
        debug!("register device {:?}", device.name());
        inner.devices.push(device);
        inner.version += 1;
        Ok(inner.version)
    }

    pub fn unregister(&self, name: &str) -> PmResult<Arc<dyn DevicePm>> {
        let mut inner = self.inner.write();
        let index = inner
            .devices
            .iter()
            .position(|d| d.name() == name)
            .ok_or(PmError::NOT_FOUND)?;
        debug!("unregister device {:?}", name);
        let device = inner.devices.remove(index);
        inner.version += 1;
        Ok(device)
    }

    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().devices.is_empty()
    }

    /// Copy of the current device set, for one suspend cycle.
    pub fn snapshot(&self) -> DeviceSnapshot {
        let inner = self.inner.read();
        DeviceSnapshot {
            version: inner.version,
            devices: inner.devices.clone(),
        }
    }
}

/// The devices of one suspend cycle, in registration order.
pub struct DeviceSnapshot {
    version: u64,
    devices: Vec<Arc<dyn DevicePm>>,
}

impl DeviceSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Suspend phases go last-registered first, so a device goes down
    /// before whatever it was registered on top of.
    pub fn suspend_order(&self) -> impl Iterator<Item = &Arc<dyn DevicePm>> {
        self.devices.iter().rev()
    }

    /// Resume phases go in registration order.
    pub fn resume_order(&self) -> impl Iterator<Item = &Arc<dyn DevicePm>> {
        self.devices.iter()
    }
}
