//! Device registry.
//!
//! A flat, fixed-capacity table mapping human-readable device names to 16-bit
//! link addresses and back, plus the sensor sub-table walked by the polling
//! sweep. Both tables are filled once at startup and never change afterwards.
//!
//! ```rust
//! use rf24hub::registry::DeviceRegistry;
//!
//! let registry = DeviceRegistry::from_tables(
//!     &[("Device 1", 0xFA01), ("Device 2", 0xFA02)],
//!     &[("Device 1", [0xAA01, 0xBB01, 0xCC01])],
//! )
//! .unwrap();
//! assert_eq!(registry.address_of("Device 2"), Ok(0xFA02));
//! assert_eq!(registry.name_of(0xFA01), Ok("Device 1"));
//! ```

use heapless::{String, Vec};

use crate::consts::{MAX_DEVICES, MAX_NAME_LEN, MAX_SENSORS, SENSOR_AUX_COUNT};
use crate::error::{Error, Result};

/// Name of a device or hub.
pub type DeviceName = String<MAX_NAME_LEN>;

pub(crate) fn device_name(name: &str) -> Option<DeviceName> {
    let mut owned = DeviceName::new();
    owned.push_str(name).ok()?;
    Some(owned)
}

/// A radio endpoint known to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    name: DeviceName,
    address: u16,
}

impl Device {
    /// The unique name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unique link address of the device.
    pub fn address(&self) -> u16 {
        self.address
    }
}

/// A status sensor and the endpoints bound to it.
///
/// In a parking lot these are the occupancy sensor and the lamp, barrier
/// and display that belong to the same bay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorEntity {
    name: DeviceName,
    sensor_address: u16,
    aux_addresses: [u16; SENSOR_AUX_COUNT],
}

impl SensorEntity {
    /// Name of the sensor's device entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link address the sensor reports from.
    pub fn sensor_address(&self) -> u16 {
        self.sensor_address
    }

    /// Addresses of the co-located actuator and indicator endpoints.
    pub fn aux_addresses(&self) -> &[u16; SENSOR_AUX_COUNT] {
        &self.aux_addresses
    }
}

/// Bidirectional name/address table with its sensor sub-table.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device, MAX_DEVICES>,
    sensors: Vec<SensorEntity, MAX_SENSORS>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from static tables of `(name, address)` devices and
    /// `(name, aux addresses)` sensors.
    pub fn from_tables(
        devices: &[(&str, u16)],
        sensors: &[(&str, [u16; SENSOR_AUX_COUNT])],
    ) -> Result<Self> {
        let mut registry = Self::new();
        for &(name, address) in devices {
            registry.register(name, address)?;
        }
        for &(name, aux) in sensors {
            registry.add_sensor(name, aux)?;
        }
        Ok(registry)
    }

    /// Adds a device. Names and addresses must both be unique.
    pub fn register(&mut self, name: &str, address: u16) -> Result<()> {
        if self
            .devices
            .iter()
            .any(|d| d.name == name || d.address == address)
        {
            return Err(Error::DuplicateDevice);
        }
        // A name that cannot be stored could never be looked up.
        let name = device_name(name).ok_or(Error::UnknownDevice)?;
        self.devices
            .push(Device { name, address })
            .map_err(|_| Error::RegistryFull)
    }

    /// Binds a registered device into the sensor sub-table.
    ///
    /// The sensor address is the device's registered address.
    pub fn add_sensor(&mut self, name: &str, aux_addresses: [u16; SENSOR_AUX_COUNT]) -> Result<()> {
        let device = self.device(name)?;
        if self.sensors.iter().any(|s| s.name == name) {
            return Err(Error::DuplicateDevice);
        }
        let sensor = SensorEntity {
            name: device.name.clone(),
            sensor_address: device.address,
            aux_addresses,
        };
        self.sensors.push(sensor).map_err(|_| Error::RegistryFull)
    }

    /// Looks up a device by name.
    pub fn device(&self, name: &str) -> Result<&Device> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .ok_or(Error::UnknownDevice)
    }

    /// Resolves a device name to its link address.
    pub fn address_of(&self, name: &str) -> Result<u16> {
        self.device(name).map(Device::address)
    }

    /// Resolves a link address to its device name.
    pub fn name_of(&self, address: u16) -> Result<&str> {
        self.devices
            .iter()
            .find(|d| d.address == address)
            .map(Device::name)
            .ok_or(Error::UnknownAddress { address })
    }

    /// Looks up a sensor by its device name.
    pub fn sensor(&self, name: &str) -> Option<&SensorEntity> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// All devices, in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// All sensors, in registration order.
    pub fn sensors(&self) -> impl Iterator<Item = &SensorEntity> {
        self.sensors.iter()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parking_lot() -> DeviceRegistry {
        DeviceRegistry::from_tables(
            &[("Device 1", 0xFA01), ("Device 2", 0xFA02)],
            &[("Device 1", [0xAA01, 0xBB01, 0xCC01])],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_both_directions() {
        let registry = parking_lot();
        for device in registry.devices() {
            assert_eq!(registry.address_of(device.name()), Ok(device.address()));
            assert_eq!(registry.name_of(device.address()), Ok(device.name()));
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_keys_fail_explicitly() {
        let registry = parking_lot();
        assert_eq!(registry.address_of("Device 9"), Err(Error::UnknownDevice));
        assert_eq!(
            registry.name_of(0x1234),
            Err(Error::UnknownAddress { address: 0x1234 })
        );
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut registry = parking_lot();
        assert_eq!(
            registry.register("Device 1", 0xFA09),
            Err(Error::DuplicateDevice)
        );
        assert_eq!(
            registry.register("Device 9", 0xFA02),
            Err(Error::DuplicateDevice)
        );
        assert_eq!(
            registry.add_sensor("Device 1", [0, 0, 0]),
            Err(Error::DuplicateDevice)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sensor_takes_device_address() {
        let registry = parking_lot();
        let sensor = registry.sensor("Device 1").unwrap();
        assert_eq!(sensor.sensor_address(), 0xFA01);
        assert_eq!(sensor.aux_addresses(), &[0xAA01, 0xBB01, 0xCC01]);
        assert!(registry.sensor("Device 2").is_none());
    }

    #[test]
    fn test_sensor_requires_registered_device() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(
            registry.add_sensor("Ghost", [1, 2, 3]),
            Err(Error::UnknownDevice)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_table_capacity() {
        let mut registry = DeviceRegistry::new();
        for i in 0..MAX_DEVICES as u16 {
            let mut name = DeviceName::new();
            let _ = core::fmt::write(&mut name, format_args!("Device {}", i));
            registry.register(&name, 0xFA00 + i).unwrap();
        }
        assert_eq!(
            registry.register("One too many", 0xFB00),
            Err(Error::RegistryFull)
        );
    }
}
