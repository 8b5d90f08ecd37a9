// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

use kernel::ErrorCode;

pub mod virtio_input;

/// The VirtIO device types this runtime can drive.
///
/// A VirtIO MMIO slot announces the device it hosts through a numeric device
/// ID. IDs of devices without a driver here are reported as unknown.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
#[non_exhaustive]
pub enum VirtIODeviceType {
    InputDevice = 18,
}

impl VirtIODeviceType {
    pub fn from_device_id(id: u32) -> Option<VirtIODeviceType> {
        match id {
            18 => Some(VirtIODeviceType::InputDevice),
            _ => None,
        }
    }
}

/// A driver for one kind of VirtIO device.
///
/// The transport calls into the driver twice while bringing the device up:
/// once to pick device-specific features and once, with every queue ready,
/// to let the driver hand its buffers to the device.
pub trait VirtIODeviceDriver {
    /// Pick the features to accept out of `offered_features`, which holds
    /// only the device-specific bits (0 to 23). `None` rejects the device.
    fn negotiate_features(&self, offered_features: u64) -> Option<u64>;

    /// Runs right before `DRIVER_OK` is set. An error marks the device as
    /// `FAILED` and aborts initialization.
    fn pre_device_initialization(&self) -> Result<(), ErrorCode> {
        Ok(())
    }
}
