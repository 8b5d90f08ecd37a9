// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! VirtIO transports.

use core::fmt;

use kernel::ErrorCode;

use super::devices::{VirtIODeviceDriver, VirtIODeviceType};
use super::queues::Virtqueue;

pub mod mmio;

/// Errors which can occur while discovering and initializing a VirtIO device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VirtIOInitializationError {
    /// None of the probed transport slots hosts the requested device.
    DeviceNotFound,
    /// The magic value of the transport does not read "virt".
    NotAVirtIODevice,
    /// The transport is not version 2 (modern, non-legacy).
    InvalidTransportVersion,
    /// The device reports an ID this driver stack does not know.
    UnknownDeviceType(u32),
    /// The device did not keep a status bit the driver set.
    ///
    /// Raised when `FEATURES_OK` does not read back after feature
    /// negotiation. `status` is the value that was read.
    StatusMismatch { status: u32 },
    /// A queue supports fewer descriptors than the driver needs.
    QueueTooSmall {
        queue: u32,
        max: u32,
        required: u32,
    },
    /// The device behaved contrary to the VirtIO specification, for instance
    /// by reporting a queue as ready right after reset.
    DeviceError,
    /// The driver's `pre_device_initialization` hook failed.
    DriverPreInitializationError(ErrorCode),
}

impl fmt::Display for VirtIOInitializationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "no matching virtio device found"),
            Self::NotAVirtIODevice => write!(f, "not a virtio-mmio device"),
            Self::InvalidTransportVersion => write!(f, "unsupported virtio-mmio version"),
            Self::UnknownDeviceType(id) => write!(f, "unknown virtio device id {}", id),
            Self::StatusMismatch { status } => {
                write!(f, "device rejected features (status {:#x})", status)
            }
            Self::QueueTooSmall {
                queue,
                max,
                required,
            } => write!(
                f,
                "queue {} holds {} descriptors, {} required",
                queue, max, required
            ),
            Self::DeviceError => write!(f, "virtio device error"),
            Self::DriverPreInitializationError(err) => {
                write!(f, "driver setup failed: {}", err)
            }
        }
    }
}

/// A VirtIO transport.
///
/// A transport carries the device status handshake, feature negotiation and
/// queue configuration for a device, independent of what kind of device it
/// is. Queue contents are exchanged through shared memory only, so there is
/// no operation here once the device is live.
pub trait VirtIOTransport {
    /// Run the full device initialization sequence.
    ///
    /// `queues` are configured in order as queues 0, 1 and so on. The driver's
    /// `pre_device_initialization` hook runs after every queue has been marked
    /// ready but before `DRIVER_OK` is set, so it can offer buffers to the
    /// device.
    fn initialize(
        &self,
        driver: &dyn VirtIODeviceDriver,
        queues: &[&dyn Virtqueue],
    ) -> Result<VirtIODeviceType, VirtIOInitializationError>;
}
