// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! The peripherals of the chip, wired to their fixed addresses.

use riscv::trap::MachineTrap;
use virtio::devices::VirtIODeviceType;
use virtio::transports::mmio::{self, VirtIOMMIODevice};
use virtio::transports::VirtIOInitializationError;

use crate::clint::{QemuRv64VirtClint, CLINT_BASE};
use crate::fw_cfg::{FwCfg, FW_CFG_BASE};
use crate::syscon::{Syscon, SYSCON_BASE};
use crate::uart::{Uart16550, UART0_BASE};
use crate::virtio_mmio::{self as virtio_mmio_bases, VENDOR_ID_QEMU};

pub struct QemuRv64VirtDefaultPeripherals {
    pub uart0: Uart16550,
    pub clint: QemuRv64VirtClint,
    pub trap: MachineTrap,
    pub syscon: Syscon,
    pub fw_cfg: FwCfg,
    pub virtio_mmio: [VirtIOMMIODevice; 8],
}

impl QemuRv64VirtDefaultPeripherals {
    pub fn new() -> Self {
        Self {
            uart0: Uart16550::new(UART0_BASE),
            clint: QemuRv64VirtClint::new(CLINT_BASE),
            trap: MachineTrap::new(),
            syscon: Syscon::new(SYSCON_BASE),
            fw_cfg: FwCfg::new(FW_CFG_BASE),
            virtio_mmio: [
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_0_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_1_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_2_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_3_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_4_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_5_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_6_BASE),
                VirtIOMMIODevice::new(virtio_mmio_bases::VIRTIO_MMIO_7_BASE),
            ],
        }
    }

    /// Bring the console UART up. Must happen before anything is logged.
    pub fn init(&self) {
        self.uart0.init();
    }

    /// The QEMU virtio-input device, if one is attached to any slot.
    pub fn virtio_input_device(&self) -> Result<&VirtIOMMIODevice, VirtIOInitializationError> {
        mmio::find_device(
            &self.virtio_mmio,
            VENDOR_ID_QEMU,
            VirtIODeviceType::InputDevice,
        )
    }
}

impl Default for QemuRv64VirtDefaultPeripherals {
    fn default() -> Self {
        Self::new()
    }
}
