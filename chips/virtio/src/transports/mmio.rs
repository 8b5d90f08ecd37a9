// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! VirtIO memory mapped device driver

use core::cell::Cell;

use kernel::debug;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, FieldValue, LocalRegisterCopy, ReadOnly, ReadWrite,
    WriteOnly,
};
use kernel::utilities::StaticRef;

use super::super::devices::{VirtIODeviceDriver, VirtIODeviceType};
use super::super::queues::Virtqueue;
use super::super::transports::{VirtIOInitializationError, VirtIOTransport};

// Magic string "virt" every device has to expose
const VIRTIO_MAGIC_VALUE: [u8; 4] = [0x76, 0x69, 0x72, 0x74];

const VIRTIO_MMIO_VERSION: u32 = 0x0002;

/// Feature bits 0 to 23 belong to the device type, the rest to the transport.
const DEVICE_FEATURES_MASK: u64 = 0x00FF_FFFF;

register_structs! {
    pub VirtIOMMIODeviceRegisters {
        /// Magic string "virt" for identification
        (0x000 => magic_value: ReadOnly<u32>),
        /// Device version number
        (0x004 => device_version: ReadOnly<u32>),
        /// VirtIO Subsystem Device ID
        (0x008 => device_id: ReadOnly<u32>),
        /// VirtIO Subsystem Vendor ID
        (0x00C => vendor_id: ReadOnly<u32>),
        /// Flags representing features the device supports
        (0x010 => device_features: ReadOnly<u32>),
        /// Device (host) features word selection
        (0x014 => device_features_sel: WriteOnly<u32>),
        (0x018 => _reserved0),
        /// Flags representing features understood and activated by the driver
        (0x020 => driver_features: WriteOnly<u32>),
        /// Activated (guest) features word selection
        (0x024 => driver_features_sel: WriteOnly<u32>),
        (0x028 => _reserved1),
        /// Virtual queue index
        (0x030 => queue_sel: WriteOnly<u32>),
        /// Maximum virtual queue size
        (0x034 => queue_num_max: ReadOnly<u32>),
        /// Virtual queue size
        (0x038 => queue_num: WriteOnly<u32>),
        (0x03C => _reserved2),
        /// Virtual queue ready bit
        (0x044 => queue_ready: ReadWrite<u32>),
        // Queue notification and interrupt status/acknowledge live in here.
        // Queues are driven by polling, so none of them are touched.
        (0x048 => _reserved3),
        /// Device status
        (0x070 => device_status: ReadWrite<u32, DeviceStatus::Register>),
        (0x074 => _reserved4),
        /// Virtual queue's Descriptor Area 64-bit long physical address
        (0x080 => queue_desc_low: WriteOnly<u32>),
        (0x084 => queue_desc_high: WriteOnly<u32>),
        (0x088 => _reserved5),
        /// Virtual queue's Driver Area 64-bit long physical address
        (0x090 => queue_driver_low: WriteOnly<u32>),
        (0x094 => queue_driver_high: WriteOnly<u32>),
        (0x098 => _reserved6),
        /// Virtual queue's Device Area 64-bit long physical address
        (0x0A0 => queue_device_low: WriteOnly<u32>),
        (0x0A4 => queue_device_high: WriteOnly<u32>),
        (0x0A8 => _reserved7),
        // Device specific configuration space starts at 0x100 and is not used.
        (0x100 => @END),
    }
}

register_bitfields![u32,
    DeviceStatus [
        Acknowledge OFFSET(0) NUMBITS(1) [],
        Driver OFFSET(1) NUMBITS(1) [],
        DriverOk OFFSET(2) NUMBITS(1) [],
        FeaturesOk OFFSET(3) NUMBITS(1) [],
        DeviceNeedsReset OFFSET(6) NUMBITS(1) [],
        Failed OFFSET(7) NUMBITS(1) []
    ]
];

/// The registers feature negotiation goes through.
trait FeatureRegisters {
    /// Both 32-bit halves of the features the device offers.
    fn read_device_features(&self) -> u64;

    /// Select driver feature word `select` and write `value` to it.
    fn write_driver_features(&self, select: u32, value: u32);

    fn status(&self) -> LocalRegisterCopy<u32, DeviceStatus::Register>;

    fn modify_status(&self, field: FieldValue<u32, DeviceStatus::Register>);
}

impl FeatureRegisters for VirtIOMMIODeviceRegisters {
    fn read_device_features(&self) -> u64 {
        // The device MUST NOT change its features during operation, so the two
        // halves are consistent.
        self.device_features_sel.set(0);
        let mut features = self.device_features.get() as u64;
        self.device_features_sel.set(1);
        features |= (self.device_features.get() as u64) << 32;
        features
    }

    fn write_driver_features(&self, select: u32, value: u32) {
        self.driver_features_sel.set(select);
        self.driver_features.set(value);
    }

    fn status(&self) -> LocalRegisterCopy<u32, DeviceStatus::Register> {
        self.device_status.extract()
    }

    fn modify_status(&self, field: FieldValue<u32, DeviceStatus::Register>) {
        self.device_status.modify(field);
    }
}

/// Steps 4 to 6 of 3.1 Device Initialization.
///
/// Only the device-specific bits the driver asks for are accepted. No
/// transport feature is, so the high driver feature word is always 0.
fn negotiate_features(
    regs: &impl FeatureRegisters,
    driver: &dyn VirtIODeviceDriver,
) -> Result<(), VirtIOInitializationError> {
    let device_features = regs.read_device_features();

    let Some(accepted) = driver.negotiate_features(device_features & DEVICE_FEATURES_MASK) else {
        // The driver does not like the offered features
        regs.modify_status(DeviceStatus::Failed::SET);
        return Err(VirtIOInitializationError::StatusMismatch {
            status: regs.status().get(),
        });
    };

    regs.write_driver_features(0, (accepted & DEVICE_FEATURES_MASK) as u32);
    regs.write_driver_features(1, 0);

    // We MUST NOT accept new feature bits after this step.
    regs.modify_status(DeviceStatus::FeaturesOk::SET);

    // A device that does not support the subset clears FEATURES_OK again.
    let status = regs.status();
    if !status.is_set(DeviceStatus::FeaturesOk) {
        regs.modify_status(DeviceStatus::Failed::SET);
        return Err(VirtIOInitializationError::StatusMismatch {
            status: status.get(),
        });
    }

    Ok(())
}

pub struct VirtIOMMIODevice {
    regs: StaticRef<VirtIOMMIODeviceRegisters>,
    device_type: Cell<Option<VirtIODeviceType>>,
}

impl VirtIOMMIODevice {
    pub const fn new(regs: StaticRef<VirtIOMMIODeviceRegisters>) -> VirtIOMMIODevice {
        VirtIOMMIODevice {
            regs,
            device_type: Cell::new(None),
        }
    }

    /// Partial initialization routine as per 4.2.3.1 MMIO-specific device
    /// initialization
    ///
    /// This can be used to query the VirtIO transport information (e.g. whether
    /// it's a supported transport and the attached device). A device ID of `0`
    /// indicates that no active VirtIO device is present at this MMIO address,
    /// and is reported as `UnknownDeviceType(0)`.
    pub fn query(&self) -> Result<VirtIODeviceType, VirtIOInitializationError> {
        // Verify that we are talking to a VirtIO MMIO device...
        if self.regs.magic_value.get() != u32::from_le_bytes(VIRTIO_MAGIC_VALUE) {
            return Err(VirtIOInitializationError::NotAVirtIODevice);
        }

        // with version 2
        if self.regs.device_version.get() != VIRTIO_MMIO_VERSION {
            return Err(VirtIOInitializationError::InvalidTransportVersion);
        }

        let device_id = self.regs.device_id.get();
        VirtIODeviceType::from_device_id(device_id)
            .ok_or(VirtIOInitializationError::UnknownDeviceType(device_id))
    }

    pub fn vendor_id(&self) -> u32 {
        self.regs.vendor_id.get()
    }

    /// The device type, once the device is live.
    pub fn device_type(&self) -> Option<VirtIODeviceType> {
        self.device_type.get()
    }

    /// Whether the device asked to be reset or was marked as failed.
    pub fn needs_reset(&self) -> bool {
        let status = self.regs.device_status.extract();
        status.is_set(DeviceStatus::DeviceNeedsReset) || status.is_set(DeviceStatus::Failed)
    }

    /// Print the identity, offered features and queue 0 capacity of the device.
    ///
    /// Only reads registers and selects feature word and queue 0, so it may be
    /// called at any time before the device is initialized.
    pub fn report(&self) {
        let features = self.regs.read_device_features();
        self.regs.queue_sel.set(0);
        debug!(
            "virtio-mmio {:#x}: device {} vendor {:#x} version {} features {:#x} queue0 max {}",
            self.regs.address(),
            self.regs.device_id.get(),
            self.regs.vendor_id.get(),
            self.regs.device_version.get(),
            features,
            self.regs.queue_num_max.get(),
        );
    }
}

/// Find the first device among `devices` that is a version 2 VirtIO device of
/// type `device_type`, made by `vendor_id`.
pub fn find_device(
    devices: &[VirtIOMMIODevice],
    vendor_id: u32,
    device_type: VirtIODeviceType,
) -> Result<&VirtIOMMIODevice, VirtIOInitializationError> {
    devices
        .iter()
        .find(|device| device.query() == Ok(device_type) && device.vendor_id() == vendor_id)
        .ok_or(VirtIOInitializationError::DeviceNotFound)
}

impl VirtIOTransport for VirtIOMMIODevice {
    fn initialize(
        &self,
        driver: &dyn VirtIODeviceDriver,
        queues: &[&dyn Virtqueue],
    ) -> Result<VirtIODeviceType, VirtIOInitializationError> {
        // Initialization routine as per 4.2.3.1 MMIO-specific device
        // initialization
        let device_type = self.query()?;

        // All further initialization as per 3.1 Device Initialization

        // 1. Reset the device (by writing 0x0 to the device status register)
        self.regs.device_status.set(0x0000);

        // 2. Set the ACKNOWLEDGE status bit: the guest OS has noticed the
        // device
        self.regs
            .device_status
            .modify(DeviceStatus::Acknowledge::SET);

        // 3. Set the DRIVER status bit: the guest OS knows how to drive the
        // device
        self.regs.device_status.modify(DeviceStatus::Driver::SET);

        // 4. to 6. Feature negotiation, confirmed through FEATURES_OK
        negotiate_features(&*self.regs, driver)?;

        // 7. Perform device specific setup, as per 4.2.3.2
        for (index, queue) in queues.iter().enumerate() {
            let queue_number = index as u32;
            self.regs.queue_sel.set(queue_number);

            // The queue cannot be in use right after reset
            if self.regs.queue_ready.get() != 0 {
                self.regs.device_status.modify(DeviceStatus::Failed::SET);
                return Err(VirtIOInitializationError::DeviceError);
            }

            // A QueueNumMax of zero means the queue is not available at all
            let queue_num_max = self.regs.queue_num_max.get();
            let queue_size = queue.queue_size() as u32;
            if queue_num_max < queue_size {
                self.regs.device_status.modify(DeviceStatus::Failed::SET);
                return Err(VirtIOInitializationError::QueueTooSmall {
                    queue: queue_number,
                    max: queue_num_max,
                    required: queue_size,
                });
            }

            queue.initialize(queue_number);
            self.regs.queue_num.set(queue_size);

            let addrs = queue.physical_addresses();
            self.regs.queue_desc_low.set(addrs.descriptor_area as u32);
            self.regs
                .queue_desc_high
                .set((addrs.descriptor_area >> 32) as u32);
            self.regs.queue_driver_low.set(addrs.driver_area as u32);
            self.regs
                .queue_driver_high
                .set((addrs.driver_area >> 32) as u32);
            self.regs.queue_device_low.set(addrs.device_area as u32);
            self.regs
                .queue_device_high
                .set((addrs.device_area >> 32) as u32);

            self.regs.queue_ready.set(0x0001);
        }

        // Call the hook pre "device-initialization" (setting DRIVER_OK).
        if let Err(err) = driver.pre_device_initialization() {
            self.regs.device_status.modify(DeviceStatus::Failed::SET);
            return Err(VirtIOInitializationError::DriverPreInitializationError(err));
        }

        // 8. Set the DRIVER_OK status bit
        self.regs.device_status.modify(DeviceStatus::DriverOk::SET);

        // The device is now "live"
        self.device_type.set(Some(device_type));

        Ok(device_type)
    }
}

/// Memory-backed stand-in for a virtio-mmio register block.
#[cfg(test)]
pub(crate) mod fake {
    use super::VirtIOMMIODeviceRegisters;
    use kernel::utilities::StaticRef;
    use std::boxed::Box;

    pub const MAGIC: usize = 0;
    pub const VERSION: usize = 1;
    pub const DEVICE_ID: usize = 2;
    pub const VENDOR_ID: usize = 3;
    pub const DEVICE_FEATURES: usize = 4;
    pub const DRIVER_FEATURES: usize = 8;
    pub const DRIVER_FEATURES_SEL: usize = 9;
    pub const QUEUE_SEL: usize = 12;
    pub const QUEUE_NUM_MAX: usize = 13;
    pub const QUEUE_NUM: usize = 14;
    pub const QUEUE_READY: usize = 17;
    pub const STATUS: usize = 28;
    pub const QUEUE_DESC_LOW: usize = 32;
    pub const QUEUE_DESC_HIGH: usize = 33;
    pub const QUEUE_DRIVER_LOW: usize = 36;
    pub const QUEUE_DEVICE_LOW: usize = 40;

    pub struct FakeMmioSlot {
        words: *mut u32,
    }

    impl FakeMmioSlot {
        /// An empty slot: correct magic and version, device ID 0.
        pub fn empty() -> FakeMmioSlot {
            let words = Box::leak(Box::new([0u32; 0x100 / 4])).as_mut_ptr();
            let slot = FakeMmioSlot { words };
            slot.write(MAGIC, 0x74726976);
            slot.write(VERSION, 2);
            slot.write(VENDOR_ID, 0x554d4551);
            slot
        }

        /// A QEMU virtio-input device offering VERSION_1 and `queue_num_max`
        /// descriptors on queue 0.
        ///
        /// The fake does not switch feature words on the selector, so
        /// `DEVICE_FEATURES` reads 1 for both halves (bit 0 and bit 32).
        pub fn input(queue_num_max: u32) -> FakeMmioSlot {
            let slot = FakeMmioSlot::empty();
            slot.write(DEVICE_ID, 18);
            slot.write(DEVICE_FEATURES, 1);
            slot.write(QUEUE_NUM_MAX, queue_num_max);
            slot
        }

        pub fn read(&self, word: usize) -> u32 {
            unsafe { self.words.add(word).read_volatile() }
        }

        pub fn write(&self, word: usize, value: u32) {
            unsafe { self.words.add(word).write_volatile(value) }
        }

        pub fn read_u64(&self, low_word: usize) -> u64 {
            self.read(low_word) as u64 | (self.read(low_word + 1) as u64) << 32
        }

        pub fn registers(&self) -> StaticRef<VirtIOMMIODeviceRegisters> {
            unsafe { StaticRef::new(self.words as *const VirtIOMMIODeviceRegisters) }
        }
    }
}
