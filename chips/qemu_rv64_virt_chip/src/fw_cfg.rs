// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! QEMU firmware configuration (fw_cfg) device, MMIO variant.
//!
//! Items are read byte-wise through the data register after writing their
//! selector. Writes to an item (needed for `etc/ramfb`) are only possible
//! through the DMA interface. The selector and DMA address registers are big
//! endian, as are all fields of a DMA access descriptor.

use core::fmt;

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, InMemoryRegister, LocalRegisterCopy, ReadOnly,
    ReadWrite, WriteOnly,
};
use kernel::utilities::StaticRef;

pub const FW_CFG_BASE: StaticRef<FwCfgRegisters> =
    unsafe { StaticRef::new(0x1010_0000 as *const FwCfgRegisters) };

/// Item holding the "QEMU" signature.
pub const FW_CFG_SIGNATURE: u16 = 0x0000;
/// Item holding the interface feature bitmap.
pub const FW_CFG_ID: u16 = 0x0001;
/// Item holding the file directory.
pub const FW_CFG_FILE_DIR: u16 = 0x0019;

/// Bit of the `FW_CFG_ID` item set when the DMA interface is available.
const FW_CFG_VERSION_DMA: u32 = 1 << 1;

/// What the DMA address register reads as: "QEMU CFG".
const FW_CFG_DMA_SIGNATURE: u64 = 0x5145_4d55_2043_4647;

/// Length of the NUL padded name of a file directory entry.
const FW_CFG_MAX_FILE_PATH: usize = 56;

register_structs! {
    pub FwCfgRegisters {
        (0x00 => data: ReadOnly<u8>),
        (0x01 => _reserved0),
        (0x08 => selector: WriteOnly<u16>),
        (0x0A => _reserved1),
        (0x10 => dma_address: ReadWrite<u64>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    DmaControl [
        Error OFFSET(0) NUMBITS(1) [],
        Read OFFSET(1) NUMBITS(1) [],
        Skip OFFSET(2) NUMBITS(1) [],
        Select OFFSET(3) NUMBITS(1) [],
        Write OFFSET(4) NUMBITS(1) [],
        Selector OFFSET(16) NUMBITS(16) []
    ]
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FwCfgError {
    /// The feature bitmap does not advertise the DMA interface.
    NoDmaInterface,
    /// The DMA address register did not read back the DMA signature.
    BadDmaSignature,
    /// No file of the requested name is in the file directory.
    FileNotFound,
    /// The file exists but has an unexpected size.
    FileSize { expected: u32, found: u32 },
    /// The device flagged an error for a DMA transfer.
    DmaFailed,
}

impl fmt::Display for FwCfgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FwCfgError::NoDmaInterface => write!(f, "fw_cfg DMA interface not enabled"),
            FwCfgError::BadDmaSignature => write!(f, "fw_cfg DMA signature mismatch"),
            FwCfgError::FileNotFound => write!(f, "fw_cfg file not found"),
            FwCfgError::FileSize { expected, found } => {
                write!(f, "fw_cfg file has {} bytes, expected {}", found, expected)
            }
            FwCfgError::DmaFailed => write!(f, "fw_cfg DMA transfer failed"),
        }
    }
}

/// An entry of the fw_cfg file directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FwCfgFile {
    pub size: u32,
    pub select: u16,
}

/// A DMA access descriptor, as read by the device.
///
/// All fields are stored big endian. The device clears `control` once the
/// transfer is done, or leaves only the error bit set.
#[repr(C, align(8))]
pub struct FwCfgDmaAccess {
    control: InMemoryRegister<u32>,
    length: InMemoryRegister<u32>,
    address: InMemoryRegister<u64>,
}

impl FwCfgDmaAccess {
    /// Descriptor that selects item `selector` and writes `length` bytes
    /// starting at `address` into it.
    pub fn write(selector: u16, address: u64, length: u32) -> FwCfgDmaAccess {
        let mut control = LocalRegisterCopy::<u32, DmaControl::Register>::new(0);
        control.modify(
            DmaControl::Selector.val(selector as u32)
                + DmaControl::Select::SET
                + DmaControl::Write::SET,
        );

        FwCfgDmaAccess {
            control: InMemoryRegister::new(control.get().to_be()),
            length: InMemoryRegister::new(length.to_be()),
            address: InMemoryRegister::new(address.to_be()),
        }
    }

    fn control(&self) -> LocalRegisterCopy<u32, DmaControl::Register> {
        LocalRegisterCopy::new(u32::from_be(self.control.get()))
    }
}

fn file_name_matches(entry: &[u8; FW_CFG_MAX_FILE_PATH], name: &str) -> bool {
    let len = entry
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(FW_CFG_MAX_FILE_PATH);
    &entry[..len] == name.as_bytes()
}

pub struct FwCfg {
    regs: StaticRef<FwCfgRegisters>,
}

impl FwCfg {
    pub const fn new(regs: StaticRef<FwCfgRegisters>) -> FwCfg {
        FwCfg { regs }
    }

    fn select(&self, item: u16) {
        self.regs.selector.set(item.to_be());
    }

    fn read_bytes<const N: usize>(&self) -> [u8; N] {
        core::array::from_fn(|_| self.regs.data.get())
    }

    /// The interface feature bitmap.
    pub fn features(&self) -> u32 {
        self.select(FW_CFG_ID);
        u32::from_le_bytes(self.read_bytes())
    }

    /// Whether the item at `FW_CFG_SIGNATURE` reads "QEMU".
    pub fn signature_present(&self) -> bool {
        self.select(FW_CFG_SIGNATURE);
        self.read_bytes::<4>() == *b"QEMU"
    }

    /// Check that the DMA interface is usable.
    pub fn check_dma(&self) -> Result<(), FwCfgError> {
        if self.features() & FW_CFG_VERSION_DMA == 0 {
            return Err(FwCfgError::NoDmaInterface);
        }
        if u64::from_be(self.regs.dma_address.get()) != FW_CFG_DMA_SIGNATURE {
            return Err(FwCfgError::BadDmaSignature);
        }
        Ok(())
    }

    /// Look up `name` in the file directory.
    pub fn find_file(&self, name: &str) -> Result<FwCfgFile, FwCfgError> {
        self.select(FW_CFG_FILE_DIR);
        let count = u32::from_be_bytes(self.read_bytes());

        for _ in 0..count {
            let size = u32::from_be_bytes(self.read_bytes());
            let select = u16::from_be_bytes(self.read_bytes());
            let _reserved: [u8; 2] = self.read_bytes();
            let entry_name: [u8; FW_CFG_MAX_FILE_PATH] = self.read_bytes();

            if file_name_matches(&entry_name, name) {
                return Ok(FwCfgFile { size, select });
            }
        }

        Err(FwCfgError::FileNotFound)
    }

    /// Run a DMA transfer and spin until the device completes it.
    pub fn dma_transfer(&self, access: &FwCfgDmaAccess) -> Result<(), FwCfgError> {
        let address = core::ptr::from_ref(access) as u64;
        self.regs.dma_address.set(address.to_be());

        loop {
            let control = access.control();
            if control.is_set(DmaControl::Error) {
                return Err(FwCfgError::DmaFailed);
            }
            if control.get() == 0 {
                return Ok(());
            }
            core::hint::spin_loop();
        }
    }

    /// Write `buf` to item `selector` through DMA.
    pub fn dma_write(&self, selector: u16, buf: &[u8]) -> Result<(), FwCfgError> {
        let access = FwCfgDmaAccess::write(selector, buf.as_ptr() as u64, buf.len() as u32);
        self.dma_transfer(&access)
    }
}
