// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! QEMU `ramfb` display: a framebuffer in guest RAM, announced to QEMU once
//! through the `etc/ramfb` fw_cfg file.

use core::cell::Cell;

use crate::fw_cfg::{FwCfg, FwCfgError};

pub const RAMFB_FILE: &str = "etc/ramfb";

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 400;
pub const BYTES_PER_PIXEL: u32 = 4;
pub const FRAME_PIXELS: usize = (FRAME_WIDTH * FRAME_HEIGHT) as usize;

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// DRM fourcc of 32 bit pixels laid out as `0x00RRGGBB`.
pub const DRM_FORMAT_XRGB8888: u32 = fourcc(b"XR24");

/// Size of the encoded `RAMFBCfg` structure.
pub const RAMFB_CONFIG_SIZE: usize = 28;

/// Contents of the `etc/ramfb` file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RamfbConfig {
    pub addr: u64,
    pub fourcc: u32,
    pub flags: u32,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl RamfbConfig {
    pub fn xrgb8888(addr: u64, width: u32, height: u32) -> RamfbConfig {
        RamfbConfig {
            addr,
            fourcc: DRM_FORMAT_XRGB8888,
            flags: 0,
            width,
            height,
            stride: width * BYTES_PER_PIXEL,
        }
    }

    /// The packed, big endian wire encoding.
    pub fn to_be_bytes(&self) -> [u8; RAMFB_CONFIG_SIZE] {
        let mut bytes = [0u8; RAMFB_CONFIG_SIZE];
        bytes[0..8].copy_from_slice(&self.addr.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.fourcc.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.flags.to_be_bytes());
        bytes[16..20].copy_from_slice(&self.width.to_be_bytes());
        bytes[20..24].copy_from_slice(&self.height.to_be_bytes());
        bytes[24..28].copy_from_slice(&self.stride.to_be_bytes());
        bytes
    }
}

/// A 640x400 XRGB8888 framebuffer scanned out by QEMU.
pub struct Ramfb<'a> {
    framebuffer: &'a [Cell<u32>],
}

impl<'a> Ramfb<'a> {
    pub fn new(framebuffer: &'a mut [u32; FRAME_PIXELS]) -> Ramfb<'a> {
        let framebuffer: &'a mut [u32] = framebuffer;
        Ramfb {
            framebuffer: Cell::from_mut(framebuffer).as_slice_of_cells(),
        }
    }

    pub fn config(&self) -> RamfbConfig {
        RamfbConfig::xrgb8888(
            self.framebuffer.as_ptr() as u64,
            FRAME_WIDTH,
            FRAME_HEIGHT,
        )
    }

    /// Hand the framebuffer to QEMU.
    pub fn setup(&self, fw_cfg: &FwCfg) -> Result<(), FwCfgError> {
        let file = fw_cfg.find_file(RAMFB_FILE)?;
        if file.size != RAMFB_CONFIG_SIZE as u32 {
            return Err(FwCfgError::FileSize {
                expected: RAMFB_CONFIG_SIZE as u32,
                found: file.size,
            });
        }

        let config = self.config().to_be_bytes();
        fw_cfg.dma_write(file.select, &config)
    }

    /// Copy a frame into the framebuffer. Pixels beyond the end of either
    /// buffer are left alone.
    pub fn draw(&self, frame: &[u32]) {
        for (dst, src) in self.framebuffer.iter().zip(frame) {
            dst.set(*src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::boxed::Box;
    use std::vec::Vec;

    #[test]
    fn xr24_fourcc() {
        assert_eq!(DRM_FORMAT_XRGB8888, 0x3432_5258);
    }

    #[test]
    fn config_encoding_is_packed_big_endian() {
        let config = RamfbConfig::xrgb8888(0x8020_0000, 640, 400);
        let bytes = config.to_be_bytes();
        assert_eq!(&bytes[0..8], &[0, 0, 0, 0, 0x80, 0x20, 0, 0]);
        assert_eq!(&bytes[8..12], b"42RX");
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &640u32.to_be_bytes());
        assert_eq!(&bytes[20..24], &400u32.to_be_bytes());
        assert_eq!(&bytes[24..28], &2560u32.to_be_bytes());
    }

    #[test]
    fn draw_copies_the_frame() {
        let buffer: Box<[u32; FRAME_PIXELS]> =
            vec![0u32; FRAME_PIXELS].into_boxed_slice().try_into().unwrap();
        let buffer = Box::leak(buffer);
        let address = buffer.as_ptr() as u64;
        let ramfb = Ramfb::new(buffer);
        assert_eq!(ramfb.config().addr, address);

        let frame: Vec<u32> = (0..FRAME_PIXELS as u32).collect();
        ramfb.draw(&frame);
        assert_eq!(ramfb.framebuffer[0].get(), 0);
        assert_eq!(ramfb.framebuffer[FRAME_PIXELS - 1].get(), FRAME_PIXELS as u32 - 1);

        ramfb.draw(&[7, 7]);
        assert_eq!(ramfb.framebuffer[1].get(), 7);
        assert_eq!(ramfb.framebuffer[2].get(), 2);
    }
}
