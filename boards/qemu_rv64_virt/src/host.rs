// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! The platform callbacks doomgeneric links against, and the game loop.
//!
//! The engine calls back through plain C symbols without a context pointer,
//! so the board's [`Runtime`] is published in a single static slot before
//! the engine starts.

#![allow(non_snake_case, non_upper_case_globals)]

use core::cell::Cell;
use core::ffi::{c_char, c_int, c_uchar, CStr};

use kernel::debug;
use kernel::hil::keyboard::KeyInput;
use kernel::platform::power::PowerControl;
use qemu_rv64_virt_chip::ramfb::FRAME_PIXELS;

use crate::Runtime;

extern "C" {
    /// The engine's 640x400 XRGB8888 frame, allocated by `doomgeneric_Create`.
    static DG_ScreenBuffer: *mut u32;

    fn doomgeneric_Create(argc: c_int, argv: *mut *mut c_char);
    fn doomgeneric_Tick();
}

struct RuntimeSlot(Cell<Option<&'static Runtime>>);

// SAFETY: single hart, and the timer trap handler never touches the slot.
unsafe impl Sync for RuntimeSlot {}

static RUNTIME: RuntimeSlot = RuntimeSlot(Cell::new(None));

fn runtime() -> Option<&'static Runtime> {
    RUNTIME.0.get()
}

/// Start the engine and run its game loop forever.
pub fn run(runtime: &'static Runtime) -> ! {
    RUNTIME.0.set(Some(runtime));

    // The engine keeps the argument vector, which lives as long as this
    // never-returning frame.
    let mut program = *b"doomgeneric\0";
    let mut argv = [program.as_mut_ptr().cast::<c_char>(), core::ptr::null_mut()];

    debug!("main: starting doomgeneric");
    unsafe {
        doomgeneric_Create(1, argv.as_mut_ptr());
    }
    loop {
        unsafe {
            doomgeneric_Tick();
        }
    }
}

#[no_mangle]
pub extern "C" fn DG_Init() {
    let Some(runtime) = runtime() else {
        return;
    };
    let peripherals = runtime.peripherals;

    if !peripherals.fw_cfg.signature_present() {
        debug!("DG_Init: fw_cfg signature missing");
    }
    match peripherals.fw_cfg.check_dma() {
        Ok(()) => debug!("DG_Init: fw_cfg DMA interface enabled"),
        Err(err) => {
            debug!("DG_Init: {}, powering off", err);
            peripherals.syscon.poweroff();
        }
    }

    match runtime.ramfb.setup(&peripherals.fw_cfg) {
        Ok(()) => debug!("DG_Init: ramfb at {:#x}", runtime.ramfb.config().addr),
        Err(err) => debug!("DG_Init: ramfb setup failed: {}", err),
    }
}

#[no_mangle]
pub extern "C" fn DG_DrawFrame() {
    let Some(runtime) = runtime() else {
        return;
    };
    let screen = unsafe { DG_ScreenBuffer };
    if screen.is_null() {
        return;
    }
    let frame = unsafe { core::slice::from_raw_parts(screen.cast_const(), FRAME_PIXELS) };
    runtime.ramfb.draw(frame);
}

#[no_mangle]
pub extern "C" fn DG_SleepMs(ms: u32) {
    if let Some(runtime) = runtime() {
        runtime.timer.sleep(ms.saturating_mul(1000));
    }
}

#[no_mangle]
pub extern "C" fn DG_GetTicksMs() -> u32 {
    runtime().map_or(0, |runtime| runtime.timer.ticks_ms())
}

/// Report at most one key transition. Returns 1 and fills both out
/// parameters when there was one, 0 otherwise.
#[no_mangle]
pub unsafe extern "C" fn DG_GetKey(pressed: *mut c_int, key: *mut c_uchar) -> c_int {
    if pressed.is_null() || key.is_null() {
        return 0;
    }
    let Some(runtime) = runtime() else {
        return 0;
    };

    match runtime.keyboard.poll_key() {
        Some(transition) => {
            *pressed = c_int::from(transition.pressed);
            *key = transition.key;
            1
        }
        None => 0,
    }
}

#[no_mangle]
pub unsafe extern "C" fn DG_SetWindowTitle(title: *const c_char) {
    if title.is_null() {
        return;
    }
    match CStr::from_ptr(title).to_str() {
        Ok(title) => debug!("DG_SetWindowTitle: {}", title),
        Err(_) => debug!("DG_SetWindowTitle: <not UTF-8>"),
    }
}
