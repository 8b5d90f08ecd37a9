// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Board file for doomgeneric on the qemu-system-riscv64 "virt" machine.
//!
//! Brings up the console, the timer trap, the chosen keyboard and the ramfb
//! display, then hands the hart to the engine's game loop.

#![no_std]
#![no_main]

use core::fmt;
use core::ptr::addr_of_mut;

use capsules_core::keyboard::{
    EventKeyTranslator, InputSource, KeyEventTranslator, SerialKeyTranslator,
};
use capsules_core::timer_service::TimerService;
use kernel::platform::power::PowerControl;
use kernel::{debug, static_init};
use qemu_rv64_virt_chip::chip::QemuRv64VirtDefaultPeripherals;
use qemu_rv64_virt_chip::clint::QemuRv64VirtClint;
use qemu_rv64_virt_chip::ramfb::{Ramfb, FRAME_PIXELS};
use qemu_rv64_virt_chip::syscon::Syscon;
use qemu_rv64_virt_chip::uart::Uart16550;
use riscv::trap::MachineTrap;
use virtio::devices::virtio_input::{VirtIOInput, VirtIOInputEventBuffers, EVENT_QUEUE_SIZE};
use virtio::queues::split_queue::{
    SplitVirtqueue, VirtqueueAvailableRing, VirtqueueDescriptors, VirtqueueUsedRing,
};
use virtio::queues::Virtqueue;
use virtio::transports::{VirtIOInitializationError, VirtIOTransport};

mod host;
mod io;

/// Where key presses are read from. A virtio keyboard that cannot be set up
/// is fatal; there is no fallback to the serial console.
const INPUT_SOURCE: InputSource = InputSource::VirtIO;

pub type Timer = TimerService<'static, QemuRv64VirtClint, MachineTrap>;
pub type Keyboard =
    KeyEventTranslator<'static, Uart16550, QemuRv64VirtClint, VirtIOInput<'static>>;

/// Framebuffer scanned out by QEMU. Kept out of the stack and the heap.
static mut FRAMEBUFFER: [u32; FRAME_PIXELS] = [0; FRAME_PIXELS];

/// Everything the engine callbacks need.
pub struct Runtime {
    pub peripherals: &'static QemuRv64VirtDefaultPeripherals,
    pub timer: &'static Timer,
    pub keyboard: &'static Keyboard,
    pub ramfb: &'static Ramfb<'static>,
}

/// Log `err` and power the machine off.
fn fatal(syscon: &Syscon, what: &str, err: &dyn fmt::Display) -> ! {
    debug!("{}: {}", what, err);
    syscon.poweroff()
}

/// Discover the virtio keyboard and bring it up with its event queue.
unsafe fn setup_virtio_input(
    peripherals: &'static QemuRv64VirtDefaultPeripherals,
) -> Result<&'static VirtIOInput<'static>, VirtIOInitializationError> {
    let device = peripherals.virtio_input_device()?;
    device.report();

    let descriptors = static_init!(
        VirtqueueDescriptors<EVENT_QUEUE_SIZE>,
        VirtqueueDescriptors::default(),
    );
    let available_ring = static_init!(
        VirtqueueAvailableRing<EVENT_QUEUE_SIZE>,
        VirtqueueAvailableRing::default(),
    );
    let used_ring = static_init!(
        VirtqueueUsedRing<EVENT_QUEUE_SIZE>,
        VirtqueueUsedRing::default(),
    );
    let eventq: &'static SplitVirtqueue<'static, EVENT_QUEUE_SIZE> = static_init!(
        SplitVirtqueue<'static, EVENT_QUEUE_SIZE>,
        SplitVirtqueue::new(descriptors, available_ring, used_ring),
    );

    let events = static_init!(VirtIOInputEventBuffers, Default::default());
    let input: &'static VirtIOInput<'static> = static_init!(
        VirtIOInput<'static>,
        VirtIOInput::new(eventq, events),
    );

    device.initialize(input, &[eventq as &dyn Virtqueue])?;
    Ok(input)
}

/// Entry point, jumped to by `_start` once the stack is set up.
#[no_mangle]
pub unsafe extern "C" fn reset_handler() -> ! {
    riscv::init_memory();

    let peripherals: &'static QemuRv64VirtDefaultPeripherals = static_init!(
        QemuRv64VirtDefaultPeripherals,
        QemuRv64VirtDefaultPeripherals::new(),
    );
    peripherals.init();
    kernel::debug::set_debug_writer(&peripherals.uart0);
    debug!("qemu_rv64_virt: booting");

    let timer = static_init!(
        Timer,
        TimerService::new(&peripherals.clint, &peripherals.trap),
    );
    if let Err(err) = timer.install_interrupt_vector() {
        fatal(&peripherals.syscon, "timer", &err);
    }

    let keyboard: &'static Keyboard = match INPUT_SOURCE {
        InputSource::VirtIO => {
            let input = match setup_virtio_input(peripherals) {
                Ok(input) => input,
                Err(err) => fatal(&peripherals.syscon, "virtio-input", &err),
            };
            static_init!(
                Keyboard,
                KeyEventTranslator::Event(EventKeyTranslator::new(input)),
            )
        }
        InputSource::Serial => static_init!(
            Keyboard,
            KeyEventTranslator::Serial(SerialKeyTranslator::new(
                &peripherals.uart0,
                &peripherals.clint,
            )),
        ),
    };
    debug!("keyboard: {:?}", keyboard.source());

    let ramfb = static_init!(
        Ramfb<'static>,
        Ramfb::new(&mut *addr_of_mut!(FRAMEBUFFER)),
    );

    let runtime = static_init!(
        Runtime,
        Runtime {
            peripherals,
            timer,
            keyboard,
            ramfb,
        },
    );

    host::run(runtime)
}
