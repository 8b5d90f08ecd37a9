// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! VirtIO input device driver.
//!
//! Only the event queue (queue 0) is used. All of its descriptors point at a
//! fixed set of event buffers owned by the driver, and every buffer the device
//! hands back is offered again as soon as its event has been copied out. The
//! status queue (LED state and the like) is not set up.

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::keyboard::{InputEvent, KeyEventSource};
use kernel::utilities::registers::interfaces::Readable;
use kernel::utilities::registers::InMemoryRegister;
use kernel::ErrorCode;

use super::super::devices::VirtIODeviceDriver;
use super::super::queues::split_queue::SplitVirtqueue;

/// Number of descriptors (and event buffers) of the event queue.
pub const EVENT_QUEUE_SIZE: usize = 8;

/// Size in bytes of a `virtio_input_event`.
const EVENT_SIZE: u32 = 8;

/// Buffer for a single `virtio_input_event`, written by the device.
#[repr(C)]
pub struct VirtIOInputEventBuffer {
    event_type: InMemoryRegister<u16>,
    code: InMemoryRegister<u16>,
    value: InMemoryRegister<u32>,
}

impl Default for VirtIOInputEventBuffer {
    fn default() -> Self {
        VirtIOInputEventBuffer {
            event_type: InMemoryRegister::new(0),
            code: InMemoryRegister::new(0),
            value: InMemoryRegister::new(0),
        }
    }
}

impl VirtIOInputEventBuffer {
    fn event(&self) -> InputEvent {
        InputEvent::new(self.event_type.get(), self.code.get(), self.value.get())
    }
}

pub type VirtIOInputEventBuffers = [VirtIOInputEventBuffer; EVENT_QUEUE_SIZE];

pub struct VirtIOInput<'a> {
    eventq: &'a SplitVirtqueue<'a, EVENT_QUEUE_SIZE>,
    events: &'a VirtIOInputEventBuffers,
}

impl<'a> VirtIOInput<'a> {
    pub fn new(
        eventq: &'a SplitVirtqueue<'a, EVENT_QUEUE_SIZE>,
        events: &'a VirtIOInputEventBuffers,
    ) -> VirtIOInput<'a> {
        VirtIOInput { eventq, events }
    }
}

impl VirtIODeviceDriver for VirtIOInput<'_> {
    fn negotiate_features(&self, _offered_features: u64) -> Option<u64> {
        // None of the input device features are needed
        Some(0)
    }

    fn pre_device_initialization(&self) -> Result<(), ErrorCode> {
        if self.eventq.queue_number() != Some(0) {
            return Err(ErrorCode::FAIL);
        }

        for (index, buffer) in self.events.iter().enumerate() {
            let addr = core::ptr::from_ref(buffer) as u64;
            self.eventq.set_descriptor(index, addr, EVENT_SIZE, true);
        }
        for index in 0..EVENT_QUEUE_SIZE {
            self.eventq.add_available_descriptor(index);
        }

        // Events are picked up by polling
        self.eventq.disable_used_interrupts();

        Ok(())
    }
}

impl KeyEventSource for VirtIOInput<'_> {
    fn poll_event(&self) -> Option<InputEvent> {
        loop {
            let (id, _len) = self.eventq.pop_used()?;

            let Some(buffer) = self.events.get(id) else {
                // Not a descriptor we ever offered, so there is nothing to
                // recycle either.
                debug!("virtio-input: device returned bad descriptor {}", id);
                continue;
            };

            // Copy the event out before the buffer goes back to the device
            let event = buffer.event();
            self.eventq.add_available_descriptor(id);

            if CONFIG.trace_input_events {
                debug!(
                    "virtio-input: type {} code {} value {}",
                    event.event_type, event.code, event.value
                );
            }

            if event.is_key() {
                return Some(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::VirtIODeviceType;
    use crate::queues::split_queue::{
        VirtqueueAvailableRing, VirtqueueDescriptors, VirtqueueUsedRing,
    };
    use crate::transports::mmio::fake::*;
    use crate::transports::mmio::VirtIOMMIODevice;
    use crate::transports::VirtIOTransport;
    use core::cell::Cell;
    use kernel::hil::keyboard::{EV_KEY, EV_REL, EV_SYN};
    use std::boxed::Box;
    use std::vec::Vec;

    /// Plays the device side of the event queue using only what the driver
    /// programmed into the transport registers.
    struct FakeInputDevice {
        slot: FakeMmioSlot,
        next_avail: Cell<u16>,
    }

    impl FakeInputDevice {
        fn desc_area(&self) -> usize {
            self.slot.read_u64(QUEUE_DESC_LOW) as usize
        }

        fn avail_area(&self) -> usize {
            self.slot.read_u64(QUEUE_DRIVER_LOW) as usize
        }

        fn used_area(&self) -> usize {
            self.slot.read_u64(QUEUE_DEVICE_LOW) as usize
        }

        fn descriptor(&self, id: usize) -> (u64, u32, u16) {
            let base = self.desc_area() + 16 * id;
            unsafe {
                (
                    (base as *const u64).read_volatile(),
                    ((base + 8) as *const u32).read_volatile(),
                    ((base + 12) as *const u16).read_volatile(),
                )
            }
        }

        fn avail_flags(&self) -> u16 {
            unsafe { (self.avail_area() as *const u16).read_volatile() }
        }

        fn avail_idx(&self) -> u16 {
            unsafe { ((self.avail_area() + 2) as *const u16).read_volatile() }
        }

        fn avail_ring(&self, pos: u16) -> u16 {
            let slot = self.avail_area() + 4 + 2 * (pos as usize % EVENT_QUEUE_SIZE);
            unsafe { (slot as *const u16).read_volatile() }
        }

        /// Fill the next available buffer with an event and return it through
        /// the used ring. Returns the descriptor id that was used.
        fn push(&self, event_type: u16, code: u16, value: u32) -> usize {
            let pos = self.next_avail.get();
            assert_ne!(pos, self.avail_idx(), "no buffer available");
            let id = self.avail_ring(pos) as usize;
            let (addr, len, flags) = self.descriptor(id);
            assert_eq!(len, 8);
            assert_eq!(flags & 2, 2);

            let used = self.used_area();
            unsafe {
                let buf = addr as usize;
                (buf as *mut u16).write_volatile(event_type);
                ((buf + 2) as *mut u16).write_volatile(code);
                ((buf + 4) as *mut u32).write_volatile(value);

                let used_idx = ((used + 2) as *const u16).read_volatile();
                let elem = used + 4 + 8 * (used_idx as usize % EVENT_QUEUE_SIZE);
                (elem as *mut u32).write_volatile(id as u32);
                ((elem + 4) as *mut u32).write_volatile(8);
                ((used + 2) as *mut u16).write_volatile(used_idx.wrapping_add(1));
            }

            self.next_avail.set(pos.wrapping_add(1));
            id
        }
    }

    fn live_input() -> (&'static VirtIOInput<'static>, FakeInputDevice) {
        let descriptors = Box::leak(Box::new(VirtqueueDescriptors::default()));
        let available = Box::leak(Box::new(VirtqueueAvailableRing::default()));
        let used = Box::leak(Box::new(VirtqueueUsedRing::default()));
        let queue: &'static SplitVirtqueue<'static, EVENT_QUEUE_SIZE> =
            Box::leak(Box::new(SplitVirtqueue::new(descriptors, available, used)));
        let events: &'static VirtIOInputEventBuffers =
            Box::leak(Box::new(core::array::from_fn(|_| Default::default())));
        let input: &'static VirtIOInput = Box::leak(Box::new(VirtIOInput::new(queue, events)));

        let slot = FakeMmioSlot::input(EVENT_QUEUE_SIZE as u32);
        let transport = VirtIOMMIODevice::new(slot.registers());
        assert_eq!(
            transport.initialize(input, &[queue]),
            Ok(VirtIODeviceType::InputDevice)
        );

        (
            input,
            FakeInputDevice {
                slot,
                next_avail: Cell::new(0),
            },
        )
    }

    #[test]
    fn initialization_offers_every_buffer() {
        let (_input, device) = live_input();

        assert_eq!(device.avail_idx(), 8);
        assert_eq!(device.avail_flags(), 1);
        // Device-specific feature bits are all declined.
        assert_eq!(device.slot.read(DRIVER_FEATURES), 0);

        let mut addrs = Vec::new();
        for id in 0..EVENT_QUEUE_SIZE {
            assert_eq!(device.avail_ring(id as u16), id as u16);
            let (addr, len, flags) = device.descriptor(id);
            assert_eq!(len, 8);
            assert_eq!(flags, 2);
            assert!(!addrs.contains(&addr));
            addrs.push(addr);
        }
    }

    #[test]
    fn every_buffer_is_decoded_and_recycled() {
        let (input, device) = live_input();

        for k in 0..EVENT_QUEUE_SIZE {
            let id = device.push(EV_KEY, 0x10 + k as u16, 1);
            assert_eq!(id, k);

            assert_eq!(
                input.poll_event(),
                Some(InputEvent::new(EV_KEY, 0x10 + k as u16, 1))
            );
            let avail_idx = device.avail_idx();
            assert_eq!(avail_idx, 9 + k as u16);
            assert_eq!(device.avail_ring(avail_idx - 1), id as u16);
        }

        assert_eq!(input.poll_event(), None);
    }

    #[test]
    fn buffers_keep_cycling_past_the_ring_size() {
        let (input, device) = live_input();

        for round in 0..3 * EVENT_QUEUE_SIZE as u32 {
            device.push(EV_KEY, 0x39, round % 2);
            assert_eq!(
                input.poll_event(),
                Some(InputEvent::new(EV_KEY, 0x39, round % 2))
            );
        }
        assert_eq!(device.avail_idx(), 8 + 3 * EVENT_QUEUE_SIZE as u16);
    }

    #[test]
    fn non_key_events_are_consumed_and_skipped() {
        let (input, device) = live_input();

        device.push(EV_REL, 0, 5);
        device.push(EV_SYN, 0, 0);
        device.push(EV_KEY, 0x1e, 0);

        assert_eq!(input.poll_event(), Some(InputEvent::new(EV_KEY, 0x1e, 0)));
        assert_eq!(device.avail_idx(), 11);
        assert_eq!(input.poll_event(), None);
    }

    #[test]
    fn nothing_pending_returns_none() {
        let (input, device) = live_input();
        assert_eq!(input.poll_event(), None);
        assert_eq!(device.avail_idx(), 8);
    }
}
