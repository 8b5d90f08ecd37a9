// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! VirtIO Split Virtqueue implementation.
//!
//! This module contains an implementation of a Split Virtqueue, as defined in
//! 2.7 Split Virtqueues of the [Virtual I/O Device (VIRTIO) Specification,
//! Version 1.3](https://docs.oasis-open.org/virtio/virtio/v1.3/virtio-v1.3.html).
//!
//! The queue is used in a fixed, polled configuration: every descriptor points
//! at a buffer owned by the device driver for the lifetime of the system, all
//! descriptors are offered to the device at initialization, and a buffer
//! returned through the used ring is offered again right away. There is no
//! descriptor chaining and no interrupt-driven completion.

use core::cell::Cell;

use kernel::debug;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, InMemoryRegister};

use super::{Virtqueue, VirtqueueAddresses};

pub const DESCRIPTOR_ALIGNMENT: usize = 16;
pub const AVAILABLE_RING_ALIGNMENT: usize = 2;
pub const USED_RING_ALIGNMENT: usize = 4;

register_bitfields![u16,
    DescriptorFlags [
        Next OFFSET(0) NUMBITS(1) [],
        WriteOnly OFFSET(1) NUMBITS(1) [],
        Indirect OFFSET(2) NUMBITS(1) []
    ],
    AvailableRingFlags [
        NoInterrupt OFFSET(0) NUMBITS(1) []
    ],
    UsedRingFlags [
        NoNotify OFFSET(0) NUMBITS(1) []
    ],
];

/// A single Virtqueue descriptor.
///
/// Implements the memory layout of a single Virtqueue descriptor of a
/// split-virtqueue, to be placed into the queue's descriptor table.
#[repr(C)]
pub struct VirtqueueDescriptor {
    /// Guest physical address of the buffer to share
    addr: InMemoryRegister<u64>,
    /// Length of the shared buffer
    len: InMemoryRegister<u32>,
    /// Descriptor flags
    flags: InMemoryRegister<u16, DescriptorFlags::Register>,
    /// Pointer to the next entry in the descriptor queue (if two
    /// buffers are chained)
    next: InMemoryRegister<u16>,
}

impl Default for VirtqueueDescriptor {
    fn default() -> VirtqueueDescriptor {
        VirtqueueDescriptor {
            addr: InMemoryRegister::new(0),
            len: InMemoryRegister::new(0),
            flags: InMemoryRegister::new(0),
            next: InMemoryRegister::new(0),
        }
    }
}

/// The Virtqueue descriptor table.
///
/// This table is provided to the VirtIO device (host) as a means to communicate
/// information about shared buffers, maintained in the individual
/// [`VirtqueueDescriptor`] elements. Elements in this table are referenced by
/// the [`VirtqueueAvailableRing`] and [`VirtqueueUsedRing`] for exposing them
/// to the VirtIO device in order, and receiving exposed ("used") buffers back
/// from the device.
#[repr(C, align(16))]
pub struct VirtqueueDescriptors<const MAX_QUEUE_SIZE: usize>([VirtqueueDescriptor; MAX_QUEUE_SIZE]);

impl<const MAX_QUEUE_SIZE: usize> Default for VirtqueueDescriptors<MAX_QUEUE_SIZE> {
    fn default() -> Self {
        VirtqueueDescriptors(core::array::from_fn(|_| VirtqueueDescriptor::default()))
    }
}

// This is required to be able to implement Default and hence to
// initialize an entire array of default values with size specified by
// a constant.
#[repr(transparent)]
pub struct VirtqueueAvailableElement(InMemoryRegister<u16>);

impl Default for VirtqueueAvailableElement {
    fn default() -> VirtqueueAvailableElement {
        VirtqueueAvailableElement(InMemoryRegister::new(0))
    }
}

/// The Virtqueue available ring.
///
/// The driver places descriptor indices into `ring` and then increments `idx`
/// to the position where it would place the next one. Given that volatile
/// writes cannot be reordered with respect to each other, the slot write is
/// visible to the device before the index update.
///
/// The optional `used_event` field is not part of the layout since
/// `VIRTIO_F_EVENT_IDX` is never negotiated.
#[repr(C, align(2))]
pub struct VirtqueueAvailableRing<const MAX_QUEUE_SIZE: usize> {
    /// Virtqueue available ring flags.
    flags: InMemoryRegister<u16, AvailableRingFlags::Register>,
    /// Incrementing index, pointing to where the driver would put the next
    /// descriptor entry in the ring (modulo the queue size).
    ///
    /// The driver must not decrement this field. There is no way to "unexpose"
    /// buffers.
    idx: InMemoryRegister<u16>,
    /// Ring containing the shared buffers (indices into the
    /// [`VirtqueueDescriptors`] descriptor table).
    ring: [VirtqueueAvailableElement; MAX_QUEUE_SIZE],
}

impl<const MAX_QUEUE_SIZE: usize> Default for VirtqueueAvailableRing<MAX_QUEUE_SIZE> {
    fn default() -> Self {
        VirtqueueAvailableRing {
            flags: InMemoryRegister::new(0),
            idx: InMemoryRegister::new(0),
            ring: core::array::from_fn(|_| VirtqueueAvailableElement::default()),
        }
    }
}

/// The Virtqueue used ring.
///
/// Written only by the device. The driver reads an entry only after the
/// device has moved `idx` past it.
#[repr(C, align(4))]
pub struct VirtqueueUsedRing<const MAX_QUEUE_SIZE: usize> {
    /// Virtqueue used ring flags.
    flags: InMemoryRegister<u16, UsedRingFlags::Register>,
    /// Incrementing index, pointing to where the device would put the next
    /// descriptor entry in the ring (modulo the queue size).
    idx: InMemoryRegister<u16>,
    /// Ring containing the used buffers (indices into the
    /// [`VirtqueueDescriptors`] descriptor table).
    ring: [VirtqueueUsedElement; MAX_QUEUE_SIZE],
}

impl<const MAX_QUEUE_SIZE: usize> Default for VirtqueueUsedRing<MAX_QUEUE_SIZE> {
    fn default() -> Self {
        VirtqueueUsedRing {
            flags: InMemoryRegister::new(0),
            idx: InMemoryRegister::new(0),
            ring: core::array::from_fn(|_| VirtqueueUsedElement::default()),
        }
    }
}

/// A single element of the [`VirtqueueUsedRing`].
#[repr(C)]
pub struct VirtqueueUsedElement {
    /// Index into the [`VirtqueueDescriptors`] descriptor table indicating the
    /// head element of the returned descriptor chain.
    id: InMemoryRegister<u32>,
    /// Number of bytes the device wrote into the buffer.
    len: InMemoryRegister<u32>,
}

impl Default for VirtqueueUsedElement {
    fn default() -> VirtqueueUsedElement {
        VirtqueueUsedElement {
            id: InMemoryRegister::new(0),
            len: InMemoryRegister::new(0),
        }
    }
}

/// A VirtIO split Virtqueue.
///
/// A split Virtqueue is split into separate memory areas, namely:
///
/// - a **descriptor table** (VirtIO driver / guest writeable,
///   [`VirtqueueDescriptors`])
///
/// - an **available ring** (VirtIO driver / guest writeable,
///   [`VirtqueueAvailableRing`])
///
/// - a **used ring** (VirtIO device / host writeable, [`VirtqueueUsedRing`])
///
/// Each of these areas must be located physically-contiguous in guest-memory
/// and have different alignment constraints.
pub struct SplitVirtqueue<'a, const MAX_QUEUE_SIZE: usize> {
    descriptors: &'a mut VirtqueueDescriptors<MAX_QUEUE_SIZE>,
    available_ring: &'a mut VirtqueueAvailableRing<MAX_QUEUE_SIZE>,
    used_ring: &'a mut VirtqueueUsedRing<MAX_QUEUE_SIZE>,

    /// Number of used ring entries consumed so far, modulo 2^16.
    last_used_idx: Cell<u16>,

    initialized: Cell<bool>,
    queue_number: Cell<u32>,
}

impl<'a, const MAX_QUEUE_SIZE: usize> SplitVirtqueue<'a, MAX_QUEUE_SIZE> {
    pub fn new(
        descriptors: &'a mut VirtqueueDescriptors<MAX_QUEUE_SIZE>,
        available_ring: &'a mut VirtqueueAvailableRing<MAX_QUEUE_SIZE>,
        used_ring: &'a mut VirtqueueUsedRing<MAX_QUEUE_SIZE>,
    ) -> Self {
        assert!(core::ptr::from_ref(descriptors) as usize % DESCRIPTOR_ALIGNMENT == 0);
        assert!(core::ptr::from_ref(available_ring) as usize % AVAILABLE_RING_ALIGNMENT == 0);
        assert!(core::ptr::from_ref(used_ring) as usize % USED_RING_ALIGNMENT == 0);

        SplitVirtqueue {
            descriptors,
            available_ring,
            used_ring,

            last_used_idx: Cell::new(0),

            initialized: Cell::new(false),
            queue_number: Cell::new(0),
        }
    }

    /// Get the queue number associated with this Virtqueue.
    ///
    /// Prior to initialization the SplitVirtqueue does not have an associated
    /// queue number and will return `None`.
    pub fn queue_number(&self) -> Option<u32> {
        if self.initialized.get() {
            Some(self.queue_number.get())
        } else {
            None
        }
    }

    /// Point descriptor `index` at a buffer of `len` bytes at `addr`.
    ///
    /// The descriptor is not offered to the device until it is added to the
    /// available ring.
    pub fn set_descriptor(&self, index: usize, addr: u64, len: u32, device_writeable: bool) {
        let desc = &self.descriptors.0[index];
        desc.addr.set(addr);
        desc.len.set(len);
        desc.flags.write(if device_writeable {
            DescriptorFlags::WriteOnly::SET
        } else {
            DescriptorFlags::WriteOnly::CLEAR
        });
        desc.next.set(0);
    }

    /// Ask the device not to interrupt when it returns buffers.
    ///
    /// The flag is only a hint, so the driver must still be prepared for
    /// interrupts. The runtime never unmasks the device interrupt anyway.
    pub fn disable_used_interrupts(&self) {
        self.available_ring
            .flags
            .modify(AvailableRingFlags::NoInterrupt::SET);
    }

    /// Offer descriptor `descriptor_index` to the device.
    ///
    /// The index is written to `ring[idx % MAX_QUEUE_SIZE]` and `idx` is then
    /// incremented (wrapping at 2^16).
    pub fn add_available_descriptor(&self, descriptor_index: usize) {
        let idx = self.available_ring.idx.get();
        let ring_pos = idx as usize % MAX_QUEUE_SIZE;
        self.available_ring.ring[ring_pos]
            .0
            .set(descriptor_index as u16);

        // TODO: Issue a fence here once VIRTIO_F_ORDER_PLATFORM is
        // negotiated. Without it, a device that requires real memory barriers
        // (one not implemented in software, like QEMU's) may observe the index
        // update before the ring slot. Volatile accesses keep the compiler from
        // reordering the two writes.
        self.available_ring.idx.set(idx.wrapping_add(1));
    }

    /// The driver's available ring production index.
    pub fn available_index(&self) -> u16 {
        self.available_ring.idx.get()
    }

    /// Get the number of (unprocessed) descriptor chains in the Virtqueue's
    /// used ring.
    ///
    /// A device that returned more buffers than the ring holds has overwritten
    /// entries. That backlog is dropped and 0 is returned.
    pub fn used_descriptor_chains_count(&self) -> usize {
        let used_idx = self.used_ring.idx.get();
        let pending_chains = used_idx.wrapping_sub(self.last_used_idx.get());

        if pending_chains as usize > MAX_QUEUE_SIZE {
            debug!(
                "virtqueue {}: used ring overrun by {} entries, dropped",
                self.queue_number.get(),
                pending_chains
            );
            self.last_used_idx.set(used_idx);
            return 0;
        }

        pending_chains as usize
    }

    /// Remove the next element from the Virtqueue's used ring.
    ///
    /// Returns `None` if the device has not returned any buffer since the
    /// last call. Otherwise returns the descriptor index the device returned
    /// together with the number of bytes it wrote. The caller is responsible
    /// for offering the descriptor again.
    pub fn pop_used(&self) -> Option<(usize, usize)> {
        if self.used_descriptor_chains_count() == 0 {
            return None;
        }

        let last_used_idx = self.last_used_idx.get();
        let ring_pos = last_used_idx as usize % MAX_QUEUE_SIZE;
        let element = &self.used_ring.ring[ring_pos];
        let descriptor_index = element.id.get();
        let written_len = element.len.get();

        self.last_used_idx.set(last_used_idx.wrapping_add(1));

        Some((descriptor_index as usize, written_len as usize))
    }
}

impl<const MAX_QUEUE_SIZE: usize> Virtqueue for SplitVirtqueue<'_, MAX_QUEUE_SIZE> {
    fn queue_size(&self) -> usize {
        MAX_QUEUE_SIZE
    }

    fn physical_addresses(&self) -> VirtqueueAddresses {
        VirtqueueAddresses {
            descriptor_area: core::ptr::from_ref(&*self.descriptors) as u64,
            driver_area: core::ptr::from_ref(&*self.available_ring) as u64,
            device_area: core::ptr::from_ref(&*self.used_ring) as u64,
        }
    }

    fn initialize(&self, queue_number: u32) {
        assert!(!self.initialized.get());

        self.queue_number.set(queue_number);
        self.initialized.set(true);
    }
}
