// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Virtqueue implementations.

pub mod split_queue;

/// Guest-physical addresses of the three areas of a virtqueue.
///
/// There is no MMU, so these are the addresses of the Rust objects
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtqueueAddresses {
    pub descriptor_area: u64,
    pub driver_area: u64,
    pub device_area: u64,
}

/// A virtqueue as seen by a transport during device initialization.
///
/// The transport only needs to know how large the queue is, where it lives
/// and which queue number it was assigned. Everything about the buffers
/// exchanged through the queue is up to the device driver.
pub trait Virtqueue {
    /// Number of descriptors, which is also the number of ring slots.
    fn queue_size(&self) -> usize;

    /// Physical addresses to program into the transport.
    fn physical_addresses(&self) -> VirtqueueAddresses;

    /// Record the queue number the transport assigned.
    ///
    /// Called exactly once, before the queue is marked ready.
    fn initialize(&self, queue_number: u32);
}
