// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Polled serial interfaces.
//!
//! The runtime never enables UART interrupts, so these traits are
//! synchronous: transmission spins until the holding register accepts the
//! byte and reception returns immediately when nothing is waiting.

pub trait Transmit {
    /// Block until `byte` has been handed to the transmitter.
    fn transmit_byte(&self, byte: u8);

    fn transmit_buffer(&self, buf: &[u8]) {
        for &b in buf {
            self.transmit_byte(b);
        }
    }
}

pub trait Receive {
    /// Return the next received byte, or `None` if the receive FIFO is empty.
    fn receive_byte(&self) -> Option<u8>;
}
