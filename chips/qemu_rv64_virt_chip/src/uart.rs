// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! QEMU's memory mapped 16550 UART
//!
//! The UART is used strictly polled: interrupts stay disabled, transmission
//! spins on the line status register and reception reads whatever is waiting
//! in the receive FIFO.

use kernel::debug::IoWrite;
use kernel::hil;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, Aliased, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

pub const UART0_BASE: StaticRef<Uart16550Registers> =
    unsafe { StaticRef::new(0x1000_0000 as *const Uart16550Registers) };

type Uart16550RegshiftInt = u8;

#[repr(C)]
pub struct Uart16550Registers {
    /// 0x00:
    /// - DLAB = 0
    ///   - Read: receiver buffer (RBR)
    ///   - Write: transmitter holding (THR)
    /// - DLAB = 1: divisor latch LSB (DLL)
    rbr_thr: Aliased<Uart16550RegshiftInt, RBR::Register, THR::Register>,

    /// 0x01:
    /// - DLAB = 0: interrupt enable (IER)
    /// - DLAB = 1: divisor latch MSB (DLM)
    ier: ReadWrite<Uart16550RegshiftInt, IER::Register>,

    /// 0x02:
    /// - Read: interrupt identification (IIR)
    /// - Write: FIFO control (FCR)
    iir_fcr: Aliased<Uart16550RegshiftInt, (), FCR::Register>,

    /// 0x03: line control (LCR)
    lcr: ReadWrite<Uart16550RegshiftInt, LCR::Register>,

    /// 0x04: modem control (MCR)
    _mcr: ReadWrite<Uart16550RegshiftInt>,

    /// 0x05: line status (LSR)
    lsr: ReadOnly<Uart16550RegshiftInt, LSR::Register>,
}

register_bitfields![u8,
    RBR [
        Data OFFSET(0) NUMBITS(8) [],
    ],
    THR [
        Data OFFSET(0) NUMBITS(8) [],
    ],
    IER [
        ModemStatusRegisterChange OFFSET(3) NUMBITS(1) [],
        ReceiverLineStatusRegisterChange OFFSET(2) NUMBITS(1) [],
        TransmitterHoldingRegisterEmpty OFFSET(1) NUMBITS(1) [],
        ReceivedDataAvailable OFFSET(0) NUMBITS(1) [],
    ],
    FCR [
        ReceiveFIFOInterruptTriggerLevel OFFSET(6) NUMBITS(2) [
            Bytes1 = 0,
            Bytes4 = 1,
            Bytes8 = 2,
            Bytes14 = 3,
        ],
        ClearTransmitFIFO OFFSET(2) NUMBITS(1) [],
        ClearReceiveFIFO OFFSET(1) NUMBITS(1) [],
        Enable OFFSET(0) NUMBITS(1) [],
    ],
    LCR [
        DivisorLatchAccess OFFSET(7) NUMBITS(1) [],
        Parity OFFSET(3) NUMBITS(1) [],
        StopBits OFFSET(2) NUMBITS(1) [
            One = 0,
            OneHalfTwo = 1,
        ],
        DataWordLength OFFSET(0) NUMBITS(2) [
            Bits5 = 0,
            Bits6 = 1,
            Bits7 = 2,
            Bits8 = 3,
        ],
    ],
    LSR [
        ErronousDataInFIFO OFFSET(7) NUMBITS(1) [],
        THREmptyLineIdle OFFSET(6) NUMBITS(1) [],
        THREmpty OFFSET(5) NUMBITS(1) [],
        BreakSignalReceived OFFSET(4) NUMBITS(1) [],
        FramingError OFFSET(3) NUMBITS(1) [],
        ParityError OFFSET(2) NUMBITS(1) [],
        OverrunError OFFSET(1) NUMBITS(1) [],
        DataAvailable OFFSET(0) NUMBITS(1) [],
    ],
];

pub struct Uart16550 {
    regs: StaticRef<Uart16550Registers>,
}

impl Uart16550 {
    pub const fn new(regs: StaticRef<Uart16550Registers>) -> Uart16550 {
        Uart16550 { regs }
    }

    /// Put the UART into polled 8N1 operation with FIFOs enabled.
    ///
    /// QEMU ignores the divisor latch, so the baud rate is left alone.
    pub fn init(&self) {
        self.regs.ier.set(0);
        self.regs.lcr.write(
            LCR::DivisorLatchAccess::CLEAR
                + LCR::Parity::CLEAR
                + LCR::StopBits::One
                + LCR::DataWordLength::Bits8,
        );
        self.regs.iir_fcr.write(
            FCR::Enable::SET
                + FCR::ClearReceiveFIFO::SET
                + FCR::ClearTransmitFIFO::SET
                + FCR::ReceiveFIFOInterruptTriggerLevel::Bytes1,
        );
    }

    /// Blocking transmit
    ///
    /// This function will transmit the passed slice in a blocking
    /// fashing, returning when finished.
    pub fn transmit_sync(&self, bytes: &[u8]) {
        for byte in bytes.iter() {
            while !self.regs.lsr.is_set(LSR::THREmpty) {}
            self.regs.rbr_thr.write(THR::Data.val(*byte));
        }
    }
}

impl hil::uart::Transmit for Uart16550 {
    fn transmit_byte(&self, byte: u8) {
        self.transmit_sync(&[byte]);
    }

    fn transmit_buffer(&self, buf: &[u8]) {
        self.transmit_sync(buf);
    }
}

impl hil::uart::Receive for Uart16550 {
    fn receive_byte(&self) -> Option<u8> {
        if self.regs.lsr.is_set(LSR::DataAvailable) {
            Some(self.regs.rbr_thr.read(RBR::Data))
        } else {
            None
        }
    }
}

impl IoWrite for Uart16550 {
    fn write(&self, buf: &[u8]) -> usize {
        self.transmit_sync(buf);
        buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::hil::uart::{Receive, Transmit};
    use std::boxed::Box;

    const RBR_THR: usize = 0;
    const IER: usize = 1;
    const FCR: usize = 2;
    const LCR: usize = 3;
    const LSR: usize = 5;

    fn fake_uart() -> (Uart16550, *mut u8) {
        let bytes = Box::leak(Box::new([0u8; 8])).as_mut_ptr();
        let regs = unsafe { StaticRef::new(bytes as *const Uart16550Registers) };
        (Uart16550::new(regs), bytes)
    }

    fn poke(bytes: *mut u8, offset: usize, value: u8) {
        unsafe { bytes.add(offset).write_volatile(value) }
    }

    fn peek(bytes: *mut u8, offset: usize) -> u8 {
        unsafe { bytes.add(offset).read_volatile() }
    }

    #[test]
    fn init_selects_polled_8n1() {
        let (uart, bytes) = fake_uart();
        poke(bytes, IER, 0x0f);
        uart.init();
        assert_eq!(peek(bytes, IER), 0);
        assert_eq!(peek(bytes, LCR), 0x03);
        assert_eq!(peek(bytes, FCR), 0x07);
    }

    #[test]
    fn receive_is_gated_by_data_ready() {
        let (uart, bytes) = fake_uart();
        poke(bytes, RBR_THR, b'w');
        assert_eq!(uart.receive_byte(), None);

        poke(bytes, LSR, 0x01);
        assert_eq!(uart.receive_byte(), Some(b'w'));
    }

    #[test]
    fn transmit_writes_the_holding_register() {
        let (uart, bytes) = fake_uart();
        poke(bytes, LSR, 0x60);
        uart.transmit_byte(b'D');
        assert_eq!(peek(bytes, RBR_THR), b'D');

        assert_eq!(IoWrite::write(&uart, b"ok"), 2);
        assert_eq!(peek(bytes, RBR_THR), b'k');
    }
}
