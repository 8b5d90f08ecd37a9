// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for kernel debug output.
//!
//! Text is written synchronously to a single registered [`IoWrite`]
//! implementation, normally the board's UART. Messages emitted before a
//! writer has been registered with [`set_debug_writer`] are dropped.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // includes file and line number
//! ```
//!
//! ```text
//! Yes the code gets here with value 42
//! TOCK_DEBUG(src/main.rs:74): got here
//! ```

use core::cell::Cell;
use core::fmt::{self, Write};
use core::panic::PanicInfo;

use crate::config::CONFIG;

/// Synchronous byte sink used for debug output and panic messages.
pub trait IoWrite {
    /// Write all of `buf`, returning the number of bytes written.
    fn write(&self, buf: &[u8]) -> usize;
}

struct DebugWriterSlot(Cell<Option<&'static dyn IoWrite>>);

// SAFETY: the runtime executes on a single hart and the timer trap handler
// never touches debug output, so the slot is only ever accessed from one
// context.
unsafe impl Sync for DebugWriterSlot {}

static DEBUG_WRITER: DebugWriterSlot = DebugWriterSlot(Cell::new(None));

/// Register the writer that receives all `debug!` output.
pub fn set_debug_writer(writer: &'static dyn IoWrite) {
    DEBUG_WRITER.0.set(Some(writer));
}

/// Whether a debug writer has been registered.
pub fn debug_writer_registered() -> bool {
    DEBUG_WRITER.0.get().is_some()
}

/// Adapter from an [`IoWrite`] to `core::fmt::Write`.
struct WriterAdapter<'a>(&'a dyn IoWrite);

impl Write for WriterAdapter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes());
        Ok(())
    }
}

fn write_line(writer: &dyn IoWrite, prefix: Option<(&str, u32)>, args: fmt::Arguments) {
    let mut adapter = WriterAdapter(writer);
    if let Some((file, line)) = prefix {
        let _ = write!(adapter, "TOCK_DEBUG({}:{}): ", file, line);
    }
    let _ = adapter.write_fmt(args);
    let _ = adapter.write_str("\r\n");
}

/// Write a formatted message followed by a newline.
pub fn debug_println(args: fmt::Arguments) {
    if let Some(writer) = DEBUG_WRITER.0.get() {
        write_line(writer, None, args);
    }
}

/// Write a formatted message prefixed with its source location.
pub fn debug_verbose_println(args: fmt::Arguments, file_line: &(&'static str, u32)) {
    if let Some(writer) = DEBUG_WRITER.0.get() {
        write_line(writer, Some(*file_line), args);
    }
}

/// Print the panic message and location to `writer`.
///
/// Does nothing when panic output was disabled with the `no_debug_panics`
/// kernel feature.
pub fn panic_print(writer: &dyn IoWrite, panic_info: &PanicInfo) {
    if !CONFIG.debug_panics {
        return;
    }
    let mut adapter = WriterAdapter(writer);
    let _ = writeln!(adapter, "\r\nKernel panic at {}", panic_info);
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        $crate::debug::debug_println(format_args!(""));
    });
    ($($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($($arg)+));
    });
}

/// In-kernel `println()` debugging with filename and line numbers.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("");
    });
    ($($arg:tt)+) => ({
        static _FILE_LINE: (&'static str, u32) = (file!(), line!());
        $crate::debug::debug_verbose_println(format_args!($($arg)+), &_FILE_LINE);
    });
}
