//! mGBA debug console logging
//!
//! Each call is one message. Output is dropped silently when the debug
//! console is absent (real hardware, other emulators).

use core::fmt::{Arguments, Write};

pub use gba::mgba::MgbaMessageLevel as Level;
use gba::mgba::MgbaBufferedLogger;

/// Write one message at `level`
pub fn write(level: Level, args: Arguments<'_>) {
    if let Ok(mut logger) = MgbaBufferedLogger::try_new(level) {
        let _ = logger.write_fmt(args);
    }
}

macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Info, format_args!($($arg)*))
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Warning, format_args!($($arg)*))
    };
}

macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::Level::Fatal, format_args!($($arg)*))
    };
}
