//! Generally useful shared code.

/// Make sure the cursor is visible and colours are reset when we hand the terminal back.
pub const RESET_SCREEN: &str = "\x1b[?25h\x1b[0m";

/// A terminal cell is split into this many pixels vertically.
pub const PIXELS_PER_ROW: usize = 2;

/// One second in microseconds.
pub const ONE_MICROSECOND: u64 = 1_000_000;
