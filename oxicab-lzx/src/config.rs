//! LZX decoder configuration.

use crate::tables::{MAX_WINDOW_BITS, MIN_WINDOW_BITS, main_elements};
use oxicab_core::error::{OxiCabError, Result};

/// LZX decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzxConfig {
    /// Window size exponent (15-21).
    pub window_bits: u8,
    /// Frames between full state resets (0 = never).
    ///
    /// Cabinet folders never reset. CHM and LIT streams reset the decoder
    /// every few frames so readers can seek.
    pub reset_interval: u32,
}

impl LzxConfig {
    /// Default CAB configuration: 2 MB window, no resets.
    pub const DEFAULT: Self = Self {
        window_bits: MAX_WINDOW_BITS,
        reset_interval: 0,
    };

    /// Create a configuration for the given window exponent.
    pub fn new(window_bits: u8) -> Self {
        Self {
            window_bits,
            reset_interval: 0,
        }
    }

    /// Configuration for a CAB folder (`typeCompress` window field).
    pub fn cab(window_bits: u8) -> Self {
        Self::new(window_bits)
    }

    /// Set the reset interval in frames.
    pub fn with_reset_interval(mut self, frames: u32) -> Self {
        self.reset_interval = frames;
        self
    }

    /// Check the window exponent.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(OxiCabError::invalid_window_size(
                self.window_bits,
                MIN_WINDOW_BITS,
                MAX_WINDOW_BITS,
            ));
        }
        Ok(())
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1usize << self.window_bits
    }

    /// Number of main tree symbols.
    pub fn main_elements(&self) -> usize {
        main_elements(self.window_bits)
    }
}

impl Default for LzxConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
