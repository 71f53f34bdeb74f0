//! CAB compression type tags.
//!
//! Each CFFOLDER carries a 16-bit `typeCompress` field. The low nibble
//! selects the codec; the upper bits hold codec parameters.

use crate::error::{OxiCabError, Result};

/// Mask for the codec selector.
pub const MASK_TYPE: u16 = 0x000F;
/// Mask for the Quantum compression level.
pub const MASK_QUANTUM_LEVEL: u16 = 0x00F0;
/// Mask for the Quantum memory / LZX window exponent.
pub const MASK_WINDOW: u16 = 0x1F00;

const TYPE_NONE: u16 = 0;
const TYPE_MSZIP: u16 = 1;
const TYPE_QUANTUM: u16 = 2;
const TYPE_LZX: u16 = 3;

/// Compression type of a cabinet folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression (stored).
    None,
    /// MSZIP (Deflate-based).
    MsZip,
    /// Quantum compression.
    Quantum {
        /// Compression level (1-7).
        level: u8,
        /// Window size exponent (10-21).
        memory: u8,
    },
    /// LZX compression with the window size exponent (15-21).
    Lzx(u8),
}

impl CompressionType {
    /// Parse a `typeCompress` value.
    pub fn from_u16(value: u16) -> Result<Self> {
        let window = ((value & MASK_WINDOW) >> 8) as u8;
        match value & MASK_TYPE {
            TYPE_NONE => Ok(Self::None),
            TYPE_MSZIP => Ok(Self::MsZip),
            TYPE_QUANTUM => Ok(Self::Quantum {
                level: ((value & MASK_QUANTUM_LEVEL) >> 4) as u8,
                memory: window,
            }),
            TYPE_LZX => Ok(Self::Lzx(window)),
            _ => Err(OxiCabError::unknown_compression_type(value)),
        }
    }

    /// Encode back to a `typeCompress` value.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::None => TYPE_NONE,
            Self::MsZip => TYPE_MSZIP,
            Self::Quantum { level, memory } => {
                TYPE_QUANTUM | ((level as u16) << 4) & MASK_QUANTUM_LEVEL
                    | ((memory as u16) << 8) & MASK_WINDOW
            }
            Self::Lzx(window) => TYPE_LZX | ((window as u16) << 8) & MASK_WINDOW,
        }
    }

    /// Human-readable codec name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::MsZip => "MSZIP",
            Self::Quantum { .. } => "Quantum",
            Self::Lzx(_) => "LZX",
        }
    }
}

impl TryFrom<u16> for CompressionType {
    type Error = OxiCabError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_u16(value)
    }
}
