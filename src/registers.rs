//! Register map of the FT6x06 family

/// Default 7-bit I2C address of the controller
pub const DEFAULT_ADDRESS: u8 = 0x38;

/// The only vendor ID the driver accepts
pub(crate) const FOCALTECH_VENDOR_ID: u8 = 0x11;

pub(crate) const CHIP_ID_FT6206: u8 = 0x06;
pub(crate) const CHIP_ID_FT6236: u8 = 0x64;

/// Bytes read from `Data` per touch snapshot
pub(crate) const DATA_BLOCK_LEN: usize = 32;
/// Bytes read from `LibVersionHigh` during identification
pub(crate) const IDENTITY_BLOCK_LEN: usize = 9;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Register {
    /// Start of the touch slot block
    Data = 0x00,
    NumTouches = 0x02,
    Threshold = 0x80,
    /// Sampling rate, in Hz
    PointRate = 0x88,
    /// Start of the identity block
    LibVersionHigh = 0xA1,
    #[allow(dead_code)]
    LibVersionLow = 0xA2,
    #[allow(dead_code)]
    ChipId = 0xA3,
    FirmwareVersion = 0xA6,
    #[allow(dead_code)]
    VendorId = 0xA8,
    Release = 0xAF,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        reg as u8
    }
}
