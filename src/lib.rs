//! Driver for the FocalTech FT6206 / FT6236 capacitive touchscreen controllers.
//!
//! The controller is polled over I2C: [`FocalTouch::touch_count`] returns the
//! number of active contacts and [`FocalTouch::touch_points`] decodes up to
//! two simultaneous touches from one snapshot of the touch data registers.
//!
//! ```ignore
//! let mut touch = FocalTouch::new_i2c(i2c, focaltouch::DEFAULT_ADDRESS, false)?;
//! if touch.touch_count()? > 0 {
//!     for point in touch.touch_points()? {
//!         draw_cursor(point.x, point.y);
//!     }
//! }
//! ```
#![no_std]

use arrayvec::ArrayVec;
use embedded_hal::i2c::I2c;

mod bus;
mod registers;

pub use bus::{I2cRegisterBus, RegisterBus};
pub use registers::DEFAULT_ADDRESS;
use registers::{
    Register, CHIP_ID_FT6206, CHIP_ID_FT6236, DATA_BLOCK_LEN, FOCALTECH_VENDOR_ID,
    IDENTITY_BLOCK_LEN,
};

/// Most contacts this chip family tracks at once
pub const MAX_TOUCH_POINTS: usize = 2;

/// Number of bytes for a single touch slot
pub const RAW_TOUCH_SLOT_LEN: usize = 6;

/// Offset of the first touch slot inside the data block
const TOUCH_SLOT_OFF: usize = 3;

/// Errors in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<CommE> {
    /// Bus transaction failed
    Comm(CommE),
    /// The device at the configured address is not a FocalTech controller
    DeviceNotFound { vendor_id: u8 },
}

/// Controller model, decided once from the chip ID register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipModel {
    /// Vendor matched but the chip ID is not one we know
    Unknown,
    Ft6206,
    Ft6236,
}

impl From<u8> for ChipModel {
    fn from(chip_id: u8) -> Self {
        match chip_id {
            CHIP_ID_FT6206 => ChipModel::Ft6206,
            CHIP_ID_FT6236 => ChipModel::Ft6236,
            _ => ChipModel::Unknown,
        }
    }
}

/// Contents of the identification block starting at `LIBH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipIdentity {
    pub lib_version: u16,
    pub chip_id: u8,
    pub global_mode: u8,
    pub power_mode: u8,
    pub firmware_id: u8,
    pub vendor_id: u8,
}

impl ChipIdentity {
    /// Unpack the identification block. Byte 6 is reserved and byte 8 is not decoded.
    pub fn from_bytes(buf: &[u8; IDENTITY_BLOCK_LEN]) -> Self {
        Self {
            lib_version: u16::from_be_bytes([buf[0], buf[1]]),
            chip_id: buf[2],
            global_mode: buf[3],
            power_mode: buf[4],
            firmware_id: buf[5],
            vendor_id: buf[7],
        }
    }

    pub fn is_focaltech(&self) -> bool {
        self.vendor_id == FOCALTECH_VENDOR_ID
    }

    pub fn model(&self) -> ChipModel {
        ChipModel::from(self.chip_id)
    }
}

/// One active contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    /// 12-bit X position
    pub x: u16,
    /// 12-bit Y position
    pub y: u16,
    /// Touch slot number assigned by the controller (0-15)
    pub id: u8,
}

impl TouchPoint {
    ///
    /// Translate one raw touch slot into a touch point.
    /// Returns `None` for the all-0xFF "no touch" pattern.
    ///
    pub fn from_slot(slot: &[u8; RAW_TOUCH_SLOT_LEN]) -> Option<Self> {
        if slot.iter().all(|&b| b == 0xFF) {
            return None;
        }

        let raw_x = u16::from_be_bytes([slot[0], slot[1]]);
        // high nibble of Y carries the touch ID
        let raw_y = u16::from_be_bytes([slot[2], slot[3]]);
        // slot[4] weight and slot[5] misc are not reported

        Some(TouchPoint {
            x: raw_x & 0x0FFF,
            y: raw_y & 0x0FFF,
            id: (raw_y >> 12) as u8,
        })
    }
}

/// Decode every active slot of a data block, slot 0 first
fn points_from_block(data: &[u8; DATA_BLOCK_LEN]) -> ArrayVec<TouchPoint, MAX_TOUCH_POINTS> {
    let end = TOUCH_SLOT_OFF + MAX_TOUCH_POINTS * RAW_TOUCH_SLOT_LEN;
    data[TOUCH_SLOT_OFF..end]
        .chunks_exact(RAW_TOUCH_SLOT_LEN)
        .filter_map(|slot| <&[u8; RAW_TOUCH_SLOT_LEN]>::try_from(slot).ok())
        .filter_map(TouchPoint::from_slot)
        .collect()
}

pub struct FocalTouch<B> {
    bus: B,
    #[cfg_attr(not(feature = "defmt"), allow(dead_code))]
    debug: bool,
    model: ChipModel,
}

impl<I2C: I2c> FocalTouch<I2cRegisterBus<I2C>> {
    /// Identify the controller at `address` on an I2C port
    pub fn new_i2c(i2c: I2C, address: u8, debug: bool) -> Result<Self, Error<I2C::Error>> {
        Self::new(I2cRegisterBus::new(i2c, address), debug)
    }
}

impl<B: RegisterBus> FocalTouch<B> {
    /// Identify the controller behind `bus`.
    ///
    /// Fails with [`Error::DeviceNotFound`] unless the vendor ID is FocalTech's.
    /// An unrecognized chip ID is accepted and reported as [`ChipModel::Unknown`].
    ///
    /// With `debug` set the point rate and threshold are read as well and,
    /// with the `defmt` feature, the identification is logged along with every
    /// register read. A failure of those reads fails construction.
    pub fn new(bus: B, debug: bool) -> Result<Self, Error<B::Error>> {
        let mut touch = Self {
            bus,
            debug,
            model: ChipModel::Unknown,
        };

        let mut id_buf = [0u8; IDENTITY_BLOCK_LEN];
        touch.read(Register::LibVersionHigh, &mut id_buf)?;
        let identity = ChipIdentity::from_bytes(&id_buf);

        if !identity.is_focaltech() {
            #[cfg(feature = "defmt")]
            defmt::error!("no FocalTech chip, vendor id {=u8:#x}", identity.vendor_id);
            return Err(Error::DeviceNotFound {
                vendor_id: identity.vendor_id,
            });
        }
        touch.model = identity.model();

        if debug {
            let point_rate = touch.point_rate()?;
            let threshold = touch.threshold()?;

            #[cfg(feature = "defmt")]
            {
                defmt::info!("Library vers {=u16:#x}", identity.lib_version);
                defmt::info!("Firmware ID {=u8:#x}", identity.firmware_id);
                defmt::info!("Chip {}", touch.model);
                defmt::info!("Point rate {=u8} Hz", point_rate);
                defmt::info!("Thresh {=u8}", threshold);
            }
            #[cfg(not(feature = "defmt"))]
            let _ = (point_rate, threshold);
        }

        Ok(touch)
    }

    pub fn chip_model(&self) -> ChipModel {
        self.model
    }

    /// Number of active touches, exactly as the controller reports it
    pub fn touch_count(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_byte(Register::NumTouches)
    }

    /// Read one snapshot of the touch data registers and decode the active slots
    pub fn touch_points(
        &mut self,
    ) -> Result<ArrayVec<TouchPoint, MAX_TOUCH_POINTS>, Error<B::Error>> {
        let mut data = [0u8; DATA_BLOCK_LEN];
        self.read(Register::Data, &mut data)?;
        Ok(points_from_block(&data))
    }

    /// Touch sampling rate, in Hz
    pub fn point_rate(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_byte(Register::PointRate)
    }

    /// Touch detection threshold
    pub fn threshold(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_byte(Register::Threshold)
    }

    pub fn firmware_version(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_byte(Register::FirmwareVersion)
    }

    pub fn release_code(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_byte(Register::Release)
    }

    /// Give back the bus
    pub fn destroy(self) -> B {
        self.bus
    }

    fn read_byte(&mut self, register: Register) -> Result<u8, Error<B::Error>> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf)?;
        Ok(buf[0])
    }

    fn read(&mut self, register: Register, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.bus
            .read_register(register.into(), buf)
            .map_err(Error::Comm)?;

        #[cfg(feature = "defmt")]
        if self.debug {
            defmt::debug!("${=u8:#x} => {=[u8]:#x}", u8::from(register), &buf[..]);
        }

        Ok(())
    }
}
