//! Simulated BME280 register file for testing
//!
//! [`SimBus`] models the parts of the sensor the driver talks to: the ID
//! register, the two calibration blocks, the control registers, the STATUS
//! measuring bit, and the 8-byte raw data block. Writing a forced-mode
//! CTRL_MEAS byte raises the measuring bit for a configurable number of
//! STATUS reads, so completion polling is observable in tests.
//!
//! Faults are injected per register: a queued fault fires on the next access
//! to that register and is consumed, which is enough to script "this cycle's
//! block read times out, the next one succeeds".

use heapless::Vec;

use crate::errors::BusError;
use crate::registers::{self, Mode};

use super::SensorBus;

/// Reference calibration, first block (0x88..=0xA1)
///
/// Encodes the Bosch datasheet worked-example trimming values
/// (T1=27504, T2=26435, T3=-1000, P1=36477, P2=-10685, P3=3024, P4=2855,
/// P5=140, P6=-7, P7=15500, P8=-14600, P9=6000) plus H1=75 at offset 25.
pub const REFERENCE_CALIB_BLOCK1: [u8; 26] = [
    0x70, 0x6B, // T1
    0x43, 0x67, // T2
    0x18, 0xFC, // T3
    0x7D, 0x8E, // P1
    0x43, 0xD6, // P2
    0xD0, 0x0B, // P3
    0x27, 0x0B, // P4
    0x8C, 0x00, // P5
    0xF9, 0xFF, // P6
    0x8C, 0x3C, // P7
    0xF8, 0xC6, // P8
    0x70, 0x17, // P9
    0x00, // 0xA0, unused
    0x4B, // H1 = 75
];

/// Reference calibration, second block (0xE1..=0xF0)
///
/// Encodes H2=355, H3=0, H4=333, H5=50, H6=30 with the shared nibble byte
/// at 0xE5.
pub const REFERENCE_CALIB_BLOCK2: [u8; 16] = [
    0x63, 0x01, // H2
    0x00, // H3
    0x14, 0x2D, 0x03, // H4/H5 nibble-packed
    0x1E, // H6 = 30
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Raw measurement block the simulated sensor serves by default
///
/// Pressure 0x5A5A0 (370080), temperature 0x80000 (524288),
/// humidity 0x8000 (32768).
pub const DEFAULT_RAW_BLOCK: [u8; 8] = [0x5A, 0x5A, 0x00, 0x80, 0x00, 0x00, 0x80, 0x00];

/// One queued transport fault
#[derive(Debug, Clone, Copy)]
struct Fault {
    register: u8,
    error: BusError,
}

/// In-memory BME280 with fault injection
pub struct SimBus {
    regs: [u8; 256],
    raw_block: [u8; 8],
    /// STATUS reads left with the measuring bit set after a forced trigger
    measuring_reads: u8,
    /// STATUS reads the measuring bit stays set per trigger
    conversion_polls: u8,
    faults: Vec<Fault, 8>,
    /// Cap block reads at this many bytes, to exercise short-read handling
    short_read_limit: Option<usize>,
    writes: Vec<(u8, u8), 64>,
}

impl SimBus {
    /// Empty register file; no chip id, no calibration
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            raw_block: DEFAULT_RAW_BLOCK,
            measuring_reads: 0,
            conversion_polls: 1,
            faults: Vec::new(),
            short_read_limit: None,
            writes: Vec::new(),
        }
    }

    /// A responsive sensor: correct chip id, reference calibration,
    /// default raw block
    pub fn with_defaults() -> Self {
        let mut bus = Self::new();
        bus.regs[registers::REG_ID as usize] = registers::CHIP_ID;
        bus.set_calibration_blocks(&REFERENCE_CALIB_BLOCK1, &REFERENCE_CALIB_BLOCK2);
        bus
    }

    /// Load both calibration blocks into the register file
    pub fn set_calibration_blocks(&mut self, block1: &[u8; 26], block2: &[u8; 16]) {
        let base = registers::REG_CALIB00 as usize;
        self.regs[base..base + block1.len()].copy_from_slice(block1);
        let base = registers::REG_CALIB26 as usize;
        self.regs[base..base + block2.len()].copy_from_slice(block2);
    }

    /// Replace the byte read back from the ID register
    pub fn set_chip_id(&mut self, id: u8) {
        self.regs[registers::REG_ID as usize] = id;
    }

    /// Replace the 8-byte raw measurement block
    pub fn set_raw_block(&mut self, block: [u8; 8]) {
        self.raw_block = block;
    }

    /// Number of STATUS reads the measuring bit stays set after a trigger
    pub fn set_conversion_polls(&mut self, polls: u8) {
        self.conversion_polls = polls;
    }

    /// Queue a one-shot fault for the next access to `register`
    pub fn inject_fault(&mut self, register: u8, error: BusError) {
        self.faults
            .push(Fault { register, error })
            .unwrap_or_else(|_| panic!("fault queue full"));
    }

    /// Cap block reads at `limit` bytes
    pub fn truncate_block_reads(&mut self, limit: usize) {
        self.short_read_limit = Some(limit);
    }

    /// All byte writes the driver issued, in order
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    fn take_fault(&mut self, register: u8) -> Result<(), BusError> {
        if let Some(pos) = self.faults.iter().position(|f| f.register == register) {
            let fault = self.faults.remove(pos);
            return Err(fault.error);
        }
        Ok(())
    }

    fn status_byte(&mut self) -> u8 {
        if self.measuring_reads > 0 {
            self.measuring_reads -= 1;
            registers::STATUS_MEASURING
        } else {
            0
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SensorBus for SimBus {
    fn read_byte(&mut self, register: u8) -> Result<u8, BusError> {
        self.take_fault(register)?;
        if register == registers::REG_STATUS {
            return Ok(self.status_byte());
        }
        Ok(self.regs[register as usize])
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.take_fault(register)?;
        let _ = self.writes.push((register, value));
        self.regs[register as usize] = value;
        if register == registers::REG_CTRL_MEAS && (value & 0b11) == Mode::Forced as u8 {
            self.measuring_reads = self.conversion_polls;
        }
        Ok(())
    }

    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.take_fault(register)?;
        let len = match self.short_read_limit {
            Some(limit) => limit.min(buf.len()),
            None => buf.len(),
        };
        if register == registers::REG_DATA {
            let n = len.min(self.raw_block.len());
            buf[..n].copy_from_slice(&self.raw_block[..n]);
            return Ok(n);
        }
        let base = register as usize;
        buf[..len].copy_from_slice(&self.regs[base..base + len]);
        Ok(len)
    }
}
