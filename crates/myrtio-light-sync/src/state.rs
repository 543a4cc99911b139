//! Shared light state
//!
//! One [`StateStore`] exists per node. It is written by button commands,
//! inbound snapshots and master overrides, and read by the resync loop and
//! any display collaborator.
//!
//! The whole `{mode, brightness}` pair sits behind a single critical-section
//! mutex, so readers never observe a torn combination and read-modify-write
//! operations (mode step, brightness step) are atomic as a unit.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::ports::LightStateSink;

/// Number of defined lighting modes
pub const MODE_COUNT: u8 = 6;

/// Brightness quantum used by button steps (6 levels including 0 and 255)
pub const BRIGHTNESS_STEP: u8 = 51;

const MODE_ID_OFF: u8 = 0;
const MODE_ID_WHITE: u8 = 1;
const MODE_ID_WARM: u8 = 2;
const MODE_ID_BLUE: u8 = 3;
const MODE_ID_RED: u8 = 4;
const MODE_ID_RAINBOW: u8 = 5;

/// Known lighting modes, in stepping order.
///
/// Stepping wraps around modulo [`MODE_COUNT`] in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ModeId {
    Off = MODE_ID_OFF,
    White = MODE_ID_WHITE,
    Warm = MODE_ID_WARM,
    Blue = MODE_ID_BLUE,
    Red = MODE_ID_RED,
    Rainbow = MODE_ID_RAINBOW,
}

impl ModeId {
    /// All modes in stepping order
    pub const ALL: [ModeId; MODE_COUNT as usize] = [
        Self::Off,
        Self::White,
        Self::Warm,
        Self::Blue,
        Self::Red,
        Self::Rainbow,
    ];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            MODE_ID_OFF => Self::Off,
            MODE_ID_WHITE => Self::White,
            MODE_ID_WARM => Self::Warm,
            MODE_ID_BLUE => Self::Blue,
            MODE_ID_RED => Self::Red,
            MODE_ID_RAINBOW => Self::Rainbow,
            _ => return None,
        })
    }

    /// Fold any raw index into the mode set, modulo [`MODE_COUNT`].
    pub const fn from_raw_wrapping(value: u8) -> Self {
        match Self::from_raw(value % MODE_COUNT) {
            Some(mode) => mode,
            None => Self::Off,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Next mode, wrapping from the last mode to the first
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_raw_wrapping(self.as_u8() + 1)
    }

    /// Previous mode, wrapping from the first mode to the last
    #[must_use]
    pub const fn prev(self) -> Self {
        Self::from_raw_wrapping(self.as_u8() + MODE_COUNT - 1)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::White => "white",
            Self::Warm => "warm",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Rainbow => "rainbow",
        }
    }
}

/// Represents the light state shared across the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightState {
    pub mode: ModeId,
    pub brightness: u8,
}

impl LightState {
    pub const fn new(mode: ModeId, brightness: u8) -> Self {
        Self { mode, brightness }
    }

    /// State with the brightness moved by `delta`, clamped to `0..=255`
    #[must_use]
    pub fn with_brightness_delta(self, delta: i16) -> Self {
        let next = i16::from(self.brightness).saturating_add(delta);
        let brightness = u8::try_from(next.clamp(0, i16::from(u8::MAX))).unwrap_or(u8::MAX);
        Self { brightness, ..self }
    }
}

impl Default for LightState {
    /// White at full brightness
    fn default() -> Self {
        Self::new(ModeId::White, u8::MAX)
    }
}

/// Node-wide light state holder.
pub struct StateStore {
    state: Mutex<CriticalSectionRawMutex, Cell<LightState>>,
}

impl StateStore {
    pub const fn new(initial: LightState) -> Self {
        Self {
            state: Mutex::new(Cell::new(initial)),
        }
    }

    /// Read-modify-write under one critical section, returns the new state
    fn update(&self, f: impl FnOnce(LightState) -> LightState) -> LightState {
        self.state.lock(|cell| {
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }
}

impl LightStateSink for StateStore {
    fn get(&self) -> LightState {
        self.state.lock(Cell::get)
    }

    fn set(&self, state: LightState) {
        self.state.lock(|cell| cell.set(state));
    }

    fn set_mode(&self, mode: ModeId) {
        self.update(|state| LightState { mode, ..state });
    }

    fn advance_mode(&self) -> LightState {
        self.update(|state| LightState {
            mode: state.mode.next(),
            ..state
        })
    }

    fn retreat_mode(&self) -> LightState {
        self.update(|state| LightState {
            mode: state.mode.prev(),
            ..state
        })
    }

    fn brightness(&self) -> u8 {
        self.get().brightness
    }

    fn set_brightness(&self, brightness: u8) {
        self.update(|state| LightState { brightness, ..state });
    }

    fn adjust_brightness(&self, delta: i16) -> LightState {
        self.update(|state| state.with_brightness_delta(delta))
    }
}
