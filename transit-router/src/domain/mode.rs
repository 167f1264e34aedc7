//! Transport modes.
//!
//! A `Mode` is a closed enumeration: adding a line means adding a variant,
//! and every `match` on it (including the accessors of `ModeMap`) must then
//! be extended.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A means of transport along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Private car, always available.
    Car,
    /// Metro rail.
    Metro,
    /// First scheduled bus line.
    BusA,
    /// Second scheduled bus line.
    BusB,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 4] = [Mode::Car, Mode::Metro, Mode::BusA, Mode::BusB];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Car => "Car",
            Mode::Metro => "Metro",
            Mode::BusA => "Bus A",
            Mode::BusB => "Bus B",
        }
    }

    /// Verb used in itinerary text ("Drive Car", "Ride Metro").
    pub fn verb(self) -> &'static str {
        match self {
            Mode::Car => "Drive",
            Mode::Metro | Mode::BusA | Mode::BusB => "Ride",
        }
    }

    /// Returns true if this mode can run on a timetable.
    ///
    /// Car never waits for a departure, whatever schedule is configured.
    pub fn is_transit(self) -> bool {
        !matches!(self, Mode::Car)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value for each mode.
///
/// Replaces loose per-mode arrays: the fields are named, so a missing mode
/// is a compile error rather than an index out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeMap<T> {
    pub car: T,
    pub metro: T,
    pub bus_a: T,
    pub bus_b: T,
}

impl<T> ModeMap<T> {
    /// Create a map from one value per mode.
    pub fn new(car: T, metro: T, bus_a: T, bus_b: T) -> Self {
        Self {
            car,
            metro,
            bus_a,
            bus_b,
        }
    }

    /// Create a map holding the same value for every mode.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(value.clone(), value.clone(), value.clone(), value)
    }

    /// Returns the value for `mode`.
    pub fn get(&self, mode: Mode) -> &T {
        match mode {
            Mode::Car => &self.car,
            Mode::Metro => &self.metro,
            Mode::BusA => &self.bus_a,
            Mode::BusB => &self.bus_b,
        }
    }

    /// Returns the value for `mode` mutably.
    pub fn get_mut(&mut self, mode: Mode) -> &mut T {
        match mode {
            Mode::Car => &mut self.car,
            Mode::Metro => &mut self.metro,
            Mode::BusA => &mut self.bus_a,
            Mode::BusB => &mut self.bus_b,
        }
    }

    /// Iterate over `(mode, value)` pairs in mode order.
    pub fn iter(&self) -> impl Iterator<Item = (Mode, &T)> {
        Mode::ALL.into_iter().map(move |mode| (mode, self.get(mode)))
    }

    /// Apply `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(Mode, &T) -> U) -> ModeMap<U> {
        ModeMap::new(
            f(Mode::Car, &self.car),
            f(Mode::Metro, &self.metro),
            f(Mode::BusA, &self.bus_a),
            f(Mode::BusB, &self.bus_b),
        )
    }
}

impl<T> Index<Mode> for ModeMap<T> {
    type Output = T;

    fn index(&self, mode: Mode) -> &T {
        self.get(mode)
    }
}

impl<T> IndexMut<Mode> for ModeMap<T> {
    fn index_mut(&mut self, mode: Mode) -> &mut T {
        self.get_mut(mode)
    }
}

/// A set of modes, e.g. the modes a query may use.
///
/// Serialized as a list of mode names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Mode>", into = "Vec<Mode>")]
pub struct ModeSet(u8);

impl ModeSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every mode.
    pub fn all() -> Self {
        Mode::ALL.into_iter().collect()
    }

    /// A set holding exactly one mode.
    pub fn only(mode: Mode) -> Self {
        Self(mode.bit())
    }

    /// Returns this set with `mode` added.
    pub fn with(mut self, mode: Mode) -> Self {
        self.insert(mode);
        self
    }

    /// Add a mode.
    pub fn insert(&mut self, mode: Mode) {
        self.0 |= mode.bit();
    }

    /// Remove a mode.
    pub fn remove(&mut self, mode: Mode) {
        self.0 &= !mode.bit();
    }

    /// Returns true if `mode` is in the set.
    pub fn contains(self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    /// Returns true if no mode is in the set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the modes in the set, in mode order.
    pub fn iter(self) -> impl Iterator<Item = Mode> {
        Mode::ALL.into_iter().filter(move |mode| self.contains(*mode))
    }
}

impl FromIterator<Mode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        let mut set = Self::empty();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl From<Vec<Mode>> for ModeSet {
    fn from(modes: Vec<Mode>) -> Self {
        modes.into_iter().collect()
    }
}

impl From<ModeSet> for Vec<Mode> {
    fn from(set: ModeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
