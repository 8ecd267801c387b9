//! Value model for one analog measurement report.
//!
//! Plain data, no behavior beyond a few constructors. Every bounded
//! sequence is a `heapless::Vec`, so a report that violates the count
//! bound cannot be built in the first place.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum element count of every bounded sequence in the schema.
pub const MAX_QTY: usize = 20;

/// Capacity of text fields (target ids, parameter names, text values).
pub const TEXT_MAX: usize = 64;

/// Capacity of byte-string parameter values.
pub const BYTES_MAX: usize = 64;

/// Power-of-ten unit prefix, wire-encoded as its signed decimal exponent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitMultiple {
    Yocto = -24,
    Zepto = -21,
    Atto = -18,
    Femto = -15,
    Pico = -12,
    Nano = -9,
    Micro = -6,
    Milli = -3,
    Centi = -2,
    Deci = -1,
    Base = 0,
    Deca = 1,
    Hecto = 2,
    Kilo = 3,
    Mega = 6,
    Giga = 9,
    Tera = 12,
    Peta = 15,
    Exa = 18,
    Zetta = 21,
    Yotta = 24,
}

impl UnitMultiple {
    pub fn exponent(self) -> i64 {
        self as i64
    }
}

/// Electrical SI quantity, wire-encoded as its enumerator value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitElectrical {
    None = 1,
    Voltage = 2,
    Current = 3,
    Resistance = 4,
    Conductance = 5,
    Capacitance = 6,
    Charge = 7,
    Inductance = 8,
    Power = 9,
    Impedance = 10,
    Frequency = 11,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Undefined,
    Electrical(UnitElectrical),
}

impl Unit {
    /// The wire value of the unit discriminant. `Undefined` is 0, the
    /// electrical quantities carry their own enumerator value.
    pub fn code(self) -> u64 {
        match self {
            Unit::Undefined => 0,
            Unit::Electrical(quantity) => quantity as u64,
        }
    }
}

/// Unsigned-or-float scalar used for seconds and hertz.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    Uint(u64),
    Float(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Time {
    pub seconds: Magnitude,
    pub unit_multiple: UnitMultiple,
}

impl Time {
    pub fn uint(seconds: u64, unit_multiple: UnitMultiple) -> Self {
        Time {
            seconds: Magnitude::Uint(seconds),
            unit_multiple,
        }
    }

    pub fn float(seconds: f64, unit_multiple: UnitMultiple) -> Self {
        Time {
            seconds: Magnitude::Float(seconds),
            unit_multiple,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Frequency {
    pub hertz: Magnitude,
    pub unit_multiple: UnitMultiple,
}

/// One scalar sample.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum NumericalValue {
    Int(i64),
    Float(f64),
}

/// Dynamically typed parameter value.
///
/// `NotSupported` stands in for values the schema has no encoding for;
/// the encoder refuses it with a hard error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AnyType {
    Text(String<TEXT_MAX>),
    Bytes(Vec<u8, BYTES_MAX>),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Empty,
    NotSupported,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NameValuePair {
    pub name: String<TEXT_MAX>,
    pub value: AnyType,
}

/// Ordered parameter list; insertion order is significant on the wire.
pub type Params = Vec<NameValuePair, MAX_QTY>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Target {
    pub id: String<TEXT_MAX>,
    pub config_params: Option<Params>,
}

/// How the samples of a regular series are spaced. The discriminant value
/// doubles as the map key on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum IntervalFrequencyDuration {
    Interval(Time),
    Frequency(Frequency),
    Duration(Time),
}

impl IntervalFrequencyDuration {
    pub fn key(&self) -> i64 {
        match self {
            IntervalFrequencyDuration::Interval(_) => 1,
            IntervalFrequencyDuration::Frequency(_) => 2,
            IntervalFrequencyDuration::Duration(_) => 3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegularMeasurementSeries {
    pub values: Vec<NumericalValue, MAX_QTY>,
    pub spacing: IntervalFrequencyDuration,
}

/// One (timestamp, value) pair of an irregular series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TimedValue {
    pub time: Time,
    pub value: NumericalValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SeriesKind {
    Regular(RegularMeasurementSeries),
    Irregular(Vec<TimedValue, MAX_QTY>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    pub target: Target,
    pub env_params: Option<Params>,
    pub start_time: Option<Time>,
    pub unit: Unit,
    pub unit_multiple: UnitMultiple,
    pub series: SeriesKind,
}

/// The outermost reporting envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalogMeasurement {
    pub version_tag: u64,
    pub start_time: Time,
    pub measurements: Vec<MeasurementSeries, MAX_QTY>,
}
