//! Schema-defined wire encoding of the value model.
//!
//! One routine per composite type, all generic over the sink mode, so the
//! measuring and the writing pass share a single traversal. Emission order
//! follows the schema exactly; absent optional fields are wire-omitted,
//! which changes the element count of the enclosing composite.

use log::warn;
use thiserror::Error;

use crate::cbor::{Encoder, Sink, SizeSink, SliceSink};
use crate::model::{
    AnalogMeasurement, AnyType, Frequency, IntervalFrequencyDuration, Magnitude, MeasurementSeries,
    NumericalValue, Params, SeriesKind, Target, Time, TEXT_MAX,
};

/// Map key of the values array inside a regular series.
const VALUES_KEY: i64 = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The writing-mode buffer could not hold the full encoding. The caller
    /// may re-run in measuring mode to size a larger buffer.
    #[error("output buffer too small for the encoded report")]
    CapacityExceeded,
    /// A parameter carries the refused `NotSupported` sentinel. Aborting
    /// beats emitting a structurally incomplete record.
    #[error("parameter `{name}` holds a value the schema cannot carry")]
    UnsupportedValue { name: heapless::String<TEXT_MAX> },
    /// A parameter name is empty.
    #[error("parameter with an empty name")]
    EmptyName,
}

fn time_body<S: Sink>(enc: &mut Encoder<S>, time: &Time) {
    match time.seconds {
        Magnitude::Uint(seconds) => enc.add_u64(seconds),
        Magnitude::Float(seconds) => enc.add_f64(seconds),
    }
    enc.add_i64(time.unit_multiple.exponent());
}

fn encode_time<S: Sink>(enc: &mut Encoder<S>, time: &Time) {
    enc.open_array();
    time_body(enc, time);
    enc.close_array();
}

fn encode_time_in_map<S: Sink>(enc: &mut Encoder<S>, label: i64, time: &Time) {
    enc.open_array_in_map(label);
    time_body(enc, time);
    enc.close_array();
}

fn encode_frequency_in_map<S: Sink>(enc: &mut Encoder<S>, label: i64, frequency: &Frequency) {
    enc.open_array_in_map(label);
    match frequency.hertz {
        Magnitude::Uint(hertz) => enc.add_u64(hertz),
        Magnitude::Float(hertz) => enc.add_f64(hertz),
    }
    enc.add_i64(frequency.unit_multiple.exponent());
    enc.close_array();
}

fn encode_numerical_value<S: Sink>(enc: &mut Encoder<S>, value: &NumericalValue) {
    match *value {
        NumericalValue::Int(v) => enc.add_i64(v),
        NumericalValue::Float(v) => enc.add_f64(v),
    }
}

fn encode_params<S: Sink>(enc: &mut Encoder<S>, params: &Params) -> Result<(), EncodeError> {
    enc.open_array();
    for pair in params {
        if pair.name.is_empty() {
            warn!("refusing parameter list: empty name");
            return Err(EncodeError::EmptyName);
        }
        enc.add_text(&pair.name);
        match &pair.value {
            AnyType::Text(text) => enc.add_text(text),
            AnyType::Bytes(bytes) => enc.add_bytes(bytes),
            AnyType::Int(v) => enc.add_i64(*v),
            AnyType::Uint(v) => enc.add_u64(*v),
            AnyType::Float(v) => enc.add_f64(*v),
            AnyType::Bool(v) => enc.add_bool(*v),
            // An empty value is just a name with nothing after it.
            AnyType::Empty => {}
            AnyType::NotSupported => {
                warn!(
                    "refusing parameter `{}`: value type not supported by the schema",
                    pair.name
                );
                return Err(EncodeError::UnsupportedValue {
                    name: pair.name.clone(),
                });
            }
        }
    }
    enc.close_array();
    Ok(())
}

fn encode_target<S: Sink>(enc: &mut Encoder<S>, target: &Target) -> Result<(), EncodeError> {
    enc.open_array();
    enc.add_text(&target.id);
    if let Some(params) = &target.config_params {
        encode_params(enc, params)?;
    }
    enc.close_array();
    Ok(())
}

/// One series is a flattened group inside the measurements array, not an
/// array of its own, so every omitted optional field shrinks the
/// measurements array by one element.
fn encode_series<S: Sink>(
    enc: &mut Encoder<S>,
    series: &MeasurementSeries,
) -> Result<(), EncodeError> {
    encode_target(enc, &series.target)?;
    if let Some(params) = &series.env_params {
        encode_params(enc, params)?;
    }
    if let Some(time) = &series.start_time {
        encode_time(enc, time);
    }
    enc.add_u64(series.unit.code());
    enc.add_i64(series.unit_multiple.exponent());
    match &series.series {
        SeriesKind::Regular(regular) => {
            enc.open_map();
            enc.open_array_in_map(VALUES_KEY);
            for value in &regular.values {
                encode_numerical_value(enc, value);
            }
            enc.close_array();
            let key = regular.spacing.key();
            match &regular.spacing {
                IntervalFrequencyDuration::Interval(time)
                | IntervalFrequencyDuration::Duration(time) => {
                    encode_time_in_map(enc, key, time);
                }
                IntervalFrequencyDuration::Frequency(frequency) => {
                    encode_frequency_in_map(enc, key, frequency);
                }
            }
            enc.close_map();
        }
        SeriesKind::Irregular(samples) => {
            enc.open_array();
            for sample in samples {
                encode_time(enc, &sample.time);
                encode_numerical_value(enc, &sample.value);
            }
            enc.close_array();
        }
    }
    Ok(())
}

fn emit_envelope<S: Sink>(
    enc: &mut Encoder<S>,
    report: &AnalogMeasurement,
) -> Result<(), EncodeError> {
    enc.open_array();
    enc.add_u64(report.version_tag);
    encode_time(enc, &report.start_time);
    enc.open_array();
    for series in &report.measurements {
        encode_series(enc, series)?;
    }
    enc.close_array();
    enc.close_array();
    Ok(())
}

/// Encode one full report into `buf`, returning the used sub-range.
pub fn encode_analog_measurement<'a>(
    report: &AnalogMeasurement,
    buf: &'a mut [u8],
) -> Result<&'a [u8], EncodeError> {
    let mut enc = Encoder::new(SliceSink::new(buf));
    emit_envelope(&mut enc, report)?;
    enc.finish()
}

/// Measuring-mode pass: the buffer size `encode_analog_measurement` needs
/// for this report.
pub fn required_size(report: &AnalogMeasurement) -> Result<usize, EncodeError> {
    let mut enc = Encoder::new(SizeSink);
    emit_envelope(&mut enc, report)?;
    enc.finish()
}
