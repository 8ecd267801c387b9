//! Wire-level checks against the externally fixed schema bytes.

use heapless::{String, Vec};

use gauger_shared::model::{
    AnalogMeasurement, AnyType, IntervalFrequencyDuration, MeasurementSeries, NameValuePair,
    NumericalValue, Params, RegularMeasurementSeries, SeriesKind, Target, Time, TimedValue, Unit,
    UnitElectrical, UnitMultiple, MAX_QTY,
};
use gauger_shared::{encode_analog_measurement, required_size, EncodeError};

fn encode(report: &AnalogMeasurement) -> std::vec::Vec<u8> {
    let size = required_size(report).unwrap();
    let mut buf = vec![0u8; size];
    let len = encode_analog_measurement(report, &mut buf).unwrap().len();
    assert_eq!(len, size);
    buf
}

fn empty_envelope() -> AnalogMeasurement {
    AnalogMeasurement {
        version_tag: 1,
        start_time: Time::uint(0, UnitMultiple::Milli),
        measurements: Vec::new(),
    }
}

fn regular_series(env_params: Option<Params>) -> MeasurementSeries {
    MeasurementSeries {
        target: Target {
            id: String::from("T1"),
            config_params: None,
        },
        env_params,
        start_time: None,
        unit: Unit::Electrical(UnitElectrical::Voltage),
        unit_multiple: UnitMultiple::Milli,
        series: SeriesKind::Regular(RegularMeasurementSeries {
            values: Vec::from_slice(&[NumericalValue::Int(10), NumericalValue::Int(20)]).unwrap(),
            spacing: IntervalFrequencyDuration::Duration(Time::uint(500, UnitMultiple::Milli)),
        }),
    }
}

fn single_series_envelope(env_params: Option<Params>) -> AnalogMeasurement {
    let mut report = empty_envelope();
    report.measurements.push(regular_series(env_params)).unwrap();
    report
}

#[test]
fn scenario_a_empty_envelope() {
    // [1, [0, -3], []]
    assert_eq!(
        encode(&empty_envelope()),
        [0x83, 0x01, 0x82, 0x00, 0x22, 0x80]
    );
}

#[test]
fn scenario_b_single_regular_series() {
    let expected = [
        0x83, // envelope: version, start-time, measurements
        0x01, // version 1
        0x82, 0x00, 0x22, // start-time [0, -3]
        0x84, // measurements: 4 elements (env-params and start-time omitted)
        0x81, 0x62, b'T', b'1', // target ["T1"]
        0x02, // unit: voltage
        0x22, // unit-multiple: milli
        0xa2, // regular series map, 2 pairs
        0x00, 0x82, 0x0a, 0x14, // 0: [10, 20]
        0x03, 0x82, 0x19, 0x01, 0xf4, 0x22, // 3 (duration): [500, -3]
    ];
    assert_eq!(encode(&single_series_envelope(None)), expected);
}

#[test]
fn scenario_c_capacity_exceeded() {
    let report = single_series_envelope(None);
    let size = required_size(&report).unwrap();

    let mut small = vec![0u8; size - 1];
    assert_eq!(
        encode_analog_measurement(&report, &mut small),
        Err(EncodeError::CapacityExceeded)
    );

    let mut exact = vec![0u8; size];
    let encoded = encode_analog_measurement(&report, &mut exact).unwrap();
    assert_eq!(encoded.len(), size);
}

#[test]
fn optional_omission_changes_element_count() {
    let without = encode(&single_series_envelope(None));
    let with = encode(&single_series_envelope(Some(
        Params::from_slice(&[NameValuePair {
            name: String::from("temp"),
            value: AnyType::Float(21.5),
        }])
        .unwrap(),
    )));

    // The measurements array head sits right after the fixed 5-byte
    // envelope prefix; a present env-params grows the group by one element.
    assert_eq!(without[5], 0x84);
    assert_eq!(with[5], 0x85);
    assert!(with.len() > without.len());
}

#[test]
fn irregular_series_is_a_flat_pair_array() {
    let mut report = empty_envelope();
    report
        .measurements
        .push(MeasurementSeries {
            target: Target {
                id: String::from("T2"),
                config_params: None,
            },
            env_params: None,
            start_time: None,
            unit: Unit::Undefined,
            unit_multiple: UnitMultiple::Base,
            series: SeriesKind::Irregular(
                Vec::from_slice(&[
                    TimedValue {
                        time: Time::uint(1, UnitMultiple::Base),
                        value: NumericalValue::Int(-4),
                    },
                    TimedValue {
                        time: Time::uint(2, UnitMultiple::Base),
                        value: NumericalValue::Int(5),
                    },
                ])
                .unwrap(),
            ),
        })
        .unwrap();

    let expected = [
        0x83, 0x01, 0x82, 0x00, 0x22, // envelope prefix
        0x84, // target, unit, unit-multiple, series
        0x81, 0x62, b'T', b'2', // target ["T2"]
        0x00, // unit: undefined
        0x00, // unit-multiple: base
        0x84, // two interleaved (time, value) pairs
        0x82, 0x01, 0x00, 0x23, // [1, 0], -4
        0x82, 0x02, 0x00, 0x05, // [2, 0], 5
    ];
    assert_eq!(encode(&report), expected);
}

#[test]
fn boundary_count_at_max_encodes() {
    let mut values: Vec<NumericalValue, MAX_QTY> = Vec::new();
    for n in 0..MAX_QTY {
        values.push(NumericalValue::Int(n as i64)).unwrap();
    }
    // The bound is structural: a 21st element has nowhere to go.
    assert!(values.push(NumericalValue::Int(0)).is_err());

    let mut report = empty_envelope();
    report
        .measurements
        .push(MeasurementSeries {
            series: SeriesKind::Regular(RegularMeasurementSeries {
                values,
                spacing: IntervalFrequencyDuration::Duration(Time::uint(1, UnitMultiple::Base)),
            }),
            ..regular_series(None)
        })
        .unwrap();

    let encoded = encode(&report);
    assert_eq!(encoded.len(), required_size(&report).unwrap());
}

#[test]
fn encoding_is_deterministic() {
    let report = single_series_envelope(None);
    assert_eq!(encode(&report), encode(&report));
}
