use std::fs::File;
use std::io;
use std::path::Path;

use heapless::{String, Vec};
use log::debug;

use gauger_shared::model::{
    AnalogMeasurement, AnyType, IntervalFrequencyDuration, MeasurementSeries, NameValuePair,
    NumericalValue, Params, RegularMeasurementSeries, SeriesKind, Target, Time, Unit,
    UnitElectrical, UnitMultiple, MAX_QTY,
};

/// Load a session description from a JSON file.
pub fn load(path: &Path) -> io::Result<AnalogMeasurement> {
    let file = File::open(path)?;
    let report = serde_json::from_reader(file)?;
    debug!("loaded session from {}", path.display());
    Ok(report)
}

fn pair(name: &str, value: AnyType) -> NameValuePair {
    NameValuePair {
        name: String::from(name),
        value,
    }
}

/// A canned session to start from: one duration-spaced sample run per
/// probe pin, the probe configuration carried as config params.
pub fn example() -> AnalogMeasurement {
    let config = Params::from_slice(&[
        pair("test_pin", AnyType::Int(7)),
        pair("test_pin_bank", AnyType::Int(1)),
        pair("op_pin", AnyType::Int(4)),
        pair("op_pin_bank", AnyType::Int(0)),
    ])
    .unwrap();

    let samples: Vec<NumericalValue, MAX_QTY> = [118, 231, 447, 580]
        .iter()
        .map(|&raw| NumericalValue::Int(raw))
        .collect();

    let series = MeasurementSeries {
        target: Target {
            id: String::from("pin-a7"),
            config_params: Some(config),
        },
        env_params: None,
        start_time: None,
        unit: Unit::Electrical(UnitElectrical::Voltage),
        unit_multiple: UnitMultiple::Milli,
        series: SeriesKind::Regular(RegularMeasurementSeries {
            values: samples,
            spacing: IntervalFrequencyDuration::Duration(Time::uint(500, UnitMultiple::Milli)),
        }),
    };

    AnalogMeasurement {
        version_tag: 1,
        start_time: Time::uint(0, UnitMultiple::Milli),
        measurements: Vec::from_slice(&[series]).unwrap(),
    }
}
