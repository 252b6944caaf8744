use super::{resolve_unit, Result};
use crate::record::{
    RawRecord, SensorReading, DATE, INSTRUMENT, INSTRUMENT_ID, SENSOR_ID, SENSOR_INFO,
    SENSOR_NAME, SENSOR_UNIT, SENSOR_VALUE, TEMP_UNIT, TEMP_VALUE,
};

pub const CODE: &str = "Ox";

const UNITS: &[(&str, &str)] = &[
    ("mg/l", "dissolved_oxygen_concentration"),
    ("%", "dissolved_oxygen_saturation"),
    ("mbar", "dissolved_oxygen_partial_pressure"),
];

/// FDO probes print an extra `;` after the sensor info, so name and id sit
/// one column to the right. Concentration and saturation arrive as two
/// separate records.
pub fn extract(record: &RawRecord) -> Result<SensorReading> {
    let unit = record.field(SENSOR_UNIT)?;

    Ok(SensorReading {
        date: record.text(DATE)?,
        quantity: resolve_unit(CODE, UNITS, unit)?,
        value: record.text(SENSOR_VALUE)?,
        unit: unit.to_string(),
        temp: record.text(TEMP_VALUE)?,
        temp_unit: record.text(TEMP_UNIT)?,
        sensor_info: record.text(SENSOR_INFO)?,
        sensor_name: record.text(SENSOR_NAME + 1)?,
        sensor_id: record.text(SENSOR_ID + 1)?,
        instrument_name: record.text(INSTRUMENT)?,
        instrument_id: record.text(INSTRUMENT_ID)?,
    })
}
