use super::Result;
use crate::record::{
    RawRecord, SensorReading, DATE, INSTRUMENT, INSTRUMENT_ID, SENSOR_ID, SENSOR_NAME,
    SENSOR_UNIT, SENSOR_VALUE,
};

pub const CODE: &str = "TRB";

/// VisoTurb probes report neither temperature nor sensor info; those
/// columns are present but always empty.
pub fn extract(record: &RawRecord) -> Result<SensorReading> {
    Ok(SensorReading {
        date: record.text(DATE)?,
        quantity: "turbidity".to_string(),
        value: record.text(SENSOR_VALUE)?,
        unit: record.text(SENSOR_UNIT)?,
        temp: String::new(),
        temp_unit: String::new(),
        sensor_info: String::new(),
        sensor_name: record.text(SENSOR_NAME)?,
        sensor_id: record.text(SENSOR_ID)?,
        instrument_name: record.text(INSTRUMENT)?,
        instrument_id: record.text(INSTRUMENT_ID)?,
    })
}
