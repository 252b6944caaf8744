use super::{generic_with, resolve_unit, Result};
use crate::record::{RawRecord, SensorReading, SENSOR_UNIT};

pub const CODE: &str = "Cond";

/// A TetraCon probe measures one of four quantities; only the unit tells
/// which. Salinity is printed without a unit.
const UNITS: &[(&str, &str)] = &[
    ("µS/cm", "conductivity"),
    ("mS/cm", "conductivity"),
    ("Ω·cm", "resistivity"),
    ("kΩ·cm", "resistivity"),
    ("MΩ·cm", "resistivity"),
    ("", "salinity"),
    ("mg/l", "total_dissolved_solids"),
    ("g/l", "total_dissolved_solids"),
];

pub fn extract(record: &RawRecord) -> Result<SensorReading> {
    let quantity = resolve_unit(CODE, UNITS, record.field(SENSOR_UNIT)?)?;
    generic_with(record, quantity)
}
