use std::fmt::Display;

use thiserror::Error;

pub const INSTRUMENT: usize = 0;
pub const INSTRUMENT_ID: usize = 1;
pub const SAMPLE_ID: usize = 2;
pub const DATE: usize = 3;
pub const SENSOR_VALUE: usize = 4;
pub const SENSOR_UNIT: usize = 5;
pub const SENSOR_QUANTITY: usize = 6;
pub const TEMP_VALUE: usize = 7;
pub const TEMP_UNIT: usize = 8;
pub const TEMP: usize = 9;
pub const AUTOREAD: usize = 10;
pub const CALIBRATION: usize = 11;
pub const SENSOR_INFO: usize = 12;
pub const SENSOR_NAME: usize = 13;
pub const SENSOR_ID: usize = 14;

pub const FIELD_DELIMITER: char = ';';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("malformed record: {fields} field(s), no quantity code")]
    MalformedRecord { fields: usize },
    #[error("field {index} missing, record has {fields} field(s)")]
    FieldIndex { index: usize, fields: usize },
    #[error("unrecognized unit {unit:?} for {code} sensor")]
    UnrecognizedUnit { code: String, unit: String },
}

/// One decoded record split into its `;` separated fields.
///
/// Trailing empty fields are kept; an instrument line ends with `;`, so the
/// last field is normally empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    fields: Vec<&'a str>,
}

// splitting always yields at least one field
#[allow(clippy::len_without_is_empty)]
impl<'a> RawRecord<'a> {
    pub fn parse(line: &'a str) -> Self {
        RawRecord {
            fields: line.split(FIELD_DELIMITER).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Result<&'a str, RecordError> {
        self.fields
            .get(index)
            .copied()
            .ok_or(RecordError::FieldIndex {
                index,
                fields: self.fields.len(),
            })
    }

    /// Owned copy of a field, for building a [`SensorReading`].
    pub fn text(&self, index: usize) -> Result<String, RecordError> {
        self.field(index).map(str::to_string)
    }

    pub fn quantity_code(&self) -> Result<&'a str, RecordError> {
        self.fields
            .get(SENSOR_QUANTITY)
            .copied()
            .ok_or(RecordError::MalformedRecord {
                fields: self.fields.len(),
            })
    }
}

/// A measurement in the layout shared by every sensor type.
///
/// Values are passed through as the instrument printed them, without
/// number parsing or unit conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorReading {
    pub date: String,
    pub quantity: String,
    pub value: String,
    pub unit: String,
    pub temp: String,
    pub temp_unit: String,
    pub sensor_info: String,
    pub sensor_name: String,
    pub sensor_id: String,
    pub instrument_name: String,
    pub instrument_id: String,
}

impl SensorReading {
    /// Field names and values in output order.
    pub fn fields(&self) -> [(&'static str, &str); 11] {
        [
            ("date", self.date.as_str()),
            ("quantity", self.quantity.as_str()),
            ("value", self.value.as_str()),
            ("unit", self.unit.as_str()),
            ("temp", self.temp.as_str()),
            ("temp_unit", self.temp_unit.as_str()),
            ("sensor_info", self.sensor_info.as_str()),
            ("sensor_name", self.sensor_name.as_str()),
            ("sensor_id", self.sensor_id.as_str()),
            ("instrument_name", self.instrument_name.as_str()),
            ("instrument_id", self.instrument_id.as_str()),
        ]
    }

    pub fn to_json(&self) -> json::JsonValue {
        let mut obj = json::JsonValue::new_object();
        for (key, value) in self.fields() {
            obj[key] = value.into();
        }
        obj
    }
}

impl Display for SensorReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date, self.quantity, self.value, self.unit
        )?;
        if !self.temp.is_empty() {
            write!(f, " @ {} {}", self.temp, self.temp_unit)?;
        }
        write!(f, " [{}{}]", self.sensor_name, self.sensor_id)
    }
}
