mod conductivity;
mod oxygen;
mod turbidity;

use std::collections::HashMap;

use itertools::Itertools;
use lazy_static::lazy_static;
use log::debug;

use crate::record::{
    RawRecord, RecordError, SensorReading, DATE, INSTRUMENT, INSTRUMENT_ID, SENSOR_ID,
    SENSOR_INFO, SENSOR_NAME, SENSOR_UNIT, SENSOR_VALUE, TEMP_UNIT, TEMP_VALUE,
};

pub type Result<T> = std::result::Result<T, RecordError>;

/// Turns a record of one sensor type into a [`SensorReading`].
pub type Extractor = fn(&RawRecord) -> Result<SensorReading>;

/// Quantity code → extractor table. Filled at construction, read-only
/// afterwards.
#[derive(Clone)]
pub struct Registry {
    extractors: HashMap<&'static str, Extractor>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    pub fn with(mut self, code: &'static str, extractor: Extractor) -> Self {
        self.extractors.insert(code, extractor);
        self
    }

    pub fn get(&self, code: &str) -> Option<Extractor> {
        self.extractors.get(code).copied()
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.extractors.keys().copied().sorted().collect()
    }
}

impl Default for Registry {
    /// Every sensor type whose layout deviates from the generic one.
    fn default() -> Self {
        Self::empty()
            .with(turbidity::CODE, turbidity::extract)
            .with(conductivity::CODE, conductivity::extract)
            .with(oxygen::CODE, oxygen::extract)
    }
}

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::default();
}

/// Routes each record to the extractor registered for its quantity code,
/// or to [`generic`] when there is none.
#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
}

impl Default for Dispatcher<'static> {
    fn default() -> Self {
        Self::new(&REGISTRY)
    }
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn dispatch(&self, line: &str) -> Result<SensorReading> {
        let record = RawRecord::parse(line);
        let code = record.quantity_code()?;

        match self.registry.get(code) {
            Some(extract) => extract(&record),
            None => {
                debug!("no extractor for {:?}, using generic layout", code);
                generic(&record)
            }
        }
    }
}

/// Parse one decoded line with the default registry.
pub fn parse_sensor(line: &str) -> Result<SensorReading> {
    Dispatcher::default().dispatch(line)
}

/// Reads every field at its nominal position. The quantity is the raw code.
pub fn generic(record: &RawRecord) -> Result<SensorReading> {
    generic_with(record, record.quantity_code()?.to_string())
}

/// Nominal layout with the quantity already resolved.
fn generic_with(record: &RawRecord, quantity: String) -> Result<SensorReading> {
    Ok(SensorReading {
        date: record.text(DATE)?,
        quantity,
        value: record.text(SENSOR_VALUE)?,
        unit: record.text(SENSOR_UNIT)?,
        temp: record.text(TEMP_VALUE)?,
        temp_unit: record.text(TEMP_UNIT)?,
        sensor_info: record.text(SENSOR_INFO)?,
        sensor_name: record.text(SENSOR_NAME)?,
        sensor_id: record.text(SENSOR_ID)?,
        instrument_name: record.text(INSTRUMENT)?,
        instrument_id: record.text(INSTRUMENT_ID)?,
    })
}

/// Look `unit` up in a sensor's unit table.
fn resolve_unit(code: &str, table: &[(&str, &str)], unit: &str) -> Result<String> {
    table
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, quantity)| quantity.to_string())
        .ok_or_else(|| RecordError::UnrecognizedUnit {
            code: code.to_string(),
            unit: unit.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const TURBIDITY: &str = "Multi 3630 IDS; 19410634;1;29.04.2020 10:35:33;414.3;FNU;TRB;;;;;;;VisoTurb 900-P; 19B103894;";
    pub const PH: &str = "Multi 3630 IDS; 19410634;1;29.04.2020 10:35:34;7.702;;pH;16.6;°C;Temp;;100%;;SenTix 940; C200817020;";
    pub const CONDUCTIVITY: &str = "Multi 3630 IDS; 19410634;1;29.04.2020 10:35:34;183.9;µS/cm;Cond;16.5;°C;Temp;AR;;C = 0.475 1/cm   Tref25   nLF;TetraCon 925; 19411430;";
    pub const OXYGEN_SATURATION: &str = "Multi 3630 IDS; 19410634;;15.04.2020 11:03:48;97.0;%;Ox;19.4;°C;Temp;AR;;SC-FDO   19391671;;FDO 925; 19411244;";
    pub const OXYGEN_CONCENTRATION: &str = "Multi 3630 IDS; 19410634;;15.04.2020 11:03:48;8.74;mg/l;Ox;19.4;°C;Temp;AR;;SC-FDO   19391671;;FDO 925; 19411244;";

    const ALL: [&str; 5] = [
        TURBIDITY,
        PH,
        CONDUCTIVITY,
        OXYGEN_SATURATION,
        OXYGEN_CONCENTRATION,
    ];

    fn parse_all() -> Vec<SensorReading> {
        ALL.iter().map(|line| parse_sensor(line).unwrap()).collect()
    }

    #[test]
    fn instrument_names() {
        assert!(parse_all()
            .iter()
            .all(|r| r.instrument_name == "Multi 3630 IDS" && r.instrument_id == " 19410634"));
    }

    #[test]
    fn quantities() {
        let quantities: Vec<_> = parse_all().into_iter().map(|r| r.quantity).collect();
        assert_eq!(
            quantities,
            [
                "turbidity",
                "pH",
                "conductivity",
                "dissolved_oxygen_saturation",
                "dissolved_oxygen_concentration"
            ]
        );
    }

    #[test]
    fn values_and_units() {
        let readings = parse_all();
        let values: Vec<_> = readings.iter().map(|r| r.value.as_str()).collect();
        let units: Vec<_> = readings.iter().map(|r| r.unit.as_str()).collect();

        assert_eq!(values, ["414.3", "7.702", "183.9", "97.0", "8.74"]);
        assert_eq!(units, ["FNU", "", "µS/cm", "%", "mg/l"]);
    }

    #[test]
    fn temperatures() {
        let temps: Vec<_> = parse_all().into_iter().map(|r| r.temp).collect();
        assert_eq!(temps, ["", "16.6", "16.5", "19.4", "19.4"]);
    }

    #[test]
    fn unknown_code_uses_generic_layout() {
        let reading = parse_sensor(PH).unwrap();
        assert_eq!(reading.quantity, "pH");
        assert_eq!(reading.temp_unit, "°C");
        assert_eq!(reading.sensor_info, "");
        assert_eq!(reading.sensor_name, "SenTix 940");
        assert_eq!(reading.sensor_id, " C200817020");
    }

    #[test]
    fn generic_reports_short_record() {
        assert_eq!(
            parse_sensor("Multi 3630 IDS; 19410634;;date;1.0;u;X;20.0;°C"),
            Err(RecordError::FieldIndex {
                index: SENSOR_INFO,
                fields: 9
            })
        );
    }

    #[test]
    fn malformed_record() {
        assert_eq!(
            parse_sensor(""),
            Err(RecordError::MalformedRecord { fields: 1 })
        );
        assert_eq!(
            parse_sensor("a;b;c;d;e;f"),
            Err(RecordError::MalformedRecord { fields: 6 })
        );
    }

    #[test]
    fn substituted_registry() {
        fn fixed(_: &RawRecord) -> Result<SensorReading> {
            Ok(SensorReading {
                quantity: "fixed".to_string(),
                ..Default::default()
            })
        }

        let registry = Registry::empty().with("pH", fixed);
        let dispatcher = Dispatcher::new(&registry);

        assert_eq!(dispatcher.dispatch(PH).unwrap().quantity, "fixed");
        // without the default entries TRB falls back to the generic layout
        assert_eq!(dispatcher.dispatch(TURBIDITY).unwrap().quantity, "TRB");
    }

    #[test]
    fn default_codes() {
        assert_eq!(REGISTRY.codes(), ["Cond", "Ox", "TRB"]);
    }
}
