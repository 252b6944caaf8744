//! Decoder for the text protocol a WTW MultiLine IDS meter prints over its
//! serial interface.
//!
//! Bytes go into a [`frame::FrameAssembler`], which cuts them into CR LF
//! terminated records. Each record is handed to a [`sensors::Dispatcher`],
//! which picks the extractor registered for the record's quantity code and
//! produces a [`record::SensorReading`].

pub mod frame;
pub mod port;
pub mod reader;
pub mod record;
pub mod sensors;

pub use frame::{FrameAssembler, FrameError};
pub use reader::{read_instrument, Decoded, Decoder};
pub use record::{RawRecord, RecordError, SensorReading};
pub use sensors::{parse_sensor, Dispatcher, Registry};
