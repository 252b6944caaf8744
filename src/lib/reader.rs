use std::io::{ErrorKind, Read};

use anyhow::Result;
use log::{debug, warn};

use crate::frame::{FrameAssembler, FrameError};
use crate::record::{RecordError, SensorReading};
use crate::sensors::Dispatcher;

/// One decoded record as handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The record text with the configured line ending appended.
    pub line: String,
    pub reading: std::result::Result<SensorReading, RecordError>,
}

/// Frame assembler and dispatcher glued together.
pub struct Decoder<'a> {
    assembler: FrameAssembler,
    dispatcher: Dispatcher<'a>,
    line_ending: String,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(FrameAssembler::new(), Dispatcher::default())
    }
}

impl<'a> Decoder<'a> {
    pub fn new(assembler: FrameAssembler, dispatcher: Dispatcher<'a>) -> Self {
        Self {
            assembler,
            dispatcher,
            line_ending: "\n".to_string(),
        }
    }

    pub fn with_line_ending(mut self, line_ending: &str) -> Self {
        self.line_ending = line_ending.to_string();
        self
    }

    /// Feed a chunk and decode every record it completes.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<std::result::Result<Decoded, FrameError>> {
        let dispatcher = self.dispatcher;
        let line_ending = &self.line_ending;

        self.assembler
            .feed(chunk)
            .map(|record| {
                record.map(|text| {
                    let reading = dispatcher.dispatch(&text);
                    if let Err(e) = &reading {
                        warn!("{}: {:?}", e, text);
                    }
                    Decoded {
                        line: text + line_ending,
                        reading,
                    }
                })
            })
            .collect()
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// Pull bytes from `source` until end of stream, handing every decoded
/// record (or framing error) to `sink`.
///
/// Read timeouts mean the instrument is idle and are not errors. A failing
/// sink is logged and does not stop the loop.
pub fn read_instrument<R, F>(source: &mut R, decoder: &mut Decoder, mut sink: F) -> Result<()>
where
    R: Read + ?Sized,
    F: FnMut(std::result::Result<Decoded, FrameError>) -> Result<()>,
{
    let mut buf = [0u8; 256];

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => {
                debug!("end of stream");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) if is_transient(e.kind()) => continue,
            Err(e) => return Err(e.into()),
        };

        for decoded in decoder.decode(&buf[..n]) {
            if let Err(e) = &decoded {
                warn!("{}", e);
            }
            if let Err(e) = sink(decoded) {
                warn!("sink failed: {:#}", e);
            }
        }
    }
}
