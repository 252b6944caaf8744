use encoding_rs::WINDOWS_1252;
use log::debug;
use thiserror::Error;

/// Record terminator sent by the instrument.
pub const CRLF: [u8; 2] = *b"\r\n";

/// Byte values left undefined by Windows-1252.
const UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("byte 0x{byte:02X} at offset {offset} is not valid Windows-1252")]
    Decode { byte: u8, offset: usize },
    #[error("{len} bytes buffered without a terminator (limit {limit})")]
    Overflow { len: usize, limit: usize },
}

/// Cuts an unframed byte stream into decoded text records.
///
/// Chunks may be split anywhere, including between the two terminator
/// bytes. Unterminated bytes stay buffered until a later [`feed`] completes
/// them.
///
/// [`feed`]: FrameAssembler::feed
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    terminator: [u8; 2],
    max_len: Option<usize>,
    // buffer prefix already known to hold no terminator
    searched: usize,
    // rest of an overflowed record is dropped up to its terminator
    discarding: bool,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_terminator(CRLF)
    }

    pub fn with_terminator(terminator: [u8; 2]) -> Self {
        Self {
            buffer: Vec::new(),
            terminator,
            max_len: None,
            searched: 0,
            discarding: false,
        }
    }

    /// Bound the number of bytes held while waiting for a terminator.
    /// Exceeding it yields [`FrameError::Overflow`], drops the buffer and
    /// skips everything up to the next terminator.
    pub fn with_max_len(mut self, limit: usize) -> Self {
        self.max_len = Some(limit);
        self
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append `chunk` and iterate over every record it completes, in
    /// arrival order.
    ///
    /// Records left unconsumed when the iterator is dropped are returned by
    /// the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Records<'_> {
        debug!("feed {} bytes: {:02x?}", chunk.len(), chunk);
        self.buffer.extend_from_slice(chunk);
        Records { assembler: self }
    }

    /// Take the next complete record out of the buffer, if any.
    pub fn next_record(&mut self) -> Option<Result<String, FrameError>> {
        loop {
            // a terminator may straddle the searched prefix and the new bytes
            let start = self.searched.saturating_sub(1);
            let found = self.buffer[start..]
                .windows(2)
                .position(|w| w == self.terminator.as_slice());

            match found {
                Some(pos) => {
                    let eol = start + pos;
                    let line: Vec<u8> = self.buffer.drain(..eol + 2).take(eol).collect();
                    self.searched = 0;

                    if self.discarding {
                        debug!("dropped {} bytes of an overflowed record", line.len());
                        self.discarding = false;
                        continue;
                    }
                    return Some(decode(&line));
                }
                None => {
                    self.searched = self.buffer.len();
                    return self.check_overflow().map(Err);
                }
            }
        }
    }

    fn check_overflow(&mut self) -> Option<FrameError> {
        if self.discarding {
            self.drop_buffered();
            return None;
        }

        let limit = self.max_len?;
        let len = self.buffer.len();
        if len <= limit {
            return None;
        }

        self.drop_buffered();
        self.discarding = true;

        Some(FrameError::Overflow { len, limit })
    }

    fn drop_buffered(&mut self) {
        // keep a possible first half of the terminator
        let keep = match self.buffer.last() {
            Some(&b) if b == self.terminator[0] => 1,
            _ => 0,
        };
        let len = self.buffer.len();
        self.buffer.drain(..len - keep);
        self.searched = 0;
    }
}

/// Records completed by one [`FrameAssembler::feed`] call.
pub struct Records<'a> {
    assembler: &'a mut FrameAssembler,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<String, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_record()
    }
}

fn decode(bytes: &[u8]) -> Result<String, FrameError> {
    if let Some(offset) = bytes.iter().position(|b| UNDEFINED.contains(b)) {
        return Err(FrameError::Decode {
            byte: bytes[offset],
            offset,
        });
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Ok(text.into_owned())
}
