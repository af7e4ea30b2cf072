//! Frame encoding and the byte-level receive state machine.
//!
//! Frame format:
//! - SYNC (3 bytes): fixed synchronization marker
//! - COMMAND (1 byte): command identifier
//! - PAYLOAD (fixed length): command-specific data, length from the
//!   static table in [`Command::payload_len`]

use heapless::Vec;

use crate::command::{Command, MAX_PAYLOAD_LEN, SYNC};

/// Maximum complete frame size (SYNC + COMMAND + largest payload).
pub const MAX_FRAME_LEN: usize = SYNC.len() + 1 + MAX_PAYLOAD_LEN;

/// Errors that can occur while building a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload length does not match the command's fixed length.
    PayloadLength,
    /// Output buffer too small for the encoded frame.
    BufferTooSmall,
}

/// One complete protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier.
    pub command: Command,
    /// Payload bytes, exactly `command.payload_len()` long.
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Frame {
    /// Create a frame, checking the payload against the command's table.
    pub fn new(command: Command, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() != command.payload_len() {
            return Err(FrameError::PayloadLength);
        }
        let mut buf = Vec::new();
        buf.extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadLength)?;
        Ok(Self {
            command,
            payload: buf,
        })
    }

    /// Encode this frame into `buf`, returning the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        encode_frame(self.command, &self.payload, buf)
    }
}

/// Encode a frame (sync marker + command id + payload) into `buf`.
///
/// Returns the number of bytes written.
pub fn encode_frame(
    command: Command,
    payload: &[u8],
    buf: &mut [u8],
) -> Result<usize, FrameError> {
    if payload.len() != command.payload_len() {
        return Err(FrameError::PayloadLength);
    }
    let total = SYNC.len() + 1 + payload.len();
    if buf.len() < total {
        return Err(FrameError::BufferTooSmall);
    }
    buf[..SYNC.len()].copy_from_slice(&SYNC);
    buf[SYNC.len()] = command.id();
    buf[SYNC.len() + 1..total].copy_from_slice(payload);
    Ok(total)
}

/// Outcome of feeding one byte to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserEvent {
    /// Byte consumed, no complete frame yet.
    None,
    /// A complete frame was reassembled; the parser has reset.
    Frame(Frame),
    /// Unexpected byte while hunting for the sync marker. Incidental
    /// text from the peer, not an error; forward it to the log sink.
    Stray(u8),
    /// Byte after a full sync match was not a known command identifier.
    UnknownCommand(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the first sync byte.
    Sync0,
    /// Matched sync0, waiting for the second sync byte.
    Sync1,
    /// Matched sync0..1, waiting for the third sync byte.
    Sync2,
    /// Full sync matched, waiting for the command identifier.
    CommandId,
    /// Accumulating the command's fixed-length payload.
    Payload(Command),
}

/// State machine that reassembles frames from a byte stream.
///
/// Any unexpected byte abandons the current frame and returns the machine
/// to [`ParseState::Sync0`]; a fresh full 3-byte sync match is then
/// required before the next frame is accepted.
#[derive(Debug)]
pub struct FrameParser {
    state: ParseState,
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::Sync0,
            payload: Vec::new(),
        }
    }

    /// Abandon any partial frame and hunt for the sync marker again.
    pub fn reset(&mut self) {
        self.state = ParseState::Sync0;
        self.payload.clear();
    }

    /// Feed a single received byte.
    pub fn feed(&mut self, byte: u8) -> ParserEvent {
        match self.state {
            ParseState::Sync0 => {
                if byte == SYNC[0] {
                    self.state = ParseState::Sync1;
                    ParserEvent::None
                } else {
                    ParserEvent::Stray(byte)
                }
            }
            ParseState::Sync1 => {
                if byte == SYNC[1] {
                    self.state = ParseState::Sync2;
                    ParserEvent::None
                } else {
                    self.reset();
                    ParserEvent::Stray(byte)
                }
            }
            ParseState::Sync2 => {
                if byte == SYNC[2] {
                    self.state = ParseState::CommandId;
                    ParserEvent::None
                } else {
                    self.reset();
                    ParserEvent::Stray(byte)
                }
            }
            ParseState::CommandId => match Command::try_from(byte) {
                Ok(command) => {
                    self.payload.clear();
                    self.state = ParseState::Payload(command);
                    ParserEvent::None
                }
                Err(_) => {
                    self.reset();
                    ParserEvent::UnknownCommand(byte)
                }
            },
            ParseState::Payload(command) => {
                // Cannot overflow: payload_len() <= MAX_PAYLOAD_LEN.
                let _ = self.payload.push(byte);
                if self.payload.len() == command.payload_len() {
                    let frame = Frame {
                        command,
                        payload: self.payload.clone(),
                    };
                    self.reset();
                    ParserEvent::Frame(frame)
                } else {
                    ParserEvent::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec as StdVec;

    use super::*;
    use crate::command::LINK_MODE_LEN;

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> StdVec<ParserEvent> {
        bytes
            .iter()
            .map(|&b| parser.feed(b))
            .filter(|e| *e != ParserEvent::None)
            .collect()
    }

    #[test]
    fn test_encode_layout() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(Command::LinkMode, &[2], &mut buf).unwrap();
        assert_eq!(len, SYNC.len() + 1 + LINK_MODE_LEN);
        assert_eq!(&buf[..3], &SYNC);
        assert_eq!(buf[3], Command::LinkMode.id());
        assert_eq!(buf[4], 2);
    }

    #[test]
    fn test_encode_rejects_wrong_payload_len() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        assert_eq!(
            encode_frame(Command::Battery, &[1, 2, 3], &mut buf),
            Err(FrameError::PayloadLength)
        );
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(
            encode_frame(Command::Battery, &[1, 2, 3, 4], &mut buf),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_parse_single_frame() {
        let payload = [0x10, 0x20, 0x30, 0x40];
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(Command::Battery, &payload, &mut buf).unwrap();

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &buf[..len]);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ParserEvent::Frame(frame) => {
                assert_eq!(frame.command, Command::Battery);
                assert_eq!(&frame.payload[..], &payload);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_resets_then_recovers() {
        let mut parser = FrameParser::new();

        // Full sync then a bogus command id: no frame, one warning event.
        let mut events = feed_all(&mut parser, &[SYNC[0], SYNC[1], SYNC[2], 0x7E]);
        assert_eq!(events, [ParserEvent::UnknownCommand(0x7E)]);

        // A valid frame appended immediately after still parses.
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(Command::LinkMode, &[1], &mut buf).unwrap();
        events = feed_all(&mut parser, &buf[..len]);
        assert!(matches!(events[..], [ParserEvent::Frame(_)]));
    }

    #[test]
    fn test_corrupt_sync_requires_fresh_match() {
        let mut parser = FrameParser::new();

        // Two good sync bytes, then corruption.
        assert_eq!(parser.feed(SYNC[0]), ParserEvent::None);
        assert_eq!(parser.feed(SYNC[1]), ParserEvent::None);
        assert_eq!(parser.feed(0x00), ParserEvent::Stray(0x00));

        // A partial continuation must not complete the marker.
        assert_eq!(parser.feed(SYNC[2]), ParserEvent::Stray(SYNC[2]));

        // Only a fresh full marker gets back to the command state.
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(Command::LinkMode, &[0], &mut buf).unwrap();
        let events = feed_all(&mut parser, &buf[..len]);
        assert!(matches!(events[..], [ParserEvent::Frame(_)]));
    }

    #[test]
    fn test_stray_text_between_frames() {
        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, b"boot ok\r\n");
        assert_eq!(events.len(), 9);
        assert!(events.iter().all(|e| matches!(e, ParserEvent::Stray(_))));
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut stream = StdVec::new();
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(Command::LinkMode, &[1], &mut buf).unwrap();
        stream.extend_from_slice(&buf[..len]);
        let len = encode_frame(Command::Battery, &3300u32.to_le_bytes(), &mut buf).unwrap();
        stream.extend_from_slice(&buf[..len]);

        let mut parser = FrameParser::new();
        let events = feed_all(&mut parser, &stream);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            ParserEvent::Frame(f) if f.command == Command::LinkMode
        ));
        assert!(matches!(
            &events[1],
            ParserEvent::Frame(f) if f.command == Command::Battery
        ));
    }
}
