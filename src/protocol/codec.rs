//! Frame encoding and decoding
//!
//! ```text
//! +--------+----------------+---------------------+
//! | type   | length (u32 BE)| payload (length B)  |
//! +--------+----------------+---------------------+
//! ```
//!
//! Metadata is encoded as a presence byte followed, when present, by a
//! `u16` entry count and length-prefixed UTF-8 keys and values. "No
//! metadata" and "empty metadata" are distinct on the wire because the
//! auth gate treats them differently.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::auth::Metadata;
use crate::error::ProtocolError;
use crate::reading::{Reading, Timestamp};

use super::constants::*;
use super::message::{Message, StatusCode};

/// Append one encoded frame to `dst`
pub fn encode(msg: &Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    let start = dst.len();
    dst.put_u8(msg.type_id());
    dst.put_u32(0); // length, patched below

    let written = match msg {
        Message::Push { metadata, reading } => {
            put_metadata(dst, metadata.as_ref())
                .map(|_| put_reading(dst, reading))
        }
        Message::Subscribe { metadata, filter } => {
            put_metadata(dst, metadata.as_ref()).map(|_| dst.put_slice(filter))
        }
        Message::Ack => Ok(()),
        Message::Reading(reading) => {
            put_reading(dst, reading);
            Ok(())
        }
        Message::Status { code, message } => {
            dst.put_u8(code.as_u8());
            dst.put_slice(message.as_bytes());
            Ok(())
        }
    };

    if let Err(e) = written {
        dst.truncate(start);
        return Err(e);
    }

    let len = dst.len() - start - FRAME_HEADER_SIZE;
    let len = match u32::try_from(len) {
        Ok(len) => len,
        Err(_) => {
            dst.truncate(start);
            return Err(ProtocolError::FrameTooLarge {
                size: len,
                max: u32::MAX as usize,
            });
        }
    };
    dst[start + 1..start + FRAME_HEADER_SIZE].copy_from_slice(&len.to_be_bytes());

    Ok(())
}

/// Decode one frame from the front of `src`
///
/// Returns `Ok(None)` without consuming anything if the frame is not
/// complete yet.
pub fn decode(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Message>, ProtocolError> {
    if src.len() < FRAME_HEADER_SIZE {
        return Ok(None);
    }

    let msg_type = src[0];
    let len = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;

    if len > max_frame_size {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }

    let frame_len = FRAME_HEADER_SIZE + len;
    if src.len() < frame_len {
        src.reserve(frame_len - src.len());
        return Ok(None);
    }

    src.advance(FRAME_HEADER_SIZE);
    let mut payload = src.split_to(len).freeze();

    decode_payload(msg_type, &mut payload).map(Some)
}

fn decode_payload(msg_type: u8, payload: &mut Bytes) -> Result<Message, ProtocolError> {
    let msg = match msg_type {
        MSG_PUSH => {
            let metadata = get_metadata(payload)?;
            let reading = get_reading(payload, "push")?;
            Message::Push { metadata, reading }
        }
        MSG_SUBSCRIBE => {
            let metadata = get_metadata(payload)?;
            let filter = payload.split_to(payload.len());
            Message::Subscribe { metadata, filter }
        }
        MSG_ACK => Message::Ack,
        MSG_READING => Message::Reading(get_reading(payload, "reading")?),
        MSG_STATUS => {
            if !payload.has_remaining() {
                return Err(ProtocolError::Malformed("status"));
            }
            let code = StatusCode::from_u8(payload.get_u8())?;
            let message = String::from_utf8(payload.split_to(payload.len()).to_vec())
                .map_err(|_| ProtocolError::InvalidUtf8("status message"))?;
            Message::Status { code, message }
        }
        other => return Err(ProtocolError::UnknownMessageType(other)),
    };

    if payload.has_remaining() {
        return Err(ProtocolError::Malformed(msg.name()));
    }

    Ok(msg)
}

fn put_reading(dst: &mut BytesMut, reading: &Reading) {
    dst.put_f64(reading.value);
    dst.put_i64(reading.timestamp.seconds);
    dst.put_u32(reading.timestamp.nanos);
}

fn get_reading(src: &mut Bytes, what: &'static str) -> Result<Reading, ProtocolError> {
    if src.remaining() < READING_SIZE {
        return Err(ProtocolError::Malformed(what));
    }

    let value = src.get_f64();
    let seconds = src.get_i64();
    let nanos = src.get_u32();
    if nanos >= 1_000_000_000 {
        return Err(ProtocolError::Malformed(what));
    }

    Ok(Reading::new(value, Timestamp { seconds, nanos }))
}

fn put_metadata(dst: &mut BytesMut, metadata: Option<&Metadata>) -> Result<(), ProtocolError> {
    let Some(metadata) = metadata else {
        dst.put_u8(0);
        return Ok(());
    };

    let count = u16::try_from(metadata.len()).map_err(|_| ProtocolError::Malformed("metadata"))?;
    dst.put_u8(1);
    dst.put_u16(count);
    for (key, value) in metadata.iter() {
        put_string(dst, key)?;
        put_string(dst, value)?;
    }

    Ok(())
}

fn get_metadata(src: &mut Bytes) -> Result<Option<Metadata>, ProtocolError> {
    if !src.has_remaining() {
        return Err(ProtocolError::Malformed("metadata"));
    }

    match src.get_u8() {
        0 => Ok(None),
        1 => {
            if src.remaining() < 2 {
                return Err(ProtocolError::Malformed("metadata"));
            }
            let count = src.get_u16();
            let mut metadata = Metadata::new();
            for _ in 0..count {
                let key = get_string(src, "metadata key")?;
                let value = get_string(src, "metadata value")?;
                metadata.insert(key, value);
            }
            Ok(Some(metadata))
        }
        _ => Err(ProtocolError::Malformed("metadata")),
    }
}

fn put_string(dst: &mut BytesMut, s: &str) -> Result<(), ProtocolError> {
    let len = u16::try_from(s.len()).map_err(|_| ProtocolError::Malformed("metadata"))?;
    dst.put_u16(len);
    dst.put_slice(s.as_bytes());
    Ok(())
}

fn get_string(src: &mut Bytes, what: &'static str) -> Result<String, ProtocolError> {
    if src.remaining() < 2 {
        return Err(ProtocolError::Malformed("metadata"));
    }
    let len = src.get_u16() as usize;
    if src.remaining() < len {
        return Err(ProtocolError::Malformed("metadata"));
    }
    String::from_utf8(src.split_to(len).to_vec()).map_err(|_| ProtocolError::InvalidUtf8(what))
}
