//! Length-prefixed payload marshaling
//!
//! Records embed variable-length payloads as a fixed-size field pair in the
//! parent plus a child slot holding the data: strings as
//! `[length][pointer]` with a NUL-terminated payload, opaque blobs as a
//! lone relocated pointer with the size tracked by the caller's own field.

use bytemuck::{Pod, Zeroable};

use crate::error::ReloError;
use crate::tracker::Tracker;

/// In-image string reference: byte length (terminator excluded) followed by
/// a relocated pointer to the NUL-terminated payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct StringField {
    pub length: u32,
    pub data: u32,
}

impl StringField {
    pub const SIZE: usize = size_of::<Self>();
}

/// Write `text` as an embedded string of the current record.
///
/// The [`StringField`] at `field_offset` gets the target-endian byte length
/// (terminator excluded) and a relocation on its pointer half; a child slot
/// of `len + 1` bytes receives the text plus NUL terminator.
pub fn write_string(
    tracker: &mut Tracker,
    field_offset: usize,
    text: &str,
) -> Result<(), ReloError> {
    let bytes = text.as_bytes();
    let endianness = tracker.endianness();
    // Both halves of the field must fit before anything is written
    let slot_len = tracker.current().len();
    match field_offset.checked_add(StringField::SIZE) {
        Some(end) if end <= slot_len => {}
        _ => {
            return Err(ReloError::OffsetOutOfBounds {
                offset: field_offset,
                size: slot_len,
            });
        }
    }
    endianness.write_u32(tracker.current(), field_offset, bytes.len() as u32);
    tracker.scope(Some(field_offset + 4), 1, bytes.len() + 1, |t| {
        t.current()[..bytes.len()].copy_from_slice(bytes);
        // Terminator is already zero from allocation
        Ok(())
    })
}

/// Write `bytes` as an opaque child payload of the current record, wiring
/// the relocated pointer at `link_offset`.
pub fn write_blob(
    tracker: &mut Tracker,
    link_offset: usize,
    bytes: &[u8],
) -> Result<(), ReloError> {
    tracker.scope(Some(link_offset), 1, bytes.len(), |t| {
        t.current()[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    })
}
