//! Nether-Relo: relocatable binary image builder
//!
//! Asset compilers build pointer-linked record graphs in memory - a fixed
//! header plus nested variable-length payloads such as strings - and then
//! need the whole graph as one contiguous buffer a runtime loader can drop
//! at any base address. This crate provides that flattening step:
//!
//! - [`Arena`]: independently allocated, zero-initialized slots, one per
//!   record, addressed by index
//! - [`Tracker`]: a scope stack of "current record" plus the pending fixups
//!   (internal relocations and externally resolved imports) recorded while
//!   the graph is built
//! - [`Chunk`]: the finalized image - instance bytes, relocation table,
//!   import table - in the target console's byte order
//! - [`marshal`]: length-prefixed string and blob payload helpers
//!
//! # Image format
//!
//! `finalize` concatenates every slot in allocation order and rewrites each
//! recorded fixup location with the final offset of its target (relocations)
//! or the caller-supplied value (imports). Each fixup also contributes one
//! 4-byte source-offset entry to its table; tables are terminated with
//! `0xFFFF_FFFF` and are completely empty (not even the sentinel) when no
//! fixup of that kind exists. All offsets are relative to the start of the
//! instance buffer, so a loader patches pointers by adding its load address.
//!
//! # Usage
//!
//! ```
//! use nether_bits::Endianness;
//! use nether_relo::{Tracker, marshal};
//!
//! // 12-byte header: [flags u32][string length u32][string data ptr u32]
//! let mut tracker = Tracker::new(12, Endianness::Little).unwrap();
//! marshal::write_string(&mut tracker, 4, "abc").unwrap();
//! let chunk = tracker.finalize().unwrap();
//!
//! assert_eq!(chunk.instance.len(), 16); // 12-byte header + "abc\0"
//! assert_eq!(chunk.relocation_offsets(), vec![8]);
//! assert_eq!(&chunk.instance[8..12], &12u32.to_le_bytes()); // patched
//! assert_eq!(&chunk.instance[12..16], b"abc\0");
//! ```

mod arena;
mod chunk;
mod error;
mod tracker;

pub mod marshal;

pub use arena::Arena;
pub use chunk::{Chunk, TABLE_SENTINEL};
pub use error::ReloError;
pub use marshal::StringField;
pub use tracker::Tracker;
