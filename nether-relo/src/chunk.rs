//! Finalized relocatable image buffers

use nether_bits::Endianness;

/// Terminates a non-empty relocation or import table. Reads the same in
/// either byte order.
pub const TABLE_SENTINEL: u32 = 0xFFFF_FFFF;

/// The three loader-facing buffers produced by
/// [`Tracker::finalize`](crate::Tracker::finalize).
///
/// The instance buffer is already self-consistent - every fixup location
/// holds its resolved value - so a loader that places it at offset zero can
/// use it as-is; one that relocates it walks the tables and adds its base
/// address at each listed offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    endianness: Endianness,
    /// Concatenated slot bytes; length is a multiple of 4.
    pub instance: Vec<u8>,
    /// 4-byte source offsets of intra-image pointers, sentinel-terminated;
    /// empty when the image has no pointers.
    pub relocations: Vec<u8>,
    /// 4-byte source offsets of externally resolved values,
    /// sentinel-terminated; empty when the image has no imports.
    pub imports: Vec<u8>,
}

impl Chunk {
    pub(crate) fn new(
        endianness: Endianness,
        instance: Vec<u8>,
        relocations: Vec<u8>,
        imports: Vec<u8>,
    ) -> Self {
        Self {
            endianness,
            instance,
            relocations,
            imports,
        }
    }

    /// Byte order the buffers were emitted in.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Source offsets listed in the relocation table, sentinel excluded.
    pub fn relocation_offsets(&self) -> Vec<u32> {
        walk_table(&self.relocations, self.endianness)
    }

    /// Source offsets listed in the import table, sentinel excluded.
    pub fn import_offsets(&self) -> Vec<u32> {
        walk_table(&self.imports, self.endianness)
    }
}

/// Collect table entries up to the sentinel - the same walk a runtime
/// loader performs.
fn walk_table(table: &[u8], endianness: Endianness) -> Vec<u32> {
    let mut offsets = Vec::new();
    for entry in table.chunks_exact(4) {
        let value = endianness.read_u32(entry, 0);
        if value == TABLE_SENTINEL {
            break;
        }
        offsets.push(value);
    }
    offsets
}
