//! Scope-stack construction of relocatable record graphs

use nether_bits::Endianness;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::chunk::Chunk;
use crate::error::ReloError;

/// A recorded location whose final value is resolved when the image is
/// flattened.
#[derive(Debug, Clone, Copy)]
struct Bookmark {
    /// Slot owning the patched location.
    owner: usize,
    /// Byte offset of the 4-byte location within the owning slot.
    offset: usize,
    /// Target slot index for relocations; caller-supplied value for imports.
    value: u32,
}

/// Builds a graph of records slot by slot and flattens it into a [`Chunk`].
///
/// Construction follows the nesting of the records themselves: the root slot
/// is open from creation, [`push`](Tracker::push) opens a child record (and
/// wires the parent's pointer field to it), [`pop`](Tracker::pop) closes it.
/// "Pointers" are never addresses - children are identified by slot index
/// and every linked field becomes a relocation resolved during
/// [`finalize`](Tracker::finalize).
///
/// A tracker is single-owner and built start-to-finish by one caller; all
/// slots are released together when it drops, on every exit path.
#[derive(Debug)]
pub struct Tracker {
    arena: Arena,
    /// Nesting chain of open slots; the last entry is the current record.
    stack: Vec<usize>,
    relocations: Vec<Bookmark>,
    imports: Vec<Bookmark>,
    endianness: Endianness,
}

impl Tracker {
    /// Allocate the root slot of `root_size` bytes and open its scope.
    pub fn new(root_size: usize, endianness: Endianness) -> Result<Self, ReloError> {
        let mut arena = Arena::new();
        let root = arena.allocate(1, root_size)?;
        Ok(Self {
            arena,
            stack: vec![root],
            relocations: Vec::new(),
            imports: Vec::new(),
            endianness,
        })
    }

    /// Byte order of the execution environment the image is built for.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Scope depth; 1 means only the root record is open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The root record's bytes.
    pub fn root(&mut self) -> &mut [u8] {
        self.arena.block_mut(0)
    }

    /// The current (innermost open) record's bytes.
    pub fn current(&mut self) -> &mut [u8] {
        let top = self.top();
        self.arena.block_mut(top)
    }

    fn top(&self) -> usize {
        // The stack holds at least the root for the tracker's whole life.
        self.stack[self.stack.len() - 1]
    }

    /// Open a child record of `count * size` bytes.
    ///
    /// With `link: Some(offset)`, the 4-byte field at `offset` in the
    /// current record becomes a relocation targeting the child; the child's
    /// slot index is written there as a placeholder until `finalize`
    /// patches the real offset over it. With `link: None` the child is
    /// allocated without wiring (the caller links it elsewhere or not at
    /// all).
    pub fn push(
        &mut self,
        link: Option<usize>,
        size: usize,
        count: usize,
    ) -> Result<&mut [u8], ReloError> {
        let parent = self.top();
        if let Some(offset) = link {
            check_span(self.arena.block(parent).len(), offset)?;
        }
        let child = self.arena.allocate(count, size)?;
        trace!(parent, child, count, size, linked = link.is_some(), "push slot");
        self.stack.push(child);
        if let Some(offset) = link {
            self.relocations.push(Bookmark {
                owner: parent,
                offset,
                value: child as u32,
            });
            self.endianness
                .write_u32(self.arena.block_mut(parent), offset, child as u32);
        }
        Ok(self.arena.block_mut(child))
    }

    /// Close the current child record.
    ///
    /// Fails with [`ReloError::StackUnderflow`] when only the root is open:
    /// push and pop must balance exactly like the record nesting they
    /// mirror.
    pub fn pop(&mut self) -> Result<(), ReloError> {
        if self.stack.len() <= 1 {
            return Err(ReloError::StackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    /// Run `f` inside a child record scope, popping on every exit path
    /// including `f`'s error path.
    pub fn scope<R>(
        &mut self,
        link: Option<usize>,
        size: usize,
        count: usize,
        f: impl FnOnce(&mut Self) -> Result<R, ReloError>,
    ) -> Result<R, ReloError> {
        self.push(link, size, count)?;
        let result = f(self);
        self.pop()?;
        result
    }

    /// Record an externally resolved reference: the 4-byte field at
    /// `offset` in the current record is entered into the import table and
    /// `value` is written there in target byte order.
    pub fn add_reference(&mut self, offset: usize, value: u32) -> Result<(), ReloError> {
        let owner = self.top();
        check_span(self.arena.block(owner).len(), offset)?;
        self.imports.push(Bookmark {
            owner,
            offset,
            value,
        });
        self.endianness
            .write_u32(self.arena.block_mut(owner), offset, value);
        Ok(())
    }

    /// Flatten the graph into a relocatable image.
    ///
    /// Slots are concatenated in allocation order; every recorded fixup
    /// location is patched in place with the target-endian resolved value
    /// and contributes one source-offset entry to its table. Fails with
    /// [`ReloError::UnbalancedScopes`] while nested scopes are still open.
    ///
    /// The tracker stays alive afterwards (slots are released when it
    /// drops), and a second call produces an identical chunk.
    pub fn finalize(&mut self) -> Result<Chunk, ReloError> {
        if self.stack.len() != 1 {
            return Err(ReloError::UnbalancedScopes {
                depth: self.stack.len(),
            });
        }
        debug!(
            slots = self.arena.len(),
            bytes = self.arena.total_size(),
            relocations = self.relocations.len(),
            imports = self.imports.len(),
            "finalize image"
        );
        let mut offsets = Vec::with_capacity(self.arena.len());
        let mut instance = Vec::with_capacity(self.arena.total_size());
        for index in 0..self.arena.len() {
            offsets.push(instance.len() as u32);
            instance.extend_from_slice(self.arena.block(index));
        }
        // Tables are ordered by (owner slot, target); entries with equal
        // keys keep their insertion order, which consumers rely on.
        self.relocations.sort_by_key(|b| (b.owner, b.value));
        self.imports.sort_by_key(|b| (b.owner, b.value));
        let relocations: Vec<(u32, u32)> = self
            .relocations
            .iter()
            .map(|b| {
                (
                    offsets[b.owner] + b.offset as u32,
                    offsets[b.value as usize],
                )
            })
            .collect();
        let imports: Vec<(u32, u32)> = self
            .imports
            .iter()
            .map(|b| (offsets[b.owner] + b.offset as u32, b.value))
            .collect();
        let relocation_table = emit_table(&relocations, &mut instance, self.endianness);
        let import_table = emit_table(&imports, &mut instance, self.endianness);
        Ok(Chunk::new(
            self.endianness,
            instance,
            relocation_table,
            import_table,
        ))
    }
}

/// Serialize `(source, value)` fixups: each source offset goes into the
/// table and each value is patched into the instance buffer at that offset.
/// An empty fixup list produces an empty table - no sentinel.
fn emit_table(entries: &[(u32, u32)], instance: &mut [u8], endianness: Endianness) -> Vec<u8> {
    if entries.is_empty() {
        return Vec::new();
    }
    let mut table = Vec::with_capacity((entries.len() + 1) * 4);
    for &(source, value) in entries {
        table.extend_from_slice(&endianness.u32_bytes(source));
        endianness.write_u32(instance, source as usize, value);
    }
    table.extend_from_slice(&crate::chunk::TABLE_SENTINEL.to_le_bytes());
    table
}

/// A fixup location must hold a whole 4-byte field inside its slot.
pub(crate) fn check_span(slot_len: usize, offset: usize) -> Result<(), ReloError> {
    match offset.checked_add(4) {
        Some(end) if end <= slot_len => Ok(()),
        _ => Err(ReloError::OffsetOutOfBounds {
            offset,
            size: slot_len,
        }),
    }
}
