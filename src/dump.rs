//! # Binary Dump Reader
//!
//! Reads the binary flavour of LAMMPS `dump custom` files one frame at a
//! time. Each frame is laid out as follows, in host byte order:
//!
//! ```text
//! i64  timestep
//! i64  atom count
//! i32  box style            (0 = orthogonal)
//! i32  boundary[3][2]       (per axis, lo then hi; 0..=3)
//! f64  extents[6]           (xlo xhi ylo yhi zlo zhi)
//! i32  field count
//! i32  block count
//! block count times:
//!     i32  block size       (number of doubles, atoms * field count)
//!     f64  values[block size]
//! ```
//!
//! The file does not name its columns, so the reader is constructed with the
//! property order used when the dump was written.
//!
//! ## Example
//!
//! ```no_run
//! use lmpbin::{DumpReader, ErrorCode, Property};
//!
//! let properties = vec![Property::Id, Property::Type, Property::X, Property::Y, Property::Z];
//! let mut reader = DumpReader::open("dump.bin", properties);
//! loop {
//!     let frame = reader.decode_frame();
//!     if frame.error != ErrorCode::NoError {
//!         break;
//!     }
//!     println!("{}: {} atoms", frame.timestep, frame.positions.len());
//! }
//! ```

use crate::frame::{BoundaryKind, ErrorCode, Frame};
use crate::property::{Property, Slot, VectorQuantity, VectorTriggers};
use byteorder::{NativeEndian, ReadBytesExt};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on the per-column capacity reserved up front
///
/// The atom count comes from the file; columns still grow past this as
/// values actually arrive.
const MAX_RESERVE: usize = 1 << 20;

/// Number of doubles read from the source at once
const READ_CHUNK: usize = 1 << 16;

/// Failures while decoding a frame
#[derive(Error, Debug)]
pub enum DumpError {
    /// I/O failure or short read inside a frame
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended on a frame boundary
    #[error("end of file")]
    EndOfFile,

    /// The dump file could not be opened
    #[error("dump source is not open")]
    SourceUnavailable,

    /// The box style flag is nonzero (non-orthogonal box)
    #[error("triclinic boxes are unsupported (box style {0})")]
    TriclinicBox(i32),

    /// A boundary code outside 0..=3
    #[error("unsupported boundary code {code} on axis {axis} ({side})")]
    BadBoundary {
        /// Axis index, 0 for x
        axis: usize,
        /// `"lo"` or `"hi"` face
        side: &'static str,
        /// Code as stored in the file
        code: i32,
    },

    /// The file's field count differs from the property order
    #[error("file contains {found} fields, but the property order has {expected}")]
    PropertyCountMismatch {
        /// Length of the property order
        expected: usize,
        /// Field count as stored in the file
        found: i32,
    },

    /// A block does not hold a whole number of atoms
    #[error("block {block} holds {size} values, not a multiple of {field_count} fields")]
    BlockSizeCorrupt {
        /// Index of the block within the frame
        block: usize,
        /// Block size as stored in the file
        size: i32,
        /// Fields per atom
        field_count: u32,
    },
}

impl DumpError {
    /// The frame error code this failure is reported as
    pub fn code(&self) -> ErrorCode {
        match self {
            DumpError::Io(_) | DumpError::SourceUnavailable => ErrorCode::FileError,
            DumpError::EndOfFile => ErrorCode::EndOfFile,
            DumpError::TriclinicBox(_) => ErrorCode::TriclinicBoxUnsupported,
            DumpError::BadBoundary { .. } => ErrorCode::BadBoundaryCode,
            DumpError::PropertyCountMismatch { .. } => ErrorCode::PropertyCountMismatch,
            DumpError::BlockSizeCorrupt { .. } => ErrorCode::BlockSizeCorrupt,
        }
    }
}

/// Byte source backing a reader opened from a path
pub enum DumpSource {
    /// Buffered file reads
    Buffered(BufReader<File>),
    /// Memory-mapped file, consumed front to back
    Mapped(Cursor<Mmap>),
}

impl Read for DumpSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DumpSource::Buffered(reader) => reader.read(buf),
            DumpSource::Mapped(cursor) => cursor.read(buf),
        }
    }
}

/// Builder for a [`DumpReader`] over a file
pub struct DumpReaderBuilder {
    path: PathBuf,
    properties: Vec<Property>,
    memory_map: bool,
    buffer_capacity: Option<usize>,
}

impl DumpReaderBuilder {
    /// Start building a reader for the dump at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the binary dump file
    ///
    /// # Returns
    ///
    /// A builder with an empty property order and buffered reads
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            properties: Vec::new(),
            memory_map: false,
            buffer_capacity: None,
        }
    }

    /// Per-atom property order, exactly as the dump was written
    ///
    /// # Arguments
    ///
    /// * `properties` - One entry per stored column, in file order
    ///
    /// # Returns
    ///
    /// The builder with the property order set
    pub fn properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    /// Map the file into memory instead of reading it through a buffer
    ///
    /// # Arguments
    ///
    /// * `enabled` - Whether to memory-map the file
    ///
    /// # Returns
    ///
    /// The builder with the access mode updated
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.memory_map = enabled;
        self
    }

    /// Capacity of the read buffer (ignored when memory mapping)
    ///
    /// # Arguments
    ///
    /// * `capacity` - Buffer size in bytes
    ///
    /// # Returns
    ///
    /// The builder with the buffer capacity set
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Open the file and build the reader
    ///
    /// Opening failures are not returned here: the reader is built without a
    /// source and every decode reports [`ErrorCode::FileError`].
    pub fn build(self) -> DumpReader<DumpSource> {
        let source = match self.open_source() {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!("cannot open dump file {}: {}", self.path.display(), e);
                None
            }
        };

        DumpReader {
            source,
            triggers: VectorTriggers::resolve(&self.properties),
            properties: self.properties,
            block: Vec::new(),
            frames_read: 0,
            finished: false,
        }
    }

    fn open_source(&self) -> io::Result<DumpSource> {
        let file = File::open(&self.path)?;
        if self.memory_map {
            // SAFETY: the map is only read, and the dump is not expected to
            // change while it is being decoded.
            let mmap = unsafe { Mmap::map(&file)? };
            return Ok(DumpSource::Mapped(Cursor::new(mmap)));
        }
        Ok(DumpSource::Buffered(match self.buffer_capacity {
            Some(capacity) => BufReader::with_capacity(capacity, file),
            None => BufReader::new(file),
        }))
    }
}

/// Sequential decoder for binary dump frames
///
/// The property order and the vector triggers derived from it are fixed for
/// the reader's lifetime. Nothing about a frame is kept between calls apart
/// from the position in the stream.
pub struct DumpReader<R> {
    source: Option<R>,
    properties: Vec<Property>,
    triggers: VectorTriggers,
    /// Reused storage for one block of values
    block: Vec<f64>,
    frames_read: u64,
    /// Set once iteration hits the end or a fault
    finished: bool,
}

impl DumpReader<DumpSource> {
    /// Open a dump file with buffered reads
    pub fn open<P: AsRef<Path>>(path: P, properties: Vec<Property>) -> Self {
        DumpReaderBuilder::new(path).properties(properties).build()
    }
}

impl<R: Read> DumpReader<R> {
    /// Decode frames from an already open byte stream
    pub fn new(source: R, properties: Vec<Property>) -> Self {
        Self {
            source: Some(source),
            triggers: VectorTriggers::resolve(&properties),
            properties,
            block: Vec::new(),
            frames_read: 0,
            finished: false,
        }
    }

    /// The property order frames are decoded with
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Whether a byte source is available
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Number of frames decoded without error so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Decode the next frame
    ///
    /// The outcome is reported in [`Frame::error`]. On anything other than
    /// [`ErrorCode::NoError`] only the header fields read before the fault
    /// are meaningful, and after a fatal code the stream position is no
    /// longer reliable.
    pub fn decode_frame(&mut self) -> Frame {
        let mut frame = Frame::default();
        if let Err(e) = self.read_frame(&mut frame) {
            if !matches!(e, DumpError::EndOfFile) {
                tracing::debug!("frame decode failed: {}", e);
            }
            frame.error = e.code();
        }
        frame
    }

    /// Decode the next frame, returning `Ok(None)` at the end of the stream
    pub fn read_next(&mut self) -> Result<Option<Frame>, DumpError> {
        let mut frame = Frame::default();
        match self.read_frame(&mut frame) {
            Ok(()) => Ok(Some(frame)),
            Err(DumpError::EndOfFile) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<(), DumpError> {
        let source = self.source.as_mut().ok_or(DumpError::SourceUnavailable)?;

        // Running out of bytes here means the previous frame was the last.
        frame.timestep = source.read_u64::<NativeEndian>().map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                DumpError::EndOfFile
            } else {
                DumpError::Io(e)
            }
        })?;
        frame.atom_count = source.read_u64::<NativeEndian>()?;

        let reserve = usize::try_from(frame.atom_count)
            .unwrap_or(usize::MAX)
            .min(MAX_RESERVE);
        for &property in &self.properties {
            frame.reserve(property, reserve);
        }

        let box_style = source.read_i32::<NativeEndian>()?;
        if box_style != 0 {
            return Err(DumpError::TriclinicBox(box_style));
        }

        for axis in 0..3 {
            for side in 0..2 {
                let code = source.read_i32::<NativeEndian>()?;
                frame.boundaries[axis][side] =
                    BoundaryKind::try_from(code).map_err(|code| DumpError::BadBoundary {
                        axis,
                        side: if side == 0 { "lo" } else { "hi" },
                        code,
                    })?;
            }
        }

        let mut extents = [0.0f64; 6];
        source.read_f64_into::<NativeEndian>(&mut extents)?;
        for axis in 0..3 {
            frame.box_low[axis] = extents[2 * axis];
            frame.box_high[axis] = extents[2 * axis + 1];
        }

        let field_count = source.read_i32::<NativeEndian>()?;
        frame.field_count = u32::try_from(field_count).unwrap_or(0);
        if usize::try_from(field_count).ok() != Some(self.properties.len()) {
            return Err(DumpError::PropertyCountMismatch {
                expected: self.properties.len(),
                found: field_count,
            });
        }

        let blocks = source.read_i32::<NativeEndian>()?;
        if blocks < 0 {
            tracing::warn!("negative block count {} at timestep {}", blocks, frame.timestep);
        }

        tracing::debug!(
            timestep = frame.timestep,
            atoms = frame.atom_count,
            blocks,
            "decoding frame"
        );

        for block in 0..blocks.max(0) as usize {
            let size = source.read_i32::<NativeEndian>()?;
            let fields = frame.field_count as usize;
            let len = match usize::try_from(size) {
                Ok(0) => 0,
                Ok(len) if fields != 0 && len % fields == 0 => len,
                _ => {
                    return Err(DumpError::BlockSizeCorrupt {
                        block,
                        size,
                        field_count: frame.field_count,
                    })
                }
            };

            read_values(&mut *source, &mut self.block, len)?;
            unpack_block(&self.block, &self.properties, &self.triggers, frame);
        }

        self.frames_read += 1;
        Ok(())
    }
}

/// Fill `block` with `len` doubles from `source`
///
/// The buffer only grows as data arrives, so a bogus size fails on the short
/// read rather than on allocation.
fn read_values<R: Read>(source: &mut R, block: &mut Vec<f64>, len: usize) -> io::Result<()> {
    block.clear();
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(READ_CHUNK);
        let start = block.len();
        block.resize(start + n, 0.0);
        source.read_exact(bytemuck::cast_slice_mut(&mut block[start..]))?;
        remaining -= n;
    }
    Ok(())
}

/// Unpack one block of per-atom values into the frame's columns
///
/// `values` must hold a whole number of atoms.
fn unpack_block(
    values: &[f64],
    properties: &[Property],
    triggers: &VectorTriggers,
    frame: &mut Frame,
) {
    if properties.is_empty() {
        return;
    }

    for atom in values.chunks_exact(properties.len()) {
        // Scratch vectors live for one atom only.
        let mut scratch = [[0.0f64; 3]; VectorQuantity::COUNT];

        for (&property, &value) in properties.iter().zip(atom) {
            match property.slot() {
                Slot::Scalar(scalar) => frame.push_scalar(scalar, value),
                Slot::Component(quantity, axis) => {
                    let vector = &mut scratch[quantity.index()];
                    vector[axis as usize] = value;
                    if triggers.fires(quantity, property) {
                        frame.push_vector(quantity, *vector);
                    }
                }
            }
        }
    }
}

impl<R: Read> Iterator for DumpReader<R> {
    type Item = Result<Frame, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for DumpReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_assembles_vectors_per_atom() {
        let properties = [Property::Id, Property::Z, Property::X, Property::Y, Property::Q];
        let triggers = VectorTriggers::resolve(&properties);
        let values = [1.0, 3.0, 1.0, 2.0, -0.5, 2.0, 6.0, 4.0, 5.0, 0.5];

        let mut frame = Frame::default();
        unpack_block(&values, &properties, &triggers, &mut frame);

        assert_eq!(frame.ids, vec![1, 2]);
        assert_eq!(frame.charges, vec![-0.5, 0.5]);
        assert_eq!(
            frame.positions,
            vec![glam::DVec3::new(1.0, 2.0, 3.0), glam::DVec3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn missing_components_stay_zero() {
        let properties = [Property::Vx, Property::Vz];
        let triggers = VectorTriggers::resolve(&properties);

        let mut frame = Frame::default();
        unpack_block(&[1.0, 3.0, 4.0, 6.0], &properties, &triggers, &mut frame);

        assert_eq!(
            frame.velocities,
            vec![glam::DVec3::new(1.0, 0.0, 3.0), glam::DVec3::new(4.0, 0.0, 6.0)]
        );
    }

    #[test]
    fn read_values_across_chunks() {
        let len = READ_CHUNK + 3;
        let bytes: Vec<u8> = (0..len).flat_map(|i| (i as f64).to_ne_bytes()).collect();

        let mut block = Vec::new();
        read_values(&mut Cursor::new(bytes), &mut block, len).unwrap();
        assert_eq!(block.len(), len);
        assert_eq!(block[READ_CHUNK + 2], (READ_CHUNK + 2) as f64);
    }

    #[test]
    fn short_block_is_an_io_error() {
        let bytes = 1.0f64.to_ne_bytes().to_vec();
        let mut block = Vec::new();
        let err = read_values(&mut Cursor::new(bytes), &mut block, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn error_codes() {
        assert_eq!(DumpError::EndOfFile.code(), ErrorCode::EndOfFile);
        assert_eq!(DumpError::SourceUnavailable.code(), ErrorCode::FileError);
        assert_eq!(
            DumpError::PropertyCountMismatch { expected: 5, found: 4 }.code(),
            ErrorCode::PropertyCountMismatch
        );
    }
}
