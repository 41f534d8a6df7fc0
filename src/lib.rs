//! # lmpbin - LAMMPS binary dump reader
//!
//! `lmpbin` decodes trajectories written by LAMMPS `dump custom` in binary
//! mode into per-frame columns ready for analysis.
//!
//! ## Features
//!
//! - Sequential frame decoder for orthogonal boxes
//! - Caller-defined column order, with vector quantities (positions,
//!   velocities, forces, image flags) assembled per atom
//! - Buffered or memory-mapped file access
//! - Frame-level error codes plus an iterator over `Result<Frame, DumpError>`
//!
//! ## Example
//!
//! ```no_run
//! use lmpbin::{DumpReader, Property};
//!
//! let properties = vec![Property::Id, Property::Type, Property::X, Property::Y, Property::Z];
//! let reader = DumpReader::open("dump.bin", properties);
//!
//! for frame in reader {
//!     let frame = frame.unwrap();
//!     println!("Timestep {}: {} atoms", frame.timestep, frame.positions.len());
//! }
//! ```

pub mod frame;
pub mod property;

#[cfg(feature = "dump")]
pub mod dump;

#[cfg(feature = "dump")]
pub use dump::{DumpError, DumpReader, DumpReaderBuilder, DumpSource};
pub use frame::{BoundaryKind, ErrorCode, Frame};
pub use property::{ParsePropertyError, Property, VectorQuantity, VectorTriggers};

pub use glam::{DVec3, IVec3};
