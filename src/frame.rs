//! # Frame data model
//!
//! A [`Frame`] is one timestep's snapshot: the header scalars of the dump
//! plus one column per requested quantity. Columns that were not requested
//! stay empty.

use crate::property::{Property, Scalar, Slot, VectorQuantity};
use glam::{DVec3, IVec3};
use std::fmt;

/// Treatment of one face of the simulation box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryKind {
    Periodic,
    Fixed,
    /// Shrink-wrapped
    ShrinkWrap,
    /// Shrink-wrapped with a minimum extent
    ShrinkWrapMin,
    #[default]
    Unset,
}

impl BoundaryKind {
    /// LAMMPS letter for this boundary (`p`, `f`, `s`, `m`, or `u` when unset)
    pub fn as_char(self) -> char {
        match self {
            BoundaryKind::Periodic => 'p',
            BoundaryKind::Fixed => 'f',
            BoundaryKind::ShrinkWrap => 's',
            BoundaryKind::ShrinkWrapMin => 'm',
            BoundaryKind::Unset => 'u',
        }
    }
}

impl TryFrom<i32> for BoundaryKind {
    type Error = i32;

    /// Map a wire boundary code; the unknown code is handed back on failure.
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BoundaryKind::Periodic),
            1 => Ok(BoundaryKind::Fixed),
            2 => Ok(BoundaryKind::ShrinkWrap),
            3 => Ok(BoundaryKind::ShrinkWrapMin),
            other => Err(other),
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Outcome of decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCode {
    #[default]
    NoError,
    /// The stream ended cleanly on a frame boundary
    EndOfFile,
    /// The source could not be opened, or an I/O failure or short read
    /// happened inside a frame
    FileError,
    /// The frame describes a non-orthogonal box
    TriclinicBoxUnsupported,
    /// A boundary code outside 0..=3
    BadBoundaryCode,
    /// The frame's field count differs from the property order
    PropertyCountMismatch,
    /// A block size is not a whole number of atoms
    BlockSizeCorrupt,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCode::NoError => "no error",
            ErrorCode::EndOfFile => "end of file",
            ErrorCode::FileError => "file error",
            ErrorCode::TriclinicBoxUnsupported => "triclinic boxes are unsupported",
            ErrorCode::BadBoundaryCode => "unsupported boundary type (not p, f, s, m)",
            ErrorCode::PropertyCountMismatch => "field count does not match the property order",
            ErrorCode::BlockSizeCorrupt => "block size is not a multiple of the field count",
        };
        f.write_str(text)
    }
}

/// All data read for one timestep
///
/// Only the fields read before a failure are meaningful when `error` is not
/// [`ErrorCode::NoError`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Simulation timestep the snapshot was taken at
    pub timestep: u64,
    /// Number of atoms in the frame
    pub atom_count: u64,
    /// Lower corner of the box
    pub box_low: [f64; 3],
    /// Upper corner of the box
    pub box_high: [f64; 3],
    /// Boundary treatment per axis, `[lo, hi]`
    pub boundaries: [[BoundaryKind; 2]; 3],
    /// Number of values stored per atom
    ///
    /// Zero when the file holds a negative count.
    pub field_count: u32,
    /// Outcome of the decode; check this before using anything else
    pub error: ErrorCode,

    /// Atom IDs
    pub ids: Vec<i64>,
    /// Atom types
    pub types: Vec<i64>,
    /// Molecule IDs
    pub molecules: Vec<i64>,
    /// Atom masses
    pub masses: Vec<f64>,
    /// Atom charges
    pub charges: Vec<f64>,
    /// Positions (`x y z`)
    pub positions: Vec<DVec3>,
    /// Scaled positions (`xs ys zs`)
    pub scaled_positions: Vec<DVec3>,
    /// Unwrapped positions (`xu yu zu`)
    pub unwrapped_positions: Vec<DVec3>,
    /// Scaled and unwrapped positions (`xsu ysu zsu`)
    pub scaled_unwrapped_positions: Vec<DVec3>,
    /// Velocities (`vx vy vz`)
    pub velocities: Vec<DVec3>,
    /// Forces (`fx fy fz`)
    pub forces: Vec<DVec3>,
    /// Image flags (`ix iy iz`), truncated to integers
    pub image_flags: Vec<IVec3>,
}

impl Frame {
    /// Whether the frame decoded completely
    pub fn is_ok(&self) -> bool {
        self.error == ErrorCode::NoError
    }

    /// Edge lengths of the box
    pub fn box_lengths(&self) -> DVec3 {
        DVec3::from_array(self.box_high) - DVec3::from_array(self.box_low)
    }

    /// Length of the column that `property` feeds
    pub fn column_len(&self, property: Property) -> usize {
        match property.slot() {
            Slot::Scalar(Scalar::Id) => self.ids.len(),
            Slot::Scalar(Scalar::Type) => self.types.len(),
            Slot::Scalar(Scalar::Mol) => self.molecules.len(),
            Slot::Scalar(Scalar::Mass) => self.masses.len(),
            Slot::Scalar(Scalar::Charge) => self.charges.len(),
            Slot::Component(VectorQuantity::ImageFlags, _) => self.image_flags.len(),
            Slot::Component(quantity, _) => self.vectors(quantity).map_or(0, Vec::len),
        }
    }

    /// Reserve room for `additional` entries in the column fed by `property`
    pub(crate) fn reserve(&mut self, property: Property, additional: usize) {
        match property.slot() {
            Slot::Scalar(Scalar::Id) => self.ids.reserve(additional),
            Slot::Scalar(Scalar::Type) => self.types.reserve(additional),
            Slot::Scalar(Scalar::Mol) => self.molecules.reserve(additional),
            Slot::Scalar(Scalar::Mass) => self.masses.reserve(additional),
            Slot::Scalar(Scalar::Charge) => self.charges.reserve(additional),
            Slot::Component(VectorQuantity::ImageFlags, _) => self.image_flags.reserve(additional),
            Slot::Component(quantity, _) => {
                if let Some(column) = self.vectors_mut(quantity) {
                    column.reserve(additional);
                }
            }
        }
    }

    /// Append one scalar value, truncating the integer columns
    #[inline]
    pub(crate) fn push_scalar(&mut self, scalar: Scalar, value: f64) {
        match scalar {
            Scalar::Id => self.ids.push(value as i64),
            Scalar::Type => self.types.push(value as i64),
            Scalar::Mol => self.molecules.push(value as i64),
            Scalar::Mass => self.masses.push(value),
            Scalar::Charge => self.charges.push(value),
        }
    }

    /// Append one assembled vector
    ///
    /// Image flags are truncated to integers, all three components alike.
    #[inline]
    pub(crate) fn push_vector(&mut self, quantity: VectorQuantity, value: [f64; 3]) {
        if quantity == VectorQuantity::ImageFlags {
            self.image_flags
                .push(IVec3::new(value[0] as i32, value[1] as i32, value[2] as i32));
        } else if let Some(column) = self.vectors_mut(quantity) {
            column.push(DVec3::from_array(value));
        }
    }

    /// Floating-point column for a quantity; `None` for image flags
    pub fn vectors(&self, quantity: VectorQuantity) -> Option<&Vec<DVec3>> {
        match quantity {
            VectorQuantity::Position => Some(&self.positions),
            VectorQuantity::ScaledPosition => Some(&self.scaled_positions),
            VectorQuantity::UnwrappedPosition => Some(&self.unwrapped_positions),
            VectorQuantity::ScaledUnwrappedPosition => Some(&self.scaled_unwrapped_positions),
            VectorQuantity::Velocity => Some(&self.velocities),
            VectorQuantity::Force => Some(&self.forces),
            VectorQuantity::ImageFlags => None,
        }
    }

    fn vectors_mut(&mut self, quantity: VectorQuantity) -> Option<&mut Vec<DVec3>> {
        match quantity {
            VectorQuantity::Position => Some(&mut self.positions),
            VectorQuantity::ScaledPosition => Some(&mut self.scaled_positions),
            VectorQuantity::UnwrappedPosition => Some(&mut self.unwrapped_positions),
            VectorQuantity::ScaledUnwrappedPosition => Some(&mut self.scaled_unwrapped_positions),
            VectorQuantity::Velocity => Some(&mut self.velocities),
            VectorQuantity::Force => Some(&mut self.forces),
            VectorQuantity::ImageFlags => None,
        }
    }
}
