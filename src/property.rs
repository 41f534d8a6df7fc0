//! # Per-atom properties
//!
//! A binary dump stores every atom as a flat run of `f64` values, one per
//! column. Which column means what is not recorded in the file, so the caller
//! supplies the order as a list of [`Property`] values.
//!
//! Some properties are components of a 3-vector (`x`, `y`, `z` make up a
//! position). Those are assembled per atom and emitted once the last of their
//! components has been consumed; [`VectorTriggers`] records which component
//! that is for each [`VectorQuantity`].

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single per-atom column of a dump file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Atom ID
    Id,
    /// Atom type
    Type,
    /// Molecule the atom belongs to
    Mol,
    /// Atom mass
    Mass,
    /// Atom charge
    Q,
    X,
    Y,
    Z,
    /// Scaled coordinates
    Xs,
    Ys,
    Zs,
    /// Unwrapped coordinates
    Xu,
    Yu,
    Zu,
    /// Scaled and unwrapped coordinates
    Xsu,
    Ysu,
    Zsu,
    /// Image flags
    Ix,
    Iy,
    Iz,
    Vx,
    Vy,
    Vz,
    Fx,
    Fy,
    Fz,
}

/// Scalar columns that are stored as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Id,
    Type,
    Mol,
    Mass,
    Charge,
}

/// Component index inside a 3-vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Where the value of a property ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Scalar(Scalar),
    Component(VectorQuantity, Axis),
}

/// The physical quantities that are assembled from three components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorQuantity {
    Position,
    ScaledPosition,
    UnwrappedPosition,
    ScaledUnwrappedPosition,
    Velocity,
    Force,
    ImageFlags,
}

impl VectorQuantity {
    /// Number of vector quantities
    pub const COUNT: usize = 7;

    /// All quantities, in table order
    pub const ALL: [VectorQuantity; Self::COUNT] = [
        VectorQuantity::Position,
        VectorQuantity::ScaledPosition,
        VectorQuantity::UnwrappedPosition,
        VectorQuantity::ScaledUnwrappedPosition,
        VectorQuantity::Velocity,
        VectorQuantity::Force,
        VectorQuantity::ImageFlags,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Property {
    /// Classify this property.
    ///
    /// Every variant is listed explicitly so a new property cannot be
    /// silently ignored by the decoder.
    pub fn slot(self) -> Slot {
        use Axis::{X, Y, Z};
        use VectorQuantity::*;

        match self {
            Property::Id => Slot::Scalar(Scalar::Id),
            Property::Type => Slot::Scalar(Scalar::Type),
            Property::Mol => Slot::Scalar(Scalar::Mol),
            Property::Mass => Slot::Scalar(Scalar::Mass),
            Property::Q => Slot::Scalar(Scalar::Charge),
            Property::X => Slot::Component(Position, X),
            Property::Y => Slot::Component(Position, Y),
            Property::Z => Slot::Component(Position, Z),
            Property::Xs => Slot::Component(ScaledPosition, X),
            Property::Ys => Slot::Component(ScaledPosition, Y),
            Property::Zs => Slot::Component(ScaledPosition, Z),
            Property::Xu => Slot::Component(UnwrappedPosition, X),
            Property::Yu => Slot::Component(UnwrappedPosition, Y),
            Property::Zu => Slot::Component(UnwrappedPosition, Z),
            Property::Xsu => Slot::Component(ScaledUnwrappedPosition, X),
            Property::Ysu => Slot::Component(ScaledUnwrappedPosition, Y),
            Property::Zsu => Slot::Component(ScaledUnwrappedPosition, Z),
            Property::Ix => Slot::Component(ImageFlags, X),
            Property::Iy => Slot::Component(ImageFlags, Y),
            Property::Iz => Slot::Component(ImageFlags, Z),
            Property::Vx => Slot::Component(Velocity, X),
            Property::Vy => Slot::Component(Velocity, Y),
            Property::Vz => Slot::Component(Velocity, Z),
            Property::Fx => Slot::Component(Force, X),
            Property::Fy => Slot::Component(Force, Y),
            Property::Fz => Slot::Component(Force, Z),
        }
    }

    /// The vector quantity this property is a component of, if any
    pub fn vector(self) -> Option<VectorQuantity> {
        match self.slot() {
            Slot::Component(quantity, _) => Some(quantity),
            Slot::Scalar(_) => None,
        }
    }

    /// Column name as written in a LAMMPS `dump custom` command
    pub fn name(self) -> &'static str {
        match self {
            Property::Id => "id",
            Property::Type => "type",
            Property::Mol => "mol",
            Property::Mass => "mass",
            Property::Q => "q",
            Property::X => "x",
            Property::Y => "y",
            Property::Z => "z",
            Property::Xs => "xs",
            Property::Ys => "ys",
            Property::Zs => "zs",
            Property::Xu => "xu",
            Property::Yu => "yu",
            Property::Zu => "zu",
            Property::Xsu => "xsu",
            Property::Ysu => "ysu",
            Property::Zsu => "zsu",
            Property::Ix => "ix",
            Property::Iy => "iy",
            Property::Iz => "iz",
            Property::Vx => "vx",
            Property::Vy => "vy",
            Property::Vz => "vz",
            Property::Fx => "fx",
            Property::Fy => "fy",
            Property::Fz => "fz",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a column name is not a known property
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dump column: {0}")]
pub struct ParsePropertyError(pub String);

impl FromStr for Property {
    type Err = ParsePropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let property = match s.trim().to_ascii_lowercase().as_str() {
            "id" => Property::Id,
            "type" => Property::Type,
            "mol" => Property::Mol,
            "mass" => Property::Mass,
            "q" => Property::Q,
            "x" => Property::X,
            "y" => Property::Y,
            "z" => Property::Z,
            "xs" => Property::Xs,
            "ys" => Property::Ys,
            "zs" => Property::Zs,
            "xu" => Property::Xu,
            "yu" => Property::Yu,
            "zu" => Property::Zu,
            "xsu" => Property::Xsu,
            "ysu" => Property::Ysu,
            "zsu" => Property::Zsu,
            "ix" => Property::Ix,
            "iy" => Property::Iy,
            "iz" => Property::Iz,
            "vx" => Property::Vx,
            "vy" => Property::Vy,
            "vz" => Property::Vz,
            "fx" => Property::Fx,
            "fy" => Property::Fy,
            "fz" => Property::Fz,
            _ => return Err(ParsePropertyError(s.to_string())),
        };
        Ok(property)
    }
}

/// For each vector quantity, the property whose consumption completes it
///
/// The trigger is the last component of the quantity in the property order,
/// so each atom emits exactly one vector per quantity no matter how the
/// components are arranged or duplicated. Quantities without any component in
/// the order have no trigger and are never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VectorTriggers {
    triggers: [Option<Property>; VectorQuantity::COUNT],
}

impl VectorTriggers {
    /// Resolve the triggers for a property order
    pub fn resolve(properties: &[Property]) -> Self {
        let mut triggers = [None; VectorQuantity::COUNT];

        // Walking backwards, the first component seen for a quantity is its
        // last occurrence in the order.
        for &property in properties.iter().rev() {
            if let Some(quantity) = property.vector() {
                triggers[quantity.index()].get_or_insert(property);
            }
        }

        Self { triggers }
    }

    /// Trigger for a quantity, `None` if the quantity is not requested
    pub fn get(&self, quantity: VectorQuantity) -> Option<Property> {
        self.triggers[quantity.index()]
    }

    /// Whether consuming `property` completes `quantity`
    #[inline]
    pub fn fires(&self, quantity: VectorQuantity, property: Property) -> bool {
        self.triggers[quantity.index()] == Some(property)
    }
}
