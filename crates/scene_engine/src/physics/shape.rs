//! Collision shape descriptions

use std::fmt;
use std::str::FromStr;

use parry3d::shape::SharedShape;

use crate::physics::PhysicsError;

/// Supported shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// `SPHERE(radius)`
    Sphere,
    /// `CYLINDER(radius, length)`, long axis along local Y
    Cylinder,
    /// `CAPSULE(radius, length)`, long axis along local Y, length excludes the caps
    Capsule,
    /// `BOX(lx, ly, lz)`, full side lengths
    Box,
}

impl ShapeKind {
    /// Number of arguments the kind takes
    pub fn arity(self) -> usize {
        match self {
            Self::Sphere => 1,
            Self::Cylinder | Self::Capsule => 2,
            Self::Box => 3,
        }
    }

    /// Name used in scene data
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sphere => "SPHERE",
            Self::Cylinder => "CYLINDER",
            Self::Capsule => "CAPSULE",
            Self::Box => "BOX",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SPHERE" => Ok(Self::Sphere),
            "CYLINDER" => Ok(Self::Cylinder),
            "CAPSULE" => Ok(Self::Capsule),
            "BOX" => Ok(Self::Box),
            other => Err(PhysicsError::UnknownShape(other.to_string())),
        }
    }
}

/// Validated shape with its dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Cylinder
    Cylinder {
        /// Radius
        radius: f32,
        /// Length along the long axis
        length: f32,
    },
    /// Capsule
    Capsule {
        /// Radius of the caps and the body
        radius: f32,
        /// Length of the cylindrical part
        length: f32,
    },
    /// Box
    Box {
        /// Side length along X
        lx: f32,
        /// Side length along Y
        ly: f32,
        /// Side length along Z
        lz: f32,
    },
}

impl ShapeDesc {
    /// Build a shape from a kind name and its arguments
    pub fn from_args(kind: &str, args: &[f32]) -> Result<Self, PhysicsError> {
        let kind: ShapeKind = kind.parse()?;
        if args.len() != kind.arity() {
            return Err(PhysicsError::MissingShapeArgument {
                shape: kind,
                expected: kind.arity(),
                got: args.len(),
            });
        }
        if let Some((index, &value)) = args
            .iter()
            .enumerate()
            .find(|(_, value)| !(value.is_finite() && **value > 0.0))
        {
            return Err(PhysicsError::InvalidShapeArgument { shape: kind, index, value });
        }

        Ok(match kind {
            ShapeKind::Sphere => Self::Sphere { radius: args[0] },
            ShapeKind::Cylinder => Self::Cylinder { radius: args[0], length: args[1] },
            ShapeKind::Capsule => Self::Capsule { radius: args[0], length: args[1] },
            ShapeKind::Box => Self::Box { lx: args[0], ly: args[1], lz: args[2] },
        })
    }

    /// Sphere of the given radius
    pub fn sphere(radius: f32) -> Result<Self, PhysicsError> {
        Self::from_args("SPHERE", &[radius])
    }

    /// Box with the given side lengths
    pub fn cuboid(lx: f32, ly: f32, lz: f32) -> Result<Self, PhysicsError> {
        Self::from_args("BOX", &[lx, ly, lz])
    }

    /// Kind of the shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Cylinder { .. } => ShapeKind::Cylinder,
            Self::Capsule { .. } => ShapeKind::Capsule,
            Self::Box { .. } => ShapeKind::Box,
        }
    }

    pub(crate) fn to_shared_shape(self) -> SharedShape {
        match self {
            Self::Sphere { radius } => SharedShape::ball(radius),
            Self::Cylinder { radius, length } => SharedShape::cylinder(length * 0.5, radius),
            Self::Capsule { radius, length } => SharedShape::capsule_y(length * 0.5, radius),
            Self::Box { lx, ly, lz } => SharedShape::cuboid(lx * 0.5, ly * 0.5, lz * 0.5),
        }
    }
}
