//! Closed enumerations of the glTF 2.0 wire format.
//!
//! Numeric enums (component types, filters, wrap modes, topology) convert from
//! their WebGL codes with `TryFrom<u32>`; string enums (accessor types, alpha
//! modes, interpolation, ...) with `FromStr`. Unknown wire values are rejected
//! with [`UnknownVariant`] instead of being coerced.

use std::fmt;
use std::str::FromStr;

/// A wire value that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The WebGL code written to the wire.
            pub const fn code(self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// The symbolic name used by the glTF specification.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = UnknownVariant;

            fn try_from(code: u32) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The string written to the wire.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(UnknownVariant(format!("\"{}\"", other))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

coded_enum! {
    /// Datatype of an accessor's components.
    pub enum ComponentType {
        Byte = 5120 => "BYTE",
        UnsignedByte = 5121 => "UNSIGNED_BYTE",
        Short = 5122 => "SHORT",
        UnsignedShort = 5123 => "UNSIGNED_SHORT",
        UnsignedInt = 5125 => "UNSIGNED_INT",
        Float = 5126 => "FLOAT",
    }
}

coded_enum! {
    /// Component type allowed for sparse accessor indices.
    pub enum IndexComponentType {
        UnsignedByte = 5121 => "UNSIGNED_BYTE",
        UnsignedShort = 5123 => "UNSIGNED_SHORT",
        UnsignedInt = 5125 => "UNSIGNED_INT",
    }
}

impl IndexComponentType {
    /// Size of a single index in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
            Self::UnsignedInt => 4,
        }
    }

    /// Decode one little-endian index from the start of `bytes`.
    ///
    /// Returns `None` when fewer than [`size`](Self::size) bytes remain.
    pub fn read(self, bytes: &[u8]) -> Option<u32> {
        match self {
            Self::UnsignedByte => bytes.first().map(|&b| u32::from(b)),
            Self::UnsignedShort => bytes
                .get(..2)
                .map(|b| u32::from(u16::from_le_bytes([b[0], b[1]]))),
            Self::UnsignedInt => bytes
                .get(..4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        }
    }
}

named_enum! {
    /// Whether an accessor's elements are scalars, vectors, or matrices.
    pub enum AccessorType {
        Scalar => "SCALAR",
        Vec2 => "VEC2",
        Vec3 => "VEC3",
        Vec4 => "VEC4",
        Mat2 => "MAT2",
        Mat3 => "MAT3",
        Mat4 => "MAT4",
    }
}

impl AccessorType {
    /// Number of components per element.
    pub const fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

coded_enum! {
    /// GPU buffer binding hint of a buffer view.
    pub enum BufferTarget {
        ArrayBuffer = 34962 => "ARRAY_BUFFER",
        ElementArrayBuffer = 34963 => "ELEMENT_ARRAY_BUFFER",
    }
}

coded_enum! {
    /// Texture magnification filter.
    pub enum MagFilter {
        Nearest = 9728 => "NEAREST",
        Linear = 9729 => "LINEAR",
    }
}

coded_enum! {
    /// Texture minification filter.
    pub enum MinFilter {
        Nearest = 9728 => "NEAREST",
        Linear = 9729 => "LINEAR",
        NearestMipmapNearest = 9984 => "NEAREST_MIPMAP_NEAREST",
        LinearMipmapNearest = 9985 => "LINEAR_MIPMAP_NEAREST",
        NearestMipmapLinear = 9986 => "NEAREST_MIPMAP_LINEAR",
        LinearMipmapLinear = 9987 => "LINEAR_MIPMAP_LINEAR",
    }
}

coded_enum! {
    /// Texture coordinate wrapping mode.
    pub enum WrapMode {
        ClampToEdge = 33071 => "CLAMP_TO_EDGE",
        MirroredRepeat = 33648 => "MIRRORED_REPEAT",
        Repeat = 10497 => "REPEAT",
    }
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Repeat
    }
}

coded_enum! {
    /// Topology of a mesh primitive.
    pub enum PrimitiveMode {
        Points = 0 => "POINTS",
        Lines = 1 => "LINES",
        LineLoop = 2 => "LINE_LOOP",
        LineStrip = 3 => "LINE_STRIP",
        Triangles = 4 => "TRIANGLES",
        TriangleStrip = 5 => "TRIANGLE_STRIP",
        TriangleFan = 6 => "TRIANGLE_FAN",
    }
}

impl Default for PrimitiveMode {
    fn default() -> Self {
        Self::Triangles
    }
}

named_enum! {
    /// Alpha rendering mode of a material.
    pub enum AlphaMode {
        Opaque => "OPAQUE",
        Mask => "MASK",
        Blend => "BLEND",
    }
}

impl Default for AlphaMode {
    fn default() -> Self {
        Self::Opaque
    }
}

named_enum! {
    /// Keyframe interpolation algorithm of an animation sampler.
    pub enum Interpolation {
        Linear => "LINEAR",
        Step => "STEP",
        CubicSpline => "CUBICSPLINE",
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Linear
    }
}

named_enum! {
    /// Node property animated by a channel.
    pub enum TargetPath {
        Translation => "translation",
        Rotation => "rotation",
        Scale => "scale",
        Weights => "weights",
    }
}

named_enum! {
    /// MIME type of an embedded image.
    pub enum MimeType {
        Jpeg => "image/jpeg",
        Png => "image/png",
    }
}

named_enum! {
    /// Projection kind named by `camera.type`.
    pub enum CameraType {
        Perspective => "perspective",
        Orthographic => "orthographic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_codes() {
        assert_eq!(ComponentType::try_from(5126), Ok(ComponentType::Float));
        assert_eq!(ComponentType::Float.code(), 5126);
        assert_eq!(
            ComponentType::try_from(5124),
            Err(UnknownVariant("5124".to_string()))
        );
    }

    #[test]
    fn test_sparse_index_type_rejects_signed() {
        assert!(IndexComponentType::try_from(5120).is_err());
        assert!(IndexComponentType::try_from(5126).is_err());
        assert_eq!(
            IndexComponentType::try_from(5123),
            Ok(IndexComponentType::UnsignedShort)
        );
    }

    #[test]
    fn test_index_read_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(IndexComponentType::UnsignedByte.read(&bytes), Some(1));
        assert_eq!(IndexComponentType::UnsignedShort.read(&bytes), Some(0x0201));
        assert_eq!(IndexComponentType::UnsignedInt.read(&bytes), Some(0x04030201));
        assert_eq!(IndexComponentType::UnsignedInt.read(&bytes[1..]), None);
    }

    #[test]
    fn test_accessor_type_names() {
        assert_eq!("MAT4".parse::<AccessorType>(), Ok(AccessorType::Mat4));
        assert_eq!(AccessorType::Mat3.component_count(), 9);
        assert_eq!(
            "mat4".parse::<AccessorType>(),
            Err(UnknownVariant("\"mat4\"".to_string()))
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WrapMode::default(), WrapMode::Repeat);
        assert_eq!(PrimitiveMode::default().code(), 4);
        assert_eq!(AlphaMode::default(), AlphaMode::Opaque);
        assert_eq!(Interpolation::default().to_string(), "LINEAR");
    }
}
