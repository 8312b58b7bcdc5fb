/// Construction options recognised by [`crate::Playground`].
///
/// Mirrors the embedder-facing configuration: surface dimensions plus an
/// optional initial fragment source compiled during construction.
#[derive(Clone, Debug)]
pub struct PlaygroundOptions {
    /// Surface width in physical pixels.
    pub width: u32,
    /// Surface height in physical pixels.
    pub height: u32,
    /// Optional fragment shader source compiled immediately after the
    /// pipeline comes up. Construction fails if it does not compile.
    pub source: Option<String>,
}

impl Default for PlaygroundOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            source: None,
        }
    }
}

impl PlaygroundOptions {
    pub(crate) fn extent(&self) -> SurfaceExtent {
        SurfaceExtent::new(self.width, self.height)
    }
}

/// Dimensions of the drawable surface.
///
/// The surface manager keeps the acceleration context's viewport equal to
/// `(0, 0, width, height)` at all times, so this type is the single source of
/// truth for both. Dimensions are clamped to at least one pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceExtent {
    width: u32,
    height: u32,
}

impl SurfaceExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Viewport rectangle derived from the surface dimensions.
    pub fn viewport(&self) -> (u32, u32, u32, u32) {
        (0, 0, self.width, self.height)
    }

    pub(crate) fn set_width(&mut self, width: u32) {
        self.width = width.max(1);
    }

    pub(crate) fn set_height(&mut self, height: u32) {
        self.height = height.max(1);
    }
}

/// GLSL uniform shapes supported by the generic setter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformType {
    /// Maps a GLSL type token from a `uniform` declaration onto a supported
    /// shape. Unsupported tokens (samplers, arrays, ...) return `None` and the
    /// declaration is left for the shader compiler to reject or accept.
    pub(crate) fn from_glsl(token: &str) -> Option<Self> {
        match token {
            "float" => Some(Self::Float),
            "int" => Some(Self::Int),
            "vec2" => Some(Self::Vec2),
            "vec3" => Some(Self::Vec3),
            "vec4" => Some(Self::Vec4),
            "ivec2" => Some(Self::IVec2),
            "ivec3" => Some(Self::IVec3),
            "ivec4" => Some(Self::IVec4),
            "mat2" => Some(Self::Mat2),
            "mat3" => Some(Self::Mat3),
            "mat4" => Some(Self::Mat4),
            _ => None,
        }
    }

    pub(crate) fn glsl_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
        }
    }
}

impl std::fmt::Display for UniformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Tagged value accepted by the generic uniform setter.
///
/// The tag must match the uniform's declared type in the active fragment
/// program; mismatches are rejected with
/// [`crate::PlaygroundError::UniformTypeMismatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    /// Column-major 2x2 matrix.
    Mat2([[f32; 2]; 2]),
    /// Column-major 3x3 matrix.
    Mat3([[f32; 3]; 3]),
    /// Column-major 4x4 matrix.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformType {
        match self {
            Self::Float(_) => UniformType::Float,
            Self::Int(_) => UniformType::Int,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::IVec2(_) => UniformType::IVec2,
            Self::IVec3(_) => UniformType::IVec3,
            Self::IVec4(_) => UniformType::IVec4,
            Self::Mat2(_) => UniformType::Mat2,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_vga() {
        let options = PlaygroundOptions::default();
        assert_eq!(options.width, 640);
        assert_eq!(options.height, 480);
        assert!(options.source.is_none());
    }

    #[test]
    fn partial_resize_preserves_other_dimension() {
        let mut extent = SurfaceExtent::new(320, 240);
        extent.set_width(1024);
        assert_eq!(extent.height(), 240);
        extent.set_height(768);
        assert_eq!(extent.width(), 1024);
    }

    #[test]
    fn viewport_tracks_dimensions() {
        let mut extent = SurfaceExtent::new(320, 240);
        assert_eq!(extent.viewport(), (0, 0, 320, 240));
        extent.set_width(640);
        assert_eq!(extent.viewport(), (0, 0, 640, 240));
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let extent = SurfaceExtent::new(0, 0);
        assert_eq!(extent.viewport(), (0, 0, 1, 1));
    }

    #[test]
    fn value_tags_match_declared_types() {
        assert_eq!(UniformValue::Vec2([0.0; 2]).kind(), UniformType::Vec2);
        assert_eq!(UniformValue::Mat3([[0.0; 3]; 3]).kind(), UniformType::Mat3);
        assert_eq!(UniformType::from_glsl("ivec3"), Some(UniformType::IVec3));
        assert_eq!(UniformType::from_glsl("sampler2D"), None);
    }
}
