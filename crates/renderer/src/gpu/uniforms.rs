use bytemuck::{Pod, Zeroable};

use crate::error::PlaygroundError;
use crate::input::PointerSample;
use crate::types::{SurfaceExtent, UniformType, UniformValue};

/// CPU-side mirror of the injected `FrameParams` uniform block.
///
/// The layout matches the GLSL prelude in `compile.rs` and therefore must
/// observe std140 alignment rules: two vec2 slots, then a float and an int
/// packed into the trailing 16 bytes.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct FrameUniforms {
    resolution: [f32; 2],
    mouse_position: [f32; 2],
    time: f32,
    mouse_pressed: i32,
    _padding: [f32; 2],
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub fn new(extent: SurfaceExtent) -> Self {
        Self {
            resolution: [extent.width() as f32, extent.height() as f32],
            mouse_position: [0.0, 0.0],
            time: 0.0,
            mouse_pressed: 0,
            _padding: [0.0; 2],
        }
    }

    pub fn set_resolution(&mut self, extent: SurfaceExtent) {
        self.resolution = [extent.width() as f32, extent.height() as f32];
    }

    /// Elapsed time in seconds since the first rendered frame.
    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn set_pointer(&mut self, sample: PointerSample) {
        self.mouse_position = sample.position;
        self.mouse_pressed = i32::from(sample.pressed);
    }
}

fn align_to(offset: u32, alignment: u32) -> u32 {
    offset.div_ceil(alignment) * alignment
}

impl UniformType {
    /// std140 size in bytes (matrices stored as vec4-strided columns).
    fn std140_size(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 | Self::IVec2 => 8,
            Self::Vec3 | Self::IVec3 => 12,
            Self::Vec4 | Self::IVec4 => 16,
            Self::Mat2 => 32,
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }

    /// std140 base alignment in bytes.
    fn std140_alignment(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 | Self::IVec2 => 8,
            _ => 16,
        }
    }
}

struct UserUniformEntry {
    name: String,
    ty: UniformType,
    offset: u32,
}

/// std140 layout of the custom uniform block, derived from the declarations
/// the wrapper lifted out of the user source. Offsets must agree with what
/// the GLSL front-end computes for the injected `UserParams` block, so the
/// rules here mirror std140 exactly.
pub(crate) struct UserUniformLayout {
    entries: Vec<UserUniformEntry>,
    size: u32,
}

impl UserUniformLayout {
    pub fn from_declarations(declarations: &[(String, UniformType)]) -> Self {
        let mut entries = Vec::with_capacity(declarations.len());
        let mut offset = 0u32;
        for (name, ty) in declarations {
            offset = align_to(offset, ty.std140_alignment());
            entries.push(UserUniformEntry {
                name: name.clone(),
                ty: *ty,
                offset,
            });
            offset += ty.std140_size();
        }
        let size = align_to(offset.max(1), 16);
        Self { entries, size }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn find(&self, name: &str) -> Option<&UserUniformEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// CPU mirror of the custom uniform block: layout plus raw std140 bytes.
///
/// Slots start zeroed after every (re)compile; values written through
/// [`UserUniformBlock::set`] persist until the program is replaced.
pub(crate) struct UserUniformBlock {
    layout: UserUniformLayout,
    bytes: Vec<u8>,
}

impl UserUniformBlock {
    pub fn new(layout: UserUniformLayout) -> Self {
        let bytes = vec![0u8; layout.size() as usize];
        Self { layout, bytes }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a value into the named slot, validating the tag against the
    /// declared type.
    pub fn set(&mut self, name: &str, value: &UniformValue) -> Result<(), PlaygroundError> {
        let entry = self
            .layout
            .find(name)
            .ok_or_else(|| PlaygroundError::UniformNotFound(name.to_string()))?;
        if entry.ty != value.kind() {
            return Err(PlaygroundError::UniformTypeMismatch {
                name: name.to_string(),
                declared: entry.ty,
                supplied: value.kind(),
            });
        }
        let encoded = encode_std140(value);
        let start = entry.offset as usize;
        self.bytes[start..start + encoded.len()].copy_from_slice(&encoded);
        Ok(())
    }
}

/// Encodes a value with std140 padding (matrix columns strided to 16 bytes).
fn encode_std140(value: &UniformValue) -> Vec<u8> {
    fn float_columns(columns: &[&[f32]]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(columns.len() * 16);
        for column in columns {
            bytes.extend_from_slice(bytemuck::cast_slice(column));
            bytes.resize(bytes.len() + 16 - column.len() * 4, 0);
        }
        bytes
    }

    match value {
        UniformValue::Float(v) => bytemuck::bytes_of(v).to_vec(),
        UniformValue::Int(v) => bytemuck::bytes_of(v).to_vec(),
        UniformValue::Vec2(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::Vec3(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::Vec4(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::IVec2(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::IVec3(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::IVec4(v) => bytemuck::cast_slice(v).to_vec(),
        UniformValue::Mat2(m) => float_columns(&[&m[0], &m[1]]),
        UniformValue::Mat3(m) => float_columns(&[&m[0], &m[1], &m[2]]),
        UniformValue::Mat4(m) => {
            let mut bytes = Vec::with_capacity(64);
            for column in m {
                bytes.extend_from_slice(bytemuck::cast_slice(column));
            }
            bytes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(list: &[(&str, UniformType)]) -> Vec<(String, UniformType)> {
        list.iter()
            .map(|(name, ty)| (name.to_string(), *ty))
            .collect()
    }

    #[test]
    fn frame_block_matches_the_injected_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 32);
        assert_eq!(std::mem::align_of::<FrameUniforms>(), 16);
    }

    #[test]
    fn std140_offsets_respect_base_alignment() {
        let layout = UserUniformLayout::from_declarations(&declarations(&[
            ("a", UniformType::Float),
            ("b", UniformType::Vec3),
            ("c", UniformType::Float),
            ("d", UniformType::Vec2),
        ]));
        assert_eq!(layout.find("a").unwrap().offset, 0);
        // vec3 aligns to 16, leaving a 12-byte hole after the float
        assert_eq!(layout.find("b").unwrap().offset, 16);
        assert_eq!(layout.find("c").unwrap().offset, 28);
        assert_eq!(layout.find("d").unwrap().offset, 32);
        assert_eq!(layout.size(), 48);
    }

    #[test]
    fn matrices_take_vec4_strided_columns() {
        let layout = UserUniformLayout::from_declarations(&declarations(&[
            ("m2", UniformType::Mat2),
            ("m3", UniformType::Mat3),
            ("tail", UniformType::Float),
        ]));
        assert_eq!(layout.find("m2").unwrap().offset, 0);
        assert_eq!(layout.find("m3").unwrap().offset, 32);
        assert_eq!(layout.find("tail").unwrap().offset, 80);
    }

    #[test]
    fn empty_layout_still_spans_a_legal_buffer() {
        let layout = UserUniformLayout::from_declarations(&[]);
        assert!(layout.is_empty());
        assert_eq!(layout.size(), 16);
    }

    #[test]
    fn set_writes_bytes_at_the_declared_offset() {
        let layout = UserUniformLayout::from_declarations(&declarations(&[
            ("scale", UniformType::Float),
            ("tint", UniformType::Vec4),
        ]));
        let mut block = UserUniformBlock::new(layout);
        block
            .set("tint", &UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]))
            .unwrap();
        let floats: &[f32] = bytemuck::cast_slice(&block.bytes()[16..32]);
        assert_eq!(floats, &[1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn set_rejects_unknown_names_and_wrong_tags() {
        let layout =
            UserUniformLayout::from_declarations(&declarations(&[("scale", UniformType::Float)]));
        let mut block = UserUniformBlock::new(layout);

        let missing = block.set("nope", &UniformValue::Float(1.0));
        assert!(matches!(missing, Err(PlaygroundError::UniformNotFound(_))));

        let mismatch = block.set("scale", &UniformValue::Int(3));
        assert!(matches!(
            mismatch,
            Err(PlaygroundError::UniformTypeMismatch { .. })
        ));
    }

    #[test]
    fn mat2_columns_are_padded_to_sixteen_bytes() {
        let encoded = encode_std140(&UniformValue::Mat2([[1.0, 2.0], [3.0, 4.0]]));
        assert_eq!(encoded.len(), 32);
        let floats: &[f32] = bytemuck::cast_slice(&encoded);
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[1], 2.0);
        assert_eq!(floats[4], 3.0);
        assert_eq!(floats[5], 4.0);
    }

    #[test]
    fn pointer_sample_maps_to_position_and_flag() {
        let mut uniforms = FrameUniforms::new(SurfaceExtent::new(320, 240));
        uniforms.set_pointer(PointerSample {
            position: [10.0, 230.0],
            pressed: true,
        });
        uniforms.set_time(1.5);
        let bytes = bytemuck::bytes_of(&uniforms);
        let floats: &[f32] = bytemuck::cast_slice(&bytes[..24]);
        assert_eq!(&floats[..4], &[320.0, 240.0, 10.0, 230.0]);
        assert_eq!(floats[4], 1.5);
        let pressed: i32 = *bytemuck::from_bytes(&bytes[20..24]);
        assert_eq!(pressed, 1);
    }
}
