#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    /// Byte stride for vertex buffer layouts.
    pub const STRIDE: usize = std::mem::size_of::<SpriteVertex>();
    pub const POSITION_OFFSET: usize = std::mem::offset_of!(SpriteVertex, position);
    pub const TEX_COORDS_OFFSET: usize = std::mem::offset_of!(SpriteVertex, tex_coords);
    pub const COLOR_OFFSET: usize = std::mem::offset_of!(SpriteVertex, color);
}
