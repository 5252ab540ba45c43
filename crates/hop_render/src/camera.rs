use glam::{Mat4, Vec2, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// World-to-screen camera in the Tiled convention (y grows downward).
///
/// `target` is the world point that lands on `offset` in screen pixels.
/// Following a character means moving `target`; `offset` is kept at the
/// viewport centre.
pub struct Camera2D {
    pub target: Vec2,
    pub offset: Vec2,
    pub zoom: f32,
    /// Degrees, clockwise on screen.
    pub rotation: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let mut camera = Self {
            target: Vec2::ZERO,
            offset: Vec2::ZERO,
            zoom: 1.0,
            rotation: 0.0,
            viewport: (viewport_width, viewport_height),
        };
        camera.recenter();
        camera
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.recenter();
    }

    /// Recompute `offset` as the viewport centre.
    pub fn recenter(&mut self) {
        self.offset = Vec2::new(self.viewport.0 as f32 / 2.0, self.viewport.1 as f32 / 2.0);
    }

    pub fn follow(&mut self, target: Vec2) {
        self.target = target;
        self.recenter();
    }

    /// World space to screen pixels.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset.extend(0.0))
            * Mat4::from_rotation_z(self.rotation.to_radians())
            * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_translation((-self.target).extend(0.0))
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.view_matrix().transform_point3(world.extend(0.0)).truncate()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.view_matrix()
            .inverse()
            .transform_point3(screen.extend(0.0))
            .truncate()
    }

    pub fn build_uniform(&self) -> CameraUniform {
        // Screen pixels (y down) to clip space (y up).
        let proj = Mat4::orthographic_rh(
            0.0,
            self.viewport.0 as f32,
            self.viewport.1 as f32,
            0.0,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: (proj * self.view_matrix()).to_cols_array_2d(),
        }
    }
}
