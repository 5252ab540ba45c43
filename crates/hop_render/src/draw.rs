//! Renderer-facing draw list.
//!
//! Gameplay code records world-space commands into a [`DrawList`]; a backend
//! either walks the commands directly or asks for a batched [`Mesh`] of
//! textured quads. Outlines and filled rectangles sample the
//! [`DrawList::WHITE_TEXTURE`] key so the whole frame shares one pipeline.

use std::sync::Arc;

use hop_core::Rect;

use crate::vertex::SpriteVertex;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad; `uv` is `[u0, v0, u1, v1]` with v growing downward.
    Quad {
        texture: Arc<str>,
        uv: [f32; 4],
        dest: Rect,
        color: [f32; 4],
    },
    Filled {
        rect: Rect,
        color: [f32; 4],
    },
    Outline {
        rect: Rect,
        thickness: f32,
        color: [f32; 4],
    },
}

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default, Clone)]
pub struct Mesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

#[derive(Debug, Default, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub const WHITE_TEXTURE: &'static str = "__white";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn quad(&mut self, texture: Arc<str>, uv: [f32; 4], dest: Rect, color: [f32; 4]) {
        self.commands.push(DrawCommand::Quad {
            texture,
            uv,
            dest,
            color,
        });
    }

    pub fn filled(&mut self, rect: Rect, color: [f32; 4]) {
        self.commands.push(DrawCommand::Filled { rect, color });
    }

    pub fn outline(&mut self, rect: Rect, thickness: f32, color: [f32; 4]) {
        self.commands.push(DrawCommand::Outline {
            rect,
            thickness,
            color,
        });
    }

    /// Batch every command into quads. Consecutive quads on the same texture
    /// merge into one draw call.
    pub fn build_mesh(&self) -> Mesh {
        let white: Arc<str> = Arc::from(Self::WHITE_TEXTURE);
        let mut mesh = Mesh {
            vertices: Vec::with_capacity(self.commands.len() * 4),
            indices: Vec::with_capacity(self.commands.len() * 6),
            draw_calls: Vec::with_capacity(16),
        };

        for command in &self.commands {
            match command {
                DrawCommand::Quad {
                    texture,
                    uv,
                    dest,
                    color,
                } => add_quad(&mut mesh, texture, *dest, *uv, *color),
                DrawCommand::Filled { rect, color } => {
                    add_quad(&mut mesh, &white, *rect, [0.0, 0.0, 1.0, 1.0], *color)
                }
                DrawCommand::Outline {
                    rect,
                    thickness,
                    color,
                } => {
                    for edge in outline_edges(*rect, *thickness) {
                        add_quad(&mut mesh, &white, edge, [0.0, 0.0, 1.0, 1.0], *color);
                    }
                }
            }
        }

        log::trace!(
            "Built mesh: {} quads in {} draw calls",
            mesh.vertices.len() / 4,
            mesh.draw_calls.len()
        );
        mesh
    }
}

/// Four edge strips, clamped so thick borders on small rects do not overlap.
fn outline_edges(rect: Rect, thickness: f32) -> [Rect; 4] {
    let tx = thickness.min(rect.width * 0.5).max(0.0);
    let ty = thickness.min(rect.height * 0.5).max(0.0);
    let inner_h = (rect.height - 2.0 * ty).max(0.0);
    [
        Rect::new(rect.x, rect.y, rect.width, ty),
        Rect::new(rect.x, rect.bottom() - ty, rect.width, ty),
        Rect::new(rect.x, rect.y + ty, tx, inner_h),
        Rect::new(rect.right() - tx, rect.y + ty, tx, inner_h),
    ]
}

fn add_quad(mesh: &mut Mesh, texture: &Arc<str>, dest: Rect, uv: [f32; 4], color: [f32; 4]) {
    let base_index = mesh.vertices.len() as u32;
    let [u0, v0, u1, v1] = uv;
    let (left, top, right, bottom) = (dest.x, dest.y, dest.right(), dest.bottom());

    mesh.vertices.extend_from_slice(&[
        SpriteVertex {
            position: [left, bottom],
            tex_coords: [u0, v1],
            color,
        },
        SpriteVertex {
            position: [right, bottom],
            tex_coords: [u1, v1],
            color,
        },
        SpriteVertex {
            position: [right, top],
            tex_coords: [u1, v0],
            color,
        },
        SpriteVertex {
            position: [left, top],
            tex_coords: [u0, v0],
            color,
        },
    ]);

    let draw_start = mesh.indices.len() as u32;
    mesh.indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);
    push_draw_call(&mut mesh.draw_calls, texture, draw_start, 6);
}

fn push_draw_call(draw_calls: &mut Vec<DrawCall>, texture_key: &Arc<str>, start: u32, count: u32) {
    if let Some(last) = draw_calls.last_mut() {
        if last.texture_key == *texture_key && last.index_start + last.index_count == start {
            last.index_count += count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key: Arc::clone(texture_key),
        index_start: start,
        index_count: count,
    });
}
