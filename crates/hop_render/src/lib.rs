pub mod camera;
pub mod draw;
pub mod vertex;

pub use camera::{Camera2D, CameraUniform};
pub use draw::{DrawCall, DrawCommand, DrawList, Mesh};
pub use vertex::SpriteVertex;
