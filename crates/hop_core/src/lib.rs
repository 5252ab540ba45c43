pub mod input;
pub mod rect;
pub mod time;

pub use input::{InputSnapshot, InputState, Key};
pub use rect::Rect;
pub use time::TimeState;
