/// Axis-aligned rectangle, top-left origin, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlap region of two rectangles. Disjoint or merely touching inputs
    /// yield an all-zero rectangle.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return Rect::default();
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(6.0, 8.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Rect::new(6.0, 8.0, 4.0, 2.0));
        assert_eq!(b.intersection(&a), Rect::new(6.0, 8.0, 4.0, 2.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn zero_size_rect_never_overlaps() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let degenerate = Rect::new(4.0, 4.0, 0.0, 0.0);
        assert!(a.intersection(&degenerate).is_empty());
    }

    #[test]
    fn contained_rect_is_its_own_intersection() {
        let outer = Rect::new(-8.0, -8.0, 32.0, 32.0);
        let inner = Rect::new(0.0, 2.0, 4.0, 6.0);
        assert_eq!(outer.intersection(&inner), inner);
    }

    #[test]
    fn centers_and_edges() {
        let r = Rect::new(10.0, 20.0, 4.0, 8.0);
        assert_eq!(r.right(), 14.0);
        assert_eq!(r.bottom(), 28.0);
        assert_eq!(r.center_x(), 12.0);
        assert_eq!(r.center_y(), 24.0);
        assert_eq!(r.offset(1.0, -2.0), Rect::new(11.0, 18.0, 4.0, 8.0));
    }
}
