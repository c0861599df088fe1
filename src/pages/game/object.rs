use ratatui::layout::Rect;

use crate::constants::game::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Axis-aligned rectangle in world units. The origin is the top-left corner of the play area
/// and y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rectangle { x, y, width, height }
    }
}

pub trait Object {
    fn get_size(&self) -> (f64, f64);
    fn get_pos(&self) -> (f64, f64);

    fn bounds(&self) -> Rectangle {
        let (x, y) = self.get_pos();
        let (width, height) = self.get_size();
        Rectangle::new(x, y, width, height)
    }

    /// Strict overlap of the two objects' horizontal extents. Touching edges do not overlap.
    fn overlaps_horizontally<T: Object>(&self, other: &T) -> bool {
        let (left, _) = self.get_pos();
        let (width, _) = self.get_size();
        let (other_left, _) = other.get_pos();
        let (other_width, _) = other.get_size();

        left + width > other_left && left < other_left + other_width
    }

    /// Projects the object from world units onto the cells of `canvas`, clipped to it.
    /// Returns `None` when nothing of the object lands on the canvas.
    fn transform(&self, canvas: Rect) -> Option<Rect> {
        let scale_x = canvas.width as f64 / SCREEN_WIDTH;
        let scale_y = canvas.height as f64 / SCREEN_HEIGHT;
        let project = |value: f64, scale: f64, limit: u16| (value * scale).round().clamp(0.0, limit as f64) as u16;

        let Rectangle { x, y, width, height } = self.bounds();
        let left = project(x, scale_x, canvas.width);
        let right = project(x + width, scale_x, canvas.width);
        let top = project(y, scale_y, canvas.height);
        let bottom = project(y + height, scale_y, canvas.height);

        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(canvas.x + left, canvas.y + top, right - left, bottom - top))
    }
}

impl Object for Rectangle {
    fn get_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn get_pos(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
