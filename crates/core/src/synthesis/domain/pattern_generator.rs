use crate::shared::frame::Frame;

/// Procedural test card: red ramps left to right, green ramps top to
/// bottom, and a blue checker of 64-pixel cells slides diagonally by one
/// pixel per frame.
pub struct PatternGenerator;

impl PatternGenerator {
    /// Paints frame number `frame_index` into `frame`.
    pub fn fill(frame: &mut Frame, frame_index: usize) {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        frame.set_index(frame_index);

        let mut pixels = frame.as_ndarray_mut();
        for ((y, x, channel), value) in pixels.indexed_iter_mut() {
            *value = match channel {
                0 => (x * 255 / width) as u8,
                1 => (y * 255 / height) as u8,
                _ => checker(x, y, frame_index),
            };
        }
    }
}

fn checker(x: usize, y: usize, shift: usize) -> u8 {
    if ((x + shift) ^ (y + shift)) & 64 != 0 {
        0
    } else {
        255
    }
}
