use ndarray::{ArrayView3, ArrayViewMut3};

/// Bytes per pixel of the packed RGB24 layout.
pub const RGB_CHANNELS: usize = 3;

/// A raw RGB24 picture, rows packed without padding.
///
/// The video stream keeps one of these as its scratch buffer and rewrites
/// it for every frame; `index` tracks which frame it currently holds.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Allocates an all-black frame.
    pub fn black(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * RGB_CHANNELS;
        Self::new(vec![0; len], width, height, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Length in bytes of one packed row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * RGB_CHANNELS
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.row_bytes();
        &self.data[y * stride..(y + 1) * stride]
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, RGB_CHANNELS)
    }
}
