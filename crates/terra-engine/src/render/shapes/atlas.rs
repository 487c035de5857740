/// Shelf packer for the glyph atlas: glyphs fill a row left to right, and a
/// new row opens below the tallest glyph of the current one.
#[derive(Debug, Clone)]
pub(super) struct ShelfPacker {
    size:       u32,
    padding:    u32,
    cursor_x:   u32,
    cursor_y:   u32,
    row_height: u32,
    full:       bool,
}

impl ShelfPacker {
    pub fn new(size: u32, padding: u32) -> Self {
        Self { size, padding, cursor_x: padding, cursor_y: padding, row_height: 0, full: false }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Reserves a `w`×`h` slot and returns its top-left corner.
    pub fn allocate(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full || w + 2 * self.padding > self.size {
            return None;
        }
        if self.cursor_x + w + self.padding > self.size {
            self.cursor_y += self.row_height + self.padding;
            self.cursor_x = self.padding;
            self.row_height = 0;
        }
        if self.cursor_y + h + self.padding > self.size {
            self.full = true;
            return None;
        }

        let slot = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(slot)
    }

    /// Normalised UV corners of a slot.
    pub fn uv(&self, (x, y): (u32, u32), w: u32, h: u32) -> ([f32; 2], [f32; 2]) {
        let s = self.size as f32;
        ([x as f32 / s, y as f32 / s], [(x + w) as f32 / s, (y + h) as f32 / s])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_row_then_wraps_below_tallest() {
        let mut p = ShelfPacker::new(32, 1);
        assert_eq!(p.allocate(10, 4), Some((1, 1)));
        assert_eq!(p.allocate(10, 8), Some((12, 1)));
        // 23 + 10 + 1 > 32: next row starts under the 8px glyph.
        assert_eq!(p.allocate(10, 2), Some((1, 10)));
    }

    #[test]
    fn reports_full_once_out_of_rows() {
        let mut p = ShelfPacker::new(16, 0);
        assert!(p.allocate(16, 10).is_some());
        assert_eq!(p.allocate(16, 10), None);
        assert!(p.is_full());
        assert_eq!(p.allocate(1, 1), None);
    }

    #[test]
    fn oversized_glyph_is_rejected_without_filling() {
        let mut p = ShelfPacker::new(16, 1);
        assert_eq!(p.allocate(20, 2), None);
        assert!(!p.is_full());
    }

    #[test]
    fn uv_is_normalised() {
        let p = ShelfPacker::new(100, 0);
        assert_eq!(p.uv((10, 20), 30, 40), ([0.1, 0.2], [0.4, 0.6]));
    }
}
