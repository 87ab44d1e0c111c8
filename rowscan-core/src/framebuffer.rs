//! Double-buffered frame storage
//!
//! The scan interrupt reads the front plane one row at a time while the
//! renderer draws into the back plane. `flip` swaps the two with a single
//! atomic store and is not synchronized with the scan: a flip in the middle
//! of a frame shows one torn frame, which is accepted.
//!
//! Pixels are byte atomics so both sides can share the buffers through a
//! plain `&'static` reference.

use portable_atomic::{AtomicU8, Ordering};

/// Row-indexable source of pixel intensities
pub trait FrameSource {
    /// Intensity at (`row`, `col`); out-of-range positions read as 0
    fn level(&self, row: u8, col: u16) -> u8;
}

struct Plane<const ROWS: usize, const COLS: usize> {
    pixels: [[AtomicU8; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Plane<ROWS, COLS> {
    const fn new() -> Self {
        Self {
            pixels: [const { [const { AtomicU8::new(0) }; COLS] }; ROWS],
        }
    }

    fn pixel(&self, x: usize, y: usize) -> Option<&AtomicU8> {
        self.pixels.get(y).and_then(|row| row.get(x))
    }
}

/// Front/back pixel planes of `ROWS × COLS` intensities
pub struct FrameBuffers<const ROWS: usize, const COLS: usize> {
    planes: [Plane<ROWS, COLS>; 2],
    front: AtomicU8,
}

impl<const ROWS: usize, const COLS: usize> Default for FrameBuffers<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROWS: usize, const COLS: usize> FrameBuffers<ROWS, COLS> {
    /// Both planes dark, plane 0 in front
    pub const fn new() -> Self {
        Self {
            planes: [Plane::new(), Plane::new()],
            front: AtomicU8::new(0),
        }
    }

    /// Frame width in pixels
    pub const fn width(&self) -> usize {
        COLS
    }

    /// Frame height in pixels
    pub const fn height(&self) -> usize {
        ROWS
    }

    fn front_index(&self) -> usize {
        usize::from(self.front.load(Ordering::Acquire) & 1)
    }

    fn front_plane(&self) -> &Plane<ROWS, COLS> {
        &self.planes[self.front_index()]
    }

    fn back_plane(&self) -> &Plane<ROWS, COLS> {
        &self.planes[self.front_index() ^ 1]
    }

    /// Set a back-plane pixel; out-of-range points are ignored
    pub fn set_point(&self, x: usize, y: usize, level: u8) {
        if let Some(pixel) = self.back_plane().pixel(x, y) {
            pixel.store(level, Ordering::Relaxed);
        }
    }

    /// Read a back-plane pixel
    pub fn get_point(&self, x: usize, y: usize) -> Option<u8> {
        self.back_plane()
            .pixel(x, y)
            .map(|pixel| pixel.load(Ordering::Relaxed))
    }

    /// Fill the whole back plane
    pub fn fill(&self, level: u8) {
        for row in &self.back_plane().pixels {
            for pixel in row {
                pixel.store(level, Ordering::Relaxed);
            }
        }
    }

    /// Fill a rectangle of the back plane, clipped to the frame
    ///
    /// Returns `false` if nothing of the rectangle lies inside the frame.
    pub fn fill_rect(&self, x: i32, y: i32, w: i32, h: i32, level: u8) -> bool {
        let Some((x0, x1)) = clip_span(x, w, COLS) else {
            return false;
        };
        let Some((y0, y1)) = clip_span(y, h, ROWS) else {
            return false;
        };

        for row in &self.back_plane().pixels[y0..y1] {
            for pixel in &row[x0..x1] {
                pixel.store(level, Ordering::Relaxed);
            }
        }
        true
    }

    /// Show the back plane
    pub fn flip(&self) {
        let next = (self.front.load(Ordering::Relaxed) ^ 1) & 1;
        self.front.store(next, Ordering::Release);
    }
}

impl<const ROWS: usize, const COLS: usize> FrameSource for FrameBuffers<ROWS, COLS> {
    #[inline]
    fn level(&self, row: u8, col: u16) -> u8 {
        self.front_plane()
            .pixel(usize::from(col), usize::from(row))
            .map_or(0, |pixel| pixel.load(Ordering::Relaxed))
    }
}

/// Logical frame folded onto a wider, shorter physical scan
///
/// The renderer draws a frame `logical_cols` wide and
/// `physical_rows × bands` tall. Physical column band `b` (each
/// `logical_cols` wide) of scan row `r` shows logical row
/// `r + b × physical_rows`. A 64 × 48 drawing surface on a 24 × 128 panel
/// is two bands: logical rows 0..24 on the left half, 24..48 on the right.
pub struct FoldedFrame<'a, F: ?Sized> {
    frame: &'a F,
    physical_rows: u8,
    logical_cols: u16,
}

impl<'a, F: ?Sized> FoldedFrame<'a, F> {
    /// Fold `frame` onto a scan of `physical_rows` rows
    pub const fn new(frame: &'a F, physical_rows: u8, logical_cols: u16) -> Self {
        Self {
            frame,
            physical_rows,
            logical_cols,
        }
    }
}

impl<F: FrameSource + ?Sized> FrameSource for FoldedFrame<'_, F> {
    fn level(&self, row: u8, col: u16) -> u8 {
        if self.logical_cols == 0 || row >= self.physical_rows {
            return 0;
        }
        let band = col / self.logical_cols;
        let logical_row = u32::from(self.physical_rows) * u32::from(band) + u32::from(row);
        match u8::try_from(logical_row) {
            Ok(logical_row) => self.frame.level(logical_row, col % self.logical_cols),
            Err(_) => 0,
        }
    }
}

/// Clip `[start, start + len)` to `[0, limit)`
fn clip_span(start: i32, len: i32, limit: usize) -> Option<(usize, usize)> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let lo = i64::from(start).max(0);
    let hi = (i64::from(start) + i64::from(len)).min(limit);
    if lo >= hi {
        return None;
    }
    Some((lo as usize, hi as usize))
}
