//! Test pattern task
//!
//! Draws a scrolling gamma ramp with a marker box into the back plane of
//! the logical frame and flips it, so a freshly flashed board shows every
//! column and row.

use embassy_time::{Duration, Ticker};

use rowscan_core::framebuffer::FrameBuffers;

use crate::board::{FRAME_COLS, FRAME_ROWS};

/// Frame period
const FRAME_INTERVAL: Duration = Duration::from_millis(40);

/// Marker box edge length
const MARKER: i32 = 6;

#[embassy_executor::task]
pub async fn pattern_task(frames: &'static FrameBuffers<FRAME_ROWS, FRAME_COLS>) {
    let mut ticker = Ticker::every(FRAME_INTERVAL);
    let mut offset: usize = 0;

    loop {
        frames.fill(0);

        for x in 0..frames.width() {
            let level = ((x + offset) % 256) as u8;
            for y in 0..frames.height() {
                frames.set_point(x, y, level);
            }
        }

        let span = (frames.width() as i32 - MARKER).max(1);
        let marker_x = (offset as i32 * 2) % span;
        frames.fill_rect(marker_x, 0, MARKER, MARKER, u8::MAX);

        frames.flip();

        offset = offset.wrapping_add(1);
        ticker.next().await;
    }
}
