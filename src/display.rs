use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::framebuffer::{FRAME_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Display is used by the driver loop to present the framebuffer. It should
/// abstract the implementation details, so a variety of kinds of screen
/// would work.
pub trait Display {
    /// present a packed 1-bit framebuffer snapshot
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;
}

/// expand a packed snapshot into the (x, y) points whose bit matches
/// `bitplane`, in the coordinate space the canvas paints (y grows downward
/// as it goes negative)
fn bitplane_points(data: &[u8], bitplane: u8) -> impl Iterator<Item = (f64, f64)> + '_ {
    (0..SCREEN_WIDTH * SCREEN_HEIGHT).filter_map(move |px| {
        let bit = data[px / 8] >> (7 - px % 8) & 1;
        if bit != bitplane {
            return None;
        }
        Some((
            (px % SCREEN_WIDTH) as f64,
            -1.0 * (px / SCREEN_WIDTH) as f64,
        ))
    })
}

/// monochrome display in a terminal, rendered using TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            FRAME_BYTES,
            "MonoTermDisplay must have correct-sized data to draw"
        );

        // 1:1 ratio between terminal cells, chip-8 pixels and the internal
        // TUI canvas; the +2s leave room for the border
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + SCREEN_WIDTH as u16, 2 + SCREEN_HEIGHT as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds([0.0, (SCREEN_WIDTH - 1) as f64])
                .y_bounds([-1.0 * (SCREEN_HEIGHT - 1) as f64, 0.0])
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &bitplane_points(data, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &bitplane_points(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay;

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay {}
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _data: &[u8]) -> Result<(), io::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_has_no_lit_points() {
        let data = [0u8; FRAME_BYTES];
        assert_eq!(bitplane_points(&data, 1).count(), 0);
        assert_eq!(bitplane_points(&data, 0).count(), SCREEN_WIDTH * SCREEN_HEIGHT);
    }

    #[test]
    fn test_planes_partition_the_frame() {
        let mut data = [0u8; FRAME_BYTES];
        data[0] = 0b1010_0000;
        let on = bitplane_points(&data, 1).count();
        let off = bitplane_points(&data, 0).count();
        assert_eq!(on, 2);
        assert_eq!(on + off, SCREEN_WIDTH * SCREEN_HEIGHT);
    }

    #[test]
    fn test_point_coordinates() {
        let mut data = [0u8; FRAME_BYTES];
        // second row, third pixel: px = 64 + 2
        data[(64 + 2) / 8] = 0x80 >> ((64 + 2) % 8);
        let points: Vec<_> = bitplane_points(&data, 1).collect();
        assert_eq!(points, vec![(2.0, -1.0)]);
    }

    #[test]
    fn test_dummy_accepts_any_frame() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&[0; FRAME_BYTES])
    }
}
