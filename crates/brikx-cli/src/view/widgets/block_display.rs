use brikx_engine::PieceColor;
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

use crate::view::widgets::style;

/// What a single board cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Filled(PieceColor),
    /// Landing position of the active piece.
    Ghost(PieceColor),
    /// Part of a row waiting to be removed.
    Clearing,
}

#[derive(Debug)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn from_cell(cell: CellView, show_dots: bool) -> Self {
        match cell {
            CellView::Empty => {
                if show_dots {
                    Self::new(style::EMPTY_DOT, ".")
                } else {
                    Self::new(style::EMPTY, "")
                }
            }
            CellView::Filled(color) => {
                let color = terminal_color(color);
                Self::new(Style::new().fg(color).bg(color), "")
            }
            CellView::Ghost(color) => Self::new(style::DEFAULT.fg(terminal_color(color)), "[]"),
            CellView::Clearing => Self::new(style::CLEARING, ""),
        }
    }
}

pub fn terminal_color(color: PieceColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Use a Paragraph to fill the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
