use brikx_engine::Piece;
use ratatui::{
    prelude::{Buffer, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::{BlockDisplay, PieceDisplay};

/// The upcoming pieces, top to bottom in spawn order.
///
/// The piece that spawns next is drawn solid. The rest of the lookahead is
/// drawn as outlines, since the player cannot act on it yet.
#[derive(Debug)]
pub struct PieceStackDisplay<'a> {
    upcoming: Vec<&'a Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceStackDisplay<'a> {
    pub fn new<I>(upcoming: I) -> Self
    where
        I: IntoIterator<Item = &'a Piece>,
    {
        Self {
            upcoming: upcoming.into_iter().collect(),
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn slot_height() -> u16 {
        2 * BlockDisplay::height()
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        let slots = u16::try_from(self.upcoming.len()).unwrap_or(u16::MAX);
        // One blank row between slots.
        (PieceStackDisplay::slot_height() + 1) * slots - slots.min(1)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceStackDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceStackDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let mut top = area.y;
        for (i, piece) in self.upcoming.iter().enumerate() {
            let slot = Rect::new(area.x, top, area.width, PieceStackDisplay::slot_height()).intersection(area);
            if slot.is_empty() {
                break;
            }
            PieceDisplay::new()
                .piece(Some(*piece))
                .dimmed(i > 0)
                .render(slot, buf);
            top = top.saturating_add(PieceStackDisplay::slot_height() + 1);
        }
    }
}
