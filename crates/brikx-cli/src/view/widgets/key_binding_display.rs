use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::Widget,
};

/// Keys that trigger an action, with a short description.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    keys: &'static [&'static str],
    description: &'static str,
}

impl KeyBinding {
    pub const fn new(keys: &'static [&'static str], description: &'static str) -> Self {
        Self { keys, description }
    }

    fn spans(self) -> impl Iterator<Item = Span<'static>> {
        let keys = self.keys.iter().enumerate().flat_map(|(i, key)| {
            let separator = (i > 0).then(|| Span::styled("/", KEY_SEPARATOR_STYLE));
            separator
                .into_iter()
                .chain([Span::styled(*key, KEY_STYLE)])
        });
        keys.chain([
            Span::from(" "),
            Span::styled(self.description, DESCRIPTION_STYLE),
        ])
    }

    fn width(self) -> usize {
        self.spans().map(|span| span.width()).sum()
    }
}

/// Help line listing key bindings, wrapped onto more lines when the area is
/// too narrow.
#[derive(Debug)]
pub struct KeyBindingDisplay<'a> {
    bindings: &'a [KeyBinding],
}

impl<'a> KeyBindingDisplay<'a> {
    pub fn new(bindings: &'a [KeyBinding]) -> Self {
        Self { bindings }
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![];
        let mut spans: Vec<Span<'static>> = vec![];
        let mut line_width = 0;

        for binding in self.bindings.iter().copied() {
            let binding_width = binding.width();
            if !spans.is_empty() && line_width + ITEM_SEPARATOR.len() + binding_width > width {
                lines.push(Line::from(std::mem::take(&mut spans)).centered());
                line_width = 0;
            }
            if !spans.is_empty() {
                spans.push(Span::styled(ITEM_SEPARATOR, ITEM_SEPARATOR_STYLE));
                line_width += ITEM_SEPARATOR.len();
            }
            spans.extend(binding.spans());
            line_width += binding_width;
        }
        if !spans.is_empty() {
            lines.push(Line::from(spans).centered());
        }
        lines
    }
}

const ITEM_SEPARATOR: &str = " | ";
const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
const KEY_SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);
const DESCRIPTION_STYLE: Style = Style::new().fg(Color::White);
const ITEM_SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);

impl Widget for KeyBindingDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Text::from(self.lines(usize::from(area.width))).render(area, buf);
    }
}
