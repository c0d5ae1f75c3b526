//! Placeholder rendering for views whose content is not ready yet.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

const BLOCK: char = '▒';

/// Replace every visible character with a placeholder block, keeping the
/// layout of the real content. `style` carries the current pulse colour.
pub fn skeletonize(lines: &[Line<'_>], style: Style) -> Vec<Line<'static>> {
    lines
        .iter()
        .map(|line| {
            let text: String = line
                .spans
                .iter()
                .flat_map(|span| span.content.chars())
                .map(|c| if c.is_whitespace() { c } else { BLOCK })
                .collect();
            Line::from(Span::styled(text, style))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::styles;

    #[test]
    fn test_skeleton_keeps_shape() {
        let lines = vec![Line::from(vec![Span::raw("ab "), Span::raw("c")]), Line::from("")];
        let skeleton = skeletonize(&lines, styles::skeleton_style(0.0));
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton[0].spans[0].content, "▒▒ ▒");
        assert_eq!(skeleton[1].spans[0].content, "");
    }
}
