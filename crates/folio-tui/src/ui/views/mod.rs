//! Line builders for each view.
//!
//! Every builder returns the full, unscrolled text of its view; the render
//! layer slices it by the scroll offset.

pub mod contact;
pub mod home;
pub mod poc;
pub mod project;
pub mod skeleton;

use folio_core::models::ViewContent;
use folio_core::orchestrator::SectionBounds;
use ratatui::text::{Line, Span};

use crate::app::App;

use super::styles;

/// Rendered text of a view plus the home view's section anchors.
#[derive(Default)]
pub struct ViewLines {
    pub lines: Vec<Line<'static>>,
    pub sections: Vec<SectionBounds>,
}

impl ViewLines {
    pub fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    pub fn heading(&mut self, text: &str) {
        self.lines
            .push(Line::from(Span::styled(text.to_string(), styles::heading_style())));
    }

    /// Word-wrapped paragraph, indented by `indent` spaces.
    pub fn paragraph(&mut self, text: &str, width: usize, indent: usize) {
        let pad = " ".repeat(indent);
        for row in wrap_text(text, width.saturating_sub(indent)) {
            self.lines.push(Line::from(format!("{}{}", pad, row)));
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Build the lines for `content` at the given width.
pub fn build(app: &App, content: &ViewContent, width: u16) -> ViewLines {
    let width = width as usize;
    match content {
        ViewContent::Home(profile) => home::lines(profile, width),
        ViewContent::Project(projects) => project::lines(projects, width),
        ViewContent::Poc(pocs) => poc::lines(pocs, width),
        ViewContent::Contact(details) => contact::lines(app, details, width),
    }
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            rows.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_text_zero_width() {
        assert_eq!(wrap_text("ab", 0), vec!["a", "b"]);
    }
}
