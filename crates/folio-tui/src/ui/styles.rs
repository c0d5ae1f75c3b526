//! Terminal palette for folio.

use ratatui::style::{Color, Modifier, Style};

// Palette
pub const PRIMARY: Color = Color::Rgb(94, 129, 244);
pub const ACCENT: Color = Color::Rgb(236, 178, 96);
pub const SUCCESS: Color = Color::Rgb(110, 190, 140);
pub const ERROR: Color = Color::Rgb(224, 96, 96);
pub const MUTED: Color = Color::Rgb(120, 124, 140);
pub const TEXT: Color = Color::Rgb(226, 228, 236);
pub const SELECTION: Color = Color::Rgb(40, 44, 64);
pub const STATUS_BAR: Color = Color::Rgb(24, 26, 36);
/// Placeholder blocks drawn while a view is not ready.
pub const SKELETON: Color = Color::Rgb(60, 64, 82);
/// Brightest point of the skeleton pulse.
pub const SKELETON_PULSE: Color = Color::Rgb(98, 104, 132);

pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().fg(TEXT).bg(SELECTION).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        title_style().add_modifier(Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

/// Borders of the focused pane use the primary colour.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(SKELETON)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BAR).fg(TEXT)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}

/// Skeleton colour at `level` of the pulse, 0.0 dim to 1.0 bright.
pub fn skeleton_style(level: f32) -> Style {
    Style::default().fg(blend(SKELETON, SKELETON_PULSE, level))
}

fn blend(from: Color, to: Color, t: f32) -> Color {
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let t = t.clamp(0.0, 1.0);
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ => from,
    }
}

/// Dims content during the faded half of a transition.
pub fn fade_style(opacity: f32) -> Style {
    if opacity < 0.5 {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_style_spans_pulse_range() {
        assert_eq!(skeleton_style(0.0).fg, Some(SKELETON));
        assert_eq!(skeleton_style(1.0).fg, Some(SKELETON_PULSE));
        assert_eq!(skeleton_style(7.0).fg, Some(SKELETON_PULSE));
        assert_eq!(skeleton_style(0.5).fg, Some(Color::Rgb(79, 84, 107)));
    }
}
