use folio_core::contact::{ContactField, SubmitStatus};
use folio_core::models::ContactDetails;
use ratatui::text::{Line, Span};

use super::ViewLines;
use crate::app::{App, FormFocus};
use crate::ui::styles;

/// Width of the input boxes, excluding brackets.
const FIELD_WIDTH: usize = 40;

pub fn lines(app: &App, details: &ContactDetails, width: usize) -> ViewLines {
    let mut out = ViewLines::default();
    out.heading("Get in touch");
    out.blank();

    out.push(Line::from(vec![
        Span::styled("  Email:    ", styles::muted_style()),
        Span::styled(details.email.clone(), styles::list_item_style()),
    ]));
    if let Some(location) = &details.location {
        out.push(Line::from(vec![
            Span::styled("  Location: ", styles::muted_style()),
            Span::styled(location.clone(), styles::list_item_style()),
        ]));
    }
    for link in &details.links {
        out.push(Line::from(Span::styled(format!("  {}", link), styles::highlight_style())));
    }
    out.blank();

    form(&mut out, app, width);
    out
}

fn form(out: &mut ViewLines, app: &App, width: usize) {
    let hint = if app.editing_form {
        "Tab/Shift+Tab move, Enter sends, Esc stops editing"
    } else {
        "Press [e] to write a message"
    };
    out.heading("Send a message");
    out.push(Line::from(Span::styled(format!("  {}", hint), styles::muted_style())));
    out.blank();

    let field_width = FIELD_WIDTH.min(width.saturating_sub(20)).max(8);
    for field in ContactField::ALL {
        let focused = app.editing_form && app.form_focus == FormFocus::Field(field);
        let value = app.form.field(field);
        let marker = if field.is_required() { "*" } else { " " };
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };

        if field == ContactField::Message {
            out.push(Line::from(Span::styled(
                format!("  {}{}", field.label(), marker),
                styles::muted_style(),
            )));
            let rows = super::wrap_text(value, field_width);
            let last = rows.len() - 1;
            for (i, row) in rows.into_iter().enumerate() {
                let text = if i == last {
                    format!("{}{}", row, cursor)
                } else {
                    row
                };
                out.push(Line::from(vec![
                    Span::styled("  │ ", styles::muted_style()),
                    Span::styled(format!("{:<w$}", text, w = field_width), style),
                ]));
            }
        } else {
            out.push(Line::from(vec![
                Span::styled(format!("  {:<14}{}[", field.label(), marker), styles::muted_style()),
                Span::styled(
                    format!("{:<w$}", format!("{}{}", tail(value, field_width), cursor), w = field_width),
                    style,
                ),
                Span::styled("]", styles::muted_style()),
            ]));
        }
    }
    out.blank();

    let button_focused = app.editing_form && app.form_focus == FormFocus::Send;
    let label = match app.submit_status {
        SubmitStatus::Sending => "  Sending  ",
        _ if button_focused => " ▶ Send ◀ ",
        _ => "   Send   ",
    };
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    out.push(Line::from(vec![
        Span::raw("  ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(message) = app.submit_status.message() {
        let style = if app.submit_status.is_error() {
            styles::error_style()
        } else {
            styles::success_style()
        };
        out.blank();
        out.push(Line::from(Span::styled(format!("  {}", message), style)));
    }
}

/// The last `width` characters of `value`, so the cursor stays visible.
fn tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width.saturating_sub(1))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_keeps_room_for_cursor() {
        assert_eq!(tail("hello", 10), "hello");
        assert_eq!(tail("hello", 3), "lo");
    }
}
