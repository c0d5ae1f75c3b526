use folio_core::models::Project;
use ratatui::text::{Line, Span};

use super::ViewLines;
use crate::ui::styles;

pub fn lines(projects: &[Project], width: usize) -> ViewLines {
    let mut out = ViewLines::default();
    out.heading("Projects");
    out.blank();

    if projects.is_empty() {
        out.push(Line::from(Span::styled("No projects yet", styles::muted_style())));
        return out;
    }

    for project in projects {
        out.push(Line::from(Span::styled(
            project.title.clone(),
            styles::title_style(),
        )));
        out.paragraph(&project.summary, width, 2);
        if !project.tech.is_empty() {
            out.push(Line::from(vec![
                Span::styled("  Tech: ", styles::muted_style()),
                Span::styled(project.tech.join(", "), styles::highlight_style()),
            ]));
        }
        if let Some(link) = &project.link {
            out.push(Line::from(Span::styled(format!("  {}", link), styles::muted_style())));
        }
        out.blank();
    }
    out
}
