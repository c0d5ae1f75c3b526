use folio_core::models::ProofOfConcept;
use ratatui::text::{Line, Span};

use super::ViewLines;
use crate::ui::styles;

pub fn lines(pocs: &[ProofOfConcept], width: usize) -> ViewLines {
    let mut out = ViewLines::default();
    out.heading("Proofs of Concept");
    out.blank();

    for poc in pocs {
        out.push(Line::from(Span::styled(poc.title.clone(), styles::title_style())));
        out.paragraph(&poc.summary, width, 2);
        for (i, step) in poc.steps.iter().enumerate() {
            out.paragraph(&format!("{}. {}", i + 1, step), width, 4);
        }
        out.blank();
    }
    out
}
