use folio_core::models::{Profile, SectionId};
use folio_core::orchestrator::SectionBounds;
use ratatui::text::{Line, Span};

use super::ViewLines;
use crate::ui::styles;

pub fn lines(profile: &Profile, width: usize) -> ViewLines {
    let mut out = ViewLines::default();

    for section in SectionId::ALL {
        let top = out.len();
        match section {
            SectionId::About => about(&mut out, profile, width),
            SectionId::Education => education(&mut out, profile),
            SectionId::Skills => skills(&mut out, profile, width),
            SectionId::Certificate => certificates(&mut out, profile),
            SectionId::Experience => experience(&mut out, profile, width),
        }
        out.blank();
        out.sections.push(SectionBounds {
            section,
            top,
            height: out.len() - top,
        });
    }
    out
}

fn about(out: &mut ViewLines, profile: &Profile, width: usize) {
    out.push(Line::from(Span::styled(profile.name.clone(), styles::title_style())));
    out.push(Line::from(Span::styled(
        profile.headline.clone(),
        styles::highlight_style(),
    )));
    out.blank();
    for paragraph in &profile.bio {
        out.paragraph(paragraph, width, 0);
        out.blank();
    }
}

fn education(out: &mut ViewLines, profile: &Profile) {
    out.heading(SectionId::Education.title());
    for entry in &profile.education {
        out.push(Line::from(vec![
            Span::styled(format!("  {}", entry.degree), styles::list_item_style()),
            Span::styled(format!("  {}", entry.period), styles::muted_style()),
        ]));
        out.push(Line::from(Span::styled(
            format!("    {}", entry.school),
            styles::muted_style(),
        )));
    }
}

fn skills(out: &mut ViewLines, profile: &Profile, width: usize) {
    out.heading(SectionId::Skills.title());
    for group in &profile.skills {
        out.push(Line::from(Span::styled(
            format!("  {}", group.title),
            styles::list_item_style(),
        )));
        out.paragraph(&group.skills.join(" · "), width, 4);
    }
}

fn certificates(out: &mut ViewLines, profile: &Profile) {
    out.heading(SectionId::Certificate.title());
    for cert in &profile.certificates {
        let year = cert
            .year
            .as_deref()
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        out.push(Line::from(vec![
            Span::styled(format!("  {}", cert.name), styles::list_item_style()),
            Span::styled(format!(" - {}{}", cert.issuer, year), styles::muted_style()),
        ]));
    }
}

fn experience(out: &mut ViewLines, profile: &Profile, width: usize) {
    out.heading(SectionId::Experience.title());
    for job in &profile.experience {
        out.push(Line::from(vec![
            Span::styled(format!("  {} @ {}", job.role, job.company), styles::list_item_style()),
            Span::styled(format!("  {}", job.period), styles::muted_style()),
        ]));
        for highlight in &job.highlights {
            out.paragraph(&format!("- {}", highlight), width, 4);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::content;
    use folio_core::models::{ViewContent, ViewId};

    #[test]
    fn test_sections_cover_all_lines_in_order() {
        let ViewContent::Home(profile) = content::bundled(ViewId::Home) else {
            panic!("bundled home content");
        };
        let out = lines(&profile, 60);

        let order: Vec<_> = out.sections.iter().map(|s| s.section).collect();
        assert_eq!(order, SectionId::ALL.to_vec());
        assert_eq!(out.sections[0].top, 0);
        for pair in out.sections.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].top);
        }
        assert_eq!(out.sections[4].bottom(), out.len());
    }
}
