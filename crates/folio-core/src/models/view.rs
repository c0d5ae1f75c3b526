use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level views reachable from the navigation sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// Biography view, also the default route target.
    Home,
    Project,
    Poc,
    Contact,
}

impl ViewId {
    pub const ALL: [ViewId; 4] = [ViewId::Home, ViewId::Project, ViewId::Poc, ViewId::Contact];

    /// Get the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            ViewId::Home => "Home",
            ViewId::Project => "Projects",
            ViewId::Poc => "POC",
            ViewId::Contact => "Contact",
        }
    }

    /// Path segment used both for routes and remote content files.
    pub fn slug(&self) -> &'static str {
        match self {
            ViewId::Home => "home",
            ViewId::Project => "project",
            ViewId::Poc => "poc",
            ViewId::Contact => "contact",
        }
    }

    /// Canonical route path for this view.
    pub fn path(&self) -> String {
        format!("/{}", self.slug())
    }

    /// Get the next view (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            ViewId::Home => ViewId::Project,
            ViewId::Project => ViewId::Poc,
            ViewId::Poc => ViewId::Contact,
            ViewId::Contact => ViewId::Home,
        }
    }

    /// Get the previous view (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            ViewId::Home => ViewId::Contact,
            ViewId::Project => ViewId::Home,
            ViewId::Poc => ViewId::Project,
            ViewId::Contact => ViewId::Poc,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Section anchors of the home view, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    About,
    Education,
    Skills,
    Certificate,
    Experience,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::About,
        SectionId::Education,
        SectionId::Skills,
        SectionId::Certificate,
        SectionId::Experience,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionId::About => "About",
            SectionId::Education => "Education",
            SectionId::Skills => "Skills",
            SectionId::Certificate => "Certificates",
            SectionId::Experience => "Experience",
        }
    }

    /// The section after this one in document order, wrapping to the first.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}
