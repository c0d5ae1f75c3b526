//! Content rendered by each view.
//!
//! The same types deserialize from the remote `/api/views/{slug}.json`
//! documents, so field names follow the JSON published with the site.

use serde::{Deserialize, Serialize};

use super::view::ViewId;

/// Content for a single view, tagged with the view it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ViewContent {
    Home(Profile),
    Project(Vec<Project>),
    Poc(Vec<ProofOfConcept>),
    Contact(ContactDetails),
}

impl ViewContent {
    pub fn view(&self) -> ViewId {
        match self {
            ViewContent::Home(_) => ViewId::Home,
            ViewContent::Project(_) => ViewId::Project,
            ViewContent::Poc(_) => ViewId::Poc,
            ViewContent::Contact(_) => ViewId::Contact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    #[serde(default)]
    pub bio: Vec<String>,
    /// Path of the profile picture on the portfolio origin.
    #[serde(rename = "imagePath", default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofOfConcept {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_project_document() {
        let json = r#"{"view":"project","data":[{"title":"Folio","summary":"Portfolio","tech":["Rust"]}]}"#;
        let content: ViewContent =
            serde_json::from_str(json).expect("Failed to parse project test JSON");
        assert_eq!(content.view(), ViewId::Project);
        match content {
            ViewContent::Project(projects) => {
                assert_eq!(projects.len(), 1);
                assert_eq!(projects[0].tech, vec!["Rust".to_string()]);
                assert!(projects[0].link.is_none());
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_parse_profile_defaults_missing_lists() {
        let json = r#"{"view":"home","data":{"name":"A","headline":"B"}}"#;
        let content: ViewContent = serde_json::from_str(json).expect("parse");
        let ViewContent::Home(profile) = content else {
            panic!("expected home content");
        };
        assert!(profile.education.is_empty());
        assert!(profile.image_path.is_none());
    }
}
