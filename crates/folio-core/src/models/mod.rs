//! Data models for the portfolio.
//!
//! - `view`: view identifiers and the home view's section anchors
//! - `content`: the content each view renders once it is ready

pub mod content;
pub mod view;

pub use content::{
    Certificate, ContactDetails, Education, Experience, Profile, Project, ProofOfConcept,
    SkillGroup, ViewContent,
};
pub use view::{SectionId, ViewId};
