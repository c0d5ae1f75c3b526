//! Bundled portfolio content.
//!
//! Used when no origin is configured. Kept deliberately small; the full
//! text lives on the published site.

use crate::models::{
    Certificate, ContactDetails, Education, Experience, Profile, Project, ProofOfConcept,
    SkillGroup, ViewContent, ViewId,
};

/// Bundled content for a view.
pub fn bundled(view: ViewId) -> ViewContent {
    match view {
        ViewId::Home => ViewContent::Home(profile()),
        ViewId::Project => ViewContent::Project(projects()),
        ViewId::Poc => ViewContent::Poc(proofs_of_concept()),
        ViewId::Contact => ViewContent::Contact(contact()),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn profile() -> Profile {
    Profile {
        name: "Arthi Harikrishnan".to_string(),
        headline: "DevOps & Cloud Engineer".to_string(),
        bio: strings(&[
            "Engineer focused on cloud infrastructure, automation and reliable delivery pipelines.",
            "Enjoys turning manual runbooks into repeatable, observable tooling.",
        ]),
        image_path: Some("/static/media/profile.png".to_string()),
        education: vec![
            Education {
                degree: "M.S. Computer Science".to_string(),
                school: "University".to_string(),
                period: "2022 - 2024".to_string(),
            },
            Education {
                degree: "B.E. Computer Science".to_string(),
                school: "Engineering College".to_string(),
                period: "2015 - 2019".to_string(),
            },
        ],
        skills: vec![
            SkillGroup {
                title: "Programming Languages".to_string(),
                skills: strings(&["JavaScript", "Python", "Go", "Shell Scripting"]),
            },
            SkillGroup {
                title: "Cloud & DevOps".to_string(),
                skills: strings(&["AWS", "Docker", "Kubernetes", "Terraform", "Jenkins"]),
            },
            SkillGroup {
                title: "Monitoring".to_string(),
                skills: strings(&["Prometheus", "Grafana", "ELK"]),
            },
        ],
        certificates: vec![
            Certificate {
                name: "AWS Certified Solutions Architect".to_string(),
                issuer: "Amazon Web Services".to_string(),
                year: Some("2023".to_string()),
            },
            Certificate {
                name: "Certified Kubernetes Administrator".to_string(),
                issuer: "CNCF".to_string(),
                year: None,
            },
        ],
        experience: vec![
            Experience {
                role: "DevOps Engineer".to_string(),
                company: "Cloud Services Co.".to_string(),
                period: "2019 - 2022".to_string(),
                highlights: strings(&[
                    "Built CI/CD pipelines for microservices on Kubernetes",
                    "Automated infrastructure provisioning with Terraform",
                    "Cut deployment lead time with blue/green releases",
                ]),
            },
        ],
    }
}

fn projects() -> Vec<Project> {
    vec![
        Project {
            title: "Portfolio".to_string(),
            summary: "Personal portfolio with offline support and lazy-loaded views.".to_string(),
            tech: strings(&["React", "Service Worker", "Tailwind"]),
            link: None,
        },
        Project {
            title: "Kubernetes Autoscaling Lab".to_string(),
            summary: "Horizontal pod autoscaling driven by custom Prometheus metrics.".to_string(),
            tech: strings(&["Kubernetes", "Prometheus", "Helm"]),
            link: None,
        },
        Project {
            title: "Infrastructure as Code Starter".to_string(),
            summary: "Reusable Terraform modules for VPC, EKS and RDS.".to_string(),
            tech: strings(&["Terraform", "AWS"]),
            link: None,
        },
    ]
}

fn proofs_of_concept() -> Vec<ProofOfConcept> {
    vec![
        ProofOfConcept {
            title: "GitOps with Argo CD".to_string(),
            summary: "Declarative deployments reconciled from a Git repository.".to_string(),
            steps: strings(&[
                "Install Argo CD into the cluster",
                "Register the application repository",
                "Promote changes through pull requests",
            ]),
        },
        ProofOfConcept {
            title: "Centralized Logging".to_string(),
            summary: "Shipping container logs to Elasticsearch with Fluent Bit.".to_string(),
            steps: strings(&[
                "Deploy Fluent Bit as a DaemonSet",
                "Parse and enrich Kubernetes metadata",
                "Build Kibana dashboards per namespace",
            ]),
        },
    ]
}

fn contact() -> ContactDetails {
    ContactDetails {
        email: "hello@example.com".to_string(),
        location: Some("Remote".to_string()),
        links: strings(&["https://github.com/", "https://linkedin.com/"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_content_matches_view() {
        for view in ViewId::ALL {
            assert_eq!(bundled(view).view(), view);
        }
    }
}
