//! Portfolio profile record and its rendering into retrievable documents.
//!
//! The profile is a static JSON file. Every field is optional on disk; missing
//! values render as `N/A` so a partially filled profile still produces one
//! document per section entry.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PersonaError;

const MISSING: &str = "N/A";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub contact: Contact,
    /// Category → skills, in file order.
    #[serde(default)]
    pub skills: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub contribution: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

fn or_missing(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}

impl ProfileRecord {
    /// Read and parse a profile JSON file.
    pub fn load(path: &Path) -> Result<Self, PersonaError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PersonaError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Render every section entry as a standalone document, in the order
    /// experience, projects, education, skills, bio.
    pub fn documents(&self) -> Vec<String> {
        let mut docs = Vec::new();

        for exp in &self.experience {
            docs.push(format!(
                "Role: {}\nCompany: {}\nDuration: {}\nDescription: {}",
                or_missing(&exp.role),
                or_missing(&exp.company),
                or_missing(&exp.duration),
                or_missing(&exp.description),
            ));
        }

        for proj in &self.projects {
            docs.push(format!(
                "Project: {}\nTechnologies: {}\nDescription: {}\nContribution: {}",
                or_missing(&proj.title),
                proj.technologies.join(", "),
                or_missing(&proj.description),
                or_missing(&proj.contribution),
            ));
        }

        for edu in &self.education {
            docs.push(format!(
                "Degree: {}\nInstitution: {}\nDuration: {}",
                or_missing(&edu.degree),
                or_missing(&edu.institution),
                or_missing(&edu.duration),
            ));
        }

        for (category, skills) in &self.skills {
            docs.push(format!("Skill Category: {}\nSkills: {}", category, skills.join(", ")));
        }

        docs.push(format!(
            "Name: {}\nRole: {}\nBio: {}\nEmail: {}\nLocation: {}",
            or_missing(&self.name),
            or_missing(&self.role),
            or_missing(&self.bio),
            or_missing(&self.contact.email),
            or_missing(&self.contact.location),
        ));

        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Sam Doe",
        "role": "Engineer",
        "bio": "Builds things.",
        "contact": { "email": "sam@example.com", "location": "Perth" },
        "skills": { "Languages": ["Rust", "Go"], "Cloud": ["AWS"] },
        "experience": [{ "role": "Dev", "company": "Acme", "duration": "2022", "description": "Shipped." }],
        "projects": [{ "title": "Crawler", "technologies": ["Rust", "Tokio"], "description": "Fast.", "liveUrl": "https://x" }],
        "education": [{ "degree": "BSc", "institution": "UWA" }]
    }"#;

    #[test]
    fn renders_sections_in_order() {
        let profile = ProfileRecord::from_json(SAMPLE).unwrap();
        let docs = profile.documents();
        assert_eq!(docs.len(), 6);
        assert!(docs[0].starts_with("Role: Dev\nCompany: Acme"));
        assert!(docs[1].starts_with("Project: Crawler\nTechnologies: Rust, Tokio"));
        assert!(docs[2].starts_with("Degree: BSc"));
        assert_eq!(docs[3], "Skill Category: Languages\nSkills: Rust, Go");
        assert_eq!(docs[4], "Skill Category: Cloud\nSkills: AWS");
        assert!(docs[5].starts_with("Name: Sam Doe\nRole: Engineer"));
    }

    #[test]
    fn missing_fields_render_as_na() {
        let profile = ProfileRecord::from_json(SAMPLE).unwrap();
        let docs = profile.documents();
        assert!(docs[1].ends_with("Contribution: N/A"));
        assert!(docs[2].ends_with("Duration: N/A"));
    }

    #[test]
    fn empty_object_still_yields_bio_document() {
        let profile = ProfileRecord::from_json("{}").unwrap();
        let docs = profile.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], "Name: N/A\nRole: N/A\nBio: N/A\nEmail: N/A\nLocation: N/A");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(ProfileRecord::from_json("{ not json"), Err(PersonaError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProfileRecord::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PersonaError::Io(_)));
    }
}
