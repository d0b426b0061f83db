//! Certifications shown on the site.
//!
//! The data file is a JSON array of camelCase records. A missing, invalid
//! or empty file falls back to [`default_certifications`].

use crate::error::CertsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Section a certification is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Professional,
    Academic,
    Competitions,
    Recognition,
}

impl Category {
    /// Display order.
    pub const ALL: [Category; 4] = [
        Category::Professional,
        Category::Academic,
        Category::Competitions,
        Category::Recognition,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Professional => "Professional Certifications",
            Category::Academic => "Academic Awards",
            Category::Competitions => "Competition Results",
            Category::Recognition => "Project Recognition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    /// `Mon YYYY` when normalized; free text otherwise.
    #[serde(default)]
    pub issued_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub category: Category,
}

impl Certification {
    /// Lowercase `(name, issuer)`, the identity used when merging.
    pub fn merge_key(&self) -> (String, String) {
        (self.name.to_lowercase(), self.issuer.to_lowercase())
    }
}

fn cert(id: &str, name: &str, issuer: &str, issued: &str, skills: &[&str]) -> Certification {
    Certification {
        id: id.into(),
        name: name.into(),
        issuer: issuer.into(),
        issued_date: issued.into(),
        credential_id: None,
        credential_url: None,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        category: Category::Professional,
    }
}

/// The list shipped with the site, used when no data file is available.
pub fn default_certifications() -> Vec<Certification> {
    vec![
        cert(
            "oracle-oci-generative-ai-professional",
            "OCI Generative AI Professional",
            "Oracle",
            "Sep 2024",
            &["Generative AI", "LLMs", "OCI"],
        ),
        cert(
            "oracle-oci-foundations-associate",
            "Oracle Cloud Infrastructure Foundations Associate",
            "Oracle",
            "Aug 2024",
            &["Cloud", "OCI"],
        ),
        cert(
            "forage-cybersecurity-job-simulation",
            "Cybersecurity Job Simulation",
            "Forage",
            "Jul 2024",
            &["Security", "Incident Response"],
        ),
        cert(
            "kaggle-intro-to-machine-learning",
            "Intro to Machine Learning",
            "Kaggle",
            "Jun 2024",
            &["Python", "Machine Learning"],
        ),
    ]
}

/// Parse a certifications JSON array.
pub fn parse(json: &str) -> Result<Vec<Certification>, CertsError> {
    Ok(serde_json::from_str(json)?)
}

/// Read `path`, falling back to the defaults on any failure or an empty list.
pub fn load_or_default(path: impl AsRef<Path>) -> Vec<Certification> {
    let path = path.as_ref();
    let loaded = fs::read_to_string(path)
        .map_err(CertsError::from)
        .and_then(|json| parse(&json));
    match loaded {
        Ok(certs) if !certs.is_empty() => certs,
        Ok(_) => {
            debug!(path = %path.display(), "certifications file is empty, using defaults");
            default_certifications()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default certifications");
            default_certifications()
        }
    }
}

/// Certifications per category in display order. Empty categories are omitted.
pub fn group_by_category(certs: &[Certification]) -> Vec<(Category, Vec<&Certification>)> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<_> = certs.iter().filter(|c| c.category == category).collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}
