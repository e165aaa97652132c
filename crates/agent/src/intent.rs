use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowError;

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Experience,
    Skills,
    Projects,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Experience => "experience",
            Intent::Skills => "skills",
            Intent::Projects => "projects",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a user query to one [`Intent`]. The workflow accepts any
/// implementation through its [`ServiceContext`](crate::ServiceContext).
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<Intent, WorkflowError>;
}

/// Substring keyword matching over a lower-cased query.
///
/// Categories are tested in table order and the first with any matching
/// keyword wins; a query matching nothing is [`Intent::General`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    table: Vec<(Intent, Vec<String>)>,
}

impl KeywordClassifier {
    pub fn new(table: Vec<(Intent, Vec<String>)>) -> Self {
        Self { table }
    }

    pub fn classify_query(&self, query: &str) -> Intent {
        let lowered = query.to_lowercase();
        self.table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::General)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        let table: [(Intent, &[&str]); 4] = [
            (Intent::Experience, &["experience", "worked", "job", "role", "company"]),
            (Intent::Skills, &["skills", "know", "proficient", "technology", "tech"]),
            (Intent::Projects, &["project", "built", "developed", "created"]),
            (
                Intent::General,
                &["who", "tell", "about", "background", "contact", "email", "reach"],
            ),
        ];
        Self::new(
            table
                .iter()
                .map(|(intent, words)| (*intent, words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        )
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, query: &str) -> Result<Intent, WorkflowError> {
        Ok(self.classify_query(query))
    }
}
