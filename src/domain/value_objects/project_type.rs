use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosting flavor of a project's remote
///
/// The type is informational: every flavor is cloned through the same
/// generic git transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Plain git remote
    Git,
    /// GitLab hosted remote
    GitLab,
    /// Bitbucket hosted remote
    BitBucket,
}

impl Default for ProjectType {
    fn default() -> Self {
        Self::Git
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = ProjectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(ProjectType::Git),
            "gitlab" => Ok(ProjectType::GitLab),
            "bitbucket" => Ok(ProjectType::BitBucket),
            _ => Err(ProjectTypeError::InvalidType(s.to_string())),
        }
    }
}

// 大文字小文字を区別せずに読み込む
impl<'de> Deserialize<'de> for ProjectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl ProjectType {
    /// All project types, in the order they are presented to users
    pub fn available_types() -> [ProjectType; 3] {
        [ProjectType::Git, ProjectType::GitLab, ProjectType::BitBucket]
    }

    /// Lowercase identifier used in the registry file and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Git => "git",
            ProjectType::GitLab => "gitlab",
            ProjectType::BitBucket => "bitbucket",
        }
    }

    /// Comma separated list of the accepted identifiers
    pub fn available_types_label() -> String {
        Self::available_types()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Errors that can occur when parsing a project type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectTypeError {
    /// The given identifier is not one of the known project types
    InvalidType(String),
}

impl fmt::Display for ProjectTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectTypeError::InvalidType(value) => write!(
                f,
                "invalid project type '{}'. Available options are: {}",
                value,
                ProjectType::available_types_label()
            ),
        }
    }
}

impl std::error::Error for ProjectTypeError {}
