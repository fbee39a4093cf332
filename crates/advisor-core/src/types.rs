//! Common types used across the advisor

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// A fixed knowledge category with its own document set and vector index
///
/// Declaration order is the classification tie-break priority and the order in
/// which domains are built and concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Moving workloads from a legacy platform
    Migration,
    /// Workspace, compute and security design
    Architecture,
    /// DBU consumption and pricing
    Costing,
}

impl Domain {
    /// All domains, in priority order
    pub const ALL: [Domain; 3] = [Domain::Migration, Domain::Architecture, Domain::Costing];

    /// Collection and directory name for this domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Migration => "migration",
            Domain::Architecture => "architecture",
            Domain::Costing => "costing",
        }
    }

    /// Upper-case tag shown next to retrieved references
    pub fn tag(&self) -> &'static str {
        match self {
            Domain::Migration => "MIGRATION",
            Domain::Architecture => "ARCHITECTURE",
            Domain::Costing => "COSTING",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "migration" => Ok(Domain::Migration),
            "architecture" => Ok(Domain::Architecture),
            "costing" => Ok(Domain::Costing),
            other => Err(Error::InvalidInput(format!(
                "unknown domain '{}', expected migration, architecture or costing",
                other
            ))),
        }
    }
}

/// Which domain indexes a query should be answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainSelector {
    Single(Domain),
    /// Broad fallback search across every domain
    All,
}

impl DomainSelector {
    /// Domains covered by this selector, in priority order
    pub fn domains(&self) -> Vec<Domain> {
        match self {
            DomainSelector::Single(domain) => vec![*domain],
            DomainSelector::All => Domain::ALL.to_vec(),
        }
    }
}

impl std::fmt::Display for DomainSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainSelector::Single(domain) => write!(f, "{}", domain),
            DomainSelector::All => f.write_str("all"),
        }
    }
}

/// Raw text fetched from one URL, tagged with the domain it was fetched for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub url: String,
    pub text: String,
    pub domain: Domain,
}

impl SourceDocument {
    pub fn new(url: impl Into<String>, text: impl Into<String>, domain: Domain) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            domain,
        }
    }
}

/// A bounded span of a source document, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub domain: Domain,
    pub source_url: String,
    /// Position of this chunk within its source document
    pub ordinal: usize,
}

/// A retrieved chunk and its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation log or of an outbound completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
