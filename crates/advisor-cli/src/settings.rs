//! Runtime settings read from the environment

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use advisor_core::{Error, Result};
use advisor_rag::{DEFAULT_CONTEXT_K, DomainSources, KnowledgeBaseConfig, knowledge_base::DEFAULT_KB_DIR};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Advisor settings, overridable by command-line flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorSettings {
    pub kb_dir: PathBuf,
    pub context_k: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub sources_file: Option<PathBuf>,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            kb_dir: PathBuf::from(DEFAULT_KB_DIR),
            context_k: DEFAULT_CONTEXT_K,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            sources_file: None,
        }
    }
}

impl AdvisorSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let context_k = match value("ADVISOR_CONTEXT_K") {
            Some(raw) => parse_var::<usize>("ADVISOR_CONTEXT_K", &raw)?,
            None => defaults.context_k,
        };
        if context_k == 0 {
            return Err(Error::Configuration(
                "ADVISOR_CONTEXT_K must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            kb_dir: value("ADVISOR_KB_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.kb_dir),
            context_k,
            temperature: match value("ADVISOR_TEMPERATURE") {
                Some(raw) => parse_var("ADVISOR_TEMPERATURE", &raw)?,
                None => defaults.temperature,
            },
            max_tokens: match value("ADVISOR_MAX_TOKENS") {
                Some(raw) => parse_var("ADVISOR_MAX_TOKENS", &raw)?,
                None => defaults.max_tokens,
            },
            sources_file: value("ADVISOR_SOURCES_FILE").map(PathBuf::from),
        })
    }

    pub fn knowledge_base_config(&self) -> KnowledgeBaseConfig {
        KnowledgeBaseConfig::new(&self.kb_dir)
    }

    /// Documentation URL lists, from the sources file when one is configured
    pub fn sources(&self) -> Result<DomainSources> {
        match &self.sources_file {
            Some(path) => DomainSources::load(path),
            None => Ok(DomainSources::default()),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::Configuration(format!("{} has an invalid value '{}'", name, raw))
    })
}
