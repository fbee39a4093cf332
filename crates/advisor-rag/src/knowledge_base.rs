//! Knowledge base orchestrator: build, load and query the per-domain indexes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use url::Url;

use advisor_core::{
    ContentFetcher, ContextProvider, Domain, DomainSelector, EmbeddingFunction, Error, Result,
    ScoredChunk, SourceDocument,
};

use crate::chunker::{Chunker, ChunkingConfig};
use crate::classifier::DomainClassifier;
use crate::domain_index::DomainIndex;
use crate::sources::DomainSources;

pub const DEFAULT_KB_DIR: &str = "./knowledge_bases";

/// Separator placed between formatted references
pub const REFERENCE_SEPARATOR: &str = "\n\n---\n\n";

/// Where the knowledge base lives and how documents are chunked
#[derive(Debug, Clone)]
pub struct KnowledgeBaseConfig {
    pub base_dir: PathBuf,
    pub chunking: ChunkingConfig,
}

impl KnowledgeBaseConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            chunking: ChunkingConfig::default(),
        }
    }

    /// Persisted index directory for a domain; its name is the domain name
    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        self.base_dir.join(domain.as_str())
    }

    fn staging_dir(&self, domain: Domain) -> PathBuf {
        self.base_dir.join(format!(".{}.staging", domain.as_str()))
    }

    fn backup_dir(&self, domain: Domain) -> PathBuf {
        self.base_dir.join(format!(".{}.old", domain.as_str()))
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_KB_DIR)
    }
}

/// Progress notifications emitted while building
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    DomainStarted {
        domain: Domain,
        total_urls: usize,
    },
    /// `index` is 1-based
    Fetching {
        domain: Domain,
        index: usize,
        total: usize,
        url: String,
    },
    Indexing {
        domain: Domain,
        chunks: usize,
    },
    DomainFinished(DomainBuildStats),
    DomainFailed {
        domain: Domain,
        error: String,
    },
}

/// Outcome of building one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainBuildStats {
    pub domain: Domain,
    pub documents: usize,
    pub chunks: usize,
    pub error: Option<String>,
}

impl DomainBuildStats {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of [`KnowledgeBase::build_all`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub domains: Vec<DomainBuildStats>,
    /// Whether the knowledge base loaded successfully after the build
    pub ready: bool,
}

impl BuildReport {
    pub fn failed_domains(&self) -> Vec<Domain> {
        self.domains
            .iter()
            .filter(|stats| !stats.succeeded())
            .map(|stats| stats.domain)
            .collect()
    }
}

/// On-disk state of one domain index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStatus {
    pub domain: Domain,
    pub path: PathBuf,
    pub present: bool,
    pub chunks: Option<usize>,
    pub built_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// The union of all domain indexes plus the routing over them
///
/// The knowledge base is ready only when every domain index loaded. A partially
/// present or partially loadable set of indexes is treated as absent.
pub struct KnowledgeBase {
    config: KnowledgeBaseConfig,
    sources: DomainSources,
    classifier: DomainClassifier,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingFunction>,
    fetcher: Arc<dyn ContentFetcher>,
    indexes: Option<BTreeMap<Domain, DomainIndex>>,
}

impl KnowledgeBase {
    pub fn new(
        config: KnowledgeBaseConfig,
        fetcher: Arc<dyn ContentFetcher>,
        embedder: Arc<dyn EmbeddingFunction>,
    ) -> Result<Self> {
        let chunker = Chunker::new(config.chunking)?;
        Ok(Self {
            config,
            sources: DomainSources::default(),
            classifier: DomainClassifier::new(),
            chunker,
            embedder,
            fetcher,
            indexes: None,
        })
    }

    pub fn with_sources(mut self, sources: DomainSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn config(&self) -> &KnowledgeBaseConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    pub fn is_ready(&self) -> bool {
        self.indexes.is_some()
    }

    /// Domains whose index directory is missing
    pub fn missing_domains(&self) -> Vec<Domain> {
        Domain::ALL
            .into_iter()
            .filter(|domain| !self.config.domain_dir(*domain).is_dir())
            .collect()
    }

    /// Load every persisted domain index
    ///
    /// Returns `Ok(false)` without loading anything when any domain directory is
    /// missing. Returns `Err` if every directory exists but one of them fails to
    /// load; the knowledge base then stays not ready.
    pub fn initialize(&mut self) -> Result<bool> {
        self.indexes = None;

        let missing = self.missing_domains();
        if !missing.is_empty() {
            info!(
                missing = ?missing.iter().map(Domain::as_str).collect::<Vec<_>>(),
                "Knowledge base incomplete, a full build is required"
            );
            return Ok(false);
        }

        let mut indexes = BTreeMap::new();
        for domain in Domain::ALL {
            let path = self.config.domain_dir(domain);
            match DomainIndex::load(&path, domain, self.embedder.clone()) {
                Ok(index) => {
                    indexes.insert(domain, index);
                }
                Err(e) => {
                    error!(domain = %domain, error = %e, "Failed to load domain index");
                    return Err(e);
                }
            }
        }

        info!(
            chunks = indexes.values().map(DomainIndex::len).sum::<usize>(),
            "Knowledge base loaded"
        );
        self.indexes = Some(indexes);
        Ok(true)
    }

    /// Fetch, chunk, embed and persist every domain, then reload
    ///
    /// Domains are attempted in priority order. A URL that fetches empty is
    /// skipped; a domain that fails keeps whatever index it had before.
    pub async fn build_all<F>(&mut self, mut observer: F) -> Result<BuildReport>
    where
        F: FnMut(BuildEvent) + Send,
    {
        fs::create_dir_all(&self.config.base_dir)?;
        self.indexes = None;

        let mut domains = Vec::with_capacity(Domain::ALL.len());
        for domain in Domain::ALL {
            let stats = match self.build_domain(domain, &mut observer).await {
                Ok(stats) => {
                    observer(BuildEvent::DomainFinished(stats.clone()));
                    stats
                }
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Domain build failed");
                    discard_dir(&self.config.staging_dir(domain));
                    observer(BuildEvent::DomainFailed {
                        domain,
                        error: e.to_string(),
                    });
                    DomainBuildStats {
                        domain,
                        documents: 0,
                        chunks: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            domains.push(stats);
        }

        let ready = match self.initialize() {
            Ok(ready) => ready,
            Err(e) => {
                error!(error = %e, "Knowledge base failed to load after build");
                false
            }
        };

        Ok(BuildReport { domains, ready })
    }

    async fn build_domain<F>(&self, domain: Domain, observer: &mut F) -> Result<DomainBuildStats>
    where
        F: FnMut(BuildEvent) + Send,
    {
        let urls = self.sources.unique_urls(domain);
        let total = urls.len();
        info!(domain = %domain, urls = total, "Building domain");
        observer(BuildEvent::DomainStarted {
            domain,
            total_urls: total,
        });

        let mut documents = Vec::new();
        for (i, url) in urls.into_iter().enumerate() {
            observer(BuildEvent::Fetching {
                domain,
                index: i + 1,
                total,
                url: url.to_string(),
            });
            let text = self.fetcher.fetch(url).await;
            if text.trim().is_empty() {
                debug!(domain = %domain, url, "No content, skipping");
                continue;
            }
            documents.push(SourceDocument::new(url, text, domain));
        }

        let chunks = self.chunker.split(&documents);
        if chunks.is_empty() {
            return Err(Error::KnowledgeBase(format!(
                "no content fetched for domain '{}'",
                domain
            )));
        }

        let chunk_count = chunks.len();
        observer(BuildEvent::Indexing {
            domain,
            chunks: chunk_count,
        });

        let staging = self.config.staging_dir(domain);
        DomainIndex::build(chunks, &staging, domain, self.embedder.clone())?;

        swap_into_place(&staging, &self.config.domain_dir(domain), &self.config.backup_dir(domain))?;

        Ok(DomainBuildStats {
            domain,
            documents: documents.len(),
            chunks: chunk_count,
            error: None,
        })
    }

    /// Chunks relevant to `query`, scoped by `domain_override` or the classifier
    ///
    /// A single domain yields up to `k` chunks. The all-domains fallback yields up
    /// to `max(1, k / 3)` chunks from each domain, concatenated in priority order.
    pub fn retrieve(&self, query: &str, k: usize, domain_override: Option<Domain>) -> Vec<ScoredChunk> {
        let Some(indexes) = &self.indexes else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let selector = match domain_override {
            Some(domain) => DomainSelector::Single(domain),
            None => self.classifier.classify(query),
        };
        let per_domain_k = match selector {
            DomainSelector::Single(_) => k,
            DomainSelector::All => (k / Domain::ALL.len()).max(1),
        };
        debug!(selector = %selector, k = per_domain_k, "Retrieving context");

        let mut results = Vec::new();
        for domain in selector.domains() {
            let Some(index) = indexes.get(&domain) else {
                continue;
            };
            match index.search(query, per_domain_k) {
                Ok(found) => results.extend(found),
                Err(e) => warn!(domain = %domain, error = %e, "Search failed"),
            }
        }
        results
    }

    /// Formatted reference text for `query`, or an empty string when there is none
    pub fn get_context(&self, query: &str, k: usize, domain_override: Option<Domain>) -> String {
        format_references(&self.retrieve(query, k, domain_override))
    }

    /// Presence and size of every domain index on disk
    ///
    /// A domain is present when its directory exists, the same signal
    /// [`KnowledgeBase::initialize`] uses; a present domain that fails to load
    /// reports the load error.
    pub fn status(&self) -> Vec<DomainStatus> {
        Domain::ALL
            .into_iter()
            .map(|domain| {
                let path = self.config.domain_dir(domain);
                let present = path.is_dir();
                let loaded = self
                    .indexes
                    .as_ref()
                    .and_then(|indexes| indexes.get(&domain));

                let (chunks, built_at, error) = match loaded {
                    Some(index) => (Some(index.len()), Some(index.built_at()), None),
                    None if present => {
                        match DomainIndex::load(&path, domain, self.embedder.clone()) {
                            Ok(index) => (Some(index.len()), Some(index.built_at()), None),
                            Err(e) => (None, None, Some(e.to_string())),
                        }
                    }
                    None => (None, None, None),
                };

                DomainStatus {
                    domain,
                    path,
                    present,
                    chunks,
                    built_at,
                    error,
                }
            })
            .collect()
    }
}

/// Context provider with a fixed `k`, sharing a loaded knowledge base
pub struct KnowledgeBaseContext {
    knowledge_base: Arc<KnowledgeBase>,
    k: usize,
}

impl KnowledgeBaseContext {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, k: usize) -> Self {
        Self { knowledge_base, k }
    }
}

#[async_trait]
impl ContextProvider for KnowledgeBaseContext {
    async fn relevant_context(&self, query: &str) -> String {
        self.knowledge_base.get_context(query, self.k, None)
    }
}

/// Render retrieved chunks with a domain tag and shortened source per reference
pub fn format_references(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            format!(
                "[{} - Reference {}: {}]\n{}",
                scored.chunk.domain.tag(),
                i + 1,
                source_display(&scored.chunk.source_url),
                scored.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join(REFERENCE_SEPARATOR)
}

/// Last non-empty path segment of a URL, else its host, else the raw string
pub fn source_display(source: &str) -> String {
    let Ok(url) = Url::parse(source) else {
        return source.to_string();
    };

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| source.to_string())
}

/// Replace `target` with `staging`, keeping the old index until the rename lands
///
/// The previous `target` is moved to `backup` first and restored if the rename
/// fails, so a failed swap never loses the index that was already there.
fn swap_into_place(staging: &Path, target: &Path, backup: &Path) -> Result<()> {
    discard_dir(backup);
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, backup)?;
    }

    if let Err(e) = fs::rename(staging, target) {
        if had_previous {
            if let Err(restore) = fs::rename(backup, target) {
                error!(path = %target.display(), error = %restore, "Failed to restore previous index");
            }
        }
        return Err(e.into());
    }

    discard_dir(backup);
    Ok(())
}

fn discard_dir(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_dir_all(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove directory");
        }
    }
}
