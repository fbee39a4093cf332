//! Static documentation sources and routing keywords per domain
//!
//! Edits here only take effect on the next full rebuild of the knowledge base.

use std::path::Path;

use serde::{Deserialize, Serialize};

use advisor_core::{Domain, Error, Result};

pub const MIGRATION_URLS: &[&str] = &[
    "https://www.databricks.com/blog/migrating-redshift-databricks-field-guide-data-teams",
    "https://www.databricks.com/blog/navigating-your-migration-databricks-architectures-and-strategic-approaches",
    "https://www.databricks.com/blog/databricks-migration-strategy-lessons-learned",
    "https://www.databricks.com/blog/how-databricks-simplifies-data-warehouse-migrations-proven-strategies-and-tools",
    "https://www.databricks.com/blog/2022/06/24/data-warehousing-modeling-techniques-and-their-implementation-on-the-databricks-lakehouse-platform.html",
    "https://www.databricks.com/blog/how-migrate-your-oracle-plsql-code-databricks-lakehouse-platform",
    "https://www.databricks.com/blog/navigating-oracle-databricks-migration-tips-seamless-transition",
    "https://www.databricks.com/blog/navigating-your-netezza-databricks-migration-tips-seamless-transition",
    "https://www.databricks.com/blog/best-practices-and-guidance-cloud-engineers-deploy-databricks-aws-part-3",
    "https://www.databricks.com/blog/introducing-lakebridge-free-open-data-migration-databricks-sql",
    "https://www.databricks.com/blog/warehouse-lakehouse-migration-approaches-databricks",
    "https://www.devoteam.com/expert-view/data-warehouse-migration-to-databricks-a-comprehensive-guide/",
    "https://closeloop.com/blog/how-to-migrate-to-databricks-best-practices/",
    "https://www.datafold.com/resources/hadoop-to-databricks-migration",
    "https://kanerika.com/blogs/legacy-systems-to-databricks-migration/",
    "https://www.msrcosmos.com/blog/databricks-data-migration-steps-and-benefits/",
    "https://www.striim.com/blog/oracle-data-databricks-unity-catalog-python-and-databricks-notebook-recipe/",
    "https://www.sparity.com/blogs/snowflake-to-databricks-migration/",
    "https://blog.aidetic.in/migrating-from-bigquery-to-databricks-a-step-by-step-practical-guide-c7d8e18efaf3",
];

pub const ARCHITECTURE_URLS: &[&str] = &[
    "https://www.databricks.com/blog/navigating-your-migration-databricks-architectures-and-strategic-approaches",
    "https://www.databricks.com/blog/2023/03/30/security-best-practices-databricks-lakehouse-platform.html",
    "https://www.databricks.com/blog/best-practices-and-guidance-cloud-engineers-deploy-databricks-aws-part-2",
    "https://www.databricks.com/blog/best-practices-and-guidance-cloud-engineers-deploy-databricks-aws-part-3",
    "https://www.databricks.com/blog/data-architecture-pattern-maximize-value-lakehouse.html",
    "https://docs.databricks.com/aws/en/getting-started/high-level-architecture",
    "https://learn.microsoft.com/en-us/azure/well-architected/service-guides/azure-databricks",
    "https://docs.databricks.com/en/getting-started/overview.html",
    "https://docs.databricks.com/en/lakehouse-architecture/index.html",
    "https://docs.gcp.databricks.com/lakehouse-architecture/index.html",
    "https://learn.microsoft.com/en-us/azure/databricks/getting-started/overview",
    "https://www.bluetab.net/en/databricks-on-aws-an-architectural-perspective-part-1/",
    "https://www.databricks.com/trust/architecture",
    "https://docs.databricks.com/en/security/index.html",
    "https://www.databricks.com/blog/2020/05/04/azure-databricks-security-best-practices.html",
    "https://docs.databricks.com/en/lakehouse-architecture/security-compliance-and-privacy/index.html",
    "https://medium.com/@accentfuture/databricks-architecture-overview-components-workflow-ee00c965a445",
    "https://www.databricks.com/resources/architectures/data-ingestion-reference-architecture",
    "https://gem-corp.tech/tech-blogs/databricks-architecture/",
    "https://www.databricks.com/resources/architectures/reference-architecture-for-security-lakehouse",
    "https://docs.databricks.com/aws/en/compute/choose-compute",
    "https://sanjeebiitg.medium.com/databricks-part-04-understanding-databrick-compute-19d8d81a03e9",
    "https://docs.databricks.com/aws/en/compute/cluster-config-best-practices",
    "https://learn.microsoft.com/en-us/azure/databricks/compute/choose-compute",
    "https://www.unraveldata.com/resources/databricks-serverless-vs-classic-compute/",
    "https://blog.devgenius.io/databricks-compute-selection-6d921a08ead8",
    "https://docs.databricks.com/aws/en/compute/standard-limitations",
    "https://www.cloudformations.org/post/navigating-databricks-compute-options-for-cost-effective-and-high-performance-solutions",
    "https://learn.microsoft.com/en-us/training/wwl-databricks/select-and-configure-compute/2-choose-appropriate-compute-type",
];

pub const COSTING_URLS: &[&str] = &[
    "https://www.databricks.com/product/pricing",
    "https://www.databricks.com/product/aws-pricing",
    "https://www.databricks.com/product/azure-pricing",
    "https://docs.databricks.com/en/administration-guide/account-settings-e2/pricing.html",
    // DBU consumption
    "https://docs.databricks.com/en/compute/configure.html",
    "https://docs.databricks.com/en/optimizations/cost-optimization.html",
];

pub const MIGRATION_KEYWORDS: &[&str] = &[
    "migrate", "migration", "move", "transfer", "from", "current platform", "legacy",
    "modernize", "onboard", "transition", "switch", "oracle", "teradata", "netezza",
    "redshift", "snowflake", "hadoop",
];

pub const ARCHITECTURE_KEYWORDS: &[&str] = &[
    "optimize", "optimization", "performance", "speed", "faster", "improve", "efficiency",
    "tuning", "autoscaling", "photon", "best practice", "architecture", "compute", "cluster",
    "workspace", "security",
];

pub const COSTING_KEYWORDS: &[&str] = &[
    "cost", "price", "pricing", "expensive", "budget", "spend", "billing", "dbu", "tier",
    "savings", "reduce cost", "estimate", "fee",
];

/// Built-in routing keywords for a domain
pub fn default_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Migration => MIGRATION_KEYWORDS,
        Domain::Architecture => ARCHITECTURE_KEYWORDS,
        Domain::Costing => COSTING_KEYWORDS,
    }
}

/// Documentation URL lists, one per domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSources {
    pub migration: Vec<String>,
    pub architecture: Vec<String>,
    pub costing: Vec<String>,
}

impl DomainSources {
    /// Use the same URL list for every domain
    pub fn uniform(urls: &[&str]) -> Self {
        let urls = owned(urls);
        Self {
            migration: urls.clone(),
            architecture: urls.clone(),
            costing: urls,
        }
    }

    /// Load URL lists from a JSON file with `migration`, `architecture` and `costing` arrays
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read sources file {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn urls(&self, domain: Domain) -> &[String] {
        match domain {
            Domain::Migration => &self.migration,
            Domain::Architecture => &self.architecture,
            Domain::Costing => &self.costing,
        }
    }

    /// URLs for a domain with duplicates removed, first occurrence wins
    pub fn unique_urls(&self, domain: Domain) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.urls(domain)
            .iter()
            .map(String::as_str)
            .filter(|url| seen.insert(*url))
            .collect()
    }
}

fn owned(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

impl Default for DomainSources {
    fn default() -> Self {
        Self {
            migration: owned(MIGRATION_URLS),
            architecture: owned(ARCHITECTURE_URLS),
            costing: owned(COSTING_URLS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_sources_cover_every_domain() {
        let sources = DomainSources::default();
        for domain in Domain::ALL {
            assert!(!sources.urls(domain).is_empty());
            assert!(!default_keywords(domain).is_empty());
        }
    }

    #[test]
    fn test_unique_urls_preserves_first_occurrence() {
        let sources = DomainSources {
            migration: vec!["a".into(), "b".into(), "a".into(), "c".into()],
            architecture: vec![],
            costing: vec![],
        };
        assert_eq!(sources.unique_urls(Domain::Migration), vec!["a", "b", "c"]);
        assert!(sources.unique_urls(Domain::Costing).is_empty());
    }

    #[test]
    fn test_load_sources_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"migration": ["https://m.test/a"], "architecture": [], "costing": ["https://c.test/p"]}"#,
        )
        .unwrap();

        let sources = DomainSources::load(file.path()).unwrap();
        assert_eq!(sources.urls(Domain::Migration), ["https://m.test/a".to_string()]);
        assert!(sources.urls(Domain::Architecture).is_empty());
    }

    #[test]
    fn test_load_missing_sources_file() {
        let result = DomainSources::load(Path::new("/nonexistent/sources.json"));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
