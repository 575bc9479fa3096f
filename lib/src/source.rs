// A source adapter knows how to reach one kind of metadata backend. Adapters are registered
// explicitly under an identifier namespace when the process starts.

use crate::config::{Config, SourceConfig};
use crate::contentdm::{ContentDm, ContentDmConfig};
use crate::errors::ResolveError;
use crate::fetch::{FetchOptions, HttpFetcher, JsonFetcher};
use crate::identifier::Identifier;
use crate::mapping::NormalizedField;
use crate::rdfxml::NamespaceMap;
use anyhow::{anyhow, Result};
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

pub trait SourceAdapter: Send + Sync {
    /// Short name of the backend kind, e.g. `contentdm`.
    fn source_type(&self) -> &'static str;

    /// Namespace declarations this adapter's fields rely on.
    fn namespaces(&self) -> NamespaceMap;

    /// URL of the human-readable page for the record. Never fails for a parsed identifier.
    fn human_page_target(&self, id: &Identifier) -> String;

    /// Normalized metadata for the record, or `None` when the backend has no such record.
    /// A failed backend lookup is reported as an error even when the record is missing.
    fn metadata(&self, id: &Identifier) -> Result<Option<Vec<NormalizedField>>, ResolveError>;
}

/// Builds the adapter described by one `sources` entry of the configuration.
pub fn adapter_from_config(
    source: &SourceConfig,
    fetcher: Arc<dyn JsonFetcher>,
) -> Box<dyn SourceAdapter> {
    match source {
        SourceConfig::ContentDm {
            ws_url, base_url, ..
        } => Box::new(ContentDm::new(
            ContentDmConfig {
                ws_url: ws_url.clone(),
                base_url: base_url.clone(),
            },
            fetcher,
        )),
    }
}

/// Namespace to adapter lookup table.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<String, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every configured source, sharing one HTTP client between them.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn JsonFetcher> = Arc::new(HttpFetcher::new(&FetchOptions {
            timeout: config.timeout(),
            ..FetchOptions::default()
        })?);
        Self::from_config_with_fetcher(config, fetcher)
    }

    pub fn from_config_with_fetcher(config: &Config, fetcher: Arc<dyn JsonFetcher>) -> Result<Self> {
        let mut registry = Self::new();
        for source in &config.sources {
            let adapter = adapter_from_config(source, fetcher.clone());
            registry.register(source.namespace(), adapter)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, namespace: &str, adapter: Box<dyn SourceAdapter>) -> Result<()> {
        if self.adapters.contains_key(namespace) {
            return Err(anyhow!(
                "A data source is already registered for namespace '{}'",
                namespace
            ));
        }
        info!(
            "Registered {} data source for namespace '{}'",
            adapter.source_type(),
            namespace
        );
        self.adapters.insert(namespace.to_string(), Arc::from(adapter));
        Ok(())
    }

    pub fn resolve(&self, namespace: &str) -> Result<Arc<dyn SourceAdapter>, ResolveError> {
        self.adapters
            .get(namespace)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownNamespace {
                namespace: namespace.to_string(),
            })
    }

    /// Registered namespaces with their adapter types, sorted by namespace.
    pub fn entries(&self) -> Vec<(&str, &'static str)> {
        self.adapters
            .iter()
            .map(|(ns, adapter)| (ns.as_str(), adapter.source_type()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
