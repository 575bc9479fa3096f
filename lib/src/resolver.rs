//! Entry points for the two request flows: sending a visitor to the human-readable page
//! of a record, and describing a record as RDF/XML.
//!
//! The flows are independent. Neither relies on the other having run first.

use crate::errors::ResolveError;
use crate::identifier::Identifier;
use crate::rdfxml::RdfDocument;
use crate::source::{SourceAdapter, SourceRegistry};
use log::{debug, warn};
use std::sync::Arc;

pub struct Resolver {
    registry: SourceRegistry,
}

impl Resolver {
    pub fn new(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    fn adapter_for(
        &self,
        identifier: &str,
    ) -> Result<(Identifier, Arc<dyn SourceAdapter>), ResolveError> {
        let id = Identifier::parse(identifier)?;
        let adapter = self.registry.resolve(id.namespace())?;
        Ok((id, adapter))
    }

    /// Confirms that `identifier` parses and names a registered namespace.
    pub fn check(&self, identifier: &str) -> Result<(), ResolveError> {
        self.adapter_for(identifier).map(|_| ())
    }

    /// URL of the human-readable page for `identifier`. Does not contact the backend.
    pub fn human_page(&self, identifier: &str) -> Result<String, ResolveError> {
        let (id, adapter) = self.adapter_for(identifier)?;
        let target = adapter.human_page_target(&id);
        debug!("Human page for {} is {}", id, target);
        Ok(target)
    }

    /// Builds the RDF document for `identifier`, describing it as `subject_uri`.
    pub fn document(
        &self,
        identifier: &str,
        subject_uri: &str,
    ) -> Result<RdfDocument, ResolveError> {
        let (id, adapter) = self.adapter_for(identifier)?;
        let fields = match adapter.metadata(&id) {
            Ok(Some(fields)) => fields,
            Ok(None) => {
                return Err(ResolveError::RecordNotFound {
                    identifier: id.to_string(),
                })
            }
            Err(e) => {
                warn!("Metadata lookup for {} failed: {}", id, e);
                return Err(e);
            }
        };
        Ok(RdfDocument::new(subject_uri)
            .with_namespaces(adapter.namespaces())
            .with_fields(fields))
    }

    /// Serialized RDF/XML for `identifier`.
    pub fn describe(&self, identifier: &str, subject_uri: &str) -> Result<String, ResolveError> {
        self.document(identifier, subject_uri)?.to_xml()
    }
}
