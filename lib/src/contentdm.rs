//! Data source for CONTENTdm collections.
//!
//! Item metadata is read from the CONTENTdm web services API. Only fields that the
//! collection maps to Dublin Core are published; administrative fields are always
//! filtered out. Human visitors are sent to the item's page in the public CONTENTdm
//! interface.

use crate::consts::{DCTERMS_NAMESPACE, DCTERMS_PREFIX, DC_NAMESPACE, DC_PREFIX};
use crate::errors::ResolveError;
use crate::fetch::JsonFetcher;
use crate::identifier::Identifier;
use crate::mapping::{
    DublinCoreTermTable, FieldMapper, FieldSchemaEntry, NormalizedField, RawMetadataRecord,
    TermMapping,
};
use crate::rdfxml::NamespaceMap;
use crate::source::SourceAdapter;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::thread;
use url::form_urlencoded::byte_serialize;

/// CONTENTdm nicknames for administrative fields, never published.
pub const ADMIN_FIELDS: [&str; 8] = [
    "fullrs",
    "find",
    "dmaccess",
    "dmimage",
    "dmcreated",
    "dmmodified",
    "dmoclcno",
    "dmrecord",
];

/// Term code CONTENTdm uses for fields with no Dublin Core mapping.
pub const UNMAPPED_CODE: &str = "BLANK";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentDmConfig {
    /// e.g. `http://cdm.example:81/dmwebservices/index.php?q=`
    pub ws_url: String,
    /// e.g. `http://cdm.example/cdm/ref/collection/`
    pub base_url: String,
}

// entries of dmGetCollectionFieldInfo
#[derive(Deserialize, Debug)]
struct CollectionField {
    nick: String,
    #[serde(default)]
    dc: Option<String>,
}

// entries of dmGetDublinCoreFieldInfo
#[derive(Deserialize, Debug)]
struct DublinCoreField {
    nick: String,
    #[serde(default)]
    name: String,
}

pub struct ContentDm {
    config: ContentDmConfig,
    fetcher: Arc<dyn JsonFetcher>,
}

impl ContentDm {
    pub fn new(config: ContentDmConfig, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ContentDmConfig {
        &self.config
    }

    pub fn collection_field_info_url(&self, alias: &str) -> String {
        format!(
            "{}dmGetCollectionFieldInfo/{}/json",
            self.config.ws_url,
            encode_segment(alias)
        )
    }

    pub fn dublin_core_field_info_url(&self) -> String {
        format!("{}dmGetDublinCoreFieldInfo/json", self.config.ws_url)
    }

    pub fn item_info_url(&self, alias: &str, pointer: &str) -> String {
        format!(
            "{}dmGetItemInfo/{}/{}/json",
            self.config.ws_url,
            encode_segment(alias),
            encode_segment(pointer)
        )
    }

    /// The collection's field schema, in the order CONTENTdm lists it.
    pub fn field_schema(&self, alias: &str) -> Result<Vec<FieldSchemaEntry>, ResolveError> {
        let url = self.collection_field_info_url(alias);
        let fields: Vec<CollectionField> = decode(&url, self.fetcher.get_json(&url)?)?;
        Ok(fields
            .iter()
            .map(|field| match field.dc.as_deref() {
                Some(code) => FieldSchemaEntry::from_code(&field.nick, code, UNMAPPED_CODE),
                None => FieldSchemaEntry {
                    nickname: field.nick.clone(),
                    mapping: TermMapping::Unmapped,
                },
            })
            .collect())
    }

    /// CONTENTdm's Dublin Core vocabulary, keyed by term nickname.
    pub fn term_table(&self) -> Result<DublinCoreTermTable, ResolveError> {
        let url = self.dublin_core_field_info_url();
        let fields: Vec<DublinCoreField> = decode(&url, self.fetcher.get_json(&url)?)?;
        Ok(DublinCoreTermTable::from_entries(
            fields.into_iter().map(|f| (f.nick, f.name)),
        ))
    }

    /// The item's raw metadata, or `None` when CONTENTdm does not return an object.
    pub fn raw_record(&self, id: &Identifier) -> Result<Option<RawMetadataRecord>, ResolveError> {
        let url = self.item_info_url(id.alias(), id.pointer());
        let payload = self.fetcher.get_json(&url)?;
        let record = RawMetadataRecord::from_json(&payload);
        if record.is_none() {
            info!("CONTENTdm has no item for {}", id);
        }
        Ok(record)
    }
}

/// Percent-encodes one identifier segment so it stays a single path segment.
fn encode_segment(segment: &str) -> String {
    // byte_serialize writes spaces as '+' and encodes a literal '+' as %2B
    byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, payload: Value) -> Result<T, ResolveError> {
    serde_json::from_value(payload)
        .map_err(|e| ResolveError::backend(url, format!("unexpected payload: {}", e)))
}

fn joined<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, ResolveError>>,
    url: String,
) -> Result<T, ResolveError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ResolveError::backend(&url, "request worker panicked")))
}

impl SourceAdapter for ContentDm {
    fn source_type(&self) -> &'static str {
        "contentdm"
    }

    fn namespaces(&self) -> NamespaceMap {
        let mut namespaces = NamespaceMap::new();
        namespaces.insert(DC_PREFIX.to_string(), DC_NAMESPACE.as_str().to_string());
        namespaces.insert(
            DCTERMS_PREFIX.to_string(),
            DCTERMS_NAMESPACE.as_str().to_string(),
        );
        namespaces
    }

    fn human_page_target(&self, id: &Identifier) -> String {
        format!(
            "{}{}/id/{}",
            self.config.base_url,
            encode_segment(id.alias()),
            encode_segment(id.pointer())
        )
    }

    fn metadata(&self, id: &Identifier) -> Result<Option<Vec<NormalizedField>>, ResolveError> {
        // the three queries are independent; run them side by side and wait for all
        let (schema, terms, record) = thread::scope(|s| {
            let schema = s.spawn(|| self.field_schema(id.alias()));
            let terms = s.spawn(|| self.term_table());
            let record = self.raw_record(id);
            (
                joined(schema, self.collection_field_info_url(id.alias())),
                joined(terms, self.dublin_core_field_info_url()),
                record,
            )
        });

        // a failed lookup outranks a missing record
        let record = record?;
        let (schema, terms) = (schema?, terms?);
        let Some(record) = record else {
            return Ok(None);
        };
        let mapper = FieldMapper::new(schema, terms).with_excluded(ADMIN_FIELDS);
        let fields = mapper.map(&record);
        debug!(
            "Mapped {} of {} fields for {}",
            fields.len(),
            record.len(),
            id
        );
        Ok(Some(fields))
    }
}
