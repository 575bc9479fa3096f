use easylod::config::{Config, SourceConfig};
use easylod::errors::ResolveError;
use easylod::fetch::JsonFetcher;
use easylod::source::SourceRegistry;
use easylod::Resolver;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const WS: &str = "http://backend.example:81/dmwebservices/index.php?q=";
const SUBJECT: &str = "http://lod.example/resource/cdm:foo123:42";

/// Serves canned JSON and records which URLs were requested.
#[derive(Default)]
struct FakeBackend {
    responses: HashMap<String, Value>,
    requested: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with(mut self, path: &str, payload: Value) -> Self {
        self.responses.insert(format!("{WS}{path}"), payload);
        self
    }

    fn requested(&self) -> Vec<String> {
        let mut urls = self.requested.lock().unwrap().clone();
        urls.sort();
        urls
    }
}

impl JsonFetcher for FakeBackend {
    fn get_json(&self, url: &str) -> Result<Value, ResolveError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::backend(url, "connection refused"))
    }
}

fn config() -> Config {
    Config::builder()
        .sources(vec![SourceConfig::ContentDm {
            namespace: "cdm".to_string(),
            ws_url: WS.to_string(),
            base_url: "https://backend.example/cdm/ref/".to_string(),
        }])
        .build()
        .unwrap()
}

fn resolver(backend: Arc<FakeBackend>) -> Resolver {
    let registry = SourceRegistry::from_config_with_fetcher(&config(), backend).unwrap();
    Resolver::new(registry)
}

fn standard_backend(item: Value) -> FakeBackend {
    FakeBackend::default()
        .with(
            "dmGetCollectionFieldInfo/foo123/json",
            json!([
                {"name": "Title", "nick": "title", "dc": "title"},
                {"name": "Author", "nick": "creato", "dc": "creato"},
                {"name": "Shelf", "nick": "shelf", "dc": "BLANK"},
                {"name": "Year", "nick": "date", "dc": "date"}
            ]),
        )
        .with(
            "dmGetDublinCoreFieldInfo/json",
            json!([
                {"name": "Title", "nick": "title"},
                {"name": "Creator", "nick": "creato"},
                {"name": "Date", "nick": "date"}
            ]),
        )
        .with("dmGetItemInfo/foo123/42/json", item)
}

/// Parses RDF/XML and returns (subject, predicate, literal) triples.
fn triples(xml: &str) -> Vec<(String, String, String)> {
    RdfParser::from_format(RdfFormat::RdfXml)
        .for_reader(xml.as_bytes())
        .map(|quad| {
            let quad = quad.expect("well-formed RDF/XML");
            let object = match &quad.object {
                Term::Literal(lit) => lit.value().to_string(),
                other => other.to_string(),
            };
            (
                quad.subject.to_string(),
                quad.predicate.as_str().to_string(),
                object,
            )
        })
        .collect()
}

#[test]
fn title_record_yields_single_dc_title() {
    let backend = Arc::new(
        FakeBackend::default()
            .with(
                "dmGetCollectionFieldInfo/foo123/json",
                json!([{"nick": "title", "dc": "title"}]),
            )
            .with(
                "dmGetDublinCoreFieldInfo/json",
                json!([{"nick": "title", "name": "Title"}]),
            )
            .with(
                "dmGetItemInfo/foo123/42/json",
                json!({"title": "A Book", "dmrecord": "42"}),
            ),
    );
    let xml = resolver(backend).describe("cdm:foo123:42", SUBJECT).unwrap();

    assert_eq!(
        triples(&xml),
        vec![(
            format!("<{SUBJECT}>"),
            "http://purl.org/dc/elements/1.1/title".to_string(),
            "A Book".to_string()
        )]
    );
    assert!(!xml.contains("dmrecord"));
}

#[test]
fn fields_follow_record_order_and_skip_unmapped() {
    let backend = Arc::new(standard_backend(json!({
        "date": "1901",
        "shelf": "B4",
        "creato": "Smith, Jane",
        "title": "Letters & Notes",
        "dmcreated": "2012-01-01",
        "dmimage": []
    })));
    let xml = resolver(backend).describe("cdm:foo123:42", SUBJECT).unwrap();

    let predicates: Vec<String> = triples(&xml).into_iter().map(|t| t.1).collect();
    assert_eq!(
        predicates,
        vec![
            "http://purl.org/dc/elements/1.1/date",
            "http://purl.org/dc/elements/1.1/creator",
            "http://purl.org/dc/elements/1.1/title",
        ]
    );
    assert!(xml.contains("<dc:title>Letters &amp; Notes</dc:title>"));
    assert!(!xml.contains("B4"));
}

#[test]
fn all_three_backend_queries_are_issued() {
    let backend = Arc::new(standard_backend(json!({"title": "x"})));
    resolver(backend.clone())
        .describe("cdm:foo123:42", SUBJECT)
        .unwrap();
    assert_eq!(
        backend.requested(),
        vec![
            format!("{WS}dmGetCollectionFieldInfo/foo123/json"),
            format!("{WS}dmGetDublinCoreFieldInfo/json"),
            format!("{WS}dmGetItemInfo/foo123/42/json"),
        ]
    );
}

#[test]
fn array_record_is_not_found() {
    let backend = Arc::new(standard_backend(json!([])));
    let err = resolver(backend)
        .describe("cdm:foo123:42", SUBJECT)
        .unwrap_err();
    assert!(matches!(err, ResolveError::RecordNotFound { .. }));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn record_with_no_mapped_fields_is_an_empty_description() {
    let backend = Arc::new(standard_backend(json!({"shelf": "B4", "dmrecord": "42"})));
    let xml = resolver(backend).describe("cdm:foo123:42", SUBJECT).unwrap();
    assert!(triples(&xml).is_empty());
    assert!(xml.contains(&format!("<rdf:Description rdf:about=\"{SUBJECT}\"/>")));
    assert!(xml.contains("xmlns:dcterms=\"http://purl.org/dc/terms/\""));
}

#[test]
fn unreachable_backend_is_a_clean_error() {
    let backend = Arc::new(FakeBackend::default());
    let err = resolver(backend)
        .describe("cdm:foo123:42", SUBJECT)
        .unwrap_err();
    assert!(matches!(err, ResolveError::BackendUnavailable { .. }));
    assert_eq!(err.status_code(), 502);
}

#[test]
fn human_page_needs_no_backend() {
    let backend = Arc::new(FakeBackend::default());
    let resolver = resolver(backend.clone());
    assert_eq!(
        resolver.human_page("cdm:foo123:42").unwrap(),
        "https://backend.example/cdm/ref/foo123/id/42"
    );
    assert!(backend.requested().is_empty());
}

#[test]
fn unknown_namespace_and_malformed_identifier() {
    let resolver = resolver(Arc::new(FakeBackend::default()));
    let err = resolver.human_page("xyz:foo123:42").unwrap_err();
    assert_eq!(err.status_code(), 404);
    let err = resolver.describe("cdm:foo123", SUBJECT).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn multi_word_term_label_is_skipped() {
    let backend = Arc::new(
        FakeBackend::default()
            .with(
                "dmGetCollectionFieldInfo/foo123/json",
                json!([{"nick": "title", "dc": "title"}, {"nick": "toc", "dc": "tablea"}]),
            )
            .with(
                "dmGetDublinCoreFieldInfo/json",
                json!([
                    {"nick": "title", "name": "Title"},
                    {"nick": "tablea", "name": "Description-Table of Contents"}
                ]),
            )
            .with(
                "dmGetItemInfo/foo123/42/json",
                json!({"title": "A Book", "toc": "ch1"}),
            ),
    );
    let xml = resolver(backend).describe("cdm:foo123:42", SUBJECT).unwrap();
    assert_eq!(
        triples(&xml),
        vec![(
            format!("<{SUBJECT}>"),
            "http://purl.org/dc/elements/1.1/title".to_string(),
            "A Book".to_string()
        )]
    );
}

#[test]
fn control_characters_do_not_break_the_document() {
    let backend = Arc::new(standard_backend(json!({"title": "A\u{000B}Book\u{0001}"})));
    let xml = resolver(backend).describe("cdm:foo123:42", SUBJECT).unwrap();
    let parsed = triples(&xml);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].2, "ABook");
}

#[test]
fn encoded_pointer_cannot_add_backend_commands() {
    let backend = Arc::new(standard_backend(json!({"title": "x"})));
    let err = resolver(backend.clone())
        .describe("cdm:foo123:42/json&q=dmGetCollectionList", SUBJECT)
        .unwrap_err();
    assert!(matches!(err, ResolveError::BackendUnavailable { .. }));
    assert!(backend
        .requested()
        .contains(&format!("{WS}dmGetItemInfo/foo123/42%2Fjson%26q%3DdmGetCollectionList/json")));
    assert!(backend
        .requested()
        .iter()
        .all(|url| !url.contains("&q=")));
}
