//! RDF/XML output for a single described resource.
//!
//! Documents have a fixed shape: an `rdf:RDF` root carrying every namespace declaration,
//! one `rdf:Description` whose `rdf:about` names the subject, and one child element per
//! metadata field.

use crate::consts::{RDF_NAMESPACE, RDF_PREFIX};
use crate::errors::ResolveError;
use crate::mapping::NormalizedField;
use indexmap::IndexMap;
use oxigraph::model::NamedNode;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

/// Prefix to namespace IRI, in declaration order.
pub type NamespaceMap = IndexMap<String, String>;

/// Namespace map that starts with the `rdf` declaration.
pub fn rdf_namespaces() -> NamespaceMap {
    let mut namespaces = NamespaceMap::new();
    namespaces.insert(RDF_PREFIX.to_string(), RDF_NAMESPACE.as_str().to_string());
    namespaces
}

/// Merges `extra` into `base`. A prefix that is already declared keeps its position but
/// takes the new IRI.
pub fn merge_namespaces(base: &mut NamespaceMap, extra: NamespaceMap) {
    for (prefix, iri) in extra {
        base.insert(prefix, iri);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfDocument {
    pub subject: String,
    pub namespaces: NamespaceMap,
    pub fields: Vec<NormalizedField>,
}

impl RdfDocument {
    /// A document with only the `rdf` namespace declared.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            namespaces: rdf_namespaces(),
            fields: Vec::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceMap) -> Self {
        merge_namespaces(&mut self.namespaces, namespaces);
        self
    }

    pub fn with_fields(mut self, fields: Vec<NormalizedField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn to_xml(&self) -> Result<String, ResolveError> {
        serialize(&self.subject, &self.namespaces, &self.fields)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Whether `name` can be used as a namespace prefix or local element name.
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn check_document(
    subject: &str,
    namespaces: &NamespaceMap,
    fields: &[NormalizedField],
) -> Result<(), ResolveError> {
    match namespaces.get(RDF_PREFIX) {
        Some(iri) if iri == RDF_NAMESPACE.as_str() => {}
        _ => {
            return Err(ResolveError::serialization(format!(
                "prefix '{}' must be bound to {}",
                RDF_PREFIX,
                RDF_NAMESPACE.as_str()
            )))
        }
    }
    NamedNode::new(subject).map_err(|e| {
        ResolveError::serialization(format!("subject '{}' is not an IRI: {}", subject, e))
    })?;
    for (prefix, iri) in namespaces {
        if !is_ncname(prefix) {
            return Err(ResolveError::serialization(format!(
                "invalid namespace prefix '{}'",
                prefix
            )));
        }
        NamedNode::new(iri.as_str()).map_err(|e| {
            ResolveError::serialization(format!("namespace '{}' is not an IRI: {}", iri, e))
        })?;
    }
    for field in fields {
        if !namespaces.contains_key(&field.prefix) {
            return Err(ResolveError::serialization(format!(
                "field '{}' uses undeclared prefix '{}'",
                field.label, field.prefix
            )));
        }
        if !is_ncname(&field.label) {
            return Err(ResolveError::serialization(format!(
                "'{}' is not a valid element name",
                field.label
            )));
        }
    }
    Ok(())
}

/// Whether `c` is allowed in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drops characters that cannot appear in XML 1.0, even escaped.
pub fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn xml_error<E: std::fmt::Display>(e: E) -> ResolveError {
    ResolveError::serialization(e.to_string())
}

/// Writes the RDF/XML document describing `subject` with the given fields.
///
/// All structural checks run before any output is produced, so a failure never yields a
/// partial document.
pub fn serialize(
    subject: &str,
    namespaces: &NamespaceMap,
    fields: &[NormalizedField],
) -> Result<String, ResolveError> {
    check_document(subject, namespaces, fields)?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let root_name = format!("{}:RDF", RDF_PREFIX);
    let mut root = BytesStart::new(root_name.as_str());
    for (prefix, iri) in namespaces {
        let attr = format!("xmlns:{}", prefix);
        root.push_attribute((attr.as_str(), iri.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    let description_name = format!("{}:Description", RDF_PREFIX);
    let about = format!("{}:about", RDF_PREFIX);
    let mut description = BytesStart::new(description_name.as_str());
    let subject = xml_safe(subject);
    description.push_attribute((about.as_str(), subject.as_ref()));
    if fields.is_empty() {
        writer
            .write_event(Event::Empty(description))
            .map_err(xml_error)?;
    } else {
        writer
            .write_event(Event::Start(description))
            .map_err(xml_error)?;
        for field in fields {
            let name = format!("{}:{}", field.prefix, field.label);
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_error)?;
            let value = xml_safe(&field.value);
            writer
                .write_event(Event::Text(BytesText::new(&value)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(description_name.as_str())))
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(root_name.as_str())))
        .map_err(xml_error)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| ResolveError::serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DC_NAMESPACE, DC_PREFIX};

    fn dc_namespaces() -> NamespaceMap {
        let mut ns = rdf_namespaces();
        ns.insert(DC_PREFIX.to_string(), DC_NAMESPACE.as_str().to_string());
        ns
    }

    #[test]
    fn writes_fields_under_description() {
        let xml = serialize(
            "http://lod.example/resource/cdm:foo123:42",
            &dc_namespaces(),
            &[NormalizedField::dc("title", "A Book")],
        )
        .unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n  \
<rdf:Description rdf:about=\"http://lod.example/resource/cdm:foo123:42\">\n    \
<dc:title>A Book</dc:title>\n  \
</rdf:Description>\n\
</rdf:RDF>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_field_list_gives_empty_description() {
        let xml = serialize("http://lod.example/resource/a:b:c", &dc_namespaces(), &[]).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\""));
        assert!(xml.contains("<rdf:Description rdf:about=\"http://lod.example/resource/a:b:c\"/>"));
        assert!(xml.trim_end().ends_with("</rdf:RDF>"));
    }

    #[test]
    fn escapes_reserved_characters() {
        let xml = serialize(
            "http://lod.example/resource/a:b:c?x=1&y=2",
            &dc_namespaces(),
            &[NormalizedField::dc("title", "Fish & <Chips> \"quoted\"")],
        )
        .unwrap();
        assert!(xml.contains("rdf:about=\"http://lod.example/resource/a:b:c?x=1&amp;y=2\""));
        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(!xml.contains("<Chips>"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let xml = serialize(
            "http://lod.example/resource/a:b:c",
            &dc_namespaces(),
            &[NormalizedField::dc("title", "A\u{0B}Book\u{0}\tvol.\u{FFFF}2")],
        )
        .unwrap();
        assert!(xml.contains("<dc:title>ABook\tvol.2</dc:title>"));
        assert!(!xml.chars().any(|c| !is_xml_char(c)));
    }

    #[test]
    fn xml_safe_borrows_clean_text() {
        assert!(matches!(xml_safe("plain \u{e9}t\u{e9}"), Cow::Borrowed(_)));
        assert_eq!(xml_safe("a\u{1}b"), "ab");
    }

    #[test]
    fn undeclared_prefix_is_rejected() {
        let err = serialize(
            "http://lod.example/resource/a:b:c",
            &rdf_namespaces(),
            &[NormalizedField::dc("title", "x")],
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::SerializationError { .. }));
    }

    #[test]
    fn invalid_element_name_is_rejected() {
        let err = serialize(
            "http://lod.example/resource/a:b:c",
            &dc_namespaces(),
            &[NormalizedField::dc("coverage spatial", "x")],
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::SerializationError { .. }));
    }

    #[test]
    fn relative_subject_is_rejected() {
        assert!(serialize("/resource/a:b:c", &dc_namespaces(), &[]).is_err());
    }

    #[test]
    fn later_namespaces_replace_earlier_ones() {
        let mut base = dc_namespaces();
        let mut extra = NamespaceMap::new();
        extra.insert("dc".to_string(), "http://purl.org/dc/terms/".to_string());
        extra.insert("ex".to_string(), "http://example.org/".to_string());
        merge_namespaces(&mut base, extra);
        let prefixes: Vec<&str> = base.keys().map(String::as_str).collect();
        assert_eq!(prefixes, vec!["rdf", "dc", "ex"]);
        assert_eq!(base["dc"], "http://purl.org/dc/terms/");
    }

    #[test]
    fn ncname_rules() {
        assert!(is_ncname("title"));
        assert!(is_ncname("date.created"));
        assert!(!is_ncname("1title"));
        assert!(!is_ncname("dc:title"));
        assert!(!is_ncname(""));
    }
}
