//! Namespace IRIs and prefixes used when writing RDF/XML documents, plus the media types
//! that drive content negotiation.

use oxigraph::model::NamedNodeRef;

pub const RDF_PREFIX: &str = "rdf";
pub const RDF_NAMESPACE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#");

// dublin core element set; mapped fields are written with this prefix
pub const DC_PREFIX: &str = "dc";
pub const DC_NAMESPACE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/");

pub const DCTERMS_PREFIX: &str = "dcterms";
pub const DCTERMS_NAMESPACE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://purl.org/dc/terms/");

/// Accept header value that marks a Linked Data client.
pub const RDF_XML_MEDIA_TYPE: &str = "application/rdf+xml";
/// Content type of `/data` responses.
pub const DATA_CONTENT_TYPE: &str = "text/xml";
