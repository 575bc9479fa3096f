//! Shared option types that replace string and boolean flags in the Rust API.

use crate::consts::RDF_XML_MEDIA_TYPE;

/// Which representation a `/resource` request should be redirected to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Representation {
    /// Machine-readable RDF/XML served from the `/data` route.
    Rdf,
    /// The source adapter's human-readable page.
    Html,
}

impl Representation {
    /// Picks a representation from the raw `Accept` header.
    ///
    /// Only an exact `application/rdf+xml` selects RDF; weighted or multi-valued headers
    /// fall through to the human page.
    pub fn from_accept(accept: Option<&str>) -> Self {
        match accept {
            Some(value) if value == RDF_XML_MEDIA_TYPE => Representation::Rdf,
            _ => Representation::Html,
        }
    }

    pub fn is_rdf(self) -> bool {
        matches!(self, Representation::Rdf)
    }
}

/// The two public route segments of the service.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Route {
    Resource,
    Data,
}

impl Route {
    pub fn segment(self) -> &'static str {
        match self {
            Route::Resource => "resource",
            Route::Data => "data",
        }
    }

    pub fn other(self) -> Route {
        match self {
            Route::Resource => Route::Data,
            Route::Data => Route::Resource,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}
