//! Error taxonomy for identifier resolution and RDF generation.

use std::fmt;

/// Everything that can go wrong between receiving an identifier and producing a response.
///
/// Fields that fail to map onto a Dublin Core term are not errors; they are dropped
/// silently by the field mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The identifier does not split into `namespace:alias:pointer`.
    MalformedIdentifier { identifier: String },
    /// No source adapter is registered for the identifier's namespace.
    UnknownNamespace { namespace: String },
    /// An outbound call to the backend failed (network, non-2xx status, or bad JSON).
    BackendUnavailable {
        url: String,
        reason: String,
        timed_out: bool,
    },
    /// The backend answered, but the payload was not a metadata record.
    RecordNotFound { identifier: String },
    /// The document could not be serialized, e.g. an undeclared namespace prefix.
    SerializationError { reason: String },
}

impl ResolveError {
    pub fn backend(url: &str, reason: impl Into<String>) -> Self {
        ResolveError::BackendUnavailable {
            url: url.to_string(),
            reason: reason.into(),
            timed_out: false,
        }
    }

    pub fn serialization(reason: impl Into<String>) -> Self {
        ResolveError::SerializationError {
            reason: reason.into(),
        }
    }

    /// HTTP status code the router should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::MalformedIdentifier { .. } => 400,
            ResolveError::UnknownNamespace { .. } => 404,
            ResolveError::BackendUnavailable { timed_out: true, .. } => 504,
            ResolveError::BackendUnavailable { .. } => 502,
            ResolveError::RecordNotFound { .. } => 404,
            ResolveError::SerializationError { .. } => 500,
        }
    }

    /// Server-side faults, as opposed to problems with the request itself.
    pub fn is_server_fault(&self) -> bool {
        self.status_code() >= 500
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolveError::MalformedIdentifier { identifier } => write!(
                f,
                "Malformed identifier '{}': expected namespace:alias:pointer",
                identifier
            ),
            ResolveError::UnknownNamespace { namespace } => {
                write!(f, "No data source registered for namespace '{}'", namespace)
            }
            ResolveError::BackendUnavailable {
                url,
                reason,
                timed_out,
            } => {
                if *timed_out {
                    write!(f, "Backend request to {} timed out", url)
                } else {
                    write!(f, "Backend request to {} failed: {}", url, reason)
                }
            }
            ResolveError::RecordNotFound { identifier } => {
                write!(f, "No metadata record found for '{}'", identifier)
            }
            ResolveError::SerializationError { reason } => {
                write!(f, "Failed to serialize RDF/XML: {}", reason)
            }
        }
    }
}

impl std::error::Error for ResolveError {}
