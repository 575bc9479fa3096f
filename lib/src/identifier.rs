//! Parsing of opaque `namespace:alias:pointer` identifiers.

use crate::errors::ResolveError;
use std::fmt;
use std::str::FromStr;

/// A parsed record identifier.
///
/// The namespace selects the source adapter, the alias selects a collection inside the
/// backend, and the pointer selects a record within that collection. Segments after the
/// third are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    namespace: String,
    alias: String,
    pointer: String,
}

impl Identifier {
    pub fn parse(identifier: &str) -> Result<Self, ResolveError> {
        let mut parts = identifier.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(alias), Some(pointer)) => Ok(Identifier {
                namespace: namespace.to_string(),
                alias: alias.to_string(),
                pointer: pointer.to_string(),
            }),
            _ => Err(ResolveError::MalformedIdentifier {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }
}

impl FromStr for Identifier {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.alias, self.pointer)
    }
}
