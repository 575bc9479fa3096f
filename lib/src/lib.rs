//! easyLOD exposes records held in content-management systems as Linked Open Data.
//!
//! An identifier of the form `namespace:alias:pointer` is routed to the source adapter
//! registered for its namespace. The adapter either names a human-readable page for the
//! record or fetches the record's metadata, which is mapped onto Dublin Core and written
//! out as RDF/XML.

pub mod config;
pub mod consts;
pub mod contentdm;
pub mod errors;
pub mod fetch;
pub mod identifier;
pub mod mapping;
pub mod options;
pub mod paths;
pub mod rdfxml;
pub mod resolver;
pub mod source;

pub use errors::ResolveError;
pub use identifier::Identifier;
pub use resolver::Resolver;

/// Initializes logging for the easylod library.
///
/// If `EASYLOD_LOG` is set, `RUST_LOG` is set to its value so that it takes precedence.
/// The logger itself (e.g. `env_logger::try_init()`) must be started after this call.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("EASYLOD_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}
