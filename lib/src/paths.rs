//! Rewrites between the `/resource/` and `/data/` views of the same identifier.

use crate::options::Route;

/// Replaces the first `/<from>/` segment of `path` with `/<to>/`, where `from` is the
/// other route. Everything else, including any query string, is left alone. Paths that do
/// not contain the segment are returned unchanged.
pub fn swap_path(path: &str, to: Route) -> String {
    let from = format!("/{}/", to.other().segment());
    let replacement = format!("/{}/", to.segment());
    path.replacen(&from, &replacement, 1)
}

/// `/resource/{id}` to `/data/{id}`.
pub fn swap_to_data(path: &str) -> String {
    swap_path(path, Route::Data)
}

/// `/data/{id}` to `/resource/{id}`.
pub fn swap_to_resource(path: &str) -> String {
    swap_path(path, Route::Resource)
}

/// Joins a scheme-and-authority base such as `http://host:8080` with an absolute path.
pub fn absolute_url(base: &str, path_and_query: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}
