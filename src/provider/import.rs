//! Import identifiers

use crate::error::{ProviderError, ProviderResult};

/// Split an import identifier into namespace and name.
///
/// Namespaced kinds take `"namespace/name"`, cluster-scoped kinds a bare
/// `"name"`. Every part must be non-empty.
pub fn parse_import_id(id: &str, namespaced: bool) -> ProviderResult<(Option<String>, String)> {
    let parts: Vec<&str> = id.split('/').collect();
    let invalid = || ProviderError::ImportId(id.to_string());

    if parts.iter().any(|part| part.is_empty()) {
        return Err(invalid());
    }

    match (namespaced, parts.as_slice()) {
        (true, [namespace, name]) => Ok((Some(namespace.to_string()), name.to_string())),
        (false, [name]) => Ok((None, name.to_string())),
        _ => Err(invalid()),
    }
}
