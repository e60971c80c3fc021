//! Error types shared by the resolver and the CDN oracle.

use thiserror::Error;

/// Result type returned by every resolution operation.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Failures surfaced while computing plugin asset locations.
///
/// Both kinds stem from malformed input data, so callers receive them unmodified and no
/// state is carried over to later resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A manifest-supplied asset reference could not be parsed as a URL.
    #[error("malformed asset reference {reference:?}: {reason}")]
    MalformedReference {
        /// The offending reference exactly as supplied.
        reference: String,
        /// Why parsing failed.
        reason: String,
    },
    /// The CDN oracle failed to build a path or URL for the plugin.
    #[error("failed to construct CDN location for plugin '{plugin_id}': {reason}")]
    UpstreamConstructionFailure {
        /// Identifier of the plugin being resolved.
        plugin_id: String,
        /// Why construction failed.
        reason: String,
    },
}

impl ResolveError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream(plugin_id: &str, reason: impl ToString) -> Self {
        Self::UpstreamConstructionFailure {
            plugin_id: plugin_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResolveError;

    #[test]
    fn malformed_reference_names_the_input() {
        let err = ResolveError::malformed("img/%zz.svg", "invalid URL escape \"%zz\"");
        assert_eq!(
            err.to_string(),
            "malformed asset reference \"img/%zz.svg\": invalid URL escape \"%zz\""
        );
    }

    #[test]
    fn upstream_failure_names_the_plugin() {
        let err = ResolveError::upstream("acme-app", "relative URL without a base");
        assert_eq!(
            err.to_string(),
            "failed to construct CDN location for plugin 'acme-app': relative URL without a base"
        );
    }
}
