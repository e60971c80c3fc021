use regex::Regex;

use crate::error::{ResolveError, ResolveResult};

fn scheme_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("invalid scheme regex"))
}

/// Classification of a manifest-supplied asset reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetReference<'a> {
    /// The reference carries a scheme and points at its own origin.
    Absolute(&'a str),
    /// The reference must be resolved against the plugin's base URL.
    Relative(&'a str),
}

/// Parse an asset reference, rejecting input that is not a syntactically valid URL.
///
/// The reference is split into scheme, authority, path, query and fragment. Control
/// characters anywhere, a leading colon, a colon in the first segment of a scheme-less path,
/// an unterminated `[` host or a non-numeric port are malformed. Percent escapes must be
/// well formed in the userinfo, host, path and fragment; the query is left untouched, and
/// so is everything after the scheme of an opaque reference such as `mailto:`.
pub fn parse_asset_reference(value: &str) -> ResolveResult<AssetReference<'_>> {
    if value.chars().any(|ch| ch.is_ascii_control()) {
        return Err(ResolveError::malformed(value, "invalid control character in URL"));
    }

    let (target, fragment) = match value.split_once('#') {
        Some((target, fragment)) => (target, Some(fragment)),
        None => (value, None),
    };
    if let Some(fragment) = fragment {
        check_percent_escapes(value, fragment)?;
    }

    if target.starts_with(':') {
        return Err(ResolveError::malformed(value, "missing protocol scheme"));
    }

    let (has_scheme, rest) = match scheme_pattern().find(target) {
        Some(scheme) => (true, &target[scheme.end()..]),
        None => (false, target),
    };
    let rest = rest.split_once('?').map_or(rest, |(path, _query)| path);

    if !rest.starts_with('/') {
        if has_scheme {
            return Ok(AssetReference::Absolute(value));
        }
        let first_segment = rest.split('/').next().unwrap_or_default();
        if first_segment.contains(':') {
            return Err(ResolveError::malformed(
                value,
                "first path segment in URL cannot contain colon",
            ));
        }
    }

    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => {
            let split = authority_and_path.find('/').unwrap_or(authority_and_path.len());
            let (authority, path) = authority_and_path.split_at(split);
            check_authority(value, authority)?;
            path
        }
        None => rest,
    };
    check_percent_escapes(value, path)?;

    Ok(if has_scheme {
        AssetReference::Absolute(value)
    } else {
        AssetReference::Relative(value)
    })
}

fn check_authority(value: &str, authority: &str) -> ResolveResult<()> {
    let host = match authority.rsplit_once('@') {
        Some((userinfo, host)) => {
            check_percent_escapes(value, userinfo)?;
            host
        }
        None => authority,
    };

    let port = if host.starts_with('[') {
        let Some(close) = host.find(']') else {
            return Err(ResolveError::malformed(value, "missing ']' in host"));
        };
        &host[close + 1..]
    } else {
        host.rfind(':').map_or("", |colon| &host[colon..])
    };

    let digits = port.strip_prefix(':');
    if !port.is_empty() && !digits.is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit())) {
        return Err(ResolveError::malformed(
            value,
            format!("invalid port {port:?} after host"),
        ));
    }

    check_percent_escapes(value, host)
}

fn check_percent_escapes(value: &str, component: &str) -> ResolveResult<()> {
    let bytes = component.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }

        let escape = bytes.get(index + 1..index + 3);
        if !escape.is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit)) {
            let shown: String = component[index..].chars().take(3).collect();
            return Err(ResolveError::malformed(
                value,
                format!("invalid URL escape {shown:?}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AssetReference, parse_asset_reference};
    use crate::error::ResolveError;

    fn is_malformed(value: &str) -> bool {
        matches!(
            parse_asset_reference(value),
            Err(ResolveError::MalformedReference { .. })
        )
    }

    #[test]
    fn classifies_urls_with_scheme_as_absolute() {
        assert_eq!(
            parse_asset_reference("https://example.com/logo.svg"),
            Ok(AssetReference::Absolute("https://example.com/logo.svg"))
        );
        assert_eq!(
            parse_asset_reference("data:image/png;base64,abc"),
            Ok(AssetReference::Absolute("data:image/png;base64,abc"))
        );
    }

    #[test]
    fn classifies_bare_paths_as_relative() {
        for value in ["img/icon.svg", "/public/img/icn-panel.svg", "img/a%20b.png", "x.svg?v=1#top"] {
            assert_eq!(parse_asset_reference(value), Ok(AssetReference::Relative(value)));
        }
    }

    #[test]
    fn colon_after_first_segment_is_relative() {
        assert_eq!(
            parse_asset_reference("img/a:b.svg"),
            Ok(AssetReference::Relative("img/a:b.svg"))
        );
    }

    #[test]
    fn rejects_broken_percent_escapes() {
        assert!(is_malformed("img/%zz.svg"));
        assert!(is_malformed("img/icon%"));
        assert!(is_malformed("img/icon%4"));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(is_malformed("img/\u{7f}icon.svg"));
        assert!(is_malformed("img/icon.svg\n"));
    }

    #[test]
    fn rejects_missing_scheme_and_colon_segments() {
        assert!(is_malformed(":icon.svg"));
        assert!(is_malformed("1img:icon.svg"));
    }

    #[test]
    fn rejects_unterminated_hosts_and_bad_ports() {
        assert!(is_malformed("http://[::1/icon.svg"));
        assert!(is_malformed("//[::1/x"));
        assert!(is_malformed("https://cdn.example:80x/logo.svg"));
        assert!(is_malformed("//cdn.example:/x%zz"));
    }

    #[test]
    fn query_is_not_unescaped() {
        assert_eq!(
            parse_asset_reference("img/logo.svg?v=%zz"),
            Ok(AssetReference::Relative("img/logo.svg?v=%zz"))
        );
        assert_eq!(
            parse_asset_reference("https://example.com/a?q=100%"),
            Ok(AssetReference::Absolute("https://example.com/a?q=100%"))
        );
    }

    #[test]
    fn fragment_escapes_are_checked() {
        assert!(is_malformed("img/logo.svg#%zz"));
        assert_eq!(
            parse_asset_reference("img/logo.svg#part%20one"),
            Ok(AssetReference::Relative("img/logo.svg#part%20one"))
        );
    }

    #[test]
    fn empty_hosts_and_opaque_references_are_absolute() {
        for value in ["http://", "https://:443/logo.svg", "mailto:team%zz@example.com"] {
            assert_eq!(parse_asset_reference(value), Ok(AssetReference::Absolute(value)));
        }
    }

    #[test]
    fn network_path_references_are_relative() {
        assert_eq!(
            parse_asset_reference("//cdn.example:8080/img/logo.svg"),
            Ok(AssetReference::Relative("//cdn.example:8080/img/logo.svg"))
        );
    }
}
