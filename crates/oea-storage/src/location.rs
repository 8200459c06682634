//! Storage URI parsing.

use crate::{Result, StorageError};

/// A parsed `<scheme>://<container>@<account>/<path>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub scheme: String,
    pub container: String,
    pub account: String,
    /// Path inside the container, without leading or trailing slashes
    pub path: String,
}

impl StorageLocation {
    /// Parse a storage URI.
    ///
    /// - `abfss://stage1np@acct.dfs.core.windows.net/a/b` -> container
    ///   `stage1np`, account `acct.dfs.core.windows.net`, path `a/b`
    /// - `abfss://stage1np@acct` -> empty path
    pub fn parse(uri: &str) -> Result<Self> {
        let malformed = || StorageError::MalformedPath(uri.to_string());

        let (scheme, rest) = uri.split_once("://").ok_or_else(malformed)?;
        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (rest, ""),
        };
        let (container, account) = authority.split_once('@').ok_or_else(malformed)?;
        if scheme.is_empty() || container.is_empty() || account.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            scheme: scheme.to_string(),
            container: container.to_string(),
            account: account.to_string(),
            path: path.trim_matches('/').to_string(),
        })
    }

    pub fn is_uri(path: &str) -> bool {
        path.contains("://")
    }

    pub fn to_uri(&self) -> String {
        let base = format!("{}://{}@{}", self.scheme, self.container, self.account);
        if self.path.is_empty() {
            base
        } else {
            format!("{base}/{}", self.path)
        }
    }
}

/// Join a relative path onto a base path or URI with exactly one `/`.
pub fn join_path(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return base.to_string();
    }
    format!("{}/{relative}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let loc = StorageLocation::parse("abfss://stage1np@stoeaxyz.dfs.core.windows.net/contoso_sis/students")
            .unwrap();
        assert_eq!(loc.scheme, "abfss");
        assert_eq!(loc.container, "stage1np");
        assert_eq!(loc.account, "stoeaxyz.dfs.core.windows.net");
        assert_eq!(loc.path, "contoso_sis/students");
        assert_eq!(
            loc.to_uri(),
            "abfss://stage1np@stoeaxyz.dfs.core.windows.net/contoso_sis/students"
        );
    }

    #[test]
    fn test_parse_container_root() {
        let loc = StorageLocation::parse("abfss://stage2p@acct/").unwrap();
        assert_eq!(loc.path, "");
        assert_eq!(loc.to_uri(), "abfss://stage2p@acct");
    }

    #[test]
    fn test_parse_malformed() {
        for uri in ["/tmp/file.csv", "abfss://acct/path", "://c@a/p", "abfss://@a/p"] {
            assert!(
                matches!(StorageLocation::parse(uri), Err(StorageError::MalformedPath(_))),
                "{uri}"
            );
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("abfss://s@a/", "/x/y.csv"), "abfss://s@a/x/y.csv");
        assert_eq!(join_path("out", "Intune/device.csv"), "out/Intune/device.csv");
        assert_eq!(join_path("out", ""), "out");
    }
}
