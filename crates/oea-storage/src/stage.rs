//! Stage naming conventions.
//!
//! Data moves through numbered stages held in containers named
//! `stage<N>[n][p]`: `np` holds non-pseudonymized data and `p` pseudonymized
//! data. Databases are named per stage number only, so `stage2np` and
//! `stage2p` share the `s2_` prefix.

use crate::{Result, StorageError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static SOURCE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://stage(\d+)(n?)(p?)@([^/]+)/([^/]+)")
        .expect("valid source path pattern")
});

/// Privacy zone of a stage container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// `stage<N>np`
    NonPseudonymized,
    /// `stage<N>p`
    Pseudonymized,
    /// Bare `stage<N>` (or the unusual `stage<N>n`)
    Unspecified,
}

impl Zone {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::NonPseudonymized => "np",
            Self::Pseudonymized => "p",
            Self::Unspecified => "",
        }
    }
}

/// Fields extracted from a stage path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePathInfo {
    pub stage_num: u32,
    pub zone: Zone,
    pub account: String,
    /// First path segment: the source system or subject area
    pub subject: String,
}

impl SourcePathInfo {
    /// Database name for this path: `s<N>_<subject>`.
    pub fn db_name(&self) -> String {
        format!("s{}_{}", self.stage_num, self.subject)
    }
}

/// Parse `<scheme>://stage<N>[n][p]@<account>/<subject>[/...]`.
///
/// ```
/// use oea_storage::parse_source_path;
///
/// let info = parse_source_path("abfss://stage2p@stoeaxyz.dfs.core.windows.net/ms_insights").unwrap();
/// assert_eq!(info.stage_num, 2);
/// assert_eq!(info.db_name(), "s2_ms_insights");
/// ```
pub fn parse_source_path(path: &str) -> Result<SourcePathInfo> {
    let malformed = || StorageError::MalformedPath(path.to_string());

    let captures = SOURCE_PATH.captures(path).ok_or_else(malformed)?;
    let group = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();

    let stage_num = group(1).parse::<u32>().map_err(|_| malformed())?;
    let zone = match (group(2), group(3)) {
        ("n", "p") => Zone::NonPseudonymized,
        ("", "p") => Zone::Pseudonymized,
        _ => Zone::Unspecified,
    };

    Ok(SourcePathInfo {
        stage_num,
        zone,
        account: group(4).to_string(),
        subject: group(5).to_string(),
    })
}

/// Split a path into everything before the last `/` and the last segment.
///
/// ```
/// use oea_storage::pop_from_path;
///
/// let (parent, last) = pop_from_path("abfss://stage2@xyz/ms_insights/test.csv").unwrap();
/// assert_eq!(parent, "abfss://stage2@xyz/ms_insights");
/// assert_eq!(last, "test.csv");
/// ```
pub fn pop_from_path(path: &str) -> Result<(String, String)> {
    match path.rsplit_once('/') {
        Some((parent, last)) if !last.is_empty() => Ok((parent.to_string(), last.to_string())),
        _ => Err(StorageError::MalformedPath(path.to_string())),
    }
}

/// Root URIs of every stage container for one storage account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRoots {
    pub stage1np: String,
    pub stage2np: String,
    pub stage2p: String,
    pub stage3np: String,
    pub stage3p: String,
    pub framework: String,
}

impl StageRoots {
    pub const SCHEME: &'static str = "abfss";
    pub const ENDPOINT_SUFFIX: &'static str = "dfs.core.windows.net";

    /// Stage roots for a storage account name, e.g. `stoeaxyz`.
    pub fn for_account(account: &str) -> Self {
        let root = |container: &str| {
            format!(
                "{}://{container}@{account}.{}",
                Self::SCHEME,
                Self::ENDPOINT_SUFFIX
            )
        };
        Self {
            stage1np: root("stage1np"),
            stage2np: root("stage2np"),
            stage2p: root("stage2p"),
            stage3np: root("stage3np"),
            stage3p: root("stage3p"),
            framework: root("oea-framework"),
        }
    }

    /// Every stage root paired with its container name, in stage order.
    pub fn stages(&self) -> [(&'static str, &str); 5] {
        [
            ("stage1np", self.stage1np.as_str()),
            ("stage2np", self.stage2np.as_str()),
            ("stage2p", self.stage2p.as_str()),
            ("stage3np", self.stage3np.as_str()),
            ("stage3p", self.stage3p.as_str()),
        ]
    }

    /// Root URI for a container name such as `stage2p`.
    pub fn by_name(&self, name: &str) -> Option<&str> {
        if name == "oea-framework" || name == "framework" {
            return Some(&self.framework);
        }
        self.stages()
            .into_iter()
            .find(|(stage, _)| *stage == name)
            .map(|(_, root)| root)
    }
}

impl fmt::Display for SourcePathInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stage{}{} {} ({})",
            self.stage_num,
            self.zone.suffix(),
            self.subject,
            self.account
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stage_paths() {
        let info =
            parse_source_path("abfss://stage2np@stoeacisd3ggimpl3.dfs.core.windows.net/ms_insights")
                .unwrap();
        assert_eq!(info.stage_num, 2);
        assert_eq!(info.zone, Zone::NonPseudonymized);
        assert_eq!(info.account, "stoeacisd3ggimpl3.dfs.core.windows.net");
        assert_eq!(info.subject, "ms_insights");
        assert_eq!(info.db_name(), "s2_ms_insights");

        let pseudo = parse_source_path("abfss://stage2p@acct/ms_insights/Person").unwrap();
        assert_eq!(pseudo.zone, Zone::Pseudonymized);
        assert_eq!(pseudo.db_name(), info.db_name());

        let bare = parse_source_path("abfss://stage3@acct/contoso_sis").unwrap();
        assert_eq!(bare.zone, Zone::Unspecified);
        assert_eq!(bare.db_name(), "s3_contoso_sis");
    }

    #[test]
    fn test_parse_malformed_paths() {
        for path in [
            "abfss://stage2p@acct",
            "abfss://stage2p@acct/",
            "abfss://raw@acct/ms_insights",
            "/local/stage2/ms_insights",
            "abfss://stagex@acct/ms_insights",
        ] {
            assert!(
                matches!(parse_source_path(path), Err(StorageError::MalformedPath(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn test_pop_from_path() {
        assert_eq!(
            pop_from_path("a/b/c.csv").unwrap(),
            ("a/b".to_string(), "c.csv".to_string())
        );
        assert!(pop_from_path("no_slash").is_err());
        assert!(pop_from_path("trailing/").is_err());
    }

    #[test]
    fn test_stage_roots() {
        let roots = StageRoots::for_account("stoeaxyz");
        assert_eq!(roots.stage1np, "abfss://stage1np@stoeaxyz.dfs.core.windows.net");
        assert_eq!(
            roots.framework,
            "abfss://oea-framework@stoeaxyz.dfs.core.windows.net"
        );
        assert_eq!(roots.by_name("stage3p"), Some(roots.stage3p.as_str()));
        assert_eq!(roots.by_name("stage9"), None);
    }
}
