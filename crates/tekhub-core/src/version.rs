//! Version ordering for catalog resources
//!
//! Catalog versions are not guaranteed to be semver: `0.3`, `1.2.1`,
//! `v0.10.0` and plain tags such as `master` all show up in practice.
//! A version is *numeric* when every dot-separated segment (after an optional
//! leading `v`/`V`) is a non-negative integer. Numeric versions compare
//! component-wise with zero padding, so `0.3` and `0.3.0` are equal.
//! Numeric versions always rank above non-numeric ones.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Raw version text as published by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionString(String);

impl VersionString {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric components, or `None` for non-numeric versions
    pub fn components(&self) -> Option<Vec<u64>> {
        parse(&self.0)
    }

    pub fn is_numeric(&self) -> bool {
        self.components().is_some()
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VersionString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for VersionString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a version into numeric components
///
/// Strips one leading `v` or `V`. Returns `None` if any segment is empty or
/// is not made of ASCII digits.
pub fn parse(raw: &str) -> Option<Vec<u64>> {
    let trimmed = raw
        .strip_prefix('v')
        .or_else(|| raw.strip_prefix('V'))
        .unwrap_or(raw);

    trimmed
        .split('.')
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                segment.parse::<u64>().ok()
            }
        })
        .collect()
}

/// How two non-numeric versions are ordered relative to each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackOrdering {
    /// Plain string comparison (hub-compatible)
    #[default]
    Lexical,

    /// Non-numeric versions tie, so sorting keeps catalog order
    InputOrder,
}

impl FromStr for FallbackOrdering {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lexical" => Ok(Self::Lexical),
            "input-order" => Ok(Self::InputOrder),
            other => Err(CoreError::UnknownOrdering {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FallbackOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("lexical"),
            Self::InputOrder => f.write_str("input-order"),
        }
    }
}

/// Totally orders catalog version strings
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionComparator {
    fallback: FallbackOrdering,
}

impl VersionComparator {
    pub fn new(fallback: FallbackOrdering) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> FallbackOrdering {
        self.fallback
    }

    /// Compare two versions; `Greater` means `a` is newer than `b`
    pub fn compare(&self, a: &VersionString, b: &VersionString) -> Ordering {
        match (a.components(), b.components()) {
            (Some(ca), Some(cb)) => compare_components(&ca, &cb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => match self.fallback {
                FallbackOrdering::Lexical => a.as_str().cmp(b.as_str()),
                FallbackOrdering::InputOrder => Ordering::Equal,
            },
        }
    }

    /// Sort a copy of `versions`, newest first
    ///
    /// The sort is stable: versions comparing equal keep their input order.
    pub fn sort_descending(&self, versions: &[VersionString]) -> Vec<VersionString> {
        let mut sorted = versions.to_vec();
        sorted.sort_by(|a, b| self.compare(b, a));
        sorted
    }

    /// The newest version of a set
    pub fn latest(&self, name: &str, versions: &[VersionString]) -> Result<VersionString> {
        self.sort_descending(versions)
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::EmptySet {
                name: name.to_string(),
            })
    }

    /// Find the entry of `versions` equal to `wanted`, in the catalog's own spelling
    pub fn find<'a>(
        &self,
        versions: &'a [VersionString],
        wanted: &VersionString,
    ) -> Option<&'a VersionString> {
        versions
            .iter()
            .find(|v| *v == wanted)
            .or_else(|| {
                versions
                    .iter()
                    .find(|v| v.is_numeric() && self.compare(v, wanted) == Ordering::Equal)
            })
    }
}

fn compare_components(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Compare with the default (lexical) fallback
pub fn compare(a: &VersionString, b: &VersionString) -> Ordering {
    VersionComparator::default().compare(a, b)
}

/// Sort newest first with the default (lexical) fallback
pub fn sort_descending(versions: &[VersionString]) -> Vec<VersionString> {
    VersionComparator::default().sort_descending(versions)
}

/// Newest version with the default (lexical) fallback
pub fn latest(name: &str, versions: &[VersionString]) -> Result<VersionString> {
    VersionComparator::default().latest(name, versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vs(items: &[&str]) -> Vec<VersionString> {
        items.iter().map(|s| VersionString::from(*s)).collect()
    }

    fn v(s: &str) -> VersionString {
        VersionString::from(s)
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse("0.3"), Some(vec![0, 3]));
        assert_eq!(parse("1.2.1"), Some(vec![1, 2, 1]));
        assert_eq!(parse("v0.10.0"), Some(vec![0, 10, 0]));
        assert_eq!(parse("V2"), Some(vec![2]));
    }

    #[test]
    fn test_parse_non_numeric() {
        assert_eq!(parse("master"), None);
        assert_eq!(parse("alpha"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("v"), None);
        assert_eq!(parse("1..2"), None);
        assert_eq!(parse("1.2."), None);
        assert_eq!(parse("1.+2"), None);
        assert_eq!(parse("1.-2"), None);
        assert_eq!(parse("vv1"), None);
        assert_eq!(parse("1.2.3-rc1"), None);
    }

    #[test]
    fn test_compare_padding() {
        assert_eq!(compare(&v("0.3"), &v("0.3.0")), Ordering::Equal);
        assert_eq!(compare(&v("0.3.0.0"), &v("0.3")), Ordering::Equal);
        assert_eq!(compare(&v("v0.3"), &v("0.3.0")), Ordering::Equal);
    }

    #[test]
    fn test_compare_numeric_not_lexical() {
        assert_eq!(compare(&v("0.10"), &v("0.9")), Ordering::Greater);
        assert_eq!(compare(&v("1.0"), &v("0.99.99")), Ordering::Greater);
        assert_eq!(compare(&v("0.3.1"), &v("0.3")), Ordering::Greater);
        assert_eq!(compare(&v("0.1"), &v("0.2")), Ordering::Less);
    }

    #[test]
    fn test_compare_numeric_beats_non_numeric() {
        assert_eq!(compare(&v("0.0.1"), &v("master")), Ordering::Greater);
        assert_eq!(compare(&v("zzz"), &v("0.1")), Ordering::Less);
    }

    #[test]
    fn test_compare_non_numeric_lexical() {
        assert_eq!(compare(&v("master"), &v("alpha")), Ordering::Greater);
        assert_eq!(compare(&v("alpha"), &v("beta")), Ordering::Less);
        assert_eq!(compare(&v("master"), &v("master")), Ordering::Equal);
    }

    #[test]
    fn test_compare_non_numeric_input_order() {
        let cmp = VersionComparator::new(FallbackOrdering::InputOrder);
        assert_eq!(cmp.compare(&v("master"), &v("alpha")), Ordering::Equal);
        assert_eq!(cmp.compare(&v("master"), &v("0.1")), Ordering::Less);
    }

    #[test]
    fn test_compare_reflexive() {
        for s in ["0.1", "v1.2.3", "master", "", "0.3.0"] {
            assert_eq!(compare(&v(s), &v(s)), Ordering::Equal, "{s}");
        }
    }

    #[test]
    fn test_compare_transitive() {
        let sample = vs(&["0.1", "0.10", "0.9", "v0.3", "0.3.0", "master", "alpha", "1", "1.0.1"]);
        for a in &sample {
            for b in &sample {
                for c in &sample {
                    if compare(a, b) != Ordering::Less && compare(b, c) != Ordering::Less {
                        assert_ne!(compare(a, c), Ordering::Less, "{a} >= {b} >= {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_sort_descending() {
        let sorted = sort_descending(&vs(&["0.1", "0.3", "0.10", "0.2"]));
        assert_eq!(sorted, vs(&["0.10", "0.3", "0.2", "0.1"]));
    }

    #[test]
    fn test_sort_descending_ties_keep_input_order() {
        let sorted = sort_descending(&vs(&["0.3.0", "0.1", "0.3"]));
        assert_eq!(sorted, vs(&["0.3.0", "0.3", "0.1"]));

        let sorted = sort_descending(&vs(&["0.3", "0.1", "0.3.0"]));
        assert_eq!(sorted, vs(&["0.3", "0.3.0", "0.1"]));
    }

    #[test]
    fn test_sort_descending_non_numeric_lexical() {
        let sorted = sort_descending(&vs(&["alpha", "0.1", "master", "0.2"]));
        assert_eq!(sorted, vs(&["0.2", "0.1", "master", "alpha"]));
    }

    #[test]
    fn test_sort_descending_non_numeric_input_order() {
        let cmp = VersionComparator::new(FallbackOrdering::InputOrder);
        let sorted = cmp.sort_descending(&vs(&["alpha", "0.1", "master", "0.2"]));
        assert_eq!(sorted, vs(&["0.2", "0.1", "alpha", "master"]));
    }

    #[test]
    fn test_sort_descending_idempotent() {
        let input = vs(&["master", "0.3", "v0.10.0", "alpha", "0.3.0", "1"]);
        for cmp in [
            VersionComparator::new(FallbackOrdering::Lexical),
            VersionComparator::new(FallbackOrdering::InputOrder),
        ] {
            let once = cmp.sort_descending(&input);
            let twice = cmp.sort_descending(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let input = vs(&["0.1", "0.3", "0.2"]);
        let _ = sort_descending(&input);
        assert_eq!(input, vs(&["0.1", "0.3", "0.2"]));
    }

    #[test]
    fn test_latest() {
        assert_eq!(latest("foo", &vs(&["0.1", "0.2", "0.3"])).unwrap(), v("0.3"));
        assert_eq!(latest("foo", &vs(&["master", "0.1"])).unwrap(), v("0.1"));
    }

    #[test]
    fn test_latest_empty_set() {
        let err = latest("foo", &[]).unwrap_err();
        assert_eq!(
            err,
            CoreError::EmptySet {
                name: "foo".to_string()
            }
        );
    }

    #[test]
    fn test_find_prefers_exact_spelling() {
        let cmp = VersionComparator::default();
        let set = vs(&["0.1", "0.3.0", "0.3"]);
        assert_eq!(cmp.find(&set, &v("0.3")), Some(&v("0.3")));
        assert_eq!(cmp.find(&set, &v("v0.1.0")), Some(&v("0.1")));
        assert_eq!(cmp.find(&set, &v("0.9")), None);
    }

    #[test]
    fn test_find_non_numeric_needs_exact_match() {
        let cmp = VersionComparator::new(FallbackOrdering::InputOrder);
        let set = vs(&["master", "0.1"]);
        assert_eq!(cmp.find(&set, &v("alpha")), None);
        assert_eq!(cmp.find(&set, &v("master")), Some(&v("master")));
    }

    #[test]
    fn test_fallback_ordering_from_str() {
        assert_eq!("lexical".parse::<FallbackOrdering>().unwrap(), FallbackOrdering::Lexical);
        assert_eq!(
            "input-order".parse::<FallbackOrdering>().unwrap(),
            FallbackOrdering::InputOrder
        );
        assert!("random".parse::<FallbackOrdering>().is_err());
    }
}
