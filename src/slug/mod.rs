//! Canonical problem identifiers derived from judge-site URLs
//!
//! Every problem URL maps to exactly one slug, regardless of which URL
//! variant the student happened to be on (contest vs. problemset on
//! Codeforces, trailing slashes, query strings). The slug is the key used
//! for sheet column lookup and for the submitted-problems ledger, so the
//! mapping must be deterministic and total.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Judge platform a problem URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Codeforces,
    Leetcode,
    Hackerrank,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::Leetcode => "leetcode",
            Platform::Hackerrank => "hackerrank",
            Platform::Other => "other",
        }
    }

    /// Derive the platform from a problem URL (used for folder paths).
    pub fn from_url(url: &str) -> Platform {
        let lower = url.to_lowercase();
        if lower.contains("codeforces.com") {
            Platform::Codeforces
        } else if lower.contains("leetcode.com") {
            Platform::Leetcode
        } else if lower.contains("hackerrank.com") {
            Platform::Hackerrank
        } else {
            Platform::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a problem: slug plus platform tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemId {
    pub slug: String,
    pub platform: Platform,
}

static CF_CONTEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contest/(\d+)/problem/([a-z0-9]+)").unwrap());
static CF_PROBLEMSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"problem/(\d+)/([a-z0-9]+)").unwrap());
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

/// Resolve a problem URL to its canonical identity.
///
/// Total function: unresolvable URLs degrade to a slug derived from the last
/// path segment with non-alphanumeric characters stripped, tagged `other`.
pub fn resolve(url: &str) -> ProblemId {
    ProblemId {
        slug: generate_slug(url),
        platform: Platform::from_url(url),
    }
}

/// Generate the canonical slug for a problem URL.
///
/// Contest-style and problemset-style Codeforces URLs for the same problem
/// produce the same `<contest><letter>` slug. Title-based judges (LeetCode,
/// HackerRank, GeeksforGeeks, CodeChef) use the title path segment with
/// non-alphanumerics stripped.
pub fn generate_slug(url: &str) -> String {
    let mut clean = url
        .to_lowercase()
        .trim()
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string();
    while clean.ends_with('/') {
        clean.pop();
    }
    if clean.is_empty() {
        return String::new();
    }

    if clean.contains("codeforces.com") {
        if let Some(caps) = CF_CONTEST
            .captures(&clean)
            .or_else(|| CF_PROBLEMSET.captures(&clean))
        {
            return format!("{}{}", &caps[1], &caps[2]);
        }
    }

    for marker in ["/problems/", "/challenges/"] {
        if let Some((_, rest)) = clean.split_once(marker) {
            let segment = rest.split('/').next().unwrap_or_default();
            if !segment.is_empty() {
                return squash(segment);
            }
        }
    }

    // Fallback for any other site: last meaningful path segment.
    clean
        .split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .map(squash)
        .unwrap_or_default()
}

/// Strip a slug down to alphanumerics only, tolerating formatting drift
/// between the client's slug generator and the sheet's headers.
pub fn squash(slug: &str) -> String {
    NON_ALNUM.replace_all(&slug.to_lowercase(), "").into_owned()
}
