//! Repository path layout for archived solutions
//!
//! One deterministic path per problem so re-submissions overwrite the
//! previous archive instead of accumulating copies.

use crate::slug::{self, Platform};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Paths for one archived submission, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePlan {
    pub code_path: String,
    pub readme_path: Option<String>,
}

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize the configured folder prefix: empty stays empty, anything else
/// ends with exactly one `/`.
pub fn folder_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed.trim_end_matches('/'))
    }
}

/// LeetHub-style folder name, e.g. `0001-two-sum`.
pub fn leetcode_folder(question_frontend_id: &str, title_slug: &str) -> String {
    format!("{:0>4}-{}", question_frontend_id, title_slug)
}

/// Hyphenated filename slug for problems on unrecognized sites, taken from
/// the URL's last path segment. Degrades to `solution`.
pub fn fallback_filename_slug(problem_url: &str) -> String {
    let without_query = problem_url.split('?').next().unwrap_or_default();
    let last = match Url::parse(without_query) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back().map(String::from))
            .unwrap_or_default(),
        Err(_) => String::new(),
    };
    let slug = HYPHEN_RUNS
        .replace_all(&last.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();
    if slug.is_empty() {
        "solution".to_string()
    } else {
        slug
    }
}

/// Plan archive paths for a submission.
///
/// LeetCode and Codeforces problems get a folder with code plus README;
/// everything else is a flat file under `other/`.
pub fn plan(
    platform: Platform,
    problem_url: &str,
    prefix: &str,
    extension: &str,
    leetcode_dir: Option<&str>,
) -> ArchivePlan {
    let prefix = folder_prefix(prefix);
    match platform {
        Platform::Leetcode => {
            let dir = leetcode_dir
                .map(str::to_string)
                .unwrap_or_else(|| slug::generate_slug(problem_url));
            let base = format!("{prefix}leetcode/{dir}");
            ArchivePlan {
                code_path: format!("{base}/{dir}.{extension}"),
                readme_path: Some(format!("{base}/README.md")),
            }
        }
        Platform::Codeforces => {
            let dir = slug::generate_slug(problem_url);
            let base = format!("{prefix}codeforces/{dir}");
            ArchivePlan {
                code_path: format!("{base}/{dir}.{extension}"),
                readme_path: Some(format!("{base}/README.md")),
            }
        }
        _ => ArchivePlan {
            code_path: format!(
                "{prefix}other/{}.{extension}",
                fallback_filename_slug(problem_url)
            ),
            readme_path: None,
        },
    }
}
