//! End-to-end submission pipeline
//!
//! capture tuple -> coordinate resolution -> archive upload -> delivery.
//! Two-tier guarantee: the archive upload always happens first, so code is
//! never lost; delivery to the tracking sheet is attempted only for
//! coordinate-bound records, and an unresolved coordinate downgrades the
//! outcome to "archived, not tracked" instead of failing.

use crate::archive::readme::{
    build_codeforces_readme, build_leetcode_readme, build_minimal_readme, CodeforcesReadme,
    LeetcodeQuestion,
};
use crate::archive::{lang, layout, ArchiveUploader};
use crate::delivery::{DeliveryEngine, DeliveryOptions, TrackingRecord};
use crate::error::Result;
use crate::sheet::cache::SheetMapCache;
use crate::sheet::map::resolve_coordinates;
use crate::slug::{self, Platform};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// A captured solution, as supplied by the capture side. Code and numeric
/// fields are assumed already validated at that boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub problem_url: String,
    pub code: String,
    pub time_minutes: f64,
    pub attempts: u32,
    /// Judge-reported language label, used for extension inference.
    #[serde(default)]
    pub language: Option<String>,
    /// Display name of the problem, used in READMEs and commit messages.
    #[serde(default)]
    pub problem_name: Option<String>,
    /// LeetCode question metadata when the capture side has it.
    #[serde(default)]
    pub leetcode_question: Option<LeetcodeQuestion>,
}

/// Caller-visible result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Archived and recorded on the tracking sheet.
    Tracked { archive_url: String },
    /// Archived, but the sheet coordinate could not be resolved.
    ArchivedOnly { archive_url: String, message: String },
}

pub const ARCHIVED_ONLY_MESSAGE: &str =
    "Pushed to the archive. If this problem is on the sheet, sync and try again.";

const LEDGER_FILE: &str = "submitted_problems.json";

/// Persisted `platform:slug` set of already-submitted problems, used for
/// "already submitted" hints. Best effort only.
pub struct SubmittedLedger {
    path: PathBuf,
}

impl SubmittedLedger {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(LEDGER_FILE),
        })
    }

    fn load(&self) -> HashMap<String, bool> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub fn contains(&self, platform: Platform, slug: &str) -> bool {
        self.load().contains_key(&format!("{platform}:{slug}"))
    }

    pub fn mark(&self, platform: Platform, slug: &str) -> Result<()> {
        let mut entries = self.load();
        entries.insert(format!("{platform}:{slug}"), true);
        let json = serde_json::to_string_pretty(&entries)?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Identity and repository settings for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub group: String,
    pub student_name: String,
    pub repo: String,
    pub folder_path: String,
}

pub struct SubmissionPipeline {
    settings: PipelineSettings,
    uploader: Arc<dyn ArchiveUploader>,
    cache: Arc<SheetMapCache>,
    engine: DeliveryEngine,
    ledger: SubmittedLedger,
}

static CF_CONTEST_RAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contest/(\d+)/problem/([A-Za-z0-9]+)").unwrap());
static CF_PROBLEMSET_RAW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"problemset/problem/(\d+)/([A-Za-z0-9]+)").unwrap());

impl SubmissionPipeline {
    pub fn new(
        settings: PipelineSettings,
        uploader: Arc<dyn ArchiveUploader>,
        cache: Arc<SheetMapCache>,
        engine: DeliveryEngine,
        ledger: SubmittedLedger,
    ) -> Self {
        Self {
            settings,
            uploader,
            cache,
            engine,
            ledger,
        }
    }

    /// Proactive cache warm-up for the configured group. Failures are
    /// logged only.
    pub async fn warm(&self) {
        self.cache.warm(&self.settings.group).await;
    }

    /// Run one submission through archive and delivery.
    ///
    /// Archive failures propagate as-is; without a durable archive URL there
    /// is nothing meaningful to deliver. Delivery failures are classified
    /// (the archive content is untouched by them).
    pub async fn submit(
        &self,
        submission: &Submission,
        options: DeliveryOptions,
    ) -> Result<SubmitOutcome> {
        let id = slug::resolve(&submission.problem_url);
        let archive_url = self.archive(submission, id.platform).await?;

        if let Err(e) = self.ledger.mark(id.platform, &id.slug) {
            warn!("failed to record submitted problem: {e}");
        }

        let coordinate = self.cache.get().and_then(|(map, _)| {
            resolve_coordinates(&map, &self.settings.student_name, &submission.problem_url)
        });
        let Some(coordinate) = coordinate else {
            debug!(slug = %id.slug, "coordinate unresolved, skipping delivery");
            return Ok(SubmitOutcome::ArchivedOnly {
                archive_url,
                message: ARCHIVED_ONLY_MESSAGE.to_string(),
            });
        };

        let mut record = TrackingRecord {
            group: self.settings.group.clone(),
            student_full_name: self.settings.student_name.clone(),
            problem_url: submission.problem_url.clone(),
            github_link: archive_url.clone(),
            attempts: submission.attempts,
            time_minutes: submission.time_minutes,
            coordinate: Some(coordinate),
        };
        self.engine.deliver(&mut record, options).await?;
        Ok(SubmitOutcome::Tracked { archive_url })
    }

    /// Upload README (when the platform gets one) and code, returning the
    /// code's permanent URL.
    async fn archive(&self, submission: &Submission, platform: Platform) -> Result<String> {
        let extension = submission
            .language
            .as_deref()
            .map(|language| lang::extension_for(platform, language))
            .unwrap_or("py");
        let leetcode_dir = submission.leetcode_question.as_ref().map(|q| {
            layout::leetcode_folder(&q.question_frontend_id, &q.title_slug)
        });
        let plan = layout::plan(
            platform,
            &submission.problem_url,
            &self.settings.folder_path,
            extension,
            leetcode_dir.as_deref(),
        );

        let title = self.display_title(submission, platform);
        if let Some(readme_path) = &plan.readme_path {
            let readme = self.build_readme(submission, platform, &title);
            self.uploader
                .upload(
                    &self.settings.repo,
                    readme_path,
                    &readme,
                    &format!("Add README for {title}"),
                )
                .await?;
        }
        self.uploader
            .upload(
                &self.settings.repo,
                &plan.code_path,
                &submission.code,
                &format!("Add solution for {title}"),
            )
            .await
    }

    fn display_title(&self, submission: &Submission, platform: Platform) -> String {
        if let Some(question) = &submission.leetcode_question {
            return question.title.clone();
        }
        if let Some(name) = &submission.problem_name {
            return name.clone();
        }
        let slug = slug::generate_slug(&submission.problem_url);
        if slug.is_empty() || platform == Platform::Other {
            layout::fallback_filename_slug(&submission.problem_url)
        } else {
            slug
        }
    }

    fn build_readme(&self, submission: &Submission, platform: Platform, title: &str) -> String {
        match platform {
            Platform::Leetcode => match &submission.leetcode_question {
                Some(question) => build_leetcode_readme(question, &submission.problem_url),
                None => build_minimal_readme(title, &submission.problem_url),
            },
            Platform::Codeforces => {
                let caps = CF_CONTEST_RAW
                    .captures(&submission.problem_url)
                    .or_else(|| CF_PROBLEMSET_RAW.captures(&submission.problem_url));
                let (contest_id, index) = caps
                    .map(|c| (c[1].parse().unwrap_or(0), c[2].to_string()))
                    .unwrap_or((0, "A".to_string()));
                build_codeforces_readme(&CodeforcesReadme {
                    contest_id,
                    index,
                    name: title.to_string(),
                    question_url: submission.problem_url.clone(),
                    ..CodeforcesReadme::default()
                })
            }
            _ => build_minimal_readme(title, &submission.problem_url),
        }
    }
}
