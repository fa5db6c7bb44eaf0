//! Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use solvetrack::archive::ArchiveUploader;
use solvetrack::delivery::{Notifier, TrackingRecord};
use solvetrack::error::{Error, Result};
use solvetrack::sheet::map::SheetMap;
use solvetrack::sheet::transport::{DeliveryOutcome, SheetTransport};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Transport that replays scripted responses and records every push.
pub struct ScriptedTransport {
    push_responses: Mutex<VecDeque<Result<DeliveryOutcome>>>,
    map_responses: Mutex<VecDeque<Result<Option<SheetMap>>>>,
    pub pushes: Mutex<Vec<TrackingRecord>>,
    pub fetches: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(
        push_responses: Vec<Result<DeliveryOutcome>>,
        map_responses: Vec<Result<Option<SheetMap>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            push_responses: Mutex::new(push_responses.into()),
            map_responses: Mutex::new(map_responses.into()),
            pushes: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        })
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }

    pub fn pushed(&self, index: usize) -> TrackingRecord {
        self.pushes.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl SheetTransport for ScriptedTransport {
    async fn fetch_map(&self, group: &str) -> Result<Option<SheetMap>> {
        self.fetches.lock().unwrap().push(group.to_string());
        self.map_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn push(&self, record: &TrackingRecord) -> Result<DeliveryOutcome> {
        self.pushes.lock().unwrap().push(record.clone());
        self.push_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of push responses")
    }
}

/// Uploader that stores content in memory and returns deterministic URLs.
pub struct FakeUploader {
    pub uploads: Mutex<Vec<(String, String, String, String)>>,
    pub contents: Mutex<HashMap<String, String>>,
    pub fail: bool,
}

impl FakeUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
            fail: true,
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(_, path, _, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl ArchiveUploader for FakeUploader {
    async fn upload(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<String> {
        if self.fail {
            return Err(Error::Archive("upload rejected".to_string()));
        }
        self.uploads.lock().unwrap().push((
            repo.to_string(),
            path.to_string(),
            content.to_string(),
            commit_message.to_string(),
        ));
        self.contents
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(format!("https://github.com/{repo}/blob/main/{path}"))
    }
}

/// Notifier that records messages instead of surfacing them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Map with one student and one problem, matching the wire shape the
/// endpoint produces.
pub fn map_with(student: &str, row: u32, problem_slug: &str, col: u32) -> SheetMap {
    SheetMap {
        students: HashMap::from([(student.to_string(), row)]),
        problems: HashMap::from([(problem_slug.to_string(), col)]),
        solved: HashMap::new(),
    }
}
