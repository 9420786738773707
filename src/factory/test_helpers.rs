//! Shared test helpers: scripted in-memory services and a factory wired to them.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::factory::FileFactory;
use crate::platform::{
    ConfirmDialog, ExtractEvent, ExtractHandle, Extractor, FileOpener, FileSystem, ResolvedEntry,
    SpaceOracle, TransferEvent, TransferExecutor, TransferHandle,
};
use crate::types::Progress;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Root used by every test factory; nothing is created on disk
pub(crate) const ROOT: &str = "/data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node {
    File,
    Dir,
    /// Neither a file nor a directory (socket, device, ...)
    Other,
}

/// In-memory file system
#[derive(Default)]
pub(crate) struct MemoryFileSystem {
    nodes: Mutex<HashMap<PathBuf, Node>>,
    resolve_calls: AtomicUsize,
    removed: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub(crate) fn insert(&self, path: impl Into<PathBuf>, node: Node) {
        self.nodes.lock().unwrap().insert(path.into(), node);
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn resolve(&self, path: &Path) -> Result<Option<ResolvedEntry>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .get(path)
            .map(|node| ResolvedEntry {
                is_file: *node == Node::File,
                is_dir: *node == Node::Dir,
            }))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        self.nodes.lock().unwrap().remove(path);
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.nodes
            .lock()
            .unwrap()
            .retain(|candidate, _| !candidate.starts_with(path));
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Space oracle reporting a fixed amount of free kilobytes
pub(crate) struct FixedSpace {
    kb: u64,
    calls: AtomicUsize,
}

impl FixedSpace {
    pub(crate) fn new(kb: u64) -> Self {
        Self {
            kb,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpaceOracle for FixedSpace {
    async fn free_space_kb(&self, _path: &Path) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.kb)
    }
}

/// Arguments of one `TransferExecutor::start` call
#[derive(Debug, Clone)]
pub(crate) struct StartedTransfer {
    pub(crate) url: String,
    pub(crate) dest: PathBuf,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) cancel: CancellationToken,
}

/// Transfer executor replaying one script of events per started transfer
///
/// Once the scripts run out every transfer succeeds immediately.
#[derive(Default)]
pub(crate) struct ScriptedTransfer {
    scripts: Mutex<VecDeque<Vec<TransferEvent>>>,
    started: Mutex<Vec<StartedTransfer>>,
}

impl ScriptedTransfer {
    pub(crate) fn push_script(&self, events: Vec<TransferEvent>) {
        self.scripts.lock().unwrap().push_back(events);
    }

    pub(crate) fn started(&self) -> Vec<StartedTransfer> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferExecutor for ScriptedTransfer {
    async fn start(
        &self,
        url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
    ) -> Result<TransferHandle> {
        let events = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![TransferEvent::Finished(Ok(()))]);

        let cancel = CancellationToken::new();
        self.started.lock().unwrap().push(StartedTransfer {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            headers: headers.clone(),
            cancel: cancel.clone(),
        });

        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        Ok(TransferHandle::new(rx, cancel))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Extractor replaying one script of events per started extraction
#[derive(Default)]
pub(crate) struct ScriptedExtractor {
    scripts: Mutex<VecDeque<Vec<ExtractEvent>>>,
    started: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl ScriptedExtractor {
    pub(crate) fn push_script(&self, events: Vec<ExtractEvent>) {
        self.scripts.lock().unwrap().push_back(events);
    }

    pub(crate) fn started(&self) -> Vec<(PathBuf, PathBuf)> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn start(&self, archive: &Path, dest: &Path) -> Result<ExtractHandle> {
        let events = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![ExtractEvent::Finished(Ok(()))]);
        self.started
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), dest.to_path_buf()));

        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        Ok(ExtractHandle::new(rx))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Dialog that always answers with the same button
pub(crate) struct FixedDialog {
    answer: u32,
    asked: Mutex<Vec<(String, String, [String; 2])>>,
}

impl FixedDialog {
    pub(crate) fn new(answer: u32) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn asked(&self) -> Vec<(String, String, [String; 2])> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmDialog for FixedDialog {
    async fn confirm(&self, title: &str, message: &str, buttons: [&str; 2]) -> u32 {
        self.asked.lock().unwrap().push((
            title.to_string(),
            message.to_string(),
            buttons.map(str::to_string),
        ));
        self.answer
    }
}

/// Opener recording every opened path
#[derive(Default)]
pub(crate) struct RecordingOpener {
    opened: Mutex<Vec<(PathBuf, String)>>,
    fail_with: Option<String>,
}

impl RecordingOpener {
    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub(crate) fn opened(&self) -> Vec<(PathBuf, String)> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileOpener for RecordingOpener {
    async fn open(&self, path: &Path, mime_type: &str) -> Result<()> {
        self.opened
            .lock()
            .unwrap()
            .push((path.to_path_buf(), mime_type.to_string()));
        match &self.fail_with {
            Some(reason) => Err(Error::Open {
                path: path.to_path_buf(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A factory wired to scripted services, with handles to inspect them
pub(crate) struct Harness {
    pub(crate) factory: FileFactory,
    pub(crate) fs: Arc<MemoryFileSystem>,
    pub(crate) space: Arc<FixedSpace>,
    pub(crate) transfer: Arc<ScriptedTransfer>,
    pub(crate) extractor: Arc<ScriptedExtractor>,
    pub(crate) dialog: Arc<FixedDialog>,
    pub(crate) opener: Arc<RecordingOpener>,
}

impl Harness {
    /// Full path below the test root
    pub(crate) fn path(&self, relative: &str) -> PathBuf {
        Path::new(ROOT).join(relative)
    }
}

/// Harness with 1 GB free and a dialog answering the first button
pub(crate) fn harness() -> Harness {
    harness_with(Config::default(), 1024 * 1024, 1)
}

/// Harness with the given free kilobytes
pub(crate) fn harness_with_space(free_kb: u64) -> Harness {
    harness_with(Config::default(), free_kb, 1)
}

/// Harness with full control over config, free space and dialog answer
pub(crate) fn harness_with(config: Config, free_kb: u64, dialog_answer: u32) -> Harness {
    let fs = Arc::new(MemoryFileSystem::default());
    let space = Arc::new(FixedSpace::new(free_kb));
    let transfer = Arc::new(ScriptedTransfer::default());
    let extractor = Arc::new(ScriptedExtractor::default());
    let dialog = Arc::new(FixedDialog::new(dialog_answer));
    let opener = Arc::new(RecordingOpener::default());

    let factory = FileFactory::builder(config)
        .root(ROOT)
        .file_system(fs.clone())
        .space_oracle(space.clone())
        .transfer(transfer.clone())
        .extractor(extractor.clone())
        .dialog(dialog.clone())
        .opener(opener.clone())
        .build()
        .unwrap();

    Harness {
        factory,
        fs,
        space,
        transfer,
        extractor,
        dialog,
        opener,
    }
}

/// Factory with only the mandatory services
pub(crate) fn bare_factory() -> (FileFactory, Arc<MemoryFileSystem>) {
    let fs = Arc::new(MemoryFileSystem::default());
    let factory = FileFactory::builder(Config::default())
        .root(ROOT)
        .file_system(fs.clone())
        .space_oracle(Arc::new(FixedSpace::new(1024)))
        .build()
        .unwrap();
    (factory, fs)
}

pub(crate) fn progress(loaded: u64, total: u64) -> TransferEvent {
    TransferEvent::Progress(Progress::new(loaded, total))
}

pub(crate) fn extract_progress(loaded: u64, total: u64) -> ExtractEvent {
    ExtractEvent::Progress(Progress::new(loaded, total))
}
