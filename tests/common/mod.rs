//! Common test utilities for file-factory integration tests

use file_factory::{Config, Event, FileFactory};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Build an in-memory ZIP archive from `(name, content)` pairs
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Factory with the default services, rooted in a fresh temp dir
///
/// The temp dir must be kept alive for the duration of the test.
pub async fn create_test_factory() -> (FileFactory, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.root.path = Some(temp_dir.path().join("root"));

    let factory = FileFactory::new(config).await.unwrap();
    (factory, temp_dir)
}

/// Drain every event that is already queued
pub fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// List the files below `dir`, relative to it, sorted
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let relative = path.strip_prefix(base).unwrap();
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}
