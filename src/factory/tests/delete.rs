use super::*;

#[tokio::test]
async fn test_delete_file() {
    let h = harness();
    let path = h.path("docs/report.pdf");
    h.fs.insert(&path, Node::File);

    let removed = h
        .factory
        .delete_file(&PathSpec::new("/docs/", "report.pdf"), false)
        .await
        .unwrap();

    assert!(removed.success);
    assert_eq!(removed.path, path);
    assert_eq!(removed.kind, EntryKind::File);
    assert!(!h.fs.contains(&path));
}

#[tokio::test]
async fn test_delete_directory_is_recursive() {
    let h = harness();
    h.fs.insert(h.path("cache"), Node::Dir);
    h.fs.insert(h.path("cache/a.bin"), Node::File);
    h.fs.insert(h.path("cache/nested/b.bin"), Node::File);
    h.fs.insert(h.path("keep.txt"), Node::File);
    let mut events = h.factory.subscribe();

    let removed = h
        .factory
        .delete_file(&PathSpec::new("", "cache"), true)
        .await
        .unwrap();

    assert_eq!(removed.kind, EntryKind::Directory);
    assert_eq!(h.fs.removed(), vec![h.path("cache")]);
    assert!(!h.fs.contains(&h.path("cache/nested/b.bin")));
    assert!(h.fs.contains(&h.path("keep.txt")));
    assert_eq!(
        events.try_recv().unwrap(),
        Event::Removed {
            path: h.path("cache"),
            kind: EntryKind::Directory
        }
    );
}

#[tokio::test]
async fn test_delete_missing_entry_is_code_2() {
    let h = harness();

    let err = h
        .factory
        .delete_file(&PathSpec::new("/docs/", "missing.pdf"), false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::NotFound));
    assert!(h.fs.removed().is_empty());
}

#[tokio::test]
async fn test_delete_illegal_name() {
    let h = harness();

    let err = h
        .factory
        .delete_file(&PathSpec::new("", "/etc/passwd"), false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::IllegalName));
    assert_eq!(h.fs.resolve_calls(), 0);
}

#[tokio::test]
async fn test_delete_on_local_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("cache");
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(dir.join("nested").join("b.bin"), b"data").unwrap();

    let factory = FileFactory::builder(Config::default())
        .root(temp_dir.path())
        .build()
        .unwrap();
    factory
        .delete_file(&PathSpec::new("/", "cache"), false)
        .await
        .unwrap();

    assert!(!dir.exists());
}
