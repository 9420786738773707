use super::*;

#[test]
fn test_full_harness_has_every_capability() {
    let h = harness();

    assert_eq!(
        h.factory.capabilities(),
        Capabilities {
            transfer: true,
            extraction: true,
            dialog: true,
            opener: true,
        }
    );
    assert!(h.factory.missing_capabilities().is_empty());
}

#[test]
fn test_bare_factory_reports_missing_capabilities() {
    let (factory, _fs) = bare_factory();

    assert_eq!(
        factory.missing_capabilities(),
        vec![
            Capability::Transfer,
            Capability::Extraction,
            Capability::Dialog,
            Capability::Opener,
        ]
    );
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut config = Config::default();
    config.event_buffer = 0;

    let err = FileFactory::builder(config).root(ROOT).build().unwrap_err();

    match err {
        Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("event_buffer")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn test_root_comes_from_config_when_not_overridden() {
    let mut config = Config::default();
    config.root.path = Some(PathBuf::from("/srv/files"));

    let factory = FileFactory::builder(config).build().unwrap();

    assert_eq!(factory.root(), Path::new("/srv/files"));
    assert_eq!(
        factory.full_path(&PathSpec::new("/docs/", "report.pdf")),
        Path::new("/srv/files").join("docs").join("report.pdf")
    );
}

#[tokio::test]
async fn test_new_creates_root_and_wires_default_services() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.root.path = Some(temp_dir.path().join("files"));

    let factory = FileFactory::new(config).await.unwrap();

    assert!(temp_dir.path().join("files").is_dir());
    let capabilities = factory.capabilities();
    assert!(capabilities.transfer);
    assert!(capabilities.extraction);
    assert!(!capabilities.dialog);
}
