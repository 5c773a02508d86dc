//! The file logger installs once per process, so it gets its own test binary.

use std::sync::Arc;

use cssindex::testing::MemoryFiles;
use cssindex::{CssRuleService, init_logger};

#[tokio::test]
async fn test_file_logger_records_sync_activity() {
    let path = std::env::temp_dir().join(format!("cssindex-log-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    init_logger(&path).unwrap();
    assert!(init_logger(&path).is_err());

    let files = Arc::new(MemoryFiles::new());
    files.set("ok.css", ".ok { }");
    files.set("bad.css", ".bad { }");
    files.fail_reads("bad.css");

    let mut service = CssRuleService::new(files.clone(), files.clone());
    service.sync_files(&files.entries()).await;

    let log = std::fs::read_to_string(&path).unwrap();
    assert!(log.contains("[WARN] cssindex::service: cannot read bad.css"), "{log}");
    assert!(log.contains("[DEBUG] cssindex::service: synced 2 files: 1 reparsed, 0 evicted, 1 failed"), "{log}");
    assert!(!log.contains("TRACE"));

    let _ = std::fs::remove_file(&path);
}
