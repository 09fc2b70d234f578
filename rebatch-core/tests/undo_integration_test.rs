use rebatch_core::{
    collect_files, log_operation, rename_operation, undo_operation, BatchOptions, CaseMode,
    ExecuteOptions, RenameConfig, RenameOptions, RetryPolicy, WalkOptions,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn options() -> RenameOptions {
    RenameOptions {
        execute: ExecuteOptions {
            workers: 2,
            retry: RetryPolicy::none(),
            ..ExecuteOptions::default()
        },
        audit_log: true,
    }
}

fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_file())
        .map(|e| {
            let content = fs::read_to_string(e.path()).unwrap();
            (e.file_name().to_string_lossy().into_owned(), content)
        })
        .collect();
    entries.sort();
    entries
}

#[test]
fn test_two_batches_then_undo_restores_everything() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let photos = root.join("photos");
    fs::create_dir(&photos).unwrap();
    for name in ["beach.jpg", "city.jpg", "notes.txt"] {
        fs::write(photos.join(name), name).unwrap();
    }
    let before = snapshot(&photos);

    let walk = WalkOptions {
        formats: vec!["JPG".to_string()],
        recursive: false,
    };
    let files = collect_files(&photos, &walk).unwrap();
    let numbering = RenameConfig::SequentialBatch(BatchOptions {
        prefix_digits: 2,
        prefix_text: "-".to_string(),
        ..BatchOptions::default()
    });
    rename_operation(&files, &numbering, &options(), Some(root), |_, _| {}).unwrap();
    assert_eq!(
        snapshot(&photos).iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        vec!["00-beach.jpg", "01-city.jpg", "notes.txt"]
    );

    let files = collect_files(&photos, &WalkOptions::default()).unwrap();
    let upper = RenameConfig::CaseTransform {
        mode: CaseMode::Upper,
    };
    rename_operation(&files, &upper, &options(), Some(root), |_, _| {}).unwrap();

    let log = log_operation(None, Some(root)).unwrap();
    assert_eq!(log.records.len(), 5);

    let report = undo_operation(&RetryPolicy::none(), None, Some(root)).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.restored.len(), 5);
    assert_eq!(snapshot(&photos), before);

    let audit = fs::read_to_string(root.join(".rebatch").join("audit.log")).unwrap();
    assert!(audit.is_empty());
}

#[test]
fn test_undo_after_manual_delete_keeps_pending_record() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for name in ["a.txt", "b.txt"] {
        fs::write(root.join(name), name).unwrap();
    }
    let files = vec![root.join("a.txt"), root.join("b.txt")];
    let config = RenameConfig::ExtensionChange {
        new_extension: "md".to_string(),
    };
    rename_operation(&files, &config, &options(), Some(root), |_, _| {}).unwrap();

    fs::remove_file(root.join("a.md")).unwrap();

    let report = undo_operation(&RetryPolicy::none(), None, Some(root)).unwrap();
    assert_eq!(report.restored.len(), 1);
    assert_eq!(report.pending.len(), 1);
    assert!(root.join("b.txt").exists());

    let log = log_operation(None, Some(root)).unwrap();
    assert_eq!(log.records.len(), 1);
    assert_eq!(log.records[0].new, root.join("a.md"));
}
