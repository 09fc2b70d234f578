use proptest::prelude::*;
use rebatch_core::{
    generate_path, generate_unique_path, CaseMode, NumberSeed, PathParts, RenameConfig,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

proptest! {
    #[test]
    fn split_then_join_reproduces_path(path in "[a-zA-Z0-9_ ./-]{0,40}") {
        let parts = PathParts::split(&path);
        prop_assert_eq!(parts.join(), path.clone());
        prop_assert!(!parts.stem.contains('/'));
        prop_assert!(parts.ext.is_empty() || parts.ext.starts_with('.'));
    }

    #[test]
    fn unknown_case_mode_returns_input(stem in "[a-zA-Z0-9_ -]{1,20}", mode in "[a-z]{3,8}") {
        prop_assume!(!["upper", "lower", "title", "camel"].contains(&mode.as_str()));
        let file = format!("dir/{}.txt", stem);
        let config = RenameConfig::CaseTransform { mode: mode.parse().unwrap() };
        let target = generate_path(Path::new(&file), &config, NumberSeed::default()).unwrap();
        prop_assert_eq!(target, Path::new(&file).to_path_buf());
    }

    #[test]
    fn case_transforms_keep_directory_and_extension(stem in "[a-z_ -]{1,20}") {
        let file = format!("some/dir/{}.Ext", stem);
        for mode in [CaseMode::Upper, CaseMode::Lower, CaseMode::Title, CaseMode::Camel] {
            let config = RenameConfig::CaseTransform { mode };
            let target = generate_path(Path::new(&file), &config, NumberSeed::default()).unwrap();
            let target = target.to_string_lossy().into_owned();
            prop_assert!(target.starts_with("some/dir/"));
            prop_assert!(target.ends_with(".Ext"));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn unique_path_is_never_taken(taken in 0usize..6) {
        let temp_dir = TempDir::new().unwrap();
        let desired = temp_dir.path().join("shot.png");
        if taken > 0 {
            fs::write(&desired, "x").unwrap();
        }
        for n in 1..taken {
            fs::write(temp_dir.path().join(format!("shot_{}.png", n)), "x").unwrap();
        }

        let unique = generate_unique_path(&desired);
        prop_assert!(!unique.exists());
        if taken == 0 {
            prop_assert_eq!(unique, desired);
        } else {
            prop_assert_eq!(unique, temp_dir.path().join(format!("shot_{}.png", taken)));
        }
    }
}
