#![no_main]

use libfuzzer_sys::fuzz_target;
use rebatch_core::{generate_path, NumberSeed, PathParts, RenameConfig};
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let (head, rest) = data.split_at(2);
    let input = String::from_utf8_lossy(rest);
    let mut lines = input.lines();
    let name: String = lines.next().unwrap_or_default().chars().take(200).collect();
    let text: String = lines.next().unwrap_or_default().chars().take(50).collect();

    let parts = PathParts::split(&name);
    assert_eq!(parts.join(), name);

    let position = usize::from(head[0]);
    let length = usize::from(head[1]);
    let configs = [
        RenameConfig::InsertChar {
            position,
            text: text.clone(),
        },
        RenameConfig::DeleteChar {
            start: position,
            length,
        },
        RenameConfig::PatternReplace {
            pattern: text.clone(),
            replacement: "_".to_string(),
            use_regex: head[0] % 2 == 0,
        },
        RenameConfig::ExtensionChange { new_extension: text },
    ];

    for config in &configs {
        if let Ok(target) = generate_path(Path::new(&name), config, NumberSeed::default()) {
            // The directory part never changes.
            let target = target.to_string_lossy().into_owned();
            assert!(target.starts_with(parts.dir));
        }
    }
});
