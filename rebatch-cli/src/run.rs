use anyhow::Result;
use rebatch_core::operations::default_log_file;
use rebatch_core::{
    collect_files, preview_operation, rename_operation, retry_busy, CancelFlag, Config,
    EngineError, ExecuteOptions, RenameConfig, RenameOptions, RenameResult, WalkOptions,
};

use crate::cli::{BatchArgs, OutputFormat};
use crate::progress::create_progress_bar;
use crate::{absolute_path, print_result, resolve_output};

/// Walk, check and rename. Returns false when the batch did not fully succeed.
pub fn handle_batch(
    rename: &RenameConfig,
    args: &BatchArgs,
    config: &Config,
    cancel: CancelFlag,
    use_color: Option<bool>,
) -> Result<bool> {
    let output = resolve_output(args.output, config);
    let root = absolute_path(&args.dir)?;
    let walk = WalkOptions {
        formats: args.formats.clone(),
        recursive: args.recursive || config.defaults.recursive,
    };
    let files = collect_files(&root, &walk)?;

    if args.dry_run {
        let mut result = preview_operation(&files, rename)?;
        result.use_color = use_color;
        print_result(&result, output, args.quiet);
        return Ok(true);
    }

    let options = RenameOptions {
        execute: ExecuteOptions {
            workers: args.jobs.unwrap_or(config.defaults.workers),
            retry: config.retry.policy(),
            cancel,
            log_file: Some(default_log_file(None)),
        },
        audit_log: config.defaults.audit_log,
    };
    let hide_progress = args.quiet || output == OutputFormat::Json;

    let Some(mut result) = run_with_progress(&files, rename, &options, output, hide_progress)? else {
        return Ok(false);
    };

    let busy = result.report.busy_files();
    if args.retry_busy && !busy.is_empty() && !options.execute.cancel.is_cancelled() {
        if !hide_progress {
            eprintln!("Retrying {} busy file(s)...", busy.len());
        }
        let pb = create_progress_bar(busy.len() as u64, "retry", hide_progress);
        let retried = retry_busy(&result.report, rename, &options, None, |_, _| pb.inc(1));
        pb.finish_and_clear();

        match retried {
            Ok(retried) => merge_retry(&mut result, retried),
            Err(e) => match e.downcast_ref::<EngineError>() {
                Some(EngineError::Conflicts(report)) => {
                    eprintln!("Busy files were not retried:");
                    print_result(report, output, args.quiet);
                },
                _ => return Err(e),
            },
        }
    }

    if result.report.was_cancelled() && !hide_progress {
        eprintln!("Interrupted; files not started were left untouched.");
    }
    print_result(&result, output, args.quiet);
    Ok(!result.report.has_failures())
}

/// Run the batch behind a progress bar. `None` means the pre-flight check
/// found conflicts, which have already been printed.
fn run_with_progress(
    files: &[std::path::PathBuf],
    rename: &RenameConfig,
    options: &RenameOptions,
    output: OutputFormat,
    hide_progress: bool,
) -> Result<Option<RenameResult>> {
    let pb = create_progress_bar(files.len() as u64, rename.kind_name(), hide_progress);
    let result = rename_operation(files, rename, options, None, |path, outcome| {
        if outcome.is_failure() {
            tracing::debug!(path = %path.display(), outcome = %outcome.describe(), "file failed");
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    match result {
        Ok(result) => Ok(Some(result)),
        Err(e) => match e.downcast_ref::<EngineError>() {
            Some(EngineError::Conflicts(report)) => {
                // Shown even with --quiet.
                print_result(report, output, false);
                Ok(None)
            },
            _ => Err(e),
        },
    }
}

fn merge_retry(result: &mut RenameResult, retried: RenameResult) {
    for entry in retried.report.outcomes {
        if let Some(slot) = result
            .report
            .outcomes
            .iter_mut()
            .find(|o| o.path == entry.path)
        {
            slot.outcome = entry.outcome;
        }
    }
    result.journal_len = retried.journal_len;
}
