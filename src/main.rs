//! Binary entry point for the `piccompress` command-line tool.
//!
//! Parses arguments, installs logging, expands the inputs into jobs, runs
//! them on the worker pool and prints one line per file. Exits with 0 when
//! every file succeeded, 1 otherwise.

use std::process::ExitCode;
use std::thread;

use anyhow::Context;
use clap::Parser;

use piccompress::batch::{collect_inputs, compress_files, plan_jobs, Progress};
use piccompress::cli::args::Cli;
use piccompress::cli::constants::{set_display_level, AUTHOR, COMPRESSOR_NAME};
use piccompress::cli::logging::init_logging;
use piccompress::{displaylevel, version_string};

fn run(cli: Cli) -> anyhow::Result<bool> {
    let level = cli.display_level();
    set_display_level(level);
    init_logging(level)?;
    displaylevel!(
        4,
        "*** {} v{} {}-bit, by {} ***\n",
        COMPRESSOR_NAME,
        version_string(),
        usize::BITS,
        AUTHOR
    );

    let options = cli.batch_options();
    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let inputs = collect_inputs(&cli.inputs, cli.recursive)?;
    let jobs = plan_jobs(inputs, cli.output_dir.as_deref(), options.request.target);
    if jobs.is_empty() {
        displaylevel!(1, "no input images found\n");
        return Ok(false);
    }

    let (tx, rx) = crossbeam_channel::unbounded::<Progress>();
    let watcher = thread::spawn(move || {
        for p in rx {
            displaylevel!(3, "\r[{}/{}]", p.done, p.total);
        }
        displaylevel!(3, "\n");
    });
    let reports = compress_files(&jobs, &options, Some(&tx));
    drop(tx);
    let _ = watcher.join();
    let reports = reports?;

    let mut all_ok = true;
    for report in &reports {
        match &report.outcome {
            Ok(n) => displaylevel!(
                2,
                "{} -> {} : {} bytes\n",
                report.input.display(),
                report.output.display(),
                n
            ),
            Err(e) => {
                all_ok = false;
                displaylevel!(1, "{} : {}\n", report.input.display(), e);
            }
        }
    }
    Ok(all_ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            displaylevel!(1, "{}: {:#}\n", COMPRESSOR_NAME, e);
            ExitCode::from(1)
        }
    }
}
