//! Many-file compression on a worker pool.
//!
//! Each rayon worker owns one [`Compressor`], created on first use over an
//! anonymous scratch file of `max_output` bytes and reused for every file the
//! worker picks up. Results come back in job order; a failing file does not
//! stop the batch.

use std::collections::HashSet;
use std::fs::{self, File};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::Sender;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::{resolve_workers, OneShotDefaults, MAP_FILE_SIZE, WORKERS_DEFAULT};
use crate::engine::CodecEngine;
use crate::error::{CompressError, Result};
use crate::facade::Compressor;
use crate::params::{CompressionRequest, TargetFormat};

#[cfg(feature = "image-engine")]
use crate::engine::ImageEngine;

/// Extensions picked up when walking a directory. Files named explicitly are
/// always taken.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "png"];

// ── Jobs ─────────────────────────────────────────────────────────────────────

/// One input file and where its result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub request: CompressionRequest,
    /// Worker threads; `0` means one per logical CPU.
    pub workers: usize,
    /// Output capacity of each worker's compressor.
    pub max_output: u64,
    /// When set, files go through the path-based `Compressor::compress`
    /// with these defaults and `request` is ignored.
    pub one_shot: Option<OneShotDefaults>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            request: CompressionRequest::default(),
            workers: WORKERS_DEFAULT,
            max_output: MAP_FILE_SIZE,
            one_shot: None,
        }
    }
}

/// Sent after every finished file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

/// Outcome of one job.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Result<u32>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ── Input discovery ──────────────────────────────────────────────────────────

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Expand `paths` into a list of files.
///
/// Directories contribute their image files, sorted by name; with
/// `recursive` their subdirectories are walked too.
pub fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let meta = fs::metadata(path).map_err(|e| CompressError::io("Failed to Open Input", e))?;
        if !meta.is_dir() {
            files.push(path.clone());
            continue;
        }
        let depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(path).min_depth(1).max_depth(depth).sort_by_file_name() {
            let entry = entry.map_err(|e| CompressError::io("Failed to Read Directory", e.into()))?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

/// Where the result for `input` would go on its own: conversions take the
/// target's extension, `Optimize` keeps the input's.
///
/// A name equal to the input gets a `_compressed` suffix. [`plan_jobs`]
/// additionally steers clear of the other inputs and of earlier outputs.
pub fn output_path(input: &Path, out_dir: Option<&Path>, target: TargetFormat) -> PathBuf {
    let candidate = OutputName::new(input, out_dir, target);
    let plain = candidate.with_suffix("");
    if plain == input {
        candidate.with_suffix("_compressed")
    } else {
        plain
    }
}

/// Pair every input with an output path that is neither an input nor the
/// output of another job.
///
/// Collisions get `_compressed`, then `_compressed_2`, `_compressed_3`, ...
pub fn plan_jobs(inputs: Vec<PathBuf>, out_dir: Option<&Path>, target: TargetFormat) -> Vec<BatchJob> {
    let mut taken: HashSet<PathBuf> = inputs.iter().cloned().collect();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = OutputName::new(&input, out_dir, target);
        let mut output = name.with_suffix("");
        let mut attempt = 1;
        while taken.contains(&output) {
            let suffix = match attempt {
                1 => "_compressed".to_string(),
                n => format!("_compressed_{}", n),
            };
            output = name.with_suffix(&suffix);
            attempt += 1;
        }
        if output != name.with_suffix("") {
            tracing::debug!(input = %input.display(), output = %output.display(), "renamed colliding output");
        }
        taken.insert(output.clone());
        jobs.push(BatchJob { input, output });
    }
    jobs
}

struct OutputName {
    dir: PathBuf,
    stem: String,
    ext: String,
}

impl OutputName {
    fn new(input: &Path, out_dir: Option<&Path>, target: TargetFormat) -> Self {
        let stem = input.file_stem().unwrap_or(input.as_os_str()).to_string_lossy().into_owned();
        let ext = match target.file_type().and_then(|t| t.extension()) {
            Some(ext) => ext.to_string(),
            None => input
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        OutputName { dir, stem, ext }
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        if self.ext.is_empty() {
            self.dir.join(format!("{}{}", self.stem, suffix))
        } else {
            self.dir.join(format!("{}{}.{}", self.stem, suffix, self.ext))
        }
    }
}

// ── Execution ────────────────────────────────────────────────────────────────

/// Compress one file through `compressor` and write the result to `output`.
pub fn compress_file<E: CodecEngine>(
    compressor: &mut Compressor<E>,
    input: &Path,
    output: &Path,
    request: &CompressionRequest,
) -> Result<u32> {
    let file = File::open(input).map_err(|e| CompressError::io("Failed to Open Input", e))?;
    let len = file
        .metadata()
        .map_err(|e| CompressError::io("Failed to Open Input", e))?
        .len();
    let written = compressor.compress_from(Some(file.as_fd()), len, request)?;
    fs::write(output, compressor.output(written)).map_err(|e| CompressError::io("Failed to Write Output", e))?;
    Ok(written)
}

/// Compress one file through the path-based entrypoint of `compressor`.
pub fn compress_path<E: CodecEngine>(compressor: &mut Compressor<E>, input: &Path, output: &Path) -> Result<u32> {
    let written = compressor.compress(input)?;
    fs::write(output, compressor.output(written)).map_err(|e| CompressError::io("Failed to Write Output", e))?;
    Ok(written)
}

/// A compressor over a fresh anonymous file of `max_output` bytes.
pub fn scratch_compressor<E: CodecEngine>(engine: E, max_output: u64) -> Result<Compressor<E>> {
    let scratch = tempfile::tempfile().map_err(|e| CompressError::io("Failed to Create Output Mapping", e))?;
    scratch
        .set_len(max_output)
        .map_err(|e| CompressError::io("Failed to Create Output Mapping", e))?;
    Compressor::with_engine(engine, Some(scratch.as_fd()), max_output)
}

/// Run `jobs` with clones of `engine`, one compressor per worker.
pub fn compress_files_with<E: CodecEngine + Clone>(
    engine: E,
    jobs: &[BatchJob],
    options: &BatchOptions,
    progress: Option<&Sender<Progress>>,
) -> Result<Vec<FileReport>> {
    let workers = resolve_workers(options.workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("piccompress-worker-{}", i))
        .build()
        .map_err(|e| CompressError::ResourceError {
            operation: "Failed to Start Workers",
            message: e.to_string(),
        })?;

    let total = jobs.len();
    let done = AtomicUsize::new(0);
    tracing::info!(total, workers, "starting batch");

    let reports = pool.install(|| {
        jobs.par_iter()
            .map_init(
                || None::<Compressor<E>>,
                |slot, job| {
                    let outcome = run_job(slot, &engine, options, job);
                    match &outcome {
                        Ok(n) => tracing::info!(input = %job.input.display(), bytes = n, "compressed"),
                        Err(e) => tracing::warn!(input = %job.input.display(), error = %e, "failed"),
                    }
                    let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(tx) = progress {
                        // A dropped receiver only means nobody is watching.
                        let _ = tx.send(Progress { done: finished, total });
                    }
                    FileReport {
                        input: job.input.clone(),
                        output: job.output.clone(),
                        outcome,
                    }
                },
            )
            .collect::<Vec<_>>()
    });
    Ok(reports)
}

/// [`compress_files_with`] on the default engine.
#[cfg(feature = "image-engine")]
pub fn compress_files(
    jobs: &[BatchJob],
    options: &BatchOptions,
    progress: Option<&Sender<Progress>>,
) -> Result<Vec<FileReport>> {
    compress_files_with(ImageEngine::new(), jobs, options, progress)
}

fn run_job<E: CodecEngine + Clone>(
    slot: &mut Option<Compressor<E>>,
    engine: &E,
    options: &BatchOptions,
    job: &BatchJob,
) -> Result<u32> {
    let mut compressor = match slot.take() {
        Some(c) => c,
        None => {
            let c = scratch_compressor(engine.clone(), options.max_output)?;
            match options.one_shot {
                Some(defaults) => c.with_defaults(defaults),
                None => c,
            }
        }
    };
    let outcome = match options.one_shot {
        Some(_) => compress_path(&mut compressor, &job.input, &job.output),
        None => compress_file(&mut compressor, &job.input, &job.output, &options.request),
    };
    *slot = Some(compressor);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_takes_target_extension() {
        let p = output_path(Path::new("/in/photo.PNG"), Some(Path::new("/out")), TargetFormat::ConvertA);
        assert_eq!(p, PathBuf::from("/out/photo.jpg"));
        let p = output_path(Path::new("/in/photo.jpg"), Some(Path::new("/out")), TargetFormat::ConvertB);
        assert_eq!(p, PathBuf::from("/out/photo.png"));
    }

    #[test]
    fn optimize_keeps_extension() {
        let p = output_path(Path::new("/in/photo.jpeg"), Some(Path::new("/out")), TargetFormat::Optimize);
        assert_eq!(p, PathBuf::from("/out/photo.jpeg"));
    }

    #[test]
    fn never_overwrites_the_input() {
        let p = output_path(Path::new("/in/photo.jpg"), None, TargetFormat::Optimize);
        assert_eq!(p, PathBuf::from("/in/photo_compressed.jpg"));
        let p = output_path(Path::new("/in/photo.png"), None, TargetFormat::ConvertA);
        assert_eq!(p, PathBuf::from("/in/photo.jpg"));
    }

    #[test]
    fn plan_keeps_sibling_inputs_intact() {
        let inputs = vec![PathBuf::from("/in/a.jpg"), PathBuf::from("/in/a.png")];
        let jobs = plan_jobs(inputs.clone(), None, TargetFormat::ConvertA);
        assert_eq!(jobs[0].output, PathBuf::from("/in/a_compressed.jpg"));
        assert_eq!(jobs[1].output, PathBuf::from("/in/a_compressed_2.jpg"));
        for job in &jobs {
            assert!(!inputs.contains(&job.output), "{} overwrites an input", job.output.display());
        }
    }

    #[test]
    fn plan_gives_every_job_its_own_output() {
        let inputs = vec![
            PathBuf::from("/a/photo.png"),
            PathBuf::from("/b/photo.jpeg"),
            PathBuf::from("/b/photo_compressed.jpg"),
        ];
        let jobs = plan_jobs(inputs.clone(), Some(Path::new("/b")), TargetFormat::ConvertA);
        let outputs: Vec<_> = jobs.iter().map(|j| j.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/b/photo.jpg"),
                PathBuf::from("/b/photo_compressed_2.jpg"),
                PathBuf::from("/b/photo_compressed_compressed.jpg"),
            ]
        );

        let unique: HashSet<_> = outputs.iter().collect();
        assert_eq!(unique.len(), outputs.len());
        assert!(outputs.iter().all(|o| !inputs.contains(o)));
    }

    #[test]
    fn image_extension_filter() {
        assert!(is_image_path(Path::new("a.JPG")));
        assert!(is_image_path(Path::new("dir/b.png")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn collect_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        for name in ["b.png", "a.jpg", "skip.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(sub.join("c.png"), b"x").unwrap();

        let flat = collect_inputs(&[dir.path().to_path_buf()], false).unwrap();
        assert_eq!(flat, vec![dir.path().join("a.jpg"), dir.path().join("b.png")]);

        let deep = collect_inputs(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&sub.join("c.png")));
    }

    #[test]
    fn collect_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_inputs(&[dir.path().join("missing.png")], false).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ResourceError);
    }

    #[test]
    fn explicit_files_bypass_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scan.bin");
        fs::write(&file, b"x").unwrap();
        assert_eq!(collect_inputs(&[file.clone()], false).unwrap(), vec![file]);
    }
}
