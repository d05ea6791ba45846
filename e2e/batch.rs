//! End-to-end runs of the batch driver on the default engine.

#[path = "common.rs"]
mod common;

use std::fs;

use common::{jpeg_bytes, png_bytes, write_file};
use image::ImageFormat;
use piccompress::batch::{collect_inputs, compress_files, plan_jobs, BatchOptions, Progress};
use piccompress::{CompressionRequest, ErrorKind, OneShotDefaults, TargetFormat};

#[test]
fn converts_a_directory_in_parallel() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    for i in 0..6 {
        write_file(&src.path().join(format!("img{i}.png")), &png_bytes(48 + i, 32));
    }
    write_file(&src.path().join("notes.txt"), b"ignored");

    let inputs = collect_inputs(&[src.path().to_path_buf()], false).unwrap();
    assert_eq!(inputs.len(), 6);
    let jobs = plan_jobs(inputs, Some(dst.path()), TargetFormat::ConvertA);

    let options = BatchOptions {
        request: CompressionRequest::new(TargetFormat::ConvertA),
        workers: 3,
        max_output: 1 << 20,
        ..BatchOptions::default()
    };
    let (tx, rx) = crossbeam_channel::unbounded::<Progress>();
    let reports = compress_files(&jobs, &options, Some(&tx)).unwrap();
    drop(tx);

    assert_eq!(reports.len(), 6);
    for (report, job) in reports.iter().zip(&jobs) {
        assert_eq!(report.input, job.input);
        let n = *report.outcome.as_ref().unwrap();
        let bytes = fs::read(&report.output).unwrap();
        assert_eq!(bytes.len(), n as usize);
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(report.output.extension().unwrap(), "jpg");
    }

    let events: Vec<Progress> = rx.iter().collect();
    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|p| p.total == 6));
    assert_eq!(events.iter().map(|p| p.done).max(), Some(6));
}

#[test]
fn one_bad_file_does_not_stop_the_batch() {
    let src = tempfile::tempdir().unwrap();
    let good = src.path().join("good.jpg");
    let bad = src.path().join("bad.jpg");
    write_file(&good, &jpeg_bytes(40, 40));
    write_file(&bad, b"truncated");

    let jobs = plan_jobs(vec![bad.clone(), good.clone()], None, TargetFormat::ConvertB);
    let options = BatchOptions {
        request: CompressionRequest::new(TargetFormat::ConvertB),
        workers: 1,
        max_output: 1 << 20,
        ..BatchOptions::default()
    };
    let reports = compress_files(&jobs, &options, None).unwrap();
    assert_eq!(reports[0].outcome.as_ref().unwrap_err().kind(), ErrorKind::OperationFailure);
    assert!(reports[1].is_ok());
    assert_eq!(reports[1].output, src.path().join("good.png"));
    assert!(reports[1].output.exists());
    assert!(!src.path().join("bad.png").exists());
}

#[test]
fn same_stem_siblings_keep_their_originals() {
    let src = tempfile::tempdir().unwrap();
    let jpg = src.path().join("a.jpg");
    let original = jpeg_bytes(40, 40);
    write_file(&jpg, &original);
    write_file(&src.path().join("a.png"), &png_bytes(10, 10));

    let inputs = collect_inputs(&[src.path().to_path_buf()], false).unwrap();
    let jobs = plan_jobs(inputs, None, TargetFormat::ConvertA);
    let options = BatchOptions {
        request: CompressionRequest::new(TargetFormat::ConvertA),
        workers: 2,
        max_output: 1 << 20,
        ..BatchOptions::default()
    };
    let reports = compress_files(&jobs, &options, None).unwrap();
    assert!(reports.iter().all(|r| r.is_ok()));

    assert_eq!(fs::read(&jpg).unwrap(), original);
    for report in &reports {
        assert_ne!(report.output, jpg);
        assert!(report.output.exists());
    }
    let from_png = image::open(&reports[1].output).unwrap();
    assert_eq!((from_png.width(), from_png.height()), (10, 10));
}

#[test]
fn tiny_output_buffer_reports_exhaustion_per_file() {
    let src = tempfile::tempdir().unwrap();
    let input = src.path().join("big.png");
    write_file(&input, &png_bytes(300, 300));

    let jobs = plan_jobs(vec![input], None, TargetFormat::Optimize);
    let options = BatchOptions {
        request: CompressionRequest::new(TargetFormat::Optimize),
        workers: 1,
        max_output: 128,
        ..BatchOptions::default()
    };
    let reports = compress_files(&jobs, &options, None).unwrap();
    assert_eq!(reports[0].outcome.as_ref().unwrap_err().kind(), ErrorKind::ResourceExhaustion);
    assert_eq!(reports[0].output, src.path().join("big_compressed.png"));
}

#[test]
fn one_shot_mode_lets_the_engine_read_files() {
    let src = tempfile::tempdir().unwrap();
    let input = src.path().join("scan.png");
    write_file(&input, &png_bytes(3000, 40));

    let jobs = plan_jobs(vec![input], None, TargetFormat::ConvertA);
    let options = BatchOptions {
        workers: 1,
        max_output: 4 << 20,
        one_shot: Some(OneShotDefaults::default()),
        ..BatchOptions::default()
    };
    let reports = compress_files(&jobs, &options, None).unwrap();
    assert!(reports[0].is_ok(), "{:?}", reports[0].outcome);
    let decoded = image::load_from_memory(&fs::read(src.path().join("scan.jpg")).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1500, 20));
}
