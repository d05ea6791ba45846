#![allow(dead_code)]

// Counting stand-in for a codec engine, shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use piccompress::{CodecEngine, EngineParameters, OperationResult, SupportedFileType};

/// What the fake does when invoked.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Write `n` bytes of `0x5A` if they fit, else report success with 0.
    Write(usize),
    /// Report success with this raw code and write nothing.
    Code(u64),
    /// Report failure with this message.
    Fail(&'static str),
}

#[derive(Debug)]
pub struct FakeEngine {
    pub behaviour: Behaviour,
    pub compress_calls: AtomicUsize,
    pub jpeg_calls: AtomicUsize,
    pub png_calls: AtomicUsize,
    pub file_calls: AtomicUsize,
}

impl FakeEngine {
    pub fn new(behaviour: Behaviour) -> Self {
        FakeEngine {
            behaviour,
            compress_calls: AtomicUsize::new(0),
            jpeg_calls: AtomicUsize::new(0),
            png_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
        }
    }

    /// (compress, convert-to-JPEG, convert-to-PNG, path-based)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.compress_calls.load(Ordering::SeqCst),
            self.jpeg_calls.load(Ordering::SeqCst),
            self.png_calls.load(Ordering::SeqCst),
            self.file_calls.load(Ordering::SeqCst),
        )
    }

    pub fn total_calls(&self) -> usize {
        let (a, b, c, d) = self.counts();
        a + b + c + d
    }

    fn run(&self, output: &mut [u8]) -> OperationResult {
        match &self.behaviour {
            Behaviour::Write(n) if *n <= output.len() => {
                output[..*n].fill(0x5A);
                OperationResult::ok(*n as u64)
            }
            Behaviour::Write(_) => OperationResult::ok(0),
            Behaviour::Code(code) => OperationResult::ok(*code),
            Behaviour::Fail(msg) => OperationResult::failed(*msg),
        }
    }

    fn count_convert(&self, file_type: SupportedFileType) {
        match file_type {
            SupportedFileType::Jpeg => self.jpeg_calls.fetch_add(1, Ordering::SeqCst),
            SupportedFileType::Png => self.png_calls.fetch_add(1, Ordering::SeqCst),
            other => panic!("unexpected conversion target {other:?}"),
        };
    }
}

impl CodecEngine for FakeEngine {
    fn compress_into(&self, _input: &[u8], output: &mut [u8], _params: &EngineParameters) -> OperationResult {
        self.compress_calls.fetch_add(1, Ordering::SeqCst);
        self.run(output)
    }

    fn convert_into(
        &self,
        _input: &[u8],
        output: &mut [u8],
        file_type: SupportedFileType,
        _params: &EngineParameters,
    ) -> OperationResult {
        self.count_convert(file_type);
        self.run(output)
    }

    fn convert_file_into(
        &self,
        _path: &[u8],
        output: &mut [u8],
        _file_type: SupportedFileType,
        _params: &EngineParameters,
    ) -> OperationResult {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        self.run(output)
    }
}
