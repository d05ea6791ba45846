//! Target-format dispatch.
//!
//! | Target      | Engine entrypoint                   |
//! |-------------|-------------------------------------|
//! | `Optimize`  | `compress_into`                     |
//! | `ConvertA`  | `convert_into(.., Jpeg, ..)`        |
//! | `ConvertB`  | `convert_into(.., Png, ..)`         |
//!
//! Exactly one entrypoint runs per call. Raw selectors are validated by
//! [`dispatch_raw`] before the engine is touched.

use crate::engine::{CodecEngine, EngineParameters, OperationResult, SupportedFileType};
use crate::error::Result;
use crate::params::TargetFormat;

/// Invoke the engine entrypoint that produces `target`.
pub fn dispatch<E: CodecEngine + ?Sized>(
    engine: &E,
    input: &[u8],
    output: &mut [u8],
    params: &EngineParameters,
    target: TargetFormat,
) -> OperationResult {
    tracing::debug!(?target, input_len = input.len(), output_len = output.len(), "dispatching");
    let result = match target {
        TargetFormat::Optimize => engine.compress_into(input, output, params),
        TargetFormat::ConvertA => engine.convert_into(input, output, SupportedFileType::Jpeg, params),
        TargetFormat::ConvertB => engine.convert_into(input, output, SupportedFileType::Png, params),
    };
    tracing::debug!(success = result.success, code = result.code, "engine returned");
    result
}

/// [`dispatch`] with an unchecked selector. Unknown selectors fail with
/// `InvalidArgument` and leave `output` untouched.
pub fn dispatch_raw<E: CodecEngine + ?Sized>(
    engine: &E,
    input: &[u8],
    output: &mut [u8],
    params: &EngineParameters,
    target: i32,
) -> Result<OperationResult> {
    let target = TargetFormat::try_from(target)?;
    Ok(dispatch(engine, input, output, params, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Compress,
        Convert(SupportedFileType),
        ConvertFile(SupportedFileType),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call, output: &mut [u8]) -> OperationResult {
            self.calls.lock().unwrap().push(call);
            output[0] = 0xAB;
            OperationResult::ok(1)
        }
    }

    impl CodecEngine for Recorder {
        fn compress_into(&self, _: &[u8], output: &mut [u8], _: &EngineParameters) -> OperationResult {
            self.record(Call::Compress, output)
        }

        fn convert_into(
            &self,
            _: &[u8],
            output: &mut [u8],
            file_type: SupportedFileType,
            _: &EngineParameters,
        ) -> OperationResult {
            self.record(Call::Convert(file_type), output)
        }

        fn convert_file_into(
            &self,
            _: &[u8],
            output: &mut [u8],
            file_type: SupportedFileType,
            _: &EngineParameters,
        ) -> OperationResult {
            self.record(Call::ConvertFile(file_type), output)
        }
    }

    #[test]
    fn each_target_reaches_one_entrypoint() {
        let cases = [
            (TargetFormat::Optimize, Call::Compress),
            (TargetFormat::ConvertA, Call::Convert(SupportedFileType::Jpeg)),
            (TargetFormat::ConvertB, Call::Convert(SupportedFileType::Png)),
        ];
        for (target, expected) in cases {
            let engine = Recorder::default();
            let mut out = [0u8; 4];
            let res = dispatch(&engine, b"in", &mut out, &EngineParameters::default(), target);
            assert!(res.success);
            assert_eq!(engine.calls(), vec![expected]);
        }
    }

    #[test]
    fn unknown_selector_never_reaches_the_engine() {
        let engine = Recorder::default();
        for raw in [-1, 3, 7, i32::MAX] {
            let mut out = [0u8; 4];
            let err = dispatch_raw(&engine, b"in", &mut out, &EngineParameters::default(), raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(out, [0u8; 4]);
        }
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn raw_selector_matches_typed_dispatch() {
        let engine = Recorder::default();
        let mut out = [0u8; 2];
        dispatch_raw(&engine, b"in", &mut out, &EngineParameters::default(), 2).unwrap();
        assert_eq!(engine.calls(), vec![Call::Convert(SupportedFileType::Png)]);
    }

    #[test]
    fn works_through_trait_objects() {
        let engine = Recorder::default();
        let dyn_engine: &dyn CodecEngine = &engine;
        let mut out = [0u8; 2];
        dispatch(dyn_engine, b"in", &mut out, &EngineParameters::default(), TargetFormat::Optimize);
        assert_eq!(engine.calls(), vec![Call::Compress]);
    }
}
