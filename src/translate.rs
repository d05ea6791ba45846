//! Classification of raw engine results.

use crate::config::SENTINEL;
use crate::engine::OperationResult;
use crate::error::{CompressError, Result};

/// Turn an [`OperationResult`] into a byte count or a classified error.
///
/// A successful result whose `code` is zero or `>= SENTINEL` means the engine
/// could not produce a usable size, usually because the output span was too
/// small.
pub fn translate(result: OperationResult) -> Result<u32> {
    if !result.success {
        return Err(CompressError::OperationFailure(result.message.unwrap_or_default()));
    }
    if result.code == 0 || result.code >= SENTINEL {
        return Err(CompressError::ResourceExhaustion { code: result.code });
    }
    // SENTINEL < u32::MAX, so this cannot truncate.
    Ok(result.code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn failure_carries_engine_message() {
        let err = translate(OperationResult::failed("Unsupported file type")).unwrap_err();
        assert_eq!(err, CompressError::OperationFailure("Unsupported file type".into()));
    }

    #[test]
    fn failure_wins_over_code() {
        let res = OperationResult {
            success: false,
            code: 1234,
            message: None,
        };
        assert_eq!(translate(res).unwrap_err().kind(), ErrorKind::OperationFailure);
    }

    #[test]
    fn boundaries() {
        assert_eq!(translate(OperationResult::ok(1)).unwrap(), 1);
        assert_eq!(translate(OperationResult::ok(SENTINEL - 1)).unwrap(), 2_147_483_599);
        for code in [0, SENTINEL, SENTINEL + 1, u64::MAX] {
            assert_eq!(
                translate(OperationResult::ok(code)).unwrap_err(),
                CompressError::ResourceExhaustion { code }
            );
        }
    }
}
