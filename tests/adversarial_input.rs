//! Oversized length/count claims must be rejected before any allocation proportional to the
//! claim, by both `validate` and `decode`.

use btoon::{decode, validate, DecodeOptions, Error, ValidateOptions};

#[test]
fn array32_overclaim_is_rejected_by_validate_and_decode() {
    // array32 claiming 2^32-1 elements in a 5-byte buffer.
    let buf = [0xdd, 0xff, 0xff, 0xff, 0xff];

    let result = validate(&buf, &ValidateOptions::default());
    assert!(!result.valid);
    assert!(matches!(result.error, Some(Error::InvalidLength { .. })));

    assert!(decode(&buf, &DecodeOptions::default()).is_err());
}

#[test]
fn map32_overclaim_is_rejected_by_validate() {
    let buf = [0xdf, 0xff, 0xff, 0xff, 0xff];
    let result = validate(&buf, &ValidateOptions::default());
    assert!(!result.valid);
    assert!(matches!(result.error, Some(Error::InvalidLength { .. })));
}

#[test]
fn str32_overclaim_is_rejected_by_validate() {
    let buf = [0xdb, 0xff, 0xff, 0xff, 0xff];
    let result = validate(&buf, &ValidateOptions::default());
    assert!(!result.valid);
    assert!(matches!(result.error, Some(Error::InvalidLength { .. })));
}

#[test]
fn bin32_overclaim_is_rejected_by_validate() {
    let buf = [0xc6, 0xff, 0xff, 0xff, 0xff];
    let result = validate(&buf, &ValidateOptions::default());
    assert!(!result.valid);
    assert!(matches!(result.error, Some(Error::InvalidLength { .. })));
}

#[test]
fn ext32_overclaim_is_rejected_by_validate() {
    let buf = [0xc9, 0xff, 0xff, 0xff, 0xff];
    let result = validate(&buf, &ValidateOptions::default());
    assert!(!result.valid);
    assert!(matches!(result.error, Some(Error::InvalidLength { .. })));
}

#[test]
fn empty_buffer_is_truncated_not_a_panic() {
    assert!(decode(&[], &DecodeOptions::default()).is_err());
    assert!(!validate(&[], &ValidateOptions::default()).valid);
}
