use bytes::Bytes;

use crate::{ClassFingerprint, RawClass};

/// A minimal Sierra contract class document. Compilers used in tests treat it as opaque JSON.
pub const TEST_SIERRA_CLASS: &str = r#"{"sierra_program":["0x1","0x2","0x3"],"contract_class_version":"0.1.0","entry_points_by_type":{"EXTERNAL":[],"L1_HANDLER":[],"CONSTRUCTOR":[]},"abi":"[]"}"#;

/// SHA-256 of [`TEST_SIERRA_CLASS`].
pub const TEST_SIERRA_CLASS_FINGERPRINT: &str =
    "0x06bef1d4c7888264a5b7e6c2a83e57cc2d7716f9ac6a95cb5844221cb40ae6ff";

pub fn test_sierra_class() -> RawClass {
    Bytes::from_static(TEST_SIERRA_CLASS.as_bytes())
}

/// A distinct valid class, for tests that need more than one fingerprint.
pub fn other_test_sierra_class(salt: u64) -> RawClass {
    Bytes::from(format!(
        r#"{{"sierra_program":["0x{salt:x}"],"contract_class_version":"0.1.0","entry_points_by_type":{{"EXTERNAL":[],"L1_HANDLER":[],"CONSTRUCTOR":[]}},"abi":"[]"}}"#
    ))
}

impl ClassFingerprint {
    pub fn of_test_class() -> Self {
        ClassFingerprint::of(TEST_SIERRA_CLASS.as_bytes())
    }
}
