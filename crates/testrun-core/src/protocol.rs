//! Worker wire protocol constants and test-list encoding.
//!
//! The coordinator and workers speak plain HTTP:
//! - `GET /ping` answers `200 OK` with body `OK` while the worker is up.
//! - `POST /test` takes a multipart body with `testList` (comma-separated
//!   test names) and `codeZip` (zip archive of the source tree), and answers
//!   with a JSON array of [`TestResult`](crate::TestResult).

use crate::TestName;

pub const ENDPOINT_PING: &str = "/ping";
pub const ENDPOINT_TEST: &str = "/test";

pub const FIELD_TEST_LIST: &str = "testList";
pub const FIELD_CODE_ZIP: &str = "codeZip";

pub const PING_BODY: &str = "OK";

const TEST_LIST_SEPARATOR: char = ',';

/// Encode test names as the `testList` form value.
pub fn encode_test_list(tests: &[TestName]) -> String {
    tests
        .iter()
        .map(TestName::as_str)
        .collect::<Vec<_>>()
        .join(&TEST_LIST_SEPARATOR.to_string())
}

/// Decode a `testList` form value. Blank entries are dropped.
pub fn decode_test_list(raw: &str) -> Vec<TestName> {
    raw.split(TEST_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(TestName::from)
        .collect()
}
