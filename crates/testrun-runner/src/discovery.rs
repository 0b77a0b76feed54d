//! Test discovery by scanning Rust sources for `#[test]` functions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use testrun_core::TestName;

fn test_fn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"#\[test\][\w\W]*?fn\s+(\w+)").expect("test function pattern is valid")
    })
}

/// Extract test function names from one source file's contents.
pub fn scan_source(content: &str) -> Vec<TestName> {
    test_fn_pattern()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| TestName::from(m.as_str()))
        .collect()
}

/// Find tests in `source_files` (relative to `source_dir`), in file order.
///
/// Unreadable files are logged and skipped. A name found more than once is
/// kept only at its first position.
pub fn discover_tests(source_dir: &Path, source_files: &[PathBuf]) -> Vec<TestName> {
    info!(source_dir = %source_dir.display(), files = source_files.len(), "Looking for tests");

    let mut seen = HashSet::new();
    let mut tests = Vec::new();

    for file in source_files {
        let path = source_dir.join(file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read source file");
                continue;
            }
        };

        for name in scan_source(&content) {
            if seen.insert(name.clone()) {
                tests.push(name);
            }
        }
    }

    info!(count = tests.len(), "Discovered tests");
    tests
}
