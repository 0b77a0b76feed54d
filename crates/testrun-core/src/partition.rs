//! Chunk partitioner.
//!
//! Splits the discovered test list into contiguous, near-equal chunks, one
//! per active worker. Workers are treated as equally fast, so there is no
//! weighting and no shuffling: the same input always yields the same chunks.

use serde::{Deserialize, Serialize};

use crate::{CoreError, TestName};

/// An ordered, contiguous slice of the test list assigned to one worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    tests: Vec<TestName>,
}

impl Chunk {
    /// Create a chunk from test names.
    pub fn new(tests: Vec<TestName>) -> Self {
        Self { tests }
    }

    /// Test names in this chunk, in discovery order.
    pub fn tests(&self) -> &[TestName] {
        &self.tests
    }

    /// Number of tests in the chunk.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if the chunk holds no tests.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Consume the chunk and return its test names.
    pub fn into_tests(self) -> Vec<TestName> {
        self.tests
    }
}

/// Partition `tests` into at most `worker_count` contiguous chunks.
///
/// Chunk size is `ceil(n / worker_count)`; the last chunk may be shorter.
/// An empty test list yields no chunks. A zero worker count is rejected.
pub fn partition(tests: &[TestName], worker_count: usize) -> Result<Vec<Chunk>, CoreError> {
    if worker_count == 0 {
        return Err(CoreError::InvalidArgument(
            "worker count must be positive".to_string(),
        ));
    }

    if tests.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = tests.len().div_ceil(worker_count);
    Ok(tests
        .chunks(chunk_size)
        .map(|slice| Chunk::new(slice.to_vec()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<TestName> {
        (0..n).map(|i| TestName::new(format!("test_{i}"))).collect()
    }

    #[test]
    fn test_even_split() {
        let chunks = partition(&names(6), 3).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 2));
        assert_eq!(chunks[1].tests()[0].as_str(), "test_2");
    }

    #[test]
    fn test_uneven_split_shorter_tail() {
        let chunks = partition(&names(7), 3).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_fewer_chunks_than_workers() {
        // ceil(5 / 4) == 2, so only three chunks are produced.
        let chunks = partition(&names(5), 4).unwrap();
        assert_eq!(chunks.len(), 3);

        let chunks = partition(&names(2), 8).unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_concatenation_preserves_input() {
        for n in 0..40 {
            for k in 1..10 {
                let input = names(n);
                let chunks = partition(&input, k).unwrap();
                let bound = n.div_ceil(k);

                assert!(chunks.len() <= k, "n={n} k={k}");
                assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= bound));

                let joined: Vec<TestName> =
                    chunks.into_iter().flat_map(Chunk::into_tests).collect();
                assert_eq!(joined, input, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(partition(&[], 1).unwrap().is_empty());
        assert!(partition(&[], 16).unwrap().is_empty());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = partition(&names(3), 0);
        assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
        assert!(matches!(partition(&[], 0), Err(CoreError::InvalidArgument(_))));
    }
}
