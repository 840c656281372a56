//! Shared helpers for the diff engine's tests.

use std::sync::Arc;

use super::script::Line;

/// Length of the longest common subsequence, by the textbook table.
pub fn lcs_len(a: &[Line], b: &[Line]) -> usize {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table[0][0]
}

/// Small deterministic generator so failures reproduce.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    /// Up to `max_len` lines drawn from `alphabet` distinct values.
    pub fn sequence(&mut self, max_len: u64, alphabet: u64) -> Vec<Line> {
        let len = self.next() % (max_len + 1);
        (0..len)
            .map(|_| Arc::from(format!("l{}", self.next() % alphabet).as_str()))
            .collect()
    }
}
