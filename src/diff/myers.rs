//! Line differ: Myers' O(ND) algorithm in its linear-space divide-and-conquer form.
//!
//! Both inputs are interned to integer ids first, so comparisons inside the search
//! are integer compares. Each recursion strips the common prefix and suffix, runs
//! the forward and backward searches until they overlap, and splits the problem there.

use std::collections::HashMap;

use super::script::{EditOp, EditScript, Line};

/// Shortest edit script turning `older` into `newer`.
pub fn diff(older: &[Line], newer: &[Line]) -> EditScript {
    let (old_ids, new_ids) = intern(older, newer);
    let n = old_ids.len();
    let m = new_ids.len();

    let mut search = Search::new(&old_ids, &new_ids);
    search.compare(0, n, 0, m);

    EditScript::new(build_ops(older, newer, &search.deleted, &search.inserted))
}

fn intern<'a>(older: &'a [Line], newer: &'a [Line]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let mut lookup = |line: &'a Line| -> u32 {
        let next = ids.len() as u32;
        *ids.entry(line.as_ref()).or_insert(next)
    };
    let old_ids = older.iter().map(&mut lookup).collect();
    let new_ids = newer.iter().map(&mut lookup).collect();
    (old_ids, new_ids)
}

/// Walk both sequences emitting ops; within a hunk deletions come before insertions.
fn build_ops(older: &[Line], newer: &[Line], deleted: &[bool], inserted: &[bool]) -> Vec<EditOp> {
    let n = older.len();
    let m = newer.len();
    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);

    loop {
        if i < n && j < m && !deleted[i] && !inserted[j] {
            ops.push(EditOp::Keep {
                old: i,
                new: j,
                line: older[i].clone(),
            });
            i += 1;
            j += 1;
            continue;
        }

        let start = (i, j);
        while i < n && (deleted[i] || j >= m) {
            ops.push(EditOp::Delete {
                old: i,
                line: older[i].clone(),
            });
            i += 1;
        }
        while j < m && (inserted[j] || i >= n) {
            ops.push(EditOp::Insert {
                new: j,
                line: newer[j].clone(),
            });
            j += 1;
        }
        if (i, j) == start {
            break;
        }
    }

    ops
}

struct Search<'a> {
    old: &'a [u32],
    new: &'a [u32],
    deleted: Vec<bool>,
    inserted: Vec<bool>,
}

impl<'a> Search<'a> {
    fn new(old: &'a [u32], new: &'a [u32]) -> Self {
        Self {
            old,
            new,
            deleted: vec![false; old.len()],
            inserted: vec![false; new.len()],
        }
    }

    fn compare(&mut self, mut old_lo: usize, mut old_hi: usize, mut new_lo: usize, mut new_hi: usize) {
        while old_lo < old_hi && new_lo < new_hi && self.old[old_lo] == self.new[new_lo] {
            old_lo += 1;
            new_lo += 1;
        }
        while old_lo < old_hi && new_lo < new_hi && self.old[old_hi - 1] == self.new[new_hi - 1] {
            old_hi -= 1;
            new_hi -= 1;
        }

        if old_lo == old_hi {
            self.inserted[new_lo..new_hi].fill(true);
            return;
        }
        if new_lo == new_hi {
            self.deleted[old_lo..old_hi].fill(true);
            return;
        }

        match self.middle_snake(old_lo, old_hi, new_lo, new_hi) {
            Some((x, y)) if (x, y) != (old_lo, new_lo) && (x, y) != (old_hi, new_hi) => {
                self.compare(old_lo, x, new_lo, y);
                self.compare(x, old_hi, y, new_hi);
            }
            _ => {
                self.deleted[old_lo..old_hi].fill(true);
                self.inserted[new_lo..new_hi].fill(true);
            }
        }
    }

    /// Split point on a shortest path through the box, found where the forward and
    /// backward searches overlap. `None` means the box shares no line at all.
    fn middle_snake(
        &self,
        old_lo: usize,
        old_hi: usize,
        new_lo: usize,
        new_hi: usize,
    ) -> Option<(usize, usize)> {
        let n = (old_hi - old_lo) as isize;
        let m = (new_hi - new_lo) as isize;
        let max_d = (n + m + 1) / 2;
        let offset = max_d;
        let len = 2 * max_d + 2;

        // -1 marks a diagonal not reached yet.
        let mut vf = vec![-1isize; len as usize];
        let mut vb = vec![-1isize; len as usize];
        vf[(offset + 1) as usize] = 0;
        vb[(offset + 1) as usize] = 0;

        let delta = n - m;
        let odd = delta % 2 != 0;
        let in_box = |x: isize, y: isize| (0..=n).contains(&x) && (0..=m).contains(&y);

        // Diagonals trimmed after running off the right or bottom edge.
        let (mut f_start, mut f_end) = (0isize, 0isize);
        let (mut b_start, mut b_end) = (0isize, 0isize);

        for d in 0..max_d {
            let mut k = -d + f_start;
            while k <= d - f_end {
                let ki = (offset + k) as usize;
                let mut x = if k == -d || (k != d && vf[ki - 1] < vf[ki + 1]) {
                    vf[ki + 1]
                } else {
                    vf[ki - 1] + 1
                };
                let mut y = x - k;
                while x >= 0
                    && y >= 0
                    && x < n
                    && y < m
                    && self.old[old_lo + x as usize] == self.new[new_lo + y as usize]
                {
                    x += 1;
                    y += 1;
                }
                vf[ki] = x;

                if x > n {
                    f_end += 2;
                } else if y > m {
                    f_start += 2;
                } else if odd {
                    let bi = offset + delta - k;
                    if bi >= 0
                        && bi < len
                        && vb[bi as usize] != -1
                        && x >= n - vb[bi as usize]
                        && in_box(x, y)
                    {
                        return Some((old_lo + x as usize, new_lo + y as usize));
                    }
                }
                k += 2;
            }

            let mut k = -d + b_start;
            while k <= d - b_end {
                let ki = (offset + k) as usize;
                let mut x = if k == -d || (k != d && vb[ki - 1] < vb[ki + 1]) {
                    vb[ki + 1]
                } else {
                    vb[ki - 1] + 1
                };
                let mut y = x - k;
                while x >= 0
                    && y >= 0
                    && x < n
                    && y < m
                    && self.old[old_lo + (n - x - 1) as usize] == self.new[new_lo + (m - y - 1) as usize]
                {
                    x += 1;
                    y += 1;
                }
                vb[ki] = x;

                if x > n {
                    b_end += 2;
                } else if y > m {
                    b_start += 2;
                } else if !odd {
                    let fi = offset + delta - k;
                    if fi >= 0 && fi < len && vf[fi as usize] != -1 {
                        let fx = vf[fi as usize];
                        let fy = fx - (delta - k);
                        if fx >= n - x && in_box(fx, fy) {
                            return Some((old_lo + fx as usize, new_lo + fy as usize));
                        }
                    }
                }
                k += 2;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::testing::{Lcg, lcs_len};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn lines(items: &[&str]) -> Vec<Line> {
        items.iter().map(|s| Arc::from(*s)).collect()
    }

    fn changes(script: &EditScript) -> usize {
        script.additions() + script.deletions()
    }

    #[test]
    fn test_single_line_change() {
        let script = diff(&lines(&["a", "b", "c"]), &lines(&["a", "x", "c"]));
        assert_eq!(
            script.ops,
            vec![
                EditOp::Keep { old: 0, new: 0, line: Arc::from("a") },
                EditOp::Delete { old: 1, line: Arc::from("b") },
                EditOp::Insert { new: 1, line: Arc::from("x") },
                EditOp::Keep { old: 2, new: 2, line: Arc::from("c") },
            ]
        );
    }

    #[test]
    fn test_empty_older_is_all_inserts() {
        let script = diff(&[], &lines(&["a", "b"]));
        assert_eq!(
            script.ops,
            vec![
                EditOp::Insert { new: 0, line: Arc::from("a") },
                EditOp::Insert { new: 1, line: Arc::from("b") },
            ]
        );
    }

    #[test]
    fn test_empty_newer_is_all_deletes() {
        let script = diff(&lines(&["a", "b"]), &[]);
        assert_eq!(script.deletions(), 2);
        assert_eq!(script.additions(), 0);
    }

    #[test]
    fn test_both_empty() {
        assert!(diff(&[], &[]).is_empty());
    }

    #[test]
    fn test_intern_shares_ids_across_sides() {
        let older = lines(&["a", "b", "a"]);
        let newer = lines(&["b", "c", "a"]);
        let (old_ids, new_ids) = intern(&older, &newer);
        assert_eq!(old_ids, vec![0, 1, 0]);
        assert_eq!(new_ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_identical_inputs_are_all_keep() {
        let text = lines(&["fn main() {", "    println!(\"hi\");", "}"]);
        let script = diff(&text, &text);
        assert_eq!(script.len(), 3);
        assert!(script.ops.iter().all(EditOp::is_keep));
    }

    #[test]
    fn test_line_endings_compare_exactly() {
        let script = diff(&lines(&["a\r", "b"]), &lines(&["a", "b"]));
        assert_eq!(script.deletions(), 1);
        assert_eq!(script.additions(), 1);
    }

    #[test]
    fn test_deletions_precede_insertions_within_hunk() {
        let script = diff(&lines(&["a", "b", "c", "d"]), &lines(&["a", "x", "y", "d"]));
        let kinds: Vec<char> = script
            .ops
            .iter()
            .map(|op| match op {
                EditOp::Keep { .. } => '=',
                EditOp::Delete { .. } => '-',
                EditOp::Insert { .. } => '+',
            })
            .collect();
        assert_eq!(kinds, vec!['=', '-', '-', '+', '+', '=']);
    }

    #[test]
    fn test_repeated_lines() {
        let older = lines(&["x", "x", "x", "y"]);
        let newer = lines(&["y", "x", "x", "x"]);
        let script = diff(&older, &newer);
        assert_eq!(script.replay_older(), older);
        assert_eq!(script.replay_newer(), newer);
        assert_eq!(changes(&script), 2);
    }

    #[test]
    fn test_random_inputs_replay_and_are_minimal() {
        let mut rng = Lcg(0x5eed);
        for round in 0..400 {
            let alphabet = 2 + (round % 6) as u64;
            let older = rng.sequence(24, alphabet);
            let newer = rng.sequence(24, alphabet);
            let script = diff(&older, &newer);

            assert_eq!(script.replay_older(), older, "round {round}");
            assert_eq!(script.replay_newer(), newer, "round {round}");

            let lcs = lcs_len(&older, &newer);
            assert_eq!(
                changes(&script),
                older.len() + newer.len() - 2 * lcs,
                "round {round}: {older:?} -> {newer:?}"
            );
        }
    }

    #[test]
    fn test_keep_indices_are_consistent() {
        let mut rng = Lcg(42);
        for _ in 0..100 {
            let older = rng.sequence(16, 3);
            let newer = rng.sequence(16, 3);
            for op in diff(&older, &newer).ops {
                match op {
                    EditOp::Keep { old, new, line } => {
                        assert_eq!(older[old], line);
                        assert_eq!(newer[new], line);
                    }
                    EditOp::Delete { old, line } => assert_eq!(older[old], line),
                    EditOp::Insert { new, line } => assert_eq!(newer[new], line),
                }
            }
        }
    }
}
