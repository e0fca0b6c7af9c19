// src/sequence/feedback.rs

//! Feedback metric over a coupling matrix.

use std::fmt;

use crate::sequence::coupling::CouplingMatrix;

/// Quality of an order: `(feedback, size)`, compared lexicographically.
///
/// - `feedback`: total number of items flowing backward (`i > j`).
/// - `size`: backward items weighted by the span `i - j + 1` they jump.
///
/// Smaller is better; the derived `Ord` compares `feedback` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    pub feedback: usize,
    pub size: usize,
}

impl Score {
    pub fn new(feedback: usize, size: usize) -> Self {
        Self { feedback, size }
    }

    /// Strictly better: fewer feedback items, or equal feedback with a
    /// smaller weighted size. Equal scores never improve.
    pub fn improves_on(&self, other: &Score) -> bool {
        self < other
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feedback={} size={}", self.feedback, self.size)
    }
}

/// Score the order a coupling matrix was built for.
pub fn score(matrix: &CouplingMatrix) -> Score {
    let mut total = Score::default();
    for i in 0..matrix.len() {
        for (j, &count) in matrix.row(i).iter().enumerate().take(i) {
            if count != 0 {
                total.feedback += count;
                total.size += (i - j + 1) * count;
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Score::new(1, 9).improves_on(&Score::new(2, 2)));
        assert!(Score::new(2, 2).improves_on(&Score::new(2, 3)));
        assert!(!Score::new(2, 3).improves_on(&Score::new(2, 3)));
        assert!(!Score::new(3, 0).improves_on(&Score::new(2, 9)));
    }

    #[test]
    fn counts_only_below_diagonal() {
        // Position 2 feeds position 0 with two items, position 1 feeds
        // position 0 with one item; forward couplings are ignored.
        let m = CouplingMatrix::from_rows(vec![
            vec![0, 4, 1],
            vec![1, 0, 7],
            vec![2, 0, 0],
        ]);
        let s = score(&m);
        assert_eq!(s.feedback, 3);
        // (1-0+1)*1 + (2-0+1)*2
        assert_eq!(s.size, 2 + 6);
    }

    #[test]
    fn empty_matrix_scores_zero() {
        assert_eq!(score(&CouplingMatrix::from_rows(Vec::new())), Score::default());
    }
}
