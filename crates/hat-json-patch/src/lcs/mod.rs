//! Longest common subsequence edit scripts.
//!
//! [`compare`] trims the common prefix and suffix, then fills an edit-distance
//! matrix over what is left. [`reduce`] walks the matrix from the top-left
//! corner and reports, left to right, whether each step keeps an element
//! ([`Edit::Skip`]), takes one from `b` ([`Edit::Add`]) or drops one from `a`
//! ([`Edit::Remove`]).
//!
//! ```
//! use hat_json_patch::lcs::{compare, Edit};
//!
//! let lcs = compare(&["x", "y", "z"], &["x", "z", "w"]);
//! assert_eq!(
//!     lcs.edits(),
//!     vec![(Edit::Skip, 0, 0), (Edit::Remove, 1, 1), (Edit::Skip, 1, 2), (Edit::Add, 2, 3)]
//! );
//! ```

/// One step of an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Skip,
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    /// Edits needed from this cell to the end.
    cost: usize,
    edit: Edit,
}

/// Comparison result, ready to be walked by [`reduce`].
#[derive(Debug, Clone)]
pub struct Lcs {
    prefix: usize,
    suffix: usize,
    /// `rows` = middle of `b` plus one, columns = middle of `a` plus one.
    matrix: Vec<Vec<Cell>>,
}

/// Compares `a` and `b`.
///
/// Runs in O(n·m) time and space over the span left after trimming common
/// ends. On equal cost a removal is preferred over an addition, so an element
/// replaced in place shows up as `Remove` followed by `Add`.
pub fn compare<T: PartialEq>(a: &[T], b: &[T]) -> Lcs {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();

    let a = &a[prefix..a.len() - suffix];
    let b = &b[prefix..b.len() - suffix];
    let (cols, rows) = (a.len(), b.len());

    let mut matrix = vec![vec![Cell { cost: 0, edit: Edit::Skip }; cols + 1]; rows + 1];
    for (j, cell) in matrix[rows].iter_mut().enumerate().take(cols) {
        *cell = Cell { cost: cols - j, edit: Edit::Remove };
    }
    for (i, row) in matrix.iter_mut().enumerate().take(rows) {
        row[cols] = Cell { cost: rows - i, edit: Edit::Add };
    }
    for j in (0..cols).rev() {
        for i in (0..rows).rev() {
            let right = matrix[i][j + 1].cost;
            let down = matrix[i + 1][j].cost;
            matrix[i][j] = if a[j] == b[i] {
                Cell { cost: matrix[i + 1][j + 1].cost, edit: Edit::Skip }
            } else if right <= down {
                Cell { cost: right + 1, edit: Edit::Remove }
            } else {
                Cell { cost: down + 1, edit: Edit::Add }
            };
        }
    }

    Lcs { prefix, suffix, matrix }
}

/// Folds over the edit script of `lcs`.
///
/// `f` receives the accumulator, the edit, the index into `b` and the index
/// into `a` at which the edit happens.
pub fn reduce<A, F>(lcs: &Lcs, init: A, mut f: F) -> A
where
    F: FnMut(A, Edit, usize, usize) -> A,
{
    let mut acc = init;
    for k in 0..lcs.prefix {
        acc = f(acc, Edit::Skip, k, k);
    }

    let rows = lcs.matrix.len() - 1;
    let cols = lcs.matrix[0].len() - 1;
    let (mut i, mut j) = (0, 0);
    while i < rows || j < cols {
        let edit = lcs.matrix[i][j].edit;
        acc = f(acc, edit, i + lcs.prefix, j + lcs.prefix);
        match edit {
            Edit::Skip => {
                i += 1;
                j += 1;
            }
            Edit::Remove => j += 1,
            Edit::Add => i += 1,
        }
    }

    for k in 0..lcs.suffix {
        acc = f(acc, Edit::Skip, lcs.prefix + rows + k, lcs.prefix + cols + k);
    }
    acc
}

impl Lcs {
    /// The full edit script as `(edit, index into b, index into a)`.
    pub fn edits(&self) -> Vec<(Edit, usize, usize)> {
        reduce(self, Vec::new(), |mut out, edit, i, j| {
            out.push((edit, i, j));
            out
        })
    }

    /// Number of additions plus removals.
    pub fn distance(&self) -> usize {
        self.matrix[0][0].cost
    }
}
