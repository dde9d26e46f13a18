use crate::tableau::Tableau;

/// What the Simplex rules say to do with the current tableau
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotDecision {
    /// Bring `column` into the basis in place of the variable basic in `row`
    Pivot { column: usize, row: usize },
    /// No improving column remains
    Optimal,
    /// `column` improves the objective but no row limits it
    Unbounded { column: usize },
}

/// One performed pivot, kept for tracing
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotRecord {
    /// Entering variable index
    pub entering: usize,
    /// Row where the pivot happened
    pub row: usize,
    /// Variable that left the basis
    pub leaving: usize,
    /// Pivot element before normalization
    pub pivot_value: f64,
    /// Winning minimum ratio
    pub ratio: f64,
}

impl PivotRecord {
    /// A degenerate pivot changes the basis without moving the vertex
    pub fn is_degenerate(&self) -> bool {
        self.ratio == 0.0
    }
}

/// Per-row ratios computed for an entering column
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RatioTest {
    pub column: usize,
    /// `None` for rows excluded from the test
    pub ratios: Vec<Option<f64>>,
}

/// Applies the entering and leaving rules to `tableau` without modifying it.
///
/// Entering: the most negative objective-row entry among non-basic columns,
/// lowest index on ties. Leaving: minimum ratio over rows with a positive
/// entry in the entering column, lowest basic-variable index on ties.
pub fn select(tableau: &Tableau, tolerance: f64) -> PivotDecision {
    let Some(column) = entering_column(tableau, tolerance) else {
        return PivotDecision::Optimal;
    };
    match leaving_row(tableau, column, tolerance) {
        Some((row, _)) => PivotDecision::Pivot { column, row },
        None => PivotDecision::Unbounded { column },
    }
}

pub(crate) fn entering_column(tableau: &Tableau, tolerance: f64) -> Option<usize> {
    let mut min_val = -tolerance;
    let mut min_col = None;

    // Ascending scan; a later column only wins by beating the minimum by
    // more than the tolerance
    for j in tableau.non_basic_columns() {
        let val = tableau.reduced_cost(j);
        let better = match min_col {
            None => val < min_val,
            Some(_) => val < min_val - tolerance,
        };
        if better {
            min_val = val;
            min_col = Some(j);
        }
    }

    min_col
}

/// `rhs / entry` for every constraint row, `None` where the entry in `col`
/// is not positive.
pub(crate) fn ratios(tableau: &Tableau, col: usize, tolerance: f64) -> Vec<Option<f64>> {
    (0..tableau.num_constraints())
        .map(|i| {
            let val = tableau.entry(i, col);
            if val <= tolerance {
                return None;
            }
            let ratio = tableau.rhs(i) / val;
            log::trace!(
                "ratio for {} in row {}: {} / {} = {}",
                tableau.variables[col].name,
                i,
                tableau.rhs(i),
                val,
                ratio
            );
            Some(ratio)
        })
        .collect()
}

/// Minimum ratio test for `col`. Returns the row and its ratio.
///
/// Only exactly equal ratios count as ties. Any other row must have the
/// strictly smallest ratio, since pivoting on a larger one would push the
/// true minimum row below zero.
pub(crate) fn leaving_row(tableau: &Tableau, col: usize, tolerance: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, ratio) in ratios(tableau, col, tolerance).into_iter().enumerate() {
        let Some(ratio) = ratio else {
            continue;
        };
        best = match best {
            None => Some((i, ratio)),
            Some((_, min_ratio)) if ratio < min_ratio => Some((i, ratio)),
            Some((min_row, min_ratio))
                if ratio == min_ratio && tableau.basic_vars[i] < tableau.basic_vars[min_row] =>
            {
                Some((i, ratio))
            }
            keep => keep,
        };
    }

    best
}

impl Tableau {
    /// Gauss-Jordan pivot on (`row`, `column`): normalizes the pivot row,
    /// clears the column everywhere else (objective row included) and swaps
    /// `column` into the basis.
    pub(crate) fn pivot(&mut self, column: usize, row: usize, tolerance: f64) -> PivotRecord {
        let n_rows = self.data.len();
        let rhs_col = self.rhs_col();

        let pivot_val = self.data[row][column];
        debug_assert!(pivot_val.abs() > 0.0, "pivot on a zero element");
        let ratio = self.data[row][rhs_col] / pivot_val;
        let leaving = self.basic_vars[row];

        for val in self.data[row].iter_mut() {
            *val /= pivot_val;
        }

        let pivot_row = self.data[row].clone();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = self.data[i][column];
            if factor == 0.0 {
                continue;
            }
            for (val, p) in self.data[i].iter_mut().zip(&pivot_row) {
                *val -= factor * p;
            }
        }

        // Keep the basis column an exact unit vector and feasible rhs exact
        for i in 0..n_rows {
            self.data[i][column] = if i == row { 1.0 } else { 0.0 };
        }
        for i in 0..self.num_constraints() {
            if self.data[i][rhs_col].abs() <= tolerance {
                self.data[i][rhs_col] = 0.0;
            }
        }

        self.basic_vars[row] = column;

        log::debug!(
            "pivot: {} enters, {} leaves (row {}, pivot {:.4}, ratio {:.4})",
            self.variables[column].name,
            self.variables[leaving].name,
            row,
            pivot_val,
            ratio
        );

        PivotRecord {
            entering: column,
            row,
            leaving,
            pivot_value: pivot_val,
            ratio,
        }
    }
}
