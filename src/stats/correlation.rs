//! Pearson correlation between table columns.

use crate::data::Table;
use serde::Serialize;

/// Pearson coefficient of two columns over rows where both are finite numbers.
///
/// Returns 0 when no pairs remain or when either column has zero variance.
pub fn pearson(table: &Table, col_a: &str, col_b: &str) -> f64 {
    let pairs = table
        .column(col_a)
        .zip(table.column(col_b))
        .filter_map(|(a, b)| Some((a.as_finite()?, b.as_finite()?)));
    pearson_pairs(pairs)
}

/// Pearson coefficient from five running sums.
pub fn pearson_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (mut n, mut sum_x, mut sum_y, mut sum_xx, mut sum_yy, mut sum_xy) =
        (0usize, 0.0, 0.0, 0.0, 0.0, 0.0);
    let mut first: Option<(f64, f64)> = None;
    let (mut x_varies, mut y_varies) = (false, false);
    for (x, y) in pairs {
        match first {
            None => first = Some((x, y)),
            Some((x0, y0)) => {
                x_varies |= x != x0;
                y_varies |= y != y0;
            }
        }
        n += 1;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_yy += y * y;
        sum_xy += x * y;
    }
    // A constant side has zero variance even when the sums round to a
    // small nonzero spread.
    if n == 0 || !x_varies || !y_varies {
        return 0.0;
    }

    let n = n as f64;
    let spread_x = n * sum_xx - sum_x * sum_x;
    let spread_y = n * sum_yy - sum_y * sum_y;
    if spread_x <= 0.0 || spread_y <= 0.0 {
        return 0.0;
    }
    let denominator = (spread_x * spread_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    ((n * sum_xy - sum_x * sum_y) / denominator).clamp(-1.0, 1.0)
}

/// Square, symmetric matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson coefficient for every ordered pair of `columns`, self-pairs
/// included. Cost is O(k² · n).
pub fn correlation_matrix(table: &Table, columns: &[String]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(table, a, b)).collect())
        .collect();
    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}
