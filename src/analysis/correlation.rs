use std::fmt;

use crate::data::model::Dataset;

/// Fewer numeric columns than this and correlation is skipped.
pub const MIN_CORRELATION_COLUMNS: usize = 2;

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square matrix of Pearson coefficients, row-major. `NaN` where undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    /// Off-diagonal pairs from the upper triangle ranked by `|r|`, NaN dropped.
    ///
    /// Ties keep column-major order of the triangle.
    pub fn top_pairs(&self, limit: usize) -> Vec<CorrelationPair> {
        let n = self.size();
        let mut pairs: Vec<CorrelationPair> = (0..n)
            .flat_map(|j| (0..j).map(move |i| (i, j)))
            .filter_map(|(i, j)| {
                let r = self.get(i, j);
                (!r.is_nan()).then(|| CorrelationPair {
                    first: self.columns[i].clone(),
                    second: self.columns[j].clone(),
                    coefficient: r,
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        pairs.truncate(limit);
        pairs
    }
}

/// Pearson correlation of every pair of `columns` in `dataset`.
///
/// Each pair uses only the rows where both cells are present. Returns `None`
/// when fewer than [`MIN_CORRELATION_COLUMNS`] columns are given.
pub fn correlation_matrix(dataset: &Dataset, columns: &[String]) -> Option<CorrelationMatrix> {
    let series: Vec<(String, Vec<Option<f64>>)> = columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|c| (c.name.clone(), c.as_f64_vec()))
        .collect();
    if series.len() < MIN_CORRELATION_COLUMNS {
        log::debug!("only {} numeric columns, skipping correlation", series.len());
        return None;
    }

    let n = series.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        values[i * n + i] = self_correlation(&series[i].1);
        for j in (i + 1)..n {
            let r = pearson(&series[i].1, &series[j].1);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }
    Some(CorrelationMatrix {
        columns: series.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

/// Exactly 1 for a column with spread, NaN otherwise.
fn self_correlation(x: &[Option<f64>]) -> f64 {
    if pearson(x, x).is_nan() {
        f64::NAN
    } else {
        1.0
    }
}

/// Pairwise-complete Pearson coefficient, clipped to `[-1, 1]`.
fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.is_empty() {
        return f64::NAN;
    }
    let len = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / len;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / len;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let divisor = (sxx * syy).sqrt();
    if divisor == 0.0 {
        return f64::NAN;
    }
    (sxy / divisor).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Ranked pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub coefficient: f64,
}

/// Aligned listing of ranked pairs.
pub struct PairTable<'a>(pub &'a [CorrelationPair]);

impl fmt::Display for PairTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w1 = self.0.iter().map(|p| p.first.chars().count()).max().unwrap_or(0);
        let w2 = self.0.iter().map(|p| p.second.chars().count()).max().unwrap_or(0);
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<w1$}  {:<w2$}  {:>7.4}", p.first, p.second, p.coefficient)?;
        }
        Ok(())
    }
}
