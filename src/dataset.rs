//! Regression datasets.
//!
//! A dataset is a header of column names plus a row-major matrix with one
//! column per header entry. The last column is the regression target, every
//! other column is an input feature.

use crate::error::{Error, Result};
use ndarray::{s, Array2, ArrayView1};
use std::path::Path;

/// Header plus numeric rows, read-only once built
#[derive(Clone, Debug)]
pub struct Dataset {
    header: Vec<String>,
    rows: Array2<f64>,
}

impl Dataset {
    /// Build a dataset from a header and a `(rows, header.len())` matrix
    pub fn new(header: Vec<String>, rows: Array2<f64>) -> Result<Self> {
        if header.len() < 2 {
            return Err(Error::InvalidData(format!(
                "header needs at least one feature and a target, got {} column(s)",
                header.len()
            )));
        }
        if rows.ncols() != header.len() {
            return Err(Error::InvalidData(format!(
                "rows have {} columns, header has {}",
                rows.ncols(),
                header.len()
            )));
        }
        if rows.nrows() == 0 {
            return Err(Error::InvalidData("dataset has no rows".to_string()));
        }
        if rows.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "dataset contains non-finite values".to_string(),
            ));
        }

        Ok(Self { header, rows })
    }

    /// Build a dataset from per-sample rows
    pub fn from_rows(header: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = header.len();
        let mut flat = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::InvalidData(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            flat.extend_from_slice(row);
        }

        let rows = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        Self::new(header, rows)
    }

    /// Parse comma-separated text: a header line, then numeric rows
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .enumerate()
            .filter(|(_, line)| !line.is_empty());

        let header: Vec<String> = match lines.next() {
            Some((_, line)) => line.split(',').map(|c| c.trim().to_string()).collect(),
            None => return Err(Error::InvalidData("missing header line".to_string())),
        };

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let row = line
                .split(',')
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|_| {
                        Error::InvalidData(format!(
                            "line {}: '{}' is not a number",
                            line_no + 1,
                            value.trim()
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        Self::from_rows(header, &rows)
    }

    /// Load a CSV file (see [`Dataset::parse_csv`])
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_csv(&contents)
    }

    /// `points` evenly spaced samples of `y = sin(x)` over `[0, 2π]`
    pub fn sine(points: usize) -> Result<Self> {
        let step = if points > 1 {
            2.0 * std::f64::consts::PI / (points - 1) as f64
        } else {
            0.0
        };
        let rows: Vec<Vec<f64>> = (0..points)
            .map(|i| {
                let x = i as f64 * step;
                vec![x, x.sin()]
            })
            .collect();

        Self::from_rows(vec!["x".to_string(), "y".to_string()], &rows)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Name of the target column
    pub fn target_name(&self) -> &str {
        &self.header[self.header.len() - 1]
    }

    /// Number of input features (all columns but the target)
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.header.len() - 1
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// Input features of row `idx`
    #[inline]
    pub fn features(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.rows.slice(s![idx, ..self.feature_count()])
    }

    /// Target value of row `idx`
    #[inline]
    pub fn target(&self, idx: usize) -> f64 {
        self.rows[[idx, self.feature_count()]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_csv() {
        let data = Dataset::parse_csv("x,y\n0.0,1.5\n2.0, -3\n\n").unwrap();
        assert_eq!(data.header(), &["x".to_string(), "y".to_string()]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.feature_count(), 1);
        assert_eq!(data.target_name(), "y");
        assert_eq!(data.target(1), -3.0);
        assert_eq!(data.features(1).to_vec(), vec![2.0]);
    }

    #[test]
    fn test_parse_csv_rejects_bad_values() {
        assert!(Dataset::parse_csv("x,y\n1,abc\n").is_err());
        assert!(Dataset::parse_csv("x,y\n1,2,3\n").is_err());
        assert!(Dataset::parse_csv("").is_err());
        assert!(Dataset::parse_csv("x,y\n").is_err());
    }

    #[test]
    fn test_new_validates_shape() {
        let header = vec!["a".to_string(), "b".to_string(), "y".to_string()];
        assert!(Dataset::new(header.clone(), array![[1.0, 2.0]]).is_err());
        assert!(Dataset::new(vec!["y".to_string()], array![[1.0]]).is_err());
        assert!(Dataset::new(header.clone(), array![[1.0, 2.0, f64::NAN]]).is_err());

        let data = Dataset::new(header, array![[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(data.feature_count(), 2);
        assert_eq!(data.features(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(data.target(0), 3.0);
    }

    #[test]
    fn test_sine_dataset() {
        let data = Dataset::sine(50).unwrap();
        assert_eq!(data.len(), 50);
        assert_eq!(data.features(0)[0], 0.0);
        assert!((data.features(49)[0] - 2.0 * std::f64::consts::PI).abs() < 1e-12);
        assert!(data.target(49).abs() < 1e-12);
    }
}
