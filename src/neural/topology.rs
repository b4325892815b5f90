//! Architecture descriptors.
//!
//! A descriptor lists hidden-layer widths, each terminated by `s`:
//! `"5s"` is one hidden layer of 5 units, `"5s5s"` two layers of 5.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Terminates every hidden-layer width in a descriptor
pub const LAYER_DELIMITER: char = 's';

/// Hidden-layer widths of a network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    hidden: Vec<usize>,
}

impl Topology {
    /// Build a topology from explicit hidden widths
    pub fn new(hidden: Vec<usize>) -> Result<Self> {
        if hidden.is_empty() {
            return Err(Error::InvalidTopology(
                "at least one hidden layer is required".to_string(),
            ));
        }
        if hidden.contains(&0) {
            return Err(Error::InvalidTopology(
                "hidden layer widths must be > 0".to_string(),
            ));
        }
        Ok(Self { hidden })
    }

    pub fn hidden(&self) -> &[usize] {
        &self.hidden
    }

    /// Full layer sizes: `[input_dim, hidden..., 1]`
    pub fn layer_sizes(&self, input_dim: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden.len() + 2);
        sizes.push(input_dim);
        sizes.extend_from_slice(&self.hidden);
        sizes.push(1);
        sizes
    }
}

impl FromStr for Topology {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self> {
        let descriptor = descriptor.trim();
        let mut tokens: Vec<&str> = descriptor.split(LAYER_DELIMITER).collect();

        // The last token is whatever follows the final delimiter and must be empty.
        match tokens.pop() {
            Some("") => {}
            _ => {
                return Err(Error::InvalidTopology(format!(
                    "'{}' must end with '{}'",
                    descriptor, LAYER_DELIMITER
                )))
            }
        }

        let hidden = tokens
            .iter()
            .map(|token| {
                token.parse::<usize>().map_err(|_| {
                    Error::InvalidTopology(format!(
                        "'{}' is not a layer width in '{}'",
                        token, descriptor
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(hidden)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for width in &self.hidden {
            write!(f, "{}{}", width, LAYER_DELIMITER)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_layer() {
        let topology: Topology = "5s".parse().unwrap();
        assert_eq!(topology.hidden(), &[5]);
        assert_eq!(topology.layer_sizes(1), vec![1, 5, 1]);
    }

    #[test]
    fn test_parse_multiple_layers() {
        let topology: Topology = "5s20s".parse().unwrap();
        assert_eq!(topology.layer_sizes(2), vec![2, 5, 20, 1]);
        assert_eq!(topology.to_string(), "5s20s");
    }

    #[test]
    fn test_rejects_non_numeric_width() {
        assert!(matches!(
            "5sxs".parse::<Topology>(),
            Err(Error::InvalidTopology(_))
        ));
        assert!("-3s".parse::<Topology>().is_err());
    }

    #[test]
    fn test_rejects_empty_width() {
        assert!("5ss".parse::<Topology>().is_err());
        assert!("s".parse::<Topology>().is_err());
        assert!("".parse::<Topology>().is_err());
    }

    #[test]
    fn test_rejects_missing_delimiter() {
        assert!("5".parse::<Topology>().is_err());
        assert!("5s5".parse::<Topology>().is_err());
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!("0s".parse::<Topology>().is_err());
    }
}
