//! Reliability rating
//!
//! Admins grade each client from 0 to 5 stars. New clients start at 3.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CustomerError;

/// A 0-5 star rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ReliabilityScore(u8);

impl ReliabilityScore {
    pub const MAX: u8 = 5;

    pub fn new(score: i32) -> Result<Self, CustomerError> {
        if (0..=Self::MAX as i32).contains(&score) {
            Ok(Self(score as u8))
        } else {
            Err(CustomerError::InvalidReliability(score))
        }
    }

    /// Clamps out-of-range stored values instead of failing
    pub fn saturating(score: i32) -> Self {
        Self(score.clamp(0, Self::MAX as i32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// One flag per star, filled first
    pub fn stars(&self) -> [bool; 5] {
        let mut stars = [false; 5];
        for star in stars.iter_mut().take(self.0 as usize) {
            *star = true;
        }
        stars
    }
}

impl Default for ReliabilityScore {
    fn default() -> Self {
        Self(3)
    }
}

impl fmt::Display for ReliabilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for filled in self.stars() {
            f.write_str(if filled { "★" } else { "☆" })?;
        }
        Ok(())
    }
}

impl TryFrom<i32> for ReliabilityScore {
    type Error = CustomerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReliabilityScore> for i32 {
    fn from(score: ReliabilityScore) -> i32 {
        score.0 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_stars() {
        let score = ReliabilityScore::default();
        assert_eq!(score.value(), 3);
        assert_eq!(score.to_string(), "★★★☆☆");
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(ReliabilityScore::new(6).is_err());
        assert!(ReliabilityScore::new(-1).is_err());
        assert_eq!(ReliabilityScore::saturating(9).value(), 5);
    }

    #[test]
    fn test_serde_as_integer() {
        let score = ReliabilityScore::new(4).unwrap();
        assert_eq!(serde_json::to_string(&score).unwrap(), "4");
        assert!(serde_json::from_str::<ReliabilityScore>("7").is_err());
    }
}
