//! # Dice Resolver
//!
//! Parsing and rolling of `NdM+B` dice notation.
//!
//! Every randomized stat in the game resolves through this module: weapon
//! damage, first-level hit points, and attack rolls. Expressions are parsed
//! once into a [`DiceExpr`] and rolled against an explicitly threaded random
//! source, so tests can inject deterministic sequences.

use crate::{DelverError, DelverResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed dice expression of the form `<count>d<sides>[+<bonus>]`.
///
/// `count` and `sides` are required and must be at least 1; the bonus is
/// optional and non-negative. Malformed expressions fail the parse; there
/// is no silent defaulting of any component.
///
/// # Examples
///
/// ```
/// use delver::DiceExpr;
///
/// let expr: DiceExpr = "2d6+3".parse().unwrap();
/// assert_eq!(expr.min(), 5);
/// assert_eq!(expr.max(), 15);
///
/// assert!("d6".parse::<DiceExpr>().is_err());
/// assert!("2d".parse::<DiceExpr>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    /// Number of dice rolled
    pub count: u32,
    /// Faces per die
    pub sides: u32,
    /// Flat bonus added to the sum
    pub bonus: u32,
}

impl DiceExpr {
    /// Creates an expression directly from its components.
    pub fn new(count: u32, sides: u32, bonus: u32) -> DelverResult<Self> {
        if count < 1 || sides < 1 {
            return Err(DelverError::Parse(format!(
                "dice expression requires count >= 1 and sides >= 1, got {}d{}",
                count, sides
            )));
        }
        Ok(Self {
            count,
            sides,
            bonus,
        })
    }

    /// Parses an expression from `NdM+B` notation.
    ///
    /// A parse failure is fatal to the calling operation and must be
    /// propagated, never defaulted away.
    pub fn parse(notation: &str) -> DelverResult<Self> {
        let trimmed = notation.trim();
        let (count_part, rest) = trimmed
            .split_once(['d', 'D'])
            .ok_or_else(|| DelverError::Parse(format!("missing 'd' in '{}'", notation)))?;

        let (sides_part, bonus_part) = match rest.split_once('+') {
            Some((sides, bonus)) => (sides, Some(bonus)),
            None => (rest, None),
        };

        let count: u32 = count_part
            .trim()
            .parse()
            .map_err(|_| DelverError::Parse(format!("invalid dice count in '{}'", notation)))?;
        let sides: u32 = sides_part
            .trim()
            .parse()
            .map_err(|_| DelverError::Parse(format!("invalid dice sides in '{}'", notation)))?;
        let bonus: u32 = match bonus_part {
            Some(part) => part
                .trim()
                .parse()
                .map_err(|_| DelverError::Parse(format!("invalid dice bonus in '{}'", notation)))?,
            None => 0,
        };

        Self::new(count, sides, bonus)
    }

    /// Rolls the expression: the sum of `count` independent uniform draws
    /// from `[1, sides]`, plus the bonus.
    pub fn roll(&self, rng: &mut StdRng) -> i32 {
        let mut total = self.bonus as i32;
        for _ in 0..self.count {
            total += rng.gen_range(1..=self.sides) as i32;
        }
        total
    }

    /// Smallest possible result.
    pub fn min(&self) -> i32 {
        (self.count + self.bonus) as i32
    }

    /// Largest possible result.
    pub fn max(&self) -> i32 {
        (self.count * self.sides + self.bonus) as i32
    }
}

impl FromStr for DiceExpr {
    type Err = DelverError;

    fn from_str(s: &str) -> DelverResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bonus > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.bonus)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}
