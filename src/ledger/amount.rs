//! Amounts, booking direction and amount buckets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Booking direction as printed in the ledger's debit/credit ("Af/Bij") column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money leaving the account ("af").
    #[serde(alias = "af", alias = "Af", alias = "AF")]
    Debit,
    /// Money entering the account ("bij").
    #[serde(alias = "bij", alias = "Bij", alias = "BIJ")]
    Credit,
}

impl Direction {
    /// Feature token for this direction.
    pub fn token(&self) -> &'static str {
        match self {
            Direction::Debit => "direction=debit",
            Direction::Credit => "direction=credit",
        }
    }

    /// Parse the ledger's free-text debit/credit flag.
    pub fn parse(flag: &str) -> Option<Self> {
        match flag.trim().to_lowercase().as_str() {
            "af" | "debit" | "d" | "-" => Some(Direction::Debit),
            "bij" | "credit" | "c" | "+" => Some(Direction::Credit),
            _ => None,
        }
    }
}

/// Transaction amount: either signed, or a magnitude plus a direction flag.
///
/// The amount bucket is taken from the value as booked. A `Directed` debit
/// of 450 lands in `LARGE` while `Signed(-450.0)` lands in `NEG`, so a corpus
/// should stick to one form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// A signed amount; negative values are debits.
    Signed(f64),
    /// An amount as booked together with an explicit direction flag.
    Directed { value: f64, direction: Direction },
}

impl Amount {
    /// The booked value the amount bucket is computed from.
    pub fn value(&self) -> f64 {
        match self {
            Amount::Signed(value) => *value,
            Amount::Directed { value, .. } => *value,
        }
    }

    /// The booking direction; a signed amount below zero is a debit.
    pub fn direction(&self) -> Direction {
        match self {
            Amount::Signed(value) if *value < 0.0 => Direction::Debit,
            Amount::Signed(_) => Direction::Credit,
            Amount::Directed { direction, .. } => *direction,
        }
    }

    /// The amount bucket of the booked value.
    pub fn bucket(&self) -> AmountBucket {
        AmountBucket::from_value(self.value())
    }

    /// Whether the value is a usable number.
    pub fn is_finite(&self) -> bool {
        self.value().is_finite()
    }
}

/// Coarse amount ranges with inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AmountBucket {
    /// Below zero.
    Neg,
    /// `0 <= x < 10`
    Tiny,
    /// `10 <= x < 50`
    Small,
    /// `50 <= x < 200`
    Medium,
    /// `200 <= x < 1000`
    Large,
    /// `x >= 1000`
    XLarge,
}

impl AmountBucket {
    /// Bucket a value.
    pub fn from_value(value: f64) -> Self {
        if value < 0.0 {
            AmountBucket::Neg
        } else if value < 10.0 {
            AmountBucket::Tiny
        } else if value < 50.0 {
            AmountBucket::Small
        } else if value < 200.0 {
            AmountBucket::Medium
        } else if value < 1000.0 {
            AmountBucket::Large
        } else {
            AmountBucket::XLarge
        }
    }

    /// Short uppercase label.
    pub fn label(&self) -> &'static str {
        match self {
            AmountBucket::Neg => "NEG",
            AmountBucket::Tiny => "TINY",
            AmountBucket::Small => "SMALL",
            AmountBucket::Medium => "MEDIUM",
            AmountBucket::Large => "LARGE",
            AmountBucket::XLarge => "XLARGE",
        }
    }

    /// Feature token for this bucket.
    pub fn token(&self) -> &'static str {
        match self {
            AmountBucket::Neg => "amount=neg",
            AmountBucket::Tiny => "amount=tiny",
            AmountBucket::Small => "amount=small",
            AmountBucket::Medium => "amount=medium",
            AmountBucket::Large => "amount=large",
            AmountBucket::XLarge => "amount=xlarge",
        }
    }
}

impl fmt::Display for AmountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
