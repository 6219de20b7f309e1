//! Counterparty memory: the tag most often used for an account.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{TrainingExample, normalize_account};

#[derive(Debug, Default)]
struct TagTally {
    count: usize,
    last_seen: Option<NaiveDate>,
}

/// Maps normalized counterparty accounts to their dominant tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyIndex {
    tags: HashMap<String, String>,
}

impl CounterpartyIndex {
    /// Build the index from tagged examples.
    ///
    /// The dominant tag of an account is the most frequent one; ties go to the
    /// tag used most recently, then to the tag declared first in
    /// `allowed_tags`.
    pub fn build(examples: &[TrainingExample], allowed_tags: &[String]) -> Self {
        let mut tallies: HashMap<String, HashMap<&str, TagTally>> = HashMap::new();

        for example in examples {
            let Some(key) = example.record.account_key() else {
                continue;
            };
            let tally = tallies
                .entry(key)
                .or_default()
                .entry(example.tag.as_str())
                .or_default();
            tally.count += 1;
            tally.last_seen = tally.last_seen.max(Some(example.record.date));
        }

        let declared = |tag: &str| {
            allowed_tags
                .iter()
                .position(|t| t == tag)
                .unwrap_or(usize::MAX)
        };

        let tags = tallies
            .into_iter()
            .filter_map(|(account, per_tag)| {
                per_tag
                    .into_iter()
                    .max_by(|(tag_a, a), (tag_b, b)| {
                        a.count
                            .cmp(&b.count)
                            .then_with(|| a.last_seen.cmp(&b.last_seen))
                            .then_with(|| declared(*tag_b).cmp(&declared(*tag_a)))
                    })
                    .map(|(tag, _)| (account, tag.to_string()))
            })
            .collect();

        CounterpartyIndex { tags }
    }

    /// Dominant tag of an account, normalizing the account first.
    pub fn lookup(&self, account: &str) -> Option<&str> {
        normalize_account(account).and_then(|key| self.get(&key))
    }

    /// Dominant tag of an already normalized account key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Number of known accounts.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Amount, TransactionRecord};

    fn example(account: &str, day: u32, tag: &str) -> TrainingExample {
        let record = TransactionRecord::new(
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            Amount::Signed(-10.0),
        )
        .with_counterparty("Tegenpartij", account)
        .with_narrative("betaling");
        TrainingExample::new(record, tag)
    }

    fn tags() -> Vec<String> {
        ["huur", "materiaal", "overig"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_most_frequent_tag_wins() {
        let examples = vec![
            example("NL01BANK0001", 1, "huur"),
            example("nl01 bank 0001", 2, "huur"),
            example("NL01BANK0001", 3, "materiaal"),
        ];
        let index = CounterpartyIndex::build(&examples, &tags());

        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(" nl01bank0001 "), Some("huur"));
        assert_eq!(index.lookup("NL99BANK9999"), None);
        assert_eq!(index.lookup("   "), None);
    }

    #[test]
    fn test_ties_prefer_recent_then_declared() {
        let recent = vec![
            example("NL02BANK0002", 5, "materiaal"),
            example("NL02BANK0002", 4, "huur"),
        ];
        let index = CounterpartyIndex::build(&recent, &tags());
        assert_eq!(index.lookup("NL02BANK0002"), Some("materiaal"));

        let same_day = vec![
            example("NL03BANK0003", 4, "overig"),
            example("NL03BANK0003", 4, "materiaal"),
        ];
        let index = CounterpartyIndex::build(&same_day, &tags());
        assert_eq!(index.lookup("NL03BANK0003"), Some("materiaal"));
    }

    #[test]
    fn test_examples_without_account_are_skipped() {
        let examples = vec![example("", 1, "huur")];
        assert!(CounterpartyIndex::build(&examples, &tags()).is_empty());
    }
}
