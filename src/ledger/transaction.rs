//! Transaction records and training examples.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::amount::Amount;

/// Weight class of a text field in the feature token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Narrative, description, counterparty name: emitted twice.
    #[default]
    High,
    /// Raw account numbers and codes: emitted once.
    Low,
}

impl Priority {
    /// How many copies of the field enter the token stream.
    pub fn repeat(&self) -> usize {
        match self {
            Priority::High => 2,
            Priority::Low => 1,
        }
    }
}

/// One free-text column of a ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    /// Column name as exported by the ledger ("mededelingen", "omschrijving").
    pub name: String,
    /// Raw text.
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
}

impl TextField {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, text: T, priority: Priority) -> Self {
        TextField {
            name: name.into(),
            text: text.into(),
            priority,
        }
    }

    /// Whether the field carries any usable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A bank or cash-book transaction.
///
/// `tag` is only present on historical rows that have already been tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub counterparty_name: String,
    /// Counterparty account id (usually an IBAN).
    #[serde(default)]
    pub counterparty_account: String,
    #[serde(default)]
    pub fields: Vec<TextField>,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl TransactionRecord {
    /// Create a record without counterparty, text or tag.
    pub fn new(date: NaiveDate, amount: Amount) -> Self {
        TransactionRecord {
            date,
            counterparty_name: String::new(),
            counterparty_account: String::new(),
            fields: Vec::new(),
            amount,
            tag: None,
        }
    }

    /// Set the counterparty name and account id.
    pub fn with_counterparty<N: Into<String>, A: Into<String>>(mut self, name: N, account: A) -> Self {
        self.counterparty_name = name.into();
        self.counterparty_account = account.into();
        self
    }

    /// Add a high-priority narrative ("mededelingen") field.
    pub fn with_narrative<T: Into<String>>(self, text: T) -> Self {
        self.with_field("mededelingen", text, Priority::High)
    }

    /// Add a text field.
    pub fn with_field<N: Into<String>, T: Into<String>>(
        mut self,
        name: N,
        text: T,
        priority: Priority,
    ) -> Self {
        self.fields.push(TextField::new(name, text, priority));
        self
    }

    /// Set the historical tag.
    pub fn with_tag<T: Into<String>>(mut self, tag: T) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether the counterparty name or any text field carries text.
    pub fn has_text(&self) -> bool {
        !self.counterparty_name.trim().is_empty() || self.fields.iter().any(|f| !f.is_blank())
    }

    /// Normalized counterparty account: no whitespace, upper case.
    pub fn account_key(&self) -> Option<String> {
        normalize_account(&self.counterparty_account)
    }

    /// Text fields of the given priority, in declaration order, skipping blanks.
    ///
    /// The counterparty name counts as a high-priority field and comes last.
    pub fn texts(&self, priority: Priority) -> Vec<&str> {
        let mut texts: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.priority == priority && !f.is_blank())
            .map(|f| f.text.trim())
            .collect();
        if priority == Priority::High && !self.counterparty_name.trim().is_empty() {
            texts.push(self.counterparty_name.trim());
        }
        texts
    }

    /// Why this record cannot be used as a query, if it cannot.
    pub fn query_defect(&self) -> Option<&'static str> {
        if !self.amount.is_finite() {
            Some("amount is not a finite number")
        } else if !self.has_text() && self.account_key().is_none() {
            Some("record has neither text fields nor a counterparty account")
        } else {
            None
        }
    }

    /// Why this record cannot be used for training, if it cannot.
    pub fn training_defect(&self) -> Option<&'static str> {
        if !self.amount.is_finite() {
            Some("amount is not a finite number")
        } else if !self.has_text() {
            Some("record has no non-blank text field")
        } else {
            None
        }
    }
}

/// Normalize a counterparty account id for keyed lookup.
pub fn normalize_account(account: &str) -> Option<String> {
    let key: String = account
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    if key.is_empty() { None } else { Some(key) }
}

/// A historical transaction together with its tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub tag: String,
}

impl TrainingExample {
    pub fn new<T: Into<String>>(mut record: TransactionRecord, tag: T) -> Self {
        record.tag = None;
        TrainingExample {
            record,
            tag: tag.into(),
        }
    }

    /// Convert a tagged record; untagged or blank-tagged records yield `None`.
    pub fn from_record(mut record: TransactionRecord) -> Option<Self> {
        let tag = record.tag.take()?;
        let tag = tag.trim();
        if tag.is_empty() {
            None
        } else {
            Some(TrainingExample::new(record, tag))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::amount::Direction;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_texts_by_priority() {
        let record = TransactionRecord::new(date(), Amount::Signed(-45.0))
            .with_counterparty("Sporthal De Kroon", "NL91 ABNA 0417 1643 00")
            .with_narrative("Zaalhuur maart")
            .with_field("tegenrekening", "NL91ABNA0417164300", Priority::Low)
            .with_field("memo", "   ", Priority::High);

        assert_eq!(
            record.texts(Priority::High),
            vec!["Zaalhuur maart", "Sporthal De Kroon"]
        );
        assert_eq!(record.texts(Priority::Low), vec!["NL91ABNA0417164300"]);
        assert_eq!(record.account_key().as_deref(), Some("NL91ABNA0417164300"));
    }

    #[test]
    fn test_defects() {
        let empty = TransactionRecord::new(date(), Amount::Signed(10.0));
        assert!(empty.query_defect().is_some());
        assert!(empty.training_defect().is_some());

        let account_only = empty.clone().with_counterparty("", "nl00bank000");
        assert!(account_only.query_defect().is_none());
        assert!(account_only.training_defect().is_some());

        let nan = TransactionRecord::new(date(), Amount::Signed(f64::NAN)).with_narrative("huur");
        assert!(nan.query_defect().is_some());
    }

    #[test]
    fn test_training_example_from_record() {
        let record = TransactionRecord::new(
            date(),
            Amount::Directed {
                value: 12.0,
                direction: Direction::Credit,
            },
        )
        .with_narrative("contributie")
        .with_tag(" contributie-jeugd ");

        let example = TrainingExample::from_record(record).unwrap();
        assert_eq!(example.tag, "contributie-jeugd");
        assert!(example.record.tag.is_none());

        let untagged = TransactionRecord::new(date(), Amount::Signed(1.0)).with_tag("  ");
        assert!(TrainingExample::from_record(untagged).is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{
            "date": "2024-03-01",
            "counterparty_name": "Gemeente",
            "counterparty_account": "NL00BANK000",
            "fields": [{"name": "mededelingen", "text": "huur gymzaal"}],
            "amount": {"value": 120.0, "direction": "af"},
            "tag": "huur"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.fields[0].priority, Priority::High);
        assert_eq!(record.amount.direction(), Direction::Debit);

        let example = TrainingExample::from_record(record).unwrap();
        let value = serde_json::to_value(&example).unwrap();
        assert_eq!(value["tag"], "huur");
        assert_eq!(value["counterparty_account"], "NL00BANK000");
    }
}
