use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::NaiveDate;

use ledger_tagger::error::Result;
use ledger_tagger::ledger::{Amount, TrainingExample, TransactionRecord};
use ledger_tagger::recommender::{InMemoryCorpus, RecommenderConfig, TagRecommender};

fn record(text: &str, counterparty: &str, amount: f64) -> TransactionRecord {
    TransactionRecord::new(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(), Amount::Signed(amount))
        .with_counterparty(counterparty, format!("NL00{}", counterparty.to_uppercase().replace(' ', "")))
        .with_narrative(text)
}

fn corpus_a() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(record("zaalhuur sporthal", "Gemeente", -450.0), "huur"),
        TrainingExample::new(record("zaalhuur gymzaal", "Gemeente", -300.0), "huur"),
        TrainingExample::new(record("premie polis", "Verzekeraar", -90.0), "verzekering"),
        TrainingExample::new(record("premie ongevallen", "Verzekeraar", -80.0), "verzekering"),
    ]
}

fn corpus_b() -> Vec<TrainingExample> {
    let mut corpus = corpus_a();
    corpus.push(TrainingExample::new(record("ballen pionnen", "Sportshop", -60.0), "materiaal"));
    corpus.push(TrainingExample::new(record("hesjes ballen", "Sportshop", -45.0), "materiaal"));
    corpus.push(TrainingExample::new(record("kosten betaalpakket", "Bank", -3.0), "bankkosten"));
    corpus
}

#[test]
fn queries_never_observe_partial_models() -> Result<()> {
    let config = RecommenderConfig::default();
    let recommender = Arc::new(TagRecommender::new(config.clone())?);
    recommender.train(&corpus_a(), None)?;

    let done = AtomicBool::new(false);
    let queries = vec![
        record("zaalhuur oktober", "Gemeente", -450.0),
        record("premie polis 2025", "Verzekeraar", -90.0),
        record("nieuwe ballen", "Sportshop", -50.0),
        record("qwerty", "Onbekend", -1.0),
    ];

    thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..6 {
                let corpus = if round % 2 == 0 { corpus_b() } else { corpus_a() };
                recommender.train(&corpus, None).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        for _ in 0..4 {
            scope.spawn(|| {
                let mut rounds = 0;
                while !done.load(Ordering::SeqCst) || rounds < 10 {
                    for query in &queries {
                        let suggestions = recommender.suggest(query);
                        assert!(suggestions.len() <= config.top_k);
                        for suggestion in &suggestions {
                            assert!(config.is_allowed(&suggestion.tag));
                            assert!((0.0..=1.0).contains(&suggestion.confidence));
                        }
                        assert!(
                            suggestions
                                .windows(2)
                                .all(|pair| pair[0].confidence >= pair[1].confidence)
                        );
                    }
                    rounds += 1;
                }
            });
        }
    });

    // The last round trained on corpus A.
    let model = recommender.model().unwrap();
    assert_eq!(model.labels().len(), 2);
    Ok(())
}

#[test]
fn reload_and_suggest_many_interleave() -> Result<()> {
    let source = Arc::new(InMemoryCorpus::new(corpus_a()));
    let recommender = TagRecommender::new(RecommenderConfig::default())?
        .with_corpus_source(source.clone());
    recommender.reload()?;

    let batch: Vec<TransactionRecord> = (0..64)
        .map(|i| {
            if i % 2 == 0 {
                record("zaalhuur sporthal", "Gemeente", -450.0)
            } else {
                record("premie polis", "Verzekeraar", -90.0)
            }
        })
        .collect();

    thread::scope(|scope| {
        scope.spawn(|| {
            source.replace(corpus_b());
            recommender.reload().unwrap();
            source.replace(corpus_a());
            recommender.reload().unwrap();
        });

        scope.spawn(|| {
            for _ in 0..5 {
                let results = recommender.suggest_many(&batch);
                assert_eq!(results.len(), batch.len());
                for (i, suggestions) in results.iter().enumerate() {
                    let expected = if i % 2 == 0 { "huur" } else { "verzekering" };
                    assert_eq!(suggestions[0].tag, expected);
                }
            }
        });
    });
    Ok(())
}
