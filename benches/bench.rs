//! Criterion benchmarks for the ledger tagger.
//!
//! - Text analysis of ledger narratives
//! - Model training
//! - Single and bulk suggestion

use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ledger_tagger::analysis::analyzer::Analyzer;
use ledger_tagger::analysis::analyzer::ledger::LedgerAnalyzer;
use ledger_tagger::ledger::{Amount, Priority, TrainingExample, TransactionRecord};
use ledger_tagger::recommender::{RecommenderConfig, TagRecommender};

const VOCABULARY: &[(&str, &str)] = &[
    ("huur", "zaalhuur sporthal gymzaal maand"),
    ("contributie-jeugd", "contributie jeugd seizoen lid"),
    ("contributie-volwassenen", "contributie volwassenen seizoen lid"),
    ("boodschappen", "boodschappen kantine supermarkt week"),
    ("verzekering", "premie polis aansprakelijkheid ongevallen"),
    ("materiaal", "ballen pionnen hesjes doelen"),
    ("evenement", "toernooi feest jubileum catering"),
    ("bankkosten", "kosten betaalpakket rente transacties"),
];

/// Generate tagged examples for benchmarking.
fn generate_corpus(count: usize) -> Vec<TrainingExample> {
    (0..count)
        .map(|i| {
            let (tag, words) = VOCABULARY[i % VOCABULARY.len()];
            let words: Vec<&str> = words.split(' ').collect();
            let text = format!("{} {} {}", words[i % 4], words[(i + 1) % 4], i % 97);
            let record = TransactionRecord::new(
                NaiveDate::from_ymd_opt(2024, (i % 12) as u32 + 1, 1).unwrap(),
                Amount::Signed(-((i % 500) as f64) - 1.0),
            )
            .with_counterparty(format!("Partij {}", i % 40), format!("NL{:02}BANK{:010}", i % 90, i % 40))
            .with_narrative(text)
            .with_field("tegenrekening", format!("NL{:02}BANK{:010}", i % 90, i % 40), Priority::Low);
            TrainingExample::new(record, tag)
        })
        .collect()
}

fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");
    let analyzer = LedgerAnalyzer::features(Vec::<String>::new()).unwrap();
    let narrative = "Zaalhuur sporthal De Kroon maart 2024 factuur 1043 Gemeente Utrecht";

    group.bench_function("analyze_narrative", |b| {
        b.iter(|| black_box(analyzer.terms(black_box(narrative)).unwrap()))
    });

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);
    let corpus = generate_corpus(1000);

    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.bench_function("train_1000_examples", |b| {
        let recommender = TagRecommender::new(RecommenderConfig::default()).unwrap();
        b.iter(|| black_box(recommender.train(black_box(&corpus), None).unwrap()))
    });

    group.finish();
}

fn bench_suggest(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggest");
    let recommender = TagRecommender::new(RecommenderConfig::default()).unwrap();
    recommender.train(&generate_corpus(1000), None).unwrap();

    let queries: Vec<TransactionRecord> = generate_corpus(200).into_iter().map(|e| e.record).collect();

    group.bench_function("suggest_single", |b| {
        b.iter(|| black_box(recommender.suggest(black_box(&queries[0]))))
    });

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("suggest_many", |b| {
        b.iter(|| black_box(recommender.suggest_many(black_box(&queries))))
    });

    group.finish();
}

criterion_group!(benches, bench_text_analysis, bench_training, bench_suggest);
criterion_main!(benches);
