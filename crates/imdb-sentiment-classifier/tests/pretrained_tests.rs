//! Tests against the real fine-tuned IMDB weights.
//!
//! Run with `IMDB_SENTIMENT_WEIGHTS=/path/to/bert_imdb_state_dict.pt cargo test -- --ignored`.
//! The base model defaults to `bert-base-uncased` from the Hugging Face Hub
//! and can be pointed at a local directory with `IMDB_SENTIMENT_BASE`.

use imdb_sentiment_classifier::{load_model, ModelConfig, ModelHandle, Sentiment};

fn pretrained() -> ModelHandle {
    let weights = std::env::var("IMDB_SENTIMENT_WEIGHTS")
        .expect("IMDB_SENTIMENT_WEIGHTS must point at the fine-tuned weights");
    let base =
        std::env::var("IMDB_SENTIMENT_BASE").unwrap_or_else(|_| "bert-base-uncased".to_string());

    load_model(&ModelConfig::new(base, weights)).expect("Failed to load fine-tuned model")
}

#[test]
#[ignore = "requires fine-tuned IMDB weights"]
fn test_positive_review() {
    let model = pretrained();
    let prediction = model
        .predict("This movie was absolutely wonderful, a masterpiece!")
        .unwrap();

    assert_eq!(prediction.label, Sentiment::Positive);
    assert!(
        prediction.confidence > 0.6,
        "Expected confident positive, got {}",
        prediction.confidence
    );
}

#[test]
#[ignore = "requires fine-tuned IMDB weights"]
fn test_negative_review() {
    let model = pretrained();
    let prediction = model
        .predict("Terrible, boring, a complete waste of time.")
        .unwrap();

    assert_eq!(prediction.label, Sentiment::Negative);
    assert!(
        prediction.confidence > 0.6,
        "Expected confident negative, got {}",
        prediction.confidence
    );
}

#[test]
#[ignore = "requires fine-tuned IMDB weights"]
fn test_review_batch() {
    let model = pretrained();

    let test_cases = vec![
        ("One of the best films I have seen in years.", Sentiment::Positive),
        ("The acting was wooden and the plot made no sense.", Sentiment::Negative),
        ("A delightful, heartwarming story with a brilliant cast.", Sentiment::Positive),
        ("I walked out halfway through. Awful.", Sentiment::Negative),
    ];

    for (text, expected) in test_cases {
        let prediction = model.predict(text).unwrap();
        assert_eq!(
            prediction.label, expected,
            "Text '{}' expected {}, got {} (confidence: {})",
            text, expected, prediction.label, prediction.confidence
        );
    }
}
