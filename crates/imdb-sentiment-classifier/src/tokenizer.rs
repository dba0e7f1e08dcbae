//! Tokenizer construction for BERT-style vocabularies

use imdb_sentiment_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{
    PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection,
    TruncationParams, TruncationStrategy,
};

const PAD_TOKEN: &str = "[PAD]";
const UNK_TOKEN: &str = "[UNK]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";

/// Where the tokenizer definition comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerSource {
    /// Serialized `tokenizer.json`
    Json(PathBuf),
    /// Plain WordPiece `vocab.txt`, one token per line
    Vocab(PathBuf),
}

impl TokenizerSource {
    /// Pick the tokenizer file inside a model directory.
    /// `tokenizer.json` wins over `vocab.txt`.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let json = dir.join("tokenizer.json");
        if json.exists() {
            return Some(Self::Json(json));
        }

        let vocab = dir.join("vocab.txt");
        if vocab.exists() {
            return Some(Self::Vocab(vocab));
        }

        None
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Json(path) | Self::Vocab(path) => path,
        }
    }
}

/// Load a tokenizer and fix its window: right truncation to `max_length`
/// and padding to exactly `max_length`.
pub fn load_tokenizer(source: &TokenizerSource, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = match source {
        TokenizerSource::Json(path) => {
            tracing::debug!("Loading tokenizer from {}", path.display());
            Tokenizer::from_file(path).map_err(|e| {
                Error::load(format!("Failed to load {}: {}", path.display(), e))
            })?
        }
        TokenizerSource::Vocab(path) => {
            tracing::debug!("Building WordPiece tokenizer from {}", path.display());
            build_wordpiece_tokenizer(path)?
        }
    };

    apply_window(&mut tokenizer, max_length)?;
    Ok(tokenizer)
}

/// Clone of `tokenizer` with truncation and padding removed, used to
/// measure the full length of an input
pub fn unbounded(tokenizer: &Tokenizer) -> Result<Tokenizer> {
    let mut counting = tokenizer.clone();
    counting
        .with_truncation(None)
        .map_err(|e| Error::load(format!("Failed to disable truncation: {}", e)))?;
    counting.with_padding(None);
    Ok(counting)
}

fn build_wordpiece_tokenizer(vocab_path: &Path) -> Result<Tokenizer> {
    let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
        .unk_token(UNK_TOKEN.to_string())
        .build()
        .map_err(|e| Error::load(format!("Failed to build WordPiece model: {}", e)))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

    let cls = special_token_id(&tokenizer, CLS_TOKEN)?;
    let sep = special_token_id(&tokenizer, SEP_TOKEN)?;
    tokenizer.with_post_processor(Some(BertProcessing::new(
        (SEP_TOKEN.to_string(), sep),
        (CLS_TOKEN.to_string(), cls),
    )));

    Ok(tokenizer)
}

fn special_token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| Error::load(format!("Vocabulary has no {} token", token)))
}

fn apply_window(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    let pad_id = special_token_id(tokenizer, PAD_TOKEN)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            strategy: TruncationStrategy::LongestFirst,
            stride: 0,
            direction: TruncationDirection::Right,
        }))
        .map_err(|e| Error::load(format!("Failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::Fixed(max_length),
        direction: PaddingDirection::Right,
        pad_id,
        pad_token: PAD_TOKEN.to_string(),
        ..Default::default()
    }));

    Ok(())
}
