//! ONNX token-classification recognizer (BIO tagging).
//!
//! Runs a BERT-style token classifier through `bibr-inference`: greedy
//! wordpiece tokenization against a vocabulary file, one forward pass,
//! then BIO decoding of the logits back onto word spans.

use std::collections::HashMap;

use tracing::{debug, info};

use bibr_inference::{InferenceBackend, InputTensor};

use crate::error::NerError;

use super::{EntityLabel, EntityRecognizer, NamedEntity};

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const UNK_TOKEN: &str = "[UNK]";
const PAD_TOKEN: &str = "[PAD]";

/// Entity recognizer backed by an ONNX token-classification model.
///
/// Expensive to construct, cheap to call. `Send + Sync` because the
/// underlying session serializes access internally.
pub struct TokenClassifier {
    backend: Box<dyn InferenceBackend>,
    vocab: HashMap<String, i64>,
    labels: Vec<String>,
    max_seq_len: usize,
    cls_id: i64,
    sep_id: i64,
    unk_id: i64,
    pad_id: i64,
}

impl TokenClassifier {
    /// Create a classifier from an already-loaded backend plus the
    /// contents of the vocabulary and label files.
    ///
    /// The vocabulary is one wordpiece per line (line number = token id).
    /// The label file is one BIO tag per line (line number = class index).
    pub fn new(
        backend: Box<dyn InferenceBackend>,
        vocab_text: &str,
        labels_text: &str,
        max_seq_len: usize,
    ) -> Result<Self, NerError> {
        let vocab: HashMap<String, i64> = vocab_text
            .lines()
            .enumerate()
            .map(|(idx, line)| (line.trim().to_string(), idx as i64))
            .collect();

        if vocab.is_empty() {
            return Err(NerError::Vocab("vocabulary file is empty".to_string()));
        }

        let labels: Vec<String> = labels_text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        if labels.is_empty() {
            return Err(NerError::Labels("label file is empty".to_string()));
        }

        let special = |token: &str| {
            vocab
                .get(token)
                .copied()
                .ok_or_else(|| NerError::Vocab(format!("missing special token {}", token)))
        };

        let cls_id = special(CLS_TOKEN)?;
        let sep_id = special(SEP_TOKEN)?;
        let unk_id = special(UNK_TOKEN)?;
        let pad_id = special(PAD_TOKEN)?;

        info!(
            "Token classifier ready: {} wordpieces, {} labels",
            vocab.len(),
            labels.len()
        );

        Ok(Self {
            backend,
            vocab,
            labels,
            max_seq_len,
            cls_id,
            sep_id,
            unk_id,
            pad_id,
        })
    }

    /// Load a classifier from model files in a directory.
    ///
    /// Expects `ner.onnx`, `vocab.txt` and `labels.txt` unless other
    /// names are passed.
    #[cfg(feature = "native")]
    pub fn from_dir(
        model_dir: &std::path::Path,
        config: &crate::models::config::ModelConfig,
        max_seq_len: usize,
    ) -> Result<Self, NerError> {
        let backend = bibr_inference::OrtBackend::from_file(model_dir.join(&config.ner_model))
            .map_err(|e| NerError::ModelLoad(e.to_string()))?;

        let vocab_text = std::fs::read_to_string(model_dir.join(&config.ner_vocab))
            .map_err(|e| NerError::Vocab(e.to_string()))?;
        let labels_text = std::fs::read_to_string(model_dir.join(&config.ner_labels))
            .map_err(|e| NerError::Labels(e.to_string()))?;

        Self::new(Box::new(backend), &vocab_text, &labels_text, max_seq_len)
    }

    /// Greedy longest-match wordpiece tokenization of a single word.
    fn wordpiece(&self, word: &str) -> Vec<i64> {
        let lower = word.to_lowercase();
        let chars: Vec<char> = lower.chars().collect();
        let mut ids = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;

            while end > start {
                let mut piece: String = chars[start..end].iter().collect();
                if start > 0 {
                    piece = format!("##{}", piece);
                }
                if let Some(&id) = self.vocab.get(&piece) {
                    found = Some((id, end));
                    break;
                }
                end -= 1;
            }

            match found {
                Some((id, next)) => {
                    ids.push(id);
                    start = next;
                }
                // A word with any untokenizable remainder collapses to
                // a single [UNK], matching the reference tokenizer.
                None => return vec![self.unk_id],
            }
        }

        ids
    }

    fn label_kind(&self, index: usize) -> Option<(bool, EntityLabel)> {
        let tag = self.labels.get(index)?;
        let (prefix, name) = tag.split_once('-')?;
        let begin = prefix == "B";
        let label = match name {
            "PER" | "PERSON" => EntityLabel::Person,
            "DATE" => EntityLabel::Date,
            _ => return None,
        };
        Some((begin, label))
    }
}

impl EntityRecognizer for TokenClassifier {
    fn backend_id(&self) -> &str {
        "onnx"
    }

    fn recognize(&self, text: &str) -> Result<Vec<NamedEntity>, NerError> {
        let words = words_with_offsets(text);
        if words.is_empty() {
            return Ok(Vec::new());
        }

        // [CLS] pieces... [SEP], tracking which word each head piece
        // belongs to. Words past the sequence budget are dropped.
        let mut input_ids: Vec<i64> = vec![self.cls_id];
        let mut word_heads: Vec<(usize, usize)> = Vec::new(); // (token pos, word idx)

        'words: for (word_idx, (_, _, word)) in words.iter().enumerate() {
            for (piece_idx, id) in self.wordpiece(word).into_iter().enumerate() {
                if input_ids.len() >= self.max_seq_len - 1 {
                    break 'words;
                }
                if piece_idx == 0 {
                    word_heads.push((input_ids.len(), word_idx));
                }
                input_ids.push(id);
            }
        }
        input_ids.push(self.sep_id);

        let used = input_ids.len();
        let mut attention_mask = vec![1i64; used];
        input_ids.resize(self.max_seq_len, self.pad_id);
        attention_mask.resize(self.max_seq_len, 0);

        debug!("Classifying {} words as {} tokens", words.len(), used);

        let shape = vec![1, self.max_seq_len];
        let mut inputs: Vec<(&str, InputTensor)> = Vec::new();
        for name in self.backend.input_names() {
            let tensor = if name.contains("input_ids") {
                InputTensor::from_i64(input_ids.clone(), shape.clone())
            } else if name.contains("attention_mask") {
                InputTensor::from_i64(attention_mask.clone(), shape.clone())
            } else if name.contains("token_type") {
                InputTensor::from_i64(vec![0; self.max_seq_len], shape.clone())
            } else {
                return Err(NerError::Recognition(format!(
                    "unexpected model input '{}'",
                    name
                )));
            };
            inputs.push((
                name.as_str(),
                tensor.map_err(|e| NerError::Recognition(e.to_string()))?,
            ));
        }

        let outputs = self
            .backend
            .run(&inputs)
            .map_err(|e| NerError::Recognition(e.to_string()))?;

        let logits = outputs
            .first()
            .and_then(|(_, tensor)| tensor.as_f32())
            .ok_or_else(|| NerError::Recognition("model produced no logits".to_string()))?;

        let dims = logits.shape();
        if dims.len() != 3 || dims[2] != self.labels.len() {
            return Err(NerError::Recognition(format!(
                "unexpected logits shape {:?} for {} labels",
                dims,
                self.labels.len()
            )));
        }

        // Argmax + softmax confidence per word-head token, then BIO
        // spans over consecutive words.
        let mut entities = Vec::new();
        let mut open: Option<(EntityLabel, usize, usize, Vec<f32>)> = None;

        for &(token_pos, word_idx) in &word_heads {
            let row: Vec<f32> = (0..self.labels.len())
                .map(|c| logits[[0, token_pos, c]])
                .collect();
            let (best, confidence) = argmax_softmax(&row);

            match self.label_kind(best) {
                Some((begin, label)) => {
                    let (word_start, word_end, _) = words[word_idx];
                    match &mut open {
                        Some((open_label, _, end, confs))
                            if !begin && *open_label == label =>
                        {
                            *end = word_end;
                            confs.push(confidence);
                        }
                        _ => {
                            if let Some(span) = open.take() {
                                entities.push(close_span(text, span));
                            }
                            open = Some((label, word_start, word_end, vec![confidence]));
                        }
                    }
                }
                None => {
                    if let Some(span) = open.take() {
                        entities.push(close_span(text, span));
                    }
                }
            }
        }

        if let Some(span) = open.take() {
            entities.push(close_span(text, span));
        }

        debug!("Token classifier found {} entities", entities.len());

        Ok(entities)
    }
}

fn close_span(text: &str, span: (EntityLabel, usize, usize, Vec<f32>)) -> NamedEntity {
    let (label, start, end, confs) = span;
    let confidence = confs.iter().sum::<f32>() / confs.len() as f32;
    NamedEntity {
        text: text[start..end].to_string(),
        label,
        start,
        end,
        confidence,
    }
}

fn argmax_softmax(row: &[f32]) -> (usize, f32) {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = row.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();

    let mut best = 0;
    for (idx, value) in row.iter().enumerate() {
        if *value > row[best] {
            best = idx;
        }
    }

    (best, exp[best] / sum)
}

/// Split text on whitespace, keeping byte offsets. Leading and trailing
/// punctuation is trimmed from each word so "Smith," tokenizes as
/// "smith" while offsets still cover only the letters.
fn words_with_offsets(text: &str) -> Vec<(usize, usize, &str)> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    let mut push = |s: usize, e: usize| {
        let raw = &text[s..e];
        let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            return;
        }
        let lead = raw.len() - raw.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
        let word_start = s + lead;
        words.push((word_start, word_start + trimmed.len(), trimmed));
    };

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                push(s, idx);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        push(s, text.len());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibr_inference::{InferenceError, OutputTensor};
    use ndarray::ArrayD;
    use pretty_assertions::assert_eq;

    const VOCAB: &str = "[PAD]\n[UNK]\n[CLS]\n[SEP]\njohn\nsmith\n2021\nwrote\nthis\n##s";
    const LABELS: &str = "O\nB-PER\nI-PER\nB-DATE\nI-DATE";

    /// Backend double emitting fixed per-token label indices.
    struct ScriptedBackend {
        input_names: Vec<String>,
        output_names: Vec<String>,
        tags: Vec<usize>,
        n_labels: usize,
    }

    impl ScriptedBackend {
        fn new(tags: Vec<usize>) -> Self {
            Self {
                input_names: vec!["input_ids".to_string(), "attention_mask".to_string()],
                output_names: vec!["logits".to_string()],
                tags,
                n_labels: 5,
            }
        }
    }

    impl InferenceBackend for ScriptedBackend {
        fn run(
            &self,
            inputs: &[(&str, InputTensor)],
        ) -> Result<Vec<(String, OutputTensor)>, InferenceError> {
            let seq = inputs[0].1.shape()[1];
            let mut data = vec![0.0f32; seq * self.n_labels];
            for (pos, tag) in self.tags.iter().enumerate() {
                data[pos * self.n_labels + tag] = 8.0;
            }
            let arr =
                ArrayD::from_shape_vec(ndarray::IxDyn(&[1, seq, self.n_labels]), data).unwrap();
            Ok(vec![("logits".to_string(), OutputTensor::Float32(arr))])
        }

        fn input_names(&self) -> &[String] {
            &self.input_names
        }

        fn output_names(&self) -> &[String] {
            &self.output_names
        }
    }

    fn classifier(tags: Vec<usize>) -> TokenClassifier {
        TokenClassifier::new(Box::new(ScriptedBackend::new(tags)), VOCAB, LABELS, 16).unwrap()
    }

    #[test]
    fn test_wordpiece_greedy() {
        let clf = classifier(vec![]);
        assert_eq!(clf.wordpiece("john"), vec![4]);
        assert_eq!(clf.wordpiece("johns"), vec![4, 9]);
        assert_eq!(clf.wordpiece("xyzzy"), vec![1]);
    }

    #[test]
    fn test_bio_span_decoding() {
        // Tokens: [CLS] john smith wrote this 2021 [SEP]
        // Tags per position: O B-PER I-PER O O B-DATE O
        let clf = classifier(vec![0, 1, 2, 0, 0, 3, 0]);
        let entities = clf.recognize("John Smith wrote this 2021").unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "John Smith");
        assert_eq!(entities[0].label, EntityLabel::Person);
        assert_eq!(entities[1].text, "2021");
        assert_eq!(entities[1].label, EntityLabel::Date);
    }

    #[test]
    fn test_punctuation_trimmed_from_words() {
        let words = words_with_offsets("by John Smith, 2021.");
        let texts: Vec<&str> = words.iter().map(|(_, _, w)| *w).collect();
        assert_eq!(texts, vec!["by", "John", "Smith", "2021"]);
    }

    #[test]
    fn test_empty_text_yields_no_entities() {
        let clf = classifier(vec![]);
        assert!(clf.recognize("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_special_tokens_rejected() {
        let err = TokenClassifier::new(
            Box::new(ScriptedBackend::new(vec![])),
            "just\nsome\nwords",
            LABELS,
            16,
        );
        assert!(err.is_err());
    }
}
