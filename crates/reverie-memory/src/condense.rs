// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical condensation of recent entries into durable insight statements.
//!
//! Distillation folds a batch of entries into a handful of statements that
//! capture recurring themes. Statements are scored by mean corpus term
//! frequency (recurring topics rank first) and near-duplicates are merged
//! via token overlap, using the same tokenizer as the relevance scorer.

use std::collections::{BTreeSet, HashMap};

use reverie_core::types::ArtifactEntry;

use crate::types::token_set;

/// Token-overlap ratio above which two statements are considered the same
/// insight.
const DUPLICATE_OVERLAP: f64 = 0.6;

/// Condense a batch of entries into at most `max_insights` statements.
///
/// Deterministic: identical input always produces identical output, and
/// re-running on an empty batch yields an empty result.
pub fn condense_entries(entries: &[ArtifactEntry], max_insights: usize) -> Vec<String> {
    if entries.is_empty() || max_insights == 0 {
        return Vec::new();
    }

    let statements: Vec<(String, BTreeSet<String>)> = entries
        .iter()
        .flat_map(|e| split_statements(&e.content))
        .map(|s| {
            let tokens = token_set(&s);
            (s, tokens)
        })
        .filter(|(_, tokens)| tokens.len() >= 2)
        .collect();

    if statements.is_empty() {
        return Vec::new();
    }

    // Corpus term frequencies over every statement.
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for (_, tokens) in &statements {
        for token in tokens {
            *frequency.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    // Salience: mean frequency of a statement's tokens. Statements about
    // recurring themes score above one-off remarks.
    let mut ranked: Vec<(usize, f64)> = statements
        .iter()
        .enumerate()
        .map(|(i, (_, tokens))| {
            let total: usize = tokens
                .iter()
                .map(|t| frequency.get(t.as_str()).copied().unwrap_or(0))
                .sum();
            (i, total as f64 / tokens.len() as f64)
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut insights: Vec<String> = Vec::new();
    let mut selected_tokens: Vec<&BTreeSet<String>> = Vec::new();
    for (index, _) in ranked {
        let (statement, tokens) = &statements[index];
        let duplicate = selected_tokens
            .iter()
            .any(|prior| overlap(tokens, prior) > DUPLICATE_OVERLAP);
        if duplicate {
            continue;
        }
        insights.push(statement.clone());
        selected_tokens.push(tokens);
        if insights.len() >= max_insights {
            break;
        }
    }
    insights
}

/// Split entry content into candidate statements on sentence and line
/// boundaries.
fn split_statements(content: &str) -> Vec<String> {
    content
        .split(['\n', '.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_start_matches(['-', '*', ' ']).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Jaccard overlap of two token sets.
fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
