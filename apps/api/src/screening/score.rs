//! Resume scoring — pluggable, trait-based scorer measuring a parsed resume
//! against a job posting.
//!
//! Default: `LexicalScorer` (pure-Rust, deterministic, fully testable): a
//! weighted blend of must-have coverage, TF-IDF cosine similarity, fuzzy
//! nice-to-have matching, an experience factor, and a bucket-weighted skill
//! boost. `AppState` holds an `Arc<dyn ResumeScorer>`, so a semantic backend
//! can be swapped in without touching handlers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::errors::AppError;
use crate::screening::parse::{bucket_skills, detect_role_bucket, ParsedResume};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Sub-scores, each in [0, 1], rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub must_cov: f64,
    pub similarity: f64,
    pub fuzzy: f64,
    pub experience: f64,
    pub weighted: f64,
}

/// Full analysis stored with each ranking and returned to the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Overall score, 0–100, one decimal.
    pub accuracy: f64,
    pub bucket: String,
    pub components: Components,
    pub skills: Vec<String>,
}

/// Everything the scorer needs to know about the job side.
#[derive(Debug, Clone)]
pub struct JobContext<'a> {
    pub company: &'a str,
    pub role: &'a str,
    pub jd_text: &'a str,
    pub must_have: &'a [String],
    pub nice_to_have: &'a [String],
    pub min_exp_years: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(
        &self,
        job: &JobContext<'_>,
        resume: &ParsedResume,
        full_text: &str,
    ) -> Result<Analysis, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LexicalScorer — the default backend
// ────────────────────────────────────────────────────────────────────────────

/// Blend weights: must-coverage dominates, similarity second.
const W_MUST: f64 = 0.42;
const W_SIM: f64 = 0.28;
const W_FUZZY: f64 = 0.15;
const W_EXP: f64 = 0.10;
const W_WEIGHTED: f64 = 0.05;

/// Boosted skills count 1.25× in the weighted component.
const BOOST: f64 = 1.25;

pub struct LexicalScorer;

#[async_trait]
impl ResumeScorer for LexicalScorer {
    async fn score(
        &self,
        job: &JobContext<'_>,
        resume: &ParsedResume,
        full_text: &str,
    ) -> Result<Analysis, AppError> {
        Ok(compute_analysis(job, resume, full_text))
    }
}

fn compute_analysis(job: &JobContext<'_>, resume: &ParsedResume, full_text: &str) -> Analysis {
    let bucket = detect_role_bucket(job.role, job.jd_text);
    let dynamic_skills = bucket_skills(bucket);

    let must: Vec<String> = job
        .must_have
        .iter()
        .map(|m| m.trim().to_lowercase())
        .collect();
    let nice: Vec<String> = job
        .nice_to_have
        .iter()
        .map(|n| n.trim().to_lowercase())
        .collect();
    let skills: BTreeSet<String> = resume.skills.iter().map(|s| s.to_lowercase()).collect();

    let must_cov = if must.is_empty() {
        0.0
    } else {
        must.iter().filter(|m| skills.contains(*m)).count() as f64 / must.len() as f64
    };

    let similarity = tfidf_cosine(job.jd_text, full_text);

    let mut fuzzy_keywords = nice.clone();
    fuzzy_keywords.extend(dynamic_skills.iter().take(5).map(|s| s.to_string()));
    let fuzzy = fuzzy_keyword_score(&fuzzy_keywords, full_text);

    let experience = if job.min_exp_years == 0.0 {
        1.0
    } else {
        (resume.years_exp / job.min_exp_years).min(1.0)
    };

    let weighted = weighted_skill_component(&skills, dynamic_skills, job.company, job.role);

    let internal = W_MUST * must_cov
        + W_SIM * similarity
        + W_FUZZY * fuzzy
        + W_EXP * experience
        + W_WEIGHTED * weighted;

    Analysis {
        accuracy: normalize_0_100(internal),
        bucket: bucket.to_string(),
        components: Components {
            must_cov: round3(must_cov),
            similarity: round3(similarity),
            fuzzy: round3(fuzzy),
            experience: round3(experience),
            weighted: round3(weighted),
        },
        skills: resume.skills.clone(),
    }
}

/// Normalized weighted-skill sub-score: detected skills touching a bucket,
/// company, or role term count 1.25×; the mean is renormalized by the boost
/// so the component stays in [0, 1].
fn weighted_skill_component(
    skills: &BTreeSet<String>,
    dynamic_skills: &[&str],
    company: &str,
    role: &str,
) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }

    let mut boost_terms: BTreeSet<String> =
        dynamic_skills.iter().map(|s| s.to_lowercase()).collect();
    boost_terms.insert(company.to_lowercase());
    boost_terms.insert(role.to_lowercase());
    boost_terms.retain(|t| !t.is_empty());

    let weighted_sum: f64 = skills
        .iter()
        .map(|skill| {
            if boost_terms.iter().any(|term| skill.contains(term)) {
                BOOST
            } else {
                1.0
            }
        })
        .sum();

    (weighted_sum / skills.len() as f64 / BOOST).min(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// TF-IDF cosine similarity
// ────────────────────────────────────────────────────────────────────────────

/// Minimal English stop-word list; enough to keep glue words from dominating
/// a two-document comparison.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to", "was", "we",
    "were", "will", "with", "you", "your",
];

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '+' || c == '#' || c == '/'))
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() >= 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Cosine similarity between TF-IDF vectors of the two texts, clamped to
/// [0, 1]. Smoothed IDF over the two-document corpus.
fn tfidf_cosine(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let counts = |tokens: &[String]| -> HashMap<String, f64> {
        let mut map = HashMap::new();
        for t in tokens {
            *map.entry(t.clone()).or_insert(0.0) += 1.0;
        }
        map
    };
    let tf_a = counts(&tokens_a);
    let tf_b = counts(&tokens_b);

    let vocab: BTreeSet<&String> = tf_a.keys().chain(tf_b.keys()).collect();
    let n_docs = 2.0;

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in vocab {
        let df = tf_a.contains_key(term) as u8 + tf_b.contains_key(term) as u8;
        let idf = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
        let wa = tf_a.get(term).copied().unwrap_or(0.0) * idf;
        let wb = tf_b.get(term).copied().unwrap_or(0.0) * idf;
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Fuzzy keyword matching
// ────────────────────────────────────────────────────────────────────────────

/// Mean best-window similarity of each keyword against the text. A direct
/// substring hit scores 1.0; otherwise the best Jaro-Winkler over word
/// windows of the keyword's length.
fn fuzzy_keyword_score(keywords: &[String], text: &str) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let text_low = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let words: Vec<&str> = text_low.split(' ').filter(|w| !w.is_empty()).collect();

    let total: f64 = keywords
        .iter()
        .map(|kw| best_window_similarity(&kw.trim().to_lowercase(), &text_low, &words))
        .sum();
    total / keywords.len() as f64
}

fn best_window_similarity(keyword: &str, text_low: &str, words: &[&str]) -> f64 {
    if keyword.is_empty() {
        return 0.0;
    }
    if text_low.contains(keyword) {
        return 1.0;
    }
    let k = keyword.split_whitespace().count().max(1);
    if words.is_empty() {
        return 0.0;
    }
    if words.len() < k {
        return strsim::jaro_winkler(keyword, &words.join(" "));
    }
    words
        .windows(k)
        .map(|w| strsim::jaro_winkler(keyword, &w.join(" ")))
        .fold(0.0, f64::max)
}

// ────────────────────────────────────────────────────────────────────────────
// Rounding helpers
// ────────────────────────────────────────────────────────────────────────────

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn normalize_0_100(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 1000.0).round() / 10.0
}
