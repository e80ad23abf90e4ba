//! Current-affairs quiz built from the fetched headlines.
//!
//! Each question asks for the subject of a headline. The expected answer is
//! inferred from keywords in the headline; headlines with no recognizable
//! subject are skipped rather than given an arbitrary answer.

use std::collections::HashMap;

use crate::model::{Bucket, Buckets};

pub const TOPICS: [&str; 6] = [
    "Politics",
    "Economy",
    "Crime",
    "Technology",
    "Environment",
    "International",
];

/// Questions drawn from the head of each bucket.
pub const QUIZ_PER_BUCKET: usize = 10;

const OPTIONS_PER_QUESTION: usize = 4;

const KEYWORDS: [(&str, &[&str]); 6] = [
    (
        "Politics",
        &[
            "election", "elections", "minister", "ministers", "parliament", "party", "government",
            "vote", "votes", "congress", "bjp", "senate", "policy", "cabinet", "lok", "sabha",
            "assembly", "mp", "mla", "president", "pm",
        ],
    ),
    (
        "Economy",
        &[
            "economy", "economic", "market", "markets", "stock", "stocks", "gdp", "inflation",
            "rupee", "bank", "banks", "budget", "trade", "tax", "taxes", "prices", "rbi",
            "sensex", "nifty", "jobs", "investment",
        ],
    ),
    (
        "Crime",
        &[
            "police", "arrest", "arrested", "murder", "crime", "fraud", "theft", "killed",
            "accused", "court", "probe", "raid", "scam", "custody", "shooting",
        ],
    ),
    (
        "Technology",
        &[
            "tech", "technology", "ai", "software", "app", "apps", "cyber", "digital", "internet",
            "isro", "satellite", "smartphone", "startup", "chip", "chips", "robot",
        ],
    ),
    (
        "Environment",
        &[
            "climate", "weather", "rain", "rains", "flood", "floods", "pollution", "heatwave",
            "forest", "wildlife", "monsoon", "earthquake", "cyclone", "emissions", "drought",
        ],
    ),
    (
        "International",
        &[
            "foreign", "un", "summit", "war", "border", "embassy", "china", "pakistan", "ukraine",
            "russia", "israel", "gaza", "nato", "diplomatic", "bilateral", "global",
        ],
    ),
];

/// Infer the subject of a headline by counting topic keywords.
/// Ties go to the topic listed first in [`TOPICS`].
pub fn infer_topic(headline: &str) -> Option<&'static str> {
    let words: Vec<String> = headline
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    let mut best: Option<(&'static str, usize)> = None;
    for (topic, keywords) in KEYWORDS.iter() {
        let hits = words.iter().filter(|w| keywords.contains(&w.as_str())).count();
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((*topic, hits));
        }
    }
    best.map(|(topic, _)| topic)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub bucket: Bucket,
    pub headline: String,
    pub options: Vec<&'static str>,
    pub answer: &'static str,
}

impl Question {
    pub fn prompt(&self) -> String {
        format!("What is the main subject of this {} news?", self.bucket)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub number: usize,
    pub chosen: Option<String>,
    pub answer: &'static str,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub outcomes: Vec<Outcome>,
}

impl Quiz {
    /// Up to `per_bucket` questions from the head of each bucket.
    pub fn generate(buckets: &Buckets, per_bucket: usize) -> Self {
        let mut questions = Vec::new();

        for bucket in Bucket::ALL {
            for (index, item) in buckets.get(bucket).iter().take(per_bucket).enumerate() {
                let Some(answer) = infer_topic(&item.title) else {
                    continue;
                };
                let seed = questions.len();
                questions.push(Question {
                    id: format!("{}_{}", bucket.label().to_lowercase(), index),
                    bucket,
                    headline: item.title.clone(),
                    options: options_for(answer, seed),
                    answer,
                });
            }
        }

        Self { questions }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Score submitted answers, keyed by question id.
    pub fn grade(&self, answers: &HashMap<String, String>) -> QuizResult {
        let outcomes: Vec<Outcome> = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let chosen = answers.get(&q.id).cloned();
                Outcome {
                    number: i + 1,
                    correct: chosen.as_deref() == Some(q.answer),
                    chosen,
                    answer: q.answer,
                }
            })
            .collect();

        QuizResult {
            score: outcomes.iter().filter(|o| o.correct).count(),
            total: outcomes.len(),
            outcomes,
        }
    }
}

/// The answer plus three distractors, rotated by `seed` so the answer does
/// not always sit in the same slot.
fn options_for(answer: &'static str, seed: usize) -> Vec<&'static str> {
    let distractors: Vec<&'static str> = TOPICS.iter().copied().filter(|t| *t != answer).collect();
    let start = seed % distractors.len();
    let mut options: Vec<&'static str> = distractors
        .iter()
        .cycle()
        .skip(start)
        .take(OPTIONS_PER_QUESTION - 1)
        .copied()
        .collect();
    options.insert(seed % OPTIONS_PER_QUESTION, answer);
    options
}
