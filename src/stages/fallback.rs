//! Generic progression used when the completion model is unavailable.

use crate::stages::types::StagePrompt;

const INTENSITY: [&str; 5] = ["subtle", "moderate", "strong", "intense", "extreme"];
const DEVELOPMENT: [&str; 5] = ["beginning", "developing", "advanced", "mature", "complete"];

/// `count` stages ramping from subtle to extreme.
pub fn generic_progression(user_prompt: &str, count: u32) -> Vec<StagePrompt> {
    (0..count)
        .map(|index| {
            let progress = if count > 1 {
                f64::from(index) / f64::from(count - 1)
            } else {
                0.0
            };
            let intensity = INTENSITY[level(progress, INTENSITY.len())];
            let label = DEVELOPMENT[level(progress, DEVELOPMENT.len())];

            StagePrompt {
                stage: capitalize(label),
                prompt: format!("apply a {intensity} level of transformation: {user_prompt}"),
                stage_number: index + 1,
            }
        })
        .collect()
}

fn level(progress: f64, len: usize) -> usize {
    ((progress * (len - 1) as f64).floor() as usize).min(len - 1)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
