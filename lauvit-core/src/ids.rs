use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

pub const SESSION_PREFIX: &str = "sess";
pub const LOGGED_EXERCISE_PREFIX: &str = "lex";
pub const CUSTOM_EXERCISE_PREFIX: &str = "custom";
pub const PLAN_PREFIX: &str = "plan";
pub const DAY_PREFIX: &str = "day";
pub const PLAN_EXERCISE_PREFIX: &str = "ex";
pub const BODY_RECORD_PREFIX: &str = "body";

/// `<prefix>_<unix millis>_<9 base36 chars>`
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}
