//! Personal records derived from workout history.
//!
//! Records are never stored. Every query folds the full history again, so a
//! deleted or imported session is reflected immediately.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{WorkoutSession, WorkoutSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepsAtWeight {
    pub reps: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise_key: String,
    pub highest_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reps_at_weight: Option<RepsAtWeight>,
    pub date: DateTime<Utc>,
}

impl PersonalRecord {
    fn from_set(exercise_key: String, set: &WorkoutSet, date: DateTime<Utc>) -> Self {
        Self {
            exercise_key,
            highest_weight: set.weight,
            max_reps_at_weight: Some(RepsAtWeight {
                reps: set.reps,
                weight: set.weight,
            }),
            date,
        }
    }

    /// Applies one lift to the record. Heavier always wins; at equal weight
    /// more reps win; an equal lift only refreshes the date when it is newer.
    fn apply(&mut self, set: &WorkoutSet, date: DateTime<Utc>) {
        if set.weight > self.highest_weight {
            self.highest_weight = set.weight;
            self.max_reps_at_weight = Some(RepsAtWeight {
                reps: set.reps,
                weight: set.weight,
            });
            self.date = date;
            return;
        }
        if set.weight < self.highest_weight {
            return;
        }

        match self.max_reps_at_weight {
            Some(best) if set.reps < best.reps => {}
            Some(best) if set.reps == best.reps => {
                if date > self.date {
                    self.date = date;
                }
            }
            _ => {
                self.max_reps_at_weight = Some(RepsAtWeight {
                    reps: set.reps,
                    weight: set.weight,
                });
                self.date = self.date.max(date);
            }
        }
    }
}

impl fmt::Display for PersonalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}kg", self.exercise_key, self.highest_weight)?;
        if let Some(best) = self.max_reps_at_weight {
            write!(f, " for {} reps at {}kg", best.reps, best.weight)?;
        }
        write!(f, " (achieved {})", self.date.format("%Y-%m-%d"))
    }
}

/// One record per exercise key, most recently achieved first.
///
/// Input order does not affect weights or reps. Sets with a weight of zero or
/// less are not lifts and never produce a record. Callers must not pass
/// negative or NaN values; the session validator rejects them.
pub fn personal_records(sessions: &[WorkoutSession]) -> Vec<PersonalRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<PersonalRecord> = Vec::new();

    for session in sessions {
        for exercise in &session.logged_exercises {
            let key = exercise.key();
            for set in exercise.sets.iter().filter(|s| s.weight > 0.0) {
                match index.get(&key).copied() {
                    Some(i) => records[i].apply(set, session.date),
                    None => {
                        index.insert(key.clone(), records.len());
                        records.push(PersonalRecord::from_set(key.clone(), set, session.date));
                    }
                }
            }
        }
    }

    // stable: equal dates keep first-seen order
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}
