//! Logged workout sessions and the draft used to record one.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LauvitError, Result};
use crate::ids::{CUSTOM_EXERCISE_PREFIX, generate_id};
use crate::plan::GymPlan;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub reps: u32,
    pub weight: f64,
}

impl WorkoutSet {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} reps @ {}kg", self.reps, self.weight)
    }
}

static SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*(?:x|×|\*)\s*(\d+(?:\.\d+)?)\s*(?:kg)?\s*$").unwrap()
});

impl FromStr for WorkoutSet {
    type Err = LauvitError;

    /// Parses `REPSxWEIGHT`, e.g. `5x100` or `8 x 22.5kg`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || LauvitError::validation(format!("invalid set {s:?}, expected REPSxWEIGHT"));
        let caps = SET_RE.captures(s).ok_or_else(invalid)?;
        let reps = caps[1].parse().map_err(|_| invalid())?;
        let weight = caps[2].parse().map_err(|_| invalid())?;
        Ok(WorkoutSet { reps, weight })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedExercise {
    #[serde(default)]
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    pub sets: Vec<WorkoutSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LoggedExercise {
    pub fn blank() -> Self {
        Self {
            exercise_id: generate_id(CUSTOM_EXERCISE_PREFIX),
            exercise_name: String::new(),
            variation: None,
            sets: vec![WorkoutSet::default()],
            notes: None,
        }
    }

    pub fn key(&self) -> String {
        exercise_key(&self.exercise_name, self.variation.as_deref())
    }
}

/// `"name"`, or `"name (variation)"` when a non-empty variation is present.
pub fn exercise_key(name: &str, variation: Option<&str>) -> String {
    match variation.filter(|v| !v.is_empty()) {
        Some(v) => format!("{} ({})", name, v),
        None => name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_day: Option<String>,
    pub logged_exercises: Vec<LoggedExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutSession {
    pub fn display_name(&self) -> &str {
        self.workout_day.as_deref().unwrap_or("General Workout")
    }
}

/// Editable session before it is logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub workout_day: Option<String>,
    pub logged_exercises: Vec<LoggedExercise>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SessionDraft {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            workout_day: None,
            logged_exercises: vec![LoggedExercise::blank()],
            notes: None,
        }
    }

    /// Prefills one logged exercise per target of the named plan day.
    ///
    /// Unknown days, and days without exercises, fall back to a single blank
    /// custom exercise.
    pub fn from_plan_day(plan: &GymPlan, day_name: &str, date: DateTime<Utc>) -> Self {
        let mut draft = Self::new(date);
        let Some(day) = plan.day(day_name) else {
            return draft;
        };

        draft.workout_day = Some(day.name.clone());
        if !day.exercises.is_empty() {
            draft.logged_exercises = day
                .exercises
                .iter()
                .map(|target| LoggedExercise {
                    exercise_id: target.id.clone(),
                    exercise_name: target.name.clone(),
                    variation: Some(target.variation.to_string()),
                    sets: vec![WorkoutSet::default(); target.sets.max(1) as usize],
                    notes: Some(target.target_note()),
                })
                .collect();
        }
        draft
    }

    pub fn add_exercise(&mut self) -> &mut LoggedExercise {
        self.logged_exercises.push(LoggedExercise::blank());
        let last = self.logged_exercises.len() - 1;
        &mut self.logged_exercises[last]
    }

    pub fn remove_exercise(&mut self, exercise: usize) -> Result<LoggedExercise> {
        self.check_exercise(exercise)?;
        if self.logged_exercises.len() == 1 {
            return Err(LauvitError::validation("must log at least one exercise"));
        }
        Ok(self.logged_exercises.remove(exercise))
    }

    pub fn add_set(&mut self, exercise: usize) -> Result<&mut WorkoutSet> {
        self.check_exercise(exercise)?;
        let sets = &mut self.logged_exercises[exercise].sets;
        sets.push(WorkoutSet::default());
        let last = sets.len() - 1;
        Ok(&mut sets[last])
    }

    pub fn remove_set(&mut self, exercise: usize, set: usize) -> Result<WorkoutSet> {
        self.check_exercise(exercise)?;
        let sets = &mut self.logged_exercises[exercise].sets;
        if set >= sets.len() {
            return Err(LauvitError::validation(format!("set index {set} out of range")));
        }
        if sets.len() == 1 {
            return Err(LauvitError::validation(
                "each exercise must have at least one set",
            ));
        }
        Ok(sets.remove(set))
    }

    fn check_exercise(&self, exercise: usize) -> Result<()> {
        if exercise >= self.logged_exercises.len() {
            return Err(LauvitError::validation(format!(
                "exercise index {exercise} out of range"
            )));
        }
        Ok(())
    }

    /// Rejects anything the record aggregator must never see.
    pub fn validate(self) -> Result<NewWorkoutSession> {
        if self.logged_exercises.is_empty() {
            return Err(LauvitError::validation("log at least one exercise"));
        }

        let mut logged_exercises = Vec::with_capacity(self.logged_exercises.len());
        for (idx, exercise) in self.logged_exercises.into_iter().enumerate() {
            let name = exercise.exercise_name.trim().to_string();
            if name.is_empty() {
                return Err(LauvitError::validation(format!(
                    "exercise {} needs a name",
                    idx + 1
                )));
            }
            if exercise.sets.is_empty() {
                return Err(LauvitError::validation(format!(
                    "{name}: add at least one set"
                )));
            }
            if let Some(bad) = exercise
                .sets
                .iter()
                .find(|s| !s.weight.is_finite() || s.weight < 0.0)
            {
                return Err(LauvitError::validation(format!(
                    "{name}: weight must be a non-negative number, got {}",
                    bad.weight
                )));
            }

            logged_exercises.push(LoggedExercise {
                exercise_id: if exercise.exercise_id.trim().is_empty() {
                    generate_id(CUSTOM_EXERCISE_PREFIX)
                } else {
                    exercise.exercise_id
                },
                exercise_name: name,
                variation: non_blank(exercise.variation),
                sets: exercise.sets,
                notes: non_blank(exercise.notes),
            });
        }

        Ok(NewWorkoutSession {
            date: self.date,
            workout_day: non_blank(self.workout_day),
            logged_exercises,
            notes: non_blank(self.notes),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A validated session ready to be appended to history.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutSession {
    pub date: DateTime<Utc>,
    pub workout_day: Option<String>,
    pub logged_exercises: Vec<LoggedExercise>,
    pub notes: Option<String>,
}

impl NewWorkoutSession {
    pub fn into_session(self, id: String) -> WorkoutSession {
        WorkoutSession {
            id,
            date: self.date,
            workout_day: self.workout_day,
            logged_exercises: self.logged_exercises,
            notes: self.notes,
        }
    }
}

impl From<WorkoutSession> for SessionDraft {
    fn from(session: WorkoutSession) -> Self {
        Self {
            date: session.date,
            workout_day: session.workout_day,
            logged_exercises: session.logged_exercises,
            notes: session.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ExerciseVariation, PlanDay, PlanExercise};
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn plan() -> GymPlan {
        GymPlan {
            id: "plan_1".into(),
            name: "Split".into(),
            description: None,
            is_active: true,
            days: vec![
                PlanDay {
                    id: "day_1".into(),
                    name: "Push".into(),
                    exercises: vec![PlanExercise {
                        id: "ex_1".into(),
                        name: "Bench Press".into(),
                        variation: ExerciseVariation::Barbell,
                        sets: 4,
                        reps: "6-8".into(),
                    }],
                },
                PlanDay {
                    id: "day_2".into(),
                    name: "Rest".into(),
                    exercises: vec![],
                },
            ],
            created_at: date(),
            updated_at: date(),
        }
    }

    #[test]
    fn key_ignores_empty_variation() {
        assert_eq!(exercise_key("Squat", None), "Squat");
        assert_eq!(exercise_key("Squat", Some("")), "Squat");
        assert_eq!(
            exercise_key("Bench Press", Some("Incline")),
            "Bench Press (Incline)"
        );
    }

    #[test]
    fn parses_set_shorthand() {
        assert_eq!("5x100".parse::<WorkoutSet>().unwrap(), WorkoutSet::new(5, 100.0));
        assert_eq!(
            " 8 X 22.5kg ".parse::<WorkoutSet>().unwrap(),
            WorkoutSet::new(8, 22.5)
        );
        assert!("heavy".parse::<WorkoutSet>().is_err());
        assert!("5x-10".parse::<WorkoutSet>().is_err());
    }

    #[test]
    fn prefill_from_plan_day() {
        let draft = SessionDraft::from_plan_day(&plan(), "Push", date());
        assert_eq!(draft.workout_day.as_deref(), Some("Push"));
        assert_eq!(draft.logged_exercises.len(), 1);

        let ex = &draft.logged_exercises[0];
        assert_eq!(ex.exercise_id, "ex_1");
        assert_eq!(ex.variation.as_deref(), Some("Barbell"));
        assert_eq!(ex.sets.len(), 4);
        assert!(ex.sets.iter().all(|s| *s == WorkoutSet::default()));
        assert_eq!(
            ex.notes.as_deref(),
            Some("Target: 4 sets of 6-8 reps. Variation: Barbell.")
        );
    }

    #[test]
    fn prefill_falls_back_to_blank_custom_exercise() {
        let empty_day = SessionDraft::from_plan_day(&plan(), "Rest", date());
        assert_eq!(empty_day.workout_day.as_deref(), Some("Rest"));
        assert_eq!(empty_day.logged_exercises.len(), 1);
        assert!(empty_day.logged_exercises[0].exercise_id.starts_with("custom_"));

        let unknown = SessionDraft::from_plan_day(&plan(), "Legs", date());
        assert_eq!(unknown.workout_day, None);
        assert_eq!(unknown.logged_exercises[0].sets.len(), 1);
    }

    #[test]
    fn editing_keeps_at_least_one_exercise_and_set() {
        let mut draft = SessionDraft::new(date());
        assert!(draft.remove_exercise(0).is_err());
        assert!(draft.remove_set(0, 0).is_err());

        draft.add_set(0).unwrap().reps = 5;
        assert_eq!(draft.logged_exercises[0].sets.len(), 2);
        assert_eq!(draft.remove_set(0, 1).unwrap().reps, 5);

        draft.add_exercise().exercise_name = "Row".into();
        assert_eq!(draft.remove_exercise(1).unwrap().exercise_name, "Row");
        assert!(draft.add_set(3).is_err());
        assert!(draft.remove_set(0, 9).is_err());
    }

    #[test]
    fn validate_normalizes_optional_text() {
        let mut draft = SessionDraft::new(date());
        draft.workout_day = Some("  ".into());
        draft.notes = Some(" felt strong ".into());
        let ex = &mut draft.logged_exercises[0];
        ex.exercise_name = " Squat ".into();
        ex.variation = Some(String::new());
        ex.sets = vec![WorkoutSet::new(5, 100.0)];

        let session = draft.validate().unwrap();
        assert_eq!(session.workout_day, None);
        assert_eq!(session.notes.as_deref(), Some("felt strong"));
        assert_eq!(session.logged_exercises[0].exercise_name, "Squat");
        assert_eq!(session.logged_exercises[0].variation, None);
    }

    #[test]
    fn validate_rejects_bad_sessions() {
        let unnamed = SessionDraft::new(date());
        assert!(unnamed.validate().is_err());

        let mut no_sets = SessionDraft::new(date());
        no_sets.logged_exercises[0].exercise_name = "Squat".into();
        no_sets.logged_exercises[0].sets.clear();
        assert!(no_sets.validate().is_err());

        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let mut bad = SessionDraft::new(date());
            bad.logged_exercises[0].exercise_name = "Squat".into();
            bad.logged_exercises[0].sets = vec![WorkoutSet::new(5, weight)];
            assert!(bad.validate().is_err(), "weight {weight} accepted");
        }

        let mut empty = SessionDraft::new(date());
        empty.logged_exercises.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn deserializes_browser_export() {
        let json = r#"{
            "id": "sess_1717000000000",
            "date": "2024-05-29T16:26:40.000Z",
            "workoutDay": "Push",
            "loggedExercises": [{
                "exerciseId": "ex_1",
                "exerciseName": "Bench Press",
                "variation": "Barbell",
                "sets": [{"reps": 5, "weight": 80}, {"reps": 5, "weight": 82.5}]
            }]
        }"#;
        let session: WorkoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.display_name(), "Push");
        assert_eq!(session.logged_exercises[0].key(), "Bench Press (Barbell)");
        assert_eq!(session.logged_exercises[0].sets[1].weight, 82.5);
    }
}
