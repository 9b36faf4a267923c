//! Gym plans: named routines made of days, each listing target exercises.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LauvitError, Result};
use crate::ids::{DAY_PREFIX, PLAN_EXERCISE_PREFIX, generate_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseVariation {
    #[default]
    Cable,
    #[serde(rename = "Cable Unilateral")]
    CableUnilateral,
    Machine,
    #[serde(rename = "Machine Unilateral")]
    MachineUnilateral,
    Dumbbell,
    Barbell,
}

impl ExerciseVariation {
    pub const ALL: [ExerciseVariation; 6] = [
        ExerciseVariation::Cable,
        ExerciseVariation::CableUnilateral,
        ExerciseVariation::Machine,
        ExerciseVariation::MachineUnilateral,
        ExerciseVariation::Dumbbell,
        ExerciseVariation::Barbell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseVariation::Cable => "Cable",
            ExerciseVariation::CableUnilateral => "Cable Unilateral",
            ExerciseVariation::Machine => "Machine",
            ExerciseVariation::MachineUnilateral => "Machine Unilateral",
            ExerciseVariation::Dumbbell => "Dumbbell",
            ExerciseVariation::Barbell => "Barbell",
        }
    }
}

impl fmt::Display for ExerciseVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseVariation {
    type Err = LauvitError;

    /// Case-insensitive; `-` and `_` are accepted in place of the space.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace(['-', '_'], " ").to_lowercase();
        ExerciseVariation::ALL
            .into_iter()
            .find(|v| v.as_str().to_lowercase() == normalized)
            .ok_or_else(|| LauvitError::validation(format!("unknown exercise variation {s:?}")))
    }
}

/// Target reps for a planned exercise, e.g. `10`, `8-12` or `AMRAP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepTarget {
    Exact(u32),
    Range { low: u32, high: u32 },
    Amrap,
}

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").unwrap());
static EXACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

impl FromStr for RepTarget {
    type Err = LauvitError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || LauvitError::validation(format!("invalid rep target {s:?}"));

        if trimmed.eq_ignore_ascii_case("amrap") {
            return Ok(RepTarget::Amrap);
        }
        if EXACT_RE.is_match(trimmed) {
            return trimmed.parse().map(RepTarget::Exact).map_err(|_| invalid());
        }
        if let Some(caps) = RANGE_RE.captures(trimmed) {
            let low: u32 = caps[1].parse().map_err(|_| invalid())?;
            let high: u32 = caps[2].parse().map_err(|_| invalid())?;
            if low > high {
                return Err(invalid());
            }
            return Ok(RepTarget::Range { low, high });
        }
        Err(invalid())
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Exact(n) => write!(f, "{n}"),
            RepTarget::Range { low, high } => write!(f, "{low}-{high}"),
            RepTarget::Amrap => f.write_str("AMRAP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExercise {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub variation: ExerciseVariation,
    pub sets: u32,
    pub reps: String,
}

impl PlanExercise {
    pub fn blank() -> Self {
        Self {
            id: generate_id(PLAN_EXERCISE_PREFIX),
            name: String::new(),
            variation: ExerciseVariation::default(),
            sets: 3,
            reps: "8-12".to_string(),
        }
    }

    /// Note attached to a logged exercise prefilled from this target.
    pub fn target_note(&self) -> String {
        format!(
            "Target: {} sets of {} reps. Variation: {}.",
            self.sets, self.reps, self.variation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymPlan {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub days: Vec<PlanDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GymPlan {
    pub fn day(&self, name: &str) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.name == name)
    }
}

/// Unique, trimmed, non-empty day names in plan order.
pub fn workout_day_options(plan: &GymPlan) -> Vec<String> {
    let mut seen = HashSet::new();
    plan.days
        .iter()
        .map(|d| d.name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

pub fn active_plan(plans: &[GymPlan]) -> Option<&GymPlan> {
    plans.iter().find(|p| p.is_active)
}

/// Editable plan before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub days: Vec<PlanDay>,
}

impl Default for PlanDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanDraft {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: None,
            is_active: false,
            days: vec![PlanDay {
                id: generate_id(DAY_PREFIX),
                name: "Day 1".to_string(),
                exercises: vec![PlanExercise::blank()],
            }],
        }
    }

    pub fn from_plan(plan: &GymPlan) -> Self {
        Self {
            name: plan.name.clone(),
            description: plan.description.clone(),
            is_active: plan.is_active,
            days: plan.days.clone(),
        }
    }

    pub fn add_day(&mut self) -> &mut PlanDay {
        let name = format!("Day {}", self.days.len() + 1);
        self.days.push(PlanDay {
            id: generate_id(DAY_PREFIX),
            name,
            exercises: vec![PlanExercise::blank()],
        });
        let last = self.days.len() - 1;
        &mut self.days[last]
    }

    pub fn remove_day(&mut self, day: usize) -> Result<PlanDay> {
        self.check_day(day)?;
        if self.days.len() == 1 {
            return Err(LauvitError::validation("plan must have at least one day"));
        }
        Ok(self.days.remove(day))
    }

    pub fn add_exercise(&mut self, day: usize) -> Result<&mut PlanExercise> {
        self.check_day(day)?;
        let exercises = &mut self.days[day].exercises;
        exercises.push(PlanExercise::blank());
        let last = exercises.len() - 1;
        Ok(&mut exercises[last])
    }

    pub fn remove_exercise(&mut self, day: usize, exercise: usize) -> Result<PlanExercise> {
        self.check_day(day)?;
        let exercises = &mut self.days[day].exercises;
        if exercise >= exercises.len() {
            return Err(LauvitError::validation(format!(
                "exercise index {exercise} out of range"
            )));
        }
        if exercises.len() == 1 {
            return Err(LauvitError::validation(
                "each day must have at least one exercise",
            ));
        }
        Ok(exercises.remove(exercise))
    }

    fn check_day(&self, day: usize) -> Result<()> {
        if day >= self.days.len() {
            return Err(LauvitError::validation(format!(
                "day index {day} out of range"
            )));
        }
        Ok(())
    }

    /// Checks every field and fills in any missing day/exercise ids.
    pub fn validate(self) -> Result<NewGymPlan> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LauvitError::validation("plan name is required"));
        }
        if self.days.is_empty() {
            return Err(LauvitError::validation("add at least one day to the plan"));
        }

        let mut days = Vec::with_capacity(self.days.len());
        for (day_idx, day) in self.days.into_iter().enumerate() {
            let day_name = day.name.trim().to_string();
            if day_name.is_empty() {
                return Err(LauvitError::validation(format!(
                    "day {} needs a name",
                    day_idx + 1
                )));
            }
            if day.exercises.is_empty() {
                return Err(LauvitError::validation(format!(
                    "add at least one exercise to {day_name}"
                )));
            }

            let mut exercises = Vec::with_capacity(day.exercises.len());
            for (ex_idx, ex) in day.exercises.into_iter().enumerate() {
                let ex_name = ex.name.trim().to_string();
                if ex_name.is_empty() {
                    return Err(LauvitError::validation(format!(
                        "{day_name}: exercise {} needs a name",
                        ex_idx + 1
                    )));
                }
                if ex.sets < 1 {
                    return Err(LauvitError::validation(format!(
                        "{day_name}: {ex_name} needs at least 1 set"
                    )));
                }
                let reps = ex.reps.trim().to_string();
                reps.parse::<RepTarget>()?;
                exercises.push(PlanExercise {
                    id: non_empty_or_generate(ex.id, PLAN_EXERCISE_PREFIX),
                    name: ex_name,
                    variation: ex.variation,
                    sets: ex.sets,
                    reps,
                });
            }

            days.push(PlanDay {
                id: non_empty_or_generate(day.id, DAY_PREFIX),
                name: day_name,
                exercises,
            });
        }

        Ok(NewGymPlan {
            name,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_active: self.is_active,
            days,
        })
    }
}

fn non_empty_or_generate(id: String, prefix: &str) -> String {
    if id.trim().is_empty() {
        generate_id(prefix)
    } else {
        id
    }
}

/// A plan that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGymPlan {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub days: Vec<PlanDay>,
}
