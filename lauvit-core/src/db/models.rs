use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{AsChangeset, Associations, Identifiable, Insertable, Queryable, Selectable};

use crate::body::BodyCompositionRecord;
use crate::db::schema::{
    body_composition_records, gym_plans, logged_exercises, manual_exercises, plan_days,
    plan_exercises, workout_sessions, workout_sets,
};
use crate::exercise::ManualExercise;
use crate::error::{LauvitError, Result};
use crate::plan::{GymPlan, PlanDay, PlanExercise};
use crate::workout::{LoggedExercise, WorkoutSession, WorkoutSet};

pub(crate) fn to_utc(value: NaiveDateTime) -> DateTime<Utc> {
    value.and_utc()
}

pub(crate) fn to_i32(value: u32, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| LauvitError::validation(format!("{what} out of range: {value}")))
}

// Workout session models
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = workout_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutSessionRow {
    pub id: String,
    pub date: NaiveDateTime,
    pub workout_day: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = workout_sessions)]
pub struct NewWorkoutSessionRow<'a> {
    pub id: &'a str,
    pub date: NaiveDateTime,
    pub workout_day: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(WorkoutSessionRow, foreign_key = session_id))]
#[diesel(table_name = logged_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoggedExerciseRow {
    pub id: String,
    pub session_id: String,
    pub position: i32,
    pub exercise_id: String,
    pub exercise_name: String,
    pub variation: Option<String>,
    pub notes: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = logged_exercises)]
pub struct NewLoggedExerciseRow<'a> {
    pub id: &'a str,
    pub session_id: &'a str,
    pub position: i32,
    pub exercise_id: &'a str,
    pub exercise_name: &'a str,
    pub variation: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(LoggedExerciseRow, foreign_key = logged_exercise_id))]
#[diesel(table_name = workout_sets)]
#[diesel(primary_key(logged_exercise_id, set_index))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutSetRow {
    pub logged_exercise_id: String,
    pub set_index: i32,
    pub reps: i32,
    pub weight: f64,
}

impl From<&WorkoutSetRow> for WorkoutSet {
    fn from(row: &WorkoutSetRow) -> Self {
        WorkoutSet {
            reps: row.reps.max(0) as u32,
            weight: row.weight,
        }
    }
}

impl LoggedExerciseRow {
    pub fn into_domain(self, sets: &[WorkoutSetRow]) -> LoggedExercise {
        LoggedExercise {
            exercise_id: self.exercise_id,
            exercise_name: self.exercise_name,
            variation: self.variation,
            sets: sets.iter().map(WorkoutSet::from).collect(),
            notes: self.notes,
        }
    }
}

impl WorkoutSessionRow {
    pub fn into_domain(self, logged_exercises: Vec<LoggedExercise>) -> WorkoutSession {
        WorkoutSession {
            id: self.id,
            date: to_utc(self.date),
            workout_day: self.workout_day,
            logged_exercises,
            notes: self.notes,
        }
    }
}

// Gym plan models
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = gym_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GymPlanRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = gym_plans)]
pub struct NewGymPlanRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = gym_plans)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateGymPlanRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(GymPlanRow, foreign_key = plan_id))]
#[diesel(table_name = plan_days)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlanDayRow {
    pub id: String,
    pub plan_id: String,
    pub position: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = plan_days)]
pub struct NewPlanDayRow<'a> {
    pub id: &'a str,
    pub plan_id: &'a str,
    pub position: i32,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(PlanDayRow, foreign_key = day_id))]
#[diesel(table_name = plan_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlanExerciseRow {
    pub id: String,
    pub day_id: String,
    pub position: i32,
    pub name: String,
    pub variation: String,
    pub sets: i32,
    pub reps: String,
}

#[derive(Insertable)]
#[diesel(table_name = plan_exercises)]
pub struct NewPlanExerciseRow<'a> {
    pub id: &'a str,
    pub day_id: &'a str,
    pub position: i32,
    pub name: &'a str,
    pub variation: &'a str,
    pub sets: i32,
    pub reps: &'a str,
}

impl PlanExerciseRow {
    pub fn into_domain(self) -> Result<PlanExercise> {
        Ok(PlanExercise {
            variation: self.variation.parse()?,
            id: self.id,
            name: self.name,
            sets: self.sets.max(1) as u32,
            reps: self.reps,
        })
    }
}

impl PlanDayRow {
    pub fn into_domain(self, exercises: Vec<PlanExerciseRow>) -> Result<PlanDay> {
        Ok(PlanDay {
            id: self.id,
            name: self.name,
            exercises: exercises
                .into_iter()
                .map(PlanExerciseRow::into_domain)
                .collect::<Result<_>>()?,
        })
    }
}

impl GymPlanRow {
    pub fn into_domain(self, days: Vec<PlanDay>) -> GymPlan {
        GymPlan {
            id: self.id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            days,
            created_at: to_utc(self.created_at),
            updated_at: to_utc(self.updated_at),
        }
    }
}

// Body composition models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = body_composition_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BodyCompositionRow {
    pub id: String,
    pub date: NaiveDateTime,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub muscle_mass_kg: f64,
    pub notes: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = body_composition_records)]
pub struct NewBodyCompositionRow<'a> {
    pub id: &'a str,
    pub date: NaiveDateTime,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub muscle_mass_kg: f64,
    pub notes: Option<&'a str>,
}

impl From<BodyCompositionRow> for BodyCompositionRecord {
    fn from(row: BodyCompositionRow) -> Self {
        BodyCompositionRecord {
            id: row.id,
            date: to_utc(row.date),
            weight_kg: row.weight_kg,
            height_cm: row.height_cm,
            bmi: row.bmi,
            muscle_mass_kg: row.muscle_mass_kg,
            notes: row.notes,
        }
    }
}

// Manual exercise models
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = manual_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ManualExerciseRow {
    pub id: String,
    pub name: String,
    pub variations: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = manual_exercises)]
pub struct NewManualExerciseRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub variations: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = manual_exercises)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateManualExerciseRow<'a> {
    pub name: &'a str,
    pub variations: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub instructions: Option<&'a str>,
}

impl From<ManualExerciseRow> for ManualExercise {
    fn from(row: ManualExerciseRow) -> Self {
        ManualExercise {
            id: row.id,
            name: row.name,
            variations: row.variations,
            image_url: row.image_url,
            instructions: row.instructions,
        }
    }
}
