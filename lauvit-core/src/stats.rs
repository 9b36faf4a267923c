use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::plan::{GymPlan, active_plan};
use crate::records::{PersonalRecord, personal_records};
use crate::workout::WorkoutSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_workouts: usize,
    pub active_plan_name: Option<String>,
    pub personal_records: Vec<PersonalRecord>,
    pub workout_days: BTreeSet<NaiveDate>,
}

/// Calendar days (UTC) with at least one session.
pub fn workout_days(sessions: &[WorkoutSession]) -> BTreeSet<NaiveDate> {
    sessions.iter().map(|s| s.date.date_naive()).collect()
}

pub fn summarize(sessions: &[WorkoutSession], plans: &[GymPlan]) -> DashboardSummary {
    DashboardSummary {
        total_workouts: sessions.len(),
        active_plan_name: active_plan(plans).map(|p| p.name.clone()),
        personal_records: personal_records(sessions),
        workout_days: workout_days(sessions),
    }
}
