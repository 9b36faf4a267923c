use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::{debug, info, warn};

use crate::body::{BodyAnalysis, BodyCompositionRecord};
use crate::db::DbPool;
use crate::db::models::{
    BodyCompositionRow, GymPlanRow, LoggedExerciseRow, ManualExerciseRow, NewBodyCompositionRow,
    NewGymPlanRow, NewLoggedExerciseRow, NewManualExerciseRow, NewPlanDayRow, NewPlanExerciseRow,
    NewWorkoutSessionRow, PlanDayRow, PlanExerciseRow, UpdateGymPlanRow, UpdateManualExerciseRow,
    WorkoutSessionRow, WorkoutSetRow, to_i32,
};
use crate::db::schema::{
    body_composition_records, gym_plans, logged_exercises, manual_exercises, plan_days,
    plan_exercises, workout_sessions, workout_sets,
};
use crate::error::{LauvitError, Result};
use crate::exercise::{ManualExercise, NewManualExercise};
use crate::ids::{
    BODY_RECORD_PREFIX, CUSTOM_EXERCISE_PREFIX, DAY_PREFIX, LOGGED_EXERCISE_PREFIX,
    PLAN_EXERCISE_PREFIX, PLAN_PREFIX, SESSION_PREFIX, generate_id,
};
use crate::plan::{GymPlan, NewGymPlan, PlanDay, PlanDraft};
use crate::workout::{NewWorkoutSession, SessionDraft, WorkoutSession};

// Workout sessions
fn insert_session(conn: &mut SqliteConnection, session: &WorkoutSession) -> Result<()> {
    diesel::insert_into(workout_sessions::table)
        .values(&NewWorkoutSessionRow {
            id: &session.id,
            date: session.date.naive_utc(),
            workout_day: session.workout_day.as_deref(),
            notes: session.notes.as_deref(),
            created_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;

    for (position, exercise) in session.logged_exercises.iter().enumerate() {
        let logged_id = generate_id(LOGGED_EXERCISE_PREFIX);
        diesel::insert_into(logged_exercises::table)
            .values(&NewLoggedExerciseRow {
                id: &logged_id,
                session_id: &session.id,
                position: position as i32,
                exercise_id: &exercise.exercise_id,
                exercise_name: &exercise.exercise_name,
                variation: exercise.variation.as_deref(),
                notes: exercise.notes.as_deref(),
            })
            .execute(conn)?;

        let sets = exercise
            .sets
            .iter()
            .enumerate()
            .map(|(set_index, set)| {
                Ok(WorkoutSetRow {
                    logged_exercise_id: logged_id.clone(),
                    set_index: set_index as i32,
                    reps: to_i32(set.reps, "reps")?,
                    weight: set.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        diesel::insert_into(workout_sets::table)
            .values(&sets)
            .execute(conn)?;
    }
    Ok(())
}

fn load_sessions(
    conn: &mut SqliteConnection,
    rows: Vec<WorkoutSessionRow>,
) -> Result<Vec<WorkoutSession>> {
    let exercises = LoggedExerciseRow::belonging_to(&rows)
        .select(LoggedExerciseRow::as_select())
        .order(logged_exercises::position.asc())
        .load(conn)?;
    let sets = WorkoutSetRow::belonging_to(&exercises)
        .select(WorkoutSetRow::as_select())
        .order(workout_sets::set_index.asc())
        .load(conn)?;

    let sets_per_exercise = sets.grouped_by(&exercises);
    let exercises_per_session = exercises
        .into_iter()
        .zip(sets_per_exercise)
        .grouped_by(&rows);

    Ok(rows
        .into_iter()
        .zip(exercises_per_session)
        .map(|(session, exercises)| {
            let logged = exercises
                .into_iter()
                .map(|(exercise, sets)| exercise.into_domain(&sets))
                .collect();
            session.into_domain(logged)
        })
        .collect())
}

fn session_exists(conn: &mut SqliteConnection, session_id: &str) -> Result<bool> {
    let count: i64 = workout_sessions::table
        .filter(workout_sessions::id.eq(session_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Appends a validated session to history under a fresh id.
pub fn log_session(pool: &DbPool, session: NewWorkoutSession) -> Result<WorkoutSession> {
    let mut conn = pool.get()?;
    let session = session.into_session(generate_id(SESSION_PREFIX));
    conn.transaction::<_, LauvitError, _>(|conn| insert_session(conn, &session))?;
    info!(
        "Logged session {} with {} exercises",
        session.id,
        session.logged_exercises.len()
    );
    Ok(session)
}

/// Imports sessions in one transaction, keeping their ids. Sessions whose id
/// is already stored are skipped. Returns how many were inserted.
pub fn import_sessions(pool: &DbPool, sessions: Vec<WorkoutSession>) -> Result<usize> {
    let mut validated = Vec::with_capacity(sessions.len());
    for session in sessions {
        let id = if session.id.trim().is_empty() {
            generate_id(SESSION_PREFIX)
        } else {
            session.id.clone()
        };
        validated.push(SessionDraft::from(session).validate()?.into_session(id));
    }

    let mut conn = pool.get()?;
    let inserted = conn.transaction::<_, LauvitError, _>(|conn| {
        let mut inserted = 0;
        for session in &validated {
            if session_exists(conn, &session.id)? {
                warn!("Session {} already exists, skipping", session.id);
                continue;
            }
            insert_session(conn, session)?;
            inserted += 1;
        }
        Ok(inserted)
    })?;
    info!("Imported {} of {} sessions", inserted, validated.len());
    Ok(inserted)
}

pub fn get_session(pool: &DbPool, session_id: &str) -> Result<WorkoutSession> {
    let mut conn = pool.get()?;
    let row = workout_sessions::table
        .find(session_id)
        .select(WorkoutSessionRow::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| LauvitError::not_found("session", session_id))?;
    load_sessions(&mut conn, vec![row])?
        .pop()
        .ok_or_else(|| LauvitError::not_found("session", session_id))
}

/// Full history in chronological order.
pub fn list_sessions(pool: &DbPool) -> Result<Vec<WorkoutSession>> {
    let mut conn = pool.get()?;
    let rows = workout_sessions::table
        .select(WorkoutSessionRow::as_select())
        .order((workout_sessions::date.asc(), workout_sessions::created_at.asc()))
        .load(&mut conn)?;
    debug!("Loaded {} sessions", rows.len());
    load_sessions(&mut conn, rows)
}

pub fn count_sessions(pool: &DbPool) -> Result<i64> {
    let mut conn = pool.get()?;
    workout_sessions::table
        .count()
        .get_result(&mut conn)
        .map_err(Into::into)
}

pub fn delete_session(pool: &DbPool, session_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted = diesel::delete(workout_sessions::table.find(session_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(LauvitError::not_found("session", session_id));
    }
    info!("Deleted session {}", session_id);
    Ok(())
}

// Gym plans
fn insert_plan_days(conn: &mut SqliteConnection, plan_id: &str, days: &[PlanDay]) -> Result<()> {
    for (position, day) in days.iter().enumerate() {
        diesel::insert_into(plan_days::table)
            .values(&NewPlanDayRow {
                id: &day.id,
                plan_id,
                position: position as i32,
                name: &day.name,
            })
            .execute(conn)?;

        let rows = day
            .exercises
            .iter()
            .enumerate()
            .map(|(position, ex)| {
                Ok(NewPlanExerciseRow {
                    id: &ex.id,
                    day_id: &day.id,
                    position: position as i32,
                    name: &ex.name,
                    variation: ex.variation.as_str(),
                    sets: to_i32(ex.sets, "sets")?,
                    reps: &ex.reps,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        diesel::insert_into(plan_exercises::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

fn deactivate_other_plans(conn: &mut SqliteConnection, keep_id: &str) -> Result<()> {
    diesel::update(gym_plans::table.filter(gym_plans::id.ne(keep_id)))
        .set(gym_plans::is_active.eq(false))
        .execute(conn)?;
    Ok(())
}

fn insert_plan(conn: &mut SqliteConnection, plan: &GymPlan) -> Result<()> {
    if plan.is_active {
        deactivate_other_plans(conn, &plan.id)?;
    }
    diesel::insert_into(gym_plans::table)
        .values(&NewGymPlanRow {
            id: &plan.id,
            name: &plan.name,
            description: plan.description.as_deref(),
            is_active: plan.is_active,
            created_at: plan.created_at.naive_utc(),
            updated_at: plan.updated_at.naive_utc(),
        })
        .execute(conn)?;
    insert_plan_days(conn, &plan.id, &plan.days)
}

fn load_plans(conn: &mut SqliteConnection, rows: Vec<GymPlanRow>) -> Result<Vec<GymPlan>> {
    let days = PlanDayRow::belonging_to(&rows)
        .select(PlanDayRow::as_select())
        .order(plan_days::position.asc())
        .load(conn)?;
    let exercises = PlanExerciseRow::belonging_to(&days)
        .select(PlanExerciseRow::as_select())
        .order(plan_exercises::position.asc())
        .load(conn)?;

    let exercises_per_day = exercises.grouped_by(&days);
    let days_per_plan = days.into_iter().zip(exercises_per_day).grouped_by(&rows);

    rows.into_iter()
        .zip(days_per_plan)
        .map(|(plan, days)| {
            let days = days
                .into_iter()
                .map(|(day, exercises)| day.into_domain(exercises))
                .collect::<Result<Vec<_>>>()?;
            Ok(plan.into_domain(days))
        })
        .collect()
}

fn find_plan_row(conn: &mut SqliteConnection, plan_id: &str) -> Result<GymPlanRow> {
    gym_plans::table
        .find(plan_id)
        .select(GymPlanRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| LauvitError::not_found("plan", plan_id))
}

fn load_plan(conn: &mut SqliteConnection, plan_id: &str) -> Result<GymPlan> {
    let row = find_plan_row(conn, plan_id)?;
    load_plans(conn, vec![row])?
        .pop()
        .ok_or_else(|| LauvitError::not_found("plan", plan_id))
}

fn with_fresh_ids(days: Vec<PlanDay>) -> Vec<PlanDay> {
    days.into_iter()
        .map(|mut day| {
            day.id = generate_id(DAY_PREFIX);
            for exercise in &mut day.exercises {
                exercise.id = generate_id(PLAN_EXERCISE_PREFIX);
            }
            day
        })
        .collect()
}

/// Stores a new plan. Saving an active plan deactivates every other plan.
///
/// Days and exercises always get new ids, so a draft copied from a stored
/// plan creates an independent copy.
pub fn create_plan(pool: &DbPool, plan: NewGymPlan) -> Result<GymPlan> {
    let now = Utc::now();
    let plan = GymPlan {
        id: generate_id(PLAN_PREFIX),
        name: plan.name,
        description: plan.description,
        is_active: plan.is_active,
        days: with_fresh_ids(plan.days),
        created_at: now,
        updated_at: now,
    };

    let mut conn = pool.get()?;
    conn.transaction::<_, LauvitError, _>(|conn| insert_plan(conn, &plan))?;
    info!("Created plan {} ({})", plan.id, plan.name);
    Ok(plan)
}

/// Replaces a plan's contents, keeping its id and creation time.
pub fn update_plan(pool: &DbPool, plan_id: &str, plan: NewGymPlan) -> Result<GymPlan> {
    let mut conn = pool.get()?;
    let updated = conn.transaction::<_, LauvitError, _>(|conn| {
        let existing = find_plan_row(conn, plan_id)?;
        if plan.is_active {
            deactivate_other_plans(conn, plan_id)?;
        }

        let updated_at = Utc::now();
        diesel::update(gym_plans::table.find(plan_id))
            .set(&UpdateGymPlanRow {
                name: &plan.name,
                description: plan.description.as_deref(),
                is_active: plan.is_active,
                updated_at: updated_at.naive_utc(),
            })
            .execute(conn)?;

        diesel::delete(plan_days::table.filter(plan_days::plan_id.eq(plan_id))).execute(conn)?;
        insert_plan_days(conn, plan_id, &plan.days)?;

        Ok(GymPlan {
            id: existing.id,
            name: plan.name,
            description: plan.description,
            is_active: plan.is_active,
            days: plan.days,
            created_at: existing.created_at.and_utc(),
            updated_at,
        })
    })?;
    info!("Updated plan {} ({})", updated.id, updated.name);
    Ok(updated)
}

/// Imports plans keeping their ids and timestamps. Plans whose id is already
/// stored are skipped. When several imported plans are active the last one wins.
pub fn import_plans(pool: &DbPool, plans: Vec<GymPlan>) -> Result<usize> {
    let mut validated = Vec::with_capacity(plans.len());
    for plan in plans {
        let checked = PlanDraft::from_plan(&plan).validate()?;
        validated.push(GymPlan {
            id: if plan.id.trim().is_empty() {
                generate_id(PLAN_PREFIX)
            } else {
                plan.id
            },
            name: checked.name,
            description: checked.description,
            is_active: checked.is_active,
            days: checked.days,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        });
    }

    let mut conn = pool.get()?;
    let inserted = conn.transaction::<_, LauvitError, _>(|conn| {
        let mut inserted = 0;
        for plan in &validated {
            let exists: i64 = gym_plans::table
                .filter(gym_plans::id.eq(&plan.id))
                .count()
                .get_result(conn)?;
            if exists > 0 {
                warn!("Plan {} already exists, skipping", plan.id);
                continue;
            }
            insert_plan(conn, plan)?;
            inserted += 1;
        }
        Ok(inserted)
    })?;
    info!("Imported {} of {} plans", inserted, validated.len());
    Ok(inserted)
}

pub fn get_plan(pool: &DbPool, plan_id: &str) -> Result<GymPlan> {
    let mut conn = pool.get()?;
    load_plan(&mut conn, plan_id)
}

pub fn list_plans(pool: &DbPool) -> Result<Vec<GymPlan>> {
    let mut conn = pool.get()?;
    let rows = gym_plans::table
        .select(GymPlanRow::as_select())
        .order(gym_plans::created_at.asc())
        .load(&mut conn)?;
    load_plans(&mut conn, rows)
}

pub fn get_active_plan(pool: &DbPool) -> Result<Option<GymPlan>> {
    let mut conn = pool.get()?;
    let row = gym_plans::table
        .filter(gym_plans::is_active.eq(true))
        .select(GymPlanRow::as_select())
        .first(&mut conn)
        .optional()?;
    match row {
        Some(row) => Ok(load_plans(&mut conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Marks one plan active and every other plan inactive.
pub fn activate_plan(pool: &DbPool, plan_id: &str) -> Result<GymPlan> {
    let mut conn = pool.get()?;
    let plan = conn.transaction::<_, LauvitError, _>(|conn| {
        find_plan_row(conn, plan_id)?;
        deactivate_other_plans(conn, plan_id)?;
        diesel::update(gym_plans::table.find(plan_id))
            .set(gym_plans::is_active.eq(true))
            .execute(conn)?;
        load_plan(conn, plan_id)
    })?;
    info!("Activated plan {} ({})", plan.id, plan.name);
    Ok(plan)
}

pub fn delete_plan(pool: &DbPool, plan_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted = diesel::delete(gym_plans::table.find(plan_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(LauvitError::not_found("plan", plan_id));
    }
    info!("Deleted plan {}", plan_id);
    Ok(())
}

// Manual exercises
pub fn add_manual_exercise(pool: &DbPool, exercise: NewManualExercise) -> Result<ManualExercise> {
    let exercise = exercise.into_exercise(generate_id(CUSTOM_EXERCISE_PREFIX));
    let mut conn = pool.get()?;
    diesel::insert_into(manual_exercises::table)
        .values(&NewManualExerciseRow {
            id: &exercise.id,
            name: &exercise.name,
            variations: exercise.variations.as_deref(),
            image_url: exercise.image_url.as_deref(),
            instructions: exercise.instructions.as_deref(),
            created_at: Utc::now().naive_utc(),
        })
        .execute(&mut conn)?;
    info!("Added exercise {} ({})", exercise.id, exercise.name);
    Ok(exercise)
}

pub fn update_manual_exercise(
    pool: &DbPool,
    exercise_id: &str,
    exercise: NewManualExercise,
) -> Result<ManualExercise> {
    let mut conn = pool.get()?;
    let updated = diesel::update(manual_exercises::table.find(exercise_id))
        .set(&UpdateManualExerciseRow {
            name: &exercise.name,
            variations: exercise.variations.as_deref(),
            image_url: exercise.image_url.as_deref(),
            instructions: exercise.instructions.as_deref(),
        })
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(LauvitError::not_found("exercise", exercise_id));
    }
    info!("Updated exercise {}", exercise_id);
    Ok(exercise.into_exercise(exercise_id.to_string()))
}

pub fn get_manual_exercise(pool: &DbPool, exercise_id: &str) -> Result<ManualExercise> {
    let mut conn = pool.get()?;
    manual_exercises::table
        .find(exercise_id)
        .select(ManualExerciseRow::as_select())
        .first(&mut conn)
        .optional()?
        .map(ManualExercise::from)
        .ok_or_else(|| LauvitError::not_found("exercise", exercise_id))
}

/// Sorted by name, then by when they were added.
pub fn list_manual_exercises(pool: &DbPool) -> Result<Vec<ManualExercise>> {
    let mut conn = pool.get()?;
    let rows = manual_exercises::table
        .select(ManualExerciseRow::as_select())
        .order((manual_exercises::name.asc(), manual_exercises::created_at.asc()))
        .load(&mut conn)?;
    Ok(rows.into_iter().map(ManualExercise::from).collect())
}

pub fn delete_manual_exercise(pool: &DbPool, exercise_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let deleted =
        diesel::delete(manual_exercises::table.find(exercise_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(LauvitError::not_found("exercise", exercise_id));
    }
    info!("Deleted exercise {}", exercise_id);
    Ok(())
}

// Body composition
pub fn save_body_record(
    pool: &DbPool,
    analysis: &BodyAnalysis,
    date: DateTime<Utc>,
    notes: Option<String>,
) -> Result<BodyCompositionRecord> {
    let record = BodyCompositionRecord {
        id: generate_id(BODY_RECORD_PREFIX),
        date,
        weight_kg: analysis.weight_kg,
        height_cm: analysis.height_cm,
        bmi: analysis.bmi,
        muscle_mass_kg: analysis.muscle_mass_kg,
        notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    };

    let mut conn = pool.get()?;
    diesel::insert_into(body_composition_records::table)
        .values(&NewBodyCompositionRow {
            id: &record.id,
            date: record.date.naive_utc(),
            weight_kg: record.weight_kg,
            height_cm: record.height_cm,
            bmi: record.bmi,
            muscle_mass_kg: record.muscle_mass_kg,
            notes: record.notes.as_deref(),
        })
        .execute(&mut conn)?;
    debug!("Saved body composition record {}", record.id);
    Ok(record)
}

/// Most recent first.
pub fn list_body_records(pool: &DbPool) -> Result<Vec<BodyCompositionRecord>> {
    let mut conn = pool.get()?;
    let rows = body_composition_records::table
        .select(BodyCompositionRow::as_select())
        .order(body_composition_records::date.desc())
        .load(&mut conn)?;
    Ok(rows.into_iter().map(BodyCompositionRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyMetrics;
    use crate::db::open_in_memory;
    use crate::exercise::ExerciseDraft;
    use crate::plan::{ExerciseVariation, PlanExercise};
    use crate::records::personal_records;
    use crate::workout::{LoggedExercise, WorkoutSet};
    use chrono::TimeZone;

    fn date(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 18, 30, 0).unwrap()
    }

    fn squat_session(d: u32, sets: &[(u32, f64)]) -> NewWorkoutSession {
        let mut draft = SessionDraft::new(date(d));
        draft.workout_day = Some("Legs".into());
        draft.logged_exercises = vec![LoggedExercise {
            exercise_id: "ex_squat".into(),
            exercise_name: "Squat".into(),
            variation: Some("Barbell".into()),
            sets: sets.iter().map(|&(r, w)| WorkoutSet::new(r, w)).collect(),
            notes: Some("Target: 3 sets of 5 reps. Variation: Barbell.".into()),
        }];
        draft.validate().unwrap()
    }

    fn plan(name: &str, active: bool) -> NewGymPlan {
        let mut draft = PlanDraft::new();
        draft.name = name.into();
        draft.is_active = active;
        draft.days[0].name = "Push".into();
        draft.days[0].exercises[0] = PlanExercise {
            id: String::new(),
            name: "Bench Press".into(),
            variation: ExerciseVariation::Barbell,
            sets: 4,
            reps: "6-8".into(),
        };
        let day = draft.add_day();
        day.name = "Pull".into();
        day.exercises[0].name = "Row".into();
        draft.add_exercise(1).unwrap().name = "Curl".into();
        draft.validate().unwrap()
    }

    macro_rules! count_rows {
        ($pool:expr, $table:path) => {{
            let mut conn = $pool.get().unwrap();
            $table.count().get_result::<i64>(&mut conn).unwrap()
        }};
    }

    #[test]
    fn session_round_trips_with_order() {
        let pool = open_in_memory().unwrap();
        let new_session = squat_session(1, &[(5, 100.0), (3, 110.0), (8, 90.0)]);
        let logged = log_session(&pool, new_session).unwrap();
        assert!(logged.id.starts_with("sess_"));

        let loaded = get_session(&pool, &logged.id).unwrap();
        assert_eq!(loaded, logged);
        let weights: Vec<f64> = loaded.logged_exercises[0].sets.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![100.0, 110.0, 90.0]);
    }

    #[test]
    fn history_is_chronological_and_feeds_records() {
        let pool = open_in_memory().unwrap();
        log_session(&pool, squat_session(3, &[(6, 100.0)])).unwrap();
        log_session(&pool, squat_session(1, &[(5, 100.0)])).unwrap();
        log_session(&pool, squat_session(2, &[(3, 100.0)])).unwrap();

        let history = list_sessions(&pool).unwrap();
        let dates: Vec<_> = history.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
        assert_eq!(count_sessions(&pool).unwrap(), 3);

        let records = personal_records(&history);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise_key, "Squat (Barbell)");
        assert_eq!(records[0].max_reps_at_weight.unwrap().reps, 6);
        assert_eq!(records[0].date, date(3));
    }

    #[test]
    fn deleting_session_removes_children() {
        let pool = open_in_memory().unwrap();
        let logged = log_session(&pool, squat_session(1, &[(5, 100.0), (5, 100.0)])).unwrap();
        assert_eq!(count_rows!(pool, workout_sets::table), 2);

        delete_session(&pool, &logged.id).unwrap();
        assert_eq!(count_rows!(pool, logged_exercises::table), 0);
        assert_eq!(count_rows!(pool, workout_sets::table), 0);

        let err = delete_session(&pool, &logged.id).unwrap_err();
        assert!(err.is_not_found());
        assert!(get_session(&pool, &logged.id).unwrap_err().is_not_found());
    }

    #[test]
    fn import_keeps_ids_and_skips_duplicates() {
        let pool = open_in_memory().unwrap();
        let session = squat_session(4, &[(5, 120.0)]).into_session("sess_1717000000000".into());

        assert_eq!(import_sessions(&pool, vec![session.clone()]).unwrap(), 1);
        assert_eq!(import_sessions(&pool, vec![session.clone()]).unwrap(), 0);
        assert_eq!(get_session(&pool, "sess_1717000000000").unwrap().date, date(4));

        let mut invalid = session;
        invalid.id = "sess_bad".into();
        invalid.logged_exercises[0].sets[0].weight = -5.0;
        assert!(matches!(
            import_sessions(&pool, vec![invalid]),
            Err(LauvitError::Validation(_))
        ));
        assert_eq!(count_sessions(&pool).unwrap(), 1);
    }

    #[test]
    fn plan_round_trips() {
        let pool = open_in_memory().unwrap();
        let created = create_plan(&pool, plan("Push Pull", false)).unwrap();
        let loaded = get_plan(&pool, &created.id).unwrap();

        assert_eq!(loaded.name, "Push Pull");
        assert_eq!(loaded.days, created.days);
        let pull: Vec<_> = loaded.days[1].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(pull, vec!["Row", "Curl"]);
        assert_eq!(loaded.days[0].exercises[0].variation, ExerciseVariation::Barbell);
        assert_eq!(get_active_plan(&pool).unwrap(), None);
    }

    #[test]
    fn only_one_plan_is_active() {
        let pool = open_in_memory().unwrap();
        let first = create_plan(&pool, plan("First", true)).unwrap();
        let second = create_plan(&pool, plan("Second", true)).unwrap();

        let active = get_active_plan(&pool).unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert!(!get_plan(&pool, &first.id).unwrap().is_active);

        activate_plan(&pool, &first.id).unwrap();
        let plans = list_plans(&pool).unwrap();
        let active: Vec<_> = plans.iter().filter(|p| p.is_active).map(|p| p.id.as_str()).collect();
        assert_eq!(active, vec![first.id.as_str()]);

        assert!(activate_plan(&pool, "plan_missing").unwrap_err().is_not_found());
        assert_eq!(get_active_plan(&pool).unwrap().unwrap().id, first.id);
    }

    #[test]
    fn update_replaces_days_and_keeps_creation_time() {
        let pool = open_in_memory().unwrap();
        let created = create_plan(&pool, plan("Split", false)).unwrap();

        let mut draft = PlanDraft::from_plan(&created);
        draft.name = "Split v2".into();
        draft.remove_day(1).unwrap();
        draft.days[0].exercises[0].sets = 5;
        let updated = update_plan(&pool, &created.id, draft.validate().unwrap()).unwrap();

        let loaded = get_plan(&pool, &created.id).unwrap();
        assert_eq!(loaded.name, "Split v2");
        assert_eq!(loaded.days.len(), 1);
        assert_eq!(loaded.days[0].exercises[0].sets, 5);
        assert_eq!(loaded.created_at, created.created_at);
        assert!(loaded.updated_at >= created.updated_at);
        assert_eq!(loaded.days, updated.days);
        assert_eq!(count_rows!(pool, plan_exercises::table), 1);

        assert!(
            update_plan(&pool, "plan_missing", plan("x", false))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn copying_a_plan_creates_independent_children() {
        let pool = open_in_memory().unwrap();
        let original = create_plan(&pool, plan("Upper Lower", false)).unwrap();

        let mut draft = PlanDraft::from_plan(&original);
        draft.name = "Upper Lower (copy)".into();
        let copy = create_plan(&pool, draft.validate().unwrap()).unwrap();

        assert_ne!(copy.id, original.id);
        assert_ne!(copy.days[0].id, original.days[0].id);
        assert_ne!(copy.days[1].exercises[1].id, original.days[1].exercises[1].id);
        assert_eq!(count_rows!(pool, plan_days::table), 4);
        assert_eq!(count_rows!(pool, plan_exercises::table), 6);

        delete_plan(&pool, &copy.id).unwrap();
        assert_eq!(get_plan(&pool, &original.id).unwrap().days, original.days);
    }

    #[test]
    fn delete_plan_cascades() {
        let pool = open_in_memory().unwrap();
        let created = create_plan(&pool, plan("Temp", false)).unwrap();
        delete_plan(&pool, &created.id).unwrap();
        assert_eq!(count_rows!(pool, plan_days::table), 0);
        assert_eq!(count_rows!(pool, plan_exercises::table), 0);
        assert!(delete_plan(&pool, &created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn import_plans_keeps_ids_and_last_active_wins() {
        let pool = open_in_memory().unwrap();
        let to_plan = |id: &str, active: bool| {
            let p = plan(id, active);
            GymPlan {
                id: id.into(),
                name: p.name,
                description: p.description,
                is_active: p.is_active,
                days: p.days,
                created_at: date(1),
                updated_at: date(2),
            }
        };

        let plans = vec![to_plan("plan_a", true), to_plan("plan_b", true)];
        let imported = import_plans(&pool, plans).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(import_plans(&pool, vec![to_plan("plan_a", false)]).unwrap(), 0);

        let active = get_active_plan(&pool).unwrap().unwrap();
        assert_eq!(active.id, "plan_b");
        assert_eq!(active.created_at, date(1));
    }

    #[test]
    fn manual_exercise_lifecycle() {
        let pool = open_in_memory().unwrap();
        let draft = |name: &str| ExerciseDraft {
            name: name.into(),
            variations: Some("High to Low".into()),
            ..Default::default()
        };

        let crossover = add_manual_exercise(&pool, draft("Cable Crossover").validate().unwrap())
            .unwrap();
        add_manual_exercise(&pool, draft("Bayesian Curl").validate().unwrap()).unwrap();
        assert!(crossover.id.starts_with("custom_"));

        let names: Vec<_> = list_manual_exercises(&pool)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Bayesian Curl", "Cable Crossover"]);

        let mut edit = ExerciseDraft::from(crossover.clone());
        edit.variations = None;
        edit.instructions = Some("Pull cables down and across your body.".into());
        update_manual_exercise(&pool, &crossover.id, edit.validate().unwrap()).unwrap();

        let stored = get_manual_exercise(&pool, &crossover.id).unwrap();
        assert_eq!(stored.variations, None);
        assert_eq!(
            stored.instructions.as_deref(),
            Some("Pull cables down and across your body.")
        );

        delete_manual_exercise(&pool, &crossover.id).unwrap();
        assert!(get_manual_exercise(&pool, &crossover.id).unwrap_err().is_not_found());
        assert!(delete_manual_exercise(&pool, &crossover.id).unwrap_err().is_not_found());
        let missing = draft("Ghost").validate().unwrap();
        let err = update_manual_exercise(&pool, "custom_missing", missing).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn body_records_newest_first() {
        let pool = open_in_memory().unwrap();
        let analysis = BodyMetrics {
            weight_kg: 80.0,
            height_cm: 180.0,
            muscle_mass_kg: None,
        }
        .analyze()
        .unwrap();

        save_body_record(&pool, &analysis, date(1), None).unwrap();
        let notes = Some(" after cut ".to_string());
        let latest = save_body_record(&pool, &analysis, date(9), notes).unwrap();

        let records = list_body_records(&pool).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], latest);
        assert_eq!(records[0].notes.as_deref(), Some("after cut"));
        assert_eq!(records[1].bmi, 24.69);
    }

    #[test]
    fn file_database_persists_between_pools() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::Config {
            database_url: dir.path().join("lauvit.db").to_string_lossy().into_owned(),
            pool_size: 2,
            ..Default::default()
        };

        let logged = {
            let pool = crate::db::establish_pool(&config).unwrap();
            log_session(&pool, squat_session(1, &[(5, 100.0)])).unwrap()
        };

        let pool = crate::db::establish_pool(&config).unwrap();
        assert_eq!(list_sessions(&pool).unwrap(), vec![logged]);
    }
}
