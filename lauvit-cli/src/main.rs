use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use log::{debug, info};

use lauvit::body::BodyMetrics;
use lauvit::config::Config;
use lauvit::exercise::ExerciseDraft;
use lauvit::db::operations::{
    activate_plan, add_manual_exercise, create_plan, delete_manual_exercise, delete_plan,
    delete_session, get_active_plan, get_manual_exercise, get_plan, import_plans,
    import_sessions, list_body_records, list_manual_exercises, list_plans, list_sessions,
    log_session, save_body_record, update_manual_exercise, update_plan,
};
use lauvit::db::{DbPool, establish_pool};
use lauvit::logging::set_log_level;
use lauvit::plan::{GymPlan, PlanDraft, workout_day_options};
use lauvit::records::personal_records;
use lauvit::stats::summarize;
use lauvit::workout::{LoggedExercise, SessionDraft, WorkoutSession, WorkoutSet};

#[derive(Parser, Debug)]
#[command(version, about = "Lauvit - Gym Tracker CLI", long_about = None)]
struct Args {
    /// SQLite database path, or :memory:
    #[arg(long, global = true, env = "LAUVIT_DATABASE_URL")]
    database: Option<String>,

    /// off, error, warn, info, debug or trace
    #[arg(long, global = true, env = "LAUVIT_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log a workout session, from a draft file or a single exercise
    #[command(group(ArgGroup::new("source").required(true).args(["file", "exercise"])))]
    Log {
        /// Session draft as JSON
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        exercise: Option<String>,
        #[arg(long, requires = "exercise")]
        variation: Option<String>,
        /// Set as REPSxWEIGHT, e.g. 5x100 (repeatable)
        #[arg(long = "set", value_parser = parse_set, requires = "exercise")]
        sets: Vec<WorkoutSet>,
        #[arg(long, conflicts_with = "file")]
        day: Option<String>,
        /// YYYY-MM-DD or RFC 3339, defaults to now
        #[arg(long, value_parser = parse_date, conflicts_with = "file")]
        date: Option<DateTime<Utc>>,
        #[arg(long, conflicts_with = "file")]
        notes: Option<String>,
    },
    /// Print a session draft prefilled from a plan day
    Prefill {
        #[arg(long)]
        day: String,
        /// Plan id, defaults to the active plan
        #[arg(long)]
        plan: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// List logged sessions, newest first
    History {
        #[arg(short, long)]
        verbose: bool,
    },
    DeleteSession {
        id: String,
    },
    /// Personal records per exercise
    Records,
    /// Dashboard summary as JSON
    Dashboard,
    #[command(subcommand)]
    Plan(PlanCommand),
    #[command(subcommand)]
    Body(BodyCommand),
    /// Custom exercise library
    #[command(subcommand)]
    Exercise(ExerciseCommand),
    /// Import sessions and/or plans from JSON exports
    #[command(group(
        ArgGroup::new("input")
            .required(true)
            .multiple(true)
            .args(["sessions", "plans"])
    ))]
    Import {
        #[arg(long)]
        sessions: Option<PathBuf>,
        #[arg(long)]
        plans: Option<PathBuf>,
    },
    /// Write sessions or plans as JSON to stdout
    Export {
        #[arg(value_enum)]
        kind: ExportKind,
    },
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    List,
    Show {
        id: String,
    },
    /// Create a plan from a JSON plan draft
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Activate {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Workout day names of a plan, defaults to the active plan
    Days {
        #[arg(long)]
        plan: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum BodyCommand {
    /// Compute BMI and muscle mass
    Analyze {
        #[arg(long)]
        weight_kg: f64,
        #[arg(long)]
        height_cm: f64,
        #[arg(long)]
        muscle_mass_kg: Option<f64>,
        /// Store the result in body history
        #[arg(long)]
        save: bool,
        #[arg(long, requires = "save")]
        notes: Option<String>,
    },
    History,
}

#[derive(Subcommand, Debug)]
enum ExerciseCommand {
    List,
    Show {
        id: String,
    },
    Add(ExerciseFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: ExerciseFields,
    },
    Delete {
        id: String,
    },
}

#[derive(ClapArgs, Debug)]
struct ExerciseFields {
    #[arg(long)]
    name: String,
    /// e.g. "Incline, Wide Grip"
    #[arg(long)]
    variations: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    instructions: Option<String>,
}

impl From<ExerciseFields> for ExerciseDraft {
    fn from(fields: ExerciseFields) -> Self {
        ExerciseDraft {
            name: fields.name,
            variations: fields.variations,
            image_url: fields.image_url,
            instructions: fields.instructions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportKind {
    Sessions,
    Plans,
}

fn parse_set(s: &str) -> Result<WorkoutSet, String> {
    s.parse().map_err(|e: lauvit::LauvitError| e.to_string())
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("invalid date {s:?}, expected YYYY-MM-DD or RFC 3339"))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn plan_or_active(pool: &DbPool, id: Option<&str>) -> Result<GymPlan> {
    match id {
        Some(id) => Ok(get_plan(pool, id)?),
        None => get_active_plan(pool)?.context("no active plan, pass --plan or activate one"),
    }
}

fn print_session(session: &WorkoutSession, verbose: bool) {
    println!(
        "{}, {}, {}",
        session.id,
        session.date.format("%Y-%m-%d"),
        session.display_name()
    );
    if verbose {
        for exercise in &session.logged_exercises {
            let sets: Vec<String> = exercise.sets.iter().map(|s| s.to_string()).collect();
            println!("\t{}: {}", exercise.key(), sets.join(", "));
        }
    }
}

fn run_plan(pool: &DbPool, command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::List => {
            for plan in list_plans(pool)? {
                let marker = if plan.is_active { " (active)" } else { "" };
                println!("{}, {}{}", plan.id, plan.name, marker);
            }
        }
        PlanCommand::Show { id } => print_json(&get_plan(pool, &id)?)?,
        PlanCommand::Create { file } => {
            let draft: PlanDraft = read_json(&file)?;
            let plan = create_plan(pool, draft.validate()?)?;
            println!("{}", plan.id);
        }
        PlanCommand::Update { id, file } => {
            let draft: PlanDraft = read_json(&file)?;
            let plan = update_plan(pool, &id, draft.validate()?)?;
            println!("Updated plan: {}", plan.name);
        }
        PlanCommand::Activate { id } => {
            let plan = activate_plan(pool, &id)?;
            println!("Active plan: {}", plan.name);
        }
        PlanCommand::Delete { id } => {
            delete_plan(pool, &id)?;
            println!("Deleted plan {}", id);
        }
        PlanCommand::Days { plan } => {
            let plan = plan_or_active(pool, plan.as_deref())?;
            for day in workout_day_options(&plan) {
                println!("{}", day);
            }
        }
    }
    Ok(())
}

fn run_body(pool: &DbPool, command: BodyCommand) -> Result<()> {
    match command {
        BodyCommand::Analyze {
            weight_kg,
            height_cm,
            muscle_mass_kg,
            save,
            notes,
        } => {
            let analysis = BodyMetrics {
                weight_kg,
                height_cm,
                muscle_mass_kg,
            }
            .analyze()?;
            let estimate = if analysis.muscle_mass_estimated {
                " (estimated)"
            } else {
                ""
            };
            println!("BMI: {} ({})", analysis.bmi, analysis.category);
            println!("Muscle mass: {}kg{}", analysis.muscle_mass_kg, estimate);
            if save {
                let record = save_body_record(pool, &analysis, Utc::now(), notes)?;
                println!("Saved {}", record.id);
            }
        }
        BodyCommand::History => {
            for record in list_body_records(pool)? {
                println!(
                    "{}, {}kg, {}cm, BMI {} ({}), muscle {}kg",
                    record.date.format("%Y-%m-%d"),
                    record.weight_kg,
                    record.height_cm,
                    record.bmi,
                    record.category(),
                    record.muscle_mass_kg
                );
            }
        }
    }
    Ok(())
}

fn run_exercise(pool: &DbPool, command: ExerciseCommand) -> Result<()> {
    match command {
        ExerciseCommand::List => {
            for exercise in list_manual_exercises(pool)? {
                match &exercise.variations {
                    Some(variations) => {
                        println!("{}, {} ({})", exercise.id, exercise.name, variations)
                    }
                    None => println!("{}, {}", exercise.id, exercise.name),
                }
            }
        }
        ExerciseCommand::Show { id } => print_json(&get_manual_exercise(pool, &id)?)?,
        ExerciseCommand::Add(fields) => {
            let exercise = add_manual_exercise(pool, ExerciseDraft::from(fields).validate()?)?;
            println!("{}", exercise.id);
        }
        ExerciseCommand::Update { id, fields } => {
            let draft = ExerciseDraft::from(fields).validate()?;
            let exercise = update_manual_exercise(pool, &id, draft)?;
            println!("Updated exercise: {}", exercise.name);
        }
        ExerciseCommand::Delete { id } => {
            delete_manual_exercise(pool, &id)?;
            println!("Deleted exercise {}", id);
        }
    }
    Ok(())
}

fn run(pool: &DbPool, command: Commands) -> Result<()> {
    match command {
        Commands::Log {
            file,
            exercise,
            variation,
            sets,
            day,
            date,
            notes,
        } => {
            let draft = match (file, exercise) {
                (Some(file), _) => read_json::<SessionDraft>(&file)?,
                (None, Some(name)) => {
                    let mut draft = SessionDraft::new(date.unwrap_or_else(Utc::now));
                    let mut logged = LoggedExercise::blank();
                    logged.exercise_name = name;
                    logged.variation = variation;
                    if !sets.is_empty() {
                        logged.sets = sets;
                    }
                    draft.logged_exercises = vec![logged];
                    draft.workout_day = day;
                    draft.notes = notes;
                    draft
                }
                (None, None) => bail!("pass --file or --exercise"),
            };
            let session = log_session(pool, draft.validate()?)?;
            println!("{}", session.id);
        }
        Commands::Prefill { day, plan, date } => {
            let plan = plan_or_active(pool, plan.as_deref())?;
            let draft = SessionDraft::from_plan_day(&plan, &day, date.unwrap_or_else(Utc::now));
            print_json(&draft)?;
        }
        Commands::History { verbose } => {
            let sessions = list_sessions(pool)?;
            if sessions.is_empty() {
                println!("No workouts logged yet");
            }
            for session in sessions.iter().rev() {
                print_session(session, verbose);
            }
        }
        Commands::DeleteSession { id } => {
            delete_session(pool, &id)?;
            println!("Deleted session {}", id);
        }
        Commands::Records => {
            for record in personal_records(&list_sessions(pool)?) {
                println!("{}", record);
            }
        }
        Commands::Dashboard => {
            let summary = summarize(&list_sessions(pool)?, &list_plans(pool)?);
            print_json(&summary)?;
        }
        Commands::Plan(command) => run_plan(pool, command)?,
        Commands::Body(command) => run_body(pool, command)?,
        Commands::Exercise(command) => run_exercise(pool, command)?,
        Commands::Import { sessions, plans } => {
            if let Some(path) = plans {
                let plans: Vec<GymPlan> = read_json(&path)?;
                println!("Imported {} plans", import_plans(pool, plans)?);
            }
            if let Some(path) = sessions {
                let sessions: Vec<WorkoutSession> = read_json(&path)?;
                println!("Imported {} sessions", import_sessions(pool, sessions)?);
            }
        }
        Commands::Export { kind } => match kind {
            ExportKind::Sessions => print_json(&list_sessions(pool)?)?,
            ExportKind::Plans => print_json(&list_plans(pool)?)?,
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(database) = args.database {
        config.database_url = database;
    }
    match args.log_level.as_deref() {
        Some(level) if !set_log_level(level) => bail!("unknown log level {level:?}"),
        Some(_) => {}
        None => lauvit::logging::init_logger(config.log_level),
    }
    debug!("Using config {:?}", config);

    let pool = establish_pool(&config)?;
    info!("Running {:?}", args.command);
    run(&pool, args.command)
}
