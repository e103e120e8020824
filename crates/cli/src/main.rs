//! elearn CLI - course progress and certificate status.

use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use elearn_core::{Course, CourseId, CourseProgress, GateConfig, LearnerId, UnlockState};
use elearn_storage::{JsonStorage, Storage};
use elearn_progress::{BasicProgressTracker, CertificateGate, ProgressTracker, certificate_status};

#[derive(Parser)]
#[command(name = "elearn")]
#[command(about = "Course progress and certificate gating", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, global = true, default_value = ".elearn")]
    data_dir: PathBuf,

    /// Gate configuration file (defaults to <data-dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the certificate gate for raw numbers
    Unlock {
        /// Total lessons in the course (0 or negative uses the default)
        #[arg(long, allow_hyphen_values = true)]
        total_lessons: Option<i64>,
        /// Completion percentage (absent counts as 0)
        #[arg(long, allow_hyphen_values = true)]
        percent: Option<f64>,
        /// Course tier selecting the unlock policy
        #[arg(long)]
        tier: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommand),
    /// Manage learner progress
    #[command(subcommand)]
    Progress(ProgressCommand),
    /// Show certificate status for every course
    Status {
        /// Learner ID
        #[arg(long)]
        learner: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the effective gate configuration
    Config,
}

#[derive(Subcommand)]
enum CourseCommand {
    /// Add a course
    Add {
        /// Course title
        title: String,
        /// Total lessons
        #[arg(long)]
        lessons: Option<i64>,
        /// Tier
        #[arg(long)]
        tier: Option<String>,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List courses
    List,
    /// Remove a course and its progress records
    Remove {
        /// Course ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ProgressCommand {
    /// Record a learner's completion percentage
    Set {
        /// Course ID
        course: String,
        /// Learner ID
        #[arg(long)]
        learner: String,
        /// Completion percentage
        #[arg(long, allow_hyphen_values = true)]
        percent: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    run(cli, &mut std::io::stdout()).await
}

/// Execute a parsed command, writing user-facing output to `out`.
async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(|| cli.data_dir.join("config.json"));
    let gate = CertificateGate::new(load_config(&config_path)?)
        .with_context(|| format!("Invalid gate configuration in {}", config_path.display()))?;

    match cli.command {
        Commands::Unlock { total_lessons, percent, tier, json } => {
            let policy = gate.config().policy_for(tier.as_deref());
            let state = elearn_progress::compute_unlock_state(policy, total_lessons, percent);
            let status = certificate_status(&state, policy);

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
            } else {
                write_state(out, &state)?;
                writeln!(out, "  Certificate: {}", status.as_str())?;
            }
        }
        Commands::Course(cmd) => {
            let mut storage = open_storage(&cli.data_dir).await?;
            match cmd {
                CourseCommand::Add { title, lessons, tier, description } => {
                    let mut course = Course::new(title).with_description(description);
                    course.total_lessons = lessons;
                    course.tier = tier;
                    storage.save_course(&course).await?;
                    info!(course = %course.id, "course added");
                    writeln!(out, "Added course: {} - {}", course.id, course.title)?;
                }
                CourseCommand::List => {
                    let courses = storage.list_courses().await?;
                    writeln!(out, "Courses ({})", courses.len())?;
                    for course in courses {
                        writeln!(out, "  {} | {} | {} - {}",
                            course.id,
                            course.tier.as_deref().unwrap_or("-"),
                            course
                                .total_lessons
                                .map(|n| n.to_string())
                                .unwrap_or_else(|| "?".to_string()),
                            course.title,
                        )?;
                    }
                }
                CourseCommand::Remove { id } => {
                    let course_id = parse_course_id(&id)?;
                    storage.delete_course(course_id).await?;
                    info!(course = %course_id, "course removed");
                    writeln!(out, "Removed course: {}", course_id)?;
                }
            }
        }
        Commands::Progress(ProgressCommand::Set { course, learner, percent }) => {
            let mut storage = open_storage(&cli.data_dir).await?;
            let course_id = parse_course_id(&course)?;
            if learner.is_empty() {
                anyhow::bail!("Learner ID must not be empty");
            }
            if !percent.is_finite() {
                anyhow::bail!("Percent must be a finite number, got {}", percent);
            }
            if storage.load_course(course_id).await?.is_none() {
                anyhow::bail!("Course not found: {}", course_id);
            }
            if !(0.0..=100.0).contains(&percent) {
                warn!(percent, "percent outside 0-100 will be clamped when evaluated");
            }

            let progress = CourseProgress::new(LearnerId::new(learner), course_id, percent);
            storage.save_progress(&progress).await?;
            info!(course = %course_id, learner = %progress.learner_id, "progress recorded");
            writeln!(out, "Recorded {:.1}% for {} on {}", percent, progress.learner_id, course_id)?;
        }
        Commands::Status { learner, json } => {
            let storage = open_storage(&cli.data_dir).await?;
            let tracker = BasicProgressTracker::new(storage, gate);
            let snapshot = tracker.snapshot(&LearnerId::new(learner)).await?;

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
                return Ok(());
            }

            writeln!(out, "Certificates for {} ({} unlocked, {} locked)",
                snapshot.learner_id,
                snapshot.unlocked_count(),
                snapshot.locked_count(),
            )?;
            for report in &snapshot.reports {
                writeln!(out, "  {} | {:>8} | {:5.1}% | {}/{} lessons | {}",
                    report.course_id,
                    report.certificate.as_str(),
                    report.percent,
                    report.state.completed_lessons,
                    report.state.total_lessons,
                    report.title,
                )?;
                if !report.state.is_unlocked {
                    writeln!(out, "      {} more lessons to unlock", report.state.remaining)?;
                }
            }
        }
        Commands::Config => {
            writeln!(out, "{}", serde_json::to_string_pretty(gate.config())?)?;
        }
    }

    Ok(())
}

async fn open_storage(data_dir: &Path) -> Result<JsonStorage> {
    JsonStorage::new(data_dir)
        .await
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))
}

/// Read a gate configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<GateConfig> {
    match std::fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GateConfig::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn parse_course_id(s: &str) -> Result<CourseId> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid course ID: {}", s))
}

fn write_state(out: &mut dyn Write, state: &UnlockState) -> std::io::Result<()> {
    writeln!(out, "Lessons: {}/{}", state.completed_lessons, state.total_lessons)?;
    writeln!(out, "  Unlocked: {}", state.is_unlocked)?;
    writeln!(out, "  Remaining: {}", state.remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use elearn_core::UnlockPolicy;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unlock_accepts_negative_inputs() {
        let cli = Cli::try_parse_from([
            "elearn", "unlock", "--total-lessons", "-3", "--percent", "-10",
        ])
        .unwrap();
        match cli.command {
            Commands::Unlock { total_lessons, percent, .. } => {
                assert_eq!(total_lessons, Some(-3));
                assert_eq!(percent, Some(-10.0));
            }
            _ => panic!("expected unlock command"),
        }
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"default":{"unlock_threshold":25},"tiers":{"mini":{"default_total_lessons":10,"unlock_threshold":8}}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.default.unlock_threshold, 25);
        assert_eq!(config.default.default_total_lessons, 80);
        assert_eq!(config.policy_for(Some("mini")), &UnlockPolicy::new(10, 8).unwrap());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(load_config(&path).is_err());
    }

    async fn run_in(dir: &Path, args: &[&str]) -> Result<String> {
        let data_dir = dir.to_string_lossy().into_owned();
        let mut argv = vec!["elearn", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(cli, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn test_unlock_without_percent_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_in(dir.path(), &["unlock"]).await.unwrap();

        assert!(out.contains("Lessons: 0/80"));
        assert!(out.contains("Remaining: 30"));
        assert!(out.contains("Certificate: LOCKED"));
    }

    #[tokio::test]
    async fn test_unlock_json_at_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_in(
            dir.path(),
            &["unlock", "--total-lessons", "80", "--percent", "37.5", "--json"],
        )
        .await
        .unwrap();

        let state: UnlockState = serde_json::from_str(&out).unwrap();
        assert_eq!(state.completed_lessons, 30);
        assert!(state.is_unlocked);
        assert_eq!(state.remaining, 0);
    }

    #[tokio::test]
    async fn test_status_over_recorded_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let finished = Course::new("Watercolour").with_lessons(80);
        let untouched = Course::new("Sourdough").with_lessons(40);
        storage.save_course(&finished).await.unwrap();
        storage.save_course(&untouched).await.unwrap();

        let course_id = finished.id.to_string();
        run_in(
            dir.path(),
            &["progress", "set", course_id.as_str(), "--learner", "alice", "--percent", "37.5"],
        )
        .await
        .unwrap();

        let out = run_in(dir.path(), &["status", "--learner", "alice", "--json"]).await.unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&out).unwrap();
        let reports = snapshot["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        for report in reports {
            let unlocked = report["state"]["is_unlocked"].as_bool().unwrap();
            assert_eq!(unlocked, report["title"] == "Watercolour");
        }

        let out = run_in(dir.path(), &["status", "--learner", "alice"]).await.unwrap();
        assert!(out.contains("1 unlocked, 1 locked"));
        assert!(out.contains("30 more lessons to unlock"));
    }

    #[tokio::test]
    async fn test_progress_set_rejects_infinite_percent() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let course = Course::new("Guitar");
        storage.save_course(&course).await.unwrap();

        let course_id = course.id.to_string();
        let result = run_in(
            dir.path(),
            &["progress", "set", course_id.as_str(), "--learner", "alice", "--percent", "inf"],
        )
        .await;

        assert!(result.is_err());
        let learner = LearnerId::new("alice");
        assert!(storage.load_progress(&learner, course.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_progress_set_rejects_empty_learner() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let course = Course::new("Guitar");
        storage.save_course(&course).await.unwrap();

        let course_id = course.id.to_string();
        let result = run_in(
            dir.path(),
            &["progress", "set", course_id.as_str(), "--learner", "", "--percent", "50"],
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_course_add_list_remove() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["course", "add", "Chess", "--lessons", "60", "--tier", "basic"])
            .await
            .unwrap();

        let out = run_in(dir.path(), &["course", "list"]).await.unwrap();
        assert!(out.contains("Courses (1)"));
        assert!(out.contains("| basic | 60 - Chess"));

        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let id = storage.list_courses().await.unwrap()[0].id.to_string();
        run_in(dir.path(), &["course", "remove", id.as_str()]).await.unwrap();

        let out = run_in(dir.path(), &["course", "list"]).await.unwrap();
        assert!(out.contains("Courses (0)"));
    }

    #[test]
    fn test_parse_course_id_rejects_garbage() {
        assert!(parse_course_id("nope").is_err());
        assert!(parse_course_id(&CourseId::new().to_string()).is_ok());
    }
}
