//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command builds a service over the chosen backend and roster.
//! The redb backend persists each committed mutation, so consecutive
//! invocations compose into one review cycle. The memory backend starts
//! empty on every invocation and is only useful under `server`.

use crate::api;
use crate::directory::load_roster_or_empty;
use crate::sink::{SystemClock, TracingSink};
use merit_core::{
    AppraisalId, AppraisalService, CreateRequest, EmployeeId, EntryId, Goal, GoalId, MeritError,
    Status, StoreBackend, Timestamp, Weightage, primitives::MAX_GOALS_PER_APPRAISAL,
};
use std::path::PathBuf;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for assessment batches (10 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_ASSESSMENT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &PathBuf, max_size: u64) -> Result<(), MeritError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MeritError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MeritError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate file path for security.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
///
/// # Security Note
///
/// This prevents path traversal attacks where a malicious path like
/// "../../../etc/passwd" could be used to access sensitive files.
fn validate_file_path(path: &std::path::Path) -> Result<PathBuf, MeritError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        MeritError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(MeritError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read an assessment batch from a JSON file.
///
/// The file is a JSON array of `{"entry": N, "rating": N, "comment": "..."}`
/// objects, the same shape the HTTP API accepts.
fn read_assessment_file(file: &PathBuf) -> Result<Vec<merit_core::AssessmentInput>, MeritError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_ASSESSMENT_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| MeritError::IoError(format!("Read file: {}", e)))?;

    let items: Vec<api::AssessmentItem> = serde_json::from_slice(&contents)
        .map_err(|e| MeritError::DeserializationError(format!("Parse assessment file: {}", e)))?;

    // Cap the batch before it reaches the service
    if items.len() > MAX_GOALS_PER_APPRAISAL {
        return Err(MeritError::Validation {
            field: "items",
            reason: format!(
                "{} items exceeds maximum {}",
                items.len(),
                MAX_GOALS_PER_APPRAISAL
            ),
        });
    }

    Ok(items.iter().map(api::AssessmentItem::to_input).collect())
}

/// Parse a period argument as epoch seconds or a calendar date.
///
/// `YYYY-MM-DD` maps to midnight UTC of that day.
fn parse_date_arg(field: &'static str, value: &str) -> Result<Timestamp, MeritError> {
    if let Ok(epoch) = value.parse::<i64>() {
        return Ok(Timestamp::new(epoch));
    }
    let date =
        chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| MeritError::Validation {
            field,
            reason: format!("expected epoch seconds or YYYY-MM-DD, got '{}'", value),
        })?;
    Ok(Timestamp::new(
        date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp(),
    ))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    host: &str,
    port: u16,
) -> Result<(), MeritError> {
    let service = load_or_create_service(db_path, backend, roster)?;

    println!("Merit Performance Appraisal Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!("  Roster:   {:?}", roster);
    println!();
    println!("Endpoints:");
    println!("  POST /appraisal                     - Create an appraisal");
    println!("  GET  /appraisal/{{id}}?actor=N        - Fetch one appraisal");
    println!("  POST /appraisal/{{id}}/goal           - Attach a goal");
    println!("  POST /appraisal/{{id}}/goal/remove    - Remove a goal");
    println!("  POST /appraisal/{{id}}/goal/reweight  - Change a weightage");
    println!("  POST /appraisal/{{id}}/assess         - Self-assessment batch");
    println!("  POST /appraisal/{{id}}/evaluate       - Appraiser evaluation");
    println!("  POST /appraisal/{{id}}/review         - Reviewer verdict");
    println!("  POST /appraisal/{{id}}/advance        - Advance the status");
    println!("  GET  /appraisals                    - List appraisal ids");
    println!("  GET  /health                        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, service).await
}

// =============================================================================
// CREATE COMMAND
// =============================================================================

/// Create a new appraisal.
#[allow(clippy::too_many_arguments)]
pub fn cmd_create(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    appraisee: u64,
    appraiser: u64,
    reviewer: u64,
    kind: &str,
    range: Option<String>,
    period_start: Option<String>,
    period_end: Option<String>,
) -> Result<(), MeritError> {
    let mut service = load_or_create_service(db_path, backend, roster)?;

    let request = CreateRequest {
        appraisee: EmployeeId(appraisee),
        appraiser: EmployeeId(appraiser),
        reviewer: EmployeeId(reviewer),
        kind: kind.parse()?,
        range,
        period_start: period_start
            .as_deref()
            .map(|v| parse_date_arg("period_start", v))
            .transpose()?,
        period_end: period_end
            .as_deref()
            .map(|v| parse_date_arg("period_end", v))
            .transpose()?,
    };

    let appraisal = service.create_appraisal(request)?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "status": appraisal.status().name(),
            "version": appraisal.version().0
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Created appraisal #{}", appraisal.id().0);
    println!("  Kind:      {}", appraisal.kind().name());
    println!("  Status:    {}", appraisal.status());
    println!("  Appraisee: {}", appraisal.appraisee().id.0);
    println!("  Appraiser: {}", appraisal.appraiser().id.0);
    println!("  Reviewer:  {}", appraisal.reviewer().id.0);
    println!(
        "  Period:    {} .. {}",
        appraisal.period_start().value(),
        appraisal.period_end().value()
    );

    Ok(())
}

// =============================================================================
// GOAL COMMANDS
// =============================================================================

/// Attach a goal to a draft appraisal.
#[allow(clippy::too_many_arguments)]
pub fn cmd_attach(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    goal_id: u64,
    title: &str,
    description: &str,
    factor: &str,
    importance: &str,
    weightage: u8,
) -> Result<(), MeritError> {
    let mut service = load_or_create_service(db_path, backend, roster)?;

    let goal = Goal::new(
        GoalId(goal_id),
        title,
        description,
        factor,
        importance,
        Weightage(weightage),
    );
    let appraisal = service.attach_goal(AppraisalId(id), EmployeeId(actor), goal)?;

    // The fresh entry carries the highest entry id
    let entry = appraisal.goals().map(|g| g.entry.0).max().unwrap_or(0);

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "entry": entry,
            "goal_count": appraisal.goal_count(),
            "weightage_total": appraisal.weightage_total()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Attached goal {} as entry {}", goal_id, entry);
    println!("  Goals:           {}", appraisal.goal_count());
    println!("  Weightage total: {}%", appraisal.weightage_total());

    Ok(())
}

/// Remove a goal from a draft appraisal.
pub fn cmd_remove(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    entry: u64,
) -> Result<(), MeritError> {
    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.remove_goal(AppraisalId(id), EmployeeId(actor), EntryId(entry))?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "goal_count": appraisal.goal_count(),
            "weightage_total": appraisal.weightage_total()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Removed entry {}", entry);
    println!("  Goals:           {}", appraisal.goal_count());
    println!("  Weightage total: {}%", appraisal.weightage_total());

    Ok(())
}

/// Change the weightage of one attached goal.
#[allow(clippy::too_many_arguments)]
pub fn cmd_reweight(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    entry: u64,
    weightage: u8,
) -> Result<(), MeritError> {
    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.update_goal_weightage(
        AppraisalId(id),
        EmployeeId(actor),
        EntryId(entry),
        Weightage(weightage),
    )?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "entry": entry,
            "weightage": weightage,
            "weightage_total": appraisal.weightage_total()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Reweighted entry {} to {}%", entry, weightage);
    println!("  Weightage total: {}%", appraisal.weightage_total());

    Ok(())
}

// =============================================================================
// ASSESSMENT COMMANDS
// =============================================================================

/// Record the appraisee's self-assessment batch from a file.
pub fn cmd_assess(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    file: &PathBuf,
) -> Result<(), MeritError> {
    let items = read_assessment_file(file)?;
    let count = items.len();

    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.record_self_assessment(AppraisalId(id), EmployeeId(actor), items)?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "recorded": count,
            "missing": appraisal.entries_missing_self_assessment().len()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Recorded {} self-assessments", count);
    let missing = appraisal.entries_missing_self_assessment();
    if missing.is_empty() {
        println!("  All goals assessed");
    } else {
        println!("  Still missing: {} goals", missing.len());
    }

    Ok(())
}

/// Record the appraiser's evaluation batch and overall verdict.
#[allow(clippy::too_many_arguments)]
pub fn cmd_evaluate(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    file: &PathBuf,
    rating: u8,
    comment: &str,
) -> Result<(), MeritError> {
    let items = read_assessment_file(file)?;
    let count = items.len();

    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.record_appraiser_evaluation(
        AppraisalId(id),
        EmployeeId(actor),
        items,
        rating,
        comment,
    )?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "recorded": count,
            "overall_rating": rating,
            "missing": appraisal.entries_missing_appraiser_assessment().len()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Recorded {} appraiser assessments", count);
    println!("  Overall rating: {}", rating);
    let missing = appraisal.entries_missing_appraiser_assessment();
    if missing.is_empty() {
        println!("  All goals assessed");
    } else {
        println!("  Still missing: {} goals", missing.len());
    }

    Ok(())
}

/// Record the reviewer's overall verdict.
#[allow(clippy::too_many_arguments)]
pub fn cmd_review(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    rating: u8,
    comment: &str,
) -> Result<(), MeritError> {
    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal =
        service.record_reviewer_evaluation(AppraisalId(id), EmployeeId(actor), rating, comment)?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "overall_rating": rating,
            "status": appraisal.status().name()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Recorded reviewer verdict");
    println!("  Overall rating: {}", rating);
    println!("  Status:         {}", appraisal.status());

    Ok(())
}

// =============================================================================
// ADVANCE COMMAND
// =============================================================================

/// Advance the appraisal along its status chain.
pub fn cmd_advance(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
    to: &str,
) -> Result<(), MeritError> {
    let target: Status = to.parse()?;

    let mut service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.request_transition(AppraisalId(id), target, EmployeeId(actor))?;

    if json_mode {
        let output = serde_json::json!({
            "appraisal_id": appraisal.id().0,
            "status": appraisal.status().name(),
            "version": appraisal.version().0,
            "terminal": appraisal.status().is_terminal()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Advanced appraisal #{} to {}", id, appraisal.status());
    if appraisal.status().is_terminal() {
        println!("  The appraisal is complete and read-only for everyone.");
    }

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show one appraisal rendered through the access gate.
///
/// The view is rendered for the given actor, so a local operator sees
/// exactly what that participant would see over the API. An actor
/// outside the appraisal gets the envelope with every group hidden.
pub fn cmd_show(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    id: u64,
    actor: u64,
) -> Result<(), MeritError> {
    let service = load_or_create_service(db_path, backend, roster)?;
    let appraisal = service.get_appraisal(AppraisalId(id))?;
    let view = api::AppraisalView::render(&appraisal, EmployeeId(actor));

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Appraisal #{} ({})", view.id, view.kind);
    println!("=====================");
    println!("Status:    {}", view.status);
    println!("Viewer:    employee {} ({})", actor, view.viewer_role);
    println!(
        "Parties:   appraisee {} / appraiser {} / reviewer {}",
        view.appraisee, view.appraiser, view.reviewer
    );
    if let Some(ref range) = view.range {
        println!("Range:     {}", range);
    }
    println!("Period:    {} .. {}", view.period_start, view.period_end);
    println!("Version:   {}", view.version);
    println!();
    println!("Access:");
    println!("  goals:            {}", view.access.goals);
    println!("  self_fields:      {}", view.access.self_fields);
    println!("  appraiser_fields: {}", view.access.appraiser_fields);
    println!("  reviewer_fields:  {}", view.access.reviewer_fields);

    if !view.goals.is_empty() {
        println!();
        println!(
            "Goals ({} / {}% total):",
            view.goals.len(),
            view.weightage_total.unwrap_or(0)
        );
        for goal in &view.goals {
            println!(
                "  [{}] {} ({}%)",
                goal.entry, goal.title, goal.weightage
            );
            if let Some(ref sa) = goal.self_assessment {
                println!("      self:      {} - {}", sa.rating, sa.comment);
            }
            if let Some(ref aa) = goal.appraiser_assessment {
                println!("      appraiser: {} - {}", aa.rating, aa.comment);
            }
        }
    }

    if let Some(ref overall) = view.appraiser_overall {
        println!();
        println!("Appraiser overall: {} - {}", overall.rating, overall.comment);
    }
    if let Some(ref overall) = view.reviewer_overall {
        println!("Reviewer overall:  {} - {}", overall.rating, overall.comment);
    }

    Ok(())
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List appraisals, optionally scoped to one participant.
pub fn cmd_list(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
    json_mode: bool,
    employee: Option<u64>,
) -> Result<(), MeritError> {
    let service = load_or_create_service(db_path, backend, roster)?;
    let ids = match employee {
        Some(e) => service.list_for(EmployeeId(e))?,
        None => service.list()?,
    };

    if json_mode {
        let output = serde_json::json!({
            "appraisals": ids.iter().map(|id| id.0).collect::<Vec<_>>()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if ids.is_empty() {
        println!("No appraisals found");
        return Ok(());
    }

    println!("Appraisals:");
    for id in &ids {
        let appraisal = service.get_appraisal(*id)?;
        println!(
            "  #{} {} {} (appraisee {}, version {})",
            appraisal.id().0,
            appraisal.kind().name(),
            appraisal.status(),
            appraisal.appraisee().id.0,
            appraisal.version().0
        );
    }

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &PathBuf, backend: &str, force: bool) -> Result<(), MeritError> {
    if db_path.exists() && !force {
        return Err(MeritError::IoError(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    match backend {
        "redb" => {
            if force && db_path.exists() {
                std::fs::remove_file(db_path)
                    .map_err(|e| MeritError::IoError(format!("Remove old database: {}", e)))?;
            }
            // The roster is not needed to create the database file
            let _service = AppraisalService::with_redb(
                db_path,
                Box::new(merit_core::StaticResolver::new()),
                Box::new(SystemClock),
                Box::new(TracingSink),
            )?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        _ => {
            println!("Memory backend holds no database file, nothing to initialize");
        }
    }

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Build a service over the chosen backend, roster, and live collaborators.
pub fn load_or_create_service(
    db_path: &PathBuf,
    backend: &str,
    roster: &PathBuf,
) -> Result<AppraisalService, MeritError> {
    let resolver = Box::new(load_roster_or_empty(roster)?);
    let clock = Box::new(SystemClock);
    let sink = Box::new(TracingSink);

    match backend {
        "redb" => AppraisalService::with_redb(db_path, resolver, clock, sink),
        _ => Ok(AppraisalService::new(
            StoreBackend::default(),
            resolver,
            clock,
            sink,
        )),
    }
}
