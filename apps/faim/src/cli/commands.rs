//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every mutating command loads the snapshot, applies exactly one core
//! operator and writes the result back. Read-only commands never write.

use chrono::{NaiveDate, Utc};
use faim_core::{
    AgentDraft, AgentId, ApplicationState, EvidenceType, FaimError, GateConfig, Gates, LogEntry,
    Provenance, StandingRule, TrcInput, add_agent, compute_atcf, compute_metrics,
    deserialize_snapshot, due_for_review, equal_standing, extend_lexicon, first_divergence,
    initial_state, new_world, recalibrate_rubric, reconfigure_gates, record_trc, remove_agent,
    rescore_agent, sample_claims, scheduled_latency_days, serialize_snapshot, set_privacy,
    set_term_week, snapshot_digest, split_list, strict_equal_standing,
    primitives::MAX_SNAPSHOT_SIZE,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FaimError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FaimError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FaimError::SnapshotTooLarge {
            size: metadata.len() as usize,
            max: max_size as usize,
        });
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, FaimError> {
    let canonical = path.canonicalize().map_err(|e| {
        FaimError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FaimError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, FaimError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        FaimError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(FaimError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| FaimError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SNAPSHOT I/O
// =============================================================================

/// Read a snapshot file, or the starter state when the file does not exist.
pub fn load_state(path: &Path) -> Result<ApplicationState, FaimError> {
    if !path.exists() {
        tracing::debug!("No snapshot at {:?}, using starter state", path);
        return Ok(initial_state(&Provenance::system()));
    }
    read_snapshot(path)
}

fn read_snapshot(path: &Path) -> Result<ApplicationState, FaimError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_SNAPSHOT_SIZE as u64)?;

    let text = std::fs::read_to_string(&validated)
        .map_err(|e| FaimError::Io(format!("Read snapshot: {}", e)))?;
    tracing::debug!("Loaded {} bytes from {:?}", text.len(), validated);
    deserialize_snapshot(&text)
}

/// Write a state to a snapshot file.
pub fn save_state(state: &ApplicationState, path: &Path) -> Result<(), FaimError> {
    let validated = validate_output_path(path)?;
    let text = serialize_snapshot(state)?;
    std::fs::write(&validated, &text)
        .map_err(|e| FaimError::Io(format!("Write snapshot: {}", e)))?;
    tracing::debug!("Saved {} bytes to {:?}", text.len(), validated);
    Ok(())
}

/// Load, transform, save.
fn apply<F>(path: &Path, op: F) -> Result<ApplicationState, FaimError>
where
    F: FnOnce(ApplicationState) -> Result<ApplicationState, FaimError>,
{
    let next = op(load_state(path)?)?;
    save_state(&next, path)?;
    Ok(next)
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write a starter snapshot.
pub fn cmd_init(path: &Path, force: bool, empty: bool) -> Result<(), FaimError> {
    if path.exists() && !force {
        return Err(FaimError::InvalidInput(format!(
            "Snapshot {:?} already exists. Use --force to overwrite.",
            path
        )));
    }

    let state = if empty {
        ApplicationState::new(new_world())
    } else {
        initial_state(&Provenance::system())
    };
    save_state(&state, path)?;

    tracing::info!("Initialized snapshot at {:?}", path);
    println!(
        "Initialized snapshot at {:?} ({} agents)",
        path,
        state.agents.len()
    );
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show dashboard metrics.
pub fn cmd_status(path: &Path, json_mode: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let metrics = compute_metrics(&state);
    let health = metrics.health();
    let scheduled = scheduled_latency_days(&state.world);

    if json_mode {
        print_json(&serde_json::json!({
            "snapshot": path.to_string_lossy(),
            "metrics": metrics,
            "health": health,
            "scheduledLatencyDays": scheduled,
            "termWeek": state.world.ctx.term_week,
        }));
        return Ok(());
    }

    let flag = |ok: bool| if ok { "ok" } else { "warn" };

    println!("FAIM-QIRF Status");
    println!("================");
    println!("Snapshot:  {:?}", path);
    println!("Term week: {}", state.world.ctx.term_week);
    println!();
    println!(
        "Agents with voice: {}% [{}]",
        metrics.percent_voice,
        flag(health.voice)
    );
    println!(
        "Evidence coverage: {}% [{}]",
        metrics.coverage,
        flag(health.coverage)
    );
    println!("Lexicon size:      {}", metrics.lexicon_size);
    println!(
        "Avg TRC latency:   {} days [{}]",
        metrics.avg_latency_days,
        flag(health.latency)
    );
    if let Some(days) = scheduled {
        println!("  (dated entries:  {} days)", days);
    }
    match metrics.avg_atcf {
        Some(avg) => println!("Avg ATCF:          {}", avg),
        None => println!("Avg ATCF:          -"),
    }

    Ok(())
}

// =============================================================================
// AGENT COMMANDS
// =============================================================================

/// Dispatch an agent subcommand.
pub fn cmd_agent(path: &Path, json_mode: bool, action: super::AgentAction) -> Result<(), FaimError> {
    use super::AgentAction;

    match action {
        AgentAction::Add {
            name,
            ik,
            ah,
            spts,
            score,
        } => {
            let draft = AgentDraft {
                name,
                identity_kernel: split_list(&ik),
                assembly_history: split_list(&ah),
                standpoints: split_list(&spts),
                score,
            };
            let state = apply(path, |s| add_agent(s, draft, &Provenance::system()))?;
            if let Some(agent) = state.agents.last() {
                tracing::info!("Added agent {} ({})", agent.name, agent.id);
                println!("Added agent {} ({})", agent.name, agent.id);
            }
            Ok(())
        }
        AgentAction::Remove { id } => {
            let id: AgentId = id.parse()?;
            apply(path, |s| remove_agent(s, id))?;
            tracing::info!("Removed agent {}", id);
            println!("Removed agent {}", id);
            Ok(())
        }
        AgentAction::Rescore { id } => {
            let id: AgentId = id.parse()?;
            let state = apply(path, |s| rescore_agent(s, id))?;
            let score = state.agent(id).and_then(|a| a.atcf.score);
            tracing::info!("Rescored agent {}: {:?}", id, score);
            println!("ATCF for {}: {}", id, score.unwrap_or_default());
            Ok(())
        }
        AgentAction::List => cmd_agent_list(path, json_mode),
    }
}

fn cmd_agent_list(path: &Path, json_mode: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let gates = Gates::from_config(&state.world.gate_config);

    if json_mode {
        let agents: Vec<_> = state
            .agents
            .iter()
            .map(|a| {
                serde_json::json!({
                    "id": a.id,
                    "name": a.name,
                    "SPTS": a.standpoints,
                    "score": a.atcf.score,
                    "computedScore": compute_atcf(a),
                    "voice": gates.voice(a),
                    "standing": gates.standing(a),
                })
            })
            .collect();
        print_json(&serde_json::Value::Array(agents));
        return Ok(());
    }

    if state.agents.is_empty() {
        println!("No agents");
        return Ok(());
    }
    for agent in &state.agents {
        let tags: Vec<&str> = agent.standpoints.iter().map(String::as_str).collect();
        println!(
            "{}  {:<24} voice={:<5} ATCF={:<3} SPTS=[{}]",
            agent.id,
            agent.name,
            gates.voice(agent),
            agent
                .atcf
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            tags.join(", ")
        );
    }
    Ok(())
}

// =============================================================================
// WORLD COMMANDS
// =============================================================================

/// Strip non-observable rubric criteria.
pub fn cmd_recalibrate(path: &Path) -> Result<(), FaimError> {
    let before = load_state(path)?;
    let removed = faim_core::rubric::non_observable_count(&before.world.rubric);
    let after = recalibrate_rubric(before);
    save_state(&after, path)?;

    tracing::info!("Recalibrated rubric, removed {} criteria", removed);
    println!("Removed {} non-observable criteria", removed);
    Ok(())
}

/// Propose a glossary term.
pub fn cmd_lexicon_add(path: &Path, term: &str, by: &str) -> Result<(), FaimError> {
    let state = apply(path, |s| extend_lexicon(s, term, by, &Provenance::system()))?;
    tracing::info!("Proposed term '{}' by {}", term.trim(), by);
    println!(
        "Added term '{}' ({} in glossary)",
        term.trim(),
        state.world.glossary.len()
    );
    Ok(())
}

/// List glossary terms.
pub fn cmd_lexicon_list(path: &Path, json_mode: bool, due_only: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let entries: Vec<_> = if due_only {
        due_for_review(&state.world.glossary, Utc::now())
    } else {
        state.world.glossary.iter().collect()
    };

    if json_mode {
        print_json(&serde_json::json!(entries));
        return Ok(());
    }

    if entries.is_empty() {
        println!("No terms");
    }
    for entry in entries {
        println!(
            "{}  by {}  ({}, review in {} weeks)",
            entry.term,
            entry.by,
            entry.date.format("%Y-%m-%d"),
            entry.next_review_weeks
        );
    }
    Ok(())
}

/// Raw TRC fields from the command line.
#[derive(Debug, Default)]
pub struct TrcArgs {
    pub truth: String,
    pub recognition: String,
    pub remedy: String,
    pub review_date: Option<String>,
}

fn parse_review_date(raw: Option<&str>) -> Result<Option<NaiveDate>, FaimError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| FaimError::InvalidInput(format!("review date '{}': {}", text, e))),
    }
}

/// Record a TRC entry.
pub fn cmd_trc(path: &Path, args: TrcArgs) -> Result<(), FaimError> {
    let input = TrcInput {
        truth: args.truth,
        recognition: args.recognition,
        remedy: args.remedy,
        review_date: parse_review_date(args.review_date.as_deref())?,
    };
    let state = apply(path, |s| record_trc(s, input, &Provenance::system()))?;

    if let Some(entry) = state.world.change_log().last() {
        tracing::info!("Recorded TRC entry {}", entry.id());
        println!("Recorded TRC entry {}", entry.id());
    }
    Ok(())
}

/// Raw gate changes from the command line.
#[derive(Debug, Default)]
pub struct GateArgs {
    pub allow: Option<String>,
    pub deny: Option<String>,
    pub standing_rule: Option<String>,
    pub require_spts: Option<String>,
    pub memo: String,
}

fn parse_evidence_list(raw: &str) -> Result<Vec<EvidenceType>, FaimError> {
    split_list(raw).iter().map(|s| s.parse()).collect()
}

/// Build the next gate configuration from the current one and the arguments.
pub fn next_gate_config(current: &GateConfig, args: &GateArgs) -> Result<GateConfig, FaimError> {
    let mut next = current.clone();

    if let Some(allow) = &args.allow {
        next.evidence_allowed.extend(parse_evidence_list(allow)?);
    }
    if let Some(deny) = &args.deny {
        for kind in parse_evidence_list(deny)? {
            next.evidence_allowed.remove(&kind);
        }
    }
    if let Some(rule) = &args.standing_rule {
        next.standing_rule = rule.parse::<StandingRule>()?;
    }
    if let Some(tags) = &args.require_spts {
        next.require_spts = split_list(tags).into_iter().collect();
    }
    Ok(next)
}

/// Change the gate configuration.
pub fn cmd_gates(path: &Path, args: GateArgs) -> Result<(), FaimError> {
    let before = load_state(path)?;
    let next = next_gate_config(&before.world.gate_config, &args)?;
    let log_len = before.world.change_log().len();

    let after = reconfigure_gates(before, &args.memo, next, &Provenance::system())?;
    if after.world.change_log().len() == log_len {
        println!("Gate configuration unchanged");
        return Ok(());
    }
    save_state(&after, path)?;

    let cfg = &after.world.gate_config;
    let allowed: Vec<&str> = cfg.evidence_allowed.iter().map(|k| k.as_str()).collect();
    tracing::info!("Gate configuration changed: {:?}", cfg);
    println!("Evidence allowed: [{}]", allowed.join(", "));
    println!("Standing rule:    {}", cfg.standing_rule);
    println!(
        "Required SPTS:    [{}]",
        cfg.require_spts.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

/// Check equal standing across tracks.
pub fn cmd_standing(path: &Path, json_mode: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let tracks = &state.world.tracks;
    let equal = equal_standing(tracks);
    let strict = strict_equal_standing(tracks);
    let diverging = first_divergence(tracks).map(|t| t.id.as_str());

    if json_mode {
        print_json(&serde_json::json!({
            "equalStanding": equal,
            "strictEqualStanding": strict,
            "firstDivergence": diverging,
        }));
        return Ok(());
    }

    println!("Tracks:         {}", tracks.len());
    println!("Equal standing: {}", equal);
    println!("Same evidence:  {}", strict);
    if let Some(id) = diverging {
        println!("First divergent track: {}", id);
    }
    Ok(())
}

/// Preview claims against the evidence gate.
pub fn cmd_claims(path: &Path, json_mode: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let claims = if state.claims.is_empty() {
        sample_claims()
    } else {
        state.claims.clone()
    };
    let gates = Gates::from_config(&state.world.gate_config);
    let verdicts = gates.preview(&claims);
    let pass_rate = gates.evidence_pass_rate(&claims);

    if json_mode {
        let rows: Vec<_> = verdicts
            .iter()
            .map(|v| {
                serde_json::json!({
                    "id": v.claim.id,
                    "type": v.claim.evidence,
                    "label": v.claim.label,
                    "admitted": v.admitted,
                })
            })
            .collect();
        print_json(&serde_json::json!({ "claims": rows, "passRate": pass_rate }));
        return Ok(());
    }

    for verdict in &verdicts {
        let kind = verdict
            .claim
            .evidence
            .map(|k| k.as_str())
            .unwrap_or("(none)");
        println!(
            "{:<4} {:<10} {:<8} {}",
            verdict.claim.id,
            kind,
            if verdict.admitted { "admitted" } else { "rejected" },
            verdict.claim.label
        );
    }
    println!();
    println!("Pass rate: {}%", pass_rate);
    Ok(())
}

/// Change privacy switches.
pub fn cmd_privacy(
    path: &Path,
    require_consent: Option<bool>,
    allow_no_lived_path: Option<bool>,
    redaction_text: Option<String>,
) -> Result<(), FaimError> {
    let state = apply(path, |s| {
        let mut privacy = s.world.privacy.clone();
        if let Some(v) = require_consent {
            privacy.require_consent = v;
        }
        if let Some(v) = allow_no_lived_path {
            privacy.allow_no_lived_path = v;
        }
        if let Some(text) = redaction_text {
            privacy.redaction_text = text;
        }
        Ok(set_privacy(s, privacy))
    })?;

    let p = &state.world.privacy;
    tracing::info!("Privacy updated: {:?}", p);
    println!(
        "requireConsent={} allowNoLivedPath={} redactionText={:?}",
        p.require_consent, p.allow_no_lived_path, p.redaction_text
    );
    Ok(())
}

/// Set the term week.
pub fn cmd_term(path: &Path, week: u32) -> Result<(), FaimError> {
    apply(path, |s| Ok(set_term_week(s, week)))?;
    tracing::info!("Term week set to {}", week);
    println!("Term week: {}", week);
    Ok(())
}

// =============================================================================
// LOG COMMAND
// =============================================================================

/// Show the audit log, oldest first.
pub fn cmd_log(path: &Path, json_mode: bool, limit: Option<usize>) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let entries = state.world.change_log().as_slice();
    let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
    let shown = &entries[skip..];

    if json_mode {
        print_json(&serde_json::json!(shown));
        return Ok(());
    }

    if shown.is_empty() {
        println!("Audit log is empty");
    }
    for entry in shown {
        let stamp = entry.created_at().format("%Y-%m-%d %H:%M:%S");
        match entry {
            LogEntry::Trc(trc) => {
                println!("[{}] TRC {}", stamp, trc.id);
                println!("  truth:       {}", trc.truth);
                println!("  recognition: {}", trc.recognition);
                println!("  remedy:      {}", trc.remedy);
                if let Some(date) = trc.review_date {
                    println!("  review:      {}", date);
                }
            }
            LogEntry::GateChange(change) => {
                println!("[{}] GATE_CHANGE {}", stamp, change.id);
                println!("  memo: {}", change.memo);
                println!(
                    "  standing rule: {} -> {}",
                    change.previous.standing_rule, change.next.standing_rule
                );
            }
        }
    }
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT / HASH
// =============================================================================

/// Export the snapshot to a file.
pub fn cmd_export(path: &Path, output: &Path) -> Result<(), FaimError> {
    let validated_output = validate_output_path(output)?;
    let state = load_state(path)?;
    let text = serialize_snapshot(&state)?;

    std::fs::write(&validated_output, &text)
        .map_err(|e| FaimError::Io(format!("Write file: {}", e)))?;

    tracing::info!("Exported snapshot to {:?}", validated_output);
    println!("Exported {} bytes to {:?}", text.len(), validated_output);
    Ok(())
}

/// Replace the snapshot with an imported file.
///
/// The import is fully decoded before anything is written, so a bad file
/// leaves the current snapshot untouched.
pub fn cmd_import(path: &Path, input: &Path) -> Result<(), FaimError> {
    let state = read_snapshot(input)?;
    save_state(&state, path)?;

    tracing::info!("Imported snapshot from {:?}", input);
    println!(
        "Imported snapshot: {} agents, {} log entries",
        state.agents.len(),
        state.world.change_log().len()
    );
    Ok(())
}

/// Compute the BLAKE3 digest of the snapshot.
pub fn cmd_hash(path: &Path, json_mode: bool) -> Result<(), FaimError> {
    let state = load_state(path)?;
    let digest = snapshot_digest(&state)?;

    if json_mode {
        print_json(&serde_json::json!({
            "algorithm": "BLAKE3",
            "hash": digest,
        }));
        return Ok(());
    }

    println!("BLAKE3: {}", digest);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
