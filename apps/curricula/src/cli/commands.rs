//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::Config;
use crate::progress::paths_for;
use curricula_core::primitives::PATH_SEPARATOR;
use curricula_core::{
    CompletionStats, CurriculumError, DirectorySource, Frontier, Grade, Graph, Mastery,
    NodeStatus, Prerequisites, Progress, SubjectRegistry, validate, window,
};
use std::sync::Arc;

// =============================================================================
// SHARED CONTEXT
// =============================================================================

/// Everything a command needs besides its own arguments.
pub struct Context<'a> {
    pub registry: &'a SubjectRegistry<DirectorySource>,
    pub config: &'a Config,
    pub json_mode: bool,
    pub quiet: bool,
}

impl Context<'_> {
    /// The explicit grade, or the configured default.
    pub fn grade(&self, explicit: Option<Grade>) -> Grade {
        explicit.unwrap_or(self.config.default_grade)
    }

    /// Graph for a subject name or path; unknown subjects are an error here,
    /// unlike in the core where they are simply empty.
    pub fn graph(&self, name_or_path: &str) -> Result<Arc<Graph>, CurriculumError> {
        let subject = subject_of(name_or_path);
        let known = self
            .registry
            .subjects()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(subject));
        if !known {
            return Err(CurriculumError::UnknownSubject(subject.to_string()));
        }
        Ok(self.registry.graph(subject))
    }

    fn header(&self, title: &str) {
        if !self.quiet && !self.json_mode {
            println!("{}", title);
            println!("{}", "=".repeat(title.chars().count()));
            println!();
        }
    }
}

fn subject_of(name_or_path: &str) -> &str {
    name_or_path
        .split(PATH_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn mastery_json(mastery: Mastery) -> serde_json::Value {
    serde_json::json!({
        "done": mastery.done,
        "total": mastery.total,
        "percent": mastery.percent(),
        "permille": mastery.permille(),
    })
}

/// `done/total (pct%)`, or `n/a` for an undefined ratio.
pub fn format_mastery(mastery: Mastery) -> String {
    match mastery.percent() {
        Some(percent) => format!("{}/{} ({}%)", mastery.done, mastery.total, percent),
        None => "0/0 (n/a)".to_string(),
    }
}

// =============================================================================
// SUBJECTS COMMAND
// =============================================================================

/// List subjects with graph sizes.
pub fn cmd_subjects(ctx: &Context<'_>) -> Result<(), CurriculumError> {
    let rows: Vec<(String, Arc<Graph>)> = ctx
        .registry
        .subjects()
        .into_iter()
        .map(|s| {
            let graph = ctx.registry.graph(&s);
            (s, graph)
        })
        .collect();

    if ctx.json_mode {
        let output: Vec<_> = rows
            .iter()
            .map(|(subject, graph)| {
                serde_json::json!({
                    "subject": subject,
                    "nodes": graph.node_count(),
                    "edges": graph.edge_count(),
                    "concepts": graph.concepts().count(),
                })
            })
            .collect();
        print_json(&serde_json::Value::from(output));
        return Ok(());
    }

    ctx.header("Subjects");
    for (subject, graph) in &rows {
        if graph.is_empty() {
            println!("  {:<16} (no taxonomy)", subject);
        } else {
            println!(
                "  {:<16} {} nodes, {} edges, {} concepts",
                subject,
                graph.node_count(),
                graph.edge_count(),
                graph.concepts().count()
            );
        }
    }
    Ok(())
}

// =============================================================================
// FRONTIER COMMAND
// =============================================================================

/// Show the learnable frontier of one subject.
pub fn cmd_frontier(
    ctx: &Context<'_>,
    subject: &str,
    progress: &Progress,
    grade: Option<Grade>,
    limit: Option<usize>,
) -> Result<(), CurriculumError> {
    let graph = ctx.graph(subject)?;
    let completed = SubjectRegistry::<DirectorySource>::completed_for(&graph, progress);
    let frontier = Frontier::next_learnable(&graph, &completed, grade);
    let shown = limit.unwrap_or(frontier.len());

    if ctx.json_mode {
        let output: Vec<_> = frontier
            .iter()
            .take(shown)
            .map(|node| {
                serde_json::json!({
                    "path": graph.path(node.id),
                    "label": node.label,
                    "grade_level": node.grade_level,
                    "type": node.node_type.as_str(),
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "subject": graph.subject(),
            "target_grade": grade,
            "total": frontier.len(),
            "concepts": output,
        }));
        return Ok(());
    }

    ctx.header(&format!("Frontier: {}", graph.subject()));
    if frontier.is_empty() {
        println!("Nothing left to unlock.");
        return Ok(());
    }
    for node in frontier.iter().take(shown) {
        println!(
            "  [{:>3}] {} ({})",
            node.grade_level.to_string(),
            graph.path(node.id).unwrap_or_default(),
            node.node_type.as_str()
        );
    }
    if shown < frontier.len() {
        println!("  ... {} more", frontier.len().saturating_sub(shown));
    }
    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// What `stats` reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsTarget {
    /// Every subject plus the aggregate.
    All,
    /// The unit containing this path.
    Unit(String),
    /// A subject, optionally narrowed to a subtree path.
    Scope {
        subject: String,
        scope: Option<String>,
    },
}

/// Report mastery.
pub fn cmd_stats(
    ctx: &Context<'_>,
    progress: &Progress,
    target: StatsTarget,
) -> Result<(), CurriculumError> {
    match target {
        StatsTarget::All => {
            let per_subject = ctx.registry.subject_stats(progress);
            let total: Mastery = per_subject.iter().map(|(_, m)| *m).sum();

            if ctx.json_mode {
                let subjects: Vec<_> = per_subject
                    .iter()
                    .map(|(subject, mastery)| {
                        let mut entry = mastery_json(*mastery);
                        entry["subject"] = serde_json::Value::from(subject.as_str());
                        entry
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "subjects": subjects,
                    "total": mastery_json(total),
                }));
                return Ok(());
            }

            ctx.header("Mastery");
            for (subject, mastery) in &per_subject {
                println!("  {:<16} {}", subject, format_mastery(*mastery));
            }
            println!("  {:<16} {}", "All subjects", format_mastery(total));
        }
        StatsTarget::Unit(path) => {
            let graph = ctx.graph(&path)?;
            let completed = SubjectRegistry::<DirectorySource>::completed_for(&graph, progress);
            let mastery = match graph.resolve(&path) {
                Some(current) => CompletionStats::unit(&graph, &completed, current),
                None => {
                    tracing::warn!(path = %path, "unknown node; unit mastery is undefined");
                    Mastery::EMPTY
                }
            };
            report_mastery(ctx, &format!("unit of {}", path), mastery);
        }
        StatsTarget::Scope { subject, scope } => {
            let graph = ctx.graph(&subject)?;
            let completed = SubjectRegistry::<DirectorySource>::completed_for(&graph, progress);
            let mastery = CompletionStats::compute(&graph, &completed, scope.as_deref());
            let label = scope.unwrap_or_else(|| graph.subject().to_string());
            report_mastery(ctx, &label, mastery);
        }
    }
    Ok(())
}

fn report_mastery(ctx: &Context<'_>, label: &str, mastery: Mastery) {
    if ctx.json_mode {
        let mut output = mastery_json(mastery);
        output["scope"] = serde_json::Value::from(label);
        print_json(&output);
    } else {
        ctx.header("Mastery");
        println!("  {}: {}", label, format_mastery(mastery));
    }
}

// =============================================================================
// PREREQS COMMAND
// =============================================================================

/// List prerequisites of a concept.
pub fn cmd_prereqs(ctx: &Context<'_>, path: &str, depth: usize) -> Result<(), CurriculumError> {
    let graph = ctx.graph(path)?;
    let steps: Vec<(usize, String)> = match graph.resolve(path) {
        Some(id) => Prerequisites::chain(&graph, id, depth.max(1))
            .into_iter()
            .filter_map(|step| graph.path(step.id).map(|p| (step.depth, p)))
            .collect(),
        None => {
            tracing::warn!(path = %path, "unknown node; no prerequisites");
            Vec::new()
        }
    };

    if ctx.json_mode {
        let output: Vec<_> = steps
            .iter()
            .map(|(depth, path)| serde_json::json!({ "path": path, "depth": depth }))
            .collect();
        print_json(&serde_json::json!({ "concept": path, "prerequisites": output }));
        return Ok(());
    }

    ctx.header(&format!("Prerequisites: {}", path));
    if steps.is_empty() {
        println!("  (none)");
    }
    for (depth, prerequisite) in &steps {
        println!("  {}{}", "  ".repeat(depth.saturating_sub(1)), prerequisite);
    }
    Ok(())
}

// =============================================================================
// NEXT COMMAND
// =============================================================================

/// Ordered completed paths for navigation.
///
/// Explicit `--completed` paths win. Otherwise the subject's progress list
/// is used; without a subject, progress may cover at most one subject.
pub fn navigation_history(
    progress: &Progress,
    explicit: Vec<String>,
    subject: Option<&str>,
) -> Result<Vec<String>, CurriculumError> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }
    if let Some(subject) = subject {
        return Ok(paths_for(progress, subject).to_vec());
    }

    let mut started = progress.iter().filter(|(_, paths)| !paths.is_empty());
    match (started.next(), started.next()) {
        (None, _) => Ok(Vec::new()),
        (Some((_, paths)), None) => Ok(paths.clone()),
        (Some(_), Some(_)) => Err(CurriculumError::Config(
            "progress covers several subjects; pass --subject or --completed".to_string(),
        )),
    }
}

/// Show the next navigation options. Several options are a choice for the
/// learner and are listed, never narrowed to one.
pub fn cmd_next(
    ctx: &Context<'_>,
    progress: &Progress,
    completed: Vec<String>,
    subject: Option<&str>,
    grade: Grade,
) -> Result<(), CurriculumError> {
    if let Some(subject) = subject {
        ctx.graph(subject)?;
    }
    let history = navigation_history(progress, completed, subject)?;
    let options = ctx.registry.next_options(&history, grade, subject);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "anchor": history.last(),
            "grade": grade,
            "choice": options.len() > 1,
            "options": options,
        }));
        return Ok(());
    }

    ctx.header("Next");
    match options.as_slice() {
        [] => println!("  Nothing further within grade {}.", grade),
        [only] => println!("  {}", only),
        _ => {
            println!("  Choose one:");
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {}", i.saturating_add(1), option);
            }
        }
    }
    Ok(())
}

// =============================================================================
// MAP COMMAND
// =============================================================================

/// Show a status-annotated window of a subject graph.
pub fn cmd_map(
    ctx: &Context<'_>,
    subject: &str,
    progress: &Progress,
    current: Option<&str>,
    focus: Option<&str>,
    limit: usize,
) -> Result<(), CurriculumError> {
    let graph = ctx.graph(subject)?;
    let completed = SubjectRegistry::<DirectorySource>::completed_for(&graph, progress);
    let current = current.and_then(|p| graph.resolve(p));
    let focus = focus.and_then(|p| graph.resolve(p));
    let views = window(&graph, &completed, current, focus, limit);

    if ctx.json_mode {
        print_json(&serde_json::to_value(&views)?);
        return Ok(());
    }

    ctx.header(&format!("Map: {}", graph.subject()));
    for view in &views {
        let marker = match view.status {
            NodeStatus::Completed => "x",
            NodeStatus::Current => ">",
            NodeStatus::Available => "+",
            NodeStatus::Locked => " ",
        };
        println!(
            "  [{}] {} ({}, grade {})",
            marker,
            view.path,
            view.kind.as_str(),
            view.grade_level
        );
    }
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Validate one or all subject graphs. Fails when any has errors.
pub fn cmd_validate(ctx: &Context<'_>, subject: Option<&str>) -> Result<(), CurriculumError> {
    let subjects = match subject {
        Some(subject) => vec![subject.to_string()],
        None => ctx.registry.subjects(),
    };

    let mut reports = Vec::new();
    for subject in &subjects {
        let graph = ctx.graph(subject)?;
        reports.push((graph.subject().to_string(), validate(&graph)));
    }
    let failed = reports.iter().filter(|(_, r)| !r.valid).count();

    if ctx.json_mode {
        let mut output = serde_json::Map::new();
        for (subject, report) in &reports {
            output.insert(subject.clone(), serde_json::to_value(report)?);
        }
        print_json(&serde_json::Value::Object(output));
    } else {
        ctx.header("Validation");
        for (subject, report) in &reports {
            let verdict = if report.valid { "ok" } else { "INVALID" };
            println!("{}: {}", subject, verdict);
            for error in &report.errors {
                println!("  error: {}", error);
            }
            for warning in &report.warnings {
                println!("  warning: {}", warning);
            }
            for info in &report.info {
                println!("  info: {}", info);
            }
        }
    }

    if failed > 0 {
        return Err(CurriculumError::InvalidDocument(format!(
            "{} subject(s) failed validation",
            failed
        )));
    }
    Ok(())
}
