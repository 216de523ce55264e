//! The stage driver: raw trails → normalized → detected → split → noded →
//! merged → validated → emitted.
//!
//! Each stage runs under a wall-clock budget and advances the workspace's
//! stage marker on success, so a failed or cancelled run leaves the
//! workspace at its last-completed stage with that stage's artifacts
//! readable.  Recoverable per-row faults accumulate in the report; anything
//! else aborts per the propagation policy.

use tn_core::{BBox, NetworkConfig};
use tn_detect::{detect, normalize, split};
use tn_graph::{merge_degree2, node_network, validate};
use tn_output::NetworkSink;
use tn_workspace::{Stage, Workspace, scoped};

use crate::error::{PipelineError, PipelineResult};
use crate::guard::{CancelToken, StageGuard};
use crate::report::{NetworkResult, RunReport};
use crate::source::TrailSource;

/// Run the full pipeline against a populated workspace.
///
/// Convenience form of [`run_cancellable`] with a token nobody cancels.
pub fn run(ws: &mut Workspace, cfg: &NetworkConfig) -> PipelineResult<NetworkResult> {
    run_cancellable(ws, cfg, &CancelToken::new())
}

/// Run the full pipeline with cooperative cancellation between stages.
///
/// # Errors
///
/// - [`tn_core::CoreError::Tolerance`] before any stage runs, on a bad config.
/// - [`tn_workspace::WorkspaceError`] on stage-order misuse, budget overrun,
///   or cancellation.
/// - [`tn_graph::GraphError::Invariant`] when strict validation fails.
/// - [`tn_output::SinkError`] never — emission is the caller's step.
pub fn run_cancellable(
    ws: &mut Workspace,
    cfg: &NetworkConfig,
    cancel: &CancelToken,
) -> PipelineResult<NetworkResult> {
    cfg.validate()?;
    let mut report = RunReport::default();
    report.counters.raw_rows = ws.raw_trails().len();
    log::info!(
        "pipeline starting on workspace `{}` ({} raw rows, τ = {} m)",
        ws.name(),
        report.counters.raw_rows,
        cfg.intersection_tolerance_m
    );

    // ── Normalize ─────────────────────────────────────────────────────────
    let guard = StageGuard::begin(Stage::Normalized, cfg.stage_timeout_s);
    let normalized = normalize(ws.raw_trails(), cfg);
    report.counters.trails_kept = normalized.trails.len();
    report.counters.trails_rejected = normalized.rejects.len();
    report.counters.flattened_parts = normalized.flattened_parts;
    report.counters.total_trail_length_m =
        normalized.trails.iter().map(|t| t.length_m).sum();
    report.rejects = normalized.rejects;
    ws.set_normalized(normalized.trails)?;
    record(&mut report, Stage::Normalized, guard.finish(ws, cancel)?);

    // ── Detect ────────────────────────────────────────────────────────────
    let guard = StageGuard::begin(Stage::Detected, cfg.stage_timeout_s);
    let detection = detect(ws.trails(), cfg)?;
    report.counters.intersection_points = detection.points.len();
    report.counters.gated_candidates = detection.gated_candidates;
    report.counters.endpoint_snaps = detection.snaps.len();
    ws.set_intersections(detection.points.clone())?;
    record(&mut report, Stage::Detected, guard.finish(ws, cancel)?);

    // ── Split (includes re-normalization of fragment geometry) ────────────
    let guard = StageGuard::begin(Stage::Split, cfg.stage_timeout_s);
    let split_out = split(ws.trails(), &detection, cfg)?;
    report.counters.segments = split_out.segments.len();
    report.counters.refused_cuts = split_out.refused_cuts;
    report.counters.unsplit_trails = split_out.unsplit_trails;
    report.counters.total_segment_length_m =
        split_out.segments.iter().map(|s| s.length_m).sum();
    let segment_count = split_out.segments.len();
    ws.set_segments(split_out.segments)?;
    record(&mut report, Stage::Split, guard.finish(ws, cancel)?);

    // ── Node ──────────────────────────────────────────────────────────────
    let guard = StageGuard::begin(Stage::Noded, cfg.stage_timeout_s);
    let (mut net, noding) = node_network(ws.segments(), cfg)?;
    report.counters.nodes_before_merge = net.node_count();
    report.counters.edges_before_merge = net.edge_count();
    report.counters.duplicate_edges_dropped = noding.duplicate_edges_dropped;
    report.counters.self_loops_broken = noding.self_loops_broken;
    let noded_nodes: Vec<_> = net
        .node_ids()
        .map(|id| net.node(id).clone())
        .filter(|n| n.degree > 0)
        .collect();
    let noded_edges: Vec<_> = net.alive_edges().cloned().collect();
    ws.set_noded(noded_nodes, noded_edges)?;
    record(&mut report, Stage::Noded, guard.finish(ws, cancel)?);

    // ── Merge degree-2 chains ─────────────────────────────────────────────
    let guard = StageGuard::begin(Stage::Merged, cfg.stage_timeout_s);
    let merge = merge_degree2(&mut net, cfg)?;
    report.counters.merged_chains = merge.merged_chains;
    report.counters.merge_passes = merge.passes;
    report.counters.nodes_after_merge = net.node_count();
    report.counters.edges_after_merge = net.edge_count();
    report.cycle_nodes = merge.cycle_nodes.clone();
    report.promoted_nodes = merge.promoted_nodes.clone();
    record(&mut report, Stage::Merged, guard.finish(ws, cancel)?);

    // ── Validate ──────────────────────────────────────────────────────────
    let guard = StageGuard::begin(Stage::Validated, cfg.stage_timeout_s);
    report.counters.total_edge_length_m = net.alive_edges().map(|e| e.length_m).sum();
    let outcome = validate(
        &net,
        report.counters.total_segment_length_m,
        segment_count,
        &merge.cycle_nodes,
        merge.inconsistencies,
        cfg,
    );
    let (nodes, edges) = net.into_rows();
    ws.set_merged(nodes.clone(), edges.clone())?;
    match outcome {
        Ok(v) => report.violations = v.violations,
        Err(e) => {
            // Strict-mode abort: the workspace stays at `merged` with the
            // network inspectable.
            return Err(PipelineError::Graph(e));
        }
    }
    ws.mark_validated()?;
    record(&mut report, Stage::Validated, guard.finish(ws, cancel)?);

    log::info!(
        "pipeline done: {} nodes, {} edges, {} violation(s)",
        nodes.len(),
        edges.len(),
        report.violations.len()
    );
    Ok(NetworkResult { nodes, edges, report })
}

/// Push an emitted network at a sink, one atomic batch per kind.
pub fn emit<K: NetworkSink>(result: &NetworkResult, sink: &mut K) -> PipelineResult<()> {
    sink.write_nodes(&result.nodes)?;
    sink.write_edges(&result.edges)?;
    sink.finish()?;
    Ok(())
}

/// End-to-end convenience: pull from a source, build, emit, tear down.
///
/// The workspace is created, consumed, and destroyed on every exit path.
pub fn build_network<S, K>(
    source: &S,
    bbox: BBox,
    cfg: &NetworkConfig,
    sink: &mut K,
) -> PipelineResult<NetworkResult>
where
    S: TrailSource,
    K: NetworkSink,
{
    let expected = source.count(bbox, &cfg.source_tag);
    log::info!(
        "building network for source `{}` ({expected} rows in bbox)",
        cfg.source_tag
    );
    scoped(None, |ws| {
        ws.populate_trails(source.stream(bbox, &cfg.source_tag))
            .map_err(PipelineError::from)?;
        let result = run_cancellable(ws, cfg, &CancelToken::new())?;
        emit(&result, sink)?;
        Ok(result)
    })
}

fn record(report: &mut RunReport, stage: Stage, secs: f64) {
    report.counters.stage_secs.push((stage, secs));
}
