//! The staging workspace: an isolated, named scope owning one run's data.
//!
//! # Lifecycle
//!
//! Created → trails copied in → normalized → intersections detected → trails
//! split → network noded → degree-2 merged → validated → emitted → destroyed.
//! Every stage setter checks that it is the configured successor of the
//! current stage, so a failed run is always left at the last stage that
//! completed, with that stage's artifacts readable.
//!
//! # Uniqueness and teardown
//!
//! Workspace names are process-globally unique while alive (the in-memory
//! analogue of the scratch schemas this design replaces, which leaked when a
//! run died).  `Drop` releases the name and all owned data on every exit
//! path; [`scoped`] is the preferred way to get that guarantee around a
//! closure.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tn_core::{Edge, IntersectionPoint, Node, RawTrail, SplitSegment, Trail};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::stage::Stage;

// ── Name registry ─────────────────────────────────────────────────────────────

fn registry() -> &'static Mutex<HashSet<String>> {
    static R: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    R.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Monotonic suffix so two generated names within the same second differ.
static NAME_SEQ: AtomicU64 = AtomicU64::new(0);

fn generated_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let seq = NAME_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("ws-{secs}-{seq}")
}

// ── Workspace ─────────────────────────────────────────────────────────────────

/// One run's isolated scratch scope.  Exclusively owns every derived
/// artifact; the input store is never touched.
#[derive(Debug)]
pub struct Workspace {
    name:  String,
    stage: Stage,
    /// Cleared when a stage exceeds its budget: the run may not resume.
    viable: bool,

    raw_trails:    Vec<RawTrail>,
    trails:        Vec<Trail>,
    intersections: Vec<IntersectionPoint>,
    segments:      Vec<SplitSegment>,
    nodes:         Vec<Node>,
    edges:         Vec<Edge>,
}

impl Workspace {
    /// Create a workspace with a unique name.
    ///
    /// `token`: caller-supplied name, used verbatim; `None` derives one from
    /// the clock plus a sequence number.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::NameTaken`] when a live workspace already holds the
    /// caller-supplied name.  Fatal to the pipeline — callers may not retry
    /// in place.
    pub fn create(token: Option<&str>) -> WorkspaceResult<Workspace> {
        let name = match token {
            Some(t) => t.to_string(),
            None => generated_name(),
        };
        {
            let mut live = registry().lock().expect("workspace registry poisoned");
            if !live.insert(name.clone()) {
                return Err(WorkspaceError::NameTaken(name));
            }
        }
        log::debug!("workspace `{name}` created");
        Ok(Workspace {
            name,
            stage: Stage::Created,
            viable: true,
            raw_trails:    Vec::new(),
            trails:        Vec::new(),
            intersections: Vec::new(),
            segments:      Vec::new(),
            nodes:         Vec::new(),
            edges:         Vec::new(),
        })
    }

    /// Explicit destruction.  Equivalent to dropping, but reads better at
    /// call sites that want the teardown visible.
    pub fn destroy(self) {}

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last successfully completed stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// False once a stage timed out; the run may only be inspected or
    /// destroyed.
    pub fn is_viable(&self) -> bool {
        self.viable
    }

    pub fn mark_non_viable(&mut self) {
        self.viable = false;
    }

    // ── Stage data, write side ────────────────────────────────────────────
    //
    // Each setter moves the workspace to the stage it completes and fails
    // with `WrongStage` when called out of order.

    /// Copy raw trail rows in (stage: created → populated).
    pub fn populate_trails<I>(&mut self, rows: I) -> WorkspaceResult<()>
    where
        I: IntoIterator<Item = RawTrail>,
    {
        self.advance_to(Stage::Populated)?;
        self.raw_trails = rows.into_iter().collect();
        log::debug!(
            "workspace `{}`: {} raw trail rows staged",
            self.name,
            self.raw_trails.len()
        );
        Ok(())
    }

    /// Install the normalized working set (populated → normalized).
    pub fn set_normalized(&mut self, trails: Vec<Trail>) -> WorkspaceResult<()> {
        self.advance_to(Stage::Normalized)?;
        self.trails = trails;
        Ok(())
    }

    /// Record detector output (normalized → detected).
    pub fn set_intersections(&mut self, points: Vec<IntersectionPoint>) -> WorkspaceResult<()> {
        self.advance_to(Stage::Detected)?;
        self.intersections = points;
        Ok(())
    }

    /// Replace the trail set with split fragments (detected → split).
    pub fn set_segments(&mut self, segments: Vec<SplitSegment>) -> WorkspaceResult<()> {
        self.advance_to(Stage::Split)?;
        self.segments = segments;
        Ok(())
    }

    /// Install the noded network (split → noded).
    pub fn set_noded(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> WorkspaceResult<()> {
        self.advance_to(Stage::Noded)?;
        self.nodes = nodes;
        self.edges = edges;
        Ok(())
    }

    /// Replace the network with its degree-2-merged form (noded → merged).
    pub fn set_merged(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> WorkspaceResult<()> {
        self.advance_to(Stage::Merged)?;
        self.nodes = nodes;
        self.edges = edges;
        Ok(())
    }

    /// Mark validation complete (merged → validated).
    pub fn mark_validated(&mut self) -> WorkspaceResult<()> {
        self.advance_to(Stage::Validated)
    }

    // ── Stage data, read side ─────────────────────────────────────────────

    pub fn raw_trails(&self) -> &[RawTrail] {
        &self.raw_trails
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn intersections(&self) -> &[IntersectionPoint] {
        &self.intersections
    }

    pub fn segments(&self) -> &[SplitSegment] {
        &self.segments
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Move the emitted rows out without cloning (consumes the network).
    pub fn take_network(&mut self) -> (Vec<Node>, Vec<Edge>) {
        (std::mem::take(&mut self.nodes), std::mem::take(&mut self.edges))
    }

    // ── Internal ──────────────────────────────────────────────────────────

    fn advance_to(&mut self, next: Stage) -> WorkspaceResult<()> {
        let expected = self.stage.successor();
        if expected != Some(next) {
            return Err(WorkspaceError::WrongStage {
                name:     self.name.clone(),
                expected: next,
                actual:   self.stage,
            });
        }
        self.stage = next;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Ok(mut live) = registry().lock() {
            live.remove(&self.name);
        }
        log::debug!("workspace `{}` destroyed at stage `{}`", self.name, self.stage);
    }
}

// ── Scoped acquisition ────────────────────────────────────────────────────────

/// Run `f` with a freshly created workspace, guaranteeing teardown on every
/// exit path (success, error, or panic unwind).
pub fn scoped<T, E, F>(token: Option<&str>, f: F) -> Result<T, E>
where
    E: From<WorkspaceError>,
    F: FnOnce(&mut Workspace) -> Result<T, E>,
{
    let mut ws = Workspace::create(token)?;
    f(&mut ws)
}
