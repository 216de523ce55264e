//! mini — smallest runnable example of the trailnet pipeline.
//!
//! Builds a routable network from nine synthetic foothills trails and
//! writes `nodes.csv`, `edges.csv`, and `composition.csv` to `./output`.
//! Swap [`region::trails`] for a real source adapter to run a regional
//! corpus; the pipeline code is identical.
//!
//! Run with stage logging:
//!
//! ```text
//! RUST_LOG=info cargo run -p mini
//! ```

mod region;

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use tn_core::{BBox, NetworkConfig};
use tn_output::CsvSink;
use tn_pipeline::{MemorySource, TrailSource, build_network};

const OUTPUT_DIR: &str = "output";

fn main() -> Result<()> {
    env_logger::init();

    let source = MemorySource::new(region::trails());
    let cfg = NetworkConfig::for_source("demo");

    // Generous box around the synthetic region.
    let bbox = BBox {
        min_lon: -105.31,
        min_lat: 39.99,
        max_lon: -105.27,
        max_lat: 40.01,
    };
    println!(
        "mini: {} trail rows, τ = {} m",
        source.count(bbox, &cfg.source_tag),
        cfg.intersection_tolerance_m
    );

    fs::create_dir_all(OUTPUT_DIR)?;
    let mut sink = CsvSink::create(Path::new(OUTPUT_DIR))?;

    let started = Instant::now();
    let result = build_network(&source, bbox, &cfg, &mut sink)?;
    let elapsed = started.elapsed();

    let c = &result.report.counters;
    println!(
        "built in {:.1} ms: {} trails -> {} segments -> {} edges / {} nodes",
        elapsed.as_secs_f64() * 1e3,
        c.trails_kept,
        c.segments,
        result.edges.len(),
        result.nodes.len(),
    );
    println!(
        "  {} intersection points, {} endpoint snaps, {} chains merged in {} passes",
        c.intersection_points, c.endpoint_snaps, c.merged_chains, c.merge_passes,
    );
    println!(
        "  length: {:.1} m in, {:.1} m out",
        c.total_segment_length_m, c.total_edge_length_m,
    );
    if !result.report.cycle_nodes.is_empty() {
        println!("  cycles reported at nodes {:?}", result.report.cycle_nodes);
    }
    for reject in &result.report.rejects {
        println!("  rejected `{}`: {}", reject.source_id, reject.reason);
    }
    println!("wrote {OUTPUT_DIR}/nodes.csv, edges.csv, composition.csv");
    Ok(())
}
