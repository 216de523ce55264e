//! Unit tests for noding, merging, and validation.
//!
//! Fixtures build split segments by hand (nominal meter offsets near the
//! origin) so each subsystem is exercised without the detection front end.

#[cfg(test)]
mod fixtures {
    use tn_core::{
        Coord3, NetworkConfig, Polyline, SegmentId, SplitSegment, TrailAttrs, TrailId,
        meters_to_degrees,
    };
    use tn_geom::length_m;

    /// Nominal meter offsets, aligned to the default topology grid so the
    /// noder's snap is an exact identity and length arithmetic stays exact.
    pub fn m(x: f64, y: f64) -> Coord3 {
        const CELL: f64 = 1e-6;
        let lon = (meters_to_degrees(x) / CELL).round() * CELL;
        let lat = (meters_to_degrees(y) / CELL).round() * CELL;
        Coord3::xy(lon, lat)
    }

    pub fn line(pts: &[(f64, f64)]) -> Polyline {
        Polyline::new(pts.iter().map(|&(x, y)| m(x, y)).collect())
    }

    pub fn cfg() -> NetworkConfig {
        NetworkConfig::for_source("test")
    }

    /// A split segment with the given provenance and geometry.
    pub fn seg(id: u32, source_id: &str, index: u32, pts: &[(f64, f64)]) -> SplitSegment {
        named_seg(id, source_id, index, source_id, pts)
    }

    pub fn named_seg(
        id: u32,
        source_id: &str,
        index: u32,
        name: &str,
        pts: &[(f64, f64)],
    ) -> SplitSegment {
        let geometry = line(pts);
        let len = length_m(&geometry).unwrap();
        SplitSegment {
            id: SegmentId(id),
            origin: TrailId(id),
            origin_source_id: source_id.to_string(),
            part: 0,
            segment_index: index,
            source: "test".to_string(),
            attrs: TrailAttrs {
                name: name.to_string(),
                ..TrailAttrs::default()
            },
            geometry,
            start_ratio: 0.0,
            end_ratio: 1.0,
            length_m: len,
        }
    }

    pub fn total_len(segments: &[SplitSegment]) -> f64 {
        segments.iter().map(|s| s.length_m).sum()
    }
}

#[cfg(test)]
mod arena {
    use tn_core::{EdgeId, TrailAttrs};

    use super::fixtures::{line, m};
    use crate::network::TrailNetwork;

    fn two_edge_path() -> TrailNetwork {
        let mut net = TrailNetwork::new();
        let a = net.add_node(m(0.0, 0.0));
        let b = net.add_node(m(0.0, 50.0));
        let c = net.add_node(m(0.0, 100.0));
        net.add_edge(
            a,
            b,
            TrailAttrs::default(),
            line(&[(0.0, 0.0), (0.0, 50.0)]),
            50.0,
            0.0,
            0.0,
            Vec::new(),
        );
        net.add_edge(
            b,
            c,
            TrailAttrs::default(),
            line(&[(0.0, 50.0), (0.0, 100.0)]),
            50.0,
            0.0,
            0.0,
            Vec::new(),
        );
        net
    }

    #[test]
    fn ids_follow_creation_order() {
        let net = two_edge_path();
        let ids: Vec<EdgeId> = net.alive_edges().map(|e| e.id).collect();
        assert_eq!(ids, vec![EdgeId(0), EdgeId(1)]);
        assert_eq!(net.node_count(), 3);
    }

    #[test]
    fn retire_updates_degrees_and_incidence() {
        let mut net = two_edge_path();
        let b = tn_core::NodeId(1);
        assert_eq!(net.degree(b), 2);

        let retired = net.retire_edge(EdgeId(0)).unwrap();
        assert_eq!(retired.id, EdgeId(0));
        assert_eq!(net.degree(b), 1);
        assert_eq!(net.incident_edges(b), &[EdgeId(1)]);
        assert!(net.edge(EdgeId(0)).is_none());
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn double_retire_is_an_error() {
        let mut net = two_edge_path();
        net.retire_edge(EdgeId(0)).unwrap();
        let err = net.retire_edge(EdgeId(0)).unwrap_err();
        assert!(matches!(
            err,
            crate::GraphError::EdgeNotFound(EdgeId(0))
        ));
        assert!(net.require_edge(EdgeId(0)).is_err());
        assert!(net.require_edge(EdgeId(1)).is_ok());
    }

    #[test]
    fn retired_slots_are_never_reused() {
        let mut net = two_edge_path();
        net.retire_edge(EdgeId(1)).unwrap();
        let fresh = net.add_edge(
            tn_core::NodeId(1),
            tn_core::NodeId(2),
            TrailAttrs::default(),
            line(&[(0.0, 50.0), (0.0, 100.0)]),
            50.0,
            0.0,
            0.0,
            Vec::new(),
        );
        assert_eq!(fresh, EdgeId(2), "retired id 1 stays retired");
    }

    #[test]
    fn into_rows_drops_isolated_nodes() {
        let mut net = two_edge_path();
        net.retire_edge(EdgeId(0)).unwrap();
        net.retire_edge(EdgeId(1)).unwrap();
        // Node b lost both edges; a and c likewise — nothing is emitted.
        let (nodes, edges) = net.into_rows();
        assert!(nodes.is_empty());
        assert!(edges.is_empty());
    }
}

#[cfg(test)]
mod noder {
    use super::fixtures::{cfg, m, seg};
    use crate::node::node_network;

    #[test]
    fn chain_of_three_fragments() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
            seg(2, "t3", 1, &[(0.0, 100.0), (0.0, 150.0)]),
        ];
        let (net, report) = node_network(&segments, &config).unwrap();

        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 3);
        assert_eq!(report.duplicate_edges_dropped, 0);

        let degrees: Vec<u32> = net.node_ids().map(|n| net.degree(n)).collect();
        assert_eq!(degrees, vec![1, 2, 2, 1]);
    }

    #[test]
    fn x_crossing_fragments_share_center_node() {
        let config = cfg();
        // Four arms of an X meeting at (5, 5), as the splitter would emit.
        let segments = vec![
            seg(0, "a", 1, &[(0.0, 0.0), (5.0, 5.0)]),
            seg(1, "a", 2, &[(5.0, 5.0), (10.0, 10.0)]),
            seg(2, "b", 1, &[(0.0, 10.0), (5.0, 5.0)]),
            seg(3, "b", 2, &[(5.0, 5.0), (10.0, 0.0)]),
        ];
        let (net, _) = node_network(&segments, &config).unwrap();

        assert_eq!(net.node_count(), 5);
        assert_eq!(net.edge_count(), 4);
        let mut degrees: Vec<u32> = net.node_ids().map(|n| net.degree(n)).collect();
        degrees.sort_unstable();
        assert_eq!(degrees, vec![1, 1, 1, 1, 4]);
    }

    #[test]
    fn terminals_take_canonical_node_coordinates() {
        let config = cfg();
        let segments = vec![seg(0, "t", 1, &[(0.0, 0.0), (0.0, 50.0)])];
        let (net, _) = node_network(&segments, &config).unwrap();

        let edge = net.alive_edges().next().unwrap();
        let src = net.node(edge.source).point;
        let tgt = net.node(edge.target).point;
        assert!(edge.geometry.start().same_position(src));
        assert!(edge.geometry.end().same_position(tgt));
        // Canonical coordinates sit on the topology grid.
        assert!(src.planar_dist_deg(m(0.0, 0.0)) <= config.grid_cell_deg);
    }

    #[test]
    fn exact_duplicate_dropped() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 0.0), (0.0, 50.0)]),
        ];
        let (net, report) = node_network(&segments, &config).unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(report.duplicate_edges_dropped, 1);
    }

    #[test]
    fn reversed_duplicate_also_dropped() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 0.0)]),
        ];
        let (net, report) = node_network(&segments, &config).unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(report.duplicate_edges_dropped, 1);
    }

    #[test]
    fn near_duplicate_kept_and_reported() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 0.0), (10.0, 25.0), (0.0, 50.0)]),
        ];
        let (net, report) = node_network(&segments, &config).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert_eq!(report.near_duplicate_pairs.len(), 1);
    }

    #[test]
    fn closed_ring_broken_at_midpoint() {
        let config = cfg();
        let segments = vec![seg(
            0,
            "loop",
            1,
            &[(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (0.0, 30.0), (0.0, 0.0)],
        )];
        let (net, report) = node_network(&segments, &config).unwrap();

        assert_eq!(report.self_loops_broken, 1);
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
        for edge in net.alive_edges() {
            assert_ne!(edge.source, edge.target, "no self-loop edges survive");
        }
    }

    #[test]
    fn node_ids_follow_source_id_scan_order() {
        let config = cfg();
        // Given out of order; the scan sorts by (origin_source_id, part, index).
        let segments = vec![
            seg(0, "zz", 1, &[(100.0, 0.0), (100.0, 50.0)]),
            seg(1, "aa", 1, &[(0.0, 0.0), (0.0, 50.0)]),
        ];
        let (net, _) = node_network(&segments, &config).unwrap();
        // "aa" is scanned first, so its start owns NodeId(0).
        let n0 = net.node(tn_core::NodeId(0)).point;
        assert!(n0.planar_dist_deg(m(0.0, 0.0)) <= config.grid_cell_deg);
    }
}

#[cfg(test)]
mod merger {
    use approx::assert_relative_eq;

    use super::fixtures::{cfg, named_seg, seg};
    use crate::merge::merge_degree2;
    use crate::node::node_network;

    #[test]
    fn chain_collapses_to_single_edge() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
            seg(2, "t3", 1, &[(0.0, 100.0), (0.0, 150.0)]),
        ];
        let expected_len = super::fixtures::total_len(&segments);
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();

        assert_eq!(report.merged_chains, 1);
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.node_count(), 2);

        let edge = net.alive_edges().next().unwrap();
        assert_relative_eq!(edge.length_m, expected_len, max_relative = 1e-9);

        // Composition: three rows, contiguous, ratios partitioned by length.
        assert_eq!(edge.composition.len(), 3);
        assert_eq!(edge.composition[0].start_ratio, 0.0);
        assert_eq!(edge.composition[2].end_ratio, 1.0);
        for w in edge.composition.windows(2) {
            assert_eq!(w[0].end_ratio, w[1].start_ratio);
        }
        let seqs: Vec<u32> = edge.composition.iter().map(|r| r.segment_seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn reoriented_constituents_stay_continuous() {
        let config = cfg();
        // Middle fragment runs backwards; the merger must flip it.
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 100.0), (0.0, 50.0)]),
            seg(2, "t3", 1, &[(0.0, 100.0), (0.0, 150.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        merge_degree2(&mut net, &config).unwrap();

        let edge = net.alive_edges().next().unwrap();
        assert_eq!(edge.geometry.vertex_count(), 4);
        // Monotone northward: every vertex strictly above the previous.
        for (a, b) in edge.geometry.segments() {
            assert!(b.lat > a.lat);
        }
    }

    #[test]
    fn junction_breaks_the_chain() {
        let config = cfg();
        // Main trail split at a T junction plus the joining spur: the
        // degree-3 node must survive and nothing merges across it.
        let segments = vec![
            seg(0, "main", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "main", 2, &[(0.0, 50.0), (0.0, 100.0)]),
            seg(2, "spur", 1, &[(-40.0, 50.0), (0.0, 50.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();

        assert_eq!(report.merged_chains, 0);
        assert_eq!(net.edge_count(), 3);
        let mut degrees: Vec<u32> = net
            .node_ids()
            .map(|n| net.degree(n))
            .filter(|&d| d > 0)
            .collect();
        degrees.sort_unstable();
        assert_eq!(degrees, vec![1, 1, 1, 3]);
    }

    #[test]
    fn anchored_loop_is_reported_not_merged() {
        let config = cfg();
        // A stem into a lasso: the loop re-enters at the same degree-3 node.
        let segments = vec![
            seg(0, "stem", 1, &[(0.0, -50.0), (0.0, 0.0)]),
            seg(1, "loop", 1, &[(0.0, 0.0), (30.0, 10.0)]),
            seg(2, "loop", 2, &[(30.0, 10.0), (15.0, 40.0)]),
            seg(3, "loop", 3, &[(15.0, 40.0), (0.0, 0.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();

        // The two interior loop vertices stay degree 2 and are reported.
        assert_eq!(report.merged_chains, 0);
        assert_eq!(report.cycle_nodes.len(), 2);
        assert_eq!(net.edge_count(), 4);
        for edge in net.alive_edges() {
            assert_ne!(edge.source, edge.target);
        }
    }

    #[test]
    fn isolated_cycle_promotes_two_boundaries() {
        let config = cfg();
        // A free-floating square ring of four fragments.
        let segments = vec![
            seg(0, "ring", 1, &[(0.0, 0.0), (40.0, 0.0)]),
            seg(1, "ring", 2, &[(40.0, 0.0), (40.0, 40.0)]),
            seg(2, "ring", 3, &[(40.0, 40.0), (0.0, 40.0)]),
            seg(3, "ring", 4, &[(0.0, 40.0), (0.0, 0.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();

        assert_eq!(report.promoted_nodes.len(), 2);
        // Two boundary nodes, two arc edges, no self-loops.
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
        for edge in net.alive_edges() {
            assert_ne!(edge.source, edge.target);
        }
        assert!(!report.cycle_nodes.is_empty());
    }

    #[test]
    fn attributes_aggregate_by_mode() {
        let config = cfg();
        let segments = vec![
            named_seg(0, "t1", 1, "Ridge Trail", &[(0.0, 0.0), (0.0, 50.0)]),
            named_seg(1, "t2", 1, "Ridge Trail", &[(0.0, 50.0), (0.0, 100.0)]),
            named_seg(2, "t3", 1, "Spur", &[(0.0, 100.0), (0.0, 150.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        merge_degree2(&mut net, &config).unwrap();

        let edge = net.alive_edges().next().unwrap();
        assert_eq!(edge.attrs.name, "Ridge Trail");
    }

    #[test]
    fn tie_broken_by_first_encounter() {
        let config = cfg();
        let segments = vec![
            named_seg(0, "t1", 1, "North Fork", &[(0.0, 0.0), (0.0, 50.0)]),
            named_seg(1, "t2", 1, "South Fork", &[(0.0, 50.0), (0.0, 100.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        merge_degree2(&mut net, &config).unwrap();

        let edge = net.alive_edges().next().unwrap();
        assert_eq!(edge.attrs.name, "North Fork");
    }

    #[test]
    fn merge_is_deterministic() {
        let config = cfg();
        let build = || {
            let segments = vec![
                seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
                seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
                seg(2, "t3", 1, &[(0.0, 100.0), (0.0, 150.0)]),
                seg(3, "spur", 1, &[(-40.0, 100.0), (0.0, 100.0)]),
            ];
            let (mut net, _) = node_network(&segments, &config).unwrap();
            merge_degree2(&mut net, &config).unwrap();
            net.into_rows()
        };
        let (nodes_a, edges_a) = build();
        let (nodes_b, edges_b) = build();
        assert_eq!(nodes_a, nodes_b);
        assert_eq!(edges_a.len(), edges_b.len());
        for (a, b) in edges_a.iter().zip(&edges_b) {
            assert_eq!(a.id, b.id);
            assert_eq!((a.source, a.target), (b.source, b.target));
            assert_eq!(a.geometry, b.geometry);
        }
    }

    #[test]
    fn merged_edge_ids_are_fresh() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        merge_degree2(&mut net, &config).unwrap();

        let edge = net.alive_edges().next().unwrap();
        // Two constituent edges held ids 0 and 1; the replacement is new.
        assert_eq!(edge.id, tn_core::EdgeId(2));
    }
}

#[cfg(test)]
mod composition {
    use approx::assert_relative_eq;
    use tn_core::{CompositionRow, SegmentId};

    use crate::compose::{concat_rows, split_rows};

    fn row(segment: u32, seq: u32, start: f64, end: f64, len: f64) -> CompositionRow {
        CompositionRow {
            segment: SegmentId(segment),
            origin_source_id: format!("src-{segment}"),
            segment_seq: seq,
            start_ratio: start,
            end_ratio: end,
            length_m: len,
        }
    }

    #[test]
    fn split_at_midpoint_of_single_row() {
        let rows = vec![row(7, 1, 0.0, 1.0, 120.0)];
        let (head, tail) = split_rows(&rows, 0.5);
        assert_eq!(head.len(), 1);
        assert_eq!(tail.len(), 1);
        // Each half is rescaled to cover [0, 1] of its new edge.
        assert_eq!((head[0].start_ratio, head[0].end_ratio), (0.0, 1.0));
        assert_eq!((tail[0].start_ratio, tail[0].end_ratio), (0.0, 1.0));
        assert_relative_eq!(head[0].length_m, 60.0);
        assert_relative_eq!(tail[0].length_m, 60.0);
        assert_eq!(head[0].segment, SegmentId(7));
    }

    #[test]
    fn split_between_rows_does_not_cut_either() {
        let rows = vec![row(1, 1, 0.0, 0.5, 50.0), row(2, 2, 0.5, 1.0, 50.0)];
        let (head, tail) = split_rows(&rows, 0.5);
        assert_eq!(head.len(), 1);
        assert_eq!(tail.len(), 1);
        assert_eq!(head[0].segment, SegmentId(1));
        assert_eq!(tail[0].segment, SegmentId(2));
    }

    #[test]
    fn concat_rescales_by_length() {
        // 30 m edge then 90 m edge: the boundary lands at 0.25.
        let parts = vec![
            (vec![row(1, 1, 0.0, 1.0, 30.0)], 30.0, false),
            (vec![row(2, 1, 0.0, 1.0, 90.0)], 90.0, false),
        ];
        let rows = concat_rows(&parts);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start_ratio, 0.0);
        assert_relative_eq!(rows[0].end_ratio, 0.25);
        assert_eq!(rows[0].end_ratio, rows[1].start_ratio);
        assert_eq!(rows[1].end_ratio, 1.0);
        assert_eq!(rows[0].segment_seq, 1);
        assert_eq!(rows[1].segment_seq, 2);
    }

    #[test]
    fn reversed_constituent_flips_row_order_and_spans() {
        // An edge made of two rows, traversed tail-to-head in the chain.
        let parts = vec![(
            vec![row(1, 1, 0.0, 0.25, 10.0), row(2, 2, 0.25, 1.0, 30.0)],
            40.0,
            true,
        )];
        let rows = concat_rows(&parts);
        assert_eq!(rows.len(), 2);
        // Reversal puts segment 2 first, covering the mirrored span.
        assert_eq!(rows[0].segment, SegmentId(2));
        assert_eq!((rows[0].start_ratio, rows[0].end_ratio), (0.0, 0.75));
        assert_eq!(rows[1].segment, SegmentId(1));
        assert_eq!((rows[1].start_ratio, rows[1].end_ratio), (0.75, 1.0));
    }
}

#[cfg(test)]
mod validator {
    use super::fixtures::{cfg, line, seg, total_len};
    use crate::merge::merge_degree2;
    use crate::network::TrailNetwork;
    use crate::node::node_network;
    use crate::validate::{Violation, validate};
    use crate::GraphError;

    #[test]
    fn clean_network_passes_strict() {
        let config = cfg();
        let segments = vec![
            seg(0, "a", 1, &[(0.0, 0.0), (5.0, 5.0)]),
            seg(1, "a", 2, &[(5.0, 5.0), (10.0, 10.0)]),
            seg(2, "b", 1, &[(0.0, 10.0), (5.0, 5.0)]),
            seg(3, "b", 2, &[(5.0, 5.0), (10.0, 0.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();
        let outcome = validate(
            &net,
            total_len(&segments),
            segments.len(),
            &report.cycle_nodes,
            report.inconsistencies,
            &config,
        )
        .unwrap();
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn unmerged_degree2_fails_strict() {
        let config = cfg();
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
        ];
        // Validate the noded network without running the merger.
        let (net, _) = node_network(&segments, &config).unwrap();
        let err = validate(&net, total_len(&segments), segments.len(), &[], 0, &config)
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::Invariant(Violation::Degree2Node(_))
        ));
    }

    #[test]
    fn lenient_mode_collects_manifest() {
        let mut config = cfg();
        config.strict_validation = false;
        let segments = vec![
            seg(0, "t1", 1, &[(0.0, 0.0), (0.0, 50.0)]),
            seg(1, "t2", 1, &[(0.0, 50.0), (0.0, 100.0)]),
        ];
        let (net, _) = node_network(&segments, &config).unwrap();
        let outcome =
            validate(&net, total_len(&segments), segments.len(), &[], 0, &config).unwrap();
        assert_eq!(outcome.violations.len(), 1);
        assert!(matches!(outcome.violations[0], Violation::Degree2Node(_)));
    }

    #[test]
    fn reported_cycle_nodes_are_exempt() {
        let config = cfg();
        let segments = vec![
            seg(0, "ring", 1, &[(0.0, 0.0), (40.0, 0.0)]),
            seg(1, "ring", 2, &[(40.0, 0.0), (40.0, 40.0)]),
            seg(2, "ring", 3, &[(40.0, 40.0), (0.0, 40.0)]),
            seg(3, "ring", 4, &[(0.0, 40.0), (0.0, 0.0)]),
        ];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();
        let outcome = validate(
            &net,
            total_len(&segments),
            segments.len(),
            &report.cycle_nodes,
            report.inconsistencies,
            &config,
        )
        .unwrap();
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn self_loop_detected() {
        let mut config = cfg();
        config.strict_validation = false;
        let mut net = TrailNetwork::new();
        let n = net.add_node(super::fixtures::m(0.0, 0.0));
        net.add_edge(
            n,
            n,
            tn_core::TrailAttrs::default(),
            line(&[(0.0, 0.0), (10.0, 10.0), (0.0, 0.0)]),
            30.0,
            0.0,
            0.0,
            Vec::new(),
        );
        let outcome = validate(&net, 30.0, 1, &[], 0, &config).unwrap();
        assert!(outcome
            .violations
            .iter()
            .any(|v| matches!(v, Violation::SelfLoopEdge(_))));
        assert!(outcome
            .violations
            .iter()
            .any(|v| matches!(v, Violation::MissingComposition(_))));
    }

    #[test]
    fn length_conservation_mismatch_detected() {
        let config = cfg();
        let segments = vec![seg(0, "t", 1, &[(0.0, 0.0), (0.0, 100.0)])];
        let (mut net, _) = node_network(&segments, &config).unwrap();
        let report = merge_degree2(&mut net, &config).unwrap();
        // Claim twice the segment length as ground truth.
        let err = validate(
            &net,
            2.0 * total_len(&segments),
            segments.len(),
            &report.cycle_nodes,
            0,
            &config,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GraphError::Invariant(Violation::LengthConservation { .. })
        ));
    }

    #[test]
    fn merge_inconsistencies_surface_as_violation() {
        let mut config = cfg();
        config.strict_validation = false;
        let segments = vec![seg(0, "t", 1, &[(0.0, 0.0), (0.0, 100.0)])];
        let (net, _) = node_network(&segments, &config).unwrap();
        let outcome =
            validate(&net, total_len(&segments), segments.len(), &[], 3, &config).unwrap();
        assert!(outcome
            .violations
            .iter()
            .any(|v| matches!(v, Violation::GeometricInconsistency { chains: 3 })));
    }
}
