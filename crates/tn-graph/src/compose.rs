//! Composition bookkeeping: building, reorienting, and rescaling the
//! edge-to-segment provenance rows.

use tn_core::{CompositionRow, SplitSegment};

/// The single-row composition of an edge created directly from one segment.
pub fn single_row(segment: &SplitSegment, edge_len_m: f64) -> Vec<CompositionRow> {
    vec![CompositionRow {
        segment:          segment.id,
        origin_source_id: segment.origin_source_id.clone(),
        segment_seq:      1,
        start_ratio:      0.0,
        end_ratio:        1.0,
        length_m:         edge_len_m,
    }]
}

/// Split one edge's composition proportionally at `ratio` (used when the
/// noder breaks a self-loop at its midpoint).
pub fn split_rows(rows: &[CompositionRow], ratio: f64) -> (Vec<CompositionRow>, Vec<CompositionRow>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    for row in rows {
        if row.end_ratio <= ratio {
            head.push(row.clone());
        } else if row.start_ratio >= ratio {
            tail.push(row.clone());
        } else {
            let span = row.end_ratio - row.start_ratio;
            let frac = (ratio - row.start_ratio) / span;
            let mut a = row.clone();
            let mut b = row.clone();
            a.end_ratio = ratio;
            a.length_m = row.length_m * frac;
            b.start_ratio = ratio;
            b.length_m = row.length_m * (1.0 - frac);
            head.push(a);
            tail.push(b);
        }
    }
    (rescale(head), rescale(tail))
}

/// Concatenate the compositions of a chain's constituent edges in traversal
/// order.  `parts` carries each edge's rows, its length, and whether the
/// traversal runs it tail-to-head.
pub fn concat_rows(parts: &[(Vec<CompositionRow>, f64, bool)]) -> Vec<CompositionRow> {
    let total: f64 = parts.iter().map(|(_, len, _)| *len).sum();
    let mut out: Vec<CompositionRow> = Vec::new();
    let mut offset = 0.0f64;

    for (rows, len, reversed) in parts {
        let oriented: Vec<CompositionRow> = if *reversed {
            rows.iter()
                .rev()
                .map(|r| {
                    let mut r = r.clone();
                    let (s, e) = (r.start_ratio, r.end_ratio);
                    r.start_ratio = 1.0 - e;
                    r.end_ratio = 1.0 - s;
                    r
                })
                .collect()
        } else {
            rows.to_vec()
        };
        for mut row in oriented {
            row.start_ratio = (offset + row.start_ratio * len) / total;
            row.end_ratio = (offset + row.end_ratio * len) / total;
            out.push(row);
        }
        offset += len;
    }

    finalize(out)
}

/// Normalize a row list after a rescale: contiguity, exact 0/1 bounds, and
/// fresh sequence numbers.
fn finalize(mut rows: Vec<CompositionRow>) -> Vec<CompositionRow> {
    if rows.is_empty() {
        return rows;
    }
    rows[0].start_ratio = 0.0;
    let n = rows.len();
    rows[n - 1].end_ratio = 1.0;
    // Stitch float drift at the joins so coverage is exactly contiguous.
    for k in 1..n {
        let boundary = rows[k - 1].end_ratio;
        rows[k].start_ratio = boundary;
    }
    for (k, row) in rows.iter_mut().enumerate() {
        row.segment_seq = (k + 1) as u32;
    }
    rows
}

fn rescale(mut rows: Vec<CompositionRow>) -> Vec<CompositionRow> {
    if rows.is_empty() {
        return rows;
    }
    let lo = rows[0].start_ratio;
    let hi = rows[rows.len() - 1].end_ratio;
    let span = hi - lo;
    if span > 0.0 {
        for row in &mut rows {
            row.start_ratio = (row.start_ratio - lo) / span;
            row.end_ratio = (row.end_ratio - lo) / span;
        }
    }
    finalize(rows)
}
