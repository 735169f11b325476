use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metro_canvas::canvas::reconcile::reconcile;
use metro_canvas::canvas::renderer::build_render_model;
use metro_canvas::models::{EdgeAttributes, LinePathType, LineStyleType, Lines, MetroGraph, NodeAttributes, NodeType, Nodes};
use metro_canvas::storage::{deserialize_graph, serialize_graph};

const ROWS: usize = 20;
const COLS: usize = 20;

/// Grid of stations; each row is one reconciled chain and each column a
/// parallel pair of diagonal lines
fn build_grid() -> MetroGraph {
    let mut graph = MetroGraph::new();
    let id = |r: usize, c: usize| format!("stn_{r}_{c}");

    for r in 0..ROWS {
        for c in 0..COLS {
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (c as f64 * 50.0, r as f64 * 50.0);
            graph
                .add_node(id(r, c), NodeAttributes::new(NodeType::ShmetroBasic, x, y))
                .expect("grid node");
        }
    }

    for r in 0..ROWS {
        for c in 1..COLS {
            let mut attrs = EdgeAttributes::new(LinePathType::Perpendicular, LineStyleType::SingleColor);
            attrs.reconcile_id = format!("row_{r}");
            graph
                .add_line(format!("line_r{r}_{c}"), &id(r, c - 1), &id(r, c), attrs)
                .expect("row line");
        }
    }

    for c in 0..COLS {
        for r in 1..ROWS {
            for lane in 0..2 {
                let line_id = format!("line_c{c}_{r}_{lane}");
                let attrs = EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor);
                graph
                    .add_line(line_id.clone(), &id(r - 1, c), &id(r, c), attrs)
                    .expect("column line");
                graph.make_parallel_index(&line_id, 5.0).expect("parallel lane");
            }
        }
    }

    graph
}

fn benchmark_canvas_pipeline(c: &mut Criterion) {
    let graph = build_grid();
    let json = serialize_graph(&graph).expect("serializes");

    c.bench_function("reconcile", |b| {
        b.iter(|| reconcile(black_box(&graph)));
    });

    // What happens on every committed mutation
    c.bench_function("render_model", |b| {
        b.iter(|| build_render_model(black_box(&graph)));
    });

    c.bench_function("export_import", |b| {
        b.iter(|| deserialize_graph(black_box(&json)).expect("reloads"));
    });
}

criterion_group!(benches, benchmark_canvas_pipeline);
criterion_main!(benches);
