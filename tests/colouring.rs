//! Graph colouring through the solver: plain satisfiability on a triangle,
//! and the full minimise-colour-usage pipeline (global cardinality, used-bit
//! extraction, usage cap, unique-colour count) on the 10-vertex graph.

use necto::{
    model::Model,
    solver::{
        constraint::{ConstraintKind, Relation},
        search::SearchStatus,
        variable::VariableId,
    },
};
use pretty_assertions::assert_eq;

fn post_edges(model: &mut Model, vertices: &[VariableId], edges: &[(usize, usize)]) {
    for &(from, to) in edges {
        model
            .post(ConstraintKind::AllDifferent {
                vars: vec![vertices[from], vertices[to]],
            })
            .unwrap();
    }
}

const TRIANGLE: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

#[test]
fn a_triangle_cannot_be_coloured_with_two_colours() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut model = Model::new("triangle-2");
    let vertices = model.int_var_array("vertex", 3, 1, 2);
    post_edges(&mut model, &vertices, &TRIANGLE);

    assert!(model.solve().unwrap().is_none());
}

#[test]
fn a_triangle_with_three_colours_uses_all_of_them() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut model = Model::new("triangle-3");
    let vertices = model.int_var_array("vertex", 3, 1, 3);
    post_edges(&mut model, &vertices, &TRIANGLE);

    let solution = model.solve().unwrap().expect("three colours suffice");
    assert!(model.satisfies(&solution));

    let mut used: Vec<i64> = vertices.iter().map(|v| solution.value(*v)).collect();
    used.sort_unstable();
    used.dedup();
    assert_eq!(used.len(), 3);
}

/// The 10-vertex graph: an outer 5-cycle, an inner 5-cycle on the chords,
/// and the spokes between them.
const PETERSEN: [(usize, usize); 15] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 0),
    (0, 5),
    (1, 6),
    (2, 7),
    (3, 8),
    (4, 9),
    (5, 7),
    (7, 9),
    (9, 6),
    (6, 8),
    (8, 5),
];

#[test]
fn minimising_colour_usage_on_the_ten_vertex_graph() {
    let _ = tracing_subscriber::fmt::try_init();

    let colour_count = 5usize;
    let vertex_count = 10usize;
    let max_usage_per_colour = 3i64;

    let mut model = Model::new("colouring");
    let vertex_colours = model.int_var_array("vertexColours", vertex_count, 1, colour_count as i64);
    post_edges(&mut model, &vertex_colours, &PETERSEN);

    // How many times each colour is used.
    let applied_colour_count =
        model.int_var_array("appliedColourCount", colour_count, 0, vertex_count as i64);
    let options: Vec<i64> = (1..=colour_count as i64).collect();
    model
        .post(ConstraintKind::Cardinality {
            vars: vertex_colours.clone(),
            values: options,
            counts: applied_colour_count.clone(),
        })
        .unwrap();

    // One bit per colour: used at least once or not. The bit is the
    // minimum of 1 and the colour's usage count.
    let one = model.fixed_var("one", 1);
    let applied_colours_bit_set = model.int_var_array("appliedColoursBitSet", colour_count, 0, 1);
    for (bit, count) in applied_colours_bit_set
        .iter()
        .zip(applied_colour_count.iter())
    {
        model
            .post(ConstraintKind::Min {
                result: *bit,
                inputs: vec![one, *count],
            })
            .unwrap();
    }

    // No colour may be used more than three times.
    let max_usage = model.int_var("max usage per colour", 0, max_usage_per_colour);
    model
        .post(ConstraintKind::Max {
            result: max_usage,
            inputs: applied_colour_count.clone(),
        })
        .unwrap();

    // Unique colours = sum over the bits; that is what gets minimised.
    let unique_colour_count = model.int_var("unique colour count", 0, colour_count as i64);
    model
        .post(ConstraintKind::Sum {
            terms: applied_colours_bit_set.clone(),
            relation: Relation::Equal,
            total: unique_colour_count,
        })
        .unwrap();
    model.minimize(unique_colour_count).unwrap();

    let optimum = model.optimize().unwrap();
    assert_eq!(optimum.status, SearchStatus::Exhausted);

    let best = optimum.best.expect("the graph is colourable");
    assert!(model.satisfies(&best));

    // Ten vertices at three-per-colour force at least four colours, and a
    // four-colour assignment within the cap exists.
    assert_eq!(best.value(unique_colour_count), 4);
    assert_eq!(optimum.trail.last(), Some(&4));
    assert!(optimum.trail.windows(2).all(|pair| pair[1] < pair[0]));

    for count in &applied_colour_count {
        assert!(best.value(*count) <= max_usage_per_colour);
    }
}
