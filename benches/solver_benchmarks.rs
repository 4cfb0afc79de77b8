use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use necto::{
    model::Model,
    solver::constraint::ConstraintKind,
};

/// N-queens: one queen per row, a column variable each, diagonals made
/// all-different through offset auxiliary variables.
fn n_queens_model(n: usize) -> Model {
    let mut model = Model::new("n-queens");
    let queens = model.int_var_array("queen", n, 1, n as i64);

    let mut rising = Vec::with_capacity(n);
    let mut falling = Vec::with_capacity(n);
    for (row, &queen) in queens.iter().enumerate() {
        let offset = row as i64;
        let up = model.int_var(format!("up[{row}]"), 1, 2 * n as i64);
        let down = model.int_var(format!("down[{row}]"), 1 - n as i64, n as i64);
        // up = queen + row, down = queen - row
        model
            .post(ConstraintKind::LinearEquality {
                terms: vec![(1, queen), (-1, up)],
                constant: -offset,
            })
            .unwrap();
        model
            .post(ConstraintKind::LinearEquality {
                terms: vec![(1, queen), (-1, down)],
                constant: offset,
            })
            .unwrap();
        rising.push(up);
        falling.push(down);
    }

    model
        .post(ConstraintKind::AllDifferent { vars: queens })
        .unwrap();
    model
        .post(ConstraintKind::AllDifferent { vars: rising })
        .unwrap();
    model
        .post(ConstraintKind::AllDifferent { vars: falling })
        .unwrap();
    model
}

fn sudoku_model() -> Model {
    const PUZZLE: [[i64; 9]; 9] = [
        [5, 3, 0, 0, 7, 0, 0, 0, 0],
        [6, 0, 0, 1, 9, 5, 0, 0, 0],
        [0, 9, 8, 0, 0, 0, 0, 6, 0],
        [8, 0, 0, 0, 6, 0, 0, 0, 3],
        [4, 0, 0, 8, 0, 3, 0, 0, 1],
        [7, 0, 0, 0, 2, 0, 0, 0, 6],
        [0, 6, 0, 0, 0, 0, 2, 8, 0],
        [0, 0, 0, 4, 1, 9, 0, 0, 5],
        [0, 0, 0, 0, 8, 0, 0, 7, 9],
    ];

    let mut model = Model::new("sudoku");
    let variables: Vec<Vec<_>> = (0..9)
        .map(|row| {
            (0..9)
                .map(|col| {
                    if PUZZLE[row][col] == 0 {
                        model.int_var(format!("[{row}.{col}]"), 1, 9)
                    } else {
                        model.fixed_var(format!("[{row}.{col}]"), PUZZLE[row][col])
                    }
                })
                .collect()
        })
        .collect();

    for row in &variables {
        model
            .post(ConstraintKind::AllDifferent { vars: row.clone() })
            .unwrap();
    }
    for col in 0..9 {
        model
            .post(ConstraintKind::AllDifferent {
                vars: (0..9).map(|row| variables[row][col]).collect(),
            })
            .unwrap();
    }
    for band in 0..3 {
        for stack in 0..3 {
            model
                .post(ConstraintKind::AllDifferent {
                    vars: variables[(band * 3)..(band * 3 + 3)]
                        .iter()
                        .flat_map(|row| &row[(stack * 3)..(stack * 3 + 3)])
                        .copied()
                        .collect(),
                })
                .unwrap();
        }
    }
    model
}

fn bench_n_queens(c: &mut Criterion) {
    let mut group = c.benchmark_group("n_queens");
    for n in [6usize, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let model = n_queens_model(n);
            b.iter(|| {
                let solution = model.solve().unwrap();
                black_box(solution.is_some())
            });
        });
    }
    group.finish();
}

fn bench_sudoku(c: &mut Criterion) {
    let model = sudoku_model();
    c.bench_function("sudoku_hardcoded", |b| {
        b.iter(|| {
            let solution = model.solve().unwrap();
            black_box(solution.is_some())
        });
    });
}

criterion_group!(benches, bench_n_queens, bench_sudoku);
criterion_main!(benches);
