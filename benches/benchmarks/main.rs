use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use itertools::Itertools as _;
use rand::{SeedableRng, rngs::StdRng};
use twenty_fourty_eight_engine::board::{Board, Direction, test_utils};

/// Generate a vector of random boards for benchmarking.
fn generate_boards(count: usize) -> Vec<Board> {
    let rng = &mut StdRng::seed_from_u64(0);

    (0..16)
        .flat_map(|filled| (0..filled).cartesian_product(0..count).map(move |(dup, _)| (filled, dup)))
        .map(|(filled, dup)| test_utils::generate_random_board(4, filled, dup, rng))
        .collect()
}

fn bench_swipe(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("swipe");

    let boards = generate_boards(COUNT);
    group.throughput(Throughput::Elements(boards.len() as u64));

    group.bench_function("baseline_swipe", |b| {
        b.iter(|| {
            for board in &boards {
                black_box(test_utils::baseline_swipe(board, Direction::Down));
            }
        });
    });

    group.bench_function("swipe", |b| {
        b.iter(|| {
            for board in &boards {
                black_box(board.swipe(Direction::Down));
            }
        });
    });

    group.bench_function("terminal_loss", |b| {
        b.iter(|| {
            for board in &boards {
                black_box(board.is_terminal_loss());
            }
        });
    });
}

criterion_group!(benches, bench_swipe);
criterion_main!(benches);
