use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use chess_rules::{perft::perft, CastlingMode, Move, Position, Square};

const OPERA_GAME: [&str; 33] = [
    "e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5", "Bc4", "Nf6", "Qb3",
    "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7", "O-O-O", "Rd8", "Rxd7",
    "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#",
];

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);

    group.bench_function("start depth 4", |b| {
        let mut pos = Position::new();
        b.iter(|| assert_eq!(perft(black_box(&mut pos), 4), 197_281));
    });

    group.bench_function("kiwipete depth 3", |b| {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("valid fen");
        b.iter(|| assert_eq!(perft(black_box(&mut pos), 3), 97_862));
    });

    group.finish();
}

fn bench_generate_moves(c: &mut Criterion) {
    let pos = Position::from_fen_with_mode(
        "rn1qkb1r/pbp2ppp/1p2p3/3n4/8/2N2NP1/PP1PPPBP/R1BQ1RK1 b kq - 0 1",
        CastlingMode::Chess960,
    )
    .expect("valid fen");

    c.bench_function("legal moves", |b| {
        b.iter(|| black_box(&pos).legal_moves())
    });
    c.bench_function("pseudo-legal moves", |b| {
        b.iter(|| black_box(&pos).pseudo_legal_moves())
    });
}

fn bench_make_and_pop(c: &mut Criterion) {
    let mut pos = Position::from_fen(
        "rn1qkb1r/pbp2ppp/1p2p3/3n4/8/2N2NP1/PP1PPPBP/R1BQ1RK1 b kq - 0 1",
    )
    .expect("valid fen");
    let m = Move::new(Square::F8, Square::E7);

    c.bench_function("make and pop", |b| {
        b.iter(|| {
            pos.make_move_unchecked(black_box(m));
            pos.pop()
        })
    });
}

fn bench_play_sans(c: &mut Criterion) {
    c.bench_function("play sans", |b| {
        b.iter(|| {
            let mut pos = Position::new();
            for san in OPERA_GAME {
                pos.push_san(black_box(san)).expect("legal san");
            }
            assert!(pos.is_checkmate());
            pos
        })
    });
}

fn bench_outcome(c: &mut Criterion) {
    let mut pos = Position::new();
    for san in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"] {
        pos.push_san(san).expect("legal san");
    }

    c.bench_function("outcome with claims", |b| {
        b.iter(|| black_box(&pos).outcome(true))
    });
    c.bench_function("zobrist hash", |b| {
        b.iter(|| black_box(&pos).zobrist_hash())
    });
}

criterion_group!(
    benches,
    bench_perft,
    bench_generate_moves,
    bench_make_and_pop,
    bench_play_sans,
    bench_outcome
);
criterion_main!(benches);
