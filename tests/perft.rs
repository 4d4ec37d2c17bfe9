use std::{
    fs::File,
    io::{prelude::*, BufReader},
};

use chess_rules::{perft::perft, CastlingMode, Position};

fn test_perft_file(path: &str, mode: CastlingMode, node_limit: u64) {
    let file = File::open(path).expect("failed to open test suite");
    let reader = BufReader::new(file);

    let mut pos = Position::new();

    for line in reader.lines().map(|l| l.expect("readable line")) {
        println!("{line}");

        let trimmed = line.trim();
        let mut slices = trimmed.splitn(2, ' ');

        match slices.next() {
            Some("epd") => {
                pos = Position::from_fen_with_mode(slices.next().expect("missing epd"), mode)
                    .expect("invalid fen");
                assert!(pos.validate().is_ok(), "invalid position: {line}");
            }
            Some("perft") => {
                let mut params = slices.next().expect("missing perft params").splitn(2, ' ');

                let depth = params
                    .next()
                    .expect("missing perft depth")
                    .parse()
                    .expect("depth not an integer");

                let nodes = params
                    .next()
                    .expect("missing perft nodes")
                    .parse()
                    .expect("nodes not an integer");

                if nodes <= node_limit {
                    assert_eq!(perft(&mut pos, depth), nodes);
                }
            }
            _ => {}
        }
    }
}

macro_rules! gen_tests {
    ($($fn_name:ident, $path:tt, $mode:expr, $num:expr,)+) => {
        $(
            #[test]
            #[cfg_attr(miri, ignore)]
            fn $fn_name() {
                test_perft_file($path, $mode, $num);
            }
        )+
    }
}

gen_tests! {
    test_tricky,   "tests/tricky.perft",   CastlingMode::Standard, 100_000,
    test_chess960, "tests/chess960.perft", CastlingMode::Chess960, 100_000,
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_start_position() {
    let mut pos = Position::new();
    assert_eq!(perft(&mut pos, 1), 20);
    assert_eq!(perft(&mut pos, 2), 400);
    assert_eq!(perft(&mut pos, 3), 8902);
    assert_eq!(perft(&mut pos, 4), 197_281);
    assert_eq!(perft(&mut pos, 5), 4_865_609);
    assert_eq!(pos, Position::new());
}
