// This file is part of the chess-rules library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Count legal move paths.
//!
//! # Examples
//!
//! ```
//! use chess_rules::{perft::perft, Position};
//!
//! let mut pos = Position::new();
//! assert_eq!(perft(&mut pos, 1), 20);
//! assert_eq!(perft(&mut pos, 2), 400);
//! assert_eq!(perft(&mut pos, 3), 8902);
//! ```

use tracing::trace;

use crate::{m::Move, position::Position};

/// Counts legal move paths of a given length.
///
/// Paths with mate or stalemate are not counted unless it occurs in the final
/// position. Useful for comparing, testing and debugging move generation
/// correctness and performance.
///
/// Moves are made and taken back on `pos`, which is left unchanged.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth < 1 {
        1
    } else {
        let moves = pos.legal_moves();

        if depth == 1 {
            moves.len() as u64
        } else {
            moves
                .into_iter()
                .map(|m| {
                    pos.make_move_unchecked(m);
                    let nodes = perft(pos, depth - 1);
                    pos.pop();
                    nodes
                })
                .sum()
        }
    }
}

/// Like [`perft()`], but returns the number of paths below each legal move,
/// in move generation order. Each entry is also logged at trace level.
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth < 1 {
        return Vec::new();
    }

    pos.legal_moves()
        .into_iter()
        .map(|m| {
            let uci = pos.uci(m);
            pos.make_move_unchecked(m);
            let nodes = perft(pos, depth - 1);
            pos.pop();
            trace!(%uci, depth = depth - 1, nodes, "perft divide");
            (m, nodes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero() {
        let mut pos = Position::new();
        assert_eq!(perft(&mut pos, 0), 1);
        assert!(perft_divide(&mut pos, 0).is_empty());
    }

    #[test]
    fn test_divide_sums_to_perft() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("valid fen");
        let before = pos.clone();

        let divide = perft_divide(&mut pos, 2);
        assert_eq!(divide.len(), 48);
        assert_eq!(divide.iter().map(|&(_, nodes)| nodes).sum::<u64>(), 2039);
        assert_eq!(perft(&mut pos, 2), 2039);
        assert_eq!(pos, before);
        assert_eq!(pos.move_stack().len(), 0);
    }

    #[test]
    fn test_stalemate_leaf() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid fen");
        assert_eq!(perft(&mut pos, 1), 0);
        assert_eq!(perft(&mut pos, 3), 0);
    }
}
