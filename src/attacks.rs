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

//! Attack and ray tables.
//!
//! All tables are computed at compile time. Sliding pieces look up the full
//! ray in each direction and cut it off behind the nearest blocker.
//!
//! # Example
//!
//! ```
//! use chess_rules::{attacks, Bitboard, Rank, Square};
//!
//! let occupied = Bitboard::from(Rank::Sixth); // blocking pieces
//! let attacks = attacks::bishop_attacks(Square::C2, occupied);
//! // . . . . . . . .
//! // . . . . . . . .
//! // 0 0 0 0 0 0 1 0
//! // . . . . . 1 . .
//! // 1 . . . 1 . . .
//! // . 1 . 1 . . . .
//! // . . . . . . . .
//! // . 1 . 1 . . . .
//!
//! assert!(attacks.contains(Square::G6));
//! assert!(!attacks.contains(Square::H7));
//! ```

use crate::{
    bitboard::Bitboard,
    color::{ByColor, Color},
    role::Role,
    square::Square,
    types::Piece,
};

const KING_DELTAS: [i32; 8] = [9, 8, 7, 1, -9, -8, -7, -1];
const KNIGHT_DELTAS: [i32; 8] = [17, 15, 10, 6, -17, -15, -10, -6];
const WHITE_PAWN_DELTAS: [i32; 2] = [7, 9];
const BLACK_PAWN_DELTAS: [i32; 2] = [-7, -9];

// Positive directions first. Rays in a positive direction are scanned for
// their lowest blocker, rays in a negative direction for their highest.
const NORTH: usize = 0;
const EAST: usize = 1;
const NORTH_EAST: usize = 2;
const NORTH_WEST: usize = 3;
const SOUTH: usize = 4;
const WEST: usize = 5;
const SOUTH_WEST: usize = 6;
const SOUTH_EAST: usize = 7;

const DIRECTION_DELTAS: [i32; 8] = [8, 1, 9, 7, -8, -1, -9, -7];

/// Walks from `square` in each of the given directions until leaving the
/// board or hitting an occupied square, which is included.
const fn sliding_attacks(square: i32, occupied: u64, deltas: &[i32]) -> u64 {
    let mut attack = 0;

    let mut i = 0;
    let len = deltas.len();
    while i < len {
        let mut previous = square;
        loop {
            let sq = previous + deltas[i];
            let file_diff = (sq & 0x7) - (previous & 0x7);
            if file_diff > 2 || file_diff < -2 || sq < 0 || sq > 63 {
                break;
            }
            let bb = 1 << sq;
            attack |= bb;
            if occupied & bb != 0 {
                break;
            }
            previous = sq;
        }
        i += 1;
    }

    attack
}

const fn bootstrap_stepping_attacks(deltas: &[i32]) -> [u64; 64] {
    let mut table = [0; 64];
    let mut sq = 0;
    while sq < 64 {
        // Every target is occupied, so only one step is taken.
        table[sq] = sliding_attacks(sq as i32, !0, deltas);
        sq += 1;
    }
    table
}

const fn bootstrap_directional_rays() -> [[u64; 64]; 8] {
    let mut table = [[0; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let mut sq = 0;
        while sq < 64 {
            table[dir][sq] = sliding_attacks(sq as i32, 0, &[DIRECTION_DELTAS[dir]]);
            sq += 1;
        }
        dir += 1;
    }
    table
}

const fn bootstrap_rays() -> [[u64; 64]; 64] {
    let directional = bootstrap_directional_rays();
    let mut table = [[0; 64]; 64];
    let mut a = 0;
    while a < 64 {
        let mut dir = 0;
        while dir < 8 {
            let ray = directional[dir][a];
            let line = ray | directional[(dir + 4) % 8][a] | (1 << a);
            let mut rest = ray;
            while rest != 0 {
                let b = rest.trailing_zeros() as usize;
                table[a][b] = line;
                rest &= rest - 1;
            }
            dir += 1;
        }
        a += 1;
    }
    table
}

static KNIGHT_ATTACKS: [u64; 64] = bootstrap_stepping_attacks(&KNIGHT_DELTAS);
static KING_ATTACKS: [u64; 64] = bootstrap_stepping_attacks(&KING_DELTAS);
static PAWN_ATTACKS: ByColor<[u64; 64]> = ByColor {
    white: bootstrap_stepping_attacks(&WHITE_PAWN_DELTAS),
    black: bootstrap_stepping_attacks(&BLACK_PAWN_DELTAS),
};
static DIRECTIONAL_RAYS: [[u64; 64]; 8] = bootstrap_directional_rays();
static RAYS: [[u64; 64]; 64] = bootstrap_rays();

/// Squares attacked by a slider in one direction, up to and including the
/// first blocker.
#[inline]
const fn ray_attacks(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = DIRECTIONAL_RAYS[dir][sq.to_usize()];
    let blockers = ray & occupied.0;
    if blockers == 0 {
        Bitboard(ray)
    } else {
        let blocker = if dir < SOUTH {
            blockers.trailing_zeros()
        } else {
            63 - blockers.leading_zeros()
        };
        Bitboard(ray ^ DIRECTIONAL_RAYS[dir][blocker as usize])
    }
}

/// Looks up attacks for a pawn of `color` on `sq`.
#[inline]
pub const fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS.get(color)[sq.to_usize()])
}

/// Looks up attacks for a knight on `sq`.
#[inline]
pub const fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.to_usize()])
}

/// Looks up attacks for a king on `sq`.
#[inline]
pub const fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.to_usize()])
}

/// Computes attacks for a rook on `sq` with `occupied` squares.
#[inline]
pub const fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Bitboard(
        ray_attacks(NORTH, sq, occupied).0
            | ray_attacks(EAST, sq, occupied).0
            | ray_attacks(SOUTH, sq, occupied).0
            | ray_attacks(WEST, sq, occupied).0,
    )
}

/// Computes attacks for a bishop on `sq` with `occupied` squares.
#[inline]
pub const fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Bitboard(
        ray_attacks(NORTH_EAST, sq, occupied).0
            | ray_attacks(NORTH_WEST, sq, occupied).0
            | ray_attacks(SOUTH_WEST, sq, occupied).0
            | ray_attacks(SOUTH_EAST, sq, occupied).0,
    )
}

/// Computes attacks for a queen on `sq` with `occupied` squares.
#[inline]
pub const fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Bitboard(rook_attacks(sq, occupied).0 | bishop_attacks(sq, occupied).0)
}

/// Computes attacks for `piece` on `sq` with `occupied` squares.
pub const fn attacks(sq: Square, piece: Piece, occupied: Bitboard) -> Bitboard {
    match piece.role {
        Role::Pawn => pawn_attacks(piece.color, sq),
        Role::Knight => knight_attacks(sq),
        Role::Bishop => bishop_attacks(sq, occupied),
        Role::Rook => rook_attacks(sq, occupied),
        Role::Queen => queen_attacks(sq, occupied),
        Role::King => king_attacks(sq),
    }
}

/// The rank, file or diagonal with the two squares (or an empty [`Bitboard`]
/// if they are not aligned).
///
/// # Example
///
/// ```
/// use chess_rules::{attacks, Square};
///
/// let ray = attacks::ray(Square::E2, Square::G4);
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . 1
/// // . . . . . . 1 .
/// // . . . . . 1 . .
/// // . . . . 1 . . .
/// // . . . 1 . . . .
///
/// assert!(ray.contains(Square::D1));
/// assert!(ray.contains(Square::H5));
/// ```
#[inline]
pub const fn ray(a: Square, b: Square) -> Bitboard {
    Bitboard(RAYS[a.to_usize()][b.to_usize()])
}

/// The squares between the two squares (bounds not included), or an empty
/// [`Bitboard`] if they are not on the same rank, file or diagonal.
///
/// # Example
///
/// ```
/// use chess_rules::{attacks, Square};
///
/// let between = attacks::between(Square::B1, Square::B7);
/// // . . . . . . . .
/// // . 0 . . . . . .
/// // . 1 . . . . . .
/// // . 1 . . . . . .
/// // . 1 . . . . . .
/// // . 1 . . . . . .
/// // . 1 . . . . . .
/// // . 0 . . . . . .
///
/// assert_eq!(between.count(), 5);
/// ```
#[inline]
pub const fn between(a: Square, b: Square) -> Bitboard {
    let bb = ray(a, b).0 & ((!0 << a.to_u32()) ^ (!0 << b.to_u32()));
    Bitboard(bb & bb.wrapping_sub(1))
}

/// Tests if all three squares are aligned on a rank, file or diagonal.
///
/// # Example
///
/// ```
/// use chess_rules::{attacks, Square};
///
/// assert!(attacks::aligned(Square::A1, Square::B2, Square::C3));
/// assert!(!attacks::aligned(Square::A1, Square::B2, Square::C2));
/// ```
#[inline]
pub const fn aligned(a: Square, b: Square, c: Square) -> bool {
    ray(a, b).contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rook_attacks() {
        assert_eq!(
            rook_attacks(Square::D6, Bitboard(0x3f7f_2880_2826_f5b9)),
            Bitboard(0x0008_3708_0800_0000)
        );
    }

    #[test]
    fn test_matches_ray_walk() {
        let occupied = Bitboard(0x0024_1800_4281_0a00);
        for sq in Square::ALL {
            assert_eq!(
                rook_attacks(sq, occupied).0,
                sliding_attacks(sq as i32, occupied.0, &[8, 1, -8, -1])
            );
            assert_eq!(
                bishop_attacks(sq, occupied).0,
                sliding_attacks(sq as i32, occupied.0, &[9, 7, -9, -7])
            );
        }
    }

    #[test]
    fn test_stepping_attacks() {
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(Square::D4).count(), 8);
        assert_eq!(king_attacks(Square::H8).count(), 3);
        assert_eq!(
            pawn_attacks(Color::White, Square::E4),
            Bitboard::from(Square::D5) | Square::F5
        );
        assert_eq!(
            pawn_attacks(Color::Black, Square::A7),
            Bitboard::from(Square::B6)
        );
    }

    #[test]
    fn test_between() {
        assert_eq!(between(Square::A1, Square::A1), Bitboard::EMPTY);
        assert_eq!(between(Square::A1, Square::B2), Bitboard::EMPTY);
        assert_eq!(between(Square::A1, Square::C3), Bitboard::from(Square::B2));
        assert_eq!(between(Square::H1, Square::E1), between(Square::E1, Square::H1));
        assert_eq!(between(Square::E1, Square::H1).count(), 2);
        assert_eq!(between(Square::A1, Square::B3), Bitboard::EMPTY);
    }

    #[test]
    fn test_ray() {
        assert_eq!(ray(Square::A1, Square::A1), Bitboard::EMPTY);
        assert_eq!(ray(Square::A1, Square::B3), Bitboard::EMPTY);
        assert_eq!(ray(Square::A1, Square::A8), Bitboard::from_file(crate::File::A));
        assert_eq!(ray(Square::D4, Square::B2), ray(Square::H8, Square::A1));
    }
}
