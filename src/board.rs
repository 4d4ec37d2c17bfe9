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

use std::fmt::{self, Write as _};

use crate::{
    attacks,
    bitboard::Bitboard,
    color::{ByColor, Color},
    role::{ByRole, Role},
    square::{File, Rank, Square},
    types::Piece,
};

/// [`Piece`] positions on a board.
///
/// A board only knows where the pieces are. Side to move, castling rights
/// and clocks live in [`Position`](crate::Position).
///
/// # Examples
///
/// ```
/// use chess_rules::{Board, Color, Square};
///
/// let board = Board::new();
/// // r n b q k b n r
/// // p p p p p p p p
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . .
/// // . . . . . . . .
/// // P P P P P P P P
/// // R N B Q K B N R
///
/// assert_eq!(board.piece_at(Square::E1), Some(Color::White.king()));
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Board {
    by_role: ByRole<Bitboard>,
    by_color: ByColor<Bitboard>,
    occupied: Bitboard,
}

impl Board {
    /// The standard starting arrangement.
    pub const fn new() -> Board {
        Board {
            by_role: ByRole {
                pawn: Bitboard(0x00ff_0000_0000_ff00),
                knight: Bitboard(0x4200_0000_0000_0042),
                bishop: Bitboard(0x2400_0000_0000_0024),
                rook: Bitboard(0x8100_0000_0000_0081),
                queen: Bitboard(0x0800_0000_0000_0008),
                king: Bitboard(0x1000_0000_0000_0010),
            },
            by_color: ByColor {
                white: Bitboard(0xffff),
                black: Bitboard(0xffff_0000_0000_0000),
            },
            occupied: Bitboard(0xffff_0000_0000_ffff),
        }
    }

    /// A board without any pieces.
    pub const fn empty() -> Board {
        Board {
            by_role: ByRole {
                pawn: Bitboard::EMPTY,
                knight: Bitboard::EMPTY,
                bishop: Bitboard::EMPTY,
                rook: Bitboard::EMPTY,
                queen: Bitboard::EMPTY,
                king: Bitboard::EMPTY,
            },
            by_color: ByColor {
                white: Bitboard::EMPTY,
                black: Bitboard::EMPTY,
            },
            occupied: Bitboard::EMPTY,
        }
    }

    #[inline]
    pub const fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub const fn pawns(&self) -> Bitboard {
        self.by_role.pawn
    }

    #[inline]
    pub const fn knights(&self) -> Bitboard {
        self.by_role.knight
    }

    #[inline]
    pub const fn bishops(&self) -> Bitboard {
        self.by_role.bishop
    }

    #[inline]
    pub const fn rooks(&self) -> Bitboard {
        self.by_role.rook
    }

    #[inline]
    pub const fn queens(&self) -> Bitboard {
        self.by_role.queen
    }

    #[inline]
    pub const fn kings(&self) -> Bitboard {
        self.by_role.king
    }

    #[inline]
    pub const fn white(&self) -> Bitboard {
        self.by_color.white
    }

    #[inline]
    pub const fn black(&self) -> Bitboard {
        self.by_color.black
    }

    /// Bishops, rooks and queens.
    #[inline]
    pub const fn sliders(&self) -> Bitboard {
        Bitboard(self.bishops().0 | self.rooks().0 | self.queens().0)
    }

    /// Pieces that move diagonally: bishops and queens.
    #[inline]
    pub const fn bishops_and_queens(&self) -> Bitboard {
        Bitboard(self.bishops().0 | self.queens().0)
    }

    /// Pieces that move along ranks and files: rooks and queens.
    #[inline]
    pub const fn rooks_and_queens(&self) -> Bitboard {
        Bitboard(self.rooks().0 | self.queens().0)
    }

    #[inline]
    pub const fn by_color(&self, color: Color) -> Bitboard {
        *self.by_color.get(color)
    }

    #[inline]
    pub const fn by_role(&self, role: Role) -> Bitboard {
        *self.by_role.get(role)
    }

    #[inline]
    pub const fn by_piece(&self, piece: Piece) -> Bitboard {
        Bitboard(self.by_color(piece.color).0 & self.by_role(piece.role).0)
    }

    /// Gets the square of the king of the given color, if there is exactly
    /// one.
    #[inline]
    pub const fn king_of(&self, color: Color) -> Option<Square> {
        Bitboard(self.kings().0 & self.by_color(color).0).single_square()
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.white().contains(sq) {
            Some(Color::White)
        } else if self.black().contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn role_at(&self, sq: Square) -> Option<Role> {
        if !self.occupied.contains(sq) {
            None
        } else {
            self.by_role.find(|bb| bb.contains(sq))
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let role = self.role_at(sq)?;
        self.color_at(sq).map(|color| role.of(color))
    }

    /// Removes and returns the piece on `sq`, if any.
    pub fn remove_piece_at(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.piece_at(sq);
        if let Some(piece) = piece {
            self.by_role.get_mut(piece.role).toggle(sq);
            self.by_color.get_mut(piece.color).toggle(sq);
            self.occupied.toggle(sq);
        }
        piece
    }

    /// Puts `piece` on `sq`, replacing any piece that was there.
    pub fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        self.discard_piece_at(sq);
        self.by_role.get_mut(piece.role).add(sq);
        self.by_color.get_mut(piece.color).add(sq);
        self.occupied.add(sq);
    }

    #[inline]
    pub fn discard_piece_at(&mut self, sq: Square) {
        self.by_role.pawn.discard(sq);
        self.by_role.knight.discard(sq);
        self.by_role.bishop.discard(sq);
        self.by_role.rook.discard(sq);
        self.by_role.queen.discard(sq);
        self.by_role.king.discard(sq);
        self.by_color.white.discard(sq);
        self.by_color.black.discard(sq);
        self.occupied.discard(sq);
    }

    /// The squares attacked by the piece on `sq`, given the current
    /// occupancy. Empty if `sq` is empty.
    #[inline]
    pub fn attacks_from(&self, sq: Square) -> Bitboard {
        self.piece_at(sq)
            .map_or(Bitboard::EMPTY, |piece| attacks::attacks(sq, piece, self.occupied))
    }

    /// The pieces of `attacker` that attack `sq`, with sliders blocked by
    /// `occupied`.
    ///
    /// Passing a modified `occupied` allows asking what would be attacked
    /// after pieces have moved, e.g. with the king itself removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{Board, Color, Square};
    ///
    /// let board = Board::new();
    /// let attackers = board.attackers_of(Square::F3, Color::White, board.occupied());
    /// assert_eq!(attackers.count(), 3); // g1 knight, e2 and g2 pawns
    /// ```
    pub fn attackers_of(&self, sq: Square, attacker: Color, occupied: Bitboard) -> Bitboard {
        self.by_color(attacker)
            & ((attacks::rook_attacks(sq, occupied) & self.rooks_and_queens())
                | (attacks::bishop_attacks(sq, occupied) & self.bishops_and_queens())
                | (attacks::knight_attacks(sq) & self.knights())
                | (attacks::king_attacks(sq) & self.kings())
                | (attacks::pawn_attacks(!attacker, sq) & self.pawns()))
    }

    /// Tests if any piece of `attacker` attacks `sq`. Stops at the first
    /// class of attacker found.
    pub fn is_attacked_by(&self, sq: Square, attacker: Color, occupied: Bitboard) -> bool {
        let them = self.by_color(attacker);
        (attacks::knight_attacks(sq) & self.knights() & them).is_nonempty()
            || (attacks::pawn_attacks(!attacker, sq) & self.pawns() & them).is_nonempty()
            || (attacks::king_attacks(sq) & self.kings() & them).is_nonempty()
            || (attacks::rook_attacks(sq, occupied) & self.rooks_and_queens() & them)
                .is_nonempty()
            || (attacks::bishop_attacks(sq, occupied) & self.bishops_and_queens() & them)
                .is_nonempty()
    }

    /// Mirrors the board vertically and swaps piece colors, so that the
    /// result looks the same from the other side.
    pub fn mirror(&mut self) {
        self.by_role = self.by_role.map(Bitboard::flip_vertical);
        self.occupied = self.occupied.flip_vertical();
        self.by_color = ByColor {
            white: self.by_color.black.flip_vertical(),
            black: self.by_color.white.flip_vertical(),
        };
    }

    /// The number of pieces of each role, for both sides.
    pub fn material(&self) -> ByColor<ByRole<u8>> {
        ByColor::new_with(|color| {
            ByRole::new_with(|role| {
                (self.by_piece(role.of(color))).count() as u8
            })
        })
    }

    /// Iterates over all pieces, from `a1` to `h8`.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied
            .into_iter()
            .filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                let square = Square::from_coords(file, rank);
                f.write_char(self.piece_at(square).map_or('.', Piece::char))?;
                f.write_char(if file < File::H { ' ' } else { '\n' })?;
            }
        }
        Ok(())
    }
}

impl FromIterator<(Square, Piece)> for Board {
    fn from_iter<T>(iter: T) -> Board
    where
        T: IntoIterator<Item = (Square, Piece)>,
    {
        let mut board = Board::empty();
        for (sq, piece) in iter {
            board.set_piece_at(sq, piece);
        }
        board
    }
}
