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

//! Move generation.
//!
//! Moves are first generated pseudo-legally, following piece movement
//! rules, and then filtered by playing each one on a copy of the board and
//! checking that the own king is not left attacked.

use crate::{
    attacks,
    bitboard::Bitboard,
    castling_side::CastlingSide,
    m::{Move, MoveList},
    position::{play_on_board, Position},
    role::Role,
    square::{Rank, Square},
};

impl Position {
    /// Generates all pseudo-legal moves: moves that follow the movement
    /// rules of the pieces, but may leave the own king in check.
    ///
    /// Castling is included only if the king does not start on, pass
    /// through or land on an attacked square.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        self.generate_pseudo_legal_moves(Bitboard::FULL, Bitboard::FULL)
    }

    /// Generates pseudo-legal moves from squares in `from_mask` to squares
    /// in `to_mask`. Castling moves are matched against `to_mask` by the
    /// target square in the position's [`CastlingMode`](crate::CastlingMode).
    pub fn generate_pseudo_legal_moves(&self, from_mask: Bitboard, to_mask: Bitboard) -> MoveList {
        let mut moves = MoveList::new();
        self.gen_pseudo_legal(&mut moves, from_mask, to_mask);
        self.encode(&mut moves);
        moves
    }

    /// Generates all legal moves.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::Position;
    ///
    /// let pos = Position::new();
    /// assert_eq!(pos.legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> MoveList {
        self.generate_legal_moves(Bitboard::FULL, Bitboard::FULL)
    }

    /// Generates legal moves from squares in `from_mask` to squares in
    /// `to_mask`.
    pub fn generate_legal_moves(&self, from_mask: Bitboard, to_mask: Bitboard) -> MoveList {
        let mut moves = MoveList::new();
        self.gen_pseudo_legal(&mut moves, from_mask, to_mask);
        moves.retain(|m| self.is_safe(*m));
        self.encode(&mut moves);
        moves
    }

    /// Generates legal captures, including en passant.
    pub fn legal_captures(&self) -> MoveList {
        let mut moves = self.legal_moves();
        moves.retain(|m| self.is_capture(*m));
        moves
    }

    /// Tests if the position has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        let mut moves = MoveList::new();
        self.gen_pseudo_legal(&mut moves, Bitboard::FULL, Bitboard::FULL);
        moves.iter().any(|m| self.is_safe(*m))
    }

    /// Tests if a move is among the pseudo-legal moves, in the encoding of
    /// the position's [`CastlingMode`](crate::CastlingMode).
    pub fn is_pseudo_legal(&self, m: Move) -> bool {
        m.drop.is_none()
            && self
                .generate_pseudo_legal_moves(Bitboard::from(m.from), Bitboard::FULL)
                .contains(&m)
    }

    /// Tests if a move is among the legal moves, in the encoding of the
    /// position's [`CastlingMode`](crate::CastlingMode).
    ///
    /// Null moves are never legal.
    pub fn is_legal(&self, m: Move) -> bool {
        m.drop.is_none()
            && self
                .generate_legal_moves(Bitboard::from(m.from), Bitboard::FULL)
                .contains(&m)
    }

    /// Tests if an en passant capture is possible right now.
    pub fn has_legal_en_passant(&self) -> bool {
        let mut moves = MoveList::new();
        self.gen_en_passant(&mut moves, Bitboard::FULL, Bitboard::FULL);
        moves.iter().any(|m| self.is_safe(*m))
    }

    /// The en passant square, only if an en passant capture is actually
    /// possible.
    pub fn legal_ep_square(&self) -> Option<Square> {
        self.ep_square.filter(|_| self.has_legal_en_passant())
    }

    pub(crate) fn is_legal_internal(&self, m: Move) -> bool {
        let mut moves = MoveList::new();
        self.gen_pseudo_legal(&mut moves, Bitboard::from(m.from), Bitboard::FULL);
        moves.contains(&m) && self.is_safe(m)
    }

    /// Tests if none of the own kings is attacked after playing `m`, which
    /// is given in internal encoding.
    pub(crate) fn is_safe(&self, m: Move) -> bool {
        let mut board = self.board;
        play_on_board(&mut board, m, self.turn, self.ep_square);
        let occupied = board.occupied();
        (board.kings() & board.by_color(self.turn))
            .into_iter()
            .all(|king| !board.is_attacked_by(king, !self.turn, occupied))
    }

    fn encode(&self, moves: &mut MoveList) {
        for m in moves.iter_mut() {
            *m = self.from_internal(*m);
        }
    }

    /// Generates pseudo-legal moves in internal encoding.
    pub(crate) fn gen_pseudo_legal(&self, moves: &mut MoveList, from_mask: Bitboard, to_mask: Bitboard) {
        let board = &self.board;
        let us = board.by_color(self.turn);
        let occupied = board.occupied();

        for from in us & !board.pawns() & from_mask {
            for to in board.attacks_from(from) & !us & to_mask {
                moves.push(Move::new(from, to));
            }
        }

        self.gen_pawn_moves(moves, from_mask, to_mask, occupied);
        self.gen_en_passant(moves, from_mask, to_mask);
        self.gen_castling(moves, from_mask, to_mask);
    }

    fn gen_pawn_moves(
        &self,
        moves: &mut MoveList,
        from_mask: Bitboard,
        to_mask: Bitboard,
        occupied: Bitboard,
    ) {
        let turn = self.turn;
        let them = self.board.by_color(!turn);
        let forward = turn.fold_wb(8, -8);

        for from in self.board.by_piece(turn.pawn()) & from_mask {
            for to in attacks::pawn_attacks(turn, from) & them & to_mask {
                push_pawn_move(moves, from, to, turn.other().backrank());
            }

            let Some(single) = from.offset(forward).filter(|sq| !occupied.contains(*sq)) else {
                continue;
            };
            if to_mask.contains(single) {
                push_pawn_move(moves, from, single, turn.other().backrank());
            }

            if from.rank() == Rank::Second.relative_to(turn) {
                if let Some(double) = single
                    .offset(forward)
                    .filter(|sq| !occupied.contains(*sq) && to_mask.contains(*sq))
                {
                    moves.push(Move::new(from, double));
                }
            }
        }
    }

    fn gen_en_passant(&self, moves: &mut MoveList, from_mask: Bitboard, to_mask: Bitboard) {
        let Some(ep) = self.ep_square else {
            return;
        };
        let turn = self.turn;
        if !to_mask.contains(ep)
            || self.board.occupied().contains(ep)
            || ep.rank() != Rank::Sixth.relative_to(turn)
        {
            return;
        }
        let pushed = Square::from_coords(ep.file(), Rank::Fifth.relative_to(turn));
        if !self.board.by_piece((!turn).pawn()).contains(pushed) {
            return;
        }
        for from in self.board.by_piece(turn.pawn()) & from_mask & attacks::pawn_attacks(!turn, ep) {
            moves.push(Move::new(from, ep));
        }
    }

    fn gen_castling(&self, moves: &mut MoveList, from_mask: Bitboard, to_mask: Bitboard) {
        let turn = self.turn;
        let backrank = Bitboard::from_rank(turn.backrank());
        let Some(king) = self
            .king_square(turn)
            .filter(|king| backrank.contains(*king) && from_mask.contains(*king))
        else {
            return;
        };
        let occupied = self.board.occupied();

        for rook in self.clean_castling_rights() & backrank {
            let side = CastlingSide::of(king, rook);
            let king_to = side.king_to(turn);
            let rook_to = side.rook_to(turn);

            let king_path = attacks::between(king, king_to);
            let path = attacks::between(king, rook)
                | king_path
                | king_to
                | attacks::between(rook, rook_to)
                | rook_to;
            if (occupied.without(king).without(rook) & path).is_nonempty() {
                continue;
            }

            let without_king = occupied.without(king);
            if (king_path | king)
                .into_iter()
                .any(|sq| self.board.is_attacked_by(sq, !turn, without_king))
            {
                continue;
            }
            if self.board.is_attacked_by(
                king_to,
                !turn,
                without_king.without(rook).with(rook_to),
            ) {
                continue;
            }

            let m = Move::new(king, rook);
            if to_mask.contains(self.from_internal(m).to) {
                moves.push(m);
            }
        }
    }
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promotion_rank: Rank) {
    if to.rank() == promotion_rank {
        for role in Role::PROMOTIONS {
            moves.push(Move::new(from, to).with_promotion(role));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CastlingMode;

    fn sorted_uci(moves: &MoveList) -> Vec<String> {
        let mut uci: Vec<String> = moves.iter().map(ToString::to_string).collect();
        uci.sort();
        uci
    }

    #[test]
    fn test_start_position() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.pseudo_legal_moves().len(), 20);
        assert!(pos.legal_captures().is_empty());
        assert!(pos.has_legal_moves());
    }

    #[test]
    fn test_promotion_order() {
        let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").expect("valid fen");
        let moves = pos.generate_legal_moves(Bitboard::from(Square::A7), Bitboard::FULL);
        assert_eq!(
            moves.iter().map(|m| m.promotion).collect::<Vec<_>>(),
            [Role::Queen, Role::Rook, Role::Bishop, Role::Knight].map(Some)
        );
    }

    #[test]
    fn test_pinned_piece() {
        let pos = Position::from_fen("4k3/8/8/8/b7/8/2N5/3K4 w - - 0 1").expect("valid fen");
        assert!(pos.is_pseudo_legal(Move::new(Square::C2, Square::E3)));
        assert!(!pos.is_legal(Move::new(Square::C2, Square::E3)));
        assert!(pos.is_into_check(Move::new(Square::C2, Square::E3)));
    }

    #[test]
    fn test_en_passant_pin() {
        // Capturing en passant would expose the king along the rank.
        let pos = Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("valid fen");
        assert!(pos.is_pseudo_legal(Move::new(Square::E5, Square::D6)));
        assert!(!pos.is_legal(Move::new(Square::E5, Square::D6)));
        assert!(!pos.has_legal_en_passant());
        assert_eq!(pos.legal_ep_square(), None);
        assert_eq!(pos.ep_square(), Some(Square::D6));
    }

    #[test]
    fn test_castling_generation() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
        let moves = pos.generate_legal_moves(Bitboard::from(Square::E1), Bitboard::FULL);
        assert!(moves.contains(&Move::new(Square::E1, Square::G1)));
        assert!(moves.contains(&Move::new(Square::E1, Square::C1)));
        assert!(!moves.contains(&Move::new(Square::E1, Square::H1)));
        assert!(pos.is_legal(Move::new(Square::E1, Square::G1)));
        assert!(!pos.is_legal(Move::new(Square::E1, Square::H1)));

        let mut pos = pos;
        pos.set_castling_mode(CastlingMode::Chess960);
        let moves = pos.generate_legal_moves(Bitboard::from(Square::E1), Bitboard::FULL);
        assert!(moves.contains(&Move::new(Square::E1, Square::H1)));
        assert!(moves.contains(&Move::new(Square::E1, Square::A1)));
        assert!(!moves.contains(&Move::new(Square::E1, Square::G1)));
    }

    #[test]
    fn test_castling_through_check() {
        // The f1 square is attacked.
        let pos = Position::from_fen("4k3/8/8/8/8/8/5r2/4K2R w K - 0 1").expect("valid fen");
        assert!(!pos.is_pseudo_legal(Move::new(Square::E1, Square::G1)));

        // b1 is attacked, but only the rook passes it.
        let pos = Position::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").expect("valid fen");
        assert!(pos.is_legal(Move::new(Square::E1, Square::C1)));

        // Cannot castle out of check.
        let pos = Position::from_fen("4k3/8/8/8/8/8/4r3/R3K3 w Q - 0 1").expect("valid fen");
        assert!(!pos.is_legal(Move::new(Square::E1, Square::C1)));
    }

    #[test]
    fn test_chess960_castling_rook_shielded() {
        // The b1 rook shields the king from the a1 rook, until castling
        // moves it away.
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/qRK5 w B - 0 1").expect("valid fen");
        assert!(!pos.is_legal(Move::new(Square::C1, Square::B1)));
        assert!(pos.is_legal(Move::new(Square::C1, Square::D1)));
    }

    #[test]
    fn test_chess960_adjacent_rook() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/5KR1 w G - 0 1").expect("valid fen");
        pos.set_castling_mode(CastlingMode::Chess960);
        assert!(pos.is_legal(Move::new(Square::F1, Square::G1)));
        pos.make_move(Move::new(Square::F1, Square::G1)).expect("legal");
        assert_eq!(pos.board_fen(), "4k3/8/8/8/8/8/8/5RK1");
    }

    #[test]
    fn test_check_evasions() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/3q4/4K3 w - - 0 1").expect("valid fen");
        assert_eq!(sorted_uci(&pos.legal_moves()), ["e1d2", "e1f1"]);
    }

    #[test]
    fn test_masks() {
        let pos = Position::new();
        let moves = pos.generate_legal_moves(Bitboard::FULL, Bitboard::from_rank(Rank::Third));
        assert_eq!(moves.len(), 12);
        let moves = pos.generate_pseudo_legal_moves(Bitboard::from(Square::G1), Bitboard::FULL);
        assert_eq!(sorted_uci(&moves), ["g1f3", "g1h3"]);
    }
}
