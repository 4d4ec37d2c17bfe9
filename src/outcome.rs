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

//! Game end detection.
//!
//! Nothing is cached: every query is computed from the current position
//! and its move stack, so that [`Position::pop()`] restores the previous
//! answers.

use std::fmt;

use crate::{
    bitboard::Bitboard,
    color::Color,
    position::{KingMissingError, Position},
};

/// Why a game ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    /// 75 moves without a capture or pawn move. Ends the game immediately.
    SeventyFiveMoves,
    /// The same position occurred five times. Ends the game immediately.
    FivefoldRepetition,
    /// 50 moves without a capture or pawn move, claimed by a player.
    FiftyMoves,
    /// The same position occurred three times, claimed by a player.
    ThreefoldRepetition,
}

/// The result of a finished game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Outcome {
    pub termination: Termination,
    /// `None` for a draw.
    pub winner: Option<Color>,
}

impl Outcome {
    /// The result in PGN notation: `1-0`, `0-1` or `1/2-1/2`.
    pub const fn result(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result())
    }
}

impl Position {
    /// Tests for checkmate.
    ///
    /// Expects the side to move to have a king. Positions without one are
    /// neither checkmate nor stalemate. Use
    /// [`Position::try_is_checkmate()`] to detect them.
    pub fn is_checkmate(&self) -> bool {
        self.try_is_checkmate().unwrap_or(false)
    }

    /// Tests for stalemate.
    ///
    /// Expects the side to move to have a king. Positions without one are
    /// neither checkmate nor stalemate. Use
    /// [`Position::try_is_stalemate()`] to detect them.
    pub fn is_stalemate(&self) -> bool {
        self.try_is_stalemate().unwrap_or(false)
    }

    /// # Errors
    ///
    /// Returns [`KingMissingError`] if the side to move has no king.
    pub fn try_is_checkmate(&self) -> Result<bool, KingMissingError> {
        Ok(self.try_is_check()? && !self.has_legal_moves())
    }

    /// # Errors
    ///
    /// Returns [`KingMissingError`] if the side to move has no king.
    pub fn try_is_stalemate(&self) -> Result<bool, KingMissingError> {
        Ok(!self.try_is_check()? && !self.has_legal_moves())
    }

    /// Tests if neither side can possibly checkmate: only kings, or a
    /// single minor piece, or only bishops that all stand on squares of
    /// the same color.
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        if (board.pawns() | board.rooks_and_queens()).is_nonempty() {
            return false;
        }
        if (board.knights() | board.bishops()).count() <= 1 {
            return true;
        }
        board.knights().is_empty()
            && (board.bishops().is_subset(Bitboard::DARK_SQUARES)
                || board.bishops().is_subset(Bitboard::LIGHT_SQUARES))
    }

    /// Tests if `color` has insufficient material to win, no matter how
    /// the opponent plays. This is relevant when the opponent runs out of
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{Color, Position};
    ///
    /// let pos = Position::from_fen("8/8/8/8/8/2k5/2n5/K6R w - - 0 1")?;
    /// assert!(!pos.has_insufficient_material(Color::White));
    /// // The rook could block its own king.
    /// assert!(!pos.has_insufficient_material(Color::Black));
    /// # Ok::<_, chess_rules::ParseFenError>(())
    /// ```
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let board = &self.board;
        let ours = board.by_color(color);
        if ours.intersects(board.pawns() | board.rooks_and_queens()) {
            return false;
        }
        if ours.intersects(board.knights()) {
            return ours.count() <= 2
                && (board.by_color(!color) & !board.kings() & !board.queens()).is_empty();
        }
        if ours.intersects(board.bishops()) {
            let same_color = board.bishops().is_subset(Bitboard::DARK_SQUARES)
                || board.bishops().is_subset(Bitboard::LIGHT_SQUARES);
            return same_color && board.pawns().is_empty() && board.knights().is_empty();
        }
        true
    }

    fn is_halfmoves(&self, n: u32) -> bool {
        self.halfmoves >= n && self.has_legal_moves()
    }

    /// Tests if the fifty-move rule can be claimed right now.
    pub fn is_fifty_moves(&self) -> bool {
        self.is_halfmoves(100)
    }

    /// Tests if the fifty-move rule can be claimed now, or by the side to
    /// move after playing a legal move that does not reset the clock.
    pub fn can_claim_fifty_moves(&self) -> bool {
        if self.is_fifty_moves() {
            return true;
        }
        if self.halfmoves >= 99 {
            let mut pos = self.clone();
            for m in self.legal_moves() {
                if self.is_zeroing(m) {
                    continue;
                }
                pos.make_move_unchecked(m);
                let claimable = pos.is_fifty_moves();
                pos.pop();
                if claimable {
                    return true;
                }
            }
        }
        false
    }

    /// Tests for 75 moves without a capture or pawn move. Checkmate on the
    /// last move takes precedence.
    pub fn is_seventyfive_moves(&self) -> bool {
        self.is_halfmoves(150)
    }

    /// Counts how often the current position occurred, including now,
    /// since the last irreversible move.
    pub fn repetition_count(&self) -> usize {
        let key = self.transposition_key();
        let mut pos = self.clone();
        let mut count = 1;
        while let Some(m) = pos.pop() {
            if pos.is_irreversible(m) {
                break;
            }
            if pos.transposition_key() == key {
                count += 1;
            }
        }
        count
    }

    /// Tests if the current position occurred at least `count` times.
    pub fn is_repetition(&self, count: usize) -> bool {
        // Fast path: compare only occupancy.
        let occupied = self.board.occupied();
        let candidates = 1 + self
            .stack
            .iter()
            .filter(|undo| undo.board.occupied() == occupied)
            .count();
        candidates >= count && self.repetition_count() >= count
    }

    /// Tests if the current position occurred five times. The game ends
    /// immediately.
    pub fn is_fivefold_repetition(&self) -> bool {
        self.is_repetition(5)
    }

    /// Tests if the side to move can claim a draw by threefold repetition,
    /// either because the current position occurred three times, or
    /// because a legal move leads to a position that occurred twice.
    pub fn can_claim_threefold_repetition(&self) -> bool {
        let key = self.transposition_key();
        let mut seen = vec![key.clone()];

        let mut pos = self.clone();
        while let Some(m) = pos.pop() {
            if pos.is_irreversible(m) {
                break;
            }
            seen.push(pos.transposition_key());
        }

        if seen.iter().filter(|k| **k == key).count() >= 3 {
            return true;
        }

        let mut pos = self.clone();
        for m in self.legal_moves() {
            pos.make_move_unchecked(m);
            let after = pos.transposition_key();
            pos.pop();
            if seen.iter().filter(|k| **k == after).count() >= 2 {
                return true;
            }
        }
        false
    }

    /// Tests if the side to move can claim a draw, by the fifty-move rule
    /// or by threefold repetition.
    pub fn can_claim_draw(&self) -> bool {
        self.can_claim_fifty_moves() || self.can_claim_threefold_repetition()
    }

    /// Checks if the game is over.
    ///
    /// Checkmate, stalemate, insufficient material, the seventy-five move
    /// rule and fivefold repetition end the game automatically. With
    /// `claim_draw`, the fifty-move rule and threefold repetition are also
    /// taken into account, which can be slow.
    ///
    /// Positions where a king is missing are not classified and return
    /// `None`. Use [`Position::try_outcome()`] to tell them apart from
    /// games that are still running.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{Color, Position, Termination};
    ///
    /// let mut pos = Position::new();
    /// for san in ["f3", "e5", "g4", "Qh4#"] {
    ///     pos.push_san(san)?;
    /// }
    /// let outcome = pos.outcome(false).expect("game over");
    /// assert_eq!(outcome.termination, Termination::Checkmate);
    /// assert_eq!(outcome.winner, Some(Color::Black));
    /// assert_eq!(outcome.result(), "0-1");
    /// # Ok::<_, chess_rules::san::SanError>(())
    /// ```
    pub fn outcome(&self, claim_draw: bool) -> Option<Outcome> {
        self.try_outcome(claim_draw).ok().flatten()
    }

    /// Checks if the game is over, like [`Position::outcome()`].
    ///
    /// # Errors
    ///
    /// Returns [`KingMissingError`] if either side has no king, starting
    /// with the side to move.
    pub fn try_outcome(&self, claim_draw: bool) -> Result<Option<Outcome>, KingMissingError> {
        for color in [self.turn, !self.turn] {
            if self.king_square(color).is_none() {
                return Err(KingMissingError { color });
            }
        }

        let draw = |termination| {
            Ok(Some(Outcome {
                termination,
                winner: None,
            }))
        };

        let has_legal_moves = self.has_legal_moves();
        if self.is_check() && !has_legal_moves {
            return Ok(Some(Outcome {
                termination: Termination::Checkmate,
                winner: Some(!self.turn),
            }));
        }
        if self.is_insufficient_material() {
            return draw(Termination::InsufficientMaterial);
        }
        if !has_legal_moves {
            return draw(Termination::Stalemate);
        }
        if self.is_seventyfive_moves() {
            return draw(Termination::SeventyFiveMoves);
        }
        if self.is_fivefold_repetition() {
            return draw(Termination::FivefoldRepetition);
        }
        if claim_draw {
            if self.can_claim_fifty_moves() {
                return draw(Termination::FiftyMoves);
            }
            if self.can_claim_threefold_repetition() {
                return draw(Termination::ThreefoldRepetition);
            }
        }
        Ok(None)
    }

    pub fn is_game_over(&self, claim_draw: bool) -> bool {
        self.outcome(claim_draw).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{m::Move, square::Square};

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).expect("valid fen")
    }

    #[test]
    fn test_checkmate() {
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(p.is_checkmate());
        assert!(!p.is_stalemate());
        assert_eq!(p.try_is_checkmate(), Ok(true));
        assert_eq!(
            p.outcome(false),
            Some(Outcome {
                termination: Termination::Checkmate,
                winner: Some(Color::Black),
            })
        );
    }

    #[test]
    fn test_stalemate() {
        let p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(p.is_stalemate());
        assert!(!p.is_checkmate());
        assert_eq!(
            p.outcome(false).map(|o| o.termination),
            Some(Termination::Stalemate)
        );
    }

    #[test]
    fn test_missing_king() {
        let p = pos("8/8/8/8/8/8/8/K7 b - - 0 1");
        assert!(p.legal_moves().is_empty());
        assert!(!p.is_checkmate());
        assert!(!p.is_stalemate());
        assert_eq!(p.try_is_checkmate(), Err(KingMissingError { color: Color::Black }));
        assert_eq!(p.try_is_stalemate(), Err(KingMissingError { color: Color::Black }));
        assert_eq!(p.outcome(false), None);
        assert_eq!(p.try_outcome(true), Err(KingMissingError { color: Color::Black }));
        assert!(!p.is_game_over(false));

        let p = pos("4k3/8/8/8/8/8/8/8 w - - 0 1");
        assert!(!p.is_stalemate());
        assert_eq!(p.try_outcome(false), Err(KingMissingError { color: Color::White }));

        // The side to move has a king, the opponent does not.
        let p = pos("8/8/8/8/8/8/8/K7 w - - 0 1");
        assert_eq!(p.try_is_stalemate(), Ok(false));
        assert_eq!(p.try_outcome(false), Err(KingMissingError { color: Color::Black }));
    }

    #[test]
    fn test_insufficient_material() {
        let insufficient = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/3B4/8/4KB2 w - - 0 1",
            "4k3/8/8/3b4/8/8/8/4KB2 w - - 0 1",
        ];
        for fen in insufficient {
            assert!(pos(fen).is_insufficient_material(), "{fen}");
        }

        let sufficient = [
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
            "4kn2/8/8/8/8/8/8/4KB2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KNN1 w - - 0 1",
        ];
        for fen in sufficient {
            assert!(!pos(fen).is_insufficient_material(), "{fen}");
        }
    }

    #[test]
    fn test_has_insufficient_material() {
        let p = pos("4k3/8/8/8/8/8/8/4KN2 w - - 0 1");
        assert!(p.has_insufficient_material(Color::White));
        assert!(p.has_insufficient_material(Color::Black));

        let p = pos("4k3/4p3/8/8/8/8/8/4KB2 w - - 0 1");
        assert!(!p.has_insufficient_material(Color::White));
        assert!(!p.has_insufficient_material(Color::Black));
    }

    #[test]
    fn test_fifty_moves() {
        let p = pos("4k3/8/8/8/8/8/8/R3K3 w - - 99 80");
        assert!(!p.is_fifty_moves());
        assert!(p.can_claim_fifty_moves());
        assert!(p.can_claim_draw());
        assert_eq!(
            p.outcome(true).map(|o| o.termination),
            Some(Termination::FiftyMoves)
        );
        assert_eq!(p.outcome(false), None);

        let p = pos("4k3/8/8/8/8/8/8/R3K3 w - - 150 100");
        assert!(p.is_seventyfive_moves());
        assert!(p.is_game_over(false));
    }

    #[test]
    fn test_repetition() {
        let mut p = Position::new();
        let shuffle = [
            Move::new(Square::G1, Square::F3),
            Move::new(Square::G8, Square::F6),
            Move::new(Square::F3, Square::G1),
            Move::new(Square::F6, Square::G8),
        ];
        assert_eq!(p.repetition_count(), 1);
        for m in shuffle {
            p.make_move(m).expect("legal");
        }
        assert_eq!(p.repetition_count(), 2);
        assert!(!p.can_claim_threefold_repetition());

        for m in &shuffle[..3] {
            p.make_move(*m).expect("legal");
        }
        // Going back to the start position would be the third occurrence.
        assert!(p.can_claim_threefold_repetition());
        p.make_move(shuffle[3]).expect("legal");
        assert!(p.is_repetition(3));
        assert!(!p.is_fivefold_repetition());
        assert_eq!(
            p.outcome(true).map(|o| o.termination),
            Some(Termination::ThreefoldRepetition)
        );

        for _ in 0..2 {
            for m in shuffle {
                p.make_move(m).expect("legal");
            }
        }
        assert_eq!(p.repetition_count(), 5);
        assert_eq!(
            p.outcome(false).map(|o| o.termination),
            Some(Termination::FivefoldRepetition)
        );
    }

    #[test]
    fn test_repetition_stops_at_irreversible_move() {
        let mut p = Position::new();
        for m in [
            Move::new(Square::E2, Square::E4),
            Move::new(Square::E7, Square::E5),
            Move::new(Square::G1, Square::F3),
            Move::new(Square::G8, Square::F6),
            Move::new(Square::F3, Square::G1),
            Move::new(Square::F6, Square::G8),
        ] {
            p.make_move(m).expect("legal");
        }
        assert_eq!(p.repetition_count(), 2);
        assert_eq!(p.root().repetition_count(), 1);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = Outcome {
            termination: Termination::Stalemate,
            winner: None,
        };
        assert_eq!(outcome.to_string(), "1/2-1/2");
    }
}
