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

use std::{error::Error, fmt, num::NonZeroU32};

use bitflags::bitflags;
use tracing::debug;

use crate::{
    attacks,
    bitboard::Bitboard,
    board::Board,
    castling_side::CastlingSide,
    color::Color,
    m::Move,
    role::Role,
    square::{Rank, Square},
    types::{CastlingMode, Piece},
};

/// Error when trying to play an illegal move.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayError {
    m: Move,
    fen: String,
}

impl PlayError {
    /// The rejected move.
    pub fn m(&self) -> Move {
        self.m
    }

    /// The position in which the move was rejected.
    pub fn fen(&self) -> &str {
        &self.fen
    }
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal move {} in {}", self.m, self.fen)
    }
}

impl Error for PlayError {}

/// Error when a query needs the king of a side that has none.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KingMissingError {
    pub(crate) color: Color,
}

impl KingMissingError {
    /// The side without a king.
    pub fn color(&self) -> Color {
        self.color
    }
}

impl fmt::Display for KingMissingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} king missing", self.color)
    }
}

impl Error for KingMissingError {}

bitflags! {
    /// Reasons for a [`Position`] not being a valid chess position.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct PositionErrorKinds: u32 {
        /// There are no pieces on the board.
        const EMPTY_BOARD = 1 << 0;

        /// A king is required but missing.
        const MISSING_KING = 1 << 1;

        /// A side has more than one king.
        const TOO_MANY_KINGS = 1 << 2;

        /// There are pawns on the backrank.
        const PAWNS_ON_BACKRANK = 1 << 3;

        /// Some castling rights are invalid.
        ///
        /// [`Position::clean_castling_rights()`] computes the valid subset.
        const INVALID_CASTLING_RIGHTS = 1 << 4;

        /// The en passant square is not on the third or sixth rank, or there
        /// is no pawn that could have just made a double step to create it.
        const INVALID_EP_SQUARE = 1 << 5;

        /// The player not to move is in check.
        const OPPOSITE_CHECK = 1 << 6;

        /// There are more than two checkers, or two checkers that could not
        /// have been produced by a single move.
        const TOO_MANY_CHECKERS = 1 << 7;

        /// The check cannot have been delivered by the last move, given the
        /// en passant square.
        const IMPOSSIBLE_CHECK = 1 << 8;

        /// A side has more than 16 pieces or more than 8 pawns.
        const TOO_MUCH_MATERIAL = 1 << 9;
    }
}

/// Error when a [`Position`] is not a valid chess position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionError {
    kinds: PositionErrorKinds,
}

impl PositionError {
    pub fn kinds(&self) -> PositionErrorKinds {
        self.kinds
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reasons = Vec::new();
        for (flag, reason) in [
            (PositionErrorKinds::EMPTY_BOARD, "empty board"),
            (PositionErrorKinds::MISSING_KING, "missing king"),
            (PositionErrorKinds::TOO_MANY_KINGS, "too many kings"),
            (PositionErrorKinds::PAWNS_ON_BACKRANK, "pawns on backrank"),
            (PositionErrorKinds::INVALID_CASTLING_RIGHTS, "invalid castling rights"),
            (PositionErrorKinds::INVALID_EP_SQUARE, "invalid en passant square"),
            (PositionErrorKinds::OPPOSITE_CHECK, "opposite check"),
            (PositionErrorKinds::TOO_MANY_CHECKERS, "too many checkers"),
            (PositionErrorKinds::IMPOSSIBLE_CHECK, "impossible check"),
            (PositionErrorKinds::TOO_MUCH_MATERIAL, "too much material"),
        ] {
            if self.kinds.contains(flag) {
                reasons.push(reason);
            }
        }
        write!(f, "illegal position: {}", reasons.join(", "))
    }
}

impl Error for PositionError {}

/// Everything needed to take back a move.
#[derive(Clone, Debug)]
pub(crate) struct Undo {
    pub(crate) m: Move,
    pub(crate) board: Board,
    pub(crate) castling_rights: Bitboard,
    pub(crate) ep_square: Option<Square>,
    pub(crate) halfmoves: u32,
    pub(crate) captured: Option<Piece>,
}

/// Snapshot compared when detecting repetitions.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct TranspositionKey {
    board: Board,
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
}

/// A chess position with a history of the moves that led to it.
///
/// Positions are changed only by [`Position::make_move()`] (or its unchecked
/// sibling) and [`Position::pop()`], or by explicit board editing, which
/// clears the history.
///
/// # Equality
///
/// Two positions are equal if their boards, turns, castling rights, en
/// passant squares and clocks are equal. The move history and the
/// [`CastlingMode`] are not compared.
///
/// # Examples
///
/// ```
/// use chess_rules::{Move, Position, Square};
///
/// let mut pos = Position::new();
/// pos.make_move(Move::new(Square::E2, Square::E4))?;
/// assert_eq!(pos.fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
///
/// assert_eq!(pos.pop(), Some(Move::new(Square::E2, Square::E4)));
/// assert_eq!(pos, Position::new());
/// # Ok::<_, chess_rules::PlayError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castling_rights: Bitboard,
    pub(crate) ep_square: Option<Square>,
    pub(crate) halfmoves: u32,
    pub(crate) fullmoves: NonZeroU32,
    pub(crate) castling_mode: CastlingMode,
    pub(crate) stack: Vec<Undo>,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Position {
        Position {
            board: Board::new(),
            turn: Color::White,
            castling_rights: Bitboard::CORNERS,
            ep_square: None,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
            castling_mode: CastlingMode::Standard,
            stack: Vec::new(),
        }
    }

    /// An empty board with White to move.
    pub fn empty() -> Position {
        Position::from_board(Board::empty(), Color::White)
    }

    /// A position with the given pieces and side to move, no castling
    /// rights and no en passant square.
    pub fn from_board(board: Board, turn: Color) -> Position {
        Position {
            board,
            turn,
            castling_rights: Bitboard::EMPTY,
            ..Position::new()
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The rook squares that still carry a castling right, as recorded.
    /// See [`Position::clean_castling_rights()`] for the effective rights.
    #[inline]
    pub fn castling_rights(&self) -> Bitboard {
        self.castling_rights
    }

    /// The square skipped by the last double pawn push, whether or not an
    /// en passant capture is possible.
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Number of halfmoves since the last capture or pawn move.
    #[inline]
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// The move number, starting at 1 and incremented after every move of
    /// Black.
    #[inline]
    pub fn fullmoves(&self) -> NonZeroU32 {
        self.fullmoves
    }

    #[inline]
    pub fn castling_mode(&self) -> CastlingMode {
        self.castling_mode
    }

    /// Changes how castling moves are written and generated. Moves already
    /// on the stack keep the encoding they were made with.
    pub fn set_castling_mode(&mut self, mode: CastlingMode) {
        self.castling_mode = mode;
    }

    /// Number of halfmoves since the start of the game, derived from the
    /// move number and side to move.
    pub fn ply(&self) -> u32 {
        2 * (self.fullmoves.get() - 1) + u32::from(self.turn.is_black())
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Puts a piece on the board. Clears the move stack.
    pub fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        self.board.set_piece_at(sq, piece);
        self.clear_stack();
    }

    /// Removes a piece from the board. Clears the move stack.
    pub fn remove_piece_at(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.board.remove_piece_at(sq);
        self.clear_stack();
        piece
    }

    /// Clears the board and all state, leaving an empty board with White
    /// to move.
    pub fn clear(&mut self) {
        let mode = self.castling_mode;
        *self = Position::empty();
        self.castling_mode = mode;
    }

    /// Returns a mirrored copy: the board flipped vertically with colors
    /// swapped, and the other side to move. The copy has no move stack.
    #[must_use]
    pub fn mirror(&self) -> Position {
        let mut board = self.board;
        board.mirror();
        Position {
            board,
            turn: !self.turn,
            castling_rights: self.castling_rights.flip_vertical(),
            ep_square: self.ep_square.map(Square::flip_vertical),
            halfmoves: self.halfmoves,
            fullmoves: self.fullmoves,
            castling_mode: self.castling_mode,
            stack: Vec::new(),
        }
    }

    /// Gets the square of the king of `color`, if there is exactly one.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.board.king_of(color)
    }

    /// Pieces of `attacker` that attack `sq`.
    pub fn attackers_of(&self, sq: Square, attacker: Color) -> Bitboard {
        self.board.attackers_of(sq, attacker, self.board.occupied())
    }

    /// Tests if `sq` is attacked by any piece of `attacker`.
    pub fn is_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        self.board.is_attacked_by(sq, attacker, self.board.occupied())
    }

    /// Enemy pieces giving check to the side to move. Empty if the side to
    /// move has no king.
    pub fn checkers(&self) -> Bitboard {
        self.king_square(self.turn)
            .map_or(Bitboard::EMPTY, |king| self.attackers_of(king, !self.turn))
    }

    /// Tests if the side to move is in check.
    ///
    /// Expects the side to move to have a king. The answer for a position
    /// without one is `false`, which does not mean the king is safe. Use
    /// [`Position::try_is_check()`] where such positions can occur.
    pub fn is_check(&self) -> bool {
        self.checkers().is_nonempty()
    }

    /// Tests if the side to move is in check.
    ///
    /// # Errors
    ///
    /// Returns [`KingMissingError`] if the side to move has no king.
    pub fn try_is_check(&self) -> Result<bool, KingMissingError> {
        let king = self
            .king_square(self.turn)
            .ok_or(KingMissingError { color: self.turn })?;
        Ok(self.is_attacked_by(king, !self.turn))
    }

    /// Detects an absolute pin of the piece on `sq` to the king of `color`.
    ///
    /// Returns the line the piece may still move along (including the
    /// pinning piece), or [`Bitboard::FULL`] if it is not pinned.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_rules::{attacks, Bitboard, Color, Position, Square};
    ///
    /// let pos = Position::from_fen("4k3/8/8/8/b7/8/2N5/3K4 w - - 0 1")?;
    /// assert_eq!(pos.pin(Color::White, Square::C2), attacks::ray(Square::D1, Square::A4));
    /// assert_eq!(pos.pin(Color::White, Square::D1), Bitboard::FULL);
    /// # Ok::<_, chess_rules::ParseFenError>(())
    /// ```
    pub fn pin(&self, color: Color, sq: Square) -> Bitboard {
        let Some(king) = self.king_square(color) else {
            return Bitboard::FULL;
        };
        let square_mask = Bitboard::from(sq);
        let them = self.board.by_color(!color);

        for (rays, sliders) in [
            (
                attacks::rook_attacks(king, Bitboard::EMPTY),
                self.board.rooks_and_queens(),
            ),
            (
                attacks::bishop_attacks(king, Bitboard::EMPTY),
                self.board.bishops_and_queens(),
            ),
        ] {
            if rays.contains(sq) {
                for sniper in rays & sliders & them {
                    if attacks::between(sniper, king) & (self.board.occupied() | square_mask)
                        == square_mask
                    {
                        return attacks::ray(king, sniper);
                    }
                }
                break;
            }
        }

        Bitboard::FULL
    }

    pub fn is_pinned(&self, color: Color, sq: Square) -> bool {
        self.pin(color, sq) != Bitboard::FULL
    }

    /// The castling rights that can actually be used at some point: the
    /// rook is still there, the king is on its backrank, and there is at
    /// most one right on either side of the king.
    pub fn clean_castling_rights(&self) -> Bitboard {
        let mut clean = Bitboard::EMPTY;
        for color in Color::ALL {
            let backrank = Bitboard::from_rank(color.backrank());
            let Some(king) = self.board.king_of(color).filter(|k| backrank.contains(*k)) else {
                continue;
            };
            let candidates =
                self.castling_rights & self.board.by_piece(color.rook()) & backrank;
            if let Some(rook) = candidates.first().filter(|rook| *rook < king) {
                clean.add(rook);
            }
            if let Some(rook) = candidates.last().filter(|rook| *rook > king) {
                clean.add(rook);
            }
        }
        clean
    }

    /// The rook that castles with the king of the side to move on the
    /// given side, if that right is usable.
    pub(crate) fn castling_rook(&self, side: CastlingSide) -> Option<Square> {
        let king = self.king_square(self.turn)?;
        let candidates =
            self.clean_castling_rights() & Bitboard::from_rank(self.turn.backrank());
        match side {
            CastlingSide::KingSide => candidates.last().filter(|rook| *rook > king),
            CastlingSide::QueenSide => candidates.first().filter(|rook| *rook < king),
        }
    }

    /// Recognizes a castling move in either encoding and returns the rook
    /// it castles with.
    pub(crate) fn castling_rook_of(&self, m: Move) -> Option<Square> {
        if m.promotion.is_some() || m.drop.is_some() {
            return None;
        }
        if !self.board.by_piece(self.turn.king()).contains(m.from)
            || m.from.rank() != self.turn.backrank()
            || m.to.rank() != m.from.rank()
        {
            return None;
        }
        if self.board.by_piece(self.turn.rook()).contains(m.to) {
            return Some(m.to);
        }
        let side = CastlingSide::from_king_side(m.to > m.from);
        if m.from.file().distance(m.to.file()) == 2 && m.to == side.king_to(self.turn) {
            self.castling_rook(side)
        } else {
            None
        }
    }

    /// Converts a move to the encoding used for playing it on the board,
    /// where castling is the king moving onto its rook.
    pub(crate) fn to_internal(&self, m: Move) -> Move {
        match self.castling_rook_of(m) {
            Some(rook) => Move::new(m.from, rook),
            None => m,
        }
    }

    /// Converts an internally encoded move to the encoding of the
    /// position's [`CastlingMode`].
    pub(crate) fn from_internal(&self, m: Move) -> Move {
        if self.castling_mode.is_standard()
            && m.promotion.is_none()
            && m.drop.is_none()
            && self.board.by_piece(self.turn.king()).contains(m.from)
            && self.board.by_piece(self.turn.rook()).contains(m.to)
        {
            let king_to = CastlingSide::of(m.from, m.to).king_to(self.turn);
            if m.from.rank() == king_to.rank() && m.from.file().distance(king_to.file()) == 2 {
                return Move::new(m.from, king_to);
            }
        }
        m
    }

    /// Tests if a move is a castling move, in either encoding.
    pub fn is_castling(&self, m: Move) -> bool {
        self.castling_rook_of(m).is_some()
    }

    pub fn is_kingside_castling(&self, m: Move) -> bool {
        self.castling_rook_of(m)
            .is_some_and(|rook| CastlingSide::of(m.from, rook).is_king_side())
    }

    pub fn is_queenside_castling(&self, m: Move) -> bool {
        self.castling_rook_of(m)
            .is_some_and(|rook| CastlingSide::of(m.from, rook).is_queen_side())
    }

    /// Tests if a move is an en passant capture.
    pub fn is_en_passant(&self, m: Move) -> bool {
        self.ep_square == Some(m.to)
            && m.drop.is_none()
            && self.board.by_piece(self.turn.pawn()).contains(m.from)
            && m.from.file().distance(m.to.file()) == 1
            && m.from.rank().distance(m.to.rank()) == 1
            && !self.board.occupied().contains(m.to)
    }

    /// Tests if a move captures an enemy piece, including en passant.
    pub fn is_capture(&self, m: Move) -> bool {
        m.drop.is_none()
            && (self.board.by_color(!self.turn).contains(m.to) || self.is_en_passant(m))
    }

    /// Tests if a move resets the halfmove clock: a pawn move, a capture or
    /// a pawn drop.
    pub fn is_zeroing(&self, m: Move) -> bool {
        if m.drop.is_some() {
            return m.drop == Some(Role::Pawn);
        }
        self.board.pawns().contains(m.from) || self.board.by_color(!self.turn).contains(m.to)
    }

    fn reduces_castling_rights(&self, m: Move) -> bool {
        let rights = self.clean_castling_rights();
        let touched = Bitboard::from(m.from) | m.to;
        touched.intersects(rights)
            || (rights.intersects(Bitboard::from_rank(self.turn.backrank()))
                && self.board.by_piece(self.turn.king()).contains(m.from))
    }

    /// Tests if a move is irreversible: it zeroes the halfmove clock, loses
    /// castling rights, or forfeits a possible en passant capture.
    pub fn is_irreversible(&self, m: Move) -> bool {
        self.is_zeroing(m) || self.reduces_castling_rights(m) || self.has_legal_en_passant()
    }

    /// Tests if a move would check the opponent's king.
    pub fn gives_check(&self, m: Move) -> bool {
        let internal = self.to_internal(m);
        let mut board = self.board;
        play_on_board(&mut board, internal, self.turn, self.ep_square);
        board
            .king_of(!self.turn)
            .is_some_and(|king| board.is_attacked_by(king, self.turn, board.occupied()))
    }

    /// Tests if a move would leave the own king attacked.
    pub fn is_into_check(&self, m: Move) -> bool {
        !self.is_safe(self.to_internal(m))
    }

    /// Validates and plays a move. Castling may be given in either
    /// encoding.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError`] if the move is not legal, leaving the position
    /// unchanged.
    pub fn make_move(&mut self, m: Move) -> Result<(), PlayError> {
        let internal = self.to_internal(m);
        if m.drop.is_none() && self.is_legal_internal(internal) {
            self.play_internal(m, internal);
            Ok(())
        } else {
            debug!(%m, turn = %self.turn, "rejected illegal move");
            Err(PlayError { m, fen: self.fen() })
        }
    }

    /// Plays a move without checking its legality.
    ///
    /// The move should be legal or at least pseudo-legal. Anything else
    /// leaves the position in a state that is unspecified, though safe to
    /// use and to [`pop()`](Position::pop).
    pub fn make_move_unchecked(&mut self, m: Move) {
        let internal = self.to_internal(m);
        self.play_internal(m, internal);
    }

    fn play_internal(&mut self, m: Move, internal: Move) {
        let turn = self.turn;
        let mut undo = Undo {
            m,
            board: self.board,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmoves: self.halfmoves,
            captured: None,
        };

        let ep_square = self.ep_square.take();
        self.halfmoves = self.halfmoves.saturating_add(1);

        if let Some(role) = internal.drop {
            if role == Role::Pawn {
                self.halfmoves = 0;
            }
            play_on_board(&mut self.board, internal, turn, ep_square);
        } else if !internal.is_null() {
            if let Some(piece) = self.board.piece_at(internal.from) {
                if piece.role == Role::Pawn {
                    self.halfmoves = 0;
                    if internal.from.file() == internal.to.file()
                        && internal.from.rank().distance(internal.to.rank()) == 2
                    {
                        self.ep_square = Some(Square::from_coords(
                            internal.from.file(),
                            Rank::new((internal.from.rank() as u32 + internal.to.rank() as u32) / 2),
                        ));
                    }
                } else if piece.role == Role::King {
                    self.castling_rights &= !Bitboard::from_rank(piece.color.backrank());
                }
                self.castling_rights.discard(internal.from);
                self.castling_rights.discard(internal.to);

                undo.captured = play_on_board(&mut self.board, internal, turn, ep_square);
                if undo.captured.is_some() {
                    self.halfmoves = 0;
                }
            }
        }

        if turn.is_black() {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }
        self.turn = !turn;
        self.stack.push(undo);
    }

    /// Takes back the last move and returns it, or `None` if the move
    /// stack is empty.
    pub fn pop(&mut self) -> Option<Move> {
        let undo = self.stack.pop()?;
        self.board = undo.board;
        self.castling_rights = undo.castling_rights;
        self.ep_square = undo.ep_square;
        self.halfmoves = undo.halfmoves;
        self.turn = !self.turn;
        if self.turn.is_black() {
            self.fullmoves = NonZeroU32::new(self.fullmoves.get() - 1).unwrap_or(NonZeroU32::MIN);
        }
        Some(undo.m)
    }

    /// The last move played, if any.
    pub fn peek(&self) -> Option<Move> {
        self.stack.last().map(|undo| undo.m)
    }

    /// The moves played since the root position, oldest first.
    pub fn move_stack(&self) -> impl DoubleEndedIterator<Item = Move> + ExactSizeIterator + '_ {
        self.stack.iter().map(|undo| undo.m)
    }

    /// The piece captured by the last move, if any.
    pub fn last_captured(&self) -> Option<Piece> {
        self.stack.last().and_then(|undo| undo.captured)
    }

    /// Forgets the move history. The current position becomes the root.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// The position before the first move on the stack.
    pub fn root(&self) -> Position {
        let mut root = self.clone();
        while root.pop().is_some() {}
        root
    }

    pub(crate) fn transposition_key(&self) -> TranspositionKey {
        TranspositionKey {
            board: self.board,
            turn: self.turn,
            castling_rights: self.clean_castling_rights(),
            ep_square: self.legal_ep_square(),
        }
    }

    /// Checks the position for setups that cannot arise in a game of
    /// chess. An empty set means the position is valid.
    pub fn status(&self) -> PositionErrorKinds {
        let mut errors = PositionErrorKinds::empty();
        let board = &self.board;

        if board.occupied().is_empty() {
            errors |= PositionErrorKinds::EMPTY_BOARD;
        }

        for color in Color::ALL {
            let kings = board.by_piece(color.king());
            if kings.is_empty() {
                errors |= PositionErrorKinds::MISSING_KING;
            } else if kings.more_than_one() {
                errors |= PositionErrorKinds::TOO_MANY_KINGS;
            }
            if board.by_color(color).count() > 16 || board.by_piece(color.pawn()).count() > 8 {
                errors |= PositionErrorKinds::TOO_MUCH_MATERIAL;
            }
        }

        if board.pawns().intersects(Bitboard::BACKRANKS) {
            errors |= PositionErrorKinds::PAWNS_ON_BACKRANK;
        }

        if self.castling_rights != self.clean_castling_rights() {
            errors |= PositionErrorKinds::INVALID_CASTLING_RIGHTS;
        }

        let valid_ep_square = self.valid_ep_square();
        if self.ep_square != valid_ep_square {
            errors |= PositionErrorKinds::INVALID_EP_SQUARE;
        }

        if let Some(their_king) = self.king_square(!self.turn) {
            if self.is_attacked_by(their_king, self.turn) {
                errors |= PositionErrorKinds::OPPOSITE_CHECK;
            }
        }

        let checkers = self.checkers();
        if let (Some(king), true) = (self.king_square(self.turn), checkers.is_nonempty()) {
            if let Some(ep) = valid_ep_square {
                // The check must have been delivered by the double pawn push
                // or discovered by it.
                let pushed_to = Square::from_coords(ep.file(), (!self.turn).fourth_rank());
                let pushed_from =
                    Square::from_coords(ep.file(), Rank::Second.relative_to(!self.turn));
                let occupied_before = board.occupied().without(pushed_to).with(pushed_from);
                if checkers.more_than_one()
                    || (checkers.first() != Some(pushed_to)
                        && board.is_attacked_by(king, !self.turn, occupied_before))
                {
                    errors |= PositionErrorKinds::IMPOSSIBLE_CHECK;
                }
            } else if checkers.count() > 2 {
                errors |= PositionErrorKinds::TOO_MANY_CHECKERS;
            } else if let (true, Some(a), Some(b)) =
                (checkers.more_than_one(), checkers.first(), checkers.last())
            {
                if attacks::aligned(a, b, king) {
                    errors |= PositionErrorKinds::IMPOSSIBLE_CHECK;
                }
            }
        }

        errors
    }

    /// Like [`Position::status()`], as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] with the violated rules if the position is
    /// not valid.
    pub fn validate(&self) -> Result<(), PositionError> {
        let kinds = self.status();
        if kinds.is_empty() {
            Ok(())
        } else {
            Err(PositionError { kinds })
        }
    }

    /// The en passant square, if a pawn of the other side could just have
    /// made a double push across it.
    fn valid_ep_square(&self) -> Option<Square> {
        let ep = self.ep_square?;
        if ep.rank() != Rank::Sixth.relative_to(self.turn) {
            return None;
        }
        let pushed_to = Square::from_coords(ep.file(), (!self.turn).fourth_rank());
        let pushed_from = Square::from_coords(ep.file(), Rank::Second.relative_to(!self.turn));
        if !self.board.by_piece((!self.turn).pawn()).contains(pushed_to)
            || self.board.occupied().contains(ep)
            || self.board.occupied().contains(pushed_from)
        {
            return None;
        }
        Some(ep)
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.castling_rights == other.castling_rights
            && self.ep_square == other.ep_square
            && self.halfmoves == other.halfmoves
            && self.fullmoves == other.fullmoves
    }
}

impl Eq for Position {}

/// Moves pieces on `board` for a move in internal encoding and returns the
/// captured piece.
///
/// Castling is recognized as the king moving onto a rook of its own color.
/// An en passant capture is recognized as a pawn moving diagonally onto the
/// empty `ep_square`.
pub(crate) fn play_on_board(
    board: &mut Board,
    m: Move,
    turn: Color,
    ep_square: Option<Square>,
) -> Option<Piece> {
    if let Some(role) = m.drop {
        board.set_piece_at(m.to, role.of(turn));
        return None;
    }
    if m.is_null() {
        return None;
    }

    let piece = board.remove_piece_at(m.from)?;

    if piece.role == Role::King && board.by_piece(piece.color.rook()).contains(m.to) {
        let side = CastlingSide::of(m.from, m.to);
        board.discard_piece_at(m.to);
        board.set_piece_at(side.rook_to(piece.color), piece.color.rook());
        board.set_piece_at(side.king_to(piece.color), piece);
        return None;
    }

    let mut captured = board.remove_piece_at(m.to);
    if piece.role == Role::Pawn
        && captured.is_none()
        && ep_square == Some(m.to)
        && m.from.file() != m.to.file()
    {
        captured = board.remove_piece_at(Square::from_coords(m.to.file(), m.from.rank()));
    }
    board.set_piece_at(m.to, m.promotion.map_or(piece, |role| role.of(piece.color)));
    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_and_pop() {
        let mut pos = Position::new();
        let start = pos.clone();
        pos.make_move(Move::new(Square::G1, Square::F3)).expect("legal");
        assert_eq!(pos.turn(), Color::Black);
        assert_eq!(pos.halfmoves(), 1);
        assert_eq!(pos.fullmoves().get(), 1);
        pos.make_move(Move::new(Square::D7, Square::D5)).expect("legal");
        assert_eq!(pos.halfmoves(), 0);
        assert_eq!(pos.fullmoves().get(), 2);
        assert_eq!(pos.ep_square(), Some(Square::D6));
        assert_eq!(pos.ply(), 2);

        assert_eq!(pos.pop(), Some(Move::new(Square::D7, Square::D5)));
        assert_eq!(pos.fullmoves().get(), 1);
        assert_eq!(pos.halfmoves(), 1);
        assert_eq!(pos.pop(), Some(Move::new(Square::G1, Square::F3)));
        assert_eq!(pos, start);
        assert_eq!(pos.pop(), None);
    }

    #[test]
    fn test_illegal_move_leaves_position() {
        let mut pos = Position::new();
        let err = pos
            .make_move(Move::new(Square::E2, Square::E5))
            .expect_err("illegal");
        assert_eq!(err.m(), Move::new(Square::E2, Square::E5));
        assert_eq!(pos, Position::new());
        assert!(pos.make_move(Move::NULL).is_err());
        assert!(pos.make_move(Move::new_drop(Role::Queen, Square::E4)).is_err());
    }

    #[test]
    fn test_null_move() {
        let mut pos = Position::new();
        pos.make_move_unchecked(Move::new(Square::E2, Square::E4));
        pos.make_move_unchecked(Move::NULL);
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.halfmoves(), 1);
        assert_eq!(pos.pop(), Some(Move::NULL));
        assert_eq!(pos.ep_square(), Some(Square::E3));
    }

    #[test]
    fn test_castling_rights_lost() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid fen");
        pos.make_move(Move::new(Square::H1, Square::H8)).expect("legal");
        assert_eq!(pos.castling_rights(), Bitboard::from(Square::A1) | Square::A8);
        pos.make_move(Move::new(Square::E8, Square::E7)).expect("legal");
        assert_eq!(pos.castling_rights(), Bitboard::from(Square::A1));
        assert_eq!(pos.last_captured(), None);
        pos.pop();
        pos.pop();
        assert_eq!(pos.castling_rights(), Bitboard::CORNERS);
    }

    #[test]
    fn test_castling_both_encodings() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        for to in [Square::G1, Square::H1] {
            let mut pos = Position::from_fen(fen).expect("valid fen");
            assert!(pos.is_castling(Move::new(Square::E1, to)));
            assert!(pos.is_kingside_castling(Move::new(Square::E1, to)));
            pos.make_move(Move::new(Square::E1, to)).expect("legal");
            assert_eq!(pos.board().piece_at(Square::G1), Some(Color::White.king()));
            assert_eq!(pos.board().piece_at(Square::F1), Some(Color::White.rook()));
            assert_eq!(pos.castling_rights(), Bitboard::from(Square::A8) | Square::H8);
            assert_eq!(pos.peek(), Some(Move::new(Square::E1, to)));
        }

        let pos = Position::from_fen(fen).expect("valid fen");
        assert!(pos.is_queenside_castling(Move::new(Square::E1, Square::C1)));
        assert!(pos.is_queenside_castling(Move::new(Square::E1, Square::A1)));
        assert!(!pos.is_queenside_castling(Move::new(Square::E1, Square::D1)));
    }

    #[test]
    fn test_pins() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").expect("valid fen");
        assert!(pos.is_pinned(Color::White, Square::E2));
        assert!(!pos.is_pinned(Color::White, Square::E1));
        assert!(!pos.is_pinned(Color::Black, Square::E7));
        assert!(pos.pin(Color::White, Square::E2).contains(Square::E7));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("valid fen");
        let m = Move::new(Square::E5, Square::D6);
        assert!(pos.is_en_passant(m));
        assert!(pos.is_capture(m));
        assert!(pos.is_zeroing(m));
        pos.make_move(m).expect("legal");
        assert_eq!(pos.piece_at(Square::D5), None);
        assert_eq!(pos.last_captured(), Some(Color::Black.pawn()));
        pos.pop();
        assert_eq!(pos.piece_at(Square::D5), Some(Color::Black.pawn()));
    }

    #[test]
    fn test_promotion() {
        let mut pos = Position::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
        pos.make_move(Move::new(Square::E7, Square::E8).with_promotion(Role::Knight))
            .expect("legal");
        assert_eq!(pos.piece_at(Square::E8), Some(Color::White.knight()));
        assert!(pos.is_check());
    }

    #[test]
    fn test_check_queries() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4R2K b - - 0 1").expect("valid fen");
        assert!(pos.is_check());
        assert_eq!(pos.try_is_check(), Ok(true));
        assert_eq!(pos.checkers(), Bitboard::from(Square::E1));

        let pos = Position::from_fen("8/8/8/8/8/8/8/4R2K b - - 0 1").expect("valid fen");
        assert!(!pos.is_check());
        assert_eq!(
            pos.try_is_check(),
            Err(KingMissingError { color: Color::Black })
        );
    }

    #[test]
    fn test_gives_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").expect("valid fen");
        assert!(pos.gives_check(Move::new(Square::A1, Square::A8)));
        assert!(!pos.gives_check(Move::new(Square::A1, Square::B1)));
        // The rook lands on d1, not on the e-file.
        assert!(!pos.gives_check(Move::new(Square::E1, Square::C1)));
    }

    #[test]
    fn test_clean_castling_rights() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K1NR w KQ - 0 1").expect("valid fen");
        assert_eq!(pos.clean_castling_rights(), Bitboard::from(Square::A1) | Square::H1);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R4K1R w KQ - 0 1").expect("valid fen");
        assert_eq!(pos.clean_castling_rights(), Bitboard::from(Square::A1) | Square::H1);
        assert_eq!(pos.status(), PositionErrorKinds::empty());

        let pos = Position::from_fen("4k3/8/8/8/8/8/4K3/R6R w KQ - 0 1").expect("valid fen");
        assert_eq!(pos.clean_castling_rights(), Bitboard::EMPTY);
        assert!(pos.status().contains(PositionErrorKinds::INVALID_CASTLING_RIGHTS));
    }

    #[test]
    fn test_status() {
        assert!(Position::new().validate().is_ok());
        assert_eq!(
            Position::empty().status(),
            PositionErrorKinds::EMPTY_BOARD | PositionErrorKinds::MISSING_KING
        );

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2P w - - 0 1").expect("valid fen");
        assert_eq!(pos.status(), PositionErrorKinds::PAWNS_ON_BACKRANK);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4R2K w - - 0 1").expect("valid fen");
        assert_eq!(pos.status(), PositionErrorKinds::OPPOSITE_CHECK);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1").expect("valid fen");
        assert_eq!(pos.status(), PositionErrorKinds::INVALID_EP_SQUARE);

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4KK2 w - - 0 1").expect("valid fen");
        assert!(pos.status().contains(PositionErrorKinds::TOO_MANY_KINGS));
        let err = pos.validate().expect_err("invalid");
        assert!(err.to_string().contains("too many kings"));
    }

    #[test]
    fn test_impossible_check() {
        // Checks from both sides along the same file.
        let pos = Position::from_fen("4R3/8/8/8/4k3/8/8/K3R3 b - - 0 1").expect("valid fen");
        assert!(pos.status().contains(PositionErrorKinds::IMPOSSIBLE_CHECK));

        // Discovered double check is fine.
        let pos = Position::from_fen("4k3/8/8/1B6/8/8/4R3/K7 b - - 0 1").expect("valid fen");
        assert_eq!(pos.status(), PositionErrorKinds::empty());
    }

    #[test]
    fn test_mirror() {
        let pos = Position::from_fen("r3k2r/p7/8/8/4P3/8/8/R3K2R b KQq e3 0 1").expect("valid fen");
        let mirrored = pos.mirror();
        assert_eq!(
            mirrored.fen(),
            "r3k2r/8/8/4p3/8/8/P7/R3K2R w Qkq e6 0 1"
        );
        assert_eq!(mirrored.mirror(), pos);
    }

    #[test]
    fn test_editing_clears_stack() {
        let mut pos = Position::new();
        pos.make_move(Move::new(Square::E2, Square::E4)).expect("legal");
        pos.set_piece_at(Square::E4, Color::White.queen());
        assert_eq!(pos.peek(), None);
        assert_eq!(pos.remove_piece_at(Square::E4), Some(Color::White.queen()));
        pos.clear();
        assert_eq!(pos, Position::empty());
    }

    #[test]
    fn test_root() {
        let mut pos = Position::new();
        for m in [
            Move::new(Square::E2, Square::E4),
            Move::new(Square::E7, Square::E5),
            Move::new(Square::G1, Square::F3),
        ] {
            pos.make_move(m).expect("legal");
        }
        assert_eq!(pos.root(), Position::new());
        assert_eq!(pos.move_stack().len(), 3);
        assert_eq!(pos.move_stack().next(), Some(Move::new(Square::E2, Square::E4)));
    }
}
