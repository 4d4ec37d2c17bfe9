#![cfg(feature = "serde")]

use chess_rules::{Color, Move, Role, Square};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    turn: Color,
    from: Square,
    moves: Vec<Move>,
    promotion: Role,
}

#[test]
fn test_json_representation() {
    let record = Record {
        turn: Color::Black,
        from: Square::E7,
        moves: vec![
            Move::new(Square::E7, Square::E8).with_promotion(Role::Queen),
            Move::NULL,
        ],
        promotion: Role::Knight,
    };

    let json = serde_json::to_string(&record).expect("serialize");
    assert_eq!(
        json,
        r#"{"turn":"black","from":"e7","moves":["e7e8q","0000"],"promotion":"n"}"#
    );
    assert_eq!(serde_json::from_str::<Record>(&json).expect("deserialize"), record);
}

#[test]
fn test_invalid_values() {
    assert!(serde_json::from_str::<Square>(r#""i9""#).is_err());
    assert!(serde_json::from_str::<Move>(r#""e2e4x""#).is_err());
    assert!(serde_json::from_str::<Color>(r#""red""#).is_err());
    assert!(serde_json::from_str::<Role>(r#""x""#).is_err());
}
