//! Wire format tests
//!
//! The relay and its clients are deployed independently, so the JSON shape
//! is pinned here.

use cloakroom_proto::{
    CreateRoomRequest, CreateRoomResponse, ErrorResponse, GetRoomResponse, RoomCode, room_path,
};
use proptest::prelude::*;

#[test]
fn create_request_uses_camel_case() {
    let req = CreateRoomRequest {
        room_code: "ABCDEFGH".to_string(),
        encrypted_blob: "blobX".to_string(),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({"roomCode": "ABCDEFGH", "encryptedBlob": "blobX"}));
}

#[test]
fn create_request_missing_fields_default_to_empty() {
    let req: CreateRoomRequest = serde_json::from_str(r#"{"roomCode": "ABCDEFGH"}"#).unwrap();
    assert_eq!(req.room_code, "ABCDEFGH");
    assert!(req.encrypted_blob.is_empty());

    let req: CreateRoomRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(req, CreateRoomRequest::default());
}

#[test]
fn responses_parse_from_relay_json() {
    let created: CreateRoomResponse =
        serde_json::from_str(r#"{"success": true, "roomCode": "ABCDEFGH"}"#).unwrap();
    assert!(created.success);
    assert_eq!(created.room_code, "ABCDEFGH");

    let fetched: GetRoomResponse = serde_json::from_str(r#"{"encryptedBlob": "blobX"}"#).unwrap();
    assert_eq!(fetched.encrypted_blob, "blobX");

    let err: ErrorResponse = serde_json::from_str(r#"{"error": "Invalid room code"}"#).unwrap();
    assert_eq!(err, ErrorResponse::new("Invalid room code"));
}

#[test]
fn room_code_deserialization_validates() {
    let code: RoomCode = serde_json::from_str(r#""abcdefgh""#).unwrap();
    assert_eq!(code.as_str(), "ABCDEFGH");

    assert!(serde_json::from_str::<RoomCode>(r#""short""#).is_err());
    assert_eq!(serde_json::to_string(&code).unwrap(), r#""ABCDEFGH""#);
}

#[test]
fn room_path_appends_code() {
    assert_eq!(room_path("ABCDEFGH"), "/room/ABCDEFGH");
}

proptest! {
    #[test]
    fn prop_valid_codes_parse_upper_case(code in "[A-Za-z0-9]{8,12}") {
        let parsed = RoomCode::parse(&code).unwrap();
        prop_assert_eq!(parsed.as_str(), code.to_ascii_uppercase());
    }

    #[test]
    fn prop_codes_with_symbols_rejected(
        prefix in "[A-Z0-9]{4}",
        symbol in "[^A-Za-z0-9]",
        suffix in "[A-Z0-9]{4}",
    ) {
        let code = format!("{prefix}{symbol}{suffix}");
        prop_assert!(RoomCode::parse(&code).is_err());
    }

    #[test]
    fn prop_generated_indices_always_valid(indices in any::<[u8; 8]>()) {
        let code = RoomCode::from_alphabet_indices(indices);
        prop_assert_eq!(code.as_str().len(), 8);
        prop_assert!(RoomCode::parse(code.as_str()).is_ok());
    }
}
