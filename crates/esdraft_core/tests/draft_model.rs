use esdraft_core::{DraftRecord, QuestionAnswer};

#[test]
fn serialization_uses_camel_case_wire_fields() {
    let record = DraftRecord::new(
        1_700_000_000_000,
        "Acme",
        "Hello\nWorld",
        vec![QuestionAnswer::new("Why us?", "Because.")],
        1_700_000_000_000,
    )
    .unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 1_700_000_000_000_i64);
    assert_eq!(json["companyName"], "Acme");
    assert_eq!(json["motivationText"], "Hello\nWorld");
    assert_eq!(json["additionalQuestions"][0]["question"], "Why us?");
    assert_eq!(json["additionalQuestions"][0]["answer"], "Because.");
    assert_eq!(json["savedAt"], 1_700_000_000_000_i64);
    assert!(
        json.get("updatedAt").is_none(),
        "updatedAt must be omitted until the first edit"
    );

    let decoded: DraftRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn edited_record_serializes_updated_at() {
    let mut record = DraftRecord::new(5, "Acme", "Hello", Vec::new(), 5).unwrap();
    record.apply_edit("Acme", "Changed", Vec::new(), 9).unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["updatedAt"], 9);
    assert_eq!(json["savedAt"], 5);
    assert_eq!(json["id"], 5);
}

#[test]
fn missing_additional_questions_decodes_as_empty() {
    let value = serde_json::json!({
        "id": 3,
        "companyName": "Acme",
        "motivationText": "Hello",
        "savedAt": 3
    });

    let record: DraftRecord = serde_json::from_value(value).unwrap();
    assert!(record.additional_questions.is_empty());
    assert_eq!(record.updated_at, None);
}

#[test]
fn deserialize_rejects_blank_motivation_text() {
    let value = serde_json::json!({
        "id": 3,
        "companyName": "Acme",
        "motivationText": "   ",
        "additionalQuestions": [],
        "savedAt": 3
    });

    let err = serde_json::from_value::<DraftRecord>(value).unwrap_err();
    assert!(
        err.to_string().contains("motivationText must not be empty"),
        "unexpected error: {err}"
    );
}
