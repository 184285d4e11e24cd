//! Deserialization of request bodies as the controllers receive them, and
//! JSON Schema generation for the `vh schema` command.

use pretty_assertions::assert_eq;
use schemars::schema_for;
use vh_core::entities::{Answer, ServiceTypeLink};
use vh_core::enums::{CreateType, QuestionPurpose, ValidationType};
use vh_core::requests::*;

#[test]
fn service_offering_clone_payload() {
    let body = serde_json::json!({
        "name": "Catering Premium",
        "type": "clone",
        "cloneId": 4,
        "serviceTypeData": [{"serviceTypeId": 1, "workItemIds": [3, 4]}]
    });
    let payload: ServiceOfferingPayload = serde_json::from_value(body).unwrap();
    assert_eq!(payload.create_type, CreateType::Clone);
    assert_eq!(payload.clone_id, Some(4));
    assert_eq!(
        payload.service_type_data,
        vec![ServiceTypeLink {
            service_type_id: 1,
            work_item_ids: vec![3, 4],
        }]
    );
    payload.validate().unwrap();
}

#[test]
fn create_type_defaults_to_new() {
    let payload: ServiceTypePayload =
        serde_json::from_value(serde_json::json!({"name": "Audio"})).unwrap();
    assert_eq!(payload.create_type, CreateType::New);
    assert!(payload.work_item_ids.is_empty());
}

#[test]
fn blank_name_fails_validation() {
    let payload: PermissionPayload =
        serde_json::from_value(serde_json::json!({"name": "  "})).unwrap();
    let err = payload.validate().unwrap_err();
    assert!(err.to_string().contains("name is required"));
}

#[test]
fn negative_ids_fail_validation() {
    let payload: PermissionPayload =
        serde_json::from_value(serde_json::json!({"name": "Edit", "roleIds": [1, -2]})).unwrap();
    let err = payload.validate().unwrap_err();
    assert!(err.to_string().contains("roleIds"));
}

#[test]
fn org_hierarchy_requires_iso_date() {
    let bad = serde_json::json!({"clientId": 1, "name": "Org", "effectiveDate": "20/03/2025"});
    assert!(serde_json::from_value::<OrgHierarchyPayload>(bad).is_err());

    let good = serde_json::json!({"clientId": 1, "name": "Org", "effectiveDate": "2025-03-20"});
    let payload: OrgHierarchyPayload = serde_json::from_value(good).unwrap();
    assert_eq!(payload.effective_date.to_string(), "2025-03-20");
}

#[test]
fn answer_input_accessors() {
    let answer: AnswerInput = serde_json::from_value(serde_json::json!({
        "questionId": 2,
        "questionOptionId": [5, 6],
        "customValue": ""
    }))
    .unwrap();
    assert_eq!(answer.option_ids(), &[5, 6]);
    assert_eq!(answer.text(), None);
}

#[test]
fn question_payload_parses_rules() {
    let payload: QuestionPayload = serde_json::from_value(serde_json::json!({
        "purpose": "vendor_room",
        "questionText": "Upload a floor plan",
        "validations": [
            {"validationType": "file_format", "value": "png,jpeg"},
            {"validationType": "file_size", "value": "2"}
        ]
    }))
    .unwrap();
    assert_eq!(payload.purpose, QuestionPurpose::VendorRoom);
    assert_eq!(payload.validations[0].validation_type, ValidationType::FileFormat);
    assert_eq!(payload.validations[1].value.as_deref(), Some("2"));
}

#[test]
fn answer_serializes_file_url_key() {
    let answer = Answer {
        id: 1,
        question_id: 2,
        question_option_id: None,
        custom_value: String::new(),
        file_url: Some("https://cdn.example/uploads/vendor-room-x".into()),
    };
    let json = serde_json::to_value(&answer).unwrap();
    assert_eq!(json["fileURL"], "https://cdn.example/uploads/vendor-room-x");
    assert_eq!(json["customValue"], "");
}

#[test]
fn schemas_generate_for_payloads() {
    let schema = serde_json::to_value(schema_for!(ListRequest<VendorFilter>)).unwrap();
    assert!(schema["properties"]["sortBy"].is_object());
    let schema = serde_json::to_value(schema_for!(VendorRoomPayload)).unwrap();
    assert!(schema["properties"]["answers"].is_object());
}
