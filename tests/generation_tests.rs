#![allow(clippy::unwrap_used, clippy::expect_used)]

use shapegen::generator::generate_project;
use shapegen::model::{load_model, Model};
use std::io::Write;
use std::path::PathBuf;

fn write_model(doc: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{doc}").unwrap();
    file
}

fn pet_store_doc() -> serde_json::Value {
    serde_json::json!({
        "shapes": [
            {
                "id": "pets#Status",
                "type": "enum",
                "constants": [
                    { "name": "AVAILABLE", "value": "available" },
                    { "name": "PENDING", "value": "pending" },
                    { "name": "SOLD", "value": "sold" }
                ]
            },
            {
                "id": "pets#Tags",
                "type": "list",
                "member": { "name": "member", "target": "shapegen.api#String" },
                "traits": { "uniqueItems": true, "length": { "max": 8 } }
            },
            {
                "id": "pets#Pet",
                "type": "structure",
                "members": [
                    { "name": "name", "target": "shapegen.api#String",
                      "traits": { "required": true,
                                  "length": { "min": 1, "max": 40 },
                                  "pattern": "[a-z][a-z ]*" } },
                    { "name": "status", "target": "pets#Status",
                      "traits": { "default": "available" } },
                    { "name": "age", "target": "shapegen.api#Integer",
                      "traits": { "range": { "min": 0, "max": 50 } } },
                    { "name": "tags", "target": "pets#Tags" }
                ]
            },
            {
                "id": "pets#GetPetInput",
                "type": "structure",
                "members": [
                    { "name": "id", "target": "shapegen.api#String",
                      "traits": { "required": true, "http": { "in": "label" } } },
                    { "name": "verbose", "target": "shapegen.api#Boolean",
                      "traits": { "http": { "in": "query" } } }
                ]
            },
            {
                "id": "pets#Booking",
                "type": "structure",
                "traits": { "span": { "lesser": "checkIn", "greater": "checkOut" } },
                "members": [
                    { "name": "checkIn", "target": "shapegen.api#Integer",
                      "traits": { "required": true } },
                    { "name": "checkOut", "target": "shapegen.api#Integer",
                      "traits": { "required": true } }
                ]
            }
        ]
    })
}

fn generate(doc: &serde_json::Value) -> anyhow::Result<(tempfile::TempDir, PathBuf)> {
    let file = write_model(doc);
    let model = load_model(file.path())?;
    let out = tempfile::tempdir().unwrap();
    let root = generate_project(&model, out.path(), "pets", false)?;
    Ok((out, root))
}

#[test]
fn pet_store_generates_all_modules() {
    let (_out, root) = generate(&pet_store_doc()).unwrap();
    let src = root.join("src");
    for module in ["lib.rs", "types.rs", "pet.rs", "status.rs", "get_pet_input.rs", "booking.rs"] {
        assert!(src.join(module).exists(), "missing {module}");
    }
}

#[test]
fn pet_struct_carries_validation_and_defaults() {
    let (_out, root) = generate(&pet_store_doc()).unwrap();
    let pet = std::fs::read_to_string(root.join("src").join("pet.rs")).unwrap();

    assert!(pet.contains("pub struct Pet"), "{pet}");
    // Pattern check precedes length which precedes range.
    let pattern_at = pet.find("is_match").unwrap();
    let length_at = pet.find("name.chars().count()").unwrap();
    let range_at = pet.find("age_value < 0i32").unwrap();
    assert!(pattern_at < length_at && length_at < range_at);
    // The enum default resolved by value lookup, not declared name.
    assert!(pet.contains("pub const DEFAULT_STATUS: Status = Status::Available;"), "{pet}");
    // Unique string list resolves to an ordered set.
    assert!(pet.contains("std::collections::BTreeSet<String>"), "{pet}");
    // Generated tests ride along.
    assert!(pet.contains("fn construction_and_equality_contract()"), "{pet}");
    assert!(pet.contains("fn default_applies_to_status()"), "{pet}");
}

#[test]
fn http_bound_input_gets_binding_glue() {
    let (_out, root) = generate(&pet_store_doc()).unwrap();
    let input = std::fs::read_to_string(root.join("src").join("get_pet_input.rs")).unwrap();
    assert!(input.contains("pub fn from_request_parts"), "{input}");
    assert!(input.contains("parts.path.get(\"id\")"), "{input}");
    assert!(input.contains("parts.query.get(\"verbose\")"), "{input}");
}

#[test]
fn span_structure_gets_ordering_test() {
    let (_out, root) = generate(&pet_store_doc()).unwrap();
    let booking = std::fs::read_to_string(root.join("src").join("booking.rs")).unwrap();
    assert!(booking.contains("fn span_ordering_holds()"), "{booking}");
    assert!(booking.contains("instance.check_in() <= instance.check_out()"), "{booking}");
}

#[test]
fn inverted_length_aborts_with_zero_emission() {
    let doc = serde_json::json!({
        "shapes": [{
            "id": "pets#Broken",
            "type": "structure",
            "members": [
                { "name": "code", "target": "shapegen.api#String",
                  "traits": { "required": true, "length": { "min": 5, "max": 4 } } }
            ]
        }]
    });
    let file = write_model(&doc);
    let model = load_model(file.path()).unwrap();
    let out = tempfile::tempdir().unwrap();
    let err = generate_project(&model, out.path(), "broken", false).unwrap_err();
    assert!(err.to_string().contains("minimum 5 exceeds maximum 4"), "{err}");
    assert!(!out.path().join("src").join("broken.rs").exists());
}

#[test]
fn member_bounds_must_narrow_type_bounds() {
    let doc = serde_json::json!({
        "shapes": [
            {
                "id": "pets#Age",
                "type": "integer",
                "traits": { "range": { "min": 10, "max": 150 } }
            },
            {
                "id": "pets#Holder",
                "type": "structure",
                "members": [
                    { "name": "age", "target": "pets#Age",
                      "traits": { "range": { "min": 5, "max": 99 } } }
                ]
            }
        ]
    });
    let file = write_model(&doc);
    let model = load_model(file.path()).unwrap();
    let out = tempfile::tempdir().unwrap();
    let err = generate_project(&model, out.path(), "pets", false).unwrap_err();
    let msg = err.to_string();
    // Both declaring locations appear in the message.
    assert!(msg.contains("pets#Holder$age"), "{msg}");
    assert!(msg.contains("pets#Age"), "{msg}");
}

#[test]
fn generation_is_deterministic_across_runs() {
    let (_out_a, root_a) = generate(&pet_store_doc()).unwrap();
    let (_out_b, root_b) = generate(&pet_store_doc()).unwrap();
    let a = std::fs::read_to_string(root_a.join("src").join("pet.rs")).unwrap();
    let b = std::fs::read_to_string(root_b.join("src").join("pet.rs")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn prelude_is_always_available() {
    let model = Model::with_prelude();
    assert!(model.get(&"shapegen.api#Integer".into()).is_some());
    assert!(model.get(&"shapegen.api#Timestamp".into()).is_some());
}
