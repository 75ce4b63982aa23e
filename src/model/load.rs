use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use super::shapes::{Model, Shape, ShapeKind};

#[derive(Deserialize)]
struct ModelDoc {
    shapes: Vec<Shape>,
}

/// Load a shape model from a JSON or YAML document, keyed on file extension.
///
/// The document is a flat list of shapes; the prelude scalar shapes are
/// seeded automatically, and every member target must resolve to a declared
/// shape or a prelude shape.
pub fn load_model(path: &Path) -> anyhow::Result<Model> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file {path:?}"))?;
    let doc: ModelDoc = if path
        .extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
    {
        serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse YAML model {path:?}"))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON model {path:?}"))?
    };

    let model = Model::from_shapes(doc.shapes);
    verify_targets(&model)?;
    debug!(shapes = model.len(), "model loaded");
    Ok(model)
}

/// Every member reference must resolve; dangling targets are load errors, not
/// something generation should discover halfway through a structure.
fn verify_targets(model: &Model) -> anyhow::Result<()> {
    for shape in model.shapes() {
        let members: Vec<&super::shapes::Member> = match &shape.kind {
            ShapeKind::List { member } => vec![member],
            ShapeKind::Map { key, value } => vec![key, value],
            ShapeKind::Structure { members } => members.iter().collect(),
            ShapeKind::Union { variants } => variants.iter().collect(),
            _ => continue,
        };
        for member in members {
            if model.get(&member.target).is_none() {
                anyhow::bail!(
                    "member {}${} references unknown shape {}",
                    shape.id,
                    member.name,
                    member.target
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_model_with_prelude_targets() {
        let doc = serde_json::json!({
            "shapes": [
                {
                    "id": "example#Pet",
                    "type": "structure",
                    "members": [
                        { "name": "name", "target": "shapegen.api#String", "traits": { "required": true } },
                        { "name": "age", "target": "shapegen.api#Integer" }
                    ]
                }
            ]
        });
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{doc}").unwrap();
        let model = load_model(file.path()).unwrap();
        assert!(model.get(&"example#Pet".into()).is_some());
        assert_eq!(model.structures().count(), 1);
    }

    #[test]
    fn rejects_dangling_target() {
        let doc = serde_json::json!({
            "shapes": [
                {
                    "id": "example#Pet",
                    "type": "structure",
                    "members": [
                        { "name": "owner", "target": "example#Missing" }
                    ]
                }
            ]
        });
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{doc}").unwrap();
        let err = load_model(file.path()).unwrap_err();
        assert!(err.to_string().contains("example#Missing"));
    }
}
