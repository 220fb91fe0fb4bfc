//! Core logic of the `typed-patch` binary.
//!
//! Reads a shape descriptor and a patch, applies the patch to a document and
//! renders the result.

use serde_json::Value;

use crate::bind::Binder;
use crate::codec::{JsonPatchConverter, MergePatchConverter, PatchConverter};
use crate::error::PatchError;
use crate::patch::Patch;
use crate::shape::{ShapeDescriptor, ShapeRef};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Io(std::io::Error),
    Patch(PatchError),
    Usage(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Patch(e) => write!(f, "{e}"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<PatchError> for CliError {
    fn from(e: PatchError) -> Self {
        CliError::Patch(e)
    }
}

// ── Arguments ─────────────────────────────────────────────────────────────

pub const USAGE: &str = "Usage: typed-patch <shape-file> <patch-json> [--merge] [--verbose]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub shape_file: String,
    pub patch: String,
    /// Treat the patch as a merge patch document.
    pub merge: bool,
    pub verbose: bool,
}

impl CliArgs {
    /// Parses arguments, excluding the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, CliError> {
        let mut positional = Vec::new();
        let mut merge = false;
        let mut verbose = false;
        for arg in args {
            match arg.as_str() {
                "--merge" => merge = true,
                "--verbose" | "-v" => verbose = true,
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("Unknown flag: {flag}\n{USAGE}")))
                }
                _ => positional.push(arg),
            }
        }
        let [shape_file, patch]: [String; 2] = positional
            .try_into()
            .map_err(|_| CliError::Usage(USAGE.to_string()))?;
        Ok(Self {
            shape_file,
            patch,
            merge,
            verbose,
        })
    }
}

// ── Patching ──────────────────────────────────────────────────────────────

fn apply_with<F>(doc_json: &str, shape_json: &str, patch_json: &str, parse: F) -> Result<String, CliError>
where
    F: FnOnce(&Value, &Value, &ShapeRef, &Binder) -> Result<Patch, PatchError>,
{
    let descriptor: ShapeDescriptor = serde_json::from_str(shape_json)?;
    let shape = descriptor.build();
    let doc: Value = serde_json::from_str(doc_json)?;
    let document: Value = serde_json::from_str(patch_json)?;
    let binder = Binder::exact();
    let patch = parse(&document, &doc, &shape, &binder)?;
    let result = patch.apply(&doc, &shape, &binder)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Applies a JSON Patch array to a document of the described shape.
pub fn apply_json_patch(doc_json: &str, shape_json: &str, patch_json: &str) -> Result<String, CliError> {
    apply_with(doc_json, shape_json, patch_json, |document, _, _, _| {
        JsonPatchConverter.parse(document)
    })
}

/// Applies a merge patch document to a document of the described shape.
/// Members the shape does not declare are ignored.
pub fn apply_merge_patch(doc_json: &str, shape_json: &str, patch_json: &str) -> Result<String, CliError> {
    apply_with(doc_json, shape_json, patch_json, |document, doc, shape, binder| {
        MergePatchConverter.parse_against(document, doc, shape, binder)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: &str = r#"{"type":"record","name":"Hobbit","fields":{
        "name":{"type":"string"},
        "nickname":{"type":"optional","inner":{"type":"string"}},
        "tags":{"type":"list","element":{"type":"string"}}
    }}"#;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_positionals_and_flags() {
        let parsed = CliArgs::parse(args(&["shape.json", "[]", "--merge"])).unwrap();
        assert_eq!(parsed.shape_file, "shape.json");
        assert_eq!(parsed.patch, "[]");
        assert!(parsed.merge);
        assert!(!parsed.verbose);
    }

    #[test]
    fn rejects_wrong_arity_and_unknown_flags() {
        assert!(matches!(CliArgs::parse(args(&["shape.json"])), Err(CliError::Usage(_))));
        assert!(matches!(
            CliArgs::parse(args(&["a", "b", "--fast"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn json_patch_round() {
        let doc = r#"{"name":"Bilbo","nickname":null,"tags":["a","b"]}"#;
        let patch = r#"[{"op":"replace","path":"/name","value":"Frodo"},{"op":"add","path":"/tags/-","value":"c"}]"#;
        let out = apply_json_patch(doc, SHAPE, patch).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["name"], "Frodo");
        assert_eq!(v["tags"], serde_json::json!(["a", "b", "c"]));
    }

    #[test]
    fn merge_patch_round() {
        let doc = r#"{"name":"Bilbo","nickname":"B","tags":[]}"#;
        let out =
            apply_merge_patch(doc, SHAPE, r#"{"nickname":null,"tags":["x"],"_links":{}}"#).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert!(v["nickname"].is_null());
        assert_eq!(v["tags"], serde_json::json!(["x"]));
    }

    #[test]
    fn patch_errors_are_reported() {
        let doc = r#"{"name":"Bilbo","nickname":null,"tags":[]}"#;
        let err = apply_json_patch(doc, SHAPE, r#"[{"op":"remove","path":"/name"}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Path '/name' is not nullable.");
    }
}
