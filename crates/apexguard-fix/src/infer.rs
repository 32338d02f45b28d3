//! Heuristic object-type inference and permission-check synthesis.
//!
//! Inference is a capability, not truth: when no declaration can be found
//! within the backward window, the answer is `None` and the caller must
//! suppress the fix. A guard is never synthesized for a type the scan
//! cannot positively resolve.

use regex::Regex;

/// How many lines above the DML statement are searched for a declaration.
const DECLARATION_WINDOW: usize = 10;

/// Type names that look capitalized but are never SObjects.
const NON_SOBJECT_TYPES: &[&str] = &[
    "String", "Integer", "Boolean", "Decimal", "List", "Set", "Map",
];

/// Scans up to [`DECLARATION_WINDOW`] lines backward from `line_idx`
/// (0-based, exclusive) for a declaration of `identifier`, accepting either
/// `List<Type> identifier` or `Type identifier =`. The inferred type must
/// be capitalized and not a primitive/collection keyword.
pub fn infer_object_type<S: AsRef<str>>(
    lines: &[S],
    line_idx: usize,
    identifier: &str,
) -> Option<String> {
    let escaped = regex::escape(identifier);
    let list_decl = Regex::new(&format!(r"(?i)List<(\w+)>\s+{escaped}\b")).ok()?;
    let typed_decl = Regex::new(&format!(r"\b(\w+)\s+{escaped}\s*=")).ok()?;

    let start = line_idx.saturating_sub(DECLARATION_WINDOW);
    for line in &lines[start..line_idx.min(lines.len())] {
        let line = line.as_ref();
        if let Some(caps) = list_decl.captures(line) {
            return Some(caps[1].to_string());
        }

        if let Some(caps) = typed_decl.captures(line) {
            let candidate = caps[1].to_string();
            if looks_like_sobject(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

fn looks_like_sobject(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !NON_SOBJECT_TYPES.contains(&name)
}

/// Synthesizes the CRUD guard for a DML verb. Returns `None` for verbs the
/// engine cannot positively map (e.g. `merge`).
pub fn build_dml_check(operation: &str, object_type: &str) -> Option<String> {
    let check = match operation {
        "insert" => format!("!Schema.sObjectType.{object_type}.isCreateable()"),
        "update" => format!("!Schema.sObjectType.{object_type}.isUpdateable()"),
        "delete" => format!("!Schema.sObjectType.{object_type}.isDeletable()"),
        "upsert" => format!(
            "!Schema.sObjectType.{object_type}.isCreateable() || \
             !Schema.sObjectType.{object_type}.isUpdateable()"
        ),
        _ => return None,
    };
    Some(format!(
        "if ({check}) {{ throw new System.NoAccessException(); }}"
    ))
}

/// Synthesizes the read guard inserted before an inline query.
pub fn build_read_check(object_type: &str) -> String {
    format!(
        "if (!Schema.sObjectType.{object_type}.isAccessible()) {{ throw new System.NoAccessException(); }}"
    )
}
