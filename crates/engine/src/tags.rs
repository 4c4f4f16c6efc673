//! Context tag parsing and resolution.
//!
//! Step arguments may embed tags that pull values out of the run's context
//! namespace. Four delimiter forms exist:
//!
//! - `{% path %}` resolves a full dotted path,
//! - `{: step_id :}` shorthand for `steps.<step_id>.result`,
//! - `{# name #}` shorthand for `job.variables.<name>`,
//! - `{< name >}` shorthand for `job.parameters.<name>`.
//!
//! Tags nest: inner tags are resolved first and their rendering becomes part
//! of the outer tag's path. A string that consists of exactly one tag (plus
//! surrounding whitespace) yields the raw resolved value with its structure
//! intact; a tag embedded in a longer string is rendered into text instead.

use serde_json::Value;

use crate::namespace::{is_truthy, resolve_path};

/// Nesting ceiling for tag-inside-tag resolution. Anything deeper is left
/// as literal text.
pub const MAX_TAG_DEPTH: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagForm {
    /// `{% path %}`
    Path,
    /// `{: step_id :}`
    StepResult,
    /// `{# name #}`
    Variable,
    /// `{< name >}`
    Local,
}

impl TagForm {
    fn opener(self) -> &'static str {
        match self {
            TagForm::Path => "{%",
            TagForm::StepResult => "{:",
            TagForm::Variable => "{#",
            TagForm::Local => "{<",
        }
    }

    fn closer(self) -> &'static str {
        match self {
            TagForm::Path => "%}",
            TagForm::StepResult => ":}",
            TagForm::Variable => "#}",
            TagForm::Local => ">}",
        }
    }
}

const FORMS: [TagForm; 4] = [
    TagForm::Path,
    TagForm::StepResult,
    TagForm::Variable,
    TagForm::Local,
];

enum Segment<'a> {
    Text(&'a str),
    Tag(TagForm, &'a str),
}

// Delimiter tokens are ASCII, so byte-level scanning is safe and every
// match lands on a char boundary.
fn opener_at(bytes: &[u8], at: usize) -> Option<TagForm> {
    FORMS.into_iter().find(|form| bytes[at..].starts_with(form.opener().as_bytes()))
}

/// Finds the byte offset (relative to `text`, which starts just past the
/// opener) of the closer matching `form`, skipping over balanced nested
/// occurrences of the same delimiter pair. Other forms' delimiters are
/// plain text at this level. `None` means the tag is unterminated.
fn find_closer(text: &str, form: TagForm) -> Option<usize> {
    let bytes = text.as_bytes();
    let opener = form.opener().as_bytes();
    let closer = form.closer().as_bytes();
    let mut depth = 0u32;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i..].starts_with(closer) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(opener) {
            depth += 1;
            i += 2;
            continue;
        }
        i += 1;
    }
    None
}

fn split_segments(input: &str) -> Vec<Segment<'_>> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < input.len() {
        let Some(start) = (i..bytes.len()).find(|&at| opener_at(bytes, at).is_some()) else {
            segments.push(Segment::Text(&input[i..]));
            break;
        };
        // opener_at matched at `start`, so this lookup cannot miss
        let Some(form) = opener_at(bytes, start) else {
            break;
        };
        if start > i {
            segments.push(Segment::Text(&input[i..start]));
        }
        let body_start = start + 2;
        match find_closer(&input[body_start..], form) {
            Some(offset) => {
                segments.push(Segment::Tag(form, &input[body_start..body_start + offset]));
                i = body_start + offset + 2;
            }
            None => {
                // unterminated opener stays literal
                segments.push(Segment::Text(&input[start..body_start]));
                i = body_start;
            }
        }
    }
    segments
}

/// Renders a resolved value for embedding inside a larger string.
///
/// Strings embed as-is, `Null` as the empty string, scalars via their
/// display form, and composites as compact JSON.
pub fn render_embedded(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => serde_json::to_string(composite).unwrap_or_default(),
    }
}

fn tag_path(form: TagForm, inner: &str) -> String {
    match form {
        TagForm::Path => inner.to_string(),
        TagForm::StepResult => match inner.split_once('.') {
            Some((id, rest)) => format!("steps.{id}.result.{rest}"),
            None => format!("steps.{inner}.result"),
        },
        TagForm::Variable => format!("job.variables.{inner}"),
        TagForm::Local => format!("job.parameters.{inner}"),
    }
}

fn resolve_tag(form: TagForm, inner: &str, root: &Value, depth: u32) -> Value {
    let inner = render_embedded(&resolve_fragment(inner, root, depth));
    let path = tag_path(form, inner.trim());
    resolve_path(root, &path)
}

fn resolve_fragment(input: &str, root: &Value, depth: u32) -> Value {
    if depth == 0 {
        return Value::String(input.to_string());
    }
    let segments = split_segments(input);
    let mut tags = segments.iter().filter_map(|segment| match segment {
        Segment::Tag(form, inner) => Some((*form, *inner)),
        Segment::Text(_) => None,
    });
    let only_whitespace_text = segments.iter().all(|segment| match segment {
        Segment::Text(text) => text.trim().is_empty(),
        Segment::Tag(..) => true,
    });
    if only_whitespace_text
        && let Some(single) = tags.next()
        && tags.next().is_none()
    {
        return resolve_tag(single.0, single.1, root, depth - 1);
    }
    let mut output = String::with_capacity(input.len());
    for segment in &segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Tag(form, inner) => {
                output.push_str(&render_embedded(&resolve_tag(*form, inner, root, depth - 1)));
            }
        }
    }
    Value::String(output)
}

/// Resolves every tag in `input` against the namespace rooted at `root`.
pub fn resolve_str(input: &str, root: &Value) -> Value {
    resolve_fragment(input, root, MAX_TAG_DEPTH)
}

/// Recursively resolves tags inside a value.
///
/// Strings go through [`resolve_str`]; arrays and objects resolve their
/// elements, and object keys themselves may carry tags (the resolved key is
/// rendered back to text). Other scalars pass through untouched.
pub fn resolve_value(value: &Value, root: &Value) -> Value {
    match value {
        Value::String(s) => resolve_str(s, root),
        Value::Array(items) => Value::Array(items.iter().map(|item| resolve_value(item, root)).collect()),
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                let key = match resolve_str(key, root) {
                    Value::String(key) => key,
                    other => render_embedded(&other),
                };
                resolved.insert(key, resolve_value(item, root));
            }
            Value::Object(resolved)
        }
        other => other.clone(),
    }
}

/// Resolves a step's `if` condition to a verdict.
///
/// An array condition requires every element to be truthy; anything else is
/// judged on its own truthiness after resolution.
pub fn resolve_condition(condition: &Value, root: &Value) -> bool {
    match resolve_value(condition, root) {
        Value::Array(items) => items.iter().all(is_truthy),
        other => is_truthy(&other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_root() -> Value {
        json!({
            "job": {
                "name": "demo",
                "success": null,
                "id": null,
                "variables": { "foo": "bar", "bar": 42, "items": [1, 2, 3] },
                "parameters": { "who": "world" }
            },
            "steps": {
                "fetch": {
                    "result": { "value": ["a", "b"], "count": 2 },
                    "status": { "name": "DONE", "value": 0 },
                    "position": 1,
                    "id": "fetch"
                }
            }
        })
    }

    #[test]
    fn whole_string_tag_yields_raw_value() {
        let root = sample_root();
        assert_eq!(resolve_str("{# items #}", &root), json!([1, 2, 3]));
        assert_eq!(resolve_str("  {: fetch :}  ", &root), json!({"value": ["a", "b"], "count": 2}));
    }

    #[test]
    fn embedded_tags_render_into_text() {
        let root = sample_root();
        assert_eq!(
            resolve_str("hello {< who >}!", &root),
            json!("hello world!")
        );
        assert_eq!(
            resolve_str("count={: fetch.count :}", &root),
            json!("count=2")
        );
        assert_eq!(
            resolve_str("items={# items #}", &root),
            json!("items=[1,2,3]")
        );
    }

    #[test]
    fn nested_tags_resolve_inner_first() {
        // foo resolves to "bar", so the outer tag reads variable "bar"
        let root = sample_root();
        assert_eq!(resolve_str("{# {# foo #} #}", &root), json!(42));
        assert_eq!(
            resolve_str("{% job.variables.{# foo #} %}", &root),
            json!(42)
        );
    }

    #[test]
    fn step_shorthand_expands_to_result_path() {
        let root = sample_root();
        assert_eq!(resolve_str("{: fetch :}", &root)["count"], json!(2));
        assert_eq!(resolve_str("{: fetch.value.1 :}", &root), json!("b"));
    }

    #[test]
    fn missing_paths_resolve_to_null() {
        let root = sample_root();
        assert_eq!(resolve_str("{% job.variables.nope %}", &root), Value::Null);
        assert_eq!(resolve_str("x={% job.variables.nope %}y", &root), json!("x=y"));
    }

    #[test]
    fn unterminated_openers_stay_literal() {
        let root = sample_root();
        assert_eq!(resolve_str("a {% b", &root), json!("a {% b"));
        assert_eq!(resolve_str("{#", &root), json!("{#"));
    }

    #[test]
    fn only_same_form_delimiters_nest() {
        let root = sample_root();
        // the stray "{#" is plain text inside the path tag, which still closes
        assert_eq!(resolve_str("{% a {# b %}", &root), Value::Null);
        assert_eq!(resolve_str("x{% a {# b %}y", &root), json!("xy"));
        assert_eq!(resolve_str("{# {# foo #} #}", &root), json!(42));
    }

    #[test]
    fn multibyte_text_around_tags_is_preserved() {
        let root = sample_root();
        assert_eq!(
            resolve_str("héllo {< who >} über", &root),
            json!("héllo world über")
        );
    }

    #[test]
    fn plain_text_passes_through() {
        let root = sample_root();
        assert_eq!(resolve_str("no tags here", &root), json!("no tags here"));
        assert_eq!(resolve_str("", &root), json!(""));
    }

    #[test]
    fn resolve_value_descends_into_composites() {
        let root = sample_root();
        let input = json!({
            "list": ["{# foo #}", "{# bar #}"],
            "{< who >}": true
        });
        let resolved = resolve_value(&input, &root);
        assert_eq!(resolved["list"], json!(["bar", 42]));
        assert_eq!(resolved["world"], json!(true));
    }

    #[test]
    fn conditions_use_truthiness() {
        let root = sample_root();
        assert!(resolve_condition(&json!("{# foo #}"), &root));
        assert!(!resolve_condition(&json!("{% job.variables.nope %}"), &root));
        assert!(resolve_condition(&json!(["{# foo #}", "{# bar #}"]), &root));
        assert!(!resolve_condition(&json!(["{# foo #}", "{% job.id %}"]), &root));
    }

    #[test]
    fn depth_ceiling_stops_runaway_nesting() {
        let root = sample_root();
        let mut pathological = String::from("foo");
        for _ in 0..(MAX_TAG_DEPTH + 4) {
            pathological = format!("{{# {pathological} #}}");
        }
        // resolution bottoms out and the innermost text survives literally
        let resolved = resolve_str(&pathological, &root);
        assert!(resolved.is_null() || resolved.is_string());
    }
}
