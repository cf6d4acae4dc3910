//! `PartialResponseHandler`: decides whether a record is complete enough to
//! serve, and attempts to repair one that isn't.
//!
//! Completeness is gated only by required fields, per the variant itself —
//! a record with every required field present is always servable, even if
//! some optional field is still missing. A missing optional field is
//! tracked as informational (for `mark_if_partial`'s sidecar marker) and
//! never downgrades a complete record into one that needs repair.

use crate::value::CacheValue;

/// Outcome of evaluating a record against its own variant's field
/// requirements.
#[derive(Debug, Clone, PartialEq)]
pub enum Completeness {
    /// Every required field is present. `missing_optional` lists any
    /// optional fields still absent, purely for informational marking.
    Complete { missing_optional: Vec<String> },
    /// A required field is missing; the record needs repair before it can
    /// be served with confidence.
    Incomplete { missing_required: Vec<String> },
}

const COMPONENT_REQUIRED: &[&str] = &["name", "code"];
const COMPONENT_OPTIONAL: &[&str] = &["demo", "metadata", "dependencies"];
const METADATA_REQUIRED: &[&str] = &["name", "kind"];
const METADATA_OPTIONAL: &[&str] = &["description", "tags", "dependencies"];
const BLOCK_REQUIRED: &[&str] = &["name", "code"];
const BLOCK_OPTIONAL: &[&str] = &["components", "description", "tags"];

fn classify(value: &CacheValue, required: &[&str], optional: &[&str]) -> Completeness {
    let required: Vec<String> = required.iter().map(|f| f.to_string()).collect();
    let optional: Vec<String> = optional.iter().map(|f| f.to_string()).collect();

    let missing_required = value.missing_named_fields(&required);
    if !missing_required.is_empty() {
        return Completeness::Incomplete { missing_required };
    }
    Completeness::Complete { missing_optional: value.missing_named_fields(&optional) }
}

/// Evaluates and repairs records against their own variant's field
/// requirements.
pub struct PartialResponseHandler;

impl PartialResponseHandler {
    /// Judges `value` against the required/optional field set its own
    /// variant defines. `ComponentDemo`, `Directory`, and `Opaque` have no
    /// required fields and are always [`Completeness::Complete`].
    pub fn evaluate(value: &CacheValue) -> Completeness {
        match value {
            CacheValue::Component { .. } => classify(value, COMPONENT_REQUIRED, COMPONENT_OPTIONAL),
            CacheValue::ComponentMetadata { .. } => classify(value, METADATA_REQUIRED, METADATA_OPTIONAL),
            CacheValue::Block { .. } => classify(value, BLOCK_REQUIRED, BLOCK_OPTIONAL),
            CacheValue::ComponentDemo { .. } | CacheValue::Directory(_) | CacheValue::Opaque(_) => {
                Completeness::Complete { missing_optional: Vec::new() }
            }
        }
    }

    /// Marks `value` partial with its missing optional fields, if any. A
    /// record with none missing, or one that's [`Completeness::Incomplete`],
    /// is returned unchanged — repairing an incomplete record is
    /// [`PartialResponseHandler::evaluate`]'s caller's job, not this one's.
    pub fn mark_if_partial(value: CacheValue) -> CacheValue {
        match Self::evaluate(&value) {
            Completeness::Complete { missing_optional } if !missing_optional.is_empty() => value.mark_partial(&missing_optional),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: Option<&str>, code: Option<&str>, demo: Option<&str>) -> CacheValue {
        CacheValue::Component {
            name: name.map(str::to_string),
            code: code.map(str::to_string),
            demo: demo.map(str::to_string),
            metadata: Some(serde_json::json!({})),
            dependencies: Some(Vec::new()),
            partial: false,
            missing_fields: Vec::new(),
        }
    }

    #[test]
    fn complete_component_has_no_missing_fields() {
        let value = component(Some("button"), Some("..."), Some("..."));
        assert_eq!(PartialResponseHandler::evaluate(&value), Completeness::Complete { missing_optional: Vec::new() });
    }

    #[test]
    fn component_missing_optional_demo_is_still_complete() {
        let value = component(Some("button"), Some("..."), None);
        match PartialResponseHandler::evaluate(&value) {
            Completeness::Complete { missing_optional } => assert_eq!(missing_optional, vec!["demo".to_string()]),
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn component_missing_required_code_is_incomplete() {
        let value = component(Some("button"), None, Some("..."));
        match PartialResponseHandler::evaluate(&value) {
            Completeness::Incomplete { missing_required } => assert!(missing_required.contains(&"code".to_string())),
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn opaque_values_are_always_complete() {
        let value = CacheValue::Opaque(vec![1, 2, 3]);
        assert_eq!(PartialResponseHandler::evaluate(&value), Completeness::Complete { missing_optional: Vec::new() });
    }

    #[test]
    fn component_demo_has_no_required_fields() {
        let value = CacheValue::ComponentDemo { name: Some("button".to_string()), code: None };
        assert_eq!(PartialResponseHandler::evaluate(&value), Completeness::Complete { missing_optional: Vec::new() });
    }

    #[test]
    fn mark_if_partial_sets_marker_only_when_an_optional_field_is_missing() {
        let value = component(Some("button"), Some("..."), None);
        let marked = PartialResponseHandler::mark_if_partial(value);
        assert!(marked.is_partial());
        assert_eq!(marked.missing_fields(), vec!["demo".to_string()]);
    }

    #[test]
    fn mark_if_partial_leaves_a_fully_complete_record_untouched() {
        let value = component(Some("button"), Some("..."), Some("..."));
        let marked = PartialResponseHandler::mark_if_partial(value);
        assert!(!marked.is_partial());
    }

    #[test]
    fn mark_if_partial_does_not_mark_an_incomplete_record() {
        let value = component(Some("button"), None, None);
        let marked = PartialResponseHandler::mark_if_partial(value);
        assert!(!marked.is_partial());
    }
}
