//! The value envelope every tier stores and returns: a payload plus the
//! metadata needed to judge staleness, completeness, and capacity.

use std::time::{Duration, SystemTime};

/// The payload a tier stores: a tagged variant per resource shape, so
/// completeness and partiality are decided from real struct fields rather
/// than sniffed out of an opaque JSON blob. `partial`/`missing_fields` only
/// exist on the variants a completion strategy can judge incomplete
/// (`Component`, `ComponentMetadata`, `Block`); business fields on those
/// variants are `Option` because the origin adapter is untrusted and may
/// hand back a record genuinely missing one — whether an absence is
/// disqualifying is a [`crate::partial`] business rule, not something the
/// type system decides.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CacheValue {
    Component {
        name: Option<String>,
        code: Option<String>,
        demo: Option<String>,
        metadata: Option<serde_json::Value>,
        dependencies: Option<Vec<String>>,
        #[serde(default)]
        partial: bool,
        #[serde(default)]
        missing_fields: Vec<String>,
    },
    ComponentDemo {
        name: Option<String>,
        code: Option<String>,
    },
    ComponentMetadata {
        name: Option<String>,
        kind: Option<String>,
        description: Option<String>,
        tags: Option<Vec<String>>,
        dependencies: Option<Vec<String>>,
        #[serde(default)]
        partial: bool,
        #[serde(default)]
        missing_fields: Vec<String>,
    },
    Block {
        name: Option<String>,
        components: Option<Vec<String>>,
        description: Option<String>,
        tags: Option<Vec<String>>,
        code: Option<String>,
        #[serde(default)]
        partial: bool,
        #[serde(default)]
        missing_fields: Vec<String>,
    },
    /// Opaque tree shape, origin-defined (directory listings).
    Directory(serde_json::Value),
    /// Raw bytes with no field structure at all (e.g. a list payload).
    Opaque(Vec<u8>),
}

impl CacheValue {
    /// Size in bytes, as charged against a tier's `capacity_bytes` budget.
    pub fn size_bytes(&self) -> usize {
        match self {
            CacheValue::Opaque(b) => b.len(),
            other => serde_json::to_vec(other).map(|b| b.len()).unwrap_or(0),
        }
    }

    /// True if this record is marked partial (missing one or more fields
    /// the completion strategy considers required).
    pub fn is_partial(&self) -> bool {
        match self {
            CacheValue::Component { partial, .. }
            | CacheValue::ComponentMetadata { partial, .. }
            | CacheValue::Block { partial, .. } => *partial,
            CacheValue::ComponentDemo { .. } | CacheValue::Directory(_) | CacheValue::Opaque(_) => false,
        }
    }

    /// The `missing_fields` list recorded on a partial record, if any.
    pub fn missing_fields(&self) -> Vec<String> {
        match self {
            CacheValue::Component { missing_fields, .. }
            | CacheValue::ComponentMetadata { missing_fields, .. }
            | CacheValue::Block { missing_fields, .. } => missing_fields.clone(),
            CacheValue::ComponentDemo { .. } | CacheValue::Directory(_) | CacheValue::Opaque(_) => Vec::new(),
        }
    }

    /// Marks this record as partial with the given missing fields. No-op on
    /// a variant that can't carry a partial marker.
    pub fn mark_partial(mut self, missing: &[String]) -> Self {
        match &mut self {
            CacheValue::Component { partial, missing_fields, .. }
            | CacheValue::ComponentMetadata { partial, missing_fields, .. }
            | CacheValue::Block { partial, missing_fields, .. } => {
                *partial = true;
                *missing_fields = missing.to_vec();
            }
            CacheValue::ComponentDemo { .. } | CacheValue::Directory(_) | CacheValue::Opaque(_) => {}
        }
        self
    }

    /// True if `field` is present (`Some`) on this variant. Unknown field
    /// names, and variants with no such field at all, are reported absent.
    pub fn has_field(&self, field: &str) -> bool {
        match self {
            CacheValue::Component { name, code, demo, metadata, dependencies, .. } => match field {
                "name" => name.is_some(),
                "code" => code.is_some(),
                "demo" => demo.is_some(),
                "metadata" => metadata.is_some(),
                "dependencies" => dependencies.is_some(),
                _ => false,
            },
            CacheValue::ComponentDemo { name, code } => match field {
                "name" => name.is_some(),
                "code" => code.is_some(),
                _ => false,
            },
            CacheValue::ComponentMetadata { name, kind, description, tags, dependencies, .. } => match field {
                "name" => name.is_some(),
                "kind" => kind.is_some(),
                "description" => description.is_some(),
                "tags" => tags.is_some(),
                "dependencies" => dependencies.is_some(),
                _ => false,
            },
            CacheValue::Block { name, components, description, tags, code, .. } => match field {
                "name" => name.is_some(),
                "components" => components.is_some(),
                "description" => description.is_some(),
                "tags" => tags.is_some(),
                "code" => code.is_some(),
                _ => false,
            },
            CacheValue::Directory(_) | CacheValue::Opaque(_) => false,
        }
    }

    /// Filters `names` down to the ones absent on this value.
    pub fn missing_named_fields(&self, names: &[String]) -> Vec<String> {
        names.iter().filter(|n| !self.has_field(n)).cloned().collect()
    }

    /// Copies every field this value is missing in from `other`'s matching
    /// field, when `other` has it — used to merge a completion fetch's
    /// result into an incomplete record. A no-op across mismatched variants.
    pub fn merge_missing_from(self, other: &CacheValue) -> Self {
        match (self, other) {
            (
                CacheValue::Component { name, code, demo, metadata, dependencies, partial, missing_fields },
                CacheValue::Component { name: on, code: oc, demo: od, metadata: om, dependencies: ods, .. },
            ) => CacheValue::Component {
                name: name.or_else(|| on.clone()),
                code: code.or_else(|| oc.clone()),
                demo: demo.or_else(|| od.clone()),
                metadata: metadata.or_else(|| om.clone()),
                dependencies: dependencies.or_else(|| ods.clone()),
                partial,
                missing_fields,
            },
            (
                CacheValue::ComponentMetadata { name, kind, description, tags, dependencies, partial, missing_fields },
                CacheValue::ComponentMetadata { name: on, kind: ok, description: od, tags: ot, dependencies: ods, .. },
            ) => CacheValue::ComponentMetadata {
                name: name.or_else(|| on.clone()),
                kind: kind.or_else(|| ok.clone()),
                description: description.or_else(|| od.clone()),
                tags: tags.or_else(|| ot.clone()),
                dependencies: dependencies.or_else(|| ods.clone()),
                partial,
                missing_fields,
            },
            (
                CacheValue::Block { name, components, description, tags, code, partial, missing_fields },
                CacheValue::Block { name: on, components: oc, description: od, tags: ot, code: ocode, .. },
            ) => CacheValue::Block {
                name: name.or_else(|| on.clone()),
                components: components.or_else(|| oc.clone()),
                description: description.or_else(|| od.clone()),
                tags: tags.or_else(|| ot.clone()),
                code: code.or_else(|| ocode.clone()),
                partial,
                missing_fields,
            },
            (mine, _) => mine,
        }
    }

    /// Fills every field named in `missing` with a safe placeholder so a
    /// record that's still incomplete after a completion fetch can be
    /// served anyway, marked partial. Unknown field names are ignored.
    pub fn synthesize_defaults(mut self, missing: &[String]) -> Self {
        for field in missing {
            match &mut self {
                CacheValue::Component { name, code, demo, metadata, dependencies, .. } => match field.as_str() {
                    "name" => *name = Some(name.clone().unwrap_or_default()),
                    "code" => *code = Some(code.clone().unwrap_or_default()),
                    "demo" => *demo = Some(demo.clone().unwrap_or_default()),
                    "metadata" => *metadata = Some(metadata.clone().unwrap_or(serde_json::Value::Null)),
                    "dependencies" => *dependencies = Some(dependencies.clone().unwrap_or_default()),
                    _ => {}
                },
                CacheValue::ComponentMetadata { name, kind, description, tags, dependencies, .. } => match field.as_str() {
                    "name" => *name = Some(name.clone().unwrap_or_default()),
                    "kind" => *kind = Some(kind.clone().unwrap_or_default()),
                    "description" => *description = Some(description.clone().unwrap_or_default()),
                    "tags" => *tags = Some(tags.clone().unwrap_or_default()),
                    "dependencies" => *dependencies = Some(dependencies.clone().unwrap_or_default()),
                    _ => {}
                },
                CacheValue::Block { name, components, description, tags, code, .. } => match field.as_str() {
                    "name" => *name = Some(name.clone().unwrap_or_default()),
                    "components" => *components = Some(components.clone().unwrap_or_default()),
                    "description" => *description = Some(description.clone().unwrap_or_default()),
                    "tags" => *tags = Some(tags.clone().unwrap_or_default()),
                    "code" => *code = Some(code.clone().unwrap_or_default()),
                    _ => {}
                },
                CacheValue::ComponentDemo { .. } | CacheValue::Directory(_) | CacheValue::Opaque(_) => {}
            }
        }
        self
    }
}

/// Bookkeeping kept alongside a [`CacheValue`] by every tier.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EntryMeta {
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub accessed_at: SystemTime,
    pub access_count: u64,
    pub size_bytes: usize,
    /// Seconds until this entry expires; `0` means no expiry.
    pub ttl_seconds: u64,
    pub source_tier: String,
}

impl EntryMeta {
    pub fn new(size_bytes: usize, ttl_seconds: u64, source_tier: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            created_at: now,
            updated_at: now,
            accessed_at: now,
            access_count: 0,
            size_bytes,
            ttl_seconds,
            source_tier: source_tier.into(),
        }
    }

    /// Records a read, bumping `accessed_at` and `access_count`.
    pub fn record_access(&mut self) {
        self.accessed_at = SystemTime::now();
        self.access_count += 1;
    }

    /// True if `ttl_seconds` is nonzero and more than that many seconds have
    /// elapsed since `created_at`.
    pub fn is_expired(&self) -> bool {
        if self.ttl_seconds == 0 {
            return false;
        }
        self.created_at
            .elapsed()
            .map(|elapsed| elapsed > Duration::from_secs(self.ttl_seconds))
            .unwrap_or(false)
    }

    /// Age of this entry relative to `created_at`.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed().unwrap_or_default()
    }
}

/// A value as returned from a tier: payload plus metadata, enough to judge
/// staleness and partiality without a second lookup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredEntry {
    pub value: CacheValue,
    pub meta: EntryMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_expiry_when_ttl_is_zero() {
        let meta = EntryMeta::new(10, 0, "memory");
        assert!(!meta.is_expired());
    }

    #[test]
    fn opaque_size_is_byte_length() {
        let value = CacheValue::Opaque(vec![0u8; 42]);
        assert_eq!(value.size_bytes(), 42);
    }

    #[test]
    fn marking_a_component_partial_sets_flag_and_missing_fields() {
        let value = CacheValue::Component {
            name: Some("button".to_string()),
            code: Some("...".to_string()),
            demo: None,
            metadata: None,
            dependencies: None,
            partial: false,
            missing_fields: Vec::new(),
        };
        let marked = value.mark_partial(&["demo".to_string()]);
        assert!(marked.is_partial());
        assert_eq!(marked.missing_fields(), vec!["demo".to_string()]);
    }

    #[test]
    fn directory_and_opaque_are_never_partial() {
        let dir = CacheValue::Directory(serde_json::json!({}));
        assert!(!dir.mark_partial(&["x".to_string()]).is_partial());
        let blob = CacheValue::Opaque(vec![1, 2, 3]);
        assert!(!blob.mark_partial(&["x".to_string()]).is_partial());
    }

    #[test]
    fn merge_missing_from_fills_only_absent_fields() {
        let stale = CacheValue::Component {
            name: Some("button".to_string()),
            code: None,
            demo: None,
            metadata: None,
            dependencies: None,
            partial: true,
            missing_fields: vec!["code".to_string()],
        };
        let fresh = CacheValue::Component {
            name: Some("stale-name-should-not-win".to_string()),
            code: Some("fn render() {}".to_string()),
            demo: None,
            metadata: None,
            dependencies: None,
            partial: false,
            missing_fields: Vec::new(),
        };
        let merged = stale.merge_missing_from(&fresh);
        assert_eq!(merged.has_field("code"), true);
        if let CacheValue::Component { name, code, .. } = merged {
            assert_eq!(name, Some("button".to_string()));
            assert_eq!(code, Some("fn render() {}".to_string()));
        } else {
            panic!("expected Component");
        }
    }

    #[test]
    fn synthesize_defaults_fills_named_fields_only() {
        let value = CacheValue::Block {
            name: Some("hero".to_string()),
            components: None,
            description: None,
            tags: None,
            code: None,
            partial: false,
            missing_fields: Vec::new(),
        };
        let synthesized = value.synthesize_defaults(&["code".to_string()]);
        assert!(synthesized.has_field("code"));
        assert!(!synthesized.has_field("components"));
    }

    #[test]
    fn record_access_increments_count_and_bumps_accessed_at() {
        let mut meta = EntryMeta::new(1, 60, "memory");
        assert_eq!(meta.access_count, 0);
        meta.record_access();
        assert_eq!(meta.access_count, 1);
    }
}
