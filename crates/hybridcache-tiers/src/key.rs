//! `KeyCodec`: encodes a typed resource request into its canonical string
//! fingerprint and parses it back. Pure, stateless.

use crate::error::TierError;

const MAX_KEY_BYTES: usize = 255;
const SEPARATOR: char = ':';

/// The kind of resource a fingerprint addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Component,
    ComponentDemo,
    ComponentMetadata,
    Block,
    List,
    Directory,
}

impl ResourceKind {
    fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Component => "component",
            ResourceKind::ComponentDemo => "component-demo",
            ResourceKind::ComponentMetadata => "component-metadata",
            ResourceKind::Block => "block",
            ResourceKind::List => "list",
            ResourceKind::Directory => "directory",
        }
    }

    fn parse(s: &str) -> Result<Self, TierError> {
        match s {
            "component" => Ok(ResourceKind::Component),
            "component-demo" => Ok(ResourceKind::ComponentDemo),
            "component-metadata" => Ok(ResourceKind::ComponentMetadata),
            "block" => Ok(ResourceKind::Block),
            "list" => Ok(ResourceKind::List),
            "directory" => Ok(ResourceKind::Directory),
            other => Err(TierError::MalformedKey {
                reason: format!("unrecognized resource kind '{other}'"),
            }),
        }
    }
}

/// A parsed resource fingerprint: `<kind>:<framework>:<name>[:<variant>...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub framework: String,
    pub name: String,
    pub variant: Vec<String>,
}

impl ResourceKey {
    pub fn new(kind: ResourceKind, framework: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            framework: framework.into(),
            name: name.into(),
            variant: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: impl IntoIterator<Item = String>) -> Self {
        self.variant = variant.into_iter().collect();
        self
    }
}

fn validate_segment(segment: &str) -> Result<(), TierError> {
    if segment.contains(SEPARATOR) {
        return Err(TierError::MalformedKey {
            reason: format!("segment '{segment}' contains the ':' separator"),
        });
    }
    if segment.chars().any(|c| c.is_control()) {
        return Err(TierError::MalformedKey {
            reason: format!("segment '{segment}' contains a control character"),
        });
    }
    Ok(())
}

/// Stateless encode/decode between [`ResourceKey`] and its canonical string
/// fingerprint.
pub struct KeyCodec;

impl KeyCodec {
    /// Encodes `key` to its canonical fingerprint, rejecting any segment
    /// containing `:`, a control character, or a fingerprint exceeding 255
    /// bytes total.
    pub fn encode(key: &ResourceKey) -> Result<String, TierError> {
        validate_segment(&key.framework)?;
        validate_segment(&key.name)?;
        for v in &key.variant {
            validate_segment(v)?;
        }

        let mut fingerprint = format!("{}:{}:{}", key.kind.as_str(), key.framework, key.name);
        for v in &key.variant {
            fingerprint.push(SEPARATOR);
            fingerprint.push_str(v);
        }

        if fingerprint.len() > MAX_KEY_BYTES {
            return Err(TierError::MalformedKey {
                reason: format!("fingerprint exceeds {MAX_KEY_BYTES} bytes ({} bytes)", fingerprint.len()),
            });
        }
        if fingerprint.is_empty() {
            return Err(TierError::MalformedKey {
                reason: "fingerprint is empty".to_string(),
            });
        }

        Ok(fingerprint)
    }

    /// Parses a fingerprint back into a structured [`ResourceKey`].
    pub fn parse(fingerprint: &str) -> Result<ResourceKey, TierError> {
        if fingerprint.is_empty() {
            return Err(TierError::MalformedKey {
                reason: "fingerprint is empty".to_string(),
            });
        }
        if fingerprint.len() > MAX_KEY_BYTES {
            return Err(TierError::MalformedKey {
                reason: format!("fingerprint exceeds {MAX_KEY_BYTES} bytes ({} bytes)", fingerprint.len()),
            });
        }
        if fingerprint.chars().any(|c| c.is_control()) {
            return Err(TierError::MalformedKey {
                reason: "fingerprint contains a control character".to_string(),
            });
        }

        let mut parts = fingerprint.split(SEPARATOR);
        let kind = ResourceKind::parse(parts.next().ok_or_else(|| TierError::MalformedKey {
            reason: "missing kind segment".to_string(),
        })?)?;
        let framework = parts
            .next()
            .ok_or_else(|| TierError::MalformedKey {
                reason: "missing framework segment".to_string(),
            })?
            .to_string();
        let name = parts
            .next()
            .ok_or_else(|| TierError::MalformedKey {
                reason: "missing name segment".to_string(),
            })?
            .to_string();
        let variant: Vec<String> = parts.map(str::to_string).collect();

        Ok(ResourceKey {
            kind,
            framework,
            name,
            variant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_well_formed_key() {
        let key = ResourceKey::new(ResourceKind::Component, "react", "button");
        let encoded = KeyCodec::encode(&key).unwrap();
        assert_eq!(encoded, "component:react:button");
        assert_eq!(KeyCodec::parse(&encoded).unwrap(), key);
    }

    #[test]
    fn round_trips_a_key_with_variants() {
        let key = ResourceKey::new(ResourceKind::Block, "vue", "hero").with_variant(["dark".to_string(), "compact".to_string()]);
        let encoded = KeyCodec::encode(&key).unwrap();
        assert_eq!(encoded, "block:vue:hero:dark:compact");
        assert_eq!(KeyCodec::parse(&encoded).unwrap(), key);
    }

    #[test]
    fn rejects_a_segment_containing_the_separator() {
        let key = ResourceKey::new(ResourceKind::Component, "re:act", "button");
        assert!(matches!(KeyCodec::encode(&key), Err(TierError::MalformedKey { .. })));
    }

    #[test]
    fn rejects_a_segment_with_control_characters() {
        let key = ResourceKey::new(ResourceKind::Component, "react", "but\nton");
        assert!(matches!(KeyCodec::encode(&key), Err(TierError::MalformedKey { .. })));
    }

    #[test]
    fn accepts_exactly_255_bytes_and_rejects_256() {
        let padding = "a".repeat(255 - "component::".len());
        let exact = format!("component::{padding}");
        assert_eq!(exact.len(), 255);
        assert!(KeyCodec::parse(&exact).is_ok());

        let too_long = format!("{exact}a");
        assert!(matches!(KeyCodec::parse(&too_long), Err(TierError::MalformedKey { .. })));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert!(matches!(KeyCodec::parse("widget:react:button"), Err(TierError::MalformedKey { .. })));
    }
}
