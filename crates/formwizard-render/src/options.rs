//! Render options: element names and attribute maps with layered merging.

use std::collections::HashMap;

/// Attributes applied to a rendered element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    /// HTML attributes.
    pub attrs: HashMap<String, String>,
}

impl AttributeMap {
    /// Creates new empty attributes.
    pub fn new() -> Self {
        Self {
            attrs: HashMap::new(),
        }
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Returns whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Merges `self` over `base`, `self` winning per key.
    #[must_use]
    pub fn merged_over(&self, base: &Self) -> Self {
        let mut merged = base.clone();
        for (key, value) in &self.attrs {
            merged.attrs.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Renders attributes as an HTML attribute string.
    ///
    /// Keys are emitted in sorted order so output is deterministic.
    pub fn to_html(&self) -> String {
        let mut keys: Vec<&String> = self.attrs.keys().collect();
        keys.sort();
        keys.iter()
            .map(|key| format!(r#"{key}="{}""#, self.attrs[key.as_str()]))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Options controlling how one renderer emits its element.
///
/// Effective options are a recursive merge: caller-supplied options over
/// factory-registered per-kind defaults over the renderer's innate defaults.
/// The more specific layer wins per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Element name override; `None` falls through to the next layer.
    pub element: Option<String>,
    /// Attribute map merged across layers.
    pub attributes: AttributeMap,
}

impl RenderOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the element name.
    #[must_use]
    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Merges `self` over `base`, `self` winning per key.
    #[must_use]
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            element: self.element.clone().or_else(|| base.element.clone()),
            attributes: self.attributes.merged_over(&base.attributes),
        }
    }

    /// Returns the effective element name.
    pub fn element_name(&self) -> &str {
        self.element.as_deref().unwrap_or("div")
    }
}
