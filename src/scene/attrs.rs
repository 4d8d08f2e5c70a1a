use crate::foundation::core::Rgba8;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A settable drawable attribute, tagged with how it tweens and what its neutral state is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    /// Coordinate (`cx`, `cy`, ...). Linear; neutral keeps the value.
    Position(f64),
    /// Size (`r`, `width`, `height`). Linear; neutral is 0.
    Extent(f64),
    /// Opacity in `[0, 1]`. Linear; neutral is 0.
    Opacity(f64),
    /// Rotation in radians. Shortest-arc; neutral keeps the value.
    Angle(f64),
    /// Paint. Per-channel linear in straight RGBA8; neutral keeps rgb with alpha 0.
    Color(Rgba8),
}

impl AttrValue {
    /// Enter/exit value of the same kind.
    pub fn neutral(self) -> Self {
        match self {
            Self::Position(v) => Self::Position(v),
            Self::Extent(_) => Self::Extent(0.0),
            Self::Opacity(_) => Self::Opacity(0.0),
            Self::Angle(v) => Self::Angle(v),
            Self::Color(c) => Self::Color(c.with_alpha(0)),
        }
    }

    /// Numeric payload; `None` for colors.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Position(v) | Self::Extent(v) | Self::Opacity(v) | Self::Angle(v) => Some(v),
            Self::Color(_) => None,
        }
    }
}

/// Named attributes of one visual element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(pub BTreeMap<String, AttrValue>);

impl AttributeSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set`].
    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Insert or replace `name`.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        self.0.insert(name.into(), value);
    }

    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        self.0.get(name).copied()
    }

    /// Attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// True when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The shared enter/exit state: same attribute names, each at its kind's neutral value.
    pub fn neutral(&self) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v.neutral())).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/attrs.rs"]
mod tests;
