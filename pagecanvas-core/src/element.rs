//! Canvas elements - the building blocks of a page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Style attribute name to CSS value.
pub type Styles = BTreeMap<String, String>;

/// Icon used when an icon element is created without a name.
pub const FALLBACK_ICON: &str = "star";

/// Placeholder text for new text elements.
pub const DEFAULT_TEXT: &str = "Double-click to edit";

/// Unique identifier for an element within a document.
///
/// Ids are assigned from a monotonically increasing counter and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Create an id from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of visual an element draws. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Editable text block.
    Text,
    /// Remote image referenced by URL.
    Image,
    /// Filled rectangle.
    Rectangle,
    /// Filled circle (a rectangle with 50% corner radius).
    Circle,
    /// Thin horizontal rule.
    Line,
    /// Named icon from the icon set.
    Icon,
}

impl ElementType {
    /// Whether elements of this type carry a `content` payload.
    #[must_use]
    pub const fn has_content(self) -> bool {
        matches!(self, Self::Text | Self::Image | Self::Icon)
    }

    /// Default size for a freshly created element.
    #[must_use]
    pub const fn default_size(self) -> (f64, f64) {
        match self {
            Self::Text => (200.0, 40.0),
            Self::Image => (300.0, 200.0),
            Self::Rectangle => (200.0, 100.0),
            Self::Circle => (150.0, 150.0),
            Self::Line => (200.0, 2.0),
            Self::Icon => (64.0, 64.0),
        }
    }

    fn default_styles(self) -> Styles {
        let pairs: &[(&str, &str)] = match self {
            Self::Text => &[
                ("fontFamily", "Arial"),
                ("fontSize", "16px"),
                ("fontWeight", "normal"),
                ("color", "#000000"),
                ("textAlign", "left"),
            ],
            Self::Image => &[("objectFit", "cover"), ("borderRadius", "0px")],
            Self::Rectangle => &[("backgroundColor", "#007bff"), ("borderRadius", "0px")],
            Self::Circle => &[("backgroundColor", "#28a745"), ("borderRadius", "50%")],
            Self::Line => &[("backgroundColor", "#000000")],
            Self::Icon => &[("color", "#007bff")],
        };
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

impl std::str::FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "rectangle" => Ok(Self::Rectangle),
            "circle" => Ok(Self::Circle),
            "line" => Ok(Self::Line),
            "icon" => Ok(Self::Icon),
            other => Err(format!("unknown element type: {other}")),
        }
    }
}

/// Type-specific options for [`crate::ElementStore::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    /// Image URL (images only). Missing means a placeholder is drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Icon identifier (icons only). Missing means [`FALLBACK_ICON`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

/// A placed, styled visual object on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// What the element draws.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Left edge in page pixels.
    pub x: f64,
    /// Top edge in page pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Visual rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; higher draws on top.
    #[serde(default)]
    pub z_index: i64,
    /// Locked elements reject move, resize, delete and content edits.
    #[serde(default)]
    pub locked: bool,
    /// Text, image URL or icon name. Shapes have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Type-dependent style attributes.
    #[serde(default)]
    pub styles: Styles,
}

impl Element {
    /// Build an element with the defaults for its type.
    #[must_use]
    pub fn with_defaults(
        id: ElementId,
        element_type: ElementType,
        position: Point,
        z_index: i64,
        options: &CreateOptions,
    ) -> Self {
        let (width, height) = element_type.default_size();
        let content = match element_type {
            ElementType::Text => Some(DEFAULT_TEXT.to_string()),
            ElementType::Image => Some(options.url.clone().unwrap_or_default()),
            ElementType::Icon => Some(
                options
                    .icon_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_ICON.to_string()),
            ),
            ElementType::Rectangle | ElementType::Circle | ElementType::Line => None,
        };
        Self {
            id,
            element_type,
            x: position.x,
            y: position.y,
            width,
            height,
            rotation: 0.0,
            z_index,
            locked: false,
            content,
            styles: element_type.default_styles(),
        }
    }

    /// Bounding box, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether the element shows a placeholder instead of real content.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.element_type == ElementType::Image
            && self.content.as_deref().unwrap_or_default().is_empty()
    }
}

/// Partial update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    /// New left edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New top edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New stacking order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// New lock flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// New content payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Style keys to set; existing keys not named here are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
}

impl ElementPatch {
    /// Patch that moves the element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets the full bounding box.
    #[must_use]
    pub fn bounds(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }

    /// Patch that replaces the content payload.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Patch that sets one style attribute.
    #[must_use]
    pub fn style(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut styles = Styles::new();
        styles.insert(key.into(), value.into());
        Self {
            styles: Some(styles),
            ..Self::default()
        }
    }

    /// Whether the patch touches anything a lock protects.
    #[must_use]
    pub fn touches_locked_fields(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.content.is_some()
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply_to(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(w) = self.width {
            element.width = w;
        }
        if let Some(h) = self.height {
            element.height = h;
        }
        if let Some(r) = self.rotation {
            element.rotation = r;
        }
        if let Some(z) = self.z_index {
            element.z_index = z;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        if let Some(ref content) = self.content {
            if element.element_type.has_content() {
                element.content = Some(content.clone());
            }
        }
        if let Some(ref styles) = self.styles {
            for (k, v) in styles {
                element.styles.insert(k.clone(), v.clone());
            }
        }
    }
}
