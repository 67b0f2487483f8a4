//! Inline text styling.

use serde::{Deserialize, Serialize};

/// Style attributes of a text run.
///
/// All nine attributes are independent and optional; an absent attribute
/// inherits no value. For the boolean attributes, absent and `false` mean
/// the same thing — [`TextStyle::same_as`] is the equality relation
/// normalization uses, and it treats `None` and `Some(false)` as equal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

fn flag(v: Option<bool>) -> bool {
    v.unwrap_or(false)
}

impl TextStyle {
    /// A style with no attributes set.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Check whether no attribute is effectively set.
    pub fn is_plain(&self) -> bool {
        !flag(self.bold)
            && !flag(self.italic)
            && !flag(self.underline)
            && !flag(self.strikethrough)
            && !flag(self.code)
            && self.font_size.is_none()
            && self.font_family.is_none()
            && self.color.is_none()
            && self.background_color.is_none()
    }

    /// Style equality over all nine attributes.
    ///
    /// `None` and `Some(false)` compare equal for the boolean attributes;
    /// runs differing only in how "off" is spelled must merge.
    pub fn same_as(&self, other: &TextStyle) -> bool {
        flag(self.bold) == flag(other.bold)
            && flag(self.italic) == flag(other.italic)
            && flag(self.underline) == flag(other.underline)
            && flag(self.strikethrough) == flag(other.strikethrough)
            && flag(self.code) == flag(other.code)
            && self.font_size == other.font_size
            && self.font_family == other.font_family
            && self.color == other.color
            && self.background_color == other.background_color
    }

    /// Set every attribute `named` carries onto `self`.
    ///
    /// This is `apply_formatting`: attributes absent in `named` are left
    /// untouched.
    pub fn merge(&mut self, named: &TextStyle) {
        if named.bold.is_some() {
            self.bold = named.bold;
        }
        if named.italic.is_some() {
            self.italic = named.italic;
        }
        if named.underline.is_some() {
            self.underline = named.underline;
        }
        if named.strikethrough.is_some() {
            self.strikethrough = named.strikethrough;
        }
        if named.code.is_some() {
            self.code = named.code;
        }
        if named.font_size.is_some() {
            self.font_size = named.font_size;
        }
        if named.font_family.is_some() {
            self.font_family = named.font_family.clone();
        }
        if named.color.is_some() {
            self.color = named.color.clone();
        }
        if named.background_color.is_some() {
            self.background_color = named.background_color.clone();
        }
    }

    /// Clear every attribute `named` carries from `self`.
    ///
    /// This is `remove_formatting`: the values inside `named` are
    /// irrelevant, only which attributes it names matters.
    pub fn clear_named(&mut self, named: &TextStyle) {
        if named.bold.is_some() {
            self.bold = None;
        }
        if named.italic.is_some() {
            self.italic = None;
        }
        if named.underline.is_some() {
            self.underline = None;
        }
        if named.strikethrough.is_some() {
            self.strikethrough = None;
        }
        if named.code.is_some() {
            self.code = None;
        }
        if named.font_size.is_some() {
            self.font_size = None;
        }
        if named.font_family.is_some() {
            self.font_family = None;
        }
        if named.color.is_some() {
            self.color = None;
        }
        if named.background_color.is_some() {
            self.background_color = None;
        }
    }

    /// Check whether `self` and `other` both name at least one common
    /// attribute (used by the transform engine's conflict policy).
    pub fn names_common_attr(&self, other: &TextStyle) -> bool {
        (self.bold.is_some() && other.bold.is_some())
            || (self.italic.is_some() && other.italic.is_some())
            || (self.underline.is_some() && other.underline.is_some())
            || (self.strikethrough.is_some() && other.strikethrough.is_some())
            || (self.code.is_some() && other.code.is_some())
            || (self.font_size.is_some() && other.font_size.is_some())
            || (self.font_family.is_some() && other.font_family.is_some())
            || (self.color.is_some() && other.color.is_some())
            || (self.background_color.is_some() && other.background_color.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> TextStyle {
        TextStyle {
            bold: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_as_treats_absent_as_false() {
        let explicit_off = TextStyle {
            bold: Some(false),
            italic: Some(false),
            ..Default::default()
        };
        assert!(explicit_off.same_as(&TextStyle::default()));
        assert!(!bold().same_as(&TextStyle::default()));
    }

    #[test]
    fn test_same_as_compares_string_attrs() {
        let red = TextStyle {
            color: Some("#ff0000".into()),
            ..Default::default()
        };
        let blue = TextStyle {
            color: Some("#0000ff".into()),
            ..Default::default()
        };
        assert!(!red.same_as(&blue));
        assert!(red.same_as(&red.clone()));
    }

    #[test]
    fn test_merge_sets_only_named() {
        let mut style = TextStyle {
            italic: Some(true),
            ..Default::default()
        };
        style.merge(&bold());
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.italic, Some(true));
    }

    #[test]
    fn test_merge_can_unset_via_false() {
        let mut style = bold();
        style.merge(&TextStyle {
            bold: Some(false),
            ..Default::default()
        });
        assert_eq!(style.bold, Some(false));
        assert!(style.is_plain());
    }

    #[test]
    fn test_clear_named_ignores_values() {
        let mut style = bold();
        style.font_size = Some(18.0);
        // The named style's values don't matter, only its keys.
        style.clear_named(&TextStyle {
            bold: Some(false),
            font_size: Some(1.0),
            ..Default::default()
        });
        assert!(style.bold.is_none());
        assert!(style.font_size.is_none());
    }

    #[test]
    fn test_names_common_attr() {
        let size = TextStyle {
            font_size: Some(12.0),
            ..Default::default()
        };
        assert!(!bold().names_common_attr(&size));
        assert!(bold().names_common_attr(&bold()));
    }

    #[test]
    fn test_serde_camel_case_and_omission() {
        let style = TextStyle {
            background_color: Some("#ffee00".into()),
            font_size: Some(14.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&style).unwrap();
        assert!(json.contains("backgroundColor"));
        assert!(json.contains("fontSize"));
        assert!(!json.contains("bold"));
        let parsed: TextStyle = serde_json::from_str(&json).unwrap();
        assert!(parsed.same_as(&style));
    }
}
