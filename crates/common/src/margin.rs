use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CommonError, Rect};

/// A single CSS length as accepted in a root margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CssLength {
    Px(f32),
    Percent(f32),
}

impl CssLength {
    /// Resolve to pixels; percentages are taken of `basis`.
    pub fn resolve(&self, basis: f32) -> f32 {
        match *self {
            Self::Px(v) => v,
            Self::Percent(p) => basis * p / 100.0,
        }
    }

    fn parse(token: &str) -> Result<Self, String> {
        let (number, unit) = if let Some(n) = token.strip_suffix("px") {
            (n, "px")
        } else if let Some(n) = token.strip_suffix('%') {
            (n, "%")
        } else if token == "0" {
            return Ok(Self::Px(0.0));
        } else {
            return Err(format!("{token:?} must be in px or %"));
        };

        let value: f32 = number
            .parse()
            .map_err(|_| format!("{token:?} is not a number"))?;
        if !value.is_finite() {
            return Err(format!("{token:?} is not finite"));
        }

        Ok(match unit {
            "px" => Self::Px(value),
            _ => Self::Percent(value),
        })
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

impl FromStr for CssLength {
    type Err = CommonError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input.trim()).map_err(|reason| CommonError::InvalidLength {
            input: input.to_string(),
            reason,
        })
    }
}

impl TryFrom<String> for CssLength {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CssLength> for String {
    fn from(len: CssLength) -> String {
        len.to_string()
    }
}

/// Resolved pixel insets, one per side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Margin that grows (or shrinks) the observation root before intersecting.
///
/// Parsed from CSS shorthand: one to four lengths in top, right, bottom, left
/// order, where missing sides copy their opposite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: CssLength,
    pub right: CssLength,
    pub bottom: CssLength,
    pub left: CssLength,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin::uniform(CssLength::Px(0.0));

    pub const fn uniform(len: CssLength) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    pub const fn px(v: f32) -> Self {
        Self::uniform(CssLength::Px(v))
    }

    /// Resolve against the root: vertical sides use its height, horizontal
    /// sides its width.
    pub fn resolve(&self, root: &Rect) -> Insets {
        Insets {
            top: self.top.resolve(root.height),
            right: self.right.resolve(root.width),
            bottom: self.bottom.resolve(root.height),
            left: self.left.resolve(root.width),
        }
    }

    /// The root rectangle grown by this margin.
    pub fn expand(&self, root: &Rect) -> Rect {
        let i = self.resolve(root);
        root.expand(i.top, i.right, i.bottom, i.left)
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = CommonError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CommonError::InvalidMargin {
            input: input.to_string(),
            reason,
        };

        let lengths = input
            .split_whitespace()
            .map(CssLength::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let (top, right, bottom, left) = match lengths.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            [] => return Err(invalid("empty".into())),
            more => return Err(invalid(format!("expected 1-4 lengths, got {}", more.len()))),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(m: RootMargin) -> String {
        m.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_applies_to_all_sides() {
        let m: RootMargin = "100px".parse().unwrap();
        assert_eq!(m, RootMargin::px(100.0));
    }

    #[test]
    fn shorthand_expansion() {
        let m: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(m.top, CssLength::Px(10.0));
        assert_eq!(m.right, CssLength::Percent(5.0));
        assert_eq!(m.bottom, CssLength::Px(10.0));
        assert_eq!(m.left, CssLength::Percent(5.0));

        let m: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(m.left, CssLength::Px(2.0));
        assert_eq!(m.bottom, CssLength::Px(3.0));

        let m: RootMargin = "1px 2px 3px 4px".parse().unwrap();
        assert_eq!(m.left, CssLength::Px(4.0));
    }

    #[test]
    fn bare_zero_and_negative() {
        let m: RootMargin = "0 -20px".parse().unwrap();
        assert_eq!(m.top, CssLength::Px(0.0));
        assert_eq!(m.right, CssLength::Px(-20.0));
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("abcpx".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());

        let err = "12".parse::<RootMargin>().unwrap_err();
        assert!(matches!(err, CommonError::InvalidMargin { .. }));
    }

    #[test]
    fn single_length_parse() {
        assert_eq!("100px".parse::<CssLength>().unwrap(), CssLength::Px(100.0));
        assert_eq!(" 50% ".parse::<CssLength>().unwrap(), CssLength::Percent(50.0));
        assert!(matches!(
            "1px 2px".parse::<CssLength>(),
            Err(CommonError::InvalidLength { .. })
        ));
    }

    #[test]
    fn percent_resolves_against_root() {
        let root = Rect::new(0.0, 0.0, 200.0, 400.0);
        let m: RootMargin = "10%".parse().unwrap();
        let i = m.resolve(&root);
        assert_eq!(i.top, 40.0);
        assert_eq!(i.left, 20.0);
    }

    #[test]
    fn expand_root() {
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        let grown = RootMargin::px(200.0).expand(&root);
        assert_eq!(grown, Rect::new(-200.0, -200.0, 1200.0, 1000.0));
    }

    #[test]
    fn display_round_trips() {
        let m: RootMargin = "10px 5%".parse().unwrap();
        let again: RootMargin = m.to_string().parse().unwrap();
        assert_eq!(m, again);
    }
}
