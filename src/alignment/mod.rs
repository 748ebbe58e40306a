//! Alignment resolution
//!
//! An [`Alignment`] names the anchor edge an overlay attaches to plus how it
//! lines up along the other axis. Resolution never fails: malformed input
//! degrades to `center`, and inconsistent axis values are sorted into their
//! proper slots so every semantic alignment has exactly one canonical form.

pub mod lexer;

use std::fmt;
use std::str::FromStr;

use crate::geometry::Axis;
use lexer::Token;

/// Which side of the anchor the overlay attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Edge {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 5] = [Edge::Center, Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// The axis the overlay is pushed away from the anchor along.
    /// `Top`/`Bottom` are Y-edges (vertical), `Left`/`Right` are X-edges.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Edge::Top | Edge::Bottom => Some(Axis::Vertical),
            Edge::Left | Edge::Right => Some(Axis::Horizontal),
            Edge::Center => None,
        }
    }

    /// The opposite edge on the same axis
    pub fn mirror(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
            Edge::Center => Edge::Center,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Center => "center",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }

    /// Lenient parse of a single word; unknown input yields `Center`
    pub fn parse_lenient(word: &str) -> Edge {
        match lexer::first_token(word) {
            Some(token) => edge_from_token(token).unwrap_or_default(),
            None => Edge::Center,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum XAlign {
    #[default]
    Center,
    Left,
    Right,
}

impl XAlign {
    pub const ALL: [XAlign; 3] = [XAlign::Center, XAlign::Left, XAlign::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            XAlign::Center => "center",
            XAlign::Left => "left",
            XAlign::Right => "right",
        }
    }
}

/// Vertical alignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YAlign {
    #[default]
    Center,
    Top,
    Bottom,
}

impl YAlign {
    pub const ALL: [YAlign; 3] = [YAlign::Center, YAlign::Top, YAlign::Bottom];

    pub fn as_str(self) -> &'static str {
        match self {
            YAlign::Center => "center",
            YAlign::Top => "top",
            YAlign::Bottom => "bottom",
        }
    }
}

/// A resolved, canonical alignment.
///
/// The axis the edge sits on is not free: a `bottom` edge always carries
/// `y = Top` (the overlay's top side meets the anchor), a `top` edge carries
/// `y = Bottom`, and symmetrically for X-edges. A `center` edge centers both
/// axes. [`Alignment::new`] enforces this, so two alignments compare equal
/// exactly when they place overlays identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    edge: Edge,
    x: XAlign,
    y: YAlign,
}

impl Alignment {
    /// Build a normalized alignment. The value on the edge's own axis is
    /// replaced by the one the edge implies.
    pub fn new(edge: Edge, x: XAlign, y: YAlign) -> Self {
        match edge {
            Edge::Center => Self::centered(),
            Edge::Top => Self {
                edge,
                x,
                y: YAlign::Bottom,
            },
            Edge::Bottom => Self { edge, x, y: YAlign::Top },
            Edge::Left => Self {
                edge,
                x: XAlign::Right,
                y,
            },
            Edge::Right => Self { edge, x: XAlign::Left, y },
        }
    }

    pub fn centered() -> Self {
        Self {
            edge: Edge::Center,
            x: XAlign::Center,
            y: YAlign::Center,
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn x(&self) -> XAlign {
        self.x
    }

    pub fn y(&self) -> YAlign {
        self.y
    }

    /// Same cross-axis strategy attached to a different edge
    pub fn with_edge(&self, edge: Edge) -> Self {
        Self::new(edge, self.x, self.y)
    }

    /// Resolve three loosely-typed candidates into a canonical alignment.
    ///
    /// The first candidate is the edge; unknown or empty edges yield a fully
    /// centered alignment. The remaining two candidates are sorted by kind,
    /// so `("top", "bottom", "left")` and `("top", "left", "")` both resolve
    /// to `top,left`. Only the first value of each kind is honored.
    pub fn resolve(edge_candidate: &str, x_candidate: &str, y_candidate: &str) -> Self {
        Self::from_tokens([
            lexer::first_token(edge_candidate),
            lexer::first_token(x_candidate),
            lexer::first_token(y_candidate),
        ])
    }

    /// Resolve a single comma/whitespace separated string such as
    /// `"bottom, left"`. Tokens beyond the third are ignored.
    pub fn parse(source: &str) -> Self {
        let mut tokens = lexer::lex(source).into_iter();
        Self::from_tokens([tokens.next(), tokens.next(), tokens.next()])
    }

    fn from_tokens(tokens: [Option<Token>; 3]) -> Self {
        let [edge_token, rest @ ..] = tokens;
        let edge = edge_token.and_then(edge_from_token).unwrap_or_default();

        let rest = rest.iter().flatten().copied();
        match edge.axis() {
            None => Self::centered(),
            Some(Axis::Vertical) => {
                let x = rest
                    .filter_map(|t| match t {
                        Token::Left => Some(XAlign::Left),
                        Token::Right => Some(XAlign::Right),
                        _ => None,
                    })
                    .next()
                    .unwrap_or_default();
                Self::new(edge, x, YAlign::Center)
            }
            Some(Axis::Horizontal) => {
                let y = rest
                    .filter_map(|t| match t {
                        Token::Top => Some(YAlign::Top),
                        Token::Bottom => Some(YAlign::Bottom),
                        _ => None,
                    })
                    .next()
                    .unwrap_or_default();
                Self::new(edge, XAlign::Center, y)
            }
        }
    }

    /// Canonical external form: the edge, then the cross-axis value when it
    /// is not `center`. Examples: `center`, `bottom`, `bottom,left`, `right,top`.
    pub fn serialize(&self) -> String {
        let cross = match self.edge.axis() {
            None => None,
            Some(Axis::Vertical) => Some(self.x.as_str()),
            Some(Axis::Horizontal) => Some(self.y.as_str()),
        };
        match cross {
            Some(value) if value != "center" => format!("{},{}", self.edge, value),
            _ => self.edge.to_string(),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for Alignment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

fn edge_from_token(token: Token) -> Option<Edge> {
    match token {
        Token::Top => Some(Edge::Top),
        Token::Bottom => Some(Edge::Bottom),
        Token::Left => Some(Edge::Left),
        Token::Right => Some(Edge::Right),
        Token::Center => Some(Edge::Center),
        Token::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_simple() {
        let a = Alignment::resolve("bottom", "left", "");
        assert_eq!(a.edge(), Edge::Bottom);
        assert_eq!(a.x(), XAlign::Left);
        assert_eq!(a.serialize(), "bottom,left");
    }

    #[test]
    fn test_resolve_unknown_edge_degrades_to_center() {
        assert_eq!(Alignment::resolve("sideways", "left", "top"), Alignment::centered());
        assert_eq!(Alignment::resolve("", "", ""), Alignment::centered());
    }

    #[test]
    fn test_resolve_center_edge_centers_both_axes() {
        let a = Alignment::resolve("center", "left", "top");
        assert_eq!(a.x(), XAlign::Center);
        assert_eq!(a.y(), YAlign::Center);
        assert_eq!(a.serialize(), "center");
    }

    #[test]
    fn test_resolve_swaps_misplaced_axis_values() {
        // Y value in the x slot and X value in the y slot
        let swapped = Alignment::resolve("top", "bottom", "left");
        assert_eq!(swapped, Alignment::resolve("top", "left", ""));
        assert_eq!(swapped.serialize(), "top,left");

        let x_edge = Alignment::resolve("right", "top", "");
        assert_eq!(x_edge.y(), YAlign::Top);
        assert_eq!(x_edge.serialize(), "right,top");
    }

    #[test]
    fn test_informational_axis_follows_edge() {
        assert_eq!(Alignment::resolve("bottom", "", "bottom").y(), YAlign::Top);
        assert_eq!(Alignment::resolve("top", "", "").y(), YAlign::Bottom);
        assert_eq!(Alignment::resolve("left", "", "").x(), XAlign::Right);
        assert_eq!(Alignment::resolve("right", "", "").x(), XAlign::Left);
    }

    #[test]
    fn test_parse_string_forms() {
        assert_eq!(Alignment::parse("bottom, left"), Alignment::resolve("bottom", "left", ""));
        assert_eq!(Alignment::parse("LEFT bottom"), Alignment::resolve("left", "", "bottom"));
        assert_eq!(Alignment::parse("nonsense"), Alignment::centered());
        let parsed: Alignment = "right,bottom".parse().unwrap();
        assert_eq!(parsed.to_string(), "right,bottom");
    }

    #[test]
    fn test_with_edge_renormalizes() {
        let a = Alignment::resolve("bottom", "right", "");
        let flipped = a.with_edge(Edge::Top);
        assert_eq!(flipped.x(), XAlign::Right);
        assert_eq!(flipped.y(), YAlign::Bottom);
    }

    #[test]
    fn test_edge_mirror_and_axis() {
        assert_eq!(Edge::Top.mirror(), Edge::Bottom);
        assert_eq!(Edge::Left.mirror(), Edge::Right);
        assert_eq!(Edge::Center.mirror(), Edge::Center);
        assert_eq!(Edge::Bottom.axis(), Some(Axis::Vertical));
        assert_eq!(Edge::Right.axis(), Some(Axis::Horizontal));
        assert_eq!(Edge::parse_lenient("RIGHT"), Edge::Right);
        assert_eq!(Edge::parse_lenient("up"), Edge::Center);
    }

    fn any_word() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("top".to_string()),
            Just("bottom".to_string()),
            Just("left".to_string()),
            Just("right".to_string()),
            Just("center".to_string()),
            "[a-z]{1,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_serialize_round_trips(e in any_word(), x in any_word(), y in any_word()) {
            let resolved = Alignment::resolve(&e, &x, &y);
            prop_assert_eq!(Alignment::parse(&resolved.serialize()), resolved);
        }
    }

    #[test]
    fn test_every_normalized_alignment_round_trips() {
        for edge in Edge::ALL {
            for x in XAlign::ALL {
                for y in YAlign::ALL {
                    let a = Alignment::new(edge, x, y);
                    assert_eq!(Alignment::parse(&a.serialize()), a);
                }
            }
        }
    }
}
