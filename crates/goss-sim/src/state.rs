//! Versioned state carried by gossip messages
//!
//! A [`State`] pairs a logical clock with a display colour. The colour is only
//! ever replaced wholesale, and only when a strictly newer version arrives.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Colour every node starts with before it hears any gossip
pub const DEFAULT_COLOR: Color = Color::rgb(255, 127, 0);

/// Colour held by the seed node when a topology is built
pub const SEED_COLOR: Color = Color::rgb(0, 10, 255);

/// Payload disseminated through the network.
///
/// Renders as a CSS colour string through [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8 },
    /// Fully saturated hue at 50% lightness
    Hue { degrees: u16 },
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub const fn hue(degrees: u16) -> Self {
        Self::Hue {
            degrees: degrees % 360,
        }
    }

    /// Draw a hue that is guaranteed to differ from `current`.
    ///
    /// When `current` is itself a hue the draw is uniform over the other 359
    /// hues; otherwise any hue is already distinct.
    pub fn random_hue_except<R: Rng + ?Sized>(rng: &mut R, current: &Color) -> Self {
        match current {
            Color::Hue { degrees } => {
                let offset: u16 = rng.gen_range(1..360);
                Self::hue((degrees + offset) % 360)
            }
            Color::Rgb { .. } => Self::hue(rng.gen_range(0..360)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb { r, g, b } => write!(f, "rgb({r}, {g}, {b})"),
            Color::Hue { degrees } => write!(f, "hsl({degrees},100%,50%)"),
        }
    }
}

/// A versioned piece of information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub version: u64,
    pub payload: Color,
}

impl State {
    pub const fn new(version: u64, payload: Color) -> Self {
        Self { version, payload }
    }

    /// State of a node that has not heard anything yet
    pub const fn initial() -> Self {
        Self::new(0, DEFAULT_COLOR)
    }

    /// State of the seed node at build time
    pub const fn seed() -> Self {
        Self::new(1, SEED_COLOR)
    }

    /// Whether this state would replace `other` under the merge rule.
    pub fn supersedes(&self, other: &State) -> bool {
        self.version > other.version
    }
}

impl Default for State {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn colors_render_as_css() {
        assert_eq!(DEFAULT_COLOR.to_string(), "rgb(255, 127, 0)");
        assert_eq!(Color::hue(200).to_string(), "hsl(200,100%,50%)");
    }

    #[test]
    fn hue_wraps_around() {
        assert_eq!(Color::hue(360), Color::hue(0));
        assert_eq!(Color::hue(725), Color::hue(5));
    }

    #[test]
    fn random_hue_never_repeats_current() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut current = Color::hue(42);
        for _ in 0..1_000 {
            let next = Color::random_hue_except(&mut rng, &current);
            assert_ne!(next, current);
            current = next;
        }
    }

    #[test]
    fn only_strictly_newer_supersedes() {
        let older = State::new(3, DEFAULT_COLOR);
        let same = State::new(3, SEED_COLOR);
        let newer = State::new(4, DEFAULT_COLOR);

        assert!(newer.supersedes(&older));
        assert!(!same.supersedes(&older));
        assert!(!older.supersedes(&newer));
    }

    #[test]
    fn serializes_with_tagged_payload() {
        let json = serde_json::to_string(&State::seed()).unwrap();
        assert!(json.contains("\"kind\":\"rgb\""));
        assert!(json.contains("\"version\":1"));
    }
}
