use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ahash::AHashMap;
use serde::{Serialize, Serializer};

/// Number of distinct tile kinds; also the length of every 34-slot count array.
pub const TILE_KINDS: usize = 34;

/// Index of the first honor tile (East).
pub const FIRST_HONOR: u8 = 27;

const TILE_STRINGS: [&str; TILE_KINDS] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", // m
    "1p", "2p", "3p", "4p", "5p", "6p", "7p", "8p", "9p", // p
    "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", // s
    "E", "S", "W", "N", "P", "F", "C", // z
];

const HONOR_DIGIT_STRINGS: [&str; 7] = ["1z", "2z", "3z", "4z", "5z", "6z", "7z"];

static TILE_STRINGS_MAP: LazyLock<AHashMap<&'static str, Tile>> = LazyLock::new(|| {
    TILE_STRINGS
        .iter()
        .enumerate()
        .map(|(id, &s)| (s, Tile(id as u8)))
        .chain(
            HONOR_DIGIT_STRINGS
                .iter()
                .enumerate()
                .map(|(i, &s)| (s, Tile(FIRST_HONOR + i as u8))),
        )
        .collect()
});

/// One of the 34 tile kinds. Red fives are not distinguished here; they are
/// tracked as counts alongside the hand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile(u8);

#[derive(Debug)]
pub enum InvalidTile {
    Number(usize),
    String(String),
}

impl Tile {
    /// The caller must ensure `id < 34`.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(id: u8) -> Self {
        debug_assert!((id as usize) < TILE_KINDS);
        Self(id)
    }

    /// Iterates over all 34 tile kinds in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TILE_KINDS as u8).map(Self)
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// 0 = m, 1 = p, 2 = s, 3 = honors.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> u8 {
        self.0 / 9
    }

    /// Zero-based rank within the suit. Meaningless for honors.
    #[inline]
    #[must_use]
    pub const fn num(self) -> u8 {
        self.0 % 9
    }

    #[inline]
    #[must_use]
    pub const fn is_jihai(self) -> bool {
        self.0 >= FIRST_HONOR
    }

    #[inline]
    #[must_use]
    pub const fn is_five(self) -> bool {
        !self.is_jihai() && self.num() == 4
    }

    #[inline]
    #[must_use]
    pub const fn is_yaokyuu(self) -> bool {
        self.is_jihai() || self.num() == 0 || self.num() == 8
    }

    /// The dora indicated by `self` when it is used as a dora indicator.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        let kind = self.0 / 9;
        let num = self.0 % 9;
        if kind < 3 {
            Self(kind * 9 + (num + 1) % 9)
        } else if num < 4 {
            Self(3 * 9 + (num + 1) % 4)
        } else {
            Self(3 * 9 + 4 + (num - 4 + 1) % 3)
        }
    }
}

/// East, so that winds default to the dealer's seat in the first round.
impl Default for Tile {
    fn default() -> Self {
        Self(FIRST_HONOR)
    }
}

impl TryFrom<u8> for Tile {
    type Error = InvalidTile;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::try_from(v as usize)
    }
}

impl TryFrom<usize> for Tile {
    type Error = InvalidTile;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        if v >= TILE_KINDS {
            Err(InvalidTile::Number(v))
        } else {
            Ok(Self(v as u8))
        }
    }
}

impl FromStr for Tile {
    type Err = InvalidTile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TILE_STRINGS_MAP
            .get(s)
            .copied()
            .ok_or_else(|| InvalidTile::String(s.to_owned()))
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TILE_STRINGS[self.0 as usize])
    }
}

impl Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl fmt::Display for InvalidTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a valid tile: ")?;
        match self {
            Self::Number(n) => fmt::Display::fmt(n, f),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl Error for InvalidTile {}
