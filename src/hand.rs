//! Tile-string notation: digits followed by a suit letter, e.g.
//! `"11357m 13579p 135s"`. `z` digits 1-7 are E S W N P F C, and `0` in a
//! numbered suit is a red five.

use crate::tile::{TILE_KINDS, Tile};
use std::fmt::Write;

use anyhow::{Context, Result, bail, ensure};

/// One parsed tile, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTile {
    pub tile: Tile,
    pub is_red: bool,
}

/// Parses a tile string into a list of tiles, keeping the input order.
pub fn parse_tiles(s: &str) -> Result<Vec<ParsedTile>> {
    let mut ret = vec![];
    let mut pending = vec![];
    for c in s.chars() {
        match c {
            '0'..='9' => pending.push(c as u8 - b'0'),
            'm' | 'p' | 's' | 'z' => {
                ensure!(!pending.is_empty(), "suit `{c}` without ranks in \"{s}\"");
                let kind = match c {
                    'm' => 0,
                    'p' => 1,
                    's' => 2,
                    _ => 3,
                };
                for num in pending.drain(..) {
                    let (num, is_red) = if num == 0 { (5, true) } else { (num, false) };
                    ensure!(
                        kind < 3 || (!is_red && num <= 7),
                        "invalid honor digit {num} in \"{s}\""
                    );
                    let tile = Tile::try_from(kind * 9 + num as usize - 1)?;
                    ret.push(ParsedTile { tile, is_red });
                }
            }
            c if c.is_whitespace() => continue,
            _ => bail!("unexpected character `{c}` in \"{s}\""),
        }
    }
    ensure!(pending.is_empty(), "trailing ranks without a suit in \"{s}\"");
    Ok(ret)
}

/// Parses a hand into 34-slot counts plus red five counts per suit.
pub fn hand_with_red(s: &str) -> Result<([u8; TILE_KINDS], [u8; 3])> {
    let mut tiles = [0; TILE_KINDS];
    let mut reds = [0; 3];
    for ParsedTile { tile, is_red } in parse_tiles(s).with_context(|| format!("parsing hand \"{s}\""))? {
        let count = &mut tiles[tile.as_usize()];
        *count += 1;
        ensure!(*count <= 4, "more than four {tile} in \"{s}\"");
        if is_red {
            reds[tile.kind() as usize] += 1;
        }
    }
    Ok((tiles, reds))
}

/// Parses a hand into 34-slot counts, ignoring the red marks.
pub fn hand(s: &str) -> Result<[u8; TILE_KINDS]> {
    Ok(hand_with_red(s)?.0)
}

/// Renders counts back into grouped notation, e.g. `"123m 45p 11z"`.
#[must_use]
pub fn tiles_to_string(tiles: &[u8; TILE_KINDS], reds: [u8; 3]) -> String {
    let mut groups = vec![];
    for (kind, suit) in ['m', 'p', 's', 'z'].into_iter().enumerate() {
        let width = if kind < 3 { 9 } else { 7 };
        let mut group = String::new();
        for num in 0..width {
            let count = tiles[kind * 9 + num];
            let red = if kind < 3 && num == 4 { reds[kind].min(count) } else { 0 };
            for _ in 0..red {
                group.push('0');
            }
            for _ in red..count {
                let _ = write!(group, "{}", num + 1);
            }
        }
        if !group.is_empty() {
            group.push(suit);
            groups.push(group);
        }
    }
    groups.join(" ")
}

/// Renders a list of tile kinds compactly, e.g. `"46m 2468p 24s"`.
#[must_use]
pub fn tile_list_to_string(tiles: impl IntoIterator<Item = Tile>) -> String {
    let mut counts = [0; TILE_KINDS];
    for tile in tiles {
        counts[tile.as_usize()] += 1;
    }
    tiles_to_string(&counts, [0; 3])
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn parse_and_format() {
        let tiles = hand("11357m 13579p 135s").unwrap();
        assert_eq!(tiles.iter().sum::<u8>(), 13);
        assert_eq!(tiles[0], 2);
        assert_eq!(tiles_to_string(&tiles, [0; 3]), "11357m 13579p 135s");

        let tiles = hand("1234567z").unwrap();
        assert!(tiles[27..].iter().all(|&c| c == 1));
        assert_eq!(tiles_to_string(&tiles, [0; 3]), "1234567z");
    }

    #[test]
    pub fn red_fives() {
        let (tiles, reds) = hand_with_red("3405m 55p").unwrap();
        assert_eq!(tiles[4], 2);
        assert_eq!(reds, [1, 0, 0]);
        assert_eq!(tiles_to_string(&tiles, reds), "3405m 55p");
    }

    #[test]
    pub fn keeps_input_order() {
        let err = parse_tiles("9m 1m E").unwrap_err();
        assert!(err.to_string().contains('E'));
        let tiles = parse_tiles("9m1m 1z").unwrap();
        let strings: Vec<_> = tiles.iter().map(|t| t.tile.to_string()).collect();
        assert_eq!(strings, ["9m", "1m", "E"]);
    }

    #[test]
    pub fn invalid() {
        hand("11111m").unwrap_err();
        hand("8z").unwrap_err();
        hand("0z").unwrap_err();
        hand("123").unwrap_err();
        hand("m").unwrap_err();
        hand("12x").unwrap_err();
    }
}
