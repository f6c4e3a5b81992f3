//! Riichi mahjong hand analysis: shanten, waits and discard ranking.
//!
//! ```
//! use ukeire::algo::Analyzer;
//! use ukeire::state::PlayerInfo;
//!
//! let mut player = PlayerInfo::from_hand_str("11357m 13579p 135s 1z").unwrap();
//! let analysis = Analyzer::default().analyze14(&mut player);
//! assert_eq!(analysis.shanten, 3);
//! assert_eq!(analysis.best().unwrap().discard.to_string(), "E");
//! ```

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod algo;
pub mod hand;
pub mod point;
pub mod state;
pub mod tile;
pub mod win_rate;
pub mod yaku;
