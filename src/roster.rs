//! Player roster extraction from the `userinfo` string table.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::Result;
use crate::format::USER_INFO_TABLE;
use crate::frames::Message;
use crate::header::DemoFile;

/// A player seen in the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Player slot in the user info table.
    pub slot: u16,
    /// Player name.
    pub name: String,
    /// Tick at which the player first appeared.
    pub first_tick: u32,
}

/// Lists every player written to the `userinfo` table, in order of appearance.
///
/// A slot reused by a different name yields a new profile; repeated updates
/// of the same slot and name do not.
///
/// # Errors
///
/// Returns header and frame decoding errors.
pub fn roster(data: &[u8]) -> Result<Vec<Profile>> {
    let demo = DemoFile::parse(data)?;
    let mut seen = HashSet::new();
    let mut players = Vec::new();

    for frame in demo.frames() {
        let frame = frame?;
        for message in &frame.messages {
            let Message::StringTableUpdate { table, entries } = message else {
                continue;
            };
            if table != USER_INFO_TABLE {
                continue;
            }
            for entry in entries {
                if entry.text.is_empty() {
                    continue;
                }
                if seen.insert((entry.index, entry.text.clone())) {
                    players.push(Profile {
                        slot: entry.index,
                        name: entry.text.clone(),
                        first_tick: frame.tick,
                    });
                }
            }
        }
    }

    Ok(players)
}
