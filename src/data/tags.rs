//! Strict parser for durability notetags
//!
//! Tags are embedded in a definition's free-form `note` text. Every
//! occurrence of a tag family is extracted (a note may repeat a tag any
//! number of times) and every occurrence must parse completely: a tag with
//! missing or non-numeric fields is a configuration error, never skipped.
//!
//! Grammar (whitespace around separators is optional):
//! ```text
//! <DurabilityScrap: kind, id, quantity, chance>
//! <DurabilityElement: element multiplier >
//! <UserEquipTypeDur: kind, subtype, delta>
//! <Durability Break Sound: name, volume, pitch, pan>
//! <NoBattleDD>
//! <dReverseEdge>
//! ```

use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{char, i32 as signed, space0, space1, u32 as unsigned},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::core::error::ConfigError;
use crate::core::types::{ElementId, SoundDescriptor};

pub const SCRAP_TAG: &str = "DurabilityScrap";
pub const ELEMENT_TAG: &str = "DurabilityElement";
pub const USER_EQUIP_TAG: &str = "UserEquipTypeDur";
pub const BREAK_SOUND_TAG: &str = "Durability Break Sound";
pub const NO_BATTLE_DAMAGE_TAG: &str = "NoBattleDD";
pub const REVERSE_EDGE_TAG: &str = "dReverseEdge";

/// Salvage tag fields, before range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapTag {
    pub kind: u32,
    pub id: u32,
    pub quantity: u32,
    pub chance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTag {
    pub element_id: ElementId,
    pub delta: f64,
}

/// Targeted-effect tag fields, before range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEquipTag {
    pub kind: u32,
    pub sub_type: u32,
    pub delta: i32,
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0).parse(input)
}

fn close(input: &str) -> IResult<&str, char> {
    preceded(space0, char('>')).parse(input)
}

fn scrap_tag(input: &str) -> IResult<&str, ScrapTag> {
    delimited(
        (tag("<DurabilityScrap:"), space0),
        (
            unsigned,
            preceded(comma, unsigned),
            preceded(comma, unsigned),
            preceded(comma, unsigned),
        ),
        close,
    )
    .map(|(kind, id, quantity, chance)| ScrapTag {
        kind,
        id,
        quantity,
        chance,
    })
    .parse(input)
}

fn element_tag(input: &str) -> IResult<&str, ElementTag> {
    delimited(
        (tag("<DurabilityElement:"), space0),
        (signed, preceded(space1, double)),
        close,
    )
    .map(|(element_id, delta)| ElementTag { element_id, delta })
    .parse(input)
}

fn user_equip_tag(input: &str) -> IResult<&str, UserEquipTag> {
    delimited(
        (tag("<UserEquipTypeDur:"), space0),
        (unsigned, preceded(comma, unsigned), preceded(comma, signed)),
        close,
    )
    .map(|(kind, sub_type, delta)| UserEquipTag {
        kind,
        sub_type,
        delta,
    })
    .parse(input)
}

fn break_sound_tag(input: &str) -> IResult<&str, SoundDescriptor> {
    delimited(
        (tag("<Durability Break Sound:"), space0),
        (
            take_till1(|c| c == ',' || c == '>'),
            preceded(comma, unsigned),
            preceded(comma, unsigned),
            preceded(comma, signed),
        ),
        close,
    )
    .map(|(name, volume, pitch, pan): (&str, u32, u32, i32)| {
        SoundDescriptor::new(name.trim(), volume, pitch, pan)
    })
    .parse(input)
}

/// Text shown in error messages: the tag up to its closing bracket
fn snippet(text: &str) -> String {
    match text.find('>') {
        Some(end) => text[..=end].to_string(),
        None => text.chars().take(48).collect(),
    }
}

/// Extract every occurrence of one tag family from a note
fn extract_all<T>(
    note: &str,
    owner: &str,
    family: &'static str,
    parser: impl Fn(&str) -> IResult<&str, T>,
) -> Result<Vec<T>, ConfigError> {
    let marker = format!("<{}", family);
    let mut found = Vec::new();
    let mut rest = note;

    while let Some(pos) = rest.find(&marker) {
        let candidate = &rest[pos..];
        match parser(candidate) {
            Ok((remaining, value)) => {
                found.push(value);
                rest = remaining;
            }
            Err(_) => {
                return Err(ConfigError::MalformedTag {
                    owner: owner.to_string(),
                    tag: family,
                    text: snippet(candidate),
                })
            }
        }
    }

    Ok(found)
}

pub fn scrap_tags(note: &str, owner: &str) -> Result<Vec<ScrapTag>, ConfigError> {
    extract_all(note, owner, SCRAP_TAG, scrap_tag)
}

pub fn element_tags(note: &str, owner: &str) -> Result<Vec<ElementTag>, ConfigError> {
    extract_all(note, owner, ELEMENT_TAG, element_tag)
}

pub fn user_equip_tags(note: &str, owner: &str) -> Result<Vec<UserEquipTag>, ConfigError> {
    extract_all(note, owner, USER_EQUIP_TAG, user_equip_tag)
}

/// The last break sound tag wins if several are present
pub fn break_sound_tag_of(note: &str, owner: &str) -> Result<Option<SoundDescriptor>, ConfigError> {
    Ok(extract_all(note, owner, BREAK_SOUND_TAG, break_sound_tag)?.pop())
}

/// True if the note carries a bare `<flag>` tag
pub fn has_flag(note: &str, flag: &str) -> bool {
    note.contains(&format!("<{}>", flag))
}
