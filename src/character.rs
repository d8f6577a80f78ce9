//! Normalizing the contract's character record into the shape the rest of the
//! client works with.

use crate::game_types::CharacterAttributes;

/// The character record exactly as the contract returns it. Strings are
/// fixed-width on chain and may carry trailing padding; an all-padding name
/// means the account owns no character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCharacterRecord {
    pub character_index: u64,
    pub name: String,
    pub image_uri: String,
    pub hp: u64,
    pub max_hp: u64,
    pub attack_damage: u64,
}

impl RawCharacterRecord {
    /// Record for an account that owns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_character(&self) -> bool {
        !strip_padding(&self.name).is_empty()
    }
}

impl From<CharacterAttributes> for RawCharacterRecord {
    fn from(attributes: CharacterAttributes) -> Self {
        Self {
            character_index: attributes.character_index,
            name: attributes.name.to_string(),
            image_uri: attributes.image_uri.to_string(),
            hp: attributes.hp,
            max_hp: attributes.max_hp,
            attack_damage: attributes.attack_damage,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterNft {
    pub id: u64,
    pub name: String,
    pub image_uri: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack_damage: u32,
}

/// Maps a raw record onto a [`CharacterNft`]. Callers check
/// [`RawCharacterRecord::has_character`] first; [`resolve`] does both.
pub fn transform(raw: &RawCharacterRecord) -> CharacterNft {
    CharacterNft {
        id: raw.character_index,
        name: strip_padding(&raw.name).to_owned(),
        image_uri: strip_padding(&raw.image_uri).to_owned(),
        hp: saturate(raw.hp),
        max_hp: saturate(raw.max_hp),
        attack_damage: saturate(raw.attack_damage),
    }
}

pub fn resolve(raw: &RawCharacterRecord) -> Option<CharacterNft> {
    raw.has_character().then(|| transform(raw))
}

fn strip_padding(value: &str) -> &str {
    value.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
