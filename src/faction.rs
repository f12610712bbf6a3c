//! Faction tags and the static relation table.
//!
//! Relations are derived once from friend groups. A pair is friendly when
//! either side lists the other, so the table is symmetric by construction.
use std::fmt;
use std::str::FromStr;

use hashbrown::HashSet;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Allegiance of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// The player and their companions.
    Player,
    /// Villagers.
    Village,
    /// Village guards.
    Guard,
    /// Bandits; hostile to everyone else.
    Outlaw,
    /// Wild animals.
    Beast,
    /// Water creatures.
    Aquatic,
    /// The risen dead.
    Undead,
    /// Demons.
    Demon,
    /// Living plants.
    Plant,
    /// Golems and machines.
    Construct,
}

/// Whether two factions cooperate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Never targeted.
    Friendly,
    /// Valid combat target.
    Hostile,
}

impl Faction {
    /// Every faction in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Player,
        Self::Village,
        Self::Guard,
        Self::Outlaw,
        Self::Beast,
        Self::Aquatic,
        Self::Undead,
        Self::Demon,
        Self::Plant,
        Self::Construct,
    ];

    /// Lower-case tag used in configuration and logs.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Village => "village",
            Self::Guard => "guard",
            Self::Outlaw => "outlaw",
            Self::Beast => "beast",
            Self::Aquatic => "aquatic",
            Self::Undead => "undead",
            Self::Demon => "demon",
            Self::Plant => "plant",
            Self::Construct => "construct",
        }
    }

    /// Relation between `self` and `other`.
    ///
    /// # Examples
    /// ```
    /// use voxsim::faction::{Faction, Relation};
    /// assert_eq!(Faction::Guard.relation(Faction::Village), Relation::Friendly);
    /// assert_eq!(Faction::Outlaw.relation(Faction::Guard), Relation::Hostile);
    /// ```
    #[must_use]
    pub fn relation(self, other: Self) -> Relation {
        if self == other || FRIENDLY_PAIRS.contains(&(self, other)) {
            Relation::Friendly
        } else {
            Relation::Hostile
        }
    }

    /// Shorthand for `relation(other) == Relation::Hostile`.
    #[must_use]
    pub fn is_hostile_to(self, other: Self) -> bool {
        self.relation(other) == Relation::Hostile
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error for unrecognised faction tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown faction `{0}`")]
pub struct UnknownFaction(pub String);

impl FromStr for Faction {
    type Err = UnknownFaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.tag() == s)
            .ok_or_else(|| UnknownFaction(s.to_owned()))
    }
}

/// Relation between two raw tags; unknown tags are hostile to all but an
/// identical tag.
#[must_use]
pub fn relation_by_tag(a: &str, b: &str) -> Relation {
    if a == b {
        return Relation::Friendly;
    }
    match (a.parse::<Faction>(), b.parse::<Faction>()) {
        (Ok(fa), Ok(fb)) => fa.relation(fb),
        _ => Relation::Hostile,
    }
}

const FRIEND_GROUPS: &[&[Faction]] = &[
    &[Faction::Player, Faction::Village, Faction::Guard, Faction::Plant],
    &[Faction::Beast, Faction::Undead, Faction::Demon],
    &[Faction::Outlaw],
    &[Faction::Aquatic],
    &[Faction::Construct],
];

static FRIENDLY_PAIRS: Lazy<HashSet<(Faction, Faction)>> = Lazy::new(|| {
    let mut pairs = HashSet::new();
    for group in FRIEND_GROUPS {
        for a in group.iter().copied() {
            for b in group.iter().copied() {
                pairs.insert((a, b));
                pairs.insert((b, a));
            }
        }
    }
    pairs
});
