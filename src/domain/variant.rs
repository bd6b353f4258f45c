/// Rule-sets: one engine, two games.
///
/// ## Capability Table
///
/// ┌─────────────────────────────┬──────────┬──────────┐
/// │ Capability                   │ Classic  │ Pursuit  │
/// ├─────────────────────────────┼──────────┼──────────┤
/// │ Target symbol                │ X        │ T        │
/// │ Cosmetic marker '@'          │ yes      │ no       │
/// │ Enemies 'E'                  │ no       │ yes      │
/// │ Enemy tick                   │ no       │ yes      │
/// │ Countdown timer              │ no       │ yes      │
/// │ Stepping onto enemy          │ n/a      │ capture  │
/// │ Win: all targets covered     │ yes      │ if any   │
/// │ Win: all enemies trapped     │ no       │ yes      │
/// └─────────────────────────────┴──────────┴──────────┘
///
/// Everything variant-specific is asked of this type; the resolver,
/// the pursuit engine and the round controller never match on the
/// variant themselves.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Toggle-target Sokoban: cover every `X` with a box.
    Classic,
    /// Enemies chase the player against a countdown; trap them all to win.
    #[default]
    Pursuit,
}

impl Variant {
    pub fn parse(s: &str) -> Option<Variant> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "sokoban" => Some(Variant::Classic),
            "pursuit" | "chase" => Some(Variant::Pursuit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Pursuit => "pursuit",
        }
    }

    pub fn target_symbol(self) -> char {
        match self {
            Variant::Classic => 'X',
            Variant::Pursuit => 'T',
        }
    }

    pub fn has_marker(self) -> bool {
        matches!(self, Variant::Classic)
    }

    pub fn has_enemies(self) -> bool {
        matches!(self, Variant::Pursuit)
    }

    pub fn has_timer(self) -> bool {
        matches!(self, Variant::Pursuit)
    }

    /// Is walking into an enemy a capture (round lost) rather than a bump?
    pub fn enemy_contact_captures(self) -> bool {
        matches!(self, Variant::Pursuit)
    }

    /// Does a level of this variant need targets to be winnable?
    pub fn requires_targets(self) -> bool {
        matches!(self, Variant::Classic)
    }

    /// Should covering every target end the round in a win?
    /// Pursuit levels without targets only win by trapping enemies.
    pub fn wins_by_covering(self, initial_targets: usize) -> bool {
        match self {
            Variant::Classic => true,
            Variant::Pursuit => initial_targets > 0,
        }
    }

    pub fn wins_by_trapping(self) -> bool {
        matches!(self, Variant::Pursuit)
    }
}
