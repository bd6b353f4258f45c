/// Cell vocabulary and its properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

use super::variant::Variant;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Floor,
    Wall,
    Player,
    Box,
    Target, // 'X' in classic levels, 'T' in pursuit levels
    Enemy,
    Marker, // cosmetic empty, classic only
}

impl Cell {
    /// Parse a level symbol under the given rule-set's vocabulary.
    pub fn from_symbol(ch: char, variant: Variant) -> Option<Cell> {
        let cell = match ch {
            '.' => Cell::Floor,
            '#' => Cell::Wall,
            'P' => Cell::Player,
            'B' => Cell::Box,
            'X' | 'T' if ch == variant.target_symbol() => Cell::Target,
            'E' if variant.has_enemies() => Cell::Enemy,
            '@' if variant.has_marker() => Cell::Marker,
            _ => return None,
        };
        Some(cell)
    }

    pub fn symbol(self, variant: Variant) -> char {
        match self {
            Cell::Floor => '.',
            Cell::Wall => '#',
            Cell::Player => 'P',
            Cell::Box => 'B',
            Cell::Target => variant.target_symbol(),
            Cell::Enemy => 'E',
            Cell::Marker => '@',
        }
    }

    /// Can a mover step onto this cell without pushing anything?
    pub fn is_open(self) -> bool {
        matches!(self, Cell::Floor | Cell::Target | Cell::Marker)
    }

    /// Does this cell stop a box chain from sliding into it?
    pub fn blocks_push(self) -> bool {
        matches!(self, Cell::Wall | Cell::Box | Cell::Enemy)
    }

    /// Is this a dynamic entity (drawn over the floor underlay)?
    pub fn is_dynamic(self) -> bool {
        matches!(self, Cell::Player | Cell::Box | Cell::Enemy)
    }
}
