//! Static board topology: 40 tiles, colour groups, price and rent schedules.
//!
//! The board is read-only for the lifetime of a game. Per-tier building
//! costs (house and hotel) are data on each street, so a custom board can
//! price hotels independently of houses.

use crate::{
    error::{GameError, GameResult},
    types::{Cash, TileIndex, BOARD_SIZE},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
    Railroad,
    Utility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Street,
    Railroad,
    Utility,
}

impl ColorGroup {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Railroad => PropertyKind::Railroad,
            Self::Utility  => PropertyKind::Utility,
            _              => PropertyKind::Street,
        }
    }
}

/// Price and rent schedule of an ownable tile.
///
/// `rent` is interpreted by kind:
/// - street:   `[base, 1 house, 2, 3, 4, hotel]`
/// - railroad: rent by railroads owned, `rent[n - 1]`
/// - utility:  dice multiplier by utilities owned, `rent[n - 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub group:      ColorGroup,
    pub price:      Cash,
    pub rent:       [Cash; 6],
    #[serde(default)]
    pub house_cost: Cash,
    #[serde(default)]
    pub hotel_cost: Cash,
}

impl PropertyDef {
    pub fn kind(&self) -> PropertyKind {
        self.group.kind()
    }

    pub fn mortgage_value(&self) -> Cash {
        self.price / 2
    }

    /// Cost of raising the building count from `current` to `current + 1`.
    pub fn build_cost(&self, current: u8) -> Cash {
        if current >= 4 { self.hotel_cost } else { self.house_cost }
    }

    /// Refund for selling the top building of a tile carrying `current`.
    pub fn sell_value(&self, current: u8) -> Cash {
        match current {
            0 => 0,
            n => self.build_cost(n - 1) / 2,
        }
    }

    /// Cumulative cost of `count` buildings (hotel = four houses + hotel).
    pub fn building_value(&self, count: u8) -> Cash {
        (0..count).map(|c| self.build_cost(c)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileKind {
    Go,
    Property(PropertyDef),
    Tax { amount: Cash },
    Chance,
    CommunityChest,
    Jail,
    GoToJail,
    FreeParking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    pub kind: TileKind,
}

#[derive(Debug, Clone, Deserialize)]
struct BoardFile {
    tiles: Vec<Tile>,
}

#[derive(Debug, Clone)]
pub struct Board {
    tiles:      Vec<Tile>,
    groups:     BTreeMap<ColorGroup, Vec<TileIndex>>,
    jail_index: TileIndex,
}

impl Board {
    /// Build a board from 40 tiles, rejecting malformed layouts.
    pub fn from_tiles(tiles: Vec<Tile>) -> GameResult<Self> {
        let invalid = |reason: String| GameError::InvalidBoard { reason };

        if tiles.len() != BOARD_SIZE as usize {
            return Err(invalid(format!("expected {BOARD_SIZE} tiles, got {}", tiles.len())));
        }
        if tiles[0].kind != TileKind::Go {
            return Err(invalid("tile 0 must be Go".into()));
        }

        let mut groups: BTreeMap<ColorGroup, Vec<TileIndex>> = BTreeMap::new();
        let mut jails = Vec::new();
        let mut go_to_jails = 0;

        for (index, tile) in tiles.iter().enumerate() {
            let index = index as TileIndex;
            match &tile.kind {
                TileKind::Property(def) => {
                    if def.price <= 0 {
                        return Err(invalid(format!("tile {index} has non-positive price")));
                    }
                    if def.kind() == PropertyKind::Street && (def.house_cost <= 0 || def.hotel_cost <= 0) {
                        return Err(invalid(format!("street {index} has no building costs")));
                    }
                    groups.entry(def.group).or_default().push(index);
                }
                TileKind::Tax { amount } if *amount < 0 => {
                    return Err(invalid(format!("tax tile {index} has negative amount")));
                }
                TileKind::Jail => jails.push(index),
                TileKind::GoToJail => go_to_jails += 1,
                _ => {}
            }
        }

        if jails.len() != 1 || go_to_jails != 1 {
            return Err(invalid("board needs exactly one jail and one go-to-jail tile".into()));
        }

        let board = Self { tiles, groups, jail_index: jails[0] };
        board.validate()?;
        Ok(board)
    }

    /// Sanity-check rent schedules.
    ///
    /// Streets need a positive base rent that never falls as buildings are
    /// added. Railroads and utilities need a positive, non-decreasing entry
    /// for every count a single owner can reach in their group.
    pub fn validate(&self) -> GameResult<()> {
        let invalid = |reason: String| GameError::InvalidBoard { reason };
        let rising = |rent: &[Cash]| rent.windows(2).all(|w| w[0] <= w[1]);

        for index in self.ownable() {
            let Some(def) = self.property(index) else { continue };
            if def.rent.iter().any(|&r| r < 0) {
                return Err(invalid(format!("tile {index} has a negative rent entry")));
            }
            let schedule = match def.kind() {
                PropertyKind::Street => &def.rent[..],
                PropertyKind::Railroad | PropertyKind::Utility => {
                    let members = self.group_members(def.group).len();
                    if members > def.rent.len() {
                        return Err(invalid(format!("group {:?} has more tiles than rent entries", def.group)));
                    }
                    &def.rent[..members]
                }
            };
            if schedule.first().map_or(true, |&base| base <= 0) {
                return Err(invalid(format!("tile {index} has no base rent")));
            }
            if !rising(schedule) {
                return Err(invalid(format!("tile {index} rent falls as holdings grow")));
            }
        }
        Ok(())
    }

    /// Load a board from a JSON file of the form `{ "tiles": [...] }`.
    pub fn load(path: &str) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: BoardFile = serde_json::from_str(&content)?;
        Self::from_tiles(file.tiles)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: TileIndex) -> &Tile {
        &self.tiles[usize::from(index % BOARD_SIZE)]
    }

    pub fn property(&self, index: TileIndex) -> Option<&PropertyDef> {
        match self.tiles.get(usize::from(index)).map(|t| &t.kind) {
            Some(TileKind::Property(def)) => Some(def),
            _ => None,
        }
    }

    /// Tiles in a group, ascending.
    pub fn group_members(&self, group: ColorGroup) -> &[TileIndex] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn jail_index(&self) -> TileIndex {
        self.jail_index
    }

    /// All ownable tiles, ascending.
    pub fn ownable(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t.kind, TileKind::Property(_)))
            .map(|(i, _)| i as TileIndex)
    }

    /// The classic 40-tile board.
    pub fn standard() -> Self {
        use ColorGroup::*;

        let tiles = vec![
            special("Go", TileKind::Go),
            street("Mediterranean Avenue", Brown, 60, [2, 10, 30, 90, 160, 250], 50),
            special("Community Chest", TileKind::CommunityChest),
            street("Baltic Avenue", Brown, 60, [4, 20, 60, 180, 320, 450], 50),
            special("Income Tax", TileKind::Tax { amount: 200 }),
            railroad("Reading Railroad"),
            street("Oriental Avenue", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
            special("Chance", TileKind::Chance),
            street("Vermont Avenue", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
            street("Connecticut Avenue", LightBlue, 120, [8, 40, 100, 300, 450, 600], 50),
            special("Jail", TileKind::Jail),
            street("St. Charles Place", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
            utility("Electric Company"),
            street("States Avenue", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
            street("Virginia Avenue", Pink, 160, [12, 60, 180, 500, 700, 900], 100),
            railroad("Pennsylvania Railroad"),
            street("St. James Place", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
            special("Community Chest", TileKind::CommunityChest),
            street("Tennessee Avenue", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
            street("New York Avenue", Orange, 200, [16, 80, 220, 600, 800, 1000], 100),
            special("Free Parking", TileKind::FreeParking),
            street("Kentucky Avenue", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
            special("Chance", TileKind::Chance),
            street("Indiana Avenue", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
            street("Illinois Avenue", Red, 240, [20, 100, 300, 750, 925, 1100], 150),
            railroad("B. & O. Railroad"),
            street("Atlantic Avenue", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
            street("Ventnor Avenue", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
            utility("Water Works"),
            street("Marvin Gardens", Yellow, 280, [24, 120, 360, 850, 1025, 1200], 150),
            special("Go To Jail", TileKind::GoToJail),
            street("Pacific Avenue", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
            street("North Carolina Avenue", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
            special("Community Chest", TileKind::CommunityChest),
            street("Pennsylvania Avenue", Green, 320, [28, 150, 450, 1000, 1200, 1400], 200),
            railroad("Short Line"),
            special("Chance", TileKind::Chance),
            street("Park Place", DarkBlue, 350, [35, 175, 500, 1100, 1300, 1500], 200),
            special("Luxury Tax", TileKind::Tax { amount: 100 }),
            street("Boardwalk", DarkBlue, 400, [50, 200, 600, 1400, 1700, 2000], 200),
        ];

        let mut groups: BTreeMap<ColorGroup, Vec<TileIndex>> = BTreeMap::new();
        for (index, tile) in tiles.iter().enumerate() {
            if let TileKind::Property(def) = &tile.kind {
                groups.entry(def.group).or_default().push(index as TileIndex);
            }
        }

        Self { tiles, groups, jail_index: 10 }
    }
}

fn special(name: &str, kind: TileKind) -> Tile {
    Tile { name: name.into(), kind }
}

fn street(name: &str, group: ColorGroup, price: Cash, rent: [Cash; 6], house_cost: Cash) -> Tile {
    Tile {
        name: name.into(),
        kind: TileKind::Property(PropertyDef {
            group,
            price,
            rent,
            house_cost,
            hotel_cost: house_cost,
        }),
    }
}

fn railroad(name: &str) -> Tile {
    Tile {
        name: name.into(),
        kind: TileKind::Property(PropertyDef {
            group:      ColorGroup::Railroad,
            price:      200,
            rent:       [25, 50, 100, 200, 0, 0],
            house_cost: 0,
            hotel_cost: 0,
        }),
    }
}

fn utility(name: &str) -> Tile {
    Tile {
        name: name.into(),
        kind: TileKind::Property(PropertyDef {
            group:      ColorGroup::Utility,
            price:      150,
            rent:       [4, 10, 0, 0, 0, 0],
            house_cost: 0,
            hotel_cost: 0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_shape() {
        let board = Board::standard();
        assert_eq!(board.tiles().len(), 40);
        assert_eq!(board.ownable().count(), 28);
        assert_eq!(board.group_members(ColorGroup::Brown), &[1, 3]);
        assert_eq!(board.group_members(ColorGroup::Railroad), &[5, 15, 25, 35]);
        assert_eq!(board.group_members(ColorGroup::Utility), &[12, 28]);
        assert_eq!(board.jail_index(), 10);
        assert_eq!(board.tile(30).kind, TileKind::GoToJail);
    }

    #[test]
    fn standard_board_passes_validation() {
        let board = Board::standard();
        let rebuilt = Board::from_tiles(board.tiles().to_vec()).expect("valid board");
        assert_eq!(rebuilt.jail_index(), board.jail_index());
        assert_eq!(rebuilt.group_members(ColorGroup::Green), board.group_members(ColorGroup::Green));
    }

    #[test]
    fn short_board_rejected() {
        let mut tiles = Board::standard().tiles().to_vec();
        tiles.pop();
        assert!(Board::from_tiles(tiles).is_err());
    }

    #[test]
    fn zero_rent_schedules_rejected() {
        let mut tiles = Board::standard().tiles().to_vec();
        if let TileKind::Property(def) = &mut tiles[12].kind {
            def.rent = [0; 6];
        }
        assert!(Board::from_tiles(tiles).is_err());

        let mut tiles = Board::standard().tiles().to_vec();
        if let TileKind::Property(def) = &mut tiles[15].kind {
            def.rent = [25, 50, 0, 200, 0, 0];
        }
        assert!(Board::from_tiles(tiles).is_err());
    }

    #[test]
    fn falling_street_rent_rejected() {
        let mut tiles = Board::standard().tiles().to_vec();
        if let TileKind::Property(def) = &mut tiles[39].kind {
            def.rent = [50, 200, 600, 1400, 1700, 900];
        }
        let err = Board::from_tiles(tiles).unwrap_err();
        assert!(err.to_string().contains("tile 39"));
    }

    #[test]
    fn hotel_tier_uses_hotel_cost() {
        let def = PropertyDef {
            group:      ColorGroup::Brown,
            price:      60,
            rent:       [2, 10, 30, 90, 160, 250],
            house_cost: 50,
            hotel_cost: 120,
        };
        assert_eq!(def.build_cost(0), 50);
        assert_eq!(def.build_cost(3), 50);
        assert_eq!(def.build_cost(4), 120);
        assert_eq!(def.building_value(5), 4 * 50 + 120);
        assert_eq!(def.mortgage_value(), 30);
    }
}
