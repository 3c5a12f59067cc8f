//! Chance and community-chest decks.
//!
//! Each game shuffles both decks once, at start, from the game's deck seed.
//! Drawing walks the shuffled order with a cursor that wraps, so the draw
//! sequence is fixed for the lifetime of the game.

use crate::{
    rng::{GameRng, RngSlot},
    types::{Cash, TileIndex},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card", rename_all = "snake_case")]
pub enum Card {
    Collect { amount: Cash },
    Pay { amount: Cash },
    AdvanceTo { tile: TileIndex },
    GoToJail,
    JailEscape,
    BuildingRepairs { per_house: Cash, per_hotel: Cash },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

impl DeckKind {
    pub fn cards(&self) -> &'static [Card] {
        match self {
            Self::Chance         => CHANCE_CARDS,
            Self::CommunityChest => COMMUNITY_CHEST_CARDS,
        }
    }

    fn slot(&self) -> RngSlot {
        match self {
            Self::Chance         => RngSlot::ChanceDeck,
            Self::CommunityChest => RngSlot::CommunityDeck,
        }
    }
}

pub const CHANCE_CARDS: &[Card] = &[
    Card::AdvanceTo { tile: 0 },
    Card::AdvanceTo { tile: 24 },
    Card::AdvanceTo { tile: 5 },
    Card::AdvanceTo { tile: 39 },
    Card::Collect { amount: 150 },
    Card::Collect { amount: 50 },
    Card::Pay { amount: 15 },
    Card::GoToJail,
    Card::JailEscape,
    Card::BuildingRepairs { per_house: 25, per_hotel: 100 },
];

pub const COMMUNITY_CHEST_CARDS: &[Card] = &[
    Card::AdvanceTo { tile: 0 },
    Card::Collect { amount: 200 },
    Card::Collect { amount: 100 },
    Card::Collect { amount: 50 },
    Card::Pay { amount: 50 },
    Card::Pay { amount: 100 },
    Card::GoToJail,
    Card::JailEscape,
    Card::BuildingRepairs { per_house: 40, per_hotel: 115 },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckState {
    pub kind:   DeckKind,
    /// Indexes into `kind.cards()`, in draw order.
    pub order:  Vec<usize>,
    pub cursor: usize,
}

impl DeckState {
    /// The deck in printed order. Used before a game starts and in fixtures.
    pub fn unshuffled(kind: DeckKind) -> Self {
        Self {
            kind,
            order: (0..kind.cards().len()).collect(),
            cursor: 0,
        }
    }

    pub fn shuffled(kind: DeckKind, seed: u64) -> Self {
        let mut deck = Self::unshuffled(kind);
        GameRng::new(seed, kind.slot()).shuffle(&mut deck.order);
        deck
    }

    /// The card the next draw will return.
    pub fn peek(&self) -> Card {
        self.kind.cards()[self.order[self.cursor % self.order.len()]]
    }

    pub fn draw(&mut self) -> Card {
        let card = self.peek();
        self.cursor = (self.cursor + 1) % self.order.len();
        card
    }

    /// Rotate the deck so `card` is drawn next. Returns false if the deck
    /// has no such card.
    pub fn stack(&mut self, card: Card) -> bool {
        let cards = self.kind.cards();
        match self.order.iter().position(|&i| cards[i] == card) {
            Some(position) => {
                self.cursor = position;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_order_is_cyclic() {
        let mut deck = DeckState::unshuffled(DeckKind::CommunityChest);
        let len = COMMUNITY_CHEST_CARDS.len();
        let first: Vec<Card> = (0..len).map(|_| deck.draw()).collect();
        let second: Vec<Card> = (0..len).map(|_| deck.draw()).collect();
        assert_eq!(first, second);
        assert_eq!(first, COMMUNITY_CHEST_CARDS.to_vec());
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let a = DeckState::shuffled(DeckKind::Chance, 42);
        let b = DeckState::shuffled(DeckKind::Chance, 42);
        assert_eq!(a, b);

        let mut sorted = a.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..CHANCE_CARDS.len()).collect::<Vec<_>>());
    }

    #[test]
    fn stack_moves_cursor_to_card() {
        let mut deck = DeckState::shuffled(DeckKind::Chance, 3);
        assert!(deck.stack(Card::GoToJail));
        assert_eq!(deck.draw(), Card::GoToJail);
    }
}
