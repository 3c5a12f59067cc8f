//! The game engine: the turn state machine.
//!
//! TURN ORDER (per actor, fixed, never reordered):
//!   1. Jail resolution   roll_and_move while jailed, pay_jail_fine, use_jail_card
//!   2. Move              roll_and_move
//!   3. Tile resolution   resolve_tile (card draws resolve inline)
//!   4. Build decision    purchase, build, sell, mortgage, unmortgage
//!   5. Win check         after every action
//!   6. Turn advance      advance_turn
//!
//! RULES:
//!   - Actions take a state by reference and return a new one. The input
//!     is never mutated, so a rejection leaves the caller's state intact.
//!   - Every precondition is checked before the first mutation.
//!   - Dice come only from the DiceSource, addressed by a caller index.
//!   - Every state change is described by an event in the outcome.

use crate::{
    board::{Board, TileKind},
    cards::{Card, DeckKind},
    command::{ActionReport, GameCommand},
    config::GameConfig,
    debt::{self, ChargeOutcome, LiquidationNotice},
    dice::{dice_from_config, DiceRoll, DiceSource, TableDice},
    error::{GameResult, Rejection},
    event::{GameEvent, JailRelease},
    ledger::PlayerState,
    state::{Creditor, DebtReason, GameState, GameStatus, TurnPhase},
    types::{Cash, GameId, PlayerId, TileIndex},
    win::{self, WinnerReport},
};
use serde::{Deserialize, Serialize};

/// The result of an accepted action: the complete next state, the events
/// describing the change, and an action-specific summary.
#[derive(Debug, Clone)]
pub struct ActionOutcome<T> {
    pub state:  GameState,
    pub events: Vec<GameEvent>,
    pub detail: T,
}

impl<T> ActionOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionOutcome<U> {
        ActionOutcome {
            state:  self.state,
            events: self.events,
            detail: f(self.detail),
        }
    }
}

pub type ActionResult<T> = Result<ActionOutcome<T>, Rejection>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "jail", rename_all = "snake_case")]
pub enum JailOutcome {
    NotJailed,
    ReleasedOnDoubles,
    FinePaid { forced: bool },
    /// Released on the last attempt with the fine left unpaid.
    FineOwed,
    StillJailed { attempts_left: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSummary {
    pub player:       PlayerId,
    pub roll:         DiceRoll,
    pub jail:         JailOutcome,
    pub from:         TileIndex,
    pub to:           TileIndex,
    pub moved:        bool,
    pub passed_go:    bool,
    pub salary:       Cash,
    pub sent_to_jail: bool,
    /// Set when a forced jail fine could not be paid from cash.
    pub debt:         Option<LiquidationNotice>,
    pub bankrupt:     bool,
    pub phase:        TurnPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CardOutcome {
    Collected { amount: Cash },
    Paid { amount: Cash },
    Moved { to: TileIndex, passed_go: bool, landing: Box<TileEffect> },
    Jailed,
    JailCardGranted,
    Liquidation { notice: LiquidationNotice },
    Bankrupt { amount: Cash },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum TileEffect {
    Nothing { tile: TileIndex },
    PurchaseOffer { property: TileIndex, price: Cash, affordable: bool },
    OwnProperty { property: TileIndex },
    RentPaid { property: TileIndex, owner: PlayerId, amount: Cash },
    RentWaived { property: TileIndex, owner: PlayerId },
    TaxPaid { tile: TileIndex, amount: Cash },
    CardDrawn { deck: DeckKind, card: Card, outcome: CardOutcome },
    SentToJail,
    Liquidation { notice: LiquidationNotice },
    Bankrupt { amount: Cash },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub property:   TileIndex,
    pub price:      Cash,
    pub cash_after: Cash,
}

/// Build or sell result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReceipt {
    pub property:     TileIndex,
    pub buildings:    u8,
    pub amount:       Cash,
    pub cash_after:   Cash,
    pub debt_settled: bool,
}

/// Mortgage or unmortgage result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortgageReceipt {
    pub property:     TileIndex,
    pub amount:       Cash,
    pub cash_after:   Cash,
    pub debt_settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JailExit {
    pub via:        JailRelease,
    pub cash_after: Cash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankruptcyReport {
    pub player:   PlayerId,
    pub creditor: Creditor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub previous_actor: PlayerId,
    /// None once the game has ended.
    pub next_actor:     Option<PlayerId>,
    pub actor_index:    usize,
    pub turn_counter:   u64,
    pub status:         GameStatus,
}

/// Which preconditions an action relaxes.
#[derive(Debug, Clone, Copy)]
struct Access {
    allow_debt:     bool,
    allow_bankrupt: bool,
}

impl Access {
    const TURN: Self = Self { allow_debt: false, allow_bankrupt: false };
    const LIQUIDATE: Self = Self { allow_debt: true, allow_bankrupt: false };
    const ADVANCE: Self = Self { allow_debt: false, allow_bankrupt: true };
}

pub struct GameEngine {
    config: GameConfig,
    board:  Board,
    dice:   Box<dyn DiceSource>,
}

impl GameEngine {
    pub fn new(config: GameConfig, board: Board, dice: Box<dyn DiceSource>) -> Self {
        Self { config, board, dice }
    }

    /// Build an engine from config: board file if given, else the
    /// standard board, and the configured dice source.
    pub fn build(config: GameConfig) -> GameResult<Self> {
        let board = match &config.board_path {
            Some(path) => Board::load(path)?,
            None => Board::standard(),
        };
        let dice = dice_from_config(&config.dice);
        log::debug!("engine: board={} dice={}", config.board_path.as_deref().unwrap_or("standard"), dice.name());
        Ok(Self::new(config, board, dice))
    }

    /// Standard board, default rules, table dice.
    pub fn build_test() -> Self {
        Self::new(GameConfig::default_test(), Board::standard(), Box::new(TableDice))
    }

    pub fn with_config(config: GameConfig) -> Self {
        let dice = dice_from_config(&config.dice);
        Self::new(config, Board::standard(), dice)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    // ── Lifecycle ──────────────────────────────────

    pub fn create_game(&self, game_id: GameId) -> ActionOutcome<()> {
        let state = GameState::new(game_id.clone(), &self.board);
        ActionOutcome { state, events: vec![GameEvent::GameCreated { game_id }], detail: () }
    }

    pub fn join_game(&self, state: &GameState, player: &str) -> ActionResult<()> {
        if state.status.is_terminal() {
            return Err(Rejection::GameAlreadyOver);
        }
        if state.initialized {
            return Err(Rejection::InvalidState { phase: state.phase });
        }
        if state.player(player).is_some() {
            return Err(Rejection::DuplicatePlayer { player: player.to_string() });
        }
        if state.players.len() >= self.config.max_players {
            return Err(Rejection::TooManyPlayers { max: self.config.max_players });
        }

        let mut next = state.clone();
        let cash = self.config.starting_cash;
        next.players.push(PlayerState::new(player.to_string(), cash));
        next.bank.seeded += cash;
        log::debug!("game={} lobby: {player} joined", next.game_id);

        let events = vec![GameEvent::PlayerJoined { player: player.to_string(), cash }];
        Ok(ActionOutcome { state: next, events, detail: () })
    }

    /// Shuffle both decks from `deck_seed` and hand the first turn to the
    /// first player who joined.
    pub fn start_game(&self, state: &GameState, deck_seed: u64) -> ActionResult<()> {
        if state.status.is_terminal() {
            return Err(Rejection::GameAlreadyOver);
        }
        if state.initialized {
            return Err(Rejection::InvalidState { phase: state.phase });
        }
        if state.players.len() < self.config.min_players {
            return Err(Rejection::NotEnoughPlayers {
                min:  self.config.min_players,
                have: state.players.len(),
            });
        }

        let mut next = state.clone();
        next.chance = crate::cards::DeckState::shuffled(DeckKind::Chance, deck_seed);
        next.community = crate::cards::DeckState::shuffled(DeckKind::CommunityChest, deck_seed);
        next.deck_seed = deck_seed;
        next.initialized = true;
        next.status = GameStatus::InProgress;
        next.phase = TurnPhase::AwaitingJailResolution;
        next.turn_index = 0;
        next.actor_index = 0;
        log::info!("game={} started with {} players, deck_seed={deck_seed}", next.game_id, next.players.len());

        let events = vec![GameEvent::GameStarted {
            players: next.players.iter().map(|p| p.id.clone()).collect(),
            deck_seed,
        }];
        Ok(ActionOutcome { state: next, events, detail: () })
    }

    /// Create, join and start a game in one call.
    pub fn start_test_game(&self, players: &[&str]) -> Result<GameState, Rejection> {
        let mut state = self.create_game("test-game".into()).state;
        for player in players {
            state = self.join_game(&state, player)?.state;
        }
        Ok(self.start_game(&state, 0)?.state)
    }

    // ── Turn actions ───────────────────────────────

    pub fn roll_and_move(&self, state: &GameState, actor: &str, roll_index: u64) -> ActionResult<MoveSummary> {
        let index = self.authorize(state, actor, Access::TURN)?;
        if !matches!(state.phase, TurnPhase::AwaitingJailResolution | TurnPhase::AwaitingMove) {
            return Err(Rejection::InvalidState { phase: state.phase });
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        let roll = self.dice.roll(roll_index);
        next.last_roll = Some(roll);
        events.push(GameEvent::DiceRolled { player: actor.to_string(), index: roll_index, roll });

        let from = next.players[index].position;
        let mut summary = MoveSummary {
            player: actor.to_string(),
            roll,
            jail: JailOutcome::NotJailed,
            from,
            to: from,
            moved: false,
            passed_go: false,
            salary: 0,
            sent_to_jail: false,
            debt: None,
            bankrupt: false,
            phase: next.phase,
        };

        let jail_turns = next.players[index].jail_turns;
        if jail_turns > 0 {
            let fine = self.config.jail_fine;
            if roll.is_doubles() {
                next.players[index].release_from_jail();
                events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Doubles });
                summary.jail = JailOutcome::ReleasedOnDoubles;
            } else if jail_turns == 1 {
                next.players[index].release_from_jail();
                summary.jail = JailOutcome::FineOwed;
                match debt::charge(&mut next, &self.board, actor, Creditor::Bank, fine, DebtReason::JailFine, &mut events) {
                    ChargeOutcome::Paid => {
                        summary.jail = JailOutcome::FinePaid { forced: true };
                        events.push(GameEvent::JailFinePaid { player: actor.to_string(), amount: fine, forced: true });
                        events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Fine });
                    }
                    ChargeOutcome::Pending(notice) => {
                        events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Fine });
                        summary.debt = Some(notice);
                        set_phase(&mut next, TurnPhase::AwaitingMove, &mut events);
                        summary.phase = next.phase;
                        return Ok(self.finish(next, events, summary));
                    }
                    ChargeOutcome::Bankrupt => {
                        summary.bankrupt = true;
                        set_phase(&mut next, TurnPhase::TurnAdvance, &mut events);
                        summary.phase = next.phase;
                        return Ok(self.finish(next, events, summary));
                    }
                }
            } else if self.config.auto_pay_jail_fine && next.players[index].can_afford(fine) {
                next.players[index].pay(fine)?;
                next.players[index].release_from_jail();
                next.bank.paid_in += fine;
                events.push(GameEvent::JailFinePaid { player: actor.to_string(), amount: fine, forced: false });
                events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Fine });
                summary.jail = JailOutcome::FinePaid { forced: false };
            } else {
                let attempts_left = jail_turns - 1;
                next.players[index].jail_turns = attempts_left;
                events.push(GameEvent::JailEscapeFailed { player: actor.to_string(), attempts_left });
                summary.jail = JailOutcome::StillJailed { attempts_left };
                set_phase(&mut next, TurnPhase::TurnAdvance, &mut events);
                summary.phase = next.phase;
                log::debug!("game={} turn={} jail: {actor} stays, {attempts_left} attempts left", next.game_id, next.turn_counter);
                return Ok(self.finish(next, events, summary));
            }
            set_phase(&mut next, TurnPhase::AwaitingMove, &mut events);
        }

        self.move_by(&mut next, index, roll.total(), &mut summary, &mut events);
        summary.phase = next.phase;
        log::debug!(
            "game={} turn={} move: {actor} rolled {} ({}+{}) {} -> {}",
            next.game_id,
            next.turn_counter,
            roll.total(),
            roll.die1,
            roll.die2,
            summary.from,
            summary.to
        );
        Ok(self.finish(next, events, summary))
    }

    pub fn resolve_tile(&self, state: &GameState, actor: &str) -> ActionResult<TileEffect> {
        let index = self.authorize(state, actor, Access::TURN)?;
        if state.phase != TurnPhase::AwaitingTileResolution {
            return Err(Rejection::InvalidState { phase: state.phase });
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        let effect = self.land(&mut next, index, &mut events);

        let player = &next.players[index];
        let phase = if player.bankrupt || player.in_jail() {
            TurnPhase::TurnAdvance
        } else {
            TurnPhase::AwaitingBuildDecision
        };
        set_phase(&mut next, phase, &mut events);
        Ok(self.finish(next, events, effect))
    }

    /// Buy the tile the actor is standing on.
    pub fn purchase_property(&self, state: &GameState, actor: &str, property: TileIndex) -> ActionResult<PurchaseReceipt> {
        let index = self.authorize(state, actor, Access::TURN)?;
        if state.phase != TurnPhase::AwaitingBuildDecision {
            return Err(Rejection::InvalidState { phase: state.phase });
        }
        let Some(def) = self.board.property(property) else {
            return Err(Rejection::NotAProperty { tile: property });
        };
        if state.registry.owner_of(property).is_some() {
            return Err(Rejection::AlreadyOwned { property });
        }
        if state.players[index].position != property {
            return Err(Rejection::NotOnProperty { property });
        }

        let mut next = state.clone();
        next.players[index].pay(def.price)?;
        next.bank.paid_in += def.price;
        next.assign_property(property, actor);
        log::info!("game={} turn={} purchase: {actor} bought tile {property} for {}", next.game_id, next.turn_counter, def.price);

        let events = vec![GameEvent::PropertyPurchased { player: actor.to_string(), property, price: def.price }];
        let receipt = PurchaseReceipt { property, price: def.price, cash_after: next.players[index].cash };
        Ok(self.finish(next, events, receipt))
    }

    pub fn build_on_property(&self, state: &GameState, actor: &str, property: TileIndex) -> ActionResult<BuildReceipt> {
        let index = self.authorize(state, actor, Access::TURN)?;
        if state.phase != TurnPhase::AwaitingBuildDecision {
            return Err(Rejection::InvalidState { phase: state.phase });
        }
        let cost = state.registry.check_build(&self.board, actor, property)?;

        let mut next = state.clone();
        next.players[index].pay(cost)?;
        next.bank.paid_in += cost;
        let buildings = next.registry.buildings_on(property) + 1;
        next.set_buildings(property, buildings);
        log::debug!("game={} turn={} build: {actor} tile {property} now {buildings}", next.game_id, next.turn_counter);

        let events = vec![GameEvent::BuildingBuilt { player: actor.to_string(), property, buildings, cost }];
        let receipt = BuildReceipt {
            property,
            buildings,
            amount: cost,
            cash_after: next.players[index].cash,
            debt_settled: false,
        };
        Ok(self.finish(next, events, receipt))
    }

    /// Sell one building back for half its cost. Allowed while a debt is
    /// pending; the debt is settled as soon as cash covers it.
    pub fn sell_building(&self, state: &GameState, actor: &str, property: TileIndex) -> ActionResult<BuildReceipt> {
        let index = self.authorize(state, actor, Access::LIQUIDATE)?;
        let refund = state.registry.check_sell(&self.board, actor, property)?;

        let mut next = state.clone();
        let mut events = Vec::new();
        next.players[index].credit(refund);
        next.bank.paid_out += refund;
        let buildings = next.registry.buildings_on(property) - 1;
        next.set_buildings(property, buildings);
        events.push(GameEvent::BuildingSold { player: actor.to_string(), property, buildings, refund });

        let debt_settled = debt::try_settle(&mut next, &mut events);
        let receipt = BuildReceipt {
            property,
            buildings,
            amount: refund,
            cash_after: next.players[index].cash,
            debt_settled,
        };
        Ok(self.finish(next, events, receipt))
    }

    /// Mortgage for half the price. Allowed while a debt is pending.
    pub fn mortgage_property(&self, state: &GameState, actor: &str, property: TileIndex) -> ActionResult<MortgageReceipt> {
        let index = self.authorize(state, actor, Access::LIQUIDATE)?;
        let loan = state.registry.check_mortgage(&self.board, actor, property)?;

        let mut next = state.clone();
        let mut events = Vec::new();
        next.players[index].credit(loan);
        next.bank.paid_out += loan;
        next.set_mortgaged(property, true);
        events.push(GameEvent::PropertyMortgaged { player: actor.to_string(), property, loan });
        log::debug!("game={} turn={} mortgage: {actor} tile {property} for {loan}", next.game_id, next.turn_counter);

        let debt_settled = debt::try_settle(&mut next, &mut events);
        let receipt = MortgageReceipt {
            property,
            amount: loan,
            cash_after: next.players[index].cash,
            debt_settled,
        };
        Ok(self.finish(next, events, receipt))
    }

    /// Repay principal plus interest and restore rent collection.
    pub fn unmortgage_property(&self, state: &GameState, actor: &str, property: TileIndex) -> ActionResult<MortgageReceipt> {
        let index = self.authorize(state, actor, Access::TURN)?;
        let cost = state.registry.check_unmortgage(
            &self.board,
            actor,
            property,
            self.config.mortgage_interest_percent,
        )?;

        let mut next = state.clone();
        next.players[index].pay(cost)?;
        next.bank.paid_in += cost;
        next.set_mortgaged(property, false);

        let events = vec![GameEvent::PropertyUnmortgaged { player: actor.to_string(), property, cost }];
        let receipt = MortgageReceipt {
            property,
            amount: cost,
            cash_after: next.players[index].cash,
            debt_settled: false,
        };
        Ok(self.finish(next, events, receipt))
    }

    pub fn pay_jail_fine(&self, state: &GameState, actor: &str) -> ActionResult<JailExit> {
        let index = self.authorize(state, actor, Access::TURN)?;
        if !state.players[index].in_jail() {
            return Err(Rejection::NotInJail);
        }
        if state.phase != TurnPhase::AwaitingJailResolution {
            return Err(Rejection::InvalidState { phase: state.phase });
        }

        let fine = self.config.jail_fine;
        let mut next = state.clone();
        let mut events = Vec::new();
        next.players[index].pay(fine)?;
        next.players[index].release_from_jail();
        next.bank.paid_in += fine;
        events.push(GameEvent::JailFinePaid { player: actor.to_string(), amount: fine, forced: false });
        events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Fine });
        set_phase(&mut next, TurnPhase::AwaitingMove, &mut events);

        let exit = JailExit { via: JailRelease::Fine, cash_after: next.players[index].cash };
        Ok(self.finish(next, events, exit))
    }

    pub fn use_jail_card(&self, state: &GameState, actor: &str) -> ActionResult<JailExit> {
        let index = self.authorize(state, actor, Access::TURN)?;
        let player = &state.players[index];
        if !player.in_jail() {
            return Err(Rejection::NotInJail);
        }
        if player.jail_cards == 0 {
            return Err(Rejection::NoJailCard);
        }
        if state.phase != TurnPhase::AwaitingJailResolution {
            return Err(Rejection::InvalidState { phase: state.phase });
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        next.players[index].jail_cards -= 1;
        next.players[index].release_from_jail();
        events.push(GameEvent::ReleasedFromJail { player: actor.to_string(), via: JailRelease::Card });
        set_phase(&mut next, TurnPhase::AwaitingMove, &mut events);

        let exit = JailExit { via: JailRelease::Card, cash_after: next.players[index].cash };
        Ok(self.finish(next, events, exit))
    }

    /// Concede the pending debt instead of liquidating further.
    pub fn declare_bankruptcy(&self, state: &GameState, actor: &str) -> ActionResult<BankruptcyReport> {
        self.authorize(state, actor, Access::LIQUIDATE)?;
        let Some(pending) = state.pending_debt.as_ref().filter(|d| d.debtor == actor) else {
            return Err(Rejection::NoDebtOutstanding);
        };
        let creditor = pending.creditor.clone();

        let mut next = state.clone();
        let mut events = Vec::new();
        debt::bankrupt(&mut next, &self.board, actor, creditor.clone(), &mut events);
        set_phase(&mut next, TurnPhase::TurnAdvance, &mut events);

        let report = BankruptcyReport { player: actor.to_string(), creditor };
        Ok(self.finish(next, events, report))
    }

    /// End the actor's turn: win check, then rotation to the next
    /// non-bankrupt player. A bankrupt current actor may still advance.
    pub fn advance_turn(&self, state: &GameState, actor: &str) -> ActionResult<TurnSummary> {
        let index = self.authorize(state, actor, Access::ADVANCE)?;
        let bankrupt = state.players[index].bankrupt;
        if !bankrupt && !matches!(state.phase, TurnPhase::AwaitingBuildDecision | TurnPhase::TurnAdvance) {
            return Err(Rejection::InvalidState { phase: state.phase });
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        set_phase(&mut next, TurnPhase::AwaitingWinCheck, &mut events);
        next.turn_counter += 1;

        if let Some(status) = win::evaluate(&next, &self.board, &self.config) {
            self.conclude(&mut next, status, &mut events);
            set_phase(&mut next, TurnPhase::TurnAdvance, &mut events);
            let summary = TurnSummary {
                previous_actor: actor.to_string(),
                next_actor:     None,
                actor_index:    next.actor_index,
                turn_counter:   next.turn_counter,
                status:         next.status.clone(),
            };
            return Ok(ActionOutcome { state: next, events, detail: summary });
        }

        let count = next.players.len() as u64;
        for _ in 0..count {
            next.turn_index += 1;
            next.actor_index = (next.turn_index % count) as usize;
            if !next.players[next.actor_index].bankrupt {
                break;
            }
        }
        next.last_roll = None;
        set_phase(&mut next, TurnPhase::AwaitingJailResolution, &mut events);

        let next_actor = next.players[next.actor_index].id.clone();
        events.push(GameEvent::TurnAdvanced { turn_counter: next.turn_counter, actor: next_actor.clone() });
        log::debug!("game={} turn={} advance: {actor} -> {next_actor}", next.game_id, next.turn_counter);

        let summary = TurnSummary {
            previous_actor: actor.to_string(),
            next_actor:     Some(next_actor),
            actor_index:    next.actor_index,
            turn_counter:   next.turn_counter,
            status:         next.status.clone(),
        };
        Ok(ActionOutcome { state: next, events, detail: summary })
    }

    /// Winner, draw or in-progress. Recomputed from the state, so it also
    /// answers for states assembled outside the engine.
    pub fn check_winner(&self, state: &GameState) -> WinnerReport {
        WinnerReport::from_status(&state.status)
            .or_else(|| {
                win::evaluate(state, &self.board, &self.config)
                    .and_then(|status| WinnerReport::from_status(&status))
            })
            .unwrap_or(WinnerReport::InProgress { turn_counter: state.turn_counter })
    }

    /// Dispatch a serialized command.
    pub fn apply(&self, state: &GameState, actor: &str, command: &GameCommand) -> ActionResult<ActionReport> {
        let result = match *command {
            GameCommand::RollAndMove { roll_index } => {
                self.roll_and_move(state, actor, roll_index).map(|o| o.map(ActionReport::Moved))
            }
            GameCommand::ResolveTile => self.resolve_tile(state, actor).map(|o| o.map(ActionReport::TileResolved)),
            GameCommand::PurchaseProperty { property } => {
                self.purchase_property(state, actor, property).map(|o| o.map(ActionReport::Purchased))
            }
            GameCommand::BuildOnProperty { property } => {
                self.build_on_property(state, actor, property).map(|o| o.map(ActionReport::Built))
            }
            GameCommand::SellBuilding { property } => {
                self.sell_building(state, actor, property).map(|o| o.map(ActionReport::Sold))
            }
            GameCommand::MortgageProperty { property } => {
                self.mortgage_property(state, actor, property).map(|o| o.map(ActionReport::Mortgaged))
            }
            GameCommand::UnmortgageProperty { property } => {
                self.unmortgage_property(state, actor, property).map(|o| o.map(ActionReport::Unmortgaged))
            }
            GameCommand::PayJailFine => self.pay_jail_fine(state, actor).map(|o| o.map(ActionReport::LeftJail)),
            GameCommand::UseJailCard => self.use_jail_card(state, actor).map(|o| o.map(ActionReport::LeftJail)),
            GameCommand::DeclareBankruptcy => {
                self.declare_bankruptcy(state, actor).map(|o| o.map(ActionReport::Bankrupt))
            }
            GameCommand::AdvanceTurn => self.advance_turn(state, actor).map(|o| o.map(ActionReport::TurnAdvanced)),
        };

        if let Err(rejection) = &result {
            log::warn!(
                "game={} turn={} rejected: {actor} {command:?}: {rejection}",
                state.game_id,
                state.turn_counter
            );
        }
        result
    }

    // ── Internals ──────────────────────────────────

    /// Common preconditions; returns the actor's index in turn order.
    fn authorize(&self, state: &GameState, actor: &str, access: Access) -> Result<usize, Rejection> {
        if state.status.is_terminal() {
            return Err(Rejection::GameAlreadyOver);
        }
        if !state.initialized {
            return Err(Rejection::InvalidState { phase: state.phase });
        }
        let Some(index) = state.player_index(actor) else {
            return Err(Rejection::UnknownPlayer { player: actor.to_string() });
        };
        if index != state.actor_index {
            return Err(Rejection::NotYourTurn { player: actor.to_string() });
        }
        if state.players[index].bankrupt && !access.allow_bankrupt {
            return Err(Rejection::PlayerBankrupt { player: actor.to_string() });
        }
        if let Some(debt) = &state.pending_debt {
            if !access.allow_debt {
                return Err(Rejection::DebtOutstanding { amount: debt.amount });
            }
        }
        Ok(index)
    }

    fn move_by(
        &self,
        state: &mut GameState,
        index: usize,
        steps: u8,
        summary: &mut MoveSummary,
        events: &mut Vec<GameEvent>,
    ) {
        let salary = self.config.go_salary;
        let player = &mut state.players[index];
        let id = player.id.clone();
        let from = player.position;
        let passed_go = player.advance(steps);
        let to = player.position;

        events.push(GameEvent::PlayerMoved { player: id.clone(), from, to, passed_go });
        if passed_go {
            player.credit(salary);
            state.bank.paid_out += salary;
            events.push(GameEvent::SalaryPaid { player: id.clone(), amount: salary });
            summary.salary = salary;
        }
        summary.from = from;
        summary.to = to;
        summary.moved = true;
        summary.passed_go = passed_go;

        if self.board.tile(to).kind == TileKind::GoToJail {
            state.players[index].send_to_jail(self.board.jail_index(), self.config.max_jail_turns);
            events.push(GameEvent::SentToJail { player: id });
            summary.sent_to_jail = true;
            set_phase(state, TurnPhase::TurnAdvance, events);
        } else {
            set_phase(state, TurnPhase::AwaitingTileResolution, events);
        }
    }

    /// Apply the effect of the tile the player stands on.
    fn land(&self, state: &mut GameState, index: usize, events: &mut Vec<GameEvent>) -> TileEffect {
        let actor = state.players[index].id.clone();
        let position = state.players[index].position;

        match &self.board.tile(position).kind {
            TileKind::Property(def) => self.land_on_property(state, index, position, def.price, events),
            TileKind::Tax { amount } => {
                let amount = *amount;
                match debt::charge(state, &self.board, &actor, Creditor::Bank, amount, DebtReason::Tax { tile: position }, events) {
                    ChargeOutcome::Paid => {
                        events.push(GameEvent::TaxPaid { player: actor, tile: position, amount });
                        TileEffect::TaxPaid { tile: position, amount }
                    }
                    ChargeOutcome::Pending(notice) => TileEffect::Liquidation { notice },
                    ChargeOutcome::Bankrupt => TileEffect::Bankrupt { amount },
                }
            }
            TileKind::Chance => self.draw_card(state, index, DeckKind::Chance, events),
            TileKind::CommunityChest => self.draw_card(state, index, DeckKind::CommunityChest, events),
            TileKind::GoToJail => {
                state.players[index].send_to_jail(self.board.jail_index(), self.config.max_jail_turns);
                events.push(GameEvent::SentToJail { player: actor });
                TileEffect::SentToJail
            }
            TileKind::Go | TileKind::Jail | TileKind::FreeParking => TileEffect::Nothing { tile: position },
        }
    }

    fn land_on_property(
        &self,
        state: &mut GameState,
        index: usize,
        property: TileIndex,
        price: Cash,
        events: &mut Vec<GameEvent>,
    ) -> TileEffect {
        let actor = state.players[index].id.clone();
        let Some((owner, mortgaged)) = state.registry.get(property).map(|p| (p.owner.clone(), p.mortgaged)) else {
            return TileEffect::Nothing { tile: property };
        };

        match owner {
            None => TileEffect::PurchaseOffer {
                property,
                price,
                affordable: state.players[index].can_afford(price),
            },
            Some(owner) if owner == actor => TileEffect::OwnProperty { property },
            Some(owner) if mortgaged => {
                events.push(GameEvent::RentWaived { player: actor, owner: owner.clone(), property });
                TileEffect::RentWaived { property, owner }
            }
            Some(owner) => {
                let dice_total = state.last_roll.map_or(0, |r| r.total());
                let amount = state.registry.rent_due(&self.board, property, dice_total);
                let creditor = Creditor::Player(owner.clone());
                match debt::charge(state, &self.board, &actor, creditor, amount, DebtReason::Rent { property }, events) {
                    ChargeOutcome::Paid => {
                        log::debug!(
                            "game={} turn={} rent: {actor} paid {amount} to {owner} for tile {property}",
                            state.game_id,
                            state.turn_counter
                        );
                        events.push(GameEvent::RentPaid { payer: actor, owner: owner.clone(), property, amount });
                        TileEffect::RentPaid { property, owner, amount }
                    }
                    ChargeOutcome::Pending(notice) => TileEffect::Liquidation { notice },
                    ChargeOutcome::Bankrupt => TileEffect::Bankrupt { amount },
                }
            }
        }
    }

    fn draw_card(&self, state: &mut GameState, index: usize, deck: DeckKind, events: &mut Vec<GameEvent>) -> TileEffect {
        set_phase(state, TurnPhase::AwaitingCardResolution, events);
        let actor = state.players[index].id.clone();
        let card = state.deck_mut(deck).draw();
        events.push(GameEvent::CardDrawn { player: actor.clone(), deck, card });
        log::debug!("game={} turn={} card: {actor} drew {card:?}", state.game_id, state.turn_counter);

        let outcome = match card {
            Card::Collect { amount } => {
                state.players[index].credit(amount);
                state.bank.paid_out += amount;
                events.push(GameEvent::CardCashCollected { player: actor, amount });
                CardOutcome::Collected { amount }
            }
            Card::Pay { amount } => self.charge_card(state, &actor, amount, events),
            Card::AdvanceTo { tile } => {
                let salary = self.config.go_salary;
                let player = &mut state.players[index];
                let from = player.position;
                let passed_go = tile <= from;
                player.position = tile;
                events.push(GameEvent::PlayerMoved { player: actor.clone(), from, to: tile, passed_go });
                if passed_go {
                    player.credit(salary);
                    state.bank.paid_out += salary;
                    events.push(GameEvent::SalaryPaid { player: actor, amount: salary });
                }
                set_phase(state, TurnPhase::AwaitingTileResolution, events);
                let landing = self.land(state, index, events);
                CardOutcome::Moved { to: tile, passed_go, landing: Box::new(landing) }
            }
            Card::GoToJail => {
                state.players[index].send_to_jail(self.board.jail_index(), self.config.max_jail_turns);
                events.push(GameEvent::SentToJail { player: actor });
                CardOutcome::Jailed
            }
            Card::JailEscape => {
                state.players[index].jail_cards += 1;
                events.push(GameEvent::JailCardGranted { player: actor });
                CardOutcome::JailCardGranted
            }
            Card::BuildingRepairs { per_house, per_hotel } => {
                let amount: Cash = state.players[index]
                    .buildings
                    .values()
                    .map(|&count| if count >= 5 { per_hotel } else { per_house * Cash::from(count) })
                    .sum();
                self.charge_card(state, &actor, amount, events)
            }
        };

        TileEffect::CardDrawn { deck, card, outcome }
    }

    fn charge_card(&self, state: &mut GameState, actor: &str, amount: Cash, events: &mut Vec<GameEvent>) -> CardOutcome {
        match debt::charge(state, &self.board, actor, Creditor::Bank, amount, DebtReason::Card, events) {
            ChargeOutcome::Paid => {
                events.push(GameEvent::CardCashPaid { player: actor.to_string(), amount });
                CardOutcome::Paid { amount }
            }
            ChargeOutcome::Pending(notice) => CardOutcome::Liquidation { notice },
            ChargeOutcome::Bankrupt => CardOutcome::Bankrupt { amount },
        }
    }

    /// Record a terminal status.
    fn conclude(&self, state: &mut GameState, status: GameStatus, events: &mut Vec<GameEvent>) {
        match &status {
            GameStatus::GameOver { winner, reason } => {
                log::info!("game={} turn={} game over: {winner} wins ({reason:?})", state.game_id, state.turn_counter);
                events.push(GameEvent::GameWon { winner: winner.clone(), reason: *reason });
            }
            GameStatus::Drawn { rankings } => {
                log::info!("game={} turn={} draw after {} turns", state.game_id, state.turn_counter, state.turn_counter);
                events.push(GameEvent::GameDrawn { rankings: rankings.clone() });
            }
            GameStatus::Lobby | GameStatus::InProgress => {}
        }
        state.status = status;
    }

    /// Run the win check and wrap up an accepted action.
    fn finish<T>(&self, mut state: GameState, mut events: Vec<GameEvent>, detail: T) -> ActionOutcome<T> {
        if state.status == GameStatus::InProgress {
            if let Some(status) = win::evaluate(&state, &self.board, &self.config) {
                self.conclude(&mut state, status, &mut events);
            }
        }
        ActionOutcome { state, events, detail }
    }
}

fn set_phase(state: &mut GameState, to: TurnPhase, events: &mut Vec<GameEvent>) {
    if state.phase != to {
        events.push(GameEvent::PhaseChanged { from: state.phase, to });
        state.phase = to;
    }
}
