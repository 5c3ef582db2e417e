//! Reconciliation coordinator.
//!
//! One [`DeckService`] per wallet session. The ledger gateway and the
//! session context are injected at construction; nothing is discovered at
//! runtime and no ambient account state is read.
//!
//! A reconcile applies sub-steps in a fixed order, each awaited to its
//! receipt before the next starts:
//!
//! 1. approval gate — on denial the whole reconcile aborts, no writes
//! 2. support-card additions
//! 3. support-card removals
//! 4. battle-slot change
//!
//! Additions run before removals so a swap never transiently drops the
//! deck below a ledger-enforced minimum size; the battle slot goes last
//! because it is independent of the multiset and must not block it. Each
//! write is attempted exactly once; failures are recorded per sub-step in
//! the [`ReconcileOutcome`], never retried, and never roll back a sub-step
//! that already succeeded. The snapshot is mutated only after a success
//! receipt.

use std::sync::Arc;

use dh_delta::{battle_card_change, BattleCardChange, SupportDelta};
use dh_ledger::{DeckLedger, LedgerError, LedgerOp, TxHandle};
use dh_schemas::{support_entries, CardId, DeckId, SessionContext};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::gate::ensure_approval;
use crate::guard::{InFlightGuard, OpKey};
use crate::outcome::{ReconcileOutcome, StepReport};
use crate::snapshot::DeckSnapshot;
use crate::{LoadError, SessionRefusal};

/// Lightweight per-deck info for list displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub deck_id: DeckId,
    pub battle_card: CardId,
    pub support_total: u32,
}

/// Deck operations for one wallet session.
pub struct DeckService<L: DeckLedger> {
    ledger: Arc<L>,
    ctx: SessionContext,
    in_flight: InFlightGuard,
}

impl<L: DeckLedger> DeckService<L> {
    pub fn new(ledger: Arc<L>, ctx: SessionContext) -> Self {
        Self {
            ledger,
            ctx,
            in_flight: InFlightGuard::default(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn preflight(&self) -> Result<(), SessionRefusal> {
        if !self.ctx.connected {
            return Err(SessionRefusal::WalletDisconnected);
        }
        if self.ctx.account.is_empty() {
            return Err(SessionRefusal::NoAccount);
        }
        Ok(())
    }

    /// Load one deck's current ledger state into a fresh snapshot.
    pub async fn load_deck(&self, deck: DeckId) -> Result<DeckSnapshot, LoadError> {
        self.preflight()?;
        let _permit = self
            .in_flight
            .try_begin(OpKey::Deck(deck))
            .ok_or(SessionRefusal::DeckBusy(deck))?;

        let battle_card = self.ledger.get_battle_card(deck).await?;
        let support_cards = self.ledger.get_all_support_cards(deck).await?;
        debug!(%deck, %battle_card, kinds = support_cards.len(), "deck loaded");
        Ok(DeckSnapshot::new(deck, battle_card, support_cards))
    }

    /// Enumerate the session account's decks and load their summaries.
    ///
    /// Summaries load concurrently; a deck whose info-load fails is logged
    /// and skipped rather than failing the whole list. A duplicate reload
    /// while one is in flight is refused.
    pub async fn load_player_decks(&self) -> Result<Vec<DeckSummary>, LoadError> {
        self.preflight()?;
        let _permit = self
            .in_flight
            .try_begin(OpKey::DeckList)
            .ok_or(SessionRefusal::DeckListBusy)?;

        let decks = self.ledger.get_player_decks(&self.ctx.account).await?;
        info!(account = %self.ctx.account, decks = decks.len(), "loading deck list");

        let summaries = join_all(decks.into_iter().map(|deck| self.load_summary(deck))).await;
        Ok(summaries.into_iter().flatten().collect())
    }

    async fn load_summary(&self, deck: DeckId) -> Option<DeckSummary> {
        let battle_card = match self.ledger.get_battle_card(deck).await {
            Ok(card) => card,
            Err(err) => {
                warn!(%deck, error = %err, "skipping deck, battle-card load failed");
                return None;
            }
        };
        let support_cards = match self.ledger.get_all_support_cards(deck).await {
            Ok(cards) => cards,
            Err(err) => {
                warn!(%deck, error = %err, "skipping deck, support-card load failed");
                return None;
            }
        };
        Some(DeckSummary {
            deck_id: deck,
            battle_card,
            support_total: support_cards.values().sum(),
        })
    }

    /// Apply a computed delta and battle-slot change to the ledger,
    /// updating the snapshot only for confirmed sub-steps.
    pub async fn reconcile(
        &self,
        snapshot: &mut DeckSnapshot,
        delta: &SupportDelta,
        desired_battle_card: CardId,
    ) -> Result<ReconcileOutcome, SessionRefusal> {
        self.preflight()?;
        let deck = snapshot.deck_id();
        let _permit = self
            .in_flight
            .try_begin(OpKey::Deck(deck))
            .ok_or(SessionRefusal::DeckBusy(deck))?;

        let approval = ensure_approval(self.ledger.as_ref(), &self.ctx).await;
        if approval.is_denied() {
            warn!(%deck, "approval denied, skipping all writes");
            return Ok(ReconcileOutcome::aborted(approval));
        }

        let additions = self.apply_additions(snapshot, delta).await;
        let removals = self.apply_removals(snapshot, delta).await;
        let battle_card = self.apply_battle_card(snapshot, desired_battle_card).await;

        let outcome = ReconcileOutcome {
            approval,
            additions,
            removals,
            battle_card,
        };
        if !outcome.fully_applied() {
            warn!(%deck, failed = ?outcome.failed_steps(), "reconcile finished with failures");
        }
        Ok(outcome)
    }

    async fn apply_additions(&self, snapshot: &mut DeckSnapshot, delta: &SupportDelta) -> StepReport {
        if delta.to_add.is_empty() {
            return StepReport::NoChange;
        }
        let deck = snapshot.deck_id();
        let entries = support_entries(&delta.to_add);
        info!(%deck, kinds = entries.len(), "adding support cards");

        let submitted = self.ledger.add_support_cards(deck, &entries).await;
        match self.confirm(LedgerOp::AddSupportCards, submitted).await {
            Ok(()) => {
                snapshot.apply_additions(&entries);
                StepReport::Confirmed
            }
            Err(err) => {
                warn!(%deck, error = %err, "support-card additions failed, mirror unchanged");
                StepReport::Failed(err)
            }
        }
    }

    async fn apply_removals(&self, snapshot: &mut DeckSnapshot, delta: &SupportDelta) -> StepReport {
        if delta.to_remove.is_empty() {
            return StepReport::NoChange;
        }
        let deck = snapshot.deck_id();
        let entries = support_entries(&delta.to_remove);
        info!(%deck, kinds = entries.len(), "removing support cards");

        let submitted = self.ledger.remove_support_cards(deck, &entries).await;
        match self.confirm(LedgerOp::RemoveSupportCards, submitted).await {
            Ok(()) => {
                snapshot.apply_removals(&entries);
                StepReport::Confirmed
            }
            Err(err) => {
                warn!(%deck, error = %err, "support-card removals failed, mirror unchanged");
                StepReport::Failed(err)
            }
        }
    }

    async fn apply_battle_card(&self, snapshot: &mut DeckSnapshot, desired: CardId) -> StepReport {
        let deck = snapshot.deck_id();
        let (op, submitted) = match battle_card_change(snapshot.battle_card(), desired) {
            BattleCardChange::Unchanged => return StepReport::NoChange,
            BattleCardChange::Set(card) => {
                info!(%deck, %card, "setting battle card");
                (
                    LedgerOp::SetBattleCard,
                    self.ledger.set_battle_card(deck, card).await,
                )
            }
            BattleCardChange::Remove => {
                info!(%deck, "removing battle card");
                (
                    LedgerOp::RemoveBattleCard,
                    self.ledger.remove_battle_card(deck).await,
                )
            }
        };

        match self.confirm(op, submitted).await {
            Ok(()) => {
                snapshot.set_battle_card(desired);
                StepReport::Confirmed
            }
            Err(err) => {
                warn!(%deck, error = %err, "battle-card change failed, mirror unchanged");
                StepReport::Failed(err)
            }
        }
    }

    /// Resolve a submitted write to its receipt. A failure receipt becomes
    /// a rejection scoped to the submitting operation.
    async fn confirm(
        &self,
        op: LedgerOp,
        submitted: Result<TxHandle, LedgerError>,
    ) -> Result<(), LedgerError> {
        let handle = submitted?;
        let receipt = self.ledger.await_receipt(&handle).await?;
        if receipt.is_success() {
            Ok(())
        } else {
            Err(LedgerError::rejected(
                op,
                format!("receipt for {handle} reported failure"),
            ))
        }
    }
}
