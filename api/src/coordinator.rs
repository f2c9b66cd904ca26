//! The confirmation coordinator: one focused pending transaction, the user's
//! decisions about it, and the side effects tied to its lifetime.
//!
//! Everything runs on one thread. Methods take `&self`; mutable state sits in
//! a `RefCell` that is never borrowed across an `.await`.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;

use alloy_primitives::Address;
use dioxus_logger::tracing::debug;
use dioxus_logger::tracing::info;
use dioxus_logger::tracing::warn;

use crate::backend::Dialogs;
use crate::backend::NameResolver;
use crate::backend::PollingToken;
use crate::backend::Router;
use crate::backend::TransactionBackend;
use crate::config::EnvironmentType;
use crate::method;
use crate::nonce::nonce_warning;
use crate::nonce::parse_custom_nonce_input;
use crate::nonce::CustomNonces;
use crate::route::Route;
use crate::telemetry::Telemetry;
use crate::telemetry::TelemetryEvent;
use crate::tx::GasCustomization;
use crate::tx::PendingTransaction;
use crate::tx::TokenData;
use crate::tx::TxId;
use crate::wallet_state::WalletState;
use crate::ApiError;

/// What the edit flow receives from [`ConfirmationCoordinator::handle_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub transaction: PendingTransaction,
    pub token_data: Option<TokenData>,
}

pub type EditHandler = Box<dyn Fn(EditRequest)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumIs)]
pub enum Phase {
    /// Nothing focused.
    #[default]
    Idle,
    Reviewing,
    Submitting,
    /// Waiting for the user to dismiss the confirmed/dropped notice.
    Acknowledging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Approved,
    /// The backend refused; the message is also shown inline.
    Failed(String),
    /// Another submit is still in flight.
    AlreadySubmitting,
    NoFocus,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    focus: Option<PendingTransaction>,
    /// Bumped on every mount and unmount so late async results can tell they
    /// belong to an earlier focus.
    generation: u64,
    phase: Phase,
    submit_error: Option<String>,
    custom_nonces: CustomNonces,
    next_nonce: Option<u64>,
    nonce_warning: Option<String>,
    gas_price_warning: bool,
    observed_gas_price_failure: Option<bool>,
    gas_draft: Option<GasCustomization>,
    resolved_names: HashMap<Address, String>,
    unload_guard_armed: bool,
    polling_token: Option<PollingToken>,
    gas_missing_acknowledged: bool,
    most_recent_overview: Route,
}

impl CoordinatorState {
    fn focused_id(&self) -> Option<TxId> {
        self.focus.as_ref().map(|tx| tx.id)
    }

    fn custom_nonce(&self) -> Option<u64> {
        self.focused_id().and_then(|id| self.custom_nonces.get(id))
    }

    fn refresh_nonce_warning(&mut self) {
        self.nonce_warning = nonce_warning(self.next_nonce, self.custom_nonce());
    }
}

pub struct ConfirmationCoordinator<B, N, T, R, D>
where
    B: TransactionBackend,
    N: NameResolver,
    T: Telemetry,
    R: Router,
    D: Dialogs,
{
    backend: B,
    names: N,
    telemetry: T,
    router: R,
    dialogs: D,
    environment: EnvironmentType,
    on_edit: Option<EditHandler>,
    submitting: Cell<bool>,
    state: RefCell<CoordinatorState>,
}

impl<B, N, T, R, D> ConfirmationCoordinator<B, N, T, R, D>
where
    B: TransactionBackend,
    N: NameResolver,
    T: Telemetry,
    R: Router,
    D: Dialogs,
{
    pub fn new(
        backend: B,
        names: N,
        telemetry: T,
        router: R,
        dialogs: D,
        environment: EnvironmentType,
    ) -> Self {
        Self {
            backend,
            names,
            telemetry,
            router,
            dialogs,
            environment,
            on_edit: None,
            submitting: Cell::new(false),
            state: RefCell::default(),
        }
    }

    /// Enables [`Self::handle_edit`]. Callers only pass a handler for
    /// transaction types that may be edited.
    pub fn with_edit_handler(mut self, on_edit: impl Fn(EditRequest) + 'static) -> Self {
        self.on_edit = Some(Box::new(on_edit));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn environment(&self) -> EnvironmentType {
        self.environment
    }

    pub fn can_edit(&self) -> bool {
        self.on_edit.is_some()
    }

    pub fn focused_id(&self) -> Option<TxId> {
        self.state.borrow().focused_id()
    }

    /// The focused transaction as last seen by [`Self::mount`] or [`Self::sync`].
    pub fn focused(&self) -> Option<PendingTransaction> {
        self.state.borrow().focus.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn submit_error(&self) -> Option<String> {
        self.state.borrow().submit_error.clone()
    }

    pub fn custom_nonce(&self) -> Option<u64> {
        self.state.borrow().custom_nonce()
    }

    pub fn next_nonce(&self) -> Option<u64> {
        self.state.borrow().next_nonce
    }

    pub fn nonce_warning(&self) -> Option<String> {
        self.state.borrow().nonce_warning.clone()
    }

    pub fn gas_price_warning(&self) -> bool {
        self.state.borrow().gas_price_warning
    }

    pub fn gas_draft(&self) -> Option<GasCustomization> {
        self.state.borrow().gas_draft
    }

    /// Gas values to compute fees with: the draft while editing, else the tx's.
    pub fn gas_in_effect(&self) -> Option<GasCustomization> {
        let state = self.state.borrow();
        state
            .gas_draft
            .or_else(|| state.focus.as_ref().map(|tx| GasCustomization::from(&tx.params)))
    }

    pub fn resolved_name(&self, address: &Address) -> Option<String> {
        self.state.borrow().resolved_names.get(address).cloned()
    }

    pub fn unload_guard_armed(&self) -> bool {
        self.state.borrow().unload_guard_armed
    }

    pub fn polling_token(&self) -> Option<PollingToken> {
        self.state.borrow().polling_token.clone()
    }

    pub fn gas_missing_acknowledged(&self) -> bool {
        self.state.borrow().gas_missing_acknowledged
    }

    pub fn most_recent_overview(&self) -> Route {
        self.state.borrow().most_recent_overview
    }

    /// Records where decisions should land, e.g. the tab the user came from.
    pub fn set_most_recent_overview(&self, route: Route) {
        self.state.borrow_mut().most_recent_overview = route;
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Focuses `tx` and starts the effects tied to it.
    ///
    /// Any previous focus is unmounted first.
    pub async fn mount(&self, tx: &PendingTransaction) {
        if self.focused_id().is_some() {
            self.unmount();
        }

        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.focus = Some(tx.clone());
            state.phase = Phase::Reviewing;
            state.submit_error = None;
            state.gas_draft = None;
            state.gas_missing_acknowledged = false;
            state.observed_gas_price_failure = None;
            state.unload_guard_armed = self.environment.is_notification();
            state.refresh_nonce_warning();
            state.generation
        };
        debug!("mounted tx {} (generation {generation})", tx.id);

        self.telemetry
            .emit(TelemetryEvent::confirm_started(&tx.origin));

        match self.backend.start_gas_fee_polling().await {
            Ok(token) => self.hold_polling_token(generation, token),
            Err(e) => warn!("could not start gas fee polling: {e}"),
        }

        self.refresh_next_nonce(generation).await;

        if let Some(to) = tx.params.to {
            self.resolve_name(to).await;
        }
    }

    fn hold_polling_token(&self, generation: u64, token: PollingToken) {
        let stale = {
            let mut state = self.state.borrow_mut();
            if state.generation == generation && state.polling_token.is_none() {
                state.polling_token = Some(token);
                None
            } else {
                Some(token)
            }
        };
        if let Some(token) = stale {
            debug!("releasing polling token {token} from an earlier focus");
            self.backend.stop_gas_fee_polling(token);
        }
    }

    async fn refresh_next_nonce(&self, generation: u64) {
        match self.backend.next_nonce().await {
            Ok(next) => {
                let mut state = self.state.borrow_mut();
                if state.generation == generation {
                    state.next_nonce = Some(next);
                    state.refresh_nonce_warning();
                }
            }
            Err(e) => warn!("could not fetch next nonce: {e}"),
        }
    }

    async fn resolve_name(&self, address: Address) {
        if self.state.borrow().resolved_names.contains_key(&address) {
            return;
        }
        if let Some(name) = self.names.reverse_resolve(address).await {
            self.state.borrow_mut().resolved_names.insert(address, name);
        }
    }

    /// Releases everything [`Self::mount`] acquired and drops the focus.
    ///
    /// Safe to call repeatedly; also runs when the coordinator is dropped.
    pub fn unmount(&self) {
        let token = {
            let mut state = self.state.borrow_mut();
            if let Some(id) = state.focused_id() {
                state.custom_nonces.clear(id);
                debug!("unmounted tx {id}");
            }
            state.generation += 1;
            state.focus = None;
            state.phase = Phase::Idle;
            state.unload_guard_armed = false;
            state.gas_draft = None;
            state.next_nonce = None;
            state.nonce_warning = None;
            state.polling_token.take()
        };
        if let Some(token) = token {
            self.backend.stop_gas_fee_polling(token);
        }
    }

    fn leave(&self, route: Route) {
        self.unmount();
        self.router.navigate(route);
    }

    /// The hosting window is closing. Rejects the focused transaction when the
    /// unload guard is armed.
    pub async fn handle_window_unload(&self) {
        let target = {
            let mut state = self.state.borrow_mut();
            if !state.unload_guard_armed {
                return;
            }
            state.unload_guard_armed = false;
            state.focus.as_ref().map(|tx| (tx.id, tx.origin.clone()))
        };
        let Some((id, origin)) = target else {
            return;
        };

        self.telemetry
            .emit(TelemetryEvent::cancel_via_notification_close(&origin));
        if let Err(e) = self.backend.cancel(id).await {
            warn!("cancelling tx {id} on window close failed: {e}");
        }
    }

    /// Reacts to a fresh backend snapshot.
    pub async fn sync(&self, snapshot: &WalletState) {
        let Some(id) = self.focused_id() else {
            return;
        };
        let Some(tx) = snapshot.transaction(id) else {
            return;
        };

        let (generation, new_recipient, settled) = {
            let mut state = self.state.borrow_mut();
            let previous = state.focus.replace(tx.clone());

            let previous_to = previous.as_ref().and_then(|p| p.params.to);
            let new_recipient = tx.params.to.filter(|to| Some(*to) != previous_to);

            if state.observed_gas_price_failure != Some(snapshot.gas_price_fetch_failed) {
                state.observed_gas_price_failure = Some(snapshot.gas_price_fetch_failed);
                state.gas_price_warning = snapshot.gas_price_fetch_failed;
            }

            if snapshot.next_nonce.is_some() && snapshot.next_nonce != state.next_nonce {
                state.next_nonce = snapshot.next_nonce;
                state.refresh_nonce_warning();
            }

            let status_changed = previous.map(|p| p.status) != Some(tx.status);
            let settled =
                status_changed && tx.status.is_settled() && !state.phase.is_acknowledging();
            if settled {
                state.phase = Phase::Acknowledging;
            }

            (state.generation, new_recipient, settled)
        };

        if let Some(to) = new_recipient {
            self.resolve_name(to).await;
        }

        if settled {
            info!("tx {id} is {}", tx.status);
            self.dialogs.acknowledge_confirmed().await;
            if self.generation() == generation {
                self.leave(Route::activity());
            }
        }
    }

    /// Hands the focused transaction to the edit flow, when one was supplied.
    pub fn handle_edit(&self) {
        let Some(on_edit) = &self.on_edit else {
            return;
        };
        let Some(transaction) = self.focused() else {
            return;
        };

        self.telemetry
            .emit(TelemetryEvent::edit_transaction(&transaction.origin));
        let token_data = transaction.token_data.clone();
        on_edit(EditRequest {
            transaction,
            token_data,
        });
    }

    pub async fn handle_cancel(&self) {
        let Some(id) = self.focused_id() else {
            return;
        };
        {
            let mut state = self.state.borrow_mut();
            state.unload_guard_armed = false;
            state.custom_nonces.clear(id);
            state.refresh_nonce_warning();
        }

        if let Err(e) = self.backend.cancel(id).await {
            warn!("cancelling tx {id} failed: {e}");
        }
        self.leave(self.most_recent_overview());
    }

    /// Rejects every unapproved transaction on the focused transaction's chain
    /// after the user confirms. Returns whether anything was rejected.
    pub async fn handle_cancel_all(&self) -> bool {
        let Some(chain_id) = self.state.borrow().focus.as_ref().map(|tx| tx.chain_id) else {
            return false;
        };

        let pending = match self.backend.pending_transactions(chain_id).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("could not list pending transactions: {e}");
                return false;
            }
        };
        let ids: Vec<TxId> = pending
            .iter()
            .filter(|tx| tx.status.is_unapproved())
            .map(|tx| tx.id)
            .collect();
        if ids.is_empty() {
            return false;
        }

        if !self.dialogs.confirm_reject_all(ids.len()).await {
            return false;
        }

        {
            let mut state = self.state.borrow_mut();
            state.unload_guard_armed = false;
            for id in &ids {
                state.custom_nonces.clear(*id);
            }
            state.refresh_nonce_warning();
        }

        let count = ids.len();
        if let Err(e) = self.backend.cancel_all(ids).await {
            warn!("rejecting {count} transactions failed: {e}");
        }
        self.leave(self.most_recent_overview());
        true
    }

    /// Approves the focused transaction. A second call while one is in
    /// flight returns [`SubmitOutcome::AlreadySubmitting`] without touching
    /// the backend.
    pub async fn handle_submit(&self) -> SubmitOutcome {
        if self.submitting.get() {
            return SubmitOutcome::AlreadySubmitting;
        }
        let Some(id) = self.focused_id() else {
            return SubmitOutcome::NoFocus;
        };

        self.submitting.set(true);
        let (generation, custom_nonce) = {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Submitting;
            state.submit_error = None;
            state.unload_guard_armed = false;
            (state.generation, state.custom_nonces.get(id))
        };

        let result = self.backend.approve(id, custom_nonce).await;
        self.submitting.set(false);

        let still_focused = self.generation() == generation;
        {
            let mut state = self.state.borrow_mut();
            state.custom_nonces.clear(id);
            if still_focused {
                state.refresh_nonce_warning();
            }
        }

        match result {
            Ok(()) => {
                info!("tx {id} approved");
                if still_focused {
                    self.leave(self.most_recent_overview());
                }
                SubmitOutcome::Approved
            }
            Err(e) => {
                let message = e.to_string();
                warn!("approving tx {id} failed: {message}");
                if still_focused {
                    let mut state = self.state.borrow_mut();
                    state.phase = Phase::Reviewing;
                    state.submit_error = Some(message.clone());
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Opens gas editing with a draft of the current values.
    ///
    /// `action_key` is the caller's classification of the request, if any.
    pub fn handle_edit_gas(&self, action_key: Option<&str>) {
        let Some(tx) = self.focused() else {
            return;
        };

        let function_type = method::function_type(action_key, &tx.params.data);
        self.telemetry
            .emit(TelemetryEvent::edit_gas(&tx.origin, &function_type));
        self.state.borrow_mut().gas_draft = Some(GasCustomization::from(&tx.params));
    }

    /// Replaces the draft. Ignored unless gas editing is open.
    pub fn update_gas_draft(&self, gas: GasCustomization) {
        let mut state = self.state.borrow_mut();
        if state.gas_draft.is_some() {
            state.gas_draft = Some(gas);
        }
    }

    pub fn close_edit_gas(&self) {
        self.state.borrow_mut().gas_draft = None;
    }

    /// Commits the draft to the backend and closes gas editing.
    ///
    /// On failure the draft stays open.
    pub async fn save_gas_draft(&self) -> Result<(), ApiError> {
        let target = {
            let state = self.state.borrow();
            state.focused_id().zip(state.gas_draft)
        };
        let Some((id, gas)) = target else {
            return Ok(());
        };

        self.backend.update_gas_fees(id, gas).await?;

        let mut state = self.state.borrow_mut();
        if state.focused_id() == Some(id) {
            if let Some(tx) = state.focus.as_mut() {
                tx.params.gas_limit = gas.gas_limit;
                tx.params.pricing = gas.pricing;
            }
            state.gas_draft = None;
        }
        Ok(())
    }

    /// Applies raw nonce-field input to the focused transaction.
    pub async fn set_custom_nonce_input(&self, input: &str) {
        let generation = {
            let mut state = self.state.borrow_mut();
            let Some(id) = state.focused_id() else {
                return;
            };
            state
                .custom_nonces
                .set(id, parse_custom_nonce_input(input));
            state.refresh_nonce_warning();
            state.generation
        };
        self.refresh_next_nonce(generation).await;
    }

    /// The user chose to proceed despite a predicted failure.
    pub fn acknowledge_gas_missing(&self) {
        self.state.borrow_mut().gas_missing_acknowledged = true;
    }

    /// Moves focus to `target`. No-op at an edge, where there is no target.
    pub fn handle_next_tx(&self, target: Option<TxId>) {
        let Some(target) = target else {
            return;
        };
        self.leave(Route::Confirm(target));
    }
}

impl<B, N, T, R, D> Drop for ConfirmationCoordinator<B, N, T, R, D>
where
    B: TransactionBackend,
    N: NameResolver,
    T: Telemetry,
    R: Router,
    D: Dialogs,
{
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::rc::Rc;

    use alloy_primitives::U256;

    use super::*;
    use crate::method::CONTRACT_INTERACTION;
    use crate::native_amount::gwei;
    use crate::navigation::tests::pending;
    use crate::tx::ChainId;
    use crate::tx::GasPricing;
    use crate::tx::TxStatus;

    #[derive(Clone, Default)]
    pub(crate) struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Recorder {
        pub(crate) fn log(&self, entry: impl Into<String>) {
            self.0.borrow_mut().push(entry.into());
        }

        pub(crate) fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }

        pub(crate) fn count(&self, prefix: &str) -> usize {
            self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
        }

        pub(crate) fn position(&self, entry: &str) -> Option<usize> {
            self.0.borrow().iter().position(|e| e == entry)
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeBackend {
        pub(crate) log: Recorder,
        pub(crate) transactions: Rc<RefCell<Vec<PendingTransaction>>>,
        pub(crate) next_nonce: Rc<Cell<u64>>,
        pub(crate) approve_error: Rc<RefCell<Option<String>>>,
        pub(crate) cancel_fails: Rc<Cell<bool>>,
        pub(crate) tokens_issued: Rc<Cell<u64>>,
    }

    impl FakeBackend {
        pub(crate) fn set_status(&self, id: TxId, status: TxStatus) {
            for tx in self.transactions.borrow_mut().iter_mut() {
                if tx.id == id {
                    tx.status = status;
                }
            }
        }

        pub(crate) fn unapproved_on(&self, chain_id: ChainId) -> usize {
            self.transactions
                .borrow()
                .iter()
                .filter(|tx| tx.chain_id == chain_id && tx.status.is_unapproved())
                .count()
        }
    }

    impl TransactionBackend for FakeBackend {
        async fn pending_transactions(
            &self,
            chain_id: ChainId,
        ) -> Result<Vec<PendingTransaction>, ApiError> {
            Ok(self
                .transactions
                .borrow()
                .iter()
                .filter(|tx| tx.chain_id == chain_id && tx.status.is_unapproved())
                .cloned()
                .collect())
        }

        async fn approve(&self, id: TxId, custom_nonce: Option<u64>) -> Result<(), ApiError> {
            self.log.log(format!("approve {id} nonce={custom_nonce:?}"));
            tokio::task::yield_now().await;
            if let Some(message) = self.approve_error.borrow().clone() {
                return Err(anyhow::anyhow!(message));
            }
            self.set_status(id, TxStatus::Approved);
            Ok(())
        }

        async fn cancel(&self, id: TxId) -> Result<(), ApiError> {
            self.log.log(format!("cancel {id}"));
            tokio::task::yield_now().await;
            if self.cancel_fails.get() {
                anyhow::bail!("backend unavailable");
            }
            self.set_status(id, TxStatus::Rejected);
            Ok(())
        }

        async fn cancel_all(&self, ids: Vec<TxId>) -> Result<(), ApiError> {
            self.log.log(format!("cancel_all {}", ids.len()));
            for id in ids {
                self.set_status(id, TxStatus::Rejected);
            }
            Ok(())
        }

        async fn next_nonce(&self) -> Result<u64, ApiError> {
            self.log.log("next_nonce");
            Ok(self.next_nonce.get())
        }

        async fn update_gas_fees(&self, id: TxId, gas: GasCustomization) -> Result<(), ApiError> {
            self.log.log(format!("update_gas {id} {}", gas.gas_limit));
            Ok(())
        }

        async fn start_gas_fee_polling(&self) -> Result<PollingToken, ApiError> {
            self.tokens_issued.set(self.tokens_issued.get() + 1);
            let token = PollingToken(format!("poll-{}", self.tokens_issued.get()));
            self.log.log(format!("start_polling {token}"));
            Ok(token)
        }

        fn stop_gas_fee_polling(&self, token: PollingToken) {
            self.log.log(format!("stop_polling {token}"));
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeNames {
        pub(crate) log: Recorder,
        pub(crate) names: Rc<RefCell<HashMap<Address, String>>>,
    }

    impl NameResolver for FakeNames {
        async fn reverse_resolve(&self, address: Address) -> Option<String> {
            self.log.log(format!("resolve {address}"));
            self.names.borrow().get(&address).cloned()
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeTelemetry {
        pub(crate) log: Recorder,
        pub(crate) events: Rc<RefCell<Vec<TelemetryEvent>>>,
    }

    impl Telemetry for FakeTelemetry {
        fn emit(&self, event: TelemetryEvent) {
            self.log.log(format!("telemetry {}", event.event));
            self.events.borrow_mut().push(event);
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeRouter {
        pub(crate) log: Recorder,
    }

    impl Router for FakeRouter {
        fn navigate(&self, route: Route) {
            self.log.log(format!("navigate {route}"));
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeDialogs {
        pub(crate) log: Recorder,
        pub(crate) reject_all_answer: Rc<Cell<bool>>,
    }

    impl Dialogs for FakeDialogs {
        async fn confirm_reject_all(&self, count: usize) -> bool {
            self.log.log(format!("confirm_reject_all {count}"));
            self.reject_all_answer.get()
        }

        async fn acknowledge_confirmed(&self) {
            self.log.log("acknowledge_confirmed");
        }
    }

    pub(crate) type TestCoordinator =
        ConfirmationCoordinator<FakeBackend, FakeNames, FakeTelemetry, FakeRouter, FakeDialogs>;

    pub(crate) struct Harness {
        pub(crate) log: Recorder,
        pub(crate) backend: FakeBackend,
        pub(crate) names: FakeNames,
        pub(crate) telemetry: FakeTelemetry,
        pub(crate) dialogs: FakeDialogs,
        pub(crate) coordinator: TestCoordinator,
    }

    pub(crate) fn harness(environment: EnvironmentType, transactions: Vec<PendingTransaction>) -> Harness {
        let log = Recorder::default();
        let backend = FakeBackend {
            log: log.clone(),
            transactions: Rc::new(RefCell::new(transactions)),
            next_nonce: Rc::new(Cell::new(5)),
            ..Default::default()
        };
        let names = FakeNames {
            log: log.clone(),
            ..Default::default()
        };
        let telemetry = FakeTelemetry {
            log: log.clone(),
            ..Default::default()
        };
        let router = FakeRouter { log: log.clone() };
        let dialogs = FakeDialogs {
            log: log.clone(),
            reject_all_answer: Rc::new(Cell::new(true)),
        };
        let coordinator = ConfirmationCoordinator::new(
            backend.clone(),
            names.clone(),
            telemetry.clone(),
            router,
            dialogs.clone(),
            environment,
        );
        Harness {
            log,
            backend,
            names,
            telemetry,
            dialogs,
            coordinator,
        }
    }

    pub(crate) fn four_pending() -> Vec<PendingTransaction> {
        (1..=4).map(|id| pending(id, 1)).collect()
    }

    pub(crate) async fn mounted(environment: EnvironmentType) -> Harness {
        let h = harness(environment, four_pending());
        let tx = h.backend.transactions.borrow()[0].clone();
        h.coordinator.mount(&tx).await;
        h
    }

    #[tokio::test]
    async fn mount_starts_effects() {
        let h = harness(EnvironmentType::Notification, four_pending());
        let recipient = Address::repeat_byte(0x22);
        h.names
            .names
            .borrow_mut()
            .insert(recipient, "alice.eth".to_string());

        let tx = h.backend.transactions.borrow()[0].clone();
        h.coordinator.mount(&tx).await;

        assert_eq!(h.coordinator.focused_id(), Some(TxId(1)));
        assert!(h.coordinator.phase().is_reviewing());
        assert!(h.coordinator.unload_guard_armed());
        assert_eq!(h.coordinator.next_nonce(), Some(5));
        assert_eq!(h.coordinator.polling_token(), Some(PollingToken("poll-1".into())));
        assert_eq!(
            h.coordinator.resolved_name(&recipient).as_deref(),
            Some("alice.eth")
        );

        let events = h.telemetry.events.borrow();
        let started = &events[0];
        assert_eq!(started.event, "Confirm: Started");
        assert_eq!(started.property("origin"), Some("https://dapp.example"));
        assert_eq!(h.log.count("next_nonce"), 1);
    }

    #[tokio::test]
    async fn guard_is_only_armed_in_notification_windows() {
        let h = mounted(EnvironmentType::Popup).await;
        assert!(!h.coordinator.unload_guard_armed());

        h.coordinator.handle_window_unload().await;
        assert_eq!(h.log.count("cancel"), 0);
    }

    #[tokio::test]
    async fn closing_a_notification_window_rejects_the_focus() {
        let h = mounted(EnvironmentType::Notification).await;
        h.coordinator.handle_window_unload().await;

        assert_eq!(h.log.count("telemetry Cancel Tx Via Notification Close"), 1);
        assert_eq!(h.log.count("cancel 1"), 1);
        assert!(!h.coordinator.unload_guard_armed());

        // the guard fires once
        h.coordinator.handle_window_unload().await;
        assert_eq!(h.log.count("cancel 1"), 1);
    }

    #[tokio::test]
    async fn unmount_releases_everything() {
        let h = mounted(EnvironmentType::Notification).await;
        h.coordinator.handle_edit_gas(None);
        h.coordinator.set_custom_nonce_input("9").await;

        h.coordinator.unmount();

        assert_eq!(h.coordinator.focused_id(), None);
        assert!(h.coordinator.phase().is_idle());
        assert!(!h.coordinator.unload_guard_armed());
        assert_eq!(h.coordinator.gas_draft(), None);
        assert_eq!(h.coordinator.polling_token(), None);
        assert_eq!(h.log.count("stop_polling poll-1"), 1);

        h.coordinator.unmount();
        assert_eq!(h.log.count("stop_polling"), 1);
    }

    #[tokio::test]
    async fn dropping_the_coordinator_releases_polling() {
        let h = mounted(EnvironmentType::Popup).await;
        let Harness { log, coordinator, .. } = h;
        drop(coordinator);
        assert_eq!(log.count("stop_polling poll-1"), 1);
    }

    #[tokio::test]
    async fn refocusing_releases_the_previous_token() {
        let h = mounted(EnvironmentType::Popup).await;
        let second = h.backend.transactions.borrow()[1].clone();
        h.coordinator.mount(&second).await;

        assert_eq!(h.log.count("stop_polling poll-1"), 1);
        assert_eq!(h.coordinator.polling_token(), Some(PollingToken("poll-2".into())));
        assert_eq!(h.coordinator.focused_id(), Some(TxId(2)));
    }

    #[tokio::test]
    async fn submit_approves_and_leaves() {
        let h = mounted(EnvironmentType::Notification).await;
        h.coordinator.set_custom_nonce_input("7").await;
        assert_eq!(
            h.coordinator.nonce_warning().as_deref(),
            Some("Nonce is higher than suggested nonce of 5")
        );

        let outcome = h.coordinator.handle_submit().await;

        assert_eq!(outcome, SubmitOutcome::Approved);
        assert_eq!(h.log.count("approve 1 nonce=Some(7)"), 1);
        assert_eq!(h.log.count("navigate /"), 1);
        assert_eq!(h.coordinator.focused_id(), None);
        assert_eq!(h.coordinator.custom_nonce(), None);
        assert!(!h.coordinator.is_submitting());
        assert!(!h.coordinator.unload_guard_armed());
    }

    #[tokio::test]
    async fn failed_submit_stays_and_reports() {
        let h = mounted(EnvironmentType::Popup).await;
        *h.backend.approve_error.borrow_mut() = Some("nonce too low".to_string());
        h.coordinator.set_custom_nonce_input("3").await;

        let outcome = h.coordinator.handle_submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed("nonce too low".to_string()));
        assert_eq!(h.coordinator.submit_error().as_deref(), Some("nonce too low"));
        assert!(h.coordinator.phase().is_reviewing());
        assert_eq!(h.coordinator.focused_id(), Some(TxId(1)));
        assert_eq!(h.coordinator.custom_nonce(), None);
        assert_eq!(h.log.count("navigate"), 0);

        // a retry clears the stale message first
        *h.backend.approve_error.borrow_mut() = None;
        assert_eq!(h.coordinator.handle_submit().await, SubmitOutcome::Approved);
        assert_eq!(h.coordinator.submit_error(), None);
    }

    #[tokio::test]
    async fn concurrent_submits_approve_once() {
        let h = mounted(EnvironmentType::Popup).await;

        let (first, second) = tokio::join!(
            h.coordinator.handle_submit(),
            h.coordinator.handle_submit()
        );

        assert_eq!(first, SubmitOutcome::Approved);
        assert_eq!(second, SubmitOutcome::AlreadySubmitting);
        assert_eq!(h.log.count("approve"), 1);
    }

    #[tokio::test]
    async fn cancel_rejects_then_leaves() {
        let h = mounted(EnvironmentType::Notification).await;
        h.coordinator.set_custom_nonce_input("8").await;
        h.coordinator
            .set_most_recent_overview(Route::activity());

        h.coordinator.handle_cancel().await;

        let cancel = h.log.position("cancel 1").unwrap();
        let navigate = h.log.position("navigate /?tab=activity").unwrap();
        assert!(cancel < navigate);
        assert_eq!(h.coordinator.custom_nonce(), None);
        assert_eq!(h.coordinator.focused_id(), None);
        assert_eq!(h.backend.unapproved_on(1), 3);
    }

    #[tokio::test]
    async fn cancel_leaves_even_when_the_backend_fails() {
        let h = mounted(EnvironmentType::Popup).await;
        h.backend.cancel_fails.set(true);

        h.coordinator.handle_cancel().await;

        assert_eq!(h.log.count("navigate /"), 1);
        assert_eq!(h.coordinator.focused_id(), None);
    }

    #[tokio::test]
    async fn cancel_all_rejects_the_chain_after_confirmation() {
        let mut txs = four_pending();
        txs.push(pending(9, 5));
        let h = harness(EnvironmentType::Notification, txs);
        let tx = h.backend.transactions.borrow()[0].clone();
        h.coordinator.mount(&tx).await;

        assert!(h.coordinator.handle_cancel_all().await);

        assert_eq!(h.log.count("confirm_reject_all 4"), 1);
        assert_eq!(h.log.count("cancel_all 4"), 1);
        assert_eq!(h.backend.unapproved_on(1), 0);
        assert_eq!(h.backend.unapproved_on(5), 1);
        assert_eq!(h.log.count("navigate /"), 1);
        assert!(!h.coordinator.unload_guard_armed());
    }

    #[tokio::test]
    async fn declined_cancel_all_changes_nothing() {
        let h = mounted(EnvironmentType::Notification).await;
        h.dialogs.reject_all_answer.set(false);

        assert!(!h.coordinator.handle_cancel_all().await);

        assert_eq!(h.log.count("cancel_all"), 0);
        assert_eq!(h.log.count("navigate"), 0);
        assert!(h.coordinator.unload_guard_armed());
        assert_eq!(h.backend.unapproved_on(1), 4);
    }

    #[tokio::test]
    async fn edit_needs_a_handler() {
        let h = mounted(EnvironmentType::Popup).await;
        h.coordinator.handle_edit();
        assert_eq!(h.log.count("telemetry Edit Transaction"), 0);

        let received = Rc::new(RefCell::new(None));
        let sink = received.clone();
        let Harness {
            log, coordinator, ..
        } = h;
        let coordinator = coordinator.with_edit_handler(move |request| {
            *sink.borrow_mut() = Some(request);
        });
        assert!(coordinator.can_edit());
        coordinator.handle_edit();

        assert_eq!(log.count("telemetry Edit Transaction"), 1);
        let request = received.borrow_mut().take().unwrap();
        assert_eq!(request.transaction.id, TxId(1));
        assert_eq!(request.token_data, None);
    }

    #[tokio::test]
    async fn edit_gas_reports_the_classification() {
        let h = mounted(EnvironmentType::Popup).await;

        h.coordinator.handle_edit_gas(None);
        h.coordinator.handle_edit_gas(Some("swap"));

        let events = h.telemetry.events.borrow();
        let edits: Vec<_> = events
            .iter()
            .filter(|e| e.event == "User clicks \"Edit\" on gas")
            .collect();
        assert_eq!(edits[0].property("function_type"), Some(CONTRACT_INTERACTION));
        assert_eq!(edits[1].property("function_type"), Some("swap"));
        assert_eq!(edits[0].property("origin"), Some("https://dapp.example"));
    }

    #[tokio::test]
    async fn gas_draft_is_committed_only_on_save() {
        let h = mounted(EnvironmentType::Popup).await;
        let edited = GasCustomization {
            gas_limit: 100_000,
            pricing: GasPricing::Legacy { gas_price: gwei(8) },
        };

        // no editing surface open yet
        h.coordinator.update_gas_draft(edited);
        assert_eq!(h.coordinator.gas_draft(), None);

        h.coordinator.handle_edit_gas(None);
        h.coordinator.update_gas_draft(edited);
        assert_eq!(h.coordinator.gas_in_effect(), Some(edited));

        h.coordinator.close_edit_gas();
        assert_eq!(h.coordinator.gas_in_effect().unwrap().gas_limit, 21_000);
        assert_eq!(h.log.count("update_gas"), 0);

        h.coordinator.handle_edit_gas(None);
        h.coordinator.update_gas_draft(edited);
        h.coordinator.save_gas_draft().await.unwrap();

        assert_eq!(h.log.count("update_gas 1 100000"), 1);
        assert_eq!(h.coordinator.gas_draft(), None);
        assert_eq!(h.coordinator.gas_in_effect(), Some(edited));
    }

    #[tokio::test]
    async fn nonce_input_is_sanitised() {
        let h = mounted(EnvironmentType::Popup).await;

        h.coordinator.set_custom_nonce_input("4.7").await;
        assert_eq!(h.coordinator.custom_nonce(), Some(4));
        assert_eq!(h.coordinator.nonce_warning(), None);

        h.coordinator.set_custom_nonce_input("-3").await;
        assert_eq!(h.coordinator.custom_nonce(), None);

        // every edit refreshes the suggestion as well
        assert_eq!(h.log.count("next_nonce"), 3);
    }

    #[tokio::test]
    async fn next_tx_moves_focus() {
        let h = mounted(EnvironmentType::Popup).await;

        h.coordinator.handle_next_tx(None);
        assert_eq!(h.coordinator.focused_id(), Some(TxId(1)));
        assert_eq!(h.log.count("navigate"), 0);

        h.coordinator.handle_next_tx(Some(TxId(3)));
        assert_eq!(h.coordinator.focused_id(), None);
        assert_eq!(h.log.count("navigate /confirm-transaction/3"), 1);
        assert_eq!(h.log.count("stop_polling"), 1);
    }

    pub(crate) fn snapshot(h: &Harness) -> WalletState {
        WalletState {
            chain_id: 1,
            transactions: h.backend.transactions.borrow().clone(),
            next_nonce: Some(h.backend.next_nonce.get()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn confirmed_status_is_acknowledged_once() {
        let h = mounted(EnvironmentType::Popup).await;
        h.backend.set_status(TxId(1), TxStatus::Confirmed);
        let state = snapshot(&h);

        h.coordinator.sync(&state).await;
        h.coordinator.sync(&state).await;

        assert_eq!(h.log.count("acknowledge_confirmed"), 1);
        assert_eq!(h.log.count("navigate /?tab=activity"), 1);
        assert_eq!(h.coordinator.focused_id(), None);
    }

    #[tokio::test]
    async fn dropped_status_is_acknowledged_too() {
        let h = mounted(EnvironmentType::Notification).await;
        h.backend.set_status(TxId(1), TxStatus::Dropped);
        let state = snapshot(&h);

        h.coordinator.sync(&state).await;
        h.coordinator.sync(&state).await;

        assert_eq!(h.log.count("acknowledge_confirmed"), 1);
        assert_eq!(h.log.count("navigate /?tab=activity"), 1);
        assert_eq!(h.coordinator.focused_id(), None);
        assert_eq!(h.log.count("cancel"), 0);
    }

    #[tokio::test]
    async fn sync_keeps_focus_when_the_transaction_is_missing() {
        let h = mounted(EnvironmentType::Popup).await;
        let mut state = snapshot(&h);
        state.transactions.retain(|tx| tx.id != TxId(1));
        state.gas_price_fetch_failed = true;

        h.coordinator.sync(&state).await;

        assert_eq!(h.coordinator.focused_id(), Some(TxId(1)));
        assert!(!h.coordinator.gas_price_warning());
        assert_eq!(h.log.count("acknowledge_confirmed"), 0);
        assert_eq!(h.log.count("navigate"), 0);
    }

    #[tokio::test]
    async fn sync_tracks_gas_price_nonce_and_recipient() {
        let h = mounted(EnvironmentType::Popup).await;
        h.coordinator.set_custom_nonce_input("6").await;
        assert!(h.coordinator.nonce_warning().is_some());

        let mut state = snapshot(&h);
        state.gas_price_fetch_failed = true;
        state.next_nonce = Some(6);
        let new_recipient = Address::repeat_byte(0x77);
        state.transactions[0].params.to = Some(new_recipient);
        h.coordinator.sync(&state).await;

        assert!(h.coordinator.gas_price_warning());
        assert_eq!(h.coordinator.next_nonce(), Some(6));
        assert_eq!(h.coordinator.nonce_warning(), None);
        assert_eq!(h.log.count(&format!("resolve {new_recipient}")), 1);

        state.gas_price_fetch_failed = false;
        h.coordinator.sync(&state).await;
        assert!(!h.coordinator.gas_price_warning());
        assert_eq!(h.log.count(&format!("resolve {new_recipient}")), 1);
    }

    #[tokio::test]
    async fn gas_missing_acknowledgment_resets_per_focus() {
        let h = mounted(EnvironmentType::Popup).await;
        h.coordinator.acknowledge_gas_missing();
        assert!(h.coordinator.gas_missing_acknowledged());

        let second = h.backend.transactions.borrow()[1].clone();
        h.coordinator.mount(&second).await;
        assert!(!h.coordinator.gas_missing_acknowledged());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn rejecting_all_four_empties_the_in_memory_chain() {
        use crate::controller::MemoryTxController;
        use crate::tx::TxParams;

        let controller = MemoryTxController::new(1);
        for value in 1..=4u64 {
            let params = TxParams {
                value: U256::from(value),
                ..pending(value, 1).params
            };
            controller.add_transaction("https://dapp.example", 1, params).await;
        }
        let first = controller.pending(1).await.remove(0);

        let log = Recorder::default();
        let coordinator = ConfirmationCoordinator::new(
            controller,
            FakeNames {
                log: log.clone(),
                ..Default::default()
            },
            FakeTelemetry {
                log: log.clone(),
                ..Default::default()
            },
            FakeRouter { log: log.clone() },
            FakeDialogs {
                log: log.clone(),
                reject_all_answer: Rc::new(Cell::new(true)),
            },
            EnvironmentType::Popup,
        );
        coordinator.mount(&first).await;
        assert_eq!(coordinator.backend().active_polling_count(), 1);

        assert!(coordinator.handle_cancel_all().await);

        assert!(coordinator.backend().pending(1).await.is_empty());
        assert_eq!(coordinator.backend().active_polling_count(), 0);
        assert_eq!(log.entries().last().map(String::as_str), Some("navigate /"));
    }
}
