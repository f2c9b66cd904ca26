//! The confirmation coordinator's capabilities, implemented over the server
//! functions and the UI's own signals.

use alloy_primitives::Address;
use api::backend::Dialogs;
use api::backend::NameResolver;
use api::backend::PollingToken;
use api::backend::Router;
use api::backend::TransactionBackend;
use api::coordinator::ConfirmationCoordinator;
use api::route::Route;
use api::telemetry::LogTelemetry;
use api::tx::ChainId;
use api::tx::GasCustomization;
use api::tx::PendingTransaction;
use api::tx::TxId;
use api::ApiError;
use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use dioxus_logger::tracing::warn;
use tokio::sync::oneshot;

use crate::Screen;

pub type UiCoordinator =
    ConfirmationCoordinator<ServerBackend, ServerNames, LogTelemetry, SignalRouter, SignalDialogs>;

/// Calls the transaction controller through the fullstack server functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerBackend;

impl TransactionBackend for ServerBackend {
    async fn pending_transactions(
        &self,
        chain_id: ChainId,
    ) -> Result<Vec<PendingTransaction>, ApiError> {
        api::pending_transactions(chain_id).await
    }

    async fn approve(&self, id: TxId, custom_nonce: Option<u64>) -> Result<(), ApiError> {
        api::approve_transaction(id, custom_nonce).await
    }

    async fn cancel(&self, id: TxId) -> Result<(), ApiError> {
        api::cancel_transaction(id).await
    }

    async fn cancel_all(&self, ids: Vec<TxId>) -> Result<(), ApiError> {
        api::cancel_all_transactions(ids).await.map(|_| ())
    }

    async fn next_nonce(&self) -> Result<u64, ApiError> {
        api::next_nonce().await
    }

    async fn update_gas_fees(&self, id: TxId, gas: GasCustomization) -> Result<(), ApiError> {
        api::update_gas_fees(id, gas).await
    }

    async fn start_gas_fee_polling(&self) -> Result<PollingToken, ApiError> {
        api::start_gas_fee_polling().await
    }

    /// Runs detached so it also works while the screen is being torn down.
    fn stop_gas_fee_polling(&self, token: PollingToken) {
        let _ = spawn_forever(async move {
            if let Err(e) = api::stop_gas_fee_polling(token.clone()).await {
                warn!("failed to stop gas fee polling {token}: {e}");
            }
        });
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerNames;

impl NameResolver for ServerNames {
    async fn reverse_resolve(&self, address: Address) -> Option<String> {
        match api::reverse_resolve(address).await {
            Ok(name) => name,
            Err(e) => {
                warn!("reverse lookup of {address} failed: {e}");
                None
            }
        }
    }
}

/// Navigates by replacing the active screen.
#[derive(Clone, Copy)]
pub struct SignalRouter {
    pub screen: Signal<Screen>,
}

impl Router for SignalRouter {
    fn navigate(&self, route: Route) {
        let mut screen = self.screen;
        screen.set(Screen::from(route));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Reject this many unapproved transactions?
    RejectAll(usize),
    /// The focused transaction was confirmed or dropped elsewhere.
    Settled,
}

/// A question waiting for the user. Answering consumes it.
#[derive(Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    reply: oneshot::Sender<bool>,
}

impl Prompt {
    pub fn answer(self, yes: bool) {
        let _ = self.reply.send(yes);
    }
}

/// Shows prompts through a signal that the screen renders as a modal.
#[derive(Clone, Copy)]
pub struct SignalDialogs {
    pub prompt: Signal<Option<Prompt>>,
}

impl SignalDialogs {
    /// Replacing an unanswered prompt drops its sender, which reads as "no".
    async fn ask(&self, kind: PromptKind) -> bool {
        let (reply, answer) = oneshot::channel();
        let mut prompt = self.prompt;
        prompt.set(Some(Prompt { kind, reply }));
        answer.await.unwrap_or(false)
    }
}

impl Dialogs for SignalDialogs {
    async fn confirm_reject_all(&self, count: usize) -> bool {
        self.ask(PromptKind::RejectAll(count)).await
    }

    async fn acknowledge_confirmed(&self) {
        self.ask(PromptKind::Settled).await;
    }
}
