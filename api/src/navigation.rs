//! Position of the focused transaction among the pending ones.

use serde::Deserialize;
use serde::Serialize;

use crate::tx::ChainId;
use crate::tx::PendingTransaction;
use crate::tx::TxId;

/// Derived on every call; never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Navigation {
    /// Unapproved ids on the active chain, in backend order.
    pub ids: Vec<TxId>,
    /// 1-indexed; `None` when the current id is not in `ids`.
    pub position: Option<usize>,
    pub prev: Option<TxId>,
    pub next: Option<TxId>,
    pub first: Option<TxId>,
    pub last: Option<TxId>,
}

impl Navigation {
    /// Builds the index for `current` over `pending`, keeping only
    /// unapproved transactions on `chain_id`.
    pub fn compute(pending: &[PendingTransaction], chain_id: ChainId, current: TxId) -> Self {
        let ids: Vec<TxId> = pending
            .iter()
            .filter(|tx| tx.chain_id == chain_id && tx.status.is_unapproved())
            .map(|tx| tx.id)
            .collect();

        let index = ids.iter().position(|id| *id == current);
        let (prev, next) = match index {
            Some(i) => (
                i.checked_sub(1).and_then(|p| ids.get(p)).copied(),
                ids.get(i + 1).copied(),
            ),
            None => (None, None),
        };

        Self {
            position: index.map(|i| i + 1),
            prev,
            next,
            first: ids.first().copied(),
            last: ids.last().copied(),
            ids,
        }
    }

    pub fn total(&self) -> usize {
        self.ids.len()
    }

    pub fn show_navigation(&self) -> bool {
        self.total() > 1
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloy_primitives::Address;
    use alloy_primitives::U256;

    use super::*;
    use crate::tx::GasPricing;
    use crate::tx::TxParams;
    use crate::tx::TxStatus;

    pub(crate) fn pending(id: u64, chain_id: ChainId) -> PendingTransaction {
        PendingTransaction {
            id: TxId(id),
            origin: "https://dapp.example".into(),
            time: 1_700_000_000_000 + id,
            chain_id,
            status: TxStatus::Unapproved,
            params: TxParams {
                from: Address::repeat_byte(0x11),
                to: Some(Address::repeat_byte(0x22)),
                value: U256::ZERO,
                gas_limit: 21_000,
                pricing: GasPricing::Legacy {
                    gas_price: U256::from(1_000_000_000u64),
                },
                nonce: None,
                data: Default::default(),
            },
            simulation_failure: None,
            user_fee_level: None,
            token_data: None,
        }
    }

    #[test]
    fn focusing_the_second_of_four() {
        let txs: Vec<_> = (1..=4).map(|id| pending(id, 1)).collect();
        let nav = Navigation::compute(&txs, 1, TxId(2));

        assert_eq!(nav.total(), 4);
        assert_eq!(nav.position, Some(2));
        assert_eq!(nav.prev, Some(TxId(1)));
        assert_eq!(nav.next, Some(TxId(3)));
        assert_eq!(nav.first, Some(TxId(1)));
        assert_eq!(nav.last, Some(TxId(4)));
        assert!(nav.show_navigation());
    }

    #[test]
    fn other_chains_and_statuses_are_excluded() {
        let mut txs = vec![pending(1, 1), pending(2, 5), pending(3, 1), pending(4, 1)];
        txs[3].status = TxStatus::Submitted;

        let nav = Navigation::compute(&txs, 1, TxId(3));
        assert_eq!(nav.ids, vec![TxId(1), TxId(3)]);
        assert_eq!(nav.position, Some(2));
        assert_eq!(nav.next, None);
        assert_eq!(nav.last, Some(TxId(3)));
    }

    #[test]
    fn position_is_within_bounds_for_every_member() {
        let txs: Vec<_> = (10..17).map(|id| pending(id, 1)).collect();
        for tx in &txs {
            let nav = Navigation::compute(&txs, 1, tx.id);
            assert_eq!(nav.total(), txs.len());
            let position = nav.position.unwrap();
            assert!((1..=txs.len()).contains(&position));
        }
    }

    #[test]
    fn edges_have_no_neighbour() {
        let txs: Vec<_> = (1..=3).map(|id| pending(id, 1)).collect();
        assert_eq!(Navigation::compute(&txs, 1, TxId(1)).prev, None);
        assert_eq!(Navigation::compute(&txs, 1, TxId(3)).next, None);
    }

    #[test]
    fn absent_current_has_no_position() {
        let txs: Vec<_> = (1..=3).map(|id| pending(id, 1)).collect();
        let nav = Navigation::compute(&txs, 1, TxId(99));
        assert_eq!(nav.position, None);
        assert_eq!(nav.prev, None);
        assert_eq!(nav.next, None);
        assert_eq!(nav.first, Some(TxId(1)));
    }

    #[test]
    fn single_transaction_hides_navigation() {
        let txs = vec![pending(1, 1)];
        let nav = Navigation::compute(&txs, 1, TxId(1));
        assert_eq!(nav.position, Some(1));
        assert!(!nav.show_navigation());
    }
}
