//! Contract method classification from call data.

use alloy_primitives::Address;
use alloy_sol_types::sol;
use alloy_sol_types::SolCall;

use crate::tx::TokenData;

/// Classification used when the selector is not recognised.
pub const CONTRACT_INTERACTION: &str = "contractInteraction";

sol! {
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
        function transferFrom(address from, address to, uint256 value) external returns (bool);
        function approve(address spender, uint256 value) external returns (bool);
    }

    interface IERC721 {
        function setApprovalForAll(address operator, bool approved) external;
    }
}

const KNOWN_METHODS: &[([u8; 4], &str)] = &[
    (IERC20::transferCall::SELECTOR, "transfer"),
    (IERC20::transferFromCall::SELECTOR, "transferFrom"),
    (IERC20::approveCall::SELECTOR, "approve"),
    (IERC721::setApprovalForAllCall::SELECTOR, "setApprovalForAll"),
];

fn selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4)?.try_into().ok()
}

/// Name of the contract method `data` calls, when recognised.
pub fn method_name(data: &[u8]) -> Option<&'static str> {
    let selector = selector(data)?;
    KNOWN_METHODS
        .iter()
        .find(|(known, _)| *known == selector)
        .map(|(_, name)| *name)
}

/// Functional classification reported with gas-edit telemetry.
///
/// An explicit action key wins, then the decoded method name.
pub fn function_type(action_key: Option<&str>, data: &[u8]) -> String {
    action_key
        .or_else(|| method_name(data))
        .unwrap_or(CONTRACT_INTERACTION)
        .to_string()
}

/// Decodes an ERC-20 style transfer or approval sent to `token`.
///
/// Arguments are validated, so a short or malformed payload yields `None`.
pub fn decode_token_data(token: Address, data: &[u8]) -> Option<TokenData> {
    let method = method_name(data)?;

    let (recipient, amount) = match method {
        "transfer" => {
            let call = IERC20::transferCall::abi_decode_validate(data).ok()?;
            (call.to, call.value)
        }
        "approve" => {
            let call = IERC20::approveCall::abi_decode_validate(data).ok()?;
            (call.spender, call.value)
        }
        "transferFrom" => {
            let call = IERC20::transferFromCall::abi_decode_validate(data).ok()?;
            (call.to, call.value)
        }
        _ => return None,
    };

    Some(TokenData {
        method: method.to_string(),
        token_address: token,
        recipient: Some(recipient),
        amount: Some(amount),
        symbol: None,
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    fn transfer_data(to: Address, amount: u64) -> Vec<u8> {
        IERC20::transferCall {
            to,
            value: U256::from(amount),
        }
        .abi_encode()
    }

    #[test]
    fn selectors_match_the_known_signatures() {
        assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn classifies_call_data() {
        let data = transfer_data(Address::repeat_byte(0x33), 5);
        assert_eq!(method_name(&data), Some("transfer"));
        assert_eq!(function_type(None, &data), "transfer");
        assert_eq!(function_type(Some("swap"), &data), "swap");
        assert_eq!(function_type(None, &[0xde, 0xad, 0xbe, 0xef]), CONTRACT_INTERACTION);
        assert_eq!(function_type(None, &[]), CONTRACT_INTERACTION);
    }

    #[test]
    fn decodes_transfer_arguments() {
        let token = Address::repeat_byte(0x44);
        let to = Address::repeat_byte(0x33);
        let decoded = decode_token_data(token, &transfer_data(to, 1_000)).unwrap();
        assert_eq!(decoded.method, "transfer");
        assert_eq!(decoded.token_address, token);
        assert_eq!(decoded.recipient, Some(to));
        assert_eq!(decoded.amount, Some(U256::from(1_000u64)));

        // truncated arguments
        let short = &transfer_data(to, 1)[..40];
        assert_eq!(decode_token_data(token, short), None);
    }

    #[test]
    fn decodes_transfer_from_and_approve() {
        let token = Address::repeat_byte(0x44);
        let owner = Address::repeat_byte(0x11);
        let to = Address::repeat_byte(0x22);

        let data = IERC20::transferFromCall {
            from: owner,
            to,
            value: U256::from(7u64),
        }
        .abi_encode();
        let decoded = decode_token_data(token, &data).unwrap();
        assert_eq!(decoded.method, "transferFrom");
        assert_eq!(decoded.recipient, Some(to));
        assert_eq!(decoded.amount, Some(U256::from(7u64)));

        let data = IERC20::approveCall {
            spender: to,
            value: U256::MAX,
        }
        .abi_encode();
        let decoded = decode_token_data(token, &data).unwrap();
        assert_eq!(decoded.method, "approve");
        assert_eq!(decoded.recipient, Some(to));
        assert_eq!(decoded.amount, Some(U256::MAX));
    }

    #[test]
    fn rejects_dirty_address_padding() {
        let mut data = transfer_data(Address::repeat_byte(0x33), 5);
        // first padding byte of the address word
        data[4] = 0xff;
        assert_eq!(decode_token_data(Address::repeat_byte(0x44), &data), None);
    }
}
