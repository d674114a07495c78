//! # Integration Test Flows
//!
//! The dispatcher driving a real `ChainClient` over HTTP:
//!
//! 1. **connect**: chain id is checked before anything else
//! 2. **set/revoke**: signed authorization reaches the registry as a legacy
//!    EIP-155 transaction from the relayer
//! 3. **kill switch**: one zero-argument call per invocation
//! 4. **failures**: send-time errors, estimate reverts, receipt reverts and
//!    receipt timeouts each end the flow once, with nothing resent

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::fake_node::{FakeNode, NodeBehavior};

    use dkim_authorization::domain::abi;
    use dkim_authorization::domain::ecdsa::PrivateKey;
    use dkim_authorization::domain::entities::{
        REVOKE_DKIM_PUBLIC_KEY_HASH, SET_DKIM_PUBLIC_KEY_HASH, TOGGLE_KILL_SWITCH,
    };
    use dkim_authorization::{
        ChainClient, ChainConfig, ChainError, ContractCall, DispatchError, DispatchState,
        KillSwitchInput, LocalMessageSigner, MessageSigner, ReceiptError,
        RegistryCommandApi, RegistryCommandDispatcher, RegistryCommandInput, ValidationError,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const RELAYER_KEY: &str = "0x3d3cbc973389cb26f657686445bcc75662b415b656078503592ac8c1abb8810e";
    /// Development account #0; its address is `AUTHORIZER`.
    const AUTHORIZER_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const AUTHORIZER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const REGISTRY: &str = "0x037d80f98ae461dc307f16524ec0fc53b2e9e0b1";
    const KEY_HASH: &str = "0x0ea9c777dc7110e5a9e89b13f0cfc540e3845ba120b2b6dc24024d61488d4788";

    fn config_for(node: &FakeNode) -> ChainConfig {
        let mut config = ChainConfig::default().with_rpc_url(node.url());
        config.receipt_poll_interval = Duration::from_millis(10);
        config
    }

    async fn dispatcher_for(
        node: &FakeNode,
    ) -> RegistryCommandDispatcher<LocalMessageSigner, ChainClient> {
        let client = ChainClient::connect(config_for(node)).await.unwrap();
        RegistryCommandDispatcher::new(LocalMessageSigner::new(), client)
    }

    fn registry_input(command: &str) -> RegistryCommandInput {
        RegistryCommandInput {
            command: Some(command.into()),
            private_key: Some(RELAYER_KEY.into()),
            authorizer_private_key: Some(AUTHORIZER_KEY.into()),
            authorizer: Some(AUTHORIZER.into()),
            registry_address: Some(REGISTRY.into()),
            domain_name: Some("gmail.com".into()),
            public_key_hash: Some(KEY_HASH.into()),
        }
    }

    fn kill_switch_input() -> KillSwitchInput {
        KillSwitchInput {
            private_key: Some(RELAYER_KEY.into()),
            module_address: Some(REGISTRY.into()),
        }
    }

    fn relayer_address() -> String {
        let key = PrivateKey::from_hex(RELAYER_KEY).unwrap();
        format!("{:#x}", key.address().unwrap())
    }

    // =============================================================================
    // CONNECT
    // =============================================================================

    #[tokio::test]
    async fn test_chain_id_mismatch_refuses_to_connect() {
        let node = FakeNode::start(NodeBehavior {
            chain_id: 270,
            ..Default::default()
        })
        .await;

        let err = ChainClient::connect(config_for(&node)).await.err().unwrap();

        assert!(matches!(
            err,
            ChainError::ChainIdMismatch {
                expected: 300,
                actual: 270
            }
        ));
        assert_eq!(node.methods(), vec!["eth_chainId"]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let config = config_for(&node);
        drop(node);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = ChainClient::connect(config).await.err().unwrap();
        assert!(matches!(
            err,
            ChainError::Connection(_) | ChainError::Http(_)
        ));
    }

    // =============================================================================
    // REGISTRY FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_set_is_mined_end_to_end() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let dispatcher = dispatcher_for(&node).await;

        let outcome = dispatcher
            .dispatch_registry(&registry_input("set"))
            .await
            .unwrap();

        assert_eq!(outcome.final_state, DispatchState::Mined);
        assert_eq!(outcome.block_number, 42);
        assert_eq!(
            outcome.message.as_ref().unwrap().as_str(),
            format!("SET:domain=gmail.com;public_key_hash={KEY_HASH};")
        );

        let sent = node.sent();
        assert_eq!(sent.len(), 1);
        let tx = &sent[0];
        assert_eq!(tx.hash, outcome.transaction_hash);
        assert_eq!(format!("{:#x}", tx.sender), relayer_address());
        assert_eq!(format!("{:#x}", tx.tx.to), REGISTRY);
        assert_eq!(tx.tx.chain_id, 300);
        assert!(tx.v == 635 || tx.v == 636);
        assert_eq!(tx.tx.gas_limit, 150_000);
        assert!(tx.tx.value.is_zero());

        assert_eq!(
            node.methods(),
            vec![
                "eth_chainId",
                "eth_getTransactionCount",
                "eth_gasPrice",
                "eth_estimateGas",
                "eth_sendRawTransaction",
                "eth_getTransactionReceipt",
            ]
        );
    }

    #[tokio::test]
    async fn test_call_data_matches_signed_authorization() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let dispatcher = dispatcher_for(&node).await;

        let input = registry_input("revoke");
        dispatcher.dispatch_registry(&input).await.unwrap();

        // Signing is deterministic (RFC 6979), so the expected call data can
        // be rebuilt locally.
        let command = input.validate().unwrap();
        let message = command.request.canonical_message();
        assert!(message.as_str().starts_with("REVOKE:"));

        let signed = LocalMessageSigner::new()
            .sign(&message, &command.authorizer_key)
            .await
            .unwrap();
        assert_eq!(format!("{:#x}", signed.signer), AUTHORIZER);

        let call = ContractCall::registry(command.registry, &command.request, &signed);
        let expected = abi::encode_call(REVOKE_DKIM_PUBLIC_KEY_HASH, &call.args).unwrap();

        let sent = node.sent();
        assert_eq!(sent[0].tx.data, expected);
        let set_selector = abi::FunctionFragment::parse(SET_DKIM_PUBLIC_KEY_HASH)
            .unwrap()
            .selector();
        assert_ne!(&sent[0].tx.data[..4], &set_selector[..]);
    }

    #[tokio::test]
    async fn test_receipt_polled_until_mined() {
        let node = FakeNode::start(NodeBehavior {
            pending_polls: 3,
            ..Default::default()
        })
        .await;
        let dispatcher = dispatcher_for(&node).await;

        let outcome = dispatcher
            .dispatch_registry(&registry_input("set"))
            .await
            .unwrap();

        assert_eq!(outcome.final_state, DispatchState::Mined);
        assert_eq!(node.receipt_polls(), 4);
        assert_eq!(node.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_gas_limit_skips_estimate() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let mut config = config_for(&node);
        config.gas_limit = Some(500_000);
        let client = ChainClient::connect(config).await.unwrap();
        let dispatcher = RegistryCommandDispatcher::new(LocalMessageSigner::new(), client);

        dispatcher
            .dispatch_registry(&registry_input("set"))
            .await
            .unwrap();

        assert!(!node.methods().iter().any(|m| m == "eth_estimateGas"));
        assert_eq!(node.sent()[0].tx.gas_limit, 500_000);
    }

    // =============================================================================
    // KILL SWITCH
    // =============================================================================

    #[tokio::test]
    async fn test_kill_switch_sends_selector_only() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let dispatcher = dispatcher_for(&node).await;

        let first = dispatcher
            .dispatch_kill_switch(&kill_switch_input())
            .await
            .unwrap();
        let second = dispatcher
            .dispatch_kill_switch(&kill_switch_input())
            .await
            .unwrap();

        assert!(first.message.is_none());
        assert_ne!(first.transaction_hash, second.transaction_hash);

        let selector = abi::FunctionFragment::parse(TOGGLE_KILL_SWITCH)
            .unwrap()
            .selector();
        let sent = node.sent();
        assert_eq!(sent.len(), 2);
        for tx in &sent {
            assert_eq!(tx.tx.data, selector.to_vec());
            assert_eq!(format!("{:#x}", tx.tx.to), REGISTRY);
        }
        assert_eq!(sent[0].tx.nonce, 0);
        assert_eq!(sent[1].tx.nonce, 1);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_validation_error_touches_no_rpc_after_connect() {
        let node = FakeNode::start(NodeBehavior::default()).await;
        let dispatcher = dispatcher_for(&node).await;

        let mut input = registry_input("set");
        input.domain_name = None;
        let err = dispatcher.dispatch_registry(&input).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Validation(ValidationError::MissingFields(_))
        ));
        assert_eq!(node.methods(), vec!["eth_chainId"]);
    }

    #[tokio::test]
    async fn test_send_rejection_is_submission_error() {
        let node = FakeNode::start(NodeBehavior {
            send_error: Some("insufficient funds for gas * price + value".into()),
            ..Default::default()
        })
        .await;
        let dispatcher = dispatcher_for(&node).await;

        let err = dispatcher
            .dispatch_registry(&registry_input("set"))
            .await
            .unwrap_err();

        match &err {
            DispatchError::Submission(ChainError::Rpc { code, message }) => {
                assert_eq!(*code, -32000);
                assert!(message.contains("insufficient funds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.transaction_hash().is_none());
        assert_eq!(node.receipt_polls(), 0);
    }

    #[tokio::test]
    async fn test_estimate_revert_sends_nothing() {
        let node = FakeNode::start(NodeBehavior {
            estimate_error: Some("execution reverted: unauthorized".into()),
            ..Default::default()
        })
        .await;
        let dispatcher = dispatcher_for(&node).await;

        let err = dispatcher
            .dispatch_kill_switch(&kill_switch_input())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "submission");
        assert!(err.to_string().contains("execution reverted"));
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn test_revert_at_receipt_reports_hash() {
        let node = FakeNode::start(NodeBehavior {
            receipt_status: 0,
            ..Default::default()
        })
        .await;
        let dispatcher = dispatcher_for(&node).await;

        let err = dispatcher
            .dispatch_registry(&registry_input("set"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Receipt(ReceiptError::Reverted {
                block_number: 42,
                ..
            })
        ));
        assert_eq!(err.transaction_hash(), Some(node.sent()[0].hash));
        assert_eq!(node.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_timeout_is_not_found() {
        let node = FakeNode::start(NodeBehavior {
            pending_polls: usize::MAX,
            ..Default::default()
        })
        .await;
        let mut config = config_for(&node);
        config.receipt_timeout = Some(Duration::from_millis(100));
        let client = ChainClient::connect(config).await.unwrap();
        let dispatcher = RegistryCommandDispatcher::new(LocalMessageSigner::new(), client);

        let err = dispatcher
            .dispatch_kill_switch(&kill_switch_input())
            .await
            .unwrap_err();

        match err {
            DispatchError::Receipt(ReceiptError::NotFound { tx_hash, waited }) => {
                assert_eq!(tx_hash, node.sent()[0].hash);
                assert!(waited >= Duration::from_millis(100));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(node.sent().len(), 1);
    }
}
