//! End-to-end pipeline tests against in-process collaborators.

mod mocks;

use cosmos_client::address_config::{self, AddressConfigGuard};
use cosmos_client::api::{FaucetResponse, FaucetService, LedgerNode};
use cosmos_client::keyring::{Keyring, MemoryKeyring};
use cosmos_client::proto::{
    AuthInfo, MsgData, MsgSend, MsgSendResponse, SignDoc, TxBody, TxMsgData, TxRaw,
};
use cosmos_client::transaction::{GasSetting, Message, TxFactory};
use cosmos_client::{
    AddressFormat, BroadcastResponse, Client, ClientConfig, ClientError, Coin, FaucetConfig,
    GasConfig,
};
use k256::ecdsa::signature::Verifier;
use k256::ecdsa::{Signature, VerifyingKey};
use mocks::{Faucet, GlobalPrefixKeyring, Node};
use prost::Message as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

async fn alice() -> Arc<MemoryKeyring> {
    let keyring = Arc::new(MemoryKeyring::new());
    keyring.generate("alice").await.unwrap();
    keyring
}

fn send() -> Vec<Message> {
    vec![Message::from_msg(&MsgSend {
        from_address: "cosmos1from".to_string(),
        to_address: "cosmos1to".to_string(),
        amount: vec![(&Coin::new(10, "token")).into()],
    })]
}

fn client(node: &Arc<Node>, keyring: Arc<dyn Keyring>) -> Client {
    Client::from_parts(
        ClientConfig::local(),
        "testchain",
        node.clone() as Arc<dyn LedgerNode>,
        keyring,
        None,
    )
    .unwrap()
}

fn funded_client(node: &Arc<Node>, keyring: Arc<dyn Keyring>, faucet: &Arc<Faucet>) -> Client {
    Client::from_parts(
        ClientConfig::local().with_faucet(FaucetConfig::local()),
        "testchain",
        node.clone() as Arc<dyn LedgerNode>,
        keyring,
        Some(faucet.clone() as Arc<dyn FaucetService>),
    )
    .unwrap()
}

#[tokio::test]
async fn test_caller_supplied_sequence_skips_lookup() {
    let node = Arc::new(Node::new());
    let client = client(&node, alice().await)
        .with_factory(TxFactory::new().with_account_number(11).with_sequence(22));

    let quote = client.quote("alice", send()).await.unwrap();
    assert_eq!(node.account_calls(), 0);
    assert_eq!((quote.account_number(), quote.sequence()), (11, 22));
}

#[tokio::test]
async fn test_unset_sequence_takes_one_lookup() {
    let node = Arc::new(Node::new());
    let client = client(&node, alice().await).with_factory(TxFactory::new().with_account_number(11));

    let quote = client.quote("alice", send()).await.unwrap();
    assert_eq!(node.account_calls(), 1);
    assert_eq!((quote.account_number(), quote.sequence()), (11, 3));
}

#[tokio::test]
async fn test_unknown_account_fails_before_signing() {
    let node = Arc::new(Node::new().unknown_account());
    let err = client(&node, alice().await)
        .broadcast_tx("alice", send())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AccountNotFound(_)));
    assert!(node.broadcasts().is_empty());
}

#[tokio::test]
async fn test_signed_tx_declares_quoted_gas() {
    let node = Arc::new(Node::new());
    let keyring = alice().await;
    let public_key = keyring.key("alice").await.unwrap().public_key;
    let client = client(&node, keyring);

    let quote = client.quote("alice", send()).await.unwrap();
    assert_eq!(quote.gas(), 61_234 + GasConfig::default().margin);
    let gas = quote.gas();
    quote.commit().await.unwrap();

    let broadcasts = node.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let raw = TxRaw::decode(broadcasts[0].as_slice()).unwrap();
    let auth_info = AuthInfo::decode(raw.auth_info_bytes.as_slice()).unwrap();
    assert_eq!(auth_info.fee.unwrap().gas_limit, gas);
    assert_eq!(auth_info.signer_infos[0].sequence, 3);

    let sign_doc = SignDoc {
        body_bytes: raw.body_bytes.clone(),
        auth_info_bytes: raw.auth_info_bytes.clone(),
        chain_id: "testchain".to_string(),
        account_number: 7,
    }
    .encode_to_vec();
    let signature = Signature::from_slice(&raw.signatures[0]).unwrap();
    VerifyingKey::from_sec1_bytes(&public_key)
        .unwrap()
        .verify(&sign_doc, &signature)
        .unwrap();
}

#[tokio::test]
async fn test_fixed_gas_is_declared_as_is() {
    let node = Arc::new(Node::new());
    let client = client(&node, alice().await)
        .with_factory(TxFactory::new().with_gas(GasSetting::Fixed(250_000)));

    let quote = client.quote("alice", send()).await.unwrap();
    assert_eq!(quote.gas(), 250_000);
    assert_eq!(quote.simulated_gas(), None);
}

#[derive(Clone, PartialEq, prost::Message)]
struct MsgRecordResponse {
    #[prost(uint64, tag = "1")]
    id: u64,
    #[prost(string, tag = "2")]
    label: String,
}

impl prost::Name for MsgRecordResponse {
    const NAME: &'static str = "MsgRecordResponse";
    const PACKAGE: &'static str = "records.v1";
}

#[tokio::test]
async fn test_committed_result_decodes() {
    let recorded = MsgRecordResponse {
        id: 42,
        label: "ledger".to_string(),
    };
    let data = TxMsgData {
        data: vec![MsgData {
            msg_type: "/records.v1.MsgRecord".to_string(),
            data: recorded.encode_to_vec(),
        }],
        msg_responses: vec![],
    };
    let node = Arc::new(Node::new().with_broadcast(Ok(BroadcastResponse {
        data: data.encode_to_vec(),
        tx_hash: "AB".to_string(),
        height: 9,
        ..BroadcastResponse::default()
    })));

    let response = client(&node, alice().await)
        .broadcast_tx("alice", send())
        .await
        .unwrap();
    assert_eq!(response.height, 9);
    assert_eq!(response.decode::<MsgRecordResponse>().unwrap(), recorded);
    assert!(response.decode::<MsgSendResponse>().is_err());
}

#[tokio::test]
async fn test_rejection_carries_code_and_log() {
    let node = Arc::new(Node::new().with_broadcast(Ok(BroadcastResponse {
        code: 5,
        codespace: "sdk".to_string(),
        raw_log: "insufficient funds".to_string(),
        tx_hash: "AB".to_string(),
        ..BroadcastResponse::default()
    })));

    let err = client(&node, alice().await)
        .broadcast_tx("alice", send())
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains('5'));
    assert!(message.contains("insufficient funds"));
    assert!(!err.is_connection_error());
}

#[tokio::test]
async fn test_new_account_signs_with_zero_fields() {
    let node = Arc::new(Node::new().unknown_account());
    let quote = client(&node, alice().await)
        .quote_unresolved("alice", send())
        .await
        .unwrap();
    assert_eq!((quote.account_number(), quote.sequence()), (0, 0));
    quote.commit().await.unwrap();
    assert_eq!(node.account_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_funding_polls_until_balance_arrives() {
    let node = Arc::new(Node::new().with_balances(vec![
        vec![],
        vec![],
        vec![],
        vec![Coin::new(100, "token")],
    ]));
    let faucet = Arc::new(Faucet::default());
    let client = funded_client(&node, alice().await, &faucet);

    let started = Instant::now();
    client.quote("alice", send()).await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(node.balance_calls(), 4);

    let requests = faucet.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].address, client.address("alice").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_funding_times_out() {
    let node = Arc::new(Node::new().with_balances(vec![vec![Coin::new(99, "token")]]));
    let faucet = Arc::new(Faucet::default());
    let client = funded_client(&node, alice().await, &faucet);

    let started = Instant::now();
    let err = client.quote("alice", send()).await.unwrap_err();
    let elapsed = started.elapsed();

    let config = FaucetConfig::local();
    assert!(matches!(err, ClientError::InsufficientBalance { .. }));
    assert!(elapsed >= config.deadline());
    assert!(elapsed <= config.deadline() + config.poll_interval());
    assert!(node.broadcasts().is_empty());
}

#[tokio::test]
async fn test_faucet_transfer_error_is_fatal() {
    let node = Arc::new(Node::new().with_balances(vec![vec![]]));
    let faucet = Arc::new(Faucet {
        response: serde_json::from_value::<FaucetResponse>(serde_json::json!({
            "transfers": [{"coin": "10token", "error": "account is rate limited"}]
        }))
        .unwrap(),
        ..Faucet::default()
    });

    let err = funded_client(&node, alice().await, &faucet)
        .quote("alice", send())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("account is rate limited"));
    assert_eq!(node.balance_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_prefixes_stay_isolated() {
    let keyring = Arc::new(GlobalPrefixKeyring::default());
    keyring.inner.generate("alice").await.unwrap();
    let node = Arc::new(Node::new());

    let mut handles = Vec::new();
    for i in 0..12 {
        let prefix = if i % 2 == 0 { "cosmos" } else { "osmo" };
        let client = Client::from_parts(
            ClientConfig::local().with_address_prefix(prefix),
            "testchain",
            node.clone() as Arc<dyn LedgerNode>,
            keyring.clone() as Arc<dyn Keyring>,
            None,
        )
        .unwrap();
        handles.push(tokio::spawn(async move {
            let from = client.address("alice").await.unwrap();
            let message = Message::from_msg(&MsgSend {
                from_address: from.clone(),
                to_address: from.clone(),
                amount: vec![(&Coin::new(1, "token")).into()],
            });
            let quote = client.quote("alice", vec![message]).await.unwrap();
            assert_eq!(quote.address(), from);
            quote.commit().await.unwrap();
            (prefix, from)
        }));
    }

    let mut senders = Vec::new();
    for handle in handles {
        let (prefix, from) = handle.await.unwrap();
        assert!(from.starts_with(&format!("{prefix}1")), "{from}");
        senders.push(from);
    }

    let broadcasts = node.broadcasts();
    assert_eq!(broadcasts.len(), 12);
    let mut signed_senders = Vec::new();
    for tx in &broadcasts {
        let raw = TxRaw::decode(tx.as_slice()).unwrap();
        let body = TxBody::decode(raw.body_bytes.as_slice()).unwrap();
        let send = MsgSend::decode(body.messages[0].value.as_slice()).unwrap();
        assert!(
            send.from_address.starts_with("cosmos1") || send.from_address.starts_with("osmo1"),
            "{}",
            send.from_address
        );
        signed_senders.push(send.from_address);
    }
    senders.sort();
    signed_senders.sort();
    assert_eq!(signed_senders, senders);
}

#[tokio::test]
async fn test_cancelled_commit_broadcasts_nothing() {
    let node = Arc::new(Node::new());
    let quote = client(&node, alice().await)
        .quote("alice", send())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = quote.commit_with_cancel(cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(node.broadcasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_for_prefix_lock() {
    let node = Arc::new(Node::new());
    let quote = client(&node, alice().await)
        .quote("alice", send())
        .await
        .unwrap();

    let other = AddressFormat::new("other").unwrap();
    let held = AddressConfigGuard::acquire(&other).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(30), quote.commit_with_cancel(cancel))
        .await
        .expect("commit should observe the token while the lock is held")
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(node.broadcasts().is_empty());
    assert_eq!(address_config::current().account_prefix(), "other");
    drop(held);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_for_inclusion() {
    let node = Arc::new(Node::new().with_broadcast_delay(Duration::from_secs(30)));
    let quote = client(&node, alice().await)
        .quote("alice", send())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = quote.commit_with_cancel(cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert_eq!(node.broadcasts().len(), 1);
}
