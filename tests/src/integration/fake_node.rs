//! # Fake JSON-RPC Node
//!
//! A minimal Ethereum endpoint served by axum on an ephemeral port. It answers
//! the methods the chain client uses, decodes every raw transaction it
//! receives and records it for assertions.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use primitive_types::U256;
use rlp::Rlp;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use dkim_authorization::domain::ecdsa::{keccak256, recover_prehash, RecoverableSignature};
use dkim_authorization::domain::entities::to_hex;
use dkim_authorization::domain::transaction::LegacyTransaction;
use dkim_authorization::{Address, Hash};

/// How the node answers.
#[derive(Debug, Clone)]
pub struct NodeBehavior {
    pub chain_id: u64,
    pub gas_price: u64,
    pub gas_estimate: u64,
    /// `eth_estimateGas` fails with this message.
    pub estimate_error: Option<String>,
    /// `eth_sendRawTransaction` fails with this message.
    pub send_error: Option<String>,
    /// Receipt polls answered with `null` before the receipt appears.
    pub pending_polls: usize,
    pub receipt_status: u64,
    pub block_number: u64,
}

impl Default for NodeBehavior {
    fn default() -> Self {
        Self {
            chain_id: 300,
            gas_price: 25_000_000,
            gas_estimate: 150_000,
            estimate_error: None,
            send_error: None,
            pending_polls: 0,
            receipt_status: 1,
            block_number: 42,
        }
    }
}

/// A raw transaction taken apart again.
#[derive(Debug, Clone)]
pub struct DecodedTransaction {
    pub tx: LegacyTransaction,
    pub v: u64,
    pub sender: Address,
    pub hash: Hash,
}

/// Decode an EIP-155 legacy transaction and recover its sender.
pub fn decode_raw(raw: &[u8]) -> Result<DecodedTransaction, String> {
    let rlp = Rlp::new(raw);
    let field = |e: rlp::DecoderError| e.to_string();

    let v: u64 = rlp.val_at(6).map_err(field)?;
    if v < 35 {
        return Err(format!("v={v} is not EIP-155"));
    }

    let tx = LegacyTransaction {
        nonce: rlp.val_at(0).map_err(field)?,
        gas_price: rlp.val_at(1).map_err(field)?,
        gas_limit: rlp.val_at(2).map_err(field)?,
        to: rlp.val_at(3).map_err(field)?,
        value: rlp.val_at(4).map_err(field)?,
        data: rlp.val_at(5).map_err(field)?,
        chain_id: (v - 35) / 2,
    };

    let r: U256 = rlp.val_at(7).map_err(field)?;
    let s: U256 = rlp.val_at(8).map_err(field)?;
    let mut signature = RecoverableSignature {
        r: [0u8; 32],
        s: [0u8; 32],
        v: ((v - 35) % 2) as u8,
    };
    r.to_big_endian(&mut signature.r);
    s.to_big_endian(&mut signature.s);

    let sender = recover_prehash(&tx.signing_hash(), &signature).map_err(|e| e.to_string())?;

    Ok(DecodedTransaction {
        tx,
        v,
        sender,
        hash: Hash::from(keccak256(raw)),
    })
}

struct NodeState {
    behavior: NodeBehavior,
    methods: Mutex<Vec<String>>,
    sent: Mutex<Vec<DecodedTransaction>>,
    receipt_polls: AtomicUsize,
}

/// Handle to a running fake node. The server stops when this is dropped.
pub struct FakeNode {
    addr: SocketAddr,
    state: Arc<NodeState>,
    task: JoinHandle<()>,
}

impl FakeNode {
    pub async fn start(behavior: NodeBehavior) -> FakeNode {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake node");
        let addr = listener.local_addr().expect("fake node address");

        let state = Arc::new(NodeState {
            behavior,
            methods: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            receipt_polls: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/", post(handle_json_rpc))
            .with_state(Arc::clone(&state));

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        FakeNode { addr, state, task }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Methods called so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state.methods.lock().unwrap().clone()
    }

    /// Transactions received via `eth_sendRawTransaction`.
    pub fn sent(&self) -> Vec<DecodedTransaction> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn receipt_polls(&self) -> usize {
        self.state.receipt_polls.load(Ordering::SeqCst)
    }
}

impl Drop for FakeNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn quantity(value: u64) -> Value {
    Value::String(format!("{value:#x}"))
}

fn rpc_error(code: i64, message: &str) -> Result<Value, (i64, String)> {
    Err((code, message.to_string()))
}

async fn handle_json_rpc(
    State(node): State<Arc<NodeState>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    node.methods.lock().unwrap().push(method.clone());

    let response = match dispatch(&node, &method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    };
    Json(response)
}

fn dispatch(node: &NodeState, method: &str, params: &Value) -> Result<Value, (i64, String)> {
    let behavior = &node.behavior;
    match method {
        "eth_chainId" => Ok(quantity(behavior.chain_id)),
        "eth_getTransactionCount" => Ok(quantity(node.sent.lock().unwrap().len() as u64)),
        "eth_gasPrice" => Ok(quantity(behavior.gas_price)),
        "eth_estimateGas" => match &behavior.estimate_error {
            Some(message) => rpc_error(3, message),
            None => Ok(quantity(behavior.gas_estimate)),
        },
        "eth_sendRawTransaction" => {
            if let Some(message) = &behavior.send_error {
                return rpc_error(-32000, message);
            }
            let raw_hex = params[0].as_str().unwrap_or_default();
            let raw = match raw_hex.strip_prefix("0x").map(hex::decode) {
                Some(Ok(raw)) => raw,
                _ => return rpc_error(-32602, "invalid raw transaction hex"),
            };
            let decoded = match decode_raw(&raw) {
                Ok(decoded) => decoded,
                Err(e) => return rpc_error(-32602, &e),
            };
            let hash = to_hex(decoded.hash.as_bytes());
            node.sent.lock().unwrap().push(decoded);
            Ok(Value::String(hash))
        }
        "eth_getTransactionReceipt" => {
            let polls = node.receipt_polls.fetch_add(1, Ordering::SeqCst) + 1;
            if polls <= behavior.pending_polls {
                return Ok(Value::Null);
            }
            Ok(json!({
                "transactionHash": params[0].clone(),
                "blockNumber": quantity(behavior.block_number),
                "status": quantity(behavior.receipt_status),
                "gasUsed": quantity(behavior.gas_estimate / 2),
            }))
        }
        other => rpc_error(-32601, &format!("method {other} not found")),
    }
}
