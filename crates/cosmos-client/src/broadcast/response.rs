//! Committed transaction results and their decoding.

use crate::error::{ClientError, ClientResult};
use crate::proto::{Any, TxMsgData};
use prost::{Message, Name};

/// Suffix turning a message type into its response type.
const RESPONSE_SUFFIX: &str = "Response";

/// The node's answer to a committed broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastResponse {
    /// Result code; zero means the transaction executed.
    pub code: u32,
    /// Module namespace of `code`.
    pub codespace: String,
    /// Execution log, verbatim.
    pub raw_log: String,
    /// Encoded `TxMsgData` of the executed transaction.
    pub data: Vec<u8>,
    /// Upper-case hex transaction hash.
    pub tx_hash: String,
    /// Height the transaction was included at.
    pub height: u64,
}

impl BroadcastResponse {
    /// Returns true if the transaction executed.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Decodes the result envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if `data` is not a `TxMsgData`.
    pub fn msg_data(&self) -> ClientResult<TxMsgData> {
        TxMsgData::decode(self.data.as_slice()).map_err(ClientError::decode)
    }

    /// Returns the result of the first message, typed.
    ///
    /// Older nodes report results as `(msg_type, data)` pairs; the result
    /// type is then the message type with `Response` appended. Newer nodes
    /// report `Any`s with their own type URL. Results of later messages are
    /// not reachable here; use [`msg_data`](Self::msg_data) for those.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if there is no result, or the result
    /// type is not the one asked for.
    pub fn first_result(&self) -> ClientResult<Any> {
        let msg_data = self.msg_data()?;
        if let Some(first) = msg_data.data.into_iter().next() {
            return Ok(Any {
                type_url: response_type_url(&first.msg_type),
                value: first.data,
            });
        }
        msg_data
            .msg_responses
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("transaction returned no message results".into()))
    }

    /// Decodes the first message's result into `T`.
    ///
    /// ```rust,ignore
    /// let response = quote.commit().await?;
    /// let sent: MsgSendResponse = response.decode()?;
    /// ```
    ///
    /// # Errors
    ///
    /// See [`first_result`](Self::first_result); also fails if the payload
    /// does not decode as `T`.
    pub fn decode<T: Message + Name + Default>(&self) -> ClientResult<T> {
        let result = self.first_result()?;
        let expected = T::type_url();
        if result.type_url != expected {
            return Err(ClientError::Decode(format!(
                "result type {} does not match {expected}",
                result.type_url
            )));
        }
        T::decode(result.value.as_slice()).map_err(ClientError::decode)
    }
}

fn response_type_url(msg_type: &str) -> String {
    let prefixed = if msg_type.starts_with('/') {
        msg_type.to_string()
    } else {
        format!("/{msg_type}")
    };
    prefixed + RESPONSE_SUFFIX
}
