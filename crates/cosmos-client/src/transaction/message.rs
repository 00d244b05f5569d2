//! Transaction messages.

use crate::proto::Any;
use prost::{Message as ProstMessage, Name};

/// A message packed for inclusion in a transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    type_url: String,
    value: Vec<u8>,
}

impl Message {
    /// Creates a message from a type URL and its encoded payload.
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// Packs a protobuf message.
    ///
    /// ```rust,ignore
    /// let msg = Message::from_msg(&MsgSend {
    ///     from_address: from,
    ///     to_address: to,
    ///     amount: vec![(&Coin::new(10, "token")).into()],
    /// });
    /// ```
    pub fn from_msg<M: ProstMessage + Name>(msg: &M) -> Self {
        Self::new(M::type_url(), msg.encode_to_vec())
    }

    /// Returns the type URL, e.g. `/cosmos.bank.v1beta1.MsgSend`.
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    /// Returns the encoded payload.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn to_any(&self) -> Any {
        Any {
            type_url: self.type_url.clone(),
            value: self.value.clone(),
        }
    }
}

impl From<Any> for Message {
    fn from(any: Any) -> Self {
        Self::new(any.type_url, any.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Coin, MsgSend};

    #[test]
    fn test_from_msg() {
        let send = MsgSend {
            from_address: "cosmos1from".to_string(),
            to_address: "cosmos1to".to_string(),
            amount: vec![Coin {
                denom: "token".to_string(),
                amount: "10".to_string(),
            }],
        };
        let msg = Message::from_msg(&send);
        assert_eq!(msg.type_url(), "/cosmos.bank.v1beta1.MsgSend");
        assert_eq!(MsgSend::decode(msg.value()).unwrap(), send);

        let any = msg.to_any();
        assert_eq!(Message::from(any), msg);
    }
}
