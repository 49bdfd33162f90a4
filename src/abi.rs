//! ABI layouts of the payloads the pipeline decodes.
//!
//! Three shapes are involved:
//! - the attestation `data` column: a static tuple
//!   `(address donor, address recipientId, uint256 roundId, address tokenSent, uint256 amount, address origin)`
//! - the `allocate(uint256,bytes)` call input on the Allo contract
//! - the `Allocated` event: `recipientId` indexed, `(amount, token, sender, origin)` in data

use alloy_primitives::{Address, B256, Bytes, U256, b256};
use alloy_sol_types::SolValue;

use crate::error::Error;

/// Selector of the wrapper's `callDepositV3` entry point.
pub const DEPOSIT_V3_SELECTOR: &str = "0x6fde4731";

/// Explorer label some exports show instead of [`DEPOSIT_V3_SELECTOR`].
pub const DEPOSIT_V3_METHOD_NAME: &str = "Call Deposit V3";

/// Explorer label of direct Allo `allocate()` calls.
pub const ALLOCATE_METHOD_NAME: &str = "Allocate";

/// topic0 of the Allo strategy's `Allocated` event.
pub const ALLOCATED_EVENT_TOPIC: B256 =
    b256!("dc9d40760308557d1377c2fe7c984ace9eb02d23b60a5f6f26be62c52431bc38");

/// Encoded width of the attestation tuple: six static 32-byte words.
pub const ATTESTATION_PAYLOAD_LEN: usize = 6 * 32;

type AttestationTuple = (Address, Address, U256, Address, U256, Address);
type AllocatedData = (U256, Address, Address, Address);

/// Donation fields carried in an attestation's `data` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationPayload {
    pub donor: Address,
    pub recipient_id: Address,
    pub round_id: U256,
    pub token_sent: Address,
    pub amount: U256,
    pub origin: Address,
}

impl AttestationPayload {
    pub fn encode(&self) -> Vec<u8> {
        let tuple: AttestationTuple = (
            self.donor,
            self.recipient_id,
            self.round_id,
            self.token_sent,
            self.amount,
            self.origin,
        );
        tuple.abi_encode()
    }

    pub fn encode_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }
}

pub fn decode_attestation_data(hex_str: &str) -> Result<AttestationPayload, Error> {
    let bytes = decode_prefixed_hex(hex_str)?;
    decode_attestation_bytes(&bytes)
}

pub fn decode_attestation_bytes(bytes: &[u8]) -> Result<AttestationPayload, Error> {
    if bytes.len() != ATTESTATION_PAYLOAD_LEN {
        return Err(Error::decode(format!(
            "attestation payload is {} bytes, expected {ATTESTATION_PAYLOAD_LEN}",
            bytes.len()
        )));
    }

    let (donor, recipient_id, round_id, token_sent, amount, origin) =
        <AttestationTuple as SolValue>::abi_decode(bytes, true)
            .map_err(|e| Error::decode(format!("attestation payload: {e}")))?;

    Ok(AttestationPayload {
        donor,
        recipient_id,
        round_id,
        token_sent,
        amount,
        origin,
    })
}

/// Strips the `0x` marker and hex-decodes the rest.
pub fn decode_prefixed_hex(hex_str: &str) -> Result<Vec<u8>, Error> {
    let trimmed = hex_str.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::decode(format!("missing 0x prefix: {trimmed}")))?;
    hex::decode(body).map_err(|e| Error::decode(format!("invalid hex: {e}")))
}

/// Round ids are Allo pool ids; anything beyond `u64` is not a round we track.
pub fn round_id_to_u64(round_id: U256) -> Result<u64, Error> {
    u64::try_from(round_id).map_err(|_| Error::decode(format!("round id {round_id} exceeds u64")))
}

/// Decodes the pool id out of `allocate(uint256 poolId, bytes data)` calldata.
pub fn decode_allocate_round(input: &[u8]) -> Result<u64, Error> {
    let params = input
        .get(4..)
        .ok_or_else(|| Error::decode("call input shorter than a selector"))?;
    let (round_id, _data) = <(U256, Bytes) as SolValue>::abi_decode_params(params, false)
        .map_err(|e| Error::decode(format!("allocate input: {e}")))?;
    round_id_to_u64(round_id)
}

/// Decoded `Allocated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedEvent {
    pub recipient_id: Address,
    pub amount: U256,
    pub token: Address,
    pub sender: Address,
    pub origin: Address,
}

pub fn decode_allocated_event(topics: &[B256], data: &[u8]) -> Result<AllocatedEvent, Error> {
    match topics.first() {
        Some(topic) if *topic == ALLOCATED_EVENT_TOPIC => {}
        _ => return Err(Error::decode("log is not an Allocated event")),
    }
    let recipient_topic = topics
        .get(1)
        .ok_or_else(|| Error::decode("Allocated event missing recipientId topic"))?;
    let recipient_id = Address::from_word(*recipient_topic);

    let (amount, token, sender, origin) = <AllocatedData as SolValue>::abi_decode(data, true)
        .map_err(|e| Error::decode(format!("Allocated event data: {e}")))?;

    Ok(AllocatedEvent {
        recipient_id,
        amount,
        token,
        sender,
        origin,
    })
}

/// Builds an `Allocated` log body; the inverse of [`decode_allocated_event`].
pub fn encode_allocated_event(event: &AllocatedEvent) -> (Vec<B256>, Vec<u8>) {
    let topics = vec![ALLOCATED_EVENT_TOPIC, event.recipient_id.into_word()];
    let data: AllocatedData = (event.amount, event.token, event.sender, event.origin);
    (topics, data.abi_encode())
}

/// Builds `allocate(uint256,bytes)` calldata behind an arbitrary selector.
pub fn encode_allocate_input(selector: [u8; 4], round_id: u64, data: &[u8]) -> Vec<u8> {
    let params = (U256::from(round_id), Bytes::copy_from_slice(data)).abi_encode_params();
    let mut input = selector.to_vec();
    input.extend(params);
    input
}
