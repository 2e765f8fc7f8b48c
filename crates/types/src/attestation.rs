//! Builders for anchoring a signed request on chain.
//!
//! The Snowy program stores an [`InferenceRecord`] in an account derived from
//! `["snowy", signer, request_hash]`. It refuses to record unless the same
//! transaction carries an Ed25519SigVerify instruction binding the signer to
//! the 32 byte request hash. This module builds the data for both
//! instructions. It does not talk to a cluster.

use crate::{
    encoding::{decode_base58_array, encode_base58, IdentifierError},
    wallet::decode_public_key_id,
    SignedRequest,
};
use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use snowy_constants::{DIGEST_LEN, PUBKEY_LEN, RECORD_SEED, SIGNATURE_LEN};

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Size of one Ed25519SigVerify offsets entry.
const OFFSETS_LEN: usize = 14;
/// Count byte plus padding byte.
const ED25519_HEADER_LEN: usize = 2;
/// Instruction index meaning "this instruction".
const CURRENT_INSTRUCTION: u16 = u16::MAX;

/// Errors building attestation data.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AttestationError {
    /// The signer is not a 32 byte base58 key.
    #[error("invalid signer: {0}")]
    InvalidSigner(#[source] IdentifierError),
    /// The program identifier is not a 32 byte base58 key.
    #[error("invalid program id: {0}")]
    InvalidProgramId(#[source] IdentifierError),
    /// No bump produced an off-curve address.
    #[error("unable to find a viable record address")]
    NoRecordAddress,
    /// The message does not fit the u16 offsets of an Ed25519SigVerify
    /// instruction.
    #[error("message of {len} bytes does not fit an ed25519 instruction")]
    MessageTooLong {
        /// Length of the rejected message.
        len: usize,
    },
    /// Borsh encoding failed.
    #[error(transparent)]
    Encoding(#[from] std::io::Error),
}

/// Instructions understood by the Snowy program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SnowyInstruction {
    /// Record an inference authorization.
    ///
    /// Accounts: signer, record address (writable), system program,
    /// instructions sysvar.
    Record {
        /// The 32 byte request hash the signer signed.
        request_hash: [u8; DIGEST_LEN],
        /// Request timestamp in unix milliseconds.
        timestamp: i64,
    },
}

/// The account data stored at the record address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InferenceRecord {
    /// Public key of the signer.
    pub signer: [u8; PUBKEY_LEN],
    /// The signed request hash.
    pub request_hash: [u8; DIGEST_LEN],
    /// Request timestamp in unix milliseconds.
    pub timestamp: i64,
    /// Bump of the record address.
    pub bump: u8,
}

impl InferenceRecord {
    /// Borsh encode the record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AttestationError> {
        borsh::to_vec(self).map_err(Into::into)
    }

    /// Borsh decode a record from account data.
    pub fn from_bytes(data: &[u8]) -> Result<Self, AttestationError> {
        borsh::from_slice(data).map_err(Into::into)
    }
}

/// Instruction data for [`SnowyInstruction::Record`].
pub fn record_instruction_data(
    request_hash: &[u8; DIGEST_LEN],
    timestamp: i64,
) -> Result<Vec<u8>, AttestationError> {
    let ix = SnowyInstruction::Record { request_hash: *request_hash, timestamp };
    borsh::to_vec(&ix).map_err(Into::into)
}

/// One signature entry of an Ed25519SigVerify instruction. All fields are
/// little endian u16, which is exactly the borsh layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
struct Ed25519SignatureOffsets {
    signature_offset: u16,
    signature_instruction_index: u16,
    public_key_offset: u16,
    public_key_instruction_index: u16,
    message_data_offset: u16,
    message_data_size: u16,
    message_instruction_index: u16,
}

/// Data for an Ed25519SigVerify instruction checking one signature.
///
/// Layout: count, padding, one offsets entry, then public key, signature and
/// message. All offsets point into this instruction, so the whole
/// instruction must stay within `u16::MAX` bytes. Longer messages fail with
/// [`AttestationError::MessageTooLong`].
pub fn ed25519_verify_instruction_data(
    public_key: &[u8; PUBKEY_LEN],
    signature: &[u8; SIGNATURE_LEN],
    message: &[u8],
) -> Result<Vec<u8>, AttestationError> {
    let public_key_offset = ED25519_HEADER_LEN + OFFSETS_LEN;
    let signature_offset = public_key_offset + PUBKEY_LEN;
    let message_data_offset = signature_offset + SIGNATURE_LEN;

    let too_long = || AttestationError::MessageTooLong { len: message.len() };
    let end = message_data_offset.checked_add(message.len()).ok_or_else(too_long)?;
    if end > usize::from(u16::MAX) {
        return Err(too_long());
    }
    let message_data_size = u16::try_from(message.len()).map_err(|_| too_long())?;

    // header offsets are small constants
    let offsets = Ed25519SignatureOffsets {
        signature_offset: signature_offset as u16,
        signature_instruction_index: CURRENT_INSTRUCTION,
        public_key_offset: public_key_offset as u16,
        public_key_instruction_index: CURRENT_INSTRUCTION,
        message_data_offset: message_data_offset as u16,
        message_data_size,
        message_instruction_index: CURRENT_INSTRUCTION,
    };

    let mut data = Vec::with_capacity(message_data_offset + message.len());
    data.extend_from_slice(&[1, 0]);
    offsets.serialize(&mut data)?;
    data.extend_from_slice(public_key);
    data.extend_from_slice(signature);
    data.extend_from_slice(message);
    Ok(data)
}

/// Check whether Ed25519SigVerify instruction data contains an entry binding
/// `public_key` to the 32 byte `message`, the way the Snowy program does.
///
/// Entries with out of range offsets or a message size other than 32 are
/// skipped. Truncated data never matches.
pub fn ed25519_instruction_matches(
    data: &[u8],
    public_key: &[u8; PUBKEY_LEN],
    message: &[u8; DIGEST_LEN],
) -> bool {
    let Some(&count) = data.first() else { return false };
    let entries_end = ED25519_HEADER_LEN + usize::from(count) * OFFSETS_LEN;
    if data.len() < entries_end {
        return false;
    }

    let slice = |offset: usize, len: usize| data.get(offset..offset.checked_add(len)?);

    data[ED25519_HEADER_LEN..entries_end]
        .chunks_exact(OFFSETS_LEN)
        .filter_map(|entry| Ed25519SignatureOffsets::try_from_slice(entry).ok())
        .any(|offsets| {
            let message_len = usize::from(offsets.message_data_size);
            message_len == DIGEST_LEN
                && slice(usize::from(offsets.signature_offset), SIGNATURE_LEN).is_some()
                && slice(usize::from(offsets.public_key_offset), PUBKEY_LEN)
                    .is_some_and(|pk| pk == public_key)
                && slice(usize::from(offsets.message_data_offset), message_len)
                    .is_some_and(|msg| msg == message)
        })
}

/// Derive a program address from seeds and a bump, or `None` if the result
/// lies on the ed25519 curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &[u8; PUBKEY_LEN]) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id);
    hasher.update(PDA_MARKER);
    let address: [u8; 32] = hasher.finalize().into();

    // a successful decompression means the bytes are a curve point
    ed25519_dalek::VerifyingKey::from_bytes(&address).is_err().then_some(address)
}

/// Find the first off-curve program address, searching bumps from 255 down.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; PUBKEY_LEN],
) -> Option<([u8; 32], u8)> {
    (1..=u8::MAX).rev().find_map(|bump| {
        let bump_seed = [bump];
        let mut with_bump = seeds.to_vec();
        with_bump.push(&bump_seed);
        create_program_address(&with_bump, program_id).map(|address| (address, bump))
    })
}

/// The record address for a signer and request hash.
pub fn find_record_address(
    signer: &[u8; PUBKEY_LEN],
    request_hash: &[u8; DIGEST_LEN],
    program_id: &[u8; PUBKEY_LEN],
) -> Option<([u8; 32], u8)> {
    find_program_address(&[RECORD_SEED, signer, request_hash], program_id)
}

/// Everything needed to anchor one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    /// Address of the record account.
    pub record_address: [u8; 32],
    /// Bump of the record address.
    pub bump: u8,
    /// Data for the Snowy `Record` instruction.
    pub record_data: Vec<u8>,
    /// Data for the accompanying Ed25519SigVerify instruction.
    pub ed25519_data: Vec<u8>,
}

impl Attestation {
    /// Build attestation data for a signed request.
    pub fn from_signed_request(request: &SignedRequest) -> Result<Self, AttestationError> {
        let signer =
            decode_public_key_id(request.signer()).map_err(AttestationError::InvalidSigner)?;
        let program_id = decode_base58_array(request.program_id())
            .map_err(AttestationError::InvalidProgramId)?;
        let request_hash = request.request_hash().as_bytes();

        let (record_address, bump) = find_record_address(&signer, request_hash, &program_id)
            .ok_or(AttestationError::NoRecordAddress)?;

        Ok(Self {
            record_address,
            bump,
            record_data: record_instruction_data(request_hash, request.hashable().timestamp())?,
            ed25519_data: ed25519_verify_instruction_data(
                &signer,
                request.signature().as_bytes(),
                request_hash,
            )?,
        })
    }

    /// The record address, base58 encoded.
    pub fn record_address_base58(&self) -> String {
        encode_base58(&self.record_address)
    }
}

impl SignedRequest {
    /// Build the on-chain attestation data for this request.
    pub fn attestation(&self) -> Result<Attestation, AttestationError> {
        Attestation::from_signed_request(self)
    }
}
