//! Request construction and signing through the client, against the mock
//! router. Every failure here must happen before anything is sent.

use proptest::prelude::*;
use snowy_client::{ErrorKind, SnowyClient};
use snowy_constants::SNOWY_PROGRAM_ID;
use snowy_test_utils::{
    init_tracing,
    mock::MockWallet,
    router::{MockRouter, RouterMode},
    test_constants,
    users::{TEST_SIGNER_0, TEST_WALLETS},
};
use snowy_types::{
    build_signed_request_with, GenerateInput, LocalWallet, RequestError, Sha256Hasher,
    WalletIdentity,
};

const SCENARIO_HASH: &str = "3BrLFxvbsfT5p1CXQqFQjYxJigVvs5vpb3mX4E4wp7HB";
const SCENARIO_SIGNATURE: &str =
    "epQb2biFWe1vdesRfLTQ5HZKRJqXgW6rkMLWvr89YitE3LNcmz8mKwpxNcbFTYR7e87P7c6EDvFxpYPbkEgisUj";

fn scenario_input() -> GenerateInput {
    GenerateInput::new("snowy-base", "hi")
        .with_temperature(0.2)
        .with_max_tokens(16)
        .with_timestamp(1_730_000_000_000)
}

async fn client_with(wallet: MockWallet) -> (MockRouter, SnowyClient<MockWallet>) {
    init_tracing();
    let router = MockRouter::spawn(RouterMode::Verify).await.unwrap();
    let config = router.config().with_program_id(SNOWY_PROGRAM_ID);
    let client = SnowyClient::new(wallet, config).unwrap();
    (router, client)
}

#[tokio::test]
async fn scenario_request_is_deterministic() {
    let (router, client) = client_with(MockWallet::new(TEST_WALLETS[0].clone())).await;

    let request = client.sign_request(&scenario_input()).await.unwrap();
    assert_eq!(request.signer(), TEST_SIGNER_0);
    assert_eq!(request.request_hash().to_base58(), SCENARIO_HASH);
    assert_eq!(request.signature().to_base58(), SCENARIO_SIGNATURE);
    assert_eq!(client.wallet().signed_digests(), vec![*request.request_hash().as_bytes()]);

    let response = client.send_request(&request).await.unwrap();
    assert_eq!(response.verification.request_hash, SCENARIO_HASH);

    let received = router.received();
    assert_eq!(received[0]["requestHash"], SCENARIO_HASH);
    assert_eq!(received[0]["signature"], SCENARIO_SIGNATURE);
    assert_eq!(received[0]["programId"], SNOWY_PROGRAM_ID);
    assert_eq!(received[0]["maxTokens"], 16);
}

#[tokio::test]
async fn short_public_key_is_rejected_before_signing() {
    // 31 bytes of 0x01.
    let short_key = snowy_types::encode_base58(&[1u8; 31]);
    let wallet = MockWallet::new(TEST_WALLETS[0].clone()).with_public_key_id(short_key);
    let (router, client) = client_with(wallet).await;

    let err = client.generate(&scenario_input()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSigner);
    assert_eq!(client.wallet().sign_calls(), 0);
    assert!(router.received().is_empty());
}

#[tokio::test]
async fn bad_signature_lengths_are_rejected_before_sending() {
    for len in [0, 63, 65] {
        let wallet = MockWallet::with_signature_len(TEST_WALLETS[0].clone(), len);
        let (router, client) = client_with(wallet).await;

        let err = client.generate(&scenario_input()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSignatureLength);
        assert_eq!(client.wallet().sign_calls(), 1);
        assert!(router.received().is_empty());
    }
}

#[tokio::test]
async fn wallet_failures_are_reported() {
    let wallet = MockWallet::failing(TEST_WALLETS[0].clone(), "user rejected the request");
    let (router, client) = client_with(wallet).await;

    let err = client.generate(&scenario_input()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SigningFailed);
    assert!(err.to_string().contains("user rejected the request"));
    assert!(router.received().is_empty());
}

#[tokio::test]
async fn mismatched_signing_key_is_caught_by_the_router() {
    // Claims one key, signs with the other.
    let wallet = MockWallet::new(TEST_WALLETS[1].clone()).with_public_key_id(TEST_SIGNER_0);
    let (router, client) = client_with(wallet).await;

    let err = client.generate(&scenario_input()).await.unwrap_err();
    assert_eq!(err.http_status(), Some(401));
    assert_eq!(router.received().len(), 1);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_signing() {
    let wallet = MockWallet::new(TEST_WALLETS[0].clone());
    let (router, client) = client_with(wallet).await;

    let inputs = [
        GenerateInput::new("snowy-xl", "hi"),
        GenerateInput::new("snowy-base", ""),
        GenerateInput::new("snowy-base", "hi").with_temperature(f64::INFINITY),
        GenerateInput::new("snowy-base", "hi").with_max_tokens(u64::from(u32::MAX) + 1),
    ];
    for input in inputs {
        let err = client.generate(&input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
    assert_eq!(client.wallet().sign_calls(), 0);
    assert!(router.received().is_empty());
}

fn block_on<F: core::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
}

proptest! {
    #[test]
    fn any_signature_length_but_64_is_rejected(len in 0usize..160) {
        prop_assume!(len != 64);
        let wallet = MockWallet::with_signature_len(TEST_WALLETS[0].clone(), len);
        let err = block_on(build_signed_request_with(
            &scenario_input(),
            &wallet,
            test_constants::PROGRAM_ID,
            &Sha256Hasher,
            0,
        ))
        .unwrap_err();
        let rejected = matches!(err, RequestError::InvalidSignatureLength { len: l } if l == len);
        prop_assert!(rejected, "unexpected error for {} byte signature: {}", len, err);
    }

    #[test]
    fn signed_requests_verify(
        seed in any::<[u8; 32]>(),
        prompt in "\\PC{1,64}",
        temperature in -2.0f64..2.0,
        max_tokens in 0u64..=u64::from(u32::MAX),
        timestamp in any::<i64>(),
    ) {
        let wallet = LocalWallet::from_bytes(&seed);
        let input = GenerateInput::new("snowy-meme", prompt)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens)
            .with_timestamp(timestamp);

        let request = block_on(build_signed_request_with(
            &input,
            &wallet,
            test_constants::PROGRAM_ID,
            &Sha256Hasher,
            0,
        ))
        .unwrap();
        prop_assert_eq!(request.signer(), wallet.public_key_id());
        prop_assert!(request.verify(&Sha256Hasher).is_ok());

        let wire = serde_json::to_string(&request).unwrap();
        let parsed: snowy_types::SignedRequest = serde_json::from_str(&wire).unwrap();
        prop_assert!(parsed.verify(&Sha256Hasher).is_ok());
    }
}
