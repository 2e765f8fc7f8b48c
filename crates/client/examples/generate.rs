//! Send one prompt to a Snowy router.
//!
//! ```sh
//! SNOWY_NETWORK=devnet \
//! SNOWY_ENDPOINT=https://router.example/generate \
//! SNOWY_SECRET_KEY=<base58 seed or keypair> \
//! cargo run -p snowy-client --example generate -- "write a haiku about snow"
//! ```

use eyre::WrapErr;
use snowy_client::{ClientConfig, SnowyClient};
use snowy_types::{GenerateInput, LocalWallet, ModelKind, WalletIdentity};
use tracing_subscriber::EnvFilter;

const SECRET_KEY_ENV: &str = "SNOWY_SECRET_KEY";
const MODEL_ENV: &str = "SNOWY_MODEL";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let prompt = std::env::args().nth(1).unwrap_or_else(|| "hello from snowy".to_owned());
    let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| ModelKind::SnowyBase.to_string());

    let config = ClientConfig::from_env().wrap_err("failed to load client config")?;
    let secret =
        std::env::var(SECRET_KEY_ENV).wrap_err_with(|| format!("{SECRET_KEY_ENV} not set"))?;
    let wallet = LocalWallet::from_base58_secret(&secret).wrap_err("invalid secret key")?;
    println!("signer: {}", wallet.public_key_id());

    let client = SnowyClient::new(wallet, config)?;
    let input = GenerateInput::new(model, prompt);

    let request = client.sign_request(&input).await?;
    let attestation = request.attestation()?;
    println!("request hash: {}", request.request_hash());
    println!(
        "record address on {}: {} (bump {})",
        client.config().constants().cluster_url(),
        attestation.record_address_base58(),
        attestation.bump
    );

    let response = client.send_request(&request).await?;
    println!("{}", response.output);
    println!(
        "tokens: {} prompt, {} completion, {} total",
        response.usage.prompt_tokens, response.usage.completion_tokens, response.usage.total_tokens
    );

    Ok(())
}
