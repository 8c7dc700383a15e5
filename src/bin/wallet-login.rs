// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign in to the wallet sign-in server with a local private key.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WALLET_PRIVATE_KEY` | Hex secp256k1 key used to sign | required |
//! | `AUTH_SERVER_URL` | Server base URL | `http://localhost:3001` |
//! | `WALLET_USER_NAME` | Display name sent with the login | unset |

use std::env;
use std::error::Error;

use alloy::signers::local::PrivateKeySigner;
use wallet_signin::client::{shorten_address, AuthClient, DEFAULT_SERVER_URL};
use wallet_signin::config::LogFormat;
use wallet_signin::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::Pretty);

    let key = env::var("WALLET_PRIVATE_KEY")
        .map_err(|_| "WALLET_PRIVATE_KEY must be set to a hex private key")?;
    let signer: PrivateKeySigner = key.trim().parse()?;

    let server_url = env::var("AUTH_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let user_name = env::var("WALLET_USER_NAME").ok().filter(|n| !n.trim().is_empty());

    let client = AuthClient::new(&server_url)?;
    let session = client.sign_in(&signer, user_name.as_deref()).await?;

    let address = session.address.to_checksum(None);
    tracing::info!(
        address = %shorten_address(&address),
        server = %server_url,
        "Wallet connected"
    );

    let profile = client.current_user(&session.session_id).await?;
    if let Some(name) = profile.display_name {
        tracing::info!(user_id = %profile.id, name = %name, "Welcome back");
    }

    println!("{}", session.session_id);
    Ok(())
}
