//! # Storefront Shell
//!
//! Entry point. All logic lives in the library crate.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_shell::run().await
}
