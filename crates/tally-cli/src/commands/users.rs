//! User command implementations

use anyhow::{bail, Context, Result};
use tally_core::{Error, Ledger, NewUser};

pub async fn cmd_user_add(
    ledger: &Ledger,
    identity: i64,
    name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let user = NewUser {
        name,
        last_name,
        email,
        external_identity: identity,
    };

    match ledger.register_user(user).await {
        Ok(id) => {
            println!("✓ Added user {} (identity {})", id, identity);
            Ok(())
        }
        Err(Error::DuplicateIdentity(identity)) => {
            bail!("User with identity {} already exists", identity)
        }
        Err(e) => Err(e).context("Failed to add user"),
    }
}

pub fn cmd_user_show(ledger: &Ledger, identity: i64) -> Result<()> {
    let Some(user) = ledger.database().get_user(identity)? else {
        bail!("No user with identity {}", identity);
    };

    let full_name = [user.name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    println!();
    println!("👤 User {}", user.id);
    println!("   Identity: {}", user.external_identity);
    if !full_name.is_empty() {
        println!("   Name:     {}", full_name);
    }
    if let Some(email) = &user.email {
        println!("   Email:    {}", email);
    }
    println!("   Since:    {}", user.created_at.format("%Y-%m-%d"));

    Ok(())
}
