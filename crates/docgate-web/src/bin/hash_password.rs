//! Prints a `[[users]]` config entry with an argon2 hash of a password
//! read from stdin.
//!
//! Usage: `hash_password <username>`

use std::io::{self, Write};

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

fn main() -> anyhow::Result<()> {
    let username = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: hash_password <username>"))?;

    eprint!("Enter password for {username}: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    println!("[[users]]");
    println!("username = {username:?}");
    println!("password_hash = \"{hash}\"");
    Ok(())
}
