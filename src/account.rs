//! Game accounts, one per init-data token.

use std::path::Path;

use crate::error::{Error, Result};

const USERNAME_KEY: &str = "\"username\":\"";
const UNKNOWN_NAME: &str = "Unknown";

/// One account's credential and the name it is logged under.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    token: String,
    name: String,
}

// The token is a credential; keep it out of `{:?}` output.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("name", &self.name).finish()
    }
}

impl Account {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let name = extract_username(&token).unwrap_or_else(|| UNKNOWN_NAME.to_string());
        Self { token, name }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the `authorization` header sent with every request.
    pub fn authorization(&self) -> String {
        format!("initData {}", self.token)
    }
}

fn extract_username(token: &str) -> Option<String> {
    let decoded = urlencoding::decode(token).ok()?;
    let start = decoded.find(USERNAME_KEY)? + USERNAME_KEY.len();
    let len = decoded[start..].find('"')?;
    Some(decoded[start..start + len].to_string())
}

/// Parse a newline-delimited token list. Blank lines are ignored.
pub fn parse_accounts(text: &str) -> Result<Vec<Account>> {
    let accounts: Vec<Account> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Account::new)
        .collect();
    if accounts.is_empty() {
        return Err(Error::Config("no accounts found".into()));
    }
    Ok(accounts)
}

pub fn load_accounts(path: &Path) -> Result<Vec<Account>> {
    let text = std::fs::read_to_string(path)?;
    parse_accounts(&text)
}
