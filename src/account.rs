use crate::error::AccountParseError;
use fuels::types::Address;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

const ADDRESS_BYTES: usize = 32;
const ADDRESS_HEX_LEN: usize = ADDRESS_BYTES * 2;

/// A wallet address in canonical form: `0x` followed by 64 lowercase hex
/// digits. Equality is on the canonical form, so differently-cased inputs
/// name the same account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Account(String);

impl Account {
    pub fn parse(raw: &str) -> Result<Self, AccountParseError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(AccountParseError::Empty);
        }
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(AccountParseError::Length {
                expected: ADDRESS_HEX_LEN,
                actual: digits.len(),
            });
        }
        hex::decode(digits).map_err(|e| AccountParseError::NotHex(e.to_string()))?;
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES] {
        let mut out = [0u8; ADDRESS_BYTES];
        // canonical form was validated in `parse`
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }

    /// Shortened `0x1234…abcd` form for status lines.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        let bytes: [u8; ADDRESS_BYTES] = address.into();
        Self(format!("0x{}", hex::encode(bytes)))
    }
}

impl From<&Account> for Address {
    fn from(account: &Account) -> Self {
        Address::from(account.to_bytes())
    }
}

impl FromStr for Account {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Account {
    type Error = AccountParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Account> for String {
    fn from(account: Account) -> Self {
        account.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
