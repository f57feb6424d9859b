//! Colon-delimited text form of an identity.
//!
//! ```text
//! address:type:public[:secret]
//! ```
//!
//! The address is exactly 10 lowercase hex digits and the type is a
//! single digit (`0` or `1`). Type-0 key fields are lowercase hex
//! (128 characters each); type-1 key fields are unpadded lowercase
//! RFC 4648 base32 (183 characters public, 180 secret). The form is
//! canonical: encoding a decoded identity reproduces the input.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;

use super::{
    Address, Identity, IdentityError, IdentityKeys, IdentityType, C25519_PUBLIC_KEY_SIZE,
    C25519_SECRET_KEY_SIZE, P384_PUBLIC_KEY_SIZE, P384_SECRET_KEY_SIZE,
};

const B32: Alphabet = Alphabet::Rfc4648Lower { padding: false };

/// Generous upper bound on the text form including a trailing NUL:
/// `10 + ":1:" + 183 + ":" + 180 + 1` rounded up.
pub const IDENTITY_STRING_SIZE_MAX: usize = 384;

impl Identity {
    /// Render the text form, appending the secret field only when
    /// `include_private` is set and secret material is present. The
    /// secret bytes are never touched otherwise.
    pub fn to_string_with_private(&self, include_private: bool) -> String {
        let mut out = String::with_capacity(IDENTITY_STRING_SIZE_MAX);
        out.push_str(&self.address().to_string());
        match &self.keys {
            IdentityKeys::C25519 { public, secret } => {
                out.push_str(":0:");
                out.push_str(&hex::encode(public));
                if include_private {
                    if let Some(secret) = secret {
                        out.push(':');
                        out.push_str(&hex::encode(secret.0));
                    }
                }
            }
            IdentityKeys::P384 { public, secret } => {
                out.push_str(":1:");
                out.push_str(&base32::encode(B32, public.as_bytes()));
                if include_private {
                    if let Some(secret) = secret {
                        out.push(':');
                        out.push_str(&base32::encode(B32, &secret.to_bytes()));
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Identity {
    /// The public text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_private(false))
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 3 || fields.len() > 4 {
            return Err(IdentityError::BadFieldCount(fields.len()));
        }

        let address: Address = fields[0].parse()?;
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress);
        }

        let kind = match fields[1] {
            "0" => IdentityType::C25519,
            "1" => IdentityType::P384,
            other => return Err(IdentityError::UnsupportedType(other.parse().unwrap_or(u8::MAX))),
        };

        match kind {
            IdentityType::C25519 => {
                let public = hex_field::<C25519_PUBLIC_KEY_SIZE>(fields[2])?;
                let secret = match fields.get(3) {
                    Some(field) => Some(hex_field::<C25519_SECRET_KEY_SIZE>(field)?),
                    None => None,
                };
                Identity::assemble_c25519(address, public, secret)
            }
            IdentityType::P384 => {
                let public = base32_field::<P384_PUBLIC_KEY_SIZE>(fields[2])?;
                let secret = match fields.get(3) {
                    Some(field) => Some(base32_field::<P384_SECRET_KEY_SIZE>(field)?),
                    None => None,
                };
                Identity::assemble_p384(address, public, secret)
            }
        }
    }
}

fn hex_field<const N: usize>(field: &str) -> Result<[u8; N], IdentityError> {
    let bytes = hex::decode(field)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidLength { expected: N, got: bytes.len() })
}

fn base32_field<const N: usize>(field: &str) -> Result<[u8; N], IdentityError> {
    let bytes = base32::decode(B32, field).ok_or(IdentityError::InvalidBase32)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidLength { expected: N, got: bytes.len() })
}
