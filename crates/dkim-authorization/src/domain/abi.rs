//! # Minimal ABI Encoding
//!
//! Encodes a contract call from a human-readable function fragment such as
//! `function setDKIMPublicKeyHash(string domainName, bytes32 publicKeyHash, address authorizer, bytes signature)`.
//! No full contract interface is needed.
//!
//! Supported parameter types: `address`, `bool`, `string`, `bytes`,
//! `bytesN` (1..=32) and `uintN` / `uint`.

use primitive_types::U256;

use super::ecdsa::keccak256;
use super::entities::Address;
use super::errors::AbiError;

const WORD: usize = 32;

/// Solidity parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    String,
    Bytes,
    FixedBytes(usize),
    Uint(usize),
}

impl ParamType {
    fn parse(raw: &str) -> Result<Self, AbiError> {
        match raw {
            "address" => return Ok(ParamType::Address),
            "bool" => return Ok(ParamType::Bool),
            "string" => return Ok(ParamType::String),
            "bytes" => return Ok(ParamType::Bytes),
            "uint" => return Ok(ParamType::Uint(256)),
            _ => {}
        }

        if let Some(size) = raw.strip_prefix("bytes") {
            return match size.parse::<usize>() {
                Ok(n) if (1..=32).contains(&n) => Ok(ParamType::FixedBytes(n)),
                _ => Err(AbiError::UnsupportedType(raw.to_string())),
            };
        }
        if let Some(bits) = raw.strip_prefix("uint") {
            return match bits.parse::<usize>() {
                Ok(n) if n % 8 == 0 && (8..=256).contains(&n) => Ok(ParamType::Uint(n)),
                _ => Err(AbiError::UnsupportedType(raw.to_string())),
            };
        }

        Err(AbiError::UnsupportedType(raw.to_string()))
    }

    /// Canonical spelling used in the selector signature.
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Bool => "bool".to_string(),
            ParamType::String => "string".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes(n) => format!("bytes{n}"),
            ParamType::Uint(n) => format!("uint{n}"),
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Bytes)
    }
}

/// Argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Uint(U256),
}

/// A parsed function fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFragment {
    pub name: String,
    pub inputs: Vec<ParamType>,
}

impl FunctionFragment {
    /// Parse `[function ]name(type [name], ...)`.
    pub fn parse(fragment: &str) -> Result<Self, AbiError> {
        let trimmed = fragment.trim();
        let body = trimmed.strip_prefix("function ").unwrap_or(trimmed).trim();

        let open = body
            .find('(')
            .ok_or_else(|| AbiError::InvalidFragment(fragment.to_string()))?;
        let close = body
            .rfind(')')
            .filter(|&close| close > open)
            .ok_or_else(|| AbiError::InvalidFragment(fragment.to_string()))?;

        let name = body[..open].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AbiError::InvalidFragment(fragment.to_string()));
        }

        let params = body[open + 1..close].trim();
        let inputs = if params.is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(|param| {
                    let ty = param
                        .split_whitespace()
                        .next()
                        .ok_or_else(|| AbiError::InvalidFragment(fragment.to_string()))?;
                    ParamType::parse(ty)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            name: name.to_string(),
            inputs,
        })
    }

    /// `name(type1,type2,...)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(ParamType::canonical).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// First four bytes of keccak256 of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        if args.len() != self.inputs.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.inputs.len(),
                actual: args.len(),
            });
        }

        let mut head = Vec::with_capacity(self.inputs.len() * WORD);
        let mut tail = Vec::new();
        let head_size = self.inputs.len() * WORD;

        for (index, (ty, token)) in self.inputs.iter().zip(args).enumerate() {
            if ty.is_dynamic() {
                head.extend_from_slice(&u256_word(U256::from(head_size + tail.len())));
                tail.extend(encode_dynamic(index, ty, token)?);
            } else {
                head.extend_from_slice(&encode_static(index, ty, token)?);
            }
        }

        let mut out = Vec::with_capacity(4 + head.len() + tail.len());
        out.extend_from_slice(&self.selector());
        out.extend(head);
        out.extend(tail);
        Ok(out)
    }
}

/// Parse a fragment and encode a call in one step.
pub fn encode_call(fragment: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
    FunctionFragment::parse(fragment)?.encode_call(args)
}

fn mismatch(index: usize, ty: &ParamType) -> AbiError {
    AbiError::TypeMismatch {
        index,
        expected: ty.canonical(),
    }
}

fn u256_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn encode_static(index: usize, ty: &ParamType, token: &Token) -> Result<[u8; WORD], AbiError> {
    let mut word = [0u8; WORD];
    match (ty, token) {
        (ParamType::Address, Token::Address(address)) => {
            word[12..].copy_from_slice(address.as_bytes());
        }
        (ParamType::Bool, Token::Bool(flag)) => {
            word[31] = u8::from(*flag);
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(bytes)) => {
            if bytes.len() != *size {
                return Err(AbiError::FixedBytesLength {
                    size: *size,
                    actual: bytes.len(),
                });
            }
            word[..bytes.len()].copy_from_slice(bytes);
        }
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(mismatch(index, ty));
            }
            word = u256_word(*value);
        }
        _ => return Err(mismatch(index, ty)),
    }
    Ok(word)
}

fn encode_dynamic(index: usize, ty: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    let data: &[u8] = match (ty, token) {
        (ParamType::String, Token::String(text)) => text.as_bytes(),
        (ParamType::Bytes, Token::Bytes(bytes)) => bytes,
        _ => return Err(mismatch(index, ty)),
    };

    let padded_len = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&u256_word(U256::from(data.len())));
    out.extend_from_slice(data);
    out.resize(WORD + padded_len, 0);
    Ok(out)
}
