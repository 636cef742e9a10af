//! Core shared types for the XMN key core.
//!
//! This crate defines the error taxonomy, the mnemonic language tag and
//! word-count types, and the keystore configuration shared by every other
//! crate in the workspace. It performs no cryptography itself.

pub mod config;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language tag selecting one of the registered 2048-word mnemonic lists.
///
/// Parsed from short tags (`"en"`, `"zh-hans"`, ...) or English names
/// (`"english"`), case-insensitively.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    Italian,
    Portuguese,
    Japanese,
    Korean,
    Czech,
    ChineseSimplified,
    ChineseTraditional,
}

impl Language {
    /// Every registered language, English first.
    ///
    /// The order matters for auto-detection: a word sequence valid in
    /// several lists resolves to the earliest one.
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::Italian,
        Language::Portuguese,
        Language::Japanese,
        Language::Korean,
        Language::Czech,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
    ];

    /// Returns the canonical short tag (`"en"`, `"zh-hans"`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Czech => "cs",
            Self::ChineseSimplified => "zh-hans",
            Self::ChineseTraditional => "zh-hant",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = XmnError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lang = match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Self::English,
            "es" | "spanish" => Self::Spanish,
            "fr" | "french" => Self::French,
            "it" | "italian" => Self::Italian,
            "pt" | "portuguese" => Self::Portuguese,
            "ja" | "jp" | "japanese" => Self::Japanese,
            "ko" | "korean" => Self::Korean,
            "cs" | "czech" => Self::Czech,
            "zh" | "zh-hans" | "zh-cn" | "chinese-simplified" => Self::ChineseSimplified,
            "zh-hant" | "zh-tw" | "chinese-traditional" => Self::ChineseTraditional,
            _ => {
                return Err(XmnError::UnsupportedLanguage {
                    language: s.to_string(),
                })
            }
        };
        Ok(lang)
    }
}

impl TryFrom<String> for Language {
    type Error = XmnError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.tag().to_string()
    }
}

// ---------------------------------------------------------------------------
// WordCount
// ---------------------------------------------------------------------------

/// Supported mnemonic lengths and their entropy sizes.
///
/// | Words | Entropy bits | Checksum bits |
/// |-------|--------------|---------------|
/// | 12    | 128          | 4             |
/// | 15    | 160          | 5             |
/// | 18    | 192          | 6             |
/// | 21    | 224          | 7             |
/// | 24    | 256          | 8             |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum WordCount {
    #[default]
    Twelve,
    Fifteen,
    Eighteen,
    TwentyOne,
    TwentyFour,
}

impl WordCount {
    /// Resolves a raw word count.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::InvalidWordCount`] for any count that does not
    /// correspond to a supported entropy size.
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            12 => Ok(Self::Twelve),
            15 => Ok(Self::Fifteen),
            18 => Ok(Self::Eighteen),
            21 => Ok(Self::TwentyOne),
            24 => Ok(Self::TwentyFour),
            other => Err(XmnError::InvalidWordCount { count: other }),
        }
    }

    /// Resolves the word count matching an entropy length in bytes.
    pub fn from_entropy_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Twelve),
            20 => Ok(Self::Fifteen),
            24 => Ok(Self::Eighteen),
            28 => Ok(Self::TwentyOne),
            32 => Ok(Self::TwentyFour),
            // 3 words per 4 bytes of entropy.
            other => Err(XmnError::InvalidWordCount {
                count: other * 3 / 4,
            }),
        }
    }

    /// Number of words.
    pub fn count(&self) -> usize {
        match self {
            Self::Twelve => 12,
            Self::Fifteen => 15,
            Self::Eighteen => 18,
            Self::TwentyOne => 21,
            Self::TwentyFour => 24,
        }
    }

    /// Entropy length in bytes.
    pub fn entropy_bytes(&self) -> usize {
        self.entropy_bits() / 8
    }

    /// Entropy length in bits.
    pub fn entropy_bits(&self) -> usize {
        self.count() * 11 * 32 / 33
    }

    /// Checksum length in bits (`entropy_bits / 32`).
    pub fn checksum_bits(&self) -> usize {
        self.entropy_bits() / 32
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

// ---------------------------------------------------------------------------
// XmnError
// ---------------------------------------------------------------------------

/// Unified error type for the XMN key core.
///
/// Every fallible operation in the workspace returns a variant of this
/// enum. `AuthenticationFailed` deliberately carries no detail: a wrong
/// passphrase and a tampered ciphertext are reported identically.
#[derive(Debug, Error)]
pub enum XmnError {
    /// No wordlist is registered for the requested language tag.
    #[error("unsupported mnemonic language: {language}")]
    UnsupportedLanguage {
        /// The tag as supplied by the caller.
        language: String,
    },

    /// The word count does not map to a supported entropy size.
    #[error("invalid mnemonic word count: {count} (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount {
        /// The rejected count.
        count: usize,
    },

    /// The words are all in the list but their checksum bits disagree
    /// with the entropy they encode.
    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    /// The mnemonic is malformed: empty, or contains unknown words.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Wrong passphrase words or tampered ciphertext.
    #[error("authentication failed: wrong pass words or corrupted key data")]
    AuthenticationFailed,

    /// The key file is structurally invalid (magic, version, length,
    /// parameters). Detected before any cryptographic work.
    #[error("malformed key file: {reason}")]
    MalformedFile {
        /// Human-readable description of the structural problem.
        reason: String,
    },

    /// Private key bytes of the wrong length or encoding.
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// An Ed25519 signature did not verify.
    #[error("invalid signature: {reason}")]
    SignatureInvalid {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// A cryptographic primitive failed for a reason other than
    /// authentication (e.g. the OS random source is unavailable).
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// Reading or writing a key file failed.
    #[error("storage error: {reason}")]
    StorageError {
        /// Human-readable description of the I/O failure.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },

    /// An operation was attempted in the wrong state of a flow.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Human-readable description of the expected state.
        reason: String,
    },

    /// Re-entered seed words differ from the generated ones.
    #[error("confirmation words do not match the generated mnemonic")]
    ConfirmationMismatch,
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`XmnError`].
pub type Result<T> = std::result::Result<T, XmnError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
