//! Mnemonic generation, validation, and entropy recovery.
//!
//! Implements the standard checksummed word encoding for 12 to 24 words:
//!
//! 1. **Generation**: `ENT` bits of entropy → first `ENT / 32` bits of
//!    `SHA-256(entropy)` appended as checksum → split into 11-bit indices
//!    → one word per index from the language's 2048-word list.
//! 2. **Recovery**: map words back to indices, rebuild the entropy,
//!    recompute the checksum and compare.
//!
//! The checksum catches transcription errors before any key derivation
//! or decryption is attempted.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0039.mediawiki>

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use xmnwallet_types::{Language, Result, WordCount, XmnError};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::wordlist::{index_to_word, word_to_index};

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// An ordered, validated sequence of seed words in one language.
///
/// Words are stored normalized (trimmed, NFKD, lowercase) and zeroized on
/// drop. Construction always goes through checksum validation, so a
/// `Mnemonic` value is known to encode a valid entropy.
pub struct Mnemonic {
    words: Vec<String>,
    language: Language,
}

impl Drop for Mnemonic {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

// Mnemonic does not implement Clone/Debug to prevent leakage.

impl Mnemonic {
    /// Builds a mnemonic from user-supplied words in a known language.
    ///
    /// # Errors
    ///
    /// - [`XmnError::InvalidMnemonic`] if the sequence is empty or a word is
    ///   not in the list.
    /// - [`XmnError::InvalidWordCount`] for an unsupported length.
    /// - [`XmnError::ChecksumMismatch`] if the checksum bits disagree.
    pub fn from_words<S: AsRef<str>>(words: &[S], language: Language) -> Result<Self> {
        let mut normalized = normalize_words(words)?;
        words_to_entropy(&normalized, language)?;
        Ok(Self {
            words: std::mem::take(&mut *normalized),
            language,
        })
    }

    /// Builds a mnemonic from user-supplied words, detecting the language.
    ///
    /// Every registered list containing all of the words is tried in
    /// [`Language::ALL`] order; the first one whose checksum verifies
    /// wins.
    ///
    /// # Errors
    ///
    /// - [`XmnError::ChecksumMismatch`] if at least one list contains all
    ///   the words but none of them yields a valid checksum.
    /// - [`XmnError::InvalidMnemonic`] if no list contains all the words.
    /// - [`XmnError::InvalidWordCount`] for an unsupported length.
    pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let mut normalized = normalize_words(words)?;
        WordCount::from_count(normalized.len())?;

        let mut saw_candidate = false;
        for language in Language::ALL {
            if !normalized.iter().all(|w| word_to_index(language, w).is_some()) {
                continue;
            }
            saw_candidate = true;

            match words_to_entropy(&normalized, language) {
                Ok(_) => {
                    return Ok(Self {
                        words: std::mem::take(&mut *normalized),
                        language,
                    })
                }
                Err(XmnError::ChecksumMismatch) => continue,
                Err(e) => return Err(e),
            }
        }

        if saw_candidate {
            Err(XmnError::ChecksumMismatch)
        } else {
            Err(XmnError::InvalidMnemonic {
                reason: "words do not belong to any registered wordlist".into(),
            })
        }
    }

    /// Returns the words in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Returns the number of words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Returns the wordlist language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns the words joined for display.
    ///
    /// Japanese phrases use the ideographic space, every other language a
    /// plain space.
    pub fn phrase(&self) -> Zeroizing<String> {
        let separator = match self.language {
            Language::Japanese => "\u{3000}",
            _ => " ",
        };
        Zeroizing::new(self.words.join(separator))
    }

    /// Returns `true` if `words`, once normalized, equal this mnemonic.
    pub fn matches<S: AsRef<str>>(&self, words: &[S]) -> bool {
        words.len() == self.words.len()
            && words
                .iter()
                .zip(&self.words)
                .all(|(entered, stored)| *normalize_word(entered.as_ref()) == *stored)
    }
}

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Raw entropy recovered from, or used to build, a mnemonic.
///
/// Automatically zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Entropy(Vec<u8>);

impl Entropy {
    /// Returns the entropy bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the entropy length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the entropy is empty (never the case for a value
    /// produced by this module).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Entropy does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates a new random mnemonic from OS-level entropy.
///
/// # Errors
///
/// Returns [`XmnError::CryptoError`] if the OS random source fails.
pub fn generate(language: Language, word_count: WordCount) -> Result<Mnemonic> {
    generate_with_rng(&mut OsRng, language, word_count)
}

/// Generates a mnemonic drawing entropy from `rng`.
///
/// Exposed so callers (and tests) can supply a seeded generator.
pub fn generate_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    language: Language,
    word_count: WordCount,
) -> Result<Mnemonic> {
    let mut entropy = Zeroizing::new(vec![0u8; word_count.entropy_bytes()]);
    rng.try_fill_bytes(&mut entropy)
        .map_err(|e| XmnError::CryptoError {
            reason: format!("failed to generate entropy: {e}"),
        })?;

    entropy_to_mnemonic(&entropy, language)
}

/// Converts raw entropy into a mnemonic.
///
/// This is the deterministic core of generation. Entropy must be 16, 20,
/// 24, 28 or 32 bytes.
///
/// # Errors
///
/// Returns [`XmnError::InvalidWordCount`] for any other entropy length.
pub fn entropy_to_mnemonic(entropy: &[u8], language: Language) -> Result<Mnemonic> {
    let word_count = WordCount::from_entropy_len(entropy.len())?;
    let entropy_bits = word_count.entropy_bits();
    let checksum_bits = word_count.checksum_bits();

    // Checksum: leading ENT/32 bits of SHA-256(entropy), at most 8.
    let checksum_byte = Sha256::digest(entropy)[0];

    let mut bits = Zeroizing::new(Vec::with_capacity(entropy_bits + checksum_bits));
    for byte in entropy {
        for j in (0..8).rev() {
            bits.push((byte >> j) & 1);
        }
    }
    for j in 0..checksum_bits {
        bits.push((checksum_byte >> (7 - j)) & 1);
    }

    let mut words = Vec::with_capacity(word_count.count());
    for chunk in bits.chunks(11) {
        let idx = chunk
            .iter()
            .fold(0u16, |acc, bit| (acc << 1) | u16::from(*bit));

        let word = index_to_word(language, idx).ok_or_else(|| XmnError::CryptoError {
            reason: format!("word index {idx} out of range"),
        })?;
        words.push(word.to_string());
    }

    Ok(Mnemonic { words, language })
}

// ---------------------------------------------------------------------------
// Recovery / validation
// ---------------------------------------------------------------------------

/// Recovers the entropy encoded by a mnemonic.
///
/// A [`Mnemonic`] is validated on construction, so this only fails if
/// the value was built from inconsistent parts.
pub fn to_entropy(mnemonic: &Mnemonic) -> Result<Entropy> {
    words_to_entropy(mnemonic.words(), mnemonic.language())
}

/// Maps words back to entropy and verifies the checksum.
///
/// Words must already be normalized (see [`Mnemonic::from_words`]).
///
/// # Errors
///
/// - [`XmnError::InvalidWordCount`] if the length is unsupported.
/// - [`XmnError::InvalidMnemonic`] if a word is not in the list. The
///   error names the position, never the word.
/// - [`XmnError::ChecksumMismatch`] if the recomputed checksum differs.
pub fn words_to_entropy<S: AsRef<str>>(words: &[S], language: Language) -> Result<Entropy> {
    let word_count = WordCount::from_count(words.len())?;
    let entropy_bits = word_count.entropy_bits();
    let checksum_bits = word_count.checksum_bits();

    let mut bits = Zeroizing::new(Vec::with_capacity(entropy_bits + checksum_bits));
    for (position, word) in words.iter().enumerate() {
        let idx =
            word_to_index(language, word.as_ref()).ok_or_else(|| XmnError::InvalidMnemonic {
                reason: format!("word {} is not in the '{language}' wordlist", position + 1),
            })?;

        for j in (0..11).rev() {
            bits.push(((idx >> j) & 1) as u8);
        }
    }

    let mut entropy = vec![0u8; word_count.entropy_bytes()];
    for (i, bit) in bits[..entropy_bits].iter().enumerate() {
        entropy[i / 8] |= *bit << (7 - (i % 8));
    }
    let entropy = Entropy(entropy);

    let provided_checksum = bits[entropy_bits..]
        .iter()
        .fold(0u8, |acc, bit| (acc << 1) | bit);
    let expected_checksum = Sha256::digest(entropy.as_bytes())[0] >> (8 - checksum_bits);

    if provided_checksum != expected_checksum {
        return Err(XmnError::ChecksumMismatch);
    }

    Ok(entropy)
}

/// Normalizes each word with [`normalize_word`], rejecting an empty
/// sequence or empty words.
fn normalize_words<S: AsRef<str>>(words: &[S]) -> Result<Zeroizing<Vec<String>>> {
    if words.is_empty() {
        return Err(XmnError::InvalidMnemonic {
            reason: "mnemonic is empty".into(),
        });
    }

    let mut normalized = Zeroizing::new(Vec::with_capacity(words.len()));
    for (position, word) in words.iter().enumerate() {
        let mut word = normalize_word(word.as_ref());
        if word.is_empty() {
            return Err(XmnError::InvalidMnemonic {
                reason: format!("word {} is empty", position + 1),
            });
        }
        normalized.push(std::mem::take(&mut *word));
    }
    Ok(normalized)
}

/// Trims, decomposes to NFKD and lowercases one word.
///
/// The wordlists are stored in NFKD, while keyboards and IMEs usually
/// produce precomposed (NFC) text.
fn normalize_word(word: &str) -> Zeroizing<String> {
    let decomposed: Zeroizing<String> = Zeroizing::new(word.trim().nfkd().collect());
    Zeroizing::new(decomposed.to_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
