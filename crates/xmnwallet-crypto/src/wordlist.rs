//! Registered mnemonic wordlists.
//!
//! The ten standard 2048-word lists are taken from the `bip39` crate;
//! this module only maps a [`Language`] to its list and performs index
//! lookups in both directions.

use xmnwallet_types::Language;

/// Number of words in every registered list (2^11).
pub const WORDLIST_LEN: usize = 2048;

/// Returns the full wordlist registered for `language`.
pub fn wordlist(language: Language) -> &'static [&'static str; WORDLIST_LEN] {
    bip39_language(language).word_list()
}

/// Returns the word at `index`, or `None` if `index >= 2048`.
pub fn index_to_word(language: Language, index: u16) -> Option<&'static str> {
    wordlist(language).get(usize::from(index)).copied()
}

/// Returns the 11-bit index of `word`, or `None` if the word is not in
/// the list.
///
/// The English list is sorted and searched by bisection; the others are
/// not guaranteed to be in byte order and are scanned.
pub fn word_to_index(language: Language, word: &str) -> Option<u16> {
    let list = wordlist(language);
    let position = match language {
        Language::English => list.binary_search(&word).ok(),
        _ => list.iter().position(|w| *w == word),
    };
    position.and_then(|i| u16::try_from(i).ok())
}

/// Returns `true` if `word` belongs to the `language` list.
pub fn contains(language: Language, word: &str) -> bool {
    word_to_index(language, word).is_some()
}

fn bip39_language(language: Language) -> bip39::Language {
    match language {
        Language::English => bip39::Language::English,
        Language::Spanish => bip39::Language::Spanish,
        Language::French => bip39::Language::French,
        Language::Italian => bip39::Language::Italian,
        Language::Portuguese => bip39::Language::Portuguese,
        Language::Japanese => bip39::Language::Japanese,
        Language::Korean => bip39::Language::Korean,
        Language::Czech => bip39::Language::Czech,
        Language::ChineseSimplified => bip39::Language::SimplifiedChinese,
        Language::ChineseTraditional => bip39::Language::TraditionalChinese,
    }
}
