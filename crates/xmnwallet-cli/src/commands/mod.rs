//! Subcommand implementations.

pub mod key;
pub mod mnemonic;
pub mod sign;

use zeroize::Zeroizing;

/// Splits word arguments on whitespace so both `a b c` and `"a b c"` work.
pub fn split_words(args: &[String]) -> Zeroizing<Vec<String>> {
    Zeroizing::new(
        args.iter()
            .flat_map(|arg| arg.split_whitespace())
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_flattens_quoted_groups() {
        let args = vec!["legal winner".to_string(), " thank ".to_string()];
        assert_eq!(split_words(&args).as_slice(), ["legal", "winner", "thank"]);
    }
}
