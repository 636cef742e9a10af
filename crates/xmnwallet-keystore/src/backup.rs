//! Seed-word confirmation state machine for new accounts.
//!
//! A freshly generated mnemonic must be written down and re-entered
//! before it is used to protect a key:
//!
//! ```text
//! ShowWords → ConfirmWords → Complete
//! ```
//!
//! The words are readable only in `ShowWords`, and the mnemonic can be
//! taken out only once the flow is `Complete`. The mnemonic zeroizes
//! itself when the flow is dropped in any state.

use xmnwallet_crypto::mnemonic::{self, Mnemonic};
use xmnwallet_types::{Language, Result, WordCount, XmnError};

// ---------------------------------------------------------------------------
// BackupState
// ---------------------------------------------------------------------------

/// States of the confirmation flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackupState {
    /// Words are available for display.
    ShowWords,
    /// User has acknowledged viewing; awaiting re-entry.
    ConfirmWords,
    /// Re-entered words matched. Flow is finished.
    Complete,
}

// ---------------------------------------------------------------------------
// BackupFlow
// ---------------------------------------------------------------------------

/// Confirmation flow around one mnemonic.
pub struct BackupFlow {
    state: BackupState,
    mnemonic: Mnemonic,
}

impl BackupFlow {
    /// Starts a flow for an existing mnemonic, in [`BackupState::ShowWords`].
    pub fn new(mnemonic: Mnemonic) -> Self {
        Self {
            state: BackupState::ShowWords,
            mnemonic,
        }
    }

    /// Generates a new mnemonic and starts a flow for it.
    pub fn generate(language: Language, word_count: WordCount) -> Result<Self> {
        Ok(Self::new(mnemonic::generate(language, word_count)?))
    }

    /// Returns the current state.
    pub fn state(&self) -> BackupState {
        self.state
    }

    /// Returns the words for display.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::InvalidState`] outside [`BackupState::ShowWords`].
    pub fn words(&self) -> Result<&[String]> {
        if self.state != BackupState::ShowWords {
            return Err(XmnError::InvalidState {
                reason: "words are only available in ShowWords state".into(),
            });
        }
        Ok(self.mnemonic.words())
    }

    /// Moves from [`BackupState::ShowWords`] to [`BackupState::ConfirmWords`].
    pub fn acknowledge_shown(&mut self) -> Result<()> {
        if self.state != BackupState::ShowWords {
            return Err(XmnError::InvalidState {
                reason: "can only acknowledge from ShowWords state".into(),
            });
        }
        self.state = BackupState::ConfirmWords;
        Ok(())
    }

    /// Compares re-entered words (trimmed, case-insensitive) with the
    /// mnemonic and completes the flow on a match.
    ///
    /// A mismatch leaves the flow in [`BackupState::ConfirmWords`] so the
    /// user can retry.
    ///
    /// # Errors
    ///
    /// - [`XmnError::InvalidState`] outside `ConfirmWords`.
    /// - [`XmnError::ConfirmationMismatch`] if the words differ.
    pub fn confirm<S: AsRef<str>>(&mut self, words: &[S]) -> Result<()> {
        if self.state != BackupState::ConfirmWords {
            return Err(XmnError::InvalidState {
                reason: "can only confirm from ConfirmWords state".into(),
            });
        }

        if !self.mnemonic.matches(words) {
            return Err(XmnError::ConfirmationMismatch);
        }

        self.state = BackupState::Complete;
        Ok(())
    }

    /// Returns `true` once the words were confirmed.
    pub fn is_complete(&self) -> bool {
        self.state == BackupState::Complete
    }

    /// Consumes a completed flow and returns the confirmed mnemonic.
    ///
    /// # Errors
    ///
    /// Returns [`XmnError::InvalidState`] before [`BackupState::Complete`];
    /// the flow (and its mnemonic) is dropped in that case.
    pub fn into_mnemonic(self) -> Result<Mnemonic> {
        if self.state != BackupState::Complete {
            return Err(XmnError::InvalidState {
                reason: "mnemonic can only be taken after confirmation".into(),
            });
        }
        Ok(self.mnemonic)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use xmnwallet_crypto::mnemonic::entropy_to_mnemonic;

    fn flow() -> std::result::Result<BackupFlow, XmnError> {
        Ok(BackupFlow::new(entropy_to_mnemonic(&[0x80; 16], Language::English)?))
    }

    #[test]
    fn happy_path() -> std::result::Result<(), XmnError> {
        let mut flow = flow()?;
        assert_eq!(flow.state(), BackupState::ShowWords);
        let shown: Vec<String> = flow.words()?.to_vec();
        assert_eq!(shown[0], "letter");

        flow.acknowledge_shown()?;
        assert!(flow.words().is_err());

        let upper: Vec<String> = shown.iter().map(|w| w.to_uppercase()).collect();
        flow.confirm(&upper)?;
        assert!(flow.is_complete());

        let mnemonic = flow.into_mnemonic()?;
        assert_eq!(mnemonic.words(), shown.as_slice());
        Ok(())
    }

    #[test]
    fn mismatch_allows_retry() -> std::result::Result<(), XmnError> {
        let mut flow = flow()?;
        let mut entered: Vec<String> = flow.words()?.to_vec();
        flow.acknowledge_shown()?;

        let correct = entered.clone();
        entered.swap(0, 1);
        assert!(matches!(flow.confirm(&entered), Err(XmnError::ConfirmationMismatch)));
        assert_eq!(flow.state(), BackupState::ConfirmWords);

        assert!(matches!(
            flow.confirm(&correct[..11]),
            Err(XmnError::ConfirmationMismatch)
        ));

        flow.confirm(&correct)?;
        assert!(flow.is_complete());
        Ok(())
    }

    #[test]
    fn out_of_order_transitions_rejected() -> std::result::Result<(), XmnError> {
        let mut flow = flow()?;
        let words: Vec<String> = flow.words()?.to_vec();

        assert!(matches!(flow.confirm(&words), Err(XmnError::InvalidState { .. })));

        flow.acknowledge_shown()?;
        assert!(matches!(
            flow.acknowledge_shown(),
            Err(XmnError::InvalidState { .. })
        ));
        Ok(())
    }

    #[test]
    fn into_mnemonic_requires_completion() -> std::result::Result<(), XmnError> {
        assert!(matches!(flow()?.into_mnemonic(), Err(XmnError::InvalidState { .. })));
        Ok(())
    }

    #[test]
    fn generated_flow_starts_showing() -> std::result::Result<(), XmnError> {
        let flow = BackupFlow::generate(Language::Italian, WordCount::Fifteen)?;
        assert_eq!(flow.words()?.len(), 15);
        Ok(())
    }
}
