//! Gate for generating plan suggestions.

use serde::Serialize;

/// Suggestions need at least this many memories to be meaningful.
pub const MIN_MEMORIES_FOR_SUGGESTIONS: usize = 7;

/// Whether a user has recorded enough memories for suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestionEligibility {
    pub memory_count: usize,
    pub required: usize,
    pub eligible: bool,
}

impl SuggestionEligibility {
    /// Memories still missing before suggestions unlock.
    pub fn remaining(&self) -> usize {
        self.required.saturating_sub(self.memory_count)
    }
}

pub fn eligibility(memory_count: usize) -> SuggestionEligibility {
    SuggestionEligibility {
        memory_count,
        required: MIN_MEMORIES_FOR_SUGGESTIONS,
        eligible: memory_count >= MIN_MEMORIES_FOR_SUGGESTIONS,
    }
}
