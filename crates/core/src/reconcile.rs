//! Reconciliation between the local and remote copies of a partner profile.
//!
//! The decision is one-sided and all-or-nothing: the local copy is only
//! consulted when it carries real data and the remote copy does not. When
//! both carry real data the remote copy wins unchanged and the local edits
//! are dropped; that case is logged so it is at least observable.

use crate::error::DataError;
use crate::profile::{is_placeholder, PartnerProfile};

/// Terminal state of one profile fetch.
///
/// All three variants populate the request cache the same way; they differ
/// only in whether the merged result must be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileResolution {
    /// The local copy was more complete; the result must be persisted remotely.
    Merged(PartnerProfile),
    /// The remote copy (possibly absent) is returned as-is.
    NoMergeNeeded(Option<PartnerProfile>),
    /// The remote fetch failed; the local copy is served instead.
    LocalFallback {
        profile: Option<PartnerProfile>,
        cause: DataError,
    },
}

impl ProfileResolution {
    pub fn profile(&self) -> Option<&PartnerProfile> {
        match self {
            Self::Merged(profile) => Some(profile),
            Self::NoMergeNeeded(profile) | Self::LocalFallback { profile, .. } => profile.as_ref(),
        }
    }

    pub fn into_profile(self) -> Option<PartnerProfile> {
        match self {
            Self::Merged(profile) => Some(profile),
            Self::NoMergeNeeded(profile) | Self::LocalFallback { profile, .. } => profile,
        }
    }

    /// Short label for logs and tests.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Merged(_) => "merged",
            Self::NoMergeNeeded(_) => "no_merge_needed",
            Self::LocalFallback { .. } => "local_fallback",
        }
    }
}

/// Whether `local` should be preferred over `remote`.
///
/// An absent remote copy always loses to an existing local one.
pub fn is_local_more_complete(local: &PartnerProfile, remote: Option<&PartnerProfile>) -> bool {
    match remote {
        None => true,
        Some(remote) => local.has_real_data() && !remote.has_real_data(),
    }
}

/// Merge `local` into `remote`, keeping the remote identity and timestamps.
///
/// Each reconciled field is taken from `local` when the local value is
/// itself meaningful, otherwise from `remote`.
pub fn merge_profiles(local: &PartnerProfile, remote: &PartnerProfile) -> PartnerProfile {
    let mut merged = remote.clone();

    if !is_placeholder(&local.favorite_color) {
        merged.favorite_color = local.favorite_color.clone();
    }
    if !is_placeholder(&local.favorite_food) {
        merged.favorite_food = local.favorite_food.clone();
    }
    if !local.favorite_hobbies.is_empty() {
        merged.favorite_hobbies = local.favorite_hobbies.clone();
    }
    if !local.important_dates.is_empty() {
        merged.important_dates = local.important_dates.clone();
    }
    if !local.notes.trim().is_empty() {
        merged.notes = local.notes.clone();
    }

    merged
}

/// Decide the outcome of a profile fetch given the remote result and the
/// local copy read alongside it.
pub fn resolve(
    remote: Result<Option<PartnerProfile>, DataError>,
    local: Option<PartnerProfile>,
) -> ProfileResolution {
    let remote = match remote {
        Ok(remote) => remote,
        Err(cause) => {
            return ProfileResolution::LocalFallback {
                profile: local,
                cause,
            }
        }
    };

    let Some(local) = local else {
        return ProfileResolution::NoMergeNeeded(remote);
    };

    if !is_local_more_complete(&local, remote.as_ref()) {
        if let Some(remote) = &remote {
            if local.has_real_data() && remote.has_real_data() && !same_content(&local, remote) {
                tracing::warn!(
                    "Local and remote partner profiles both carry data and differ; keeping remote copy"
                );
            }
        }
        return ProfileResolution::NoMergeNeeded(remote);
    }

    match remote {
        Some(remote) => ProfileResolution::Merged(merge_profiles(&local, &remote)),
        None => ProfileResolution::Merged(local),
    }
}

fn same_content(a: &PartnerProfile, b: &PartnerProfile) -> bool {
    a.favorite_color == b.favorite_color
        && a.favorite_food == b.favorite_food
        && a.favorite_hobbies == b.favorite_hobbies
        && a.important_dates == b.important_dates
        && a.notes == b.notes
}
