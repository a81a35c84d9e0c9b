//! Safe upgrade path resolution
//!
//! GitLab only supports upgrading across a bounded distance in one step. The
//! resolver accepts a hop to the latest supported version when it is:
//! - a patch catch-up within the current minor,
//! - a single minor hop within the current major, or
//! - a major hop taken from the penultimate rung of the supported set.
//!
//! Anything further away yields [`UpgradeDecision::NoSafePath`]; multi-hop
//! upgrades are left to the operator.

use crate::domain::{SemanticVersion, UpgradeDecision};

/// Decide whether `current` can be upgraded to the latest supported version in one safe hop
pub fn resolve(supported: &[SemanticVersion], current: SemanticVersion) -> UpgradeDecision {
    let rungs = normalize(supported);

    let Some(&latest) = rungs.first() else {
        return UpgradeDecision::NoSafePath;
    };

    if current == latest {
        return UpgradeDecision::AlreadyLatest;
    }
    if current > latest {
        return UpgradeDecision::NoSafePath;
    }

    if is_single_hop(&rungs, current, latest) {
        UpgradeDecision::UpgradePossible { target: latest }
    } else {
        UpgradeDecision::NoSafePath
    }
}

/// Sort descending and keep only the highest patch of each (major, minor) track
pub fn normalize(supported: &[SemanticVersion]) -> Vec<SemanticVersion> {
    let mut rungs = supported.to_vec();
    rungs.sort_by(|a, b| b.cmp(a));
    // Runs of equal tracks are adjacent after sorting; the first is the highest patch.
    rungs.dedup_by_key(|v| v.track());
    rungs
}

/// `latest` is strictly greater than `current` here.
fn is_single_hop(rungs: &[SemanticVersion], current: SemanticVersion, latest: SemanticVersion) -> bool {
    if latest.major == current.major {
        if latest.minor == current.minor {
            return latest.patch > current.patch;
        }
        return current.minor.checked_add(1) == Some(latest.minor);
    }

    if current.major.checked_add(1) == Some(latest.major) {
        // The next major's rung is the only one above current, and the rung
        // below it belongs to current's major.
        return rungs.get(1).is_some_and(|penultimate| {
            penultimate.major == current.major && current >= *penultimate
        });
    }

    false
}
