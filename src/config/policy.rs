//! Layout and durability policies
//!
//! Both policies are closed enumerations rather than flag sets: every legal
//! combination of behaviors has its own named mode, so the worker engine can
//! query the three durability dimensions independently while the CLI and the
//! tests can enumerate the modes exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subdirectory layout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirPolicy {
    /// All files go directly into the thread's test directory
    #[default]
    NoSubdirs,
    /// Advance to the next subdirectory after a fixed number of files
    RoundRobin,
    /// Advance to the next subdirectory after a fixed number of seconds
    TimeHash,
}

impl fmt::Display for DirPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirPolicy::NoSubdirs => "No Subdirectories",
            DirPolicy::RoundRobin => "Round Robin",
            DirPolicy::TimeHash => "Time Hash",
        };
        f.write_str(name)
    }
}

/// Order of the post-write fsync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFsyncOrder {
    /// Re-fsync every file in creation order
    Forward,
    /// Re-fsync every file in reverse creation order
    Reverse,
    /// Re-fsync only the first file written
    FirstOnly,
}

/// Durability mode for one run.
///
/// Each mode fixes three independent behaviors:
/// - whether every file is fsynced immediately before its close,
/// - whether one filesystem-wide `sync()` runs after the write loop,
/// - whether, and in which order, a post-write pass reopens each file
///   read-only to fsync it again.
///
/// The numbering used by the `-S` flag follows the declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// 0: no durability calls at all
    NoSync,
    /// 1: fsync each file before closing it
    #[default]
    FsyncBeforeClose,
    /// 2: fsync each file before close, then one sync() after the loop
    FsyncBeforeCloseSync,
    /// 3: post-write fsync pass in creation order
    PostFsync,
    /// 4: post-write fsync pass in creation order, then one sync()
    PostFsyncSync,
    /// 5: post-write fsync pass in reverse order
    ReverseFsync,
    /// 6: post-write fsync pass in reverse order, then one sync()
    ReverseFsyncSync,
    /// 7: post-write fsync of the first file only
    FsyncFirstFile,
}

impl SyncPolicy {
    /// All modes in `-S` numbering order.
    pub const ALL: [SyncPolicy; 8] = [
        SyncPolicy::NoSync,
        SyncPolicy::FsyncBeforeClose,
        SyncPolicy::FsyncBeforeCloseSync,
        SyncPolicy::PostFsync,
        SyncPolicy::PostFsyncSync,
        SyncPolicy::ReverseFsync,
        SyncPolicy::ReverseFsyncSync,
        SyncPolicy::FsyncFirstFile,
    ];

    /// Look up a mode by its `-S` number.
    pub fn from_mode(mode: u8) -> Option<SyncPolicy> {
        Self::ALL.get(mode as usize).copied()
    }

    /// The `-S` number of this mode.
    pub fn mode(&self) -> u8 {
        match self {
            SyncPolicy::NoSync => 0,
            SyncPolicy::FsyncBeforeClose => 1,
            SyncPolicy::FsyncBeforeCloseSync => 2,
            SyncPolicy::PostFsync => 3,
            SyncPolicy::PostFsyncSync => 4,
            SyncPolicy::ReverseFsync => 5,
            SyncPolicy::ReverseFsyncSync => 6,
            SyncPolicy::FsyncFirstFile => 7,
        }
    }

    /// Whether each file is fsynced immediately before close.
    pub fn fsync_before_close(&self) -> bool {
        matches!(
            self,
            SyncPolicy::FsyncBeforeClose | SyncPolicy::FsyncBeforeCloseSync
        )
    }

    /// Whether one filesystem-wide sync() runs after the write loop.
    pub fn global_sync(&self) -> bool {
        matches!(
            self,
            SyncPolicy::FsyncBeforeCloseSync
                | SyncPolicy::PostFsyncSync
                | SyncPolicy::ReverseFsyncSync
        )
    }

    /// The post-write fsync pass this mode requires, if any.
    pub fn post_pass(&self) -> Option<PostFsyncOrder> {
        match self {
            SyncPolicy::PostFsync | SyncPolicy::PostFsyncSync => Some(PostFsyncOrder::Forward),
            SyncPolicy::ReverseFsync | SyncPolicy::ReverseFsyncSync => {
                Some(PostFsyncOrder::Reverse)
            }
            SyncPolicy::FsyncFirstFile => Some(PostFsyncOrder::FirstOnly),
            _ => None,
        }
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPolicy::NoSync => "no sync",
            SyncPolicy::FsyncBeforeClose => "fsync before close",
            SyncPolicy::FsyncBeforeCloseSync => "fsync before close, sync after loop",
            SyncPolicy::PostFsync => "post-loop fsync in creation order",
            SyncPolicy::PostFsyncSync => "post-loop fsync in creation order, sync after loop",
            SyncPolicy::ReverseFsync => "post-loop fsync in reverse order",
            SyncPolicy::ReverseFsyncSync => "post-loop fsync in reverse order, sync after loop",
            SyncPolicy::FsyncFirstFile => "post-loop fsync of first file only",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_numbers_round_trip() {
        for (i, mode) in SyncPolicy::ALL.iter().enumerate() {
            assert_eq!(SyncPolicy::from_mode(i as u8), Some(*mode));
            assert_eq!(mode.mode(), i as u8);
        }
        assert_eq!(SyncPolicy::from_mode(8), None);
    }

    #[test]
    fn test_mode_behavior_table() {
        use PostFsyncOrder::*;
        // (mode, fsync before close, global sync, post pass)
        let expected = [
            (SyncPolicy::NoSync, false, false, None),
            (SyncPolicy::FsyncBeforeClose, true, false, None),
            (SyncPolicy::FsyncBeforeCloseSync, true, true, None),
            (SyncPolicy::PostFsync, false, false, Some(Forward)),
            (SyncPolicy::PostFsyncSync, false, true, Some(Forward)),
            (SyncPolicy::ReverseFsync, false, false, Some(Reverse)),
            (SyncPolicy::ReverseFsyncSync, false, true, Some(Reverse)),
            (SyncPolicy::FsyncFirstFile, false, false, Some(FirstOnly)),
        ];
        for (mode, before_close, global, post) in expected {
            assert_eq!(mode.fsync_before_close(), before_close, "{mode:?}");
            assert_eq!(mode.global_sync(), global, "{mode:?}");
            assert_eq!(mode.post_pass(), post, "{mode:?}");
        }
    }

    #[test]
    fn test_default_policies() {
        assert_eq!(DirPolicy::default(), DirPolicy::NoSubdirs);
        assert_eq!(SyncPolicy::default(), SyncPolicy::FsyncBeforeClose);
    }
}
