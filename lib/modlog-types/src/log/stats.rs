/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

// a group of relaxed counters and the plain snapshot struct they fill
macro_rules! counter_group {
    ($stats:ident => $snapshot:ident { $($field:ident: $($add:ident)? / $add_n:ident),+ $(,)? }) => {
        #[derive(Clone, Debug, Default, Eq, PartialEq)]
        pub struct $snapshot {
            $(pub $field: u64,)+
        }

        #[derive(Default)]
        pub struct $stats {
            $($field: AtomicU64,)+
        }

        impl $stats {
            pub fn snapshot(&self) -> $snapshot {
                $snapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)+
                }
            }

            $(
                $(
                    pub fn $add(&self) {
                        self.$field.fetch_add(1, Ordering::Relaxed);
                    }
                )?

                pub fn $add_n(&self, n: usize) {
                    self.$field.fetch_add(n as u64, Ordering::Relaxed);
                }
            )+
        }
    };
}

counter_group!(LogIoStats => LogIoSnapshot {
    total: add_total / add_total_n,
    passed: add_passed / add_passed_n,
    size: / add_size,
});

counter_group!(LogDropStats => LogDropSnapshot {
    format_failed: add_format_failed / add_format_failed_n,
    channel_closed: add_channel_closed / add_channel_closed_n,
    channel_overflow: add_channel_overflow / add_channel_overflow_n,
    peer_unreachable: add_peer_unreachable / add_peer_unreachable_n,
});

impl LogDropSnapshot {
    pub fn total(&self) -> u64 {
        self.format_failed + self.channel_closed + self.channel_overflow + self.peer_unreachable
    }
}

/// Counters shared between a drain and its io threads.
#[derive(Default)]
pub struct LogStats {
    pub io: LogIoStats,
    pub drop: LogDropStats,
}

impl LogStats {
    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            io: self.io.snapshot(),
            drop: self.drop.snapshot(),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogSnapshot {
    pub io: LogIoSnapshot,
    pub drop: LogDropSnapshot,
}

impl LogSnapshot {
    /// Messages accepted by the drain but not yet written or dropped.
    pub fn pending(&self) -> u64 {
        self.io
            .total
            .saturating_sub(self.io.passed)
            .saturating_sub(self.drop.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_stats() {
        let stats = LogDropStats::default();
        stats.add_format_failed();
        stats.add_channel_closed();
        stats.add_channel_overflow();
        stats.add_peer_unreachable_n(3);
        let snap = stats.snapshot();
        assert_eq!(
            snap,
            LogDropSnapshot {
                format_failed: 1,
                channel_closed: 1,
                channel_overflow: 1,
                peer_unreachable: 3,
            }
        );
        assert_eq!(snap.total(), 6);
    }

    #[test]
    fn pending() {
        let stats = LogStats::default();
        for _ in 0..5 {
            stats.io.add_total();
        }
        stats.io.add_passed_n(2);
        stats.io.add_size(64);
        stats.drop.add_channel_overflow();
        let snap = stats.snapshot();
        assert_eq!(snap.io.size, 64);
        assert_eq!(snap.pending(), 2);
    }
}
