use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Entries kept before the oldest are dropped.
pub const LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LogEntry {
    pub seq: u64,
    pub message: String,
    /// Milliseconds since the unix epoch, as a string.
    pub timestamp: String,
}

/// Sequenced, bounded log of human-readable battle events.
#[derive(Debug)]
pub struct BattleLog {
    entries: Mutex<VecDeque<LogEntry>>,
    seq: AtomicU64,
    capacity: usize,
}

impl Default for BattleLog {
    fn default() -> Self {
        BattleLog::new()
    }
}

impl BattleLog {
    pub fn new() -> Self {
        BattleLog::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BattleLog {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            seq: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Append a message, assigning the next sequence number.
    pub fn append(&self, message: impl Into<String>) -> LogEntry {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(dur) => format!("{}", dur.as_millis()),
            Err(_) => "0".to_string(),
        };
        let entry = LogEntry {
            seq,
            message: message.into(),
            timestamp,
        };
        let mut guard = match self.entries.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        guard.push_back(entry.clone());
        while guard.len() > self.capacity {
            guard.pop_front();
        }
        entry
    }

    /// Cloned snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(g) => g.iter().cloned().collect(),
            Err(e) => e.into_inner().iter().cloned().collect(),
        }
    }

    /// Entries with `seq >= from_seq`, at most `limit`, plus the seq to resume from.
    pub fn page(&self, from_seq: Option<u64>, limit: usize) -> (Vec<LogEntry>, Option<u64>) {
        let mut filtered: Vec<LogEntry> = self
            .entries()
            .into_iter()
            .filter(|e| from_seq.map_or(true, |f| e.seq >= f))
            .collect();
        let next_seq = filtered.get(limit).map(|e| e.seq);
        filtered.truncate(limit);
        (filtered, next_seq)
    }

    /// Drop every entry and record that the log was cleared.
    pub fn clear(&self) -> LogEntry {
        match self.entries.lock() {
            Ok(mut g) => g.clear(),
            Err(e) => e.into_inner().clear(),
        }
        self.append("Battle log cleared")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_latest_entries() {
        let log = BattleLog::with_capacity(3);
        for i in 0..5 {
            log.append(format!("event {}", i));
        }
        let seqs: Vec<u64> = log.entries().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
    }

    #[test]
    fn page_reports_next_seq() {
        let log = BattleLog::new();
        for i in 0..5 {
            log.append(format!("event {}", i));
        }
        let (page, next) = log.page(Some(2), 2);
        assert_eq!(page.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(next, Some(4));
        let (rest, next) = log.page(next, 10);
        assert_eq!(rest.len(), 2);
        assert_eq!(next, None);
    }

    #[test]
    fn zero_limit_points_at_first_entry() {
        let log = BattleLog::new();
        log.append("one");
        log.append("two");
        assert_eq!(log.page(None, 0), (vec![], Some(1)));
        assert_eq!(log.page(Some(2), 0), (vec![], Some(2)));
        assert_eq!(log.page(Some(3), 0), (vec![], None));
    }

    #[test]
    fn clear_leaves_marker() {
        let log = BattleLog::new();
        log.append("one");
        log.append("two");
        let marker = log.clear();
        assert_eq!(marker.seq, 3);
        assert_eq!(log.entries(), vec![marker]);
    }
}
