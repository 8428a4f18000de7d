use huntcamp_store::{ActivityEntry, ActivityKind, Counters};

/// Number of entries returned by the activity feed.
pub const RECENT_LIMIT: usize = 50;

/// A domain event about to be appended to the log.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    pub kind: ActivityKind,
    pub hunter: &'a str,
    pub stand: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Append-only activity log over a loaded snapshot.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new(entries: Vec<ActivityEntry>) -> Self {
        Self { entries }
    }

    /// Append `event` stamped with `at`, taking its id from `counters`.
    pub fn record(&mut self, counters: &mut Counters, event: Event<'_>, at: &str) -> &ActivityEntry {
        let entry = ActivityEntry {
            id: counters.allocate_activity(),
            kind: event.kind,
            hunter: event.hunter.to_owned(),
            stand: event.stand.map(str::to_owned),
            description: event.description.map(str::to_owned),
            timestamp: at.to_owned(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// The last `n` entries, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> Vec<ActivityEntry> {
        self.entries
    }
}
