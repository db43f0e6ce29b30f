use super::process::ProcessId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GanttSlot {
    Idle,
    Process(ProcessId),
}

impl GanttSlot {
    pub fn pid(self) -> Option<ProcessId> {
        match self {
            GanttSlot::Idle => None,
            GanttSlot::Process(id) => Some(id),
        }
    }

    pub fn is_idle(self) -> bool {
        self == GanttSlot::Idle
    }
}

/// A closed-open interval `[start, end)` of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttEntry {
    pub slot: GanttSlot,
    pub start: u64,
    pub end: u64,
    /// The process was taken off the CPU at `end` while it still had work.
    #[serde(default)]
    pub preempted: bool,
    /// The segment replaced a different process on the CPU.
    #[serde(default)]
    pub context_switch: bool,
}

impl GanttEntry {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Folds per-tick execution records into contiguous segments.
#[derive(Debug, Clone, Default)]
pub struct GanttRecorder {
    entries: Vec<GanttEntry>,
}

impl GanttRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[GanttEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<GanttEntry> {
        self.entries
    }

    /// End of the recorded timeline.
    pub fn end(&self) -> u64 {
        self.entries.last().map_or(0, |entry| entry.end)
    }

    /// Records that `slot` held the CPU during `[at, at + 1)`.
    pub fn record_tick(&mut self, slot: GanttSlot, at: u64) {
        self.record(slot, at, at + 1);
    }

    /// Records a whole idle stretch as a single segment.
    pub fn record_idle(&mut self, start: u64, end: u64) {
        if end > start {
            self.record(GanttSlot::Idle, start, end);
        }
    }

    fn record(&mut self, slot: GanttSlot, start: u64, end: u64) {
        debug_assert_eq!(start, self.end(), "gantt segments must be contiguous");

        if let Some(last) = self.entries.last_mut() {
            if last.slot == slot && last.end == start {
                last.end = end;
                return;
            }
        }

        // Only a process directly replacing another process is a switch.
        let previous = self.entries.last().and_then(|last| last.slot.pid());
        let context_switch = match (slot.pid(), previous) {
            (Some(pid), Some(previous)) => pid != previous,
            _ => false,
        };

        self.entries.push(GanttEntry {
            slot,
            start,
            end,
            preempted: false,
            context_switch,
        });
    }

    /// Flags the latest segment as ending in a preemption.
    pub fn mark_preempted(&mut self) {
        if let Some(last) = self.entries.last_mut() {
            if !last.slot.is_idle() {
                last.preempted = true;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
