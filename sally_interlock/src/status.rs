//! Status publication and the status task.
//!
//! The control task stores one packed [`StatusSnapshot`] per tick into an
//! `AtomicU64`. Readers load the word and unpack it; a reader can lag by a
//! tick but never sees a torn snapshot. The status task is read-only: it
//! renders indicator changes as log lines and never touches controller
//! state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sally_common::interlock::status::{Indicators, StatusSnapshot};
use tracing::{debug, info};

/// Writer half, owned by the control task.
#[derive(Debug)]
pub struct StatusPublisher {
    word: Arc<AtomicU64>,
}

/// Reader half, cloneable.
#[derive(Debug, Clone)]
pub struct StatusReader {
    word: Arc<AtomicU64>,
}

/// Create a connected publisher/reader pair holding the Idle snapshot.
pub fn status_channel() -> (StatusPublisher, StatusReader) {
    let word = Arc::new(AtomicU64::new(StatusSnapshot::default().pack()));
    (
        StatusPublisher {
            word: Arc::clone(&word),
        },
        StatusReader { word },
    )
}

impl StatusPublisher {
    #[inline]
    pub fn publish(&self, snapshot: &StatusSnapshot) {
        self.word.store(snapshot.pack(), Ordering::Release);
    }

    pub fn reader(&self) -> StatusReader {
        StatusReader {
            word: Arc::clone(&self.word),
        }
    }
}

impl StatusReader {
    #[inline]
    pub fn load(&self) -> StatusSnapshot {
        StatusSnapshot::unpack(self.word.load(Ordering::Acquire))
    }
}

// ─── Status task ────────────────────────────────────────────────────

/// One line describing what changed between two snapshots, if anything.
pub fn render_change(prev: &StatusSnapshot, next: &StatusSnapshot) -> Option<String> {
    let changed = prev.indicators ^ next.indicators;
    if changed.is_empty() && prev.state == next.state {
        return None;
    }

    let mut line = format!("state={} kind={:?}", next.state, next.kind);
    for (name, flag) in changed.iter_names() {
        let level = if next.indicators.contains(flag) { "on" } else { "off" };
        line.push_str(&format!(" {name}={level}"));
    }
    Some(line)
}

/// Spawn the status task.
///
/// Polls `reader` every `period` until `running` is cleared and logs every
/// change. Returns the thread handle; join it after clearing `running`.
pub fn spawn_status_task(
    reader: StatusReader,
    period: Duration,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("sally-status".to_string())
        .spawn(move || {
            debug!("status task started ({} ms)", period.as_millis());
            let mut last = reader.load();
            info!("status: state={} kind={:?}", last.state, last.kind);

            while running.load(Ordering::SeqCst) {
                thread::sleep(period);
                let now = reader.load();
                if let Some(line) = render_change(&last, &now) {
                    info!("status: {line}");
                }
                if now.indicators.contains(Indicators::GATES_OPEN)
                    && !last.indicators.contains(Indicators::GATES_OPEN)
                {
                    info!("passage open");
                }
                last = now;
            }
            debug!("status task stopped");
        })
}
