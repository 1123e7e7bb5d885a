use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_processed_row: u64,
    pub total_processed: u64,
    pub timestamp: String,
    pub elapsed_minutes: i64,
}

//Durable progress marker. Rewritten (never appended) after every committed
//batch; its absence means start from the first row. The replay window on a
//crash is therefore at most one batch, which insert-or-ignore absorbs.
pub struct CheckpointManager {
    path: PathBuf,
    started: Instant,
    prior_elapsed: i64,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: Instant::now(),
            prior_elapsed: 0,
        }
    }

    //Read the marker left by a previous run. An unreadable file is treated as
    //absent rather than aborting a multi-hour job.
    pub fn load(&mut self) -> Option<Checkpoint> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Checkpoint>(&data) {
            Ok(cp) => {
                self.prior_elapsed = cp.elapsed_minutes;
                Some(cp)
            }
            Err(e) => {
                warn!("Ignoring unreadable checkpoint {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn write(&self, last_processed_row: u64, total_processed: u64) -> anyhow::Result<()> {
        let cp = Checkpoint {
            last_processed_row,
            total_processed,
            timestamp: Utc::now().to_rfc3339(),
            elapsed_minutes: self.prior_elapsed + self.started.elapsed().as_secs() as i64 / 60,
        };
        //write-then-rename so a crash mid-write cannot truncate the marker
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&cp)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
