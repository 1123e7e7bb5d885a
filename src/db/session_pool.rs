use anyhow::Context;
use sqlx::{Connection, MySqlConnection};
use tracing::{info, warn};

//Bulk-load window settings, applied to every session as it is opened and
//undone when the pool closes. Constraint and uniqueness checks move to the
//unique indexes the insert-or-ignore protocol already relies on.
const SESSION_TUNING: [&str; 4] = [
    "SET SESSION foreign_key_checks = 0",
    "SET SESSION unique_checks = 0",
    "SET SESSION innodb_lock_wait_timeout = 15",
    "SET SESSION autocommit = 0",
];

const SESSION_RESTORE: [&str; 3] = [
    "SET SESSION foreign_key_checks = 1",
    "SET SESSION unique_checks = 1",
    "SET SESSION autocommit = 1",
];

//A small fixed set of pre-tuned sessions handed out round-robin, one per
//batch. Batches run strictly sequentially, so a session is never shared by
//two open transactions; the rotation only keeps any one session from
//accumulating all the server-side state of a many-hour run.
pub struct SessionPool {
    sessions: Vec<MySqlConnection>,
    cursor: usize,
}

impl SessionPool {
    pub async fn connect(url: &str, size: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(size > 0, "session pool size must be at least 1");
        let mut sessions = Vec::with_capacity(size);
        for i in 0..size {
            let mut conn = MySqlConnection::connect(url)
                .await
                .with_context(|| format!("opening database session {}", i + 1))?;
            for stmt in SESSION_TUNING {
                sqlx::query(stmt)
                    .execute(&mut conn)
                    .await
                    .with_context(|| format!("tuning database session {}", i + 1))?;
            }
            sessions.push(conn);
        }
        info!("Opened {size} tuned database sessions");
        Ok(Self {
            sessions,
            cursor: 0,
        })
    }

    //The caller owns the returned session until its transaction finishes.
    pub fn next(&mut self) -> &mut MySqlConnection {
        let i = self.cursor;
        self.cursor = (self.cursor + 1) % self.sessions.len();
        &mut self.sessions[i]
    }

    //Best-effort restore of the tuned settings, then close everything.
    pub async fn close(mut self) {
        for mut conn in self.sessions.drain(..) {
            for stmt in SESSION_RESTORE {
                if let Err(e) = sqlx::query(stmt).execute(&mut conn).await {
                    warn!("Could not restore session settings: {e}");
                    break;
                }
            }
            if let Err(e) = conn.close().await {
                warn!("Could not close session cleanly: {e}");
            }
        }
    }
}
