//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine and reporters call store methods, they never execute SQL.

use crate::{
    error::SimResult,
    event::{EventLogEntry, LogEntry},
    types::Tick,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, started_at: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    pub fn finish_run(&self, run_id: &str, status: &str, timesteps: u64) -> SimResult<()> {
        self.conn.execute(
            "UPDATE run SET status = ?1, timesteps = ?2 WHERE run_id = ?3",
            params![status, timesteps as i64, run_id],
        )?;
        Ok(())
    }

    /// (status, completed timesteps) for a run, if it exists.
    pub fn run_status(&self, run_id: &str) -> SimResult<Option<(String, u64)>> {
        let row = self
            .conn
            .query_row(
                "SELECT status, timesteps FROM run WHERE run_id = ?1",
                params![run_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)),
            )
            .optional()?;
        Ok(row)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, tick, phase, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.tick as i64,
                entry.phase,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        self.query_events(
            "SELECT id, run_id, tick, phase, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC",
            params![run_id, tick as i64],
        )
    }

    pub fn events_of_type(&self, run_id: &str, event_type: &str) -> SimResult<Vec<EventLogEntry>> {
        self.query_events(
            "SELECT id, run_id, tick, phase, event_type, payload
             FROM event_log WHERE run_id = ?1 AND event_type = ?2
             ORDER BY id ASC",
            params![run_id, event_type],
        )
    }

    fn query_events(&self, sql: &str, args: impl rusqlite::Params) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(args, |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    tick:       row.get::<_, i64>(2)? as u64,
                    phase:      row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Timestep log ───────────────────────────────────────────

    /// Write all entries in one transaction. Re-reporting a run replaces
    /// its previous rows.
    pub fn save_log_entries(&self, run_id: &str, entries: &[LogEntry]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM timestep_log WHERE run_id = ?1", params![run_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO timestep_log (run_id, timestep, served_count, buffer_remaining)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for e in entries {
                stmt.execute(params![
                    run_id,
                    e.timestep as i64,
                    e.served_count as i64,
                    e.buffer_remaining as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn log_entries(&self, run_id: &str) -> SimResult<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestep, served_count, buffer_remaining
             FROM timestep_log WHERE run_id = ?1
             ORDER BY timestep ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(LogEntry {
                timestep:         row.get::<_, i64>(0)? as u64,
                served_count:     row.get::<_, i64>(1)? as u64,
                buffer_remaining: row.get::<_, i64>(2)? as u64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
