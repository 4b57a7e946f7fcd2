//! SQL schema for the helpdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` / `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Counters behind TKT-/PRB- numbers. Never decremented.
CREATE TABLE IF NOT EXISTS sequences (
    name   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL
);
INSERT OR IGNORE INTO sequences (name, value) VALUES ('ticket', 0), ('problem', 0);

CREATE TABLE IF NOT EXISTS tickets (
    ticket_id          TEXT PRIMARY KEY,
    ticket_number      TEXT NOT NULL UNIQUE,
    title              TEXT NOT NULL,
    description        TEXT NOT NULL DEFAULT '',
    status             TEXT NOT NULL,   -- snake_case TicketStatus
    priority           TEXT NOT NULL,   -- snake_case TicketPriority
    ticket_type        TEXT NOT NULL,
    category           TEXT,
    requester          TEXT,
    assignee_id        TEXT,
    time_spent         INTEGER NOT NULL DEFAULT 0 CHECK (time_spent >= 0),
    sla_status         TEXT NOT NULL,
    first_response_at  TEXT,
    resolved_at        TEXT,
    created_at         TEXT NOT NULL,   -- RFC 3339, microseconds, UTC 'Z'
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    article_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    category    TEXT NOT NULL,
    tags        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    views       INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
    author      TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS slas (
    sla_id               TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    priority             TEXT NOT NULL,
    response_time        INTEGER NOT NULL CHECK (response_time > 0),
    resolution_time      INTEGER NOT NULL CHECK (resolution_time > 0),
    business_hours_only  INTEGER NOT NULL DEFAULT 0,
    active               INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS problems (
    problem_id      TEXT PRIMARY KEY,
    problem_number  TEXT NOT NULL UNIQUE,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL,
    priority        TEXT NOT NULL,
    category        TEXT,
    impact          TEXT NOT NULL,
    root_cause      TEXT,
    workaround      TEXT,
    resolution      TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tickets_status_idx   ON tickets(status);
CREATE INDEX IF NOT EXISTS tickets_created_idx  ON tickets(created_at);
CREATE INDEX IF NOT EXISTS tickets_assignee_idx ON tickets(assignee_id);
CREATE INDEX IF NOT EXISTS articles_category_idx ON articles(category);
CREATE INDEX IF NOT EXISTS slas_priority_idx    ON slas(priority);

PRAGMA user_version = 1;
";
