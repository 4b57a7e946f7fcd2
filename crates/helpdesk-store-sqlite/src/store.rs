//! [`SqliteStore`] — the SQLite implementation of [`DeskStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;
use uuid::Uuid;

use helpdesk_core::{
  knowledge::{Article, ArticlePatch, ArticleSort, NewArticle},
  problem::{NewProblem, Problem, ProblemPatch},
  sla::{NewSla, SlaDefinition, SlaPatch},
  store::{ArticleQuery, DEFAULT_LIMIT, DeskStore, ProblemQuery, TicketQuery},
  ticket::{NewTicket, Ticket, TicketPatch},
};

use crate::{
  Result,
  encode::{
    ARTICLE_COLUMNS, PROBLEM_COLUMNS, RawArticle, RawProblem, RawSla, RawTicket,
    SLA_COLUMNS, TICKET_COLUMNS, encode_dt, encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Statements ──────────────────────────────────────────────────────────────

const SAVE_TICKET: &str = "
  INSERT INTO tickets (
    ticket_id, ticket_number, title, description, status, priority,
    ticket_type, category, requester, assignee_id, time_spent, sla_status,
    first_response_at, resolved_at, created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
  ON CONFLICT (ticket_id) DO UPDATE SET
    title             = excluded.title,
    description       = excluded.description,
    status            = excluded.status,
    priority          = excluded.priority,
    ticket_type       = excluded.ticket_type,
    category          = excluded.category,
    requester         = excluded.requester,
    assignee_id       = excluded.assignee_id,
    time_spent        = excluded.time_spent,
    sla_status        = excluded.sla_status,
    first_response_at = excluded.first_response_at,
    resolved_at       = excluded.resolved_at,
    updated_at        = excluded.updated_at";

const SAVE_ARTICLE: &str = "
  INSERT INTO articles (
    article_id, title, content, category, tags, views, author,
    created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
  ON CONFLICT (article_id) DO UPDATE SET
    title      = excluded.title,
    content    = excluded.content,
    category   = excluded.category,
    tags       = excluded.tags,
    author     = excluded.author,
    updated_at = excluded.updated_at";

const SAVE_SLA: &str = "
  INSERT INTO slas (
    sla_id, name, priority, response_time, resolution_time,
    business_hours_only, active, created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
  ON CONFLICT (sla_id) DO UPDATE SET
    name                = excluded.name,
    priority            = excluded.priority,
    response_time       = excluded.response_time,
    resolution_time     = excluded.resolution_time,
    business_hours_only = excluded.business_hours_only,
    active              = excluded.active,
    updated_at          = excluded.updated_at";

const SAVE_PROBLEM: &str = "
  INSERT INTO problems (
    problem_id, problem_number, title, description, status, priority,
    category, impact, root_cause, workaround, resolution, created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
  ON CONFLICT (problem_id) DO UPDATE SET
    title       = excluded.title,
    description = excluded.description,
    status      = excluded.status,
    priority    = excluded.priority,
    category    = excluded.category,
    impact      = excluded.impact,
    root_cause  = excluded.root_cause,
    workaround  = excluded.workaround,
    resolution  = excluded.resolution,
    updated_at  = excluded.updated_at";

// ─── Column values ───────────────────────────────────────────────────────────

fn ticket_values(t: &Ticket) -> Vec<Value> {
  vec![
    encode_uuid(t.ticket_id).into(),
    t.ticket_number.clone().into(),
    t.title.clone().into(),
    t.description.clone().into(),
    t.status.to_string().into(),
    t.priority.to_string().into(),
    t.ticket_type.to_string().into(),
    t.category.clone().into(),
    t.requester.clone().into(),
    t.assignee_id.map(encode_uuid).into(),
    i64::from(t.time_spent).into(),
    t.sla_status.to_string().into(),
    t.first_response_at.map(encode_dt).into(),
    t.resolved_at.map(encode_dt).into(),
    encode_dt(t.created_at).into(),
    encode_dt(t.updated_at).into(),
  ]
}

fn article_values(a: &Article) -> Result<Vec<Value>> {
  // `views` is only ever changed by `record_view`; the upsert leaves it alone.
  let views = i64::try_from(a.views).unwrap_or(i64::MAX);
  Ok(vec![
    encode_uuid(a.article_id).into(),
    a.title.clone().into(),
    a.content.clone().into(),
    a.category.clone().into(),
    encode_tags(&a.tags)?.into(),
    views.into(),
    a.author.clone().into(),
    encode_dt(a.created_at).into(),
    encode_dt(a.updated_at).into(),
  ])
}

fn sla_values(s: &SlaDefinition) -> Vec<Value> {
  vec![
    encode_uuid(s.sla_id).into(),
    s.name.clone().into(),
    s.priority.to_string().into(),
    i64::from(s.response_time).into(),
    i64::from(s.resolution_time).into(),
    s.business_hours_only.into(),
    s.active.into(),
    encode_dt(s.created_at).into(),
    encode_dt(s.updated_at).into(),
  ]
}

fn problem_values(p: &Problem) -> Vec<Value> {
  vec![
    encode_uuid(p.problem_id).into(),
    p.problem_number.clone().into(),
    p.title.clone().into(),
    p.description.clone().into(),
    p.status.to_string().into(),
    p.priority.to_string().into(),
    p.category.clone().into(),
    p.impact.to_string().into(),
    p.root_cause.clone().into(),
    p.workaround.clone().into(),
    p.resolution.clone().into(),
    encode_dt(p.created_at).into(),
    encode_dt(p.updated_at).into(),
  ]
}

/// Substring pattern for `LIKE … ESCAPE '\'`; wildcards in `text` match
/// literally.
fn like_pattern(text: Option<&str>) -> Option<String> {
  text.map(str::trim).filter(|t| !t.is_empty()).map(|t| {
    let escaped = t
      .replace('\\', "\\\\")
      .replace('%', "\\%")
      .replace('_', "\\_");
    format!("%{escaped}%")
  })
}

/// The current time at the precision the database keeps, so a record handed
/// back from a write equals the one read afterwards.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// Carry a decode failure out of a `conn.call` closure.
fn call_error(err: crate::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

fn page(limit: Option<usize>, offset: Option<usize>) -> (i64, i64) {
  let limit = limit.unwrap_or(DEFAULT_LIMIT);
  let offset = offset.unwrap_or(0);
  (
    i64::try_from(limit).unwrap_or(i64::MAX),
    i64::try_from(offset).unwrap_or(i64::MAX),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A helpdesk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("schema initialised");
    Ok(())
  }

  /// Bump and return the named counter.
  async fn next_sequence(&self, name: &'static str) -> Result<i64> {
    let value = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "UPDATE sequences SET value = value + 1 WHERE name = ?1 RETURNING value",
          rusqlite::params![name],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(value)
  }

  /// Run an insert-or-update statement with positional values.
  async fn save(&self, sql: &'static str, values: Vec<Value>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params_from_iter(values))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DeskStore impl ──────────────────────────────────────────────────────────

impl DeskStore for SqliteStore {
  type Error = crate::Error;

  // ── Tickets ───────────────────────────────────────────────────────────────

  async fn create_ticket(&self, input: NewTicket) -> Result<Ticket> {
    let seq = self.next_sequence("ticket").await?;
    let ticket = input.into_ticket(Uuid::new_v4(), Ticket::format_number(seq), now());
    self.save(SAVE_TICKET, ticket_values(&ticket)).await?;
    debug!(ticket = %ticket.ticket_number, "ticket created");
    Ok(ticket)
  }

  async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
              rusqlite::params![id_str],
              RawTicket::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTicket::into_ticket).transpose()
  }

  async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
    let text = like_pattern(query.text.as_deref());
    let status = query.status.map(|s| s.to_string());
    let priority = query.priority.map(|p| p.to_string());
    let ticket_type = query.ticket_type.map(|t| t.to_string());
    let assignee = query.assignee_id.map(encode_uuid);
    let after = query.created_after.map(encode_dt);
    let before = query.created_before.map(encode_dt);
    let (limit, offset) = page(query.limit, query.offset);

    let raws: Vec<RawTicket> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {TICKET_COLUMNS} FROM tickets
           WHERE (?1 IS NULL
                  OR title LIKE ?1 ESCAPE '\\'
                  OR description LIKE ?1 ESCAPE '\\'
                  OR ticket_number LIKE ?1 ESCAPE '\\')
             AND (?2 IS NULL OR status = ?2)
             AND (?3 IS NULL OR priority = ?3)
             AND (?4 IS NULL OR ticket_type = ?4)
             AND (?5 IS NULL OR assignee_id = ?5)
             AND (?6 IS NULL OR created_at >= ?6)
             AND (?7 IS NULL OR created_at < ?7)
           ORDER BY created_at DESC, ticket_number DESC
           LIMIT ?8 OFFSET ?9"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              text, status, priority, ticket_type, assignee, after, before,
              limit, offset,
            ],
            RawTicket::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTicket::into_ticket).collect()
  }

  async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> Result<Option<Ticket>> {
    let id_str = encode_uuid(id);
    let now = now();

    // Read, apply and write in one transaction so concurrent patches
    // (notably `add_time_spent`) see each other's results.
    let ticket: Option<Ticket> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
            rusqlite::params![id_str],
            RawTicket::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };
        let mut ticket = raw.into_ticket().map_err(call_error)?;
        patch.apply(&mut ticket, now);
        tx.execute(SAVE_TICKET, rusqlite::params_from_iter(ticket_values(&ticket)))?;
        tx.commit()?;
        Ok(Some(ticket))
      })
      .await?;

    if let Some(ticket) = &ticket {
      debug!(ticket = %ticket.ticket_number, status = %ticket.status, "ticket updated");
    }
    Ok(ticket)
  }

  // ── Knowledge base ────────────────────────────────────────────────────────

  async fn create_article(&self, input: NewArticle) -> Result<Article> {
    let article = input.into_article(Uuid::new_v4(), now());
    self.save(SAVE_ARTICLE, article_values(&article)?).await?;
    debug!(article = %article.article_id, "article created");
    Ok(article)
  }

  async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"),
              rusqlite::params![id_str],
              RawArticle::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawArticle::into_article).transpose()
  }

  async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
    let text = like_pattern(query.text.as_deref());
    let category = query.category.clone();
    let tag = query.tag.clone();
    let (limit, offset) = page(query.limit, query.offset);
    let order = match query.sort {
      ArticleSort::MostRecent => "updated_at DESC, article_id",
      ArticleSort::MostViewed => "views DESC, updated_at DESC, article_id",
      ArticleSort::Title => "title COLLATE NOCASE, article_id",
    };

    let raws: Vec<RawArticle> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles
           WHERE (?1 IS NULL OR title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\')
             AND (?2 IS NULL OR category = ?2)
             AND (?3 IS NULL OR EXISTS (
                   SELECT 1 FROM json_each(articles.tags) WHERE json_each.value = ?3))
           ORDER BY {order}
           LIMIT ?4 OFFSET ?5"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![text, category, tag, limit, offset],
            RawArticle::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn update_article(&self, id: Uuid, patch: ArticlePatch) -> Result<Option<Article>> {
    let id_str = encode_uuid(id);
    let now = now();

    let article: Option<Article> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"),
            rusqlite::params![id_str],
            RawArticle::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };
        let mut article = raw.into_article().map_err(call_error)?;
        patch.apply(&mut article, now);
        let values = article_values(&article).map_err(call_error)?;
        tx.execute(SAVE_ARTICLE, rusqlite::params_from_iter(values))?;
        tx.commit()?;
        Ok(Some(article))
      })
      .await?;

    Ok(article)
  }

  async fn record_view(&self, id: Uuid) -> Result<Option<Article>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE articles SET views = views + 1 WHERE article_id = ?1
                 RETURNING {ARTICLE_COLUMNS}"
              ),
              rusqlite::params![id_str],
              RawArticle::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawArticle::into_article).transpose()
  }

  // ── SLA definitions ───────────────────────────────────────────────────────

  async fn create_sla(&self, input: NewSla) -> Result<SlaDefinition> {
    let sla = input.into_definition(Uuid::new_v4(), now());
    self.save(SAVE_SLA, sla_values(&sla)).await?;
    debug!(sla = %sla.name, priority = %sla.priority, "sla created");
    Ok(sla)
  }

  async fn get_sla(&self, id: Uuid) -> Result<Option<SlaDefinition>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSla> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SLA_COLUMNS} FROM slas WHERE sla_id = ?1"),
              rusqlite::params![id_str],
              RawSla::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSla::into_sla).transpose()
  }

  async fn list_slas(&self, active_only: bool) -> Result<Vec<SlaDefinition>> {
    let raws: Vec<RawSla> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SLA_COLUMNS} FROM slas WHERE (?1 = 0 OR active = 1)"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![active_only], RawSla::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut slas: Vec<SlaDefinition> =
      raws.into_iter().map(RawSla::into_sla).collect::<Result<_>>()?;
    slas.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
    Ok(slas)
  }

  async fn update_sla(&self, id: Uuid, patch: SlaPatch) -> Result<Option<SlaDefinition>> {
    let id_str = encode_uuid(id);
    let now = now();

    let sla: Option<SlaDefinition> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {SLA_COLUMNS} FROM slas WHERE sla_id = ?1"),
            rusqlite::params![id_str],
            RawSla::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };
        let mut sla = raw.into_sla().map_err(call_error)?;
        patch.apply(&mut sla, now);
        tx.execute(SAVE_SLA, rusqlite::params_from_iter(sla_values(&sla)))?;
        tx.commit()?;
        Ok(Some(sla))
      })
      .await?;

    Ok(sla)
  }

  // ── Problems ──────────────────────────────────────────────────────────────

  async fn create_problem(&self, input: NewProblem) -> Result<Problem> {
    let seq = self.next_sequence("problem").await?;
    let problem =
      input.into_problem(Uuid::new_v4(), Problem::format_number(seq), now());
    self.save(SAVE_PROBLEM, problem_values(&problem)).await?;
    debug!(problem = %problem.problem_number, "problem created");
    Ok(problem)
  }

  async fn get_problem(&self, id: Uuid) -> Result<Option<Problem>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProblem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE problem_id = ?1"),
              rusqlite::params![id_str],
              RawProblem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProblem::into_problem).transpose()
  }

  async fn list_problems(&self, query: &ProblemQuery) -> Result<Vec<Problem>> {
    let status = query.status.map(|s| s.to_string());
    let priority = query.priority.map(|p| p.to_string());
    let (limit, offset) = page(query.limit, query.offset);

    let raws: Vec<RawProblem> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PROBLEM_COLUMNS} FROM problems
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR priority = ?2)
           ORDER BY created_at DESC, problem_number DESC
           LIMIT ?3 OFFSET ?4"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![status, priority, limit, offset],
            RawProblem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProblem::into_problem).collect()
  }

  async fn update_problem(&self, id: Uuid, patch: ProblemPatch) -> Result<Option<Problem>> {
    let id_str = encode_uuid(id);
    let now = now();

    let problem: Option<Problem> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE problem_id = ?1"),
            rusqlite::params![id_str],
            RawProblem::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };
        let mut problem = raw.into_problem().map_err(call_error)?;
        patch.apply(&mut problem, now);
        tx.execute(SAVE_PROBLEM, rusqlite::params_from_iter(problem_values(&problem)))?;
        tx.commit()?;
        Ok(Some(problem))
      })
      .await?;

    if let Some(problem) = &problem {
      debug!(problem = %problem.problem_number, status = %problem.status, "problem updated");
    }
    Ok(problem)
  }
}
