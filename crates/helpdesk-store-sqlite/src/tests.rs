//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use helpdesk_core::{
  knowledge::{ArticlePatch, ArticleSort, NewArticle},
  problem::{NewProblem, ProblemPatch, ProblemStatus},
  sla::{NewSla, SlaPatch},
  store::{ArticleQuery, DeskStore, ProblemQuery, TicketQuery},
  ticket::{NewTicket, TicketPatch, TicketPriority, TicketStatus, TicketType},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ticket(title: &str, priority: TicketPriority) -> NewTicket {
  NewTicket { priority, ..NewTicket::new(title) }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_ticket() {
  let s = store().await;

  let mut input = ticket("VPN drops every hour", TicketPriority::High);
  input.category = Some("network".into());
  input.requester = Some("dana@example.com".into());
  let created = s.create_ticket(input).await.unwrap();

  assert_eq!(created.ticket_number, "TKT-000001");
  assert_eq!(created.status, TicketStatus::Open);
  assert!(created.first_response_at.is_none());
  assert!(created.resolved_at.is_none());

  let fetched = s.get_ticket(created.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_ticket_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ticket(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn ticket_numbers_are_sequential() {
  let s = store().await;
  let a = s.create_ticket(NewTicket::new("a")).await.unwrap();
  let b = s.create_ticket(NewTicket::new("b")).await.unwrap();
  let c = s.create_ticket(NewTicket::new("c")).await.unwrap();
  assert_eq!(
    [a.ticket_number, b.ticket_number, c.ticket_number],
    ["TKT-000001", "TKT-000002", "TKT-000003"]
  );
}

#[tokio::test]
async fn problem_numbers_do_not_share_the_ticket_counter() {
  let s = store().await;
  s.create_ticket(NewTicket::new("a")).await.unwrap();
  s.create_ticket(NewTicket::new("b")).await.unwrap();
  let problem = s.create_problem(NewProblem::new("Flaky DNS")).await.unwrap();
  assert_eq!(problem.problem_number, "PRB-000001");
}

#[tokio::test]
async fn list_tickets_filters_by_status_and_priority() {
  let s = store().await;
  let low = s.create_ticket(ticket("low", TicketPriority::Low)).await.unwrap();
  let high = s.create_ticket(ticket("high", TicketPriority::High)).await.unwrap();
  s.create_ticket(ticket("critical", TicketPriority::Critical))
    .await
    .unwrap();

  let patch = TicketPatch {
    status: Some(TicketStatus::Resolved),
    ..Default::default()
  };
  s.update_ticket(low.ticket_id, patch).await.unwrap();

  let resolved = s
    .list_tickets(&TicketQuery {
      status: Some(TicketStatus::Resolved),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(resolved.len(), 1);
  assert_eq!(resolved[0].ticket_id, low.ticket_id);

  let highs = s
    .list_tickets(&TicketQuery {
      priority: Some(TicketPriority::High),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(highs.len(), 1);
  assert_eq!(highs[0].ticket_id, high.ticket_id);
}

#[tokio::test]
async fn list_tickets_is_newest_first_and_paginates() {
  let s = store().await;
  for n in 0..5 {
    s.create_ticket(NewTicket::new(format!("ticket {n}")))
      .await
      .unwrap();
  }

  let all = s.list_tickets(&TicketQuery::default()).await.unwrap();
  let numbers: Vec<_> = all.iter().map(|t| t.ticket_number.as_str()).collect();
  assert_eq!(
    numbers,
    ["TKT-000005", "TKT-000004", "TKT-000003", "TKT-000002", "TKT-000001"]
  );

  let page = s
    .list_tickets(&TicketQuery {
      limit: Some(2),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  let numbers: Vec<_> = page.iter().map(|t| t.ticket_number.as_str()).collect();
  assert_eq!(numbers, ["TKT-000004", "TKT-000003"]);
}

#[tokio::test]
async fn list_tickets_text_search() {
  let s = store().await;
  let mut input = NewTicket::new("Laptop will not boot");
  input.description = "Black screen after the BIOS logo".into();
  s.create_ticket(input).await.unwrap();
  s.create_ticket(NewTicket::new("Request new monitor"))
    .await
    .unwrap();

  let hits = s
    .list_tickets(&TicketQuery {
      text: Some("bios".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].title, "Laptop will not boot");

  let by_number = s
    .list_tickets(&TicketQuery {
      text: Some("TKT-000002".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_number.len(), 1);
  assert_eq!(by_number[0].title, "Request new monitor");
}

#[tokio::test]
async fn text_search_treats_wildcards_literally() {
  let s = store().await;
  s.create_ticket(NewTicket::new("Disk at 95% capacity")).await.unwrap();
  s.create_ticket(NewTicket::new("Printer offline")).await.unwrap();
  let mut proxy = NewArticle::new("Proxy settings", "network");
  proxy.content = "Set http_proxy first".into();
  s.create_article(proxy).await.unwrap();
  let mut drivers = NewArticle::new("Printer drivers", "hardware");
  drivers.content = "Install from the share".into();
  s.create_article(drivers).await.unwrap();

  let search = |text: &str| TicketQuery {
    text: Some(text.into()),
    ..Default::default()
  };
  let percent = s.list_tickets(&search("%")).await.unwrap();
  assert_eq!(percent.len(), 1);
  assert_eq!(percent[0].title, "Disk at 95% capacity");
  assert!(s.list_tickets(&search("_")).await.unwrap().is_empty());

  let underscore = s
    .list_articles(&ArticleQuery {
      text: Some("_".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(underscore.len(), 1);
  assert_eq!(underscore[0].title, "Proxy settings");
}

#[tokio::test]
async fn list_tickets_by_type_and_assignee() {
  let s = store().await;
  let agent = Uuid::new_v4();
  let mut input = NewTicket::new("Install licence");
  input.ticket_type = TicketType::ServiceRequest;
  input.assignee_id = Some(agent);
  s.create_ticket(input).await.unwrap();
  s.create_ticket(NewTicket::new("Outage")).await.unwrap();

  let requests = s
    .list_tickets(&TicketQuery {
      ticket_type: Some(TicketType::ServiceRequest),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(requests.len(), 1);

  let mine = s
    .list_tickets(&TicketQuery {
      assignee_id: Some(agent),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].title, "Install licence");
  // Assigning on creation counts as the first response.
  assert!(mine[0].first_response_at.is_some());
}

#[tokio::test]
async fn list_tickets_created_window() {
  let s = store().await;
  s.create_ticket(NewTicket::new("now")).await.unwrap();

  let future = s
    .list_tickets(&TicketQuery {
      created_after: Some(Utc::now() + Duration::hours(1)),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(future.is_empty());

  let past = s
    .list_tickets(&TicketQuery {
      created_after: Some(Utc::now() - Duration::hours(1)),
      created_before: Some(Utc::now() + Duration::hours(1)),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(past.len(), 1);
}

#[tokio::test]
async fn update_ticket_persists_side_effects() {
  let s = store().await;
  let created = s.create_ticket(NewTicket::new("Reset MFA")).await.unwrap();

  let patch = TicketPatch {
    status: Some(TicketStatus::Resolved),
    add_time_spent: Some(25),
    ..Default::default()
  };
  let updated = s.update_ticket(created.ticket_id, patch).await.unwrap().unwrap();
  assert_eq!(updated.status, TicketStatus::Resolved);
  assert_eq!(updated.time_spent, 25);
  assert!(updated.resolved_at.is_some());
  assert!(updated.first_response_at.is_some());
  assert!(updated.updated_at >= created.updated_at);

  let fetched = s.get_ticket(created.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
  assert_eq!(fetched.ticket_number, created.ticket_number);
}

#[tokio::test]
async fn update_ticket_clears_nullable_fields() {
  let s = store().await;
  let mut input = NewTicket::new("Move desk");
  input.category = Some("facilities".into());
  let created = s.create_ticket(input).await.unwrap();

  let patch = TicketPatch {
    category: Some(None),
    ..Default::default()
  };
  let updated = s.update_ticket(created.ticket_id, patch).await.unwrap().unwrap();
  assert!(updated.category.is_none());
}

#[tokio::test]
async fn update_ticket_missing_returns_none() {
  let s = store().await;
  let result = s
    .update_ticket(Uuid::new_v4(), TicketPatch::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_time_logging_is_not_lost() {
  let s = store().await;
  let created = s.create_ticket(NewTicket::new("Shared drive slow")).await.unwrap();

  let handles: Vec<_> = (0..50)
    .map(|_| {
      let s = s.clone();
      let id = created.ticket_id;
      tokio::spawn(async move {
        let patch = TicketPatch {
          add_time_spent: Some(1),
          ..Default::default()
        };
        s.update_ticket(id, patch).await.unwrap().unwrap();
      })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap();
  }

  let fetched = s.get_ticket(created.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched.time_spent, 50);
}

#[tokio::test]
async fn written_records_match_what_is_read_back() {
  let s = store().await;
  let created = s.create_ticket(NewTicket::new("Badge reader dead")).await.unwrap();
  assert_eq!(created.created_at.timestamp_subsec_nanos() % 1_000, 0);

  let patch = TicketPatch {
    status: Some(TicketStatus::Resolved),
    ..Default::default()
  };
  let updated = s.update_ticket(created.ticket_id, patch).await.unwrap().unwrap();
  let fetched = s.get_ticket(created.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
  assert_eq!(fetched.resolved_at, updated.resolved_at);
}

// ─── Knowledge base ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_article() {
  let s = store().await;
  let mut input = NewArticle::new("Connecting to the VPN", "network");
  input.content = "Open the client and sign in.".into();
  input.tags = vec!["vpn".into(), "remote".into()];
  let created = s.create_article(input).await.unwrap();

  let fetched = s.get_article(created.article_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.tags, ["vpn", "remote"]);
  assert_eq!(fetched.views, 0);
}

#[tokio::test]
async fn record_view_increments_without_touching_updated_at() {
  let s = store().await;
  let created = s
    .create_article(NewArticle::new("Printer setup", "hardware"))
    .await
    .unwrap();

  s.record_view(created.article_id).await.unwrap();
  let viewed = s.record_view(created.article_id).await.unwrap().unwrap();
  assert_eq!(viewed.views, 2);
  assert_eq!(viewed.updated_at, created.updated_at);
}

#[tokio::test]
async fn record_view_missing_returns_none() {
  let s = store().await;
  assert!(s.record_view(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_article_keeps_view_count() {
  let s = store().await;
  let created = s
    .create_article(NewArticle::new("Old title", "general"))
    .await
    .unwrap();
  s.record_view(created.article_id).await.unwrap();

  let patch = ArticlePatch {
    title: Some("New title".into()),
    ..Default::default()
  };
  let updated = s.update_article(created.article_id, patch).await.unwrap().unwrap();
  assert_eq!(updated.title, "New title");

  let fetched = s.get_article(created.article_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "New title");
  assert_eq!(fetched.views, 1);
}

#[tokio::test]
async fn list_articles_by_category_and_tag() {
  let s = store().await;
  let mut vpn = NewArticle::new("VPN", "network");
  vpn.tags = vec!["vpn".into()];
  s.create_article(vpn).await.unwrap();
  let mut wifi = NewArticle::new("Wi-Fi", "network");
  wifi.tags = vec!["wireless".into()];
  s.create_article(wifi).await.unwrap();
  s.create_article(NewArticle::new("Payroll", "hr")).await.unwrap();

  let network = s
    .list_articles(&ArticleQuery {
      category: Some("network".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(network.len(), 2);

  let tagged = s
    .list_articles(&ArticleQuery {
      tag: Some("vpn".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(tagged.len(), 1);
  assert_eq!(tagged[0].title, "VPN");
}

#[tokio::test]
async fn list_articles_sorted_by_views_and_title() {
  let s = store().await;
  let a = s.create_article(NewArticle::new("beta", "x")).await.unwrap();
  let b = s.create_article(NewArticle::new("Alpha", "x")).await.unwrap();
  s.create_article(NewArticle::new("gamma", "x")).await.unwrap();
  for _ in 0..3 {
    s.record_view(b.article_id).await.unwrap();
  }
  s.record_view(a.article_id).await.unwrap();

  let by_views = s
    .list_articles(&ArticleQuery {
      sort: ArticleSort::MostViewed,
      ..Default::default()
    })
    .await
    .unwrap();
  let views: Vec<_> = by_views.iter().map(|a| a.views).collect();
  assert_eq!(views, [3, 1, 0]);

  let by_title = s
    .list_articles(&ArticleQuery {
      sort: ArticleSort::Title,
      ..Default::default()
    })
    .await
    .unwrap();
  let titles: Vec<_> = by_title.iter().map(|a| a.title.as_str()).collect();
  assert_eq!(titles, ["Alpha", "beta", "gamma"]);
}

// ─── SLA definitions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn slas_are_listed_most_severe_first() {
  let s = store().await;
  for input in NewSla::defaults() {
    s.create_sla(input).await.unwrap();
  }
  let slas = s.list_slas(false).await.unwrap();
  let priorities: Vec<_> = slas.iter().map(|s| s.priority).collect();
  assert_eq!(
    priorities,
    [
      TicketPriority::Critical,
      TicketPriority::High,
      TicketPriority::Medium,
      TicketPriority::Low,
    ]
  );
}

#[tokio::test]
async fn inactive_slas_are_filtered() {
  let s = store().await;
  let sla = s
    .create_sla(NewSla::new("Gold", TicketPriority::High, 30, 240))
    .await
    .unwrap();
  s.create_sla(NewSla::new("Bronze", TicketPriority::Low, 480, 4320))
    .await
    .unwrap();

  let patch = SlaPatch { active: Some(false), ..Default::default() };
  let updated = s.update_sla(sla.sla_id, patch).await.unwrap().unwrap();
  assert!(!updated.active);

  assert_eq!(s.list_slas(false).await.unwrap().len(), 2);
  let active = s.list_slas(true).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].name, "Bronze");

  let fetched = s.get_sla(sla.sla_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

// ─── Problems ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn problem_lifecycle() {
  let s = store().await;
  let created = s
    .create_problem(NewProblem::new("Mail relay rejects large attachments"))
    .await
    .unwrap();
  assert_eq!(created.status, ProblemStatus::Open);

  let patch = ProblemPatch {
    status: Some(ProblemStatus::KnownError),
    root_cause: Some(Some("Size limit set to 10 MB".into())),
    workaround: Some(Some("Share via file storage".into())),
    ..Default::default()
  };
  let updated = s.update_problem(created.problem_id, patch).await.unwrap().unwrap();
  assert_eq!(updated.status, ProblemStatus::KnownError);

  let fetched = s.get_problem(created.problem_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
  assert_eq!(fetched.root_cause.as_deref(), Some("Size limit set to 10 MB"));
}

#[tokio::test]
async fn problem_patch_clears_text_fields_on_null() {
  let s = store().await;
  let mut input = NewProblem::new("Nightly backup overruns");
  input.category = Some("storage".into());
  input.root_cause = Some("Dedup job overlaps".into());
  input.workaround = Some("Run dedup at noon".into());
  let created = s.create_problem(input).await.unwrap();

  let patch: ProblemPatch = serde_json::from_str(
    r#"{"category": null, "root_cause": null, "workaround": null, "resolution": "Rescheduled"}"#,
  )
  .unwrap();
  s.update_problem(created.problem_id, patch).await.unwrap().unwrap();

  let fetched = s.get_problem(created.problem_id).await.unwrap().unwrap();
  assert_eq!(fetched.category, None);
  assert_eq!(fetched.root_cause, None);
  assert_eq!(fetched.workaround, None);
  assert_eq!(fetched.resolution.as_deref(), Some("Rescheduled"));
}

#[tokio::test]
async fn list_problems_filters_by_status() {
  let s = store().await;
  let a = s.create_problem(NewProblem::new("a")).await.unwrap();
  s.create_problem(NewProblem::new("b")).await.unwrap();
  let patch = ProblemPatch {
    status: Some(ProblemStatus::Resolved),
    ..Default::default()
  };
  s.update_problem(a.problem_id, patch).await.unwrap();

  let open = s
    .list_problems(&ProblemQuery {
      status: Some(ProblemStatus::Open),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(open.len(), 1);
  assert_eq!(open[0].title, "b");
  assert_eq!(s.list_problems(&ProblemQuery::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn get_problem_missing_returns_none() {
  let s = store().await;
  assert!(s.get_problem(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_counters() {
  let dir = std::env::temp_dir().join(format!("helpdesk-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("desk.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_ticket(NewTicket::new("first")).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  let second = s.create_ticket(NewTicket::new("second")).await.unwrap();
  assert_eq!(second.ticket_number, "TKT-000002");

  let _ = std::fs::remove_dir_all(&dir);
}
