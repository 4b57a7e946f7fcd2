//! Knowledge-base articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Result, error::require_text, nullable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub article_id: Uuid,
  pub title:      String,
  pub content:    String,
  pub category:   String,
  pub tags:       Vec<String>,
  /// Number of times the article has been opened.
  pub views:      u64,
  pub author:     Option<String>,
  pub created_at: DateTime<Utc>,
  /// Last content change. Recording a view does not touch it.
  pub updated_at: DateTime<Utc>,
}

/// Ordering for article listings.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArticleSort {
  /// Most recently updated first.
  #[default]
  MostRecent,
  /// Highest view count first; ties go to the more recently updated.
  MostViewed,
  Title,
}

/// Input to [`crate::store::DeskStore::create_article`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
  pub title:    String,
  #[serde(default)]
  pub content:  String,
  pub category: String,
  #[serde(default)]
  pub tags:     Vec<String>,
  pub author:   Option<String>,
}

impl NewArticle {
  pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      category: category.into(),
      ..Default::default()
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("title", &self.title)?;
    require_text("category", &self.category)
  }

  pub fn into_article(self, article_id: Uuid, now: DateTime<Utc>) -> Article {
    Article {
      article_id,
      title: self.title,
      content: self.content,
      category: self.category,
      tags: normalize_tags(self.tags),
      views: 0,
      author: self.author,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Partial update for an article.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
  pub title:    Option<String>,
  pub content:  Option<String>,
  pub category: Option<String>,
  pub tags:     Option<Vec<String>>,
  #[serde(default, deserialize_with = "nullable::deserialize")]
  pub author:   Option<Option<String>>,
}

impl ArticlePatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      require_text("title", title)?;
    }
    if let Some(category) = &self.category {
      require_text("category", category)?;
    }
    Ok(())
  }

  pub fn apply(self, article: &mut Article, now: DateTime<Utc>) {
    if let Some(title) = self.title {
      article.title = title;
    }
    if let Some(content) = self.content {
      article.content = content;
    }
    if let Some(category) = self.category {
      article.category = category;
    }
    if let Some(tags) = self.tags {
      article.tags = normalize_tags(tags);
    }
    if let Some(author) = self.author {
      article.author = author;
    }
    article.updated_at = now;
  }
}

/// Trim, drop empties and de-duplicate while keeping first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(tags.len());
  for tag in tags {
    let tag = tag.trim();
    if !tag.is_empty() && !out.iter().any(|t| t == tag) {
      out.push(tag.to_owned());
    }
  }
  out
}
