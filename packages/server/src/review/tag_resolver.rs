use std::collections::HashSet;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

use crate::entity::tag;

/// Split a free-text tag string into distinct, trimmed, non-empty names.
///
/// Only ASCII control characters and spaces are trimmed; other Unicode whitespace such
/// as U+3000 is part of the name. Names keep the order of their first occurrence.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(|token| token.trim_matches(|c: char| c <= ' '))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_owned)
        .collect()
}

/// Turns free-text tag strings into persisted tags, creating the ones not seen before.
pub struct TagResolver<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TagResolver<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Resolve `raw` into its set of tags, sorted by name.
    ///
    /// Missing names are inserted with `ON CONFLICT DO NOTHING` and then re-read, so a
    /// concurrent caller creating the same name never produces a second row.
    pub async fn resolve(&self, raw: &str) -> Result<Vec<tag::Model>, DbErr> {
        let names = split_tags(raw);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.find_by_names(&names).await?;
        let known: HashSet<&str> = existing.iter().map(|t| t.tag.as_str()).collect();
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !known.contains(name.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(existing);
        }

        self.insert_names(&missing).await?;
        self.find_by_names(&names).await
    }

    /// Insert a tag row per name. Names that already exist, including ones created by a
    /// concurrent caller since they were looked up, are skipped without error.
    pub async fn insert_names(&self, names: &[String]) -> Result<(), DbErr> {
        if names.is_empty() {
            return Ok(());
        }

        debug!(count = names.len(), "Creating new tags");
        let models = names.iter().map(|name| tag::ActiveModel {
            tag: Set(name.clone()),
            ..Default::default()
        });
        let result = tag::Entity::insert_many(models)
            .on_conflict(OnConflict::column(tag::Column::Tag).do_nothing().to_owned())
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<tag::Model>, DbErr> {
        tag::Entity::find()
            .filter(tag::Column::Tag.is_in(names.iter().cloned()))
            .order_by_asc(tag::Column::Tag)
            .all(self.conn)
            .await
    }
}
