//! Relation lookups.
//!
//! Each [`RelationLink`] shape has one recipe for reaching the records on
//! the other side of a relation, starting from a single record.

use stitch_core::{Document, DocumentExt, RecordId};
use stitch_registry::RelationLink;
use stitch_store::DataSource;

use crate::error::QueryResult;

/// Records reached through one relation field.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Document>),
    Many(Vec<Document>),
}

impl Related {
    pub fn into_vec(self) -> Vec<Document> {
        match self {
            Related::One(record) => record.into_iter().collect(),
            Related::Many(records) => records,
        }
    }
}

/// Fetch the records `record` reaches through `link`; `target` is the
/// data source of the related model.
pub async fn fetch_related(
    target: &DataSource,
    link: &RelationLink,
    record: &Document,
) -> QueryResult<Related> {
    let empty = if link.is_list() {
        Related::Many(Vec::new())
    } else {
        Related::One(None)
    };

    let related = match link {
        RelationLink::OwnedKey { foreign_key } => match record.field(foreign_key).as_str() {
            Some(id) => Related::One(target.find_one_by_id(&RecordId::from(id)).await?),
            None => empty,
        },
        RelationLink::ReferencedKey { foreign_key } => match record.record_id() {
            Some(id) => Related::One(target.find_one_by_relation(foreign_key, &id).await?),
            None => empty,
        },
        RelationLink::ForeignList { foreign_key } => match record.record_id() {
            Some(id) => Related::Many(target.find_many_from_one_relation(foreign_key, &id).await?),
            None => empty,
        },
        RelationLink::JoinTable {
            source_side,
            target_side,
        } => match record.record_id() {
            Some(id) => Related::Many(
                target
                    .find_many_from_many_relation(source_side, target_side, &id)
                    .await?,
            ),
            None => empty,
        },
    };
    Ok(related)
}
