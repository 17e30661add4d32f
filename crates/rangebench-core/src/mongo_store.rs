//! MongoDB-backed range store (enabled with the `mongo` feature).

use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::sync::{Client, Collection};
use tracing::info;

use crate::connection::ConnectionSettings;
use crate::error::{BenchError, StoreError};
use crate::query::Predicate;
use crate::store::RangeStore;

/// A collection of `{chr, start, end}` documents.
pub struct MongoStore {
    settings: ConnectionSettings,
    uri: String,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect using `settings`. Authentication happens on first use.
    pub fn connect(settings: ConnectionSettings) -> Result<Self, BenchError> {
        settings.validate()?;
        let uri = settings.connection_string()?;
        info!(uri = %settings.redacted()?, "connecting to datastore");
        let collection = open(&uri, &settings).map_err(|e| BenchError::Config(e.to_string()))?;
        Ok(Self {
            settings,
            uri,
            collection,
        })
    }
}

fn open(uri: &str, settings: &ConnectionSettings) -> Result<Collection<Document>, StoreError> {
    let client = Client::with_uri_str(uri).map_err(map_error)?;
    Ok(client
        .database(&settings.database)
        .collection::<Document>(&settings.collection))
}

fn filter(p: &Predicate) -> Document {
    doc! {
        "chr": p.partition.as_str(),
        "start": { "$gt": p.start_after, "$lte": p.start_until },
        "end": { "$gte": p.end_from, "$lte": p.end_until },
    }
}

fn map_error(err: MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => StoreError::Authentication(err.to_string()),
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

fn count_field(doc: &Document) -> Result<u64, StoreError> {
    let count = match doc.get("count") {
        Some(Bson::Int32(n)) => u64::try_from(*n).ok(),
        Some(Bson::Int64(n)) => u64::try_from(*n).ok(),
        _ => None,
    };
    count.ok_or_else(|| StoreError::Query(format!("group stage returned no usable count: {doc}")))
}

impl RangeStore for MongoStore {
    fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.collection
            .count_documents(filter(predicate), None)
            .map_err(map_error)
    }

    fn count_matching_grouped(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let pipeline = [
            doc! { "$match": filter(predicate) },
            doc! { "$group": { "_id": Bson::Null, "count": { "$sum": 1 } } },
        ];
        let mut cursor = self.collection.aggregate(pipeline, None).map_err(map_error)?;
        match cursor.next() {
            Some(Ok(doc)) => count_field(&doc),
            Some(Err(e)) => Err(map_error(e)),
            None => Err(StoreError::CursorExhausted),
        }
    }

    fn reconnect(&mut self) -> Result<(), StoreError> {
        self.collection = open(&self.uri, &self.settings)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "mongodb {}.{}",
            self.settings.database, self.settings.collection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;

    #[test]
    fn filter_expresses_predicate() {
        let f = filter(&Query::new("13", 1_000, 2_000, 50).predicate());
        assert_eq!(f.get_str("chr").unwrap(), "13");
        let start = f.get_document("start").unwrap();
        assert_eq!(start.get_i64("$gt").unwrap(), 950);
        assert_eq!(start.get_i64("$lte").unwrap(), 2_000);
        let end = f.get_document("end").unwrap();
        assert_eq!(end.get_i64("$gte").unwrap(), 1_000);
        assert_eq!(end.get_i64("$lte").unwrap(), 2_050);
    }

    #[test]
    fn count_field_accepts_both_widths() {
        assert_eq!(count_field(&doc! { "count": 42_i32 }), Ok(42));
        assert_eq!(count_field(&doc! { "count": 43_i64 }), Ok(43));
        assert!(count_field(&doc! { "total": 1_i32 }).is_err());
    }
}
