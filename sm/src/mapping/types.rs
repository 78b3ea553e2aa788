//! Wire types exchanged with the mapping service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::MappingError;
use crate::table::ColumnList;

/// Column names of one side of the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    pub columns: Vec<String>,
}

/// Request payload; field names and nesting are fixed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub source_table: TableColumns,
    pub destination_table: TableColumns,
}

impl MappingRequest {
    /// Assemble a request from the two extracted column lists
    pub fn build(source: &ColumnList, destination: &ColumnList) -> Result<Self, MappingError> {
        debug!(source = source.len(), destination = destination.len(), "MappingRequest::build: called");
        if source.is_empty() {
            return Err(MappingError::Precondition("source column list is empty".to_string()));
        }
        if destination.is_empty() {
            return Err(MappingError::Precondition(
                "destination column list is empty".to_string(),
            ));
        }

        Ok(Self {
            source_table: TableColumns {
                columns: source.as_slice().to_vec(),
            },
            destination_table: TableColumns {
                columns: destination.as_slice().to_vec(),
            },
        })
    }
}

/// The service's `mappings` object, in the order it was returned
///
/// Keys are whatever the service returns; no source/destination convention
/// is assumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingResult(Map<String, Value>);

impl MappingResult {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_wire_shape() {
        let source = ColumnList::from(&["SKU", "Name"][..]);
        let destination = ColumnList::from(&["Product_Code", "Title"][..]);

        let request = MappingRequest::build(&source, &destination).unwrap();
        let wire = serde_json::to_string(&request).unwrap();

        assert_eq!(
            wire,
            r#"{"source_table":{"columns":["SKU","Name"]},"destination_table":{"columns":["Product_Code","Title"]}}"#
        );
    }

    #[test]
    fn test_build_rejects_empty_source() {
        let err = MappingRequest::build(&ColumnList::default(), &ColumnList::from(&["Title"][..])).unwrap_err();
        assert!(matches!(err, MappingError::Precondition(_)));
    }

    #[test]
    fn test_build_rejects_empty_destination() {
        let err = MappingRequest::build(&ColumnList::from(&["SKU"][..]), &ColumnList::default()).unwrap_err();
        assert!(matches!(err, MappingError::Precondition(_)));
    }

    #[test]
    fn test_result_keeps_server_order() {
        let value: Value = serde_json::from_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let result: MappingResult = serde_json::from_value(value).unwrap();
        let keys: Vec<&String> = result.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
