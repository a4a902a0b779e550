//! Request shape forwarded to the org.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One operation against a Salesforce org.
///
/// Serializes to the flat dictionary shape the org-facing layer consumes:
/// an `operation` discriminant plus the operation-specific fields, with
/// caller-supplied values copied through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum SalesforceRequest {
    /// Describe every object in the org (`describeGlobal`).
    ListObjects,
    /// Describe the fields and metadata of one object.
    Describe {
        /// API name of the object, e.g. `Account` or `Invoice__c`.
        object_name: String,
    },
    /// Run a SOQL query.
    Query {
        /// The SOQL text, e.g. `SELECT Id, Name FROM Account`.
        query: String,
    },
    /// Create one record.
    Create {
        /// API name of the object.
        object_name: String,
        /// Field API names mapped to their values.
        record_data: Map<String, Value>,
    },
    /// Update one record by id.
    Update {
        /// API name of the object.
        object_name: String,
        /// Salesforce record id.
        record_id: String,
        /// Field API names mapped to their new values.
        record_data: Map<String, Value>,
    },
    /// Delete one record by id.
    Delete {
        /// API name of the object.
        object_name: String,
        /// Salesforce record id.
        record_id: String,
    },
}
