//! The Salesforce tool surface served over MCP.
//!
//! Each tool reshapes its arguments into one [`SalesforceRequest`], forwards
//! it through the shared [`SalesforceClient`], and returns the stringified
//! result. The tool names and descriptions are the interface contract the
//! agent's LLM selects on, so they track the published wording exactly.

use rig::completion::ToolDefinition;
use rig::tool::{Tool, ToolSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use salesforce_client::{SalesforceClient, SalesforceError, SalesforceRequest};

/// Error type for Salesforce tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The org rejected or failed the request.
    #[error(transparent)]
    Salesforce(#[from] SalesforceError),
    /// The org answered with a shape the tool could not interpret.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Arguments for tools that operate on the whole org.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct NoArgs {}

/// Arguments for tools that take one object API name.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ObjectArgs {
    /// API name of the Salesforce object, e.g. `Account` or `Invoice__c`.
    pub object: String,
}

/// Arguments for `execute_soql_query`.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SoqlArgs {
    /// The SOQL query to execute.
    pub soql_query: String,
}

/// Arguments for `create_record_of_object`.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateArgs {
    /// API name of the Salesforce object.
    pub object: String,
    /// Field API names mapped to the values the record should have.
    pub fields: Map<String, Value>,
}

/// Arguments for `update_record_of_object`.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UpdateArgs {
    /// API name of the Salesforce object.
    pub object: String,
    /// Id of the record to update.
    pub record_id: String,
    /// Field API names mapped to their new values.
    pub fields: Map<String, Value>,
}

/// Arguments for `delete_record_of_object`.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct DeleteArgs {
    /// API name of the Salesforce object.
    pub object: String,
    /// Id of the record to delete.
    pub record_id: String,
}

/// Names of the org's objects where `custom == true || searchable == true`,
/// extracted from a `list_objects` response.
pub(crate) fn visible_object_names(result: &Value) -> Result<Vec<String>, ToolError> {
    let sobjects = result
        .get("sobjects")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::Shape("list_objects response has no sobjects array".into()))?;

    Ok(sobjects
        .iter()
        .filter(|obj| {
            obj.get("custom").and_then(Value::as_bool).unwrap_or(false)
                || obj.get("searchable").and_then(Value::as_bool).unwrap_or(false)
        })
        .filter_map(|obj| obj.get("name").and_then(Value::as_str))
        .map(String::from)
        .collect())
}

/// Drop custom objects, i.e. every API name ending in `__c`.
pub(crate) fn standard_only(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !name.ends_with("__c"))
        .collect()
}

fn args_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

/// Returns the count of or the number of total objects in the org.
#[derive(Clone)]
pub struct GetObjectsCount {
    client: SalesforceClient,
}

impl GetObjectsCount {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetObjectsCount {
    const NAME: &'static str = "get_objects_count";

    type Error = ToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the count of or the number of total objects in the org"
                .to_string(),
            parameters: args_schema::<NoArgs>(),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self.client.invoke(SalesforceRequest::ListObjects).await?;
        Ok(visible_object_names(&result)?.len().to_string())
    }
}

/// Returns the list of total objects in the org as their API names.
#[derive(Clone)]
pub struct GetObjectsList {
    client: SalesforceClient,
}

impl GetObjectsList {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetObjectsList {
    const NAME: &'static str = "get_objects_list";

    type Error = ToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the list of total objects in the org as their API names"
                .to_string(),
            parameters: args_schema::<NoArgs>(),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self.client.invoke(SalesforceRequest::ListObjects).await?;
        Ok(Value::from(visible_object_names(&result)?).to_string())
    }
}

/// Returns the count of or the number of standard objects in the org.
#[derive(Clone)]
pub struct GetStandardObjectsCount {
    client: SalesforceClient,
}

impl GetStandardObjectsCount {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetStandardObjectsCount {
    const NAME: &'static str = "get_standard_objects_count";

    type Error = ToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the count of or the number of standard objects in the org"
                .to_string(),
            parameters: args_schema::<NoArgs>(),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self.client.invoke(SalesforceRequest::ListObjects).await?;
        Ok(standard_only(visible_object_names(&result)?)
            .len()
            .to_string())
    }
}

/// Returns the complete list of standard objects in the org.
#[derive(Clone)]
pub struct GetStandardObjectsList {
    client: SalesforceClient,
}

impl GetStandardObjectsList {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetStandardObjectsList {
    const NAME: &'static str = "get_standard_objects_list";

    type Error = ToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the complete list of standard objects in the org".to_string(),
            parameters: args_schema::<NoArgs>(),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self.client.invoke(SalesforceRequest::ListObjects).await?;
        Ok(Value::from(standard_only(visible_object_names(&result)?)).to_string())
    }
}

/// Returns the fields of one object.
#[derive(Clone)]
pub struct GetFieldsOfObject {
    client: SalesforceClient,
}

impl GetFieldsOfObject {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetFieldsOfObject {
    const NAME: &'static str = "get_fields_of_object";

    type Error = ToolError;
    type Args = ObjectArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the list of fields (API names) of the object passed as an input. \
                          Requires: 'object'. \
                          The object's API name is given by the AI assistant using other tools \
                          before calling this tool."
                .to_string(),
            parameters: args_schema::<ObjectArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Describe {
                object_name: args.object,
            })
            .await?;
        let fields = result
            .get("fields")
            .ok_or_else(|| ToolError::Shape("describe response has no fields array".into()))?;
        Ok(fields.to_string())
    }
}

/// Returns the record count of one object.
#[derive(Clone)]
pub struct GetRecordsCount {
    client: SalesforceClient,
}

impl GetRecordsCount {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for GetRecordsCount {
    const NAME: &'static str = "get_records_count";

    type Error = ToolError;
    type Args = ObjectArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Returns the count of all the records of the object passed as an input. \
                          Requires: 'object'. \
                          The object's API name is given by the AI assistant using other tools \
                          before calling this tool."
                .to_string(),
            parameters: args_schema::<ObjectArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Query {
                query: format!("SELECT COUNT() FROM {}", args.object),
            })
            .await?;
        let total = result
            .get("totalSize")
            .ok_or_else(|| ToolError::Shape("query response has no totalSize".into()))?;
        Ok(total.to_string())
    }
}

/// Executes an arbitrary SOQL query.
#[derive(Clone)]
pub struct ExecuteSoqlQuery {
    client: SalesforceClient,
}

impl ExecuteSoqlQuery {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for ExecuteSoqlQuery {
    const NAME: &'static str = "execute_soql_query";

    type Error = ToolError;
    type Args = SoqlArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Executes the SOQL query passed as an input and returns the result. \
                          Requires: 'soql_query'. \
                          The SOQL query is given by the AI assistant before calling this tool."
                .to_string(),
            parameters: args_schema::<SoqlArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Query {
                query: args.soql_query,
            })
            .await?;
        Ok(result.to_string())
    }
}

/// Creates one record.
#[derive(Clone)]
pub struct CreateRecordOfObject {
    client: SalesforceClient,
}

impl CreateRecordOfObject {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for CreateRecordOfObject {
    const NAME: &'static str = "create_record_of_object";

    type Error = ToolError;
    type Args = CreateArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Creates a record of the object passed as an input with the fields and \
                          their values passed as a dictionary. \
                          Requires: 'object', 'fields'. \
                          The API names of the object and the fields is given by the AI assistant \
                          before calling this tool. The user only provides the values for fields \
                          not the field names before calling this tool."
                .to_string(),
            parameters: args_schema::<CreateArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Create {
                object_name: args.object,
                record_data: args.fields,
            })
            .await?;
        Ok(result.to_string())
    }
}

/// Updates one record by id.
#[derive(Clone)]
pub struct UpdateRecordOfObject {
    client: SalesforceClient,
}

impl UpdateRecordOfObject {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for UpdateRecordOfObject {
    const NAME: &'static str = "update_record_of_object";

    type Error = ToolError;
    type Args = UpdateArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Updates a record of the object passed as an input with the fields and \
                          their values passed as a dictionary. \
                          Requires: 'object', 'record_id', 'fields'. \
                          The API names of the object and the fields and the record_id is given \
                          by the AI assistant before calling this tool. The user only provides \
                          the values for fields not the field names before calling this tool."
                .to_string(),
            parameters: args_schema::<UpdateArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Update {
                object_name: args.object,
                record_id: args.record_id,
                record_data: args.fields,
            })
            .await?;
        Ok(result.to_string())
    }
}

/// Deletes one record by id.
#[derive(Clone)]
pub struct DeleteRecordOfObject {
    client: SalesforceClient,
}

impl DeleteRecordOfObject {
    /// Wrap the shared client.
    #[must_use]
    pub const fn new(client: SalesforceClient) -> Self {
        Self { client }
    }
}

impl Tool for DeleteRecordOfObject {
    const NAME: &'static str = "delete_record_of_object";

    type Error = ToolError;
    type Args = DeleteArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Deletes a record of the object passed as an input. \
                          Requires: 'object', 'record_id'. \
                          The API name of the object and the record_id is given by the AI \
                          assistant before calling this tool."
                .to_string(),
            parameters: args_schema::<DeleteArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = self
            .client
            .invoke(SalesforceRequest::Delete {
                object_name: args.object,
                record_id: args.record_id,
            })
            .await?;
        Ok(result.to_string())
    }
}

/// Build the full Salesforce toolset around one shared client.
#[must_use]
pub fn build_toolset(client: SalesforceClient) -> ToolSet {
    let mut toolset = ToolSet::default();
    toolset.add_tool(GetObjectsCount::new(client.clone()));
    toolset.add_tool(GetObjectsList::new(client.clone()));
    toolset.add_tool(GetStandardObjectsCount::new(client.clone()));
    toolset.add_tool(GetStandardObjectsList::new(client.clone()));
    toolset.add_tool(GetFieldsOfObject::new(client.clone()));
    toolset.add_tool(GetRecordsCount::new(client.clone()));
    toolset.add_tool(ExecuteSoqlQuery::new(client.clone()));
    toolset.add_tool(CreateRecordOfObject::new(client.clone()));
    toolset.add_tool(UpdateRecordOfObject::new(client.clone()));
    toolset.add_tool(DeleteRecordOfObject::new(client));
    toolset
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn describe_global() -> Value {
        json!({
            "sobjects": [
                {"name": "Account", "custom": false, "searchable": true},
                {"name": "Invoice__c", "custom": true, "searchable": true},
                {"name": "ApexClass", "custom": false, "searchable": false},
                {"name": "Shipment__c", "custom": true, "searchable": false},
            ]
        })
    }

    #[test]
    fn filtering_keeps_custom_or_searchable_objects() {
        let names = visible_object_names(&describe_global()).unwrap();
        assert_eq!(names, vec!["Account", "Invoice__c", "Shipment__c"]);
    }

    #[test]
    fn standard_filter_excludes_every_custom_suffix() {
        let names = standard_only(vec![
            "Account".to_string(),
            "Invoice__c".to_string(),
            "Contact".to_string(),
            "Shipment__c".to_string(),
        ]);
        assert_eq!(names, vec!["Account", "Contact"]);
    }

    #[test]
    fn missing_sobjects_array_is_a_shape_error() {
        let err = visible_object_names(&json!({"totalSize": 3})).unwrap_err();
        assert!(matches!(err, ToolError::Shape(_)));
    }

    #[test]
    fn soql_args_schema_names_the_parameter() {
        let schema = args_schema::<SoqlArgs>();
        assert!(schema["properties"]["soql_query"].is_object());
    }
}
