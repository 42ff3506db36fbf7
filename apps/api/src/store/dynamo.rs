use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::{BlobStore, StorageError};

/// Attribute the serialized blob is stored under.
const DATA_ATTR: &str = "response-data";

/// A single DynamoDB table addressed through one partition-key attribute.
#[derive(Clone)]
pub struct DynamoTable {
    client: Client,
    table: String,
    key_attr: String,
}

impl DynamoTable {
    pub fn new(client: Client, table: impl Into<String>, key_attr: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            key_attr: key_attr.into(),
        }
    }
}

#[async_trait]
impl BlobStore for DynamoTable {
    /// Insert-if-absent, falling back to an unconditional overwrite when the
    /// key already exists.
    ///
    /// This is a two-step optimistic protocol, not a true atomic upsert: two
    /// concurrent callers for the same key may both fall through to the
    /// overwrite branch, and the last writer wins. Race-free only for the
    /// first step, under DynamoDB's conditional-write guarantee.
    async fn upsert(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let put = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(&self.key_attr, AttributeValue::S(key.to_string()))
            .item(DATA_ATTR, AttributeValue::S(blob.to_string()))
            .condition_expression("attribute_not_exists(#k)")
            .expression_attribute_names("#k", &self.key_attr)
            .send()
            .await;

        match put {
            Ok(_) => {
                debug!(table = %self.table, key, "inserted new item");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                debug!(table = %self.table, key, "item exists, overwriting");
                self.client
                    .update_item()
                    .table_name(&self.table)
                    .key(&self.key_attr, AttributeValue::S(key.to_string()))
                    .update_expression("SET #rd = :rd")
                    .expression_attribute_names("#rd", DATA_ATTR)
                    .expression_attribute_values(":rd", AttributeValue::S(blob.to_string()))
                    .send()
                    .await
                    .map_err(|e| StorageError::Request(DisplayErrorContext(e).to_string()))?;
                Ok(())
            }
            Err(err) => Err(StorageError::Request(DisplayErrorContext(err).to_string())),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(&self.key_attr, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(e).to_string()))?;

        match output.item {
            None => Ok(None),
            Some(item) => {
                let blob = item
                    .get(DATA_ATTR)
                    .and_then(|v| v.as_s().ok())
                    .ok_or_else(|| StorageError::Corrupt(key.to_string()))?;
                Ok(Some(blob.clone()))
            }
        }
    }
}
