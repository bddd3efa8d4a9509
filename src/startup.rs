use crate::errors::AppError;
use crate::repositories::{BOOKMARKS_TABLE, POSTS_TABLE, SESSIONS_TABLE, USERS_TABLE};
use aws_sdk_dynamodb::{
    error::SdkError as DynamoSdkError,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
    Client as DynamoDbClient,
};
use tracing;

/// Creates a DynamoDB table if it doesn't exist. All keys are strings; the
/// bookmarks table is the only one with a range key.
async fn create_table_if_not_exists(
    client: &DynamoDbClient,
    table_name: &str,
    hash_key: &str,
    range_key: Option<&str>,
) -> Result<(), AppError> {
    let mut builder = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(hash_key)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| {
                    AppError::InitError(format!("Failed to build attribute definition: {}", e))
                })?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(hash_key)
                .key_type(KeyType::Hash)
                .build()
                .map_err(|e| AppError::InitError(format!("Failed to build key schema: {}", e)))?,
        )
        .billing_mode(BillingMode::PayPerRequest);

    if let Some(range_key) = range_key {
        builder = builder
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(range_key)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(|e| {
                        AppError::InitError(format!("Failed to build attribute definition: {}", e))
                    })?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(range_key)
                    .key_type(KeyType::Range)
                    .build()
                    .map_err(|e| {
                        AppError::InitError(format!("Failed to build key schema: {}", e))
                    })?,
            );
    }

    match builder.send().await {
        Ok(_) => {
            tracing::info!(
                "Startup: Table '{}' created successfully or setup initiated.",
                table_name
            );
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!(
                        "Startup: Table '{}' already exists, no action needed.",
                        table_name
                    );
                    Ok(())
                } else {
                    let context =
                        format!("Startup: Service error creating DynamoDB table '{}'", table_name);
                    tracing::error!("{}: {:?}", context, service_err);
                    Err(AppError::InitError(format!("{}: {}", context, e)))
                }
            } else {
                let context = format!("Startup: SDK error creating DynamoDB table '{}'", table_name);
                tracing::error!("{}: {}", context, e);
                Err(AppError::InitError(format!("{}: {}", context, e)))
            }
        }
    }
}

/// Initializes the DynamoDB tables the page reads and writes.
///
/// NOTE: Creating resources at startup isn't ideal for production; IaC or
/// manual setup is the better home for this. Kept for local development.
pub async fn init_tables(client: &DynamoDbClient) -> Result<(), AppError> {
    tracing::info!("Startup: Initializing DynamoDB tables...");
    create_table_if_not_exists(client, SESSIONS_TABLE, "token", None).await?;
    create_table_if_not_exists(client, USERS_TABLE, "user_id", None).await?;
    create_table_if_not_exists(client, POSTS_TABLE, "forum_id", None).await?;
    create_table_if_not_exists(client, BOOKMARKS_TABLE, "user_id", Some("post_id")).await?;
    tracing::info!("Startup: DynamoDB table initialization complete.");
    Ok(())
}
