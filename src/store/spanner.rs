use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::{Code, Status};
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;

use super::{KvStore, ListOptions, ListPage};
use crate::config::SpannerConfig;

const TABLE: &str = "gateway_kv";

/// Key-value store backed by a Spanner table.
///
/// Cheap to clone; clones share one session pool.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to Spanner, provisioning the instance, database and table
    /// first when they are missing.
    ///
    /// `ClientConfig::default()` picks up `SPANNER_EMULATOR_HOST` from the
    /// environment, so the emulator is used whenever that variable is set.
    pub async fn from_config(config: &SpannerConfig) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = config.database_path();

        match config.emulator_host.as_deref() {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl KvStore for SpannerStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut statement = Statement::new(format!("SELECT content FROM {} WHERE id = @id", TABLE));
        statement.add_param("id", &key.to_string());

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query value from Spanner")?;

        if let Some(row) = result_set.next().await? {
            let content: String = row
                .column_by_name("content")
                .context("Failed to decode content column")?;
            tracing::debug!("Read value for key: {}", key);
            Ok(Some(content))
        } else {
            tracing::debug!("No value for key: {}", key);
            Ok(None)
        }
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        let key = key.to_string();
        let content = content.to_string();

        let mutation = insert_or_update(
            TABLE,
            &["id", "content", "updated_at"],
            &[&key, &content, &CommitTimestamp::new()],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to write value to Spanner")?;

        tracing::debug!("Stored value for key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        let mutation = delete(TABLE, Key::new(&key));

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to delete value from Spanner")?;

        tracing::debug!("Deleted key: {}", key);
        Ok(())
    }

    /// Keyset pagination over the primary key. One extra row is fetched
    /// to tell whether another page follows.
    async fn list(&self, options: ListOptions) -> Result<ListPage> {
        let page_size = options.page_size();
        let fetch = i64::try_from(page_size + 1).context("List limit out of range")?;

        let mut query = format!("SELECT id FROM {}", TABLE);
        if options.cursor.is_some() {
            query.push_str(" WHERE id > @cursor");
        }
        query.push_str(" ORDER BY id ASC LIMIT @limit");

        let mut statement = Statement::new(query);
        if let Some(cursor) = &options.cursor {
            statement.add_param("cursor", cursor);
        }
        statement.add_param("limit", &fetch);

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction for list")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute list query")?;

        let mut names = Vec::with_capacity(page_size + 1);
        while let Some(row) = result_set.next().await? {
            let name: String = row
                .column_by_name("id")
                .context("Failed to decode id column")?;
            names.push(name);
        }

        let page = ListPage::from_overfetch(names, page_size);
        tracing::debug!(
            "Listed {} keys (cursor: {:?}, limit: {}, complete: {})",
            page.keys.len(),
            options.cursor,
            page_size,
            page.list_complete
        );
        Ok(page)
    }
}

/// Create the instance, database and table when they do not exist yet.
///
/// Safe to run on every startup.
async fn auto_provision(config: &SpannerConfig) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    let lookup = admin
        .instance()
        .get_instance(
            GetInstanceRequest {
                name: instance_path.clone(),
                field_mask: None,
            },
            None,
        )
        .await;
    ensure_exists(
        "instance",
        &instance_path,
        lookup,
        create_instance(&admin, config, &project_path, &instance_path),
    )
    .await?;

    let lookup = admin
        .database()
        .get_database(
            GetDatabaseRequest {
                name: database_path.clone(),
            },
            None,
        )
        .await;
    ensure_exists(
        "database",
        &database_path,
        lookup,
        create_database(&admin, &instance_path, &config.database),
    )
    .await?;

    ensure_table_exists(&admin, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

/// Await `create` only when `lookup` says the resource is missing.
///
/// `create` is an unpolled future, so nothing runs when the resource exists.
async fn ensure_exists<T>(
    kind: &str,
    path: &str,
    lookup: std::result::Result<T, Status>,
    create: impl Future<Output = Result<()>>,
) -> Result<()> {
    match lookup {
        Ok(_) => {
            tracing::info!("Spanner {} already exists: {}", kind, path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Spanner {} not found, creating: {}", kind, path);
            create.await?;
            tracing::info!("Spanner {} created: {}", kind, path);
            Ok(())
        }
        Err(status) => Err(anyhow::anyhow!(
            "Failed to check {} existence: {}",
            kind,
            status.message()
        )),
    }
}

async fn create_instance(
    admin: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let instance_config = match config.emulator_host {
        Some(_) => "emulator-config",
        None => "regional-us-central1",
    };

    let request = CreateInstanceRequest {
        parent: project_path.to_string(),
        instance_id: config.instance.clone(),
        instance: Some(Instance {
            name: instance_path.to_string(),
            config: format!("{}/instanceConfigs/{}", project_path, instance_config),
            display_name: format!("{} instance", config.instance),
            node_count: 1,
            ..Default::default()
        }),
    };

    let mut operation = admin
        .instance()
        .create_instance(request, None)
        .await
        .context("Failed to start instance creation")?;
    operation
        .wait(None)
        .await
        .context("Failed to create instance")?;
    Ok(())
}

async fn create_database(admin: &AdminClient, instance_path: &str, database_id: &str) -> Result<()> {
    let request = CreateDatabaseRequest {
        parent: instance_path.to_string(),
        create_statement: format!("CREATE DATABASE `{}`", database_id),
        extra_statements: vec![],
        encryption_config: None,
        database_dialect: 1, // GoogleSQL
        proto_descriptors: vec![],
    };

    let mut operation = admin
        .database()
        .create_database(request, None)
        .await
        .context("Failed to start database creation")?;
    operation
        .wait(None)
        .await
        .context("Failed to create database")?;
    Ok(())
}

/// Tables have no single-resource lookup, so the DDL is scanned instead.
async fn ensure_table_exists(admin: &AdminClient, database_path: &str) -> Result<()> {
    let statements = admin
        .database()
        .get_database_ddl(
            GetDatabaseDdlRequest {
                database: database_path.to_string(),
            },
            None,
        )
        .await
        .context("Failed to get database DDL")?
        .into_inner()
        .statements;

    let plain = format!("CREATE TABLE {} ", TABLE);
    let quoted = format!("CREATE TABLE `{}`", TABLE);
    if statements
        .iter()
        .any(|stmt| stmt.starts_with(&plain) || stmt.starts_with(&quoted))
    {
        tracing::info!("Spanner table already exists: {}", TABLE);
        return Ok(());
    }

    tracing::info!("Spanner table not found, creating: {}", TABLE);

    let ddl = format!(
        "CREATE TABLE {} (\n    \
         id STRING(MAX) NOT NULL,\n    \
         content STRING(MAX) NOT NULL,\n    \
         updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),\n\
         ) PRIMARY KEY (id)",
        TABLE
    );

    let mut operation = admin
        .database()
        .update_database_ddl(
            UpdateDatabaseDdlRequest {
                database: database_path.to_string(),
                statements: vec![ddl],
                operation_id: String::new(),
                proto_descriptors: vec![],
                throughput_mode: false,
            },
            None,
        )
        .await
        .context("Failed to start table creation")?;
    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Spanner table created: {}", TABLE);
    Ok(())
}
