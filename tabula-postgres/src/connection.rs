use crate::{ValueHolder, util::row_to_tabula_row};
use futures::TryStreamExt;
use openssl::ssl::{SslConnector, SslFiletype, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use std::{env, path::Path, pin::pin};
use tabula_core::{
    Connection, Context, Error, Executor, QueryResult, Result, RowLabeled, RowNames, Statement,
    truncate_long,
};
use tokio::spawn;
use tokio_postgres::{NoTls, tls::MakeTlsConnect};
use url::Url;

/// One Postgres session.
pub struct PostgresConnection {
    pub(crate) client: tokio_postgres::Client,
}

impl PostgresConnection {
    /// Open a session from a `postgres://` (or `postgresql://`) url.
    ///
    /// TLS is configured with the `sslmode`, `sslrootcert`, `sslcert` and `sslkey`
    /// query parameters, each one falling back to its `PG*` environment variable.
    pub async fn connect(url: &str) -> Result<PostgresConnection> {
        let context = || format!("While trying to connect to `{}`", truncate_long!(url));
        if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
            let error = Error::msg("Postgres connection url must start with `postgres://`")
                .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let mut url = Url::parse(url).with_context(context)?;
        let mut take_url_param = |key: &str, env_var: &str| {
            let mut pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
            let value = pairs
                .iter()
                .position(|(k, _)| k == key)
                .map(|pos| pairs.remove(pos).1);
            if pairs.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut()
                    .clear()
                    .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            value.or_else(|| env::var(env_var).ok())
        };
        let sslmode = take_url_param("sslmode", "PGSSLMODE").unwrap_or("disable".into());
        let client = if sslmode == "disable" {
            Self::spawn_client(url.as_str(), NoTls).await
        } else {
            let mut builder = SslConnector::builder(SslMethod::tls())?;
            if let Some(path) = take_url_param("sslrootcert", "PGSSLROOTCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_ca_file(path)?;
            }
            if let Some(path) = take_url_param("sslcert", "PGSSLCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_certificate_chain_file(path)?;
            }
            if let Some(path) = take_url_param("sslkey", "PGSSLKEY")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_private_key_file(path, SslFiletype::PEM)?;
            }
            builder.set_verify(match &*sslmode {
                "require" | "prefer" | "allow" => SslVerifyMode::NONE,
                _ => SslVerifyMode::PEER,
            });
            Self::spawn_client(url.as_str(), MakeTlsConnector::new(builder.build())).await
        }
        .map_err(|e| {
            let e = e.context(context());
            log::error!("{:#}", e);
            e
        })?;
        Ok(Self { client })
    }

    async fn spawn_client<T>(url: &str, tls: T) -> Result<tokio_postgres::Client>
    where
        T: MakeTlsConnect<tokio_postgres::Socket>,
        T::Stream: Send + 'static,
    {
        let (client, connection) = tokio_postgres::connect(url, tls).await?;
        spawn(async move {
            if let Err(e) = connection.await
                && !e.is_closed()
            {
                log::error!("Postgres connection error: {:#}", e);
            }
        });
        Ok(client)
    }

    /// The server closed the session or the background task stopped.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

impl Executor for PostgresConnection {
    async fn execute(&mut self, statement: Statement) -> Result<QueryResult> {
        let context = || format!("While executing the statement:\n{}", truncate_long!(statement.sql));
        let result = async {
            let prepared = self.client.prepare(&statement.sql).await?;
            let params: Vec<ValueHolder> = statement
                .params
                .iter()
                .cloned()
                .map(ValueHolder::from)
                .collect();
            let stream = self.client.query_raw(&prepared, params).await?;
            let mut stream = pin!(stream);
            let mut labels: Option<RowNames> = None;
            let mut rows = Vec::new();
            while let Some(row) = stream.try_next().await? {
                let labels = labels.get_or_insert_with(|| {
                    row.columns().iter().map(|c| c.name().to_string()).collect()
                });
                rows.push(RowLabeled::new(labels.clone(), row_to_tabula_row(row)?));
            }
            let rows_affected = stream.rows_affected().unwrap_or(rows.len() as u64);
            Ok::<_, Error>(QueryResult {
                rows_affected,
                rows,
            })
        }
        .await;
        result.map_err(|e| {
            let e = e.context(context());
            log::error!("{:#}", e);
            e
        })
    }
}

impl Connection for PostgresConnection {
    async fn release(self) -> Result<()> {
        drop(self.client);
        Ok(())
    }
}
