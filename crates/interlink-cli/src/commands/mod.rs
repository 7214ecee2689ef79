//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use interlink_core::{Domain, Settings};
use interlink_db::{DbPool, PgB2bSource, PgB2cSource};
use interlink_graph::{GraphClient, Neo4jStore};
use interlink_worker::{B2bPipeline, B2cPipeline, Pipeline, Router, Worker};

pub mod graph;
pub mod outbox;
pub mod resync;
pub mod schema;
pub mod worker;

/// Postgres connections held by one worker process.
const DB_POOL_SIZE: u32 = 4;

/// Interlink - outbox-driven interaction graph sync
#[derive(Parser)]
#[command(name = "interlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "INTERLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Postgres connection URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Neo4j bolt URI (overrides NEO4J_URI)
    #[arg(long, global = true)]
    pub neo4j_uri: Option<String>,

    /// Events claimed per polling cycle
    #[arg(long, global = true)]
    pub batch_size: Option<i64>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the outbox until interrupted
    Run,

    /// Process queued events until the queue is empty, then exit
    Drain,

    /// Recompute one subject outside the outbox
    Resync(resync::ResyncArgs),

    /// Graph schema commands
    #[command(subcommand)]
    Schema(schema::SchemaCommands),

    /// Outbox inspection
    #[command(subcommand)]
    Outbox(outbox::OutboxCommands),

    /// Graph inspection
    #[command(subcommand)]
    Graph(graph::GraphCommands),
}

impl Cli {
    /// Resolve settings: file, then environment, then flags.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(url) = &self.database_url {
            settings.database_url = url.clone();
        }
        if let Some(uri) = &self.neo4j_uri {
            settings.graph.uri = uri.clone();
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub async fn execute(self) -> Result<()> {
        let settings = self.settings()?;

        match self.command {
            Commands::Run => worker::run(&settings).await,
            Commands::Drain => worker::drain(&settings).await,
            Commands::Resync(args) => resync::execute(args, &settings).await,
            Commands::Schema(cmd) => schema::execute(cmd, &settings).await,
            Commands::Outbox(cmd) => outbox::execute(cmd, &settings).await,
            Commands::Graph(cmd) => graph::execute(cmd, &settings).await,
        }
    }
}

/// Parse `b2b`, `b2c` or a full domain tag.
pub fn parse_domain(s: &str) -> Result<Domain, String> {
    Domain::parse(s).ok_or_else(|| format!("unknown domain '{}' (expected b2b or b2c)", s))
}

pub async fn connect_db(settings: &Settings) -> Result<DbPool> {
    interlink_db::init_pool(&settings.database_url, DB_POOL_SIZE)
        .await
        .context("Failed to connect to Postgres")
}

pub async fn connect_graph(settings: &Settings) -> Result<GraphClient> {
    GraphClient::connect(&settings.graph)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", settings.graph.uri))
}

/// The pipeline for `domain`, reading from `pool`.
pub fn pipeline(domain: Domain, pool: &DbPool) -> Arc<dyn Pipeline> {
    match domain {
        Domain::B2b => Arc::new(B2bPipeline::new(PgB2bSource::new(pool.clone()))),
        Domain::B2c => Arc::new(B2cPipeline::new(PgB2cSource::new(pool.clone()))),
    }
}

/// Both store clients, connected once at start-up.
pub struct Stores {
    pub pool: DbPool,
    pub graph: GraphClient,
}

impl Stores {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let pool = connect_db(settings).await?;
        let graph = connect_graph(settings).await?;
        Ok(Self { pool, graph })
    }

    pub fn router(&self) -> Router {
        Domain::ALL.into_iter().fold(
            Router::new(Arc::new(Neo4jStore::new(self.graph.clone()))),
            |router, domain| router.register(pipeline(domain, &self.pool)),
        )
    }

    pub fn worker(&self, settings: &Settings) -> Worker {
        let outbox = Arc::new(interlink_db::PgOutboxStore::new(self.pool.clone()));
        Worker::new(outbox, self.router(), settings)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
