use clap::Parser;
use tokio::sync::mpsc;

use db::session_pool::SessionPool;
use importer::checkpoint::CheckpointManager;
use importer::import_engine::ImportEngine;
use importer::resolver::{EntityKind, EntityResolver};
use parser::csv_parser::CsvParser;

mod db;
mod importer;
mod mapper;
mod models;
mod parser;

//channel size should be configured based on benchmarking
const CHANNEL_SIZE: usize = 10000;

#[derive(Parser)]
#[command(about, long_about = None)]
struct Args {
    /// csv export with the contract rows
    input_file: String,
    /// mysql connection url; falls back to DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
    /// rows committed per transaction
    #[arg(long, default_value_t = 2000)]
    batch_size: usize,
    /// database sessions kept open for round-robin use
    #[arg(long, default_value_t = 4)]
    sessions: usize,
    /// progress file enabling resume after an interrupted run
    #[arg(long, default_value = "secop_checkpoint.json")]
    checkpoint: String,
    /// warm the lookup caches from the store before streaming
    #[arg(long)]
    preload_cache: bool,
    /// ignore an existing checkpoint and start from the first row
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let file_appender = tracing_appender::rolling::hourly("logs/", "secop_importer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt().with_writer(non_blocking).init();

    dotenv::dotenv().ok();
    let args = Args::parse();

    if !std::path::Path::new(&args.input_file).exists() {
        anyhow::bail!("Input file not found: {}", args.input_file);
    }
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("No database url: pass --database-url or set DATABASE_URL"))?;

    let mut checkpoint = CheckpointManager::new(&args.checkpoint);
    let resume = if args.fresh { None } else { checkpoint.load() };
    let (resume_offset, carried_processed) = resume
        .map(|cp| (cp.last_processed_row, cp.total_processed))
        .unwrap_or((0, 0));
    if resume_offset > 0 {
        println!("Resuming from row {resume_offset} ({carried_processed} rows already imported)");
    }

    let mut pool = SessionPool::connect(&database_url, args.sessions).await?;
    let mut resolver = EntityResolver::new();
    if args.preload_cache {
        let cap = resolver.cache_capacity() as u64;
        let entities = db::store::preload_entities(pool.next(), cap).await?;
        let suppliers = db::store::preload_suppliers(pool.next(), cap).await?;
        println!(
            "Preloaded {} organizations and {} suppliers into the caches",
            entities.len(),
            suppliers.len()
        );
        resolver.preload(EntityKind::Organization, entities);
        resolver.preload(EntityKind::Supplier, suppliers);
    }

    let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
    let mut csv_parser = CsvParser::new(args.input_file.clone(), tx, resume_offset);
    let engine = ImportEngine::new(
        rx,
        pool,
        resolver,
        checkpoint,
        args.batch_size,
        resume_offset,
        carried_processed,
    );

    let reader = tokio::spawn(async move {
        csv_parser.run().await;
    });
    let importer = tokio::spawn(async move { engine.run().await });

    let (reader_result, engine_result) = tokio::join!(reader, importer);
    reader_result?;
    let summary = engine_result??;

    println!("\n=== FINAL SUMMARY ===");
    println!("Rows read:        {}", summary.rows_read);
    println!("Imported:         {}", summary.processed);
    println!("Skipped (no key): {}", summary.skipped);
    println!("Errors:           {}", summary.errors);
    println!("Batches:          {}", summary.batches);
    println!("Effectiveness:    {:.2}%", summary.effectiveness());
    println!(
        "Elapsed:          {:.1} min | {:.1} rows/sec",
        summary.elapsed_secs / 60.0,
        summary.rate()
    );
    Ok(())
}
