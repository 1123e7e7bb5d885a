use crate::db::session_pool::SessionPool;
use crate::db::store;
use crate::importer::checkpoint::CheckpointManager;
use crate::importer::errors::ImportError;
use crate::importer::resolver::{EntityKind, EntityResolver};
use crate::mapper::row_mapper::map_record;
use crate::models::{MappedRow, RowBundle, SourceRow};
use sqlx::{Connection, MySqlConnection};
use std::time::Instant;
use tokio::sync::mpsc::Receiver;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct ImportSummary {
    pub rows_read: u64,
    pub processed: u64,
    pub skipped: u64,
    pub errors: u64,
    pub batches: u64,
    pub elapsed_secs: f64,
}

impl ImportSummary {
    pub fn effectiveness(&self) -> f64 {
        if self.rows_read == 0 {
            return 0.0;
        }
        self.processed as f64 / self.rows_read as f64 * 100.0
    }

    pub fn rate(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.processed as f64 / self.elapsed_secs
    }
}

struct BatchOutcome {
    processed: u64,
    skipped: u64,
}

//Drives the whole import: accumulates rows from the parser into fixed-size
//batches and commits each batch as one all-or-nothing transaction on one
//pooled session. Owns every piece of mutable run state - caches, pending
//buffers, counters, checkpoint - so nothing here needs a lock.
pub struct ImportEngine {
    rx: Receiver<SourceRow>,
    pool: SessionPool,
    resolver: EntityResolver,
    checkpoint: CheckpointManager,
    batch: Vec<SourceRow>,
    batch_size: usize,
    rows_read: u64,
    last_committed_row: u64,
    total_processed: u64,
    total_skipped: u64,
    total_errors: u64,
    batch_count: u64,
    started: Instant,
}

impl ImportEngine {
    pub fn new(
        rx: Receiver<SourceRow>,
        pool: SessionPool,
        resolver: EntityResolver,
        checkpoint: CheckpointManager,
        batch_size: usize,
        resume_offset: u64,
        carried_processed: u64,
    ) -> Self {
        Self {
            rx,
            pool,
            resolver,
            checkpoint,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            rows_read: resume_offset,
            last_committed_row: resume_offset,
            total_processed: carried_processed,
            total_skipped: 0,
            total_errors: 0,
            batch_count: 0,
            started: Instant::now(),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<ImportSummary> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                maybe_row = self.rx.recv() => match maybe_row {
                    Some(row) => {
                        self.rows_read = row.number;
                        self.batch.push(row);
                        if self.batch.len() >= self.batch_size {
                            self.commit_current_batch().await?;
                        }
                    }
                    None => {
                        self.commit_current_batch().await?;
                        break;
                    }
                },
                _ = &mut ctrl_c => {
                    //the partially accumulated batch is abandoned here; those
                    //rows re-arrive on the next run and insert-or-ignore
                    //absorbs any that were already committed
                    warn!(
                        "Interrupt received after {} committed batches, shutting down",
                        self.batch_count
                    );
                    self.rx.close();
                    break;
                }
            }
        }

        self.finish().await
    }

    async fn commit_current_batch(&mut self) -> anyhow::Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        self.batch_count += 1;
        let last_row = batch.last().map(|r| r.number).unwrap_or(self.rows_read);

        let session = self.pool.next();
        match Self::run_batch(session, &mut self.resolver, &batch).await {
            Ok(outcome) => {
                self.resolver.commit_tx();
                self.total_processed += outcome.processed;
                self.total_skipped += outcome.skipped;
                self.last_committed_row = last_row;
                self.checkpoint
                    .write(self.last_committed_row, self.total_processed)?;
                self.print_progress();
            }
            Err(e) if e.is_fatal() => {
                self.resolver.rollback_tx();
                error!("Fatal store failure in batch {}: {e}", self.batch_count);
                return Err(e.into());
            }
            Err(e) => {
                //the whole batch rolled back; every row in it counts as an
                //error even though a single row caused the failure
                self.resolver.rollback_tx();
                self.total_errors += batch.len() as u64;
                error!(
                    "Batch {} rolled back ({} rows): {e}",
                    self.batch_count,
                    batch.len()
                );
            }
        }
        Ok(())
    }

    //One batch, one session, one transaction.
    async fn run_batch(
        conn: &mut MySqlConnection,
        resolver: &mut EntityResolver,
        batch: &[SourceRow],
    ) -> Result<BatchOutcome, ImportError> {
        let mut tx = conn.begin().await?;
        match Self::process_rows(&mut tx, resolver, batch).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    error!("Rollback failed: {rb}");
                }
                Err(e)
            }
        }
    }

    //Two passes over the batch. First: map every row and stage unseen natural
    //keys, flushing the lookup buffers so the caches hold real store-assigned
    //ids. Second: insert contracts and their dependents. A contract row is
    //never written before both its parent ids are resolved, and a duplicate
    //contract (no-op insert) gets no dependent rows.
    async fn process_rows(
        conn: &mut MySqlConnection,
        resolver: &mut EntityResolver,
        batch: &[SourceRow],
    ) -> Result<BatchOutcome, ImportError> {
        let mut skipped = 0u64;
        let mut bundles: Vec<Box<RowBundle>> = Vec::with_capacity(batch.len());
        for row in batch {
            match map_record(&row.record) {
                MappedRow::Skip => skipped += 1,
                MappedRow::Complete(bundle) => bundles.push(bundle),
            }
        }

        for bundle in &bundles {
            let mut threshold_hit = resolver.stage_entity(&bundle.entity);
            if let Some(supplier) = &bundle.supplier {
                threshold_hit |= resolver.stage_supplier(supplier);
            }
            if threshold_hit {
                Self::flush_pending(conn, resolver).await?;
            }
        }
        Self::flush_pending(conn, resolver).await?;

        let mut processed = 0u64;
        for bundle in &bundles {
            let entidad_id = resolver
                .lookup(EntityKind::Organization, &bundle.entity.nit)
                .ok_or_else(|| ImportError::UnresolvedKey {
                    key: bundle.entity.nit.to_string(),
                })?;
            let proveedor_id = match &bundle.supplier {
                Some(supplier) => Some(
                    resolver
                        .lookup(EntityKind::Supplier, &supplier.key)
                        .ok_or_else(|| ImportError::UnresolvedKey {
                            key: supplier.key.to_string(),
                        })?,
                ),
                None => None,
            };

            if let Some(rep) = &bundle.legal_rep {
                store::insert_legal_rep(conn, entidad_id, rep).await?;
            }

            let Some(contrato_id) =
                store::insert_contract(conn, entidad_id, proveedor_id, &bundle.contract).await?
            else {
                //duplicate external contract id
                continue;
            };

            store::insert_finance(conn, contrato_id, &bundle.finance).await?;
            store::insert_resources(conn, contrato_id, &bundle.resources).await?;
            if let Some(bank) = &bundle.bank {
                store::insert_bank(conn, contrato_id, bank).await?;
            }
            for responsible in &bundle.responsibles {
                store::insert_responsible(conn, contrato_id, responsible).await?;
            }
            processed += 1;
        }

        Ok(BatchOutcome { processed, skipped })
    }

    //Push the pending lookup rows to the store and back-fill the caches with
    //the ids it reports.
    async fn flush_pending(
        conn: &mut MySqlConnection,
        resolver: &mut EntityResolver,
    ) -> Result<(), ImportError> {
        let entities = resolver.take_pending_entities();
        if !entities.is_empty() {
            let pairs = store::insert_entities(conn, &entities).await?;
            resolver.absorb(EntityKind::Organization, pairs);
        }
        let suppliers = resolver.take_pending_suppliers();
        if !suppliers.is_empty() {
            let pairs = store::insert_suppliers(conn, &suppliers).await?;
            resolver.absorb(EntityKind::Supplier, pairs);
        }
        Ok(())
    }

    fn print_progress(&self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.total_processed as f64 / elapsed
        } else {
            0.0
        };
        println!(
            "Batch {}: {} imported | {} skipped | {} errors | {:.1} rows/sec",
            self.batch_count, self.total_processed, self.total_skipped, self.total_errors, rate
        );
    }

    async fn finish(self) -> anyhow::Result<ImportSummary> {
        self.checkpoint
            .write(self.last_committed_row, self.total_processed)?;
        let (entities, suppliers) = self.resolver.cached_counts();
        info!(
            "Closing sessions; {} organizations and {} suppliers cached",
            entities, suppliers
        );
        self.pool.close().await;
        Ok(ImportSummary {
            rows_read: self.rows_read,
            processed: self.total_processed,
            skipped: self.total_skipped,
            errors: self.total_errors,
            batches: self.batch_count,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        })
    }
}
