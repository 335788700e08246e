//! Full resolve run over every orphan in the holding collection

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use lnf_config::calculate_workers;
use lnf_config::resources_semaphore::{acquire_semaphore_permit, create_semaphore};
use lnf_errors::{Error, OpsError};
use lnf_events::{AppEvent, EventEmitter, RunEvent};
use lnf_inventory::{InventorySource, OrphanStream};
use lnf_report::{ActionRecorder, SinkPaths};
use lnf_resolve::Resolution;
use lnf_types::OrphanObject;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::{OpsCtx, RunSummary};

/// Resolve every orphan and record one line per decision
///
/// Orphans are enumerated by a producer task and resolved by up to
/// `resolve.workers` concurrent workers. Each decision is written as soon
/// as it is reached; there is no ordering across orphans.
///
/// # Errors
///
/// Returns an error if the checkpoint and the holding collection are both
/// unreachable, if an output sink cannot be opened or written, or if the
/// enumeration breaks off part way. Per-orphan store failures never fail
/// the run; they only show up in `read_failures`.
pub async fn resolve(ctx: &OpsCtx) -> Result<RunSummary, Error> {
    let started = Instant::now();
    let workers = calculate_workers(ctx.config.resolve.workers);

    ctx.tx.emit_operation_started("resolve");
    ctx.tx.emit(AppEvent::Run(RunEvent::Started {
        holding_collection: ctx.holding_collection().to_string(),
        workers,
    }));

    match drive(ctx, workers, started).await {
        Ok(summary) => {
            ctx.tx.emit(AppEvent::Run(RunEvent::Completed {
                processed: summary.orphans,
                actionable: summary.actionable(),
                elapsed_ms: summary.duration_ms,
            }));
            ctx.tx.emit_operation_completed("resolve", true);
            Ok(summary)
        }
        Err(e) => {
            ctx.tx.emit(AppEvent::Run(RunEvent::Failed {
                failure: lnf_events::FailureContext::from_error(&e),
            }));
            ctx.tx.emit_operation_failed("resolve", e.to_string());
            Err(e)
        }
    }
}

async fn drive(ctx: &OpsCtx, workers: usize, started: Instant) -> Result<RunSummary, Error> {
    let source = InventorySource::new(
        ctx.store.clone(),
        ctx.holding_collection(),
        &ctx.config.output.checkpoint,
    )
    .with_event_sender(ctx.tx.clone());
    let enumeration = source.enumerate().await?;
    let recorder = Arc::new(ActionRecorder::open(&SinkPaths::from_config(&ctx.config.output)).await?);

    let mut summary = RunSummary::new(
        ctx.holding_collection().to_string(),
        enumeration.mode.into(),
        workers,
    );

    let (orphan_tx, mut orphan_rx) = mpsc::channel::<OrphanObject>(workers * 2);
    let producer = tokio::spawn(produce(enumeration.orphans, orphan_tx));

    let semaphore = create_semaphore(workers);
    let mut tasks: JoinSet<Result<Resolution, Error>> = JoinSet::new();
    let mut outcome: Result<(), Error> = Ok(());

    while let Some(orphan) = orphan_rx.recv().await {
        let permit = match acquire_semaphore_permit(semaphore.clone(), "orphan resolution").await {
            Ok(permit) => permit,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        };
        let resolver = ctx.resolver.clone();
        let recorder = recorder.clone();
        tasks.spawn(async move {
            let _permit = permit; // Hold permit until the decision is written
            let resolution = resolver.resolve(orphan).await;
            recorder.record(&resolution.decision).await?;
            Ok(resolution)
        });

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = absorb(ctx, &mut summary, joined) {
                outcome = Err(e);
                break;
            }
        }
        if outcome.is_err() {
            break;
        }
    }

    // Stop the producer before waiting on it if a worker already failed.
    drop(orphan_rx);
    if outcome.is_err() {
        tasks.abort_all();
    }
    while let Some(joined) = tasks.join_next().await {
        if outcome.is_ok() {
            outcome = absorb(ctx, &mut summary, joined);
        }
    }

    let produced = producer.await.map_err(|e| worker_failed(&e));
    let recorder = Arc::try_unwrap(recorder).map_err(|_| OpsError::WorkerFailed {
        message: "decision recorder still shared after all workers finished".to_string(),
    })?;
    let finished = recorder.finish().await;

    outcome?;
    produced??;
    summary.sinks = finished?;
    summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(summary)
}

async fn produce(
    mut orphans: OrphanStream,
    tx: mpsc::Sender<OrphanObject>,
) -> Result<(), Error> {
    while let Some(orphan) = orphans.next().await {
        if tx.send(orphan?).await.is_err() {
            break;
        }
    }
    Ok(())
}

fn absorb(
    ctx: &OpsCtx,
    summary: &mut RunSummary,
    joined: Result<Result<Resolution, Error>, JoinError>,
) -> Result<(), Error> {
    let resolution = joined.map_err(|e| worker_failed(&e))??;
    summary.add(resolution.decision.kind(), resolution.read_failures);
    ctx.tx.emit(AppEvent::Run(RunEvent::OrphanRecorded {
        processed: summary.orphans,
    }));
    Ok(())
}

fn worker_failed(err: &JoinError) -> Error {
    OpsError::WorkerFailed {
        message: err.to_string(),
    }
    .into()
}
