//! Small operations implemented in the ops crate

use futures::TryStreamExt;
use lnf_config::Config;
use lnf_errors::{Error, StoreError};
use lnf_events::EventEmitter;
use lnf_inventory::InventorySource;
use lnf_report::format_record;
use lnf_resolve::TechnologyClassifier;
use lnf_types::{ObjectPath, OrphanObject};

use crate::{ClassifyReport, ExplainReport, InventoryReport, OpsCtx};

/// Enumerate orphans without resolving them
///
/// Replays the checkpoint when one exists, otherwise traverses the holding
/// collection and writes a new checkpoint.
///
/// # Errors
///
/// Returns an error if neither the checkpoint nor the holding collection can
/// be read, or if the checkpoint cannot be written.
pub async fn inventory(ctx: &OpsCtx) -> Result<InventoryReport, Error> {
    ctx.tx.emit_operation_started("inventory");
    let source = InventorySource::new(
        ctx.store.clone(),
        ctx.holding_collection(),
        &ctx.config.output.checkpoint,
    )
    .with_event_sender(ctx.tx.clone());

    let enumeration = source.enumerate().await?;
    let origin = enumeration.mode.into();
    let orphans = enumeration
        .orphans
        .try_fold(0u64, |count, _| async move { Ok(count + 1) })
        .await?;

    ctx.tx.emit_operation_completed("inventory", true);
    Ok(InventoryReport {
        holding_collection: ctx.holding_collection().to_string(),
        checkpoint: source.checkpoint_path().to_path_buf(),
        source: origin,
        orphans,
    })
}

/// Resolve a single orphan and show the line a run would write
///
/// Nothing is appended to any output artifact.
///
/// # Errors
///
/// Returns `NotFound` if no object exists at `held_collection/name`, or the
/// store error raised while checking.
pub async fn explain(
    ctx: &OpsCtx,
    held_collection: &str,
    name: &str,
) -> Result<ExplainReport, Error> {
    let location = ObjectPath::new(held_collection, name);
    if !ctx.store.object_exists(&location).await? {
        return Err(StoreError::NotFound {
            path: location.full_path(),
        }
        .into());
    }

    let orphan = OrphanObject::new(location);
    let label = orphan.to_string();
    let resolution = ctx.resolver.resolve(orphan).await;
    let record = format_record(&resolution.decision);

    Ok(ExplainReport {
        orphan: label,
        technology: resolution.technology,
        decision: resolution.decision.kind(),
        sink: record.sink,
        line: record.line,
        read_failures: resolution.read_failures,
    })
}

/// Technology label for a held path, using the configured precedence
#[must_use]
pub fn classify(config: &Config, held_path: &str) -> ClassifyReport {
    let classifier = TechnologyClassifier::new(
        config.resolve.technologies.clone(),
        config.resolve.technology_match,
    );
    let technology = classifier.classify(held_path);
    ClassifyReport {
        held_path: held_path.to_string(),
        technology,
        run_folder_route: technology.is_none_or(|tech| tech.uses_run_folders()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnf_types::{Technology, TechnologyMatch};

    #[test]
    fn classify_follows_configured_precedence() {
        let mut config = Config::default();
        let report = classify(&config, "/seq/lostandfound/b1/ont/pacbio");
        assert_eq!(report.technology, Some(Technology::PacBio));
        assert!(!report.run_folder_route);

        config.resolve.technologies = vec![Technology::Ont, Technology::PacBio];
        let report = classify(&config, "/seq/lostandfound/b1/ont/pacbio");
        assert_eq!(report.technology, Some(Technology::Ont));
    }

    #[test]
    fn unlabelled_paths_route_to_run_folders() {
        let report = classify(&Config::default(), "/seq/lostandfound/b1/12345");
        assert_eq!(report.technology, None);
        assert!(report.run_folder_route);
    }

    #[test]
    fn substring_matching_is_opt_in() {
        let mut config = Config::default();
        let held = "/seq/lostandfound/b1/frontier";
        assert_eq!(classify(&config, held).technology, None);

        config.resolve.technology_match = TechnologyMatch::Substring;
        assert_eq!(classify(&config, held).technology, Some(Technology::Ont));
    }
}
