//! Integration tests for the decision sinks

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lnf_errors::{Error, ReportError};
    use lnf_report::{ActionRecorder, Sink, SinkPaths, SinkTotals};
    use lnf_types::{Decision, MoveReason, ObjectPath};
    use tempfile::TempDir;

    fn paths(temp: &TempDir) -> SinkPaths {
        SinkPaths {
            script: temp.path().join("resolve_orphaned_files.sh"),
            kept: temp.path().join("kept_files"),
            still_lost: temp.path().join("still_lost_files"),
        }
    }

    fn orphan(name: &str) -> ObjectPath {
        ObjectPath::new("/seq/lostandfound/b1", name)
    }

    async fn read(path: &std::path::Path) -> String {
        tokio::fs::read_to_string(path).await.unwrap()
    }

    #[tokio::test]
    async fn test_decisions_are_routed_to_their_sink() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);
        let recorder = ActionRecorder::open(&paths).await.unwrap();

        let moved = recorder
            .record(&Decision::Move {
                orphan: orphan("12345_1.bam"),
                target: "/seq/12345".to_string(),
                reason: MoveReason::RunFolder,
            })
            .await
            .unwrap();
        assert_eq!(moved.sink, Sink::Script);
        recorder
            .record(&Decision::KeepAmbiguous {
                orphan: orphan("12345_2.bam"),
                direct: "/seq/12345".to_string(),
                archived: "/seq/illumina/runs/12/12345".to_string(),
            })
            .await
            .unwrap();
        recorder
            .record(&Decision::StillLost {
                orphan: orphan("notes.txt"),
            })
            .await
            .unwrap();

        let totals = recorder.finish().await.unwrap();
        assert_eq!(
            totals,
            SinkTotals {
                script: 1,
                kept: 1,
                still_lost: 1
            }
        );

        assert!(read(&paths.script).await.starts_with("imv /seq/lostandfound/b1/12345_1.bam "));
        assert!(read(&paths.kept).await.contains("two possible runfolders"));
        assert_eq!(
            read(&paths.still_lost).await,
            "/seq/lostandfound/b1/notes.txt kept because a location has not been found\n"
        );
    }

    #[tokio::test]
    async fn test_existing_sinks_are_appended_to() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);
        tokio::fs::write(&paths.still_lost, "earlier run\n").await.unwrap();

        let recorder = ActionRecorder::open(&paths).await.unwrap();
        recorder
            .record(&Decision::StillLost {
                orphan: orphan("x.bam"),
            })
            .await
            .unwrap();
        recorder.finish().await.unwrap();

        let lines: Vec<String> = read(&paths.still_lost)
            .await
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "earlier run");
    }

    #[tokio::test]
    async fn test_concurrent_records_never_interleave() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);
        let recorder = Arc::new(ActionRecorder::open(&paths).await.unwrap());

        let mut handles = Vec::new();
        for worker in 0..8 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let decision = Decision::Remove {
                        orphan: orphan(&format!("{worker}_{i}.bam")),
                        existing: ObjectPath::new("/seq/archive", format!("{worker}_{i}.bam")),
                        evidence: lnf_types::Evidence::ContentSearch,
                    };
                    recorder.record(&decision).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let recorder = Arc::try_unwrap(recorder).unwrap();
        assert_eq!(recorder.totals().await.script, 400);
        recorder.finish().await.unwrap();

        let script = read(&paths.script).await;
        assert_eq!(script.lines().count(), 400);
        for line in script.lines() {
            assert!(line.starts_with("irm /seq/lostandfound/b1/"), "{line}");
            assert!(line.contains(" # md5 ok, md5 meta ok, exists as /seq/archive/"));
        }
    }

    #[tokio::test]
    async fn test_multiline_names_stay_out_of_the_script() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);
        let recorder = ActionRecorder::open(&paths).await.unwrap();

        let record = recorder
            .record(&Decision::Move {
                orphan: orphan("12345_1.bam\nrm -rf ~"),
                target: "/seq/12345".to_string(),
                reason: MoveReason::RunFolder,
            })
            .await
            .unwrap();
        assert_eq!(record.sink, Sink::Kept);

        let totals = recorder.finish().await.unwrap();
        assert_eq!(totals.script, 0);
        assert_eq!(read(&paths.script).await, "");
        let kept = read(&paths.kept).await;
        assert_eq!(kept.lines().count(), 1);
        assert!(kept.starts_with(r"/seq/lostandfound/b1/12345_1.bam\nrm -rf ~ kept"));
    }

    #[tokio::test]
    async fn test_unwritable_sink_fails_to_open() {
        let temp = TempDir::new().unwrap();
        let mut paths = paths(&temp);
        paths.kept = temp.path().join("missing").join("kept_files");

        let err = ActionRecorder::open(&paths).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Report(ReportError::SinkOpen { ref sink, .. }) if sink == "kept"
        ));
    }
}
