//! Integration tests for types

#[cfg(test)]
mod tests {
    use lnf_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_decision_kind_and_orphan() {
        let orphan = ObjectPath::parse("/seq/lostandfound/x/y/12345_1.bam").unwrap();
        let decision = Decision::KeepAmbiguous {
            orphan: orphan.clone(),
            direct: "/seq/12345".into(),
            archived: "/seq/illumina/runs/12/12345".into(),
        };
        assert_eq!(decision.kind(), DecisionKind::KeepAmbiguous);
        assert_eq!(decision.orphan(), &orphan);
        assert!(!decision.is_actionable());
    }

    #[test]
    fn test_only_remove_and_move_are_actionable() {
        let actionable: Vec<_> = DecisionKind::ALL
            .iter()
            .filter(|kind| kind.is_actionable())
            .collect();
        assert_eq!(actionable, vec![&DecisionKind::Remove, &DecisionKind::Move]);
    }

    #[test]
    fn test_decision_serialization() {
        let decision = Decision::Remove {
            orphan: ObjectPath::new("/seq/lostandfound/a", "1_1.bam"),
            existing: ObjectPath::new("/seq/1", "1_1.bam"),
            evidence: Evidence::Structural(CandidateOrigin::DirectRunFolder),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["decision"], "remove");
        assert_eq!(json["evidence"]["via"], "structural");
    }

    #[test]
    fn test_metadata_contains_compares_values() {
        let metadata = MetadataSet::new(vec![
            Avu::new("md5", "aaa"),
            Avu::new("target", "1").with_units("flag"),
        ]);
        assert!(metadata.contains("md5", "aaa"));
        assert!(!metadata.contains("md5", "bbb"));
        assert_eq!(metadata.values_of("md5").collect::<Vec<_>>(), vec!["aaa"]);
    }

    proptest! {
        #[test]
        fn prop_full_path_round_trips(
            segs in proptest::collection::vec("[a-z0-9_]{1,8}", 1..5),
            name in "[a-zA-Z0-9_.]{1,12}",
        ) {
            let collection = format!("/{}", segs.join("/"));
            let path = ObjectPath::new(collection.clone(), name.clone());
            let parsed = ObjectPath::parse(&path.full_path()).unwrap();
            prop_assert_eq!(parsed.collection, collection);
            prop_assert_eq!(parsed.name, name);
        }
    }
}
