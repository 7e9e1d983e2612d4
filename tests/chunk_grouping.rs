//! Chunk grouping over synthetic module lists.

use packcfg::assemble::{SplitChunks, COMMONS_MIN_CHUNKS, COMMONS_MIN_SIZE};
use packcfg::chunks::{AssignmentReason, GroupRule, ModuleInfo, Pattern, Priority, RuleSet};

fn module(identifier: &str, size: u64, chunks: usize) -> ModuleInfo {
    ModuleInfo::new(identifier, size, chunks)
}

#[test]
fn test_infinite_priority_beats_ten() {
    let rules = RuleSet::new(vec![
        GroupRule::new("ten", Pattern::new("shared").unwrap()).with_priority(Priority::Finite(10.0)),
        GroupRule::new("top", Pattern::new("shared").unwrap()).with_priority(Priority::Infinite),
    ]);

    let assignment = rules.assign(&module("./src/shared/index.js", 1, 1));
    assert_eq!(assignment.group.as_deref(), Some("top"));
    assert_eq!(
        assignment.reason,
        AssignmentReason::Matched {
            key: "top".to_string(),
            priority: Priority::Infinite
        }
    );
}

#[test]
fn test_unmatched_module_goes_to_commons() {
    let split = SplitChunks::new(None).unwrap();
    assert_eq!(COMMONS_MIN_SIZE, 30 * 1024);
    assert_eq!(COMMONS_MIN_CHUNKS, 2);

    let assignment = split.rules.assign(&module("./src/Frontend/widgets.js", 40 * 1024, 3));
    assert_eq!(assignment.group.as_deref(), Some("commons"));
}

#[test]
fn test_commons_size_must_exceed_threshold() {
    let split = SplitChunks::new(None).unwrap();

    let at = split.rules.assign(&module("./src/Frontend/widgets.js", COMMONS_MIN_SIZE, 2));
    assert_eq!(at.reason, AssignmentReason::Unsplit);

    let above = split
        .rules
        .assign(&module("./src/Frontend/widgets.js", COMMONS_MIN_SIZE + 1, 2));
    assert_eq!(above.group.as_deref(), Some("commons"));
}

#[test]
fn test_unmatched_small_module_not_split() {
    let split = SplitChunks::new(None).unwrap();

    let small = split.rules.assign(&module("./src/Frontend/widgets.js", 10 * 1024, 3));
    assert_eq!(small.group, None);

    let single = split.rules.assign(&module("./src/Frontend/widgets.js", 40 * 1024, 1));
    assert_eq!(single.reason, AssignmentReason::Unsplit);
}

#[test]
fn test_builtin_partition() {
    let split = SplitChunks::new(None).unwrap();
    let modules = vec![
        module("./node_modules/lodash/lodash.js", 500, 1),
        module("./node_modules/react/index.js", 500, 1),
        module("./node_modules/react-redux/index.js", 500, 1),
        module("./node_modules/moment/moment.js", 500, 1),
        module("./src/Core/settings.js", 500, 1),
        module("./src/Frontend/App.jsx", 500, 1),
    ];

    let partition = split.rules.partition(&modules);

    assert_eq!(
        partition.group("vendor").unwrap(),
        &[
            "./node_modules/lodash/lodash.js".to_string(),
            "./node_modules/moment/moment.js".to_string()
        ]
    );
    assert_eq!(
        partition.group("reactStack1").unwrap(),
        &["./node_modules/react-redux/index.js".to_string()]
    );
    assert_eq!(
        partition.group("reactStack2").unwrap(),
        &["./node_modules/react/index.js".to_string()]
    );
    assert_eq!(
        partition.group("directCoreConfig").unwrap(),
        &["./src/Core/settings.js".to_string()]
    );
    assert_eq!(partition.unsplit, vec!["./src/Frontend/App.jsx".to_string()]);
}
