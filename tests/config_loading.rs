// tests/config_loading.rs

mod common;

use std::io::Write;
use tempfile::NamedTempFile;
use seqdag::config::{load_and_validate, load_from_path};
use seqdag::sequence::{Score, sequence};
use seqdag::types::Method;

fn write_problem(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn problem_file_drives_a_full_run() {
    common::init_tracing();
    let body = common::two_cycle().to_toml("method = \"hybrid-swap\"\nmulti_start = 3\nseed = 9");
    let file = write_problem(&body);

    let problem = load_and_validate(file.path()).unwrap();
    assert_eq!(problem.method(), Method::HybridSwap);
    assert_eq!(problem.config.multi_start, Some(3));

    let graph = problem.to_graph().unwrap();
    let result = sequence(&graph, problem.to_options()).unwrap();
    assert_eq!(result.order.first().map(String::as_str), Some("A"));
    assert_eq!(result.order.last().map(String::as_str), Some("D"));
    assert_eq!(result.score, Score::new(1, 2));
}

#[test]
fn hand_written_problem_file() {
    let file = write_problem(
        r#"
[config]
method = "manual"
order = ["load", "solve", "report"]

[task.load]
role = "reader"
outputs = ["mesh"]

[task.solve]
inputs = ["mesh", "guess"]
outputs = ["field"]

[task.report]
inputs = ["field"]
outputs = ["guess"]
"#,
    );

    let problem = load_and_validate(file.path()).unwrap();
    assert_eq!(problem.task["load"].role, "reader");
    assert_eq!(problem.task["solve"].role, "function");

    let graph = problem.to_graph().unwrap();
    assert_eq!(graph.items().len(), 3);

    let result = sequence(&graph, problem.to_options()).unwrap();
    assert_eq!(result.order, vec!["load", "solve", "report"]);
    // report feeds `guess` back into solve.
    assert_eq!(result.score, Score::new(1, 2));
    assert_eq!(result.partition.pre_coupled, vec!["load"]);
    assert!(result.partition.post_coupled.is_empty());
}

#[test]
fn raw_load_skips_validation() {
    let file = write_problem("[config]\nmethod = \"nope\"\n");
    let raw = load_from_path(file.path()).unwrap();
    assert_eq!(raw.config.method, "nope");
    assert!(raw.task.is_empty());
    assert_eq!(raw.config.workers, 1);
}
