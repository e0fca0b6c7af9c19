// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::config::model::{ProblemFile, RawProblemFile};
use crate::errors::{Result, SeqdagError};
use crate::types::Method;

impl TryFrom<RawProblemFile> for ProblemFile {
    type Error = crate::errors::SeqdagError;

    fn try_from(raw: RawProblemFile) -> std::result::Result<Self, Self::Error> {
        let method = validate_raw_problem(&raw)?;
        let problem = ProblemFile::new_unchecked(raw.config, raw.task, method);
        problem.to_options().validate()?;
        Ok(problem)
    }
}

/// Run every structural check and return the parsed method.
pub fn validate_raw_problem(raw: &RawProblemFile) -> Result<Method> {
    ensure_has_tasks(raw)?;
    let method: Method = raw.config.method.parse()?;
    validate_item_lists(raw)?;
    validate_single_producer(raw)?;
    validate_order(raw, method)?;
    Ok(method)
}

/// A problem file must define at least one task.
fn ensure_has_tasks(raw: &RawProblemFile) -> Result<()> {
    if raw.task.is_empty() {
        return Err(SeqdagError::EmptyInput);
    }
    Ok(())
}

fn validate_item_lists(raw: &RawProblemFile) -> Result<()> {
    for (name, task) in raw.task.iter() {
        for (field, items) in [("inputs", &task.inputs), ("outputs", &task.outputs)] {
            let mut seen = HashSet::new();
            for item in items {
                if !seen.insert(item.as_str()) {
                    return Err(SeqdagError::ConfigError(format!(
                        "task '{}' lists item '{}' twice in `{}`",
                        name, item, field
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_single_producer(raw: &RawProblemFile) -> Result<()> {
    let mut producers: BTreeMap<&str, &str> = BTreeMap::new();
    for (name, task) in raw.task.iter() {
        for item in task.outputs.iter() {
            if let Some(other) = producers.insert(item.as_str(), name.as_str()) {
                return Err(SeqdagError::ConfigError(format!(
                    "item '{}' is produced by both '{}' and '{}'",
                    item, other, name
                )));
            }
        }
    }
    Ok(())
}

fn validate_order(raw: &RawProblemFile, method: Method) -> Result<()> {
    let Some(order) = raw.config.order.as_ref() else {
        return Ok(());
    };

    if method != Method::Manual {
        warn!(%method, "[config].order is only used by method = \"manual\"; ignoring it");
        return Ok(());
    }

    for name in order {
        if !raw.task.contains_key(name) {
            return Err(SeqdagError::UnknownTask(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_from_str;

    fn validate(toml: &str) -> Result<ProblemFile> {
        ProblemFile::try_from(load_from_str(toml)?)
    }

    #[test]
    fn defaults_apply() {
        let problem = validate(
            r#"
[task.A]
outputs = ["x"]

[task.B]
inputs = ["x"]
"#,
        )
        .unwrap();
        assert_eq!(problem.method(), Method::BranchAndBound);
        assert_eq!(problem.config.workers, 1);
        assert_eq!(problem.task["A"].role, "function");

        let graph = problem.to_graph().unwrap();
        assert_eq!(graph.task_count(), 2);
        assert_eq!(graph.items().len(), 1);
    }

    #[test]
    fn file_without_tasks_is_rejected() {
        let err = validate("[config]\nmethod = \"two-swap\"\n").unwrap_err();
        assert!(matches!(err, SeqdagError::EmptyInput));
    }

    #[test]
    fn unknown_method_is_reported_as_such() {
        let err = validate("[config]\nmethod = \"tabu\"\n[task.A]\n").unwrap_err();
        assert!(matches!(err, SeqdagError::UnknownMethod(m) if m == "tabu"));
    }

    #[test]
    fn exact_method_with_multi_start_is_rejected() {
        let err = validate("[config]\nmethod = \"brute-force\"\nmulti_start = 2\n[task.A]\n")
            .unwrap_err();
        assert!(matches!(
            err,
            SeqdagError::InvalidMethodCombination {
                method: Method::BruteForce,
                starts: 2
            }
        ));
    }

    #[test]
    fn duplicate_producers_and_items_are_rejected() {
        let err = validate("[task.A]\noutputs = [\"x\"]\n[task.B]\noutputs = [\"x\"]\n")
            .unwrap_err();
        match err {
            SeqdagError::ConfigError(msg) => assert!(msg.contains("'x'")),
            other => panic!("expected ConfigError, got {other:?}"),
        }

        let err = validate("[task.A]\ninputs = [\"x\", \"x\"]\n").unwrap_err();
        assert!(matches!(err, SeqdagError::ConfigError(msg) if msg.contains("twice")));
    }

    #[test]
    fn manual_order_names_known_tasks() {
        let err = validate("[config]\nmethod = \"manual\"\norder = [\"A\", \"Q\"]\n[task.A]\n")
            .unwrap_err();
        assert!(matches!(err, SeqdagError::UnknownTask(t) if t == "Q"));

        let err = validate("[config]\nmethod = \"manual\"\n[task.A]\n").unwrap_err();
        assert!(matches!(err, SeqdagError::InvalidManualOrder(_)));

        assert!(validate("[config]\nmethod = \"manual\"\norder = [\"A\"]\n[task.A]\n").is_ok());
    }
}
