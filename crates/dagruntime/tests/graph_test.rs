// crates/dagruntime/tests/graph_test.rs

use dagcore::{
    CallArgs, DataSchema, ExecutionEvent, GraphError, Input, NodeError, NodeSpec, Output,
    RegistrationError, ValidationError, Value, ValueKind,
};
use dagruntime::{Graph, GraphConfig, UnusedInputPolicy};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn sum(args: CallArgs) -> Result<Value, NodeError> {
    let mut total = 0.0;
    for i in 0..args.len() {
        total += args.number(i)?;
    }
    Ok(Value::Number(total))
}

fn diff(args: CallArgs) -> Result<Value, NodeError> {
    Ok(Value::Number(args.number(0)? - args.number(1)?))
}

fn tenth(args: CallArgs) -> Result<Value, NodeError> {
    Ok(Value::Number(args.number(0)? / 10.0))
}

/// c = a + b, d = c / 10, e = d - a; registered out of dependency order
fn simple_graph(config: GraphConfig) -> Graph {
    let mut graph = Graph::with_config(config);
    graph
        .register(NodeSpec::new("f_sum", sum).inputs(["a", "b"]).outputs(["c"]))
        .unwrap();
    graph
        .register(NodeSpec::new("f_diff", diff).inputs(["d", "a"]).outputs(["e"]))
        .unwrap();
    graph
        .register(NodeSpec::new("f_tenth", tenth).inputs(["c"]).outputs(["d"]))
        .unwrap();
    graph
}

#[tokio::test]
async fn test_simple() {
    init_tracing();
    let mut graph = simple_graph(GraphConfig::default());

    let res = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();

    assert_eq!(res, Value::from(-1.5));
    let data = graph.data().unwrap();
    assert_eq!(data["c"], Value::from(5));
    assert_eq!(data["d"], Value::from(0.5));
    assert_eq!(data["e"], Value::from(-1.5));
}

#[tokio::test]
async fn test_calculate_is_repeatable() {
    let mut graph = simple_graph(GraphConfig::default());
    let data = inputs(&[("a", Value::from(2)), ("b", Value::from(3))]);

    let first = graph.calculate(&data).await.unwrap();
    let first_bag = graph.data().cloned();
    let second = graph.calculate(&data).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first_bag.as_ref(), graph.data());
}

#[tokio::test]
async fn test_inspect_levels() {
    let mut graph = simple_graph(GraphConfig::default());

    let levels = graph.levels().unwrap();
    let names: Vec<Vec<String>> = graph
        .dag()
        .unwrap()
        .iter()
        .map(|level| level.iter().map(|n| n.name().to_string()).collect())
        .collect();

    assert_eq!(levels.len(), 3);
    assert_eq!(
        names,
        vec![
            vec!["f_sum".to_string()],
            vec!["f_tenth".to_string()],
            vec!["f_diff".to_string()],
        ]
    );
    assert!(graph.data().is_none());
}

#[tokio::test]
async fn test_levels_are_cached_until_registration() {
    let mut graph = simple_graph(GraphConfig::default());

    let first = graph.levels().unwrap();
    let again = graph.levels().unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    graph
        .register(NodeSpec::new("f_more", tenth).inputs(["e"]).outputs(["g"]))
        .unwrap();
    let after = graph.levels().unwrap();
    assert!(!Arc::ptr_eq(&first, &after));
    assert_eq!(after.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_matches_sequential() {
    init_tracing();
    let build = |config: GraphConfig| {
        let mut graph = Graph::with_config(config);
        for i in 0..6 {
            graph
                .register(
                    NodeSpec::new(format!("f_{}", i), sum)
                        .inputs(["a", "b"])
                        .outputs([format!("x{}", i)]),
                )
                .unwrap();
        }
        graph
            .register(
                NodeSpec::new("f_total", sum)
                    .inputs((0..6).map(|i| format!("x{}", i)))
                    .outputs(["total"]),
            )
            .unwrap();
        graph
    };
    let data = inputs(&[("a", Value::from(1)), ("b", Value::from(2))]);

    let mut sequential = build(GraphConfig::default());
    let expected = sequential.calculate(&data).await.unwrap();
    assert_eq!(expected, Value::from(18));

    for pool_size in [1, 2, 4] {
        let mut parallel = build(GraphConfig {
            parallel: true,
            pool_size,
            ..GraphConfig::default()
        });
        let res = parallel.calculate(&data).await.unwrap();
        assert_eq!(res, expected);
        assert_eq!(parallel.data(), sequential.data());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_simple() {
    let mut graph = simple_graph(GraphConfig {
        parallel: true,
        ..GraphConfig::default()
    });
    let res = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(-1.5));
}

#[tokio::test]
async fn test_multiple_outputs() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_split", |args: CallArgs| -> Result<Value, NodeError> {
                let a = args.number(0)?;
                let b = args.number(1)?;
                Ok(Value::Array(vec![Value::from(a + b), Value::from(a - b)]))
            })
            .inputs(["a", "b"])
            .outputs(["c", "d"]),
        )
        .unwrap();
    graph
        .register(NodeSpec::new("f_diff", diff).inputs(["c", "d"]).outputs(["e"]))
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(6));
    assert_eq!(graph.data().unwrap()["d"], Value::from(-1));
}

#[tokio::test]
async fn test_last_level_with_several_outputs() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_one", sum).inputs(["a"]).outputs(["b"]))
        .unwrap();
    graph
        .register(NodeSpec::new("f_two", tenth).inputs(["a"]).outputs(["c"]))
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("a", Value::from(10))]))
        .await
        .unwrap();
    assert_eq!(res, Value::Array(vec![Value::from(10), Value::from(1)]));
}

#[tokio::test]
async fn test_arity_mismatch() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_sum", sum).inputs(["a"]).outputs(["c", "d"]))
        .unwrap();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(1))]))
        .await
        .unwrap_err();
    assert_eq!(
        err.node_error(),
        Some(&NodeError::ArityMismatch {
            expected: 2,
            actual: 1
        })
    );
}

#[tokio::test]
async fn test_same_output_names() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_sum", sum).inputs(["a", "b"]).outputs(["c"]))
        .unwrap();

    let err = graph
        .register(NodeSpec::new("f_other", sum).inputs(["d"]).outputs(["c"]))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Registration(RegistrationError::DuplicateOutput(ref key)) if key == "c"
    ));
    assert!(err.to_string().contains("c output already exist"));
    assert_eq!(graph.len(), 1);
}

#[tokio::test]
async fn test_missing_input() {
    let mut graph = simple_graph(GraphConfig::default());

    let err = graph
        .calculate(&inputs(&[("a", Value::from(2))]))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        GraphError::Validation(ValidationError::Needed(keys)) if keys == &["b"]
    ));
    assert!(err
        .to_string()
        .contains("The following inputs are needed: ['b']"));
}

#[tokio::test]
async fn test_unused_input_is_rejected() {
    let mut graph = simple_graph(GraphConfig::default());

    let err = graph
        .calculate(&inputs(&[
            ("a", Value::from(2)),
            ("b", Value::from(3)),
            ("z", Value::from(3)),
        ]))
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("The following inputs are not used by the model: ['z']"));
    assert!(graph.data().is_none());
}

#[tokio::test]
async fn test_unused_input_warns() {
    init_tracing();
    let mut graph = simple_graph(GraphConfig {
        unused_inputs: UnusedInputPolicy::Warn,
        ..GraphConfig::default()
    });

    let res = graph
        .calculate(&inputs(&[
            ("a", Value::from(2)),
            ("b", Value::from(3)),
            ("z", Value::from(3)),
        ]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(-1.5));
    assert!(!graph.data().unwrap().contains_key("z"));
}

#[tokio::test]
async fn test_inputs_collision() {
    let mut graph = simple_graph(GraphConfig::default());

    let err = graph
        .calculate(&inputs(&[
            ("a", Value::from(2)),
            ("b", Value::from(3)),
            ("c", Value::from(3)),
        ]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: The following inputs are already used in the model: ['c']"
    );
}

#[tokio::test]
async fn test_circular_dependency() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_one", sum).inputs(["a", "c"]).outputs(["b"]))
        .unwrap();
    graph
        .register(NodeSpec::new("f_two", sum).inputs(["b"]).outputs(["c"]))
        .unwrap();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(1))]))
        .await
        .unwrap_err();
    match &err {
        GraphError::Cycle(cycle) => assert_eq!(cycle.pending.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("A cyclic dependency exists amongst"));
    assert!(graph.levels().is_err());
}

#[tokio::test]
async fn test_args_kwargs() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_all", |args: CallArgs| -> Result<Value, NodeError> {
                let positional = args.number(0)? + args.number(1)? + args.number(2)?;
                Ok(Value::Number(positional + args.kwarg_number("d")?))
            })
            .inputs(["a", "b"])
            .args(["c"])
            .kwargs(["d"])
            .outputs(["e"]),
        )
        .unwrap();

    let res = graph
        .calculate(&inputs(&[
            ("a", Value::from(2)),
            ("b", Value::from(3)),
            ("c", Value::from(4)),
            ("d", Value::from(5)),
        ]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(14));
}

#[tokio::test]
async fn test_optional_kwargs() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_scaled", |args: CallArgs| -> Result<Value, NodeError> {
                Ok(Value::Number(args.number(0)? * args.kwarg_number_or("factor", 2.0)?))
            })
            .inputs(["a"])
            .kwargs([Input::kwarg("factor").optional()])
            .outputs(["b"]),
        )
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("a", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(6));

    let res = graph
        .calculate(&inputs(&[("a", Value::from(3)), ("factor", Value::from(10))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(30));
}

#[tokio::test]
async fn test_constant_input() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_sum", sum)
                .inputs([json!("a"), json!({"b": 2})])
                .outputs(["c"]),
        )
        .unwrap();

    assert_eq!(graph.sim_inputs(), vec!["a".to_string()]);
    let res = graph
        .calculate(&inputs(&[("a", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(5));
}

#[tokio::test]
async fn test_wrong_input_shapes() {
    let mut graph = Graph::new();

    let err = graph
        .register(
            NodeSpec::new("f_sum", sum)
                .inputs([json!("a"), json!(2)])
                .outputs(["c"]),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Registration error: inputs need to be of type Input, str or dict"
    );

    let err = graph
        .register(
            NodeSpec::new("f_sum", sum)
                .inputs([json!("a"), json!({})])
                .outputs(["c"]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Registration(RegistrationError::InvalidConstant)
    ));

    let err = graph
        .register(NodeSpec::new("f_sum", sum).outputs(["c"]))
        .unwrap_err();
    assert!(err.to_string().contains("Missing inputs parameter"));
    assert!(graph.is_empty());
}

#[tokio::test]
async fn test_input_contract() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_sum", sum)
                .input(Input::new("a").with_contract_str("int,>0").unwrap())
                .input("b")
                .outputs(["c"]),
        )
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(5));

    let err = graph
        .calculate(&inputs(&[("a", Value::from(-2)), ("b", Value::from(3))]))
        .await
        .unwrap_err();
    match err {
        GraphError::ContractViolation(violation) => {
            assert_eq!(violation.name, "a");
            assert_eq!(violation.message, "Condition -2 > 0 not respected");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_output_contract() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_diff", diff)
                .inputs(["a", "b"])
                .output(Output::new("c").with_contract_str(">0").unwrap()),
        )
        .unwrap();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ContractViolation(ref v) if v.name == "c"));
    assert!(!graph.data().unwrap().contains_key("c"));
}

#[tokio::test]
async fn test_graph_descriptors() {
    let mut graph = Graph::new().with_descriptors(
        [Input::new("a").with_contract_str(">0").unwrap(), Input::new("b")],
        [Output::new("c")],
    );
    graph
        .register(NodeSpec::new("f_sum", sum).inputs(["a", "b"]).outputs(["c"]))
        .unwrap();

    let err = graph
        .register(NodeSpec::new("f_other", sum).input(Input::new("a")).outputs(["x"]))
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("You cannot use Input / Output in a Node if already defined: a"));

    let err = graph
        .calculate(&inputs(&[("a", Value::from(-1)), ("b", Value::from(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ContractViolation(_)));
}

#[tokio::test]
async fn test_mapped_names() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_sum", sum)
                .input(Input::new("a").map("q"))
                .input(Input::new("b").map("w"))
                .output(Output::new("c").map("e")),
        )
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("q", Value::from(2)), ("w", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(5));
    assert_eq!(graph.sim_outputs(), vec!["e".to_string()]);
    assert_eq!(graph.data().unwrap()["e"], Value::from(5));
}

#[tokio::test]
async fn test_schema() {
    let schema = DataSchema::from_json(json!({
        "type": "object",
        "properties": {
            "a": {"type": "number"},
            "b": {"type": "number"}
        }
    }))
    .unwrap();
    let mut graph = simple_graph(GraphConfig::default()).with_schema(schema);

    let res = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(-1.5));

    let err = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from("3"))]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is not of type 'number'"));

    graph.set_schema(Some(DataSchema::new().property("a", ValueKind::Int)));
    let err = graph
        .calculate(&inputs(&[("a", Value::from(2.5)), ("b", Value::from(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Validation(ValidationError::Schema { .. })));
}

fn bump() -> impl Fn(CallArgs) -> Result<Value, NodeError> + Send + Sync {
    |args: CallArgs| -> Result<Value, NodeError> {
        let cell = args
            .arg(0)?
            .as_shared()
            .ok_or_else(|| NodeError::ExecutionFailed("expected a shared cell".to_string()))?;
        let before = cell.update(|value| {
            let before = value.as_f64().unwrap_or_default();
            *value = Value::from(before + 1.0);
            before
        });
        Ok(Value::from(before))
    }
}

#[tokio::test]
async fn test_copy_input() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_bump", bump()).inputs(["a"]).outputs(["b"]))
        .unwrap();

    let a = Value::shared(4);
    let res = graph.calculate(&inputs(&[("a", a.clone())])).await.unwrap();
    assert_eq!(res, Value::from(4));
    assert_eq!(a.as_shared().unwrap().get(), Value::from(4));
}

#[tokio::test]
async fn test_no_copy_input() {
    let mut graph = Graph::with_config(GraphConfig {
        copy_input: false,
        ..GraphConfig::default()
    });
    graph
        .register(NodeSpec::new("f_bump", bump()).inputs(["a"]).outputs(["b"]))
        .unwrap();

    let a = Value::shared(4);
    let res = graph.calculate(&inputs(&[("a", a.clone())])).await.unwrap();
    assert_eq!(res, Value::from(4));
    assert_eq!(a.as_shared().unwrap().get(), Value::from(5));
}

#[tokio::test]
async fn test_shared_constant_is_copied_per_call() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_bump", |args: CallArgs| -> Result<Value, NodeError> {
                let counter = args.arg(1)?.as_shared().ok_or_else(|| {
                    NodeError::ExecutionFailed("expected a shared cell".to_string())
                })?;
                let count = counter.update(|value| {
                    let next = value.as_f64().unwrap_or_default() + 1.0;
                    *value = Value::from(next);
                    next
                });
                Ok(Value::from(args.number(0)? + count))
            })
            .input("a")
            .input(Input::constant("k", Value::shared(0)))
            .outputs(["b"]),
        )
        .unwrap();

    let data = inputs(&[("a", Value::from(1))]);
    let first = graph.calculate(&data).await.unwrap();
    let second = graph.calculate(&data).await.unwrap();

    assert_eq!(first, Value::from(2));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_keyword_descriptor_in_inputs() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_scaled", |args: CallArgs| -> Result<Value, NodeError> {
                Ok(Value::Number(args.number(0)? * args.kwarg_number_or("factor", 2.0)?))
            })
            .inputs([Input::new("a"), Input::kwarg("factor").optional()])
            .outputs(["b"]),
        )
        .unwrap();

    let res = graph
        .calculate(&inputs(&[("a", Value::from(3))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(6));

    let res = graph
        .calculate(&inputs(&[("a", Value::from(3)), ("factor", Value::from(4))]))
        .await
        .unwrap();
    assert_eq!(res, Value::from(12));
}

#[tokio::test]
async fn test_bind_failure_emits_node_failed() {
    let mut graph = Graph::new();
    graph
        .register(
            NodeSpec::new("f_sum", sum)
                .input(Input::new("a").with_contract_str(">0").unwrap())
                .outputs(["c"]),
        )
        .unwrap();
    let mut rx = graph.subscribe_events();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(-1))]))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::ContractViolation(_)));

    let mut failed = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ExecutionEvent::NodeFailed { node_name, error, .. } = event {
            failed.push((node_name, error));
        }
    }
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "f_sum");
    assert!(failed[0].1.contains("Condition -1 > 0 not respected"));
}

#[tokio::test]
async fn test_node_failure_keeps_earlier_levels() {
    let mut graph = Graph::new();
    graph
        .register(NodeSpec::new("f_sum", sum).inputs(["a", "b"]).outputs(["c"]))
        .unwrap();
    graph
        .register(
            NodeSpec::new("f_fail", |_: CallArgs| -> Result<Value, NodeError> {
                Err(NodeError::ExecutionFailed("boom".to_string()))
            })
            .inputs(["c"])
            .outputs(["d"]),
        )
        .unwrap();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Execution { ref node, .. } if node == "f_fail"));
    let data = graph.data().unwrap();
    assert_eq!(data["c"], Value::from(5));
    assert!(!data.contains_key("d"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_node() {
    let mut graph = Graph::with_config(GraphConfig {
        parallel: true,
        ..GraphConfig::default()
    });
    graph
        .register(
            NodeSpec::new("f_panic", |_: CallArgs| -> Result<Value, NodeError> {
                panic!("exploded")
            })
            .inputs(["a"])
            .outputs(["b"]),
        )
        .unwrap();
    graph
        .register(NodeSpec::new("f_ok", sum).inputs(["a"]).outputs(["c"]))
        .unwrap();

    let err = graph
        .calculate(&inputs(&[("a", Value::from(1))]))
        .await
        .unwrap_err();
    assert_eq!(err.node_error(), Some(&NodeError::Panicked("exploded".to_string())));
    assert!(!graph.data().unwrap().contains_key("c"));
}

#[tokio::test]
async fn test_execution_events() {
    let mut graph = simple_graph(GraphConfig::default());
    let mut rx = graph.subscribe_events();

    graph
        .calculate(&inputs(&[("a", Value::from(2)), ("b", Value::from(3))]))
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(
        events.first(),
        Some(ExecutionEvent::CalculationStarted { node_count: 3, .. })
    ));
    assert!(matches!(
        events.last(),
        Some(ExecutionEvent::CalculationCompleted { success: true, .. })
    ));
    let levels = events
        .iter()
        .filter(|e| matches!(e, ExecutionEvent::LevelStarted { .. }))
        .count();
    let completed: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::NodeCompleted { node_name, .. } => Some(node_name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(levels, 3);
    assert_eq!(completed, vec!["f_sum", "f_tenth", "f_diff"]);

    let id = events[0].execution_id();
    assert!(events.iter().all(|e| e.execution_id() == id));
}

#[tokio::test]
async fn test_dependency_views() {
    let graph = simple_graph(GraphConfig::default());

    let deps = graph.dependencies();
    assert_eq!(deps.len(), 3);
    let exported = graph.dependency_graph();
    assert_eq!(exported.edge_count(), 2);
    let mut labels: Vec<&str> = exported.edge_weights().map(String::as_str).collect();
    labels.sort();
    assert_eq!(labels, vec!["c", "d"]);

    let dot = graph.to_dot();
    assert!(dot.contains("digraph"));
    assert!(dot.contains("f_tenth"));
}

#[test]
fn test_config_from_json() {
    let config: GraphConfig = serde_json::from_value(json!({
        "parallel": true,
        "pool_size": 8,
        "unused_inputs": "warn"
    }))
    .unwrap();

    assert!(config.parallel);
    assert_eq!(config.pool_size, 8);
    assert!(config.copy_input);
    assert_eq!(config.unused_inputs, UnusedInputPolicy::Warn);
}
