//! Cycle detection and build order

use anyhow::Result;
use depg::core::DepgError;

use crate::common::{TestRepo, names};

fn cyclic_repo() -> Result<TestRepo> {
    TestRepo::with_files(&[
        ("a.hpp", "#include \"b.hpp\"\n"),
        ("b.hpp", "#include \"c.hpp\"\n"),
        ("c.hpp", "#include \"a.hpp\"\n"),
        ("d.cpp", "#include \"a.hpp\"\n"),
    ])
}

#[test]
fn test_cycle_is_reported_with_its_members() -> Result<()> {
    let repo = cyclic_repo()?;
    let mut builder = repo.builder()?;

    let err = builder.dependency_order(&names(&["a"])).unwrap_err();
    match err.downcast_ref::<DepgError>() {
        Some(DepgError::CircularDependency {
            cycle,
        }) => assert_eq!(cycle, "a -> b -> c -> a"),
        other => panic!("expected a circular dependency, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> c -> a");
    Ok(())
}

#[test]
fn test_closure_of_cyclic_graph_still_resolves() -> Result<()> {
    let repo = cyclic_repo()?;
    let mut builder = repo.builder()?;

    let targets = builder.deps_cover(&names(&["d"]))?;
    assert_eq!(targets.keys().map(String::as_str).collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);

    let sorted = builder.topological_sort(&names(&["d"]))?;
    assert!(sorted.has_cycles());
    assert_eq!(sorted.order.last().map(String::as_str), Some("d"));
    Ok(())
}

#[test]
fn test_self_include_is_not_a_cycle() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("a.hpp", "#pragma once\n"),
        ("a.cpp", "#include \"a.hpp\"\n"),
        ("b.cpp", "#include \"a.hpp\"\n"),
    ])?;
    let mut builder = repo.builder()?;

    assert_eq!(builder.dependency_order(&names(&["b", "a"]))?, vec!["a", "b"]);
    assert!(builder.target("a").is_some_and(|a| a.private_deps.is_empty()));
    Ok(())
}
