//! Target inference over small source trees

use anyhow::Result;
use depg::builder::changed_paths_to_target_names;
use depg::core::{Target, TargetType};

use crate::common::{TestRepo, names};

fn diamond_repo() -> Result<TestRepo> {
    TestRepo::with_files(&[
        ("f1.hpp", "#pragma once\nint f1();\n"),
        ("f2.hpp", "#pragma once\n#include \"f1.hpp\"\nint f2();\n"),
        ("main.cpp", "#include <iostream>\n#include \"f1.hpp\"\n#include \"f2.hpp\"\n\nint main() { return f1() + f2(); }\n"),
    ])
}

#[test]
fn test_header_includes_are_public_source_includes_private() -> Result<()> {
    let repo = diamond_repo()?;
    let mut builder = repo.builder()?;
    builder.declare_target(Target::new("main", TargetType::Executable));

    let targets = builder.get_deps(&names(&["main"]))?;
    assert_eq!(targets.keys().map(String::as_str).collect::<Vec<_>>(), vec!["f1", "f2", "main"]);

    let main = &targets["main"];
    assert_eq!(main.target_type, TargetType::Executable);
    assert_eq!(main.srcs, vec!["main.cpp"]);
    assert!(main.hdrs.is_empty());
    assert_eq!(main.private_deps, vec!["f1", "f2"]);
    assert!(main.public_deps.is_empty());

    let f2 = &targets["f2"];
    assert_eq!(f2.target_type, TargetType::SourceFile);
    assert_eq!(f2.hdrs, vec!["f2.hpp"]);
    assert_eq!(f2.public_deps, vec!["f1"]);

    let f1 = &targets["f1"];
    assert!(f1.public_deps.is_empty());
    assert!(f1.private_deps.is_empty());

    assert_eq!(builder.dependency_order(&names(&["main"]))?, vec!["f1", "f2", "main"]);
    Ok(())
}

#[test]
fn test_repeated_requests_are_idempotent() -> Result<()> {
    let repo = diamond_repo()?;
    let mut builder = repo.builder()?;

    let first = builder.get_deps(&names(&["main"]))?.clone();
    let second = builder.get_deps(&names(&["main"]))?.clone();
    assert_eq!(first, second);

    let cover = builder.deps_cover(&names(&["f2"]))?.clone();
    assert_eq!(cover.keys().map(String::as_str).collect::<Vec<_>>(), vec!["f1", "f2"]);
    assert_eq!(builder.deps_cover(&names(&["f2"]))?, &cover);
    Ok(())
}

#[test]
fn test_get_deps_accumulates_across_requests() -> Result<()> {
    let repo = diamond_repo()?;
    repo.write_files(&[("other.cpp", "")]);
    let mut builder = repo.builder()?;

    builder.get_deps(&names(&["f2"]))?;
    let targets = builder.get_deps(&names(&["other"]))?;
    assert!(targets.contains_key("f2"));
    assert!(targets.contains_key("other"));

    let targets = builder.deps_cover(&names(&["other"]))?;
    assert_eq!(targets.keys().map(String::as_str).collect::<Vec<_>>(), vec!["other"]);
    Ok(())
}

#[test]
fn test_includer_relative_and_inline_headers() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("net/socket.hpp", "#include \"buffer.hpp\"\n#include \"socket-inl.hpp\"\n"),
        ("net/socket-inl.hpp", "#include <cstring>\n"),
        ("net/socket.cpp", "#include \"net/socket.hpp\"\n#include \"net/buffer.hpp\"\n"),
        ("net/buffer.hpp", ""),
    ])?;
    let mut builder = repo.builder()?;

    let targets = builder.get_deps(&names(&["net/socket"]))?;
    let socket = &targets["net/socket"];
    assert_eq!(socket.hdrs, vec!["net/socket-inl.hpp", "net/socket.hpp"]);
    assert_eq!(socket.srcs, vec!["net/socket.cpp"]);
    assert_eq!(socket.public_deps, vec!["net/buffer"]);
    // Self includes and includes already public never show up as private.
    assert!(socket.private_deps.is_empty());
    Ok(())
}

#[test]
fn test_proto_and_grpc_libraries() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("p/base.proto", "syntax = \"proto3\";\nimport \"google/protobuf/empty.proto\";\n"),
        ("p/svc.proto", "syntax = \"proto3\";\nimport \"p/base.proto\";\n"),
        ("server.cpp", "#include \"p/svc.grpc.pb.h\"\n#include \"p/svc.pb.h\"\n#include \"options.pb.h\"\n"),
    ])?;
    let mut builder = repo.builder()?;

    let targets = builder.get_deps(&names(&["server"]))?;
    assert_eq!(targets["server"].private_deps, vec!["p/svc.grpc", "p/svc.proto"]);

    let grpc = &targets["p/svc.grpc"];
    assert_eq!(grpc.target_type, TargetType::GrpcLibrary);
    assert_eq!(grpc.public_deps, vec!["p/svc.proto"]);

    let svc = &targets["p/svc.proto"];
    assert_eq!(svc.target_type, TargetType::ProtoLibrary);
    assert_eq!(svc.public_deps, vec!["p/base.proto"]);
    assert!(targets["p/base.proto"].public_deps.is_empty());

    assert_eq!(
        builder.dependency_order(&names(&["server"]))?,
        vec!["p/base.proto", "p/svc.proto", "p/svc.grpc", "server"]
    );
    Ok(())
}

#[test]
fn test_directory_request_with_tests_and_test_main() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("a/a.hpp", ""),
        ("a/a_test.cpp", "#include \"a/a.hpp\"\n#include \"testing/main.hpp\"\n"),
        ("a/notes.txt", "not a source file"),
        ("testing/main.hpp", ""),
        ("testing/main.cpp", ""),
    ])?;
    repo.write_config("test_main_target = \"testing/main\"\n")?;
    let config = repo.config()?;

    let roots = changed_paths_to_target_names(repo.root(), &names(&["a/"]), &config)?;
    assert_eq!(roots, vec!["a/a", "a/a_test"]);

    let mut builder = repo.builder()?;
    let targets = builder.get_deps(&roots)?;
    let test = &targets["a/a_test"];
    assert_eq!(test.target_type, TargetType::Test);
    assert_eq!(test.srcs, vec!["a/a_test.cpp"]);
    assert_eq!(test.private_deps, vec!["testing/main", "a/a"]);
    assert_eq!(targets["testing/main"].srcs, vec!["testing/main.cpp"]);
    Ok(())
}

#[test]
fn test_custom_headers_table() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("app.cpp", "#include \"version_info.h\"\n"),
        ("build_info/version.cpp", ""),
    ])?;
    repo.write_config("[custom_headers]\n\"version_info.h\" = \"build_info/version\"\n")?;
    let mut builder = repo.builder()?;

    let targets = builder.get_deps(&names(&["app"]))?;
    assert_eq!(targets["app"].private_deps, vec!["build_info/version"]);
    assert_eq!(targets["build_info/version"].target_type, TargetType::SourceFile);
    Ok(())
}
