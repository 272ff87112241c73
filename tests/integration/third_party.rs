//! Hand-written declarations and header prefixes

use anyhow::Result;
use depg::core::{DepgError, TargetType};

use crate::common::{TestRepo, names};

const THIRD_PARTY: &str = r#"
[[target]]
name = "glog"
type = "static_lib"
header_prefix = ["glog/"]
public_deps = [":gflags"]

[[target]]
name = "gflags"
type = "static_lib"
header_prefix = ["gflags/"]

[[target]]
name = "zlib"
type = "shared_lib"
"#;

fn repo_with_declarations(main_source: &str) -> Result<TestRepo> {
    let repo = TestRepo::with_files(&[("third_party/BUILD.toml", THIRD_PARTY), ("main.cpp", main_source)])?;
    repo.write_config("third_party_declarations = [\"third_party/BUILD.toml\"]\n")?;
    Ok(repo)
}

#[test]
fn test_header_prefix_resolves_to_declared_target() -> Result<()> {
    let repo = repo_with_declarations("#include <glog/logging.h>\n")?;
    let mut builder = repo.builder()?;

    let targets = builder.get_deps(&names(&["main"]))?;
    assert_eq!(
        targets.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["main", "third_party/gflags", "third_party/glog"]
    );
    assert_eq!(targets["main"].private_deps, vec!["third_party/glog"]);

    let glog = &targets["third_party/glog"];
    assert_eq!(glog.target_type, TargetType::StaticLib);
    assert_eq!(glog.public_deps, vec!["third_party/gflags"]);
    assert_eq!(targets["third_party/gflags"].target_type, TargetType::StaticLib);
    Ok(())
}

#[test]
fn test_explicit_prefix_table_overrides_declarations() -> Result<()> {
    let repo = repo_with_declarations("#include \"compress/zlib.h\"\n")?;
    repo.write_config(
        "third_party_declarations = [\"third_party/BUILD.toml\"]\n\n[header_prefixes]\n\"compress\" = \"third_party/zlib\"\n",
    )?;
    let mut builder = repo.builder()?;

    let targets = builder.get_deps(&names(&["main"]))?;
    assert_eq!(targets["main"].private_deps, vec!["third_party/zlib"]);
    assert_eq!(targets["third_party/zlib"].target_type, TargetType::SharedLib);
    Ok(())
}

#[test]
fn test_undeclared_dependency_of_declaration() -> Result<()> {
    let repo = TestRepo::with_files(&[
        (
            "vendor/BUILD.toml",
            "[[target]]\nname = \"lib\"\ntype = \"static_lib\"\nheader_prefix = [\"lib\"]\npublic_deps = [\":missing\"]\n",
        ),
        ("main.cpp", "#include \"lib/api.h\"\n"),
    ])?;
    repo.write_config("third_party_declarations = [\"vendor/BUILD.toml\"]\n")?;
    let mut builder = repo.builder()?;

    let err = builder.get_deps(&names(&["main"])).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DepgError>(),
        Some(&DepgError::UnrecognizedTarget {
            name: "vendor/missing".to_string(),
            parent: Some("vendor/lib".to_string()),
        })
    );
    Ok(())
}

#[test]
fn test_duplicate_declaration_fails_session() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("a/BUILD.toml", "[[target]]\nname = \"x\"\ntype = \"static_lib\"\n"),
        (
            "c/BUILD.toml",
            "[[target]]\nname = \"y\"\ntype = \"static_lib\"\n\n[[target]]\nname = \"y\"\ntype = \"shared_lib\"\n",
        ),
    ])?;
    repo.write_config("third_party_declarations = [\"a/BUILD.toml\", \"c/BUILD.toml\"]\n")?;

    let err = repo.builder().err().expect("duplicate declarations must fail");
    let depg_error = err.chain().find_map(|e| e.downcast_ref::<DepgError>());
    assert_eq!(
        depg_error,
        Some(&DepgError::DuplicateDeclaration {
            name: "c/y".to_string(),
            file: "c/BUILD.toml".to_string(),
        })
    );
    Ok(())
}
