//! Fingerprint cache reuse across sessions

use anyhow::Result;
use depg::test_utils::set_mtime_ms;

use crate::common::{TestRepo, names};

fn repo() -> Result<TestRepo> {
    TestRepo::with_files(&[
        ("f1.hpp", ""),
        ("f2.hpp", "#include \"f1.hpp\"\n"),
        ("main.cpp", "#include \"f1.hpp\"\n#include \"f2.hpp\"\n"),
    ])
}

#[test]
fn test_second_session_reads_nothing() -> Result<()> {
    let repo = repo()?;

    let mut first = repo.builder()?;
    let expected = first.get_deps(&names(&["main"]))?.clone();
    assert_eq!(first.resolver().parsed_files(), 3);
    assert!(repo.cache_file().is_file());

    let mut second = repo.builder()?;
    let targets = second.get_deps(&names(&["main"]))?.clone();
    assert_eq!(targets, expected);
    assert_eq!(second.resolver().parsed_files(), 0);
    Ok(())
}

#[test]
fn test_touch_without_change_keeps_entries() -> Result<()> {
    let repo = repo()?;
    repo.builder()?.get_deps(&names(&["main"]))?;

    set_mtime_ms(&repo.root().join("f1.hpp"), 1_500_000_000_000);
    set_mtime_ms(&repo.root().join("main.cpp"), 1_500_000_000_000);

    let mut builder = repo.builder()?;
    builder.get_deps(&names(&["main"]))?;
    assert_eq!(builder.resolver().parsed_files(), 0);
    Ok(())
}

#[test]
fn test_edited_file_is_parsed_again() -> Result<()> {
    let repo = repo()?;
    repo.builder()?.get_deps(&names(&["main"]))?;

    repo.write_files(&[("f0.hpp", ""), ("f1.hpp", "#include \"f0.hpp\"\n")]);
    set_mtime_ms(&repo.root().join("f1.hpp"), 1_500_000_000_000);

    let mut builder = repo.builder()?;
    let targets = builder.get_deps(&names(&["main"]))?;
    assert_eq!(targets["f1"].public_deps, vec!["f0"]);
    assert!(targets.contains_key("f0"));
    // f1.hpp changed, f0.hpp is new.
    assert_eq!(builder.resolver().parsed_files(), 2);
    Ok(())
}

#[test]
fn test_declaration_change_invalidates_cache() -> Result<()> {
    let repo = repo()?;
    repo.write_files(&[("third_party/BUILD.toml", "[[target]]\nname = \"zlib\"\ntype = \"static_lib\"\n")]);
    repo.write_config("third_party_declarations = [\"third_party/BUILD.toml\"]\n")?;
    repo.builder()?.get_deps(&names(&["main"]))?;

    let mut unchanged = repo.builder()?;
    unchanged.get_deps(&names(&["main"]))?;
    assert_eq!(unchanged.resolver().parsed_files(), 0);

    repo.write_files(&[("third_party/BUILD.toml", "[[target]]\nname = \"zlib\"\ntype = \"shared_lib\"\n")]);
    let mut changed = repo.builder()?;
    changed.get_deps(&names(&["main"]))?;
    assert_eq!(changed.resolver().parsed_files(), 3);
    Ok(())
}

#[test]
fn test_header_prefix_change_invalidates_cache() -> Result<()> {
    let repo = TestRepo::with_files(&[("main.cpp", "#include \"glog/logging.h\"\n")])?;
    repo.write_config("[header_prefixes]\n\"glog\" = \"third_party/glog\"\n")?;
    let mut first = repo.builder()?;
    assert_eq!(first.get_deps(&names(&["main"]))?["main"].private_deps, vec!["third_party/glog"]);

    repo.write_config("[header_prefixes]\n\"glog\" = \"vendor/glog\"\n")?;
    let mut second = repo.builder()?;
    let targets = second.get_deps(&names(&["main"]))?;
    assert_eq!(targets["main"].private_deps, vec!["vendor/glog"]);
    assert!(!targets.contains_key("third_party/glog"));
    assert_eq!(second.resolver().parsed_files(), 1);
    Ok(())
}

#[test]
fn test_custom_headers_change_invalidates_cache() -> Result<()> {
    let repo = TestRepo::with_files(&[
        ("a/v.hpp", ""),
        ("b/v.hpp", ""),
        ("main.cpp", "#include \"version_info.h\"\n"),
    ])?;
    repo.write_config("[custom_headers]\n\"version_info.h\" = \"a/v\"\n")?;
    let mut first = repo.builder()?;
    assert_eq!(first.get_deps(&names(&["main"]))?["main"].private_deps, vec!["a/v"]);

    let mut unchanged = repo.builder()?;
    unchanged.get_deps(&names(&["main"]))?;
    assert_eq!(unchanged.resolver().parsed_files(), 0);

    repo.write_config("[custom_headers]\n\"version_info.h\" = \"b/v\"\n")?;
    let mut second = repo.builder()?;
    let targets = second.get_deps(&names(&["main"]))?;
    assert_eq!(targets["main"].private_deps, vec!["b/v"]);
    // main.cpp and the newly reached b/v.hpp.
    assert_eq!(second.resolver().parsed_files(), 2);
    Ok(())
}

#[test]
fn test_disabled_cache_writes_nothing() -> Result<()> {
    let repo = repo()?;
    repo.write_config("cache_directory = \"\"\n")?;

    repo.builder()?.get_deps(&names(&["main"]))?;
    assert!(!repo.cache_file().exists());

    let mut builder = repo.builder()?;
    builder.get_deps(&names(&["main"]))?;
    assert_eq!(builder.resolver().parsed_files(), 3);
    Ok(())
}

#[test]
fn test_corrupt_cache_file_starts_cold() -> Result<()> {
    let repo = repo()?;
    repo.builder()?.get_deps(&names(&["main"]))?;
    std::fs::write(repo.cache_file(), "{ truncated")?;

    let mut builder = repo.builder()?;
    let targets = builder.get_deps(&names(&["main"]))?;
    assert_eq!(targets["main"].private_deps, vec!["f1", "f2"]);
    assert_eq!(builder.resolver().parsed_files(), 3);
    Ok(())
}
