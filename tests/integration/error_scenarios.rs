//! Unresolvable headers, targets and files abort the request

use anyhow::Result;
use depg::builder::changed_paths_to_target_names;
use depg::core::DepgError;

use crate::common::{TestRepo, names};

fn depg_error(err: &anyhow::Error) -> &DepgError {
    err.chain()
        .find_map(|e| e.downcast_ref::<DepgError>())
        .unwrap_or_else(|| panic!("no DepgError in chain: {err:#}"))
}

#[test]
fn test_unrecognized_header_names_header_and_file() -> Result<()> {
    let repo = TestRepo::with_files(&[("src/main.cpp", "#include <vector>\n#include \"nowhere/mystery.hpp\"\n")])?;
    let mut builder = repo.builder()?;

    let err = builder.get_deps(&names(&["src/main"])).unwrap_err();
    assert_eq!(
        depg_error(&err),
        &DepgError::UnrecognizedHeader {
            header: "nowhere/mystery.hpp".to_string(),
            file: "src/main.cpp".to_string(),
        }
    );
    Ok(())
}

#[test]
fn test_extra_system_headers_silence_unknown_includes() -> Result<()> {
    let repo = TestRepo::with_files(&[("main.cpp", "#include <zlib.h>\n")])?;
    assert!(repo.builder()?.get_deps(&names(&["main"])).is_err());

    repo.write_config("extra_system_headers = [\"zlib.h\"]\n")?;
    let mut builder = repo.builder()?;
    let targets = builder.get_deps(&names(&["main"]))?;
    assert!(targets["main"].private_deps.is_empty());
    Ok(())
}

#[test]
fn test_grpc_header_requires_its_proto() -> Result<()> {
    let repo = TestRepo::with_files(&[("server.cpp", "#include \"p/missing.grpc.pb.h\"\n")])?;
    let mut builder = repo.builder()?;

    let err = builder.get_deps(&names(&["server"])).unwrap_err();
    assert_eq!(
        depg_error(&err),
        &DepgError::FileNotFound {
            path: "p/missing.proto".to_string(),
            requested_by: Some("server.cpp".to_string()),
        }
    );
    assert_eq!(err.to_string(), "'p/missing.proto' doesn't exist. Required by 'server.cpp'");
    Ok(())
}

#[test]
fn test_missing_proto_import() -> Result<()> {
    let repo = TestRepo::with_files(&[("p/a.proto", "import \"p/gone.proto\";\n")])?;
    let mut builder = repo.builder()?;

    let err = builder.get_deps(&names(&["p/a.proto"])).unwrap_err();
    assert!(matches!(
        depg_error(&err),
        DepgError::FileNotFound { path, requested_by: Some(by) } if path == "p/gone.proto" && by == "p/a.proto"
    ));

    repo.write_config("ignore_existence = [\"p/gone.proto\"]\n")?;
    let mut builder = repo.builder()?;
    let targets = builder.get_deps(&names(&["p/a.proto"]));
    // The import is accepted, but the proto itself still cannot be parsed.
    assert!(matches!(
        targets.map_err(|e| depg_error(&e).clone()),
        Err(DepgError::FileNotFound { path, requested_by: None }) if path == "p/gone.proto"
    ));
    Ok(())
}

#[test]
fn test_unrecognized_root_target() -> Result<()> {
    let repo = TestRepo::new()?;
    let mut builder = repo.builder()?;

    let err = builder.get_deps(&names(&["ghost"])).unwrap_err();
    assert_eq!(err.to_string(), "Unable to recognize the target 'ghost'");
    Ok(())
}

#[test]
fn test_missing_changed_path() -> Result<()> {
    let repo = TestRepo::with_files(&[("a.cpp", "")])?;
    let config = repo.config()?;

    let err = changed_paths_to_target_names(repo.root(), &names(&["a.cpp", "b.cpp"]), &config).unwrap_err();
    assert_eq!(err.to_string(), "'b.cpp' doesn't exist");
    Ok(())
}

#[test]
fn test_unknown_config_key_is_rejected() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write_config("cache_dir = \"x\"\n")?;
    assert!(repo.config().is_err());
    Ok(())
}
