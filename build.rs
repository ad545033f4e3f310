use build_helper::{host, windows, rustc, LibKind, SearchKind};
use std::env;

fn main() {
    // The client library is only needed when the OCI binding is compiled in.
    if env::var_os("CARGO_FEATURE_OCI").is_none() {
        return;
    }
    let oracle_client_lib = if windows() { "oci" } else { "clntsh" };
    rustc::link_lib(Some(LibKind::DyLib), oracle_client_lib);

    if host().os() == "windows" {
        if let Some( path ) = env::var_os("PATH") {
            for dir in env::split_paths(&path) {
                if has_oci_dll(&dir) {
                    rustc::link_search(Some(SearchKind::Native), &dir);
                }
            }
        }
    } else if let Some( dir ) = env::var_os("OCI_LIB_DIR") {
        rustc::link_search(Some(SearchKind::Native), std::path::Path::new(&dir));
    }
    println!("cargo:rerun-if-env-changed=OCI_LIB_DIR");
}

fn has_oci_dll(dir: &std::path::Path) -> bool {
    dir.read_dir()
        .map(|entries| entries
            .flatten()
            .any(|file| file.file_name().to_str().map_or(false, |name| name.eq_ignore_ascii_case("oci.dll")))
        )
        .unwrap_or(false)
}
