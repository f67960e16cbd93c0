/// promptenv build script.
///
/// Native probes exist for the `windows` and `unix` target families only.
fn main() {
    // Hard gate: fail loudly on any other target rather than producing a
    // crate with no `NativePlatform`.
    let family = std::env::var("CARGO_CFG_TARGET_FAMILY").unwrap_or_default();
    if !family.split(',').any(|f| f == "windows" || f == "unix") {
        panic!(
            "promptenv only builds for windows or unix targets \
             (CARGO_CFG_TARGET_FAMILY = {family:?})"
        );
    }

    println!("cargo:rerun-if-changed=build.rs");
}
