fn main() {
    // The linker script only applies to the freestanding target; host
    // builds (unit tests) link normally.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "none" {
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
        println!("cargo:rustc-link-arg-bins=-T{}/kernel.ld", manifest_dir);
    }

    // Rerun if linker script changes
    println!("cargo:rerun-if-changed=kernel.ld");
}
