fn main() {
    println!("cargo:rustc-check-cfg=cfg(blas)");

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let accelerate = std::env::var_os("CARGO_FEATURE_ACCELERATE").is_some();
    let openblas = std::env::var_os("CARGO_FEATURE_OPENBLAS").is_some();

    // Accelerate wins on macOS when both are requested.
    if accelerate && target_os == "macos" {
        println!("cargo:rustc-link-lib=framework=Accelerate");
        println!("cargo:rustc-cfg=blas");
    } else if openblas {
        println!("cargo:rustc-link-lib=openblas");
        println!("cargo:rustc-cfg=blas");
    }
}
