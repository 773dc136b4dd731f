fn main() {
    // The vendor SDK is only linked when the binary is built
    if std::env::var_os("CARGO_FEATURE_SIXENSE").is_none() {
        return;
    }

    if let Some(dir) = std::env::var_os("SIXENSE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }

    let lib = match std::env::var("CARGO_CFG_TARGET_POINTER_WIDTH").as_deref() {
        Ok("64") => "sixense_x64",
        _ => "sixense",
    };
    println!("cargo:rustc-link-lib=dylib={}", lib);

    println!("cargo:rerun-if-env-changed=SIXENSE_LIB_DIR");
}
