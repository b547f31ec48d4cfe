fn main() {
    println!("cargo:rerun-if-changed=resources/crosshair.rc");
    println!("cargo:rerun-if-changed=resources/crosshair.manifest");

    // Version info and manifest only matter for the Windows executable
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        // NotAttempted (no resource compiler on this host) is fine; a real
        // compile failure is not.
        if let Err(e) =
            embed_resource::compile("resources/crosshair.rc", embed_resource::NONE).manifest_optional()
        {
            panic!("Failed to compile resources/crosshair.rc: {e}");
        }
    }
}
