#[test]
fn cargo_toml_has_release_profile() {
    let cargo_toml = include_str!("../Cargo.toml");
    assert!(
        cargo_toml.contains("[profile.release]"),
        "Cargo.toml must have a [profile.release] section"
    );
    assert!(
        cargo_toml.contains("lto = true"),
        "Release profile must enable LTO"
    );
    assert!(
        cargo_toml.contains("strip = true"),
        "Release profile must strip symbols"
    );
    assert!(
        cargo_toml.contains("codegen-units = 1"),
        "Release profile must use single codegen unit"
    );
}

#[test]
fn tls_uses_rustls_only() {
    let cargo_toml = include_str!("../Cargo.toml");
    let reqwest = cargo_toml
        .lines()
        .find(|line| line.starts_with("reqwest"))
        .expect("reqwest dependency");
    assert!(
        reqwest.contains("default-features = false"),
        "reqwest must not pull in native-tls"
    );
    assert!(reqwest.contains("rustls"), "reqwest must use rustls");
}
