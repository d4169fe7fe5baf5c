fn main() {
    // The ESP-IDF environment only exists when cross-compiling for the chip;
    // host builds (simulator, tests) skip it.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-env-changed=FARMWATCH_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=FARMWATCH_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=FARMWATCH_UPLINK_URL");
}
