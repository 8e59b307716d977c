fn main() {
    // The ESP-IDF sysenv is only available when building for the device.
    // Host builds (unit/property tests) skip it entirely.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
