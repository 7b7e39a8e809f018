fn main() {
    // Propagate the ESP-IDF toolchain environment when building for the
    // device. Host builds (tests, fuzzing) skip it entirely.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
