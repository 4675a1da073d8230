fn main() {
    // The ESP-IDF build environment is only wanted when cross-compiling for
    // Xtensa targets; host builds (tests, tooling) must not touch it.
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") {
            embuild::espidf::sysenv::output();
        }
    }
}
