fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF environment propagation is only needed for firmware builds;
    // host builds (tests, simulation) have no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
