use shadow_rs::ShadowBuilder;

fn main() {
    // Version metadata for `eventease --version`
    ShadowBuilder::builder()
        .build()
        .expect("failed to generate build metadata");
    println!("cargo:rerun-if-changed=migrations");
}
