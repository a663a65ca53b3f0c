use chrono::Utc;

fn main() {
    // Build timestamp shown by `--version` / 构建时间
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=YAOLIST_S3_BUILD_TIME={}", stamp);
    println!("cargo:rerun-if-changed=build.rs");
}
