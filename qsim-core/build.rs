//! Build script para embutir o kernel WGSL do registrador
//!
//! Lê `shaders/register.wgsl`, faz uma validação básica e gera código Rust
//! com a fonte como constante. Erros de kernel aparecem no build.

use std::env;
use std::fs;
use std::path::Path;

const KERNEL: &str = "shaders/register.wgsl";
const ENTRY_POINTS: [&str; 2] = ["applyOneQubitGate", "applyTwoQubitGate"];
const WORKGROUP: &str = "@workgroup_size(64)";

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("compiled_shaders.rs");

    let kernel = fs::read_to_string(KERNEL).expect("Failed to read register.wgsl");
    validate_wgsl(&kernel, "register.wgsl");

    let generated = format!(
        r##"// Kernel WGSL embutido em build time
// Gerado automaticamente por build.rs

/// Kernels `applyOneQubitGate` e `applyTwoQubitGate`
pub const REGISTER_KERNEL: &str = r#"{}"#;
"##,
        kernel
    );

    fs::write(&dest_path, generated).expect("Failed to write compiled shaders");
}

/// Validação básica de sintaxe WGSL
fn validate_wgsl(source: &str, filename: &str) {
    for entry in ENTRY_POINTS {
        if !source.contains(&format!("fn {entry}(")) {
            panic!("❌ {} missing entry point: {}", filename, entry);
        }
    }

    let workgroups = source.matches("@workgroup_size").count();
    if workgroups != source.matches(WORKGROUP).count() {
        panic!("❌ {} must use {} for every entry point", filename, WORKGROUP);
    }

    let open_braces = source.matches('{').count();
    let close_braces = source.matches('}').count();
    if open_braces != close_braces {
        panic!(
            "❌ {} has unbalanced braces: {} open, {} close",
            filename, open_braces, close_braces
        );
    }
}
