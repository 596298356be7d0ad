//! Kernel WGSL do registrador, embutido em build time via build.rs

mod compiled {
    include!(concat!(env!("OUT_DIR"), "/compiled_shaders.rs"));
}

pub use compiled::REGISTER_KERNEL;
