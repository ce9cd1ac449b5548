// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered usage example for the configuration crate.
//!
//! This example demonstrates:
//! - Declaring a spec with required, optional and lazy items
//! - Building a config from YAML, environment variables and arguments
//! - Overriding values in a child layer
//!
//! To run this example:
//! ```bash
//! export NETWORK_BUFFER_NAME="from-env"
//! cargo run --example layered_usage -- --network.buffer.size 4k
//! ```

use layercfg::prelude::*;
use std::time::Duration;

const DEFAULTS: &str = r#"
network:
  buffer:
    size: 1k
    timeout: 250ms
"#;

fn main() -> layercfg::domain::Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Configuration Crate: Layered Usage ===\n");

    let mut spec = ConfigSpec::new("network.buffer");
    let size = spec.required::<SizeInBytes>("size", "size of buffer")?;
    let max_size = spec.lazy("maxsize", "max size of buffer", {
        let size = size.clone();
        move |config: &dyn ConfigGetter| Ok(SizeInBytes::new(config.get(&size)?.bytes * 2))
    })?;
    let name = spec.optional("name", "buffer".to_string(), "name of buffer")?;
    let timeout = spec.optional("timeout", Duration::from_secs(1), "read timeout")?;

    let config = ConfigBuilder::new()
        .with_spec(spec)
        .with_yaml_str(DEFAULTS)?
        .with_env_vars()
        .with_cli_args(std::env::args().skip(1).collect::<Vec<String>>())
        .build()?;

    println!("--- Resolved values ---");
    println!("size:     {}", config.get(&size)?);
    println!("max size: {}", config.get(&max_size)?);
    println!("name:     {}", config.get(&name)?);
    println!("timeout:  {:?}", config.get(&timeout)?);

    println!("\n--- Layers ---");
    let mut layer = Some(&config);
    while let Some(current) = layer {
        println!("{}", current.name());
        layer = current.parent();
    }

    println!("\n--- Override in a child layer ---");
    let tuned = config.with_layer("tuned");
    tuned.set(&size, SizeInBytes::new(64 * 1024))?;
    println!("tuned max size:    {}", tuned.get(&max_size)?);
    println!("original max size: {}", config.get(&max_size)?);

    Ok(())
}
