// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for integration tests.

use layercfg::prelude::*;
use std::env;

/// A small spec exercising every item behavior.
#[allow(dead_code)]
pub struct NetworkBuffer {
    pub spec: ConfigSpec,
    pub size: Item<SizeInBytes>,
    pub max_size: Item<SizeInBytes>,
    pub name: Item<String>,
    pub timeout: Item<std::time::Duration>,
    pub hosts: Item<Vec<String>>,
}

/// Declares the `network.buffer` spec.
#[allow(dead_code)]
pub fn network_buffer() -> NetworkBuffer {
    let mut spec = ConfigSpec::new("network.buffer");
    let size = spec
        .required::<SizeInBytes>("size", "size of buffer")
        .unwrap();
    let max_size = spec
        .lazy("maxSize", "max size of buffer", {
            let size = size.clone();
            move |config: &dyn ConfigGetter| Ok(SizeInBytes::new(config.get(&size)?.bytes * 2))
        })
        .unwrap();
    let name = spec
        .optional("name", "buffer".to_string(), "name of buffer")
        .unwrap();
    let timeout = spec
        .optional(
            "timeout",
            std::time::Duration::from_secs(1),
            "timeout of buffer reads",
        )
        .unwrap();
    let hosts = spec
        .optional("hosts", Vec::<String>::new(), "peers of buffer")
        .unwrap();
    NetworkBuffer {
        spec,
        size,
        max_size,
        name,
        timeout,
        hosts,
    }
}

/// A config with the `network.buffer` spec registered.
#[allow(dead_code)]
pub fn loaded_config() -> (Config, NetworkBuffer) {
    let buffer = network_buffer();
    let config = Config::new();
    config.add_spec(&buffer.spec).unwrap();
    (config, buffer)
}

/// Sets environment variables and removes them on drop.
#[allow(dead_code)]
pub struct EnvGuard {
    keys: Vec<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new() -> Self {
        EnvGuard { keys: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        env::set_var(key, value);
        self.keys.push(key.to_string());
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            env::remove_var(key);
        }
    }
}
