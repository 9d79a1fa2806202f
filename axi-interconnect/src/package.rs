//! Package of generated modules.

use std::io;

use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("file system error: {error:?}")]
    Fs { error: io::Error },

    #[error("module {name} is added more than once")]
    DuplicateModule { name: String },
}

/// Package.
#[derive(Debug, Default)]
pub struct Package {
    /// Modules.
    pub modules: Vec<vir::Module>,
}

impl Package {
    /// Adds the given module to package.
    pub fn add(&mut self, module: vir::Module) { self.modules.push(module); }

    /// Adds the wrapper module of the given crossbar configuration.
    pub fn add_crossbar(&mut self, config: &CrossbarConfig) { self.add(virgen::gen_crossbar(config)); }

    /// Adds a wrapper module named `name` around the given adapter.
    pub fn add_adapter(&mut self, config: &AdapterConfig, name: &str) { self.add(virgen::gen_adapter(config, name)); }
}
