//! External resolver invocation
//!
//! Runs an `atos`-compatible tool once per library:
//!
//! ```text
//! atos -arch x86_64 -o <artifact> -l <load-address> -f <address-file>
//! ```
//!
//! The tool prints one line per input address, in input order. Blank output
//! lines are dropped before the line count is compared with the request, so
//! a tool that pads its output still matches.

use log::debug;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

use super::resolver::{AddressResolver, ResolveRequest};
use crate::domain::ResolveError;
use crate::parsing::patterns::SUPPORTED_ARCH;

/// Default resolver program, looked up on `PATH`
pub const DEFAULT_RESOLVER: &str = "atos";

/// Resolver backed by an external process
#[derive(Debug, Clone)]
pub struct AtosResolver {
    program: String,
}

impl AtosResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for AtosResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVER)
    }
}

impl AddressResolver for AtosResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Vec<String>, ResolveError> {
        // Each call gets its own file so concurrent libraries never collide
        let mut address_file = NamedTempFile::new()?;
        for address in request.addresses {
            writeln!(address_file, "{address}")?;
        }
        address_file.flush()?;

        debug!(
            "{} -arch {SUPPORTED_ARCH} -o {} -l {} -f {} ({} addresses)",
            self.program,
            request.artifact.display(),
            request.load_address,
            address_file.path().display(),
            request.addresses.len()
        );

        let output = Command::new(&self.program)
            .arg("-arch")
            .arg(SUPPORTED_ARCH)
            .arg("-o")
            .arg(request.artifact)
            .arg("-l")
            .arg(request.load_address)
            .arg("-f")
            .arg(address_file.path())
            .output()
            .map_err(|source| ResolveError::Spawn { program: self.program.clone(), source })?;

        if !output.status.success() {
            return Err(ResolveError::Failed {
                library: request.library.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
