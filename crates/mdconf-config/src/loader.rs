//! One-call loading of a server configuration.
//!
//! 1. Read and parse the configuration text
//! 2. Dispatch every directive into a fresh [`ConfigPass`]
//! 3. Derive global values and merge virtual hosts onto the main server
//! 4. Return the [`ResolvedConfig`]

use std::path::Path;

use tracing::debug;

use crate::commands::Dispatcher;
use crate::error::ConfigResult;
use crate::pass::ConfigPass;
use crate::show::ResolvedConfig;
use crate::text;

/// Load and resolve the configuration file at `path`.
///
/// `state_dir` is the server's state directory; the default store lives
/// below it.
///
/// # Errors
///
/// Returns a [`crate::ConfigError`] if the file cannot be read or parsed, or
/// if any directive is rejected.
pub fn load(path: &Path, state_dir: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let tree = text::parse_file(path)?;
    let mut resolved = resolve(&tree, state_dir)?;
    resolved.loaded_files.push(path.display().to_string());
    Ok(resolved)
}

/// Resolve configuration text; `file` names it in error messages.
///
/// # Errors
///
/// Returns a [`crate::ConfigError`] if the text is malformed or any directive
/// is rejected.
pub fn load_str(source: &str, file: &str, state_dir: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let tree = text::parse_str(source, file)?;
    resolve(&tree, state_dir)
}

fn resolve(tree: &[crate::directive::Directive], state_dir: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let mut pass = ConfigPass::new();
    debug!(pass = %pass.id(), directives = tree.len(), "starting configuration pass");
    Dispatcher::new(&mut pass).run(tree)?;
    Ok(pass.finish(state_dir))
}
