use std::collections::HashSet;

use crate::config::project_config::ProjectConfig;
use crate::core::errors::{Result, TivorError};
use crate::core::models::environment::EffectiveEnvironment;

/// Resolves environment inheritance (dev -> staging -> production).
///
/// Walks the `inherits` chain of the requested environment, then folds the
/// chain from root to leaf: variable files accumulate in order and the
/// nearest declared backend wins. Project defaults form the lowest-priority
/// prefix of the file list.
pub struct EnvResolver;

impl EnvResolver {
    /// Resolve the effective settings for `name`.
    ///
    /// # Errors
    ///
    /// - `EnvironmentNotFound` if `name` is not defined.
    /// - `MissingParent` if an `inherits` points nowhere.
    /// - `CircularInheritance` if the chain contains a cycle.
    pub fn resolve(&self, config: &ProjectConfig, name: &str) -> Result<EffectiveEnvironment> {
        let chain = self.build_chain(name, config)?;

        let mut vars_files = Vec::new();
        let mut seen = HashSet::new();
        let defaults = config
            .defaults
            .as_ref()
            .map(|d| d.vars_files.as_slice())
            .unwrap_or_default();
        append_unique(&mut vars_files, &mut seen, defaults);

        let mut backend = None;
        for layer in &chain {
            let def = config
                .environment(layer)
                .ok_or_else(|| TivorError::EnvironmentNotFound {
                    name: layer.clone(),
                    available: config.environment_names(),
                })?;
            append_unique(&mut vars_files, &mut seen, &def.vars_files);
            // Walking root -> leaf, so a later declaration is the nearer one.
            if def.backend.is_some() {
                backend = def.backend.clone();
            }
        }

        tracing::debug!(
            environment = name,
            chain = %chain.join(" -> "),
            files = vars_files.len(),
            "environment resolved"
        );

        Ok(EffectiveEnvironment {
            name: name.to_string(),
            chain,
            vars_files,
            backend,
        })
    }

    /// Build the ordered inheritance chain from root to the target env.
    ///
    /// For `production` inheriting `staging` inheriting `dev`, returns
    /// `["dev", "staging", "production"]`.
    pub fn build_chain(&self, name: &str, config: &ProjectConfig) -> Result<Vec<String>> {
        let mut chain: Vec<String> = Vec::new();
        let mut visited = HashSet::new();
        let mut current = name.to_string();

        // Walk upward collecting ancestors
        loop {
            if visited.contains(&current) {
                chain.push(current);
                return Err(TivorError::CircularInheritance {
                    chain: chain.join(" -> "),
                });
            }

            let entry = match config.environment(&current) {
                Some(entry) => entry,
                None => {
                    return Err(match chain.last() {
                        Some(child) => TivorError::MissingParent {
                            env: child.clone(),
                            parent: current,
                        },
                        None => TivorError::EnvironmentNotFound {
                            name: current,
                            available: config.environment_names(),
                        },
                    });
                }
            };

            visited.insert(current.clone());
            chain.push(current);

            match &entry.inherits {
                Some(parent) => current = parent.clone(),
                None => break,
            }
        }

        // Reverse so root is first, leaf is last
        chain.reverse();
        Ok(chain)
    }
}

/// Append `paths` that have not been seen yet, keeping first-seen order.
fn append_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, paths: &[String]) {
    for path in paths {
        if seen.insert(path.clone()) {
            out.push(path.clone());
        }
    }
}
