use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use detour_defence_core::Rules;
use tracing_subscriber::EnvFilter;

/// Installs the global log subscriber, writing to stderr.
pub(crate) fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

/// Reads rules from `path`, or the defaults when no file is given.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    parse_rules(&contents).with_context(|| format!("invalid rules in {}", path.display()))
}

fn parse_rules(contents: &str) -> Result<Rules> {
    let rules: Rules = toml::from_str(contents).context("failed to parse rules TOML")?;
    if rules.grid.side < 2 {
        bail!("grid side must be at least 2, got {}", rules.grid.side);
    }
    let floor = -(rules.grid.warp_min_skip as f32 * rules.grid.base_weight);
    if rules.grid.warp_weight <= floor {
        bail!(
            "warp weight {} must stay above {floor} to keep routes free of negative cycles",
            rules.grid.warp_weight
        );
    }
    Ok(rules)
}
