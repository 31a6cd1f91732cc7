//! Config command implementation.

use anyhow::Result;

use roofpack::PipelineConfig;

/// Print the default configuration as YAML, ready to be edited and passed
/// back with `--config`.
pub fn cmd_config() -> Result<()> {
    let yaml = serde_yaml::to_string(&PipelineConfig::default())?;
    print!("{}", yaml);
    Ok(())
}
