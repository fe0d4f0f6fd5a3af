use std::path::Path;

use fhirplan_core::EnvConfig;
use fhirplan_stack::FhirServerStack;

/// Load the configuration and run a full dry synthesis. Any error aborts
/// with a non-zero exit through the anyhow chain.
pub fn run(config_path: &str) -> anyhow::Result<()> {
    let config = EnvConfig::from_file(Path::new(config_path))?;
    let capacity = config.capacity()?;
    let plan = FhirServerStack::synthesize(&config)?;

    println!("✓ {} is valid", config_path);
    println!(
        "  tier: {}  db capacity: {}..{}  tasks: {}..{}",
        config.environment.tier.as_str(),
        capacity.db.min,
        capacity.db.max,
        capacity.task_counts.min,
        capacity.task_counts.max,
    );
    println!(
        "  plan: {} resources, {} alarms, {} outputs",
        plan.resource_count(),
        plan.alarms().len(),
        plan.outputs.len()
    );
    Ok(())
}
