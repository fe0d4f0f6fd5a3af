use std::path::Path;

use fhirplan_core::EnvConfig;
use fhirplan_stack::FhirServerStack;

/// Print the plan's resources in provider-creation order, then the
/// surfaced outputs.
pub fn run(config_path: &str) -> anyhow::Result<()> {
    let config = EnvConfig::from_file(Path::new(config_path))?;
    let plan = FhirServerStack::synthesize(&config)?;

    println!("{} (format v{})", plan.stack_name, plan.format_version);
    for (i, resource) in plan.resources.iter().enumerate() {
        let deps = if resource.depends_on.is_empty() {
            String::new()
        } else {
            format!("  <- {}", resource.depends_on.join(", "))
        };
        println!(
            "{:>3}. [{}] {}{}",
            i + 1,
            resource.spec.kind(),
            resource.id,
            deps
        );
    }

    println!();
    for output in &plan.outputs {
        println!("{} = {}", output.name, output.value);
    }
    Ok(())
}
