use std::path::Path;

use fhirplan_core::EnvConfig;
use fhirplan_stack::FhirServerStack;

pub fn run(config_path: &str, out: Option<&str>) -> anyhow::Result<()> {
    let config = EnvConfig::from_file(Path::new(config_path))?;
    let plan = FhirServerStack::synthesize(&config)?;
    let json = plan.to_json_pretty()?;

    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!(
                "✓ Wrote {} ({} resources, {} alarms)",
                path,
                plan.resource_count(),
                plan.alarms().len()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
