//! `resolve` command handler

use anyhow::Result;
use colored::Colorize;
use qbft_consensus::Config;

pub fn handle(config: &Config, height: u64, json: bool) -> Result<()> {
    let resolved = config.get_config(height);
    let applied = config.transitions_at(height).len();

    println!(
        "{} Parameters at block {} ({} of {} transitions applied)",
        "→".cyan().bold(),
        height.to_string().cyan(),
        applied,
        config.transitions.len()
    );
    println!(
        "  Validator source: {:?}",
        config.get_validator_selection_mode(height)
    );
    println!("  Quorum model:     {:?}", config.quorum_model(height));

    let pinned = config.get_validators_at(height);
    if pinned.is_empty() {
        println!("  Validators:       {}", "from previous header".dimmed());
    } else {
        println!("  Validators:       {} pinned", pinned.len());
        for address in pinned {
            println!("    {}", address.to_string().cyan());
        }
    }
    println!();

    // Transitions are already folded in.
    let mut flattened = resolved;
    flattened.transitions.clear();
    let body = if json {
        serde_json::to_string_pretty(&flattened)?
    } else {
        flattened.to_toml_string()?
    };
    println!("{}", body);

    Ok(())
}
