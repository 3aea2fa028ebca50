//! `quorum` command handler

use anyhow::Result;
use colored::Colorize;
use qbft_consensus::{max_faulty, Config};

pub fn handle(config: &Config, height: u64, size: Option<usize>) -> Result<()> {
    let n = match size {
        Some(n) => n,
        None => config.get_config(height).validators.len(),
    };
    if n == 0 {
        anyhow::bail!("no validators configured at block {}; pass --size", height);
    }

    let model = config.quorum_model(height);
    println!("{} Quorum at block {}", "→".cyan().bold(), height.to_string().cyan());
    println!("  Validators: {}", n);
    println!("  Faulty (F): {}", max_faulty(n));
    println!("  Model:      {:?}", model);
    println!("  Quorum:     {}", model.size(n).to_string().green().bold());

    Ok(())
}
