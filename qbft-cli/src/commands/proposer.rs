//! `proposer` command handler

use anyhow::Result;
use colored::Colorize;
use qbft_consensus::{Config, ProposerPolicy, ProposerPolicyId, ValidatorSet};
use qbft_types::{Address, ValidatorSortBy};

pub fn handle(
    config: &Config,
    validators: Vec<Address>,
    last: Address,
    rounds: u64,
    policy: Option<ProposerPolicyId>,
    sort_by: ValidatorSortBy,
) -> Result<()> {
    let members = if validators.is_empty() {
        config.validators.clone()
    } else {
        validators
    };
    if members.is_empty() {
        anyhow::bail!("no validators given and none configured; pass --validators");
    }

    let id = policy.unwrap_or_else(|| config.proposer_policy.id());
    let set = ValidatorSet::new(members, ProposerPolicy::with_sort_by(id, sort_by));

    println!(
        "{} {} validator(s), policy {:?}, order {:?}",
        "→".cyan().bold(),
        set.size(),
        id,
        sort_by
    );
    if last.is_zero() {
        println!("  Last proposer: {}", "none (genesis)".dimmed());
    } else if set.contains(&last) {
        println!("  Last proposer: {}", last.to_string().cyan());
    } else {
        println!(
            "  Last proposer: {} {}",
            last.to_string().yellow(),
            "(not a member, rotation starts at index 0)".yellow()
        );
    }
    println!();
    println!("  {:<8} {}", "ROUND".bold(), "PROPOSER".bold());
    println!("  {}", "-".repeat(52));

    for (round, proposer) in set.proposer_schedule(last, rounds).into_iter().enumerate() {
        println!("  {:<8} {}", round, proposer.to_string().cyan());
    }

    Ok(())
}
