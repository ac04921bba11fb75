use std::path::Path;

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use qw_core::Stat;
use qw_engine::{BonusKind, PlayerState, resolve_check};

pub fn run(
    path: &Path,
    skill: &[String],
    dc: i64,
    tags: &[String],
    stats: &[String],
    seed: Option<u64>,
) -> Result<(), String> {
    let content = super::load(path)?;
    let config = &content.config;

    let mut player = PlayerState::new(config).with_tags(tags.iter().cloned());
    for spec in stats {
        let (stat, value) = parse_stat(spec)?;
        player = player.with_stat(stat, value);
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let sources: Vec<&str> = skill.iter().map(String::as_str).collect();
    let outcome = resolve_check(&sources, dc, &player, config, &mut rng);

    println!("  {} {} against DC {dc}", "Rolling".bold(), outcome.die);
    println!("  roll: {}", outcome.roll);
    for bonus in &outcome.bonuses {
        let detail = match bonus.kind {
            BonusKind::Stat { .. } => "stat".to_string(),
            BonusKind::Tag { count } => format!("{count} × {}", config.tag_bonus),
        };
        println!("  {:<12} {:+} ({detail})", bonus.source, bonus.value);
    }
    let verdict = if outcome.success {
        "SUCCESS".green().bold()
    } else {
        "FAILURE".red().bold()
    };
    println!("  total: {} -> {verdict}", outcome.total);

    Ok(())
}

/// Parse `might=3`.
fn parse_stat(spec: &str) -> Result<(Stat, i64), String> {
    let (name, value) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected STAT=VALUE, got \"{spec}\""))?;
    let stat = Stat::parse(name).ok_or_else(|| format!("unknown stat: \"{name}\""))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid stat value: \"{value}\""))?;
    Ok((stat, value))
}
