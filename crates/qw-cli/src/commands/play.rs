use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use qw_core::{Stat, is_coordinate};
use qw_engine::{ChoiceResult, Mutation, Scene, Session, SessionConfig};

const HELP: &str = "  <number>        pick an option
  <location>      travel to a coordinate (e.g. B2) or named location
  tags            show held tags
  stats           show stats and progression
  vars            show quest variables
  journal         show journal entries
  spend STAT N    spend unspent stat points
  quit            leave";

pub fn run(path: &Path, seed: u64) -> Result<(), String> {
    let content = Arc::new(super::load(path)?);
    let mut session = Session::new(content, SessionConfig::default().with_seed(seed));

    println!("  {} '{}'", "Playing".bold(), path.display());
    println!("  Seed: {seed}. Type 'help' for commands, 'quit' to exit.\n");

    match session.start().map_err(|e| e.to_string())? {
        Some(scene) => print_scene(&scene),
        None => println!("  Nothing happens here.\n"),
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            println!("Goodbye!");
            break;
        }

        if let Err(message) = handle(&mut session, input) {
            println!("{}\n", message.yellow());
        }
    }

    Ok(())
}

fn handle(session: &mut Session, input: &str) -> Result<(), String> {
    let mut words = input.split_whitespace();
    let command = words.next().unwrap_or_default();

    if let Ok(number) = command.parse::<usize>() {
        let index = number.checked_sub(1).ok_or("options are numbered from 1")?;
        let result = session.choose(index).map_err(|e| e.to_string())?;
        print_choice(&result);
        return Ok(());
    }

    match command.to_lowercase().as_str() {
        "help" | "h" | "?" => println!("{HELP}\n"),
        "tags" => {
            let tags = &session.player().tags;
            if tags.is_empty() {
                println!("  (no tags)\n");
            } else {
                println!("  {tags}\n");
            }
        }
        "stats" => {
            let player = session.player();
            let config = &session.content().config;
            for stat in Stat::ALL {
                println!(
                    "  {:<8} {}",
                    stat.name(),
                    player.effective_stat(stat, config)
                );
            }
            println!(
                "  steps {}, experience {}, unspent points {}\n",
                player.steps_completed, player.experience, player.unspent_points
            );
        }
        "vars" => {
            if session.vars().is_empty() {
                println!("  (no variables)\n");
            }
            for (name, value) in session.vars().iter() {
                println!("  {name} = {value}");
            }
        }
        "journal" => {
            for entry in session.journal() {
                println!("  - {entry}");
            }
            println!();
        }
        "spend" => {
            let stat = words
                .next()
                .and_then(Stat::parse)
                .ok_or("usage: spend STAT N")?;
            let points = words
                .next()
                .and_then(|n| n.parse().ok())
                .ok_or("usage: spend STAT N")?;
            session.allocate(stat, points).map_err(|e| e.to_string())?;
            println!("  {stat} is now {}\n", session.player().stats.get(stat));
        }
        _ => {
            let id = session.content().resolve_location(input).to_string();
            if !is_coordinate(&id) {
                return Err(format!("unknown command: \"{input}\""));
            }
            match session.enter(&id) {
                Some(scene) => print_scene(&scene),
                None => println!("  Nothing happens here.\n"),
            }
        }
    }
    Ok(())
}

fn print_choice(result: &ChoiceResult) {
    print_mutations(&result.mutations);
    if let Some(check) = &result.check {
        let verdict = if check.success {
            "success".green()
        } else {
            "failure".red()
        };
        println!("  {check} ({verdict})");
    }
    match (&result.target, &result.scene) {
        (_, Some(scene)) => print_scene(scene),
        (Some(target), None) => println!("  Nothing happens at {target}.\n"),
        (None, None) => println!(),
    }
}

fn print_scene(scene: &Scene) {
    let title = scene.display_name.as_deref().unwrap_or(&scene.location);
    println!("{}", format!("== {title} ==").bold());
    if !scene.text.is_empty() {
        println!("{}", scene.text);
    }
    print_mutations(&scene.mutations);
    for option in &scene.options {
        let check = option
            .dc
            .map(|dc| format!(" [{} DC {dc}]", option.skill.join("+")))
            .unwrap_or_default();
        let line = format!("  {}. {}{check}", option.index + 1, option.label);
        if option.enabled {
            println!("{line}");
        } else {
            println!("{}", format!("{line} (unavailable)").dimmed());
        }
    }
    println!();
}

fn print_mutations(mutations: &[Mutation]) {
    for mutation in mutations {
        match mutation {
            Mutation::Granted(tag) => println!("  {}", format!("+ {tag}").green()),
            Mutation::Consumed(tag) => println!("  {}", format!("- {tag}").red()),
            Mutation::Missing(tag) => println!("  {}", format!("(no {tag} to lose)").dimmed()),
        }
    }
}
