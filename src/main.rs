use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish::combat::{Animation, CombatEvent, CombatSink};
use skirmish::core::stats::{EntityId, Position};
use skirmish::progression::FileProgressStore;
use skirmish::session::GameSession;
use skirmish::spawn::LevelScaledSpawner;
use std::collections::HashMap;
use std::io;
use tracing::trace;
use tracing_subscriber::EnvFilter;

/// Forwards visual updates to the trace log.
struct TraceSink;

impl CombatSink for TraceSink {
    fn play_animation(&mut self, entity: EntityId, animation: Animation) {
        trace!(%entity, animation = animation.name(), "animation");
    }

    fn update_position(&mut self, entity: EntityId, position: Position) {
        trace!(%entity, x = position.x, z = position.z, "position");
    }

    fn update_health(&mut self, entity: EntityId, current: u32, max: u32) {
        trace!(%entity, current, max, "health");
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("run");

    match command {
        "run" => run(&args[2.min(args.len())..]),
        "shop" => shop(),
        "buy" => match args.get(2) {
            Some(id) => buy(id),
            None => {
                eprintln!("Usage: skirmish buy <upgrade-id>");
                std::process::exit(1);
            }
        },
        "progress" => progress(args.iter().any(|a| a == "--json")),
        "loadout" => loadout(),
        "equip-skill" | "equip-passive" | "equip-gear" | "unequip-skill" | "unequip-passive"
        | "level-passive" => edit_loadout(command, &args[2.min(args.len())..]),
        "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'skirmish --help' for usage.");
            std::process::exit(1);
        }
    }
}

fn load_session<S: CombatSink>() -> io::Result<GameSession<S>> {
    let store = FileProgressStore::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(GameSession::load("Hero".to_string(), Box::new(store)))
}

fn run(args: &[String]) -> io::Result<()> {
    let mut seed = None;
    let mut max_waves = 10;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-w" | "--waves" => {
                if i + 1 < args.len() {
                    max_waves = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut session: GameSession<TraceSink> = load_session()?;
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut clock = Utc::now().timestamp_millis().max(0) as u64;
    let step = session.config().round_duration_ms + 1;

    let difficulty = session.start_run(clock).difficulty;
    let mut spawner = LevelScaledSpawner::new(ChaCha8Rng::seed_from_u64(rng.gen()), difficulty);
    println!("Run started (difficulty {:.2})", difficulty);

    while let Some(wave) = session.get_current_run().map(|run| run.wave) {
        if wave > max_waves {
            session.complete_run(clock);
            break;
        }
        if !session.begin_wave(&mut spawner, TraceSink, clock) {
            break;
        }
        let names: HashMap<EntityId, String> = session
            .engine()
            .map(|engine| {
                engine
                    .roster()
                    .iter()
                    .map(|e| (e.id, e.name.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let enemies: Vec<&str> = session
            .engine()
            .map(|engine| engine.enemies().iter().map(|e| e.name.as_str()).collect())
            .unwrap_or_default();
        println!("\n── Wave {} ── {}", wave, enemies.join(", "));

        while session.in_combat() {
            clock += step;
            for event in session.update(clock, &mut rng) {
                print_event(&names, &event);
            }
        }
    }

    if let Some(run) = session.last_run() {
        println!();
        println!("Run over: {:?}", run.result);
        println!("  Waves reached:     {}", run.wave);
        println!("  Enemies defeated:  {}", run.enemies_defeated);
        println!("  Damage dealt:      {}", run.damage_dealt);
        println!("  Damage taken:      {}", run.damage_taken);
        println!("  Resources gained:  {}", run.resources_gained);
    }
    println!("Resources: {}", session.get_progress().resources);
    Ok(())
}

fn print_event(names: &HashMap<EntityId, String>, event: &CombatEvent) {
    let name = |id: &EntityId| names.get(id).cloned().unwrap_or_else(|| id.to_string());

    match event {
        CombatEvent::SkillUsed { source, skill_id } => {
            println!("  {} uses {}", name(source), skill_id);
        }
        CombatEvent::DamageDealt {
            source,
            target,
            amount,
            kind,
        } => {
            println!(
                "  {} hits {} for {} ({:?})",
                name(source),
                name(target),
                amount,
                kind
            );
        }
        CombatEvent::Healed { target, amount } => {
            println!("  {} heals {}", name(target), amount);
        }
        CombatEvent::PassiveTriggered { passive_id, .. } => {
            println!("  [{}]", passive_id);
        }
        CombatEvent::EntityDefeated { entity, .. } => {
            println!("  {} is defeated", name(entity));
        }
        CombatEvent::Victory { experience_gained } => {
            println!("Victory! +{} XP", experience_gained);
        }
        CombatEvent::Defeat => println!("Defeat..."),
        _ => {}
    }
}

fn shop() -> io::Result<()> {
    let session: GameSession = load_session()?;
    let progress = session.get_progress();
    println!("Resources: {}\n", progress.resources);
    println!("  {:<16} {:<20} {:>7} {:>8}", "ID", "UPGRADE", "LEVEL", "COST");
    for upgrade in progress.sorted_upgrades() {
        let cost = if upgrade.is_maxed() {
            "MAX".to_string()
        } else {
            upgrade.cost.to_string()
        };
        println!(
            "  {:<16} {:<20} {:>3}/{:<3} {:>8}",
            upgrade.id, upgrade.name, upgrade.level, upgrade.max_level, cost
        );
    }
    Ok(())
}

fn buy(id: &str) -> io::Result<()> {
    let mut session: GameSession = load_session()?;
    if session.purchase_upgrade(id) {
        let level = session
            .get_progress()
            .meta_upgrades
            .get(id)
            .map_or(0, |u| u.level);
        println!("Purchased {} (now level {})", id, level);
    } else {
        println!("Could not purchase {}", id);
    }
    println!("Resources: {}", session.get_progress().resources);
    Ok(())
}

fn progress(json: bool) -> io::Result<()> {
    let session: GameSession = load_session()?;
    let progress = session.get_progress();
    if json {
        let out = progress
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        println!("{}", out);
        return Ok(());
    }

    let stats = &progress.statistics;
    println!("Total runs:        {}", progress.total_runs);
    println!("Resources:         {}", progress.resources);
    println!("Enemies defeated:  {}", stats.total_enemies_defeated);
    println!("Damage dealt:      {}", stats.total_damage_dealt);
    println!("Damage taken:      {}", stats.total_damage_taken);
    println!("Play time:         {}s", stats.total_play_time);
    if let Some(best) = &progress.best_run {
        println!(
            "Best run:          wave {} ({} resources)",
            best.wave, best.resources_gained
        );
    }
    let mut unlocked: Vec<&String> = progress.unlocked_content.iter().collect();
    unlocked.sort();
    println!(
        "Unlocked:          {}",
        unlocked
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn loadout() -> io::Result<()> {
    let session: GameSession = load_session()?;
    print_loadout(&session);
    Ok(())
}

fn print_loadout(session: &GameSession) {
    let loadout = session.get_loadout();
    println!("Skills:");
    for (slot, id) in loadout.skills.iter().enumerate() {
        println!("  {}: {}", slot, id.as_deref().unwrap_or("-"));
    }
    println!("Passives:");
    for (slot, id) in loadout.passives.iter().enumerate() {
        match id {
            Some(id) => println!(
                "  {}: {} (level {})",
                slot,
                id,
                loadout.passive_levels.get(id).copied().unwrap_or(1)
            ),
            None => println!("  {}: -", slot),
        }
    }
    println!("Gear:");
    for (slot, id) in &loadout.gear {
        println!("  {:<10} {}", format!("{:?}", slot), id.as_deref().unwrap_or("-"));
    }
}

fn edit_loadout(command: &str, args: &[String]) -> io::Result<()> {
    let mut session: GameSession = load_session()?;
    let id = args.first().map(String::as_str);
    let slot_at = |i: usize| args.get(i).and_then(|s| s.parse::<usize>().ok());

    let changed = match (command, id) {
        ("equip-skill", Some(id)) => slot_at(1).is_some_and(|slot| session.equip_skill(id, slot)),
        ("equip-passive", Some(id)) => {
            slot_at(1).is_some_and(|slot| session.equip_passive(id, slot))
        }
        ("equip-gear", Some(id)) => session.equip_gear(id),
        ("level-passive", Some(id)) => session.level_up_passive(id),
        ("unequip-skill", _) => slot_at(0).is_some_and(|slot| session.unequip_skill(slot)),
        ("unequip-passive", _) => slot_at(0).is_some_and(|slot| session.unequip_passive(slot)),
        _ => {
            eprintln!("Usage: skirmish {} <id|slot> [slot]", command);
            std::process::exit(1);
        }
    };

    if !changed {
        println!("Could not {} (locked, unknown, bad slot or too expensive)", command);
    }
    print_loadout(&session);
    println!("Resources: {}", session.get_progress().resources);
    Ok(())
}

fn print_help() {
    println!("Skirmish - auto-battler\n");
    println!("Usage: skirmish [command]\n");
    println!("Commands:");
    println!("  run [-s SEED] [-w WAVES]   Fight a run (default)");
    println!("  shop                       List meta-upgrades");
    println!("  buy <id>                   Buy one level of an upgrade");
    println!("  progress [--json]          Show lifetime progress");
    println!("  loadout                    Show equipped skills, passives and gear");
    println!("  equip-skill <id> <slot>    Equip an unlocked skill");
    println!("  equip-passive <id> <slot>  Equip an unlocked passive");
    println!("  equip-gear <item>          Equip an item into its slot");
    println!("  unequip-skill <slot>       Clear a skill slot");
    println!("  unequip-passive <slot>     Clear a passive slot");
    println!("  level-passive <id>         Pay to raise a passive's level");
    println!("  --help                     Show this help message");
}
