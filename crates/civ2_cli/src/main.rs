use std::fs;
use std::path::PathBuf;
use std::process;

use civ2_core::civ;
use civ2_core::core_api::{CityEntry, Session, TransferReport, UnitScope};
use clap::{Parser, ValueEnum};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// Units standing on the city tile, plus home-based units at sea.
    Inside,
    /// Units whose home city is the transferred city.
    Owned,
}

#[derive(Debug, Parser)]
#[command(version, about = "Editor for Civilization II (MGE) save files")]
struct Cli {
    #[arg(value_name = "SAVE.SAV")]
    path: PathBuf,
    #[arg(long = "player-civ")]
    player_civ: bool,
    #[arg(long)]
    difficulty: bool,
    #[arg(long = "barbarian-level")]
    barbarian_level: bool,
    #[arg(long = "active-civs")]
    active_civs: bool,
    #[arg(long = "map-size")]
    map_size: bool,
    #[arg(long)]
    units: bool,
    #[arg(long)]
    cities: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-barbarian-level", value_name = "0-3")]
    set_barbarian_level: Option<u8>,
    #[arg(long = "set-difficulty", value_name = "0-5")]
    set_difficulty: Option<u8>,
    #[arg(
        long = "set-active-civs",
        value_name = "HEX-MASK",
        value_parser = parse_hex_mask
    )]
    set_active_civs: Option<u8>,
    #[arg(long = "activate-civ", value_name = "CIV")]
    activate_civ: Option<u8>,
    #[arg(
        long = "transfer-city",
        value_name = "NAME",
        requires = "new_owner",
        conflicts_with = "transfer_continent"
    )]
    transfer_city: Option<String>,
    #[arg(long = "transfer-continent", value_name = "NAME", requires = "new_owner")]
    transfer_continent: Option<String>,
    #[arg(long = "new-owner", value_name = "CIV")]
    new_owner: Option<u8>,
    #[arg(long, value_enum, requires = "transfer_city")]
    scope: Option<ScopeArg>,
    #[arg(long = "copy-visibility", value_name = "FROM-CIV", requires = "to_civ")]
    copy_visibility: Option<u8>,
    #[arg(long = "to-civ", value_name = "TO-CIV", requires = "copy_visibility")]
    to_civ: Option<u8>,
    #[arg(long = "clear-visibility", value_name = "CIV")]
    clear_visibility: Option<u8>,
    #[arg(long = "fill-visibility", value_name = "CIV")]
    fill_visibility: Option<u8>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy)]
struct FieldSelection {
    player_civ: bool,
    difficulty: bool,
    barbarian_level: bool,
    active_civs: bool,
    map_size: bool,
    units: bool,
    cities: bool,
}

impl FieldSelection {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            player_civ: cli.player_civ,
            difficulty: cli.difficulty,
            barbarian_level: cli.barbarian_level,
            active_civs: cli.active_civs,
            map_size: cli.map_size,
            units: cli.units,
            cities: cli.cities,
        }
    }

    fn is_field_mode(&self) -> bool {
        self.player_civ
            || self.difficulty
            || self.barbarian_level
            || self.active_civs
            || self.map_size
            || self.units
            || self.cities
    }

    fn selected_pairs(&self, session: &Session) -> Vec<(&'static str, String)> {
        let snapshot = session.snapshot();
        let mut out = Vec::new();

        if self.player_civ {
            out.push((
                "player_civ",
                format!("{}-{}", snapshot.player_civ, snapshot.player_civ_color),
            ));
        }
        if self.difficulty {
            out.push(("difficulty", snapshot.difficulty.to_string()));
        }
        if self.barbarian_level {
            out.push(("barbarian_level", snapshot.barbarian_level.to_string()));
        }
        if self.active_civs {
            out.push(("active_civs", format!("0x{:02x}", snapshot.active_civ_mask)));
        }
        if self.map_size {
            out.push((
                "map_size",
                format!(
                    "{}x{} ({} cells)",
                    snapshot.map_width, snapshot.map_height, snapshot.map_cells
                ),
            ));
        }
        if self.units {
            out.push(("units", snapshot.unit_count.to_string()));
        }
        if self.cities {
            for city in session.cities() {
                out.push(("city", format_city(&city)));
            }
        }

        out
    }

    fn selected_json(&self, session: &Session) -> JsonMap<String, JsonValue> {
        let snapshot = session.snapshot();
        let mut out = JsonMap::new();

        if self.player_civ {
            out.insert("player_civ".to_string(), JsonValue::from(snapshot.player_civ));
            out.insert(
                "player_civ_color".to_string(),
                JsonValue::String(snapshot.player_civ_color.clone()),
            );
        }
        if self.difficulty {
            out.insert("difficulty".to_string(), JsonValue::from(snapshot.difficulty));
        }
        if self.barbarian_level {
            out.insert(
                "barbarian_level".to_string(),
                JsonValue::from(snapshot.barbarian_level),
            );
        }
        if self.active_civs {
            out.insert(
                "active_civs".to_string(),
                JsonValue::from(snapshot.active_civ_mask),
            );
        }
        if self.map_size {
            out.insert("map_width".to_string(), JsonValue::from(snapshot.map_width));
            out.insert("map_height".to_string(), JsonValue::from(snapshot.map_height));
            out.insert("map_cells".to_string(), JsonValue::from(snapshot.map_cells));
        }
        if self.units {
            out.insert("units".to_string(), JsonValue::from(snapshot.unit_count));
        }
        if self.cities {
            out.insert("cities".to_string(), cities_to_json(session));
        }

        out
    }
}

fn main() {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "warn");
    env_logger::init_from_env(env);

    let cli = Cli::parse();
    let fields = FieldSelection::from_cli(&cli);

    let has_edits = cli.set_barbarian_level.is_some()
        || cli.set_difficulty.is_some()
        || cli.set_active_civs.is_some()
        || cli.activate_civ.is_some()
        || cli.transfer_city.is_some()
        || cli.transfer_continent.is_some()
        || cli.copy_visibility.is_some()
        || cli.clear_visibility.is_some()
        || cli.fill_visibility.is_some();

    if has_edits && cli.output.is_none() {
        eprintln!("edit flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let mut session = Session::open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error loading save file {}: {e}", cli.path.display());
        process::exit(1);
    });

    if let Some(level) = cli.set_barbarian_level {
        session.set_barbarian_level(level).unwrap_or_else(|e| {
            eprintln!("Error setting barbarian level: {e}");
            process::exit(1);
        });
    }
    if let Some(level) = cli.set_difficulty {
        session.set_difficulty(level).unwrap_or_else(|e| {
            eprintln!("Error setting difficulty level: {e}");
            process::exit(1);
        });
    }
    if let Some(mask) = cli.set_active_civs {
        session.set_active_civ_mask(mask);
    }
    if let Some(civ_num) = cli.activate_civ {
        session.activate_civ(civ_num).unwrap_or_else(|e| {
            eprintln!("Error activating civ: {e}");
            process::exit(1);
        });
    }
    if let Some(ref name) = cli.transfer_city {
        let new_owner = cli.new_owner.expect("enforced by clap");
        let scope = match cli.scope.unwrap_or(ScopeArg::Inside) {
            ScopeArg::Inside => UnitScope::Inside,
            ScopeArg::Owned => UnitScope::Owned,
        };
        let report = session
            .transfer_city(name, new_owner, scope)
            .unwrap_or_else(|e| {
                eprintln!("Error transferring city: {e}");
                process::exit(1);
            });
        print_report(name, new_owner, &report);
    }
    if let Some(ref name) = cli.transfer_continent {
        let new_owner = cli.new_owner.expect("enforced by clap");
        let report = session
            .transfer_continent(name, new_owner)
            .unwrap_or_else(|e| {
                eprintln!("Error transferring continent: {e}");
                process::exit(1);
            });
        print_report(name, new_owner, &report);
    }
    if let Some(from) = cli.copy_visibility {
        let to = cli.to_civ.expect("enforced by clap");
        session.copy_visibility(to, from).unwrap_or_else(|e| {
            eprintln!("Error copying visibility map: {e}");
            process::exit(1);
        });
    }
    if let Some(civ_num) = cli.clear_visibility {
        session.clear_visibility(civ_num).unwrap_or_else(|e| {
            eprintln!("Error clearing visibility map: {e}");
            process::exit(1);
        });
    }
    if let Some(civ_num) = cli.fill_visibility {
        session.fill_visibility(civ_num).unwrap_or_else(|e| {
            eprintln!("Error filling visibility map: {e}");
            process::exit(1);
        });
    }

    if has_edits {
        let out_path = cli.output.as_ref().expect("checked above");
        fs::write(out_path, session.to_bytes()).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        println!("Wrote edited save to {}", out_path.display());
    }

    if cli.json {
        let json = if fields.is_field_mode() {
            JsonValue::Object(fields.selected_json(&session))
        } else {
            default_json(&session)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_field_mode() {
        for (key, value) in fields.selected_pairs(&session) {
            println!("{key}={value}");
        }
        return;
    }

    if !has_edits {
        print_summary(&cli.path, &session);
    }
}

fn print_report(name: &str, new_owner: u8, report: &TransferReport) {
    println!(
        "{} transferred to {}-{}: {} cities, {} units, {} map cells",
        name,
        new_owner,
        civ::color_name(new_owner),
        report.cities_reassigned,
        report.units_reassigned,
        report.cells_claimed,
    );
}

fn print_summary(path: &std::path::Path, session: &Session) {
    let snapshot = session.snapshot();

    println!("Save file: {}", path.display());
    println!(
        "Player civilization: {}-{}",
        snapshot.player_civ, snapshot.player_civ_color
    );
    println!("Difficulty level:    {}", snapshot.difficulty);
    println!("Barbarian level:     {}", snapshot.barbarian_level);
    println!(
        "Active civilizations (mask 0x{:02x}):",
        snapshot.active_civ_mask
    );
    for civ_num in 0..civ::CIV_COUNT {
        if civ::test_bit(snapshot.active_civ_mask, civ_num) {
            println!("  {}-{}", civ_num, civ::color_name(civ_num));
        }
    }
    println!(
        "Map: {}x{} ({} cells)",
        snapshot.map_width, snapshot.map_height, snapshot.map_cells
    );
    println!(
        "Units: {}   Cities: {}",
        snapshot.unit_count, snapshot.city_count
    );
    for city in session.cities() {
        println!("  {}", format_city(&city));
    }
}

fn format_city(city: &CityEntry) -> String {
    format!(
        "{} id={} owner={}-{} at ({},{})",
        city.name,
        city.id,
        city.owner,
        civ::color_name(city.owner),
        city.x,
        city.y
    )
}

fn cities_to_json(session: &Session) -> JsonValue {
    serde_json::to_value(session.cities()).unwrap_or(JsonValue::Null)
}

fn default_json(session: &Session) -> JsonValue {
    let mut out = JsonMap::new();
    let snapshot = session.snapshot();

    out.insert(
        "snapshot".to_string(),
        serde_json::to_value(&snapshot).unwrap_or(JsonValue::Null),
    );
    out.insert("cities".to_string(), cities_to_json(session));

    JsonValue::Object(out)
}

fn parse_hex_mask(value: &str) -> Result<u8, String> {
    let digits = value
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u8::from_str_radix(digits, 16)
        .map_err(|_| format!("invalid hex mask '{value}', expected 00-ff"))
}
