//! A small live world to drive the console from the binary and from tests:
//! one player, a list of enemies, and global game settings.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::console::Console;
use crate::error::ConsoleError;
use crate::model::{Color, EnumType, Outcome, Value, ValueType, Vec3, Vec3Int};
use crate::options::OptionsMenu;
use crate::registry::{Candidate, CommandOwner, Declarations, ExecutionPolicy, Registry, Signature};
use crate::settings::ConsoleSettings;

pub const LANGUAGE: EnumType = EnumType::new("Language", &["English", "French", "Spanish"]);
pub const QUALITY: EnumType = EnumType::new("Quality", &["Low", "Medium", "High"]);
pub const DIFFICULTY: EnumType = EnumType::new("Difficulty", &["Easy", "Normal", "Hard"]);

const MAX_HEALTH: i32 = 100;

// ── Player ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub speed: f32,
    pub dead: bool,
    pub spawn_point: Vec3,
    pub health: i32,
    pub position: Vec3,
    pub color: Color,
    pub gold: Vec<(String, i32)>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "Player".into(),
            speed: 5.0,
            dead: false,
            spawn_point: Vec3::default(),
            health: MAX_HEALTH,
            position: Vec3::default(),
            color: Color::WHITE,
            gold: Vec::new(),
        }
    }
}

impl Player {
    pub fn gold_of(&self, who: &str) -> i32 {
        self.gold
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(who))
            .map_or(0, |(_, g)| *g)
    }
}

impl CommandOwner for Player {
    fn owner_name(&self) -> String {
        self.name.clone()
    }

    fn declare(decl: &mut Declarations<Self>) {
        decl.field("speed", ValueType::Float, |p: &Player| p.speed, |p, v| {
            if let Some(speed) = v.as_float() {
                p.speed = speed;
            }
        })
        .command("SetSpeed")
        .describe("Movement speed");
        decl.field("dead", ValueType::Bool, |p: &Player| p.dead, |p, v| {
            if let Some(dead) = v.as_bool() {
                p.dead = dead;
            }
        })
        .command("SetDead");
        decl.field("spawnPoint", ValueType::Vec3, |p: &Player| p.spawn_point, |p, v| {
            if let Some(point) = v.as_vec3() {
                p.spawn_point = point;
            }
        })
        .command("SpawnPoint");
        decl.constant("MAX_HEALTH", ValueType::Int, |_: &Player| MAX_HEALTH)
            .command("MaxHealth");

        decl.property("Health", ValueType::Int, |p: &Player| p.health, |p, v| {
            if let Some(health) = v.as_int() {
                p.health = health.clamp(0, MAX_HEALTH);
            }
        })
        .command("Health")
        .describe("Read or set health");
        decl.read_only("Position", ValueType::Vec3, |p: &Player| p.position)
            .command("Position");

        decl.method(
            "SetPlayerGold",
            Signature::new()
                .param("playerName", ValueType::Str)
                .param("gold", ValueType::Int),
            |p: &mut Player, args| {
                let (Some(who), Some(gold)) = (args.str(0), args.int(1)) else {
                    return Err(ConsoleError::invocation("usage: SetPlayerGold <playerName> <gold>"));
                };
                match p.gold.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(who)) {
                    Some(entry) => entry.1 = gold,
                    None => p.gold.push((who.to_string(), gold)),
                }
                Ok(())
            },
        )
        .describe("Give a player gold");
        decl.method(
            "SetColor",
            Signature::new().param("color", ValueType::Color),
            |p: &mut Player, args| {
                p.color = args.color(0).unwrap_or_default();
                Ok(())
            },
        )
        .policy(ExecutionPolicy::Option);
        decl.method("SetPosition", Signature::new().param("position", ValueType::Vec3), |p: &mut Player, args| {
            p.position = args.vec3(0).unwrap_or_default();
            Ok(())
        })
        .policy(ExecutionPolicy::Option);
        decl.method("SetPositionV2", Signature::new().param("position", ValueType::Vec2), |p: &mut Player, args| {
            let v = args.get(0).and_then(Value::as_vec2).unwrap_or_default();
            p.position = v.into();
            Ok(Value::Vec3(p.position))
        });
        decl.method(
            "SetPositionV3Int",
            Signature::new().param("position", ValueType::Vec3Int),
            |p: &mut Player, args| {
                let v = args.get(0).and_then(Value::as_vec3_int).unwrap_or_default();
                p.position = v.to_float();
                Ok(Value::Vec3(p.position))
            },
        );
        decl.method(
            "SetPositionV2Int",
            Signature::new().param("position", ValueType::Vec2Int),
            |p: &mut Player, args| {
                let v = args.get(0).and_then(Value::as_vec2_int).unwrap_or_default();
                p.position = Vec3Int::new(v.x, v.y, 0).to_float();
                Ok(Value::Vec3(p.position))
            },
        );
    }
}

// ── Enemy ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub position: Vec3,
    pub color: Color,
}

impl Enemy {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            health: MAX_HEALTH,
            position: Vec3::default(),
            color: Color::RED,
        }
    }
}

impl CommandOwner for Enemy {
    fn owner_name(&self) -> String {
        self.name.clone()
    }

    fn declare(decl: &mut Declarations<Self>) {
        decl.field("health", ValueType::Int, |e: &Enemy| e.health, |e, v| {
            if let Some(health) = v.as_int() {
                e.health = health;
            }
        })
        .command("EnemyHealth")
        .policy(ExecutionPolicy::All);
        decl.method("Damage", Signature::new().param("amount", ValueType::Int), |e: &mut Enemy, args| {
            e.health = (e.health - args.int(0).unwrap_or(1)).max(0);
            Ok(())
        })
        .describe("Damage every enemy")
        .policy(ExecutionPolicy::All);
        decl.method("SetColor", Signature::new().param("color", ValueType::Color), |e: &mut Enemy, args| {
            e.color = args.color(0).unwrap_or_default();
            Ok(())
        })
        .policy(ExecutionPolicy::Option);
        decl.method("SetPosition", Signature::new().param("position", ValueType::Vec3), |e: &mut Enemy, args| {
            e.position = args.vec3(0).unwrap_or_default();
            Ok(())
        })
        .policy(ExecutionPolicy::Option);
    }
}

// ── Global game settings ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub language: String,
    pub quality: String,
    pub difficulty: String,
    pub static_int: i32,
    pub static_bool: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            language: "English".into(),
            quality: "Medium".into(),
            difficulty: "Normal".into(),
            static_int: 0,
            static_bool: false,
        }
    }
}

fn language_menu(game: &Arc<RwLock<GameSettings>>) -> OptionsMenu {
    let mut menu = OptionsMenu::new();
    for language in LANGUAGE.variants {
        let game = Arc::clone(game);
        menu.add_option(language, move |log| {
            game.write().language = (*language).to_string();
            log(&format!("Language set to {language}"), true);
        });
    }
    menu
}

fn quality_menu(game: &Arc<RwLock<GameSettings>>) -> OptionsMenu {
    let mut menu = OptionsMenu::new().invalid_message("Unknown quality level");
    for quality in QUALITY.variants {
        let game = Arc::clone(game);
        menu.add_option(quality, move |log| {
            game.write().quality = (*quality).to_string();
            log(&format!("Graphics quality set to {quality}"), true);
        });
    }
    menu
}

// ── World ────────────────────────────────────────────────────────

pub type EnemyList = Arc<RwLock<Vec<Arc<RwLock<Enemy>>>>>;

/// Owns every live object. The console only ever sees weak references.
pub struct DemoWorld {
    pub player: Arc<RwLock<Player>>,
    pub enemies: EnemyList,
    pub game: Arc<RwLock<GameSettings>>,
}

impl Default for DemoWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoWorld {
    pub fn new() -> Self {
        let enemies = ["Goblin", "Orc"]
            .iter()
            .map(|name| Arc::new(RwLock::new(Enemy::new(name))))
            .collect();
        Self {
            player: Arc::new(RwLock::new(Player::default())),
            enemies: Arc::new(RwLock::new(enemies)),
            game: Arc::new(RwLock::new(GameSettings::default())),
        }
    }

    pub fn spawn_enemy(&self, name: &str) {
        self.enemies.write().push(Arc::new(RwLock::new(Enemy::new(name))));
    }

    pub fn enemy(&self, name: &str) -> Option<Arc<RwLock<Enemy>>> {
        self.enemies
            .read()
            .iter()
            .find(|e| e.read().name == name)
            .cloned()
    }

    /// Player first, then enemies in spawn order.
    pub fn owner_source(&self) -> impl Fn() -> Vec<Candidate> + 'static {
        let player = Arc::clone(&self.player);
        let enemies = Arc::clone(&self.enemies);
        move || {
            let mut owners = vec![Candidate::of(&player)];
            owners.extend(enemies.read().iter().map(Candidate::of));
            owners
        }
    }

    pub fn register_globals(&self, registry: &mut Registry) {
        let enemies = Arc::clone(&self.enemies);
        registry.register_globals("Cheats", move |decl| {
            decl.method("KillAllEnemies", Signature::new(), move |_, _| {
                let killed = std::mem::take(&mut *enemies.write());
                tracing::debug!(count = killed.len(), "enemies removed");
                Ok(())
            })
            .describe("Remove every enemy from the world");
            decl.method(
                "AddNumbers",
                Signature::new().rest("numbers", ValueType::Int).returns(ValueType::Int),
                |_, args| {
                    let sum: i32 = args.rest(0).iter().filter_map(Value::as_int).sum();
                    Ok(sum)
                },
            );
            decl.method("StaticMethod", Signature::new(), |_, _| {
                Ok(Outcome::Message("Static method called".into()))
            })
            .unlisted();
        });

        let game = Arc::clone(&self.game);
        registry.register_global_state("GameSettings", Arc::clone(&self.game), move |decl| {
            let menu_game = Arc::clone(&game);
            decl.method("SetLanguage", Signature::new(), move |_, _| Ok(language_menu(&menu_game)))
                .describe("Pick the interface language");
            decl.method("SetGraphics", Signature::new(), move |_, _| Ok(quality_menu(&game)))
                .describe("Pick a graphics quality level");
            decl.read_only("language", ValueType::Enum(LANGUAGE), |g: &GameSettings| {
                Value::Enum(g.language.clone())
            })
            .command("Language");
            decl.field(
                "difficulty",
                ValueType::Enum(DIFFICULTY),
                |g: &GameSettings| Value::Enum(g.difficulty.clone()),
                |g, v| {
                    if let Some(d) = v.as_str() {
                        g.difficulty = d.to_string();
                    }
                },
            )
            .command("Difficulty");
            decl.field("staticIntField", ValueType::Int, |g: &GameSettings| g.static_int, |g, v| {
                if let Some(n) = v.as_int() {
                    g.static_int = n;
                }
            })
            .command("StaticInt");
            decl.property("StaticBool", ValueType::Bool, |g: &GameSettings| g.static_bool, |g, v| {
                if let Some(b) = v.as_bool() {
                    g.static_bool = b;
                }
            });
        });
    }

    /// A console wired to this world.
    pub fn console(&self, settings: ConsoleSettings) -> Console {
        let mut console = Console::new(settings, self.owner_source());
        self.register_globals(console.registry_mut());
        console
    }
}
