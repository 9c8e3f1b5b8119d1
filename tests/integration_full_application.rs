//! Full plugin startup through the link-time class registry: eager
//! managers, command scan, listener scan.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use plugin_bootstrap::{
    submit_command, submit_listener, submit_manager, submit_tab_completer, AutoCommand,
    AutoCommandRegistrar, AutoEventRegistrar, AutoListener, AutoTabCompleter, CommandBinding,
    CommandExecutor, CommandMap, CommandMarker, CommandSender, EventBus, HostInstance, HostPlugin,
    LinkedClasses, Listener, Managed, Manager, ManagerOptions, ManagerRegistry, RegResult,
    TabCompleter, TabCompleterMarker,
};

static GAME_MANAGER_BUILDS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct FakeCommandMap {
    declared: HashSet<String>,
    attached: Mutex<HashMap<String, CommandBinding>>,
    inserted: Mutex<HashMap<String, CommandBinding>>,
}

impl CommandMap for FakeCommandMap {
    fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    fn attach(&self, name: &str, binding: CommandBinding) -> bool {
        self.attached.lock().unwrap().insert(name.to_string(), binding);
        true
    }

    fn insert(&self, namespace: &str, name: &str, binding: CommandBinding) -> bool {
        self.inserted
            .lock()
            .unwrap()
            .insert(format!("{namespace}:{name}"), binding);
        true
    }
}

#[derive(Default)]
struct RecordingBus {
    registered: Mutex<Vec<Arc<dyn Listener>>>,
}

impl EventBus for RecordingBus {
    fn register(&self, listener: Arc<dyn Listener>) {
        self.registered.lock().unwrap().push(listener);
    }
}

struct GamePlugin {
    map: FakeCommandMap,
    bus: RecordingBus,
}

impl HostPlugin for GamePlugin {
    fn name(&self) -> &str {
        "GamePlugin"
    }

    fn command_map(&self) -> Option<&dyn CommandMap> {
        Some(&self.map)
    }

    fn event_bus(&self) -> &dyn EventBus {
        &self.bus
    }
}

struct GameManager {
    started: bool,
}

impl Managed for GameManager {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        GAME_MANAGER_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(GameManager { started: false })
    }

    fn activate(&mut self) -> RegResult<()> {
        self.started = true;
        Ok(())
    }
}

impl Manager for GameManager {
    const OPTIONS: ManagerOptions = ManagerOptions::DEFAULT.eager();
}

submit_manager!(GameManager);

struct StatsManager {
    game: Option<Arc<GameManager>>,
}

impl Managed for StatsManager {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(StatsManager { game: None })
    }

    fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
        self.game = Some(registry.get_or_create::<GameManager>()?);
        Ok(())
    }
}

impl Manager for StatsManager {}

submit_manager!(StatsManager);

struct ScoreCommand {
    stats: Option<Arc<StatsManager>>,
}

impl Managed for ScoreCommand {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(ScoreCommand { stats: None })
    }

    fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
        self.stats = Some(registry.get_or_create::<StatsManager>()?);
        Ok(())
    }
}

impl CommandExecutor for ScoreCommand {
    fn execute(&self, sender: &mut dyn CommandSender, _label: &str, _args: &[String]) -> bool {
        match &self.stats {
            Some(stats) if stats.game.as_ref().is_some_and(|g| g.started) => {
                sender.send_message("scores ready");
                true
            }
            _ => false,
        }
    }
}

impl AutoCommand for ScoreCommand {
    const MARKER: CommandMarker = CommandMarker::of(&["score", "top"])
        .with_description("Show %command% standings");
}

submit_command!(ScoreCommand);

struct ScoreCompleter;

impl Managed for ScoreCompleter {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(ScoreCompleter)
    }
}

impl TabCompleter for ScoreCompleter {
    fn complete(&self, _sender: &dyn CommandSender, _label: &str, _args: &[String]) -> Vec<String> {
        vec!["weekly".to_string(), "alltime".to_string()]
    }
}

impl AutoTabCompleter for ScoreCompleter {
    const MARKER: TabCompleterMarker = TabCompleterMarker::named("score");
}

submit_tab_completer!(ScoreCompleter);

struct JoinListener {
    game: Option<Arc<GameManager>>,
}

impl Managed for JoinListener {
    fn construct(_host: &HostInstance) -> RegResult<Self> {
        Ok(JoinListener { game: None })
    }

    fn wire(&mut self, registry: &ManagerRegistry) -> RegResult<()> {
        self.game = Some(registry.get_or_create::<GameManager>()?);
        Ok(())
    }
}

impl Listener for JoinListener {}

impl AutoListener for JoinListener {}

submit_listener!(JoinListener);

struct Console {
    messages: Vec<String>,
}

impl CommandSender for Console {
    fn name(&self) -> &str {
        "console"
    }

    fn send_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[test]
fn full_startup_flow() {
    let plugin = Arc::new(GamePlugin {
        map: FakeCommandMap {
            declared: ["score"].iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        },
        bus: RecordingBus::default(),
    });
    let host = HostInstance::new(plugin.clone());
    let scanner = Arc::new(LinkedClasses::with_prefix(module_path!()));

    let registry = ManagerRegistry::builder(host.clone())
        .scanner(scanner.as_ref())
        .require_marker(true)
        .build();
    registry.initialize_eager_managers().unwrap();
    assert!(registry.contains::<GameManager>());

    let commands = AutoCommandRegistrar::new(host.clone(), scanner.clone())
        .with_registry(&registry)
        .register_all_commands();
    assert_eq!(commands, vec!["score".to_string(), "top".to_string()]);

    let listeners = AutoEventRegistrar::new(host, scanner)
        .with_registry(&registry)
        .register_all_listeners();
    assert_eq!(listeners, vec!["JoinListener".to_string()]);
    assert_eq!(plugin.bus.registered.lock().unwrap().len(), 1);

    // One eager construction, shared by everything that wired it in.
    assert_eq!(GAME_MANAGER_BUILDS.load(Ordering::SeqCst), 1);

    // Declared name attached, extra name synthesized under the namespace.
    let attached = plugin.map.attached.lock().unwrap();
    let inserted = plugin.map.inserted.lock().unwrap();
    let score = attached.get("score").unwrap();
    let top = inserted.get("gameplugin:top").unwrap();
    assert_eq!(score.description.as_deref(), Some("Show score standings"));
    assert_eq!(top.description.as_deref(), Some("Show top standings"));

    // The completer class only covers the declared name.
    assert!(score.tab_completer.is_some());
    assert!(top.tab_completer.is_none());

    // The command executes against the live, activated manager graph.
    let mut console = Console { messages: Vec::new() };
    assert!(score.executor.execute(&mut console, "score", &[]));
    assert_eq!(console.messages, vec!["scores ready".to_string()]);
}
