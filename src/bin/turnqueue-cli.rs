#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use turnqueue::{
    io,
    model::{TechId, Technician},
    notification::LogObserver,
    Settings, StoreBackend, TurnEngine,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de gestion de la file des techniciens
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Backend de stockage du roster
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TURNQUEUE_STORE",
        default_value_t = StoreBackend::Json
    )]
    store: StoreBackend,

    /// Fichier JSON de roster (backend `json`)
    #[arg(long, global = true, env = "TURNQUEUE_ROSTER", default_value = "roster.json")]
    roster: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un technicien en fond de file
    Add {
        #[arg(long)]
        name: String,
    },

    /// Retirer définitivement un technicien
    Remove {
        #[arg(long)]
        id: u64,
    },

    /// Assigner un tour (au prochain disponible, ou à `--id`)
    Assign {
        #[arg(long)]
        id: Option<u64>,
    },

    /// Terminer un tour : retour en fond de file
    Complete {
        #[arg(long)]
        id: u64,
        /// Tour demandé par le client (sans effet sur la rotation pour l'instant)
        #[arg(long)]
        request: bool,
    },

    /// Check-in / check-out
    Toggle {
        #[arg(long)]
        id: u64,
    },

    /// Mettre en pause
    Break {
        #[arg(long)]
        id: u64,
    },

    /// Retour de pause : fond de file
    Return {
        #[arg(long)]
        id: u64,
    },

    /// Réordonner la file : liste "id1,id2,..." complète
    Reorder {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u64>,
    },

    /// Afficher le prochain technicien sans l'assigner
    Next,

    /// Lister la file et optionnellement l'exporter
    List {
        #[arg(long)]
        out_json: Option<PathBuf>,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Tout supprimer et repartir des ids à 1
    Reset {
        /// Confirmation explicite
        #[arg(long)]
        yes: bool,
    },
}

fn print_tech(t: &Technician) {
    println!(
        "{} | #{} {} | {} | {}",
        t.queue_position,
        t.id,
        t.name,
        t.status,
        if t.is_active { "in" } else { "out" }
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let settings = Settings {
        backend: cli.store,
        roster_path: cli.roster,
    };
    let engine = TurnEngine::new(settings.open_store()?).with_observer(LogObserver);

    let code = match cli.cmd {
        Commands::Add { name } => {
            let tech = engine.add(&name)?;
            print_tech(&tech);
            0
        }
        Commands::Remove { id } => {
            engine.remove(TechId::new(id))?;
            println!("removed #{id}");
            0
        }
        Commands::Assign { id } => {
            let tech = match id {
                Some(id) => engine.assign(TechId::new(id))?,
                None => engine.assign_next()?,
            };
            print_tech(&tech);
            0
        }
        Commands::Complete { id, request } => {
            let tech = engine.complete_turn(TechId::new(id), request)?;
            print_tech(&tech);
            0
        }
        Commands::Toggle { id } => {
            let tech = engine.toggle_active(TechId::new(id))?;
            print_tech(&tech);
            0
        }
        Commands::Break { id } => {
            let tech = engine.take_break(TechId::new(id))?;
            print_tech(&tech);
            0
        }
        Commands::Return { id } => {
            let tech = engine.return_from_break(TechId::new(id))?;
            print_tech(&tech);
            0
        }
        Commands::Reorder { ids } => {
            let ids: Vec<TechId> = ids.into_iter().map(TechId::new).collect();
            engine.reorder(&ids)?;
            for t in engine.try_list_sorted()? {
                print_tech(&t);
            }
            0
        }
        Commands::Next => match engine.next_available()? {
            Some(tech) => {
                print_tech(&tech);
                0
            }
            None => {
                eprintln!("no available technician");
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        },
        Commands::List { out_json, out_csv } => {
            let queue = engine.try_list_sorted()?;
            if let Some(path) = out_json {
                io::export_queue_json(path, &queue)?;
            }
            if let Some(path) = out_csv {
                io::export_queue_csv(path, &queue)?;
            }
            for t in &queue {
                print_tech(t);
            }
            0
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to reset the roster without --yes");
            }
            let deleted = engine.reset()?;
            println!("reset: {deleted} technician(s) deleted");
            0
        }
    };

    std::process::exit(code);
}
