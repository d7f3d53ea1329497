use clap::{Parser, Subcommand};
use piki_controls::document::{DocumentStore, Zone};
use piki_controls::options::{ControlOptions, config_file_path, save_options};
use piki_controls::richtext::boundary::collect_value_elements;
use piki_controls::richtext::control_document::{
    ControlDocument, DocumentFramework, find_control_prefix,
};
use piki_controls::richtext::control_host::{
    ControlContext, ControlResult, ControlRuleOption, ControlTarget,
};
use piki_controls::richtext::element::{ControlComponent, Range, elements_to_text};
use piki_controls::richtext::select_control::SelectControl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "piki-controls")]
#[command(about = "Inspect and edit select controls in rich text documents", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the documents
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Control options file (defaults to the per-user config)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a document zone and the state of its select controls
    Show {
        /// Name of the document
        name: String,
        #[arg(long, value_enum, default_value_t = Zone::Main)]
        zone: Zone,
    },
    /// Select option codes on a control
    Select {
        /// Name of the document
        name: String,
        /// Id of the control to change
        #[arg(long)]
        control: String,
        /// Comma separated option codes
        #[arg(long)]
        code: String,
        #[arg(long, value_enum, default_value_t = Zone::Main)]
        zone: Zone,
    },
    /// Clear the selection of a control
    Clear {
        /// Name of the document
        name: String,
        /// Id of the control to clear
        #[arg(long)]
        control: String,
        #[arg(long, value_enum, default_value_t = Zone::Main)]
        zone: Zone,
    },
    /// Print the resolved control options
    Options {
        /// Also write them to the options file
        #[arg(long)]
        write: bool,
    },
}

fn cmd_show(store: &DocumentStore, name: &str, zone: Zone) -> Result<(), String> {
    let doc = store.load(name)?;
    let elements = doc.data.zone(zone);
    println!("{}", elements_to_text(elements));

    for (index, element) in elements.iter().enumerate() {
        if element.control_component != ControlComponent::Prefix {
            continue;
        }
        let (Some(control_id), Some(control)) = (&element.control_id, &element.control) else {
            continue;
        };
        let value = elements_to_text(&collect_value_elements(elements, index));
        println!(
            "{}: code={} value={}",
            control_id,
            control.code.as_deref().unwrap_or("-"),
            value
        );
    }
    Ok(())
}

/// Run `edit` on the control `control_id` of `zone`, then save the document.
/// The main zone is edited live; header and footer through a context.
fn edit_control(
    store: &DocumentStore,
    options: ControlOptions,
    name: &str,
    zone: Zone,
    control_id: &str,
    edit: impl FnOnce(
        &mut SelectControl,
        &mut ControlTarget<'_>,
        &mut DocumentFramework,
    ) -> ControlResult<()>,
) -> Result<(), String> {
    let mut doc = store.load(name)?;
    let prefix = find_control_prefix(doc.data.zone(zone), control_id)
        .ok_or_else(|| format!("Control '{}' not found in '{}'", control_id, name))?;
    let mut select = SelectControl::new(doc.data.zone(zone)[prefix].clone());

    let main = std::mem::take(&mut doc.data.main);
    let mut editor = ControlDocument::new(main, options);
    let result = match zone {
        Zone::Main => {
            editor.set_range(Range::collapsed(prefix));
            editor.live(|target, framework| edit(&mut select, target, framework))
        }
        Zone::Header | Zone::Footer => {
            let elements = doc.data.zone_mut(zone);
            editor.with_target(
                ControlContext::new(elements, Range::collapsed(prefix)),
                |target, framework| edit(&mut select, target, framework),
            )
        }
    };
    doc.data.main = editor.elements;
    result.map_err(|e| format!("Cannot change '{}': {}", control_id, e))?;

    store.save(&doc)
}

fn cmd_select(
    store: &DocumentStore,
    options: ControlOptions,
    name: &str,
    zone: Zone,
    control_id: &str,
    code: &str,
) -> Result<(), String> {
    edit_control(store, options, name, zone, control_id, |select, target, host| {
        select.set_select(code, target, host, ControlRuleOption::default())
    })
}

fn cmd_clear(
    store: &DocumentStore,
    options: ControlOptions,
    name: &str,
    zone: Zone,
    control_id: &str,
) -> Result<(), String> {
    edit_control(store, options, name, zone, control_id, |select, target, host| {
        select
            .clear_select(target, host, ControlRuleOption::default())
            .map(|_| ())
    })
}

fn cmd_options(options: &ControlOptions, write_to: Option<PathBuf>) -> Result<(), String> {
    let toml = toml::to_string_pretty(options)
        .map_err(|e| format!("Failed to serialize options: {}", e))?;
    print!("{}", toml);

    if let Some(path) = write_to {
        save_options(&path, options)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        tracing::info!(path = %path.display(), "wrote control options");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = ControlOptions::load_or_default(args.config.as_deref());
    let store = DocumentStore::new(args.dir);

    let result = match args.command {
        Commands::Show { name, zone } => cmd_show(&store, &name, zone),
        Commands::Select {
            name,
            control,
            code,
            zone,
        } => cmd_select(&store, options, &name, zone, &control, &code),
        Commands::Clear {
            name,
            control,
            zone,
        } => cmd_clear(&store, options, &name, zone, &control),
        Commands::Options { write } => match (write, args.config.or_else(config_file_path)) {
            (false, _) => cmd_options(&options, None),
            (true, Some(path)) => cmd_options(&options, Some(path)),
            (true, None) => Err("No options file location available".to_string()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
