use clap::{Parser, Subcommand};
use feature_scripts::catalog::{self, CatalogPaths, Catalogs};
use feature_scripts::config::{self, AppConfig};
use feature_scripts::output;
use feature_scripts::placeholders::{PlaceholderFamily, ScriptSlot};
use feature_scripts::session::{CopyOutcome, ScriptSession, Scripts};
use feature_scripts::settings::FileSettings;
use feature_scripts::validation;
use std::path::PathBuf;

fn version_string() -> &'static str {
    let hash = env!("SCRIPTS_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "feature-scripts")]
#[command(about = "Generate hub feature, comment, and original post scripts from shared templates")]
#[command(long_about = "\
Generate hub feature, comment, and original post scripts from shared templates

Templates are picked per page from the template catalog. The most specific
template for the selected tags wins:

  first raw community → first raw → first community → first hub → first
  → raw → raw community → community → hub → bare

Template tokens:
  %%PAGENAME%% %%FULLPAGENAME%% %%PAGETITLE%% %%PAGEHASH%% %%MEMBERLEVEL%%
  %%USERNAME%% %%YOURNAME%% %%YOURFIRSTNAME%% %%STAFFLEVEL%%

Manual placeholders:
  [[NAME]]   short value, fill with --set NAME=value
  [{NAME}]   long value, fill with --set-long NAME=value

Run 'feature-scripts gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Settings file (remembered page, your name, staff level, ...)
    #[arg(long, default_value = ".feature-scripts-settings.toml", global = true)]
    settings: PathBuf,

    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Field values shared by the commands that generate scripts.
#[derive(clap::Args)]
struct FieldArgs {
    /// Page id, e.g. snap:longexposure (defaults to the remembered page)
    #[arg(long)]
    page: Option<String>,
    /// User being featured, without the @
    #[arg(long)]
    user: String,
    /// Membership label of the user
    #[arg(long, default_value = "None")]
    membership: String,
    /// Your alias (remembered)
    #[arg(long)]
    your_name: Option<String>,
    /// Your first name (remembered)
    #[arg(long)]
    your_first_name: Option<String>,
    /// Your staff level (remembered)
    #[arg(long)]
    staff_level: Option<String>,
    /// First feature of this user on the page
    #[arg(long)]
    first: bool,
    /// Photo tagged raw
    #[arg(long)]
    raw: bool,
    /// Photo tagged community
    #[arg(long)]
    community: bool,
    /// Photo tagged with the hub tag
    #[arg(long)]
    hub_tag: bool,
    /// Insert a space after @ in mentions (remembered)
    #[arg(long)]
    include_space: Option<bool>,
}

#[derive(Subcommand)]
enum Command {
    /// List pages from the page catalog
    Pages {
        /// Only list pages of this hub
        #[arg(long)]
        hub: Option<String>,
    },
    /// List template names registered for a page
    Templates {
        #[arg(long)]
        page: String,
    },
    /// Generate scripts for a feature
    Generate {
        #[command(flatten)]
        fields: FieldArgs,
        /// Also generate the new membership script for this level
        #[arg(long)]
        new_membership: Option<String>,
        /// Short placeholder value, NAME=VALUE (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        short: Vec<String>,
        /// Long placeholder value, NAME=VALUE (repeatable)
        #[arg(long = "set-long", value_name = "NAME=VALUE")]
        long: Vec<String>,
    },
    /// Validate field values without generating scripts
    Check {
        #[command(flatten)]
        fields: FieldArgs,
        /// Also check a user profile URL
        #[arg(long)]
        profile_url: Option<String>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Pages { hub } => {
            let (_, catalogs) = load(&cli.config)?;
            output::print_pages(&catalogs.pages, hub.as_deref());
        }
        Command::Templates { page } => {
            let (_, catalogs) = load(&cli.config)?;
            match catalogs.templates.page(&page) {
                Some(entry) => output::print_templates(entry),
                None => println!("No templates for {page}"),
            }
        }
        Command::Generate {
            fields,
            new_membership,
            short,
            long,
        } => {
            let (app_config, catalogs) = load(&cli.config)?;
            let store = FileSettings::open(&cli.settings)?;
            let mut session = ScriptSession::new(catalogs, app_config, store);
            apply_fields(&mut session, &fields);

            let short = parse_assignments(&short)?;
            let long = parse_assignments(&long)?;
            let mut finished = Scripts::default();
            for slot in ScriptSlot::ALL {
                let mut outcome = session.prepare_copy(slot, false);
                if outcome == CopyOutcome::NeedsEditor {
                    fill_placeholders(&mut session, slot, &short, &long);
                    outcome = session.finish_editing(slot);
                }
                let text = match outcome {
                    CopyOutcome::Ready(text) => text,
                    CopyOutcome::Blocked(diagnostic) => {
                        print!("{diagnostic}");
                        session.store_mut().save()?;
                        return Err("scripts are blocked by validation errors".into());
                    }
                    CopyOutcome::NeedsEditor => {
                        let message = format!("placeholders in the {slot} script changed while filling them in");
                        return Err(message.into());
                    }
                };
                match slot {
                    ScriptSlot::Feature => finished.feature = text,
                    ScriptSlot::Comment => finished.comment = text,
                    ScriptSlot::OriginalPost => finished.original_post = text,
                }
            }
            output::print_scripts(&finished, session.placeholders());

            if let Some(level) = new_membership {
                session.set_new_membership(level);
                println!();
                println!("== New membership");
                print!("{}", session.new_membership_script());
                println!();
            }
            session.store_mut().save()?;
        }
        Command::Check {
            fields,
            profile_url,
        } => {
            let (app_config, catalogs) = load(&cli.config)?;
            let store = FileSettings::open(&cli.settings)?;
            let mut session = ScriptSession::new(catalogs, app_config, store);
            apply_fields(&mut session, &fields);
            output::print_validation(&session.validation());
            if let Some(url) = profile_url {
                let prefix = &session.config().validation.profile_url_prefix;
                let result = validation::validate_user_profile_url(&url, prefix);
                println!("Profile URL: {}", result);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load(config_path: &std::path::Path) -> Result<(AppConfig, Catalogs), Box<dyn std::error::Error>> {
    let app_config = config::load_config(config_path)?;
    let paths = &app_config.catalog;
    let catalogs = catalog::load_catalogs(CatalogPaths {
        pages: &paths.pages,
        templates: &paths.templates,
        disallow_lists: Some(&paths.disallow_lists),
        caution_lists: Some(&paths.caution_lists),
    })?;
    Ok((app_config, catalogs))
}

fn apply_fields(session: &mut ScriptSession<FileSettings>, fields: &FieldArgs) {
    if let Some(page) = &fields.page {
        session.set_page(page.as_str());
    }
    if let Some(name) = &fields.your_name {
        session.set_your_name(name.as_str());
    }
    if let Some(name) = &fields.your_first_name {
        session.set_your_first_name(name.as_str());
    }
    if let Some(level) = &fields.staff_level {
        session.set_staff_level(level.as_str());
    }
    if let Some(include_space) = fields.include_space {
        session.set_include_space(include_space);
    }
    session.set_user_name(fields.user.as_str());
    session.set_membership(fields.membership.as_str());
    session.set_first_for_page(fields.first);
    session.set_raw_tag(fields.raw);
    session.set_community_tag(fields.community);
    session.set_hub_tag(fields.hub_tag);
}

fn parse_assignments(items: &[String]) -> Result<Vec<(String, String)>, String> {
    items
        .iter()
        .map(|item| {
            item.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| format!("expected NAME=VALUE, got {item:?}"))
        })
        .collect()
}

/// Apply command-line values to every placeholder the slot knows.
/// Names without a value keep whatever a sibling seeded.
fn fill_placeholders(
    session: &mut ScriptSession<FileSettings>,
    slot: ScriptSlot,
    short: &[(String, String)],
    long: &[(String, String)],
) {
    for (family, values) in [(PlaceholderFamily::Short, short), (PlaceholderFamily::Long, long)] {
        for (name, value) in values {
            session.set_placeholder_value(slot, family, name, value.as_str());
        }
    }
}
